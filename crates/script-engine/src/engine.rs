//! [`QueryEngine`] backed by page scripts

use crate::{runtime::ScriptRuntime, scripts};
use async_trait::async_trait;
use locator_core::{CombinedExpression, ElementRef, EngineError, QueryEngine, Scope};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
struct ReplyPayload {
    #[serde(default)]
    refs: Vec<String>,
    count: Option<usize>,
    value: Option<bool>,
    text: Option<String>,
    texts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ScriptReply {
    Ok(ReplyPayload),
    #[serde(rename = "none")]
    Missing,
    Stale,
    Error {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        message: String,
    },
}

/// Resolves elements by evaluating generated scripts through a
/// [`ScriptRuntime`]. Matched elements are registered under a token in a
/// page-global map and referenced by that token afterwards; the DOM itself
/// is never written.
#[derive(Clone)]
pub struct ScriptEngine {
    runtime: Arc<dyn ScriptRuntime>,
}

impl ScriptEngine {
    pub fn new(runtime: Arc<dyn ScriptRuntime>) -> Self {
        Self { runtime }
    }

    async fn run(&self, script: String, label: &str) -> Result<Option<ReplyPayload>, EngineError> {
        let value = self.runtime.evaluate(&script).await?;
        match parse_reply(value)? {
            ScriptReply::Ok(payload) => Ok(Some(payload)),
            ScriptReply::Missing => Ok(None),
            ScriptReply::Stale => Err(EngineError::Stale(label.to_string())),
            ScriptReply::Error { name, message } => {
                if name.as_deref() == Some("SyntaxError") {
                    Err(EngineError::InvalidExpression(message))
                } else {
                    warn!("{} raised {}: {}", label, name.unwrap_or_default(), message);
                    Err(EngineError::Internal(message))
                }
            }
        }
    }

    async fn run_ok(&self, script: String, label: &str) -> Result<ReplyPayload, EngineError> {
        self.run(script, label)
            .await?
            .ok_or_else(|| EngineError::Internal(format!("{} returned no result", label)))
    }
}

fn parse_reply(value: Value) -> Result<ScriptReply, EngineError> {
    serde_json::from_value(value)
        .map_err(|err| EngineError::Internal(format!("unexpected script result: {}", err)))
}

fn fresh_prefix() -> String {
    format!("p{}", Uuid::new_v4().simple())
}

fn missing_field(label: &str, field: &str) -> EngineError {
    EngineError::Internal(format!("{} result missing '{}'", label, field))
}

#[async_trait]
impl QueryEngine for ScriptEngine {
    async fn query_first(
        &self,
        scope: &Scope,
        expression: &str,
    ) -> Result<Option<ElementRef>, EngineError> {
        debug!("querySelector {} in {}", expression, scope);
        let script = scripts::query_first(&fresh_prefix(), scope, expression);
        let label = format!("query {} in {}", expression, scope);
        Ok(self
            .run(script, &label)
            .await?
            .and_then(|payload| payload.refs.into_iter().next())
            .map(ElementRef))
    }

    async fn query_all(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<Vec<ElementRef>, EngineError> {
        let script = scripts::query_all(&fresh_prefix(), scope, expression.as_str());
        let label = format!("query all {} in {}", expression, scope);
        let payload = self.run_ok(script, &label).await?;
        Ok(payload.refs.into_iter().map(ElementRef).collect())
    }

    async fn count(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<usize, EngineError> {
        let label = format!("count {} in {}", expression, scope);
        self.run_ok(scripts::count(scope, expression.as_str()), &label)
            .await?
            .count
            .ok_or_else(|| missing_field(&label, "count"))
    }

    async fn is_visible(&self, element: &ElementRef) -> Result<bool, EngineError> {
        let label = format!("visibility of {}", element);
        self.run_ok(scripts::is_visible(element), &label)
            .await?
            .value
            .ok_or_else(|| missing_field(&label, "value"))
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool, EngineError> {
        let label = format!("enabled state of {}", element);
        self.run_ok(scripts::is_enabled(element), &label)
            .await?
            .value
            .ok_or_else(|| missing_field(&label, "value"))
    }

    async fn text_content(&self, element: &ElementRef) -> Result<Option<String>, EngineError> {
        let label = format!("text of {}", element);
        Ok(self.run_ok(scripts::text_content(element), &label).await?.text)
    }

    async fn all_text_contents(
        &self,
        scope: &Scope,
        expression: &CombinedExpression,
    ) -> Result<Vec<String>, EngineError> {
        let label = format!("texts of {} in {}", expression, scope);
        self.run_ok(scripts::all_text_contents(scope, expression.as_str()), &label)
            .await?
            .texts
            .ok_or_else(|| missing_field(&label, "texts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::union_query;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingRuntime {
        calls: Mutex<Vec<String>>,
        replies: Mutex<VecDeque<Value>>,
    }

    impl RecordingRuntime {
        fn replying(replies: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl ScriptRuntime for RecordingRuntime {
        async fn evaluate(&self, expression: &str) -> Result<Value, EngineError> {
            self.calls.lock().push(expression.to_string());
            self.replies
                .lock()
                .pop_front()
                .ok_or_else(|| EngineError::Protocol("no scripted reply".to_string()))
        }
    }

    #[tokio::test]
    async fn query_first_returns_tagged_ref() {
        let runtime = RecordingRuntime::replying(vec![json!({ "status": "ok", "refs": ["p1-0"] })]);
        let engine = ScriptEngine::new(runtime.clone());

        let found = engine
            .query_first(&Scope::Document, "#login-button")
            .await
            .unwrap();
        assert_eq!(found, Some(ElementRef::new("p1-0")));
        assert!(runtime.calls.lock()[0].contains(r##""#login-button""##));
    }

    #[tokio::test]
    async fn none_status_is_absence() {
        let runtime = RecordingRuntime::replying(vec![json!({ "status": "none" })]);
        let engine = ScriptEngine::new(runtime);
        let found = engine.query_first(&Scope::Document, ".missing").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn stale_and_syntax_errors_are_classified() {
        let runtime = RecordingRuntime::replying(vec![
            json!({ "status": "stale" }),
            json!({ "status": "error", "name": "SyntaxError", "message": "'[[' is not a valid selector" }),
            json!({ "status": "error", "name": "TypeError", "message": "boom" }),
        ]);
        let engine = ScriptEngine::new(runtime);
        let element = ElementRef::new("p1-0");

        assert!(engine.text_content(&element).await.unwrap_err().is_stale());
        assert!(matches!(
            engine.query_first(&Scope::Document, "[[").await,
            Err(EngineError::InvalidExpression(_))
        ));
        assert!(matches!(
            engine.is_visible(&element).await,
            Err(EngineError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn batch_texts_use_one_round_trip() {
        let runtime = RecordingRuntime::replying(vec![json!({
            "status": "ok",
            "texts": [" Sauce Labs Backpack ", "Sauce Labs Onesie"]
        })]);
        let engine = ScriptEngine::new(runtime.clone());
        let names = union_query([".inventory_item_name", "[data-test=\"inventory-item-name\"]"]);

        let texts = engine
            .all_text_contents(&Scope::Document, &names)
            .await
            .unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(runtime.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_is_internal_error() {
        let runtime = RecordingRuntime::replying(vec![json!({ "unexpected": true })]);
        let engine = ScriptEngine::new(runtime);
        assert!(matches!(
            engine.is_enabled(&ElementRef::new("x")).await,
            Err(EngineError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn null_text_reads_as_none() {
        let runtime = RecordingRuntime::replying(vec![json!({ "status": "ok", "text": null })]);
        let engine = ScriptEngine::new(runtime);
        assert_eq!(engine.text_content(&ElementRef::new("x")).await.unwrap(), None);
    }
}
