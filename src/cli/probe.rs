use anyhow::Result;
use clap::Args;
use locator_core::{LocatorError, ResolveOptions};
use serde::Serialize;

use super::context::CliContext;
use super::output::OutputFormat;
use crate::errors::ProbeError;
use crate::session::ProbeSession;

#[derive(Args, Clone, Debug)]
pub struct ProbeArgs {
    /// Page to open
    #[arg(long)]
    pub url: String,

    /// Registry key (group.element)
    pub key: String,

    /// Require the element to be enabled as well as visible
    #[arg(long)]
    pub interactive: bool,

    /// Read every match instead of resolving the first usable one
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeReport {
    Resolved {
        key: String,
        expression: String,
        expression_index: usize,
        text: Option<String>,
    },
    Collection {
        key: String,
        texts: Vec<String>,
    },
    NotFound {
        key: String,
        tried: Vec<String>,
    },
}

impl ProbeReport {
    pub fn is_found(&self) -> bool {
        !matches!(self, ProbeReport::NotFound { .. })
    }

    pub fn print_human(&self) {
        match self {
            ProbeReport::Resolved {
                key,
                expression,
                expression_index,
                text,
            } => {
                println!("{} resolved via #{}: {}", key, expression_index, expression);
                match text {
                    Some(text) => println!("  text: {}", text),
                    None => println!("  text: (none)"),
                }
            }
            ProbeReport::Collection { key, texts } => {
                println!("{} matched {} element(s)", key, texts.len());
                for (idx, text) in texts.iter().enumerate() {
                    println!("  {}. {}", idx + 1, text);
                }
            }
            ProbeReport::NotFound { key, tried } => {
                println!("{} not found; tried:", key);
                for expression in tried {
                    println!("  - {}", expression);
                }
            }
        }
    }
}

/// Resolve (or batch-read with `all`) one registry entry on the current page.
pub async fn probe_key(
    session: &ProbeSession,
    key: &str,
    interactive: bool,
    all: bool,
) -> Result<ProbeReport, ProbeError> {
    if all {
        let texts = session.texts(key, true).await?;
        return Ok(ProbeReport::Collection {
            key: key.to_string(),
            texts,
        });
    }

    let options = if interactive {
        ResolveOptions::interactive()
    } else {
        ResolveOptions::default()
    };
    match session.find(key, options).await {
        Ok(handle) => {
            // Read the element that was resolved; re-resolving could land on
            // a match that failed the interactive gate.
            let text = match session.resolver().engine().text_content(&handle.element).await {
                Ok(text) => text.map(|t| t.trim().to_string()),
                Err(err) if err.is_stale() => None,
                Err(err) => return Err(LocatorError::from(err).into()),
            };
            Ok(ProbeReport::Resolved {
                key: key.to_string(),
                expression: handle.expression,
                expression_index: handle.expression_index,
                text,
            })
        }
        Err(ProbeError::Locator(LocatorError::LocatorNotFound { expressions })) => {
            Ok(ProbeReport::NotFound {
                key: key.to_string(),
                tried: expressions,
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(feature = "chromium")]
fn emit_report(report: &ProbeReport, output: OutputFormat) -> Result<()> {
    output.emit(report, ProbeReport::print_human)?;
    if !report.is_found() {
        anyhow::bail!("No matching locator found");
    }
    Ok(())
}

#[cfg(feature = "chromium")]
pub async fn cmd_probe(args: ProbeArgs, ctx: &CliContext, output: OutputFormat) -> Result<()> {
    use anyhow::Context;
    use locator_core::Resolver;
    use script_engine::{ChromiumRuntime, ScriptEngine};
    use std::sync::Arc;
    use tracing::warn;

    // Fail on unknown keys before paying for a browser launch.
    ctx.registry().get(&args.key)?;

    let runtime = Arc::new(
        ChromiumRuntime::launch(&ctx.config().chromium)
            .await
            .context("Failed to launch Chromium")?,
    );
    let result = async {
        runtime
            .goto(&args.url)
            .await
            .with_context(|| format!("Failed to open {}", args.url))?;
        let resolver = Resolver::new(Arc::new(ScriptEngine::new(runtime.clone())));
        let session = ProbeSession::new(resolver, ctx.registry().clone())
            .with_column_policy(ctx.config().column_policy());
        Ok::<_, anyhow::Error>(probe_key(&session, &args.key, args.interactive, args.all).await?)
    }
    .await;

    if let Err(err) = runtime.close().await {
        warn!("Failed to close browser: {}", err);
    }
    emit_report(&result?, output)
}

#[cfg(not(feature = "chromium"))]
pub async fn cmd_probe(args: ProbeArgs, ctx: &CliContext, _output: OutputFormat) -> Result<()> {
    ctx.registry().get(&args.key)?;
    anyhow::bail!(
        "Probing {} needs a browser; rebuild with `--features chromium`",
        args.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::{Resolver, StaticElement, StaticPage};
    use selector_registry::SelectorRegistry;
    use std::sync::Arc;

    fn session(elements: Vec<StaticElement>) -> ProbeSession {
        ProbeSession::new(
            Resolver::new(Arc::new(StaticPage::new(elements))),
            Arc::new(SelectorRegistry::builtin().unwrap()),
        )
    }

    #[tokio::test]
    async fn resolved_report_carries_text() {
        let session = session(vec![StaticElement::new("[data-test=\"title\"]").text(" Products ")]);
        let report = probe_key(&session, "navigation.title", false, false).await.unwrap();
        assert_eq!(
            report,
            ProbeReport::Resolved {
                key: "navigation.title".to_string(),
                expression: "[data-test=\"title\"]".to_string(),
                expression_index: 1,
                text: Some("Products".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn interactive_report_reads_the_resolved_element() {
        let session = session(vec![
            StaticElement::new(r#"[data-test="login-button"]"#).disabled().text("DISABLED"),
            StaticElement::new("#login-button").text(" Login "),
        ]);
        let report = probe_key(&session, "login.login_button", true, false).await.unwrap();
        assert_eq!(
            report,
            ProbeReport::Resolved {
                key: "login.login_button".to_string(),
                expression: "#login-button".to_string(),
                expression_index: 1,
                text: Some("Login".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn not_found_lists_every_expression() {
        let session = session(vec![StaticElement::new("#login-button").disabled()]);
        let report = probe_key(&session, "login.login_button", true, false).await.unwrap();
        assert!(!report.is_found());
        match report {
            ProbeReport::NotFound { tried, .. } => assert_eq!(tried.len(), 3),
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[tokio::test]
    async fn all_reads_every_match() {
        let session = session(vec![
            StaticElement::new(".inventory_item_price").text("$29.99"),
            StaticElement::new("[data-test=\"inventory-item-price\"]").text("$9.99"),
        ]);
        let report = probe_key(&session, "products.item_price", false, true).await.unwrap();
        assert_eq!(
            report,
            ProbeReport::Collection {
                key: "products.item_price".to_string(),
                texts: vec!["$29.99".to_string(), "$9.99".to_string()],
            }
        );
    }
}
