//! Chromium page runtime

use locator_core::EngineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Launch settings for the browser runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromiumSettings {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub launch_timeout_secs: u64,
}

impl Default for ChromiumSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            launch_timeout_secs: 20,
        }
    }
}

impl ChromiumSettings {
    /// Fail early when a configured executable is missing. No executable
    /// means the launcher searches the usual install locations.
    pub async fn check_executable(&self) -> Result<(), EngineError> {
        let Some(executable) = &self.executable else {
            return Ok(());
        };
        match tokio::fs::try_exists(executable).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::Internal(format!(
                "chrome executable not found at {}",
                executable.display()
            ))),
            Err(err) => Err(EngineError::Internal(format!(
                "cannot inspect chrome executable {}: {err}",
                executable.display()
            ))),
        }
    }
}

#[cfg(feature = "chromium")]
pub use self::runtime::ChromiumRuntime;

#[cfg(feature = "chromium")]
mod runtime {
    use super::ChromiumSettings;
    use crate::runtime::ScriptRuntime;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::error::CdpError;
    use chromiumoxide::Page;
    use futures::StreamExt;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};

    const STALE_MARKERS: [&str; 3] = [
        "Execution context was destroyed",
        "Cannot find context with specified id",
        "Inspected target navigated or closed",
    ];

    fn classify(err: CdpError) -> EngineError {
        let message = err.to_string();
        if STALE_MARKERS.iter().any(|marker| message.contains(marker)) {
            EngineError::Stale(message)
        } else {
            EngineError::Protocol(message)
        }
    }

    /// [`ScriptRuntime`] evaluating in a single Chromium page
    pub struct ChromiumRuntime {
        browser: Mutex<Browser>,
        page: Page,
        handler: JoinHandle<()>,
    }

    impl ChromiumRuntime {
        pub async fn launch(settings: &ChromiumSettings) -> Result<Self, EngineError> {
            let mut builder = BrowserConfig::builder()
                .launch_timeout(Duration::from_secs(settings.launch_timeout_secs));
            if !settings.headless {
                builder = builder.with_head();
            }
            settings.check_executable().await?;
            if let Some(executable) = &settings.executable {
                builder = builder.chrome_executable(executable);
            }
            let config = builder
                .build()
                .map_err(|err| EngineError::Internal(format!("browser config error: {err}")))?;

            let (browser, mut handler) = Browser::launch(config).await.map_err(classify)?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(err) = event {
                        debug!("cdp handler event error: {}", err);
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(classify)?;
            info!("chromium runtime ready (headless: {})", settings.headless);
            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handler,
            })
        }

        /// Navigate the page; `Page::goto` already waits for the load
        pub async fn goto(&self, url: &str) -> Result<(), EngineError> {
            info!("navigating to {}", url);
            self.page.goto(url).await.map_err(classify)?;
            Ok(())
        }

        pub async fn close(&self) -> Result<(), EngineError> {
            let mut browser = self.browser.lock().await;
            if let Err(err) = browser.close().await {
                warn!("browser close failed: {}", err);
            }
            browser.wait().await.map_err(|err| EngineError::Internal(err.to_string()))?;
            self.handler.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl ScriptRuntime for ChromiumRuntime {
        async fn evaluate(&self, expression: &str) -> Result<Value, EngineError> {
            let result = self.page.evaluate(expression).await.map_err(classify)?;
            result
                .into_value::<Value>()
                .map_err(|err| EngineError::Protocol(format!("undecodable evaluation result: {err}")))
        }
    }

    impl std::fmt::Debug for ChromiumRuntime {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ChromiumRuntime").finish_non_exhaustive()
        }
    }
}
