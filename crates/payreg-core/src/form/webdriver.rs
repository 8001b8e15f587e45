//! WebDriver form submitter built on `fantoccini`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::SubmissionError;
use crate::models::config::FormConfig;

use super::{FormSubmitter, SubmissionPayload, SubmissionReport, fields};

/// Drives a real browser through a WebDriver endpoint.
pub struct WebDriverSubmitter {
    config: FormConfig,
    currency_symbol: String,
}

impl WebDriverSubmitter {
    pub fn new(config: FormConfig, currency_symbol: impl Into<String>) -> Self {
        Self {
            config,
            currency_symbol: currency_symbol.into(),
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        if self.config.headless {
            caps.insert(
                "goog:chromeOptions".to_string(),
                json!({ "args": ["--headless=new"] }),
            );
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
        }
        caps
    }

    async fn connect(&self) -> Result<Client, SubmissionError> {
        debug!("Opening WebDriver session at {}", self.config.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.config.webdriver_url)
            .await?;
        Ok(client)
    }

    async fn fill(
        &self,
        client: &Client,
        id: &'static str,
        value: &str,
    ) -> Result<(), SubmissionError> {
        info!("Filling {}: {}", id, value);
        client.find(Locator::Id(id)).await?.send_keys(value).await?;
        Ok(())
    }

    async fn drive(
        &self,
        client: &Client,
        url: &Url,
        payload: &SubmissionPayload,
        total_value: &str,
    ) -> Result<(), SubmissionError> {
        client.goto(url.as_str()).await?;
        info!("Browser opened at {}", url);
        pause(self.config.page_load_wait_ms).await;

        self.fill(client, fields::SUPPLIER, &payload.supplier).await?;
        self.fill(client, fields::INVOICE_NUMBER, &payload.invoice_number)
            .await?;
        self.fill(client, fields::TOTAL_VALUE, total_value).await?;
        pause(self.config.field_wait_ms).await;

        info!("Clicking {}", fields::SUBMIT);
        client.find(Locator::Id(fields::SUBMIT)).await?.click().await?;
        pause(self.config.after_submit_wait_ms).await;

        Ok(())
    }
}

/// Build the `file://` URL for a local form document.
pub(crate) fn form_url(form: &Path) -> Result<Url, SubmissionError> {
    let absolute = std::fs::canonicalize(form)
        .map_err(|e| SubmissionError::InvalidLocation(format!("{}: {}", form.display(), e)))?;
    Url::from_file_path(&absolute)
        .map_err(|_| SubmissionError::InvalidLocation(absolute.display().to_string()))
}

async fn pause(ms: u64) {
    if ms > 0 {
        sleep(Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl FormSubmitter for WebDriverSubmitter {
    async fn submit_form(
        &self,
        payload: &SubmissionPayload,
        form: &Path,
    ) -> Result<SubmissionReport, SubmissionError> {
        if !form.exists() {
            warn!("Form document not found: {}", form.display());
            return Err(SubmissionError::FormNotFound(form.to_path_buf()));
        }

        let url = form_url(form)?;
        let total_value = payload.total_value_text(&self.currency_symbol);

        let client = match self.connect().await {
            Ok(client) => client,
            Err(e) => {
                warn!("Browser session could not be opened: {}", e);
                return Err(e);
            }
        };

        // The session is closed on both paths before returning
        let result = self.drive(&client, &url, payload, &total_value).await;
        if let Err(e) = client.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        match result {
            Ok(()) => {
                info!("Form submitted for invoice {}", payload.invoice_number);
                Ok(SubmissionReport {
                    form_url: url.to_string(),
                    total_value,
                })
            }
            Err(e) => {
                warn!("Form submission failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_form_url_is_absolute_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let form = dir.path().join("payment_form.html");
        std::fs::write(&form, "<html></html>").unwrap();

        let url = form_url(&form).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/payment_form.html"));
    }

    #[test]
    fn test_headless_capabilities() {
        let config = FormConfig {
            headless: true,
            ..FormConfig::default()
        };
        let caps = WebDriverSubmitter::new(config, "R$").capabilities();
        assert!(caps.contains_key("goog:chromeOptions"));

        let caps = WebDriverSubmitter::new(FormConfig::default(), "R$").capabilities();
        assert!(caps.is_empty());
    }

    #[tokio::test]
    async fn test_missing_form_skips_browser() {
        // Nothing listens on this port; reaching connect() would be a different error.
        let config = FormConfig {
            webdriver_url: "http://127.0.0.1:1".to_string(),
            ..FormConfig::default()
        };
        let submitter = WebDriverSubmitter::new(config, "R$");
        let payload = SubmissionPayload::new("ACME", "1", Decimal::ONE);

        let err = submitter
            .submit_form(&payload, Path::new("/nonexistent/payment_form.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::FormNotFound(_)));
    }
}
