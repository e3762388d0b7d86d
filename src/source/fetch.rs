//! HTTP download of a sheet exported as CSV.
//!
//! The endpoint URL is treated as a secret: only its scheme and host are
//! ever logged.

use crate::error::ReportError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options for fetching the remote sheet.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Extra attempts after the first failure.
    pub retries: usize,
    /// Skip TLS certificate verification. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
    /// Whether to show a spinner.
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retries: 0,
            accept_invalid_certs: false,
            show_progress: true,
        }
    }
}

/// `scheme://host` of a URL, for logging.
pub fn redact_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}/…",
            parsed.scheme(),
            parsed.host_str().unwrap_or("?")
        ),
        Err(_) => "<invalid url>".to_string(),
    }
}

/// Download the body of `url` as text.
pub async fn fetch_text(url: &str, options: &FetchOptions) -> Result<String, ReportError> {
    let redacted = redact_url(url);

    if options.accept_invalid_certs {
        warn!("TLS certificate verification is DISABLED for {}", redacted);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(|e| {
            ReportError::SourceUnavailable(format!("failed to create HTTP client: {}", e))
        })?;

    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Fetching {}", redacted));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let mut attempt = 0usize;
    let result = loop {
        attempt += 1;
        debug!("Fetching {} (attempt {})", redacted, attempt);

        match fetch_once(&client, url).await {
            Ok(body) => break Ok(body),
            Err(e) if attempt <= options.retries => {
                warn!("Fetch attempt {} failed: {}", attempt, e);
                tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
            }
            Err(e) => {
                break Err(ReportError::SourceUnavailable(format!(
                    "failed to fetch {}: {}",
                    redacted, e
                )))
            }
        }
    };

    if let Some(pb) = spinner {
        match &result {
            Ok(_) => pb.finish_with_message("Fetch complete"),
            Err(_) => pb.abandon_with_message("Fetch failed"),
        }
    }

    if let Ok(ref body) = result {
        info!("Fetched {} bytes from {}", body.len(), redacted);
    }

    result
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| e.without_url())?
        .error_for_status()
        .map_err(|e| e.without_url())?;

    response.text().await.map_err(|e| e.without_url())
}
