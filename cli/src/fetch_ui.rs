use indicatif::{ProgressBar, ProgressStyle};
use pocketmark::error::{PocketmarkError, Result};
use pocketmark::models::SourceItem;
use pocketmark::pocket::PocketClient;
use std::time::Duration;

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Fetch all saved items with visual spinner feedback
pub fn fetch_with_spinner(
    client: &PocketClient,
    access_token: &str,
    page_size: usize,
) -> Result<Vec<SourceItem>> {
    let pb = spinner("Fetching Pocket items...");
    let result = client.fetch_items(access_token, page_size, |total| {
        pb.set_message(format!("Fetching Pocket items... {} so far", total));
    });

    match &result {
        Ok(items) => pb.finish_with_message(format!("✓ Fetched {} Pocket items", items.len())),
        Err(e) => pb.finish_with_message(format!("✗ Fetching failed ({})", categorize_error(e))),
    }
    result
}

/// Wait for the user to authorize in the browser, spinning meanwhile
pub fn wait_for_authorization(
    client: &PocketClient,
    code: &str,
    timeout: Duration,
) -> Result<String> {
    let pb = spinner("Waiting for authorization in the browser...");
    let result = client.poll_access_token(code, pocketmark::pocket::POLL_INTERVAL, timeout);
    match &result {
        Ok(_) => pb.finish_with_message("✓ Authorized"),
        Err(e) => pb.finish_with_message(format!("✗ Authorization failed ({})", categorize_error(e))),
    }
    result
}

/// Categorize error for user-friendly display
pub fn categorize_error(error: &PocketmarkError) -> &'static str {
    match error {
        PocketmarkError::Auth(_) => "not authorized",
        PocketmarkError::Json(_) => "unexpected response",
        PocketmarkError::Http(e) if e.is_timeout() => "timeout",
        PocketmarkError::Http(e) if e.is_connect() => "connection error",
        PocketmarkError::Http(_) => "request error",
        other => {
            let error_str = other.to_string();
            if error_str.contains("429") {
                "rate limited"
            } else if error_str.contains("5xx") {
                "server error"
            } else {
                "fetch error"
            }
        }
    }
}
