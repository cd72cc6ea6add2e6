use crate::error::{PocketmarkError, Result};

/// Open a URL (the Pocket authorization page) in the user's default browser
pub fn open_url(url: &str) -> Result<()> {
    open::that(url).map_err(|e| PocketmarkError::Other(format!("cannot open {}: {}", url, e)))?;
    Ok(())
}
