use crate::error::{PocketmarkError, Result};
use crate::merge::{self, MergeOutcome};
use crate::models::{SkippedItem, SourceItem};
use crate::store::{writer, BackupManager, Browser, Os, ProfileLocator};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

/// Everything an export run needs to know besides the items themselves
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub os: Os,
    pub browser: Browser,
    /// Firefox profile name or absolute profile path
    pub firefox_profile: Option<String>,
    /// Store file to use instead of locating one
    pub store_path: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    /// Decode and merge without backing up or writing
    pub dry_run: bool,
}

impl ExportOptions {
    pub fn new(os: Os, browser: Browser) -> Self {
        Self {
            os,
            browser,
            firefox_profile: None,
            store_path: None,
            backup_dir: None,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub browser: Browser,
    pub store_path: PathBuf,
    /// `None` on a dry run
    pub backup_path: Option<PathBuf>,
    pub merged: usize,
    pub skipped: Vec<SkippedItem>,
    pub dry_run: bool,
}

/// Export `items` into the browser's bookmark store
///
/// Stages run in order (locate, backup, decode, merge, encode, write) and the
/// first failure aborts the run. The store is only replaced after a backup
/// exists and the merged tree encoded successfully.
pub fn run_export(
    locator: &ProfileLocator,
    options: &ExportOptions,
    items: &[SourceItem],
) -> Result<ExportReport> {
    let store_path = match &options.store_path {
        Some(path) if path.is_file() => path.clone(),
        Some(path) => {
            return Err(PocketmarkError::ProfileNotFound(format!(
                "store file {} does not exist",
                path.display()
            )))
        }
        None => locator.locate_with_profile(
            options.os,
            options.browser,
            options.firefox_profile.as_deref(),
        )?,
    };
    log::info!(
        "Exporting {} items into {} store {:?}",
        items.len(),
        options.browser.display_name(),
        store_path
    );

    let backup_path = if options.dry_run {
        None
    } else {
        Some(BackupManager::new(options.backup_dir.clone()).backup(&store_path)?)
    };

    let raw = fs::read(&store_path)?;
    let codec = options.browser.store_format().codec();
    let mut tree = codec.decode(&raw)?;

    let mut factory = codec.node_factory(&tree, Utc::now());
    let MergeOutcome { merged, skipped } = merge::merge(&mut tree, items, factory.as_mut())?;
    let encoded = codec.encode(&tree)?;

    if options.dry_run {
        log::info!("Dry run, leaving {:?} unchanged", store_path);
    } else {
        writer::write(&store_path, &encoded)?;
    }

    Ok(ExportReport {
        browser: options.browser,
        store_path,
        backup_path,
        merged,
        skipped,
        dry_run: options.dry_run,
    })
}
