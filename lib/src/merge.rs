use crate::error::{PocketmarkError, Result};
use crate::models::{BookmarkTree, RootRole, SkippedItem, SourceItem};
use crate::store::NodeFactory;

/// Folder under the bookmarks bar that holds exported items
pub const EXPORT_FOLDER_NAME: &str = "Pocket-Export";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Replace the contents of the export folder with `items`
///
/// Only the export folder is touched: it is created at the end of the
/// bookmarks bar if missing, otherwise emptied and refilled in item order.
pub fn merge(
    tree: &mut BookmarkTree,
    items: &[SourceItem],
    factory: &mut dyn NodeFactory,
) -> Result<MergeOutcome> {
    let format = tree.format;
    let bar = tree.root_mut(RootRole::BookmarksBar).ok_or_else(|| {
        PocketmarkError::RootNotFound(format!(
            "{} has no bookmarks bar",
            format.display_name()
        ))
    })?;

    let position = match bar
        .children
        .iter()
        .position(|child| child.is_folder_named(EXPORT_FOLDER_NAME))
    {
        Some(position) => {
            let folder = &mut bar.children[position];
            log::debug!(
                "Clearing {} existing entries of {}",
                folder.children.len(),
                EXPORT_FOLDER_NAME
            );
            folder.children.clear();
            factory.touch(folder);
            position
        }
        None => {
            bar.children.push(factory.folder(EXPORT_FOLDER_NAME));
            bar.children.len() - 1
        }
    };
    let folder = &mut bar.children[position];

    let mut outcome = MergeOutcome::default();
    for item in items {
        match item.url() {
            Some(url) => {
                folder.children.push(factory.url(item.title(), url));
                outcome.merged += 1;
            }
            None => {
                log::warn!("Skipping item {} ({:?}): no URL", item.item_id, item.title());
                outcome.skipped.push(SkippedItem::from(item));
            }
        }
    }

    tree.mark_modified();
    Ok(outcome)
}
