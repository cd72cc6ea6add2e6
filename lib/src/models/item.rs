use serde::{Deserialize, Serialize};

/// One saved article handed over by the retrieval step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub item_id: String,
    #[serde(default)]
    pub resolved_title: Option<String>,
    #[serde(default)]
    pub given_title: Option<String>,
    #[serde(default)]
    pub resolved_url: Option<String>,
    #[serde(default)]
    pub given_url: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl SourceItem {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Self::default()
        }
    }

    /// Bookmark title: resolved title, then given title, then the item id
    pub fn title(&self) -> &str {
        non_empty(&self.resolved_title)
            .or_else(|| non_empty(&self.given_title))
            .unwrap_or(&self.item_id)
    }

    /// Bookmark URL: resolved URL, then given URL
    pub fn url(&self) -> Option<&str> {
        non_empty(&self.resolved_url).or_else(|| non_empty(&self.given_url))
    }
}

/// Item left out of the export because it carries no URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub item_id: String,
    pub title: String,
}

impl From<&SourceItem> for SkippedItem {
    fn from(item: &SourceItem) -> Self {
        Self {
            item_id: item.item_id.clone(),
            title: item.title().to_string(),
        }
    }
}
