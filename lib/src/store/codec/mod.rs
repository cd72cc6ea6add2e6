pub mod chromium;
pub mod firefox;

pub use chromium::ChromiumCodec;
pub use firefox::FirefoxCodec;

use crate::error::{PocketmarkError, Result};
use crate::models::{BookmarkNode, BookmarkTree};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// On-disk encodings of a bookmark store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFormat {
    /// Chromium-family `Bookmarks` JSON (Chrome, Edge, Chromium)
    Chromium,
    /// Firefox JSON bookmark backup
    Firefox,
}

impl StoreFormat {
    pub fn display_name(&self) -> &str {
        match self {
            StoreFormat::Chromium => "Chromium bookmarks",
            StoreFormat::Firefox => "Firefox bookmark backup",
        }
    }

    pub fn codec(&self) -> Box<dyn StoreCodec> {
        match self {
            StoreFormat::Chromium => Box::new(ChromiumCodec),
            StoreFormat::Firefox => Box::new(FirefoxCodec),
        }
    }
}

/// Trait for reading and writing one bookmark store encoding
///
/// `encode(decode(raw))` must give back `raw` for files written by the browser.
pub trait StoreCodec {
    fn format(&self) -> StoreFormat;

    fn decode(&self, raw: &[u8]) -> Result<BookmarkTree>;

    fn encode(&self, tree: &BookmarkTree) -> Result<Vec<u8>>;

    /// Factory for new nodes with ids that are unused in `tree`, stamped with `now`
    fn node_factory(&self, tree: &BookmarkTree, now: DateTime<Utc>) -> Box<dyn NodeFactory>;
}

/// Creates nodes carrying a store's own identifiers and timestamps
pub trait NodeFactory {
    fn folder(&mut self, name: &str) -> BookmarkNode;

    fn url(&mut self, name: &str, url: &str) -> BookmarkNode;

    /// Record that a folder's contents changed
    fn touch(&self, folder: &mut BookmarkNode);
}

/// Parse raw store bytes into the top-level JSON object
pub(crate) fn parse_document(raw: &[u8]) -> Result<Map<String, Value>> {
    let mut buffer = raw.to_vec();
    let value: Value = simd_json::serde::from_slice(&mut buffer)
        .map_err(|e| PocketmarkError::MalformedStore(format!("not valid JSON: {}", e)))?;
    match value {
        Value::Object(document) => Ok(document),
        _ => Err(PocketmarkError::MalformedStore(
            "top-level value is not an object".to_string(),
        )),
    }
}

/// Take a node's child list out of its attributes, leaving an empty list in its slot
pub(crate) fn take_children(
    attributes: &mut Map<String, Value>,
    id: &str,
) -> Result<Vec<Value>> {
    match attributes.get_mut("children") {
        Some(Value::Array(children)) => Ok(std::mem::take(children)),
        Some(_) => Err(PocketmarkError::MalformedStore(format!(
            "children of node {:?} is not a list",
            id
        ))),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn str_field<'a>(attributes: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(Value::as_str)
}
