//! Firefox JSON bookmark backup.
//!
//! The whole file is one places-root container whose children are the
//! bookmark roots, each tagged with a `root` attribute. Firefox writes it as
//! compact JSON with its own key order, which is kept as read.

use super::{parse_document, str_field, take_children, NodeFactory, StoreCodec, StoreFormat};
use crate::error::{PocketmarkError, Result};
use crate::models::{BookmarkNode, BookmarkRoot, BookmarkTree, Layout, NodeKind, RootRole};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

const CONTAINER_TYPE: &str = "text/x-moz-place-container";
const PLACE_TYPE: &str = "text/x-moz-place";
const SEPARATOR_TYPE: &str = "text/x-moz-place-separator";
const PLACES_ROOT: &str = "placesRoot";

const GUID_LENGTH: usize = 12;
const GUID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Firefox bookmark backup codec
pub struct FirefoxCodec;

fn root_role(key: &str) -> RootRole {
    match key {
        "toolbarFolder" => RootRole::BookmarksBar,
        "unfiledBookmarksFolder" => RootRole::Other,
        "bookmarksMenuFolder" => RootRole::Menu,
        "mobileFolder" => RootRole::Mobile,
        "tagsFolder" => RootRole::Tags,
        _ => RootRole::Unknown,
    }
}

fn malformed(msg: impl Into<String>) -> PocketmarkError {
    PocketmarkError::MalformedStore(msg.into())
}

/// `dateAdded` is an integer in the file; the tree keeps it as text
fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn timestamp_value(text: &str) -> Value {
    text.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(text))
}

fn decode_node(value: Value, is_root: bool) -> Result<BookmarkNode> {
    let Value::Object(mut attributes) = value else {
        return Err(malformed("bookmark node is not an object"));
    };

    let id = str_field(&attributes, "guid")
        .ok_or_else(|| malformed("bookmark node without a \"guid\""))?
        .to_string();
    let kind = match str_field(&attributes, "type") {
        Some(CONTAINER_TYPE) if is_root => NodeKind::Root,
        Some(CONTAINER_TYPE) => NodeKind::Folder,
        Some(PLACE_TYPE) => NodeKind::Url,
        Some(SEPARATOR_TYPE) => NodeKind::Separator,
        Some(other) => {
            return Err(malformed(format!(
                "node {:?} has unknown type {:?}",
                id, other
            )))
        }
        None => return Err(malformed(format!("node {:?} has no type", id))),
    };
    if is_root && kind != NodeKind::Root {
        return Err(malformed(format!("top-level node {:?} is not a container", id)));
    }
    let name = str_field(&attributes, "title").unwrap_or_default().to_string();
    let url = str_field(&attributes, "uri").map(str::to_string);
    if kind == NodeKind::Url && url.is_none() {
        return Err(malformed(format!("place {:?} has no uri", id)));
    }
    let date_added = attributes.get("dateAdded").and_then(timestamp_text);

    let children = take_children(&mut attributes, &id)?
        .into_iter()
        .map(|child| decode_node(child, false))
        .collect::<Result<Vec<_>>>()?;

    Ok(BookmarkNode {
        id,
        kind,
        name,
        url,
        children,
        date_added,
        attributes,
    })
}

fn encode_node(node: &BookmarkNode, position: usize) -> Value {
    let mut object = node.attributes.clone();
    object.insert("guid".to_string(), Value::from(node.id.as_str()));
    if object.contains_key("title") || !node.name.is_empty() {
        object.insert("title".to_string(), Value::from(node.name.as_str()));
    }
    // New nodes leave their index open until their position is known
    if object.get("index") == Some(&Value::Null) {
        object.insert("index".to_string(), Value::from(position));
    }
    if let Some(date_added) = &node.date_added {
        object.insert("dateAdded".to_string(), timestamp_value(date_added));
    }
    let node_type = match node.kind {
        NodeKind::Root | NodeKind::Folder => CONTAINER_TYPE,
        NodeKind::Url => PLACE_TYPE,
        NodeKind::Separator => SEPARATOR_TYPE,
    };
    object.insert("type".to_string(), Value::from(node_type));
    if let Some(url) = &node.url {
        object.insert("uri".to_string(), Value::from(url.as_str()));
    }
    if node.is_container() && (object.contains_key("children") || !node.children.is_empty()) {
        object.insert("children".to_string(), encode_children(&node.children));
    }
    Value::Object(object)
}

fn encode_children(children: &[BookmarkNode]) -> Value {
    Value::Array(
        children
            .iter()
            .enumerate()
            .map(|(position, child)| encode_node(child, position))
            .collect(),
    )
}

impl StoreCodec for FirefoxCodec {
    fn format(&self) -> StoreFormat {
        StoreFormat::Firefox
    }

    fn decode(&self, raw: &[u8]) -> Result<BookmarkTree> {
        let mut document = parse_document(raw)?;

        if str_field(&document, "root") != Some(PLACES_ROOT)
            || str_field(&document, "type") != Some(CONTAINER_TYPE)
        {
            return Err(malformed("missing placesRoot container marker"));
        }

        let roots = take_children(&mut document, PLACES_ROOT)?
            .into_iter()
            .map(|value| {
                let node = decode_node(value, true)?;
                let key = str_field(&node.attributes, "root")
                    .ok_or_else(|| {
                        malformed(format!("top-level node {:?} has no root marker", node.id))
                    })?
                    .to_string();
                Ok(BookmarkRoot {
                    role: root_role(&key),
                    key,
                    node,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tree = BookmarkTree::new(StoreFormat::Firefox, roots, document, Layout::detect(raw));
        tree.ensure_unique_ids()?;
        log::debug!("Decoded {} Firefox bookmark nodes", tree.node_count());
        Ok(tree)
    }

    fn encode(&self, tree: &BookmarkTree) -> Result<Vec<u8>> {
        let mut document = tree.metadata.clone();
        let roots: Vec<BookmarkNode> = tree.roots.iter().map(|r| r.node.clone()).collect();
        document.insert("children".to_string(), encode_children(&roots));

        let mut out = serde_json::to_vec(&Value::Object(document))?;
        if tree.layout.trailing_newline {
            out.extend_from_slice(tree.layout.line_ending());
        }
        Ok(out)
    }

    fn node_factory(&self, tree: &BookmarkTree, now: DateTime<Utc>) -> Box<dyn NodeFactory> {
        let mut taken = HashSet::new();
        let mut highest = 0i64;
        let mut note = |attributes: &Map<String, Value>| {
            if let Some(serial) = attributes.get("id").and_then(Value::as_i64) {
                highest = highest.max(serial);
            }
        };
        note(&tree.metadata);
        tree.walk(&mut |node| {
            taken.insert(node.id.clone());
            note(&node.attributes);
        });
        if let Some(guid) = str_field(&tree.metadata, "guid") {
            taken.insert(guid.to_string());
        }
        Box::new(FirefoxNodeFactory {
            taken,
            next_serial: highest + 1,
            now_micros: now.timestamp_micros(),
        })
    }
}

/// Random GUIDs plus serial ids above the highest one in the store
struct FirefoxNodeFactory {
    taken: HashSet<String>,
    next_serial: i64,
    now_micros: i64,
}

impl FirefoxNodeFactory {
    fn guid(&mut self) -> String {
        let mut rng = rand::rng();
        loop {
            let guid: String = (0..GUID_LENGTH)
                .map(|_| GUID_ALPHABET[rng.random_range(0..GUID_ALPHABET.len())] as char)
                .collect();
            if self.taken.insert(guid.clone()) {
                return guid;
            }
        }
    }

    fn node(&mut self, kind: NodeKind, name: &str, url: Option<&str>) -> BookmarkNode {
        let guid = self.guid();
        let serial = self.next_serial;
        self.next_serial += 1;

        let mut attributes: Map<String, Value> = [
            ("guid", json!(guid)),
            ("title", json!(name)),
            ("index", Value::Null),
            ("dateAdded", json!(self.now_micros)),
            ("lastModified", json!(self.now_micros)),
            ("id", json!(serial)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        match kind {
            NodeKind::Url => {
                attributes.insert("typeCode".to_string(), json!(1));
                attributes.insert("type".to_string(), json!(PLACE_TYPE));
                attributes.insert("uri".to_string(), json!(url.unwrap_or_default()));
            }
            _ => {
                attributes.insert("typeCode".to_string(), json!(2));
                attributes.insert("type".to_string(), json!(CONTAINER_TYPE));
                attributes.insert("children".to_string(), json!([]));
            }
        }
        log::debug!("Allocated Firefox node {} (id {}) for {:?}", guid, serial, name);

        BookmarkNode {
            id: guid,
            kind,
            name: name.to_string(),
            url: url.map(str::to_string),
            children: Vec::new(),
            date_added: Some(self.now_micros.to_string()),
            attributes,
        }
    }
}

impl NodeFactory for FirefoxNodeFactory {
    fn folder(&mut self, name: &str) -> BookmarkNode {
        self.node(NodeKind::Folder, name, None)
    }

    fn url(&mut self, name: &str, url: &str) -> BookmarkNode {
        self.node(NodeKind::Url, name, Some(url))
    }

    fn touch(&self, folder: &mut BookmarkNode) {
        folder
            .attributes
            .insert("lastModified".to_string(), json!(self.now_micros));
    }
}
