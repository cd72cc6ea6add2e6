//! Chromium-family `Bookmarks` file (Chrome, Edge, Chromium).
//!
//! The browser writes the file with its own pretty printer: sorted keys,
//! three-space indentation and arrays kept on the line of their first
//! element. [`ChromiumFormatter`] reproduces that layout so an untouched
//! store encodes back to the same bytes.

use super::{parse_document, str_field, take_children, NodeFactory, StoreCodec, StoreFormat};
use crate::error::{PocketmarkError, Result};
use crate::models::{BookmarkNode, BookmarkRoot, BookmarkTree, Layout, NodeKind, RootRole};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter};
use serde_json::{json, Map, Value};
use std::io;
use uuid::Uuid;

const SUPPORTED_VERSION: u64 = 1;

/// Microseconds between 1601-01-01 and 1970-01-01
const WINDOWS_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

const INDENT: &[u8] = b"   ";

/// Chromium bookmark file codec
pub struct ChromiumCodec;

/// Timestamp as Chromium stores it: microseconds since 1601-01-01 UTC, as a string
pub fn chromium_timestamp(now: DateTime<Utc>) -> String {
    (now.timestamp_micros() + WINDOWS_EPOCH_OFFSET_MICROS).to_string()
}

fn root_role(key: &str) -> RootRole {
    match key {
        "bookmark_bar" => RootRole::BookmarksBar,
        "other" => RootRole::Other,
        "synced" => RootRole::Mobile,
        _ => RootRole::Unknown,
    }
}

fn malformed(msg: impl Into<String>) -> PocketmarkError {
    PocketmarkError::MalformedStore(msg.into())
}

fn decode_node(value: Value, is_root: bool) -> Result<BookmarkNode> {
    let Value::Object(mut attributes) = value else {
        return Err(malformed("bookmark node is not an object"));
    };

    let id = str_field(&attributes, "id")
        .ok_or_else(|| malformed("bookmark node without a string \"id\""))?
        .to_string();
    let kind = match str_field(&attributes, "type") {
        Some("folder") if is_root => NodeKind::Root,
        Some("folder") => NodeKind::Folder,
        Some("url") => NodeKind::Url,
        Some(other) => {
            return Err(malformed(format!(
                "node {:?} has unknown type {:?}",
                id, other
            )))
        }
        None => return Err(malformed(format!("node {:?} has no type", id))),
    };
    let name = str_field(&attributes, "name").unwrap_or_default().to_string();
    let url = str_field(&attributes, "url").map(str::to_string);
    if kind == NodeKind::Url && url.is_none() {
        return Err(malformed(format!("url node {:?} has no url", id)));
    }
    let date_added = str_field(&attributes, "date_added").map(str::to_string);

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

fn encode_node(node: &BookmarkNode) -> Value {
    let mut object = node.attributes.clone();
    if node.is_container() && (object.contains_key("children") || !node.children.is_empty()) {
        object.insert(
            "children".to_string(),
            Value::Array(node.children.iter().map(encode_node).collect()),
        );
    }
    if let Some(date_added) = &node.date_added {
        object.insert("date_added".to_string(), Value::from(date_added.as_str()));
    }
    object.insert("id".to_string(), Value::from(node.id.as_str()));
    object.insert("name".to_string(), Value::from(node.name.as_str()));
    let node_type = match node.kind {
        NodeKind::Url => "url",
        _ => "folder",
    };
    object.insert("type".to_string(), Value::from(node_type));
    if let Some(url) = &node.url {
        object.insert("url".to_string(), Value::from(url.as_str()));
    }
    Value::Object(object)
}

impl StoreCodec for ChromiumCodec {
    fn format(&self) -> StoreFormat {
        StoreFormat::Chromium
    }

    fn decode(&self, raw: &[u8]) -> Result<BookmarkTree> {
        let mut document = parse_document(raw)?;

        match document.get("version") {
            Some(version) if version.as_u64() == Some(SUPPORTED_VERSION) => {}
            Some(version) => {
                return Err(malformed(format!(
                    "unsupported bookmarks version {}",
                    version
                )))
            }
            None => return Err(malformed("missing \"version\" marker")),
        }

        let roots = match document.get_mut("roots").map(Value::take) {
            Some(Value::Object(roots)) => roots,
            Some(_) => return Err(malformed("\"roots\" is not an object")),
            None => return Err(malformed("missing \"roots\" marker")),
        };
        let roots = roots
            .into_iter()
            .map(|(key, value)| {
                let node = decode_node(value, true)?;
                Ok(BookmarkRoot {
                    role: root_role(&key),
                    key,
                    node,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tree = BookmarkTree::new(StoreFormat::Chromium, roots, document, Layout::detect(raw));
        tree.ensure_unique_ids()?;
        log::debug!("Decoded {} Chromium bookmark nodes", tree.node_count());
        Ok(tree)
    }

    fn encode(&self, tree: &BookmarkTree) -> Result<Vec<u8>> {
        let mut roots = Some(
            tree.roots
                .iter()
                .map(|root| (root.key.clone(), encode_node(&root.node)))
                .collect::<Map<String, Value>>(),
        );

        let mut document = Map::new();
        for (key, value) in &tree.metadata {
            // The stored checksum no longer matches once the tree is changed
            if key == "checksum" && tree.is_modified() {
                continue;
            }
            let value = if key == "roots" {
                roots
                    .take()
                    .map(Value::Object)
                    .unwrap_or_else(|| value.clone())
            } else {
                value.clone()
            };
            document.insert(key.clone(), value);
        }
        if let Some(roots) = roots {
            document.insert("roots".to_string(), Value::Object(roots));
        }

        let newline = tree.layout.line_ending();
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, ChromiumFormatter::new(newline));
        Value::Object(document).serialize(&mut serializer)?;
        if tree.layout.trailing_newline {
            out.extend_from_slice(newline);
        }
        Ok(out)
    }

    fn node_factory(&self, tree: &BookmarkTree, now: DateTime<Utc>) -> Box<dyn NodeFactory> {
        let mut highest = 0u64;
        tree.walk(&mut |node| {
            if let Ok(id) = node.id.parse::<u64>() {
                highest = highest.max(id);
            }
        });
        Box::new(ChromiumNodeFactory {
            next_id: highest + 1,
            timestamp: chromium_timestamp(now),
        })
    }
}

/// Sequential ids continuing after the highest id in the store
struct ChromiumNodeFactory {
    next_id: u64,
    timestamp: String,
}

impl ChromiumNodeFactory {
    fn allocate_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    fn node(&mut self, kind: NodeKind, name: &str, url: Option<&str>) -> BookmarkNode {
        let id = self.allocate_id();
        let guid = Uuid::new_v4().to_string();
        // Keys in the sorted order Chromium writes them
        let attributes: Map<String, Value> = match kind {
            NodeKind::Url => [
                ("date_added", json!(self.timestamp)),
                ("date_last_used", json!("0")),
                ("guid", json!(guid)),
                ("id", json!(id)),
                ("name", json!(name)),
                ("type", json!("url")),
                ("url", json!(url.unwrap_or_default())),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            _ => [
                ("children", json!([])),
                ("date_added", json!(self.timestamp)),
                ("date_last_used", json!("0")),
                ("date_modified", json!(self.timestamp)),
                ("guid", json!(guid)),
                ("id", json!(id)),
                ("name", json!(name)),
                ("type", json!("folder")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        };
        log::debug!("Allocated Chromium node id {} for {:?}", id, name);
        BookmarkNode {
            id,
            kind,
            name: name.to_string(),
            url: url.map(str::to_string),
            children: Vec::new(),
            date_added: Some(self.timestamp.clone()),
            attributes,
        }
    }
}

impl NodeFactory for ChromiumNodeFactory {
    fn folder(&mut self, name: &str) -> BookmarkNode {
        self.node(NodeKind::Folder, name, None)
    }

    fn url(&mut self, name: &str, url: &str) -> BookmarkNode {
        self.node(NodeKind::Url, name, Some(url))
    }

    fn touch(&self, folder: &mut BookmarkNode) {
        folder
            .attributes
            .insert("date_modified".to_string(), json!(self.timestamp));
    }
}

/// `serde_json` formatter matching Chromium's pretty JSON writer
pub struct ChromiumFormatter {
    depth: usize,
    newline: &'static [u8],
}

impl ChromiumFormatter {
    pub fn new(newline: &'static [u8]) -> Self {
        Self { depth: 0, newline }
    }

    fn indent<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for _ in 0..self.depth {
            writer.write_all(INDENT)?;
        }
        Ok(())
    }
}

impl Formatter for ChromiumFormatter {
    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        writer.write_all(b"{")?;
        writer.write_all(self.newline)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        writer.write_all(self.newline)?;
        self.indent(writer)?;
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
            writer.write_all(self.newline)?;
        }
        self.indent(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"[ ")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" ]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped: &[u8] = match ch {
                '<' => b"\\u003C",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..index].as_bytes())?;
            writer.write_all(escaped)?;
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        let escaped: &[u8] = match char_escape {
            CharEscape::Quote => b"\\\"",
            CharEscape::ReverseSolidus => b"\\\\",
            CharEscape::Solidus => b"\\/",
            CharEscape::Backspace => b"\\b",
            CharEscape::FormFeed => b"\\f",
            CharEscape::LineFeed => b"\\n",
            CharEscape::CarriageReturn => b"\\r",
            CharEscape::Tab => b"\\t",
            CharEscape::AsciiControl(byte) => return write!(writer, "\\u{:04X}", byte),
        };
        writer.write_all(escaped)
    }
}
