use crate::error::{PocketmarkError, Result};
use crate::store::codec::StoreFormat;
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Folder,
    Url,
    Separator,
}

/// What a top-level root is for, independent of the store's naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootRole {
    BookmarksBar,
    Other,
    Mobile,
    Menu,
    Tags,
    Unknown,
}

/// A node of a decoded bookmark store
///
/// `attributes` holds every field of the stored node in file order, including
/// the ones mirrored by the typed fields. Codecs treat the typed fields as
/// authoritative when encoding and overwrite the matching attribute slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub url: Option<String>,
    pub children: Vec<BookmarkNode>,
    pub date_added: Option<String>,
    pub attributes: Map<String, Value>,
}

impl BookmarkNode {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Root | NodeKind::Folder)
    }

    pub fn is_folder_named(&self, name: &str) -> bool {
        self.kind == NodeKind::Folder && self.name == name
    }

    /// Pre-order traversal over this node and its descendants
    pub fn walk<F: FnMut(&BookmarkNode)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRoot {
    /// Name of the root in the store (`bookmark_bar`, `toolbarFolder`, ...)
    pub key: String,
    pub role: RootRole,
    pub node: BookmarkNode,
}

/// Byte-level layout details needed to write a store back the way it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub crlf: bool,
    pub trailing_newline: bool,
}

impl Layout {
    pub fn detect(raw: &[u8]) -> Self {
        Self {
            crlf: memchr::memmem::find(raw, b"\r\n").is_some(),
            trailing_newline: raw.ends_with(b"\n"),
        }
    }

    pub fn line_ending(&self) -> &'static [u8] {
        if self.crlf {
            b"\r\n"
        } else {
            b"\n"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkTree {
    pub format: StoreFormat,
    pub roots: Vec<BookmarkRoot>,
    /// Document-level fields (version markers, checksum, places-root attributes)
    pub metadata: Map<String, Value>,
    pub layout: Layout,
    modified: bool,
}

impl BookmarkTree {
    pub fn new(
        format: StoreFormat,
        roots: Vec<BookmarkRoot>,
        metadata: Map<String, Value>,
        layout: Layout,
    ) -> Self {
        Self {
            format,
            roots,
            metadata,
            layout,
            modified: false,
        }
    }

    pub fn root(&self, role: RootRole) -> Option<&BookmarkNode> {
        self.roots.iter().find(|r| r.role == role).map(|r| &r.node)
    }

    pub fn root_mut(&mut self, role: RootRole) -> Option<&mut BookmarkNode> {
        self.roots
            .iter_mut()
            .find(|r| r.role == role)
            .map(|r| &mut r.node)
    }

    pub fn walk<F: FnMut(&BookmarkNode)>(&self, f: &mut F) {
        for root in &self.roots {
            root.node.walk(f);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Fails with `MalformedStore` when two nodes share an id
    pub fn ensure_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut duplicate = None;
        self.walk(&mut |node| {
            if duplicate.is_none() && !seen.insert(node.id.clone()) {
                duplicate = Some(node.id.clone());
            }
        });
        match duplicate {
            Some(id) => Err(PocketmarkError::MalformedStore(format!(
                "duplicate node id {:?}",
                id
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind, children: Vec<BookmarkNode>) -> BookmarkNode {
        BookmarkNode {
            id: id.to_string(),
            kind,
            name: format!("node {}", id),
            url: None,
            children,
            date_added: None,
            attributes: Map::new(),
        }
    }

    fn tree(bar_children: Vec<BookmarkNode>) -> BookmarkTree {
        BookmarkTree::new(
            StoreFormat::Chromium,
            vec![
                BookmarkRoot {
                    key: "bookmark_bar".into(),
                    role: RootRole::BookmarksBar,
                    node: node("1", NodeKind::Root, bar_children),
                },
                BookmarkRoot {
                    key: "other".into(),
                    role: RootRole::Other,
                    node: node("2", NodeKind::Root, vec![]),
                },
            ],
            Map::new(),
            Layout::default(),
        )
    }

    #[test]
    fn test_walk_is_preorder() {
        let t = tree(vec![node(
            "3",
            NodeKind::Folder,
            vec![node("4", NodeKind::Url, vec![])],
        )]);
        let mut ids = Vec::new();
        t.walk(&mut |n| ids.push(n.id.clone()));
        assert_eq!(ids, vec!["1", "3", "4", "2"]);
        assert_eq!(t.node_count(), 4);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let t = tree(vec![node("2", NodeKind::Url, vec![])]);
        let err = t.ensure_unique_ids().unwrap_err();
        assert!(matches!(err, PocketmarkError::MalformedStore(_)));
        assert!(tree(vec![]).ensure_unique_ids().is_ok());
    }

    #[test]
    fn test_root_lookup_by_role() {
        let mut t = tree(vec![]);
        assert_eq!(t.root(RootRole::BookmarksBar).unwrap().id, "1");
        assert!(t.root(RootRole::Mobile).is_none());
        t.root_mut(RootRole::Other).unwrap().name = "Renamed".into();
        assert_eq!(t.root(RootRole::Other).unwrap().name, "Renamed");
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(
            Layout::detect(b"{\r\n}\r\n"),
            Layout {
                crlf: true,
                trailing_newline: true
            }
        );
        assert_eq!(Layout::detect(b"{}"), Layout::default());
        assert_eq!(Layout::detect(b"{}\n").line_ending(), b"\n");
    }
}
