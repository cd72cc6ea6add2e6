pub mod item;
pub mod tree;

pub use item::{SkippedItem, SourceItem};
pub use tree::{BookmarkNode, BookmarkRoot, BookmarkTree, Layout, NodeKind, RootRole};
