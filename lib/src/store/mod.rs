//! Reading and writing browser bookmark stores.

pub mod backup;
pub mod codec;
pub mod locate;
pub mod writer;

pub use backup::BackupManager;
pub use codec::{NodeFactory, StoreCodec, StoreFormat};
pub use locate::{Browser, HomeDirs, Os, ProfileLocator};
