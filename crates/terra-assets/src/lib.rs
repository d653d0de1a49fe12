//! Asset streaming: fetch capabilities, the OBJ mesh loader, and the asset database.
//!
//! The database is driven from a single owning thread. Fetch sources may
//! complete on worker threads; completions are marshaled back through
//! channels and applied when the owner calls
//! [`AssetDatabase::query_ready`] (or [`MeshLoader::poll`] directly).

mod database;
mod descriptor;
mod error;
mod loader;
mod local;
mod memory;
mod source;

pub use database::{AssetDatabase, AssetRecord, LoadState, RetryPolicy};
pub use descriptor::{AssetDescriptor, SourceKind};
pub use error::AssetError;
pub use loader::{MeshLoadCallback, MeshLoadEvent, MeshLoader, ObjMeshLoader, create_obj_loader};
pub use local::LocalFileSource;
pub use memory::{DeliveryMode, MemoryFileSource};
pub use source::{
    AsyncRequest, CancelToken, ErrorReason, FileSource, Resource, ResourceKind, Response,
    ResponseCallback, ResponseError, SourceRegistry,
};
