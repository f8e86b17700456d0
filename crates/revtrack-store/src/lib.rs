//! Patch storage for revtrack.
//!
//! The core never touches the filesystem directly. Everything it reads or
//! writes goes through a [`Host`], the collaborator that owns documents and
//! blob storage. [`PatchStore`] layers the one-patch-per-document contract on
//! top of a host.
//!
//! # Hosts
//!
//! - [`InMemoryHost`] -- `HashMap`-backed host for tests and embedding
//! - [`FsHost`] -- directory-rooted host with atomic writes
//!
//! # Design Rules
//!
//! 1. A document has at most one stored patch, at a path derived from its
//!    identity. There is no index.
//! 2. Saving overwrites; the last write wins.
//! 3. Writes are all-or-nothing. A failed write leaves the previous artifact
//!    in place.
//! 4. Nothing is cached. Every load and save round-trips through the host.

pub mod error;
pub mod fs;
pub mod host;
pub mod memory;
pub mod patch_store;

pub use error::{StoreError, StoreResult};
pub use fs::FsHost;
pub use host::{Host, DEFAULT_PATCH_SUFFIX};
pub use memory::InMemoryHost;
pub use patch_store::{PatchStore, StoredPatch};
