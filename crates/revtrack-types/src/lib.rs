//! Foundation types for revtrack.
//!
//! Every other revtrack crate depends on `revtrack-types`.
//!
//! # Key Types
//!
//! - [`DocumentId`]: Normalized logical path identifying one tracked document
//! - [`ContentDigest`]: Domain-separated BLAKE3 digest of a text version

pub mod digest;
pub mod error;
pub mod identity;

pub use digest::ContentDigest;
pub use error::TypeError;
pub use identity::DocumentId;
