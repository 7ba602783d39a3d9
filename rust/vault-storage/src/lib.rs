//! Storage network client for the upload vault.
//!
//! Content lives in *spaces*: namespaces identified by the `did:key` of a
//! freshly generated Ed25519 key. The [`Client`] holds those keys and can
//! therefore delegate upload rights on its spaces to other principals.
//! Every write to the remote [`Service`] carries such a delegation as proof.
//!
//! Two services are provided:
//!
//! - [`MemoryService`], an in-process emulation used in tests and local runs.
//! - [`RestService`], an HTTP transport for a remote deployment.
//!
//! Uploaded content is addressed by a [`ContentId`]: a CIDv1 over the raw
//! bytes with a sha2-256 multihash.

mod error;
pub use error::*;

mod content;
pub use content::*;

mod space;
pub use space::*;

mod network;
pub use network::*;

mod service;
pub use service::*;

mod client;
pub use client::*;
