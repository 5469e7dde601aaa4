#![warn(missing_docs)]
#![allow(clippy::module_inception)]

//! Decentralized identifier (DID) resolution for the skein protocol.
//!
//! This crate turns a DID string into the signing key, handle and service
//! endpoint the rest of the protocol trusts. Three DID methods are
//! supported:
//! - `did:plc` — looked up in a central directory over HTTP
//! - `did:web` — fetched from the identifier's own host at a well-known path
//! - `did:key` — derived deterministically from the identifier itself
//!
//! Resolved documents are held in an in-process cache with a staleness and
//! expiry policy; stale entries are served while a refresh is attempted,
//! expired entries are never served.

mod cache;
mod config;
mod did;
mod document;
mod error;
mod multikey;
mod resolver;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use cache::*;
pub use config::*;
pub use did::*;
pub use document::*;
pub use error::*;
pub use multikey::*;
pub use resolver::*;
