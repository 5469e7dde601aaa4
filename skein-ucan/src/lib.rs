#![warn(missing_docs)]
#![allow(clippy::module_inception)]

//! Scoped capability tokens for the skein protocol.
//!
//! A capability is a (resource, ability) pair. Principals delegate
//! capabilities to each other through signed tokens; each token embeds the
//! proofs that authorize its issuer, forming a chain back to a self-signed
//! root. This crate provides:
//! - the resource/ability model and the delegation rules between a parent
//!   and child capability, in two historical resource-path shapes
//! - the compact signed token format, its builder and codec
//! - [`CapabilityStore`], the issuing side: holds a principal's keypair and
//!   accumulated proofs, finds the broadest proof covering a request and
//!   mints new tokens
//! - [`ChainVerifier`], the accepting side: verifies a presented token's
//!   signatures, validity window, audience and capability coverage

mod ability;
mod builder;
mod capability;
mod error;
mod resource;
mod semantics;
mod store;
mod token;
mod verify;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use ability::*;
pub use builder::*;
pub use capability::*;
pub use error::*;
pub use resource::*;
pub use semantics::*;
pub use store::*;
pub use token::*;
pub use verify::*;
