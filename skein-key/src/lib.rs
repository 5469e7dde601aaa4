#![warn(missing_docs)]
#![allow(clippy::module_inception)]

//! Cryptographic key suites for the skein protocol.
//!
//! This crate provides the signing and verification primitives the rest of
//! the workspace builds on. Three suites are supported:
//! - `ed25519`
//! - `secp256k1`
//! - `NIST P-256`

mod alg;
mod ed25519;
mod error;
mod key;
mod p256;
mod secp256k1;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use alg::*;
pub use ed25519::*;
pub use error::*;
pub use key::*;
pub use p256::*;
pub use secp256k1::*;
pub use traits::*;
