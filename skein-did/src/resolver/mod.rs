use async_trait::async_trait;

use crate::{Did, DidDocument, DidResult};

mod key;
mod plc;
mod resolver;
mod web;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A resolution strategy for one DID method.
///
/// Implementations fetch (or derive) the raw document for a DID of their
/// method. They do not cache and do not validate that the document's `id`
/// matches the requested DID; [`DidResolver`][crate::DidResolver] layers
/// both on top.
#[async_trait]
pub trait MethodResolver: Send + Sync {
    /// The method tag this resolver handles, e.g. `plc`.
    fn method(&self) -> &'static str;

    /// Resolves the document for a DID of this method.
    async fn resolve(&self, did: &Did) -> DidResult<DidDocument>;
}

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use key::*;
pub use plc::*;
pub use resolver::*;
pub use web::*;
