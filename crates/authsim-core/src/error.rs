//! Error types for catalog construction and CBOR encoding.
//!
//! Engine commands are total and have no error type. The only fallible
//! operations are building a catalog and moving catalogs or snapshots in and
//! out of CBOR.

use thiserror::Error;

/// A step catalog failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog contains no steps.
    #[error("step catalog is empty")]
    Empty,

    /// A step id was zero. Ids are positive.
    #[error("step at index {index} has id 0")]
    ZeroId {
        /// Position of the offending step in the catalog.
        index: usize,
    },

    /// Two steps share an id.
    #[error("duplicate step id {id}")]
    DuplicateId {
        /// The repeated id.
        id: u32,
    },

    /// Ids must increase in catalog order.
    #[error("step id {id} at index {index} does not follow id {previous}")]
    OutOfOrder {
        /// Position of the offending step in the catalog.
        index: usize,
        /// Id of the offending step.
        id: u32,
        /// Id of the step before it.
        previous: u32,
    },

    /// A step has a zero nominal duration.
    #[error("step {id} has a zero nominal duration")]
    ZeroDuration {
        /// Id of the offending step.
        id: u32,
    },
}

/// Encoding or decoding CBOR failed.
#[derive(Debug, Error)]
pub enum CodecError {
    /// CBOR encoding failed.
    #[error("CBOR encode failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decode failed: {0}")]
    Decode(String),

    /// The decoded catalog is not valid.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}
