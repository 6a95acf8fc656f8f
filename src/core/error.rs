//! Domain error taxonomy shared by the analysis and rewrite engines.
//!
//! Residual tokens and symbolic timer thresholds are informational and
//! carried in reports, not here. Everything in this enum aborts at least
//! the current instance of a batch operation.

use crate::core::catalog::CategoryCode;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LogicError {
    /// The allocator could not satisfy a request within capacity bounds.
    /// The requesting operation is aborted with no partial mutation.
    #[error(
        "capacity exhausted for {category}: requested {requested} free slot(s), only {available} available"
    )]
    CapacityExhausted {
        category: CategoryCode,
        requested: usize,
        available: usize,
    },

    /// Both timer thresholds are non-zero; the two timing behaviors are
    /// mutually exclusive and no destination-family equivalent exists.
    #[error("{instance}: pickup ({pickup}) and dropoff ({dropoff}) are both non-zero; no equivalent exists")]
    InvalidConversionState {
        instance: String,
        pickup: String,
        dropoff: String,
    },

    /// More than one line defines the same symbol on its left-hand side.
    #[error("ambiguous definition: {symbol} is defined on {count} lines")]
    AmbiguousDefinition { symbol: String, count: usize },

    /// A required defining line is absent from the document.
    #[error("missing definition for {symbol}")]
    MissingDefinition { symbol: String },

    #[error("unknown category code: {0}")]
    UnknownCategory(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// An instance number falls outside its category's capacity bounds.
    #[error("{token}: number out of range for {category} (bounds {low}-{high})")]
    NumberOutOfRange {
        token: String,
        category: CategoryCode,
        low: u16,
        high: u16,
    },

    /// Domain remap requested for a category with no counterpart pool.
    #[error("{category} has no counterpart in the other domain")]
    NoCounterpart { category: CategoryCode },

    /// A rename destination already exists in the document. Proceeding
    /// would merge two unrelated signals.
    #[error("{destination} is already in use; refusing to merge {moved} into it")]
    DestinationInUse { moved: String, destination: String },

    /// Structural edit referenced a line identity that no longer exists.
    #[error("unknown line identity")]
    UnknownLine,

    /// A rename mapping could not be compiled into a substitution pass.
    #[error("invalid rename mapping: {0}")]
    BadRenameMapping(String),
}
