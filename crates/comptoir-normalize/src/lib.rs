//! # Comptoir Normalize
//!
//! Presentation normalization for Comptoir records: raw status and
//! category codes to display metadata, plus lenient date and amount
//! coercion for document rendering.
//!
//! Every function here is total and stateless. Malformed input
//! degrades to a visible fallback instead of an error, because a
//! half-broken record must still render on an invoice listing or a PDF.

pub mod category;
pub mod coerce;
pub mod status;
pub mod view;

// Re-exports
pub use category::{UNKNOWN_CATEGORY, map_category};
pub use coerce::{format_amount, parse_date_safe};
pub use status::{ColorTag, StatusDescriptor, describe_status};
pub use view::DocumentView;
