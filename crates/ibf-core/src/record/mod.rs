//! Log record decoding.
//!
//! The module follows a layered structure:
//! - `layout`: byte widths, offsets and discriminator values (source of truth)
//! - `reader`: bounds-checked sequential reads and device encodings
//! - `registry`: closed sets of record kinds, flags and alarm codes
//! - `model`: immutable record values
//! - `parser`: classification and per-kind payload decoding
//! - `error`: explicit, per-record errors
//!
//! A record window starts with an 18-byte header whose first byte selects a
//! history record or a pump alarm. History records carry a sub-kind and a
//! flag bitmask, then a payload whose shape depends on the sub-kind. Unknown
//! record kinds and history sub-kinds are rejected; unknown flag bits and
//! alarm ids are tolerated.
//!
//! Decoding is pure and holds no state between calls.

pub mod error;
pub mod layout;
pub mod model;
pub mod options;
pub mod parser;
pub mod reader;
pub mod registry;

pub use error::DecodeError;
pub use options::{DecodeOptions, SizeCheck};
pub use parser::{decode_log_record, decode_log_record_with};
