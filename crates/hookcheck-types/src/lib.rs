//! Calling-convention data model for hookcheck.
//!
//! - [`TypeDescriptor`]: one value's encoding, with callables optionally
//!   carrying their own [`Signature`]
//! - [`Signature`]: return type plus ordered argument slots, tagged with the
//!   [`SignatureKind`] it was introspected from
//! - [`parse_signature`] / [`parse_type`]: decode runtime type-encoding text

mod descriptor;
mod encoding;
mod signature;

pub use descriptor::{encode_sequence, TypeDescriptor};
pub use encoding::{parse_signature, parse_type, EncodingError};
pub use signature::{Signature, SignatureKind};
