//! hookcheck: calling-convention compatibility for method interception
//!
//! Before an interceptor is attached to a dynamically dispatched member, its
//! calling convention has to line up with the member's. A mismatch does not
//! fail loudly at install time; it corrupts the call stack on the first call.
//! This crate is the gate that runs first.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Checker                    │
//! │                                             │
//! │  config      - reserved / lifecycle keys    │
//! │  check       - pre-checks, structural match │
//! │  diagnostic  - structured rejections        │
//! │                                             │
//! ├─────────────────────────────────────────────┤
//! │  introspect  - runtime queries (trait)      │
//! │  hookcheck-types - descriptors, signatures  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//!
//! - `before` / `after`: the interceptor returns `void` and takes either no
//!   parameters or exactly the member's.
//! - `instead`: the interceptor returns the member's type and takes an
//!   `original` block first, followed by the member's parameters. The
//!   `original` block's own signature must match the member's.

pub mod check;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod introspect;

pub use check::{check, check_signatures, Checker};
pub use config::Policy;
pub use diagnostic::{Diagnostic, Incompatibility, Mismatch, MismatchKind, PolicyReason, Side};
pub use dispatch::{DispatchKey, Mode};
pub use introspect::{HookTarget, Introspector, RuntimeType};

pub use hookcheck_types::{
    parse_signature, parse_type, EncodingError, Signature, SignatureKind, TypeDescriptor,
};
