//! Rejection diagnostics.
//!
//! Every variant carries structured fields. Human text comes from
//! [`render`], which keeps string assembly out of the checker.

mod render;

pub use render::describe;

use std::fmt;

use hookcheck_types::{SignatureKind, TypeDescriptor};
use serde::Serialize;
use thiserror::Error;

use crate::{DispatchKey, Mode};

/// Why a check rejected an interception. Every rejection is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Diagnostic {
    /// The pairing is disallowed outright.
    #[error("Unsupported: {0}")]
    PolicyRejected(PolicyReason),

    /// A type object reached the instance entry point.
    #[error("Cannot intercept a type through the instance entry point; target the type directly")]
    TypePassedAsInstance,

    /// The target type has no member for the key.
    #[error("Type '{type_name}' has no member '{key}'")]
    NoMatchingMember { type_name: String, key: DispatchKey },

    /// One side's calling convention could not be decoded.
    #[error("Missing {side} signature")]
    MissingSignature { side: Side },

    /// The signatures are structurally incompatible for the mode.
    #[error("{0}")]
    IncompatibleSignature(Incompatibility),

    /// A collaborator broke a guarantee the checker relies on.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(InvariantViolation),
}

impl Diagnostic {
    /// True for collaborator bugs, false for caller mistakes.
    pub fn is_internal(&self) -> bool {
        matches!(self, Diagnostic::InternalInvariantViolation(_))
    }

    pub fn mismatch_kind(&self) -> Option<MismatchKind> {
        match self {
            Diagnostic::IncompatibleSignature(incompatibility) => Some(incompatibility.kind()),
            _ => None,
        }
    }

    pub fn policy_reason(&self) -> Option<PolicyReason> {
        match self {
            Diagnostic::PolicyRejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    /// Identity-management member (retain, release, autorelease).
    ReservedKey,
    /// Teardown member on a type without introspectable lifecycle hooks.
    LifecycleOnUnmanagedType,
    /// Type is a synthetic subclass installed by key-value observing.
    AlreadyInstrumentedBySystemObserver,
}

impl fmt::Display for PolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyReason::ReservedKey => "reserved identity-management member",
            PolicyReason::LifecycleOnUnmanagedType => "teardown member of an unmanaged type",
            PolicyReason::AlreadyInstrumentedBySystemObserver => {
                "type is already instrumented by key-value observing"
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Target,
    Interceptor,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Target => "target",
            Side::Interceptor => "interceptor",
        })
    }
}

/// A structural mismatch plus the context needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incompatibility {
    pub mode: Mode,
    /// The target is the teardown member.
    pub lifecycle: bool,
    pub mismatch: Mismatch,
}

impl Incompatibility {
    pub fn kind(&self) -> MismatchKind {
        self.mismatch.kind()
    }
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

/// What did not line up, with expected (target-derived) and actual
/// (interceptor-derived) values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mismatch {
    ReturnType {
        expected: TypeDescriptor,
        actual: TypeDescriptor,
    },
    Parameters {
        expected: Vec<TypeDescriptor>,
        actual: Vec<TypeDescriptor>,
    },
    /// `instead` only. Counts exclude the `original` slot.
    Arity { expected: usize, actual: usize },
    /// `instead` only. The slot reserved for `original` is not callable.
    NotACallable { actual: TypeDescriptor },
    OriginalReturnType {
        expected: TypeDescriptor,
        actual: TypeDescriptor,
    },
    OriginalParameters {
        expected: Vec<TypeDescriptor>,
        actual: Vec<TypeDescriptor>,
    },
}

impl Mismatch {
    pub fn kind(&self) -> MismatchKind {
        match self {
            Mismatch::ReturnType { .. } => MismatchKind::ReturnType,
            Mismatch::Parameters { .. } => MismatchKind::Parameters,
            Mismatch::Arity { .. } => MismatchKind::Arity,
            Mismatch::NotACallable { .. } => MismatchKind::NotACallable,
            Mismatch::OriginalReturnType { .. } => MismatchKind::OriginalReturnType,
            Mismatch::OriginalParameters { .. } => MismatchKind::OriginalParameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    ReturnType,
    Parameters,
    Arity,
    NotACallable,
    OriginalReturnType,
    OriginalParameters,
}

/// Collaborator output that contradicts its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("runtime type of the instance could not be discovered")]
    UnknownRuntimeType,

    #[error("{side} signature has kind {actual:?}, expected {expected:?}")]
    WrongSignatureKind {
        side: Side,
        expected: SignatureKind,
        actual: SignatureKind,
    },

    #[error("{side} signature has {actual} argument slots, fewer than its {required} implicit ones")]
    MissingImplicitSlots {
        side: Side,
        required: usize,
        actual: usize,
    },

    #[error("`original` parameter is callable but its signature is opaque")]
    OpaqueOriginalSignature,

    #[error("`original` signature has no context slot")]
    OriginalMissingContextSlot,
}
