//! Calling-convention signatures.

use std::fmt;

use crate::descriptor::encode_sequence;
use crate::TypeDescriptor;

/// Which side of an interception a signature was introspected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SignatureKind {
    /// A dispatched member. Arguments start with receiver and dispatch key.
    Method,
    /// A block value. Arguments start with the block's own context slot.
    Closure,
}

impl SignatureKind {
    /// Number of implicit leading argument slots for this kind.
    pub fn implicit_slots(self) -> usize {
        match self {
            SignatureKind::Method => 2,
            SignatureKind::Closure => 1,
        }
    }
}

/// A return type plus ordered argument types.
///
/// Argument order is calling-convention slot order. Signatures are immutable
/// once built; callers that need a reduced view take a slice with
/// [`Signature::explicit_arguments`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    kind: SignatureKind,
    return_type: TypeDescriptor,
    argument_types: Vec<TypeDescriptor>,
}

impl Signature {
    pub fn new(
        kind: SignatureKind,
        return_type: TypeDescriptor,
        argument_types: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            kind,
            return_type,
            argument_types,
        }
    }

    /// Method signature. `argument_types` includes receiver and dispatch key.
    pub fn method(return_type: TypeDescriptor, argument_types: Vec<TypeDescriptor>) -> Self {
        Self::new(SignatureKind::Method, return_type, argument_types)
    }

    /// Closure signature. `argument_types` includes the context slot.
    pub fn closure(return_type: TypeDescriptor, argument_types: Vec<TypeDescriptor>) -> Self {
        Self::new(SignatureKind::Closure, return_type, argument_types)
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// All argument slots, implicit ones included.
    pub fn argument_types(&self) -> &[TypeDescriptor] {
        &self.argument_types
    }

    /// Arguments with the kind's implicit leading slots removed.
    ///
    /// Returns `None` when the signature is shorter than its implicit prefix.
    pub fn explicit_arguments(&self) -> Option<&[TypeDescriptor]> {
        self.argument_types.get(self.kind.implicit_slots()..)
    }

    /// Canonical encoding: return type followed by every argument.
    pub fn encoding(&self) -> String {
        let mut out = String::new();
        self.return_type.write_encoding(&mut out);
        out.push_str(&encode_sequence(&self.argument_types));
        out
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoding())
    }
}
