//! Calling-convention type descriptors.
//!
//! A [`TypeDescriptor`] names how one value travels through a call: as a
//! primitive in a register, as a pointer, as a composite laid out in memory,
//! or as a callable block. Every descriptor has a canonical encoding
//! (`q`, `d`, `@`, `:`, `{CGPoint=dd}`, `@?`, ...) and two descriptors are
//! equal exactly when their encodings are byte-identical.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use crate::Signature;

/// One value's calling-convention type.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDescriptor {
    /// No value (`v`).
    Void,
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    /// NUL-terminated C string (`*`).
    CString,
    /// Object reference (`@`).
    Object,
    /// Type object (`#`).
    Class,
    /// Dispatch key (`:`).
    Selector,
    /// Pointer to another type (`^T`).
    Pointer(Box<TypeDescriptor>),
    /// Composite passed by value (`{name=...}`).
    Struct {
        name: String,
        fields: Vec<TypeDescriptor>,
    },
    /// Overlapping composite (`(name=...)`).
    Union {
        name: String,
        fields: Vec<TypeDescriptor>,
    },
    /// Fixed-size array (`[Nt]`).
    Array {
        len: usize,
        element: Box<TypeDescriptor>,
    },
    /// Callable block (`@?`).
    ///
    /// Carries the block's own signature when the encoding exposes it. The
    /// nested signature does not take part in equality: every callable
    /// encodes as `@?`.
    Callable(Option<Box<Signature>>),
    /// Encoding the runtime could not name (`?`).
    Unknown,
}

impl TypeDescriptor {
    /// Create a pointer descriptor.
    pub fn pointer(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer(Box::new(pointee))
    }

    /// Create a by-value struct descriptor.
    pub fn structure(name: impl Into<String>, fields: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Struct {
            name: name.into(),
            fields,
        }
    }

    /// Create a union descriptor.
    pub fn union(name: impl Into<String>, fields: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Union {
            name: name.into(),
            fields,
        }
    }

    /// Create a fixed-size array descriptor.
    pub fn array(len: usize, element: TypeDescriptor) -> Self {
        TypeDescriptor::Array {
            len,
            element: Box::new(element),
        }
    }

    /// Create a callable descriptor that exposes its signature.
    pub fn callable(signature: Signature) -> Self {
        TypeDescriptor::Callable(Some(Box::new(signature)))
    }

    /// Create a callable descriptor with an opaque signature.
    pub fn opaque_callable() -> Self {
        TypeDescriptor::Callable(None)
    }

    /// Check if this descriptor is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }

    /// Check if this descriptor is tagged callable.
    pub fn is_callable(&self) -> bool {
        matches!(self, TypeDescriptor::Callable(_))
    }

    /// The nested signature of a callable, when resolvable.
    pub fn nested_signature(&self) -> Option<&Signature> {
        match self {
            TypeDescriptor::Callable(signature) => signature.as_deref(),
            _ => None,
        }
    }

    /// Canonical encoding of this descriptor.
    pub fn encoding(&self) -> String {
        let mut out = String::new();
        self.write_encoding(&mut out);
        out
    }

    pub(crate) fn write_encoding(&self, out: &mut String) {
        match self {
            TypeDescriptor::Void => out.push('v'),
            TypeDescriptor::Bool => out.push('B'),
            TypeDescriptor::Char => out.push('c'),
            TypeDescriptor::UChar => out.push('C'),
            TypeDescriptor::Short => out.push('s'),
            TypeDescriptor::UShort => out.push('S'),
            TypeDescriptor::Int => out.push('i'),
            TypeDescriptor::UInt => out.push('I'),
            TypeDescriptor::Long => out.push('l'),
            TypeDescriptor::ULong => out.push('L'),
            TypeDescriptor::LongLong => out.push('q'),
            TypeDescriptor::ULongLong => out.push('Q'),
            TypeDescriptor::Float => out.push('f'),
            TypeDescriptor::Double => out.push('d'),
            TypeDescriptor::CString => out.push('*'),
            TypeDescriptor::Object => out.push('@'),
            TypeDescriptor::Class => out.push('#'),
            TypeDescriptor::Selector => out.push(':'),
            TypeDescriptor::Pointer(pointee) => {
                out.push('^');
                pointee.write_encoding(out);
            }
            TypeDescriptor::Struct { name, fields } => {
                write_composite(out, '{', '}', name, fields);
            }
            TypeDescriptor::Union { name, fields } => {
                write_composite(out, '(', ')', name, fields);
            }
            TypeDescriptor::Array { len, element } => {
                out.push('[');
                out.push_str(&len.to_string());
                element.write_encoding(out);
                out.push(']');
            }
            TypeDescriptor::Callable(_) => out.push_str("@?"),
            TypeDescriptor::Unknown => out.push('?'),
        }
    }
}

fn write_composite(out: &mut String, open: char, close: char, name: &str, fields: &[TypeDescriptor]) {
    out.push(open);
    out.push_str(name);
    if !fields.is_empty() {
        out.push('=');
        for field in fields {
            field.write_encoding(out);
        }
    }
    out.push(close);
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        use TypeDescriptor::*;
        match (self, other) {
            (Pointer(a), Pointer(b)) => a == b,
            (Struct { name: a, fields: fa }, Struct { name: b, fields: fb })
            | (Union { name: a, fields: fa }, Union { name: b, fields: fb }) => {
                a == b && fa == fb
            }
            (Array { len: a, element: ea }, Array { len: b, element: eb }) => a == b && ea == eb,
            (Callable(_), Callable(_)) => true,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoding().hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoding())
    }
}

/// Concatenated encodings of a descriptor sequence (`@:qq`).
pub fn encode_sequence(types: &[TypeDescriptor]) -> String {
    let mut out = String::new();
    for ty in types {
        ty.write_encoding(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cg_point() -> TypeDescriptor {
        TypeDescriptor::structure("CGPoint", vec![TypeDescriptor::Double, TypeDescriptor::Double])
    }

    #[test]
    fn test_primitive_encodings() {
        assert_eq!(TypeDescriptor::Void.encoding(), "v");
        assert_eq!(TypeDescriptor::LongLong.encoding(), "q");
        assert_eq!(TypeDescriptor::Double.encoding(), "d");
        assert_eq!(TypeDescriptor::Selector.encoding(), ":");
        assert_eq!(TypeDescriptor::opaque_callable().encoding(), "@?");
    }

    #[test]
    fn test_composite_encodings() {
        let rect = TypeDescriptor::structure(
            "CGRect",
            vec![
                cg_point(),
                TypeDescriptor::structure(
                    "CGSize",
                    vec![TypeDescriptor::Double, TypeDescriptor::Double],
                ),
            ],
        );
        assert_eq!(rect.encoding(), "{CGRect={CGPoint=dd}{CGSize=dd}}");
        assert_eq!(TypeDescriptor::structure("Opaque", vec![]).encoding(), "{Opaque}");
        assert_eq!(
            TypeDescriptor::pointer(TypeDescriptor::Int).encoding(),
            "^i"
        );
        assert_eq!(TypeDescriptor::array(4, TypeDescriptor::Float).encoding(), "[4f]");
        assert_eq!(
            TypeDescriptor::union("U", vec![TypeDescriptor::Int, TypeDescriptor::Float]).encoding(),
            "(U=if)"
        );
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(cg_point(), cg_point());
        assert_ne!(
            cg_point(),
            TypeDescriptor::structure("CGSize", vec![TypeDescriptor::Double, TypeDescriptor::Double])
        );
        assert_ne!(TypeDescriptor::Int, TypeDescriptor::LongLong);
        assert_ne!(
            TypeDescriptor::pointer(TypeDescriptor::Int),
            TypeDescriptor::pointer(TypeDescriptor::Char)
        );
    }

    #[test]
    fn test_callable_equality_ignores_nested_signature() {
        let nested = Signature::closure(TypeDescriptor::Void, vec![TypeDescriptor::opaque_callable()]);
        assert_eq!(TypeDescriptor::callable(nested), TypeDescriptor::opaque_callable());
        assert_ne!(TypeDescriptor::opaque_callable(), TypeDescriptor::Object);
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(TypeDescriptor::opaque_callable());
        let nested = Signature::closure(TypeDescriptor::Int, vec![TypeDescriptor::opaque_callable()]);
        assert!(!set.insert(TypeDescriptor::callable(nested)));
        assert!(set.insert(TypeDescriptor::Object));
    }

    #[test]
    fn test_encode_sequence() {
        let types = vec![
            TypeDescriptor::Object,
            TypeDescriptor::Selector,
            TypeDescriptor::LongLong,
            TypeDescriptor::LongLong,
        ];
        assert_eq!(encode_sequence(&types), "@:qq");
        assert_eq!(encode_sequence(&[]), "");
    }
}
