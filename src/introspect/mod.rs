//! Signature introspection
//!
//! The checker never touches a live object model. Everything it knows about
//! the runtime comes through [`Introspector`]: which type an instance really
//! has, whether a member exists, and the calling conventions of both the
//! member and the candidate interceptor.
//!
//! Implementations must be pure queries. The checker short-circuits, so a
//! query that is not needed to reach a verdict is never made.

mod registry;

pub use registry::{Registry, RegistryCandidate, RegistryError, RegistryObject, TypeEntry};

use hookcheck_types::Signature;

use crate::config::INSTRUMENTED_PREFIX;
use crate::DispatchKey;

/// What an intercepted value is at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeType {
    /// An instance whose live type has this name.
    Instance(String),
    /// The value is itself a type object.
    TypeObject,
    /// The runtime could not report a type.
    Unknown,
}

/// Where an interception is being installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookTarget<O> {
    /// A single live instance. Its runtime type is discovered first.
    Instance(O),
    /// Every instance of the named type.
    Type(String),
}

/// Runtime queries the checker depends on.
pub trait Introspector {
    /// A live instance handle.
    type Object;
    /// A caller-supplied interceptor value.
    type Candidate;

    /// Discover the live runtime type of an instance.
    fn runtime_type_of(&self, object: &Self::Object) -> RuntimeType;

    /// Whether `type_name` has a member for `key`.
    fn responds_to(&self, type_name: &str, key: &DispatchKey) -> bool;

    /// Calling convention of the member, or `None` if it cannot be decoded.
    fn resolve_target_signature(&self, type_name: &str, key: &DispatchKey) -> Option<Signature>;

    /// Calling convention of the candidate, or `None` if it is not a
    /// recognized callable.
    fn resolve_interceptor_signature(&self, candidate: &Self::Candidate) -> Option<Signature>;

    /// Whether teardown of `type_name` can be intercepted.
    fn is_managed_lifecycle_capable(&self, type_name: &str) -> bool;

    /// Whether `type_name` is a synthetic subclass from an existing observer.
    fn is_already_instrumented(&self, type_name: &str) -> bool {
        type_name.starts_with(INSTRUMENTED_PREFIX)
    }
}

impl<T: Introspector + ?Sized> Introspector for &T {
    type Object = T::Object;
    type Candidate = T::Candidate;

    fn runtime_type_of(&self, object: &Self::Object) -> RuntimeType {
        (**self).runtime_type_of(object)
    }

    fn responds_to(&self, type_name: &str, key: &DispatchKey) -> bool {
        (**self).responds_to(type_name, key)
    }

    fn resolve_target_signature(&self, type_name: &str, key: &DispatchKey) -> Option<Signature> {
        (**self).resolve_target_signature(type_name, key)
    }

    fn resolve_interceptor_signature(&self, candidate: &Self::Candidate) -> Option<Signature> {
        (**self).resolve_interceptor_signature(candidate)
    }

    fn is_managed_lifecycle_capable(&self, type_name: &str) -> bool {
        (**self).is_managed_lifecycle_capable(type_name)
    }

    fn is_already_instrumented(&self, type_name: &str) -> bool {
        (**self).is_already_instrumented(type_name)
    }
}
