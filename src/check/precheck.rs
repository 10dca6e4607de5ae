//! Policy pre-checks.
//!
//! Everything here runs before signatures are compared, and most of it runs
//! before signatures are even resolved.

use tracing::{trace, warn};

use crate::config::Policy;
use crate::diagnostic::{Diagnostic, InvariantViolation, PolicyReason};
use crate::introspect::{HookTarget, Introspector, RuntimeType};
use crate::DispatchKey;

/// Facts established by the pre-checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Admitted {
    pub type_name: String,
    pub lifecycle: bool,
}

/// Reject disallowed pairings. Each check short-circuits the rest.
pub(crate) fn admit<I: Introspector>(
    introspector: &I,
    policy: &Policy,
    target: &HookTarget<I::Object>,
    key: &DispatchKey,
) -> Result<Admitted, Diagnostic> {
    if policy.is_reserved(key) {
        return Err(Diagnostic::PolicyRejected(PolicyReason::ReservedKey));
    }

    let type_name = target_type_name(introspector, target)?;
    trace!(type_name = %type_name, "resolved target type");

    let lifecycle = policy.is_lifecycle(key);
    if lifecycle && !introspector.is_managed_lifecycle_capable(&type_name) {
        return Err(Diagnostic::PolicyRejected(
            PolicyReason::LifecycleOnUnmanagedType,
        ));
    }

    if introspector.is_already_instrumented(&type_name) {
        return Err(Diagnostic::PolicyRejected(
            PolicyReason::AlreadyInstrumentedBySystemObserver,
        ));
    }

    if !introspector.responds_to(&type_name, key) {
        return Err(Diagnostic::NoMatchingMember {
            type_name,
            key: key.clone(),
        });
    }

    Ok(Admitted {
        type_name,
        lifecycle,
    })
}

fn target_type_name<I: Introspector>(
    introspector: &I,
    target: &HookTarget<I::Object>,
) -> Result<String, Diagnostic> {
    match target {
        HookTarget::Type(name) => Ok(name.clone()),
        HookTarget::Instance(object) => match introspector.runtime_type_of(object) {
            RuntimeType::Instance(name) => Ok(name),
            RuntimeType::TypeObject => Err(Diagnostic::TypePassedAsInstance),
            RuntimeType::Unknown => {
                warn!("runtime type discovery returned nothing for a live instance");
                Err(Diagnostic::InternalInvariantViolation(
                    InvariantViolation::UnknownRuntimeType,
                ))
            }
        },
    }
}
