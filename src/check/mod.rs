//! Interception compatibility checks
//!
//! A check runs policy pre-checks, resolves both signatures, then applies the
//! mode's structural rules:
//!
//! ```text
//! reserved key ─▶ target type ─▶ teardown on unmanaged type ─▶ already observed
//!      ─▶ member exists ─▶ target signature ─▶ interceptor signature
//!      ─▶ structural match (before / after / instead) ─▶ Ok(())
//! ```
//!
//! Every arrow can instead end the check with a [`Diagnostic`]. Nothing is
//! retried and nothing is cached; a [`Checker`] holds no mutable state and can
//! be shared across threads whenever its introspector can.

mod precheck;
mod structural;

pub use structural::check_signatures;

use tracing::{debug, warn};

use crate::config::Policy;
use crate::diagnostic::{Diagnostic, Side};
use crate::introspect::{HookTarget, Introspector};
use crate::{DispatchKey, Mode};

/// Validation gate run immediately before installing an interception.
#[derive(Debug, Clone)]
pub struct Checker<I> {
    introspector: I,
    policy: Policy,
}

impl<I: Introspector> Checker<I> {
    /// Create a checker with the default policy.
    pub fn new(introspector: I) -> Self {
        Self::with_policy(introspector, Policy::default())
    }

    pub fn with_policy(introspector: I, policy: Policy) -> Self {
        Self {
            introspector,
            policy,
        }
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Decide whether `candidate` may intercept `key` on `target` in `mode`.
    ///
    /// Installation must not proceed unless this returns `Ok(())`.
    pub fn check(
        &self,
        target: &HookTarget<I::Object>,
        key: &DispatchKey,
        mode: Mode,
        candidate: &I::Candidate,
    ) -> Result<(), Diagnostic> {
        debug!(key = %key, mode = %mode, "checking interception");
        let result = self.run(target, key, mode, candidate);
        match &result {
            Ok(()) => debug!(key = %key, mode = %mode, "interception accepted"),
            Err(diagnostic) if diagnostic.is_internal() => {
                warn!(key = %key, mode = %mode, error = %diagnostic, "collaborator contract violated")
            }
            Err(diagnostic) => {
                debug!(key = %key, mode = %mode, error = %diagnostic, "interception rejected")
            }
        }
        result
    }

    fn run(
        &self,
        target: &HookTarget<I::Object>,
        key: &DispatchKey,
        mode: Mode,
        candidate: &I::Candidate,
    ) -> Result<(), Diagnostic> {
        let admitted = precheck::admit(&self.introspector, &self.policy, target, key)?;

        let target_signature = self
            .introspector
            .resolve_target_signature(&admitted.type_name, key)
            .ok_or(Diagnostic::MissingSignature { side: Side::Target })?;
        let interceptor_signature = self
            .introspector
            .resolve_interceptor_signature(candidate)
            .ok_or(Diagnostic::MissingSignature {
                side: Side::Interceptor,
            })?;

        check_signatures(
            &target_signature,
            &interceptor_signature,
            mode,
            admitted.lifecycle,
        )
    }
}

/// One-shot check with the default policy.
pub fn check<I: Introspector>(
    introspector: &I,
    target: &HookTarget<I::Object>,
    key: &DispatchKey,
    mode: Mode,
    candidate: &I::Candidate,
) -> Result<(), Diagnostic> {
    Checker::new(introspector).check(target, key, mode, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{InvariantViolation, MismatchKind, PolicyReason};
    use crate::introspect::{Registry, RegistryCandidate, RegistryObject, TypeEntry};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert_type(
            "TestObject",
            TypeEntry::new(true)
                .with_member("sumWithA:b:", Some("q32@0:8q16q24"))
                .with_member("dealloc", Some("v16@0:8"))
                .with_member("retain", Some("@16@0:8"))
                .with_member("opaque", None),
        );
        registry.insert_type(
            "SwiftObject",
            TypeEntry::new(false).with_member("dealloc", Some("v16@0:8")),
        );
        registry.insert_type(
            "NSKVONotifying_TestObject",
            TypeEntry::new(true).with_member("sumWithA:b:", Some("q32@0:8q16q24")),
        );
        registry
    }

    fn class(name: &str) -> HookTarget<RegistryObject> {
        HookTarget::Type(name.to_string())
    }

    fn closure(encoding: &str) -> RegistryCandidate {
        RegistryCandidate::Closure(encoding.to_string())
    }

    #[test]
    fn test_accepts_matching_before_hook() {
        let checker = Checker::new(registry());
        let result = checker.check(
            &class("TestObject"),
            &"sumWithA:b:".into(),
            Mode::Before,
            &closure("v@?qq"),
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_instance_target_uses_runtime_type() {
        let checker = Checker::new(registry());
        let instance = HookTarget::Instance(RegistryObject::Instance("TestObject".into()));
        assert_eq!(
            checker.check(&instance, &"sumWithA:b:".into(), Mode::Instead, &closure("q@?@?<q@?qq>qq")),
            Ok(())
        );

        let type_object = HookTarget::Instance(RegistryObject::Type("TestObject".into()));
        assert_eq!(
            checker.check(&type_object, &"sumWithA:b:".into(), Mode::Before, &closure("v@?")),
            Err(Diagnostic::TypePassedAsInstance)
        );

        let ghost = HookTarget::Instance(RegistryObject::Instance("Ghost".into()));
        assert_eq!(
            checker.check(&ghost, &"sumWithA:b:".into(), Mode::Before, &closure("v@?")),
            Err(Diagnostic::InternalInvariantViolation(
                InvariantViolation::UnknownRuntimeType
            ))
        );
    }

    #[test]
    fn test_policy_rejections() {
        let checker = Checker::new(registry());
        assert_eq!(
            checker
                .check(&class("TestObject"), &"retain".into(), Mode::Before, &closure("v@?"))
                .unwrap_err()
                .policy_reason(),
            Some(PolicyReason::ReservedKey)
        );
        assert_eq!(
            checker
                .check(&class("SwiftObject"), &"dealloc".into(), Mode::After, &closure("v@?"))
                .unwrap_err()
                .policy_reason(),
            Some(PolicyReason::LifecycleOnUnmanagedType)
        );
        assert_eq!(
            checker
                .check(
                    &class("NSKVONotifying_TestObject"),
                    &"sumWithA:b:".into(),
                    Mode::Before,
                    &closure("v@?")
                )
                .unwrap_err()
                .policy_reason(),
            Some(PolicyReason::AlreadyInstrumentedBySystemObserver)
        );
    }

    #[test]
    fn test_missing_member_and_signatures() {
        let checker = Checker::new(registry());
        assert_eq!(
            checker.check(&class("TestObject"), &"objectAtIndex:".into(), Mode::Before, &closure("v@?")),
            Err(Diagnostic::NoMatchingMember {
                type_name: "TestObject".into(),
                key: "objectAtIndex:".into(),
            })
        );
        assert_eq!(
            checker.check(&class("TestObject"), &"opaque".into(), Mode::Before, &closure("v@?")),
            Err(Diagnostic::MissingSignature { side: Side::Target })
        );
        assert_eq!(
            checker.check(
                &class("TestObject"),
                &"sumWithA:b:".into(),
                Mode::Before,
                &RegistryCandidate::Opaque
            ),
            Err(Diagnostic::MissingSignature {
                side: Side::Interceptor
            })
        );
    }

    #[test]
    fn test_managed_dealloc_strips_implicit_slots() {
        let checker = Checker::new(registry());
        assert_eq!(
            checker.check(&class("TestObject"), &"dealloc".into(), Mode::Before, &closure("v@?")),
            Ok(())
        );
        let err = checker
            .check(&class("TestObject"), &"dealloc".into(), Mode::After, &closure("v@?@:"))
            .unwrap_err();
        assert_eq!(err.mismatch_kind(), Some(MismatchKind::Parameters));
        assert!(err.to_string().contains("teardown method"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = Policy {
            reserved_keys: vec!["sumWithA:b:".into()],
            ..Policy::default()
        };
        let checker = Checker::with_policy(registry(), policy);
        assert_eq!(
            checker
                .check(&class("TestObject"), &"sumWithA:b:".into(), Mode::Before, &closure("v@?"))
                .unwrap_err()
                .policy_reason(),
            Some(PolicyReason::ReservedKey)
        );
        // `retain` is no longer reserved under this policy.
        assert_eq!(
            checker.check(&class("TestObject"), &"retain".into(), Mode::Before, &closure("v@?")),
            Ok(())
        );
    }

    #[test]
    fn test_free_function_borrows_introspector() {
        let registry = registry();
        assert_eq!(
            check(&registry, &class("TestObject"), &"sumWithA:b:".into(), Mode::After, &closure("v@?qq")),
            Ok(())
        );
    }
}
