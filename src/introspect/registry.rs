//! Fixture-backed introspector.
//!
//! A [`Registry`] describes a runtime as data: each type lists whether its
//! teardown is interceptable and the type encoding of each member. It backs
//! the `hookcheck` binary and is handy wherever a live runtime is not.
//!
//! ```json
//! {
//!   "types": {
//!     "TestObject": {
//!       "managed": true,
//!       "members": {
//!         "sumWithA:b:": "q32@0:8q16q24",
//!         "dealloc": "v16@0:8",
//!         "broken": null
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! A `null` encoding marks a member that exists but cannot be decoded.

use std::collections::BTreeMap;

use hookcheck_types::{parse_signature, Signature, SignatureKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::{Introspector, RuntimeType};
use crate::DispatchKey;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub types: BTreeMap<String, TypeEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Teardown can be intercepted.
    #[serde(default)]
    pub managed: bool,
    /// Member key to method type encoding.
    #[serde(default)]
    pub members: BTreeMap<DispatchKey, Option<String>>,
}

/// An instance handle in a registry runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryObject {
    /// An instance of the named type.
    Instance(String),
    /// The type object for the named type.
    Type(String),
}

/// An interceptor value in a registry runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCandidate {
    /// A block with the given type encoding.
    Closure(String),
    /// A value that is not a block.
    Opaque,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add or replace a type.
    pub fn insert_type(&mut self, name: impl Into<String>, entry: TypeEntry) {
        self.types.insert(name.into(), entry);
    }

    /// Find a type by name.
    pub fn find_type(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }
}

impl TypeEntry {
    pub fn new(managed: bool) -> Self {
        Self {
            managed,
            members: BTreeMap::new(),
        }
    }

    /// Builder-style member registration.
    pub fn with_member(mut self, key: impl Into<DispatchKey>, encoding: Option<&str>) -> Self {
        self.members.insert(key.into(), encoding.map(str::to_string));
        self
    }
}

impl Introspector for Registry {
    type Object = RegistryObject;
    type Candidate = RegistryCandidate;

    fn runtime_type_of(&self, object: &RegistryObject) -> RuntimeType {
        match object {
            RegistryObject::Type(_) => RuntimeType::TypeObject,
            RegistryObject::Instance(name) if self.types.contains_key(name) => {
                RuntimeType::Instance(name.clone())
            }
            RegistryObject::Instance(_) => RuntimeType::Unknown,
        }
    }

    fn responds_to(&self, type_name: &str, key: &DispatchKey) -> bool {
        self.find_type(type_name)
            .map_or(false, |entry| entry.members.contains_key(key))
    }

    fn resolve_target_signature(&self, type_name: &str, key: &DispatchKey) -> Option<Signature> {
        let encoding = self.find_type(type_name)?.members.get(key)?.as_deref()?;
        match parse_signature(SignatureKind::Method, encoding) {
            Ok(signature) => Some(signature),
            Err(err) => {
                warn!(type_name, key = %key, encoding, error = %err, "Undecodable member encoding");
                None
            }
        }
    }

    fn resolve_interceptor_signature(&self, candidate: &RegistryCandidate) -> Option<Signature> {
        let RegistryCandidate::Closure(encoding) = candidate else {
            return None;
        };
        match parse_signature(SignatureKind::Closure, encoding) {
            Ok(signature) => Some(signature),
            Err(err) => {
                warn!(encoding = %encoding, error = %err, "Undecodable closure encoding");
                None
            }
        }
    }

    fn is_managed_lifecycle_capable(&self, type_name: &str) -> bool {
        self.find_type(type_name).map_or(false, |entry| entry.managed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookcheck_types::TypeDescriptor;

    const FIXTURE: &str = r#"
    {
        "types": {
            "TestObject": {
                "managed": true,
                "members": {
                    "sumWithA:b:": "q32@0:8q16q24",
                    "broken": null,
                    "garbled": "q@:x"
                }
            },
            "SwiftObject": {
                "members": { "dealloc": "v16@0:8" }
            }
        }
    }
    "#;

    fn registry() -> Registry {
        Registry::from_json(FIXTURE).expect("parse fixture")
    }

    #[test]
    fn test_runtime_type_of() {
        let registry = registry();
        assert_eq!(
            registry.runtime_type_of(&RegistryObject::Instance("TestObject".into())),
            RuntimeType::Instance("TestObject".into())
        );
        assert_eq!(
            registry.runtime_type_of(&RegistryObject::Type("TestObject".into())),
            RuntimeType::TypeObject
        );
        assert_eq!(
            registry.runtime_type_of(&RegistryObject::Instance("Ghost".into())),
            RuntimeType::Unknown
        );
    }

    #[test]
    fn test_member_resolution() {
        let registry = registry();
        let sum = DispatchKey::from("sumWithA:b:");
        assert!(registry.responds_to("TestObject", &sum));
        assert!(!registry.responds_to("SwiftObject", &sum));
        assert!(!registry.responds_to("Ghost", &sum));

        let signature = registry
            .resolve_target_signature("TestObject", &sum)
            .expect("signature");
        assert_eq!(signature.kind(), SignatureKind::Method);
        assert_eq!(signature.return_type(), &TypeDescriptor::LongLong);
    }

    #[test]
    fn test_undecodable_members_have_no_signature() {
        let registry = registry();
        assert!(registry.responds_to("TestObject", &DispatchKey::from("broken")));
        assert!(registry
            .resolve_target_signature("TestObject", &DispatchKey::from("broken"))
            .is_none());
        assert!(registry
            .resolve_target_signature("TestObject", &DispatchKey::from("garbled"))
            .is_none());
    }

    #[test]
    fn test_candidates() {
        let registry = registry();
        assert!(registry
            .resolve_interceptor_signature(&RegistryCandidate::Opaque)
            .is_none());
        let signature = registry
            .resolve_interceptor_signature(&RegistryCandidate::Closure("v@?qq".into()))
            .expect("signature");
        assert_eq!(signature.kind(), SignatureKind::Closure);
    }

    #[test]
    fn test_managed_flag_defaults_to_false() {
        let registry = registry();
        assert!(registry.is_managed_lifecycle_capable("TestObject"));
        assert!(!registry.is_managed_lifecycle_capable("SwiftObject"));
        assert!(!registry.is_managed_lifecycle_capable("Ghost"));
    }

    #[test]
    fn test_builder() {
        let mut registry = Registry::new();
        registry.insert_type(
            "Widget",
            TypeEntry::new(true).with_member("draw", Some("v@:")),
        );
        assert!(registry.responds_to("Widget", &DispatchKey::from("draw")));
        assert!(registry.is_already_instrumented("NSKVONotifying_Widget"));
        assert!(!registry.is_already_instrumented("Widget"));
    }
}
