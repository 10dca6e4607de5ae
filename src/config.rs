//! Checker policy.
//!
//! The reserved and lifecycle keys are process-wide constants. [`Policy`]
//! bundles them for a [`Checker`](crate::Checker) and can be loaded from JSON
//! when a runtime spells its identity-management members differently.

use serde::{Deserialize, Serialize};

use crate::DispatchKey;

/// Identity-management members that can never be intercepted.
pub const RESERVED_KEYS: [&str; 3] = ["retain", "release", "autorelease"];

/// The teardown member of a managed object.
pub const LIFECYCLE_KEY: &str = "dealloc";

/// Name prefix of the synthetic subclasses key-value observing installs.
pub const INSTRUMENTED_PREFIX: &str = "NSKVONotifying_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Keys rejected before any other check.
    pub reserved_keys: Vec<DispatchKey>,
    /// Key of the teardown member.
    pub lifecycle_key: DispatchKey,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            reserved_keys: RESERVED_KEYS.iter().copied().map(DispatchKey::from).collect(),
            lifecycle_key: DispatchKey::from(LIFECYCLE_KEY),
        }
    }
}

impl Policy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_reserved(&self, key: &DispatchKey) -> bool {
        self.reserved_keys.contains(key)
    }

    pub fn is_lifecycle(&self, key: &DispatchKey) -> bool {
        &self.lifecycle_key == key
    }
}
