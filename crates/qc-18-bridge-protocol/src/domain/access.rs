//! # Access Control
//!
//! Role assignments per principal.

use super::errors::{Address, BridgeError};
use super::value_objects::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Role registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    grants: BTreeMap<Address, BTreeSet<Role>>,
}

impl RoleRegistry {
    /// Registry whose `admin` holds every role.
    pub fn with_admin(admin: Address) -> Self {
        let mut registry = Self::default();
        registry.grant(admin, Role::Admin);
        registry.grant(admin, Role::Upgrader);
        registry.grant(admin, Role::Guardian);
        registry
    }

    /// True if `principal` holds `role`.
    pub fn has_role(&self, principal: &Address, role: Role) -> bool {
        self.grants
            .get(principal)
            .is_some_and(|roles| roles.contains(&role))
    }

    /// Fail with `Unauthorized` unless `principal` holds `role`.
    pub fn require(&self, principal: &Address, role: Role) -> Result<(), BridgeError> {
        if !self.has_role(principal, role) {
            return Err(BridgeError::Unauthorized {
                principal: *principal,
                role,
            });
        }
        Ok(())
    }

    /// Grant `role`. Returns false if already held.
    pub fn grant(&mut self, principal: Address, role: Role) -> bool {
        self.grants.entry(principal).or_default().insert(role)
    }

    /// Revoke `role`. Returns false if not held.
    pub fn revoke(&mut self, principal: &Address, role: Role) -> bool {
        let Some(roles) = self.grants.get_mut(principal) else {
            return false;
        };
        let removed = roles.remove(&role);
        if roles.is_empty() {
            self.grants.remove(principal);
        }
        removed
    }

    /// Principals holding `role`.
    pub fn holders(&self, role: Role) -> Vec<Address> {
        self.grants
            .iter()
            .filter(|(_, roles)| roles.contains(&role))
            .map(|(principal, _)| *principal)
            .collect()
    }
}
