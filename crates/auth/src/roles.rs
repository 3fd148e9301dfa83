//! Fixed role-id table
//!
//! Tokens from the identity service may carry a numeric `roleId` instead of
//! a `roles` list. The mapping is a plain immutable value.

/// Role ids understood by the platform
const ROLE_IDS: [(&str, &str); 3] = [("1", "CLIENTE"), ("2", "ASESOR"), ("3", "ADMIN")];

/// Prefix every granted authority carries
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// Immutable mapping from `roleId` claim values to role names
#[derive(Debug, Clone, Copy)]
pub struct RoleTable {
    entries: &'static [(&'static str, &'static str)],
}

impl RoleTable {
    /// Look up a role id. Unknown ids resolve to `None`.
    pub fn resolve(&self, role_id: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(id, _)| *id == role_id)
            .map(|(_, name)| *name)
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self { entries: &ROLE_IDS }
    }
}

/// `ADMIN` -> `ROLE_ADMIN`, case preserved
pub fn authority(role: &str) -> String {
    format!("{}{}", AUTHORITY_PREFIX, role)
}
