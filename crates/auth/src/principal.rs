//! Principal - the authenticated identity of one request

use std::collections::BTreeSet;
use std::fmt;

use crate::roles::authority;

/// Subject and authorities derived from a verified token.
///
/// Lives for one request and is never persisted. `credentials` holds the
/// original token for downstream logging; it is never re-verified.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    authorities: BTreeSet<String>,
    credentials: String,
}

impl Principal {
    pub(crate) fn new(
        subject: String,
        authorities: BTreeSet<String>,
        credentials: String,
    ) -> Self {
        Self {
            subject,
            authorities,
            credentials,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Granted authorities, each prefixed `ROLE_`
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn credentials(&self) -> &str {
        &self.credentials
    }

    /// Whether the principal holds `ROLE_<role>`
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.contains(&authority(role))
    }

    /// Whether the principal holds at least one of `roles`
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.has_role(role.as_ref()))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &self.subject)
            .field("authorities", &self.authorities)
            .field("credentials", &"<redacted>")
            .finish()
    }
}
