//! TokenAuthenticator - bearer token to principal
//!
//! Verification runs as a fixed sequence of stages:
//!
//! ```text
//! NoToken -> Parsed -> SignatureVerified -> IssuerChecked -> SubjectChecked -> RolesResolved
//! ```
//!
//! Each stage consumes the previous stage's output. The first failing stage
//! ends verification with an [`AuthFailure`], which `authenticate` logs and
//! turns into `None`.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::collections::{BTreeSet, HashSet};

use crate::claims::TokenClaims;
use crate::error::{AuthFailure, AuthConfigError};
use crate::principal::Principal;
use crate::roles::{authority, RoleTable};
use crate::settings::JwtSettings;

/// Extract the token from an `Authorization` header value.
///
/// Only the exact `Bearer ` scheme prefix is recognized.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Token structure decoded, signature not yet checked
struct Parsed<'a> {
    token: &'a str,
}

/// Signature (and expiry) verified
struct SignatureVerified<'a> {
    token: &'a str,
    claims: TokenClaims,
}

/// Issuer accepted, or no issuer configured
struct IssuerChecked<'a> {
    token: &'a str,
    claims: TokenClaims,
}

/// Non-empty subject extracted
struct SubjectChecked<'a> {
    token: &'a str,
    subject: String,
    claims: TokenClaims,
}

/// Stateless verifier; safe to share across requests and threads
pub struct TokenAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    role_table: RoleTable,
}

impl TokenAuthenticator {
    /// Build an authenticator from validated settings
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp is checked when present but not required; issuer is a separate stage
        validation.required_spec_claims = HashSet::new();
        validation.validate_aud = false;
        validation.leeway = settings.leeway_secs();

        Self {
            decoding_key: DecodingKey::from_secret(settings.secret_bytes()),
            validation,
            issuer: settings.issuer().map(str::to_string),
            role_table: RoleTable::default(),
        }
    }

    /// Convenience constructor from a raw secret, without issuer check
    pub fn from_secret(secret: &str) -> Result<Self, AuthConfigError> {
        Ok(Self::new(&JwtSettings::new(secret)?))
    }

    /// Authenticate a raw token. Any failure yields `None`.
    pub fn authenticate(&self, token: &str) -> Option<Principal> {
        match self.verify(token) {
            Ok(principal) => {
                tracing::debug!(subject = principal.subject(), "bearer token authenticated");
                Some(principal)
            }
            Err(failure) => {
                tracing::debug!(reason = %failure, "bearer token rejected");
                None
            }
        }
    }

    /// Authenticate from an optional `Authorization` header value.
    ///
    /// A missing header or a non-bearer scheme is the `NoToken` state.
    pub fn authenticate_header(&self, header: Option<&str>) -> Option<Principal> {
        let token = header.and_then(bearer_token)?;
        self.authenticate(token)
    }

    fn verify(&self, token: &str) -> Result<Principal, AuthFailure> {
        let parsed = self.parse(token)?;
        let verified = self.verify_signature(parsed)?;
        let issued = self.check_issuer(verified)?;
        let subject = self.check_subject(issued)?;
        Ok(self.resolve_roles(subject))
    }

    fn parse<'a>(&self, token: &'a str) -> Result<Parsed<'a>, AuthFailure> {
        decode_header(token).map_err(|e| AuthFailure::Malformed(e.to_string()))?;
        Ok(Parsed { token })
    }

    fn verify_signature<'a>(
        &self,
        parsed: Parsed<'a>,
    ) -> Result<SignatureVerified<'a>, AuthFailure> {
        let data = decode::<TokenClaims>(parsed.token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthFailure::BadSignature
                }
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => AuthFailure::Malformed(e.to_string()),
            })?;

        Ok(SignatureVerified {
            token: parsed.token,
            claims: data.claims,
        })
    }

    fn check_issuer<'a>(
        &self,
        verified: SignatureVerified<'a>,
    ) -> Result<IssuerChecked<'a>, AuthFailure> {
        if let Some(expected) = &self.issuer {
            if verified.claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(AuthFailure::IssuerMismatch {
                    expected: expected.clone(),
                    found: verified.claims.iss.clone(),
                });
            }
        }

        Ok(IssuerChecked {
            token: verified.token,
            claims: verified.claims,
        })
    }

    fn check_subject<'a>(
        &self,
        issued: IssuerChecked<'a>,
    ) -> Result<SubjectChecked<'a>, AuthFailure> {
        let subject = match issued.claims.sub.as_deref() {
            Some(sub) if !sub.is_empty() => sub.to_string(),
            _ => return Err(AuthFailure::MissingSubject),
        };

        Ok(SubjectChecked {
            token: issued.token,
            subject,
            claims: issued.claims,
        })
    }

    fn resolve_roles(&self, checked: SubjectChecked<'_>) -> Principal {
        let roles = checked.claims.role_names();

        // A non-empty roles list wins; roleId is only a fallback
        let authorities: BTreeSet<String> = if !roles.is_empty() {
            roles.into_iter().map(authority).collect()
        } else {
            checked
                .claims
                .role_id()
                .and_then(|id| self.role_table.resolve(&id))
                .map(authority)
                .into_iter()
                .collect()
        };

        Principal::new(checked.subject, authorities, checked.token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "QnE1T2lXbVRhV3RzR2VOUXlHaFZ2d2dyU2p2a1R2TnM=";
    const ISSUER: &str = "autenticacion-service";

    fn authenticator(issuer: Option<&str>) -> TokenAuthenticator {
        let settings = JwtSettings::new(SECRET)
            .unwrap()
            .with_issuer(issuer.map(str::to_string));
        TokenAuthenticator::new(&settings)
    }

    fn sign(claims: Value) -> String {
        sign_with(claims, SECRET)
    }

    fn sign_with(claims: Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn base_claims(extra: Value) -> Value {
        let now = Utc::now().timestamp();
        let mut claims = json!({ "sub": "u1", "iss": ISSUER, "iat": now, "exp": now + 3600 });
        if let (Value::Object(base), Value::Object(extra)) = (&mut claims, extra) {
            base.extend(extra);
        }
        claims
    }

    fn authorities(principal: &Principal) -> Vec<&str> {
        principal.authorities().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_valid_token_with_roles() {
        let token = sign(base_claims(json!({ "roles": ["ADMIN", "USER"] })));
        let principal = authenticator(Some(ISSUER)).authenticate(&token).unwrap();

        assert_eq!(principal.subject(), "u1");
        assert_eq!(authorities(&principal), vec!["ROLE_ADMIN", "ROLE_USER"]);
        assert_eq!(principal.credentials(), token);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = sign(base_claims(json!({ "iss": "wrong-issuer" })));
        let auth = authenticator(Some(ISSUER));

        assert!(auth.authenticate(&token).is_none());
        assert!(matches!(
            auth.verify(&token),
            Err(AuthFailure::IssuerMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_issuer_rejected_when_expected() {
        let token = sign(json!({ "sub": "u1" }));
        assert!(authenticator(Some(ISSUER)).authenticate(&token).is_none());
    }

    #[test]
    fn test_issuer_check_skipped_when_unconfigured() {
        let token = sign(json!({ "sub": "u1" }));
        let principal = authenticator(None).authenticate(&token).unwrap();

        assert_eq!(principal.subject(), "u1");
        assert!(principal.authorities().is_empty());
    }

    #[test]
    fn test_empty_or_absent_subject_rejected() {
        let auth = authenticator(Some(ISSUER));

        let empty = sign(base_claims(json!({ "sub": "" })));
        assert_eq!(auth.verify(&empty).unwrap_err(), AuthFailure::MissingSubject);

        let absent = sign(json!({ "iss": ISSUER }));
        assert_eq!(auth.verify(&absent).unwrap_err(), AuthFailure::MissingSubject);

        let null = sign(base_claims(json!({ "sub": null })));
        assert!(auth.authenticate(&null).is_none());
    }

    #[test]
    fn test_role_id_mapping() {
        let auth = authenticator(Some(ISSUER));

        let asesor = sign(base_claims(json!({ "roleId": "2" })));
        assert_eq!(authorities(&auth.authenticate(&asesor).unwrap()), vec!["ROLE_ASESOR"]);

        let cliente = sign(base_claims(json!({ "roleId": "1" })));
        assert_eq!(authorities(&auth.authenticate(&cliente).unwrap()), vec!["ROLE_CLIENTE"]);

        let admin = sign(base_claims(json!({ "roleId": "3" })));
        assert_eq!(authorities(&auth.authenticate(&admin).unwrap()), vec!["ROLE_ADMIN"]);
    }

    #[test]
    fn test_unknown_role_id_yields_no_authorities() {
        let token = sign(base_claims(json!({ "roleId": "99" })));
        let principal = authenticator(Some(ISSUER)).authenticate(&token).unwrap();
        assert!(principal.authorities().is_empty());
    }

    #[test]
    fn test_roles_take_precedence_over_role_id() {
        let token = sign(base_claims(json!({ "roles": ["CUSTOM_ROLE"], "roleId": "3" })));
        let principal = authenticator(Some(ISSUER)).authenticate(&token).unwrap();
        assert_eq!(authorities(&principal), vec!["ROLE_CUSTOM_ROLE"]);
    }

    #[test]
    fn test_empty_roles_fall_back_to_role_id() {
        let token = sign(base_claims(json!({ "roles": [], "roleId": "3" })));
        let principal = authenticator(Some(ISSUER)).authenticate(&token).unwrap();
        assert_eq!(authorities(&principal), vec!["ROLE_ADMIN"]);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_with(
            base_claims(json!({})),
            "another-secret-that-is-long-enough-0123456789",
        );
        let auth = authenticator(Some(ISSUER));
        assert_eq!(auth.verify(&token).unwrap_err(), AuthFailure::BadSignature);
    }

    #[test]
    fn test_expired_token_rejected() {
        let past = Utc::now().timestamp() - 7200;
        let token = sign(base_claims(json!({ "iat": past, "exp": past + 60 })));
        let auth = authenticator(Some(ISSUER));
        assert_eq!(auth.verify(&token).unwrap_err(), AuthFailure::Expired);
    }

    #[test]
    fn test_malformed_token_rejected() {
        let auth = authenticator(Some(ISSUER));
        assert!(matches!(auth.verify("not-a-jwt"), Err(AuthFailure::Malformed(_))));
        assert!(matches!(auth.verify(""), Err(AuthFailure::Malformed(_))));
        assert!(auth.authenticate("a.b.c").is_none());
    }

    #[test]
    fn test_authenticate_header() {
        let auth = authenticator(Some(ISSUER));
        let token = sign(base_claims(json!({})));

        assert!(auth.authenticate_header(None).is_none());
        assert!(auth.authenticate_header(Some(&format!("Basic {}", token))).is_none());
        assert!(auth.authenticate_header(Some(&format!("bearer {}", token))).is_none());

        let principal = auth
            .authenticate_header(Some(&format!("Bearer {}", token)))
            .unwrap();
        assert_eq!(principal.subject(), "u1");
    }

    #[test]
    fn test_from_secret_requires_long_secret() {
        assert!(TokenAuthenticator::from_secret("short").is_err());
        assert!(TokenAuthenticator::from_secret(SECRET).is_ok());
    }
}
