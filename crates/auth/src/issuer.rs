//! TokenIssuer - mints HS256 tokens the authenticator accepts

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::claims::IssuedClaims;
use crate::error::IssueError;
use crate::settings::JwtSettings;

/// What to put in a new token
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub subject: String,
    pub roles: Vec<String>,
    pub role_id: Option<String>,
}

impl TokenRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn role_id(mut self, role_id: impl Into<String>) -> Self {
        self.role_id = Some(role_id.into());
        self
    }
}

/// Signs tokens with the configured secret, issuer and lifetime
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: Option<String>,
    expiration_secs: i64,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret_bytes()),
            issuer: settings.issuer().map(str::to_string),
            expiration_secs: i64::try_from(settings.expiration_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Mint a token for `request`, valid from now for the configured lifetime
    pub fn issue(&self, request: &TokenRequest) -> Result<String, IssueError> {
        if request.subject.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let iat = Utc::now().timestamp();
        let claims = IssuedClaims {
            sub: request.subject.clone(),
            iss: self.issuer.clone(),
            roles: request.roles.clone(),
            role_id: request.role_id.clone(),
            iat,
            exp: iat.saturating_add(self.expiration_secs),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        tracing::debug!(subject = %claims.sub, exp = claims.exp, "token issued");
        Ok(token)
    }
}
