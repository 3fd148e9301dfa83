//! JWT settings shared by the authenticator and the issuer

use crate::error::AuthConfigError;

/// HMAC secret, expected issuer and lifetimes
#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    issuer: Option<String>,
    expiration_secs: u64,
    leeway_secs: u64,
}

impl JwtSettings {
    /// HS256 needs a 256-bit key
    pub const MIN_SECRET_LEN: usize = 32;

    /// Default token lifetime for issued tokens
    pub const DEFAULT_EXPIRATION_SECS: u64 = 3600;

    /// Create settings from the shared secret.
    ///
    /// The key is the UTF-8 bytes of the secret string as given.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthConfigError> {
        let secret = secret.into();
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(AuthConfigError::SecretTooShort {
                min: Self::MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        Ok(Self {
            secret,
            issuer: None,
            expiration_secs: Self::DEFAULT_EXPIRATION_SECS,
            leeway_secs: 0,
        })
    }

    /// Expected issuer. Blank values leave the issuer check disabled.
    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer.filter(|iss| !iss.trim().is_empty());
        self
    }

    pub fn with_expiration_secs(mut self, secs: u64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Clock skew tolerated when checking `exp`
    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn expiration_secs(&self) -> u64 {
        self.expiration_secs
    }

    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}
