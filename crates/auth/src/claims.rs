//! Claims read from and written to tokens

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims the authenticator reads.
///
/// `roles` and `roleId` stay untyped so a token with an odd shape for
/// either still authenticates with fewer authorities instead of failing.
/// `iat` / `exp` are checked by the JWT decoder itself.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub roles: Option<Value>,
    #[serde(default, rename = "roleId")]
    pub role_id: Option<Value>,
}

impl TokenClaims {
    /// String entries of the `roles` array; anything else yields nothing
    pub fn role_names(&self) -> Vec<&str> {
        match &self.roles {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `roleId` as a string, accepting `"2"` and `2`
    pub fn role_id(&self) -> Option<String> {
        match &self.role_id {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Claims written by [`crate::TokenIssuer`]
#[derive(Debug, Clone, Serialize)]
pub struct IssuedClaims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(rename = "roleId", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}
