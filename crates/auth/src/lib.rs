//! Loanstats Auth - bearer-token authentication
//!
//! Turns a signed JWT into a [`Principal`] (subject + `ROLE_*` authorities),
//! or into "no principal". Verification failures never escape as errors.
//!
//! Also provides [`TokenIssuer`] to mint tokens for local use and tests.

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod issuer;
pub mod principal;
pub mod roles;
pub mod settings;

pub use authenticator::{bearer_token, TokenAuthenticator};
pub use error::{AuthConfigError, AuthFailure, IssueError};
pub use issuer::{TokenIssuer, TokenRequest};
pub use principal::Principal;
pub use roles::RoleTable;
pub use settings::JwtSettings;
