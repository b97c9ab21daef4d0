// src/lib.rs

//! Post-authentication identity correlation for OpenID Connect sign-on.
//!
//! Given the claim set a completed, trusted OIDC exchange left behind, the
//! [`login::AutoLogin`] engine finds or provisions a matching local user in
//! the host portal platform and returns credentials the platform's
//! authentication layer can act on. The protocol exchange itself, session
//! storage, configuration loading, and the user repository are all host
//! collaborators behind the traits in [`portal`].

pub mod config;
pub mod error;
pub mod login;
pub mod model;
pub mod portal;
pub mod provider;

/// The public prelude for the `oidc-autologin` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::config::{ProviderType, TenantConfig, TenantConfigBuilder};
    pub use crate::error::AutoLoginError;
    pub use crate::login::AutoLogin;
    pub use crate::model::{CanonicalIdentity, LoginOutcome, RawClaims, TenantId};
    pub use crate::portal::{ClaimSource, ConfigProvider, TenantResolver, UserStore};
    pub use crate::provider::{ClaimMapper, ProviderRegistry};
}
