// src/error.rs

use thiserror::Error;

use crate::config::ProviderType;

/// The primary error type for the `oidc-autologin` library.
#[derive(Error, Debug)]
pub enum AutoLoginError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("A required configuration field is missing: {0}")]
    MissingConfiguration(String),

    /// The stored claim set carries no usable email address, so there is
    /// nothing to correlate a portal user against.
    #[error("Cannot correlate to a portal user: claim set is missing a non-blank email")]
    MissingEmailClaim,

    /// A tenant selected a provider type that no `ClaimMapper` was
    /// registered for. This is a configuration mistake, not a runtime state.
    #[error("No claim mapper registered for provider type: {0:?}")]
    UnregisteredProvider(ProviderType),

    /// A failure inside one of the host-portal collaborators (tenant
    /// resolution, configuration lookup, claim retrieval, user store).
    /// Propagated unmodified so the host platform sees the real outage.
    #[error("Portal collaborator failure: {0}")]
    Portal(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl AutoLoginError {
    /// Wraps an arbitrary collaborator failure.
    ///
    /// Convenience for collaborator implementations so they can write
    /// `.map_err(AutoLoginError::portal)` instead of boxing by hand.
    pub fn portal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AutoLoginError::Portal(Box::new(err))
    }
}
