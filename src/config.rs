// src/config.rs

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AutoLoginError;

/// Selects the claim-mapping strategy for a tenant's identity provider.
///
/// Each variant corresponds to one registered `ClaimMapper`; the variant is
/// part of a tenant's stored configuration, so it serializes to a stable
/// lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Plain OpenID Connect claim naming (`email`, `given_name`,
    /// `family_name`, `sub`). The right choice for most providers.
    Generic,
    /// Azure AD / ADFS claim naming (`upn` as email fallback, `oid` as
    /// subject fallback).
    AzureAd,
}

/// Per-tenant OpenID Connect settings, owned and supplied by the host
/// platform's configuration collaborator.
///
/// The correlation engine itself reads only `enabled` and `provider_type`;
/// the remaining fields describe the exchange that precedes correlation and
/// are carried for the host integration that drives it. Read-only for the
/// duration of a correlation attempt. Construct via [`TenantConfigBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Whether OIDC auto-login is enabled for this tenant. When `false`
    /// the correlation engine skips the tenant without inspecting claims.
    pub enabled: bool,
    /// Which claim-mapping strategy translates this tenant's claims.
    pub provider_type: ProviderType,
    /// The issuer URL of the tenant's OIDC provider.
    pub issuer_url: Option<Url>,
    /// The client ID registered with the provider.
    pub client_id: Option<String>,
    /// The scope requested during the exchange, e.g. "openid profile email".
    pub scope: Option<String>,
}

impl TenantConfig {
    /// Configuration for a tenant that has not enabled OIDC auto-login.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            provider_type: ProviderType::Generic,
            issuer_url: None,
            client_id: None,
            scope: None,
        }
    }
}

/// A builder for creating a `TenantConfig` instance.
///
/// Validates the issuer URL and enforces that an enabled tenant carries the
/// fields the exchange needs.
#[derive(Default)]
pub struct TenantConfigBuilder {
    enabled: bool,
    provider_type: Option<ProviderType>,
    issuer_url: Option<Url>,
    client_id: Option<String>,
    scope: Option<String>,
}

impl TenantConfigBuilder {
    /// Creates a new `TenantConfigBuilder`. Auto-login starts disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables OIDC auto-login for the tenant.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the claim-mapping strategy. Defaults to `ProviderType::Generic`.
    pub fn provider_type(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = Some(provider_type);
        self
    }

    /// Sets the issuer URL of the tenant's OIDC provider. Required when the
    /// tenant is enabled.
    ///
    /// # Arguments
    ///
    /// * `url` - The issuer URL, e.g. "https://login.example.org".
    pub fn issuer_url(mut self, url: &str) -> Result<Self, AutoLoginError> {
        let parsed_url = Url::parse(url).map_err(|e| AutoLoginError::InvalidUrl(e.to_string()))?;
        self.issuer_url = Some(parsed_url);
        Ok(self)
    }

    /// Sets the client ID registered with the provider. Required when the
    /// tenant is enabled.
    pub fn client_id(mut self, client_id: String) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the scope requested during the exchange. Optional.
    pub fn scope(mut self, scope: String) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Consumes the builder and returns a `TenantConfig` object.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is enabled but `issuer_url` or
    /// `client_id` is missing.
    pub fn build(self) -> Result<TenantConfig, AutoLoginError> {
        if self.enabled {
            if self.issuer_url.is_none() {
                return Err(AutoLoginError::MissingConfiguration(
                    "issuer_url".to_string(),
                ));
            }
            if self.client_id.is_none() {
                return Err(AutoLoginError::MissingConfiguration(
                    "client_id".to_string(),
                ));
            }
        }

        Ok(TenantConfig {
            enabled: self.enabled,
            provider_type: self.provider_type.unwrap_or(ProviderType::Generic),
            issuer_url: self.issuer_url,
            client_id: self.client_id,
            scope: self.scope,
        })
    }
}
