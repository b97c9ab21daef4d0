// src/provider.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProviderType;
use crate::error::AutoLoginError;
use crate::model::{CanonicalIdentity, RawClaims};

/// Translates a provider-specific claim set into canonical identity fields.
///
/// One implementation per provider variant, hiding field-naming differences
/// from the correlation engine. Every operation is best-effort and
/// blank-tolerant: an absent or blank claim yields an empty string, never an
/// error. The caller is responsible for checking that `email` is usable.
pub trait ClaimMapper: Send + Sync {
    /// The email address to correlate on. Blank when the provider's email
    /// claim is absent or empty.
    fn email(&self, claims: &RawClaims) -> String;

    fn given_name(&self, claims: &RawClaims) -> String;

    fn family_name(&self, claims: &RawClaims) -> String;

    /// The provider's stable subject identifier for this user.
    fn external_id(&self, claims: &RawClaims) -> String;

    /// Assembles the full canonical record. Pure mapping over the input.
    fn canonicalize(&self, claims: &RawClaims) -> CanonicalIdentity {
        CanonicalIdentity {
            email: self.email(claims),
            given_name: self.given_name(claims),
            family_name: self.family_name(claims),
            external_id: self.external_id(claims),
        }
    }
}

fn claim_or_blank(claims: &RawClaims, name: &str) -> String {
    claims.get(name).unwrap_or_default().trim().to_string()
}

fn first_non_blank(claims: &RawClaims, names: &[&str]) -> String {
    for name in names {
        let value = claim_or_blank(claims, name);
        if !value.is_empty() {
            return value;
        }
    }
    String::new()
}

/// Claim mapping for providers that follow plain OpenID Connect naming.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericProvider;

impl ClaimMapper for GenericProvider {
    fn email(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "email")
    }

    fn given_name(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "given_name")
    }

    fn family_name(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "family_name")
    }

    fn external_id(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "sub")
    }
}

/// Claim mapping for Azure AD / ADFS tenants.
///
/// Azure tokens frequently omit the `email` claim and carry the address in
/// `upn` instead; the stable per-user identifier is `oid`, with `sub` only
/// stable per (user, application).
#[derive(Debug, Default, Clone, Copy)]
pub struct AzureAdProvider;

impl ClaimMapper for AzureAdProvider {
    fn email(&self, claims: &RawClaims) -> String {
        first_non_blank(claims, &["email", "upn"])
    }

    fn given_name(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "given_name")
    }

    fn family_name(&self, claims: &RawClaims) -> String {
        claim_or_blank(claims, "family_name")
    }

    fn external_id(&self, claims: &RawClaims) -> String {
        first_non_blank(claims, &["oid", "sub"])
    }
}

/// An explicit mapping from `ProviderType` to the `ClaimMapper` that
/// understands it, passed to the correlation engine at construction.
///
/// Deliberately not a process-wide registry: every engine instance carries
/// its own, so tests and multi-engine hosts stay isolated.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    mappers: HashMap<ProviderType, Arc<dyn ClaimMapper>>,
}

impl ProviderRegistry {
    /// An empty registry. Useful for hosts that only register custom
    /// mappers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with both built-in providers registered.
    pub fn standard() -> Self {
        Self::new()
            .with(ProviderType::Generic, Arc::new(GenericProvider))
            .with(ProviderType::AzureAd, Arc::new(AzureAdProvider))
    }

    /// Registers (or replaces) the mapper for a provider type.
    pub fn with(mut self, provider_type: ProviderType, mapper: Arc<dyn ClaimMapper>) -> Self {
        self.mappers.insert(provider_type, mapper);
        self
    }

    /// Looks up the mapper for a provider type.
    ///
    /// # Errors
    ///
    /// `UnregisteredProvider` when a tenant's configuration names a type no
    /// mapper was registered for.
    pub fn mapper(&self, provider_type: ProviderType) -> Result<&dyn ClaimMapper, AutoLoginError> {
        self.mappers
            .get(&provider_type)
            .map(Arc::as_ref)
            .ok_or(AutoLoginError::UnregisteredProvider(provider_type))
    }
}
