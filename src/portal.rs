// src/portal.rs

use async_trait::async_trait;

use crate::config::TenantConfig;
use crate::error::AutoLoginError;
use crate::model::{CanonicalIdentity, RawClaims, TenantId};

/// Resolves which tenant (virtual instance) an inbound request belongs to.
///
/// `Ctx` is the host platform's opaque request-context type; this crate
/// never inspects it.
#[async_trait]
pub trait TenantResolver<Ctx: Sync>: Send + Sync {
    async fn resolve_tenant(&self, ctx: &Ctx) -> Result<TenantId, AutoLoginError>;
}

/// Supplies the per-tenant OIDC configuration.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn tenant_config(&self, tenant: &TenantId) -> Result<TenantConfig, AutoLoginError>;
}

/// Yields the claim set a completed OIDC exchange left behind for this
/// request, if any.
///
/// `Ok(None)` is the expected steady state for requests with no active
/// OIDC conversation and must not be treated as a failure.
#[async_trait]
pub trait ClaimSource<Ctx: Sync>: Send + Sync {
    async fn stored_claims(&self, ctx: &Ctx) -> Result<Option<RawClaims>, AutoLoginError>;
}

/// The host platform's user repository.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Locates the portal user matching the identity within the tenant and
    /// refreshes its profile attributes from the incoming claims, or
    /// provisions a new user with those attributes. Returns the local user
    /// id either way.
    ///
    /// Contract: idempotent per (tenant, email) pair and safe under
    /// concurrent calls for the same pair — the implementor owns the match
    /// key and the update-vs-create split, and must resolve same-identity
    /// races itself (e.g. treat a unique-constraint loser as "find"). The
    /// correlation engine calls this at most once per request and never
    /// retries.
    async fn find_or_create_user(
        &self,
        tenant: &TenantId,
        identity: &CanonicalIdentity,
    ) -> Result<String, AutoLoginError>;
}
