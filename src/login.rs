// src/login.rs

use std::sync::Arc;

use tracing::{error, instrument, trace};
use uuid::Uuid;

use crate::error::AutoLoginError;
use crate::model::LoginOutcome;
use crate::portal::{ClaimSource, ConfigProvider, TenantResolver, UserStore};
use crate::provider::ProviderRegistry;

/// The OIDC auto-login correlation engine.
///
/// Used in tandem with the host's OIDC exchange filter: the filter runs the
/// OAuth conversation and stores the resulting claims where the
/// [`ClaimSource`] can find them, and this engine uses those claims to find
/// a corresponding portal user or create a new one if none is found.
///
/// Stateless per invocation: the engine holds no mutable state across
/// calls, so one instance serves concurrent requests without coordination.
/// Same-identity races are resolved by the [`UserStore`], not here.
pub struct AutoLogin<Ctx> {
    tenants: Arc<dyn TenantResolver<Ctx>>,
    configs: Arc<dyn ConfigProvider>,
    claims: Arc<dyn ClaimSource<Ctx>>,
    users: Arc<dyn UserStore>,
    providers: ProviderRegistry,
}

impl<Ctx: Sync> AutoLogin<Ctx> {
    /// Creates a new `AutoLogin` engine over the host's collaborators.
    ///
    /// The registry is fixed at construction; use
    /// [`ProviderRegistry::standard`] unless the host registers custom
    /// mappers.
    pub fn new(
        tenants: Arc<dyn TenantResolver<Ctx>>,
        configs: Arc<dyn ConfigProvider>,
        claims: Arc<dyn ClaimSource<Ctx>>,
        users: Arc<dyn UserStore>,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            tenants,
            configs,
            claims,
            users,
            providers,
        }
    }

    /// Attempts an auto-login for one inbound request.
    ///
    /// Evaluates a linear decision ladder, first match wins:
    /// 1. Auto-login disabled for the tenant → `NoDecision`, before any
    ///    claim inspection.
    /// 2. No stored claim set → `NoDecision` (no current OIDC
    ///    conversation).
    /// 3. Claims present but no usable email → `Err(MissingEmailClaim)`.
    /// 4. Otherwise one `find_or_create_user` upsert, then
    ///    `Authenticated` with the resulting user id, a fresh session
    ///    nonce, and `remember_me = false`.
    ///
    /// Collaborator faults propagate unmodified; the engine neither masks
    /// nor retries them.
    #[instrument(skip(self, ctx), err)]
    pub async fn attempt_correlated_login(
        &self,
        ctx: &Ctx,
    ) -> Result<LoginOutcome, AutoLoginError> {
        let tenant = self.tenants.resolve_tenant(ctx).await?;
        let config = self.configs.tenant_config(&tenant).await?;

        if !config.enabled {
            trace!(%tenant, "OIDC auto-login not enabled for this tenant, skipping");
            return Ok(LoginOutcome::NoDecision);
        }

        let Some(claims) = self.claims.stored_claims(ctx).await? else {
            // Normal flow, apparently no current OIDC conversation.
            trace!(%tenant, "No current OIDC conversation, no auto-login");
            return Ok(LoginOutcome::NoDecision);
        };

        let mapper = self.providers.mapper(config.provider_type)?;
        let identity = mapper.canonicalize(&claims);

        if !identity.has_email() {
            // Claims are treated as already trusted at this stage; log the
            // full set so the missing field can be diagnosed.
            error!(
                %tenant,
                ?claims,
                "OIDC claim set does not contain an email field, cannot correlate to a portal user"
            );
            return Err(AutoLoginError::MissingEmailClaim);
        }

        trace!(%tenant, email = %identity.email, "Found stored OIDC claims, correlating");

        let user_id = self.users.find_or_create_user(&tenant, &identity).await?;

        trace!(%tenant, %user_id, email = %identity.email, "Returning credentials");

        Ok(LoginOutcome::Authenticated {
            user_id,
            session_nonce: Uuid::new_v4().to_string(),
            remember_me: false,
        })
    }
}
