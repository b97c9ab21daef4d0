use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oidc_autologin::prelude::*;
use serde_json::json;

/// The host request context stand-in. The engine never looks inside it.
struct PortalRequest;

struct StaticTenantResolver(TenantId);

#[async_trait]
impl TenantResolver<PortalRequest> for StaticTenantResolver {
    async fn resolve_tenant(&self, _ctx: &PortalRequest) -> Result<TenantId, AutoLoginError> {
        Ok(self.0.clone())
    }
}

struct StaticConfigProvider(TenantConfig);

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn tenant_config(&self, _tenant: &TenantId) -> Result<TenantConfig, AutoLoginError> {
        Ok(self.0.clone())
    }
}

/// Serves a fixed claim set and counts how often it is consulted.
struct SessionClaimSource {
    claims: Option<RawClaims>,
    reads: AtomicUsize,
}

impl SessionClaimSource {
    fn new(claims: Option<RawClaims>) -> Self {
        Self {
            claims,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ClaimSource<PortalRequest> for SessionClaimSource {
    async fn stored_claims(&self, _ctx: &PortalRequest) -> Result<Option<RawClaims>, AutoLoginError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.claims.clone())
    }
}

/// An in-memory user store that records every upsert and assigns stable
/// ids per (tenant, email) pair, the way a real store's unique constraint
/// would.
#[derive(Default)]
struct RecordingUserStore {
    calls: Mutex<Vec<(TenantId, CanonicalIdentity)>>,
    ids: Mutex<HashMap<(TenantId, String), String>>,
}

impl RecordingUserStore {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls(&self) -> Vec<(TenantId, CanonicalIdentity)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for RecordingUserStore {
    async fn find_or_create_user(
        &self,
        tenant: &TenantId,
        identity: &CanonicalIdentity,
    ) -> Result<String, AutoLoginError> {
        self.calls
            .lock()
            .unwrap()
            .push((tenant.clone(), identity.clone()));

        let mut ids = self.ids.lock().unwrap();
        let next_id = format!("user-{}", ids.len() + 1);
        let id = ids
            .entry((tenant.clone(), identity.email.clone()))
            .or_insert(next_id);
        Ok(id.clone())
    }
}

/// A user store whose backing storage is down.
struct UnavailableUserStore;

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn find_or_create_user(
        &self,
        _tenant: &TenantId,
        _identity: &CanonicalIdentity,
    ) -> Result<String, AutoLoginError> {
        Err(AutoLoginError::portal(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "user database unavailable",
        )))
    }
}

fn enabled_config(provider_type: ProviderType) -> TenantConfig {
    TenantConfigBuilder::new()
        .enabled(true)
        .provider_type(provider_type)
        .issuer_url("https://login.example.org")
        .unwrap()
        .client_id("portal-client".to_string())
        .build()
        .unwrap()
}

struct Harness {
    engine: AutoLogin<PortalRequest>,
    claim_source: Arc<SessionClaimSource>,
    user_store: Arc<RecordingUserStore>,
}

fn harness(config: TenantConfig, claims: Option<RawClaims>) -> Harness {
    init_tracing();
    let claim_source = Arc::new(SessionClaimSource::new(claims));
    let user_store = Arc::new(RecordingUserStore::default());
    let engine = AutoLogin::new(
        Arc::new(StaticTenantResolver(TenantId::from("T"))),
        Arc::new(StaticConfigProvider(config)),
        claim_source.clone(),
        user_store.clone(),
        ProviderRegistry::standard(),
    );
    Harness {
        engine,
        claim_source,
        user_store,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oidc_autologin=trace")),
        )
        .with_test_writer()
        .try_init();
}

fn standard_claims() -> RawClaims {
    RawClaims::from_userinfo(&json!({
        "email": "a@x.com",
        "given_name": "Ann",
        "family_name": "Lee",
        "sub": "ext-1"
    }))
}

#[tokio::test]
async fn disabled_tenant_yields_no_decision_without_claim_processing() {
    let h = harness(TenantConfig::disabled(), Some(standard_claims()));

    let outcome = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();

    assert_eq!(outcome, LoginOutcome::NoDecision);
    assert_eq!(
        h.claim_source.reads.load(Ordering::SeqCst),
        0,
        "A disabled tenant must be skipped before any claim inspection"
    );
    assert_eq!(h.user_store.call_count(), 0);
}

#[tokio::test]
async fn absent_conversation_yields_no_decision() {
    let h = harness(enabled_config(ProviderType::Generic), None);

    let outcome = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();

    assert_eq!(outcome, LoginOutcome::NoDecision);
    assert_eq!(h.user_store.call_count(), 0);
}

#[tokio::test]
async fn missing_email_is_an_error_and_the_store_is_never_touched() {
    let h = harness(
        enabled_config(ProviderType::Generic),
        Some(RawClaims::from_userinfo(&json!({"given_name": "Ann"}))),
    );

    let result = h.engine.attempt_correlated_login(&PortalRequest).await;

    assert!(matches!(result, Err(AutoLoginError::MissingEmailClaim)));
    assert_eq!(h.user_store.call_count(), 0);
}

#[tokio::test]
async fn correlation_upserts_once_and_returns_the_store_assigned_id() {
    let h = harness(enabled_config(ProviderType::Generic), Some(standard_claims()));

    let outcome = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();

    let LoginOutcome::Authenticated {
        user_id,
        session_nonce,
        remember_me,
    } = outcome
    else {
        panic!("expected an authenticated outcome");
    };
    assert_eq!(user_id, "user-1");
    assert!(!session_nonce.is_empty());
    assert!(!remember_me);

    let calls = h.user_store.calls();
    assert_eq!(calls.len(), 1, "Exactly one upsert per invocation");
    assert_eq!(calls[0].0, TenantId::from("T"));
    assert_eq!(
        calls[0].1,
        CanonicalIdentity {
            email: "a@x.com".to_string(),
            given_name: "Ann".to_string(),
            family_name: "Lee".to_string(),
            external_id: "ext-1".to_string(),
        }
    );
    println!("✅ Correlated to store-assigned user id with a single upsert.");
}

#[tokio::test]
async fn repeat_login_correlates_to_the_same_user_with_fresh_nonces() {
    let h = harness(enabled_config(ProviderType::Generic), Some(standard_claims()));

    let first = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();
    let second = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();

    let (LoginOutcome::Authenticated {
        user_id: id_a,
        session_nonce: nonce_a,
        ..
    }, LoginOutcome::Authenticated {
        user_id: id_b,
        session_nonce: nonce_b,
        ..
    }) = (first, second)
    else {
        panic!("expected two authenticated outcomes");
    };

    assert_eq!(id_a, id_b, "Repeat login must not create a duplicate user");
    assert_ne!(nonce_a, nonce_b, "Session nonces must never be reused");
    assert_eq!(h.user_store.call_count(), 2);
    println!("✅ Repeat login reused the account but not the nonce.");
}

#[tokio::test]
async fn azure_tenant_correlates_on_upn() {
    let h = harness(
        enabled_config(ProviderType::AzureAd),
        Some(RawClaims::from_userinfo(&json!({
            "upn": "ann@corp.example",
            "given_name": "Ann",
            "family_name": "Lee",
            "oid": "11111111-2222-3333-4444-555555555555"
        }))),
    );

    let outcome = h.engine.attempt_correlated_login(&PortalRequest).await.unwrap();

    assert!(outcome.is_authenticated());
    let calls = h.user_store.calls();
    assert_eq!(calls[0].1.email, "ann@corp.example");
    assert_eq!(
        calls[0].1.external_id,
        "11111111-2222-3333-4444-555555555555"
    );
}

#[tokio::test]
async fn user_store_outage_propagates_unmasked() {
    init_tracing();
    let engine: AutoLogin<PortalRequest> = AutoLogin::new(
        Arc::new(StaticTenantResolver(TenantId::from("T"))),
        Arc::new(StaticConfigProvider(enabled_config(ProviderType::Generic))),
        Arc::new(SessionClaimSource::new(Some(standard_claims()))),
        Arc::new(UnavailableUserStore),
        ProviderRegistry::standard(),
    );

    let result = engine.attempt_correlated_login(&PortalRequest).await;

    assert!(matches!(result, Err(AutoLoginError::Portal(_))));
}

#[tokio::test]
async fn unregistered_provider_type_is_a_configuration_error() {
    init_tracing();
    let engine: AutoLogin<PortalRequest> = AutoLogin::new(
        Arc::new(StaticTenantResolver(TenantId::from("T"))),
        Arc::new(StaticConfigProvider(enabled_config(ProviderType::AzureAd))),
        Arc::new(SessionClaimSource::new(Some(standard_claims()))),
        Arc::new(RecordingUserStore::default()),
        ProviderRegistry::new().with(
            ProviderType::Generic,
            Arc::new(oidc_autologin::provider::GenericProvider),
        ),
    );

    let result = engine.attempt_correlated_login(&PortalRequest).await;

    assert!(matches!(
        result,
        Err(AutoLoginError::UnregisteredProvider(ProviderType::AzureAd))
    ));
}
