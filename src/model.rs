// src/model.rs

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a tenant (virtual instance / company) of the host
/// portal platform. Resolved per inbound request by the host's
/// `TenantResolver` and held constant for one correlation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        TenantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        TenantId(id.to_string())
    }
}

/// The flat claim set produced by a completed OIDC exchange, as the
/// preceding filter/exchange step stores it: claim name to string value,
/// provider-specific naming, no ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClaims(HashMap<String, String>);

impl RawClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens a JSON object of the kind a userinfo endpoint (or decoded
    /// ID Token payload) returns into string claims. Non-string scalar
    /// values are stringified; nested objects and arrays are skipped, as
    /// the correlation step only ever reads scalar profile claims.
    pub fn from_userinfo(value: &serde_json::Value) -> Self {
        let mut claims = HashMap::new();
        if let Some(object) = value.as_object() {
            for (name, value) in object {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => continue,
                };
                claims.insert(name.clone(), rendered);
            }
        }
        RawClaims(claims)
    }

    /// Returns the value of a claim, or `None` if absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RawClaims {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        RawClaims(iter.into_iter().collect())
    }
}

/// The canonical identity record a provider strategy distills from
/// [`RawClaims`], independent of provider-specific field naming.
///
/// Every field is blank-tolerant; the record is only usable for
/// correlation once `email` is non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    /// The correlation key against the portal user store. Required.
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    /// The provider's stable subject identifier for this user.
    pub external_id: String,
}

impl CanonicalIdentity {
    /// Whether the record carries the required non-blank email.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// The outcome of one correlation attempt.
///
/// Exactly one of `Authenticated`, `NoDecision`, or the `Err` arm of the
/// engine's `Result` per invocation; constructed fresh per request and
/// consumed once by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Correlation succeeded: the caller should treat this portal user as
    /// logged in.
    Authenticated {
        /// The local user id assigned by the portal user store.
        user_id: String,
        /// A freshly generated opaque per-session token. Never reused
        /// across invocations.
        session_nonce: String,
        /// Always `false`; the observed source behavior never remembers
        /// the session.
        remember_me: bool,
    },
    /// No auto-login should occur; the caller falls through to the
    /// platform's normal authentication. The steady state for requests
    /// unrelated to OIDC.
    NoDecision,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}
