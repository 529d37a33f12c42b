use actix_web::HttpRequest;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::{
    errors::AuthError,
    settings::{AppConfig, AuthMode},
};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Which policy a route is guarded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Admin,
}

/// Privilege of the credential that satisfied a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Anonymous,
    Public,
    Admin,
}

/// Shared-secret gate. Compares presented credentials against the configured
/// low- and high-privilege secrets in constant time. No expiry, revocation
/// or per-user identity.
pub struct ApiKeyGate {
    mode: AuthMode,
    public_keys: Vec<Zeroizing<String>>,
    admin_keys: Vec<Zeroizing<String>>,
}

impl ApiKeyGate {
    pub fn new(mode: AuthMode, public_keys: Vec<String>, admin_keys: Vec<String>) -> Self {
        let keep = |keys: Vec<String>| {
            keys.into_iter()
                .filter(|k| !k.trim().is_empty())
                .map(Zeroizing::new)
                .collect::<Vec<_>>()
        };

        ApiKeyGate {
            mode,
            public_keys: keep(public_keys),
            admin_keys: keep(admin_keys),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let public_keys = config.public_api_key.iter().cloned().collect();
        let admin_keys = config
            .admin_api_key
            .iter()
            .chain(config.admin_secret.iter())
            .cloned()
            .collect();

        Self::new(config.auth_mode, public_keys, admin_keys)
    }

    pub fn authorize(&self, policy: AccessPolicy, credentials: &[String]) -> Result<AccessLevel, AuthError> {
        if credentials.iter().any(|c| self.is_admin_key(c)) {
            return Ok(AccessLevel::Admin);
        }

        match policy {
            AccessPolicy::Admin => Err(rejection(credentials)),
            AccessPolicy::Public => {
                if credentials.iter().any(|c| matches_any(&self.public_keys, c)) {
                    Ok(AccessLevel::Public)
                } else if self.mode == AuthMode::Open {
                    Ok(AccessLevel::Anonymous)
                } else {
                    Err(rejection(credentials))
                }
            }
        }
    }

    fn is_admin_key(&self, candidate: &str) -> bool {
        matches_any(&self.admin_keys, candidate)
    }
}

fn rejection(credentials: &[String]) -> AuthError {
    if credentials.is_empty() {
        AuthError::MissingCredentials
    } else {
        AuthError::InvalidCredentials
    }
}

/// Every configured key is compared so the time taken does not depend on
/// which one matched.
fn matches_any(keys: &[Zeroizing<String>], candidate: &str) -> bool {
    keys.iter().fold(false, |found, key| {
        let equal: bool = key.as_bytes().ct_eq(candidate.as_bytes()).into();
        found | equal
    })
}

/// Collects credentials from `Authorization: Bearer`, `x-api-key` and
/// `x-admin-secret`, in that order.
pub fn extract_credentials(req: &HttpRequest) -> Vec<String> {
    let headers = req.headers();
    let mut found = Vec::with_capacity(3);

    if let Some(token) = headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
    {
        found.push(token);
    }

    for name in [API_KEY_HEADER, ADMIN_SECRET_HEADER] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                found.push(value.to_string());
            }
        }
    }

    found
}
