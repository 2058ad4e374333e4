//! APNs provider authentication.
//!
//! APNs accepts a short-lived ES256 JWT signed with the team's `.p8` key.
//! [`ProviderTokenIssuer`] signs one and reuses it until the refresh interval
//! passes; Apple rejects tokens older than an hour and throttles re-signing
//! more often than every twenty minutes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use liveclass_config::{ApnsConfig, DispatchConfig};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::ApnsError;

/// Lifetime written into the `exp` claim.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Claims of an APNs provider token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderClaims {
    /// Team id
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material for the provider token.
#[derive(Clone)]
pub struct ApnsCredentials {
    pub team_id: String,
    pub key_id: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for ApnsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsCredentials")
            .field("team_id", &self.team_id)
            .field("key_id", &self.key_id)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ApnsCredentials {
    /// Collects key id, team id and the PEM (inline, or read from
    /// `private_key_path`) from the APNs config section.
    pub fn from_config(config: &ApnsConfig) -> Result<Self, ApnsError> {
        let key_id = present(&config.key_id)
            .ok_or_else(|| ApnsError::Configuration("APNs key id is missing".to_string()))?;
        let team_id = present(&config.team_id)
            .ok_or_else(|| ApnsError::Configuration("APNs team id is missing".to_string()))?;

        let private_key_pem = match (present(&config.private_key), present(&config.private_key_path)) {
            (Some(pem), _) => pem,
            (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                ApnsError::Configuration(format!("cannot read APNs key at {}: {}", path, e))
            })?,
            (None, None) => {
                return Err(ApnsError::Configuration(
                    "APNs private key is missing".to_string(),
                ))
            }
        };

        Ok(Self {
            team_id,
            key_id,
            private_key_pem,
        })
    }
}

struct Signer {
    team_id: String,
    key_id: String,
    key: EncodingKey,
}

struct CachedToken {
    jwt: String,
    issued_at: DateTime<Utc>,
}

/// Issues (and caches) APNs provider tokens.
///
/// Built without usable credentials it stays in the not-ready state and every
/// call to [`issue_token`](Self::issue_token) fails with
/// [`ApnsError::Configuration`].
pub struct ProviderTokenIssuer {
    signer: Result<Signer, String>,
    refresh: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl ProviderTokenIssuer {
    pub fn new(credentials: ApnsCredentials, refresh: Duration) -> Self {
        let signer = EncodingKey::from_ec_pem(credentials.private_key_pem.as_bytes())
            .map(|key| Signer {
                team_id: credentials.team_id,
                key_id: credentials.key_id,
                key,
            })
            .map_err(|e| {
                error!("APNs signing key rejected: {}", e);
                format!("APNs private key is not a valid EC key: {}", e)
            });

        Self {
            signer,
            refresh,
            cached: Mutex::new(None),
        }
    }

    /// An issuer that is permanently not ready.
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            signer: Err(reason.into()),
            refresh: Duration::zero(),
            cached: Mutex::new(None),
        }
    }

    /// Builds the issuer from config. `None` (APNs disabled) or incomplete
    /// credentials yield a not-ready issuer rather than an error.
    pub fn from_config(apns: Option<&ApnsConfig>, dispatch: &DispatchConfig) -> Self {
        let Some(apns) = apns else {
            info!("APNs disabled; live activity dispatch is not ready");
            return Self::unconfigured("APNs is disabled");
        };

        match ApnsCredentials::from_config(apns) {
            Ok(credentials) => Self::new(
                credentials,
                Duration::seconds(dispatch.token_refresh_secs as i64),
            ),
            Err(e) => {
                error!("{}", e);
                Self::unconfigured(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.signer.is_ok()
    }

    /// Why the issuer cannot sign, if it cannot.
    pub fn not_ready_reason(&self) -> Option<&str> {
        self.signer.as_ref().err().map(String::as_str)
    }

    pub fn issue_token(&self) -> Result<String, ApnsError> {
        self.issue_token_at(Utc::now())
    }

    /// Returns the cached token while it is younger than the refresh interval,
    /// otherwise signs a new one.
    pub fn issue_token_at(&self, now: DateTime<Utc>) -> Result<String, ApnsError> {
        let signer = self
            .signer
            .as_ref()
            .map_err(|reason| ApnsError::Configuration(reason.clone()))?;

        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = cached.as_ref() {
            let age = now - token.issued_at;
            if age >= Duration::zero() && age < self.refresh {
                return Ok(token.jwt.clone());
            }
        }

        let claims = ProviderClaims {
            iss: signer.team_id.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(signer.key_id.clone());

        let jwt = encode(&header, &claims, &signer.key)?;
        debug!(key_id = %signer.key_id, "signed new APNs provider token");

        *cached = Some(CachedToken {
            jwt: jwt.clone(),
            issued_at: now,
        });
        Ok(jwt)
    }
}
