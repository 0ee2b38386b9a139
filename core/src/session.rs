//! Session issuance: an opaque bearer token plus expiry for an
//! authenticated identity.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredential {
    pub token: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionIssuer {
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issue a fresh credential bound to `subject`. Tokens are opaque —
    /// nothing downstream parses them.
    pub fn issue(&self, subject: &str) -> SessionCredential {
        SessionCredential {
            token: Uuid::new_v4().simple().to_string(),
            subject: subject.to_string(),
            expires_at: Utc::now() + self.ttl,
        }
    }
}
