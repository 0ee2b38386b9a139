//! Login integrity tracking — provenance enrichment and duplicate-IP
//! detection for successful logins.
//!
//! RULES:
//!   - Enrichment runs after authentication and before the response.
//!   - Enrichment failure never fails the login; callers downgrade it
//!     to a logged warning.
//!   - Every login re-resolves geolocation. No cache, no retry.

use crate::error::ServiceResult;
use crate::geo::{GeoInfo, GeoResolver};
use crate::store::Store;
use crate::types::CustomerId;
use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// Sentinel for a client address that could not be resolved. Suppresses
/// geolocation and duplicate detection for that login.
pub const UNKNOWN_IP: &str = "unknown";

/// Transport-level addressing for an inbound request.
#[derive(Debug, Clone, Default)]
pub struct ClientAddr {
    /// Raw forwarded-for header chain, comma-separated, if present.
    pub forwarded_for: Option<String>,
    /// Direct peer address of the connection.
    pub peer: Option<IpAddr>,
}

impl ClientAddr {
    pub fn from_peer(peer: IpAddr) -> Self {
        Self {
            forwarded_for: None,
            peer: Some(peer),
        }
    }

    /// Resolve the effective client IP: first entry of the forwarded
    /// chain when it parses as an address, else the peer address, else
    /// the sentinel.
    pub fn resolve_ip(&self) -> String {
        if let Some(chain) = &self.forwarded_for {
            if let Some(first) = chain.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip.to_string();
                }
            }
        }
        match self.peer {
            Some(peer) => peer.to_string(),
            None => UNKNOWN_IP.to_string(),
        }
    }
}

/// What a recorded login resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceSnapshot {
    pub client_ip: String,
    pub geo: GeoInfo,
    pub duplicate_ip: Option<String>,
    pub login_at: DateTime<Utc>,
}

pub struct LoginTracker<'a> {
    store: &'a Store,
    geo: &'a dyn GeoResolver,
}

impl<'a> LoginTracker<'a> {
    pub fn new(store: &'a Store, geo: &'a dyn GeoResolver) -> Self {
        Self { store, geo }
    }

    /// Enrich a successful login with provenance and the duplicate-IP
    /// marker, written to the customer row in one update.
    pub fn record_login(
        &self,
        customer_id: CustomerId,
        client: &ClientAddr,
    ) -> ServiceResult<ProvenanceSnapshot> {
        let ip = client.resolve_ip();
        let now = Utc::now();

        if ip == UNKNOWN_IP {
            self.store.clear_login_provenance(customer_id, now)?;
            log::debug!("login {customer_id}: unresolvable client address, provenance skipped");
            return Ok(ProvenanceSnapshot {
                client_ip: ip,
                geo: GeoInfo::default(),
                duplicate_ip: None,
                login_at: now,
            });
        }

        let geo = match self.geo.resolve(&ip) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("geolocation lookup failed for {ip}: {e}");
                GeoInfo::default()
            }
        };

        // Point-in-time duplicate check against the latest stored IP of
        // every other customer. Recomputed on every login, never
        // accumulated.
        let duplicate_ip = self
            .store
            .other_customer_with_ip(customer_id, &ip)?
            .map(|other| {
                log::info!("duplicate IP {ip}: customer {customer_id} collides with {other}");
                ip.clone()
            });

        self.store
            .write_login_provenance(customer_id, &ip, &geo, duplicate_ip.as_deref(), now)?;

        Ok(ProvenanceSnapshot {
            client_ip: ip,
            geo,
            duplicate_ip,
            login_at: now,
        })
    }
}
