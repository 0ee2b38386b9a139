//! Geolocation resolution for login provenance.
//!
//! The backend depends only on the `GeoResolver` contract. Lookup
//! failures never abort a login — the tracker substitutes null fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// What a lookup yields. Every field is optional; a failed or unknown
/// lookup is simply all-`None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub isp: Option<String>,
}

pub trait GeoResolver: Send + Sync {
    fn resolve(&self, ip: &str) -> anyhow::Result<GeoInfo>;
}

// ── HTTP resolver ────────────────────────────────────────────────────

/// Resolver against an ip-api.com style JSON endpoint:
/// `GET {endpoint}/{ip}` → `{status, country, city, regionName, isp}`.
pub struct IpApiResolver {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct IpApiPayload {
    status: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, rename = "regionName")]
    region_name: Option<String>,
    #[serde(default)]
    isp: Option<String>,
}

impl IpApiResolver {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl GeoResolver for IpApiResolver {
    fn resolve(&self, ip: &str) -> anyhow::Result<GeoInfo> {
        let url = format!("{}/{ip}", self.endpoint);
        let payload: IpApiPayload = self.client.get(&url).send()?.error_for_status()?.json()?;
        if payload.status != "success" {
            // The service answered but could not place the address
            // (reserved range, private IP). Not an error.
            return Ok(GeoInfo::default());
        }
        Ok(GeoInfo {
            country: payload.country,
            city: payload.city,
            region: payload.region_name,
            isp: payload.isp,
        })
    }
}

// ── Static resolver ──────────────────────────────────────────────────

/// Fixture-backed resolver for tests and offline runs. Unknown addresses
/// resolve to the all-`None` `GeoInfo`.
#[derive(Debug, Default)]
pub struct StaticResolver {
    entries: HashMap<String, GeoInfo>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ip: &str, info: GeoInfo) {
        self.entries.insert(ip.to_string(), info);
    }

    pub fn with_entry(mut self, ip: &str, info: GeoInfo) -> Self {
        self.insert(ip, info);
        self
    }
}

impl GeoResolver for StaticResolver {
    fn resolve(&self, ip: &str) -> anyhow::Result<GeoInfo> {
        Ok(self.entries.get(ip).cloned().unwrap_or_default())
    }
}
