//! The backend facade — wires the store, the geolocation resolver, and
//! the session issuer into the service surface.
//!
//! RULE: persistence is an injected dependency with an explicit
//! connect/close lifecycle scoped to process start/stop. Nothing in
//! this crate reaches for a global handle.

use crate::auth_service::AuthService;
use crate::capability_gate::CapabilityGate;
use crate::config::AppConfig;
use crate::customer_admin::CustomerAdmin;
use crate::error::ServiceResult;
use crate::geo::{GeoResolver, IpApiResolver, StaticResolver};
use crate::login_tracker::LoginTracker;
use crate::session::SessionIssuer;
use crate::store::Store;
use crate::vip::VipService;
use std::time::Duration;

pub struct Backend {
    store: Store,
    issuer: SessionIssuer,
    geo: Box<dyn GeoResolver>,
}

impl Backend {
    /// Connect per configuration: open (or create) the database, apply
    /// migrations, and stand up the configured geolocation resolver.
    pub fn connect(config: &AppConfig) -> ServiceResult<Self> {
        let geo: Box<dyn GeoResolver> = if config.geo.enabled {
            Box::new(IpApiResolver::new(
                &config.geo.endpoint,
                Duration::from_secs(config.geo.timeout_secs),
            )?)
        } else {
            Box::new(StaticResolver::new())
        };
        Self::connect_with_resolver(config, geo)
    }

    /// Connect with an explicit resolver (tests, offline runs).
    pub fn connect_with_resolver(
        config: &AppConfig,
        geo: Box<dyn GeoResolver>,
    ) -> ServiceResult<Self> {
        let store = match &config.db_path {
            Some(path) => Store::open(path)?,
            None => Store::in_memory()?,
        };
        store.migrate()?;
        log::info!(
            "backend connected (db: {})",
            config.db_path.as_deref().unwrap_or(":memory:")
        );
        Ok(Self {
            store,
            issuer: SessionIssuer::new(config.session_ttl_minutes),
            geo,
        })
    }

    /// In-memory backend with a fixture resolver. Used by tests.
    pub fn build_test() -> ServiceResult<Self> {
        Self::build_test_with_geo(Box::new(StaticResolver::new()))
    }

    pub fn build_test_with_geo(geo: Box<dyn GeoResolver>) -> ServiceResult<Self> {
        let config = AppConfig::default();
        Self::connect_with_resolver(&config, geo)
    }

    /// Explicit end of life. The connection closes on drop; this exists
    /// so shutdown is a visible step at the call site.
    pub fn close(self) {
        log::info!("backend disconnected");
    }

    // ── Service surface ───────────────────────────────────────────────

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.store, &self.issuer, self.geo.as_ref())
    }

    pub fn login_tracker(&self) -> LoginTracker<'_> {
        LoginTracker::new(&self.store, self.geo.as_ref())
    }

    pub fn capability_gate(&self) -> CapabilityGate<'_> {
        CapabilityGate::new(&self.store)
    }

    pub fn customers(&self) -> CustomerAdmin<'_> {
        CustomerAdmin::new(&self.store)
    }

    pub fn vip(&self) -> VipService<'_> {
        VipService::new(&self.store)
    }

    /// Direct store access for tests and tooling.
    pub fn store(&self) -> &Store {
        &self.store
    }
}
