//! Login integrity tracker tests.
//!
//! Verifies:
//!   - Provenance fields are written on successful login
//!   - The duplicate-IP marker flags only the account that collided
//!   - The marker is recomputed (cleared) on the next clean login
//!   - An unresolvable client address skips geolocation entirely
//!   - Resolver failure degrades to null geo fields, never a failed login
//!   - The forwarded-for chain wins over the peer address

use memberdesk_core::backend::Backend;
use memberdesk_core::customer_admin::NewCustomer;
use memberdesk_core::geo::{GeoInfo, GeoResolver, StaticResolver};
use memberdesk_core::login_tracker::ClientAddr;
use serde_json::json;

fn new_customer(login: &str) -> NewCustomer {
    serde_json::from_value(json!({
        "loginUserName": login,
        "loginPassword": "secret123",
        "name": format!("{login} account"),
    }))
    .unwrap()
}

fn client(ip: &str) -> ClientAddr {
    ClientAddr::from_peer(ip.parse().unwrap())
}

fn geo_backend() -> Backend {
    let resolver = StaticResolver::new().with_entry(
        "1.2.3.4",
        GeoInfo {
            country: Some("Testland".to_string()),
            city: Some("Testville".to_string()),
            region: Some("TS".to_string()),
            isp: Some("Test ISP".to_string()),
        },
    );
    Backend::build_test_with_geo(Box::new(resolver)).unwrap()
}

fn login(backend: &Backend, name: &str, client: &ClientAddr) {
    backend
        .auth()
        .authenticate(name, "secret123", client)
        .unwrap();
}

#[test]
fn provenance_written_on_successful_login() {
    let backend = geo_backend();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    login(&backend, "alice", &client("1.2.3.4"));

    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    let prov = &stored.provenance;
    assert_eq!(prov.login_ip.as_deref(), Some("1.2.3.4"));
    assert_eq!(prov.login_country.as_deref(), Some("Testland"));
    assert_eq!(prov.login_isp.as_deref(), Some("Test ISP"));
    assert!(prov.login_at.is_some());
    assert_eq!(prov.duplicate_ip, None);
}

/// If B logs in from X while A's last recorded IP is also X, B gets the
/// marker and A stays untouched until A's own next login.
#[test]
fn duplicate_ip_flags_the_second_account_only() {
    let backend = geo_backend();
    let a = backend.customers().create(&new_customer("alpha")).unwrap();
    let b = backend.customers().create(&new_customer("bravo")).unwrap();

    login(&backend, "alpha", &client("1.2.3.4"));
    login(&backend, "bravo", &client("1.2.3.4"));

    let a_row = backend.store().customer_by_id(a.id).unwrap().unwrap();
    let b_row = backend.store().customer_by_id(b.id).unwrap().unwrap();
    assert_eq!(b_row.provenance.duplicate_ip.as_deref(), Some("1.2.3.4"));
    assert_eq!(a_row.provenance.duplicate_ip, None);
}

/// The marker is a point-in-time computation, not an accumulator: a
/// later login from a clean address clears it.
#[test]
fn duplicate_marker_recomputed_on_every_login() {
    let backend = geo_backend();
    backend.customers().create(&new_customer("alpha")).unwrap();
    let b = backend.customers().create(&new_customer("bravo")).unwrap();

    login(&backend, "alpha", &client("1.2.3.4"));
    login(&backend, "bravo", &client("1.2.3.4"));
    login(&backend, "bravo", &client("5.6.7.8"));

    let b_row = backend.store().customer_by_id(b.id).unwrap().unwrap();
    assert_eq!(b_row.provenance.duplicate_ip, None);
    assert_eq!(b_row.provenance.login_ip.as_deref(), Some("5.6.7.8"));
}

/// No forwarded header and no peer address: the sentinel skips
/// geolocation and duplicate detection, clears the marker, and still
/// records the login timestamp.
#[test]
fn unresolvable_client_skips_enrichment() {
    let backend = geo_backend();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    backend
        .auth()
        .authenticate("alice", "secret123", &ClientAddr::default())
        .unwrap();

    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    let prov = &stored.provenance;
    assert_eq!(prov.login_ip, None);
    assert_eq!(prov.login_country, None);
    assert_eq!(prov.duplicate_ip, None);
    assert!(prov.login_at.is_some());
}

struct FailingResolver;

impl GeoResolver for FailingResolver {
    fn resolve(&self, _ip: &str) -> anyhow::Result<GeoInfo> {
        Err(anyhow::anyhow!("lookup service unreachable"))
    }
}

/// A dead geolocation service must not fail the login — the IP and
/// timestamp still land, the geo fields stay null.
#[test]
fn resolver_failure_degrades_to_null_fields() {
    let backend = Backend::build_test_with_geo(Box::new(FailingResolver)).unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let login = backend
        .auth()
        .authenticate("alice", "secret123", &client("1.2.3.4"))
        .unwrap();
    assert!(login.enrichment_warning.is_none());

    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    let prov = &stored.provenance;
    assert_eq!(prov.login_ip.as_deref(), Some("1.2.3.4"));
    assert_eq!(prov.login_country, None);
    assert_eq!(prov.login_isp, None);
    assert!(prov.login_at.is_some());
}

#[test]
fn forwarded_chain_preferred_over_peer() {
    let backend = geo_backend();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let addr = ClientAddr {
        forwarded_for: Some("1.2.3.4, 10.0.0.1".to_string()),
        peer: Some("9.9.9.9".parse().unwrap()),
    };
    backend
        .auth()
        .authenticate("alice", "secret123", &addr)
        .unwrap();

    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    assert_eq!(stored.provenance.login_ip.as_deref(), Some("1.2.3.4"));
    // The forwarded entry resolved, so the geo fixture applies too.
    assert_eq!(
        stored.provenance.login_country.as_deref(),
        Some("Testland")
    );
}

/// Tracker snapshot matches what lands in the store.
#[test]
fn snapshot_reflects_stored_row() {
    let backend = geo_backend();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let snapshot = backend
        .login_tracker()
        .record_login(created.id, &client("1.2.3.4"))
        .unwrap();
    assert_eq!(snapshot.client_ip, "1.2.3.4");
    assert_eq!(snapshot.duplicate_ip, None);

    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    assert_eq!(stored.provenance.login_ip.as_deref(), Some("1.2.3.4"));
    assert_eq!(
        stored.provenance.login_country,
        snapshot.geo.country
    );
}
