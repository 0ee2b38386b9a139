//! Customer CRUD and list-filter tests.
//!
//! Verifies:
//!   - Creation defaults (pending status, default flags, number code)
//!   - Duplicate login names are rejected
//!   - Partial updates leave unspecified fields alone
//!   - Deletion is blocked while active bank details exist
//!   - List filters: substring matches, status, and the inclusive
//!     end-date boundary

use chrono::{TimeZone, Utc};
use memberdesk_core::backend::Backend;
use memberdesk_core::customer_admin::{CustomerFilter, CustomerUpdate, NewCustomer};
use memberdesk_core::error::ServiceError;
use serde_json::json;

fn new_customer(login: &str) -> NewCustomer {
    serde_json::from_value(json!({
        "loginUserName": login,
        "loginPassword": "secret123",
        "name": format!("{login} account"),
    }))
    .unwrap()
}

#[test]
fn creation_applies_registration_defaults() {
    let backend = Backend::build_test().unwrap();
    let detail = backend.customers().create(&new_customer("alice")).unwrap();

    assert_eq!(detail.customer_status_id, 1);
    assert!(detail.is_actual_account);
    assert!(detail.is_allow_to_take_task);
    assert!(detail.is_allow_to_complete_task);
    assert!(detail.is_allow_to_withdraw);
    assert!(!detail.is_allow_to_withdraw_without_task);
    assert!(detail.number_code.starts_with('C'));
    assert_eq!(detail.login_ip, None);
    assert_eq!(detail.duplicate_ip, None);
}

#[test]
fn creation_accepts_loose_flag_overrides() {
    let backend = Backend::build_test().unwrap();
    let body: NewCustomer = serde_json::from_value(json!({
        "loginUserName": "bob",
        "loginPassword": "secret123",
        "name": "Bob",
        "isAllowToWithdraw": 0,
        "isAllowToTakeTask": "1",
    }))
    .unwrap();

    let detail = backend.customers().create(&body).unwrap();
    assert!(!detail.is_allow_to_withdraw);
    assert!(detail.is_allow_to_take_task);
}

#[test]
fn duplicate_login_name_is_rejected() {
    let backend = Backend::build_test().unwrap();
    backend.customers().create(&new_customer("alice")).unwrap();

    let err = backend
        .customers()
        .create(&new_customer("alice"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn creation_requires_mandatory_fields() {
    let backend = Backend::build_test().unwrap();
    let body: NewCustomer =
        serde_json::from_value(json!({"loginUserName": "alice"})).unwrap();
    let err = backend.customers().create(&body).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(backend.store().customer_count().unwrap(), 0);
}

#[test]
fn update_touches_only_present_fields() {
    let backend = Backend::build_test().unwrap();
    let body: NewCustomer = serde_json::from_value(json!({
        "loginUserName": "alice",
        "loginPassword": "secret123",
        "name": "Alice",
        "phoneNumber": "555-0100",
    }))
    .unwrap();
    let created = backend.customers().create(&body).unwrap();

    let update: CustomerUpdate =
        serde_json::from_value(json!({"name": "Alice Cooper"})).unwrap();
    let updated = backend.customers().update(created.id, &update).unwrap();

    assert_eq!(updated.name, "Alice Cooper");
    assert_eq!(updated.phone_number.as_deref(), Some("555-0100"));
    assert_eq!(updated.login_user_name, "alice");
}

/// An empty password in the update payload is ignored, not hashed: the
/// old password keeps working.
#[test]
fn empty_password_update_is_ignored() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let update: CustomerUpdate =
        serde_json::from_value(json!({"loginPassword": ""})).unwrap();
    backend.customers().update(created.id, &update).unwrap();

    backend
        .auth()
        .authenticate(
            "alice",
            "secret123",
            &memberdesk_core::login_tracker::ClientAddr::default(),
        )
        .unwrap();
}

#[test]
fn password_update_replaces_the_credential() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let update: CustomerUpdate =
        serde_json::from_value(json!({"loginPassword": "newsecret"})).unwrap();
    backend.customers().update(created.id, &update).unwrap();

    let addr = memberdesk_core::login_tracker::ClientAddr::default();
    let err = backend
        .auth()
        .authenticate("alice", "secret123", &addr)
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));
    backend
        .auth()
        .authenticate("alice", "newsecret", &addr)
        .unwrap();
}

#[test]
fn delete_blocked_while_active_bank_details_exist() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    let bank_id = backend
        .store()
        .insert_bank_detail(
            created.id,
            Some(7),
            Some("Test Bank"),
            Some("Alice"),
            Some("000111222"),
            true,
        )
        .unwrap();

    let err = backend.customers().delete(created.id).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(backend.store().customer_count().unwrap(), 1);

    // Deactivating the detail unblocks the delete.
    backend.store().deactivate_bank_detail(bank_id).unwrap();
    backend.customers().delete(created.id).unwrap();
    assert_eq!(backend.store().customer_count().unwrap(), 0);
}

#[test]
fn delete_missing_customer_is_not_found() {
    let backend = Backend::build_test().unwrap();
    let err = backend.customers().delete(99).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn profile_shows_active_bank_details_only() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    backend
        .store()
        .insert_bank_detail(created.id, Some(1), Some("Old Bank"), None, None, false)
        .unwrap();
    backend
        .store()
        .insert_bank_detail(created.id, Some(2), Some("New Bank"), None, None, true)
        .unwrap();

    let profile = backend.customers().profile(created.id).unwrap();
    assert_eq!(profile.bank_details.len(), 1);
    assert_eq!(
        profile.bank_details[0].bank_vendor_name.as_deref(),
        Some("New Bank")
    );

    let detail = backend.customers().detail(created.id).unwrap();
    assert_eq!(detail.bank_details.len(), 2);
}

#[test]
fn username_filter_is_case_insensitive_substring() {
    let backend = Backend::build_test().unwrap();
    backend.customers().create(&new_customer("Anderson")).unwrap();
    backend.customers().create(&new_customer("sanders")).unwrap();
    backend.customers().create(&new_customer("brook")).unwrap();

    let filter: CustomerFilter =
        serde_json::from_value(json!({"userName": "ANDERS"})).unwrap();
    let hits = backend.customers().list(filter).unwrap();
    let names: Vec<_> = hits.iter().map(|c| c.login_user_name.as_str()).collect();
    assert_eq!(hits.len(), 2);
    assert!(names.contains(&"Anderson"));
    assert!(names.contains(&"sanders"));
}

#[test]
fn status_filter_matches_exactly() {
    let backend = Backend::build_test().unwrap();
    let a = backend.customers().create(&new_customer("alice")).unwrap();
    backend.customers().create(&new_customer("bob")).unwrap();
    backend
        .capability_gate()
        .set_capabilities(a.id, &json!({"customerStatusID": 3}).as_object().unwrap().clone())
        .unwrap();

    let filter: CustomerFilter =
        serde_json::from_value(json!({"customerStatus": "3"})).unwrap();
    let hits = backend.customers().list(filter).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].login_user_name, "alice");
}

/// endDate = 2024-01-10 includes 2024-01-10T23:59:59 and excludes
/// 2024-01-11T00:00:01 (inclusive end-of-day via an exclusive next-day
/// bound).
#[test]
fn end_date_boundary_is_inclusive() {
    let backend = Backend::build_test().unwrap();
    let inside = backend.customers().create(&new_customer("inside")).unwrap();
    let outside = backend.customers().create(&new_customer("outside")).unwrap();

    backend
        .store()
        .set_customer_created_date(
            inside.id,
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
        )
        .unwrap();
    backend
        .store()
        .set_customer_created_date(
            outside.id,
            Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 1).unwrap(),
        )
        .unwrap();

    let filter: CustomerFilter =
        serde_json::from_value(json!({"endDate": "2024-01-10"})).unwrap();
    let hits = backend.customers().list(filter).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].login_user_name, "inside");
}

#[test]
fn date_range_combines_both_bounds() {
    let backend = Backend::build_test().unwrap();
    for (name, day) in [("early", 5), ("mid", 10), ("late", 15)] {
        let c = backend.customers().create(&new_customer(name)).unwrap();
        backend
            .store()
            .set_customer_created_date(
                c.id,
                Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            )
            .unwrap();
    }

    let filter: CustomerFilter = serde_json::from_value(json!({
        "startDate": "2024-01-08",
        "endDate": "2024-01-12",
    }))
    .unwrap();
    let hits = backend.customers().list(filter).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].login_user_name, "mid");
}

#[test]
fn malformed_date_filter_is_rejected() {
    let backend = Backend::build_test().unwrap();
    let filter: CustomerFilter =
        serde_json::from_value(json!({"endDate": "tenth of January"})).unwrap();
    let err = backend.customers().list(filter).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn list_is_newest_first_and_limited() {
    let backend = Backend::build_test().unwrap();
    for (i, name) in ["one", "two", "three"].iter().enumerate() {
        let c = backend.customers().create(&new_customer(name)).unwrap();
        backend
            .store()
            .set_customer_created_date(
                c.id,
                Utc.with_ymd_and_hms(2024, 3, (i + 1) as u32, 0, 0, 0).unwrap(),
            )
            .unwrap();
    }

    let filter: CustomerFilter = serde_json::from_value(json!({"limit": 2})).unwrap();
    let hits = backend.customers().list(filter).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].login_user_name, "three");
    assert_eq!(hits[1].login_user_name, "two");
}
