//! Capability gate tests.
//!
//! Verifies:
//!   - Partial patches touch only the keys present
//!   - Applying the same patch twice is idempotent
//!   - Loose truthiness coercion is reproduced deliberately
//!   - A non-numeric status id is rejected
//!   - A missing customer is rejected before any field is touched

use memberdesk_core::backend::Backend;
use memberdesk_core::customer_admin::NewCustomer;
use memberdesk_core::error::ServiceError;
use serde_json::{json, Map, Value};

fn new_customer(login: &str) -> NewCustomer {
    serde_json::from_value(json!({
        "loginUserName": login,
        "loginPassword": "secret123",
        "name": format!("{login} account"),
    }))
    .unwrap()
}

fn patch(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn partial_patch_leaves_other_flags_unchanged() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    let before = backend.store().customer_by_id(created.id).unwrap().unwrap();

    let after = backend
        .capability_gate()
        .set_capabilities(created.id, &patch(json!({"isAllowToWithdraw": false})))
        .unwrap();

    assert!(!after.flags.is_allow_to_withdraw);
    assert_eq!(
        after.flags.is_allow_to_take_task,
        before.flags.is_allow_to_take_task
    );
    assert_eq!(
        after.flags.is_allow_to_complete_task,
        before.flags.is_allow_to_complete_task
    );
    assert_eq!(
        after.flags.is_actual_account,
        before.flags.is_actual_account
    );
    assert_eq!(after.customer_status_id, before.customer_status_id);
}

#[test]
fn applying_the_same_patch_twice_is_idempotent() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    let payload = patch(json!({
        "isAllowToWithdraw": false,
        "isAllowToTakeTask": true,
        "customerStatusID": 3,
    }));

    let once = backend
        .capability_gate()
        .set_capabilities(created.id, &payload)
        .unwrap();
    let twice = backend
        .capability_gate()
        .set_capabilities(created.id, &payload)
        .unwrap();

    assert_eq!(once.flags, twice.flags);
    assert_eq!(once.customer_status_id, twice.customer_status_id);
}

#[test]
fn loose_truthiness_is_reproduced() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let after = backend
        .capability_gate()
        .set_capabilities(
            created.id,
            &patch(json!({
                "isAllowToWithdraw": 0,
                "isAllowToTakeTask": "1",
                // Non-empty string: truthy, whatever it says.
                "isAllowToCompleteTask": "false",
                "isActualAccount": "",
            })),
        )
        .unwrap();

    assert!(!after.flags.is_allow_to_withdraw);
    assert!(after.flags.is_allow_to_take_task);
    assert!(after.flags.is_allow_to_complete_task);
    assert!(!after.flags.is_actual_account);
}

#[test]
fn numeric_status_accepts_strings_and_numbers() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let after = backend
        .capability_gate()
        .set_capabilities(created.id, &patch(json!({"customerStatusID": "4"})))
        .unwrap();
    assert_eq!(after.customer_status_id, 4);

    let after = backend
        .capability_gate()
        .set_capabilities(created.id, &patch(json!({"customerStatusID": 5})))
        .unwrap();
    assert_eq!(after.customer_status_id, 5);
}

#[test]
fn non_numeric_status_is_rejected() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();

    let err = backend
        .capability_gate()
        .set_capabilities(created.id, &patch(json!({"customerStatusID": "abc"})))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatus));
    assert_eq!(err.status_code(), 400);

    // Nothing was applied.
    let stored = backend.store().customer_by_id(created.id).unwrap().unwrap();
    assert_eq!(stored.customer_status_id, 1);
}

#[test]
fn missing_customer_is_rejected_before_any_write() {
    let backend = Backend::build_test().unwrap();
    let err = backend
        .capability_gate()
        .set_capabilities(424242, &patch(json!({"isAllowToWithdraw": false})))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn unrecognized_keys_are_ignored() {
    let backend = Backend::build_test().unwrap();
    let created = backend.customers().create(&new_customer("alice")).unwrap();
    let before = backend.store().customer_by_id(created.id).unwrap().unwrap();

    let after = backend
        .capability_gate()
        .set_capabilities(
            created.id,
            &patch(json!({"somethingElse": true, "name": "Mallory"})),
        )
        .unwrap();

    assert_eq!(after.flags, before.flags);
    assert_eq!(after.name, before.name);
}
