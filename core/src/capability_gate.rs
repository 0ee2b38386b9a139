//! The capability gate — the only path that mutates capability flags.
//!
//! Patches are partial: only keys present in the payload are applied.
//! Boolean inputs go through the loose truthiness coercion in
//! `coerce::truthy`; the status id requires a real integer.

use crate::coerce;
use crate::customer::Customer;
use crate::error::{ServiceError, ServiceResult};
use crate::store::Store;
use crate::types::CustomerId;
use serde_json::{Map, Value};

/// A parsed, coerced capability patch. `None` means "not in the patch".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityPatch {
    pub is_actual_account: Option<bool>,
    pub is_allow_to_take_task: Option<bool>,
    pub is_allow_to_complete_task: Option<bool>,
    pub is_allow_to_withdraw_without_task: Option<bool>,
    pub is_allow_to_withdraw: Option<bool>,
    pub is_allow_to_withdraw_when_preset_task: Option<bool>,
    pub is_allow_to_use_referral_code: Option<bool>,
    pub is_unconditional_withdrawal_allowed: Option<bool>,
    pub customer_status_id: Option<i64>,
}

impl CapabilityPatch {
    /// Parse a raw JSON payload. Unrecognized keys are ignored; a
    /// non-numeric status id is rejected.
    pub fn from_json(payload: &Map<String, Value>) -> ServiceResult<Self> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "isActualAccount" => patch.is_actual_account = Some(coerce::truthy(value)),
                "isAllowToTakeTask" => patch.is_allow_to_take_task = Some(coerce::truthy(value)),
                "isAllowToCompleteTask" => {
                    patch.is_allow_to_complete_task = Some(coerce::truthy(value))
                }
                "isAllowToWithdrawWithoutTask" => {
                    patch.is_allow_to_withdraw_without_task = Some(coerce::truthy(value))
                }
                "isAllowToWithdraw" => patch.is_allow_to_withdraw = Some(coerce::truthy(value)),
                "isAllowToWithdrawWhenPresetTask" => {
                    patch.is_allow_to_withdraw_when_preset_task = Some(coerce::truthy(value))
                }
                "isAllowToUseReferralCode" => {
                    patch.is_allow_to_use_referral_code = Some(coerce::truthy(value))
                }
                "isUnconditionalWithdrawalAllowed" => {
                    patch.is_unconditional_withdrawal_allowed = Some(coerce::truthy(value))
                }
                "customerStatusID" => {
                    patch.customer_status_id =
                        Some(coerce::to_int(value).ok_or(ServiceError::InvalidStatus)?)
                }
                _ => {}
            }
        }
        Ok(patch)
    }
}

pub struct CapabilityGate<'a> {
    store: &'a Store,
}

impl<'a> CapabilityGate<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Validate and apply a capability patch, returning the updated
    /// customer. The target must exist before any field is touched.
    pub fn set_capabilities(
        &self,
        customer_id: CustomerId,
        payload: &Map<String, Value>,
    ) -> ServiceResult<Customer> {
        if self.store.customer_by_id(customer_id)?.is_none() {
            return Err(ServiceError::NotFound("Customer"));
        }

        let patch = CapabilityPatch::from_json(payload)?;
        self.store.apply_capability_patch(customer_id, &patch)?;

        self.store
            .customer_by_id(customer_id)?
            .ok_or(ServiceError::NotFound("Customer"))
    }
}
