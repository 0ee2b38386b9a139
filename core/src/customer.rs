//! The customer entity and its owned records.
//!
//! RULE: the stored password hash never leaves this crate — outward
//! serialization goes through the view structs in `views.rs`, which do
//! not carry it.

use crate::types::CustomerId;
use chrono::{DateTime, Utc};

/// Initial status assigned on registration ("pending/new").
pub const STATUS_PENDING: i64 = 1;

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub login_user_name: String,
    pub login_password_hash: String,
    pub login_is_disabled: bool,
    pub name: String,
    pub phone_number: Option<String>,
    pub number_code: String,
    pub referral_code: Option<String>,
    pub ambassador_level_id: Option<i64>,
    pub referrer_customer_id: Option<CustomerId>,
    pub customer_status_id: i64,
    pub flags: CapabilityFlags,
    pub provenance: Provenance,
    pub created_date: DateTime<Utc>,
}

/// Independent boolean switches gating task and withdrawal actions.
/// No flag implies another; they compose only in application checks
/// outside this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub is_actual_account: bool,
    pub is_allow_to_take_task: bool,
    pub is_allow_to_complete_task: bool,
    pub is_allow_to_withdraw_without_task: bool,
    pub is_allow_to_withdraw: bool,
    pub is_allow_to_withdraw_when_preset_task: bool,
    pub is_allow_to_use_referral_code: bool,
    pub is_unconditional_withdrawal_allowed: bool,
}

impl Default for CapabilityFlags {
    /// Defaults match registration: the account is real and may take,
    /// complete, and withdraw; the narrower switches start off.
    fn default() -> Self {
        Self {
            is_actual_account: true,
            is_allow_to_take_task: true,
            is_allow_to_complete_task: true,
            is_allow_to_withdraw_without_task: false,
            is_allow_to_withdraw: true,
            is_allow_to_withdraw_when_preset_task: false,
            is_allow_to_use_referral_code: false,
            is_unconditional_withdrawal_allowed: false,
        }
    }
}

/// Login provenance. Written only by the login tracker, in one update
/// per successful login.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    pub login_ip: Option<String>,
    pub login_country: Option<String>,
    pub login_city: Option<String>,
    pub login_region: Option<String>,
    pub login_isp: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
    /// Holds the offending IP when another account's latest login shares
    /// it; cleared (not accumulated) on every login.
    pub duplicate_ip: Option<String>,
}

/// A bank detail row, exclusively owned by its customer. A customer with
/// active bank details cannot be deleted.
#[derive(Debug, Clone)]
pub struct BankDetail {
    pub id: i64,
    pub customer_id: CustomerId,
    pub bank_vendor_id: Option<i64>,
    pub bank_vendor_name: Option<String>,
    pub bank_account_holder_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub active: bool,
}

/// An administrative identity. Parallel to `Customer` but with no
/// provenance tracking and a much smaller record set.
#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub id: i64,
    pub admin_no: i64,
    pub user_name: String,
    pub phone_number: String,
    pub password_hash: String,
    pub referral_code: Option<String>,
    pub created_date: DateTime<Utc>,
}
