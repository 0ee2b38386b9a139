//! Outward response projections.
//!
//! Views are explicit immutable structs constructed from entities —
//! never ad-hoc field copying — and none of them carries a password
//! hash. Field names follow the wire contract the admin panel expects
//! (legacy `ID`/`IP` capitalization preserved via explicit renames).

use crate::customer::{AdminRecord, BankDetail, Customer};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailView {
    pub id: i64,
    #[serde(rename = "bankVendorID")]
    pub bank_vendor_id: Option<i64>,
    pub bank_vendor_name: Option<String>,
    pub bank_account_holder_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub active: bool,
}

impl From<&BankDetail> for BankDetailView {
    fn from(bank: &BankDetail) -> Self {
        Self {
            id: bank.id,
            bank_vendor_id: bank.bank_vendor_id,
            bank_vendor_name: bank.bank_vendor_name.clone(),
            bank_account_holder_name: bank.bank_account_holder_name.clone(),
            bank_account_number: bank.bank_account_number.clone(),
            active: bank.active,
        }
    }
}

/// The administrative detail projection: identity, status, capability
/// flags, and login provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub id: i64,
    pub name: String,
    pub login_user_name: String,
    pub login_is_disabled: bool,
    pub phone_number: Option<String>,
    pub number_code: String,
    pub referral_code: Option<String>,
    #[serde(rename = "ambassadorLevelID")]
    pub ambassador_level_id: Option<i64>,
    pub ambassador_level_name: Option<String>,
    #[serde(rename = "referrerCustomerID")]
    pub referrer_customer_id: Option<i64>,
    #[serde(rename = "customerStatusID")]
    pub customer_status_id: i64,
    pub is_actual_account: bool,
    pub is_allow_to_take_task: bool,
    pub is_allow_to_complete_task: bool,
    pub is_allow_to_withdraw_without_task: bool,
    pub is_allow_to_withdraw: bool,
    pub is_allow_to_withdraw_when_preset_task: bool,
    pub is_allow_to_use_referral_code: bool,
    pub is_unconditional_withdrawal_allowed: bool,
    #[serde(rename = "loginLogIPAddress")]
    pub login_ip: Option<String>,
    pub login_log_country: Option<String>,
    pub login_log_city: Option<String>,
    pub login_log_region: Option<String>,
    #[serde(rename = "loginLogISP")]
    pub login_isp: Option<String>,
    pub login_log_created_date: Option<DateTime<Utc>>,
    #[serde(rename = "duplicateIPAddress")]
    pub duplicate_ip: Option<String>,
    pub created_date: DateTime<Utc>,
    pub bank_details: Vec<BankDetailView>,
}

impl CustomerDetail {
    pub fn build(
        customer: &Customer,
        ambassador_level_name: Option<String>,
        bank_details: &[BankDetail],
    ) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            login_user_name: customer.login_user_name.clone(),
            login_is_disabled: customer.login_is_disabled,
            phone_number: customer.phone_number.clone(),
            number_code: customer.number_code.clone(),
            referral_code: customer.referral_code.clone(),
            ambassador_level_id: customer.ambassador_level_id,
            ambassador_level_name,
            referrer_customer_id: customer.referrer_customer_id,
            customer_status_id: customer.customer_status_id,
            is_actual_account: customer.flags.is_actual_account,
            is_allow_to_take_task: customer.flags.is_allow_to_take_task,
            is_allow_to_complete_task: customer.flags.is_allow_to_complete_task,
            is_allow_to_withdraw_without_task: customer.flags.is_allow_to_withdraw_without_task,
            is_allow_to_withdraw: customer.flags.is_allow_to_withdraw,
            is_allow_to_withdraw_when_preset_task: customer
                .flags
                .is_allow_to_withdraw_when_preset_task,
            is_allow_to_use_referral_code: customer.flags.is_allow_to_use_referral_code,
            is_unconditional_withdrawal_allowed: customer
                .flags
                .is_unconditional_withdrawal_allowed,
            login_ip: customer.provenance.login_ip.clone(),
            login_log_country: customer.provenance.login_country.clone(),
            login_log_city: customer.provenance.login_city.clone(),
            login_log_region: customer.provenance.login_region.clone(),
            login_isp: customer.provenance.login_isp.clone(),
            login_log_created_date: customer.provenance.login_at,
            duplicate_ip: customer.provenance.duplicate_ip.clone(),
            created_date: customer.created_date,
            bank_details: bank_details.iter().map(Into::into).collect(),
        }
    }
}

/// The self-service profile projection: contact and membership fields,
/// active bank details only, no provenance and no capability flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: i64,
    pub name: String,
    pub login_user_name: String,
    pub phone_number: Option<String>,
    pub number_code: String,
    pub referral_code: Option<String>,
    #[serde(rename = "ambassadorLevelID")]
    pub ambassador_level_id: Option<i64>,
    pub ambassador_level_name: Option<String>,
    pub created_date: DateTime<Utc>,
    pub bank_details: Vec<BankDetailView>,
}

impl CustomerProfile {
    pub fn build(
        customer: &Customer,
        ambassador_level_name: Option<String>,
        active_bank_details: &[BankDetail],
    ) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            login_user_name: customer.login_user_name.clone(),
            phone_number: customer.phone_number.clone(),
            number_code: customer.number_code.clone(),
            referral_code: customer.referral_code.clone(),
            ambassador_level_id: customer.ambassador_level_id,
            ambassador_level_name,
            created_date: customer.created_date,
            bank_details: active_bank_details.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: i64,
    pub admin_no: i64,
    pub user_name: String,
    pub phone_number: String,
    pub referral_code: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl From<&AdminRecord> for AdminView {
    fn from(admin: &AdminRecord) -> Self {
        Self {
            id: admin.id,
            admin_no: admin.admin_no,
            user_name: admin.user_name.clone(),
            phone_number: admin.phone_number.clone(),
            referral_code: admin.referral_code.clone(),
            created_date: admin.created_date,
        }
    }
}
