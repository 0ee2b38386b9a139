//! Customer administration: create, update, delete, fetch, and the
//! filterable list. Decision logic lives in the auth/tracker/gate
//! services — this module is the surrounding record-keeping.

use crate::coerce;
use crate::credentials;
use crate::customer::{CapabilityFlags, Customer, STATUS_PENDING};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{CustomerQuery, NewCustomerRow, Store, UpdateCustomerRow};
use crate::types::CustomerId;
use crate::views::{CustomerDetail, CustomerProfile};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Registration payload. Flag overrides arrive as raw JSON values and
/// go through the loose truthiness coercion; omitted flags keep the
/// registration defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(default)]
    pub login_user_name: String,
    #[serde(default)]
    pub login_password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default, rename = "ambassadorLevelID")]
    pub ambassador_level_id: Option<Value>,
    #[serde(default)]
    pub is_actual_account: Option<Value>,
    #[serde(default)]
    pub is_allow_to_take_task: Option<Value>,
    #[serde(default)]
    pub is_allow_to_complete_task: Option<Value>,
    #[serde(default)]
    pub is_allow_to_withdraw: Option<Value>,
}

/// Partial profile update. An empty password is ignored rather than
/// hashed; an empty phone/referral clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub referral_code: Option<String>,
    #[serde(rename = "ambassadorLevelID")]
    pub ambassador_level_id: Option<Value>,
    pub login_password: Option<String>,
}

/// List filter as it arrives on the wire. Date filters accept both the
/// `startDate`/`endDate` and the legacy `createdDateFrom`/`createdDateTo`
/// names. All string matches are case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerFilter {
    #[serde(alias = "createdDateFrom")]
    pub start_date: Option<String>,
    #[serde(alias = "createdDateTo")]
    pub end_date: Option<String>,
    #[serde(alias = "UserName")]
    pub user_name: Option<String>,
    pub code: Option<String>,
    pub ip_address: Option<String>,
    pub phone_number: Option<String>,
    pub customer_status: Option<Value>,
    pub limit: Option<i64>,
}

fn parse_day(field: &str, raw: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("{field} must be YYYY-MM-DD")))
}

impl CustomerFilter {
    /// Resolve wire values into store-level query bounds. The end date
    /// is inclusive: advance one day and use an exclusive upper bound.
    pub fn into_query(self) -> ServiceResult<CustomerQuery> {
        let created_from = match &self.start_date {
            Some(raw) => {
                let day = parse_day("startDate", raw)?;
                Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap()))
            }
            None => None,
        };
        let created_before = match &self.end_date {
            Some(raw) => {
                let day = parse_day("endDate", raw)? + chrono::Duration::days(1);
                Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap()))
            }
            None => None,
        };
        let status_id = match &self.customer_status {
            Some(value) => Some(
                coerce::to_int(value)
                    .ok_or_else(|| ServiceError::Validation("customerStatus must be numeric".to_string()))?,
            ),
            None => None,
        };

        Ok(CustomerQuery {
            created_from,
            created_before,
            user_name_like: self.user_name,
            code_like: self.code,
            ip_like: self.ip_address,
            phone_like: self.phone_number,
            status_id,
            limit: self.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        })
    }
}

/// Assemble the detail view for a customer: bank details plus the
/// referral level name.
pub(crate) fn detail_view(store: &Store, customer: &Customer) -> ServiceResult<CustomerDetail> {
    let banks = store.bank_details_for_customer(customer.id, false)?;
    let level_name = match customer.ambassador_level_id {
        Some(level_id) => store.vip_level_by_id(level_id)?.map(|l| l.name),
        None => None,
    };
    Ok(CustomerDetail::build(customer, level_name, &banks))
}

pub(crate) fn profile_view(store: &Store, customer: &Customer) -> ServiceResult<CustomerProfile> {
    let banks = store.bank_details_for_customer(customer.id, true)?;
    let level_name = match customer.ambassador_level_id {
        Some(level_id) => store.vip_level_by_id(level_id)?.map(|l| l.name),
        None => None,
    };
    Ok(CustomerProfile::build(customer, level_name, &banks))
}

pub struct CustomerAdmin<'a> {
    store: &'a Store,
}

impl<'a> CustomerAdmin<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn create(&self, body: &NewCustomer) -> ServiceResult<CustomerDetail> {
        if body.login_user_name.is_empty() || body.login_password.is_empty() || body.name.is_empty()
        {
            return Err(ServiceError::Validation(
                "loginUserName, loginPassword, and name are required".to_string(),
            ));
        }

        if self
            .store
            .customer_by_login_name(&body.login_user_name)?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Login user name already exists".to_string(),
            ));
        }

        let ambassador_level_id = match &body.ambassador_level_id {
            Some(value) if coerce::truthy(value) => Some(coerce::to_int(value).ok_or_else(
                || ServiceError::Validation("ambassadorLevelID must be numeric".to_string()),
            )?),
            _ => None,
        };

        let mut flags = CapabilityFlags::default();
        if let Some(v) = &body.is_actual_account {
            flags.is_actual_account = coerce::truthy(v);
        }
        if let Some(v) = &body.is_allow_to_take_task {
            flags.is_allow_to_take_task = coerce::truthy(v);
        }
        if let Some(v) = &body.is_allow_to_complete_task {
            flags.is_allow_to_complete_task = coerce::truthy(v);
        }
        if let Some(v) = &body.is_allow_to_withdraw {
            flags.is_allow_to_withdraw = coerce::truthy(v);
        }

        let now = Utc::now();
        let row = NewCustomerRow {
            login_user_name: body.login_user_name.clone(),
            login_password_hash: credentials::hash_password(&body.login_password)?,
            name: body.name.clone(),
            phone_number: body.phone_number.clone().filter(|p| !p.is_empty()),
            number_code: format!("C{}", now.timestamp_millis()),
            referral_code: body.referral_code.clone().filter(|c| !c.is_empty()),
            ambassador_level_id,
            referrer_customer_id: None,
            customer_status_id: STATUS_PENDING,
            flags,
            created_date: now,
        };
        let id = self.store.insert_customer(&row)?;
        log::info!("customer {id} created ({})", row.login_user_name);

        let customer = self
            .store
            .customer_by_id(id)?
            .ok_or(ServiceError::NotFound("Customer"))?;
        detail_view(self.store, &customer)
    }

    pub fn update(&self, id: CustomerId, body: &CustomerUpdate) -> ServiceResult<CustomerDetail> {
        if self.store.customer_by_id(id)?.is_none() {
            return Err(ServiceError::NotFound("Customer"));
        }

        let ambassador_level_id = match &body.ambassador_level_id {
            None => None,
            Some(value) if coerce::truthy(value) => Some(Some(coerce::to_int(value).ok_or_else(
                || ServiceError::Validation("ambassadorLevelID must be numeric".to_string()),
            )?)),
            Some(_) => Some(None),
        };

        let patch = UpdateCustomerRow {
            name: body.name.clone(),
            phone_number: body
                .phone_number
                .clone()
                .map(|p| if p.is_empty() { None } else { Some(p) }),
            referral_code: body
                .referral_code
                .clone()
                .map(|c| if c.is_empty() { None } else { Some(c) }),
            ambassador_level_id,
            login_password_hash: match &body.login_password {
                Some(p) if !p.is_empty() => Some(credentials::hash_password(p)?),
                _ => None,
            },
        };
        self.store.update_customer_fields(id, &patch)?;

        let customer = self
            .store
            .customer_by_id(id)?
            .ok_or(ServiceError::NotFound("Customer"))?;
        detail_view(self.store, &customer)
    }

    /// Hard delete, blocked while active bank details exist.
    pub fn delete(&self, id: CustomerId) -> ServiceResult<()> {
        if self.store.customer_by_id(id)?.is_none() {
            return Err(ServiceError::NotFound("Customer"));
        }
        if self.store.active_bank_detail_count(id)? > 0 {
            return Err(ServiceError::Conflict(
                "Customer has active bank details".to_string(),
            ));
        }
        self.store.delete_customer(id)?;
        log::info!("customer {id} deleted");
        Ok(())
    }

    pub fn profile(&self, id: CustomerId) -> ServiceResult<CustomerProfile> {
        let customer = self
            .store
            .customer_by_id(id)?
            .ok_or(ServiceError::NotFound("Customer"))?;
        profile_view(self.store, &customer)
    }

    pub fn detail(&self, id: CustomerId) -> ServiceResult<CustomerDetail> {
        let customer = self
            .store
            .customer_by_id(id)?
            .ok_or(ServiceError::NotFound("Customer"))?;
        detail_view(self.store, &customer)
    }

    pub fn list(&self, filter: CustomerFilter) -> ServiceResult<Vec<CustomerDetail>> {
        let query = filter.into_query()?;
        let customers = self.store.list_customers(&query)?;
        customers
            .iter()
            .map(|c| detail_view(self.store, c))
            .collect()
    }
}
