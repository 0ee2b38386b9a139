use super::{fmt_ts, opt_ts_col, ts_col, Store};
use crate::capability_gate::CapabilityPatch;
use crate::customer::{CapabilityFlags, Customer, Provenance};
use crate::error::{ServiceError, ServiceResult};
use crate::geo::GeoInfo;
use crate::types::CustomerId;
use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, OptionalExtension};

const CUSTOMER_COLUMNS: &str = "id, login_user_name, login_password_hash, login_is_disabled,
        name, phone_number, number_code, referral_code, ambassador_level_id,
        referrer_customer_id, customer_status_id,
        is_actual_account, is_allow_to_take_task, is_allow_to_complete_task,
        is_allow_to_withdraw_without_task, is_allow_to_withdraw,
        is_allow_to_withdraw_when_preset_task, is_allow_to_use_referral_code,
        is_unconditional_withdrawal_allowed,
        login_ip, login_country, login_city, login_region, login_isp,
        login_at, duplicate_ip, created_date";

fn customer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        login_user_name: row.get(1)?,
        login_password_hash: row.get(2)?,
        login_is_disabled: row.get::<_, i64>(3)? != 0,
        name: row.get(4)?,
        phone_number: row.get(5)?,
        number_code: row.get(6)?,
        referral_code: row.get(7)?,
        ambassador_level_id: row.get(8)?,
        referrer_customer_id: row.get(9)?,
        customer_status_id: row.get(10)?,
        flags: CapabilityFlags {
            is_actual_account: row.get::<_, i64>(11)? != 0,
            is_allow_to_take_task: row.get::<_, i64>(12)? != 0,
            is_allow_to_complete_task: row.get::<_, i64>(13)? != 0,
            is_allow_to_withdraw_without_task: row.get::<_, i64>(14)? != 0,
            is_allow_to_withdraw: row.get::<_, i64>(15)? != 0,
            is_allow_to_withdraw_when_preset_task: row.get::<_, i64>(16)? != 0,
            is_allow_to_use_referral_code: row.get::<_, i64>(17)? != 0,
            is_unconditional_withdrawal_allowed: row.get::<_, i64>(18)? != 0,
        },
        provenance: Provenance {
            login_ip: row.get(19)?,
            login_country: row.get(20)?,
            login_city: row.get(21)?,
            login_region: row.get(22)?,
            login_isp: row.get(23)?,
            login_at: opt_ts_col(row, 24)?,
            duplicate_ip: row.get(25)?,
        },
        created_date: ts_col(row, 26)?,
    })
}

/// Row data for a new customer. The service layer owns defaulting and
/// password hashing; the store just writes.
#[derive(Debug, Clone)]
pub struct NewCustomerRow {
    pub login_user_name: String,
    pub login_password_hash: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub number_code: String,
    pub referral_code: Option<String>,
    pub ambassador_level_id: Option<i64>,
    pub referrer_customer_id: Option<CustomerId>,
    pub customer_status_id: i64,
    pub flags: CapabilityFlags,
    pub created_date: DateTime<Utc>,
}

/// Partial field update. The outer `Option` is "present in the patch";
/// the inner `Option` (where there is one) is "set to NULL".
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerRow {
    pub name: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub referral_code: Option<Option<String>>,
    pub ambassador_level_id: Option<Option<i64>>,
    pub login_password_hash: Option<String>,
}

/// Filter for the customer list. Dates are already resolved to UTC
/// bounds (`created_before` is exclusive).
#[derive(Debug, Clone, Default)]
pub struct CustomerQuery {
    pub created_from: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub user_name_like: Option<String>,
    pub code_like: Option<String>,
    pub ip_like: Option<String>,
    pub phone_like: Option<String>,
    pub status_id: Option<i64>,
    pub limit: i64,
}

impl Store {
    pub fn insert_customer(&self, row: &NewCustomerRow) -> ServiceResult<CustomerId> {
        self.conn.execute(
            "INSERT INTO customer (
                login_user_name, login_password_hash, name, phone_number,
                number_code, referral_code, ambassador_level_id,
                referrer_customer_id, customer_status_id,
                is_actual_account, is_allow_to_take_task, is_allow_to_complete_task,
                is_allow_to_withdraw_without_task, is_allow_to_withdraw,
                is_allow_to_withdraw_when_preset_task, is_allow_to_use_referral_code,
                is_unconditional_withdrawal_allowed, created_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                row.login_user_name,
                row.login_password_hash,
                row.name,
                row.phone_number,
                row.number_code,
                row.referral_code,
                row.ambassador_level_id,
                row.referrer_customer_id,
                row.customer_status_id,
                row.flags.is_actual_account as i64,
                row.flags.is_allow_to_take_task as i64,
                row.flags.is_allow_to_complete_task as i64,
                row.flags.is_allow_to_withdraw_without_task as i64,
                row.flags.is_allow_to_withdraw as i64,
                row.flags.is_allow_to_withdraw_when_preset_task as i64,
                row.flags.is_allow_to_use_referral_code as i64,
                row.flags.is_unconditional_withdrawal_allowed as i64,
                fmt_ts(row.created_date),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn customer_by_id(&self, id: CustomerId) -> ServiceResult<Option<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = ?1"
        ))?;
        let row = stmt.query_row(params![id], customer_from_row).optional()?;
        Ok(row)
    }

    /// Exact, case-sensitive login-name match (the column is UNIQUE).
    pub fn customer_by_login_name(&self, login_user_name: &str) -> ServiceResult<Option<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE login_user_name = ?1"
        ))?;
        let row = stmt
            .query_row(params![login_user_name], customer_from_row)
            .optional()?;
        Ok(row)
    }

    pub fn list_customers(&self, query: &CustomerQuery) -> ServiceResult<Vec<Customer>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut bind: Vec<SqlValue> = Vec::new();

        if let Some(from) = query.created_from {
            bind.push(SqlValue::Text(fmt_ts(from)));
            clauses.push(format!("created_date >= ?{}", bind.len()));
        }
        if let Some(before) = query.created_before {
            bind.push(SqlValue::Text(fmt_ts(before)));
            clauses.push(format!("created_date < ?{}", bind.len()));
        }
        if let Some(like) = &query.user_name_like {
            bind.push(SqlValue::Text(like.clone()));
            clauses.push(format!("login_user_name LIKE '%' || ?{} || '%'", bind.len()));
        }
        if let Some(like) = &query.code_like {
            bind.push(SqlValue::Text(like.clone()));
            clauses.push(format!("number_code LIKE '%' || ?{} || '%'", bind.len()));
        }
        if let Some(like) = &query.ip_like {
            bind.push(SqlValue::Text(like.clone()));
            clauses.push(format!("login_ip LIKE '%' || ?{} || '%'", bind.len()));
        }
        if let Some(like) = &query.phone_like {
            bind.push(SqlValue::Text(like.clone()));
            clauses.push(format!("phone_number LIKE '%' || ?{} || '%'", bind.len()));
        }
        if let Some(status) = query.status_id {
            bind.push(SqlValue::Integer(status));
            clauses.push(format!("customer_status_id = ?{}", bind.len()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        bind.push(SqlValue::Integer(query.limit));
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer {where_sql}
             ORDER BY created_date DESC LIMIT ?{}",
            bind.len()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind), customer_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn delete_customer(&self, id: CustomerId) -> ServiceResult<usize> {
        let n = self
            .conn
            .execute("DELETE FROM customer WHERE id = ?1", params![id])?;
        Ok(n)
    }

    pub fn update_customer_fields(
        &self,
        id: CustomerId,
        patch: &UpdateCustomerRow,
    ) -> ServiceResult<usize> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind: Vec<SqlValue> = Vec::new();
        {
            let mut add = |col: &str, value: SqlValue| {
                bind.push(value);
                sets.push(format!("{col} = ?{}", bind.len()));
            };
            if let Some(name) = &patch.name {
                add("name", SqlValue::Text(name.clone()));
            }
            if let Some(phone) = &patch.phone_number {
                add(
                    "phone_number",
                    phone.clone().map(SqlValue::Text).unwrap_or(SqlValue::Null),
                );
            }
            if let Some(code) = &patch.referral_code {
                add(
                    "referral_code",
                    code.clone().map(SqlValue::Text).unwrap_or(SqlValue::Null),
                );
            }
            if let Some(level) = &patch.ambassador_level_id {
                add(
                    "ambassador_level_id",
                    level.map(SqlValue::Integer).unwrap_or(SqlValue::Null),
                );
            }
            if let Some(hash) = &patch.login_password_hash {
                add("login_password_hash", SqlValue::Text(hash.clone()));
            }
        }

        if sets.is_empty() {
            return Ok(0);
        }
        bind.push(SqlValue::Integer(id));
        let sql = format!(
            "UPDATE customer SET {} WHERE id = ?{}",
            sets.join(", "),
            bind.len()
        );
        let n = self.conn.execute(&sql, params_from_iter(bind))?;
        Ok(n)
    }

    // ── Capability flags ──────────────────────────────────────────────

    /// Apply a capability patch in a single UPDATE: only present fields
    /// are touched, and the row changes atomically.
    pub fn apply_capability_patch(
        &self,
        id: CustomerId,
        patch: &CapabilityPatch,
    ) -> ServiceResult<usize> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind: Vec<SqlValue> = Vec::new();
        {
            let mut add = |col: &str, value: i64| {
                bind.push(SqlValue::Integer(value));
                sets.push(format!("{col} = ?{}", bind.len()));
            };
            if let Some(v) = patch.is_actual_account {
                add("is_actual_account", v as i64);
            }
            if let Some(v) = patch.is_allow_to_take_task {
                add("is_allow_to_take_task", v as i64);
            }
            if let Some(v) = patch.is_allow_to_complete_task {
                add("is_allow_to_complete_task", v as i64);
            }
            if let Some(v) = patch.is_allow_to_withdraw_without_task {
                add("is_allow_to_withdraw_without_task", v as i64);
            }
            if let Some(v) = patch.is_allow_to_withdraw {
                add("is_allow_to_withdraw", v as i64);
            }
            if let Some(v) = patch.is_allow_to_withdraw_when_preset_task {
                add("is_allow_to_withdraw_when_preset_task", v as i64);
            }
            if let Some(v) = patch.is_allow_to_use_referral_code {
                add("is_allow_to_use_referral_code", v as i64);
            }
            if let Some(v) = patch.is_unconditional_withdrawal_allowed {
                add("is_unconditional_withdrawal_allowed", v as i64);
            }
            if let Some(v) = patch.customer_status_id {
                add("customer_status_id", v);
            }
        }

        if sets.is_empty() {
            return Ok(0);
        }
        bind.push(SqlValue::Integer(id));
        let sql = format!(
            "UPDATE customer SET {} WHERE id = ?{}",
            sets.join(", "),
            bind.len()
        );
        let n = self.conn.execute(&sql, params_from_iter(bind))?;
        Ok(n)
    }

    // ── Login provenance ──────────────────────────────────────────────

    /// Find any other customer whose latest recorded login IP equals
    /// `ip`. Point-in-time check — historical logins are not consulted.
    pub fn other_customer_with_ip(
        &self,
        exclude: CustomerId,
        ip: &str,
    ) -> ServiceResult<Option<CustomerId>> {
        let found = self
            .conn
            .query_row(
                "SELECT id FROM customer WHERE login_ip = ?1 AND id != ?2 LIMIT 1",
                params![ip, exclude],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found)
    }

    /// Write all provenance fields plus the login timestamp in one
    /// atomic update.
    pub fn write_login_provenance(
        &self,
        id: CustomerId,
        ip: &str,
        geo: &GeoInfo,
        duplicate_ip: Option<&str>,
        at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let n = self.conn.execute(
            "UPDATE customer SET
                login_ip = ?1, login_country = ?2, login_city = ?3,
                login_region = ?4, login_isp = ?5, login_at = ?6,
                duplicate_ip = ?7
             WHERE id = ?8",
            params![
                ip,
                geo.country,
                geo.city,
                geo.region,
                geo.isp,
                fmt_ts(at),
                duplicate_ip,
                id
            ],
        )?;
        if n == 0 {
            return Err(ServiceError::NotFound("Customer"));
        }
        Ok(())
    }

    /// Sentinel-IP path: no IP/geo provenance is recorded and the
    /// duplicate marker is explicitly cleared; only the timestamp lands.
    pub fn clear_login_provenance(&self, id: CustomerId, at: DateTime<Utc>) -> ServiceResult<()> {
        let n = self.conn.execute(
            "UPDATE customer SET
                login_ip = NULL, login_country = NULL, login_city = NULL,
                login_region = NULL, login_isp = NULL, login_at = ?1,
                duplicate_ip = NULL
             WHERE id = ?2",
            params![fmt_ts(at), id],
        )?;
        if n == 0 {
            return Err(ServiceError::NotFound("Customer"));
        }
        Ok(())
    }

    /// Administrative kill switch for a login.
    pub fn set_login_disabled(&self, id: CustomerId, disabled: bool) -> ServiceResult<()> {
        let n = self.conn.execute(
            "UPDATE customer SET login_is_disabled = ?1 WHERE id = ?2",
            params![disabled as i64, id],
        )?;
        if n == 0 {
            return Err(ServiceError::NotFound("Customer"));
        }
        Ok(())
    }

    // ── Test helper methods ───────────────────────────────────────────

    pub fn customer_count(&self) -> ServiceResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Override the created date (test fixture for date-range filters).
    pub fn set_customer_created_date(
        &self,
        id: CustomerId,
        at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        self.conn.execute(
            "UPDATE customer SET created_date = ?1 WHERE id = ?2",
            params![fmt_ts(at), id],
        )?;
        Ok(())
    }
}
