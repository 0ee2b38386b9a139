use super::{fmt_ts, ts_col, Store};
use crate::customer::AdminRecord;
use crate::error::ServiceResult;
use crate::types::AdminId;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

const ADMIN_COLUMNS: &str =
    "id, admin_no, user_name, phone_number, password_hash, referral_code, created_date";

fn admin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AdminRecord> {
    Ok(AdminRecord {
        id: row.get(0)?,
        admin_no: row.get(1)?,
        user_name: row.get(2)?,
        phone_number: row.get(3)?,
        password_hash: row.get(4)?,
        referral_code: row.get(5)?,
        created_date: ts_col(row, 6)?,
    })
}

impl Store {
    pub fn insert_admin(
        &self,
        admin_no: i64,
        user_name: &str,
        phone_number: &str,
        password_hash: &str,
        referral_code: Option<&str>,
        created_date: DateTime<Utc>,
    ) -> ServiceResult<AdminId> {
        self.conn.execute(
            "INSERT INTO admin (
                admin_no, user_name, phone_number, password_hash,
                referral_code, created_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                admin_no,
                user_name,
                phone_number,
                password_hash,
                referral_code,
                fmt_ts(created_date)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Next sequential admin number (max + 1, starting at 1).
    pub fn next_admin_no(&self) -> ServiceResult<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(admin_no), 0) + 1 FROM admin",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    pub fn admin_by_user_name(&self, user_name: &str) -> ServiceResult<Option<AdminRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ADMIN_COLUMNS} FROM admin WHERE user_name = ?1"))?;
        let row = stmt.query_row(params![user_name], admin_from_row).optional()?;
        Ok(row)
    }

    pub fn admin_by_id(&self, id: AdminId) -> ServiceResult<Option<AdminRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ADMIN_COLUMNS} FROM admin WHERE id = ?1"))?;
        let row = stmt.query_row(params![id], admin_from_row).optional()?;
        Ok(row)
    }

    pub fn list_admins(&self, limit: i64) -> ServiceResult<Vec<AdminRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admin ORDER BY id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], admin_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
