use super::Store;
use crate::customer::BankDetail;
use crate::error::ServiceResult;
use crate::types::CustomerId;
use rusqlite::params;

fn bank_detail_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BankDetail> {
    Ok(BankDetail {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        bank_vendor_id: row.get(2)?,
        bank_vendor_name: row.get(3)?,
        bank_account_holder_name: row.get(4)?,
        bank_account_number: row.get(5)?,
        active: row.get::<_, i64>(6)? != 0,
    })
}

impl Store {
    pub fn insert_bank_detail(
        &self,
        customer_id: CustomerId,
        bank_vendor_id: Option<i64>,
        bank_vendor_name: Option<&str>,
        holder_name: Option<&str>,
        account_number: Option<&str>,
        active: bool,
    ) -> ServiceResult<i64> {
        self.conn.execute(
            "INSERT INTO bank_detail (
                customer_id, bank_vendor_id, bank_vendor_name,
                bank_account_holder_name, bank_account_number, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                customer_id,
                bank_vendor_id,
                bank_vendor_name,
                holder_name,
                account_number,
                active as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All bank details for a customer, newest first. `active_only`
    /// narrows to active rows (the profile projection shows only those).
    pub fn bank_details_for_customer(
        &self,
        customer_id: CustomerId,
        active_only: bool,
    ) -> ServiceResult<Vec<BankDetail>> {
        let sql = if active_only {
            "SELECT id, customer_id, bank_vendor_id, bank_vendor_name,
                    bank_account_holder_name, bank_account_number, active
             FROM bank_detail WHERE customer_id = ?1 AND active = 1
             ORDER BY id DESC"
        } else {
            "SELECT id, customer_id, bank_vendor_id, bank_vendor_name,
                    bank_account_holder_name, bank_account_number, active
             FROM bank_detail WHERE customer_id = ?1
             ORDER BY id DESC"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![customer_id], bank_detail_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Active bank details block customer deletion.
    pub fn active_bank_detail_count(&self, customer_id: CustomerId) -> ServiceResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM bank_detail WHERE customer_id = ?1 AND active = 1",
            params![customer_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn deactivate_bank_detail(&self, id: i64) -> ServiceResult<()> {
        self.conn.execute(
            "UPDATE bank_detail SET active = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }
}
