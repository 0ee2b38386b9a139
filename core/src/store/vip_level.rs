use super::Store;
use crate::error::ServiceResult;
use crate::types::VipLevelId;
use crate::vip::{VipLevel, VipPatch};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, OptionalExtension};

const VIP_COLUMNS: &str = "id, level, name, min_amount, task_count, task_set,
        commission_percentage, combo_commission_percentage,
        product_range_min_percent, product_range_max_percent,
        min_withdrawal_amount, max_withdrawal_amount,
        completed_tasks_per_day_to_withdraw, withdrawal_fees_percent";

fn vip_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VipLevel> {
    Ok(VipLevel {
        id: row.get(0)?,
        level: row.get(1)?,
        name: row.get(2)?,
        min_amount: row.get(3)?,
        task_count: row.get(4)?,
        task_set: row.get(5)?,
        commission_percentage: row.get(6)?,
        combo_commission_percentage: row.get(7)?,
        product_range_min_percent: row.get(8)?,
        product_range_max_percent: row.get(9)?,
        min_withdrawal_amount: row.get(10)?,
        max_withdrawal_amount: row.get(11)?,
        completed_tasks_per_day_to_withdraw: row.get(12)?,
        withdrawal_fees_percent: row.get(13)?,
    })
}

impl Store {
    pub fn insert_vip_level(&self, level: i64, name: &str) -> ServiceResult<VipLevelId> {
        self.conn.execute(
            "INSERT INTO vip_level (level, name) VALUES (?1, ?2)",
            params![level, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn vip_level_by_id(&self, id: VipLevelId) -> ServiceResult<Option<VipLevel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {VIP_COLUMNS} FROM vip_level WHERE id = ?1"))?;
        let row = stmt.query_row(params![id], vip_from_row).optional()?;
        Ok(row)
    }

    pub fn vip_levels(&self) -> ServiceResult<Vec<VipLevel>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VIP_COLUMNS} FROM vip_level ORDER BY level ASC"
        ))?;
        let rows = stmt.query_map([], vip_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Single-statement partial update; absent fields stay untouched.
    pub fn apply_vip_patch(&self, id: VipLevelId, patch: &VipPatch) -> ServiceResult<usize> {
        let mut sets: Vec<String> = Vec::new();
        let mut bind: Vec<SqlValue> = Vec::new();
        {
            let mut add = |col: &str, value: f64| {
                bind.push(SqlValue::Real(value));
                sets.push(format!("{col} = ?{}", bind.len()));
            };
            if let Some(v) = patch.min_amount {
                add("min_amount", v);
            }
            if let Some(v) = patch.task_count {
                add("task_count", v);
            }
            if let Some(v) = patch.task_set {
                add("task_set", v);
            }
            if let Some(v) = patch.commission_percentage {
                add("commission_percentage", v);
            }
            if let Some(v) = patch.combo_commission_percentage {
                add("combo_commission_percentage", v);
            }
            if let Some(v) = patch.product_range_min_percent {
                add("product_range_min_percent", v);
            }
            if let Some(v) = patch.product_range_max_percent {
                add("product_range_max_percent", v);
            }
            if let Some(v) = patch.min_withdrawal_amount {
                add("min_withdrawal_amount", v);
            }
            if let Some(v) = patch.max_withdrawal_amount {
                add("max_withdrawal_amount", v);
            }
            if let Some(v) = patch.completed_tasks_per_day_to_withdraw {
                add("completed_tasks_per_day_to_withdraw", v);
            }
            if let Some(v) = patch.withdrawal_fees_percent {
                add("withdrawal_fees_percent", v);
            }
        }

        if sets.is_empty() {
            return Ok(0);
        }
        bind.push(SqlValue::Integer(id));
        let sql = format!(
            "UPDATE vip_level SET {} WHERE id = ?{}",
            sets.join(", "),
            bind.len()
        );
        let n = self.conn.execute(&sql, params_from_iter(bind))?;
        Ok(n)
    }
}
