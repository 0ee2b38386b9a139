//! VIP level reference data and its numeric-coercion update path.
//!
//! Every recognized field is coerced to a number before persisting;
//! absent fields stay unmodified. No range validation — out-of-range
//! and negative values are accepted as-is.

use crate::coerce;
use crate::error::{ServiceError, ServiceResult};
use crate::store::Store;
use crate::types::VipLevelId;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VipLevel {
    pub id: VipLevelId,
    pub level: i64,
    pub name: String,
    pub min_amount: f64,
    pub task_count: f64,
    pub task_set: f64,
    pub commission_percentage: f64,
    pub combo_commission_percentage: f64,
    pub product_range_min_percent: f64,
    pub product_range_max_percent: f64,
    pub min_withdrawal_amount: f64,
    pub max_withdrawal_amount: f64,
    pub completed_tasks_per_day_to_withdraw: f64,
    pub withdrawal_fees_percent: f64,
}

/// Coerced numeric patch. `None` means "not in the payload".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VipPatch {
    pub min_amount: Option<f64>,
    pub task_count: Option<f64>,
    pub task_set: Option<f64>,
    pub commission_percentage: Option<f64>,
    pub combo_commission_percentage: Option<f64>,
    pub product_range_min_percent: Option<f64>,
    pub product_range_max_percent: Option<f64>,
    pub min_withdrawal_amount: Option<f64>,
    pub max_withdrawal_amount: Option<f64>,
    pub completed_tasks_per_day_to_withdraw: Option<f64>,
    pub withdrawal_fees_percent: Option<f64>,
}

impl VipPatch {
    pub fn from_json(payload: &Map<String, Value>) -> ServiceResult<Self> {
        let mut patch = Self::default();
        for (key, value) in payload {
            let slot = match key.as_str() {
                "minAmount" => &mut patch.min_amount,
                "taskCount" => &mut patch.task_count,
                "taskSet" => &mut patch.task_set,
                "commissionPercentage" => &mut patch.commission_percentage,
                "comboCommissionPercentage" => &mut patch.combo_commission_percentage,
                "productRangeMinPercent" => &mut patch.product_range_min_percent,
                "productRangeMaxPercent" => &mut patch.product_range_max_percent,
                "minWithdrawalAmount" => &mut patch.min_withdrawal_amount,
                "maxWithdrawalAmount" => &mut patch.max_withdrawal_amount,
                "completedTasksPerDayToWithdraw" => {
                    &mut patch.completed_tasks_per_day_to_withdraw
                }
                "withdrawalFeesPercent" => &mut patch.withdrawal_fees_percent,
                _ => continue,
            };
            let number = coerce::to_f64(value)
                .ok_or_else(|| ServiceError::Validation(format!("{key} must be numeric")))?;
            *slot = Some(number);
        }
        Ok(patch)
    }
}

pub struct VipService<'a> {
    store: &'a Store,
}

impl<'a> VipService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn list(&self) -> ServiceResult<Vec<VipLevel>> {
        self.store.vip_levels()
    }

    pub fn update(
        &self,
        id: VipLevelId,
        payload: &Map<String, Value>,
    ) -> ServiceResult<VipLevel> {
        if self.store.vip_level_by_id(id)?.is_none() {
            return Err(ServiceError::NotFound("VIP level"));
        }

        let patch = VipPatch::from_json(payload)?;
        self.store.apply_vip_patch(id, &patch)?;

        self.store
            .vip_level_by_id(id)?
            .ok_or(ServiceError::NotFound("VIP level"))
    }
}
