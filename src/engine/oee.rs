// ==========================================
// 班次吨位引擎 - OEE 指标计算
// ==========================================
// 职责: 单机台当前班次的可用率 / 性能 / 质量 / 综合效率
// 窗口: 与 now 同一生产日且班次与 now 相同的记录
// 红线: 所有除零场景显式返回 0，不产生 NaN（直接用于看板）
// ==========================================
// 可用率 = max(0, 计划分钟 - 停机分钟) / 计划分钟 × 100
// 性能   = min(100, 产出件数 / 计划件数 × 100)
// 质量   = max(0, (产出 - 不良) / 产出 × 100)，无产出时为 100
// 综合   = 可用率 × 性能 × 质量 / 10000
// ==========================================

use crate::domain::material::MaterialCatalog;
use crate::domain::metrics::{OeeMetrics, OeeRating};
use crate::domain::production::{ProductionOrder, ProductionRecord};
use crate::domain::types::ShiftName;
use crate::engine::shift_classifier::{
    classify_shift, is_same_production_day, production_day_of, resolve_record_shift,
};
use crate::engine::tonnage::TonnageCalculator;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// 早班、中班计划分钟（8h18m）
pub const DAY_SHIFT_SCHEDULED_MINUTES: f64 = 498.0;
/// 夜班计划分钟（7h22m）
pub const NIGHT_SHIFT_SCHEDULED_MINUTES: f64 = 442.0;

/// 班次计划分钟
pub fn scheduled_shift_minutes(shift: ShiftName) -> f64 {
    match shift {
        ShiftName::Morning | ShiftName::Afternoon => DAY_SHIFT_SCHEDULED_MINUTES,
        ShiftName::Night => NIGHT_SHIFT_SCHEDULED_MINUTES,
    }
}

/// 可用率（%）
pub fn availability(scheduled_minutes: f64, downtime_minutes: f64) -> f64 {
    if !(scheduled_minutes > 0.0) {
        return 0.0;
    }
    let operating = (scheduled_minutes - downtime_minutes).max(0.0);
    (operating / scheduled_minutes * 100.0).clamp(0.0, 100.0)
}

/// 性能（%），上限 100
pub fn performance(produced_units: f64, planned_units: f64) -> f64 {
    if !(planned_units > 0.0) || !produced_units.is_finite() {
        return 0.0;
    }
    (produced_units / planned_units * 100.0).clamp(0.0, 100.0)
}

/// 质量（%），无产出时为 100
pub fn quality(total_produced: u64, total_rejects: u64) -> f64 {
    if total_produced == 0 {
        return 100.0;
    }
    let good = total_produced as f64 - total_rejects as f64;
    (good / total_produced as f64 * 100.0).max(0.0)
}

/// 综合效率（%）
pub fn composite(availability: f64, performance: f64, quality: f64) -> f64 {
    let oee = availability * performance * quality / 10000.0;
    if oee.is_finite() {
        oee
    } else {
        0.0
    }
}

// ==========================================
// OeeCalculator - OEE 计算器
// ==========================================
pub struct OeeCalculator {
    tonnage: TonnageCalculator,
}

impl OeeCalculator {
    pub fn new(catalog: Arc<MaterialCatalog>) -> Self {
        Self {
            tonnage: TonnageCalculator::new(catalog),
        }
    }

    /// 计算单机台当前班次 OEE
    ///
    /// 性能使用机台首个 running/pending 订单（按输入顺序），
    /// 产出件数统计该订单的全部输入记录（订单进度对比计划）
    #[instrument(skip(self, records, orders), fields(
        records_count = records.len(),
        orders_count = orders.len()
    ))]
    pub fn calculate(
        &self,
        machine_id: &str,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> OeeMetrics {
        let shift = classify_shift(now);
        let production_day = production_day_of(now);

        let machine_order_ids: HashSet<&str> = orders
            .iter()
            .filter(|o| o.machine_id == machine_id)
            .map(|o| o.id.as_str())
            .collect();

        // 1. 当前班次窗口内的机台记录
        let window: Vec<&ProductionRecord> = records
            .iter()
            .filter(|r| machine_order_ids.contains(r.order_id.as_str()))
            .filter(|r| is_same_production_day(r.recorded_at, now))
            .filter(|r| resolve_record_shift(r).shift == shift)
            .collect();

        // 2. 可用率
        let scheduled_minutes = scheduled_shift_minutes(shift);
        let downtime_minutes: f64 = window.iter().map(|r| f64::from(r.downtime_minutes)).sum();
        let operating_minutes = (scheduled_minutes - downtime_minutes).max(0.0);
        let availability = availability(scheduled_minutes, downtime_minutes);

        // 3. 性能
        let active_order = orders
            .iter()
            .find(|o| o.machine_id == machine_id && o.status.is_active());
        let (produced_units, planned_units, ideal_output_units) = match active_order {
            Some(order) => self.order_progress(order, records, operating_minutes),
            None => (0.0, 0.0, None),
        };
        let performance = performance(produced_units, planned_units);

        // 4. 质量
        let total_produced: u64 = window.iter().map(|r| u64::from(r.produced_quantity)).sum();
        let total_rejects: u64 = window.iter().map(|r| u64::from(r.reject_quantity)).sum();
        let quality = quality(total_produced, total_rejects);

        // 5. 综合
        let oee = composite(availability, performance, quality);

        tracing::debug!(
            machine_id,
            %shift,
            availability,
            performance,
            quality,
            oee,
            "oee calculated"
        );

        OeeMetrics {
            machine_id: machine_id.to_string(),
            production_day,
            shift,
            scheduled_minutes,
            downtime_minutes,
            operating_minutes,
            availability,
            active_order_id: active_order.map(|o| o.id.clone()),
            produced_units,
            planned_units,
            performance,
            ideal_output_units,
            total_produced,
            total_rejects,
            quality,
            oee,
            rating: OeeRating::from_score(oee),
            record_count: window.len(),
        }
    }

    /// 计算订单中出现的所有机台（按首次出现顺序）
    pub fn calculate_all_machines(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> Vec<OeeMetrics> {
        let mut seen = HashSet::new();
        orders
            .iter()
            .filter(|o| seen.insert(o.machine_id.as_str()))
            .map(|o| self.calculate(&o.machine_id, records, orders, now))
            .collect()
    }

    /// 活动订单进度: (产出件数, 计划件数, 理论产出件数)
    ///
    /// 物料缺失时件数均为 0
    fn order_progress(
        &self,
        order: &ProductionOrder,
        records: &[ProductionRecord],
        operating_minutes: f64,
    ) -> (f64, f64, Option<f64>) {
        let produced_boxes: u32 = records
            .iter()
            .filter(|r| r.order_id == order.id)
            .fold(0u32, |acc, r| acc.saturating_add(r.produced_quantity));

        let material = match self.tonnage.resolve_material(&order.product_name) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "performance degraded to zero"
                );
                return (0.0, 0.0, None);
            }
        };

        let produced_units = f64::from(produced_boxes) * material.units_per_container;
        let planned_units = f64::from(order.planned_quantity) * material.units_per_container;
        let ideal_output_units = material
            .target_units_per_minute
            .filter(|ppm| ppm.is_finite() && *ppm > 0.0)
            .map(|ppm| ppm * operating_minutes);

        (produced_units, planned_units, ideal_output_units)
    }
}
