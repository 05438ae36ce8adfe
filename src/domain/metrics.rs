// ==========================================
// 班次吨位引擎 - 派生指标对象
// ==========================================
// 职责: 聚合结果的数据载体（瞬态，不持久化）
// ==========================================

use crate::domain::types::ShiftName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PerShift<T> - 三班次分桶
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerShift<T> {
    pub morning: T,
    pub afternoon: T,
    pub night: T,
}

impl<T> PerShift<T> {
    pub fn get(&self, shift: ShiftName) -> &T {
        match shift {
            ShiftName::Morning => &self.morning,
            ShiftName::Afternoon => &self.afternoon,
            ShiftName::Night => &self.night,
        }
    }

    pub fn get_mut(&mut self, shift: ShiftName) -> &mut T {
        match shift {
            ShiftName::Morning => &mut self.morning,
            ShiftName::Afternoon => &mut self.afternoon,
            ShiftName::Night => &mut self.night,
        }
    }

    /// 按班次顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (ShiftName, &T)> {
        ShiftName::ALL.into_iter().map(move |shift| (shift, self.get(shift)))
    }
}

/// 各班次吨位（吨）
pub type ShiftTonnage = PerShift<f64>;

impl PerShift<f64> {
    /// 生产日总吨位
    pub fn total(&self) -> f64 {
        self.morning + self.afternoon + self.night
    }
}

// ==========================================
// ShiftStatistics - 班次统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatistics {
    pub total_t: f64,
    /// 固定按 8 小时折算的小时均值
    pub average_t_per_hour: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatisticsReport {
    pub production_day: NaiveDate,
    pub shifts: PerShift<ShiftStatistics>,
}

// ==========================================
// 当前班次按物料分解
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialTonnage {
    pub product_name: String,
    pub tonnage_t: f64,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentShiftTonnage {
    pub production_day: NaiveDate,
    pub shift: ShiftName,
    pub total_t: f64,
    pub by_material: Vec<MaterialTonnage>,
}

// ==========================================
// OEE 指标
// ==========================================

/// OEE 评级
///
/// 顺序: Poor < Fair < Good < WorldClass
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OeeRating {
    Poor,       // < 40
    Fair,       // 40 - 60
    Good,       // 60 - 85
    WorldClass, // >= 85
}

impl OeeRating {
    pub fn from_score(oee: f64) -> Self {
        if oee >= 85.0 {
            OeeRating::WorldClass
        } else if oee >= 60.0 {
            OeeRating::Good
        } else if oee >= 40.0 {
            OeeRating::Fair
        } else {
            OeeRating::Poor
        }
    }
}

impl fmt::Display for OeeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OeeRating::Poor => write!(f, "POOR"),
            OeeRating::Fair => write!(f, "FAIR"),
            OeeRating::Good => write!(f, "GOOD"),
            OeeRating::WorldClass => write!(f, "WORLD_CLASS"),
        }
    }
}

/// 单机台当前班次 OEE 指标（百分比均为 0-100）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OeeMetrics {
    pub machine_id: String,
    pub production_day: NaiveDate,
    pub shift: ShiftName,

    // ===== 可用率 =====
    pub scheduled_minutes: f64,
    pub downtime_minutes: f64,
    pub operating_minutes: f64,
    pub availability: f64,

    // ===== 性能 =====
    pub active_order_id: Option<String>,
    pub produced_units: f64,
    pub planned_units: f64,
    pub performance: f64,
    pub ideal_output_units: Option<f64>, // 目标节拍 × 运行分钟

    // ===== 质量 =====
    pub total_produced: u64,
    pub total_rejects: u64,
    pub quality: f64,

    // ===== 综合 =====
    pub oee: f64,
    pub rating: OeeRating,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_shift_total_and_access() {
        let mut tonnage = ShiftTonnage::default();
        *tonnage.get_mut(ShiftName::Morning) += 1.5;
        *tonnage.get_mut(ShiftName::Night) += 0.25;

        assert_eq!(tonnage.total(), 1.75);
        assert_eq!(*tonnage.get(ShiftName::Afternoon), 0.0);
        let order: Vec<ShiftName> = tonnage.iter().map(|(s, _)| s).collect();
        assert_eq!(order, ShiftName::ALL.to_vec());
    }

    #[test]
    fn test_oee_rating_buckets() {
        assert_eq!(OeeRating::from_score(85.0), OeeRating::WorldClass);
        assert_eq!(OeeRating::from_score(84.9), OeeRating::Good);
        assert_eq!(OeeRating::from_score(40.0), OeeRating::Fair);
        assert_eq!(OeeRating::from_score(0.0), OeeRating::Poor);
    }
}
