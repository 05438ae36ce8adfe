// ==========================================
// 班次吨位引擎 - 引擎层
// ==========================================
// 职责: 纯内存计算，不做任何 I/O
// 依赖顺序: 班次判定 → 吨位计算 → 班次聚合 → OEE 指标
// 红线: 数据质量问题只降级不失败，now 必须显式传入
// ==========================================

pub mod oee;
pub mod shift_aggregator;
pub mod shift_cache;
pub mod shift_classifier;
pub mod tonnage;

// 重导出核心引擎
pub use oee::{scheduled_shift_minutes, OeeCalculator};
pub use shift_aggregator::{ShiftAggregator, DEFAULT_SHIFT_HOURS, STATISTICS_SHIFT_HOURS};
pub use shift_cache::{
    InMemoryShiftCache, ShiftCacheEntry, ShiftCacheKey, ShiftCacheStore, DEFAULT_CACHE_TTL_HOURS,
};
pub use shift_classifier::{
    classify_shift, classify_shift_at, is_same_production_day, production_day_at,
    production_day_of, resolve_record_shift, shift_window, ResolvedShift,
};
pub use tonnage::{tonnes_from, TonnageCalculator, TonnageError};
