// ==========================================
// 班次吨位引擎 - 班次聚合器
// ==========================================
// 职责: 按生产日 + 班次汇总吨位，带 TTL 缓存
// 输入: 生产记录 + 生产订单 + now（显式传入，不读系统时钟）
// 输出: 各班次吨位 / 班次统计 / 当前班次按物料分解
// ==========================================
// 缓存语义（有意保留的取舍）:
// 缓存一旦命中即为权威结果，直到过期或被显式失效，
// 期间新增的记录不会反映到该班次的吨位中。
// ==========================================

use crate::domain::metrics::{
    CurrentShiftTonnage, MaterialTonnage, PerShift, ShiftStatistics, ShiftStatisticsReport,
    ShiftTonnage,
};
use crate::domain::production::{ProductionOrder, ProductionRecord};
use crate::domain::types::ShiftName;
use crate::engine::shift_cache::{
    InMemoryShiftCache, ShiftCacheEntry, ShiftCacheKey, ShiftCacheStore, DEFAULT_CACHE_TTL_HOURS,
};
use crate::engine::shift_classifier::{
    classify_shift, is_same_production_day, production_day_of, resolve_record_shift,
};
use crate::engine::tonnage::TonnageCalculator;
use crate::perf::{record_scanned, PerfGuard};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;

/// 班次统计的小时均值分母（固定 8 小时，与实际已过时间无关）
pub const STATISTICS_SHIFT_HOURS: f64 = 8.0;

/// 默认每班小时数（小时均产）
pub const DEFAULT_SHIFT_HOURS: f64 = 8.0;

/// 按订单 ID 建立索引（ID 重复时先出现者优先）
pub(crate) fn index_orders(orders: &[ProductionOrder]) -> HashMap<&str, &ProductionOrder> {
    let mut index = HashMap::with_capacity(orders.len());
    for order in orders {
        index.entry(order.id.as_str()).or_insert(order);
    }
    index
}

// ==========================================
// ShiftAggregator - 班次聚合器
// ==========================================
pub struct ShiftAggregator {
    tonnage: TonnageCalculator,
    cache: Arc<dyn ShiftCacheStore>,
    cache_ttl: Duration,
}

impl ShiftAggregator {
    /// 使用进程内缓存与默认 16 小时有效期
    pub fn new(tonnage: TonnageCalculator) -> Self {
        Self::with_cache(
            tonnage,
            Arc::new(InMemoryShiftCache::new()),
            Duration::hours(DEFAULT_CACHE_TTL_HOURS),
        )
    }

    /// 注入缓存存储与有效期
    pub fn with_cache(
        tonnage: TonnageCalculator,
        cache: Arc<dyn ShiftCacheStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            tonnage,
            cache,
            cache_ttl,
        }
    }

    pub fn tonnage(&self) -> &TonnageCalculator {
        &self.tonnage
    }

    pub fn cache(&self) -> &Arc<dyn ShiftCacheStore> {
        &self.cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 各班次吨位（当前生产日）
    ///
    /// 规则：
    /// 1) 逐班次查缓存，键为 (production_day_of(now), shift)，仅 now < expires_at 视为命中
    /// 2) 三个班次全部命中 → 直接返回，不扫描记录
    /// 3) 否则只保留与 now 同一生产日的记录，逐条解析订单、班次并累加吨位
    /// 4) 未命中的班次写入新结果与缓存；命中的班次保留缓存值
    #[instrument(skip(self, records, orders), fields(
        records_count = records.len(),
        orders_count = orders.len()
    ))]
    pub fn aggregate_tonnage_by_shift(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ShiftTonnage {
        let _perf = PerfGuard::new("aggregate_tonnage_by_shift");
        let production_day = production_day_of(now);

        // 1. 查缓存
        let cached: PerShift<Option<f64>> = PerShift {
            morning: self.cached_tonnage(production_day, ShiftName::Morning, now),
            afternoon: self.cached_tonnage(production_day, ShiftName::Afternoon, now),
            night: self.cached_tonnage(production_day, ShiftName::Night, now),
        };

        // 2. 全部命中
        if let (Some(morning), Some(afternoon), Some(night)) =
            (cached.morning, cached.afternoon, cached.night)
        {
            tracing::debug!(%production_day, "shift tonnage served from cache");
            return ShiftTonnage {
                morning,
                afternoon,
                night,
            };
        }

        // 3. 重新计算
        let fresh = self.sum_by_shift(records, orders, now);

        // 4. 合并：命中保留缓存值，未命中写入新值与缓存
        let mut result = ShiftTonnage::default();
        for shift in ShiftName::ALL {
            let value = match *cached.get(shift) {
                Some(hit) => hit,
                None => {
                    let computed = *fresh.get(shift);
                    self.cache.put(
                        ShiftCacheKey::new(production_day, shift),
                        ShiftCacheEntry::new(computed, now, self.cache_ttl),
                    );
                    computed
                }
            };
            *result.get_mut(shift) = value;
        }

        tracing::info!(
            %production_day,
            morning_t = result.morning,
            afternoon_t = result.afternoon,
            night_t = result.night,
            "shift tonnage aggregated"
        );
        result
    }

    /// 小时均产（吨/小时）
    ///
    /// shift_hours <= 0 或无记录时返回 0
    pub fn calculate_average_production_per_hour(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        shift_hours: f64,
    ) -> f64 {
        if records.is_empty() || !(shift_hours > 0.0) {
            return 0.0;
        }

        let index = index_orders(orders);
        record_scanned(records.len());
        let total: f64 = records
            .iter()
            .filter_map(|record| self.record_tonnage(record, &index))
            .sum();

        total / shift_hours
    }

    /// 班次统计（当前生产日）
    ///
    /// average = total / 8（固定分母）
    #[instrument(skip(self, records, orders), fields(records_count = records.len()))]
    pub fn calculate_shift_statistics(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ShiftStatisticsReport {
        let _perf = PerfGuard::new("calculate_shift_statistics");
        let index = index_orders(orders);

        let mut shifts: PerShift<ShiftStatistics> = PerShift::default();
        for record in self.same_production_day(records, now) {
            let Some(tonnes) = self.record_tonnage(record, &index) else {
                continue;
            };
            let stats = shifts.get_mut(resolve_record_shift(record).shift);
            stats.total_t += tonnes;
            stats.record_count += 1;
        }

        for shift in ShiftName::ALL {
            let stats = shifts.get_mut(shift);
            stats.average_t_per_hour = stats.total_t / STATISTICS_SHIFT_HOURS;
        }

        ShiftStatisticsReport {
            production_day: production_day_of(now),
            shifts,
        }
    }

    /// 当前班次按物料分解的吨位
    ///
    /// 物料按吨位降序，吨位相同按名称升序
    #[instrument(skip(self, records, orders), fields(records_count = records.len()))]
    pub fn calculate_current_shift_total_tonnage(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> CurrentShiftTonnage {
        let _perf = PerfGuard::new("calculate_current_shift_total_tonnage");
        let current_shift = classify_shift(now);
        let index = index_orders(orders);

        let mut by_name: BTreeMap<&str, MaterialTonnage> = BTreeMap::new();
        for record in self.same_production_day(records, now) {
            if resolve_record_shift(record).shift != current_shift {
                continue;
            }
            let Some(order) = self.resolve_order(record, &index) else {
                continue;
            };
            let tonnes = self
                .tonnage
                .calculate_tonnage(&order.product_name, record.produced_quantity);

            let entry = by_name
                .entry(order.product_name.as_str())
                .or_insert_with(|| MaterialTonnage {
                    product_name: order.product_name.clone(),
                    tonnage_t: 0.0,
                    record_count: 0,
                });
            entry.tonnage_t += tonnes;
            entry.record_count += 1;
        }

        let mut by_material: Vec<MaterialTonnage> = by_name.into_values().collect();
        // BTreeMap 已按名称排序，稳定排序保证同吨位按名称
        by_material.sort_by(|a, b| b.tonnage_t.total_cmp(&a.tonnage_t));
        let total_t = by_material.iter().map(|m| m.tonnage_t).sum();

        CurrentShiftTonnage {
            production_day: production_day_of(now),
            shift: current_shift,
            total_t,
            by_material,
        }
    }

    // ==========================================
    // 缓存管理
    // ==========================================

    /// 显式失效某班次缓存（例如该班次上报了新产量）
    pub fn invalidate_shift(&self, production_day: NaiveDate, shift: ShiftName) -> bool {
        let removed = self
            .cache
            .invalidate(&ShiftCacheKey::new(production_day, shift));
        if removed {
            tracing::info!(%production_day, %shift, "shift cache invalidated");
        }
        removed
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn purge_expired(&self, now: NaiveDateTime) -> usize {
        self.cache.purge_expired(now)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn cached_tonnage(
        &self,
        production_day: NaiveDate,
        shift: ShiftName,
        now: NaiveDateTime,
    ) -> Option<f64> {
        self.cache
            .get(&ShiftCacheKey::new(production_day, shift), now)
            .map(|entry| entry.tonnage_t)
    }

    /// 从零计算当前生产日各班次吨位
    fn sum_by_shift(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ShiftTonnage {
        let index = index_orders(orders);
        let mut totals = ShiftTonnage::default();
        for record in self.same_production_day(records, now) {
            if let Some(tonnes) = self.record_tonnage(record, &index) {
                *totals.get_mut(resolve_record_shift(record).shift) += tonnes;
            }
        }
        totals
    }

    fn same_production_day<'r>(
        &self,
        records: &'r [ProductionRecord],
        now: NaiveDateTime,
    ) -> impl Iterator<Item = &'r ProductionRecord> {
        record_scanned(records.len());
        records
            .iter()
            .filter(move |record| is_same_production_day(record.recorded_at, now))
    }

    fn resolve_order<'o>(
        &self,
        record: &ProductionRecord,
        index: &HashMap<&str, &'o ProductionOrder>,
    ) -> Option<&'o ProductionOrder> {
        let order = index.get(record.order_id.as_str()).copied();
        if order.is_none() {
            tracing::warn!(
                record_id = %record.id,
                order_id = %record.order_id,
                "order not found for production record, skipped"
            );
        }
        order
    }

    /// 单条记录吨位（订单缺失时为 None）
    fn record_tonnage(
        &self,
        record: &ProductionRecord,
        index: &HashMap<&str, &ProductionOrder>,
    ) -> Option<f64> {
        self.resolve_order(record, index).map(|order| {
            self.tonnage
                .calculate_tonnage(&order.product_name, record.produced_quantity)
        })
    }
}
