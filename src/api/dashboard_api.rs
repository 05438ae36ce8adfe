// ==========================================
// 班次吨位引擎 - 看板 API
// ==========================================
// 职责: 面向 UI / 报表层的统一入口
// 架构: API 层 → 引擎层（ShiftAggregator / OeeCalculator）
// 说明: 缓存归本实例所有；多实例部署时各自独立
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::material::MaterialCatalog;
use crate::domain::metrics::{
    CurrentShiftTonnage, OeeMetrics, ShiftStatisticsReport, ShiftTonnage,
};
use crate::domain::production::{ProductionOrder, ProductionRecord};
use crate::domain::types::ShiftName;
use crate::engine::shift_cache::{InMemoryShiftCache, ShiftCacheStore};
use crate::engine::shift_classifier::{
    classify_shift, is_same_production_day, production_day_of, resolve_record_shift,
};
use crate::engine::{OeeCalculator, ShiftAggregator, TonnageCalculator};
use crate::importer::MaterialImporter;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// ==========================================
// DashboardSnapshot - 看板快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub generated_at: NaiveDateTime,
    pub production_day: NaiveDate,
    pub current_shift: ShiftName,
    pub shift_tonnage: ShiftTonnage,
    pub total_tonnage_t: f64,
    pub average_t_per_hour: f64,
    pub statistics: ShiftStatisticsReport,
    pub current_shift_breakdown: CurrentShiftTonnage,
    pub machines: Vec<OeeMetrics>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    config: EngineConfig,
    aggregator: ShiftAggregator,
    oee: OeeCalculator,
}

impl DashboardApi {
    /// 使用进程内缓存创建
    pub fn new(catalog: MaterialCatalog, config: EngineConfig) -> Self {
        Self::with_cache(catalog, config, Arc::new(InMemoryShiftCache::new()))
    }

    /// 注入缓存存储
    pub fn with_cache(
        catalog: MaterialCatalog,
        config: EngineConfig,
        cache: Arc<dyn ShiftCacheStore>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let aggregator = ShiftAggregator::with_cache(
            TonnageCalculator::new(Arc::clone(&catalog)),
            cache,
            config.cache_ttl(),
        );
        let oee = OeeCalculator::new(catalog);
        Self {
            config,
            aggregator,
            oee,
        }
    }

    /// 从物料表文件创建
    pub fn from_material_file<P: AsRef<Path>>(path: P, config: EngineConfig) -> ApiResult<Self> {
        config.validate()?;
        let report = MaterialImporter.import_file(path)?;
        Ok(Self::new(report.catalog, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        self.aggregator.tonnage().catalog()
    }

    pub fn aggregator(&self) -> &ShiftAggregator {
        &self.aggregator
    }

    // ==========================================
    // 班次与吨位
    // ==========================================

    pub fn classify_shift(&self, timestamp: NaiveDateTime) -> ShiftName {
        classify_shift(timestamp)
    }

    pub fn production_day_of(&self, timestamp: NaiveDateTime) -> NaiveDate {
        production_day_of(timestamp)
    }

    pub fn calculate_tonnage(&self, product_name: &str, produced_quantity: u32) -> f64 {
        self.aggregator
            .tonnage()
            .calculate_tonnage(product_name, produced_quantity)
    }

    pub fn aggregate_tonnage_by_shift(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ShiftTonnage {
        self.aggregator
            .aggregate_tonnage_by_shift(records, orders, now)
    }

    pub fn calculate_shift_statistics(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ShiftStatisticsReport {
        self.aggregator
            .calculate_shift_statistics(records, orders, now)
    }

    /// 小时均产，分母取配置的每班小时数
    pub fn calculate_average_production_per_hour(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
    ) -> f64 {
        self.aggregator
            .calculate_average_production_per_hour(records, orders, self.config.shift_hours)
    }

    pub fn calculate_current_shift_total_tonnage(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> CurrentShiftTonnage {
        self.aggregator
            .calculate_current_shift_total_tonnage(records, orders, now)
    }

    // ==========================================
    // OEE
    // ==========================================

    pub fn machine_oee(
        &self,
        machine_id: &str,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> ApiResult<OeeMetrics> {
        if machine_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("machine_id 不能为空".to_string()));
        }
        Ok(self.oee.calculate(machine_id, records, orders, now))
    }

    pub fn all_machines_oee(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> Vec<OeeMetrics> {
        self.oee.calculate_all_machines(records, orders, now)
    }

    // ==========================================
    // 操作
    // ==========================================

    /// 上报新产量：失效该记录所属生产日 + 班次的缓存
    ///
    /// 返回是否删除了缓存条目
    pub fn report_production(&self, record: &ProductionRecord) -> bool {
        let production_day = production_day_of(record.recorded_at);
        let shift = resolve_record_shift(record).shift;
        tracing::info!(
            record_id = %record.id,
            %production_day,
            %shift,
            "production reported"
        );
        self.aggregator.invalidate_shift(production_day, shift)
    }

    /// 看板快照
    pub fn build_dashboard(
        &self,
        records: &[ProductionRecord],
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> DashboardSnapshot {
        let shift_tonnage = self.aggregate_tonnage_by_shift(records, orders, now);
        let day_records: Vec<ProductionRecord> = records
            .iter()
            .filter(|r| is_same_production_day(r.recorded_at, now))
            .cloned()
            .collect();

        DashboardSnapshot {
            generated_at: now,
            production_day: production_day_of(now),
            current_shift: classify_shift(now),
            total_tonnage_t: shift_tonnage.total(),
            shift_tonnage,
            average_t_per_hour: self.calculate_average_production_per_hour(&day_records, orders),
            statistics: self.calculate_shift_statistics(records, orders, now),
            current_shift_breakdown: self
                .calculate_current_shift_total_tonnage(records, orders, now),
            machines: self.all_machines_oee(records, orders, now),
        }
    }
}
