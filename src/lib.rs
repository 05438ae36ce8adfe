// ==========================================
// 班次吨位引擎 - 核心库
// ==========================================
// 职责: 班次判定、吨位换算、班次聚合（带缓存）、OEE 计算
// 时间模型: 工厂本地时间（NaiveDateTime），生产日从 05:32 开始
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 看板接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderStatus, ShiftName, ShiftSource};

// 领域实体
pub use domain::{
    CurrentShiftTonnage, Material, MaterialCatalog, OeeMetrics, OeeRating, ProductionOrder,
    ProductionRecord, ShiftStatistics, ShiftStatisticsReport, ShiftTonnage,
};

// 引擎
pub use engine::{
    classify_shift, production_day_of, InMemoryShiftCache, OeeCalculator, ShiftAggregator,
    ShiftCacheStore, TonnageCalculator, TonnageError,
};

// API
pub use api::{ApiError, DashboardApi, DashboardSnapshot};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班次吨位引擎";
