// ==========================================
// 班次吨位引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生指标对象
// 红线: 不含引擎逻辑,不含文件/存储访问
// ==========================================

pub mod material;
pub mod metrics;
pub mod production;
pub mod types;

// 重导出核心类型
pub use material::{Material, MaterialCatalog};
pub use metrics::{
    CurrentShiftTonnage, MaterialTonnage, OeeMetrics, OeeRating, PerShift, ShiftStatistics,
    ShiftStatisticsReport, ShiftTonnage,
};
pub use production::{ProductionOrder, ProductionRecord};
pub use types::{OrderStatus, ShiftName, ShiftSource};
