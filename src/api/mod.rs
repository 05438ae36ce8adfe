// ==========================================
// 班次吨位引擎 - API 层
// ==========================================
// 职责: 对 UI / 报表层暴露聚合结果（纯数据，不含传输协议）
// ==========================================

pub mod dashboard_api;
pub mod error;

pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult};
