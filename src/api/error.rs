// ==========================================
// 班次吨位引擎 - API层错误类型
// ==========================================
// 职责: 汇总导入 / 配置错误，面向调用方给出显式原因
// 说明: 数据质量问题（物料缺失、单重格式错误）不会出现在这里，
//       它们在引擎内降级为 0 并记录日志
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 调用方违反接口约定
    #[error("参数无效: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
