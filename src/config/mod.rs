// ==========================================
// 班次吨位引擎 - 配置层
// ==========================================
// 职责: 引擎配置管理,支持文件 + 环境变量覆写
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, default_config_path, ConfigError, ConfigManager, EngineConfig,
    MAX_CACHE_TTL_HOURS,
};
