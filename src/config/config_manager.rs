// ==========================================
// 班次吨位引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、覆写管理
// 优先级（低 → 高）: 内置默认值 → JSON 配置文件 → 环境变量
// 红线: 班次边界不是配置项
// ==========================================

use crate::engine::{DEFAULT_CACHE_TTL_HOURS, DEFAULT_SHIFT_HOURS};
use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ==========================================
// 配置键（环境变量）
// ==========================================
pub mod config_keys {
    pub const CONFIG_PATH: &str = "SHIFT_TONNAGE_CONFIG";
    pub const CACHE_TTL_HOURS: &str = "SHIFT_TONNAGE_CACHE_TTL_HOURS";
    pub const SHIFT_HOURS: &str = "SHIFT_TONNAGE_SHIFT_HOURS";
    pub const UTC_OFFSET_MINUTES: &str = "SHIFT_TONNAGE_UTC_OFFSET_MINUTES";
    pub const MATERIALS_PATH: &str = "SHIFT_TONNAGE_MATERIALS_PATH";
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// 缓存有效期上限（小时）
pub const MAX_CACHE_TTL_HOURS: i64 = 24 * 366;

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// 班次吨位缓存有效期（小时）
    pub cache_ttl_hours: i64,
    /// 小时均产使用的每班小时数
    pub shift_hours: f64,
    /// 工厂时区相对 UTC 的偏移（分钟）
    pub plant_utc_offset_minutes: i32,
    /// 默认物料表路径
    pub materials_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            shift_hours: DEFAULT_SHIFT_HOURS,
            plant_utc_offset_minutes: 0,
            materials_path: None,
        }
    }
}

impl EngineConfig {
    /// 缓存有效期，未校验的取值收敛到 [1, MAX_CACHE_TTL_HOURS]
    pub fn cache_ttl(&self) -> Duration {
        Duration::hours(self.cache_ttl_hours.clamp(1, MAX_CACHE_TTL_HOURS))
    }

    /// 工厂时区偏移（已在校验阶段保证有效）
    pub fn plant_offset(&self) -> FixedOffset {
        offset_from_minutes(self.plant_utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CACHE_TTL_HOURS).contains(&self.cache_ttl_hours) {
            return Err(invalid(
                "cacheTtlHours",
                &self.cache_ttl_hours.to_string(),
                "必须在 1 到 8784 小时之间",
            ));
        }
        if !(self.shift_hours > 0.0) || !self.shift_hours.is_finite() {
            return Err(invalid("shiftHours", &self.shift_hours.to_string(), "必须大于 0"));
        }
        if offset_from_minutes(self.plant_utc_offset_minutes).is_none() {
            return Err(invalid(
                "plantUtcOffsetMinutes",
                &self.plant_utc_offset_minutes.to_string(),
                "超出 ±24 小时范围",
            ));
        }
        Ok(())
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

fn invalid(key: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid(key, value, "无法解析"))
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    config: EngineConfig,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 仅使用内置默认值
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            source_path: None,
        }
    }

    /// 加载配置
    ///
    /// 配置文件查找顺序：
    /// 1) 参数显式指定
    /// 2) 环境变量 SHIFT_TONNAGE_CONFIG
    /// 3) <用户配置目录>/shift-tonnage/config.json（存在时）
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| {
                std::env::var(config_keys::CONFIG_PATH)
                    .ok()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let mut config = match &path {
            Some(p) => Self::read_file(p)?,
            None => EngineConfig::default(),
        };

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;

        tracing::debug!(
            source = ?path,
            cache_ttl_hours = config.cache_ttl_hours,
            shift_hours = config.shift_hours,
            plant_utc_offset_minutes = config.plant_utc_offset_minutes,
            "engine config loaded"
        );

        Ok(Self {
            config,
            source_path: path,
        })
    }

    /// 读取 JSON 配置文件（缺失字段使用默认值）
    pub fn read_file(path: &Path) -> Result<EngineConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 环境变量覆写
    ///
    /// lookup 参数便于测试时注入变量表
    pub fn apply_env_overrides<F>(config: &mut EngineConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(config_keys::CACHE_TTL_HOURS) {
            config.cache_ttl_hours = parse_env(config_keys::CACHE_TTL_HOURS, &v)?;
        }
        if let Some(v) = lookup(config_keys::SHIFT_HOURS) {
            config.shift_hours = parse_env(config_keys::SHIFT_HOURS, &v)?;
        }
        if let Some(v) = lookup(config_keys::UTC_OFFSET_MINUTES) {
            config.plant_utc_offset_minutes = parse_env(config_keys::UTC_OFFSET_MINUTES, &v)?;
        }
        if let Some(v) = lookup(config_keys::MATERIALS_PATH) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                config.materials_path = Some(PathBuf::from(trimmed));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shift-tonnage").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl_hours, 16);
        assert_eq!(config.shift_hours, 8.0);
        assert_eq!(config.cache_ttl(), Duration::hours(16));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_read_file_partial_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"cacheTtlHours": 4, "plantUtcOffsetMinutes": -180}}"#).unwrap();

        let config = ConfigManager::read_file(file.path()).unwrap();
        assert_eq!(config.cache_ttl_hours, 4);
        assert_eq!(config.shift_hours, 8.0);
        assert_eq!(config.plant_offset(), FixedOffset::west_opt(3 * 3600).unwrap());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = EngineConfig::default();
        let lookup = lookup_from(&[
            (config_keys::CACHE_TTL_HOURS, "12"),
            (config_keys::SHIFT_HOURS, "7.5"),
            (config_keys::MATERIALS_PATH, "/data/materials.csv"),
        ]);

        ConfigManager::apply_env_overrides(&mut config, lookup).unwrap();
        assert_eq!(config.cache_ttl_hours, 12);
        assert_eq!(config.shift_hours, 7.5);
        assert_eq!(config.materials_path, Some(PathBuf::from("/data/materials.csv")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = EngineConfig::default();
        let lookup = lookup_from(&[(config_keys::CACHE_TTL_HOURS, "sixteen")]);
        assert!(matches!(
            ConfigManager::apply_env_overrides(&mut config, lookup),
            Err(ConfigError::InvalidValue { .. })
        ));

        let zero_ttl = EngineConfig {
            cache_ttl_hours: 0,
            ..EngineConfig::default()
        };
        assert!(zero_ttl.validate().is_err());

        let mut huge_ttl = EngineConfig::default();
        let lookup = lookup_from(&[(config_keys::CACHE_TTL_HOURS, "3000000000000")]);
        ConfigManager::apply_env_overrides(&mut huge_ttl, lookup).unwrap();
        assert!(matches!(
            huge_ttl.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(huge_ttl.cache_ttl(), Duration::hours(MAX_CACHE_TTL_HOURS));

        let max_ttl = EngineConfig {
            cache_ttl_hours: MAX_CACHE_TTL_HOURS,
            ..EngineConfig::default()
        };
        assert!(max_ttl.validate().is_ok());

        let bad_offset = EngineConfig {
            plant_utc_offset_minutes: 24 * 60,
            ..EngineConfig::default()
        };
        assert!(bad_offset.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"shiftHours": 6}}"#).unwrap();

        let manager = ConfigManager::load(Some(file.path())).unwrap();
        assert_eq!(manager.source_path(), Some(file.path()));
        assert_eq!(manager.config().shift_hours, 6.0);
    }
}
