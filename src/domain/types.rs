// ==========================================
// 班次吨位引擎 - 领域类型定义
// ==========================================
// 班次名称、班次来源、生产订单状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次 (Shift)
// ==========================================
// 红线: 班次边界是固定的工厂排班常量,不从配置派生
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftName {
    #[serde(alias = "morning", alias = "MORNING", alias = "Manhã", alias = "manha")]
    Morning, // 早班 05:32 - 13:50
    #[serde(alias = "afternoon", alias = "AFTERNOON", alias = "Tarde", alias = "tarde")]
    Afternoon, // 中班 13:50 - 22:08
    #[serde(alias = "night", alias = "NIGHT", alias = "Noite", alias = "noite")]
    Night, // 夜班 22:08 - 次日 05:32
}

impl ShiftName {
    /// 生产日内的班次顺序
    pub const ALL: [ShiftName; 3] = [ShiftName::Morning, ShiftName::Afternoon, ShiftName::Night];

    /// 从字符串解析班次（大小写不敏感，兼容葡语历史数据）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "manhã" | "manha" => Some(ShiftName::Morning),
            "afternoon" | "tarde" => Some(ShiftName::Afternoon),
            "night" | "noite" => Some(ShiftName::Night),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftName::Morning => "Morning",
            ShiftName::Afternoon => "Afternoon",
            ShiftName::Night => "Night",
        }
    }
}

impl fmt::Display for ShiftName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 班次来源 (Shift Source)
// ==========================================
// 记录自带班次字段 → Stored
// 历史记录缺少班次字段 → 由 recorded_at 推导 → Derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftSource {
    Stored,
    Derived,
}

impl fmt::Display for ShiftSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftSource::Stored => write!(f, "STORED"),
            ShiftSource::Derived => write!(f, "DERIVED"),
        }
    }
}

// ==========================================
// 生产订单状态 (Order Status)
// ==========================================
// 序列化格式: lowercase (与上游数据一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,   // 待生产
    Running,   // 生产中
    Paused,    // 暂停
    Completed, // 已完成
    Cancelled, // 已取消
    #[serde(other)]
    Unknown, // 未识别状态
}

impl OrderStatus {
    /// 从字符串解析状态，未识别的值归入 Unknown
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "running" => OrderStatus::Running,
            "paused" => OrderStatus::Paused,
            "completed" => OrderStatus::Completed,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    /// 是否为机台当前活动订单（OEE 性能计算使用）
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Running | OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Running => write!(f, "running"),
            OrderStatus::Paused => write!(f, "paused"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_parse_aliases() {
        assert_eq!(ShiftName::parse("morning"), Some(ShiftName::Morning));
        assert_eq!(ShiftName::parse(" Tarde "), Some(ShiftName::Afternoon));
        assert_eq!(ShiftName::parse("NOITE"), Some(ShiftName::Night));
        assert_eq!(ShiftName::parse("evening"), None);
    }

    #[test]
    fn test_shift_serde_accepts_legacy_names() {
        let shift: ShiftName = serde_json::from_str("\"Manhã\"").unwrap();
        assert_eq!(shift, ShiftName::Morning);
        assert_eq!(serde_json::to_string(&ShiftName::Night).unwrap(), "\"Night\"");
    }

    #[test]
    fn test_order_status_unknown_fallback() {
        let status: OrderStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert!(OrderStatus::from_str("RUNNING").is_active());
        assert!(OrderStatus::Pending.is_active());
        assert!(!OrderStatus::Completed.is_active());
    }
}
