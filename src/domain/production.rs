// ==========================================
// 班次吨位引擎 - 生产记录与生产订单
// ==========================================
// 职责: 外部输入实体（由调用方从存储层取出后传入）
// 红线: 不含引擎逻辑，记录创建后不可变
// ==========================================

use crate::domain::types::{OrderStatus, ShiftName};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionRecord - 生产记录
// ==========================================
// 数量单位: 箱（容器单位），不是物理件数
// 时间: 工厂本地挂钟时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub id: String,
    pub order_id: String,

    // ===== 数量 =====
    pub produced_quantity: u32, // 产出箱数
    #[serde(default)]
    pub reject_quantity: u32, // 不良箱数
    #[serde(default)]
    pub downtime_minutes: u32, // 停机分钟

    // ===== 时间与班次 =====
    pub recorded_at: NaiveDateTime, // 记录所反映的时刻
    #[serde(default)]
    pub shift: Option<ShiftName>, // 创建时登记的班次（历史记录可能缺失）
}

impl ProductionRecord {
    /// 创建生产记录（自动生成 ID，无班次字段）
    pub fn new(order_id: &str, produced_quantity: u32, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            produced_quantity,
            reject_quantity: 0,
            downtime_minutes: 0,
            recorded_at,
            shift: None,
        }
    }

    pub fn with_shift(mut self, shift: ShiftName) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn with_rejects(mut self, reject_quantity: u32) -> Self {
        self.reject_quantity = reject_quantity;
        self
    }

    pub fn with_downtime(mut self, downtime_minutes: u32) -> Self {
        self.downtime_minutes = downtime_minutes;
        self
    }
}

// ==========================================
// ProductionOrder - 生产订单
// ==========================================
// machine_id / status 仅供 OEE 计算与调用方筛选
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOrder {
    pub id: String,
    pub product_name: String,  // 物料表键
    pub planned_quantity: u32, // 计划箱数
    pub machine_id: String,
    pub status: OrderStatus,
}

impl ProductionOrder {
    pub fn new(
        id: &str,
        product_name: &str,
        planned_quantity: u32,
        machine_id: &str,
        status: OrderStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            product_name: product_name.to_string(),
            planned_quantity,
            machine_id: machine_id.to_string(),
            status,
        }
    }
}
