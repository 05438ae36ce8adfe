// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use shift_tonnage::domain::material::{Material, MaterialCatalog};
use shift_tonnage::domain::production::{ProductionOrder, ProductionRecord};
use shift_tonnage::domain::types::{OrderStatus, ShiftName};

/// 2024-03-d h:m（工厂本地时间）
pub fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "期望 {expected}，实际 {actual}"
    );
}

/// 标准物料表
///
/// - Foil-X: 10 件/箱, 0.05 kg/件, 目标 50 件/分钟
/// - Cup-200: 100 件/箱, 0.007 kg/件
/// - Lid-90: 单重缺失
pub fn standard_catalog() -> MaterialCatalog {
    MaterialCatalog::from_materials(vec![
        Material::new("Foil-X", 10.0, 0.05).with_target_ppm(50.0),
        Material::new("Cup-200", 100.0, 0.007),
        Material {
            name: "Lid-90".to_string(),
            units_per_container: 20.0,
            weight_per_unit_kg: None,
            target_units_per_minute: None,
        },
    ])
}

// ==========================================
// ProductionOrder 构建器
// ==========================================

pub struct OrderBuilder {
    id: String,
    product_name: String,
    planned_quantity: u32,
    machine_id: String,
    status: OrderStatus,
}

impl OrderBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            product_name: "Foil-X".to_string(),
            planned_quantity: 100,
            machine_id: "M1".to_string(),
            status: OrderStatus::Running,
        }
    }

    pub fn product(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    pub fn planned(mut self, quantity: u32) -> Self {
        self.planned_quantity = quantity;
        self
    }

    pub fn machine(mut self, machine_id: &str) -> Self {
        self.machine_id = machine_id.to_string();
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> ProductionOrder {
        ProductionOrder::new(
            &self.id,
            &self.product_name,
            self.planned_quantity,
            &self.machine_id,
            self.status,
        )
    }
}

// ==========================================
// ProductionRecord 构建器
// ==========================================

pub struct RecordBuilder {
    order_id: String,
    produced_quantity: u32,
    reject_quantity: u32,
    downtime_minutes: u32,
    recorded_at: NaiveDateTime,
    shift: Option<ShiftName>,
}

impl RecordBuilder {
    pub fn new(order_id: &str, recorded_at: NaiveDateTime) -> Self {
        Self {
            order_id: order_id.to_string(),
            produced_quantity: 0,
            reject_quantity: 0,
            downtime_minutes: 0,
            recorded_at,
            shift: None,
        }
    }

    pub fn produced(mut self, quantity: u32) -> Self {
        self.produced_quantity = quantity;
        self
    }

    pub fn rejects(mut self, quantity: u32) -> Self {
        self.reject_quantity = quantity;
        self
    }

    pub fn downtime(mut self, minutes: u32) -> Self {
        self.downtime_minutes = minutes;
        self
    }

    pub fn shift(mut self, shift: ShiftName) -> Self {
        self.shift = Some(shift);
        self
    }

    pub fn build(self) -> ProductionRecord {
        let mut record =
            ProductionRecord::new(&self.order_id, self.produced_quantity, self.recorded_at)
                .with_rejects(self.reject_quantity)
                .with_downtime(self.downtime_minutes);
        if let Some(shift) = self.shift {
            record = record.with_shift(shift);
        }
        record
    }
}
