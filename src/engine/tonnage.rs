// ==========================================
// 班次吨位引擎 - 吨位计算
// ==========================================
// 公式（全系统唯一吨位来源）:
//   吨 = 产出箱数 × 每箱件数 × 单件重量(kg) / 1000
// 红线: 永不失败，坏物料只计 0 并输出诊断，不能中断整班聚合
// ==========================================

use crate::domain::material::{Material, MaterialCatalog};
use std::sync::Arc;
use thiserror::Error;

const KG_PER_TONNE: f64 = 1000.0;

/// 吨位诊断条件
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TonnageError {
    #[error("物料不存在: {0}")]
    MaterialNotFound(String),

    #[error("单件重量格式错误: material={0}")]
    MalformedWeight(String),

    #[error("每箱件数无效: material={name}, units_per_container={units}")]
    InvalidUnitsPerContainer { name: String, units: f64 },
}

/// 吨位公式
pub fn tonnes_from(
    produced_quantity: u32,
    units_per_container: f64,
    weight_per_unit_kg: f64,
) -> f64 {
    f64::from(produced_quantity) * units_per_container * weight_per_unit_kg / KG_PER_TONNE
}

// ==========================================
// TonnageCalculator - 吨位计算器
// ==========================================
#[derive(Debug, Clone)]
pub struct TonnageCalculator {
    catalog: Arc<MaterialCatalog>,
}

impl TonnageCalculator {
    pub fn new(catalog: Arc<MaterialCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// 查找物料并校验每箱件数
    pub fn resolve_material(&self, product_name: &str) -> Result<&Material, TonnageError> {
        let material = self
            .catalog
            .get(product_name)
            .ok_or_else(|| TonnageError::MaterialNotFound(product_name.to_string()))?;

        let units = material.units_per_container;
        if !units.is_finite() || units <= 0.0 {
            return Err(TonnageError::InvalidUnitsPerContainer {
                name: material.name.clone(),
                units,
            });
        }
        Ok(material)
    }

    /// 计算吨位（可失败版本，返回具体诊断条件）
    pub fn try_tonnage(
        &self,
        product_name: &str,
        produced_quantity: u32,
    ) -> Result<f64, TonnageError> {
        let material = self.resolve_material(product_name)?;
        let weight_kg = material
            .weight_per_unit_kg
            .filter(|w| w.is_finite())
            .ok_or_else(|| TonnageError::MalformedWeight(material.name.clone()))?;

        Ok(tonnes_from(
            produced_quantity,
            material.units_per_container,
            weight_kg,
        ))
    }

    /// 计算吨位
    ///
    /// 所有失败路径降级为 0，并记录 warn 日志
    pub fn calculate_tonnage(&self, product_name: &str, produced_quantity: u32) -> f64 {
        match self.try_tonnage(product_name, produced_quantity) {
            Ok(tonnes) => tonnes,
            Err(e) => {
                tracing::warn!(
                    product_name,
                    produced_quantity,
                    error = %e,
                    "tonnage degraded to zero"
                );
                0.0
            }
        }
    }

    /// 箱数换算为物理件数（物料缺失或无效时为 None）
    pub fn physical_units(&self, product_name: &str, quantity: u32) -> Option<f64> {
        self.resolve_material(product_name)
            .ok()
            .map(|m| f64::from(quantity) * m.units_per_container)
    }
}
