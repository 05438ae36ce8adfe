// ==========================================
// 班次吨位引擎 - 物料参考表
// ==========================================
// 职责: 物料主数据（每箱件数、单件重量、目标节拍）
// 红线: 单重在导入边界解析为数值，字符串不进入领域层
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Material - 物料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: String,
    pub units_per_container: f64, // Und: 每箱物理件数

    /// Gramagem: 单件重量（千克）
    ///
    /// None 表示源数据无法解析，吨位计算时按 0 计入并输出诊断
    pub weight_per_unit_kg: Option<f64>,

    pub target_units_per_minute: Option<f64>, // PPm: 目标节拍（件/分钟）
}

impl Material {
    pub fn new(name: &str, units_per_container: f64, weight_per_unit_kg: f64) -> Self {
        Self {
            name: name.to_string(),
            units_per_container,
            weight_per_unit_kg: Some(weight_per_unit_kg),
            target_units_per_minute: None,
        }
    }

    pub fn with_target_ppm(mut self, ppm: f64) -> Self {
        self.target_units_per_minute = Some(ppm);
        self
    }
}

// ==========================================
// MaterialCatalog - 物料表（按名称索引）
// ==========================================
// 进程内加载一次，只读
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    by_name: HashMap<String, Material>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由物料列表构建
    ///
    /// 名称重复时保留先出现的记录
    pub fn from_materials<I: IntoIterator<Item = Material>>(materials: I) -> Self {
        let mut catalog = Self::new();
        for material in materials {
            catalog.insert(material);
        }
        catalog
    }

    /// 插入物料，名称已存在时返回 false 且不覆盖
    pub fn insert(&mut self, material: Material) -> bool {
        let key = material.name.trim().to_string();
        if self.by_name.contains_key(&key) {
            return false;
        }
        self.by_name.insert(key, material);
        true
    }

    pub fn get(&self, product_name: &str) -> Option<&Material> {
        self.by_name.get(product_name.trim())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.by_name.values()
    }
}
