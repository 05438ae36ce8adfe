// ==========================================
// 班次吨位引擎 - 物料表导入
// ==========================================
// 来源: CSV / Excel / JSON（对象数组）
// 字段: 名称 / Und（每箱件数）/ Gramagem（单件重量 kg）/ PPm（目标节拍）
// 规则:
// - 名称为空的行跳过并告警
// - Gramagem 无法解析时保留物料（单重记为缺失），由吨位计算输出诊断
// - 名称重复时保留先出现者
// ==========================================

use crate::domain::material::{Material, MaterialCatalog};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use crate::importer::locale_decimal::parse_locale_decimal;
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

const NAME_ALIASES: &[&str] = &["Material", "material", "name", "Name", "Produto", "productName"];
const UNITS_ALIASES: &[&str] = &["Und", "und", "UND", "unitsPerContainer"];
const WEIGHT_ALIASES: &[&str] = &["Gramagem", "gramagem", "weightPerUnitKg"];
const PPM_ALIASES: &[&str] = &["PPm", "PPM", "ppm", "targetUnitsPerMinute"];

/// 物料导入结果
#[derive(Debug, Clone)]
pub struct MaterialImportReport {
    pub catalog: MaterialCatalog,
    pub total_rows: usize,
    pub imported: usize,
    /// 名称为空被跳过的行号（从 1 开始，不含表头）
    pub skipped_rows: Vec<usize>,
    /// 单件重量无法解析的物料名称
    pub malformed_weight: Vec<String>,
    /// 重复名称（未覆盖）
    pub duplicates: Vec<String>,
}

fn get_field<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

// ==========================================
// MaterialImporter - 物料表导入器
// ==========================================
pub struct MaterialImporter;

impl MaterialImporter {
    /// 从文件导入（按扩展名选择解析器）
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<MaterialImportReport> {
        let path = file_path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let rows = if is_json {
            if !path.exists() {
                return Err(ImportError::FileNotFound(path.display().to_string()));
            }
            let content = std::fs::read_to_string(path)?;
            self.json_rows(&content)?
        } else {
            UniversalFileParser.parse(path)?
        };

        let report = self.import_rows(&rows)?;
        tracing::info!(
            total_rows = report.total_rows,
            imported = report.imported,
            skipped = report.skipped_rows.len(),
            malformed_weight = report.malformed_weight.len(),
            "material table imported"
        );
        Ok(report)
    }

    /// JSON 对象数组 → 原始行（数值转为文本）
    pub fn json_rows(&self, content: &str) -> ImportResult<Vec<RawRow>> {
        let items: Vec<serde_json::Map<String, Value>> = serde_json::from_str(content)?;
        Ok(items
            .into_iter()
            .map(|item| {
                item.into_iter()
                    .filter_map(|(key, value)| {
                        let text = match value {
                            Value::String(s) => s,
                            Value::Number(n) => n.to_string(),
                            Value::Null => return None,
                            other => other.to_string(),
                        };
                        Some((key, text))
                    })
                    .collect()
            })
            .collect())
    }

    /// 原始行 → 物料表
    pub fn import_rows(&self, rows: &[RawRow]) -> ImportResult<MaterialImportReport> {
        if let Some(first) = rows.first() {
            if get_field(first, NAME_ALIASES).is_none()
                && !NAME_ALIASES.iter().any(|a| first.contains_key(*a))
            {
                return Err(ImportError::MissingColumn(NAME_ALIASES.join("/")));
            }
        }

        let mut report = MaterialImportReport {
            catalog: MaterialCatalog::new(),
            total_rows: rows.len(),
            imported: 0,
            skipped_rows: Vec::new(),
            malformed_weight: Vec::new(),
            duplicates: Vec::new(),
        };

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            let Some(material) = self.map_row(row, row_number) else {
                report.skipped_rows.push(row_number);
                continue;
            };

            if material.weight_per_unit_kg.is_none() {
                report.malformed_weight.push(material.name.clone());
            }

            let name = material.name.clone();
            if report.catalog.insert(material) {
                report.imported += 1;
            } else {
                tracing::warn!(row = row_number, name = %name, "duplicate material name ignored");
                report.duplicates.push(name);
            }
        }

        Ok(report)
    }

    /// 单行映射，名称为空时返回 None
    fn map_row(&self, row: &RawRow, row_number: usize) -> Option<Material> {
        let Some(name) = get_field(row, NAME_ALIASES) else {
            tracing::warn!(row = row_number, "material row without name skipped");
            return None;
        };

        let units_raw = get_field(row, UNITS_ALIASES).unwrap_or("");
        let units_per_container = match parse_locale_decimal(units_raw) {
            Some(units) => units,
            None => {
                tracing::warn!(
                    row = row_number,
                    name,
                    value = units_raw,
                    "unparsable Und, stored as 0"
                );
                0.0
            }
        };

        let weight_raw = get_field(row, WEIGHT_ALIASES).unwrap_or("");
        let weight_per_unit_kg = parse_locale_decimal(weight_raw);
        if weight_per_unit_kg.is_none() {
            tracing::warn!(row = row_number, name, value = weight_raw, "unparsable Gramagem");
        }

        let target_units_per_minute = get_field(row, PPM_ALIASES).and_then(parse_locale_decimal);

        Some(Material {
            name: name.to_string(),
            units_per_container,
            weight_per_unit_kg,
            target_units_per_minute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_import_rows_parses_locale_weights() {
        let rows = vec![
            row(&[("Material", "Cup-200"), ("Und", "20"), ("Gramagem", "0,035"), ("PPm", "120")]),
            row(&[("Material", "Foil-X"), ("Und", "10"), ("Gramagem", "0,05")]),
        ];

        let report = MaterialImporter.import_rows(&rows).unwrap();
        assert_eq!(report.imported, 2);

        let cup = report.catalog.get("Cup-200").unwrap();
        assert_eq!(cup.units_per_container, 20.0);
        assert_eq!(cup.weight_per_unit_kg, Some(0.035));
        assert_eq!(cup.target_units_per_minute, Some(120.0));
        assert_eq!(report.catalog.get("Foil-X").unwrap().target_units_per_minute, None);
    }

    #[test]
    fn test_malformed_weight_kept_and_reported() {
        let rows = vec![row(&[("Material", "Legacy"), ("Und", "5"), ("Gramagem", "n/a")])];

        let report = MaterialImporter.import_rows(&rows).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.malformed_weight, vec!["Legacy".to_string()]);
        assert_eq!(report.catalog.get("Legacy").unwrap().weight_per_unit_kg, None);
    }

    #[test]
    fn test_blank_name_skipped_and_duplicates_reported() {
        let rows = vec![
            row(&[("Material", "A"), ("Und", "1"), ("Gramagem", "1,0")]),
            row(&[("Material", ""), ("Und", "1"), ("Gramagem", "1,0")]),
            row(&[("Material", "A"), ("Und", "2"), ("Gramagem", "2,0")]),
        ];

        let report = MaterialImporter.import_rows(&rows).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped_rows, vec![2]);
        assert_eq!(report.duplicates, vec!["A".to_string()]);
        assert_eq!(report.catalog.get("A").unwrap().units_per_container, 1.0);
    }

    #[test]
    fn test_missing_name_column_is_error() {
        let rows = vec![row(&[("Und", "1"), ("Gramagem", "1,0")])];
        let result = MaterialImporter.import_rows(&rows);
        assert!(matches!(result, Err(ImportError::MissingColumn(_))));
    }

    #[test]
    fn test_json_rows_accept_numbers_and_strings() {
        let content = r#"[
            {"Material": "Foil-X", "Und": 10, "Gramagem": "0,05", "PPm": null},
            {"name": "Cup-200", "unitsPerContainer": 20, "weightPerUnitKg": 0.035}
        ]"#;

        let rows = MaterialImporter.json_rows(content).unwrap();
        let report = MaterialImporter.import_rows(&rows).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.catalog.get("Cup-200").unwrap().weight_per_unit_kg, Some(0.035));
        assert_eq!(report.catalog.get("Foil-X").unwrap().weight_per_unit_kg, Some(0.05));
    }
}
