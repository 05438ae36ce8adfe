// ==========================================
// 班次吨位引擎 - 生产快照导入
// ==========================================
// 格式: JSON { "orders": [...], "records": [...] }（camelCase 键）
// 时间: recordedAt 可为本地时间（无时区）或带偏移的 RFC 3339，
//       后者按工厂时区偏移换算为本地挂钟时间
// ==========================================

use crate::domain::production::{ProductionOrder, ProductionRecord};
use crate::domain::types::{OrderStatus, ShiftName};
use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use std::path::Path;
use tracing::instrument;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrder {
    #[serde(alias = "_id")]
    id: String,
    product_name: String,
    planned_quantity: u32,
    #[serde(default)]
    machine_id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(alias = "_id")]
    id: String,
    order_id: String,
    produced_quantity: u32,
    #[serde(default)]
    reject_quantity: u32,
    #[serde(default)]
    downtime_minutes: u32,
    recorded_at: String,
    #[serde(default)]
    shift: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    orders: Vec<RawOrder>,
    #[serde(default)]
    records: Vec<RawRecord>,
}

/// 已导入的生产快照
#[derive(Debug, Clone, Default)]
pub struct ProductionSnapshot {
    pub orders: Vec<ProductionOrder>,
    pub records: Vec<ProductionRecord>,
}

/// 解析时间戳为工厂本地挂钟时间
pub fn parse_plant_timestamp(value: &str, plant_offset: &FixedOffset) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(plant_offset).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

// ==========================================
// SnapshotImporter - 快照导入器
// ==========================================
pub struct SnapshotImporter {
    plant_offset: FixedOffset,
}

impl SnapshotImporter {
    pub fn new(plant_offset: FixedOffset) -> Self {
        Self { plant_offset }
    }

    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ProductionSnapshot> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        self.import_str(&content)
    }

    pub fn import_str(&self, content: &str) -> ImportResult<ProductionSnapshot> {
        let raw: RawSnapshot = serde_json::from_str(content)?;

        let orders = raw
            .orders
            .into_iter()
            .map(|o| ProductionOrder {
                id: o.id,
                product_name: o.product_name,
                planned_quantity: o.planned_quantity,
                machine_id: o.machine_id,
                status: o
                    .status
                    .as_deref()
                    .map(OrderStatus::from_str)
                    .unwrap_or(OrderStatus::Pending),
            })
            .collect::<Vec<_>>();

        let records = raw
            .records
            .into_iter()
            .map(|r| self.convert_record(r))
            .collect::<ImportResult<Vec<_>>>()?;

        tracing::info!(
            orders = orders.len(),
            records = records.len(),
            "production snapshot imported"
        );
        Ok(ProductionSnapshot { orders, records })
    }

    fn convert_record(&self, raw: RawRecord) -> ImportResult<ProductionRecord> {
        let recorded_at = parse_plant_timestamp(&raw.recorded_at, &self.plant_offset)
            .ok_or_else(|| ImportError::TimestampFormatError {
                record_id: raw.id.clone(),
                value: raw.recorded_at.clone(),
            })?;

        // 无法识别的班次按缺失处理，由 recordedAt 推导
        let shift = match raw.shift.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => {
                let parsed = ShiftName::parse(value);
                if parsed.is_none() {
                    tracing::warn!(
                        record_id = %raw.id,
                        value,
                        "unknown shift, derived from recordedAt"
                    );
                }
                parsed
            }
        };

        Ok(ProductionRecord {
            id: raw.id,
            order_id: raw.order_id,
            produced_quantity: raw.produced_quantity,
            reject_quantity: raw.reject_quantity,
            downtime_minutes: raw.downtime_minutes,
            recorded_at,
            shift,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_parse_naive_and_rfc3339() {
        let local = parse_plant_timestamp("2024-03-10T06:00", &utc()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(local, expected);

        let with_ms = parse_plant_timestamp("2024-03-10T06:00:00.250", &utc()).unwrap();
        assert_eq!(with_ms.nanosecond(), 250_000_000);

        // 09:00Z 在 UTC-03:00 工厂为 06:00
        let plant = FixedOffset::west_opt(3 * 3600).unwrap();
        let converted = parse_plant_timestamp("2024-03-10T09:00:00Z", &plant).unwrap();
        assert_eq!(converted.hour(), 6);

        assert!(parse_plant_timestamp("10/03/2024", &utc()).is_none());
    }

    #[test]
    fn test_import_snapshot() {
        let content = r#"{
            "orders": [
                {"id": "A", "productName": "Foil-X", "plannedQuantity": 100, "machineId": "M1", "status": "running"},
                {"_id": "B", "productName": "Cup-200", "plannedQuantity": 50}
            ],
            "records": [
                {"id": "r1", "orderId": "A", "producedQuantity": 10, "recordedAt": "2024-03-10T06:00"},
                {"id": "r2", "orderId": "B", "producedQuantity": 5, "rejectQuantity": 1,
                 "downtimeMinutes": 12, "recordedAt": "2024-03-10T15:00:00", "shift": "Tarde"}
            ]
        }"#;

        let snapshot = SnapshotImporter::new(utc()).import_str(content).unwrap();
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.orders[0].status, OrderStatus::Running);
        assert_eq!(snapshot.orders[1].status, OrderStatus::Pending);
        assert_eq!(snapshot.orders[1].machine_id, "");

        assert_eq!(snapshot.records[0].shift, None);
        assert_eq!(snapshot.records[1].shift, Some(ShiftName::Afternoon));
        assert_eq!(snapshot.records[1].downtime_minutes, 12);
    }

    #[test]
    fn test_bad_timestamp_is_error() {
        let bad_time = r#"{"records": [
            {"id": "r1", "orderId": "A", "producedQuantity": 1, "recordedAt": "yesterday"}
        ]}"#;
        assert!(matches!(
            SnapshotImporter::new(utc()).import_str(bad_time),
            Err(ImportError::TimestampFormatError { .. })
        ));
    }

    #[test]
    fn test_unknown_shift_degrades_to_derived() {
        let content = r#"{"records": [
            {"id": "r1", "orderId": "A", "producedQuantity": 1, "recordedAt": "2024-03-10T06:00",
             "shift": "Manhã"},
            {"id": "r2", "orderId": "A", "producedQuantity": 2, "recordedAt": "2024-03-10T23:00",
             "shift": "Madrugada"}
        ]}"#;

        let snapshot = SnapshotImporter::new(utc()).import_str(content).unwrap();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].shift, Some(ShiftName::Morning));
        assert_eq!(snapshot.records[1].id, "r2");
        assert_eq!(snapshot.records[1].shift, None);

        let resolved = crate::engine::shift_classifier::resolve_record_shift(&snapshot.records[1]);
        assert_eq!(resolved.shift, ShiftName::Night);
        assert_eq!(resolved.source, crate::domain::types::ShiftSource::Derived);
    }
}
