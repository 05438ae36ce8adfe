// ==========================================
// 班次吨位引擎 - 导入层
// ==========================================
// 职责: 外部数据 → 领域对象（物料表、生产快照）
// 支持: Excel, CSV, JSON
// 红线: 本地化数值字符串只在本层解析
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod locale_decimal;
pub mod material_importer;
pub mod snapshot;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use locale_decimal::parse_locale_decimal;
pub use material_importer::{MaterialImportReport, MaterialImporter};
pub use snapshot::{parse_plant_timestamp, ProductionSnapshot, SnapshotImporter};
