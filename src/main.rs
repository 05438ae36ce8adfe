// ==========================================
// 班次吨位引擎 - 命令行入口
// ==========================================
// 用法: shift-tonnage <snapshot.json> [materials.csv|xlsx|json] [now]
// 输出: 看板快照（JSON，stdout）
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use shift_tonnage::config::ConfigManager;
use shift_tonnage::importer::{parse_plant_timestamp, MaterialImporter, SnapshotImporter};
use shift_tonnage::{logging, DashboardApi, APP_NAME, VERSION};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let snapshot_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => bail!("用法: shift-tonnage <snapshot.json> [materials.csv|xlsx|json] [now]"),
    };
    let materials_arg = args.next().map(PathBuf::from);
    let now_arg = args.next();

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let config = ConfigManager::load(None)
        .context("加载配置失败")?
        .into_config();
    let offset = config.plant_offset();

    let materials_path = materials_arg
        .or_else(|| config.materials_path.clone())
        .ok_or_else(|| anyhow!("未指定物料表（参数或 SHIFT_TONNAGE_MATERIALS_PATH）"))?;

    let report = MaterialImporter
        .import_file(&materials_path)
        .with_context(|| format!("导入物料表失败: {}", materials_path.display()))?;
    tracing::info!(
        imported = report.imported,
        skipped = report.skipped_rows.len(),
        malformed_weight = report.malformed_weight.len(),
        "materials loaded"
    );

    let snapshot = SnapshotImporter::new(offset)
        .import_file(&snapshot_path)
        .with_context(|| format!("导入生产快照失败: {}", snapshot_path.display()))?;

    let now = match now_arg {
        Some(raw) => parse_plant_timestamp(&raw, &offset)
            .ok_or_else(|| anyhow!("无法解析时间参数: {}", raw))?,
        None => Utc::now().with_timezone(&offset).naive_local(),
    };

    let api = DashboardApi::new(report.catalog, config);
    let dashboard = api.build_dashboard(&snapshot.records, &snapshot.orders, now);

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
