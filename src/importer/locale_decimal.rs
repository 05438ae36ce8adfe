// ==========================================
// 班次吨位引擎 - 本地化小数解析
// ==========================================
// 源数据使用逗号作小数点（例如 "0,035"）
// 红线: 字符串形式的数值只在此处解析，不进入领域层
// ==========================================

/// 解析本地化小数
///
/// - 逗号视为小数点: "0,035" → 0.035
/// - 同时出现 '.' 与 ',' 时，'.' 视为千分位: "1.234,5" → 1234.5
/// - 空字符串、非有限值返回 None
pub fn parse_locale_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
