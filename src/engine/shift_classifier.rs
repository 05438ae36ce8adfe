// ==========================================
// 班次吨位引擎 - 班次判定
// ==========================================
// 红线: 班次边界是工厂排班常量，不从任何配置派生
// ==========================================
// 早班: [05:32, 13:50)
// 中班: [13:50, 22:08)
// 夜班: [22:08, 24:00) ∪ [00:00, 05:32)
// 生产日: 05:32 起，至次日 05:31:59.999 止
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::domain::types::{ShiftName, ShiftSource};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

/// 早班开始（同时也是生产日切换点），自零点起的分钟数
pub const MORNING_START_MINUTE: u32 = 5 * 60 + 32;
/// 中班开始
pub const AFTERNOON_START_MINUTE: u32 = 13 * 60 + 50;
/// 夜班开始
pub const NIGHT_START_MINUTE: u32 = 22 * 60 + 8;

const MINUTES_PER_DAY: u32 = 24 * 60;

fn minute_of_day(ts: &NaiveDateTime) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// 判定时间戳所属班次（只看本地挂钟时间）
pub fn classify_shift(timestamp: NaiveDateTime) -> ShiftName {
    let minute = minute_of_day(&timestamp);
    if (MORNING_START_MINUTE..AFTERNOON_START_MINUTE).contains(&minute) {
        ShiftName::Morning
    } else if (AFTERNOON_START_MINUTE..NIGHT_START_MINUTE).contains(&minute) {
        ShiftName::Afternoon
    } else {
        ShiftName::Night
    }
}

/// 带时区的时间戳按其本地挂钟判定班次
pub fn classify_shift_at<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> ShiftName {
    classify_shift(timestamp.naive_local())
}

/// 时间戳所属生产日
///
/// 05:32 之前的时刻归属前一个日历日
pub fn production_day_of(timestamp: NaiveDateTime) -> NaiveDate {
    let date = timestamp.date();
    if minute_of_day(&timestamp) < MORNING_START_MINUTE {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

pub fn production_day_at<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    production_day_of(timestamp.naive_local())
}

pub fn is_same_production_day(t1: NaiveDateTime, t2: NaiveDateTime) -> bool {
    production_day_of(t1) == production_day_of(t2)
}

/// 班次在生产日内的挂钟窗口 [start, end)
///
/// 夜班结束于次日 05:32
pub fn shift_window(day: NaiveDate, shift: ShiftName) -> (NaiveDateTime, NaiveDateTime) {
    let (start_minute, end_minute) = match shift {
        ShiftName::Morning => (MORNING_START_MINUTE, AFTERNOON_START_MINUTE),
        ShiftName::Afternoon => (AFTERNOON_START_MINUTE, NIGHT_START_MINUTE),
        ShiftName::Night => (NIGHT_START_MINUTE, MINUTES_PER_DAY + MORNING_START_MINUTE),
    };
    let midnight = day.and_time(NaiveTime::default());
    (
        midnight + Duration::minutes(i64::from(start_minute)),
        midnight + Duration::minutes(i64::from(end_minute)),
    )
}

/// 班次窗口长度（分钟）
pub fn shift_window_minutes(shift: ShiftName) -> i64 {
    let minutes = match shift {
        ShiftName::Morning => AFTERNOON_START_MINUTE - MORNING_START_MINUTE,
        ShiftName::Afternoon => NIGHT_START_MINUTE - AFTERNOON_START_MINUTE,
        ShiftName::Night => MINUTES_PER_DAY - NIGHT_START_MINUTE + MORNING_START_MINUTE,
    };
    i64::from(minutes)
}

// ==========================================
// 记录班次解析（两分支决策）
// ==========================================

/// 记录的已解析班次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedShift {
    pub shift: ShiftName,
    pub source: ShiftSource,
}

/// 解析记录班次
///
/// - 分支 1: 记录自带班次字段 → 直接使用
/// - 分支 2: 历史记录缺少班次字段 → 由 recorded_at 推导
pub fn resolve_record_shift(record: &ProductionRecord) -> ResolvedShift {
    match record.shift {
        Some(shift) => ResolvedShift {
            shift,
            source: ShiftSource::Stored,
        },
        None => ResolvedShift {
            shift: classify_shift(record.recorded_at),
            source: ShiftSource::Derived,
        },
    }
}
