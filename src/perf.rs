use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Once;
use std::time::Instant;

static PERF_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_OP_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static INIT: Once = Once::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static RECORDS_SCANNED: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 读取性能统计开关（进程内只读取一次）
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭（可通过环境变量开启）
/// - `SHIFT_TONNAGE_PERF=1` 强制开启
/// - `SHIFT_TONNAGE_SLOW_OP_MS=20` 配置慢操作阈值（毫秒）
fn ensure_initialized() {
    INIT.call_once(|| {
        let enabled = match std::env::var("SHIFT_TONNAGE_PERF") {
            Ok(v) => is_true(&v),
            Err(_) => cfg!(debug_assertions),
        };
        PERF_ENABLED.store(enabled, Ordering::Relaxed);

        let slow_ms = std::env::var("SHIFT_TONNAGE_SLOW_OP_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 20 } else { 100 });
        SLOW_OP_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);
    });
}

/// 记录本线程扫描的生产记录数（仅在 PerfGuard 作用域内计数）
pub fn record_scanned(count: usize) {
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if !active {
        return;
    }
    RECORDS_SCANNED.with(|c| c.set(c.get().saturating_add(count as u64)));
}

/// 性能统计 Guard：记录 elapsed_ms + 扫描记录数
///
/// 使用方式：
/// ```ignore
/// let _perf = shift_tonnage::perf::PerfGuard::new("aggregate_tonnage_by_shift");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    scanned_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        ensure_initialized();
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let scanned_start = RECORDS_SCANNED.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            scanned_start,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));

        if !PERF_ENABLED.load(Ordering::Relaxed) {
            return;
        }

        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let scanned_end = RECORDS_SCANNED.with(|c| c.get());
        let records_scanned = scanned_end.saturating_sub(self.scanned_start);

        let threshold = SLOW_OP_THRESHOLD_MS.load(Ordering::Relaxed);
        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                records_scanned,
                "slow op"
            );
        } else {
            tracing::debug!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                records_scanned,
                "done"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_scanned_outside_guard_is_ignored() {
        let before = RECORDS_SCANNED.with(|c| c.get());
        record_scanned(10);
        assert_eq!(RECORDS_SCANNED.with(|c| c.get()), before);

        {
            let _perf = PerfGuard::new("test_op");
            record_scanned(3);
            assert_eq!(RECORDS_SCANNED.with(|c| c.get()), before + 3);
        }
        assert_eq!(PERF_DEPTH.with(|d| d.get()), 0);
    }
}
