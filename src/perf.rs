// ==========================================
// 线缆生产订单管理系统 - 性能观测
// ==========================================
// 职责: 订单操作耗时统计 (target: "perf")
// 开关: CABLE_ORDER_CORE_SLOW_OP_MS 配置慢操作阈值（毫秒）
// ==========================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

static SLOW_OP_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static THRESHOLD_INIT: OnceLock<()> = OnceLock::new();

fn slow_op_threshold_ms() -> u64 {
    THRESHOLD_INIT.get_or_init(|| {
        let ms = std::env::var("CABLE_ORDER_CORE_SLOW_OP_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        SLOW_OP_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    });
    SLOW_OP_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 性能统计 Guard：记录操作耗时，超过阈值时告警
///
/// 使用方式：
/// ```ignore
/// let _perf = cable_order_core::perf::PerfGuard::new("record_production");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let threshold = slow_op_threshold_ms();

        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(target: "perf", op = self.op, elapsed_ms, "slow op");
        } else {
            tracing::info!(target: "perf", op = self.op, elapsed_ms, "done");
        }
    }
}
