// ==========================================
// 线缆生产订单管理系统 - 订单锁管理器
// ==========================================
// 职责: 以 order_id 为粒度的互斥锁, 保护 check-then-act 复合操作
// 说明: 不同订单互不阻塞; 同一订单的变更操作串行化
// 约束: 等待有界, 超时返回 Busy 而不是死等
// ==========================================

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::engine::error::{CoreError, CoreResult};
use crate::repository::error::RepositoryError;

/// 默认锁等待超时（毫秒）, 与数据库 busy_timeout 对齐
pub const DEFAULT_ORDER_LOCK_WAIT_MS: u64 = 5_000;

struct LockState {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

/// 订单锁管理器
///
/// 内部为 `Mutex<HashSet<order_id>>` + `Condvar`:
/// 持有集合中的 order_id 表示该订单的一致性域正被某个操作占用。
#[derive(Clone)]
pub struct OrderLockManager {
    state: Arc<LockState>,
    wait_timeout: Duration,
}

impl OrderLockManager {
    /// 创建锁管理器
    ///
    /// # 参数
    /// - `wait_timeout`: 获取锁的最长等待时间, 超时返回 `Busy`
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            state: Arc::new(LockState {
                held: Mutex::new(HashSet::new()),
                released: Condvar::new(),
            }),
            wait_timeout,
        }
    }

    /// 使用默认等待超时创建锁管理器
    pub fn with_default_timeout() -> Self {
        Self::new(Duration::from_millis(DEFAULT_ORDER_LOCK_WAIT_MS))
    }

    /// 获取指定订单的排他锁
    ///
    /// # 返回
    /// - `Ok(guard)`: 获取成功, guard 析构时自动释放
    /// - `Err(CoreError::Busy)`: 有界等待超时
    pub fn acquire(&self, order_id: &str) -> CoreResult<OrderLockGuard> {
        let deadline = Instant::now() + self.wait_timeout;

        let mut held = self
            .state
            .held
            .lock()
            .map_err(|e| CoreError::Repository(RepositoryError::LockError(e.to_string())))?;

        loop {
            if !held.contains(order_id) {
                held.insert(order_id.to_string());
                tracing::trace!(order_id = %order_id, "订单锁已获取");
                return Ok(OrderLockGuard {
                    state: Arc::clone(&self.state),
                    order_id: order_id.to_string(),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    order_id = %order_id,
                    waited_ms = self.wait_timeout.as_millis() as u64,
                    "订单锁等待超时"
                );
                return Err(CoreError::Busy {
                    order_id: order_id.to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }

            let (guard, timeout_result) = self
                .state
                .released
                .wait_timeout(held, deadline - now)
                .map_err(|e| CoreError::Repository(RepositoryError::LockError(e.to_string())))?;
            held = guard;

            if timeout_result.timed_out() && held.contains(order_id) {
                return Err(CoreError::Busy {
                    order_id: order_id.to_string(),
                    waited_ms: self.wait_timeout.as_millis() as u64,
                });
            }
        }
    }
}

/// 订单锁 Guard, 析构时释放并唤醒等待者
pub struct OrderLockGuard {
    state: Arc<LockState>,
    order_id: String,
}

impl Drop for OrderLockGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.state.held.lock() {
            held.remove(&self.order_id);
        }
        self.state.released.notify_all();
        tracing::trace!(order_id = %self.order_id, "订单锁已释放");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_acquire_and_release() {
        let manager = OrderLockManager::new(Duration::from_millis(100));

        let guard = manager.acquire("O001").unwrap();
        drop(guard);

        // 释放后可重新获取
        let _guard = manager.acquire("O001").unwrap();
    }

    #[test]
    fn test_busy_on_timeout() {
        let manager = OrderLockManager::new(Duration::from_millis(50));
        let _guard = manager.acquire("O001").unwrap();

        // 同一订单: 第二次获取应超时返回 Busy
        let result = manager.acquire("O001");
        match result {
            Err(CoreError::Busy { order_id, .. }) => assert_eq!(order_id, "O001"),
            other => panic!("expected Busy, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_independent_orders_do_not_block() {
        let manager = OrderLockManager::new(Duration::from_millis(50));
        let _guard_a = manager.acquire("O001").unwrap();

        // 不同订单互不阻塞
        let _guard_b = manager.acquire("O002").unwrap();
    }

    #[test]
    fn test_waiter_wakes_after_release() {
        let manager = OrderLockManager::new(Duration::from_millis(2_000));
        let guard = manager.acquire("O001").unwrap();

        let manager2 = manager.clone();
        let handle = thread::spawn(move || manager2.acquire("O001").map(|_| ()));

        thread::sleep(Duration::from_millis(50));
        drop(guard);

        assert!(handle.join().unwrap().is_ok());
    }
}
