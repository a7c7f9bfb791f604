// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证订单级一致性域的串行化与有界等待
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use std::collections::HashSet;
    use std::thread;

    use cable_order_core::engine::CoreError;

    use crate::test_helpers::{
        sample_order_draft, sample_spec_draft, sample_spool_draft, setup_env,
        setup_env_with_lock_wait,
    };

    // ==========================================
    // 测试1: 有界等待与 Busy
    // ==========================================

    #[test]
    fn test_busy_when_order_lock_held() {
        let env = setup_env_with_lock_wait(50);

        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        // 模拟一个长时间占用该订单一致性域的操作
        let _guard = env.locks.acquire(&order.order_id).unwrap();

        let result = env.api.add_spool(&order.order_id, sample_spool_draft());
        match result {
            Err(CoreError::Busy { order_id, .. }) => assert_eq!(order_id, order.order_id),
            other => panic!("expected Busy, got {:?}", other.map(|_| ())),
        }
    }

    // ==========================================
    // 测试2: 不同订单互不阻塞
    // ==========================================

    #[test]
    fn test_independent_orders_proceed_while_one_is_locked() {
        let env = setup_env_with_lock_wait(50);

        let order_a = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        let order_b = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order_a.order_id).unwrap();
        env.api.start_order(&order_b.order_id).unwrap();

        // 占用订单A的一致性域
        let _guard = env.locks.acquire(&order_a.order_id).unwrap();

        // 订单B不受影响
        let spool = env
            .api
            .add_spool(&order_b.order_id, sample_spool_draft())
            .unwrap();
        assert_eq!(spool.spool_number, 1);
    }

    // ==========================================
    // 测试3: 并发入账盘号仍连续
    // ==========================================

    #[test]
    fn test_racing_spool_additions_keep_numbers_contiguous() {
        let env = setup_env();

        let order = env
            .api
            .create_order(sample_order_draft(5_000.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();
        let order_id = order.order_id.clone();

        let threads = 4;
        let spools_per_thread = 5;

        let mut handles = Vec::new();
        for _ in 0..threads {
            let api = env.api.clone();
            let order_id = order_id.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..spools_per_thread {
                    api.add_spool(&order_id, sample_spool_draft()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let spools = env.api.list_spools(&order_id).unwrap();
        assert_eq!(spools.len(), threads * spools_per_thread);

        // 盘号 1..=N 连续, 无空洞无重复
        let numbers: HashSet<i32> = spools.iter().map(|s| s.spool_number).collect();
        assert_eq!(numbers.len(), threads * spools_per_thread);
        for n in 1..=(threads * spools_per_thread) as i32 {
            assert!(numbers.contains(&n), "盘号 {} 缺失", n);
        }
    }

    // ==========================================
    // 测试4: 转换与追加竞争后状态一致
    // ==========================================

    #[test]
    fn test_append_after_cancel_is_rejected() {
        let env = setup_env();

        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();
        let order_id = order.order_id.clone();

        // 并发追加与取消
        let api = env.api.clone();
        let append_order_id = order_id.clone();
        let appender = thread::spawn(move || {
            let mut accepted = 0;
            for _ in 0..10 {
                if api.add_spool(&append_order_id, sample_spool_draft()).is_ok() {
                    accepted += 1;
                }
            }
            accepted
        });

        env.api.cancel_order(&order_id).unwrap();
        let accepted = appender.join().unwrap();

        // 取消落库后的任何追加都必须被拒绝:
        // 台账中的线盘数只能等于取消前被接受的数量
        let spools = env.api.list_spools(&order_id).unwrap();
        assert_eq!(spools.len(), accepted as usize);

        // 终态后追加必然失败
        let result = env.api.add_spool(&order_id, sample_spool_draft());
        assert!(matches!(result, Err(CoreError::OrderClosed { .. })));
    }
}
