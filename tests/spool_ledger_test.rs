// ==========================================
// 线盘台账测试
// ==========================================
// 职责: 验证盘号连续分配、状态约束与重量/长度汇总
// ==========================================


#[cfg(test)]
mod spool_ledger_test {
    use cable_order_core::domain::types::{OrderStatus, SpoolType};
    use cable_order_core::engine::CoreError;

    use crate::test_helpers::{
        dt, sample_order_draft, sample_spec_draft, sample_spool_draft, setup_env,
    };

    #[test]
    fn test_add_spool_on_pending_order_rejected() {
        let env = setup_env();
        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();

        let result = env.api.add_spool(&order.order_id, sample_spool_draft());
        assert!(matches!(
            result,
            Err(CoreError::OrderNotStarted {
                status: OrderStatus::Pending,
                ..
            })
        ));

        // 被拒绝的操作不产生任何写入
        assert_eq!(env.api.list_spools(&order.order_id).unwrap().len(), 0);
    }

    #[test]
    fn test_add_spool_on_closed_order_rejected() {
        let env = setup_env();

        // 已取消订单
        let order_a = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order_a.order_id).unwrap();
        env.api.cancel_order(&order_a.order_id).unwrap();

        let result = env.api.add_spool(&order_a.order_id, sample_spool_draft());
        assert!(matches!(
            result,
            Err(CoreError::OrderClosed {
                status: OrderStatus::Cancelled,
                ..
            })
        ));

        // 已完工订单
        let order_b = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order_b.order_id).unwrap();
        env.api
            .record_production(&order_b.order_id, "E001", "M001", 120.0, dt(9, 0), dt(11, 0), None)
            .unwrap();
        env.api.complete_order(&order_b.order_id).unwrap();

        let result = env.api.add_spool(&order_b.order_id, sample_spool_draft());
        assert!(matches!(
            result,
            Err(CoreError::OrderClosed {
                status: OrderStatus::Completed,
                ..
            })
        ));
    }

    #[test]
    fn test_spool_numbers_contiguous_from_one() {
        let env = setup_env();
        let order = env
            .api
            .create_order(sample_order_draft(500.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        for _ in 0..5 {
            env.api
                .add_spool(&order.order_id, sample_spool_draft())
                .unwrap();
        }

        let spools = env.api.list_spools(&order.order_id).unwrap();
        assert_eq!(spools.len(), 5);

        // 盘号 1..=5 连续无空洞、无重复
        let numbers: Vec<i32> = spools.iter().map(|s| s.spool_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_add_spool_rejects_non_positive_attributes() {
        let env = setup_env();
        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        let mut draft = sample_spool_draft();
        draft.naked_weight_kg = 0.0;
        assert!(matches!(
            env.api.add_spool(&order.order_id, draft),
            Err(CoreError::InvalidAttributes(_))
        ));

        let mut draft = sample_spool_draft();
        draft.length_m = -10.0;
        assert!(matches!(
            env.api.add_spool(&order.order_id, draft),
            Err(CoreError::InvalidAttributes(_))
        ));

        let mut draft = sample_spool_draft();
        draft.diameter_mm = f64::INFINITY;
        assert!(matches!(
            env.api.add_spool(&order.order_id, draft),
            Err(CoreError::InvalidAttributes(_))
        ));

        // 全部被拒绝, 台账应为空
        assert_eq!(env.api.list_spools(&order.order_id).unwrap().len(), 0);
    }

    #[test]
    fn test_weight_and_length_aggregates() {
        let env = setup_env();
        let order = env
            .api
            .create_order(sample_order_draft(500.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        // 空台账汇总为 0
        assert_eq!(env.ledger.total_weight_kg(&order.order_id).unwrap(), 0.0);
        assert_eq!(env.ledger.total_length_m(&order.order_id).unwrap(), 0.0);

        let mut draft = sample_spool_draft();
        draft.naked_weight_kg = 40.0;
        draft.length_m = 800.0;
        draft.spool_type = SpoolType::Steel;
        env.api.add_spool(&order.order_id, draft).unwrap();

        let mut draft = sample_spool_draft();
        draft.naked_weight_kg = 60.0;
        draft.length_m = 1_200.0;
        env.api.add_spool(&order.order_id, draft).unwrap();

        assert_eq!(env.ledger.total_weight_kg(&order.order_id).unwrap(), 100.0);
        assert_eq!(env.ledger.total_length_m(&order.order_id).unwrap(), 2_000.0);
        assert_eq!(env.ledger.spool_count(&order.order_id).unwrap(), 2);
    }

    #[test]
    fn test_spool_numbering_is_per_order() {
        let env = setup_env();

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

        let spool_a = env
            .api
            .add_spool(&order_a.order_id, sample_spool_draft())
            .unwrap();
        let spool_b = env
            .api
            .add_spool(&order_b.order_id, sample_spool_draft())
            .unwrap();

        // 两个订单各自从 1 开始编号
        assert_eq!(spool_a.spool_number, 1);
        assert_eq!(spool_b.spool_number, 1);
    }
}
