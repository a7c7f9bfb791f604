// ==========================================
// 完整业务流程 E2E 测试
// ==========================================
// 职责: 按真实生产节奏串联 创建→开工→生产→入账→完工/取消 全流程
// ==========================================


#[cfg(test)]
mod full_business_flow_e2e_test {
    use cable_order_core::domain::types::OrderStatus;
    use cable_order_core::engine::CoreError;

    use crate::test_helpers::{
        dt, sample_order_draft, sample_spec_draft, sample_spool_draft, setup_env,
    };

    #[test]
    fn test_full_production_flow_to_completion() {
        let env = setup_env();

        // 1. 创建订单: 订货 100kg
        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        // 2. 开工
        env.api.start_order(&order.order_id).unwrap();

        // 3. 早班生产 60kg (09:00–10:00), 下线一盘
        env.api
            .record_production(
                &order.order_id,
                "E001",
                "M001",
                60.0,
                dt(9, 0),
                dt(10, 0),
                Some("早班第一卷".to_string()),
            )
            .unwrap();
        let spool1 = env
            .api
            .add_spool(&order.order_id, sample_spool_draft())
            .unwrap();
        assert_eq!(spool1.spool_number, 1);

        // 4. 续产 50kg (10:00–11:00), 再下线一盘
        env.api
            .record_production(&order.order_id, "E002", "M001", 50.0, dt(10, 0), dt(11, 0), None)
            .unwrap();
        let spool2 = env
            .api
            .add_spool(&order.order_id, sample_spool_draft())
            .unwrap();
        assert_eq!(spool2.spool_number, 2);

        // 5. 进度检查: 110/100
        let progress = env.api.order_progress(&order.order_id).unwrap();
        assert_eq!(progress.status, OrderStatus::InProgress);
        assert_eq!(progress.produced_kg, 110.0);
        assert_eq!(progress.completion_ratio, 1.1);
        assert_eq!(progress.spool_count, 2);
        assert_eq!(progress.spool_total_weight_kg, 110.0);
        assert_eq!(progress.log_count, 2);

        // 6. 完工: 110 ≥ 100
        env.api.complete_order(&order.order_id).unwrap();
        let order_after = env.api.get_order(&order.order_id).unwrap();
        assert_eq!(order_after.status, OrderStatus::Completed);

        // 7. 完工后一切写入被拒绝
        assert!(matches!(
            env.api.add_spool(&order.order_id, sample_spool_draft()),
            Err(CoreError::OrderClosed { .. })
        ));
        assert!(matches!(
            env.api.record_production(
                &order.order_id,
                "E001",
                "M002",
                10.0,
                dt(12, 0),
                dt(13, 0),
                None
            ),
            Err(CoreError::OrderClosed { .. })
        ));

        // 8. 历史数据完整保留
        assert_eq!(env.api.list_spools(&order.order_id).unwrap().len(), 2);
        assert_eq!(env.api.list_logs(&order.order_id).unwrap().len(), 2);
    }

    #[test]
    fn test_incomplete_then_resume_then_complete() {
        let env = setup_env();

        let order = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        // 只记录了第一条 60kg
        env.api
            .record_production(&order.order_id, "E001", "M001", 60.0, dt(9, 0), dt(10, 0), None)
            .unwrap();

        // 完工被拒绝, 订单保持 IN_PROGRESS
        assert!(matches!(
            env.api.complete_order(&order.order_id),
            Err(CoreError::IncompleteProduction { .. })
        ));
        assert_eq!(
            env.api.get_order(&order.order_id).unwrap().status,
            OrderStatus::InProgress
        );

        // 补产后完工门槛重新计算
        env.api
            .record_production(&order.order_id, "E001", "M001", 50.0, dt(10, 0), dt(11, 0), None)
            .unwrap();
        env.api.complete_order(&order.order_id).unwrap();
        assert_eq!(
            env.api.get_order(&order.order_id).unwrap().status,
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_cancel_flow_preserves_history() {
        let env = setup_env();

        let order = env
            .api
            .create_order(sample_order_draft(200.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order.order_id).unwrap();

        env.api
            .record_production(&order.order_id, "E003", "M003", 40.0, dt(9, 0), dt(10, 0), None)
            .unwrap();
        env.api
            .add_spool(&order.order_id, sample_spool_draft())
            .unwrap();

        // 客户取消
        env.api.cancel_order(&order.order_id).unwrap();
        assert_eq!(
            env.api.get_order(&order.order_id).unwrap().status,
            OrderStatus::Cancelled
        );

        // 取消后写入被拒绝, 但历史保留
        assert!(matches!(
            env.api.record_production(
                &order.order_id,
                "E003",
                "M003",
                10.0,
                dt(10, 0),
                dt(11, 0),
                None
            ),
            Err(CoreError::OrderClosed { .. })
        ));
        assert_eq!(env.api.list_logs(&order.order_id).unwrap().len(), 1);
        assert_eq!(env.api.list_spools(&order.order_id).unwrap().len(), 1);

        // 取消后不可再完工
        assert!(matches!(
            env.api.complete_order(&order.order_id),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_list_orders_by_status() {
        let env = setup_env();

        let order_a = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        let order_b = env
            .api
            .create_order(sample_order_draft(100.0), sample_spec_draft())
            .unwrap();
        env.api.start_order(&order_b.order_id).unwrap();

        let pending = env.api.list_orders(Some(OrderStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, order_a.order_id);

        let in_progress = env.api.list_orders(Some(OrderStatus::InProgress)).unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].order_id, order_b.order_id);

        let all = env.api.list_orders(None).unwrap();
        assert_eq!(all.len(), 2);
    }
}
