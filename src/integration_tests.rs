#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use crate::app_system::PipelineSystem;
    use crate::config::{Config, ConfigError};
    use crate::domain::{LineItem, Money, OrderDraft, OrderId, Outcome, PaymentMethod, Stage};
    use crate::error::PipelineError;
    use crate::notify::{ChannelNotifier, NotificationLevel};
    use crate::pipeline::clock::ManualClock;
    use crate::pipeline::{aggregate_for, OrderPipeline, StageAggregate};
    use crate::store::MemoryOrderStore;

    fn sequential_pipeline(clock: ManualClock) -> OrderPipeline {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || OrderId::from(format!("order_{}", counter.fetch_add(1, Ordering::SeqCst)));
        OrderPipeline::new(clock, next_id)
    }

    fn draft_worth(cents: i64) -> OrderDraft {
        OrderDraft::new(PaymentMethod::Card).item(LineItem::new("Prato do dia", 1, Money::from_cents(cents)))
    }

    #[tokio::test]
    async fn test_aggregates_after_mixed_activity() -> Result<(), Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryOrderStore::new());
        let (notifier, _notifications) = ChannelNotifier::new();
        let system = PipelineSystem::start_with_pipeline(
            &Config::default(),
            sequential_pipeline(ManualClock::at(0)),
            store.clone(),
            Arc::new(notifier),
        )?;
        let client = system.pipeline_client.clone();

        let ten = client.create_order(draft_worth(1000)).await?;
        let twenty = client.create_order(draft_worth(2000)).await?;
        let thirty = client.create_order(draft_worth(3000)).await?;
        client.accept_order(ten.clone()).await?;
        client.accept_order(twenty.clone()).await?;

        let board = client.board().await?;
        assert_eq!(
            board.aggregate(Stage::UnderReview),
            StageAggregate { count: 1, total_value: Money::from_cents(3000) }
        );
        assert_eq!(
            board.aggregate(Stage::Preparing),
            StageAggregate { count: 2, total_value: Money::from_cents(3000) }
        );
        assert_eq!(board.aggregate(Stage::OutForDelivery).count, 0);

        // Aggregates agree with the raw partitions at every step.
        let partitions = client.partition_by_stage().await?;
        for stage in Stage::ALL {
            assert_eq!(aggregate_for(partitions.get(stage)), board.aggregate(stage));
        }
        assert_eq!(partitions.under_review[0].id(), &thirty);

        system.flush().await?;
        assert!(store.get(&ten).await.is_some());
        assert_eq!(store.get(&twenty).await.map(|r| r.stage), Some(Stage::Preparing));

        system.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_full_shift_reaches_the_archive() -> Result<(), Box<dyn std::error::Error>> {
        let clock = ManualClock::at(10_000);
        let store = Arc::new(MemoryOrderStore::new());
        let (notifier, mut notifications) = ChannelNotifier::new();
        let system = PipelineSystem::start_with_pipeline(
            &Config::default(),
            sequential_pipeline(clock.clone()),
            store.clone(),
            Arc::new(notifier),
        )?;
        let client = system.pipeline_client.clone();

        let delivered = client.create_order(draft_worth(2500)).await?;
        let rejected = client.create_order(draft_worth(1800)).await?;

        client.accept_order(delivered.clone()).await?;
        clock.advance(5_000);
        client.advance_order(delivered.clone()).await?;
        client.reject_order(rejected.clone()).await?;
        client.finalize_order(delivered.clone()).await?;

        // Removal is final.
        assert!(matches!(
            client.advance_order(delivered.clone()).await,
            Err(PipelineError::InvalidTransition { stage: None, .. })
        ));
        assert!(client.reject_order(rejected.clone()).await.unwrap_err().is_not_found());
        let partitions = client.partition_by_stage().await?;
        assert!(!partitions.contains(&delivered) && !partitions.contains(&rejected));

        system.flush().await?;
        let history = store.history().await;
        let outcomes: Vec<(OrderId, Option<Outcome>)> =
            history.iter().map(|r| (r.order.id().clone(), r.outcome)).collect();
        assert_eq!(
            outcomes,
            vec![
                (delivered.clone(), Some(Outcome::Delivered)),
                (rejected.clone(), Some(Outcome::Rejected)),
            ]
        );
        assert_eq!(history[0].last_transition_at, Some(15_000));

        let mut failures = 0;
        while let Ok(notification) = notifications.try_recv() {
            if notification.level == NotificationLevel::Failure {
                failures += 1;
            }
        }
        assert_eq!(failures, 2);

        system.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_client() -> Result<(), Box<dyn std::error::Error>> {
        let (notifier, _notifications) = ChannelNotifier::new();
        let system = PipelineSystem::start(
            &Config::default(),
            Arc::new(MemoryOrderStore::new()),
            Arc::new(notifier),
        )?;
        let client = system.pipeline_client.clone();
        client.create_order(draft_worth(1000)).await?;

        system.shutdown().await?;

        let result = client.board().await;
        assert!(matches!(result, Err(PipelineError::ActorCommunicationError(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_config_is_refused_before_start() {
        let mut config = Config::default();
        config.pipeline.channel_buffer = 0;
        let (notifier, _notifications) = ChannelNotifier::new();

        let result = PipelineSystem::start(&config, Arc::new(MemoryOrderStore::new()), Arc::new(notifier));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
