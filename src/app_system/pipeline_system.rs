use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use crate::actors::{PipelineService, StoreSyncService};
use crate::clients::{PipelineClient, StoreSyncClient};
use crate::config::{Config, ConfigError};
use crate::error::PipelineError;
use crate::notify::Notifier;
use crate::pipeline::OrderPipeline;
use crate::store::OrderStore;

/// Starts, wires and stops the board's services.
///
/// **Startup Order:** the store sync worker first, then the pipeline service
/// that feeds it. **Shutdown Order:** the reverse, so every event the
/// pipeline queued is handled before the worker stops.
pub struct PipelineSystem {
    pub pipeline_client: PipelineClient,
    sync_client: StoreSyncClient,
    pipeline_handle: JoinHandle<()>,
    sync_handle: JoinHandle<()>,
}

impl PipelineSystem {
    pub fn start(
        config: &Config,
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        Self::start_with_pipeline(config, OrderPipeline::default(), store, notifier)
    }

    /// Refuses a config that fails [`Config::validate`] before any task is
    /// spawned.
    #[instrument(name = "pipeline_system", skip_all)]
    pub fn start_with_pipeline(
        config: &Config,
        pipeline: OrderPipeline,
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            channel_buffer = config.pipeline.channel_buffer,
            max_attempts = config.sync.max_attempts,
            "Starting pipeline system"
        );

        let (sync_service, sync_client) =
            StoreSyncService::new(store, notifier.clone(), config.sync.retry_policy());
        let sync_handle = tokio::spawn(sync_service.run());

        let (pipeline_service, pipeline_client) = PipelineService::new(
            config.pipeline.channel_buffer,
            pipeline,
            notifier,
            sync_client.clone(),
        );
        let pipeline_handle = tokio::spawn(pipeline_service.run());

        info!("Pipeline system started successfully");

        Ok(Self {
            pipeline_client,
            sync_client,
            pipeline_handle,
            sync_handle,
        })
    }

    /// Waits until every change made so far has reached the store (or been
    /// given up on).
    pub async fn flush(&self) -> Result<(), PipelineError> {
        self.sync_client.flush().await
    }

    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), PipelineError> {
        info!("Shutting down pipeline system");

        let _ = self.pipeline_client.shutdown().await;
        if let Err(e) = self.pipeline_handle.await {
            error!(error = ?e, "Pipeline service shutdown error");
        }

        let _ = self.sync_client.shutdown().await;
        if let Err(e) = self.sync_handle.await {
            error!(error = ?e, "Store sync shutdown error");
            return Err(PipelineError::ActorCommunicationError(e.to_string()));
        }

        info!("Pipeline system shutdown complete");
        Ok(())
    }
}
