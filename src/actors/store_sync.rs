use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use crate::clients::StoreSyncClient;
use crate::messages::SyncRequest;
use crate::notify::{Notification, Notifier};
use crate::store::{OrderStore, StoreEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before retry `n` is `n × backoff`.
    pub backoff: Duration,
}

/// Replays committed pipeline changes against the order store, one at a
/// time and in the order the pipeline produced them.
///
/// Local pipeline state is already committed when an event arrives here. A
/// store failure is retried per [`RetryPolicy`]; once the attempts run out
/// the operator is notified and the worker moves on. Nothing is rolled back.
pub struct StoreSyncService {
    receiver: mpsc::UnboundedReceiver<SyncRequest>,
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
}

impl StoreSyncService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        policy: RetryPolicy,
    ) -> (Self, StoreSyncClient) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let service = Self {
            receiver,
            store,
            notifier,
            policy,
        };
        let client = StoreSyncClient::new(sender);
        (service, client)
    }

    #[instrument(name = "store_sync", skip(self))]
    pub async fn run(mut self) {
        info!("StoreSyncService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SyncRequest::Record(event) => {
                    self.handle_record(event).await;
                }
                SyncRequest::Flush { respond_to } => {
                    let _ = respond_to.send(());
                }
                SyncRequest::Shutdown => {
                    info!("StoreSyncService shutting down");
                    break;
                }
            }
        }

        info!("StoreSyncService stopped");
    }

    #[instrument(fields(order_id = %event.order_id(), event = event.kind()), skip(self, event))]
    async fn handle_record(&self, event: StoreEvent) {
        let mut attempt = 1;

        loop {
            match event.apply_to(self.store.as_ref()).await {
                Ok(Some(durable_id)) => {
                    info!(durable_id = %durable_id, attempt, "Order persisted");
                    return;
                }
                Ok(None) => {
                    debug!(attempt, "Store event persisted");
                    return;
                }
                Err(e) if attempt < self.policy.max_attempts => {
                    warn!(error = %e, attempt, "Store sync failed, retrying");
                    tokio::time::sleep(self.policy.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(error = %e, attempts = attempt, "Store sync abandoned");
                    self.notifier.notify(Notification::failure(format!(
                        "Could not save {}: {}",
                        event.describe(),
                        e
                    )));
                    return;
                }
            }
        }
    }
}
