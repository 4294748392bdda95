mod actors;
mod app_system;
mod clients;
mod config;
mod domain;
mod error;
mod messages;
mod notify;
mod pipeline;
mod policy;
mod store;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use crate::app_system::{setup_tracing, PipelineSystem};
use crate::config::Config;
use crate::domain::OrderDraft;
use crate::notify::LogNotifier;
use crate::store::MemoryOrderStore;

/// Orders as they arrive from the intake channel.
const DEMO_INTAKE: &str = r#"[
    {
        "customer_name": "Marina",
        "delivery_address": "Rua Augusta, 1500",
        "payment_method": "pix",
        "line_items": [
            { "name": "X-Salada", "quantity": 2, "unit_price": "10.00" },
            { "name": "Batata frita", "quantity": 1, "unit_price": "5.00",
              "modifiers": [ { "name": "Cheddar", "quantity": 1, "unit_price": "3.50" } ] }
        ]
    },
    {
        "payment_method": "cash",
        "line_items": [ { "name": "Açaí 500ml", "quantity": 1, "unit_price": "20.00" } ]
    },
    {
        "customer_name": "Paulo",
        "payment_method": "card",
        "line_items": [ { "name": "Pizza calabresa", "quantity": 1, "unit_price": "30.00" } ]
    }
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::from_env()?;
    let symbol = config.display.currency_symbol.clone();
    info!(currency = %symbol, "Starting order board");

    let store = Arc::new(MemoryOrderStore::new());
    let system = PipelineSystem::start(&config, store.clone(), Arc::new(LogNotifier))?;
    let client = system.pipeline_client.clone();

    let drafts: Vec<OrderDraft> = serde_json::from_str(DEMO_INTAKE)?;

    let span = tracing::info_span!("evening_shift");
    async {
        let mut ids = Vec::new();
        for draft in drafts {
            ids.push(client.create_order(draft).await?);
        }
        let [burgers, acai, pizza] = ids.as_slice() else {
            return Err(format!("expected 3 demo orders, intake produced {}", ids.len()).into());
        };

        client.accept_order(burgers.clone()).await?;
        client.advance_order(burgers.clone()).await?;
        client.accept_order(pizza.clone()).await?;
        client.reject_order(acai.clone()).await?;

        // Not offered for an order still being prepared; refused and reported.
        if let Err(e) = client.finalize_order(pizza.clone()).await {
            warn!(error = %e, "Operator action refused");
        }

        client.finalize_order(burgers.clone()).await?;
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    let board = client.board().await?;
    for column in &board.columns {
        info!(
            stage = %column.stage,
            count = column.aggregate.count,
            total = %column.aggregate.total_value.display_with(&symbol),
            "{}",
            column.title
        );
        for order in &column.orders {
            info!(
                code = %order.display_code(),
                customer = %order.customer_label(),
                placed_at = %order.created_at_label(),
                total = %order.total_value().display_with(&symbol),
                payment = %order.payment_method(),
                "  card"
            );
        }
    }
    info!(board = %serde_json::to_string(&board)?, "Board snapshot");

    system.flush().await?;
    for record in store.history().await {
        if let Some(outcome) = record.outcome {
            info!(
                code = %record.order.display_code(),
                durable_id = %record.durable_id,
                outcome = %outcome,
                "Archived"
            );
        }
    }

    if let Err(e) = system.shutdown().await {
        error!(error = %e, "Shutdown failed");
        return Err(e.into());
    }

    info!("Order board stopped");
    Ok(())
}
