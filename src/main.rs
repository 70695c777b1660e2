//! Demo driver: seeds a handful of transfers against the simulated
//! providers and walks them through the lifecycle. The HTTP surface
//! lives outside this crate; this binary exists to exercise the core.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use remitflow::transfer::query::ListQuery;
use remitflow::{
    AppConfig, AuditRecorder, Channel, NewTransfer, ProviderGateway, Recipient, RecoverySweeper,
    TransferService, TransferStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env);
    let _guard = remitflow::logging::init_logging(&config);

    info!(env = %env, "Starting remitflow demo");

    let store = Arc::new(TransferStore::new());
    let audit = Arc::new(AuditRecorder::new(config.audit.max_entries));
    let gateway = Arc::new(ProviderGateway::simulated(&config.provider));
    let service = Arc::new(TransferService::new(
        store.clone(),
        audit.clone(),
        gateway,
        config.transfer.clone(),
    ));

    if config.recovery.enabled {
        let sweeper = RecoverySweeper::new(store.clone(), audit.clone(), &config.recovery);
        tokio::spawn(sweeper.run());
    }

    let seeds = [
        (12_500u64, Channel::Wave, "+221771234567", "Awa Diop"),
        (50_000, Channel::OrangeMoney, "+221781234567", "Moussa Ba"),
        (7_500, Channel::FreeMoney, "+221761234567", "Fatou Sall"),
        (150_000, Channel::MoovMoney, "+221701234567", "Ibrahima Ndiaye"),
        (3_000, Channel::Wave, "+221771234568", "Aminata Sow"),
    ];

    let mut created = Vec::new();
    for (amount, channel, phone, name) in seeds {
        let transfer = service
            .create(
                NewTransfer::new(amount, channel, Recipient::new(phone, name))
                    .with_metadata(json!({"source": "seed"})),
            )
            .await?;
        info!(
            reference = %transfer.reference,
            amount = transfer.amount,
            fees = transfer.fees,
            total = transfer.total,
            channel = %transfer.channel,
            "Seeded transfer"
        );
        created.push(transfer);
    }

    // Cancel the last one, process the rest against the simulators
    let canceled = service.cancel(created.pop().unwrap().id).await?;
    info!(reference = %canceled.reference, "Canceled");

    for transfer in &created {
        match service.process(transfer.id).await {
            Ok(done) => info!(
                reference = %done.reference,
                status = %done.status,
                provider_ref = done.provider_ref.as_deref().unwrap_or("-"),
                error_code = done.error_code.as_deref().unwrap_or("-"),
                "Processed"
            ),
            Err(e) => warn!(reference = %transfer.reference, error = %e, "Process failed"),
        }
    }

    let page = service.list(&ListQuery::default()).await?;
    info!(count = page.items.len(), "Final listing");
    for transfer in &page.items {
        info!("{transfer}");
    }

    for event in service.recent_activity(20) {
        info!(
            action = %event.entry.action,
            reference = event
                .transfer
                .as_ref()
                .map(|t| t.reference.as_str())
                .unwrap_or("N/A"),
            "Audit"
        );
    }

    Ok(())
}
