//! crosscall-local: run the built-in flows against in-process services
//!
//! Registers simulated greeting, counter and guestbook services on a local
//! substrate under the configured service accounts, then submits each flow
//! and prints its aggregated result.
//!
//! ## Configuration
//! - `crosscall.yaml`, `--config <path>` or CROSSCALL_CONFIG
//! - CROSSCALL__ORCHESTRATOR__ATTACHED_BUDGET etc. for overrides
//! - CROSSCALL_LOG: tracing filter (default "info")

use std::sync::Arc;

use tracing::{error, info};

use crosscall::config::Config;
use crosscall::engine::{Orchestrator, PlanHandle};
use crosscall::flows::Flows;
use crosscall::services::{CounterService, GreetingService, GuestbookService, PostedMessage};
use crosscall::substrate::local::LocalSubstrate;

fn seed_messages() -> Vec<PostedMessage> {
    vec![
        PostedMessage {
            premium: false,
            sender: "alice.testnet".to_string(),
            text: "Hello from the guestbook".to_string(),
        },
        PostedMessage {
            premium: true,
            sender: "bob.testnet".to_string(),
            text: "Premium greetings".to_string(),
        },
    ]
}

fn report(flow: &str, handle: &PlanHandle) {
    for entry in handle.diagnostics().entries() {
        println!("  [{flow}] {}", entry.message);
    }
    match handle.output().payload() {
        Some(bytes) => println!("{flow} -> {}", String::from_utf8_lossy(bytes)),
        None => println!("{flow} -> {:?}", handle.output()),
    }
    info!(
        flow,
        orchestration_id = %handle.id(),
        remaining = %handle.remaining_budget(),
        "Flow completed"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    crosscall::utils::bootstrap::init_tracing();

    let config_path = crosscall::utils::bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(self_id = %config.orchestrator.self_id, "Starting crosscall-local");

    let substrate = Arc::new(LocalSubstrate::new());
    let accounts = &config.services;
    substrate
        .register(accounts.hello.clone(), Arc::new(GreetingService::default()))
        .await;
    substrate
        .register(accounts.counter.clone(), Arc::new(CounterService::default()))
        .await;
    substrate
        .register(
            accounts.guestbook.clone(),
            Arc::new(GuestbookService::new(seed_messages())),
        )
        .await;

    let orchestrator =
        Flows::register(Orchestrator::builder(config.orchestrator.clone(), substrate)).build();
    let flows = Flows::new(config.services.clone(), &config.orchestrator);

    report("batch_actions", &flows.run_batch_actions(&orchestrator).await?);
    report(
        "multiple_contracts",
        &flows.run_multiple_contracts(&orchestrator).await?,
    );
    report(
        "similar_contracts",
        &flows.run_similar_contracts(&orchestrator).await?,
    );

    Ok(())
}
