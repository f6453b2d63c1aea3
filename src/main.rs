//! # UBL Core Demo
//!
//! 1. Installs a [`DocumentSystem`] over the seeded UBL catalogue.
//! 2. Produces the documents of several business processes concurrently.
//! 3. Overrides a billing operation and executes gated action requests.

use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, Instrument};
use ubl_core::action::{ActionParams, ActionRequest, Condition, Executable, MemberTable};
use ubl_core::document::FieldValue;
use ubl_core::lifecycle::{setup_tracing, DocumentSystem, SystemConfig};
use ubl_core::schema::BusinessProcess;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::var("UBL_CONFIG") {
        Ok(json) => SystemConfig::from_json(&json).map_err(|e| e.to_string())?,
        Err(_) => SystemConfig::default(),
    };
    let system = DocumentSystem::install(DocumentSystem::with_ubl_catalogue(config))
        .map_err(|e| e.to_string())?;

    // Each process batch runs on its own blocking thread; they share one cache.
    let processes = [
        BusinessProcess::Ordering,
        BusinessProcess::Billing,
        BusinessProcess::Fulfilment,
        BusinessProcess::Ordering,
    ];
    let span = tracing::info_span!("process_batches");
    let produced = async {
        let mut handles = Vec::new();
        for process in processes {
            handles.push(tokio::task::spawn_blocking(move || {
                system
                    .factory
                    .produce_for_process(process, None)
                    .collect::<Result<Vec<_>, _>>()
            }));
        }
        let mut produced = Vec::new();
        for handle in handles {
            let batch = handle.await.map_err(|e| e.to_string())?;
            produced.extend(batch.map_err(|e| e.to_string())?);
        }
        Ok::<_, String>(produced)
    }
    .instrument(span)
    .await?;

    let stats = system.factory.cache().stats();
    info!(
        documents = produced.len(),
        hits = stats.hits,
        misses = stats.misses,
        live = stats.live_entries,
        "Process batches produced"
    );

    let mut invoice = system.factory.produce("Invoice").map_err(|e| e.to_string())?;
    invoice
        .set("ID", FieldValue::Identifier("INV-2024-001".into()))
        .map_err(|e| e.to_string())?;
    invoice
        .set("LegalMonetaryTotal", FieldValue::amount(1250.0, "EUR"))
        .map_err(|e| e.to_string())?;
    if let Some(key) = system.record_revision("INV-2024-001", &invoice) {
        info!(revision = %key, "Invoice snapshot recorded");
    }

    // Billing exposes its operations through a member table.
    let billing = MemberTable::new("billing").with_member(
        "issue_invoice",
        Executable::infallible("issue_invoice", |_| json!("issued")),
    );
    system
        .registry
        .register(
            "issue_invoice",
            Executable::infallible("issue_invoice", |params| {
                json!(format!(
                    "issued {}",
                    params.keyword("id").and_then(|v| v.as_str()).unwrap_or("?")
                ))
            }),
            Some(&billing),
            true,
        )
        .map_err(|e| e.to_string())?;
    let params = ActionParams::new().kwarg("id", "INV-2024-001");
    if let Some(Ok(outcome)) = billing.call("issue_invoice", &params) {
        info!(%outcome, history = system.registry.history("issue_invoice").len(), "Billing override in place");
    }

    let Some((_, issue)) = system.registry.get("issue_invoice") else {
        return Err("issue_invoice not registered".into());
    };
    let credit_approved = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let gate = credit_approved.clone();
    system.runner.register_request(
        ActionRequest::new(issue)
            .params(params)
            .requester("buyer-17")
            .performer("seller-4")
            .condition(true)
            .condition(Condition::new(move || {
                gate.load(std::sync::atomic::Ordering::SeqCst)
            }))
            .expect_outcome("issued INV-2024-001"),
    );

    match system.runner.execute("issue_invoice") {
        Ok(outcome) => info!(%outcome, "Executed before approval"),
        Err(e) => error!(error = %e, "Execution refused"),
    }
    credit_approved.store(true, std::sync::atomic::Ordering::SeqCst);
    let outcome = system
        .runner
        .execute("issue_invoice")
        .map_err(|e| e.to_string())?;
    info!(
        %outcome,
        attempts = system.runner.audit("issue_invoice").len(),
        "Application completed successfully"
    );
    Ok(())
}
