use serde_json::json;
use std::sync::Arc;
use ubl_core::action::{ActionError, ActionRequest, Executable, MemberTable};
use ubl_core::document::FieldValue;
use ubl_core::lifecycle::{DocumentSystem, SystemConfig, SystemError};
use ubl_core::schema::mock::MockSchemaRegistry;
use ubl_core::schema::{BusinessProcess, FieldType};

/// The only test in this binary that installs; the installed system is process-wide.
#[test]
fn test_second_install_is_not_allowed() {
    let installed = DocumentSystem::install(DocumentSystem::with_ubl_catalogue(
        SystemConfig::default(),
    ))
    .unwrap();
    assert!(std::ptr::eq(installed, DocumentSystem::global().unwrap()));

    let err = DocumentSystem::install(DocumentSystem::with_ubl_catalogue(SystemConfig {
        allow_global_rebinding: true,
        ..SystemConfig::default()
    }))
    .err()
    .unwrap();
    assert!(matches!(err, SystemError::InstantiationNotAllowed("DocumentSystem")));
    assert!(!DocumentSystem::global().unwrap().config().allow_global_rebinding);
}

#[test]
fn test_config_flows_into_components() {
    let config = SystemConfig::from_json(
        r#"{"allow_global_rebinding": true, "record_revisions": false, "history_limit": 1}"#,
    )
    .unwrap();
    let system = DocumentSystem::with_ubl_catalogue(config);

    let invoice = system.factory.produce("Invoice").unwrap();
    assert!(system.revisions().is_none());
    assert!(system.record_revision("draft", &invoice).is_none());

    for version in 0..3 {
        system
            .registry
            .register(
                "notify",
                Executable::infallible("notify", move |_| json!(version)),
                None,
                version > 0,
            )
            .unwrap();
    }
    assert_eq!(system.registry.history("notify").len(), 1);
    assert!(system.registry.resolve("notify").is_some());
}

#[test]
fn test_default_system_refuses_global_rebinding() {
    let system = DocumentSystem::with_ubl_catalogue(SystemConfig::default());
    let err = system
        .registry
        .register("notify", Executable::infallible("notify", |_| json!(0)), None, false)
        .unwrap_err();
    assert!(matches!(err, ActionError::GlobalRebindingDisabled(_)));
}

#[test]
fn test_billing_round_trip_through_one_system() {
    let mock = Arc::new(MockSchemaRegistry::new());
    mock.expect_document("Invoice")
        .return_fields([("ID", FieldType::Identifier), ("Total", FieldType::Amount)]);
    mock.expect_process(BusinessProcess::Billing)
        .return_documents(["Invoice"]);
    let system = DocumentSystem::new(SystemConfig::default(), mock.clone(), mock.clone());

    let mut invoices: Vec<_> = system
        .factory
        .produce_for_process(BusinessProcess::Billing, None)
        .collect::<Result<_, _>>()
        .unwrap();
    let invoice = &mut invoices[0];
    invoice.set("ID", FieldValue::Identifier("INV-7".into())).unwrap();
    invoice.set("Total", FieldValue::amount(99.5, "EUR")).unwrap();
    let revision = system.record_revision("INV-7", invoice).unwrap();

    let billing = MemberTable::new("billing");
    system
        .registry
        .register(
            "issue_invoice",
            Executable::infallible("issue_invoice", |params| {
                params.keyword("total").cloned().unwrap_or_default()
            }),
            Some(&billing),
            false,
        )
        .unwrap();
    let (_, issue) = system.registry.get("issue_invoice").unwrap();
    let total = invoice.get("Total").unwrap().as_f64().unwrap();
    system.runner.register_request(
        ActionRequest::new(issue)
            .params(ubl_core::action::ActionParams::new().kwarg("total", total))
            .condition(true)
            .expect_outcome(99.5),
    );

    assert_eq!(system.runner.execute("issue_invoice").unwrap(), json!(99.5));
    let snapshot = system.revisions().unwrap().get(&revision).unwrap();
    assert_eq!(snapshot.document.get("ID").unwrap(), &FieldValue::Identifier("INV-7".into()));
    mock.verify();
}
