use std::sync::{Arc, Barrier};
use ubl_core::document::{DocumentError, DocumentFactory, FieldValue, PrototypeCache};
use ubl_core::schema::mock::MockSchemaRegistry;
use ubl_core::schema::{BusinessProcess, FieldType, InMemorySchemaRegistry, SchemaRegistry};

fn catalogue_factory() -> DocumentFactory {
    let catalogue = Arc::new(InMemorySchemaRegistry::ubl_catalogue());
    DocumentFactory::new(catalogue.clone(), catalogue, Arc::new(PrototypeCache::new()))
}

fn ordering_mock() -> Arc<MockSchemaRegistry> {
    let mock = Arc::new(MockSchemaRegistry::new());
    mock.expect_document("Order")
        .return_fields([("ID", FieldType::Identifier), ("Total", FieldType::Amount)]);
    mock.expect_document("OrderResponse")
        .return_fields([("ID", FieldType::Identifier), ("Accepted", FieldType::Indicator)]);
    mock.expect_document("OrderChange")
        .return_fields([("ID", FieldType::Identifier), ("Quantity", FieldType::Quantity)]);
    mock.expect_process(BusinessProcess::Ordering)
        .return_documents(["Order", "OrderResponse", "OrderChange"]);
    mock
}

/// Every catalogue document can be produced twice into equal but independent records.
#[test]
fn test_idempotent_production_for_every_known_type() {
    let factory = catalogue_factory();

    for name in factory.schemas().known_type_names() {
        let mut first = factory.produce(&name).unwrap();
        let second = factory.produce(&name).unwrap();

        assert_eq!(first, second, "{name} copies differ");
        assert!(first.field_names().eq(second.field_names()));

        first
            .set("Note", FieldValue::Text("edited".into()))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(second.get("Note").unwrap(), &FieldValue::Text(String::new()));
        assert_eq!(
            factory.produce(&name).unwrap().get("Note").unwrap(),
            &FieldValue::Text(String::new()),
            "{name} prototype was mutated"
        );
    }
}

#[test]
fn test_records_expose_exactly_the_declared_fields() {
    let factory = catalogue_factory();
    let mut invoice = factory.produce("Invoice").unwrap();

    assert_eq!(
        invoice.schema_reference(),
        "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
    );
    assert!(matches!(
        invoice.get("ShoeSize"),
        Err(DocumentError::UndeclaredField { .. })
    ));
    assert!(matches!(
        invoice.set("ShoeSize", FieldValue::Numeric(42.0)),
        Err(DocumentError::UndeclaredField { .. })
    ));
    assert!(matches!(
        invoice.set("LegalMonetaryTotal", FieldValue::Text("a lot".into())),
        Err(DocumentError::FieldTypeMismatch { .. })
    ));
    assert_eq!(
        invoice.get("LegalMonetaryTotal").unwrap(),
        &FieldValue::amount(0.0, "")
    );
}

#[test]
fn test_unknown_type_rejection() {
    let factory = catalogue_factory();

    let err = factory.produce("NotARealDocument").unwrap_err();
    assert_eq!(
        err,
        DocumentError::UnrecognizedDocumentType("NotARealDocument".into())
    );
    let stats = factory.cache().stats();
    assert_eq!(stats.hits + stats.misses, 0);
    assert!(factory.cache().is_empty());
}

#[test]
fn test_process_expansion_is_lazy() {
    let mock = ordering_mock();
    let factory = DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()));

    let mut documents = factory.produce_for_process(BusinessProcess::Ordering, None);
    assert_eq!(documents.len(), 3);
    assert_eq!(mock.process_calls(), 1);
    assert_eq!(mock.total_definition_calls(), 0);

    let order = documents.next().unwrap().unwrap();
    assert_eq!(order.name(), "Order");
    assert_eq!(mock.definition_calls("Order"), 1);
    assert_eq!(mock.definition_calls("OrderResponse"), 0);
    assert_eq!(mock.definition_calls("OrderChange"), 0);
    assert_eq!(documents.remaining(), ["OrderResponse", "OrderChange"]);
}

#[test]
fn test_process_expansion_is_finite_and_ordered() {
    let mock = ordering_mock();
    let factory = DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()));

    let names: Vec<String> = factory
        .produce_for_process(BusinessProcess::Ordering, None)
        .map(|record| record.unwrap().name().to_string())
        .collect();
    assert_eq!(names, ["Order", "OrderResponse", "OrderChange"]);
    mock.verify();

    // A second traversal starts over and asks the lookup again.
    let again = factory.produce_for_process(BusinessProcess::Ordering, None);
    assert_eq!(again.count(), 3);
    assert_eq!(mock.process_calls(), 2);
}

#[test]
fn test_explicit_documents_and_unknown_entries() {
    let mock = ordering_mock();
    let factory = DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()));
    let explicit = vec!["OrderChange".to_string(), "Invoice".to_string()];

    let results: Vec<_> = factory
        .produce_for_process(BusinessProcess::Billing, Some(&explicit))
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().name(), "OrderChange");
    assert_eq!(
        results[1].as_ref().unwrap_err(),
        &DocumentError::UnrecognizedDocumentType("Invoice".into())
    );
}

#[test]
fn test_reclaimed_entry_is_rebuilt_transparently() {
    let mock = ordering_mock();
    let factory = DocumentFactory::new(mock.clone(), mock.clone(), Arc::new(PrototypeCache::new()));

    let first = factory.produce("Order").unwrap();
    let kept = factory.produce("Order").unwrap();
    assert_eq!(mock.definition_calls("Order"), 1);

    drop(first);
    drop(kept);
    assert!(!factory.cache().contains("Order"));

    let rebuilt = factory.produce("Order").unwrap();
    assert_eq!(rebuilt.name(), "Order");
    assert_eq!(mock.definition_calls("Order"), 2);
    assert_eq!(factory.cache().stats().reclaimed, 1);
}

/// Concurrent first requests for one type end up sharing a single prototype.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_share_one_prototype() {
    const PRODUCERS: usize = 8;
    let factory = Arc::new(catalogue_factory());
    let barrier = Arc::new(Barrier::new(PRODUCERS));

    let mut handles = Vec::new();
    for _ in 0..PRODUCERS {
        let factory = factory.clone();
        let barrier = barrier.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            barrier.wait();
            factory.produce("Invoice").unwrap()
        }));
    }

    let mut records = Vec::new();
    for handle in handles {
        records.push(handle.await.unwrap());
    }

    let winner = &records[0];
    for record in &records[1..] {
        assert!(record.shares_prototype_with(winner));
        assert_eq!(record, winner);
    }
    assert_eq!(factory.cache().len(), 1);
}
