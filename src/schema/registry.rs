//! In-memory schema registry with a seeded UBL 2.1 catalogue.

use super::descriptor::DocumentTypeDescriptor;
use super::field::{FieldDef, FieldType};
use super::process::BusinessProcess;
use super::{ProcessLookup, SchemaRegistry};
use std::collections::{BTreeSet, HashMap};

const UBL_SCHEMA_PREFIX: &str = "urn:oasis:names:specification:ubl:schema:xsd";

/// Schema registry and process lookup backed by plain maps.
///
/// Build it once at start-up, then share it behind an `Arc`; it is never
/// mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaRegistry {
    documents: HashMap<String, DocumentTypeDescriptor>,
    processes: HashMap<BusinessProcess, Vec<String>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a document type.
    pub fn with_document(mut self, descriptor: DocumentTypeDescriptor) -> Self {
        self.documents.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Associates a process with the documents it exchanges, in order.
    pub fn with_process<I, S>(mut self, process: BusinessProcess, documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.processes
            .insert(process, documents.into_iter().map(Into::into).collect());
        self
    }

    pub fn descriptor(&self, name: &str) -> Option<&DocumentTypeDescriptor> {
        self.documents.get(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The UBL 2.1 documents used by the tendering, catalogue, quotation,
    /// ordering, fulfilment and billing processes.
    pub fn ubl_catalogue() -> Self {
        let party = || FieldType::Association("Party".to_string());
        let line = |component: &str| FieldType::Association(component.to_string());

        Self::new()
            // Ordering
            .with_document(
                ubl_document("Order")
                    .field("SalesOrderID", FieldType::Identifier)
                    .field("OrderTypeCode", FieldType::Code)
                    .field("DocumentCurrencyCode", FieldType::Code)
                    .field("BuyerCustomerParty", party())
                    .field("SellerSupplierParty", party())
                    .field("AnticipatedMonetaryTotal", FieldType::Amount)
                    .field("OrderLine", line("OrderLine")),
            )
            .with_document(
                ubl_document("OrderResponse")
                    .field("OrderReference", FieldType::Identifier)
                    .field("OrderResponseCode", FieldType::Code)
                    .field("SellerSupplierParty", party())
                    .field("BuyerCustomerParty", party())
                    .field("LegalMonetaryTotal", FieldType::Amount),
            )
            .with_document(
                ubl_document("OrderChange")
                    .field("SequenceNumberID", FieldType::Identifier)
                    .field("OrderReference", FieldType::Identifier)
                    .field("BuyerCustomerParty", party())
                    .field("OrderLine", line("OrderLine")),
            )
            .with_document(
                ubl_document("OrderCancellation")
                    .field("CancellationNote", FieldType::Text)
                    .field("OrderReference", FieldType::Identifier)
                    .field("BuyerCustomerParty", party()),
            )
            // Billing
            .with_document(
                ubl_document("Invoice")
                    .field("DueDate", FieldType::DateTime)
                    .field("InvoiceTypeCode", FieldType::Code)
                    .field("DocumentCurrencyCode", FieldType::Code)
                    .field("AccountingSupplierParty", party())
                    .field("AccountingCustomerParty", party())
                    .field("TaxTotal", FieldType::Amount)
                    .field("LegalMonetaryTotal", FieldType::Amount)
                    .field("InvoicedQuantity", FieldType::Quantity)
                    .field("InvoiceLine", line("InvoiceLine")),
            )
            .with_document(
                ubl_document("CreditNote")
                    .field("CreditNoteTypeCode", FieldType::Code)
                    .field("AccountingSupplierParty", party())
                    .field("AccountingCustomerParty", party())
                    .field("LegalMonetaryTotal", FieldType::Amount)
                    .field("CreditNoteLine", line("CreditNoteLine")),
            )
            .with_document(
                ubl_document("DebitNote")
                    .field("AccountingSupplierParty", party())
                    .field("AccountingCustomerParty", party())
                    .field("RequestedMonetaryTotal", FieldType::Amount)
                    .field("DebitNoteLine", line("DebitNoteLine")),
            )
            // Catalogue
            .with_document(
                ubl_document("CatalogueRequest")
                    .field("Name", FieldType::Name)
                    .field("SenderParty", party())
                    .field("ReceiverParty", party())
                    .field("ApplicableTerritoryAddress", line("Address")),
            )
            .with_document(
                ubl_document("Catalogue")
                    .field("Name", FieldType::Name)
                    .field("ActionCode", FieldType::Code)
                    .field("VersionID", FieldType::Identifier)
                    .field("ValidityPeriod", line("Period"))
                    .field("ProviderParty", party())
                    .field("ReceiverParty", party())
                    .field("CatalogueLine", line("CatalogueLine")),
            )
            .with_document(
                ubl_document("ApplicationResponse")
                    .field("ResponseDate", FieldType::DateTime)
                    .field("SenderParty", party())
                    .field("ReceiverParty", party())
                    .field("DocumentResponse", line("DocumentResponse")),
            )
            // Quotation
            .with_document(
                ubl_document("RequestForQuotation")
                    .field("SubmissionDueDate", FieldType::DateTime)
                    .field("OriginatorCustomerParty", party())
                    .field("SellerSupplierParty", party())
                    .field("RequestedQuantity", FieldType::Quantity)
                    .field("RequestForQuotationLine", line("RequestForQuotationLine")),
            )
            .with_document(
                ubl_document("Quotation")
                    .field("ValidityPeriod", line("Period"))
                    .field("SellerSupplierParty", party())
                    .field("BuyerCustomerParty", party())
                    .field("QuotedMonetaryTotal", FieldType::Amount)
                    .field("QuotationLine", line("QuotationLine")),
            )
            // Fulfilment
            .with_document(
                ubl_document("DespatchAdvice")
                    .field("DespatchAdviceTypeCode", FieldType::Code)
                    .field("OrderReference", FieldType::Identifier)
                    .field("DespatchSupplierParty", party())
                    .field("DeliveryCustomerParty", party())
                    .field("GrossWeightMeasure", FieldType::Measure)
                    .field("DespatchLine", line("DespatchLine")),
            )
            .with_document(
                ubl_document("ReceiptAdvice")
                    .field("ReceiptAdviceTypeCode", FieldType::Code)
                    .field("DespatchDocumentReference", FieldType::Identifier)
                    .field("DeliveryCustomerParty", party())
                    .field("ReceivedQuantity", FieldType::Quantity)
                    .field("ReceiptLine", line("ReceiptLine")),
            )
            // Tendering
            .with_document(
                ubl_document("PriorInformationNotice")
                    .field("ContractFolderID", FieldType::Identifier)
                    .field("ContractingParty", party())
                    .field("ProcurementProject", line("ProcurementProject")),
            )
            .with_document(
                ubl_document("ContractNotice")
                    .field("ContractFolderID", FieldType::Identifier)
                    .field("ContractingParty", party())
                    .field("TenderingTerms", line("TenderingTerms"))
                    .field("TenderingProcess", line("TenderingProcess")),
            )
            .with_document(
                ubl_document("CallForTenders")
                    .field("ContractFolderID", FieldType::Identifier)
                    .field("ApprovalDate", FieldType::DateTime)
                    .field("ContractingParty", party())
                    .field("TenderingTerms", line("TenderingTerms"))
                    .field("ProcurementProject", line("ProcurementProject")),
            )
            .with_document(
                ubl_document("Tender")
                    .field("ContractFolderID", FieldType::Identifier)
                    .field("TenderTypeCode", FieldType::Code)
                    .field("LegalMonetaryTotal", FieldType::Amount)
                    .field("TendererParty", party())
                    .field("ContractingParty", party())
                    .field("TenderLine", line("TenderLine"))
                    .field("Attachment", FieldType::BinaryObject),
            )
            .with_document(
                ubl_document("TenderReceipt")
                    .field("ContractFolderID", FieldType::Identifier)
                    .field("ReceivedDate", FieldType::DateTime)
                    .field("SenderParty", party())
                    .field("ReceiverParty", party()),
            )
            .with_process(
                BusinessProcess::Tendering,
                [
                    "PriorInformationNotice",
                    "ContractNotice",
                    "CallForTenders",
                    "Tender",
                    "TenderReceipt",
                ],
            )
            .with_process(
                BusinessProcess::Catalogue,
                ["CatalogueRequest", "Catalogue", "ApplicationResponse"],
            )
            .with_process(
                BusinessProcess::Quotation,
                ["RequestForQuotation", "Quotation"],
            )
            .with_process(
                BusinessProcess::Ordering,
                ["Order", "OrderResponse", "OrderChange", "OrderCancellation"],
            )
            .with_process(
                BusinessProcess::Fulfilment,
                ["DespatchAdvice", "ReceiptAdvice"],
            )
            .with_process(
                BusinessProcess::Billing,
                ["Invoice", "CreditNote", "DebitNote"],
            )
    }
}

/// Common header every UBL document carries.
fn ubl_document(name: &str) -> DocumentTypeDescriptor {
    DocumentTypeDescriptor::new(name, format!("{UBL_SCHEMA_PREFIX}:{name}-2"))
        .field("UBLVersionID", FieldType::Identifier)
        .field("ID", FieldType::Identifier)
        .field("IssueDate", FieldType::DateTime)
        .field("Note", FieldType::Text)
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn field_definition(&self, name: &str) -> Option<Vec<FieldDef>> {
        self.documents.get(name).map(|d| d.fields.clone())
    }

    fn schema_reference(&self, name: &str) -> Option<String> {
        self.documents.get(name).map(|d| d.schema_reference.clone())
    }

    fn known_type_names(&self) -> BTreeSet<String> {
        self.documents.keys().cloned().collect()
    }

    fn is_known(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }
}

impl ProcessLookup for InMemorySchemaRegistry {
    fn documents_for_process(
        &self,
        process: BusinessProcess,
        explicit: Option<&[String]>,
    ) -> Vec<String> {
        match explicit {
            Some(documents) => documents.to_vec(),
            None => self.processes.get(&process).cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_processes_only_reference_known_documents() {
        let registry = InMemorySchemaRegistry::ubl_catalogue();
        for process in BusinessProcess::ALL {
            for name in registry.documents_for_process(process, None) {
                assert!(registry.is_known(&name), "{process} references unknown {name}");
            }
        }
    }

    #[test]
    fn every_document_carries_the_ubl_header() {
        let registry = InMemorySchemaRegistry::ubl_catalogue();
        for name in registry.known_type_names() {
            let fields = registry.field_definition(&name).unwrap();
            let header: Vec<_> = fields.iter().take(4).map(|f| f.name.as_str()).collect();
            assert_eq!(header, ["UBLVersionID", "ID", "IssueDate", "Note"]);
        }
    }

    #[test]
    fn schema_reference_is_a_ubl_urn() {
        let registry = InMemorySchemaRegistry::ubl_catalogue();
        assert_eq!(
            registry.schema_reference("Invoice").as_deref(),
            Some("urn:oasis:names:specification:ubl:schema:xsd:Invoice-2")
        );
        assert!(registry.schema_reference("NotARealDocument").is_none());
    }

    #[test]
    fn explicit_documents_are_returned_as_given() {
        let registry = InMemorySchemaRegistry::ubl_catalogue();
        let explicit = vec!["Invoice".to_string(), "Order".to_string()];
        assert_eq!(
            registry.documents_for_process(BusinessProcess::Tendering, Some(&explicit)),
            explicit
        );
    }

    #[test]
    fn unmapped_process_has_no_documents() {
        let registry = InMemorySchemaRegistry::ubl_catalogue();
        assert!(registry
            .documents_for_process(BusinessProcess::CertificationOfOrigin, None)
            .is_empty());
    }
}
