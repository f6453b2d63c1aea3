use super::config::SystemConfig;
use super::error::SystemError;
use crate::action::{ActionRegistry, ActionRunner};
use crate::document::{DocumentFactory, DocumentRecord, DocumentRevisions, PrototypeCache, RevisionKey};
use crate::schema::{InMemorySchemaRegistry, ProcessLookup, SchemaRegistry};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static INSTALLED: OnceLock<DocumentSystem> = OnceLock::new();

/// The composition root for the document core.
///
/// `DocumentSystem` is responsible for:
/// - **Wiring**: one [`PrototypeCache`] shared by one [`DocumentFactory`],
///   one [`ActionRegistry`], one [`ActionRunner`] and an optional revision log
/// - **Policy**: applying [`SystemConfig`] to the components it builds
/// - **Publication**: optionally making itself the process-wide instance
///
/// Components are plain values. Tests build as many systems as they like;
/// only [`install`](Self::install) is limited to once per process.
///
/// # Example
///
/// ```
/// use ubl_core::lifecycle::{DocumentSystem, SystemConfig};
///
/// let system = DocumentSystem::with_ubl_catalogue(SystemConfig::default());
/// let invoice = system.factory.produce("Invoice").unwrap();
/// assert_eq!(invoice.name(), "Invoice");
/// ```
pub struct DocumentSystem {
    pub factory: DocumentFactory,
    pub registry: ActionRegistry,
    pub runner: ActionRunner,
    revisions: Option<DocumentRevisions>,
    config: SystemConfig,
}

impl DocumentSystem {
    /// Builds a system over the given schema and process lookups.
    pub fn new(
        config: SystemConfig,
        schemas: Arc<dyn SchemaRegistry>,
        processes: Arc<dyn ProcessLookup>,
    ) -> Self {
        let cache = Arc::new(PrototypeCache::new());
        let factory = DocumentFactory::new(schemas, processes, cache);
        let registry = ActionRegistry::new()
            .allow_global_rebinding(config.allow_global_rebinding)
            .history_limit(config.history_limit);
        if config.allow_global_rebinding {
            warn!("Global action rebinding enabled");
        }
        let revisions = config.record_revisions.then(DocumentRevisions::new);

        info!(
            document_types = factory.schemas().known_type_names().len(),
            record_revisions = config.record_revisions,
            "Document system ready"
        );
        Self {
            factory,
            registry,
            runner: ActionRunner::new(),
            revisions,
            config,
        }
    }

    /// Builds a system over the seeded UBL 2.1 catalogue.
    pub fn with_ubl_catalogue(config: SystemConfig) -> Self {
        let catalogue = Arc::new(InMemorySchemaRegistry::ubl_catalogue());
        Self::new(config, catalogue.clone(), catalogue)
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// The revision log, when `record_revisions` is on.
    pub fn revisions(&self) -> Option<&DocumentRevisions> {
        self.revisions.as_ref()
    }

    /// Snapshots `document`; `None` when revisions are off.
    pub fn record_revision(
        &self,
        label: impl Into<String>,
        document: &DocumentRecord,
    ) -> Option<RevisionKey> {
        self.revisions
            .as_ref()
            .map(|revisions| revisions.record(label, document))
    }

    /// Publishes `system` as the process-wide instance.
    ///
    /// # Errors
    /// [`SystemError::InstantiationNotAllowed`] if a system was already
    /// installed; `system` is dropped and the installed one is unchanged.
    pub fn install(system: DocumentSystem) -> Result<&'static DocumentSystem, SystemError> {
        let mut fresh = false;
        let installed = INSTALLED.get_or_init(|| {
            fresh = true;
            system
        });
        if fresh {
            info!("Document system installed");
            Ok(installed)
        } else {
            warn!("Document system already installed");
            Err(SystemError::InstantiationNotAllowed("DocumentSystem"))
        }
    }

    /// The installed system, if any.
    pub fn global() -> Option<&'static DocumentSystem> {
        INSTALLED.get()
    }
}
