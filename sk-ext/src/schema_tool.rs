//! Settings surface for the schema management tasks.

use std::path::PathBuf;

use compact_str::CompactString;
use sk_tasks::{SchemaTask, TaskContainer, TaskId};
use sk_types::{CompiledArtifacts, OperationKind, SchemaApi, SettingsSnapshot, resolve_skip};

/// Mutable settings for the schema tool tasks.
///
/// Built up freely during the host's setup phase, then read once when the
/// tasks are registered. Tasks capture a [`SettingsSnapshot`], so setter
/// calls after registration never reach tasks that already exist.
#[derive(Debug)]
pub struct SchemaToolExtension {
    /// Metadata API the mappings are written against.
    api: SchemaApi,
    /// Tolerate metadata referencing classes that cannot be found.
    ignore_metadata_for_missing_classes: bool,
    /// Catalog to operate on. Required by the database-level operations.
    catalog_name: Option<CompactString>,
    /// Schema to operate on. Required by the database-level operations.
    schema_name: Option<CompactString>,
    /// Persistence unit naming the classes and datastore properties.
    persistence_unit: Option<CompactString>,
    /// Config file for the tool's log4j backend.
    log4j_config: Option<PathBuf>,
    /// Config file for the tool's JDK logging backend.
    jdk_log_config: Option<PathBuf>,
    /// Verbose tool output.
    verbose: bool,
    /// Fork the external tool process.
    fork: bool,
    /// Include pre-existing objects in generated DDL.
    complete_ddl: bool,
    /// File to dump generated DDL into.
    ddl_file: Option<PathBuf>,
    /// Skip override. Unset inherits the build-wide flag.
    skip: Option<bool>,

    /// Compiled output the tasks read and depend on.
    artifacts: CompiledArtifacts,
}

impl SchemaToolExtension {
    /// Create the settings surface for tasks reading `artifacts`.
    pub fn new(artifacts: CompiledArtifacts) -> Self {
        SchemaToolExtension {
            api: SchemaApi::default(),
            ignore_metadata_for_missing_classes: false,
            catalog_name: None,
            schema_name: None,
            persistence_unit: None,
            log4j_config: None,
            jdk_log_config: None,
            verbose: false,
            fork: true,
            complete_ddl: false,
            ddl_file: None,
            skip: None,
            artifacts,
        }
    }

    /// Apply a user-supplied mutation to the settings.
    ///
    /// No validation happens here; a missing persistence unit or a bad path
    /// surfaces when the external tool runs, one layer below.
    pub fn configure(&mut self, f: impl FnOnce(&mut Self)) {
        f(self);
    }

    /// Set the metadata API the mappings are written against.
    pub fn api(&mut self, api: SchemaApi) -> &mut Self {
        self.api = api;
        self
    }

    /// Tolerate metadata referencing classes that cannot be found.
    pub fn ignore_metadata_for_missing_classes(&mut self, ignore: bool) -> &mut Self {
        self.ignore_metadata_for_missing_classes = ignore;
        self
    }

    /// Set or clear the catalog the database-level operations target.
    pub fn catalog_name(&mut self, name: Option<CompactString>) -> &mut Self {
        self.catalog_name = name;
        self
    }

    /// Set or clear the schema the database-level operations target.
    pub fn schema_name(&mut self, name: Option<CompactString>) -> &mut Self {
        self.schema_name = name;
        self
    }

    /// Set or clear the persistence unit the tasks target.
    pub fn persistence_unit(&mut self, unit: Option<CompactString>) -> &mut Self {
        self.persistence_unit = unit;
        self
    }

    /// Set or clear the config file for the tool's log4j backend.
    pub fn log4j_config(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.log4j_config = path;
        self
    }

    /// Set or clear the config file for the tool's JDK logging backend.
    pub fn jdk_log_config(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.jdk_log_config = path;
        self
    }

    /// Set verbose tool output.
    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Whether to fork the external tool process.
    ///
    /// Without forking the tool tends to fail resolving class names from
    /// filenames alone, so the persistence unit must name classes directly.
    pub fn fork(&mut self, fork: bool) -> &mut Self {
        self.fork = fork;
        self
    }

    /// Include objects that already exist in the generated DDL.
    pub fn complete_ddl(&mut self, complete_ddl: bool) -> &mut Self {
        self.complete_ddl = complete_ddl;
        self
    }

    /// Set or clear the file generated DDL gets dumped into.
    pub fn ddl_file(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.ddl_file = path;
        self
    }

    /// Override the build-wide skip flag for the schema tasks.
    pub fn skip(&mut self, skip: bool) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    /// Capture the current settings, resolving the effective skip flag
    /// against the build-wide value.
    pub fn snapshot(&self, parent_skip: Option<bool>) -> SettingsSnapshot {
        SettingsSnapshot {
            api: self.api,
            ignore_metadata_for_missing_classes: self.ignore_metadata_for_missing_classes,
            catalog_name: self.catalog_name.clone(),
            schema_name: self.schema_name.clone(),
            persistence_unit: self.persistence_unit.clone(),
            log4j_config: self.log4j_config.clone(),
            jdk_log_config: self.jdk_log_config.clone(),
            verbose: self.verbose,
            fork: self.fork,
            complete_ddl: self.complete_ddl,
            ddl_file: self.ddl_file.clone(),
            skip: resolve_skip(parent_skip, self.skip),
        }
    }

    /// Register one task per schema operation with `container`.
    ///
    /// Tasks are created in the fixed [`OperationKind::ALL`] order, each
    /// carrying a copy of the current settings and a single dependency edge
    /// on the task that produces the compiled artifacts. The returned ids
    /// follow the same order.
    ///
    /// # Errors
    ///
    /// * If `container` already holds a task with one of the fixed names,
    ///   which is also what a second registration runs into.
    pub fn register_tasks(
        &self,
        parent_skip: Option<bool>,
        container: &mut TaskContainer,
    ) -> Result<Vec<TaskId>, anyhow::Error> {
        let snapshot = self.snapshot(parent_skip);

        let mut ids = Vec::with_capacity(OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            let mut task = SchemaTask::new(kind, snapshot.clone());
            task.add_dependency(self.artifacts.producer_task());
            ids.push(container.register(task)?);
        }

        let names: Vec<_> = OperationKind::ALL.iter().map(|kind| kind.task_name()).collect();
        tracing::debug!(?names, "registered schema tool tasks");

        Ok(ids)
    }
}
