//! Types used throughout `sk`.
//!
//! The goal of this crate is to be very lightweight, so take care with adding dependencies.

use std::fmt;
use std::path::PathBuf;

use compact_str::CompactString;
use smallvec::SmallVec;

/// Metadata API the external schema tool should interpret mappings with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaApi {
    /// JDO metadata.
    #[default]
    Jdo,
    /// JPA metadata.
    Jpa,
}

impl SchemaApi {
    /// Spelling the external schema tool expects for its `-api` argument.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaApi::Jdo => "JDO",
            SchemaApi::Jpa => "JPA",
        }
    }
}

impl fmt::Display for SchemaApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the fixed schema management operations a task gets registered for.
///
/// The set is closed and known at compile time, so tasks are constructed by
/// iterating [`OperationKind::ALL`] rather than through any dynamic lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OperationKind {
    CreateDatabase,
    DeleteDatabase,
    CreateTables,
    DeleteTables,
    DeleteThenCreateTables,
    ValidateTables,
    DatabaseInfo,
    SchemaInfo,
}

impl OperationKind {
    /// Every operation, in the order tasks are registered with the host.
    pub const ALL: [OperationKind; 8] = [
        OperationKind::CreateDatabase,
        OperationKind::DeleteDatabase,
        OperationKind::CreateTables,
        OperationKind::DeleteTables,
        OperationKind::DeleteThenCreateTables,
        OperationKind::ValidateTables,
        OperationKind::DatabaseInfo,
        OperationKind::SchemaInfo,
    ];

    /// Name the operation's task is registered under.
    pub fn task_name(&self) -> &'static str {
        match self {
            OperationKind::CreateDatabase => "createDatabase",
            OperationKind::DeleteDatabase => "deleteDatabase",
            OperationKind::CreateTables => "createDatabaseTables",
            OperationKind::DeleteTables => "deleteDatabaseTables",
            OperationKind::DeleteThenCreateTables => "deleteThenCreateDatabaseTables",
            OperationKind::ValidateTables => "validateDatabaseTables",
            OperationKind::DatabaseInfo => "dbinfo",
            OperationKind::SchemaInfo => "schemainfo",
        }
    }

    /// Mode argument understood by the external schema tool.
    pub fn mode_flag(&self) -> &'static str {
        match self {
            OperationKind::CreateDatabase => "-createDatabase",
            OperationKind::DeleteDatabase => "-deleteDatabase",
            OperationKind::CreateTables => "-create",
            OperationKind::DeleteTables => "-delete",
            OperationKind::DeleteThenCreateTables => "-deletecreate",
            OperationKind::ValidateTables => "-validate",
            OperationKind::DatabaseInfo => "-dbinfo",
            OperationKind::SchemaInfo => "-schemainfo",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

/// Settings captured onto a schema task when it is registered.
///
/// Every task receives the full snapshot, even though some fields (catalog
/// and schema name) only matter to the database-level operations. Tasks
/// ignore the fields they have no use for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    /// Metadata API the mappings are written against.
    pub api: SchemaApi,
    /// Tolerate metadata that references classes that cannot be found.
    pub ignore_metadata_for_missing_classes: bool,
    /// Catalog to operate on. Required by the database-level operations.
    pub catalog_name: Option<CompactString>,
    /// Schema to operate on. Required by the database-level operations.
    pub schema_name: Option<CompactString>,
    /// Persistence unit naming the classes and datastore properties to
    /// target. The external tool requires it, but only checks it when run.
    pub persistence_unit: Option<CompactString>,
    /// Config file for the tool's log4j backend, if that one is used.
    pub log4j_config: Option<PathBuf>,
    /// Config file for the tool's JDK logging backend, if that one is used.
    pub jdk_log_config: Option<PathBuf>,
    /// Verbose tool output.
    pub verbose: bool,
    /// Run the external tool in a forked process.
    ///
    /// Without forking the tool tends to fail resolving class names from
    /// filenames alone, so the persistence unit must name classes directly.
    pub fork: bool,
    /// Include objects that already exist in the generated DDL.
    pub complete_ddl: bool,
    /// File to dump generated DDL into.
    pub ddl_file: Option<PathBuf>,
    /// Effective skip flag, resolved via [`resolve_skip`].
    pub skip: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        SettingsSnapshot {
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
            skip: false,
        }
    }
}

/// Handle to the compiled classes and mapping metadata the schema tasks read.
///
/// Produced by the host's compilation step; the extension records which task
/// produces the artifacts and where they land, and never mutates either.
#[derive(Debug, Clone)]
pub struct CompiledArtifacts {
    /// Task in the host graph that produces the artifacts.
    producer_task: CompactString,
    /// Directories the compiled output lands in.
    output_dirs: SmallVec<[PathBuf; 2]>,
}

impl CompiledArtifacts {
    /// Create a handle for artifacts produced by `producer_task`.
    pub fn new(
        producer_task: impl Into<CompactString>,
        output_dirs: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        CompiledArtifacts {
            producer_task: producer_task.into(),
            output_dirs: output_dirs.into_iter().collect(),
        }
    }

    /// Name of the task that produces the artifacts.
    pub fn producer_task(&self) -> &str {
        &self.producer_task
    }

    /// Directories the compiled output lands in.
    pub fn output_dirs(&self) -> &[PathBuf] {
        &self.output_dirs
    }
}

/// Resolve the effective skip flag for the schema tasks.
///
/// Precedence, least to most specific: the build-wide default (`false`), an
/// explicit value on the parent extension, an explicit value on the schema
/// tool settings themselves.
pub fn resolve_skip(parent: Option<bool>, own: Option<bool>) -> bool {
    let mut skip = false;
    if let Some(parent) = parent {
        skip = parent;
    }
    if let Some(own) = own {
        skip = own;
    }
    skip
}
