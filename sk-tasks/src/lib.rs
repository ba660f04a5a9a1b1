//! Schema management tasks and the container the host schedules them from.

use std::collections::BTreeMap;

use compact_str::CompactString;
use sk_types::{OperationKind, SettingsSnapshot};
use smallvec::SmallVec;

/// A single schema management task, as handed to the host's task graph.
///
/// The task holds a copy of the settings that were current when it was
/// created; reconfiguring the extension afterwards does not reach back into
/// tasks that already exist.
#[derive(Debug, Clone)]
pub struct SchemaTask {
    /// Name the task registers under.
    name: CompactString,
    /// Operation this task performs.
    kind: OperationKind,
    /// Settings captured at creation time.
    settings: SettingsSnapshot,
    /// Names of tasks that must run before this one.
    depends_on: SmallVec<[CompactString; 1]>,
}

impl SchemaTask {
    /// Create a task for `kind` carrying `settings`.
    pub fn new(kind: OperationKind, settings: SettingsSnapshot) -> Self {
        SchemaTask {
            name: CompactString::const_new(kind.task_name()),
            kind,
            settings,
            depends_on: SmallVec::new(),
        }
    }

    /// Record that `task` must run before this one.
    pub fn add_dependency(&mut self, task: impl Into<CompactString>) -> &mut Self {
        self.depends_on.push(task.into());
        self
    }

    /// Name the task registers under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operation this task performs.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Settings captured at creation time.
    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }

    /// Names of tasks that must run before this one.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on.iter().map(|name| name.as_str())
    }

    /// Render the argument vector for the external schema tool process.
    ///
    /// Only arguments the tool itself parses are rendered. The fork flag and
    /// the logging config locations parameterize the launcher instead, so
    /// they never show up here. A missing persistence unit renders as
    /// nothing at all; the tool reports it when it runs.
    pub fn tool_args(&self) -> Vec<String> {
        let settings = &self.settings;
        let mut args = vec![self.kind.mode_flag().to_string()];

        args.push("-api".to_string());
        args.push(settings.api.as_str().to_string());

        if let Some(catalog) = &settings.catalog_name {
            args.push("-catalog".to_string());
            args.push(catalog.to_string());
        }
        if let Some(schema) = &settings.schema_name {
            args.push("-schema".to_string());
            args.push(schema.to_string());
        }
        if let Some(ddl_file) = &settings.ddl_file {
            args.push("-ddlFile".to_string());
            args.push(ddl_file.display().to_string());
        }
        if settings.complete_ddl {
            args.push("-completeDdl".to_string());
        }
        if settings.ignore_metadata_for_missing_classes {
            args.push("-ignoreMetaDataForMissingClasses".to_string());
        }
        if settings.verbose {
            args.push("-v".to_string());
        }
        if let Some(unit) = &settings.persistence_unit {
            args.push("-pu".to_string());
            args.push(unit.to_string());
        }

        args
    }
}

/// ID for a task registered in a [`TaskContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(u64);

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        TaskId(value)
    }
}

/// Container of registered tasks, as the host sees them.
///
/// Holds names, registration order, and dependency edges only. Scheduling
/// and execution stay with the host.
#[derive(Debug, Default)]
pub struct TaskContainer {
    /// Map of task name to [`TaskId`].
    names: BTreeMap<CompactString, TaskId>,
    /// Map of [`TaskId`] to [`SchemaTask`].
    ///
    /// IDs are handed out monotonically, so iterating the map visits tasks
    /// in registration order.
    tasks: BTreeMap<TaskId, SchemaTask>,
    /// Next [`TaskId`] to hand out.
    next_id: u64,
}

impl TaskContainer {
    /// Create an empty [`TaskContainer`].
    pub fn new() -> Self {
        TaskContainer::default()
    }

    /// Register `task`, handing back its [`TaskId`].
    ///
    /// # Errors
    ///
    /// * If a task with the same name is already registered.
    pub fn register(&mut self, task: SchemaTask) -> Result<TaskId, anyhow::Error> {
        if self.names.contains_key(task.name()) {
            anyhow::bail!("task '{}' is already registered", task.name());
        }

        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.names.insert(task.name.clone(), id);
        let prev = self.tasks.insert(id, task);
        debug_assert!(prev.is_none());

        Ok(id)
    }

    /// Get the task registered under `id`, if it exists.
    pub fn get(&self, id: TaskId) -> Option<&SchemaTask> {
        self.tasks.get(&id)
    }

    /// Get the [`TaskId`] registered under `name`, if one exists.
    pub fn lookup(&self, name: &str) -> Option<TaskId> {
        self.names.get(name).copied()
    }

    /// Iterate all registered tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &SchemaTask)> {
        self.tasks.iter().map(|(id, task)| (*id, task))
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks have been registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sk_types::SchemaApi;

    use super::*;

    #[test]
    fn smoketest_register_and_lookup() {
        let mut container = TaskContainer::new();
        let task = SchemaTask::new(OperationKind::CreateTables, SettingsSnapshot::default());
        let id = container.register(task).unwrap();

        assert_eq!(container.lookup("createDatabaseTables"), Some(id));
        assert_eq!(
            container.get(id).unwrap().kind(),
            OperationKind::CreateTables
        );
        assert_eq!(container.len(), 1);
        assert!(!container.is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut container = TaskContainer::new();
        container
            .register(SchemaTask::new(
                OperationKind::DatabaseInfo,
                SettingsSnapshot::default(),
            ))
            .unwrap();

        let err = container
            .register(SchemaTask::new(
                OperationKind::DatabaseInfo,
                SettingsSnapshot::default(),
            ))
            .unwrap_err();

        assert!(err.to_string().contains("already registered"));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut container = TaskContainer::new();
        for kind in OperationKind::ALL {
            container
                .register(SchemaTask::new(kind, SettingsSnapshot::default()))
                .unwrap();
        }

        let names: Vec<_> = container.iter().map(|(_, task)| task.name()).collect();
        let expected: Vec<_> = OperationKind::ALL.iter().map(|kind| kind.task_name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn dependencies_are_recorded() {
        let mut task = SchemaTask::new(OperationKind::SchemaInfo, SettingsSnapshot::default());
        task.add_dependency("classes");

        let deps: Vec<_> = task.dependencies().collect();
        assert_eq!(deps, ["classes"]);
    }

    #[test]
    fn tool_args_with_defaults() {
        let task = SchemaTask::new(OperationKind::ValidateTables, SettingsSnapshot::default());
        assert_eq!(task.tool_args(), ["-validate", "-api", "JDO"]);
    }

    #[test]
    fn tool_args_with_everything_set() {
        let settings = SettingsSnapshot {
            api: SchemaApi::Jpa,
            ignore_metadata_for_missing_classes: true,
            catalog_name: Some("sales".into()),
            schema_name: Some("public".into()),
            persistence_unit: Some("crm".into()),
            verbose: true,
            complete_ddl: true,
            ddl_file: Some(PathBuf::from("out/schema.ddl")),
            ..SettingsSnapshot::default()
        };

        let task = SchemaTask::new(OperationKind::DeleteThenCreateTables, settings);
        assert_eq!(
            task.tool_args(),
            [
                "-deletecreate",
                "-api",
                "JPA",
                "-catalog",
                "sales",
                "-schema",
                "public",
                "-ddlFile",
                "out/schema.ddl",
                "-completeDdl",
                "-ignoreMetaDataForMissingClasses",
                "-v",
                "-pu",
                "crm",
            ]
        );
    }

    #[test]
    fn launcher_only_settings_never_render() {
        let settings = SettingsSnapshot {
            fork: false,
            log4j_config: Some(PathBuf::from("conf/log4j.properties")),
            jdk_log_config: Some(PathBuf::from("conf/logging.properties")),
            ..SettingsSnapshot::default()
        };

        let task = SchemaTask::new(OperationKind::DatabaseInfo, settings);
        assert_eq!(task.tool_args(), ["-dbinfo", "-api", "JDO"]);
    }
}
