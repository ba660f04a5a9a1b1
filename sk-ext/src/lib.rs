//! Build extension that wires datastore schema management into a host task graph.
//!
//! The extension is configuration glue: it accumulates settings during the
//! host's setup phase and, once, fans them out onto a fixed set of schema
//! management tasks. It never schedules or executes anything itself.

mod schema_tool;

pub use schema_tool::SchemaToolExtension;

use sk_tasks::{TaskContainer, TaskId};
use sk_types::CompiledArtifacts;

/// Root extension for the persistence toolkit.
///
/// Holds the build-wide flags shared by the tool-specific extensions and owns
/// the schema tool settings.
#[derive(Debug)]
pub struct ToolkitExtension {
    /// Build-wide skip flag. The schema tool settings may override it.
    skip: Option<bool>,
    /// Settings for the schema tool tasks.
    schema_tool: SchemaToolExtension,
}

impl ToolkitExtension {
    /// Create the extension for a build whose compiled output is described
    /// by `artifacts`.
    pub fn new(artifacts: CompiledArtifacts) -> Self {
        ToolkitExtension {
            skip: None,
            schema_tool: SchemaToolExtension::new(artifacts),
        }
    }

    /// Set the build-wide skip flag.
    pub fn skip(&mut self, skip: bool) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    /// The schema tool settings.
    pub fn schema_tool(&mut self) -> &mut SchemaToolExtension {
        &mut self.schema_tool
    }

    /// Apply `f` to the schema tool settings.
    pub fn configure_schema_tool(&mut self, f: impl FnOnce(&mut SchemaToolExtension)) {
        self.schema_tool.configure(f);
    }

    /// Register the schema management tasks with `container`.
    ///
    /// The build-wide skip flag participates as the parent value in skip
    /// resolution; an explicit value on the schema tool settings wins.
    ///
    /// # Errors
    ///
    /// * If `container` already holds a task with one of the fixed names.
    pub fn register_schema_tasks(
        &self,
        container: &mut TaskContainer,
    ) -> Result<Vec<TaskId>, anyhow::Error> {
        self.schema_tool.register_tasks(self.skip, container)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sk_tasks::TaskContainer;
    use sk_types::CompiledArtifacts;

    use super::*;

    fn test_artifacts() -> CompiledArtifacts {
        CompiledArtifacts::new("classes", [PathBuf::from("build/classes")])
    }

    #[test]
    fn smoketest_toolkit_registration() {
        let mut toolkit = ToolkitExtension::new(test_artifacts());
        toolkit.configure_schema_tool(|schema_tool| {
            schema_tool.verbose(true);
        });

        let mut container = TaskContainer::new();
        let ids = toolkit.register_schema_tasks(&mut container).unwrap();

        assert_eq!(ids.len(), 8);
        for id in ids {
            assert!(container.get(id).unwrap().settings().verbose);
        }
    }

    #[test]
    fn build_wide_skip_flows_into_tasks() {
        let mut toolkit = ToolkitExtension::new(test_artifacts());
        toolkit.skip(true);

        let mut container = TaskContainer::new();
        let ids = toolkit.register_schema_tasks(&mut container).unwrap();

        for id in ids {
            assert!(container.get(id).unwrap().settings().skip);
        }
    }

    #[test]
    fn schema_tool_override_beats_build_wide_skip() {
        let mut toolkit = ToolkitExtension::new(test_artifacts());
        toolkit.skip(true);
        toolkit.schema_tool().skip(false);

        let mut container = TaskContainer::new();
        let ids = toolkit.register_schema_tasks(&mut container).unwrap();

        for id in ids {
            assert!(!container.get(id).unwrap().settings().skip);
        }
    }
}
