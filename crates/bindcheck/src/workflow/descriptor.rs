use std::time::Duration;

use crate::Set;

/// Placeholder substituted by the workflow manager with the directory the
/// action runs on.
pub const DIRECTORY_PLACEHOLDER: &str = "{directory}";

/// Resource request of one action, as submitted to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: String,
    /// Command executed by the workflow manager, contains [`DIRECTORY_PLACEHOLDER`].
    pub command_template: String,
    pub products: Vec<String>,
    pub launchers: Set<String>,
    pub processes_per_submission: u32,
    pub threads_per_process: u32,
    pub gpus_per_process: u32,
    pub walltime: Duration,
}

impl ActionDescriptor {
    pub fn command(&self, directory: &str) -> String {
        self.command_template
            .replace(DIRECTORY_PLACEHOLDER, directory)
    }
}

/// Everything written into `workflow.toml` for one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDescriptor {
    pub cluster_name: String,
    /// Workspace directory of the project, relative to the project root.
    pub workspace_path: String,
    pub account: Option<String>,
    pub setup: Option<String>,
    pub actions: Vec<ActionDescriptor>,
}

impl WorkflowDescriptor {
    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|action| action.name == name)
    }
}
