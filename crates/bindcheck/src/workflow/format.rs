use serde::Serialize;

use crate::common::format::format_duration;
use crate::workflow::descriptor::{ActionDescriptor, WorkflowDescriptor};
use crate::Map;

#[derive(Serialize)]
struct WorkflowFile<'a> {
    workspace: WorkspaceSection<'a>,
    default: DefaultSection<'a>,
    action: Vec<ActionSection<'a>>,
}

#[derive(Serialize)]
struct WorkspaceSection<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct DefaultSection<'a> {
    action: DefaultActionSection<'a>,
}

#[derive(Serialize)]
struct DefaultActionSection<'a> {
    submit_options: Map<&'a str, SubmitOptions<'a>>,
}

#[derive(Serialize)]
struct SubmitOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    setup: Option<&'a str>,
}

#[derive(Serialize)]
struct ActionSection<'a> {
    name: &'a str,
    command: &'a str,
    products: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    launchers: Vec<&'a str>,
    resources: ResourcesSection,
}

#[derive(Serialize)]
struct ResourcesSection {
    #[serde(skip_serializing_if = "is_single")]
    threads_per_process: u32,
    #[serde(skip_serializing_if = "is_zero")]
    gpus_per_process: u32,
    processes: PerSubmission<u32>,
    walltime: PerSubmission<String>,
}

#[derive(Serialize)]
struct PerSubmission<T> {
    per_submission: T,
}

fn is_single(value: &u32) -> bool {
    *value == 1
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl<'a> From<&'a ActionDescriptor> for ActionSection<'a> {
    fn from(action: &'a ActionDescriptor) -> Self {
        ActionSection {
            name: &action.name,
            command: &action.command_template,
            products: &action.products,
            launchers: action.launchers.iter().map(|l| l.as_str()).collect(),
            resources: ResourcesSection {
                threads_per_process: action.threads_per_process,
                gpus_per_process: action.gpus_per_process,
                processes: PerSubmission {
                    per_submission: action.processes_per_submission,
                },
                walltime: PerSubmission {
                    per_submission: format_duration(&action.walltime),
                },
            },
        }
    }
}

/// Renders the descriptor in the `workflow.toml` format understood by the
/// workflow manager.
pub fn format_workflow(descriptor: &WorkflowDescriptor) -> crate::Result<String> {
    let file = WorkflowFile {
        workspace: WorkspaceSection {
            path: &descriptor.workspace_path,
        },
        default: DefaultSection {
            action: DefaultActionSection {
                submit_options: [(
                    descriptor.cluster_name.as_str(),
                    SubmitOptions {
                        account: descriptor.account.as_deref(),
                        setup: descriptor.setup.as_deref(),
                    },
                )]
                .into(),
            },
        },
        action: descriptor.actions.iter().map(ActionSection::from).collect(),
    };
    Ok(toml::to_string(&file)?)
}
