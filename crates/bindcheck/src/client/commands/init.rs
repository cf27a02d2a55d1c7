use std::path::{Path, PathBuf};

use clap::Parser;

use crate::client::globalsettings::GlobalSettings;
use crate::cluster::{detect_cluster_name, ClusterCatalog};
use crate::workflow::builder::{WorkflowDescriptorBuilder, DEFAULT_PROGRAM};
use crate::workflow::descriptor::WorkflowDescriptor;
use crate::workflow::format::format_workflow;

pub const WORKFLOW_FILE: &str = "workflow.toml";

/// Directory of the workspace every action is executed on.
pub const OUTPUT_DIRECTORY: &str = "output";

#[derive(Parser)]
pub struct InitOpts {
    /// Name of the cluster. Detected with `row show cluster --name` when omitted
    #[arg(long)]
    pub cluster: Option<String>,

    /// Account charged for the submitted jobs
    #[arg(long)]
    pub account: Option<String>,

    /// Shell commands executed before every action
    #[arg(long)]
    pub setup: Option<String>,

    /// Command used to invoke this program inside the jobs
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    pub program: String,

    /// Project directory where the workflow definition is created
    #[arg(long, value_hint = clap::ValueHint::DirPath, default_value = ".")]
    pub directory: PathBuf,
}

/// Writes the workflow definition of `cluster_name` into `project` and prepares
/// its workspace. Returns the path of the written definition.
pub fn create_workflow(
    catalog: &ClusterCatalog,
    cluster_name: &str,
    project: &Path,
    opts: InitOpts,
) -> crate::Result<(PathBuf, WorkflowDescriptor)> {
    let spec = catalog.lookup(cluster_name)?;
    let descriptor = WorkflowDescriptorBuilder::new(opts.program).build(
        cluster_name,
        spec,
        opts.account,
        opts.setup,
    );
    log::debug!(
        "{} actions are feasible on cluster `{cluster_name}`",
        descriptor.actions.len()
    );
    if descriptor.actions.is_empty() {
        log::warn!("No action can be validated on cluster `{cluster_name}`");
    }

    let path = project.join(WORKFLOW_FILE);
    std::fs::create_dir_all(project)?;
    std::fs::write(&path, format_workflow(&descriptor)?)?;

    let workspace = project
        .join(&descriptor.workspace_path)
        .join(OUTPUT_DIRECTORY);
    std::fs::create_dir_all(&workspace)?;
    log::info!("Workspace directory {} created", workspace.display());
    Ok((path, descriptor))
}

pub fn command_init(gsettings: &GlobalSettings, opts: InitOpts) -> anyhow::Result<()> {
    let catalog = gsettings.catalog()?;
    let cluster_name = match &opts.cluster {
        Some(name) => name.clone(),
        None => detect_cluster_name()?,
    };
    let project = opts.directory.clone();
    let (path, descriptor) = create_workflow(&catalog, &cluster_name, &project, opts)?;
    gsettings.printer().print_workflow_created(&path, &descriptor);
    Ok(())
}
