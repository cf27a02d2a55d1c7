use std::path::Path;

use crate::client::commands::summary::ReportSummary;
use crate::cluster::ClusterCatalog;
use crate::validate::verdict::Verdict;
use crate::workflow::descriptor::WorkflowDescriptor;

#[derive(clap::ValueEnum, Clone)]
pub enum Outputs {
    CLI,
    JSON,
}

pub trait Output {
    // Clusters
    fn print_cluster_list(&self, catalog: &ClusterCatalog);

    // Workflow
    fn print_workflow_created(&self, path: &Path, descriptor: &WorkflowDescriptor);

    // Reports
    fn print_verdict(&self, path: &Path, verdict: &Verdict);
    fn print_summary(&self, reports: &[ReportSummary]);

    // Errors
    fn print_error(&self, error: anyhow::Error);
}
