use std::path::Path;

use crate::client::commands::summary::ReportSummary;
use crate::client::output::outputs::Output;
use crate::cluster::ClusterCatalog;
use crate::common::format::format_duration;
use crate::validate::verdict::Verdict;
use crate::workflow::descriptor::WorkflowDescriptor;
use crate::Map;

#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    fn print(&self, data: serde_json::Value) {
        println!("{data:#}");
    }
}

impl Output for JsonOutput {
    fn print_cluster_list(&self, catalog: &ClusterCatalog) {
        let clusters: Map<&str, _> = catalog.iter().collect();
        self.print(serde_json::json!(clusters));
    }

    fn print_workflow_created(&self, path: &Path, descriptor: &WorkflowDescriptor) {
        let actions: Vec<_> = descriptor
            .actions
            .iter()
            .map(|action| {
                serde_json::json!({
                    "name": action.name,
                    "command": action.command_template,
                    "processes": action.processes_per_submission,
                    "threads_per_process": action.threads_per_process,
                    "gpus_per_process": action.gpus_per_process,
                    "launchers": action.launchers,
                    "walltime": format_duration(&action.walltime),
                })
            })
            .collect();
        self.print(serde_json::json!({
            "path": path,
            "cluster": descriptor.cluster_name,
            "account": descriptor.account,
            "setup": descriptor.setup,
            "actions": actions,
        }));
    }

    fn print_verdict(&self, path: &Path, verdict: &Verdict) {
        let lines: Vec<_> = verdict
            .lines()
            .iter()
            .map(|line| serde_json::json!({"tag": line.tag, "message": line.message}))
            .collect();
        self.print(serde_json::json!({
            "path": path,
            "passed": verdict.is_passed(),
            "lines": lines,
        }));
    }

    fn print_summary(&self, reports: &[ReportSummary]) {
        self.print(serde_json::json!(reports));
    }

    fn print_error(&self, error: anyhow::Error) {
        self.print(serde_json::json!({
            "error": format!("{error:?}"),
        }));
    }
}
