use std::path::Path;

use cli_table::format::{Justify, Separator};
use cli_table::{print_stdout, Cell, CellStruct, Color, ColorChoice, Style, Table, TableStruct};
use colored::Color as Colorization;
use colored::Colorize;
use itertools::Itertools;

use crate::client::commands::summary::ReportSummary;
use crate::client::output::outputs::Output;
use crate::cluster::ClusterCatalog;
use crate::common::format::format_duration;
use crate::validate::verdict::{Tag, Verdict};
use crate::workflow::descriptor::WorkflowDescriptor;

pub const TAG_COLOR_ERROR: Colorization = Colorization::Red;
pub const TAG_COLOR_WARN: Colorization = Colorization::Yellow;
pub const TAG_COLOR_PASSED: Colorization = Colorization::Green;

pub struct CliOutput {
    color_policy: ColorChoice,
}

impl CliOutput {
    /// Tables and `colored` strings follow the same decision.
    pub fn new(colors: bool) -> CliOutput {
        colored::control::set_override(colors);
        let color_policy = if colors {
            ColorChoice::AlwaysAnsi
        } else {
            ColorChoice::Never
        };
        CliOutput { color_policy }
    }

    fn print_horizontal_table(&self, rows: Vec<Vec<CellStruct>>, header: Vec<CellStruct>) {
        let table = rows
            .table()
            .separator(
                Separator::builder()
                    .title(Some(Default::default()))
                    .column(Some(Default::default()))
                    .build(),
            )
            .title(header);
        self.print_table(table);
    }

    fn print_table(&self, table: TableStruct) {
        let table = table.color_choice(self.color_policy);
        if let Err(e) = print_stdout(table) {
            log::error!("Cannot print table to stdout: {e:?}");
        }
    }
}

fn tag_color(tag: Tag) -> Colorization {
    match tag {
        Tag::Error => TAG_COLOR_ERROR,
        Tag::Warn => TAG_COLOR_WARN,
        Tag::Passed => TAG_COLOR_PASSED,
    }
}

fn count_cell(count: usize, color: Color) -> CellStruct {
    let cell = count.cell().justify(Justify::Right);
    if count > 0 {
        cell.foreground_color(Some(color))
    } else {
        cell
    }
}

impl Output for CliOutput {
    fn print_cluster_list(&self, catalog: &ClusterCatalog) {
        let rows: Vec<_> = catalog
            .iter()
            .map(|(name, spec)| {
                vec![
                    name.cell(),
                    spec.cpus_per_node.cell().justify(Justify::Right),
                    spec.gpus_per_node.cell().justify(Justify::Right),
                    spec.gpu_arch.cell(),
                    if spec.has_shared { "yes" } else { "no" }.cell(),
                ]
            })
            .collect();
        let header = vec![
            "Name".cell().bold(true),
            "CPUs/node".cell().bold(true),
            "GPUs/node".cell().bold(true),
            "GPU arch".cell().bold(true),
            "Shared".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_workflow_created(&self, path: &Path, descriptor: &WorkflowDescriptor) {
        println!(
            "Workflow for cluster {} written to {}",
            descriptor.cluster_name.bold(),
            path.display()
        );
        let rows: Vec<_> = descriptor
            .actions
            .iter()
            .map(|action| {
                vec![
                    action.name.as_str().cell(),
                    action.processes_per_submission.cell().justify(Justify::Right),
                    action.threads_per_process.cell().justify(Justify::Right),
                    action.gpus_per_process.cell().justify(Justify::Right),
                    action.launchers.iter().join(", ").cell(),
                    format_duration(&action.walltime).cell(),
                ]
            })
            .collect();
        let header = vec![
            "Action".cell().bold(true),
            "Processes".cell().bold(true),
            "Threads".cell().bold(true),
            "GPUs".cell().bold(true),
            "Launchers".cell().bold(true),
            "Walltime".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_verdict(&self, path: &Path, verdict: &Verdict) {
        println!("{}", path.display().to_string().bold());
        for line in verdict.lines() {
            println!(
                "{}: {}",
                line.tag.as_str().color(tag_color(line.tag)),
                line.message
            );
        }
    }

    fn print_summary(&self, reports: &[ReportSummary]) {
        let rows: Vec<_> = reports
            .iter()
            .map(|report| {
                let status = if report.is_failing() {
                    "FAILED".cell().foreground_color(Some(Color::Red))
                } else {
                    "OK".cell().foreground_color(Some(Color::Green))
                };
                vec![
                    report.path.display().cell(),
                    count_cell(report.errors, Color::Red),
                    count_cell(report.warnings, Color::Yellow),
                    count_cell(report.passed, Color::Green),
                    status,
                ]
            })
            .collect();
        let header = vec![
            "Report".cell().bold(true),
            "ERROR".cell().bold(true),
            "WARN".cell().bold(true),
            "PASSED".cell().bold(true),
            "Status".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_error(&self, error: anyhow::Error) {
        log::error!("{error:?}");
    }
}
