use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use crate::client::globalsettings::GlobalSettings;
use crate::validate::verdict::Tag;
use crate::workflow::Scenario;

#[derive(Parser)]
pub struct SummaryOpts {
    /// Directory searched for reports
    #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub path: PathBuf,
}

/// Tag counts of one report file.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub errors: usize,
    pub warnings: usize,
    pub passed: usize,
}

impl ReportSummary {
    pub fn from_content(path: PathBuf, content: &str) -> Self {
        let mut summary = ReportSummary {
            path,
            errors: 0,
            warnings: 0,
            passed: 0,
        };
        for tag in content.lines().filter_map(Tag::from_line) {
            match tag {
                Tag::Error => summary.errors += 1,
                Tag::Warn => summary.warnings += 1,
                Tag::Passed => summary.passed += 1,
            }
        }
        summary
    }

    /// A report fails when it has an error or was never completed.
    pub fn is_failing(&self) -> bool {
        self.errors > 0 || self.passed == 0
    }
}

fn is_report(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "out")
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.parse::<Scenario>().is_ok())
}

fn collect_reports(directory: &Path, reports: &mut Vec<PathBuf>) -> crate::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_reports(&path, reports)?;
        } else if is_report(&path) {
            reports.push(path);
        }
    }
    Ok(())
}

/// Summarizes every report below `root`, ordered by path.
pub fn summarize_reports(root: &Path) -> crate::Result<Vec<ReportSummary>> {
    let mut paths = Vec::new();
    collect_reports(root, &mut paths)?;
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)?;
            let display = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            Ok(ReportSummary::from_content(display, &content))
        })
        .collect()
}

pub fn command_summary(gsettings: &GlobalSettings, opts: SummaryOpts) -> anyhow::Result<()> {
    let reports = summarize_reports(&opts.path)?;
    if reports.is_empty() {
        log::warn!("No reports found in {}", opts.path.display());
        return Ok(());
    }
    gsettings.printer().print_summary(&reports);

    let failing = reports.iter().filter(|report| report.is_failing()).count();
    if failing > 0 {
        anyhow::bail!("{failing} of {} reports did not pass", reports.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{summarize_reports, ReportSummary};

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_count_tags() {
        let summary = ReportSummary::from_content(
            PathBuf::from("serial.out"),
            "WARN: a\nWARN: b\nPASSED: {0}\n",
        );
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.passed, 1);
        assert!(!summary.is_failing());
    }

    #[test]
    fn test_failing_reports() {
        let error = ReportSummary::from_content(PathBuf::new(), "ERROR: x\n");
        assert!(error.is_failing());
        let incomplete = ReportSummary::from_content(PathBuf::new(), "WARN: x\n");
        assert!(incomplete.is_failing());
        let empty = ReportSummary::from_content(PathBuf::new(), "");
        assert!(empty.is_failing());
    }

    #[test]
    fn test_summarize_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "delta/output/threads.out", "PASSED: {0, 1, 2, 3}\n");
        write(
            dir.path(),
            "delta/output/mpi_subnode.out",
            "ERROR: Not allowed to run on requested cpus: [{0}, {}].\n",
        );
        write(dir.path(), "slurm-1234.out", "job log\n");
        write(dir.path(), "delta/output/notes.txt", "PASSED: x\n");

        let reports = summarize_reports(dir.path()).unwrap();
        let paths: Vec<_> = reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("delta/output/mpi_subnode.out"),
                PathBuf::from("delta/output/threads.out"),
            ]
        );
        assert!(reports[0].is_failing());
        assert!(!reports[1].is_failing());
    }
}
