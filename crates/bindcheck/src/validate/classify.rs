//! Classification of observed resource bindings.
//!
//! Checks are evaluated host → cpu → gpu. Each check may add WARN lines and
//! mark a deficiency. The verdict ends with exactly one terminal line: the
//! first deficiency in the order cpu, host, gpu becomes an ERROR, otherwise
//! the verdict PASSED.

use std::fmt::{Display, Formatter};

use crate::common::format::{format_list, format_set};
use crate::probe::BindingReport;
use crate::validate::verdict::Verdict;
use crate::validate::ExpectedShape;
use crate::Set;

/// GPU column of a PASSED line when no GPUs were requested.
const NO_GPUS: &str = "[]";

#[derive(Debug, Copy, Clone)]
enum Resource {
    Cpus,
    Gpus,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Resource::Cpus => "cpus",
            Resource::Gpus => "GPUs",
        })
    }
}

/// Checks one resource dimension across all reports. Returns true when some
/// process got fewer items than `requested`.
fn check_sizes(
    verdict: &mut Verdict,
    resource: Resource,
    sizes: impl Iterator<Item = usize>,
    requested: u32,
    observed: &str,
) -> bool {
    let sizes: Set<usize> = sizes.collect();
    let min = sizes.first().copied().unwrap_or(0);
    let max = sizes.last().copied().unwrap_or(0);
    let requested = requested as usize;

    if sizes.len() > 1 {
        let name = match resource {
            Resource::Cpus => "cpusets",
            Resource::Gpus => "gpus",
        };
        verdict.warn(format!("{name} have different sizes: {observed}."));
    }
    if max > requested {
        verdict.warn(format!(
            "Allowed to run on more {resource} than requested: {observed}."
        ));
    }
    min < requested
}

fn format_cpusets(reports: &[BindingReport]) -> String {
    format_list(reports.iter().map(|r| format_set(&r.cpu_affinity)))
}

fn format_gpus(reports: &[BindingReport]) -> String {
    format_list(reports.iter().map(|r| format_list(&r.gpu_ids)))
}

/// Classifies the bindings of all processes of one job.
pub fn classify(reports: &[BindingReport], expected: &ExpectedShape) -> Verdict {
    let mut verdict = Verdict::default();

    let hostnames: Set<&str> = reports.iter().map(|r| r.hostname.as_str()).collect();
    let hosts = format_set(&hostnames);
    let n_hosts = expected.n_hosts as usize;
    if hostnames.len() > n_hosts {
        verdict.warn(format!(
            "Executing on more than {n_hosts} host(s): {hosts}."
        ));
    }
    let host_deficient = hostnames.len() < n_hosts;

    let cpusets = format_cpusets(reports);
    let cpu_deficient = check_sizes(
        &mut verdict,
        Resource::Cpus,
        reports.iter().map(|r| r.cpu_affinity.len()),
        expected.n_threads_per_process,
        &cpusets,
    );

    let checks_gpus = expected.n_gpus_per_process > 0;
    let gpus = if checks_gpus {
        format_gpus(reports)
    } else {
        NO_GPUS.to_string()
    };
    let gpu_deficient = checks_gpus
        && check_sizes(
            &mut verdict,
            Resource::Gpus,
            reports.iter().map(|r| r.gpu_ids.len()),
            expected.n_gpus_per_process,
            &gpus,
        );

    if cpu_deficient {
        verdict.error(format!("Not allowed to run on requested cpus: {cpusets}."));
    } else if host_deficient {
        verdict.error(format!(
            "Executing on fewer than {n_hosts} hosts: {hosts}."
        ));
    } else if gpu_deficient {
        verdict.error(format!("Not allowed to run on requested GPUs: {gpus}."));
    } else {
        verdict.passed(format!("{hosts} {cpusets} {gpus}"));
    }
    verdict
}

/// Classifies the binding of a single process. Only one dimension is checked:
/// the GPUs when any are requested, the cpus otherwise. Anything but an exact
/// match fails to pass.
pub fn classify_single(report: &BindingReport, expected: &ExpectedShape) -> Verdict {
    let (resource, size, requested, observed) = if expected.n_gpus_per_process > 0 {
        (
            Resource::Gpus,
            report.gpu_ids.len(),
            expected.n_gpus_per_process,
            format_list(&report.gpu_ids),
        )
    } else {
        (
            Resource::Cpus,
            report.cpu_affinity.len(),
            expected.n_threads_per_process,
            format_set(&report.cpu_affinity),
        )
    };

    let mut verdict = Verdict::default();
    let requested = requested as usize;
    if size > requested {
        verdict.warn(format!(
            "Allowed to run on more {resource} than requested: {observed}."
        ));
    } else if size < requested {
        verdict.error(format!(
            "Not allowed to run on requested {resource}: {observed}."
        ));
    } else {
        verdict.passed(observed);
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::{classify, classify_single};
    use crate::cluster::GpuArch;
    use crate::tests::utils::{cpu_report, gpu_report};
    use crate::validate::verdict::{Tag, Verdict};
    use crate::validate::ExpectedShape;
    use itertools::Itertools;

    fn tags(verdict: &Verdict) -> Vec<Tag> {
        verdict.lines().iter().map(|line| line.tag).collect()
    }

    fn render(verdict: &Verdict) -> String {
        verdict.lines().iter().join("\n")
    }

    #[test]
    fn test_one_core_per_process_passes() {
        let reports: Vec<_> = (0..4).map(|core| cpu_report("node1", &[core])).collect();
        let verdict = classify(&reports, &ExpectedShape::cpus(4, 1, 1));
        assert_eq!(tags(&verdict), vec![Tag::Passed]);
        assert_eq!(
            render(&verdict),
            "PASSED: {node1} [{0}, {1}, {2}, {3}] []"
        );
    }

    #[test]
    fn test_empty_affinity_is_cpu_error() {
        let reports = vec![
            cpu_report("node1", &[0]),
            cpu_report("node1", &[1]),
            cpu_report("node1", &[]),
            cpu_report("node1", &[3]),
        ];
        let verdict = classify(&reports, &ExpectedShape::cpus(4, 1, 1));
        assert_eq!(verdict.count(Tag::Error), 1);
        assert_eq!(verdict.count(Tag::Passed), 0);
        assert!(verdict
            .terminal()
            .unwrap()
            .message
            .starts_with("Not allowed to run on requested cpus"));
    }

    #[test]
    fn test_fewer_hosts_is_error() {
        let reports: Vec<_> = (0..4).map(|core| cpu_report("node1", &[core])).collect();
        let verdict = classify(&reports, &ExpectedShape::cpus(4, 1, 2));
        assert_eq!(tags(&verdict), vec![Tag::Error]);
        assert_eq!(
            render(&verdict),
            "ERROR: Executing on fewer than 2 hosts: {node1}."
        );
    }

    #[test]
    fn test_cpu_error_has_priority_over_hosts() {
        let reports = vec![cpu_report("node1", &[0]), cpu_report("node1", &[])];
        let verdict = classify(&reports, &ExpectedShape::cpus(2, 1, 2));
        assert_eq!(verdict.count(Tag::Error), 1);
        assert!(verdict
            .terminal()
            .unwrap()
            .message
            .starts_with("Not allowed to run on requested cpus"));
    }

    #[test]
    fn test_warnings_do_not_suppress_passed() {
        let reports = vec![
            cpu_report("node1", &[0]),
            cpu_report("node1", &[1]),
            cpu_report("node1", &[2]),
            cpu_report("node1", &[3, 4]),
        ];
        let verdict = classify(&reports, &ExpectedShape::cpus(4, 1, 1));
        insta::assert_snapshot!(render(&verdict), @r"
        WARN: cpusets have different sizes: [{0}, {1}, {2}, {3, 4}].
        WARN: Allowed to run on more cpus than requested: [{0}, {1}, {2}, {3, 4}].
        PASSED: {node1} [{0}, {1}, {2}, {3, 4}] []
        ");
    }

    #[test]
    fn test_wider_placement_warns() {
        let reports = vec![cpu_report("node1", &[0]), cpu_report("node2", &[0])];
        let verdict = classify(&reports, &ExpectedShape::cpus(2, 1, 1));
        assert_eq!(tags(&verdict), vec![Tag::Warn, Tag::Passed]);
        assert_eq!(
            verdict.lines()[0].message,
            "Executing on more than 1 host(s): {node1, node2}."
        );
    }

    #[test]
    fn test_host_error_has_priority_over_gpus() {
        let shape = ExpectedShape::cpus(2, 1, 2).with_gpus(1, GpuArch::Nvidia);
        let reports = vec![
            gpu_report("node1", &[0], &["a"]),
            gpu_report("node1", &[1], &[]),
        ];
        let verdict = classify(&reports, &shape);
        assert_eq!(tags(&verdict), vec![Tag::Warn, Tag::Error]);
        assert!(verdict
            .terminal()
            .unwrap()
            .message
            .starts_with("Executing on fewer than 2 hosts"));
    }

    #[test]
    fn test_missing_gpu_is_error() {
        let shape = ExpectedShape::cpus(2, 1, 1).with_gpus(1, GpuArch::Amd);
        let reports = vec![
            gpu_report("node1", &[0], &["0x1"]),
            gpu_report("node1", &[1], &[]),
        ];
        let verdict = classify(&reports, &shape);
        insta::assert_snapshot!(render(&verdict), @r"
        WARN: gpus have different sizes: [[0x1], []].
        ERROR: Not allowed to run on requested GPUs: [[0x1], []].
        ");
    }

    #[test]
    fn test_gpus_ignored_when_not_requested() {
        let reports = vec![gpu_report("node1", &[0], &["a", "b"])];
        let verdict = classify(&reports, &ExpectedShape::cpus(1, 1, 1));
        assert_eq!(tags(&verdict), vec![Tag::Passed]);
    }

    #[test]
    fn test_extra_gpus_warn() {
        let shape = ExpectedShape::cpus(2, 1, 1).with_gpus(1, GpuArch::Nvidia);
        let reports = vec![
            gpu_report("node1", &[0], &["a", "b"]),
            gpu_report("node1", &[1], &["a", "b"]),
        ];
        let verdict = classify(&reports, &shape);
        assert_eq!(tags(&verdict), vec![Tag::Warn, Tag::Passed]);
        assert_eq!(
            verdict.terminal().unwrap().message,
            "{node1} [{0}, {1}] [[a, b], [a, b]]"
        );
    }

    #[test]
    fn test_no_reports_is_cpu_error() {
        let verdict = classify(&[], &ExpectedShape::cpus(1, 1, 1));
        assert_eq!(tags(&verdict), vec![Tag::Error]);
    }

    #[test]
    fn test_single_exact_passes() {
        let verdict = classify_single(&cpu_report("n", &[4, 5, 6, 7]), &ExpectedShape::cpus(1, 4, 1));
        assert_eq!(render(&verdict), "PASSED: {4, 5, 6, 7}");
    }

    #[test]
    fn test_single_more_cpus_only_warns() {
        let verdict = classify_single(&cpu_report("n", &[0, 1]), &ExpectedShape::cpus(1, 1, 1));
        assert_eq!(
            render(&verdict),
            "WARN: Allowed to run on more cpus than requested: {0, 1}."
        );
    }

    #[test]
    fn test_single_fewer_cpus_is_error() {
        let verdict = classify_single(&cpu_report("n", &[0]), &ExpectedShape::cpus(1, 4, 1));
        assert_eq!(
            render(&verdict),
            "ERROR: Not allowed to run on requested cpus: {0}."
        );
    }

    #[test]
    fn test_single_checks_gpus_when_requested() {
        let shape = ExpectedShape::cpus(1, 1, 1).with_gpus(2, GpuArch::Nvidia);
        let verdict = classify_single(&gpu_report("n", &[0, 1, 2], &["a", "b"]), &shape);
        assert_eq!(render(&verdict), "PASSED: [a, b]");

        let verdict = classify_single(&gpu_report("n", &[0], &["a"]), &shape);
        assert_eq!(
            render(&verdict),
            "ERROR: Not allowed to run on requested GPUs: [a]."
        );
    }
}
