use crate::common::error::BindCheckError;
use crate::probe::ResourceProbe;
use crate::transfer::comm::Communicator;
use crate::validate::classify::classify;
use crate::validate::report::ReportTarget;
use crate::validate::verdict::Verdict;
use crate::validate::ExpectedShape;

/// Validates jobs made of several cooperating processes. Every process probes
/// its own binding, the coordinator classifies all of them and writes the
/// report.
pub struct DistributedBindingValidator<'a, P> {
    probe: &'a P,
}

impl<'a, P: ResourceProbe> DistributedBindingValidator<'a, P> {
    pub fn new(probe: &'a P) -> Self {
        Self { probe }
    }

    /// Returns the verdict on the coordinator and `None` everywhere else.
    pub async fn validate<C: Communicator>(
        &self,
        comm: &mut C,
        expected: &ExpectedShape,
        target: &ReportTarget,
    ) -> crate::Result<Option<Verdict>> {
        if comm.size() != expected.n_processes {
            return Err(BindCheckError::Precondition {
                expected: expected.n_processes,
                actual: comm.size(),
            });
        }

        let report = match self.probe.report(expected.probed_gpu_arch()) {
            Ok(report) => report,
            Err(error) => {
                if let Err(abort_error) = comm.abort(error.to_string()).await {
                    log::warn!("Cannot notify the other processes: {abort_error}");
                }
                return Err(error);
            }
        };
        log::debug!("Rank {} observed binding: {report:?}", comm.rank());

        let Some(reports) = comm.gather(report).await? else {
            return Ok(None);
        };
        let verdict = classify(&reports, expected);
        target.write(&verdict)?;
        Ok(Some(verdict))
    }
}

#[cfg(test)]
mod tests {
    use futures::future::join_all;

    use super::DistributedBindingValidator;
    use crate::common::error::BindCheckError;
    use crate::tests::utils::{cpu_report, read_report_tags, FakeProbe};
    use crate::transfer::local::local_group;
    use crate::validate::report::ReportTarget;
    use crate::validate::verdict::{Tag, Verdict};
    use crate::validate::ExpectedShape;

    async fn run_group(
        probes: &[FakeProbe],
        expected: ExpectedShape,
        target: &ReportTarget,
    ) -> Vec<crate::Result<Option<Verdict>>> {
        let group = local_group(probes.len() as u32);
        join_all(group.into_iter().zip(probes).map(|(mut comm, probe)| async move {
            DistributedBindingValidator::new(probe)
                .validate(&mut comm, &expected, target)
                .await
        }))
        .await
    }

    #[tokio::test]
    async fn test_coordinator_writes_report() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_subnode");
        let probes: Vec<_> = (0..4)
            .map(|core| FakeProbe::new(cpu_report("a001", &[core])))
            .collect();

        let mut results = run_group(&probes, ExpectedShape::cpus(4, 1, 1), &target).await;
        let verdict = results.remove(0).unwrap().unwrap();
        assert_eq!(
            verdict.terminal().unwrap().to_string(),
            "PASSED: {a001} [{0}, {1}, {2}, {3}] []"
        );
        assert!(results.into_iter().all(|r| matches!(r, Ok(None))));
        assert_eq!(read_report_tags(&target.path()), vec![Tag::Passed]);
    }

    #[tokio::test]
    async fn test_wrong_process_count_fails_everywhere() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_subnode");
        let probes: Vec<_> = (0..3)
            .map(|core| FakeProbe::new(cpu_report("a001", &[core])))
            .collect();

        let results = run_group(&probes, ExpectedShape::cpus(4, 1, 1), &target).await;
        assert!(results.iter().all(|r| matches!(
            r,
            Err(BindCheckError::Precondition {
                expected: 4,
                actual: 3
            })
        )));
        assert!(!target.path().exists());
    }

    #[tokio::test]
    async fn test_probe_failure_aborts_coordinator() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_subnode");
        let probes = vec![
            FakeProbe::new(cpu_report("a001", &[0])),
            FakeProbe::new(cpu_report("a001", &[1])),
            FakeProbe::failing(),
            FakeProbe::new(cpu_report("a001", &[3])),
        ];

        let results = run_group(&probes, ExpectedShape::cpus(4, 1, 1), &target).await;
        assert!(matches!(
            &results[0],
            Err(BindCheckError::Aborted { rank: 2, .. })
        ));
        assert!(matches!(&results[2], Err(BindCheckError::Probe(_))));
        assert!(!target.path().exists());
    }

    #[tokio::test]
    async fn test_deficient_binding_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_threads_subnode");
        let probes = vec![
            FakeProbe::new(cpu_report("a001", &[0, 1, 2, 3])),
            FakeProbe::new(cpu_report("a001", &[4, 5])),
        ];

        let mut results = run_group(&probes, ExpectedShape::cpus(2, 4, 1), &target).await;
        let verdict = results.remove(0).unwrap().unwrap();
        assert!(!verdict.is_passed());
        assert_eq!(
            read_report_tags(&target.path()),
            vec![Tag::Warn, Tag::Error]
        );
    }
}
