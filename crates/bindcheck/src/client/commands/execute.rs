use clap::Parser;

use crate::client::globalsettings::GlobalSettings;
use crate::cluster::detect_cluster_name;
use crate::common::env::required_var;
use crate::probe::{ResourceProbe, SystemProbe};
use crate::transfer::comm::Communicator;
use crate::transfer::tcp::TcpCommunicator;
use crate::validate::distributed::DistributedBindingValidator;
use crate::validate::report::ReportTarget;
use crate::validate::single::{ClusterOrigin, SingleProcessValidator};
use crate::validate::verdict::Verdict;
use crate::validate::{validation_mode, ValidationMode};
use crate::workflow::{Scenario, WALLTIME};
use crate::ACTION_CLUSTER;

#[derive(Parser)]
pub struct ExecuteOpts {
    /// Name of the validated action
    pub action: String,

    /// Workspace directories the action is executed on
    #[arg(required = true)]
    pub directories: Vec<String>,
}

/// Cluster origin of a serial job. A failed detection is only logged so that
/// the binding is still reported.
fn cluster_origin(submitted: &str, detected: crate::Result<String>) -> Option<ClusterOrigin> {
    match detected {
        Ok(executed) => Some(ClusterOrigin {
            submitted: submitted.to_string(),
            executed,
        }),
        Err(error) => {
            log::warn!("Cannot verify the cluster `{submitted}` the job was submitted from: {error}");
            None
        }
    }
}

/// Validates one directory. `connect` is only invoked for distributed
/// validations.
pub async fn validate_directory<P, C, F>(
    probe: &P,
    mode: &ValidationMode,
    origin: Option<&ClusterOrigin>,
    target: &ReportTarget,
    connect: F,
) -> crate::Result<Option<Verdict>>
where
    P: ResourceProbe,
    C: Communicator,
    F: FnOnce(&ReportTarget) -> crate::Result<C>,
{
    match mode {
        ValidationMode::Single(shape) => SingleProcessValidator::new(probe)
            .with_origin(origin.cloned())
            .validate(shape, target)
            .map(Some),
        ValidationMode::Distributed(shape) => {
            let mut comm = connect(target)?;
            DistributedBindingValidator::new(probe)
                .validate(&mut comm, shape, target)
                .await
        }
    }
}

pub async fn command_execute(gsettings: &GlobalSettings, opts: ExecuteOpts) -> anyhow::Result<()> {
    let cluster_name = required_var(ACTION_CLUSTER)?;
    let catalog = gsettings.catalog()?;
    let spec = catalog.lookup(&cluster_name)?;
    let scenario: Scenario = opts.action.parse()?;
    let mode = validation_mode(scenario, spec)?;
    log::debug!(
        "Validating `{scenario}` on `{cluster_name}` within {}: {mode:?}",
        humantime::format_duration(WALLTIME)
    );

    let origin = match scenario {
        Scenario::Serial => cluster_origin(&cluster_name, detect_cluster_name()),
        _ => None,
    };

    let root = std::env::current_dir()?;
    let probe = SystemProbe;
    for directory in &opts.directories {
        let target = ReportTarget::new(&root, &cluster_name, directory, scenario.name());
        let verdict = validate_directory(&probe, &mode, origin.as_ref(), &target, |target| {
            TcpCommunicator::from_env(target.directory(), target.action())
        })
        .await?;
        if let Some(verdict) = verdict {
            gsettings.printer().print_verdict(&target.path(), &verdict);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{cluster_origin, validate_directory};
    use crate::common::error::BindCheckError;
    use crate::tests::utils::{cpu_report, read_report_tags, FakeProbe};
    use crate::transfer::local::{local_group, LocalCommunicator};
    use crate::validate::report::ReportTarget;
    use crate::validate::single::ClusterOrigin;
    use crate::validate::verdict::Tag;
    use crate::validate::{ExpectedShape, ValidationMode};

    fn no_group(_: &ReportTarget) -> crate::Result<LocalCommunicator> {
        panic!("single validation must not connect")
    }

    #[tokio::test]
    async fn test_single_does_not_connect() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "serial");
        let probe = FakeProbe::new(cpu_report("a001", &[3]));
        let verdict = validate_directory(
            &probe,
            &ValidationMode::Single(ExpectedShape::cpus(1, 1, 1)),
            None,
            &target,
            no_group,
        )
        .await
        .unwrap()
        .unwrap();
        assert!(verdict.is_passed());
        assert!(target.path().is_file());
    }

    #[tokio::test]
    async fn test_distributed_with_single_participant() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_subnode");
        let probe = FakeProbe::new(cpu_report("a001", &[0]));
        let result = validate_directory(
            &probe,
            &ValidationMode::Distributed(ExpectedShape::cpus(4, 1, 1)),
            None,
            &target,
            |_| Ok(local_group(1).remove(0)),
        )
        .await;
        assert!(matches!(
            result,
            Err(BindCheckError::Precondition {
                expected: 4,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_distributed_connect_error() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "mpi_subnode");
        let probe = FakeProbe::new(cpu_report("a001", &[0]));
        let result = validate_directory(
            &probe,
            &ValidationMode::Distributed(ExpectedShape::cpus(1, 1, 1)),
            None,
            &target,
            |_| -> crate::Result<LocalCommunicator> {
                Err(BindCheckError::MissingEnvironment("PMI_SIZE"))
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(BindCheckError::MissingEnvironment("PMI_SIZE"))
        ));
    }

    #[test]
    fn test_cluster_detection_failure_is_skipped() {
        let detected = Err(BindCheckError::GenericError("row: not found".to_string()));
        assert_eq!(cluster_origin("anvil", detected), None);
        assert_eq!(
            cluster_origin("anvil", Ok("delta".to_string())),
            Some(ClusterOrigin {
                submitted: "anvil".to_string(),
                executed: "delta".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_serial_detected_on_other_cluster() {
        let root = tempfile::tempdir().unwrap();
        let target = ReportTarget::new(root.path(), "anvil", "output", "serial");
        let probe = FakeProbe::new(cpu_report("a001", &[3]));
        let origin = cluster_origin("anvil", Ok("delta".to_string()));
        let verdict = validate_directory(
            &probe,
            &ValidationMode::Single(ExpectedShape::cpus(1, 1, 1)),
            origin.as_ref(),
            &target,
            no_group,
        )
        .await
        .unwrap()
        .unwrap();
        assert!(!verdict.is_passed());
        assert_eq!(read_report_tags(&target.path()), vec![Tag::Error]);
    }
}
