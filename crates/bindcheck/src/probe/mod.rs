pub mod amd;
pub mod nvidia;

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::cluster::GpuArch;
use crate::common::error::BindCheckError;
use crate::Set;

pub type CoreId = usize;

/// Resources observed by one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingReport {
    pub hostname: String,
    pub cpu_affinity: Set<CoreId>,
    pub gpu_ids: Vec<String>,
}

/// Queries the resources visible to the calling process.
pub trait ResourceProbe {
    fn hostname(&self) -> crate::Result<String>;

    /// Cores the calling process is allowed to run on.
    fn affinity(&self) -> crate::Result<Set<CoreId>>;

    /// Identifiers of the accelerators visible to the calling process.
    fn accelerators(&self, arch: GpuArch) -> crate::Result<Vec<String>>;

    /// Collects a full report. Accelerators are only enumerated when `gpu_arch`
    /// is given.
    fn report(&self, gpu_arch: Option<GpuArch>) -> crate::Result<BindingReport> {
        let gpu_ids = match gpu_arch {
            Some(arch) => self.accelerators(arch)?,
            None => Vec::new(),
        };
        Ok(BindingReport {
            hostname: self.hostname()?,
            cpu_affinity: self.affinity()?,
            gpu_ids,
        })
    }
}

/// Probe backed by the operating system and the vendor tools.
#[derive(Default)]
pub struct SystemProbe;

impl ResourceProbe for SystemProbe {
    fn hostname(&self) -> crate::Result<String> {
        gethostname::gethostname()
            .into_string()
            .map_err(|name| BindCheckError::Probe(format!("Invalid hostname {name:?}")))
    }

    fn affinity(&self) -> crate::Result<Set<CoreId>> {
        read_affinity()
    }

    fn accelerators(&self, arch: GpuArch) -> crate::Result<Vec<String>> {
        let gpus = match arch {
            GpuArch::None => Vec::new(),
            GpuArch::Nvidia => nvidia::get_nvidia_gpus()?,
            GpuArch::Amd => amd::get_amd_gpus()?,
        };
        log::debug!("Detected {} {arch} GPU(s): {gpus:?}", gpus.len());
        Ok(gpus)
    }
}

#[cfg(target_os = "linux")]
fn read_affinity() -> crate::Result<Set<CoreId>> {
    use nix::sched::{sched_getaffinity, CpuSet};
    use nix::unistd::Pid;

    let cpuset = sched_getaffinity(Pid::from_raw(0))
        .map_err(|error| BindCheckError::Probe(format!("sched_getaffinity failed: {error}")))?;
    let mut cores = Set::new();
    for core in 0..CpuSet::count() {
        if cpuset.is_set(core).unwrap_or(false) {
            cores.insert(core);
        }
    }
    Ok(cores)
}

#[cfg(not(target_os = "linux"))]
fn read_affinity() -> crate::Result<Set<CoreId>> {
    let cores = core_affinity::get_core_ids()
        .ok_or_else(|| BindCheckError::Probe("Cannot read core ids".to_string()))?;
    Ok(cores.into_iter().map(|core| core.id).collect())
}

/// Runs a vendor listing tool and returns its standard output.
pub(crate) fn run_tool(program: &str, args: &[&str]) -> crate::Result<String> {
    log::debug!("Running `{program} {}`", args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|error| BindCheckError::Probe(format!("Cannot execute {program}: {error:?}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BindCheckError::Probe(format!(
            "{program} exited with error code {}\nStdout: {stdout}\nStderr: {stderr}",
            output.status
        )));
    }
    Ok(stdout.into_owned())
}

#[cfg(test)]
mod tests {
    use super::{ResourceProbe, SystemProbe};
    use crate::cluster::GpuArch;

    #[test]
    fn test_system_affinity_is_not_empty() {
        let cores = SystemProbe.affinity().unwrap();
        assert!(!cores.is_empty());
    }

    #[test]
    fn test_report_without_gpus() {
        let report = SystemProbe.report(None).unwrap();
        assert!(!report.hostname.is_empty());
        assert!(report.gpu_ids.is_empty());
        assert_eq!(report.cpu_affinity, SystemProbe.affinity().unwrap());
    }

    #[test]
    fn test_no_gpu_arch_has_no_accelerators() {
        assert!(SystemProbe.accelerators(GpuArch::None).unwrap().is_empty());
    }

    #[test]
    fn test_missing_tool_is_probe_error() {
        let error = super::run_tool("bindcheck-surely-missing-tool", &[]).unwrap_err();
        assert!(matches!(error, crate::Error::Probe(_)));
    }
}
