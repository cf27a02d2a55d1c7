pub mod classify;
pub mod distributed;
pub mod report;
pub mod single;
pub mod verdict;

use crate::cluster::{ClusterSpec, GpuArch};
use crate::common::error::BindCheckError;
use crate::workflow::builder::scenario_request;
use crate::workflow::{Scenario, N_NODES};

/// Resources a validated job is expected to have been granted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedShape {
    pub n_processes: u32,
    pub n_threads_per_process: u32,
    pub n_hosts: u32,
    pub n_gpus_per_process: u32,
    pub gpu_arch: GpuArch,
}

impl ExpectedShape {
    pub fn cpus(n_processes: u32, n_threads_per_process: u32, n_hosts: u32) -> Self {
        Self {
            n_processes,
            n_threads_per_process,
            n_hosts,
            n_gpus_per_process: 0,
            gpu_arch: GpuArch::None,
        }
    }

    pub fn with_gpus(mut self, n_gpus_per_process: u32, gpu_arch: GpuArch) -> Self {
        self.n_gpus_per_process = n_gpus_per_process;
        self.gpu_arch = gpu_arch;
        self
    }

    /// Architecture whose accelerators have to be enumerated, if any.
    pub fn probed_gpu_arch(&self) -> Option<GpuArch> {
        (self.n_gpus_per_process > 0).then_some(self.gpu_arch)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationMode {
    /// One process checks its own binding.
    Single(ExpectedShape),
    /// All processes of the job gather their bindings on the coordinator.
    Distributed(ExpectedShape),
}

impl ValidationMode {
    pub fn shape(&self) -> &ExpectedShape {
        match self {
            ValidationMode::Single(shape) | ValidationMode::Distributed(shape) => shape,
        }
    }
}

/// How an action is validated on a cluster.
///
/// Derived from the same request the workflow was generated from, so an action
/// that is not feasible on `spec` is rejected.
pub fn validation_mode(scenario: Scenario, spec: &ClusterSpec) -> crate::Result<ValidationMode> {
    let request = scenario_request(scenario, spec)
        .ok_or_else(|| BindCheckError::InfeasibleAction(scenario.name().to_string()))?;
    let n_hosts = match scenario {
        Scenario::MpiMultinode | Scenario::MpiThreadsMultinode => N_NODES,
        _ => 1,
    };
    let mut shape = ExpectedShape::cpus(request.processes, request.threads_per_process, n_hosts);
    if request.gpus_per_process > 0 {
        shape = shape.with_gpus(request.gpus_per_process, spec.gpu_arch);
    }
    Ok(if request.mpi {
        ValidationMode::Distributed(shape)
    } else {
        ValidationMode::Single(shape)
    })
}
