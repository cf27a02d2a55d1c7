pub mod builder;
pub mod descriptor;
pub mod format;

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::common::error::BindCheckError;

/// Threads requested by threaded scenarios.
pub const N_THREADS: u32 = 4;
/// GPUs requested by the multi-GPU scenario.
pub const N_GPUS: u32 = 2;
/// Processes requested by sub-node MPI scenarios.
pub const N_PROCESSES: u32 = 4;
/// Nodes requested by multi-node MPI scenarios.
pub const N_NODES: u32 = 2;

pub const WALLTIME: Duration = Duration::from_secs(5 * 60);

pub const MPI_LAUNCHER: &str = "mpi";

/// Resource-binding scenarios, in the order in which they are emitted into
/// the workflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scenario {
    Serial,
    Threads,
    MpiSubnode,
    MpiThreadsSubnode,
    MpiMultinode,
    MpiThreadsMultinode,
    NvidiaGpu,
    NvidiaGpus,
    MpiNvidiaGpus,
    MpiWholenodeAmdGpus,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::Serial,
        Scenario::Threads,
        Scenario::MpiSubnode,
        Scenario::MpiThreadsSubnode,
        Scenario::MpiMultinode,
        Scenario::MpiThreadsMultinode,
        Scenario::NvidiaGpu,
        Scenario::NvidiaGpus,
        Scenario::MpiNvidiaGpus,
        Scenario::MpiWholenodeAmdGpus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Serial => "serial",
            Scenario::Threads => "threads",
            Scenario::MpiSubnode => "mpi_subnode",
            Scenario::MpiThreadsSubnode => "mpi_threads_subnode",
            Scenario::MpiMultinode => "mpi_multinode",
            Scenario::MpiThreadsMultinode => "mpi_threads_multinode",
            Scenario::NvidiaGpu => "nvidia_gpu",
            Scenario::NvidiaGpus => "nvidia_gpus",
            Scenario::MpiNvidiaGpus => "mpi_nvidia_gpus",
            Scenario::MpiWholenodeAmdGpus => "mpi_wholenode_amd_gpus",
        }
    }

    /// Name of the report file written by the scenario.
    pub fn product(&self) -> String {
        format!("{}.out", self.name())
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = BindCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| BindCheckError::UnknownAction(s.to_string()))
    }
}
