use crate::cluster::{ClusterSpec, GpuArch};
use crate::workflow::descriptor::{ActionDescriptor, WorkflowDescriptor, DIRECTORY_PLACEHOLDER};
use crate::workflow::{Scenario, MPI_LAUNCHER, N_GPUS, N_NODES, N_PROCESSES, N_THREADS, WALLTIME};

pub const DEFAULT_PROGRAM: &str = "bindcheck";

/// Resources a scenario asks for on a given cluster.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScenarioRequest {
    pub processes: u32,
    pub threads_per_process: u32,
    pub gpus_per_process: u32,
    pub mpi: bool,
}

impl ScenarioRequest {
    fn cpus(processes: u32, threads_per_process: u32, mpi: bool) -> Self {
        Self {
            processes,
            threads_per_process,
            gpus_per_process: 0,
            mpi,
        }
    }

    fn gpus(processes: u32, gpus_per_process: u32, mpi: bool) -> Self {
        Self {
            processes,
            threads_per_process: 1,
            gpus_per_process,
            mpi,
        }
    }
}

/// Returns the request of `scenario` when it is feasible on `spec`.
pub fn scenario_request(scenario: Scenario, spec: &ClusterSpec) -> Option<ScenarioRequest> {
    let cpus = spec.cpus_per_node;
    let gpus = spec.gpus_per_node;
    let shared = spec.has_shared;
    let nvidia = spec.gpu_arch == GpuArch::Nvidia;

    match scenario {
        Scenario::Serial => (shared && cpus >= 1).then(|| ScenarioRequest::cpus(1, 1, false)),
        Scenario::Threads => {
            (shared && cpus >= N_THREADS).then(|| ScenarioRequest::cpus(1, N_THREADS, false))
        }
        Scenario::MpiSubnode => {
            (shared && cpus >= N_PROCESSES).then(|| ScenarioRequest::cpus(N_PROCESSES, 1, true))
        }
        Scenario::MpiThreadsSubnode => (shared && cpus >= N_PROCESSES * N_THREADS)
            .then(|| ScenarioRequest::cpus(N_PROCESSES, N_THREADS, true)),
        // Clusters whose total core count does not fit the request are infeasible.
        Scenario::MpiMultinode => N_NODES
            .checked_mul(cpus)
            .filter(|_| cpus >= 1)
            .map(|cores| ScenarioRequest::cpus(cores, 1, true)),
        // Uneven division would silently change the number of requested cores.
        Scenario::MpiThreadsMultinode => N_NODES
            .checked_mul(cpus)
            .filter(|_| cpus >= 1 && cpus % N_THREADS == 0)
            .map(|cores| ScenarioRequest::cpus(cores / N_THREADS, N_THREADS, true)),
        Scenario::NvidiaGpu => {
            (shared && nvidia && gpus >= 1).then(|| ScenarioRequest::gpus(1, 1, false))
        }
        Scenario::NvidiaGpus => {
            (shared && nvidia && gpus >= N_GPUS).then(|| ScenarioRequest::gpus(1, N_GPUS, false))
        }
        Scenario::MpiNvidiaGpus => {
            (shared && nvidia && gpus >= 1).then(|| ScenarioRequest::gpus(N_PROCESSES, 1, true))
        }
        Scenario::MpiWholenodeAmdGpus => (spec.gpu_arch == GpuArch::Amd && gpus >= 1)
            .then(|| ScenarioRequest::gpus(gpus, 1, true)),
    }
}

/// Builds the actions that can be validated on a cluster.
pub struct WorkflowDescriptorBuilder {
    program: String,
}

impl Default for WorkflowDescriptorBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM.to_string())
    }
}

impl WorkflowDescriptorBuilder {
    /// `program` is the command line prefix used to invoke this tool inside jobs.
    pub fn new(program: String) -> Self {
        Self { program }
    }

    /// Feasible actions for `spec`, in scenario declaration order.
    pub fn actions(&self, spec: &ClusterSpec) -> Vec<ActionDescriptor> {
        Scenario::ALL
            .into_iter()
            .filter_map(|scenario| {
                let request = scenario_request(scenario, spec);
                if request.is_none() {
                    log::debug!("Scenario `{scenario}` is not feasible on {spec:?}");
                }
                request.map(|request| self.action(scenario, request))
            })
            .collect()
    }

    pub fn build(
        &self,
        cluster_name: &str,
        spec: &ClusterSpec,
        account: Option<String>,
        setup: Option<String>,
    ) -> WorkflowDescriptor {
        WorkflowDescriptor {
            cluster_name: cluster_name.to_string(),
            workspace_path: cluster_name.to_string(),
            account,
            setup,
            actions: self.actions(spec),
        }
    }

    fn action(&self, scenario: Scenario, request: ScenarioRequest) -> ActionDescriptor {
        let launchers = if request.mpi {
            [MPI_LAUNCHER.to_string()].into()
        } else {
            Default::default()
        };
        ActionDescriptor {
            name: scenario.name().to_string(),
            command_template: format!(
                "{} execute {} {}",
                self.program,
                scenario.name(),
                DIRECTORY_PLACEHOLDER
            ),
            products: vec![scenario.product()],
            launchers,
            processes_per_submission: request.processes,
            threads_per_process: request.threads_per_process,
            gpus_per_process: request.gpus_per_process,
            walltime: WALLTIME,
        }
    }
}
