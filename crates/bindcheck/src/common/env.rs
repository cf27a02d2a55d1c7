use std::str::FromStr;

use crate::common::error::BindCheckError;

macro_rules! create_bindcheck_env {
    ($name: literal) => {
        concat!("BINDCHECK_", $name)
    };
}

/// Known environment variables
pub const BINDCHECK_RANK: &str = create_bindcheck_env!("RANK");
pub const BINDCHECK_SIZE: &str = create_bindcheck_env!("SIZE");
pub const BINDCHECK_DEBUG: &str = create_bindcheck_env!("DEBUG");
pub const BINDCHECK_CLUSTERS: &str = create_bindcheck_env!("CLUSTERS");

/// Pairs of (rank, size) variables exported by the launchers we know about.
/// The first pair whose rank variable is present wins.
const RANK_SIZE_VARS: &[(&str, &str)] = &[
    (BINDCHECK_RANK, BINDCHECK_SIZE),
    ("OMPI_COMM_WORLD_RANK", "OMPI_COMM_WORLD_SIZE"),
    ("PMI_RANK", "PMI_SIZE"),
    ("SLURM_PROCID", "SLURM_NTASKS"),
];

const JOB_ID_VARS: &[&str] = &["SLURM_JOB_ID", "PBS_JOBID"];

/// Key used when the process does not run inside a batch job.
pub const LOCAL_JOB_KEY: &str = "local";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Placement {
    pub rank: u32,
    pub size: u32,
}

impl Placement {
    pub fn single() -> Self {
        Self { rank: 0, size: 1 }
    }
}

/// Resolves the rank and size of the calling process from the environment
/// of the launcher that started it.
pub fn placement_from_env() -> crate::Result<Placement> {
    placement_from(|name| std::env::var(name).ok())
}

pub(crate) fn placement_from<F: Fn(&str) -> Option<String>>(
    lookup: F,
) -> crate::Result<Placement> {
    for &(rank_var, size_var) in RANK_SIZE_VARS {
        let Some(rank) = lookup(rank_var) else {
            continue;
        };
        let rank = parse_var::<u32>(rank_var, &rank)?;
        let size = match lookup(size_var) {
            Some(size) => parse_var::<u32>(size_var, &size)?,
            None => return Err(BindCheckError::MissingEnvironment(size_var)),
        };
        if rank >= size {
            return Err(BindCheckError::InvalidEnvironment {
                var: rank_var,
                value: rank.to_string(),
            });
        }
        log::debug!("Placement taken from `{rank_var}`/`{size_var}`: {rank}/{size}");
        return Ok(Placement { rank, size });
    }
    Ok(Placement::single())
}

/// Identifies the batch job so that concurrent jobs sharing a directory do not
/// meet each other during rendezvous.
pub fn job_key_from_env() -> String {
    JOB_ID_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .unwrap_or_else(|| LOCAL_JOB_KEY.to_string())
}

/// Reads a variable that must be present.
pub fn required_var(name: &'static str) -> crate::Result<String> {
    std::env::var(name).map_err(|_| BindCheckError::MissingEnvironment(name))
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> crate::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BindCheckError::InvalidEnvironment {
            var,
            value: value.to_string(),
        })
}
