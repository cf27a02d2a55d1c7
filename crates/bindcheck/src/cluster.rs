use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::common::error::BindCheckError;
use crate::Map;

/// Accelerator vendor available on a cluster.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GpuArch {
    None,
    #[default]
    Nvidia,
    Amd,
}

impl Display for GpuArch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GpuArch::None => "none",
            GpuArch::Nvidia => "nvidia",
            GpuArch::Amd => "amd",
        };
        f.write_str(name)
    }
}

/// Capacity of the default partitions of one cluster.
///
/// Set `cpus_per_node` or `gpus_per_node` to zero to prevent CPU or GPU
/// actions from being generated for the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub cpus_per_node: u32,
    pub gpus_per_node: u32,
    pub gpu_arch: GpuArch,
    /// Whether jobs may share a node (partial-node allocations).
    pub has_shared: bool,
}

impl ClusterSpec {
    pub const fn new(cpus_per_node: u32, gpus_per_node: u32, gpu_arch: GpuArch) -> Self {
        Self {
            cpus_per_node,
            gpus_per_node,
            gpu_arch,
            has_shared: true,
        }
    }

    pub const fn exclusive(mut self) -> Self {
        self.has_shared = false;
        self
    }
}

const BUILTIN_CLUSTERS: &[(&str, ClusterSpec)] = &[
    ("andes", ClusterSpec::new(32, 0, GpuArch::None).exclusive()),
    ("anvil", ClusterSpec::new(128, 0, GpuArch::Nvidia)),
    ("delta", ClusterSpec::new(128, 4, GpuArch::Nvidia)),
    ("frontier", ClusterSpec::new(0, 8, GpuArch::Amd).exclusive()),
    ("greatlakes", ClusterSpec::new(36, 2, GpuArch::Nvidia)),
];

/// One `[[cluster]]` entry of a user cluster file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterDef {
    name: String,
    cpus_per_node: u32,
    gpus_per_node: u32,
    #[serde(default)]
    gpu_arch: GpuArch,
    #[serde(default = "default_has_shared")]
    has_shared: bool,
}

fn default_has_shared() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterFile {
    #[serde(default)]
    cluster: Vec<ClusterDef>,
}

/// Registry of known clusters. Built once at start-up and passed by reference
/// to everything that needs to look a cluster up.
#[derive(Debug, Clone)]
pub struct ClusterCatalog {
    clusters: Map<String, ClusterSpec>,
}

impl ClusterCatalog {
    pub fn builtin() -> Self {
        Self {
            clusters: BUILTIN_CLUSTERS
                .iter()
                .map(|(name, spec)| (name.to_string(), *spec))
                .collect(),
        }
    }

    /// Built-in clusters merged with the clusters defined in `path`.
    pub fn with_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut catalog = Self::builtin();
        catalog.merge_toml(&content)?;
        log::debug!("Loaded cluster definitions from {}", path.display());
        Ok(catalog)
    }

    /// Loads the explicitly requested cluster file, or the default one when it
    /// exists, or only the built-in clusters.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::with_file(path),
            None => match default_cluster_file() {
                Some(path) if path.is_file() => Self::with_file(&path),
                _ => Ok(Self::builtin()),
            },
        }
    }

    fn merge_toml(&mut self, content: &str) -> crate::Result<()> {
        let file: ClusterFile = toml::from_str(content)?;
        for def in file.cluster {
            let spec = ClusterSpec {
                cpus_per_node: def.cpus_per_node,
                gpus_per_node: def.gpus_per_node,
                gpu_arch: def.gpu_arch,
                has_shared: def.has_shared,
            };
            if self.clusters.insert(def.name.clone(), spec).is_some() {
                log::debug!("Cluster `{}` overrides the built-in definition", def.name);
            }
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> crate::Result<&ClusterSpec> {
        self.clusters
            .get(name)
            .ok_or_else(|| BindCheckError::UnsupportedCluster(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClusterSpec)> {
        self.clusters.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

pub fn default_cluster_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bindcheck").join("clusters.toml"))
}

/// Asks the workflow manager which cluster it is currently running on.
pub fn detect_cluster_name() -> crate::Result<String> {
    let output = Command::new("row")
        .args(["show", "cluster", "--name"])
        .output()
        .map_err(|error| format!("Cannot execute `row show cluster --name`: {error}"))?;
    if !output.status.success() {
        return Err(format!(
            "`row show cluster --name` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    log::debug!("Detected cluster `{name}`");
    Ok(name)
}
