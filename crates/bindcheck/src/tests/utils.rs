use std::path::Path;

use crate::cluster::GpuArch;
use crate::common::error::BindCheckError;
use crate::probe::{BindingReport, CoreId, ResourceProbe};
use crate::validate::verdict::Tag;
use crate::Set;

pub fn cpu_report(hostname: &str, cores: &[CoreId]) -> BindingReport {
    gpu_report(hostname, cores, &[])
}

pub fn gpu_report(hostname: &str, cores: &[CoreId], gpus: &[&str]) -> BindingReport {
    BindingReport {
        hostname: hostname.to_string(),
        cpu_affinity: cores.iter().copied().collect(),
        gpu_ids: gpus.iter().map(|id| id.to_string()).collect(),
    }
}

/// Probe returning a fixed report, or failing when created with [`FakeProbe::failing`].
pub struct FakeProbe {
    report: Option<BindingReport>,
}

impl FakeProbe {
    pub fn new(report: BindingReport) -> Self {
        Self {
            report: Some(report),
        }
    }

    pub fn failing() -> Self {
        Self { report: None }
    }

    fn get(&self) -> crate::Result<&BindingReport> {
        self.report
            .as_ref()
            .ok_or_else(|| BindCheckError::Probe("Unexpected output from nvidia-smi".to_string()))
    }
}

impl ResourceProbe for FakeProbe {
    fn hostname(&self) -> crate::Result<String> {
        Ok(self.get()?.hostname.clone())
    }

    fn affinity(&self) -> crate::Result<Set<CoreId>> {
        Ok(self.get()?.cpu_affinity.clone())
    }

    fn accelerators(&self, _arch: GpuArch) -> crate::Result<Vec<String>> {
        Ok(self.get()?.gpu_ids.clone())
    }
}

/// Tags of the lines of a written report file.
pub fn read_report_tags(path: &Path) -> Vec<Tag> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| Tag::from_line(line).unwrap())
        .collect()
}
