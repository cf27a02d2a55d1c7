use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::combinator::{rest, value};
use nom::sequence::{pair, preceded, terminated};

use crate::common::error::BindCheckError;
use crate::common::parser::{consume_all, NomResult};
use crate::probe::run_tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceKind {
    Gpu,
    Mig,
}

/// Lists the Nvidia devices assigned to the calling process using `nvidia-smi`.
/// Example expected output:
/// ```console
/// $ nvidia-smi --list-gpus
/// GPU 0: NVIDIA A100-SXM4-40GB (UUID: GPU-8f2b6e3c-1d5a-4c1e-9b1a-0a3c5e7d9f11)
///   MIG 3g.20gb     Device  0: (UUID: MIG-6d1e6c0e-4b57-5d2f-8e0e-3a54b8a4f0c2)
/// ```
pub fn get_nvidia_gpus() -> crate::Result<Vec<String>> {
    let stdout = run_tool("nvidia-smi", &["--list-gpus"])?;
    parse_nvidia_devices(&stdout)
}

/// `...(UUID: GPU-<id>)` or `...(UUID: MIG-<id>)`
fn p_device(input: &str) -> NomResult<(DeviceKind, &str)> {
    preceded(
        pair(take_until("(UUID: "), tag("(UUID: ")),
        pair(
            alt((
                value(DeviceKind::Gpu, tag("GPU-")),
                value(DeviceKind::Mig, tag("MIG-")),
            )),
            terminated(take_until(")"), pair(tag(")"), rest)),
        ),
    )(input)
}

/// MIG instances subdivide a physical GPU. When any are visible, only they
/// are returned.
fn parse_nvidia_devices(output: &str) -> crate::Result<Vec<String>> {
    let mut gpus = Vec::new();
    let mut migs = Vec::new();
    for line in output.lines() {
        let (kind, id) = consume_all(p_device, line).map_err(|error| {
            BindCheckError::Probe(format!(
                "Unexpected output from nvidia-smi: {line} ({error})"
            ))
        })?;
        match kind {
            DeviceKind::Gpu => gpus.push(id.to_string()),
            DeviceKind::Mig => migs.push(id.to_string()),
        }
    }

    if migs.is_empty() {
        Ok(gpus)
    } else {
        Ok(migs)
    }
}
