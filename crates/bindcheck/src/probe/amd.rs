use nom::bytes::complete::{tag, take_until};
use nom::combinator::rest;
use nom::sequence::{pair, preceded};

use crate::common::parser::NomResult;
use crate::probe::run_tool;

/// Lists the AMD devices assigned to the calling process using `rocm-smi`.
/// Example expected output:
/// ```console
/// $ rocm-smi --showuniqueid
/// ============================ ROCm System Management Interface ============================
/// ================================= Unique ID ==============================================
/// GPU[0]		: Unique ID: 0x7a3c5f1b2d4e6a80
/// GPU[1]		: Unique ID: 0x1b2d4e6a807a3c5f
/// ==========================================================================================
/// ```
pub fn get_amd_gpus() -> crate::Result<Vec<String>> {
    let stdout = run_tool("rocm-smi", &["--showuniqueid"])?;
    Ok(parse_amd_devices(&stdout))
}

fn p_unique_id(input: &str) -> NomResult<&str> {
    preceded(pair(take_until("Unique ID: "), tag("Unique ID: ")), rest)(input)
}

/// The banner and separator lines of `rocm-smi` vary between releases, so
/// lines without an identifier are skipped.
fn parse_amd_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| match p_unique_id(line) {
            Ok((_, id)) => Some(id.trim().to_string()),
            Err(_) => {
                log::trace!("Skipping rocm-smi line `{line}`");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_amd_devices;

    #[test]
    fn test_parse_unique_ids() {
        let output = "\
========================= ROCm System Management Interface =========================
============================== Unique ID ===========================================
GPU[0]\t\t: Unique ID: 0x7a3c5f1b2d4e6a80
GPU[1]\t\t: Unique ID: 0x1b2d4e6a807a3c5f
====================================================================================
=============================== End of ROCm SMI Log ================================
";
        assert_eq!(
            parse_amd_devices(output),
            vec!["0x7a3c5f1b2d4e6a80", "0x1b2d4e6a807a3c5f"]
        );
    }

    #[test]
    fn test_parse_without_devices() {
        assert!(parse_amd_devices("WARNING: No AMD GPUs specified\n").is_empty());
    }
}
