use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::validate::verdict::Verdict;

/// Location of the report written for one action executed on one directory:
/// `<root>/<cluster>/<directory>/<action>.out`.
#[derive(Debug, Clone)]
pub struct ReportTarget {
    directory: PathBuf,
    action: String,
}

impl ReportTarget {
    pub fn new(root: &Path, cluster: &str, directory: &str, action: &str) -> Self {
        Self {
            directory: root.join(cluster).join(directory),
            action: action.to_string(),
        }
    }

    /// Directory holding the report, shared by all processes of the job.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(format!("{}.out", self.action))
    }

    pub fn write(&self, verdict: &Verdict) -> crate::Result<PathBuf> {
        let path = self.path();
        std::fs::create_dir_all(&self.directory)?;
        let mut file = BufWriter::new(File::create(&path)?);
        for line in verdict.lines() {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        log::info!("Report written to {}", path.display());
        Ok(path)
    }
}
