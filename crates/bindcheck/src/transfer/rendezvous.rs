use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Published by the coordinator of a distributed validation so that the other
/// processes of the job can find it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RendezvousRecord {
    pub job: String,
    pub host: String,
    pub port: u16,
    pub size: u32,
    /// When the coordinator published the record. Distinguishes records of
    /// reruns that share the same job key.
    pub created: SystemTime,
    /// Set when the coordinator gave up before collecting anything.
    #[serde(default)]
    pub aborted: Option<String>,
}

/// Rendezvous file of one action in a directory shared by all processes of a job.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    path: PathBuf,
    job: String,
}

impl Rendezvous {
    pub fn new(directory: &Path, action: &str, job: &str) -> Self {
        let job = job.to_string();
        let key: String = job
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self {
            path: directory.join(format!(".{action}.{key}.rendezvous.json")),
            job,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    /// Replaces the record atomically, readers never observe a partial file.
    pub fn publish(&self, record: &RendezvousRecord) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            serde_json::to_writer_pretty(file, record)?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        log::debug!("Rendezvous record stored in {}", self.path.display());
        Ok(())
    }

    /// Returns the record of our job, or `None` when it was not published yet.
    pub fn read(&self) -> crate::Result<Option<RendezvousRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: RendezvousRecord = serde_json::from_reader(file)
            .map_err(|e| crate::Error::DeserializationError(e.to_string()))?;
        Ok((record.job == self.job).then_some(record))
    }

    pub fn remove(&self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            log::warn!(
                "Cannot remove rendezvous file {}: {error}",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::{Rendezvous, RendezvousRecord};

    fn record(job: &str) -> RendezvousRecord {
        RendezvousRecord {
            job: job.to_string(),
            host: "a001".to_string(),
            port: 1234,
            size: 4,
            created: SystemTime::UNIX_EPOCH,
            aborted: None,
        }
    }

    #[test]
    fn test_publish_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let rendezvous = Rendezvous::new(dir.path(), "mpi_subnode", "123");
        assert_eq!(rendezvous.read().unwrap(), None);

        rendezvous.publish(&record("123")).unwrap();
        assert_eq!(rendezvous.read().unwrap(), Some(record("123")));

        rendezvous.remove();
        assert!(!rendezvous.path().exists());
    }

    #[test]
    fn test_foreign_job_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let rendezvous = Rendezvous::new(dir.path(), "mpi_subnode", "123");
        rendezvous.publish(&record("456")).unwrap();
        assert_eq!(rendezvous.read().unwrap(), None);
    }

    #[test]
    fn test_job_key_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let rendezvous = Rendezvous::new(dir.path(), "serial", "12/3");
        assert_eq!(
            rendezvous.path(),
            dir.path().join(".serial.12_3.rendezvous.json")
        );
        assert_eq!(rendezvous.job(), "12/3");
    }
}
