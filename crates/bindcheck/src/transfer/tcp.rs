use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};

use crate::common::env::{job_key_from_env, placement_from_env, Placement};
use crate::common::error::BindCheckError;
use crate::transfer::comm::{Collector, Communicator, Rank, COORDINATOR};
use crate::transfer::connection::{framed, receive_message, send_message};
use crate::transfer::messages::{serialize, GatherMessage, GatherPayload};
use crate::transfer::rendezvous::{Rendezvous, RendezvousRecord};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Gathers over TCP. The coordinator listens on an ephemeral port and
/// advertises it in a rendezvous file; the other processes poll the file,
/// connect and send a single frame.
pub struct TcpCommunicator {
    placement: Placement,
    rendezvous: Rendezvous,
    host: String,
    poll_interval: Duration,
    started: SystemTime,
}

impl TcpCommunicator {
    pub fn new(placement: Placement, rendezvous: Rendezvous, host: String) -> Self {
        Self {
            placement,
            rendezvous,
            host,
            poll_interval: DEFAULT_POLL_INTERVAL,
            started: SystemTime::now(),
        }
    }

    /// Communicator of the calling process, placed by its launcher and
    /// meeting the rest of the job in `directory`.
    pub fn from_env(directory: &Path, action: &str) -> crate::Result<Self> {
        let placement = placement_from_env()?;
        let job = job_key_from_env();
        let host = gethostname::gethostname().into_string().map_err(|name| {
            BindCheckError::GenericError(format!("Invalid hostname {name:?}"))
        })?;
        log::debug!(
            "Process {}/{} of job {job} on {host}",
            placement.rank,
            placement.size
        );
        Ok(Self::new(
            placement,
            Rendezvous::new(directory, action, &job),
            host,
        ))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn record(&self, port: u16, aborted: Option<String>) -> RendezvousRecord {
        RendezvousRecord {
            job: self.rendezvous.job().to_string(),
            host: self.host.clone(),
            port,
            size: self.placement.size,
            created: SystemTime::now(),
            aborted,
        }
    }

    async fn collect<T: DeserializeOwned>(&self, value: T) -> crate::Result<Vec<T>> {
        let listener = TcpListener::bind(("0.0.0.0", 0)).await?;
        let port = listener.local_addr()?.port();
        self.rendezvous.publish(&self.record(port, None))?;
        log::info!(
            "Waiting for {} processes on {}:{port}",
            self.placement.size - 1,
            self.host
        );

        let mut collector = Collector::new(self.placement.size, value);
        let result = accept_all(&listener, &mut collector).await;
        self.rendezvous.remove();
        result?;
        collector.finish()
    }

    async fn send(&self, payload: GatherPayload) -> crate::Result<()> {
        let message = GatherMessage {
            rank: self.placement.rank,
            payload,
        };
        loop {
            if let Some(record) = self.rendezvous.read()? {
                match record.aborted {
                    // Left behind by an earlier run sharing the job key.
                    Some(_) if record.created < self.started => {
                        log::debug!(
                            "Ignoring aborted rendezvous record of a previous run in {}",
                            self.rendezvous.path().display()
                        );
                        tokio::time::sleep(self.poll_interval).await;
                        continue;
                    }
                    Some(reason) => {
                        return Err(BindCheckError::Aborted {
                            rank: COORDINATOR,
                            reason,
                        });
                    }
                    None => {}
                }
                if record.size != self.placement.size {
                    return Err(BindCheckError::Protocol(format!(
                        "Coordinator expects {} processes, this job has {}",
                        record.size, self.placement.size
                    )));
                }
                match TcpStream::connect((record.host.as_str(), record.port)).await {
                    Ok(socket) => {
                        let mut connection = framed(socket);
                        send_message(&mut connection, &message).await?;
                        log::debug!(
                            "Contribution of rank {} sent to {}:{}",
                            self.placement.rank,
                            record.host,
                            record.port
                        );
                        return Ok(());
                    }
                    Err(error) => log::debug!(
                        "Cannot connect to {}:{}: {error}, retrying",
                        record.host,
                        record.port
                    ),
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

async fn accept_all<T: DeserializeOwned>(
    listener: &TcpListener,
    collector: &mut Collector<T>,
) -> crate::Result<()> {
    while !collector.is_complete() {
        let (socket, address) = listener.accept().await?;
        log::debug!("Accepted connection from {address}");
        let mut connection = framed(socket);
        let message = receive_message(&mut connection).await?;
        collector.accept(message)?;
    }
    Ok(())
}

impl Communicator for TcpCommunicator {
    fn rank(&self) -> Rank {
        self.placement.rank
    }

    fn size(&self) -> u32 {
        self.placement.size
    }

    async fn gather<T>(&mut self, value: T) -> crate::Result<Option<Vec<T>>>
    where
        T: Serialize + DeserializeOwned,
    {
        if self.placement.size == 1 {
            return Ok(Some(vec![value]));
        }
        if self.is_coordinator() {
            self.collect(value).await.map(Some)
        } else {
            self.send(GatherPayload::Value(serialize(&value)?)).await?;
            Ok(None)
        }
    }

    async fn abort(&mut self, reason: String) -> crate::Result<()> {
        if self.placement.size == 1 {
            return Ok(());
        }
        if self.is_coordinator() {
            self.rendezvous.publish(&self.record(0, Some(reason)))
        } else {
            self.send(GatherPayload::Abort(reason)).await
        }
    }
}
