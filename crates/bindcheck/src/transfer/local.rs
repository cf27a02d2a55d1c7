use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::common::error::BindCheckError;
use crate::transfer::comm::{Collector, Communicator, Rank, COORDINATOR};
use crate::transfer::messages::{serialize, GatherMessage, GatherPayload};

/// Member of a group of participants living in one process.
pub struct LocalCommunicator {
    rank: Rank,
    size: u32,
    sender: Option<UnboundedSender<GatherMessage>>,
    receiver: Option<UnboundedReceiver<GatherMessage>>,
}

/// Creates `size` connected participants. Only the coordinator holds the
/// receiving end, so it notices when every other participant went away.
pub fn local_group(size: u32) -> Vec<LocalCommunicator> {
    let (sender, receiver) = unbounded_channel();
    let mut receiver = Some(receiver);
    (0..size)
        .map(|rank| {
            if rank == COORDINATOR {
                LocalCommunicator {
                    rank,
                    size,
                    sender: None,
                    receiver: receiver.take(),
                }
            } else {
                LocalCommunicator {
                    rank,
                    size,
                    sender: Some(sender.clone()),
                    receiver: None,
                }
            }
        })
        .collect()
}

impl LocalCommunicator {
    fn send(&mut self, payload: GatherPayload) -> crate::Result<()> {
        let sender = self
            .sender
            .take()
            .ok_or_else(|| BindCheckError::Protocol("Contribution already sent".to_string()))?;
        sender
            .send(GatherMessage {
                rank: self.rank,
                payload,
            })
            .map_err(|_| BindCheckError::Protocol("Coordinator has left the group".to_string()))
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }

    async fn gather<T>(&mut self, value: T) -> crate::Result<Option<Vec<T>>>
    where
        T: Serialize + DeserializeOwned,
    {
        if !self.is_coordinator() {
            self.send(GatherPayload::Value(serialize(&value)?))?;
            return Ok(None);
        }
        let mut receiver = self
            .receiver
            .take()
            .ok_or_else(|| BindCheckError::Protocol("Gather already finished".to_string()))?;
        let mut collector = Collector::new(self.size, value);
        while !collector.is_complete() {
            match receiver.recv().await {
                Some(message) => collector.accept(message)?,
                None => {
                    return Err(BindCheckError::Protocol(
                        "Participants left before contributing".to_string(),
                    ));
                }
            }
        }
        collector.finish().map(Some)
    }

    async fn abort(&mut self, reason: String) -> crate::Result<()> {
        if self.is_coordinator() {
            self.receiver = None;
            Ok(())
        } else {
            self.send(GatherPayload::Abort(reason))
        }
    }
}
