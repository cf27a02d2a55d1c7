use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::error::BindCheckError;
use crate::transfer::messages::{deserialize, GatherMessage, GatherPayload};

pub type Rank = u32;

/// Rank that receives the gathered values.
pub const COORDINATOR: Rank = 0;

/// Group of cooperating processes that can gather one value per process on the
/// coordinator.
pub trait Communicator {
    fn rank(&self) -> Rank;

    fn size(&self) -> u32;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// Contributes `value`. The coordinator receives the values of all
    /// processes ordered by rank, everyone else receives `None`.
    fn gather<T>(&mut self, value: T) -> impl Future<Output = crate::Result<Option<Vec<T>>>>
    where
        T: Serialize + DeserializeOwned;

    /// Tells the group that this process cannot contribute, so that nobody
    /// waits for it.
    fn abort(&mut self, reason: String) -> impl Future<Output = crate::Result<()>>;
}

/// Coordinator side bookkeeping of one gather.
pub(crate) struct Collector<T> {
    slots: Vec<Option<T>>,
    missing: usize,
}

impl<T: DeserializeOwned> Collector<T> {
    pub fn new(size: u32, own: T) -> Self {
        let mut slots: Vec<Option<T>> = (0..size).map(|_| None).collect();
        slots[COORDINATOR as usize] = Some(own);
        Self {
            missing: slots.len() - 1,
            slots,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing == 0
    }

    pub fn accept(&mut self, message: GatherMessage) -> crate::Result<()> {
        let rank = message.rank;
        let slot = match self.slots.get_mut(rank as usize) {
            Some(slot) if rank != COORDINATOR => slot,
            _ => {
                return Err(BindCheckError::Protocol(format!(
                    "Message from invalid rank {rank}"
                )));
            }
        };
        if slot.is_some() {
            return Err(BindCheckError::Protocol(format!(
                "Rank {rank} contributed more than once"
            )));
        }
        match message.payload {
            GatherPayload::Value(data) => {
                *slot = Some(deserialize(&data)?);
                self.missing -= 1;
                log::debug!("Received contribution of rank {rank}, {} missing", self.missing);
                Ok(())
            }
            GatherPayload::Abort(reason) => Err(BindCheckError::Aborted { rank, reason }),
        }
    }

    pub fn finish(self) -> crate::Result<Vec<T>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(rank, slot)| {
                slot.ok_or_else(|| {
                    BindCheckError::Protocol(format!("Rank {rank} did not contribute"))
                })
            })
            .collect()
    }
}
