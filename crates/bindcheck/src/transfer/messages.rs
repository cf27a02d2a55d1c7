use bincode::{DefaultOptions, Options};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::transfer::comm::Rank;
use crate::transfer::connection::MAX_FRAME_SIZE;

#[derive(Serialize, Deserialize, Debug)]
pub enum GatherPayload {
    /// Serialized contribution of the sender.
    Value(Vec<u8>),
    /// The sender failed before it could contribute.
    Abort(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GatherMessage {
    pub rank: Rank,
    pub payload: GatherPayload,
}

fn options() -> impl Options {
    DefaultOptions::new()
        .with_limit(MAX_FRAME_SIZE as u64)
        .with_fixint_encoding()
}

pub fn serialize<T>(value: &T) -> crate::Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    Ok(options().serialize(value)?)
}

pub fn deserialize<T>(bytes: &[u8]) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    options()
        .deserialize(bytes)
        .map_err(|e| crate::Error::DeserializationError(format!("{e:?}")))
}
