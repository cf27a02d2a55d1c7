use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{length_delimited, Framed, LengthDelimitedCodec};

use crate::common::error::BindCheckError;
use crate::transfer::messages::{deserialize, serialize, GatherMessage};

pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

pub type GatherConnection = Framed<TcpStream, LengthDelimitedCodec>;

pub fn make_protocol_builder() -> length_delimited::Builder {
    *LengthDelimitedCodec::builder()
        .little_endian()
        .max_frame_length(MAX_FRAME_SIZE)
}

pub fn framed(socket: TcpStream) -> GatherConnection {
    make_protocol_builder().new_framed(socket)
}

pub async fn send_message(
    connection: &mut GatherConnection,
    message: &GatherMessage,
) -> crate::Result<()> {
    let data = serialize(message)?;
    connection.send(Bytes::from(data)).await?;
    Ok(())
}

pub async fn receive_message(connection: &mut GatherConnection) -> crate::Result<GatherMessage> {
    match connection.next().await {
        Some(frame) => deserialize(&frame?),
        None => Err(BindCheckError::Protocol(
            "Connection closed before a message was received".to_string(),
        )),
    }
}
