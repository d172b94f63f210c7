use crate::protocol::{HUFFVIZ_MAGIC, PROTOCOL_VERSION};
use crate::protocol::error::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub version: u16,
    pub flags: u16,
    pub capabilities: u32,
}

impl Handshake {
    pub const WIRE_SIZE: usize = 4 + 2 + 2 + 4;

    pub fn current() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            flags: 0,
            capabilities: 0,
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        trace!("Decoding handshake from {} bytes: {:?}", buf.len(), buf);

        if buf.len() < Self::WIRE_SIZE {
            error!("Handshake too short: {} bytes, expected {}", buf.len(), Self::WIRE_SIZE);
            return Err(ProtocolError::Truncated {
                needed: Self::WIRE_SIZE,
                got: buf.len(),
            });
        }

        if buf[0..4] != HUFFVIZ_MAGIC {
            error!("Invalid magic bytes: {:?}, expected {:?}", &buf[0..4], HUFFVIZ_MAGIC);
            return Err(ProtocolError::BadMagic([buf[0], buf[1], buf[2], buf[3]]));
        }

        let version = u16::from_be_bytes([buf[4], buf[5]]);
        if version != PROTOCOL_VERSION {
            error!("Unsupported version: {}, expected {}", version, PROTOCOL_VERSION);
            return Err(ProtocolError::VersionMismatch { offered: version });
        }

        let handshake = Self {
            version,
            flags: u16::from_be_bytes([buf[6], buf[7]]),
            capabilities: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        };

        debug!("Decoded handshake: version={}, flags={}, capabilities={}",
               handshake.version, handshake.flags, handshake.capabilities);

        Ok(handshake)
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[0..4].copy_from_slice(&HUFFVIZ_MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_be_bytes());
        buf[6..8].copy_from_slice(&self.flags.to_be_bytes());
        buf[8..12].copy_from_slice(&self.capabilities.to_be_bytes());
        buf
    }
}

pub async fn read_handshake<R: AsyncRead + Unpin>(stream: &mut R) -> anyhow::Result<Handshake> {
    debug!("Reading handshake ({} bytes)", Handshake::WIRE_SIZE);

    let mut buf = [0u8; Handshake::WIRE_SIZE];
    stream.read_exact(&mut buf).await?;

    let handshake = Handshake::decode(&buf)?;
    Ok(handshake)
}

pub async fn write_handshake<W: AsyncWrite + Unpin>(stream: &mut W) -> anyhow::Result<()> {
    debug!("Writing handshake");
    stream.write_all(&Handshake::current().encode()).await?;
    stream.flush().await?;
    Ok(())
}
