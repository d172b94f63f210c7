use crate::protocol::error::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use crate::utils::crc::crc32;
use tracing::{error, trace};

/// Fixed-size frame header (12 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_type: u8,
    pub flags: u8,
    pub header_len: u16,
    pub payload_len: u32,
    pub checksum: u32,
}

impl FrameHeader {
    pub const SIZE: usize = 12;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < Self::SIZE {
            error!("Frame header too short: {} bytes", buf.len());
            return Err(ProtocolError::Truncated {
                needed: Self::SIZE,
                got: buf.len(),
            });
        }

        let header = Self {
            frame_type: buf[0],
            flags: buf[1],
            header_len: u16::from_be_bytes([buf[2], buf[3]]),
            payload_len: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            checksum: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        };

        if header.header_len as usize != Self::SIZE {
            error!("Unexpected header length: {}", header.header_len);
            return Err(ProtocolError::HeaderLength(header.header_len));
        }

        Ok(header)
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.frame_type;
        buf[1] = self.flags;
        buf[2..4].copy_from_slice(&self.header_len.to_be_bytes());
        buf[4..8].copy_from_slice(&self.payload_len.to_be_bytes());
        buf[8..12].copy_from_slice(&self.checksum.to_be_bytes());
        buf
    }
}

/// One checksummed frame. The payload format depends on `frame_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(frame_type: u8, payload: Vec<u8>) -> Self {
        Self { frame_type, payload }
    }

    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            frame_type: self.frame_type,
            flags: 0,
            header_len: FrameHeader::SIZE as u16,
            payload_len: self.payload.len() as u32,
            checksum: crc32(&self.payload),
        }
    }
}

pub async fn read_frame<R: AsyncRead + Unpin>(
    stream: &mut R,
    max_frame_size: usize,
) -> anyhow::Result<Frame> {
    let mut header_buf = [0u8; FrameHeader::SIZE];
    stream.read_exact(&mut header_buf).await?;

    let header = FrameHeader::decode(&header_buf)?;
    trace!("Frame header: {:?}", header);

    if header.payload_len as usize > max_frame_size {
        error!("Frame payload {} exceeds limit {}", header.payload_len, max_frame_size);
        return Err(ProtocolError::FrameTooLarge {
            size: header.payload_len as usize,
            limit: max_frame_size,
        }
        .into());
    }

    let mut payload = vec![0u8; header.payload_len as usize];
    if header.payload_len > 0 {
        stream.read_exact(&mut payload).await?;
    }

    let computed = crc32(&payload);
    if computed != header.checksum {
        error!("Checksum mismatch: expected={:x}, computed={:x}", header.checksum, computed);
        return Err(ProtocolError::ChecksumMismatch {
            expected: header.checksum,
            computed,
        }
        .into());
    }

    Ok(Frame::new(header.frame_type, payload))
}

pub async fn write_frame<W: AsyncWrite + Unpin>(stream: &mut W, frame: &Frame) -> anyhow::Result<()> {
    if frame.payload.len() > u32::MAX as usize {
        return Err(ProtocolError::FrameTooLarge {
            size: frame.payload.len(),
            limit: u32::MAX as usize,
        }
        .into());
    }

    stream.write_all(&frame.header().encode()).await?;
    if !frame.payload.is_empty() {
        stream.write_all(&frame.payload).await?;
    }
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let frame = Frame::new(0x01, b"{}".to_vec());
        let bytes = frame.header().encode();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 12);
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
        assert_eq!(FrameHeader::decode(&bytes).unwrap(), frame.header());
    }

    #[tokio::test]
    async fn frames_cross_a_pipe() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let frame = Frame::new(0x03, b"{\"text\":\"AB\"}".to_vec());
        write_frame(&mut a, &frame).await.unwrap();
        assert_eq!(read_frame(&mut b, 1024).await.unwrap(), frame);
    }

    #[tokio::test]
    async fn corrupted_payload_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let frame = Frame::new(0x01, b"abc".to_vec());
        let mut bytes = frame.header().encode().to_vec();
        bytes.extend_from_slice(b"abd");
        a.write_all(&bytes).await.unwrap();

        let err = read_frame(&mut b, 1024).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProtocolError>(),
            Some(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn oversize_frame_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        write_frame(&mut a, &Frame::new(0x01, vec![b'x'; 64])).await.unwrap();
        let err = read_frame(&mut b, 16).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProtocolError>(),
            Some(ProtocolError::FrameTooLarge { size: 64, limit: 16 })
        ));
    }
}
