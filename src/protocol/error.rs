use std::fmt;

/// Transport faults. Any of these ends the session; codec failures travel
/// back as Error frames instead.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than a fixed-size record needs.
    Truncated { needed: usize, got: usize },
    BadMagic([u8; 4]),
    VersionMismatch { offered: u16 },
    HeaderLength(u16),
    UnknownFrameType(u8),
    FrameTooLarge { size: usize, limit: usize },
    ChecksumMismatch { expected: u32, computed: u32 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated { needed, got } =>
                write!(f, "truncated record: need {} bytes, got {}", needed, got),
            ProtocolError::BadMagic(found) =>
                write!(f, "not a huffviz peer (magic {:02x?})", found),
            ProtocolError::VersionMismatch { offered } =>
                write!(f, "peer speaks protocol version {}", offered),
            ProtocolError::HeaderLength(len) =>
                write!(f, "frame header claims {} bytes", len),
            ProtocolError::UnknownFrameType(t) =>
                write!(f, "unknown frame type {:#04x}", t),
            ProtocolError::FrameTooLarge { size, limit } =>
                write!(f, "frame of {} bytes exceeds limit {}", size, limit),
            ProtocolError::ChecksumMismatch { expected, computed } =>
                write!(f, "checksum mismatch: expected {:08x}, computed {:08x}", expected, computed),
        }
    }
}

impl std::error::Error for ProtocolError {}
