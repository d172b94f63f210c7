//! Protocol constants for the huffvizd wire format

/// Handshake magic bytes: "HUFV"
pub const HUFFVIZ_MAGIC: [u8; 4] = *b"HUFV";

/// Current protocol version
pub const PROTOCOL_VERSION: u16 = 1;

/// Request frames
pub const FRAME_ANALYZE_FREQUENCY: u8 = 0x01;
pub const FRAME_BUILD_TREE: u8 = 0x02;
pub const FRAME_ENCODE: u8 = 0x03;
pub const FRAME_DECODE: u8 = 0x04;
pub const FRAME_CLOSE: u8 = 0x0F;

/// Response frames
pub const FRAME_FREQUENCIES: u8 = 0x81;
pub const FRAME_TREE: u8 = 0x82;
pub const FRAME_ENCODED: u8 = 0x83;
pub const FRAME_DECODED: u8 = 0x84;
pub const FRAME_ERROR: u8 = 0xFF;

/// Default payload cap; the server config can lower or raise it.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024; // 4MB
