pub mod constants;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod message;

pub use constants::*;
pub use error::ProtocolError;
pub use frame::{read_frame, write_frame, Frame, FrameHeader};
pub use message::{Request, Response};
