pub mod crc;
pub mod json;
