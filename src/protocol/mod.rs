//! GT06 wire protocol encoders.
//!
//! Pure functions, no I/O: the session driver owns every socket. Only
//! the two frame types the simulator sends are implemented: device
//! login (`0x01`) and GPS location report (`0x12`).

pub mod bcd;
pub mod frame;

pub use bcd::{Identity, decode_bcd, encode_timestamp};
pub use frame::{
    LOGIN_FRAME_LEN, MSG_GPS, MSG_LOGIN, REPORT_FRAME_LEN, SYNC, TERMINATOR, encode_login,
    encode_report, xor_checksum,
};
