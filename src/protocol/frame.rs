//! GT06 frame assembly and the login/report encoders.
//!
//! Wire layout (big-endian throughout):
//!
//! | field      | size | value                                        |
//! |------------|------|----------------------------------------------|
//! | sync       | 2    | `0x78 0x78`                                  |
//! | length     | 2    | `1 (type) + len(payload)`                    |
//! | type       | 1    | `0x01` login, `0x12` location report         |
//! | payload    | var  | login: 8 BCD bytes; report: 16 bytes         |
//! | checksum   | 1    | XOR over length bytes, type and payload      |
//! | terminator | 2    | `0x0D 0x0A`                                  |
//!
//! Report payload: fix status (1), latitude (4, |deg|·1e6), longitude (4),
//! speed km/h (1), BCD timestamp (6). Encode only; this tool never parses.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{Result, SimulatorError};
use crate::protocol::bcd::{self, Identity};

/// Frame sync marker.
pub const SYNC: [u8; 2] = [0x78, 0x78];

/// Frame terminator.
pub const TERMINATOR: [u8; 2] = [0x0D, 0x0A];

/// Message type byte for device login.
pub const MSG_LOGIN: u8 = 0x01;

/// Message type byte for a GPS location report.
pub const MSG_GPS: u8 = 0x12;

/// Fix status byte carried in every report (always "valid fix").
pub const FIX_VALID: u8 = 0x01;

/// Total byte length of a login frame:
/// sync(2) + length(2) + type(1) + identity(8) + checksum(1) + terminator(2).
pub const LOGIN_FRAME_LEN: usize = 16;

/// Total byte length of a location-report frame:
/// sync(2) + length(2) + type(1) + payload(16) + checksum(1) + terminator(2).
pub const REPORT_FRAME_LEN: usize = 24;

const REPORT_PAYLOAD_LEN: usize = 16;
const COORD_SCALE: f64 = 1_000_000.0;

/// One-byte XOR fold, the GT06 checksum (not a CRC).
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

/// Wrap a message type and payload into a complete frame.
///
/// Both frame types this tool emits have fixed payload sizes, so the
/// length check can only fire on misuse of the codec as a library.
pub fn assemble(msg_type: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let body_len = 1 + payload.len();
    let length = u16::try_from(body_len)
        .map_err(|_| SimulatorError::FrameTooLarge { body_len })?;

    let mut frame = Vec::with_capacity(2 + 2 + body_len + 1 + 2);
    frame.extend_from_slice(&SYNC);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.push(msg_type);
    frame.extend_from_slice(payload);
    frame.push(xor_checksum(&frame[2..]));
    frame.extend_from_slice(&TERMINATOR);

    trace!("assembled frame: type={msg_type:#04x}, length={length}, total={} bytes", frame.len());
    Ok(frame)
}

/// Encode a device-login frame for the given identity.
pub fn encode_login(identity: &Identity) -> Result<Vec<u8>> {
    assemble(MSG_LOGIN, &identity.to_bcd())
}

/// Encode a GPS location-report frame.
///
/// Latitude and longitude are taken as-is; values outside the usual
/// ±90/±180 ranges are encoded without complaint since only magnitude
/// and clamping matter on this wire.
pub fn encode_report(
    latitude: f64,
    longitude: f64,
    speed_kmh: f64,
    moment: &DateTime<Utc>,
) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(REPORT_PAYLOAD_LEN);
    payload.push(FIX_VALID);
    payload.extend_from_slice(&scale_coordinate(latitude).to_be_bytes());
    payload.extend_from_slice(&scale_coordinate(longitude).to_be_bytes());
    payload.push(speed_kmh.round().clamp(0.0, 255.0) as u8);
    payload.extend_from_slice(&bcd::encode_timestamp(moment));
    debug_assert_eq!(payload.len(), REPORT_PAYLOAD_LEN);

    assemble(MSG_GPS, &payload)
}

/// Scale a coordinate to the unsigned 1e-6-degree wire field.
///
/// Negative coordinates are sent as `(2^32 - magnitude) mod 2^32`. This
/// mirrors the deployed encoder byte-for-byte even though no known
/// receiver decodes the field as signed; changing it would break
/// comparison against captures from the existing test target.
fn scale_coordinate(degrees: f64) -> u32 {
    let magnitude = (degrees.abs() * COORD_SCALE).round().min(u32::MAX as f64) as u32;
    if degrees < 0.0 { magnitude.wrapping_neg() } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn moment() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 45).unwrap()
    }

    #[test]
    fn login_frame_matches_golden_bytes() {
        let identity = Identity::new("123456789012345").unwrap();
        let frame = encode_login(&identity).unwrap();
        assert_eq!(
            frame,
            [
                0x78, 0x78, // sync
                0x00, 0x09, // length: type + 8 BCD bytes
                0x01, // login
                0x01, 0x23, 0x45, 0x67, 0x89, 0x01, 0x23, 0x45, // "0123456789012345"
                0xE6, // XOR over length + body
                0x0D, 0x0A, // terminator
            ]
        );
    }

    #[test]
    fn frame_lengths_are_fixed() {
        let identity = Identity::new("862009999887766").unwrap();
        assert_eq!(encode_login(&identity).unwrap().len(), LOGIN_FRAME_LEN);
        let report = encode_report(12.9716, 77.5946, 25.0, &moment()).unwrap();
        assert_eq!(report.len(), REPORT_FRAME_LEN);
    }

    #[test]
    fn length_field_counts_type_plus_payload() {
        let identity = Identity::new("123456789012345").unwrap();
        let login = encode_login(&identity).unwrap();
        assert_eq!(u16::from_be_bytes([login[2], login[3]]), 9);

        let report = encode_report(1.0, 2.0, 3.0, &moment()).unwrap();
        assert_eq!(u16::from_be_bytes([report[2], report[3]]), 17);
    }

    #[test]
    fn checksum_detects_flipped_payload_bit() {
        let mut frame = encode_report(12.9716, 77.5946, 25.0, &moment()).unwrap();
        let checksum_pos = frame.len() - 3;
        assert_eq!(xor_checksum(&frame[2..checksum_pos]), frame[checksum_pos]);

        frame[10] ^= 0x04;
        assert_ne!(xor_checksum(&frame[2..checksum_pos]), frame[checksum_pos]);
    }

    #[test]
    fn report_scales_coordinates_to_microdegrees() {
        let frame = encode_report(12.9716, 77.5946, 25.0, &moment()).unwrap();
        // payload begins after sync(2) + length(2) + type(1)
        assert_eq!(frame[5], FIX_VALID);
        let lat = u32::from_be_bytes([frame[6], frame[7], frame[8], frame[9]]);
        let lon = u32::from_be_bytes([frame[10], frame[11], frame[12], frame[13]]);
        assert_eq!(lat, 12_971_600);
        assert_eq!(lon, 77_594_600);
        assert_eq!(frame[14], 25);
    }

    #[test]
    fn negative_coordinates_use_wraparound_encoding() {
        let frame = encode_report(-33.8688, -70.6693, 0.0, &moment()).unwrap();
        let lat = u32::from_be_bytes([frame[6], frame[7], frame[8], frame[9]]);
        let lon = u32::from_be_bytes([frame[10], frame[11], frame[12], frame[13]]);
        assert_eq!(lat, 33_868_800u32.wrapping_neg());
        assert_eq!(lon, 70_669_300u32.wrapping_neg());
    }

    #[test]
    fn speed_byte_clamps_to_u8_range() {
        let fast = encode_report(0.0, 0.0, 300.0, &moment()).unwrap();
        assert_eq!(fast[14], 255);
        let reverse = encode_report(0.0, 0.0, -5.0, &moment()).unwrap();
        assert_eq!(reverse[14], 0);
    }

    #[test]
    fn report_carries_bcd_timestamp() {
        let frame = encode_report(0.0, 0.0, 0.0, &moment()).unwrap();
        assert_eq!(&frame[15..21], &[0x24, 0x06, 0x15, 0x10, 0x30, 0x45]);
    }

    #[test]
    fn oversized_body_is_rejected() {
        let payload = vec![0u8; 0x1_0000];
        assert!(matches!(
            assemble(MSG_GPS, &payload),
            Err(SimulatorError::FrameTooLarge { .. })
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_report_frame_is_well_formed(
                lat in -90.0f64..90.0,
                lon in -180.0f64..180.0,
                speed in -50.0f64..400.0,
            ) {
                let frame = encode_report(lat, lon, speed, &moment()).unwrap();
                prop_assert_eq!(frame.len(), REPORT_FRAME_LEN);
                prop_assert_eq!(&frame[..2], &SYNC);
                prop_assert_eq!(&frame[frame.len() - 2..], &TERMINATOR);
                prop_assert_eq!(frame[4], MSG_GPS);

                let checksum_pos = frame.len() - 3;
                prop_assert_eq!(xor_checksum(&frame[2..checksum_pos]), frame[checksum_pos]);
            }

            #[test]
            fn every_login_frame_is_well_formed(identity in "[0-9]{15}") {
                let identity = Identity::new(identity).unwrap();
                let frame = encode_login(&identity).unwrap();
                prop_assert_eq!(frame.len(), LOGIN_FRAME_LEN);
                prop_assert_eq!(u16::from_be_bytes([frame[2], frame[3]]), 9);
                let checksum_pos = frame.len() - 3;
                prop_assert_eq!(xor_checksum(&frame[2..checksum_pos]), frame[checksum_pos]);
            }
        }
    }
}
