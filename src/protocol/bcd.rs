//! BCD packing for device identities and timestamps.
//!
//! GT06 packs two decimal digits per byte, first digit in the high nibble.
//! Identities are 15 decimal digits left-padded to 16 before packing, so
//! an identity always occupies exactly 8 bytes on the wire. Timestamps
//! occupy 6 bytes: {year mod 100, month, day, hour, minute, second}.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::{Result, SimulatorError};

/// Number of decimal digits in a device identity (IMEI).
pub const IDENTITY_DIGITS: usize = 15;

/// Wire size of a BCD-packed identity.
pub const IDENTITY_BCD_LEN: usize = 8;

/// Wire size of a BCD-packed timestamp.
pub const TIMESTAMP_BCD_LEN: usize = 6;

/// A validated 15-digit device identity.
///
/// Validation happens once at construction; encoding is then infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    /// Validate and wrap a device identity string.
    pub fn new(identity: impl Into<String>) -> Result<Self> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(SimulatorError::InvalidIdentity { identity, reason: "empty string" });
        }
        if !identity.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SimulatorError::InvalidIdentity {
                identity,
                reason: "contains non-digit characters",
            });
        }
        if identity.len() != IDENTITY_DIGITS {
            return Err(SimulatorError::InvalidIdentity {
                identity,
                reason: "must be exactly 15 digits",
            });
        }
        Ok(Identity(identity))
    }

    /// The identity as its decimal string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pack the identity into 8 BCD bytes.
    ///
    /// The 15-digit identity is left-padded with one leading zero to 16
    /// digits, then packed two digits per byte, high nibble first.
    pub fn to_bcd(&self) -> [u8; IDENTITY_BCD_LEN] {
        let mut padded = [0u8; 2 * IDENTITY_BCD_LEN];
        let digits = self.0.as_bytes();
        let pad = padded.len() - digits.len();
        for (i, d) in digits.iter().enumerate() {
            padded[pad + i] = d - b'0';
        }

        let mut out = [0u8; IDENTITY_BCD_LEN];
        for (i, pair) in padded.chunks_exact(2).enumerate() {
            out[i] = (pair[0] << 4) | pair[1];
        }
        out
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unpack BCD bytes back into a decimal digit string.
///
/// Inverse of the nibble packing; used by tests and by diagnostics that
/// print received frames.
pub fn decode_bcd(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(char::from(b'0' + (b >> 4)));
        out.push(char::from(b'0' + (b & 0x0F)));
    }
    out
}

/// Pack a UTC moment into 6 BCD bytes: YY MM DD HH MM SS.
pub fn encode_timestamp(moment: &DateTime<Utc>) -> [u8; TIMESTAMP_BCD_LEN] {
    [
        bcd((moment.year().rem_euclid(100)) as u8),
        bcd(moment.month() as u8),
        bcd(moment.day() as u8),
        bcd(moment.hour() as u8),
        bcd(moment.minute() as u8),
        bcd(moment.second() as u8),
    ]
}

/// Pack a value below 100 into one BCD byte, tens digit in the high nibble.
fn bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn identity_rejects_empty_and_non_digit_input() {
        assert!(matches!(
            Identity::new(""),
            Err(SimulatorError::InvalidIdentity { reason: "empty string", .. })
        ));
        assert!(matches!(
            Identity::new("12345678901234x"),
            Err(SimulatorError::InvalidIdentity { reason: "contains non-digit characters", .. })
        ));
        assert!(matches!(
            Identity::new("1234"),
            Err(SimulatorError::InvalidIdentity { reason: "must be exactly 15 digits", .. })
        ));
    }

    #[test]
    fn identity_packs_with_leading_zero_pad() {
        let identity = Identity::new("123456789012345").unwrap();
        assert_eq!(
            identity.to_bcd(),
            [0x01, 0x23, 0x45, 0x67, 0x89, 0x01, 0x23, 0x45]
        );
    }

    #[test]
    fn timestamp_packs_each_field_as_two_digits() {
        let moment = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 8).unwrap();
        assert_eq!(encode_timestamp(&moment), [0x24, 0x12, 0x31, 0x23, 0x59, 0x08]);
    }

    #[test]
    fn timestamp_year_wraps_at_century() {
        let moment = Utc.with_ymd_and_hms(2100, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(encode_timestamp(&moment)[0], 0x00);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn identity_bcd_round_trips_through_decode(identity in "[0-9]{15}") {
                let packed = Identity::new(identity.clone()).unwrap().to_bcd();
                // decode yields the 16-digit padded form
                prop_assert_eq!(decode_bcd(&packed), format!("0{identity}"));
            }

            #[test]
            fn every_nibble_stays_decimal(identity in "[0-9]{15}") {
                let packed = Identity::new(identity).unwrap().to_bcd();
                for b in packed {
                    prop_assert!(b >> 4 <= 9);
                    prop_assert!(b & 0x0F <= 9);
                }
            }
        }
    }
}
