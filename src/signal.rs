//! Captured signal values and their on-disk text encoding.
//!
//! Every transport reduces a capture to one text field in the button file.
//! Records written by this program carry a transport tag
//! (`ir:<hex>:<bits>`, `rf24:<hex>`, `rf433:<hex>`); files written by the
//! handheld firmware carry bare values with no tag, and those decode as
//! [`Signal::Legacy`] so old remote files keep working unmodified.

use std::fmt;

/// Fixed packet size of the 2.4 GHz radio; payloads are never longer.
pub const MAX_SHORT_RANGE_PAYLOAD: usize = 32;

/// Sub-GHz OOK codes are always sent with this protocol bit length.
pub const SUB_GHZ_BITS: u16 = 24;

/// Which radio a signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// NEC-style infrared.
    Infrared,
    /// 2.4 GHz packet radio (nRF24-class).
    ShortRange,
    /// Sub-GHz OOK (433 MHz class).
    SubGhz,
}

impl Transport {
    pub const ALL: [Transport; 3] = [
        Transport::Infrared,
        Transport::ShortRange,
        Transport::SubGhz,
    ];
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Infrared => write!(f, "IR"),
            Transport::ShortRange => write!(f, "RF24"),
            Transport::SubGhz => write!(f, "RF433"),
        }
    }
}

/// A captured remote-control signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Infrared code with its bit width.
    Infrared { code: u32, bits: u16 },
    /// Raw 2.4 GHz packet payload, up to [`MAX_SHORT_RANGE_PAYLOAD`] bytes.
    ShortRange(Vec<u8>),
    /// Sub-GHz OOK code, transmitted with a fixed 24-bit length.
    SubGhz(u32),
    /// Untagged value from a file written before transport tags existed.
    /// Played back the firmware way: hex-parse and send on every radio.
    Legacy(String),
}

impl Signal {
    /// The transport this signal belongs to, if known.
    pub fn transport(&self) -> Option<Transport> {
        match self {
            Signal::Infrared { .. } => Some(Transport::Infrared),
            Signal::ShortRange(_) => Some(Transport::ShortRange),
            Signal::SubGhz(_) => Some(Transport::SubGhz),
            Signal::Legacy(_) => None,
        }
    }

    /// Encode for storage in a button file. Never contains a newline.
    pub fn to_stored(&self) -> String {
        match self {
            Signal::Infrared { code, bits } => format!("ir:{:x}:{}", code, bits),
            Signal::ShortRange(payload) => format!("rf24:{}", hex_encode(payload)),
            Signal::SubGhz(code) => format!("rf433:{:x}", code),
            Signal::Legacy(text) => text.clone(),
        }
    }

    /// Decode a stored text value.
    ///
    /// Tagged forms parse to their typed variant; anything else, including a
    /// tagged line whose payload fails to parse, is kept verbatim as
    /// `Legacy`. Decoding never fails: a damaged value degrades to the
    /// handheld firmware's untyped behavior instead of aborting a scan.
    pub fn from_stored(text: &str) -> Signal {
        if let Some(rest) = text.strip_prefix("ir:") {
            if let Some((code_s, bits_s)) = rest.split_once(':') {
                if let (Ok(code), Ok(bits)) = (
                    u32::from_str_radix(code_s, 16),
                    bits_s.parse::<u16>(),
                ) {
                    return Signal::Infrared { code, bits };
                }
            }
        } else if let Some(rest) = text.strip_prefix("rf24:") {
            if let Some(payload) = hex_decode(rest) {
                return Signal::ShortRange(payload);
            }
        } else if let Some(rest) = text.strip_prefix("rf433:") {
            if let Ok(code) = u32::from_str_radix(rest, 16) {
                return Signal::SubGhz(code);
            }
        }
        Signal::Legacy(text.to_string())
    }

    /// Short human-readable form for the buttons table.
    pub fn summary(&self) -> String {
        match self {
            Signal::Infrared { code, bits } => format!("{:08X} ({} bits)", code, bits),
            Signal::ShortRange(payload) => {
                format!("{} ({} bytes)", hex_encode(payload), payload.len())
            }
            Signal::SubGhz(code) => format!("{:06X}", code),
            Signal::Legacy(text) => text.clone(),
        }
    }
}

/// Lowercase hex, two digits per byte.
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Inverse of [`hex_encode`]. `None` on odd length or a non-hex digit.
pub fn hex_decode(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(text.len() / 2);
    let bytes = text.as_bytes();
    for pair in bytes.chunks(2) {
        let s = std::str::from_utf8(pair).ok()?;
        out.push(u8::from_str_radix(s, 16).ok()?);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrared_round_trip() {
        let sig = Signal::Infrared { code: 0x20DF10EF, bits: 32 };
        let stored = sig.to_stored();
        assert_eq!(stored, "ir:20df10ef:32");
        assert_eq!(Signal::from_stored(&stored), sig);
    }

    #[test]
    fn test_short_range_round_trip() {
        let sig = Signal::ShortRange(vec![0x00, 0xff, 0x2c, 0x0a]);
        let stored = sig.to_stored();
        assert_eq!(stored, "rf24:00ff2c0a");
        assert_eq!(Signal::from_stored(&stored), sig);
    }

    #[test]
    fn test_sub_ghz_round_trip() {
        let sig = Signal::SubGhz(0x5D1C34);
        let stored = sig.to_stored();
        assert_eq!(stored, "rf433:5d1c34");
        assert_eq!(Signal::from_stored(&stored), sig);
    }

    #[test]
    fn test_untagged_value_decodes_as_legacy() {
        // A line the handheld firmware would have written.
        assert_eq!(
            Signal::from_stored("a1b2c3"),
            Signal::Legacy("a1b2c3".to_string())
        );
    }

    #[test]
    fn test_damaged_tag_falls_back_to_legacy() {
        assert_eq!(
            Signal::from_stored("ir:zz:32"),
            Signal::Legacy("ir:zz:32".to_string())
        );
        assert_eq!(
            Signal::from_stored("rf24:abc"),
            Signal::Legacy("rf24:abc".to_string())
        );
    }

    #[test]
    fn test_legacy_stores_verbatim() {
        let sig = Signal::Legacy("hello,world".to_string());
        assert_eq!(sig.to_stored(), "hello,world");
    }

    #[test]
    fn test_hex_decode_rejects_bad_input() {
        assert_eq!(hex_decode("0g"), None);
        assert_eq!(hex_decode("abc"), None);
        assert_eq!(hex_decode(""), Some(vec![]));
    }
}
