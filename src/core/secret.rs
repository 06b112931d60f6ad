// Master secret normalization

use std::fmt;

/// Root key material for per-entity key derivation, normalized to raw bytes.
///
/// The configured value may arrive in one of two shapes, resolved exactly
/// once at startup rather than re-sniffed per request:
/// - 63 or 64 hexadecimal characters: a 63-character value lost its leading
///   zero somewhere in the config pipeline and is zero-padded back to 64
///   before decoding into 32 raw bytes.
/// - anything else: taken verbatim as UTF-8 bytes.
#[derive(Clone, PartialEq, Eq)]
pub enum MasterSecret {
    Hex(Vec<u8>),
    Raw(Vec<u8>),
}

impl MasterSecret {
    /// Parse a configured secret string into normalized key material.
    pub fn parse(raw: &str) -> Result<Self, String> {
        if is_hex_shaped(raw) {
            let padded = if raw.len() == 63 {
                format!("0{}", raw)
            } else {
                raw.to_string()
            };
            let bytes = hex::decode(&padded)
                .map_err(|e| format!("master secret looked hexadecimal but failed to decode: {}", e))?;
            Ok(MasterSecret::Hex(bytes))
        } else {
            Ok(MasterSecret::Raw(raw.as_bytes().to_vec()))
        }
    }

    /// The normalized HMAC key bytes.
    pub fn key_bytes(&self) -> &[u8] {
        match self {
            MasterSecret::Hex(bytes) => bytes,
            MasterSecret::Raw(bytes) => bytes,
        }
    }
}

// Key material must never reach logs, not even via {:?}
impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            MasterSecret::Hex(_) => "Hex",
            MasterSecret::Raw(_) => "Raw",
        };
        write!(f, "MasterSecret::{}(<REDACTED>)", variant)
    }
}

/// True when the string is exactly the 63-or-64 hex-character shape.
fn is_hex_shaped(s: &str) -> bool {
    (s.len() == 63 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}
