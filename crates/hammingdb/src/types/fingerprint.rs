//! The fingerprint value type.

use std::fmt;

use crate::error::Result;

/// An immutable fixed-width binary hash, such as a perceptual image
/// fingerprint or a SimHash.
///
/// A fingerprint is plain bytes; its width is validated against the index
/// configuration at insert and lookup time, not at construction. Ordering
/// and equality are bytewise, so fingerprints can key ordered maps.
///
/// # Example
///
/// ```
/// use hammingdb::Fingerprint;
///
/// let fp = Fingerprint::from_hex("deadbeef").unwrap();
/// assert_eq!(fp.len(), 4);
/// assert_eq!(fp.to_hex(), "deadbeef");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    /// Create a fingerprint from raw bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a fingerprint from a hex string.
    ///
    /// Accepts upper- and lowercase digits; the string must have even
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Hex`](crate::IndexError::Hex) on malformed
    /// input.
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s)?))
    }

    /// Format the fingerprint as lowercase hex, two digits per byte.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The width in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the fingerprint has zero width.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Fingerprint {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let fp = Fingerprint::from_hex("00ff10ab").unwrap();
        assert_eq!(fp.as_bytes(), &[0x00, 0xFF, 0x10, 0xAB]);
        assert_eq!(fp.to_hex(), "00ff10ab");
    }

    #[test]
    fn uppercase_input_formats_lowercase() {
        let fp = Fingerprint::from_hex("DEADBEEF").unwrap();
        assert_eq!(fp.to_hex(), "deadbeef");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Fingerprint::from_hex("xyz").is_err());
        assert!(Fingerprint::from_hex("abc").is_err()); // odd length
    }

    #[test]
    fn debug_shows_hex() {
        let fp = Fingerprint::new(vec![0xDE, 0xAD]);
        assert_eq!(format!("{fp:?}"), "Fingerprint(dead)");
        assert_eq!(fp.to_string(), "dead");
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = Fingerprint::new(vec![0x00, 0x01]);
        let b = Fingerprint::new(vec![0x00, 0x02]);
        assert!(a < b);
    }
}
