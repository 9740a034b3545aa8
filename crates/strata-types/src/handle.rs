use std::fmt;

use serde::{Deserialize, Serialize};

/// Content hash of a blob, issued by the store when bytes are written.
///
/// Traits that share artwork share a handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlobHandle([u8; 32]);

impl BlobHandle {
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// First four bytes in hex, for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobHandle({})", self.short_hex())
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_full_hex() {
        let handle = BlobHandle::from_hash([0x5a; 32]);
        assert_eq!(handle.to_string(), "5a".repeat(32));
    }

    #[test]
    fn debug_uses_short_hex() {
        let handle = BlobHandle::from_hash([0xab; 32]);
        assert_eq!(format!("{handle:?}"), "BlobHandle(abababab)");
    }
}
