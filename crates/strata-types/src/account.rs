use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a caller: the operator, a minter, or an item owner.
///
/// Strata does not manage keys or authentication. An `AccountId` is whatever
/// the host hands in as the caller of a request; the collection only compares
/// accounts for equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    hash: [u8; 32],
}

impl AccountId {
    /// Derive an `AccountId` from a human-readable label.
    pub fn derive(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"strata-account-v1:");
        hasher.update(label.as_bytes());
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("acct:{}", hex::encode(&self.hash[..4]))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
