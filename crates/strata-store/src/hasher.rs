use strata_types::BlobHandle;

/// BLAKE3 content hasher with a domain tag prepended to the input.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for trait artwork blobs.
    pub const BLOB: Self = Self {
        domain: "strata-blob-v1",
    };

    pub fn hash(&self, data: &[u8]) -> BlobHandle {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        BlobHandle::from_hash(*hasher.finalize().as_bytes())
    }
}
