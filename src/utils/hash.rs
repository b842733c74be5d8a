use std::{
    collections::HashMap,
    hash::{BuildHasherDefault, Hasher},
};

// ----------------------------------------------
// PreHashedKeyMap / IdentityHasher
// ----------------------------------------------

#[derive(Default)]
pub struct IdentityHasher {
    hash: u64,
}

// Hasher for maps where the key is a u64 that is itself already
// the hash of some data, so no further hashing is needed.
// Just returns the value as is.
impl Hasher for IdentityHasher {
    fn write(&mut self, _: &[u8]) {
        panic!("Only write_u64 is supported!");
    }

    #[inline]
    fn write_u64(&mut self, h: u64) {
        self.hash = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

pub type PreHashedBuildHasher = BuildHasherDefault<IdentityHasher>;
pub type PreHashedKeyMap<K, V> = HashMap<K, V, PreHashedBuildHasher>;

// ----------------------------------------------
// FNV-1a hash utilities
// ----------------------------------------------

pub type FNV1aHash = u64;
pub type StringHash = FNV1aHash;
pub const NULL_HASH: FNV1aHash = 0;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub const fn fnv1a_from_str(s: &str) -> FNV1aHash {
    if s.is_empty() {
        return NULL_HASH;
    }

    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;

    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }

    hash
}

// Incremental FNV-1a, for hashing sequences of values piece by piece.
#[derive(Copy, Clone)]
pub struct FNV1aHasher {
    hash: FNV1aHash,
}

impl FNV1aHasher {
    #[inline]
    pub const fn new() -> Self {
        Self { hash: FNV_OFFSET }
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        for byte in value.to_le_bytes() {
            self.hash ^= byte as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    pub fn mix_u64(&mut self, value: u64) {
        for byte in value.to_le_bytes() {
            self.hash ^= byte as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    pub const fn finish(&self) -> FNV1aHash {
        self.hash
    }
}

impl Default for FNV1aHasher {
    fn default() -> Self {
        Self::new()
    }
}
