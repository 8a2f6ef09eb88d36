//! Banked cartridge data cache (§4.B): a 2-way set-associative cache of
//! small windows into a cartridge region too large to hold uncompressed in
//! working memory. No direct analogue in the original hardware emulator
//! (which mapped the whole cartridge image into host RAM); this is
//! grounded stylistically on `sprite_cache.c`'s golden-ratio hashing and
//! pseudo-random eviction, adapted to a fixed 2-way set instead of a
//! chained bucket.

use super::Xorshift32;

/// Bytes per cached window, plus the two spill bytes that let a 32-bit
/// read straddle a bank boundary without a second lookup (§4.B).
pub const BANK_SIZE: usize = 64;
const SLOT_BYTES: usize = BANK_SIZE + 2;
const NUM_BUCKETS: usize = 4096;
const WAYS: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Tag(u32);

const EMPTY_TAG: Tag = Tag(u32::MAX);

struct Way {
    tag: Tag,
    data: [u8; SLOT_BYTES],
}

impl Way {
    fn empty() -> Self {
        Way { tag: EMPTY_TAG, data: [0u8; SLOT_BYTES] }
    }
}

/// Either a direct pointer to the whole cartridge image (when it fits in
/// RAM) or a 2-way set-associative cache over a `Backend` that fetches
/// windows on demand (§4.B "Contract").
pub enum BankCache<B: Backend> {
    Linear(Vec<u8>),
    Cached { backend: B, buckets: Vec<[Way; WAYS]>, rng: Xorshift32 },
}

/// Supplies cartridge bytes on a cache miss. Implemented by whatever holds
/// the full (possibly memory-mapped or lazily-loaded) cartridge image.
pub trait Backend {
    /// Fill `out` with `out.len()` bytes starting at `addr`, zero-padding
    /// past the end of the image.
    fn fetch(&self, addr: u32, out: &mut [u8]);
}

impl<B: Backend> BankCache<B> {
    pub fn linear(data: Vec<u8>) -> Self {
        BankCache::Linear(data)
    }

    pub fn cached(backend: B) -> Self {
        let mut buckets = Vec::with_capacity(NUM_BUCKETS);
        buckets.resize_with(NUM_BUCKETS, || [Way::empty(), Way::empty()]);
        BankCache::Cached { backend, buckets, rng: Xorshift32::new(0xFACADE) }
    }

    /// Direct pointer into the cartridge image, when it's small enough to
    /// keep wholly in RAM (§4.B "Contract: `linear()`").
    pub fn linear_slice(&self) -> Option<&[u8]> {
        match self {
            BankCache::Linear(data) => Some(data),
            BankCache::Cached { .. } => None,
        }
    }

    /// Look up the `BANK_SIZE + 2`-byte window containing `addr`, loading
    /// it from the backend on a cache miss.
    pub fn lookup(&mut self, addr: u32) -> &[u8; SLOT_BYTES] {
        match self {
            BankCache::Linear(_) => panic!("lookup() called on a linear (non-cached) bank cache"),
            BankCache::Cached { backend, buckets, rng } => {
                let window_base = addr & !(BANK_SIZE as u32 - 1);
                let bucket_idx = bucket_index(window_base);
                let bucket = &mut buckets[bucket_idx];

                if let Some(way) = bucket.iter().position(|w| w.tag == Tag(window_base)) {
                    return array_ref(&bucket[way].data);
                }

                let way = (rng.next_u32() as usize) % WAYS;
                backend.fetch(window_base, &mut bucket[way].data);
                bucket[way].tag = Tag(window_base);
                array_ref(&bucket[way].data)
            }
        }
    }
}

fn array_ref(data: &[u8; SLOT_BYTES]) -> &[u8; SLOT_BYTES] {
    data
}

fn bucket_index(window_base: u32) -> usize {
    let aligned = window_base / BANK_SIZE as u32;
    (aligned.wrapping_mul(super::GOLDEN) as usize) & (NUM_BUCKETS - 1)
}
