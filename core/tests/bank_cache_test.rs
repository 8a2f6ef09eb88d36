use mvs_core::cache::BankCache;
use mvs_core::cache::bank::{BANK_SIZE, Backend};

struct SlicedImage(Vec<u8>);

impl Backend for SlicedImage {
    fn fetch(&self, addr: u32, out: &mut [u8]) {
        for (i, b) in out.iter_mut().enumerate() {
            let src = addr as usize + i;
            *b = *self.0.get(src).unwrap_or(&0xFF);
        }
    }
}

#[test]
fn cached_lookup_returns_bytes_from_the_backend() {
    let image: Vec<u8> = (0..(BANK_SIZE as u32 * 4)).map(|i| i as u8).collect();
    let mut cache = BankCache::cached(SlicedImage(image));

    let window = cache.lookup(BANK_SIZE as u32 * 2);
    assert_eq!(window[0], (BANK_SIZE * 2) as u8);
}

#[test]
fn repeated_lookup_of_the_same_window_is_stable() {
    let image: Vec<u8> = (0..(BANK_SIZE as u32 * 4)).map(|i| i as u8).collect();
    let mut cache = BankCache::cached(SlicedImage(image));

    let a = *cache.lookup(0);
    let b = *cache.lookup(0);
    assert_eq!(a, b);
}

#[test]
fn lookup_past_the_end_of_the_image_pads_with_the_backend_fill_value() {
    let image: Vec<u8> = vec![0x11; BANK_SIZE];
    let mut cache = BankCache::cached(SlicedImage(image));

    let window = cache.lookup(BANK_SIZE as u32 * 10);
    assert_eq!(window[0], 0xFF);
}

#[test]
#[should_panic(expected = "lookup() called on a linear")]
fn lookup_on_a_linear_cache_panics() {
    let mut cache: BankCache<SlicedImage> = BankCache::linear(vec![1, 2, 3]);
    cache.lookup(0);
}
