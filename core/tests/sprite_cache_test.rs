use mvs_core::cache::SpriteCache;

#[test]
fn working_set_under_capacity_never_evicts() {
    let mut cache = SpriteCache::new(16, 64);
    for key in 0..32u32 {
        let slot = cache.insert(key);
        slot[0] = key as u8;
        cache.tick();
    }
    for key in 0..32u32 {
        assert_eq!(cache.lookup(key).unwrap()[0], key as u8);
    }
}

#[test]
fn repeated_insert_of_same_key_overwrites_rather_than_duplicates() {
    let mut cache = SpriteCache::new(8, 4);
    let slot = cache.insert(0xAA);
    slot[0] = 1;
    let slot = cache.insert(0xAA);
    slot[0] = 2;
    assert_eq!(cache.lookup(0xAA).unwrap()[0], 2);
}

#[test]
fn repeated_insert_of_the_same_key_does_not_leak_arena_slots() {
    // A cache with room for only one entry: if re-inserting an
    // already-present key ever consumed a fresh arena slot instead of
    // reusing the existing one, the free list would run dry and this
    // would panic well before the 100th insert.
    let mut cache = SpriteCache::new(8, 1);
    for i in 0..100u8 {
        let slot = cache.insert(0xAA);
        slot[0] = i;
    }
    assert_eq!(cache.lookup(0xAA).unwrap()[0], 99);
}

#[test]
fn thrashing_a_small_cache_past_capacity_recycles_without_panicking() {
    let mut cache = SpriteCache::new(16, 8);
    for round in 0..50u32 {
        for slot_in_round in 0..8u32 {
            let key = round * 8 + slot_in_round;
            cache.insert(key);
        }
        cache.tick();
        cache.tick();
        cache.tick();
    }
}
