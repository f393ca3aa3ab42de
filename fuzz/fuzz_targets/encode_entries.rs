#![no_main]
use libfuzzer_sys::fuzz_target;

use nbtree::de::decode_with_opts;
use nbtree::{canonical::sort_keys, encode, Compound, DeOpts};

fuzz_target!(|entries: Compound| {
    // Strings past u16::MAX bytes are rejected, anything else must round trip.
    if let Ok(bs) = encode(&entries) {
        let opts = DeOpts::new().max_depth(usize::MAX);
        let (back, offset) = decode_with_opts(&bs, 0, opts).unwrap();
        assert_eq!(offset, bs.len());
        assert_eq!(encode(&back).unwrap(), bs);

        let sorted = sort_keys(&back);
        assert_eq!(encode(&sort_keys(&sorted)).unwrap(), encode(&sorted).unwrap());
    }
});
