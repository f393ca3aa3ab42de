#![no_main]
use libfuzzer_sys::fuzz_target;

use nbtree::{from_bytes, from_bytes_with_opts, to_bytes, DeOpts};

fuzz_target!(|data: &[u8]| {
    if let Ok(doc) = from_bytes_with_opts(data, DeOpts::new().max_seq_len(100)) {
        // Compare bytes rather than values, NaN floats are not equal to
        // themselves.
        let bs = to_bytes(&doc).unwrap();
        let again = to_bytes(&from_bytes(&bs).unwrap()).unwrap();
        assert_eq!(again, bs);
    }
});
