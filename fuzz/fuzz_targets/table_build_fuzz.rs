#![no_main]
use libfuzzer_sys::fuzz_target;
use oxipuff::huffman::{CodeBuilder, DecodeTable, EncodeTable, MAX_HUFFMAN_BITS};

fuzz_target!(|data: &[u8]| {
    // Treat each byte as a code length; over-full sets fail to build, and
    // every set that builds must agree both ways.
    let lens: Vec<u8> = data.iter().take(288).map(|b| b % 16).collect();
    let mut codes = CodeBuilder::new();
    let mut dec = DecodeTable::with_capacity_bits(MAX_HUFFMAN_BITS);
    let mut enc = EncodeTable::with_size(lens.len());
    if dec.build(&lens, &mut codes).is_err() {
        return;
    }
    enc.build(&lens, &mut codes).expect("same lengths build both ways");
    for (symbol, &len) in lens.iter().enumerate().filter(|(_, l)| **l != 0) {
        let code = enc.code(symbol).expect("used symbol has a code");
        assert_eq!(dec.lookup(u32::from(code)), Some(symbol as u16));
        assert!(len <= MAX_HUFFMAN_BITS);
    }
});
