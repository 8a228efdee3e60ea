#![no_main]
use libfuzzer_sys::fuzz_target;
use oxipuff::HuffmanTable;
use oxipuff::bits::{BufferBitReader, BufferBitWriter};

fuzz_target!(|data: &[u8]| {
    // Arbitrary puff buffers are either rejected or reproduced exactly;
    // over-full code lengths are among the rejected ones.
    let mut ht = HuffmanTable::new();
    let mut bits = [0u8; 1024];
    let mut bw = BufferBitWriter::new(&mut bits);
    if ht.build_dynamic_table_encode(data, &mut bw).is_err() {
        return;
    }
    let mut out = bw.finish().expect("flush").to_vec();
    // Block data follows a header in a real stream; the decoder may look
    // ahead a full code width past the last token.
    out.extend_from_slice(&[0; 2]);

    let mut br = BufferBitReader::new(&out);
    let mut puff = [0u8; 512];
    let len = ht
        .build_dynamic_table_decode(&mut br, &mut puff)
        .expect("encoded header must decode");
    assert_eq!(&puff[..len], data);
});
