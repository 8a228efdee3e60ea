#![no_main]
use libfuzzer_sys::fuzz_target;
use oxipuff::HuffmanTable;
use oxipuff::bits::{BitWrite, BufferBitReader, BufferBitWriter};

fuzz_target!(|data: &[u8]| {
    // Arbitrary header bits must decode to an error or to a puff buffer
    // that encodes back to exactly the bits consumed.
    let mut ht = HuffmanTable::new();
    let mut br = BufferBitReader::new(data);
    let mut puff = [0u8; 512];
    let Ok(len) = ht.build_dynamic_table_decode(&mut br, &mut puff) else {
        return;
    };
    let consumed = br.bits_consumed();

    let mut bits = [0u8; 1024];
    let mut bw = BufferBitWriter::new(&mut bits);
    ht.build_dynamic_table_encode(&puff[..len], &mut bw)
        .expect("decoded header must re-encode");
    let written = bw.bits_written();
    let out = bw.finish().expect("flush");
    assert_eq!(written, consumed);
    assert_eq!(&out[..consumed / 8], &data[..consumed / 8]);
});
