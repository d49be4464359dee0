use etfpack::{encoding::compressed::compress_envelope, prelude::*};
use etfpack_strategy::*;
use flate2::Compression;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 500, ..ProptestConfig::default() })]

    #[test]
    fn compressed_round_trip(v in arb_value(), level in 0u32..=9) {
        let plain = encode_full(&v).unwrap();
        let packed = compress_envelope(&plain, Compression::new(level)).unwrap();

        prop_assert_eq!(decode_full(&packed), Ok(v));
    }

    #[test]
    fn corrupt_checksum(v in arb_value()) {
        let plain = encode_full(&v).unwrap();
        let mut packed = compress_envelope(&plain, Compression::default()).unwrap().to_vec();

        let last = packed.len() - 1;
        packed[last] ^= 0xff;

        prop_assert!(matches!(decode_full(&packed), Err(Error::Decompression(_))));
    }
}

fn envelope() -> Vec<u8> {
    let v = Value::from(vec![Value::atom("compressed"); 20]);
    compress_envelope(&encode_full(&v).unwrap(), Compression::default())
        .unwrap()
        .to_vec()
}

#[test]
fn wrong_declared_size() {
    let mut packed = envelope();
    packed[5] = packed[5].wrapping_add(1);

    assert!(matches!(
        decode_full(&packed),
        Err(Error::Decompression(_))
    ));
}

#[test]
fn corrupt_header() {
    let mut packed = envelope();
    // first byte of the zlib stream
    packed[6] = 0;

    let mut dec = Decoder::new(&packed, None).unwrap();
    assert!(matches!(dec.unpack(), Err(Error::Decompression(_))));
    assert!(dec.is_invalid());
}

#[test]
fn truncated_stream() {
    let packed = envelope();

    assert!(matches!(
        decode_full(&packed[..packed.len() - 4]),
        Err(Error::Decompression(_))
    ));
}

#[test]
fn cursor_moves_past_the_envelope() {
    let mut stream = envelope();
    stream.extend_from_slice(&[97, 7]);

    let terms = decode_all(&stream).unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[1], Value::from(7));
}

#[test]
fn nested_envelopes() {
    let inner = envelope();
    // drop the inner version byte and wrap it again
    let mut stream = vec![131];
    stream.extend_from_slice(&inner[1..]);
    let outer = compress_envelope(&stream, Compression::fast()).unwrap();

    assert_eq!(
        decode_full(&outer).unwrap(),
        Value::from(vec![Value::atom("compressed"); 20])
    );
}
