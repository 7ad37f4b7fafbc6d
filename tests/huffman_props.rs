//! Property tests for the Huffman engine: round-trip exactness,
//! prefix-freeness, and container self-sufficiency.

use proptest::prelude::*;
use stowage::huffman::{compress, decompress, CodeTree, CompressedStream, FrequencyTable};

proptest! {
    #[test]
    fn roundtrip_restores_every_nonempty_input(
        input in proptest::collection::vec(any::<u8>(), 1..512),
    ) {
        let stream = compress(&input).expect("compression succeeds on non-empty input");
        let restored = decompress(&stream).expect("decompression succeeds");
        prop_assert_eq!(restored, input);
    }

    #[test]
    fn roundtrip_survives_container_serialization(
        input in proptest::collection::vec(any::<u8>(), 1..256),
    ) {
        let bytes = compress(&input)
            .expect("compression succeeds")
            .to_bytes()
            .expect("serialization succeeds");
        let stream = CompressedStream::from_bytes(&bytes).expect("container parses");
        prop_assert_eq!(decompress(&stream).expect("decode"), input);
    }

    #[test]
    fn no_code_is_a_prefix_of_another(
        input in proptest::collection::vec(any::<u8>(), 2..512),
    ) {
        let table = FrequencyTable::estimate(&input).expect("estimation succeeds");
        let codes = CodeTree::build(&table).derive_code_table();

        let words: Vec<_> = codes.iter().collect();
        for (i, (_, a)) in words.iter().enumerate() {
            for (j, (_, b)) in words.iter().enumerate() {
                if i == j {
                    continue;
                }
                let shorter = a.len().min(b.len());
                prop_assert_ne!(
                    &a[..shorter], &b[..shorter],
                    "codes {} and {} share a prefix", i, j
                );
            }
        }
    }

    #[test]
    fn encoded_length_matches_the_code_table(
        input in proptest::collection::vec(any::<u8>(), 1..512),
    ) {
        let table = FrequencyTable::estimate(&input).expect("estimation succeeds");
        let codes = CodeTree::build(&table).derive_code_table();
        let expected_bits: u64 = input
            .iter()
            .map(|&b| codes.code(b).expect("every input symbol is coded").len() as u64)
            .sum();

        let stream = compress(&input).expect("compression succeeds");
        prop_assert_eq!(stream.payload_bits(), expected_bits);
        prop_assert_eq!(stream.original_len(), input.len() as u64);
    }

    #[test]
    fn repeated_single_symbol_roundtrips(symbol in any::<u8>(), len in 1usize..300) {
        let input = vec![symbol; len];
        let stream = compress(&input).expect("compression succeeds");
        // Documented convention: a single-symbol alphabet codes at one bit
        // per symbol.
        prop_assert_eq!(stream.payload_bits(), len as u64);
        prop_assert_eq!(decompress(&stream).expect("decode"), input);
    }

    #[test]
    fn identical_inputs_produce_identical_streams(
        input in proptest::collection::vec(any::<u8>(), 1..256),
    ) {
        let first = compress(&input).expect("compression succeeds");
        let second = compress(&input).expect("compression succeeds");
        prop_assert_eq!(first, second);
    }
}
