//! Scenario tests: known-answer cases for both engines and an end-to-end
//! persistence round trip.

use stowage::huffman::{compress, decompress, CodeTree, FrequencyTable};
use stowage::index::{
    BPlusTree, FileEntry, FileIndex, FileMetadata, RedBlackTree, DEFAULT_ORDER,
};

/// The textbook frequency set: the heaviest symbol must land one step
/// below the root, and the total encoded length must beat fixed-width
/// coding by a wide margin.
#[test]
fn textbook_frequencies_build_the_textbook_tree() {
    let table = FrequencyTable::from_counts([
        (b'a', 5),
        (b'b', 9),
        (b'c', 12),
        (b'd', 13),
        (b'e', 16),
        (b'f', 45),
    ])
    .expect("table validates");

    let codes = CodeTree::build(&table).derive_code_table();

    assert_eq!(codes.code(b'f').map(|c| c.len()), Some(1));
    for symbol in [b'a', b'b', b'c', b'd', b'e'] {
        assert!(codes.code(symbol).map(|c| c.len()).expect("coded") >= 3);
    }

    // Weighted code length against 8-bit fixed-width coding of the same
    // 100-symbol stream.
    let total_bits: u64 = table
        .iter()
        .map(|(symbol, count)| count * codes.code(symbol).expect("coded").len() as u64)
        .sum();
    assert_eq!(total_bits, 224);
    assert!(total_bits < 8 * table.total());
}

#[test]
fn textbook_stream_roundtrips_through_the_codec() {
    let mut input = Vec::new();
    for (symbol, count) in [(b'a', 5), (b'b', 9), (b'c', 12), (b'd', 13), (b'e', 16), (b'f', 45)] {
        input.extend(std::iter::repeat(symbol).take(count));
    }

    let stream = compress(&input).expect("compression succeeds");
    assert_eq!(stream.payload_bits(), 224);
    assert_eq!(decompress(&stream).expect("decode"), input);
}

/// Seven names inserted in a fixed order, then an exact hit and an exact
/// miss.
#[test]
fn rb_scenario_finds_g_and_misses_x() {
    let mut tree = RedBlackTree::new();
    for name in ["m", "c", "g", "a", "r", "t", "z"] {
        tree.insert(name.to_string(), format!("/store/{name}"));
    }

    assert_eq!(tree.get("g"), Some(&"/store/g".to_string()));
    assert_eq!(tree.get("x"), None);
    tree.check_invariants().expect("invariants hold");
}

/// An order-4 tree fed 20 sequential keys must stay within the expected
/// height bound and split at least once.
#[test]
fn bp_scenario_twenty_sequential_keys_order_four() {
    let mut tree = BPlusTree::new(4).expect("order 4 is valid");
    for i in 0..20u32 {
        tree.insert(format!("file{i:02}"), i);
    }

    // ⌈log2(20) / log2(4)⌉ + 1
    let bound = ((20f64).log2() / (4f64).log2()).ceil() as usize + 1;
    assert!(
        tree.height() <= bound,
        "height {} exceeds bound {bound}",
        tree.height()
    );
    assert!(tree.leaf_count() > 1, "20 keys must split at least once");
    tree.check_invariants().expect("invariants hold");

    for i in 0..20u32 {
        assert_eq!(tree.get(&format!("file{i:02}")), Some(&i));
    }
}

#[test]
fn search_returns_the_most_recent_value() {
    let mut index = FileIndex::new(DEFAULT_ORDER).expect("default order is valid");
    index
        .insert(FileEntry::new("a.txt", "/a.txt", FileMetadata::plain(1)))
        .expect("insert succeeds");
    index
        .insert(FileEntry::new("a.txt", "/a.txt", FileMetadata::plain(2)))
        .expect("update succeeds");

    assert_eq!(
        index.find_by_name("a.txt").map(|e| e.metadata.size),
        Some(2)
    );
    assert!(index.find_by_name("never-inserted").is_none());
}

/// End to end: compress a corpus, index the container, persist the index,
/// reload it, and decode the container found through the reloaded index.
#[test]
fn compress_index_persist_and_recover() {
    let dir = tempfile::tempdir().expect("temp dir");
    let corpus = b"it was the best of times, it was the worst of times".repeat(8);

    let stream = compress(&corpus).expect("compression succeeds");
    let container_path = dir.path().join("tale.huff");
    std::fs::write(&container_path, stream.to_bytes().expect("serialize")).expect("write");

    let mut index = FileIndex::new(DEFAULT_ORDER).expect("default order is valid");
    index
        .insert(FileEntry::new(
            "tale.huff",
            container_path.to_string_lossy(),
            FileMetadata {
                size: stream.compressed_len() as u64,
                offset: 0,
                compressed: true,
            },
        ))
        .expect("insert succeeds");

    let snapshot = dir.path().join("index.dat");
    index.save(&snapshot).expect("save succeeds");
    let reloaded = FileIndex::load(&snapshot).expect("load succeeds");

    let entry = reloaded
        .find_by_name("tale.huff")
        .expect("entry survives the round trip");
    assert!(entry.metadata.compressed);

    let bytes = std::fs::read(&entry.path).expect("container readable");
    let recovered = stowage::huffman::CompressedStream::from_bytes(&bytes).expect("parses");
    assert_eq!(decompress(&recovered).expect("decode"), corpus);
}
