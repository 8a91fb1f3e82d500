//! Property tests for fixed-size chunking.

use std::collections::HashMap;

use pdfqa::chunking::{Chunker, FixedSizeChunker};
use pdfqa::document::Document;
use proptest::prelude::*;

fn doc(text: String) -> Document {
    Document { id: "doc_1".to_string(), text, metadata: HashMap::new() }
}

/// For any text and any valid (chunk_size, overlap) pair, concatenating the
/// chunks with the overlap prefix removed from every chunk after the first
/// reconstructs the input exactly.
mod prop_chunk_reconstruction {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn overlap_stripped_concatenation_reconstructs_input(
            text in ".{0,300}",
            chunk_size in 1usize..64,
            overlap_fraction in 0.0f64..1.0,
        ) {
            let overlap = ((chunk_size as f64) * overlap_fraction) as usize;
            prop_assume!(overlap < chunk_size);

            let chunker = FixedSizeChunker::new(chunk_size, overlap).unwrap();
            let chunks = chunker.chunk(&doc(text.clone()));

            let mut reconstructed = String::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let skip = if i == 0 { 0 } else { overlap };
                reconstructed.extend(chunk.text.chars().skip(skip));
            }
            prop_assert_eq!(reconstructed, text);
        }

        #[test]
        fn every_chunk_respects_the_size_bound(
            text in ".{1,300}",
            chunk_size in 1usize..64,
        ) {
            let chunker = FixedSizeChunker::new(chunk_size, chunk_size.saturating_sub(1).min(8)).unwrap();
            let chunks = chunker.chunk(&doc(text));

            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                prop_assert!(chunk.text.chars().count() <= chunk_size);
            }
        }

        #[test]
        fn ordinals_are_dense_and_ids_derive_from_them(
            text in ".{1,300}",
            chunk_size in 2usize..64,
        ) {
            let chunker = FixedSizeChunker::new(chunk_size, 1).unwrap();
            let chunks = chunker.chunk(&doc(text));

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.ordinal, i);
                prop_assert_eq!(&chunk.id, &format!("doc_1_{i}"));
                prop_assert_eq!(&chunk.document_id, "doc_1");
            }
        }
    }
}
