//! Arbitrary bytes must never panic or abort the dense matrix reader.

#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use pulsecf::{DenseSimilarityMatrix, SimilarityMatrix};

fuzz_target!(|data: &[u8]| {
    if let Ok(sim) = DenseSimilarityMatrix::read_from(&mut Cursor::new(data)) {
        let n = sim.num_entities() as u32;
        for i in 0..n {
            for (j, value) in sim.related(i) {
                assert_eq!(sim.similarity(j, i).to_bits(), value.to_bits());
            }
        }
    }
});
