//! Arbitrary bytes must never panic the model loader, for either matrix layout.

#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use pulsecf::{DenseSimilarityMatrix, NeighborModel, SimilarityMatrix, SparseSimilarityMatrix};

/// Anything that loads is internally consistent.
fn check_loaded<S: SimilarityMatrix>(model: &NeighborModel<S>) {
    for e in 0..model.num_entities() as u32 {
        let row = model.neighbors(e);
        assert!(row.len() <= model.k());
        assert!(row.iter().all(|&n| (n as usize) < model.num_entities() && n != e));
    }
    assert!(model.similarity().num_entities() >= model.num_entities());
}

fuzz_target!(|data: &[u8]| {
    if let Ok(model) = NeighborModel::<SparseSimilarityMatrix>::load(&mut Cursor::new(data)) {
        check_loaded(&model);
    }
    if let Ok(model) = NeighborModel::<DenseSimilarityMatrix>::load(&mut Cursor::new(data)) {
        check_loaded(&model);
    }
});
