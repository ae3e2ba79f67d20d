// psdate/src/processors/namer.rs
use std::path::{Path, PathBuf};

/// Builds an output path under `dir` that does not exist at call time.
///
/// Tries `stem.ext` first, then `stem_1.ext`, `stem_2.ext`, and so on.
/// The check-then-create window is not locked; the pipeline is strictly
/// sequential, so no second writer can race the reservation.
pub fn reserve_output_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{}.{}", stem, extension));
    let mut counter = 1u32;

    while candidate.exists() {
        candidate = dir.join(format!("{}_{}.{}", stem, counter, extension));
        counter += 1;
    }

    candidate
}
