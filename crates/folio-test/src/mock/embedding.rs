//! Deterministic embedding vectors.

/// Derives a unit-length vector of `dimensions` floats from `input`.
///
/// The same input always yields the same vector.
pub fn mock_embedding(input: &str, dimensions: usize) -> Vec<f32> {
    let mut vector: Vec<f32> = (0..dimensions)
        .map(|i| {
            let seed = input
                .bytes()
                .enumerate()
                .fold(i as u64 + 1, |acc, (pos, byte)| {
                    acc.wrapping_mul(31)
                        .wrapping_add(u64::from(byte) ^ (pos as u64))
                });
            (seed % 2000) as f32 / 1000.0 - 1.0
        })
        .collect();

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }

    vector
}
