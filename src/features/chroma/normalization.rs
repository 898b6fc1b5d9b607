//! Chroma normalization

/// Epsilon added to the norm so silent input does not divide by zero
pub const NORM_EPSILON: f32 = 1e-8;

/// L2 norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|&x| x * x).sum::<f32>().sqrt()
}

/// Scale `chroma` to unit L2 norm
///
/// `epsilon` is added to the norm, so an all-zero vector stays all-zero instead of becoming NaN.
pub fn l2_normalize(chroma: &[f32], epsilon: f32) -> Vec<f32> {
    let norm = l2_norm(chroma) + epsilon;
    chroma.iter().map(|&x| x / norm).collect()
}
