//! Vector Similarity Functions
//!
//! Dot product, cosine similarity and L2 normalization over `f32` slices.

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len().min(b.len());
    let chunks = len / 4;
    let mut sum = 0.0f32;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    for i in (chunks * 4)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// Euclidean norm
#[inline]
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity for vectors of any length.
///
/// Returns 0.0 when either side has zero magnitude.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = magnitude(a) * magnitude(b);
    if denom > 0.0 {
        (dot_product(a, b) / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Normalize a vector in place. Zero vectors are left untouched.
pub fn normalize_vector(v: &mut [f32]) {
    let mag = magnitude(v);
    if mag > 0.0 {
        for x in v.iter_mut() {
            *x /= mag;
        }
    }
}

/// Unit-length copy of `v`.
///
/// Fails with a reason when the vector cannot be normalized: empty, NaN or
/// infinite components, zero magnitude, or a magnitude outside f32 range.
pub fn normalized(v: &[f32]) -> Result<Vec<f32>, String> {
    if v.is_empty() {
        return Err("vector is empty".to_string());
    }
    if let Some(pos) = v.iter().position(|x| !x.is_finite()) {
        return Err(format!("component {} is not finite ({})", pos, v[pos]));
    }
    let mag = magnitude(v);
    if mag.is_infinite() {
        return Err("vector magnitude overflows f32".to_string());
    }
    if !mag.is_normal() {
        if v.iter().all(|x| *x == 0.0) {
            return Err("vector has zero magnitude".to_string());
        }
        return Err("vector magnitude underflows f32".to_string());
    }
    Ok(v.iter().map(|x| x / mag).collect())
}
