use crate::buffer::{self, Buffer};

/// Checks that a buffer has the expected shape and data within tolerance.
/// Panics if shapes differ or data differs significantly.
pub fn check_buffer_near(
    actual: &Buffer,
    expected_shape: &[usize],
    expected_data: &[f32],
    tolerance: f32,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    assert_eq!(actual.len(), expected_data.len(), "Data length mismatch");

    for (i, (a, e)) in actual.iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Helper to create a buffer for testing purposes.
pub fn create_test_buffer(data: Vec<f32>, shape: &[usize]) -> Buffer {
    buffer::from_vec(data, shape).expect("Failed to create test buffer")
}

/// Deterministic, non-symmetric values in roughly [-1, 1] for gradient checks.
pub fn pattern_buffer(shape: &[usize], seed: usize) -> Buffer {
    let n: usize = shape.iter().product();
    let data = (0..n)
        .map(|i| (((i + seed) * 7 % 13) as f32 - 6.0) / 6.5)
        .collect();
    create_test_buffer(data, shape)
}
