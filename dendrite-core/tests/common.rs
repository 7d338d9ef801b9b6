use dendrite_core::buffer::{self, Buffer};

#[allow(dead_code)]
pub fn buf(data: Vec<f32>, shape: &[usize]) -> Buffer {
    buffer::from_vec(data, shape).expect("Test buffer creation failed")
}

#[allow(dead_code)]
pub fn assert_close(actual: &Buffer, expected: &Buffer, tol: f32) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tol,
            "element {}: {} vs {} (tol {})",
            i,
            a,
            e,
            tol
        );
    }
}

/// Deterministic, non-symmetric test data.
#[allow(dead_code)]
pub fn ramp(shape: &[usize], offset: f32) -> Buffer {
    let n: usize = shape.iter().product();
    let data = (0..n)
        .map(|i| ((i as f32 * 0.37 + offset).sin()) * 0.8)
        .collect();
    buf(data, shape)
}
