//! Test stimulus generation

/// Alternating-sign sweep through powers of `sqrt(2)`
///
/// For `n = 0, 0.5, 1.0, ..., max_exponent` the magnitude
/// `round(2^n - 1)` is emitted twice, negative first. With
/// `max_exponent = 31` this gives 126 samples ending at `+i32::MAX`, which
/// walks a cascade from silence up to full scale.
pub fn alternating_powers(max_exponent: u32) -> Vec<i64> {
    let steps = 2 * max_exponent as usize + 1;
    let mut samples = Vec::with_capacity(2 * steps);
    for step in 0..steps {
        let n = step as f64 * 0.5;
        let magnitude = (n.exp2() - 1.0).round_ties_even() as i64;
        samples.push(-magnitude);
        samples.push(magnitude);
    }
    samples
}
