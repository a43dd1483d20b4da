use rand::Rng;

/// Draws `count` independent weights uniformly from `[-1, 1]`.
pub fn uniform_weights<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}
