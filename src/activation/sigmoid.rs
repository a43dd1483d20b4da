use std::f64::consts::E;

/// Logistic activation used by every non-sensor unit.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// Derivative of the sigmoid written in terms of its own output, so a unit
/// can scale its error without keeping the pre-activation sum around.
pub fn sigmoid_derivative_from_output(out: f64) -> f64 {
    out * (1.0 - out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_centered_at_half() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let h = 1e-6;
        for &x in &[-2.0, -0.3, 0.0, 0.7, 3.0] {
            let numeric = (sigmoid(x + h) - sigmoid(x - h)) / (2.0 * h);
            let analytic = sigmoid_derivative_from_output(sigmoid(x));
            assert!((numeric - analytic).abs() < 1e-8, "x = {x}");
        }
    }
}
