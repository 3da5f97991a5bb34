/// Arithmetic mean; 0.0 for an empty sample.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (n − 1); 0.0 when fewer than two samples.
pub fn stdev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let variance =
        samples.iter().map(|s| (s - m).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_known_sample() {
        assert!((mean(&[10.0, 20.0, 30.0]) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn mean_of_empty_sample_is_zero() {
        assert!((mean(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stdev_of_constant_sample_is_zero() {
        assert!((stdev(&[5.0, 5.0, 5.0]) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn stdev_of_known_sample() {
        // Sample stdev of [2, 4, 4, 4, 5, 5, 7, 9] is ~2.138.
        let s = stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - 2.138).abs() < 0.01);
    }

    #[test]
    fn stdev_of_single_sample_is_zero() {
        assert!((stdev(&[42.0]) - 0.0).abs() < f64::EPSILON);
    }
}
