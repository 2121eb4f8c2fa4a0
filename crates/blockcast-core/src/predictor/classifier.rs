//! Threshold classification of the current-block probability.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdClassifier {
    threshold: f64,
}

impl ThresholdClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Inclusive: a probability equal to the threshold predicts active.
    pub fn classify(&self, probability: f64) -> bool {
        probability >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        let c = ThresholdClassifier::new(0.5);
        assert!(c.classify(0.5));
        assert!(c.classify(0.500001));
        assert!(!c.classify(0.499999));
    }

    #[test]
    fn zero_threshold_always_predicts_active() {
        let c = ThresholdClassifier::new(0.0);
        assert!(c.classify(0.0));
    }
}
