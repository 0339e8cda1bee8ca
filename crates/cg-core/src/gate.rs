//! Confidence gate: flag predictions the user should not trust blindly.

/// Default warning threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// True when the prediction should carry a low-confidence warning.
///
/// Strict comparison: a confidence exactly at the threshold does not warn.
pub fn warns(confidence: f32, threshold: f32) -> bool {
    confidence < threshold
}

/// Clamp a configured threshold into [0, 1].
pub fn clamp_threshold(threshold: f32) -> f32 {
    threshold.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_below_threshold() {
        assert!(warns(0.49, DEFAULT_THRESHOLD));
        assert!(warns(0.0, DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_no_warning_at_or_above_threshold() {
        // Boundary: exactly at the threshold does not warn
        assert!(!warns(0.5, DEFAULT_THRESHOLD));
        assert!(!warns(0.92, DEFAULT_THRESHOLD));
        assert!(!warns(1.0, DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_custom_threshold() {
        assert!(warns(0.79, 0.8));
        assert!(!warns(0.8, 0.8));
    }

    #[test]
    fn test_clamp_threshold() {
        assert_eq!(clamp_threshold(-0.5), 0.0);
        assert_eq!(clamp_threshold(1.5), 1.0);
        assert_eq!(clamp_threshold(0.5), 0.5);
    }
}
