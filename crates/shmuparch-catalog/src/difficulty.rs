//! Difficulty normalization across the Western and Japanese indices

use crate::DifficultyScale;

/// Lowest value on the unified scale
pub const UNIFIED_MIN: u8 = 1;

/// Highest value on the unified scale
pub const UNIFIED_MAX: u8 = 10;

/// Project a raw rating onto the unified 1-10 scale.
///
/// Western values pass through. Japanese values are rescaled linearly
/// (0 maps to 1, 45 maps to 10) and rounded to the nearest integer.
/// Out-of-scale input is rejected when the catalog loads, so the clamp here
/// only guards the output range.
pub fn normalize(value: u8, scale: DifficultyScale) -> u8 {
    match scale {
        DifficultyScale::Western => value.clamp(UNIFIED_MIN, UNIFIED_MAX),
        DifficultyScale::Japanese => {
            let (min, max) = scale.bounds();
            let span = u32::from(max - min);
            let steps = u32::from(UNIFIED_MAX - UNIFIED_MIN);
            let offset = u32::from(value.saturating_sub(min));
            let scaled = (offset * steps + span / 2) / span;
            let unified = u32::from(UNIFIED_MIN) + scaled;
            unified.clamp(u32::from(UNIFIED_MIN), u32::from(UNIFIED_MAX)) as u8
        }
    }
}

/// Difficulty band used for section headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl DifficultyTier {
    /// Band for a unified difficulty value
    pub fn from_unified(value: u8) -> Self {
        match value {
            0..=3 => DifficultyTier::Easy,
            4..=6 => DifficultyTier::Medium,
            7..=8 => DifficultyTier::Hard,
            _ => DifficultyTier::Expert,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy (1-3)",
            DifficultyTier::Medium => "Medium (4-6)",
            DifficultyTier::Hard => "Hard (7-8)",
            DifficultyTier::Expert => "Expert (9-10)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_western_passthrough() {
        for v in 1..=10 {
            assert_eq!(normalize(v, DifficultyScale::Western), v);
        }
    }

    #[test]
    fn test_japanese_endpoints() {
        assert_eq!(normalize(0, DifficultyScale::Japanese), 1);
        assert_eq!(normalize(45, DifficultyScale::Japanese), 10);
    }

    #[test]
    fn test_japanese_rounding() {
        // 1 + v * 9 / 45
        assert_eq!(normalize(2, DifficultyScale::Japanese), 1); // 1.4
        assert_eq!(normalize(3, DifficultyScale::Japanese), 2); // 1.6
        assert_eq!(normalize(17, DifficultyScale::Japanese), 4); // 4.4
        assert_eq!(normalize(22, DifficultyScale::Japanese), 5); // 5.4
        assert_eq!(normalize(23, DifficultyScale::Japanese), 6); // 5.6
        assert_eq!(normalize(40, DifficultyScale::Japanese), 9);
    }

    #[test]
    fn test_japanese_range_and_monotonic() {
        let mut previous = 0;
        for v in 0..=45 {
            let n = normalize(v, DifficultyScale::Japanese);
            assert!((UNIFIED_MIN..=UNIFIED_MAX).contains(&n), "{} -> {}", v, n);
            assert!(n >= previous, "not monotonic at {}", v);
            previous = n;
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(DifficultyTier::from_unified(1), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::from_unified(6), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::from_unified(8), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::from_unified(10), DifficultyTier::Expert);
        assert_eq!(DifficultyTier::Hard.label(), "Hard (7-8)");
    }
}
