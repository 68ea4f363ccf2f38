//! Score and combo policy. Everything here is a pure function of its inputs.

/// Score weight one pair adds to each of its cells: `1` plus `per_extra` for every gem beyond
/// the third.
pub fn cell_contribution(pair_len: usize, per_extra: f32) -> f32 {
    let extra = pair_len.saturating_sub(3) as f32;
    1.0 + extra * per_extra.max(0.0)
}

/// Final points for one cleared cell. Saturates at `u32::MAX`; negative or NaN scores are zero.
pub fn clear_score(base: u32, accumulated: f32, multiplier: f32) -> u32 {
    let score = (base as f32 * accumulated * multiplier).round();
    if score.is_nan() || score <= 0.0 {
        0
    } else if score >= u32::MAX as f32 {
        u32::MAX
    } else {
        score as u32
    }
}

/// Multiplier in effect for cascade step `depth`, where depth 0 is the swap itself.
pub fn combo_multiplier(factor: f32, depth: u32) -> f32 {
    factor.max(1.0).powi(depth.min(i32::MAX as u32) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contribution_grows_with_length() {
        assert_eq!(cell_contribution(3, 0.5), 1.0);
        assert_eq!(cell_contribution(4, 0.5), 1.5);
        assert_eq!(cell_contribution(5, 0.5), 2.0);
        assert!(cell_contribution(6, 0.5) > cell_contribution(5, 0.5));
    }

    #[test]
    fn clear_score_rounds_and_never_goes_negative() {
        assert_eq!(clear_score(10, 1.5, 1.0), 15);
        assert_eq!(clear_score(10, 1.0, 1.25), 13);
        assert_eq!(clear_score(10, -1.0, 1.0), 0);
        assert_eq!(clear_score(10, f32::NAN, 1.0), 0);
    }

    #[test]
    fn huge_multipliers_saturate() {
        assert_eq!(clear_score(10, 1.0, f32::INFINITY), u32::MAX);
        assert_eq!(clear_score(10, 1.0, 1e30), u32::MAX);

        let deep = clear_score(10, 1.0, combo_multiplier(10.0, 40));
        let deeper = clear_score(10, 1.0, combo_multiplier(10.0, 41));
        assert!(deeper >= deep);
        assert_eq!(deeper, u32::MAX);
    }

    #[test]
    fn combo_depth_raises_multiplier() {
        assert_eq!(combo_multiplier(1.5, 0), 1.0);
        assert_eq!(combo_multiplier(1.5, 1), 1.5);
        assert_eq!(combo_multiplier(1.5, 2), 2.25);
        assert!(
            clear_score(10, 1.0, combo_multiplier(1.5, 2))
                > clear_score(10, 1.0, combo_multiplier(1.5, 1))
        );
    }
}
