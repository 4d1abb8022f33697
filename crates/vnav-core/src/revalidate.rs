//! Re-checking restrictions rejected at build time.
//!
//! A restriction can be rejected for being too steep against a lateral
//! geometry that later changes (turn transitions resolve, legs are edited in
//! place). Before trusting a recompute, every rejected restriction is tested
//! again against the current leg distances and the operational angle limit.

use crate::angles::{fpa_for_distance, round_to_tenth};
use crate::lateral::LateralPlan;
use crate::model::VerticalPlan;

/// Whether any rejected restriction would now be accepted, meaning the plan
/// must be rebuilt before its path can be trusted.
pub fn needs_rebuild(vertical: &VerticalPlan, lateral: &LateralPlan, max_fpa_deg: f64) -> bool {
    if vertical.constraints.is_empty() || lateral.is_empty() {
        return false;
    }

    for (global_leg_index, lateral_leg) in lateral.legs().enumerate() {
        let was_rejected = vertical
            .leg(global_leg_index)
            .is_some_and(|leg| leg.invalid_constraint_altitude_m.is_some());
        if !was_rejected {
            continue;
        }

        let Some(prior) = vertical.prior_constraint_for_leg(global_leg_index) else {
            continue;
        };

        let candidate_m = lateral_leg.altitude.constraint_altitude_m();
        if !candidate_m.is_finite() {
            continue;
        }

        let is_higher = round_to_tenth(candidate_m) > round_to_tenth(prior.target_altitude_m);
        let is_too_steep = prior.target_altitude_m >= 0.0 && {
            let distance_m = vertical.distance_between_legs(prior.index, global_leg_index);
            let fpa = fpa_for_distance(distance_m, (candidate_m - prior.target_altitude_m).abs());
            fpa > max_fpa_deg
        };

        if !is_higher && !is_too_steep {
            tracing::debug!(
                "Restriction at leg {} of plan {} is now valid",
                global_leg_index,
                vertical.plan_index
            );
            return true;
        }
    }

    false
}
