//! Leg and constraint distance propagation.
//!
//! Lateral geometry (turn transitions in particular) can change without the
//! constraint list changing, so distances are refreshed before every solve.

use crate::lateral::LateralPlan;
use crate::model::VerticalPlan;

/// Copy transition-inclusive leg distances from the lateral plan into the
/// mirrored vertical legs, then total each constraint.
pub fn fill_leg_and_constraint_distances(vertical: &mut VerticalPlan, lateral: &LateralPlan) {
    let lateral_len = lateral.len();
    if lateral_len != vertical.legs.len() {
        tracing::debug!(
            "Plan {} leg count differs from last build ({} lateral, {} vertical)",
            vertical.plan_index,
            lateral_len,
            vertical.legs.len()
        );
    }

    let lateral_legs: Vec<_> = lateral.legs().collect();
    for (global_leg_index, lateral_leg) in lateral_legs.iter().enumerate().rev() {
        if let Some(leg) = vertical.legs.get_mut(global_leg_index) {
            leg.distance_m = lateral_leg.distance_m.unwrap_or(0.0);
        }
    }

    let VerticalPlan {
        constraints, legs, ..
    } = vertical;
    for constraint in constraints.iter_mut() {
        constraint.distance_m = constraint
            .leg_indices()
            .filter_map(|index| legs.get(index))
            .map(|leg| leg.distance_m)
            .sum();
    }
}
