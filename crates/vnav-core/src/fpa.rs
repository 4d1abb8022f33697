//! Flight path angle solver and leg altitude assignment.

use crate::angles::{altitude_for_distance, fpa_for_distance};
use crate::model::{ConstraintKind, VerticalPlan};

/// Inputs the solver needs beyond the plan itself.
#[derive(Debug, Clone, Copy)]
pub struct SolverContext {
    pub default_fpa_deg: f64,
    pub max_fpa_deg: f64,
    pub direct_fpa_tolerance_deg: f64,
    pub min_direct_fpa_deg: f64,
    pub vertical_direct_buffer_m: f64,
    pub active_leg_index: usize,
    pub current_altitude_m: f64,
}

/// Assign an angle to every constraint, walking from the destination back
/// toward the aircraft.
///
/// Returns `false` when a direct path between two constraints would exceed
/// the operational maximum, which means the constraint set itself needs a
/// rebuild. The destination-most constraint is exempt from that check.
pub fn compute_flight_path_angles(vertical: &mut VerticalPlan, ctx: &SolverContext) -> bool {
    let count = vertical.constraints.len();
    let faf_index = vertical.faf_leg_index;
    let mut currently_direct = false;

    for i in (0..count).rev() {
        if vertical.constraints[i].kind == ConstraintKind::Manual {
            continue;
        }

        let constraint = &vertical.constraints[i];
        let index = constraint.index;
        let distance_m = constraint.distance_m;
        let target_m = constraint.target_altitude_m;
        // Direct constraints start level so their angle is re-derived from
        // the aircraft's position on every pass.
        let mut fpa_deg = if constraint.kind == ConstraintKind::Direct {
            0.0
        } else {
            ctx.default_fpa_deg
        };
        let is_target = !currently_direct || faf_index == Some(index);
        let is_beyond_faf = faf_index.is_some_and(|faf| index > faf);

        // The constraint flown before this one, if the path continues into it.
        let next = i.checked_sub(1).map(|j| &vertical.constraints[j]).filter(|next| {
            next.kind != ConstraintKind::Climb && !next.is_path_end
        });

        match next {
            Some(next) => {
                let direct_fpa = fpa_for_distance(distance_m, next.target_altitude_m - target_m);
                let end_altitude_m = target_m + altitude_for_distance(ctx.default_fpa_deg, distance_m);

                if (direct_fpa - ctx.default_fpa_deg).abs() <= ctx.direct_fpa_tolerance_deg
                    || end_altitude_m < next.target_altitude_m
                {
                    if direct_fpa > ctx.max_fpa_deg && i + 1 != count {
                        tracing::debug!(
                            "Direct path into constraint {} of plan {} needs {:.2} deg",
                            vertical.constraints[i].name,
                            vertical.plan_index,
                            direct_fpa
                        );
                        return false;
                    }
                    fpa_deg = direct_fpa;
                    currently_direct = true;
                } else {
                    if next.target_altitude_m == target_m || is_beyond_faf {
                        fpa_deg = 0.0;
                    }
                    currently_direct = false;
                }
            }
            None => currently_direct = false,
        }

        let constraint = &vertical.constraints[i];
        if constraint.kind == ConstraintKind::Direct && fpa_deg == 0.0 {
            if let Some(along_leg_m) = vertical.current_along_leg_distance_m {
                fpa_deg = vertical_direct_angle(vertical, i, along_leg_m, ctx);
            }
        }

        let constraint = &mut vertical.constraints[i];
        constraint.fpa_deg = fpa_deg;
        constraint.is_target = is_target;
        constraint.is_beyond_faf = is_beyond_faf;
    }

    vertical.vertical_direct_fpa_deg = vertical
        .vertical_direct_index
        .and_then(|leg| vertical.constraint_for_leg(leg))
        .filter(|constraint| constraint.kind == ConstraintKind::Direct)
        .map(|constraint| constraint.fpa_deg);

    true
}

/// Angle from the aircraft's position down to a direct constraint, clamped
/// to the operational range.
fn vertical_direct_angle(
    vertical: &VerticalPlan,
    constraint_position: usize,
    along_leg_m: f64,
    ctx: &SolverContext,
) -> f64 {
    let constraint = &vertical.constraints[constraint_position];
    let remaining_m = if ctx.active_leg_index <= constraint.index {
        let from = ctx.active_leg_index.max(constraint.first_leg_index);
        vertical
            .legs
            .get(from..=constraint.index)
            .map_or(0.0, |legs| legs.iter().map(|leg| leg.distance_m).sum::<f64>())
            - along_leg_m
    } else {
        0.0
    };

    let required = fpa_for_distance(
        remaining_m,
        ctx.vertical_direct_buffer_m + ctx.current_altitude_m - constraint.target_altitude_m,
    );

    // A pilot-commanded vertical direct may be flown arbitrarily shallow.
    let min_fpa_deg = if vertical.vertical_direct_index == Some(constraint.index) {
        0.0
    } else {
        ctx.min_direct_fpa_deg
    };

    if required.is_nan() {
        min_fpa_deg
    } else {
        required.max(min_fpa_deg).min(ctx.max_fpa_deg)
    }
}

/// Fill leg altitudes for every descent-path constraint, working back from
/// each constraint's target along its angle.
///
/// Legs beyond the FAF are level. The leg that closes a target constraint is
/// marked as the bottom of descent; every other leg is advisory.
pub fn assign_leg_altitudes(vertical: &mut VerticalPlan) {
    let VerticalPlan {
        constraints,
        legs,
        faf_leg_index,
        ..
    } = vertical;

    for constraint in constraints.iter() {
        if !constraint.kind.carries_descent_path() {
            continue;
        }

        let fpa_deg = if faf_leg_index.is_some_and(|faf| constraint.index <= faf) {
            constraint.fpa_deg
        } else {
            0.0
        };

        let mut altitude_m = constraint.target_altitude_m;
        for (position, leg_index) in constraint.leg_indices().enumerate() {
            let Some(leg) = legs.get_mut(leg_index) else {
                continue;
            };
            leg.fpa_deg = fpa_deg;
            leg.altitude_m = altitude_m;
            leg.is_advisory = position != 0;
            leg.is_bod = position == 0 && constraint.is_target;
            altitude_m += altitude_for_distance(fpa_deg, leg.distance_m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{VnavConstraint, VnavLeg};

    fn ctx() -> SolverContext {
        SolverContext {
            default_fpa_deg: 3.0,
            max_fpa_deg: 6.0,
            direct_fpa_tolerance_deg: 0.5,
            min_direct_fpa_deg: 3.0,
            vertical_direct_buffer_m: 50.0,
            active_leg_index: 0,
            current_altitude_m: 0.0,
        }
    }

    fn constraint(first: usize, index: usize, target_m: f64, distance_m: f64) -> VnavConstraint {
        VnavConstraint {
            index,
            target_altitude_m: target_m,
            min_altitude_m: target_m,
            max_altitude_m: target_m,
            distance_m,
            ..VnavConstraint::open(first)
        }
    }

    /// One leg per constraint, each leg as long as its constraint.
    fn plan(constraints: Vec<VnavConstraint>) -> VerticalPlan {
        let mut vertical = VerticalPlan::new(0);
        for c in &constraints {
            for leg_index in c.first_leg_index..=c.index {
                let distance = if leg_index == c.index { c.distance_m } else { 0.0 };
                vertical.legs.push(VnavLeg::new(0, leg_index, format!("L{}", leg_index), distance));
            }
        }
        vertical.length = vertical.legs.len();
        vertical.faf_leg_index = constraints.last().map(|c| c.index);
        vertical.constraints = constraints;
        vertical
    }

    #[test]
    fn three_degree_gap_flies_direct() {
        let d = 10_000.0;
        let drop = altitude_for_distance(3.0, d);
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0 + drop, 0.0),
            constraint(1, 1, 3000.0, d),
        ]);

        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        let last = &vertical.constraints[1];
        assert!((last.fpa_deg - 3.0).abs() < 1e-9);
        assert!(last.is_target);
        // Flown directly into the next constraint, so the earlier one is no target.
        assert!(!vertical.constraints[0].is_target);
    }

    #[test]
    fn shallow_gap_keeps_default_angle() {
        // Only 1 degree worth of altitude to lose: the path levels off first.
        let d = 10_000.0;
        let drop = altitude_for_distance(1.0, d);
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0 + drop, 0.0),
            constraint(1, 1, 3000.0, d),
        ]);

        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        assert_eq!(vertical.constraints[1].fpa_deg, 3.0);
        assert!(vertical.constraints[0].is_target);
    }

    #[test]
    fn equal_targets_fly_level() {
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0, 0.0),
            constraint(1, 1, 3000.0, 8000.0),
        ]);
        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        assert_eq!(vertical.constraints[1].fpa_deg, 0.0);
    }

    #[test]
    fn steep_direct_fails_except_at_destination() {
        // 2000 m over 5 km is about 21.8 degrees.
        let mut vertical = plan(vec![
            constraint(0, 0, 6000.0, 0.0),
            constraint(1, 1, 4000.0, 5000.0),
            constraint(2, 2, 4000.0 - altitude_for_distance(3.0, 9000.0), 9000.0),
        ]);
        assert!(!compute_flight_path_angles(&mut vertical, &ctx()));

        let mut vertical = plan(vec![
            constraint(0, 0, 6000.0, 0.0),
            constraint(1, 1, 4000.0, 5000.0),
        ]);
        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        assert!(vertical.constraints[1].fpa_deg > 6.0);
    }

    #[test]
    fn manual_angle_is_never_overwritten() {
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0, 0.0),
            constraint(1, 1, 2000.0, 12_000.0),
        ]);
        vertical.constraints[1].kind = ConstraintKind::Manual;
        vertical.constraints[1].fpa_deg = 4.2;

        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        assert_eq!(vertical.constraints[1].fpa_deg, 4.2);
    }

    #[test]
    fn vertical_direct_angle_starts_at_aircraft() {
        let mut vertical = plan(vec![constraint(0, 2, 1000.0, 0.0)]);
        for leg in &mut vertical.legs {
            leg.distance_m = 10_000.0;
        }
        vertical.constraints[0].distance_m = 30_000.0;
        vertical.constraints[0].kind = ConstraintKind::Direct;
        vertical.vertical_direct_index = Some(2);
        vertical.current_along_leg_distance_m = Some(5000.0);

        let context = SolverContext {
            active_leg_index: 1,
            current_altitude_m: 1950.0,
            ..ctx()
        };
        assert!(compute_flight_path_angles(&mut vertical, &context));

        // 1000 m (950 m plus the buffer) over the remaining 15 km.
        let expected = fpa_for_distance(15_000.0, 1000.0);
        let direct = &vertical.constraints[0];
        assert!((direct.fpa_deg - expected).abs() < 1e-9);
        assert!(direct.is_target);
        assert_eq!(vertical.vertical_direct_fpa_deg, Some(direct.fpa_deg));
    }

    #[test]
    fn vertical_direct_angle_is_clamped() {
        let mut vertical = plan(vec![constraint(0, 1, 1000.0, 4000.0)]);
        vertical.constraints[0].kind = ConstraintKind::Direct;
        vertical.current_along_leg_distance_m = Some(0.0);

        // Not the pilot's vertical direct, so the minimum direct angle applies.
        let context = SolverContext {
            current_altitude_m: 1000.0,
            ..ctx()
        };
        assert!(compute_flight_path_angles(&mut vertical, &context));
        assert_eq!(vertical.constraints[0].fpa_deg, 3.0);

        let context = SolverContext {
            current_altitude_m: 5000.0,
            ..ctx()
        };
        assert!(compute_flight_path_angles(&mut vertical, &context));
        assert_eq!(vertical.constraints[0].fpa_deg, 6.0);
    }

    #[test]
    fn pilot_vertical_direct_may_be_shallow() {
        let mut vertical = plan(vec![constraint(0, 2, 1000.0, 0.0)]);
        for leg in &mut vertical.legs {
            leg.distance_m = 10_000.0;
        }
        vertical.constraints[0].kind = ConstraintKind::Direct;
        vertical.current_along_leg_distance_m = Some(5000.0);

        // About one degree over the remaining 15 km.
        let context = SolverContext {
            active_leg_index: 1,
            current_altitude_m: 1000.0 + altitude_for_distance(1.0, 15_000.0) - 50.0,
            ..ctx()
        };

        assert!(compute_flight_path_angles(&mut vertical, &context));
        assert_eq!(vertical.constraints[0].fpa_deg, 3.0);

        vertical.vertical_direct_index = Some(2);
        assert!(compute_flight_path_angles(&mut vertical, &context));
        assert!((vertical.constraints[0].fpa_deg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flown_through_direct_is_not_a_target() {
        let d = 10_000.0;
        let drop = altitude_for_distance(3.0, d);
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0 + drop, 0.0),
            constraint(1, 1, 3000.0 + drop, 8000.0),
            constraint(2, 2, 3000.0, d),
        ]);
        vertical.constraints[1].kind = ConstraintKind::Direct;
        vertical.current_along_leg_distance_m = Some(0.0);

        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        assert!((vertical.constraints[2].fpa_deg - 3.0).abs() < 1e-9);
        let direct = &vertical.constraints[1];
        assert!(direct.fpa_deg >= 3.0);
        assert!(!direct.is_target);
        assert!(vertical.constraints[0].is_target);
    }

    #[test]
    fn faf_stays_target_when_flown_through() {
        let d = 10_000.0;
        let drop = altitude_for_distance(3.0, d);
        let mut vertical = plan(vec![
            constraint(0, 0, 3000.0 + drop, 0.0),
            constraint(1, 1, 3000.0, d),
        ]);
        vertical.faf_leg_index = Some(0);

        assert!(compute_flight_path_angles(&mut vertical, &ctx()));
        let beyond = &vertical.constraints[1];
        assert!((beyond.fpa_deg - 3.0).abs() < 1e-9);
        assert!(beyond.is_beyond_faf);
        assert!(vertical.constraints[0].is_target);
    }

    #[test]
    fn leg_altitudes_climb_back_from_target() {
        let mut vertical = plan(vec![constraint(0, 2, 1000.0, 6000.0)]);
        for leg in &mut vertical.legs {
            leg.distance_m = 2000.0;
        }
        vertical.constraints[0].fpa_deg = 3.0;
        vertical.constraints[0].is_target = true;

        assign_leg_altitudes(&mut vertical);
        let step = altitude_for_distance(3.0, 2000.0);
        assert_eq!(vertical.legs[2].altitude_m, 1000.0);
        assert!((vertical.legs[1].altitude_m - (1000.0 + step)).abs() < 1e-9);
        assert!((vertical.legs[0].altitude_m - (1000.0 + 2.0 * step)).abs() < 1e-9);
        assert!(vertical.legs[2].is_bod && !vertical.legs[2].is_advisory);
        assert!(vertical.legs[0].is_advisory && !vertical.legs[0].is_bod);
    }

    #[test]
    fn legs_beyond_faf_are_level() {
        let mut vertical = plan(vec![
            constraint(0, 0, 1000.0, 0.0),
            constraint(1, 2, 1000.0, 4000.0),
        ]);
        vertical.faf_leg_index = Some(0);
        vertical.constraints[1].kind = ConstraintKind::Dest;
        vertical.constraints[1].fpa_deg = 3.0;

        assign_leg_altitudes(&mut vertical);
        assert!(vertical.legs[1..=2].iter().all(|leg| leg.altitude_m == 1000.0 && leg.fpa_deg == 0.0));
    }

    #[test]
    fn missed_legs_get_no_altitude() {
        let mut vertical = plan(vec![constraint(0, 1, 1000.0, 4000.0)]);
        vertical.constraints[0].kind = ConstraintKind::Missed;
        assign_leg_altitudes(&mut vertical);
        assert!(vertical.legs.iter().all(|leg| leg.altitude_m == 0.0));
    }
}
