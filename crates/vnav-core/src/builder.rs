//! Vertical plan construction.
//!
//! A full rebuild replaces every constraint and leg of the vertical plan from
//! the lateral plan. Legs are scanned in flight order; each constraint stays
//! open until a leg with an acceptable restriction (or the end of the
//! destination/missed approach) closes it.

use crate::angles::{fpa_for_distance, round_to_tenth};
use crate::config::VnavConfig;
use crate::lateral::{DirectToTarget, LateralPlan};
use crate::model::{ConstraintKind, VerticalPlan, VnavConstraint, VnavLeg, VnavSegment};

const DEST_CONSTRAINT_NAME: &str = "$DEST";
const MISSED_CONSTRAINT_NAME: &str = "$MISSED";

/// Global index of the final approach fix: the last leg flagged as one, or the
/// last leg of the plan when none is flagged.
pub fn find_faf_index(lateral: &LateralPlan) -> Option<usize> {
    let last = lateral.len().checked_sub(1)?;
    let faf = lateral
        .legs()
        .enumerate()
        .filter(|(_, leg)| leg.final_approach_fix)
        .map(|(index, _)| index)
        .last();
    Some(faf.unwrap_or(last))
}

/// Global index of the first missed approach leg inside an approach segment.
pub fn find_missed_approach_start(lateral: &LateralPlan) -> Option<usize> {
    let mut offset = 0;
    for segment in &lateral.segments {
        if segment.segment_type == crate::lateral::SegmentType::Approach {
            if let Some(leg_index) = segment.legs.iter().position(|leg| leg.missed_approach) {
                return Some(offset + leg_index);
            }
        }
        offset += segment.legs.len();
    }
    None
}

/// State carried across the forward scan.
struct Scan {
    open: VnavConstraint,
    open_distance_m: f64,
    /// Candidate altitude of the last restriction evaluated
    current_altitude_m: f64,
    /// Target altitude of the last constraint closed
    prior_altitude_m: f64,
    path_is_direct: bool,
    contains_free_path_leg: bool,
}

impl Scan {
    fn new() -> Self {
        Self {
            open: VnavConstraint::open(0),
            open_distance_m: 0.0,
            current_altitude_m: 0.0,
            prior_altitude_m: f64::INFINITY,
            path_is_direct: false,
            contains_free_path_leg: false,
        }
    }

    /// Whether a candidate restriction must be rejected for this constraint.
    fn rejects(&self, candidate_m: f64, leg_distance_m: f64, build_max_fpa_deg: f64) -> bool {
        if round_to_tenth(candidate_m) > round_to_tenth(self.prior_altitude_m) {
            return true;
        }
        let implied_fpa = fpa_for_distance(
            leg_distance_m + self.open_distance_m,
            (candidate_m - self.prior_altitude_m).abs(),
        );
        !self.contains_free_path_leg
            && self.prior_altitude_m < f64::INFINITY
            && implied_fpa > build_max_fpa_deg
    }
}

/// Rebuild `vertical` from `lateral`.
///
/// Pilot-entered angles on legs the aircraft has already passed are cleared
/// from the lateral plan. Clears the plan-changed flag; distances and angles
/// are left to the propagator and solver.
pub fn build_vertical_plan(
    lateral: &mut LateralPlan,
    vertical: &mut VerticalPlan,
    vertical_direct_index: Option<usize>,
    config: &VnavConfig,
) {
    let plan_len = lateral.len();
    let faf_index = find_faf_index(lateral);
    let missed_start = find_missed_approach_start(lateral).filter(|start| *start > 0);
    let dest_index = match missed_start {
        Some(start) => Some(start - 1),
        None => plan_len.checked_sub(1),
    };

    vertical.constraints.clear();
    vertical.segments.clear();
    vertical.legs.clear();
    vertical.faf_leg_index = faf_index;
    vertical.dest_leg_index = dest_index;
    vertical.missed_approach_start_index = missed_start.or(dest_index);

    let direct_to = lateral.direct_to;
    let direct_to_anchor = lateral.direct_to_anchor_index();
    let active_leg_index = lateral.active_leg_index;

    let mut scan = Scan::new();
    let mut offset = 0;

    for (segment_index, segment) in lateral.segments.iter_mut().enumerate() {
        let segment_type = segment.segment_type;
        let leg_count = segment.legs.len();
        vertical.segments.push(VnavSegment { offset, leg_count });

        for (leg_index, plan_leg) in segment.legs.iter_mut().enumerate() {
            let global_leg_index = offset + leg_index;
            let mut leg = VnavLeg::new(
                segment_index,
                leg_index,
                plan_leg.name.clone(),
                plan_leg.distance_m.unwrap_or(0.0),
            );

            if plan_leg.leg_type.forces_free_path() {
                scan.contains_free_path_leg = true;
            }

            if vertical_direct_index == Some(global_leg_index) {
                scan.open.kind = ConstraintKind::Direct;
                scan.path_is_direct = true;
            }

            // A direct-to restarts the chain at its target leg.
            let is_direct_to_target = plan_leg.direct_to
                && direct_to.is_some_and(|target| {
                    target.segment_index == segment_index
                        && leg_index == target.leg_index + DirectToTarget::TARGET_LEG_OFFSET
                });
            if is_direct_to_target {
                scan.open = VnavConstraint::open(global_leg_index);
                scan.open.kind = ConstraintKind::Direct;
                scan.open_distance_m = 0.0;
                scan.path_is_direct = true;
                vertical.constraints.clear();
            }

            let past_missed = missed_start.is_some_and(|start| global_leg_index >= start);
            let mut leg_is_constraint = false;
            if segment_type.carries_descent_constraints()
                && plan_leg.altitude.is_used()
                && faf_index.is_some_and(|faf| global_leg_index <= faf)
                && !past_missed
            {
                let candidate_m = plan_leg.altitude.constraint_altitude_m();
                scan.current_altitude_m = candidate_m;

                let behind_vertical_direct =
                    vertical_direct_index.is_some_and(|direct| direct > global_leg_index);
                let behind_direct_to =
                    direct_to_anchor.is_some_and(|anchor| global_leg_index <= anchor);

                if behind_vertical_direct || behind_direct_to {
                    // Restrictions behind an active direct are skipped, not rejected.
                } else if scan.rejects(candidate_m, leg.distance_m, config.build_max_fpa_deg) {
                    leg.invalid_constraint_altitude_m = Some(candidate_m);
                } else {
                    leg_is_constraint = true;
                }
            }

            if plan_leg.leg_type.is_vnav_ineligible() {
                leg.is_eligible = false;
                if let Some(prior) = vertical.constraints.last_mut() {
                    prior.is_path_end = true;
                    prior.is_target = true;
                    prior.next_vnav_eligible_leg_index = Some(global_leg_index + 1);
                }
            }

            scan.open_distance_m += leg.distance_m;
            vertical.legs.push(leg);

            let is_last_leg = global_leg_index + 1 == plan_len;
            let closes_dest = Some(global_leg_index) == dest_index;
            if !(leg_is_constraint || closes_dest || is_last_leg) {
                continue;
            }

            let kind = if is_last_leg && missed_start.is_some() {
                ConstraintKind::Missed
            } else if closes_dest {
                ConstraintKind::Dest
            } else if scan.path_is_direct {
                ConstraintKind::Direct
            } else {
                ConstraintKind::Descent
            };

            let target_altitude_m = if leg_is_constraint || !scan.prior_altitude_m.is_finite() {
                scan.current_altitude_m
            } else {
                scan.prior_altitude_m
            };

            let open = &mut scan.open;
            open.index = global_leg_index;
            open.kind = kind;
            open.name = match kind {
                ConstraintKind::Dest => DEST_CONSTRAINT_NAME.to_string(),
                ConstraintKind::Missed => MISSED_CONSTRAINT_NAME.to_string(),
                _ => plan_leg.name.clone(),
            };
            open.target_altitude_m = target_altitude_m;
            open.min_altitude_m = target_altitude_m;
            open.max_altitude_m = target_altitude_m;

            if scan.path_is_direct {
                open.is_target = true;
            }

            if Some(global_leg_index) == faf_index {
                open.is_target = true;
                open.is_path_end = true;
            }

            if let Some(fpa_deg) = plan_leg.fpa_deg {
                if open.contains_leg(active_leg_index) && kind != ConstraintKind::Missed {
                    open.fpa_deg = fpa_deg;
                    open.kind = ConstraintKind::Manual;
                } else {
                    plan_leg.fpa_deg = None;
                }
            }

            scan.prior_altitude_m = target_altitude_m;
            let closed = std::mem::replace(&mut scan.open, VnavConstraint::open(global_leg_index + 1));
            vertical.constraints.push(closed);
            scan.open_distance_m = 0.0;
            scan.contains_free_path_leg = false;
            scan.path_is_direct = false;
        }

        offset += leg_count;
    }

    vertical.length = plan_len;
    vertical.first_descent_constraint_leg_index = vertical
        .first_descent_constraint_index()
        .map(|index| vertical.constraints[index].index);
    vertical.last_descent_constraint_leg_index = vertical
        .last_descent_constraint_index()
        .map(|index| vertical.constraints[index].index);
    vertical.plan_changed = false;

    let invalid_legs = vertical
        .legs
        .iter()
        .filter(|leg| leg.invalid_constraint_altitude_m.is_some())
        .count();
    tracing::debug!(
        "Built vertical plan {}: {} legs, {} constraints, {} invalid restrictions",
        vertical.plan_index,
        plan_len,
        vertical.constraints.len(),
        invalid_legs
    );
}
