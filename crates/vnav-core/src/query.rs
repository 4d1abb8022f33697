//! Read-only lookups over the last computed vertical plan.
//!
//! Nothing here recomputes; consumers see whatever the most recent build or
//! recompute left behind. Missing legs and empty plans yield `None`.

use crate::angles::meters_to_feet;
use crate::model::{
    ConstraintDetails, ConstraintKind, VerticalFlightPhase, VerticalPlan, VnavConstraint,
};

impl VerticalPlan {
    /// Constraint a leg is bridged back to when it sits inside a run of
    /// VNAV-ineligible legs.
    fn bridged_constraint_index(&self, global_leg_index: usize) -> Option<usize> {
        let prior = self.prior_constraint_index_for_leg(global_leg_index)?;
        self.constraints[prior]
            .next_vnav_eligible_leg_index
            .filter(|next| *next > global_leg_index)
            .map(|_| prior)
    }

    /// Nearest target constraint at or after a leg, excluding constraints
    /// beyond the FAF.
    pub fn target_constraint_index(&self, global_leg_index: usize) -> Option<usize> {
        if let Some(bridged) = self.bridged_constraint_index(global_leg_index) {
            return Some(bridged);
        }
        self.constraints.iter().position(|constraint| {
            global_leg_index <= constraint.index && constraint.is_target && !constraint.is_beyond_faf
        })
    }

    pub fn target_constraint(&self, global_leg_index: usize) -> Option<&VnavConstraint> {
        self.target_constraint_index(global_leg_index)
            .map(|index| &self.constraints[index])
    }

    pub fn target_altitude(&self, global_leg_index: usize) -> Option<f64> {
        self.target_constraint(global_leg_index)
            .map(|constraint| constraint.target_altitude_m)
    }

    fn current_constraint_index(&self, global_leg_index: usize) -> Option<usize> {
        self.bridged_constraint_index(global_leg_index)
            .or_else(|| self.constraint_index_for_leg(global_leg_index))
    }

    /// Target altitude of the constraint governing a leg. Unassigned (zero)
    /// targets count as absent.
    pub fn current_constraint_altitude(&self, global_leg_index: usize) -> Option<f64> {
        self.current_constraint_index(global_leg_index)
            .map(|index| self.constraints[index].target_altitude_m)
            .filter(|altitude_m| *altitude_m != 0.0)
    }

    pub fn current_constraint_details(&self, global_leg_index: usize) -> ConstraintDetails {
        match self.current_constraint_altitude(global_leg_index) {
            Some(altitude_m) => ConstraintDetails::At {
                altitude_ft: meters_to_feet(altitude_m).round(),
            },
            None => ConstraintDetails::Unused,
        }
    }

    /// Target altitude of the constraint that closes the leg's own span.
    /// Unlike [`Self::current_constraint_altitude`], legs inside an
    /// ineligible run are not bridged back.
    pub fn next_constraint_altitude(&self, global_leg_index: usize) -> Option<f64> {
        self.constraint_for_leg(global_leg_index)
            .map(|constraint| constraint.target_altitude_m)
            .filter(|altitude_m| *altitude_m != 0.0)
    }

    pub fn flight_phase(&self, active_leg_index: usize) -> VerticalFlightPhase {
        match self.constraint_for_leg(active_leg_index) {
            Some(constraint) if constraint.kind.is_climb() => VerticalFlightPhase::Climb,
            _ => VerticalFlightPhase::Descent,
        }
    }

    /// Nearest restriction ahead of the aircraft that matters in the current
    /// phase: a finite minimum while climbing, a finite maximum while
    /// descending. The search stops at the first constraint of the other phase.
    pub fn next_restriction_for_flight_phase(
        &self,
        active_leg_index: usize,
    ) -> Option<&VnavConstraint> {
        let start = self.constraint_index_for_leg(active_leg_index)?;
        let phase = self.flight_phase(active_leg_index);

        for constraint in &self.constraints[start..] {
            match phase {
                VerticalFlightPhase::Climb => {
                    if !constraint.kind.is_climb() {
                        return None;
                    }
                    if constraint.min_altitude_m > f64::NEG_INFINITY {
                        return Some(constraint);
                    }
                }
                VerticalFlightPhase::Descent => {
                    let in_phase = matches!(
                        constraint.kind,
                        ConstraintKind::Descent | ConstraintKind::Direct | ConstraintKind::Manual
                    );
                    if !in_phase {
                        return None;
                    }
                    if constraint.max_altitude_m < f64::INFINITY {
                        return Some(constraint);
                    }
                }
            }
        }
        None
    }

    pub fn first_descent_constraint_altitude(&self) -> Option<f64> {
        self.first_descent_constraint_leg_index
            .and_then(|leg| self.constraint_for_leg(leg))
            .map(|constraint| constraint.target_altitude_m)
    }

    pub fn last_descent_constraint_altitude(&self) -> Option<f64> {
        self.last_descent_constraint_leg_index
            .and_then(|leg| self.constraint_for_leg(leg))
            .map(|constraint| constraint.target_altitude_m)
    }
}
