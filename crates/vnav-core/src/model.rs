//! Vertical flight plan data model.
//!
//! One [`VerticalPlan`] mirrors one lateral plan. Legs are stored flat by
//! global leg index; constraints cover contiguous, non-overlapping leg ranges
//! and are kept in ascending leg-index order.

use serde::{Deserialize, Serialize};

/// Role of a constraint in the vertical path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Climb,
    #[default]
    Descent,
    /// Reached by a direct-to or vertical direct
    Direct,
    /// Flight path angle pinned by the pilot
    Manual,
    /// Terminates the descent at the destination
    Dest,
    /// Trailing legs of the missed approach
    Missed,
}

impl ConstraintKind {
    pub fn is_climb(self) -> bool {
        matches!(self, ConstraintKind::Climb | ConstraintKind::Missed)
    }

    /// Kinds whose legs receive computed altitudes.
    pub fn carries_descent_path(self) -> bool {
        matches!(
            self,
            ConstraintKind::Descent
                | ConstraintKind::Direct
                | ConstraintKind::Manual
                | ConstraintKind::Dest
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalFlightPhase {
    Climb,
    Descent,
}

/// Restriction summary served to displays, altitude in feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintDetails {
    Unused,
    At { altitude_ft: f64 },
}

/// Vertical view of one lateral leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnavLeg {
    pub segment_index: usize,
    pub leg_index: usize,
    pub name: String,
    /// Along-path distance including transitions (meters)
    pub distance_m: f64,
    pub fpa_deg: f64,
    /// Computed altitude at the end of the leg (meters)
    pub altitude_m: f64,
    pub is_eligible: bool,
    pub is_advisory: bool,
    /// Bottom of descent
    pub is_bod: bool,
    /// Restriction rejected during the last build, kept for revalidation
    pub invalid_constraint_altitude_m: Option<f64>,
}

impl VnavLeg {
    pub fn new(segment_index: usize, leg_index: usize, name: impl Into<String>, distance_m: f64) -> Self {
        Self {
            segment_index,
            leg_index,
            name: name.into(),
            distance_m,
            fpa_deg: 0.0,
            altitude_m: 0.0,
            is_eligible: true,
            is_advisory: true,
            is_bod: false,
            invalid_constraint_altitude_m: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnavConstraint {
    /// Global index of the leg whose arrival altitude this constraint governs
    pub index: usize,
    /// Global index of the earliest leg belonging to this constraint
    pub first_leg_index: usize,
    pub name: String,
    pub kind: ConstraintKind,
    pub target_altitude_m: f64,
    pub min_altitude_m: f64,
    pub max_altitude_m: f64,
    pub fpa_deg: f64,
    pub is_target: bool,
    pub is_path_end: bool,
    pub is_beyond_faf: bool,
    /// Sum of the distances of this constraint's legs (meters)
    pub distance_m: f64,
    /// First leg after a run of ineligible legs, used to bridge altitude lookups
    pub next_vnav_eligible_leg_index: Option<usize>,
}

impl VnavConstraint {
    /// An open constraint starting at `first_leg_index`, not yet closed at a leg.
    pub fn open(first_leg_index: usize) -> Self {
        Self {
            index: first_leg_index,
            first_leg_index,
            name: String::new(),
            kind: ConstraintKind::Descent,
            target_altitude_m: 0.0,
            min_altitude_m: f64::NEG_INFINITY,
            max_altitude_m: f64::INFINITY,
            fpa_deg: 0.0,
            is_target: false,
            is_path_end: false,
            is_beyond_faf: false,
            distance_m: 0.0,
            next_vnav_eligible_leg_index: None,
        }
    }

    /// Global indices of this constraint's legs, nearest the destination first.
    pub fn leg_indices(&self) -> impl Iterator<Item = usize> {
        (self.first_leg_index..=self.index).rev()
    }

    pub fn contains_leg(&self, global_leg_index: usize) -> bool {
        (self.first_leg_index..=self.index).contains(&global_leg_index)
    }
}

/// Mirror of a lateral plan segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnavSegment {
    pub offset: usize,
    pub leg_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalPlan {
    pub plan_index: usize,
    /// Number of legs in the lateral plan at the last build
    pub length: usize,
    pub constraints: Vec<VnavConstraint>,
    pub segments: Vec<VnavSegment>,
    pub legs: Vec<VnavLeg>,
    pub dest_leg_index: Option<usize>,
    pub faf_leg_index: Option<usize>,
    pub missed_approach_start_index: Option<usize>,
    pub first_descent_constraint_leg_index: Option<usize>,
    pub last_descent_constraint_leg_index: Option<usize>,
    pub vertical_direct_index: Option<usize>,
    pub vertical_direct_fpa_deg: Option<f64>,
    /// Distance already flown along the active leg (meters)
    pub current_along_leg_distance_m: Option<f64>,
    /// Lateral structure changed since the last build
    pub plan_changed: bool,
}

impl VerticalPlan {
    pub fn new(plan_index: usize) -> Self {
        Self {
            plan_index,
            length: 0,
            constraints: Vec::new(),
            segments: Vec::new(),
            legs: Vec::new(),
            dest_leg_index: None,
            faf_leg_index: None,
            missed_approach_start_index: None,
            first_descent_constraint_leg_index: None,
            last_descent_constraint_leg_index: None,
            vertical_direct_index: None,
            vertical_direct_fpa_deg: None,
            current_along_leg_distance_m: None,
            plan_changed: true,
        }
    }

    pub fn leg(&self, global_leg_index: usize) -> Option<&VnavLeg> {
        self.legs.get(global_leg_index)
    }

    /// Index of the constraint governing a leg: the first constraint at or after it.
    pub fn constraint_index_for_leg(&self, global_leg_index: usize) -> Option<usize> {
        self.constraints
            .iter()
            .position(|constraint| constraint.index >= global_leg_index)
    }

    pub fn constraint_for_leg(&self, global_leg_index: usize) -> Option<&VnavConstraint> {
        self.constraint_index_for_leg(global_leg_index)
            .map(|index| &self.constraints[index])
    }

    /// Index of the last constraint closed strictly before a leg.
    pub fn prior_constraint_index_for_leg(&self, global_leg_index: usize) -> Option<usize> {
        self.constraints
            .iter()
            .rposition(|constraint| constraint.index < global_leg_index)
    }

    pub fn prior_constraint_for_leg(&self, global_leg_index: usize) -> Option<&VnavConstraint> {
        self.prior_constraint_index_for_leg(global_leg_index)
            .map(|index| &self.constraints[index])
    }

    /// Sum of leg distances in the half-open global range `(after, through]`.
    pub fn distance_between_legs(&self, after: usize, through: usize) -> f64 {
        if through <= after {
            return 0.0;
        }
        self.legs
            .iter()
            .skip(after + 1)
            .take(through - after)
            .map(|leg| leg.distance_m)
            .sum()
    }

    pub fn first_descent_constraint_index(&self) -> Option<usize> {
        self.constraints
            .iter()
            .position(|constraint| !constraint.kind.is_climb())
    }

    pub fn last_descent_constraint_index(&self) -> Option<usize> {
        self.constraints
            .iter()
            .rposition(|constraint| !constraint.kind.is_climb())
    }
}
