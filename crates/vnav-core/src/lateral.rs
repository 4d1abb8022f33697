//! Lateral flight plan as seen by the vertical path calculator.
//!
//! The lateral plan is owned by the flight planning collaborator. The engine
//! only reads leg geometry, restrictions and flags from it, with one exception:
//! pilot-entered flight path angles are stored on (and cleared from) the leg
//! that closes a constraint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Altitude restriction published or entered for a leg. Altitudes in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "altitude_m", rename_all = "snake_case")]
pub enum AltitudeRestriction {
    #[default]
    Unused,
    At(f64),
    AtOrAbove(f64),
    AtOrBelow(f64),
    Between { upper: f64, lower: f64 },
}

impl AltitudeRestriction {
    pub fn is_used(&self) -> bool {
        !matches!(self, AltitudeRestriction::Unused)
    }

    /// Altitude a bottom-targeting path is built against.
    ///
    /// Window restrictions use their lower bound; anything else is unbounded.
    pub fn constraint_altitude_m(&self) -> f64 {
        match *self {
            AltitudeRestriction::At(alt)
            | AltitudeRestriction::AtOrAbove(alt)
            | AltitudeRestriction::AtOrBelow(alt) => alt,
            AltitudeRestriction::Between { lower, .. } => lower,
            AltitudeRestriction::Unused => f64::INFINITY,
        }
    }
}

/// ARINC 424 path terminators, plus the planner's discontinuity markers.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegType {
    IF,
    #[default]
    TF,
    CF,
    DF,
    RF,
    AF,
    FA,
    FC,
    FD,
    FM,
    CA,
    CD,
    CI,
    CR,
    VA,
    VD,
    VI,
    VM,
    VR,
    PI,
    HA,
    HF,
    HM,
    Discontinuity,
    ThruDiscontinuity,
}

impl LegType {
    /// Legs that leave the path shape to the pilot, so the steep-restriction
    /// heuristic cannot be trusted for the constraint containing them.
    pub fn forces_free_path(self) -> bool {
        matches!(self, LegType::CI | LegType::VI | LegType::FM | LegType::VM)
    }

    /// Legs that can neither carry nor propagate a vertical constraint.
    pub fn is_vnav_ineligible(self) -> bool {
        matches!(
            self,
            LegType::HA
                | LegType::HM
                | LegType::HF
                | LegType::VM
                | LegType::FM
                | LegType::Discontinuity
                | LegType::ThruDiscontinuity
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Origin,
    Departure,
    #[default]
    Enroute,
    Arrival,
    Approach,
    Destination,
    MissedApproach,
}

impl SegmentType {
    /// Restrictions in origin and departure segments belong to the climb and
    /// are never part of the descent path.
    pub fn carries_descent_constraints(self) -> bool {
        !matches!(self, SegmentType::Origin | SegmentType::Departure)
    }
}

/// A single leg of the lateral plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateralLeg {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub leg_type: LegType,
    #[serde(default)]
    pub altitude: AltitudeRestriction,
    /// Pilot-entered flight path angle in degrees
    #[serde(default)]
    pub fpa_deg: Option<f64>,
    #[serde(default)]
    pub missed_approach: bool,
    #[serde(default)]
    pub direct_to: bool,
    #[serde(default)]
    pub final_approach_fix: bool,
    /// Calculated along-path distance including turn transitions (meters)
    #[serde(default)]
    pub distance_m: Option<f64>,
}

impl LateralLeg {
    pub fn new(name: impl Into<String>, leg_type: LegType) -> Self {
        Self {
            name: name.into(),
            leg_type,
            ..Self::default()
        }
    }

    pub fn with_altitude(mut self, altitude: AltitudeRestriction) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = Some(distance_m);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateralSegment {
    pub segment_type: SegmentType,
    #[serde(default)]
    pub legs: Vec<LateralLeg>,
}

impl LateralSegment {
    pub fn new(segment_type: SegmentType, legs: Vec<LateralLeg>) -> Self {
        Self { segment_type, legs }
    }
}

/// Direct-to anchor as recorded by the planner.
///
/// Activating a direct-to inserts the target leg three positions after the
/// anchor leg in the same segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectToTarget {
    pub segment_index: usize,
    pub leg_index: usize,
}

impl DirectToTarget {
    pub const TARGET_LEG_OFFSET: usize = 3;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateralPlan {
    #[serde(default)]
    pub segments: Vec<LateralSegment>,
    /// Global index of the leg currently being flown
    #[serde(default)]
    pub active_leg_index: usize,
    #[serde(default)]
    pub direct_to: Option<DirectToTarget>,
}

impl LateralPlan {
    pub fn new(segments: Vec<LateralSegment>) -> Self {
        Self {
            segments,
            active_leg_index: 0,
            direct_to: None,
        }
    }

    /// Total number of legs across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|segment| segment.legs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Global index of the first leg of a segment.
    pub fn segment_offset(&self, segment_index: usize) -> Option<usize> {
        if segment_index >= self.segments.len() {
            return None;
        }
        Some(
            self.segments[..segment_index]
                .iter()
                .map(|segment| segment.legs.len())
                .sum(),
        )
    }

    pub fn leg(&self, global_leg_index: usize) -> Option<&LateralLeg> {
        self.legs().nth(global_leg_index)
    }

    pub fn leg_mut(&mut self, global_leg_index: usize) -> Option<&mut LateralLeg> {
        self.segments
            .iter_mut()
            .flat_map(|segment| segment.legs.iter_mut())
            .nth(global_leg_index)
    }

    /// All legs in flight order.
    pub fn legs(&self) -> impl DoubleEndedIterator<Item = &LateralLeg> {
        self.segments.iter().flat_map(|segment| segment.legs.iter())
    }

    /// Global index of the direct-to anchor leg, if a usable direct-to exists.
    ///
    /// Anchors in the first segment are not treated as active direct-tos.
    pub fn direct_to_anchor_index(&self) -> Option<usize> {
        let direct_to = self.direct_to?;
        if direct_to.segment_index == 0 {
            return None;
        }
        self.segment_offset(direct_to.segment_index)
            .map(|offset| offset + direct_to.leg_index)
    }
}

/// Seam to the flight planning collaborator.
pub trait LateralPlanSource {
    fn lateral_plan(&self, plan_index: usize) -> Option<&LateralPlan>;

    fn lateral_plan_mut(&mut self, plan_index: usize) -> Option<&mut LateralPlan>;
}

/// In-memory set of lateral plans keyed by plan index.
#[derive(Debug, Clone, Default)]
pub struct FlightPlanner {
    plans: HashMap<usize, LateralPlan>,
}

impl FlightPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plan, returning the one it replaced.
    pub fn insert(&mut self, plan_index: usize, plan: LateralPlan) -> Option<LateralPlan> {
        self.plans.insert(plan_index, plan)
    }
}

impl LateralPlanSource for FlightPlanner {
    fn lateral_plan(&self, plan_index: usize) -> Option<&LateralPlan> {
        self.plans.get(&plan_index)
    }

    fn lateral_plan_mut(&mut self, plan_index: usize) -> Option<&mut LateralPlan> {
        self.plans.get_mut(&plan_index)
    }
}
