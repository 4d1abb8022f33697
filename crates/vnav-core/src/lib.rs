pub mod angles;
pub mod builder;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod events;
pub mod fpa;
pub mod lateral;
pub mod model;
pub mod query;
pub mod revalidate;

pub use angles::{altitude_for_distance, feet_to_meters, fpa_for_distance, meters_to_feet};
pub use builder::build_vertical_plan;
pub use config::VnavConfig;
pub use distance::fill_leg_and_constraint_distances;
pub use engine::VnavEngine;
pub use error::VnavError;
pub use events::{Notifier, PlanChange, VnavEvent};
pub use fpa::{assign_leg_altitudes, compute_flight_path_angles, SolverContext};
pub use lateral::{
    AltitudeRestriction, DirectToTarget, FlightPlanner, LateralLeg, LateralPlan,
    LateralPlanSource, LateralSegment, LegType, SegmentType,
};
pub use model::{
    ConstraintDetails, ConstraintKind, VerticalFlightPhase, VerticalPlan, VnavConstraint,
    VnavLeg, VnavSegment,
};
pub use revalidate::needs_rebuild;
