//! Pre-defined lateral plan scenarios for profile inspection.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use vnav_core::{
    feet_to_meters, AltitudeRestriction, DirectToTarget, LateralLeg, LateralPlan, LateralSegment,
    LegType, SegmentType,
};

const METERS_PER_NM: f64 = 1852.0;

/// Names accepted by [`builtin_scenario`].
pub const BUILTIN_SCENARIOS: &[&str] = &["ils-missed", "three-degree", "vertical-direct", "direct-to"];

/// A lateral plan plus the aircraft state to evaluate it with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Engine configuration overrides, applied over the environment
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    pub plan: LateralPlan,
    #[serde(default)]
    pub altitude_ft: Option<f64>,
    /// Distance already flown along the active leg (meters)
    #[serde(default)]
    pub along_leg_m: Option<f64>,
    #[serde(default)]
    pub vertical_direct_leg: Option<usize>,
    #[serde(default)]
    pub pilot_fpa_deg: Option<f64>,
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))
    }
}

pub fn builtin_scenario(name: &str) -> Option<Scenario> {
    match name {
        "ils-missed" => Some(create_ils_missed_scenario()),
        "three-degree" => Some(create_three_degree_scenario()),
        "vertical-direct" => Some(create_vertical_direct_scenario()),
        "direct-to" => Some(create_direct_to_scenario()),
        _ => None,
    }
}

fn leg(name: &str, leg_type: LegType, at_ft: Option<f64>, distance_nm: f64) -> LateralLeg {
    let leg = LateralLeg::new(name, leg_type).with_distance(distance_nm * METERS_PER_NM);
    match at_ft {
        Some(feet) => leg.with_altitude(AltitudeRestriction::At(feet_to_meters(feet))),
        None => leg,
    }
}

fn faf(name: &str, at_ft: f64, distance_nm: f64) -> LateralLeg {
    let mut leg = leg(name, LegType::CF, Some(at_ft), distance_nm);
    leg.final_approach_fix = true;
    leg
}

fn missed(name: &str, leg_type: LegType, distance_nm: f64) -> LateralLeg {
    let mut leg = leg(name, leg_type, None, distance_nm);
    leg.missed_approach = true;
    leg
}

fn scenario(name: &str, description: &str, plan: LateralPlan) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: description.to_string(),
        config: None,
        plan,
        altitude_ft: None,
        along_leg_m: None,
        vertical_direct_leg: None,
        pilot_fpa_deg: None,
    }
}

/// Arrival into an ILS with a missed approach ending in a hold.
///
/// - WP5 (8000 ft) sits above WP3 (6000 ft) and is rejected
/// - The window at WP6 builds to its lower bound
pub fn create_ils_missed_scenario() -> Scenario {
    let window = AltitudeRestriction::Between {
        upper: feet_to_meters(6000.0),
        lower: feet_to_meters(5000.0),
    };

    let plan = LateralPlan::new(vec![
        LateralSegment::new(
            SegmentType::Arrival,
            vec![
                leg("KEPEC", LegType::IF, None, 0.0),
                leg("CLARR", LegType::TF, None, 12.0),
                leg("SUNST", LegType::TF, Some(11_000.0), 10.0),
                leg("NIPZO", LegType::TF, Some(6000.0), 12.0),
                leg("BOACH", LegType::TF, None, 5.0),
                leg("LARKS", LegType::TF, Some(8000.0), 5.0),
                leg("ELLDA", LegType::TF, None, 5.0).with_altitude(window),
            ],
        ),
        LateralSegment::new(
            SegmentType::Approach,
            vec![
                leg("IAF", LegType::TF, Some(4000.0), 8.0),
                faf("FAF", 2000.0, 6.0),
                leg("RW26L", LegType::TF, Some(50.0), 5.0),
                missed("MA1", LegType::CA, 2.0),
                missed("HOLD", LegType::HM, 4.0),
            ],
        ),
    ]);

    Scenario {
        altitude_ft: Some(14_000.0),
        ..scenario("ils-missed", "Arrival into an ILS with a missed approach hold", plan)
    }
}

/// 10,000 ft at leg 10 and 5,000 ft at the FAF (leg 20), 15 nm apart.
pub fn create_three_degree_scenario() -> Scenario {
    let mut arrival: Vec<LateralLeg> = (0..10)
        .map(|i| leg(&format!("A{:02}", i), LegType::TF, None, 4.0))
        .collect();
    arrival.push(leg("TENKF", LegType::TF, Some(10_000.0), 4.0));
    arrival.extend((11..20).map(|i| leg(&format!("B{:02}", i), LegType::TF, None, 1.5)));

    let plan = LateralPlan::new(vec![
        LateralSegment::new(SegmentType::Arrival, arrival),
        LateralSegment::new(
            SegmentType::Approach,
            vec![faf("FIVEK", 5000.0, 1.5), leg("RW09", LegType::TF, None, 3.0)],
        ),
    ]);

    scenario("three-degree", "Single direct angle across a 15 nm gap", plan)
}

/// Vertical direct to leg 12 from 12,000 ft while flying leg 10.
pub fn create_vertical_direct_scenario() -> Scenario {
    let restriction = |i: usize| match i {
        5 => Some(14_000.0),
        8 => Some(11_000.0),
        12 => Some(8000.0),
        _ => None,
    };
    let arrival = (0..15)
        .map(|i| leg(&format!("W{:02}", i), LegType::TF, restriction(i), 3.0))
        .collect();

    let mut plan = LateralPlan::new(vec![
        LateralSegment::new(SegmentType::Arrival, arrival),
        LateralSegment::new(
            SegmentType::Approach,
            vec![faf("FAF", 5000.0, 3.0), leg("RW", LegType::TF, None, 3.0)],
        ),
    ]);
    plan.active_leg_index = 10;

    Scenario {
        altitude_ft: Some(12_000.0),
        along_leg_m: Some(1000.0),
        vertical_direct_leg: Some(12),
        ..scenario("vertical-direct", "Vertical direct to a mid-arrival fix", plan)
    }
}

/// Direct-to a fix in the arrival, discarding restrictions behind it.
pub fn create_direct_to_scenario() -> Scenario {
    let mut target = leg("GRAMM", LegType::DF, Some(7000.0), 4.0);
    target.direct_to = true;

    let mut plan = LateralPlan::new(vec![
        LateralSegment::new(
            SegmentType::Departure,
            vec![leg("RW01", LegType::IF, None, 0.0), leg("DEPRT", LegType::CF, None, 5.0)],
        ),
        LateralSegment::new(
            SegmentType::Arrival,
            vec![
                leg("ALPHA", LegType::TF, Some(12_000.0), 10.0),
                leg("BRAVO", LegType::TF, None, 10.0),
                leg("CHRLY", LegType::TF, Some(9000.0), 10.0),
                leg("PPOS", LegType::IF, None, 0.0),
                leg("DTO", LegType::DF, None, 0.0),
                target,
            ],
        ),
        LateralSegment::new(
            SegmentType::Approach,
            vec![faf("FAF", 3000.0, 7.0), leg("RW19", LegType::TF, None, 3.0)],
        ),
    ]);
    plan.direct_to = Some(DirectToTarget {
        segment_index: 1,
        leg_index: 2,
    });
    plan.active_leg_index = 7;

    Scenario {
        altitude_ft: Some(9000.0),
        along_leg_m: Some(500.0),
        ..scenario("direct-to", "Direct-to a fix inside the arrival", plan)
    }
}
