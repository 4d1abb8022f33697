//! Scenario runner and profile rendering.

use anyhow::Context;
use serde::Serialize;
use vnav_core::{
    meters_to_feet, ConstraintKind, FlightPlanner, PlanChange, VerticalFlightPhase, VnavConfig,
    VnavEngine, VnavEvent,
};

use crate::scenarios::Scenario;

const METERS_PER_NM: f64 = 1852.0;

/// One leg of the computed profile, in display units.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRow {
    pub leg: usize,
    pub segment: usize,
    pub name: String,
    pub distance_nm: f64,
    pub fpa_deg: f64,
    pub altitude_ft: f64,
    /// Set on the leg that closes a constraint
    pub constraint: Option<String>,
    pub kind: Option<ConstraintKind>,
    pub is_bod: bool,
    pub is_advisory: bool,
    pub is_eligible: bool,
    pub rejected_altitude_ft: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub scenario: String,
    pub plan_index: usize,
    pub default_fpa_deg: f64,
    pub active_leg_index: usize,
    pub flight_phase: Option<VerticalFlightPhase>,
    pub target_altitude_ft: Option<f64>,
    pub faf_leg_index: Option<usize>,
    pub dest_leg_index: Option<usize>,
    pub missed_approach_start_index: Option<usize>,
    pub vertical_direct_fpa_deg: Option<f64>,
    pub events: Vec<VnavEvent>,
    pub rows: Vec<ProfileRow>,
}

/// Drive a fresh engine through a scenario and collect the resulting profile.
pub fn run_scenario(scenario: &Scenario, config: VnavConfig) -> anyhow::Result<ProfileReport> {
    let plan_index = config.primary_plan_index;
    let mut engine = VnavEngine::new(config)?;
    let mut planner = FlightPlanner::new();
    planner.insert(plan_index, scenario.plan.clone());
    let active_leg_index = scenario.plan.active_leg_index;

    if let Some(altitude_ft) = scenario.altitude_ft {
        engine.set_indicated_altitude_ft(altitude_ft);
    }

    engine.push_change(PlanChange::Created { plan_index });
    engine.push_change(PlanChange::Calculated { plan_index });
    engine.process_changes(&mut planner);

    if let Some(along_leg_m) = scenario.along_leg_m {
        engine.set_current_along_leg_distance(plan_index, along_leg_m);
    }
    if let Some(leg) = scenario.vertical_direct_leg {
        engine
            .activate_vertical_direct(&mut planner, plan_index, leg)
            .context("Failed to activate vertical direct")?;
    }
    if let Some(fpa_deg) = scenario.pilot_fpa_deg {
        engine
            .set_current_fpa(&mut planner, fpa_deg)
            .context("Failed to set pilot flight path angle")?;
    }

    engine.push_change(PlanChange::Calculated { plan_index });
    engine.process_changes(&mut planner);

    let events = engine.drain_events();
    let vertical = engine
        .vertical_plan(plan_index)
        .context("Vertical plan missing after calculation")?;

    let rows: Vec<ProfileRow> = vertical
        .legs
        .iter()
        .enumerate()
        .map(|(index, leg)| {
            let closing = vertical.constraints.iter().find(|c| c.index == index);
            ProfileRow {
                leg: index,
                segment: leg.segment_index,
                name: leg.name.clone(),
                distance_nm: leg.distance_m / METERS_PER_NM,
                fpa_deg: leg.fpa_deg,
                altitude_ft: meters_to_feet(leg.altitude_m),
                constraint: closing.map(|c| c.name.clone()),
                kind: closing.map(|c| c.kind),
                is_bod: leg.is_bod,
                is_advisory: leg.is_advisory,
                is_eligible: leg.is_eligible,
                rejected_altitude_ft: leg.invalid_constraint_altitude_m.map(meters_to_feet),
            }
        })
        .collect();

    tracing::info!(
        "Scenario {}: {} legs, {} constraints",
        scenario.name,
        rows.len(),
        vertical.constraints.len()
    );

    Ok(ProfileReport {
        scenario: scenario.name.clone(),
        plan_index,
        default_fpa_deg: engine.default_fpa_deg(),
        active_leg_index,
        flight_phase: engine.flight_phase(plan_index, active_leg_index),
        target_altitude_ft: engine
            .target_altitude(plan_index, active_leg_index)
            .map(meters_to_feet),
        faf_leg_index: vertical.faf_leg_index,
        dest_leg_index: vertical.dest_leg_index,
        missed_approach_start_index: vertical.missed_approach_start_index,
        vertical_direct_fpa_deg: vertical.vertical_direct_fpa_deg,
        events,
        rows,
    })
}

fn kind_label(kind: ConstraintKind) -> &'static str {
    match kind {
        ConstraintKind::Climb => "CLB",
        ConstraintKind::Descent => "DES",
        ConstraintKind::Direct => "DIR",
        ConstraintKind::Manual => "MAN",
        ConstraintKind::Dest => "DEST",
        ConstraintKind::Missed => "MISS",
    }
}

/// Fixed-width table of the profile, one line per leg.
pub fn render_table(report: &ProfileReport) -> String {
    let mut lines = vec![format!(
        "Scenario {} (plan {}, default FPA {:.1} deg, active leg {})",
        report.scenario, report.plan_index, report.default_fpa_deg, report.active_leg_index
    )];
    if let Some(fpa) = report.vertical_direct_fpa_deg {
        lines.push(format!("Vertical direct FPA {:.2} deg", fpa));
    }
    lines.push(format!(
        "{:>4}  {:<8} {:>8} {:>6} {:>8}  {:<10} {:<5} FLAGS",
        "LEG", "NAME", "DIST NM", "FPA", "ALT FT", "CONSTR", "KIND"
    ));

    for row in &report.rows {
        let mut flags = Vec::new();
        if row.is_bod {
            flags.push("BOD".to_string());
        }
        if !row.is_advisory {
            flags.push("MAND".to_string());
        }
        if !row.is_eligible {
            flags.push("INELIG".to_string());
        }
        if let Some(rejected) = row.rejected_altitude_ft {
            flags.push(format!("REJ {:.0}", rejected));
        }

        lines.push(format!(
            "{:>4}  {:<8} {:>8.1} {:>6.2} {:>8.0}  {:<10} {:<5} {}",
            row.leg,
            row.name,
            row.distance_nm,
            row.fpa_deg,
            row.altitude_ft,
            row.constraint.as_deref().unwrap_or("-"),
            row.kind.map(kind_label).unwrap_or("-"),
            flags.join(" ")
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
