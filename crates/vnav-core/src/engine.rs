//! Vertical path calculator context.
//!
//! [`VnavEngine`] owns one [`VerticalPlan`] per lateral plan index. The flight
//! planner reports changes through an ordered inbox; each change is applied to
//! completion before the next is taken, so a rebuild never overlaps another.

use std::collections::{HashMap, VecDeque};

use crate::angles::{feet_to_meters, meters_to_feet};
use crate::builder::build_vertical_plan;
use crate::config::VnavConfig;
use crate::distance::fill_leg_and_constraint_distances;
use crate::error::{Result, VnavError};
use crate::events::{Notifier, PlanChange, VnavEvent};
use crate::fpa::{assign_leg_altitudes, compute_flight_path_angles, SolverContext};
use crate::lateral::{LateralPlan, LateralPlanSource};
use crate::model::{
    ConstraintDetails, ConstraintKind, VerticalFlightPhase, VerticalPlan, VnavConstraint, VnavLeg,
};
use crate::revalidate::needs_rebuild;

#[derive(Debug)]
pub struct VnavEngine {
    config: VnavConfig,
    plans: HashMap<usize, VerticalPlan>,
    inbox: VecDeque<PlanChange>,
    notifier: Notifier,
    current_altitude_m: f64,
    default_fpa_deg: f64,
}

impl VnavEngine {
    pub fn new(config: VnavConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            default_fpa_deg: config.default_fpa_deg,
            config,
            plans: HashMap::new(),
            inbox: VecDeque::new(),
            notifier: Notifier::default(),
            current_altitude_m: 0.0,
        })
    }

    pub fn config(&self) -> &VnavConfig {
        &self.config
    }

    pub fn default_fpa_deg(&self) -> f64 {
        self.default_fpa_deg
    }

    pub fn current_altitude_m(&self) -> f64 {
        self.current_altitude_m
    }

    // === Plan context ===

    /// Vertical plan for a lateral plan index, created on first reference.
    pub fn get_or_create_vertical_plan(&mut self, plan_index: usize) -> &mut VerticalPlan {
        self.plans
            .entry(plan_index)
            .or_insert_with(|| VerticalPlan::new(plan_index))
    }

    /// Replace any existing vertical plan with a fresh, dirty one.
    pub fn create_vertical_plan(&mut self, plan_index: usize) -> &mut VerticalPlan {
        self.plans.insert(plan_index, VerticalPlan::new(plan_index));
        self.get_or_create_vertical_plan(plan_index)
    }

    pub fn vertical_plan(&self, plan_index: usize) -> Option<&VerticalPlan> {
        self.plans.get(&plan_index)
    }

    pub fn vertical_leg(&self, plan_index: usize, global_leg_index: usize) -> Option<&VnavLeg> {
        self.plans.get(&plan_index)?.leg(global_leg_index)
    }

    // === Inbox ===

    pub fn push_change(&mut self, change: PlanChange) {
        self.inbox.push_back(change);
    }

    /// Apply every queued change in arrival order. Returns how many were applied.
    pub fn process_changes<S: LateralPlanSource>(&mut self, source: &mut S) -> usize {
        let mut processed = 0;
        while let Some(change) = self.inbox.pop_front() {
            tracing::trace!("Applying {:?} to vertical plan {}", change, change.plan_index());
            self.apply_change(change, source);
            processed += 1;
        }
        processed
    }

    fn apply_change<S: LateralPlanSource>(&mut self, change: PlanChange, source: &mut S) {
        match change {
            PlanChange::Created { plan_index } => {
                self.create_vertical_plan(plan_index);
            }
            PlanChange::Copied { plan_index }
            | PlanChange::Loaded { plan_index }
            | PlanChange::IndexChanged { plan_index } => {
                mark_changed(self.get_or_create_vertical_plan(plan_index));
            }
            PlanChange::LegChanged {
                plan_index,
                segment_index,
                leg_index,
            } => {
                let plan = self.get_or_create_vertical_plan(plan_index);
                let changed_leg = plan
                    .segments
                    .get(segment_index)
                    .map(|segment| segment.offset + leg_index);
                if let (Some(direct), Some(changed)) = (plan.vertical_direct_index, changed_leg) {
                    if changed <= direct {
                        clear_vertical_direct(plan);
                    }
                }
                mark_changed(plan);
            }
            PlanChange::SegmentChanged {
                plan_index,
                segment_index,
            } => {
                let plan = self.get_or_create_vertical_plan(plan_index);
                let direct_segment = plan
                    .vertical_direct_index
                    .and_then(|direct| plan.leg(direct))
                    .map(|leg| leg.segment_index);
                if direct_segment.is_some_and(|direct| segment_index <= direct) {
                    clear_vertical_direct(plan);
                }
                mark_changed(plan);
            }
            PlanChange::Calculated { plan_index } => match source.lateral_plan_mut(plan_index) {
                Some(lateral) => self.update(plan_index, lateral),
                None => {
                    tracing::warn!("Calculated change for unknown lateral plan {}", plan_index);
                }
            },
            PlanChange::Deleted { plan_index } => {
                self.plans.remove(&plan_index);
            }
        }
    }

    // === Commands ===

    /// Direct the vertical path to a leg and rebuild immediately.
    pub fn activate_vertical_direct<S: LateralPlanSource>(
        &mut self,
        source: &mut S,
        plan_index: usize,
        global_leg_index: usize,
    ) -> Result<()> {
        let lateral = source
            .lateral_plan_mut(plan_index)
            .ok_or(VnavError::UnknownPlan(plan_index))?;
        if global_leg_index >= lateral.len() {
            return Err(VnavError::LegOutOfRange {
                plan_index,
                leg_index: global_leg_index,
            });
        }

        tracing::info!(
            "Vertical direct to leg {} on plan {}",
            global_leg_index,
            plan_index
        );

        let ctx = self.solver_context(lateral.active_leg_index);
        let plan = self
            .plans
            .entry(plan_index)
            .or_insert_with(|| VerticalPlan::new(plan_index));
        plan.vertical_direct_index = Some(global_leg_index);
        rebuild(plan, lateral, &self.config, &ctx, &mut self.notifier);
        Ok(())
    }

    /// Pin a pilot angle on the constraint governing the active leg of the
    /// primary plan, then recompute.
    pub fn set_current_fpa<S: LateralPlanSource>(&mut self, source: &mut S, fpa_deg: f64) -> Result<()> {
        if !fpa_deg.is_finite() || fpa_deg < 0.0 {
            tracing::warn!("Ignoring pilot flight path angle {}", fpa_deg);
            return Ok(());
        }

        let plan_index = self.config.primary_plan_index;
        let lateral = source
            .lateral_plan_mut(plan_index)
            .ok_or(VnavError::UnknownPlan(plan_index))?;
        let active_leg_index = lateral.active_leg_index;

        let plan = self
            .plans
            .entry(plan_index)
            .or_insert_with(|| VerticalPlan::new(plan_index));
        let Some(position) = plan.constraint_index_for_leg(active_leg_index) else {
            tracing::debug!(
                "No constraint governs active leg {} of plan {}",
                active_leg_index,
                plan_index
            );
            return Ok(());
        };

        let constraint = &mut plan.constraints[position];
        constraint.fpa_deg = fpa_deg;
        constraint.kind = ConstraintKind::Manual;
        let closing_leg = constraint.index;
        if let Some(leg) = lateral.leg_mut(closing_leg) {
            leg.fpa_deg = Some(fpa_deg);
        }

        tracing::info!(
            "Pilot flight path angle {:.1} deg pinned at {} on plan {}",
            fpa_deg,
            plan.constraints[position].name,
            plan_index
        );

        self.update(plan_index, lateral);
        Ok(())
    }

    /// Feed the indicated altitude. Returns `false` when the change is below
    /// the configured threshold and was ignored.
    pub fn set_indicated_altitude_ft(&mut self, altitude_ft: f64) -> bool {
        let current_ft = meters_to_feet(self.current_altitude_m);
        if !altitude_ft.is_finite()
            || (altitude_ft - current_ft).abs() < self.config.altitude_change_threshold_ft
        {
            return false;
        }
        self.current_altitude_m = feet_to_meters(altitude_ft);
        true
    }

    pub fn set_current_along_leg_distance(&mut self, plan_index: usize, distance_m: f64) {
        self.get_or_create_vertical_plan(plan_index)
            .current_along_leg_distance_m = Some(distance_m);
    }

    /// Change the default angle used by subsequent solves.
    pub fn set_flight_path_angle(&mut self, fpa_deg: f64) -> Result<()> {
        if !fpa_deg.is_finite() || fpa_deg < 0.0 || fpa_deg > self.config.max_fpa_deg {
            return Err(VnavError::InvalidConfig {
                reason: format!(
                    "flight path angle must be within 0..={} (got {})",
                    self.config.max_fpa_deg, fpa_deg
                ),
            });
        }
        self.default_fpa_deg = fpa_deg;
        Ok(())
    }

    // === Notifier ===

    pub fn drain_events(&mut self) -> Vec<VnavEvent> {
        self.notifier.drain()
    }

    // === Queries ===

    pub fn target_constraint_index(&self, plan_index: usize, global_leg_index: usize) -> Option<usize> {
        self.plans.get(&plan_index)?.target_constraint_index(global_leg_index)
    }

    pub fn target_constraint(&self, plan_index: usize, global_leg_index: usize) -> Option<&VnavConstraint> {
        self.plans.get(&plan_index)?.target_constraint(global_leg_index)
    }

    pub fn target_altitude(&self, plan_index: usize, global_leg_index: usize) -> Option<f64> {
        self.plans.get(&plan_index)?.target_altitude(global_leg_index)
    }

    pub fn flight_phase(&self, plan_index: usize, active_leg_index: usize) -> Option<VerticalFlightPhase> {
        self.plans
            .get(&plan_index)
            .map(|plan| plan.flight_phase(active_leg_index))
    }

    pub fn current_constraint_altitude(&self, plan_index: usize, global_leg_index: usize) -> Option<f64> {
        self.plans.get(&plan_index)?.current_constraint_altitude(global_leg_index)
    }

    pub fn current_constraint_details(&self, plan_index: usize, global_leg_index: usize) -> ConstraintDetails {
        self.plans
            .get(&plan_index)
            .map_or(ConstraintDetails::Unused, |plan| {
                plan.current_constraint_details(global_leg_index)
            })
    }

    pub fn next_constraint_altitude(&self, plan_index: usize, global_leg_index: usize) -> Option<f64> {
        self.plans.get(&plan_index)?.next_constraint_altitude(global_leg_index)
    }

    pub fn next_restriction_for_flight_phase(
        &self,
        plan_index: usize,
        active_leg_index: usize,
    ) -> Option<&VnavConstraint> {
        self.plans
            .get(&plan_index)?
            .next_restriction_for_flight_phase(active_leg_index)
    }

    pub fn first_descent_constraint_altitude(&self, plan_index: usize) -> Option<f64> {
        self.plans.get(&plan_index)?.first_descent_constraint_altitude()
    }

    pub fn last_descent_constraint_altitude(&self, plan_index: usize) -> Option<f64> {
        self.plans.get(&plan_index)?.last_descent_constraint_altitude()
    }

    // === Internals ===

    fn solver_context(&self, active_leg_index: usize) -> SolverContext {
        SolverContext {
            default_fpa_deg: self.default_fpa_deg,
            max_fpa_deg: self.config.max_fpa_deg,
            direct_fpa_tolerance_deg: self.config.direct_fpa_tolerance_deg,
            min_direct_fpa_deg: self.config.min_direct_fpa_deg,
            vertical_direct_buffer_m: self.config.vertical_direct_buffer_m,
            active_leg_index,
            current_altitude_m: self.current_altitude_m,
        }
    }

    /// Rebuild a dirty plan, otherwise take the cheaper recompute path.
    fn update(&mut self, plan_index: usize, lateral: &mut LateralPlan) {
        let ctx = self.solver_context(lateral.active_leg_index);
        let plan = self
            .plans
            .entry(plan_index)
            .or_insert_with(|| VerticalPlan::new(plan_index));
        if plan.plan_changed {
            rebuild(plan, lateral, &self.config, &ctx, &mut self.notifier);
        } else {
            recompute(plan, lateral, &self.config, &ctx, &mut self.notifier);
        }
    }
}

fn mark_changed(plan: &mut VerticalPlan) {
    plan.plan_changed = true;
    plan.current_along_leg_distance_m = None;
}

fn clear_vertical_direct(plan: &mut VerticalPlan) {
    tracing::debug!("Clearing vertical direct on plan {}", plan.plan_index);
    plan.vertical_direct_index = None;
    plan.vertical_direct_fpa_deg = None;
}

/// Replace constraints and legs, then solve once.
fn rebuild(
    plan: &mut VerticalPlan,
    lateral: &mut LateralPlan,
    config: &VnavConfig,
    ctx: &SolverContext,
    notifier: &mut Notifier,
) {
    let vertical_direct = plan.vertical_direct_index;
    build_vertical_plan(lateral, plan, vertical_direct, config);
    notifier.plan_built(plan.plan_index);

    fill_leg_and_constraint_distances(plan, lateral);
    if !compute_flight_path_angles(plan, ctx) {
        tracing::warn!(
            "Vertical plan {} has no feasible angle chain after rebuild",
            plan.plan_index
        );
    }
    assign_leg_altitudes(plan);
    notifier.path_calculated(plan.plan_index);
}

/// Refresh distances and angles on an unchanged constraint set, falling back
/// to a single rebuild when a rejected restriction became valid or the chain
/// can no longer be flown.
fn recompute(
    plan: &mut VerticalPlan,
    lateral: &mut LateralPlan,
    config: &VnavConfig,
    ctx: &SolverContext,
    notifier: &mut Notifier,
) {
    fill_leg_and_constraint_distances(plan, lateral);

    if needs_rebuild(plan, lateral, config.max_fpa_deg) {
        tracing::debug!("Plan {} has a restriction that became valid", plan.plan_index);
        return rebuild(plan, lateral, config, ctx, notifier);
    }

    if !compute_flight_path_angles(plan, ctx) {
        tracing::debug!("Plan {} angle chain infeasible, rebuilding", plan.plan_index);
        return rebuild(plan, lateral, config, ctx, notifier);
    }

    assign_leg_altitudes(plan);
    tracing::debug!(
        "Recomputed plan {}: {} constraints",
        plan.plan_index,
        plan.constraints.len()
    );
    notifier.path_calculated(plan.plan_index);
}
