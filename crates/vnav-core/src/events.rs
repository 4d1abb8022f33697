//! Plan change records consumed by the engine and notifications it emits.

use serde::{Deserialize, Serialize};

/// A structural or calculation change reported by the flight planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum PlanChange {
    Created { plan_index: usize },
    Copied { plan_index: usize },
    Loaded { plan_index: usize },
    /// The active leg index moved
    IndexChanged { plan_index: usize },
    LegChanged {
        plan_index: usize,
        segment_index: usize,
        leg_index: usize,
    },
    SegmentChanged {
        plan_index: usize,
        segment_index: usize,
    },
    /// Lateral distances were recalculated
    Calculated { plan_index: usize },
    Deleted { plan_index: usize },
}

impl PlanChange {
    pub fn plan_index(&self) -> usize {
        match *self {
            PlanChange::Created { plan_index }
            | PlanChange::Copied { plan_index }
            | PlanChange::Loaded { plan_index }
            | PlanChange::IndexChanged { plan_index }
            | PlanChange::LegChanged { plan_index, .. }
            | PlanChange::SegmentChanged { plan_index, .. }
            | PlanChange::Calculated { plan_index }
            | PlanChange::Deleted { plan_index } => plan_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VnavEvent {
    /// Constraints and legs were replaced
    PlanBuilt { plan_index: usize },
    /// Angles and leg altitudes were (re)computed
    PathCalculated { plan_index: usize },
}

/// Pending notifications, drained by guidance and display consumers.
#[derive(Debug, Default)]
pub struct Notifier {
    pending: Vec<VnavEvent>,
}

impl Notifier {
    pub fn plan_built(&mut self, plan_index: usize) {
        self.pending.push(VnavEvent::PlanBuilt { plan_index });
    }

    pub fn path_calculated(&mut self, plan_index: usize) {
        self.pending.push(VnavEvent::PathCalculated { plan_index });
    }

    pub fn drain(&mut self) -> Vec<VnavEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
