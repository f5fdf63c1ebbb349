//! Transition state machine (per zone instance)
//!
//! ```text
//! Idle ──(valid overlap-begin)──────────────────▶ Transitioning
//! Transitioning ──(overlap lost / cancel)────────▶ Idle
//! Transitioning ──(dwell elapsed, commit ok)─────▶ Locked
//! Transitioning ──(dwell elapsed, commit failed)─▶ Idle
//! Locked ──────────────────────────────────────── terminal (unlock не реализован)
//! ```
//!
//! Вместо пары флагов `{transitioning, locked}` — enum: состояние
//! "оба true" непредставимо, а payload `Transitioning` и есть единственный
//! активный dwell task зоны.

use bevy::prelude::*;
use std::time::Duration;

use crate::components::ScopeZone;

/// Dwell timer task — владеет deadline'ом, живёт пока зона в Transitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct DwellTimer {
    /// `now + dwell` на момент входа, вычисляется один раз
    deadline: Duration,
    /// Volume, вызвавший вход (его bounds проверяются каждый tick)
    observer: Entity,
}

/// Результат одного tick'а dwell timer'а
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellPoll {
    /// Ещё ждём — suspend до следующего tick'а
    Waiting,
    /// Overlap потерян → abort path
    OverlapLost,
    /// Deadline достигнут, overlap на месте → commit path
    Elapsed,
}

impl DwellTimer {
    pub fn start(now: Duration, dwell: Duration, observer: Entity) -> Self {
        Self {
            deadline: now.saturating_add(dwell),
            observer,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn observer(&self) -> Entity {
        self.observer
    }

    /// Один tick: overlap проверяется ДО решения о suspend/commit
    pub fn poll(&self, now: Duration, overlapping: bool) -> DwellPoll {
        if !overlapping {
            DwellPoll::OverlapLost
        } else if now < self.deadline {
            DwellPoll::Waiting
        } else {
            DwellPoll::Elapsed
        }
    }
}

/// TransitionState — автоматически добавляется к ScopeZone (Idle)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum TransitionState {
    /// Free view, ждём входа наблюдателя
    #[default]
    Idle,

    /// Dwell идёт
    Transitioning(DwellTimer),

    /// View snapped к scope камере
    Locked,
}

impl TransitionState {
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Transitioning(_))
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }

    pub fn dwell_timer(&self) -> Option<&DwellTimer> {
        match self {
            Self::Transitioning(timer) => Some(timer),
            _ => None,
        }
    }

    /// Zone Monitor gate: `!transitioning && !locked && other == observer`
    pub fn can_begin(&self, zone: &ScopeZone, other: Entity) -> bool {
        matches!(self, Self::Idle) && other == zone.observer
    }

    /// Valid overlap-begin → Transitioning. `false` = silent no-op.
    pub fn try_begin(&mut self, zone: &ScopeZone, other: Entity, now: Duration) -> bool {
        if !self.can_begin(zone, other) {
            return false;
        }

        *self = Self::Transitioning(DwellTimer::start(now, zone.dwell, other));
        true
    }

    /// Abort path: гасит dwell task. `false` если отменять нечего.
    pub fn abort(&mut self) -> bool {
        if !self.is_transitioning() {
            return false;
        }

        *self = Self::Idle;
        true
    }

    /// Итог commit'а: Locked при успехе, иначе обратно в Idle
    ///
    /// Idle после failed commit не re-arm'ится сам: наблюдатель всё ещё
    /// внутри и нового overlap-begin не получит.
    pub fn finish_commit(&mut self, committed: bool) {
        if !self.is_transitioning() {
            return;
        }

        *self = if committed { Self::Locked } else { Self::Idle };
    }
}
