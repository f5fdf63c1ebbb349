//! Transition events
//!
//! Input: ZoneOverlapBegan (physics / host), CancelScopeTransition (host).
//! Internal: DwellElapsed (dwell timer → committer).
//! Output: ScopeTransitionEvent — advisory, для диагностики / UI / эффектов.

use bevy::prelude::*;

use crate::error::CommitError;

/// Discrete overlap-begin: `other` впервые коснулся `zone`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneOverlapBegan {
    pub zone: Entity,
    pub other: Entity,
}

/// Внешняя отмена активного dwell'а зоны (идёт по abort path)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelScopeTransition {
    pub zone: Entity,
}

/// Dwell зоны истёк с overlap'ом на месте → пора commit'ить
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellElapsed {
    pub zone: Entity,
}

/// Почему transition отменён
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Наблюдатель вышел из bounds зоны
    OverlapLost,
    /// CancelScopeTransition от хоста
    External,
}

/// Исход transition'а (ровно одно событие на переход состояния)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ScopeTransitionEvent {
    /// Idle → Transitioning
    Started { zone: Entity, observer: Entity },
    /// Transitioning → Idle (abort)
    Canceled { zone: Entity, reason: CancelReason },
    /// Transitioning → Locked
    Locked { zone: Entity },
    /// Transitioning → Idle: lookup при commit'е не нашёл объект сцены
    CommitFailed { zone: Entity, error: CommitError },
}
