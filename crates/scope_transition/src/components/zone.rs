//! Scope zone — trigger volume вокруг scope объекта

use bevy::prelude::*;
use std::time::Duration;

use crate::transition::TransitionState;

/// Dwell по умолчанию: сколько наблюдатель должен простоять в зоне до lock'а
pub const DEFAULT_DWELL: Duration = Duration::from_secs(2);

/// Zone binding: зона ↔ наблюдатель (camera rig), на которого она реагирует
///
/// `observer` — identity reference, не ownership. Surface/камеры для commit'а
/// резолвятся в момент commit'а (их может ещё не быть при спавне зоны).
///
/// Автоматически добавляет TransitionState (Idle) через Required Components.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(TransitionState)]
pub struct ScopeZone {
    /// Camera rig наблюдателя (единственный объект, чей вход считается)
    pub observer: Entity,
    /// Сколько ждать внутри зоны до commit'а
    pub dwell: Duration,
}

impl ScopeZone {
    pub fn new(observer: Entity) -> Self {
        Self {
            observer,
            dwell: DEFAULT_DWELL,
        }
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }
}
