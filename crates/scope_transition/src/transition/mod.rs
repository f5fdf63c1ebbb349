//! Scope transition module (free view ↔ locked scope view)
//!
//! ECS ответственность:
//! - TransitionState per zone (Idle / Transitioning / Locked)
//! - Dwell timer: deadline + overlap re-check каждый frame
//! - Commit: render target + culling mask rewiring
//!
//! Хост ответственность:
//! - ZoneOverlapBegan (physics sensor или свой trigger)
//! - Реальный рендер по ViewCamera/RenderSurface
//!
//! Не реализовано (extension points): fade-to-black, camera stabilization,
//! обратный переход (unlock). Locked — терминальное состояние.

use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod commit;
pub mod events;
pub mod state;
pub mod systems;


// Re-export основных типов
pub use commit::{commit_view_lock, BevyScopeScene, ScopeScene, ViewLockPlan};
pub use events::{
    CancelReason, CancelScopeTransition, DwellElapsed, ScopeTransitionEvent, ZoneOverlapBegan,
};
pub use state::{DwellPoll, DwellTimer, TransitionState};

use crate::config::ScopeTransitionConfig;
use crate::layers::LayerRegistry;
use crate::logger;

/// SystemSet всех transition систем (для ordering'а хоста: `.before/.after`)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeTransitionSystems;

/// Scope Transition Plugin
///
/// Регистрирует transition системы в PostUpdate после transform propagation
/// (frame-synced, не FixedUpdate: dwell timer suspend'ится до следующего
/// display refresh). Bounds проверка читает GlobalTransform этого же frame'а,
/// поэтому хосту нужен TransformPlugin (есть в DefaultPlugins).
///
/// Порядок выполнения:
/// 1. begin_scope_transitions — overlap-begin → Transitioning
/// 2. cancel_scope_transitions — CancelScopeTransition → Idle
/// 3. tick_dwell_timers — overlap re-check, deadline
/// 4. commit_view_locks — DwellElapsed → Locked / CommitFailed
/// 5. log_transition_events — diagnostics
///
/// LayerRegistry вставляется только если хост не вставил свой.
#[derive(Default)]
pub struct ScopeTransitionPlugin {
    pub config: ScopeTransitionConfig,
}

impl Plugin for ScopeTransitionPlugin {
    fn build(&self, app: &mut App) {
        logger::set_log_level(self.config.log_level);

        app.insert_resource(self.config.clone())
            .init_resource::<LayerRegistry>();

        // Регистрация событий
        app.add_event::<ZoneOverlapBegan>()
            .add_event::<CancelScopeTransition>()
            .add_event::<DwellElapsed>()
            .add_event::<ScopeTransitionEvent>();

        app.configure_sets(
            PostUpdate,
            ScopeTransitionSystems.after(TransformSystem::TransformPropagate),
        );

        app.add_systems(
            PostUpdate,
            (
                systems::begin_scope_transitions,
                systems::cancel_scope_transitions,
                systems::tick_dwell_timers,
                systems::commit_view_locks,
                systems::log_transition_events,
            )
                .chain() // Последовательное выполнение: check-before-suspend
                .in_set(ScopeTransitionSystems),
        );
    }
}
