//! Scope Transition Core
//!
//! Time-gated переход free view → locked scope view для наблюдателя
//! (camera rig игрока), вошедшего в trigger зону вокруг scope объекта:
//! 1) Наблюдатель входит в зону (overlap-begin)
//! 2) Dwell: ждём TransitionWaitTime, каждый frame проверяя что он всё ещё внутри
//! 3) Commit: scope камера рисует в locked perspective texture,
//!    primary камера переключается с Macro слоя на Micro
//!
//! ECS-модуль на Bevy 0.16: рендер, ассеты, input — внешние коллабораторы.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;
use std::time::Duration;

// Публичные модули
pub mod components;
pub mod config;
pub mod error;
pub mod layers;
pub mod logger;
pub mod physics;
pub mod transition;

// Re-export базовых типов для удобства
pub use components::*;
pub use config::ScopeTransitionConfig;
pub use error::CommitError;
pub use layers::{CullingMask, LayerIndex, LayerRegistry};
pub use physics::{scope_zone_sensor, RapierSensorBridgePlugin};
pub use transition::{
    CancelReason, CancelScopeTransition, ScopeTransitionEvent, ScopeTransitionPlugin,
    ScopeTransitionSystems, TransitionState, ZoneOverlapBegan,
};

/// Создаёт minimal Bevy App для headless прогона
///
/// Время детерминированное: каждый `app.update()` = один display tick
/// длиной `frame` (первый update — elapsed 0).
/// TransformPlugin нужен для GlobalTransform (bounds проверки в world space).
pub fn create_headless_app(frame: Duration) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(frame));

    app
}
