//! Конфигурация view lock commit'а
//!
//! Имена объектов сцены и слоёв, которые commit резолвит.
//! Dwell — per-zone параметр (см. `ScopeZone::dwell`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::layers::{LAYER_NAME_MACRO, LAYER_NAME_MICRO};
use crate::logger::LogLevel;

/// Имя child'а camera rig'а с locked perspective surface
pub const LOCKED_SURFACE_NAME: &str = "LockedScopePerspective";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeTransitionConfig {
    /// Child camera rig'а, на который композится scope view
    pub locked_surface_name: String,
    /// Слой, который primary камера перестаёт рисовать после lock'а
    pub hidden_layer: String,
    /// Слой, который primary камера начинает рисовать после lock'а
    pub shown_layer: String,
    /// Минимальный уровень diagnostic лога
    pub log_level: LogLevel,
}

impl Default for ScopeTransitionConfig {
    fn default() -> Self {
        Self {
            locked_surface_name: LOCKED_SURFACE_NAME.to_string(),
            hidden_layer: LAYER_NAME_MACRO.to_string(),
            shown_layer: LAYER_NAME_MICRO.to_string(),
            log_level: LogLevel::Debug,
        }
    }
}
