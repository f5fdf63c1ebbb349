//! Visibility Layers
//!
//! Именованные слои рендера → bit index → culling mask камеры.
//!
//! ## Архитектура:
//! - **Layer index (0..32):** номер слоя, резолвится по имени через `LayerRegistry`
//! - **Culling mask (u32):** какие слои камера рисует, `bit(layer) = 1 << index`
//!
//! ## Слои по умолчанию:
//! - Layer 0 (0b1 = 1): Default
//! - Layer 8 (0b1_0000_0000 = 256): Macro — обычный мир вокруг наблюдателя
//! - Layer 9 (0b10_0000_0000 = 512): Micro — scope мир (включая locked perspective surface)
//!
//! ## Использование:
//! ```rust
//! use scope_transition::layers::*;
//!
//! let registry = LayerRegistry::default();
//! let mut mask = CullingMask::EVERYTHING;
//! mask.disable(registry.resolve(LAYER_NAME_MACRO).unwrap());
//! mask.enable(registry.resolve(LAYER_NAME_MICRO).unwrap());
//! ```

use bevy::prelude::*;
use std::collections::HashMap;

use crate::error::CommitError;

// ============================================================================
// Имена и индексы слоёв по умолчанию
// ============================================================================

pub const LAYER_NAME_DEFAULT: &str = "Default";
pub const LAYER_NAME_MACRO: &str = "Macro";
pub const LAYER_NAME_MICRO: &str = "Micro";

pub const LAYER_DEFAULT: LayerIndex = LayerIndex(0);
pub const LAYER_MACRO: LayerIndex = LayerIndex(8);
pub const LAYER_MICRO: LayerIndex = LayerIndex(9);

/// Максимум слоёв (ширина culling mask)
pub const MAX_LAYERS: u8 = 32;

/// Индекс слоя (0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct LayerIndex(u8);

impl LayerIndex {
    /// `None` если индекс не помещается в u32 маску
    pub fn new(index: u8) -> Option<Self> {
        (index < MAX_LAYERS).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// `1 << index`
    pub fn bit(self) -> u32 {
        1u32 << self.0
    }
}

// ============================================================================
// Culling mask
// ============================================================================

/// Visibility filter камеры (битовая маска слоёв)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct CullingMask(pub u32);

impl CullingMask {
    pub const NOTHING: Self = Self(0);
    pub const EVERYTHING: Self = Self(u32::MAX);

    /// `filter &= !bit(layer)`
    pub fn disable(&mut self, layer: LayerIndex) {
        self.0 &= !layer.bit();
    }

    /// `filter |= bit(layer)`
    pub fn enable(&mut self, layer: LayerIndex) {
        self.0 |= layer.bit();
    }

    pub fn contains(&self, layer: LayerIndex) -> bool {
        self.0 & layer.bit() != 0
    }
}

impl Default for CullingMask {
    fn default() -> Self {
        Self::EVERYTHING
    }
}

// ============================================================================
// Registry: имя → индекс
// ============================================================================

/// Named layer → bit index resolution
///
/// Хост регистрирует свои слои; по умолчанию Default/Macro/Micro.
#[derive(Resource, Debug, Clone)]
pub struct LayerRegistry {
    layers: HashMap<String, LayerIndex>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::empty()
            .with_layer(LAYER_NAME_DEFAULT, LAYER_DEFAULT)
            .with_layer(LAYER_NAME_MACRO, LAYER_MACRO)
            .with_layer(LAYER_NAME_MICRO, LAYER_MICRO)
    }
}

impl LayerRegistry {
    pub fn empty() -> Self {
        Self {
            layers: HashMap::new(),
        }
    }

    /// Регистрирует (или переопределяет) слой
    pub fn with_layer(mut self, name: impl Into<String>, index: LayerIndex) -> Self {
        self.layers.insert(name.into(), index);
        self
    }

    /// Неизвестное имя → `CommitError::UnknownLayer` (та же обработка что и missing object)
    pub fn resolve(&self, name: &str) -> Result<LayerIndex, CommitError> {
        self.layers
            .get(name)
            .copied()
            .ok_or_else(|| CommitError::UnknownLayer(name.to_string()))
    }
}
