//! ECS Components для scope transition
//!
//! Организация по доменам:
//! - zone: trigger зона и её binding к наблюдателю (ScopeZone)
//! - camera: камеры, render targets, locked perspective surface (ViewCamera, ScopeCamera, RenderSurface)
//! - volume: геометрия для overlap проверок (BoundingVolume)

pub mod camera;
pub mod volume;
pub mod zone;

// Re-exports для удобного импорта
pub use camera::*;
pub use volume::*;
pub use zone::*;
