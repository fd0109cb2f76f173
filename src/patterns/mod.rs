pub mod actions;
pub mod library;
pub mod overlay;
pub mod shape;

pub use actions::actions_for;
pub use library::ShapeLibrary;
pub use overlay::{
    build_overlay, occurrence_count, pattern_label, resolve_overlays, OverlayPoint,
    PatternDetection, PatternOverlay,
};
pub use shape::{parse_shape_csv, shape_resource, ShapePoint};
