use std::path::PathBuf;

use vista_core::interaction::{CursorShape, InteractionFeature, PointerButton};

pub const FEATURE_NAMES: &[&str] = &["None", "Edit points", "Move points", "Edit polyline"];

pub const FEATURES: &[InteractionFeature] = &[
    InteractionFeature::None,
    InteractionFeature::PointEditing,
    InteractionFeature::PointManipulationOnly,
    InteractionFeature::PolylineEditing,
];

const MAX_LOG_LINES: usize = 200;

/// Host-side UI state that is not owned by the view.
#[derive(Default)]
pub struct UIState {
    pub file_path: Option<PathBuf>,
    pub log_messages: Vec<String>,
    /// Image coordinate under the cursor.
    pub hover_image: Option<(f64, f64)>,
    pub last_click: Option<(i64, i64)>,
    pub show_info_overlay: bool,
    /// Button that started the gesture the view is tracking.
    pub pressed: Option<PointerButton>,
    pub cursor: CursorShape,
}

impl UIState {
    pub fn add_log(&mut self, msg: String) {
        tracing::info!("{msg}");
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    pub fn feature_index(feature: InteractionFeature) -> usize {
        FEATURES.iter().position(|&f| f == feature).unwrap_or(0)
    }
}
