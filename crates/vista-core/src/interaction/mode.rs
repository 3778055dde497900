use std::collections::BTreeSet;

use kurbo::Point;

use crate::viewport::ViewportState;

/// Which overlay the user edits. The variants are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionFeature {
    #[default]
    None,
    /// Drag existing points and click to add new ones.
    PointEditing,
    /// Drag existing points; clicks do not add.
    PointManipulationOnly,
    PolylineEditing,
}

impl InteractionFeature {
    pub fn manipulates_points(self) -> bool {
        matches!(self, Self::PointEditing | Self::PointManipulationOnly)
    }

    pub fn adds_points(self) -> bool {
        self == Self::PointEditing
    }

    pub fn edits_polyline(self) -> bool {
        self == Self::PolylineEditing
    }
}

/// Active pointer gesture. Entered on pointer-down, back to `Idle` on pointer-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    PointGrabbed {
        index: usize,
        delete_pending: bool,
    },
    PolylineVertexGrabbed {
        moved: bool,
    },
    RubberBandSelecting {
        origin: Point,
        current: Point,
        preview: BTreeSet<usize>,
    },
    Painting {
        /// Last stamped position in image coordinates.
        last: Point,
        value: bool,
    },
    PanZooming {
        anchor: Point,
        initial: ViewportState,
        travel_y: f64,
    },
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
