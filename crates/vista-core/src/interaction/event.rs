use kurbo::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
}

/// A pointer event in widget coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Widget-local position.
    pub pos: Point,
    /// Desktop position, used for cursor wrapping at screen edges.
    pub global: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Event whose global position equals its local one.
    pub fn new(pos: Point, button: PointerButton) -> Self {
        Self {
            pos,
            global: pos,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn primary(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), PointerButton::Primary)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_global(mut self, global: Point) -> Self {
        self.global = global;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Cursor the host should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorShape {
    #[default]
    Default,
    OpenHand,
    ClosedHand,
    Crosshair,
    /// The grabbed point will be deleted on release.
    DeletePending,
    Zoom,
}

/// What the host should do after a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerResponse {
    pub repaint: bool,
    pub cursor: CursorShape,
    /// Move the system cursor here (desktop coordinates).
    pub warp_cursor: Option<Point>,
}

impl PointerResponse {
    pub(crate) fn cursor(cursor: CursorShape) -> Self {
        Self {
            repaint: false,
            cursor,
            warp_cursor: None,
        }
    }

    pub(crate) fn repaint(cursor: CursorShape) -> Self {
        Self {
            repaint: true,
            cursor,
            warp_cursor: None,
        }
    }
}
