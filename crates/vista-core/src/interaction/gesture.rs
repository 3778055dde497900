use kurbo::{Point, Rect};

use crate::consts::CURSOR_WRAP_MARGIN;

use super::event::{PointerButton, PointerEvent};

/// Book-keeping for one press-move-release sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub button: PointerButton,
    pub down: Point,
    pub last: Point,
    pub moved: bool,
}

impl Gesture {
    pub fn new(event: &PointerEvent) -> Self {
        Self {
            button: event.button,
            down: event.pos,
            last: event.pos,
            moved: false,
        }
    }
}

/// Where to move a cursor that reached the edge of `screen`, if it did.
///
/// The cursor reappears on the opposite edge so drags can continue past the
/// monitor boundary.
pub fn wrap_cursor(global: Point, screen: Rect) -> Option<Point> {
    let m = CURSOR_WRAP_MARGIN;
    let mut wrapped = global;
    if global.x <= screen.x0 + m - 1.0 {
        wrapped.x = screen.x1 - m - 1.0;
    } else if global.x >= screen.x1 - m {
        wrapped.x = screen.x0 + m;
    }
    if global.y <= screen.y0 + m - 1.0 {
        wrapped.y = screen.y1 - m - 1.0;
    } else if global.y >= screen.y1 - m {
        wrapped.y = screen.y0 + m;
    }
    (wrapped != global).then_some(wrapped)
}
