//! Synchronous notifications from the view to its host.

use std::fmt;

/// Something the host may want to react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// A click without movement, at the floor of the image coordinate.
    PixelClicked { x: i64, y: i64 },
    PointAdded(usize),
    /// Carries the index the point had before removal.
    PointDeleted(usize),
    PointModified(usize),
    PolylineModified,
    MaskModified,
}

/// Discriminant of [`ViewEvent`] used for subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PixelClicked,
    PointAdded,
    PointDeleted,
    PointModified,
    PolylineModified,
    MaskModified,
}

impl ViewEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PixelClicked { .. } => EventKind::PixelClicked,
            Self::PointAdded(_) => EventKind::PointAdded,
            Self::PointDeleted(_) => EventKind::PointDeleted,
            Self::PointModified(_) => EventKind::PointModified,
            Self::PolylineModified => EventKind::PolylineModified,
            Self::MaskModified => EventKind::MaskModified,
        }
    }
}

type Callback = Box<dyn FnMut(&ViewEvent)>;

/// Subscriber list; callbacks run in registration order on the calling thread.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(Option<EventKind>, Callback)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive only events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, callback: impl FnMut(&ViewEvent) + 'static) {
        self.subscribers.push((Some(kind), Box::new(callback)));
    }

    /// Receive every event.
    pub fn subscribe_all(&mut self, callback: impl FnMut(&ViewEvent) + 'static) {
        self.subscribers.push((None, Box::new(callback)));
    }

    pub fn emit(&mut self, event: ViewEvent) {
        let kind = event.kind();
        for (filter, callback) in &mut self.subscribers {
            if filter.is_none_or(|k| k == kind) {
                callback(&event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
