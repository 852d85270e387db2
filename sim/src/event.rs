/// Event category as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Nothing happened this tick.
    Idle,
    KeyDown,
    KeyUp,
    Quit,
    /// Any other backend event type, passed through untouched.
    Other(u32),
}

/// One input event: its kind plus the key symbol (0 when not a key event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub kind: EventKind,
    pub symbol: i32,
}

impl InputEvent {
    pub fn new(kind: EventKind, symbol: i32) -> Self {
        InputEvent { kind, symbol }
    }

    pub fn idle() -> Self {
        Self::new(EventKind::Idle, 0)
    }

    pub fn key_down(symbol: i32) -> Self {
        Self::new(EventKind::KeyDown, symbol)
    }

    pub fn key_up(symbol: i32) -> Self {
        Self::new(EventKind::KeyUp, symbol)
    }

    #[inline(always)]
    pub fn matches(&self, kind: EventKind, symbol: i32) -> bool {
        self.kind == kind && self.symbol == symbol
    }
}

impl Default for InputEvent {
    fn default() -> Self {
        Self::idle()
    }
}
