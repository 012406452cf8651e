use std::fmt;

/// Keyboard key identifier.
///
/// Physical keys come first and index directly into the per-key state arrays
/// (`key as usize < Key::COUNT`). The trailing variants are logical:
/// `Ctrl`/`Shift`/`Alt` resolve to either side, `Any` to any physical key, and
/// `Unknown` never reports as held.
#[repr(u16)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Space,
    Apostrophe,
    Comma,
    Minus,
    Period,
    Slash,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Semicolon,
    Equal,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    LeftBracket,
    Backslash,
    RightBracket,
    GraveAccent,

    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,

    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,

    PageUp,
    PageDown,
    Home,
    End,

    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Numpad0, Numpad1, Numpad2, Numpad3, Numpad4,
    Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    NumpadDecimal,
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadAdd,
    NumpadEnter,

    LeftShift,
    LeftCtrl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightCtrl,
    RightAlt,
    RightSuper,
    Menu,

    // Logical keys. Keep `Ctrl` first: `Key::COUNT` is derived from it.
    Ctrl,
    Shift,
    Alt,
    Any,
    Unknown,
}

impl Key {
    /// Number of physical keys tracked per frame.
    pub const COUNT: usize = Key::Ctrl as usize;

    /// Index into the per-key state arrays, or `None` for logical keys.
    #[inline]
    pub fn index(self) -> Option<usize> {
        let i = self as usize;
        (i < Self::COUNT).then_some(i)
    }

    /// Left/right pair a composite modifier resolves to.
    #[inline]
    pub fn sides(self) -> Option<(Key, Key)> {
        match self {
            Key::Ctrl => Some((Key::LeftCtrl, Key::RightCtrl)),
            Key::Shift => Some((Key::LeftShift, Key::RightShift)),
            Key::Alt => Some((Key::LeftAlt, Key::RightAlt)),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    pub const COUNT: usize = 5;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Pointer positions are window pixels with a top-left origin, exactly as the
/// platform reports them; `InputState` converts to the y-up convention when it
/// snapshots a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when the event is an OS key-repeat.
        repeat: bool,
    },

    /// A committed character of text input.
    Text(char),

    PointerMoved { x: f32, y: f32 },

    PointerButton {
        button: MouseButton,
        state: MouseButtonState,
    },

    /// Wheel movement in notches (lines). Positive `y` scrolls up.
    MouseWheel { x: f32, y: f32 },

    /// Window focus change.
    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_keys_have_indices() {
        assert_eq!(Key::Space.index(), Some(0));
        assert_eq!(Key::Menu.index(), Some(Key::COUNT - 1));
    }

    #[test]
    fn logical_keys_have_no_index() {
        for k in [Key::Ctrl, Key::Shift, Key::Alt, Key::Any, Key::Unknown] {
            assert_eq!(k.index(), None, "{k}");
        }
    }

    #[test]
    fn composite_sides() {
        assert_eq!(Key::Shift.sides(), Some((Key::LeftShift, Key::RightShift)));
        assert_eq!(Key::A.sides(), None);
        assert_eq!(Key::Any.sides(), None);
    }
}
