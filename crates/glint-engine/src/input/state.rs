use glam::Vec2;

use crate::coords::Rect;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Double-buffered keyboard and mouse state for a single window.
///
/// Platform events are applied to a live device snapshot as they arrive.
/// [`begin_frame`](Self::begin_frame) must run exactly once per frame before any
/// query: it moves the current snapshot into the previous one and copies the
/// live device state in as the new current snapshot. Edge queries compare the
/// two, so a press and release between frames is not observed.
#[derive(Debug)]
pub struct InputState {
    focused: bool,

    live_keys: [bool; Key::COUNT],
    live_buttons: [bool; MouseButton::COUNT],
    /// Window pixels, top-left origin.
    live_cursor: Vec2,

    prev_keys: [bool; Key::COUNT],
    keys: [bool; Key::COUNT],

    prev_buttons: [bool; MouseButton::COUNT],
    buttons: [bool; MouseButton::COUNT],

    /// Framebuffer pixels, bottom-left origin.
    prev_mouse: Vec2,
    mouse: Vec2,
    mouse_delta: Vec2,

    incoming: InputFrame,
    frame: InputFrame,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            focused: true,
            live_keys: [false; Key::COUNT],
            live_buttons: [false; MouseButton::COUNT],
            live_cursor: Vec2::ZERO,
            prev_keys: [false; Key::COUNT],
            keys: [false; Key::COUNT],
            prev_buttons: [false; MouseButton::COUNT],
            buttons: [false; MouseButton::COUNT],
            prev_mouse: Vec2::ZERO,
            mouse: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            incoming: InputFrame::default(),
            frame: InputFrame::default(),
        }
    }
}

impl InputState {
    /// Applies a platform-agnostic event to the live device state.
    ///
    /// Nothing becomes visible to queries until the next `begin_frame`.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Releases never arrive for keys held while unfocused.
                    self.live_keys = [false; Key::COUNT];
                    self.live_buttons = [false; MouseButton::COUNT];
                }
            }

            InputEvent::Key { key, state, .. } => {
                let Some(i) = key.index() else { return };
                match state {
                    KeyState::Pressed => {
                        self.live_keys[i] = true;
                        self.incoming.keys.push(key);
                    }
                    KeyState::Released => self.live_keys[i] = false,
                }
            }

            InputEvent::Text(c) => {
                self.incoming.text.push(c);
            }

            InputEvent::PointerMoved { x, y } => {
                self.live_cursor = Vec2::new(x, y);
            }

            InputEvent::PointerButton { button, state } => {
                self.live_buttons[button.index()] = state == MouseButtonState::Pressed;
            }

            InputEvent::MouseWheel { y, .. } => {
                self.incoming.scroll += y;
            }
        }
    }

    /// Advances to a new frame.
    ///
    /// `window_height` flips the cursor into the y-up framebuffer convention.
    pub fn begin_frame(&mut self, window_height: f32) {
        self.prev_keys = self.keys;
        self.keys = self.live_keys;

        self.prev_buttons = self.buttons;
        self.buttons = self.live_buttons;

        self.prev_mouse = self.mouse;
        self.mouse = Vec2::new(self.live_cursor.x, window_height - self.live_cursor.y);
        self.mouse_delta = self.mouse - self.prev_mouse;

        std::mem::swap(&mut self.frame, &mut self.incoming);
        self.incoming.clear();
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    // ── keyboard ──────────────────────────────────────────────────────────

    pub fn key_is_down(&self, key: Key) -> bool {
        resolve_key(&self.keys, key)
    }

    pub fn key_was_down(&self, key: Key) -> bool {
        resolve_key(&self.prev_keys, key)
    }

    pub fn key_just_pressed(&self, key: Key) -> bool {
        !self.key_was_down(key) && self.key_is_down(key)
    }

    pub fn key_just_released(&self, key: Key) -> bool {
        self.key_was_down(key) && !self.key_is_down(key)
    }

    /// Keys pressed or repeated during the last frame, in arrival order.
    pub fn keys_just_pressed(&self) -> &[Key] {
        self.frame.keys.as_slice()
    }

    /// Characters typed during the last frame.
    pub fn text_input(&self) -> &[char] {
        self.frame.text.as_slice()
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    pub fn mouse_button_is_down(&self, b: MouseButton) -> bool {
        self.buttons[b.index()]
    }

    pub fn mouse_button_was_down(&self, b: MouseButton) -> bool {
        self.prev_buttons[b.index()]
    }

    pub fn mouse_button_just_pressed(&self, b: MouseButton) -> bool {
        !self.mouse_button_was_down(b) && self.mouse_button_is_down(b)
    }

    pub fn mouse_button_just_released(&self, b: MouseButton) -> bool {
        self.mouse_button_was_down(b) && !self.mouse_button_is_down(b)
    }

    pub fn mouse_any_down(&self) -> bool {
        self.buttons.iter().any(|&b| b)
    }

    pub fn mouse_was_any_down(&self) -> bool {
        self.prev_buttons.iter().any(|&b| b)
    }

    /// Cursor position in framebuffer pixels (bottom-left origin).
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    /// Cursor position relative to the origin of `layout`.
    pub fn mouse_pos_in(&self, layout: Rect) -> Vec2 {
        self.mouse - layout.origin()
    }

    /// Cursor movement since the previous frame.
    ///
    /// Mainly useful to detect the start of a drag; it is not an accurate
    /// accumulation of distance travelled.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel notches scrolled during the last frame.
    pub fn mouse_scroll(&self) -> f32 {
        self.frame.scroll
    }

    /// Whether the cursor lies strictly inside `rect`, where `rect` is given
    /// in the coordinate space of `layout`.
    pub fn mouse_is_over(&self, rect: Rect, layout: Rect) -> bool {
        rect.contains_strict(self.mouse_pos_in(layout))
    }
}

fn resolve_key(keys: &[bool; Key::COUNT], key: Key) -> bool {
    if let Some((left, right)) = key.sides() {
        return resolve_key(keys, left) || resolve_key(keys, right);
    }
    match key {
        Key::Any => keys.iter().any(|&k| k),
        _ => key.index().is_some_and(|i| keys[i]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_KEYS: [Key; 8] = [
        Key::A, Key::Space, Key::Escape, Key::F12,
        Key::LeftShift, Key::RightCtrl, Key::Numpad5, Key::Menu,
    ];

    fn press(input: &mut InputState, key: Key) {
        input.apply_event(InputEvent::Key { key, state: KeyState::Pressed, repeat: false });
    }

    fn release(input: &mut InputState, key: Key) {
        input.apply_event(InputEvent::Key { key, state: KeyState::Released, repeat: false });
    }

    // ── edge queries ──────────────────────────────────────────────────────

    #[test]
    fn just_pressed_then_held_then_released() {
        let mut input = InputState::default();

        press(&mut input, Key::A);
        input.begin_frame(600.0);
        assert!(input.key_just_pressed(Key::A));
        assert!(!input.key_just_released(Key::A));

        input.begin_frame(600.0);
        assert!(input.key_is_down(Key::A));
        assert!(!input.key_just_pressed(Key::A));

        release(&mut input, Key::A);
        input.begin_frame(600.0);
        assert!(input.key_just_released(Key::A));
        assert!(!input.key_just_pressed(Key::A));
    }

    #[test]
    fn events_are_invisible_until_begin_frame() {
        let mut input = InputState::default();
        press(&mut input, Key::W);
        assert!(!input.key_is_down(Key::W));
        input.begin_frame(600.0);
        assert!(input.key_is_down(Key::W));
    }

    #[test]
    fn just_pressed_matches_definition_for_every_transition() {
        for key in SAMPLE_KEYS {
            for (was, is) in [(false, false), (false, true), (true, false), (true, true)] {
                let mut input = InputState::default();
                if was {
                    press(&mut input, key);
                }
                input.begin_frame(100.0);
                if is && !was {
                    press(&mut input, key);
                } else if was && !is {
                    release(&mut input, key);
                }
                input.begin_frame(100.0);

                assert_eq!(input.key_was_down(key), was);
                assert_eq!(input.key_is_down(key), is);
                assert_eq!(
                    input.key_just_pressed(key),
                    !input.key_was_down(key) && input.key_is_down(key)
                );
                assert!(!(input.key_just_pressed(key) && input.key_just_released(key)));
            }
        }
    }

    // ── logical keys ──────────────────────────────────────────────────────

    #[test]
    fn composite_keys_are_or_of_sides() {
        let pairs = [
            (Key::Ctrl, Key::LeftCtrl, Key::RightCtrl),
            (Key::Shift, Key::LeftShift, Key::RightShift),
            (Key::Alt, Key::LeftAlt, Key::RightAlt),
        ];
        for (composite, left, right) in pairs {
            for (l, r) in [(false, false), (true, false), (false, true), (true, true)] {
                let mut input = InputState::default();
                if l { press(&mut input, left); }
                if r { press(&mut input, right); }
                input.begin_frame(100.0);
                input.begin_frame(100.0);

                assert_eq!(input.key_is_down(composite), input.key_is_down(left) || input.key_is_down(right));
                assert_eq!(input.key_was_down(composite), input.key_was_down(left) || input.key_was_down(right));
            }
        }
    }

    #[test]
    fn any_tracks_every_physical_key() {
        let mut input = InputState::default();
        input.begin_frame(100.0);
        assert!(!input.key_is_down(Key::Any));

        press(&mut input, Key::Numpad7);
        input.begin_frame(100.0);
        assert!(input.key_just_pressed(Key::Any));

        release(&mut input, Key::Numpad7);
        input.begin_frame(100.0);
        assert!(input.key_just_released(Key::Any));
    }

    #[test]
    fn unknown_is_never_down() {
        let mut input = InputState::default();
        press(&mut input, Key::Unknown);
        press(&mut input, Key::A);
        input.begin_frame(100.0);
        assert!(!input.key_is_down(Key::Unknown));
        assert!(!input.key_was_down(Key::Unknown));
        assert!(!input.key_just_pressed(Key::Unknown));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputState::default();
        press(&mut input, Key::D);
        input.begin_frame(100.0);
        input.apply_event(InputEvent::Focused(false));
        input.begin_frame(100.0);
        assert!(input.key_just_released(Key::D));
        assert!(!input.focused());
    }

    // ── queues ────────────────────────────────────────────────────────────

    #[test]
    fn key_queue_keeps_repeats_and_resets_each_frame() {
        let mut input = InputState::default();
        press(&mut input, Key::Backspace);
        input.apply_event(InputEvent::Key { key: Key::Backspace, state: KeyState::Pressed, repeat: true });
        input.begin_frame(100.0);
        assert_eq!(input.keys_just_pressed(), &[Key::Backspace, Key::Backspace]);

        input.begin_frame(100.0);
        assert!(input.keys_just_pressed().is_empty());
    }

    #[test]
    fn text_queue_drops_overflow_silently() {
        let mut input = InputState::default();
        for _ in 0..Key::COUNT + 10 {
            input.apply_event(InputEvent::Text('x'));
        }
        input.begin_frame(100.0);
        assert_eq!(input.text_input().len(), Key::COUNT);
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn mouse_buttons_have_edges() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::PointerButton { button: MouseButton::Left, state: MouseButtonState::Pressed });
        input.begin_frame(100.0);
        assert!(input.mouse_button_just_pressed(MouseButton::Left));
        assert!(input.mouse_any_down());
        assert!(!input.mouse_was_any_down());

        input.apply_event(InputEvent::PointerButton { button: MouseButton::Left, state: MouseButtonState::Released });
        input.begin_frame(100.0);
        assert!(input.mouse_button_just_released(MouseButton::Left));
        assert!(input.mouse_was_any_down());
    }

    #[test]
    fn cursor_is_flipped_to_y_up_and_delta_tracked() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::PointerMoved { x: 10.0, y: 20.0 });
        input.begin_frame(100.0);
        assert_eq!(input.mouse_position(), Vec2::new(10.0, 80.0));

        input.apply_event(InputEvent::PointerMoved { x: 15.0, y: 30.0 });
        input.begin_frame(100.0);
        assert_eq!(input.mouse_position(), Vec2::new(15.0, 70.0));
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, -10.0));
    }

    #[test]
    fn scroll_accumulates_per_frame() {
        let mut input = InputState::default();
        input.apply_event(InputEvent::MouseWheel { x: 0.0, y: 1.0 });
        input.apply_event(InputEvent::MouseWheel { x: 0.0, y: 2.0 });
        input.begin_frame(100.0);
        assert_eq!(input.mouse_scroll(), 3.0);
        input.begin_frame(100.0);
        assert_eq!(input.mouse_scroll(), 0.0);
    }

    #[test]
    fn mouse_over_is_relative_to_layout() {
        let mut input = InputState::default();
        // y-down 40 in a 100px window is y-up 60.
        input.apply_event(InputEvent::PointerMoved { x: 60.0, y: 40.0 });
        input.begin_frame(100.0);

        let layout = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(input.mouse_pos_in(layout), Vec2::new(10.0, 10.0));
        assert!(input.mouse_is_over(Rect::new(0.0, 0.0, 20.0, 20.0), layout));
        assert!(!input.mouse_is_over(Rect::new(10.0, 0.0, 20.0, 20.0), layout));
    }
}
