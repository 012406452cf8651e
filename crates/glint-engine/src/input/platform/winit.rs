//! Translation from winit window events into `InputEvent`s.

use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Pixels per wheel notch when the platform reports pixel deltas.
const PIXELS_PER_NOTCH: f32 = 120.0;

/// Translates one window event, emitting zero or more input events.
///
/// Key presses with attached text emit the key first, then one `Text` event
/// per printable character.
pub fn translate_window_event(event: &WindowEvent, mut emit: impl FnMut(InputEvent)) {
    match event {
        WindowEvent::Focused(f) => emit(InputEvent::Focused(*f)),

        WindowEvent::CursorMoved { position, .. } => emit(InputEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        WindowEvent::MouseInput { state, button, .. } => {
            let Some(button) = map_mouse_button(*button) else { return };
            let state = match state {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            emit(InputEvent::PointerButton { button, state });
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => {
                    (p.x as f32 / PIXELS_PER_NOTCH, p.y as f32 / PIXELS_PER_NOTCH)
                }
            };
            emit(InputEvent::MouseWheel { x, y });
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            emit(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            });

            if state == KeyState::Pressed {
                if let Some(text) = &event.text {
                    text.chars().filter(|c| !c.is_control()).for_each(|c| emit(InputEvent::Text(c)));
                }
            }
        }

        WindowEvent::Ime(winit::event::Ime::Commit(text)) => {
            text.chars().filter(|c| !c.is_control()).for_each(|c| emit(InputEvent::Text(c)));
        }

        _ => {}
    }
}

fn map_mouse_button(b: WinitMouseButton) -> Option<MouseButton> {
    match b {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(_) => None,
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown;
    };

    match code {
        KeyCode::Space => Key::Space,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Minus => Key::Minus,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Equal => Key::Equal,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::BracketRight => Key::RightBracket,
        KeyCode::Backquote => Key::GraveAccent,

        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,

        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowUp => Key::ArrowUp,

        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,

        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::ScrollLock => Key::ScrollLock,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Pause => Key::Pause,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        KeyCode::Numpad0 => Key::Numpad0,
        KeyCode::Numpad1 => Key::Numpad1,
        KeyCode::Numpad2 => Key::Numpad2,
        KeyCode::Numpad3 => Key::Numpad3,
        KeyCode::Numpad4 => Key::Numpad4,
        KeyCode::Numpad5 => Key::Numpad5,
        KeyCode::Numpad6 => Key::Numpad6,
        KeyCode::Numpad7 => Key::Numpad7,
        KeyCode::Numpad8 => Key::Numpad8,
        KeyCode::Numpad9 => Key::Numpad9,
        KeyCode::NumpadDecimal => Key::NumpadDecimal,
        KeyCode::NumpadDivide => Key::NumpadDivide,
        KeyCode::NumpadMultiply => Key::NumpadMultiply,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadEnter => Key::NumpadEnter,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftCtrl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlRight => Key::RightCtrl,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperRight => Key::RightSuper,
        KeyCode::ContextMenu => Key::Menu,

        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sided_modifiers() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlRight)), Key::RightCtrl);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)), Key::LeftShift);
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::MediaPlayPause)), Key::Unknown);
    }

    #[test]
    fn focus_event_passes_through() {
        let mut out = Vec::new();
        translate_window_event(&WindowEvent::Focused(false), |e| out.push(e));
        assert_eq!(out, vec![InputEvent::Focused(false)]);
    }
}
