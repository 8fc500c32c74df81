//! Input records routed to tools
//!
//! The windowing layer turns raw device input into `ViewportMouseEvent`s
//! and `PanelKeyEvent`s and sends them as Bevy events. The tool manager
//! hands them to the active tool read-only.

use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

/// Identifies the viewport (render panel) an event happened in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewportId(pub u32);

/// Modifier key states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        super_key: false,
    };

    /// Read the modifier state from Bevy's keyboard input
    pub fn from_keys(keys: &ButtonInput<KeyCode>) -> Self {
        Self {
            shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
            ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
            alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
            super_key: keys.any_pressed([KeyCode::SuperLeft, KeyCode::SuperRight]),
        }
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.super_key
    }
}

/// Mouse buttons held down while an event happened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl MouseButtons {
    pub fn contains(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
            _ => false,
        }
    }

    pub fn with(mut self, button: MouseButton) -> Self {
        self.set(button, true);
        self
    }

    pub fn set(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left = down,
            MouseButton::Middle => self.middle = down,
            MouseButton::Right => self.right = down,
            // Extra buttons are not tracked
            _ => {}
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.middle || self.right
    }
}

/// What kind of pointer event this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Move,
    Scroll,
    DoubleClick,
}

/// A pointer event inside a viewport
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ViewportMouseEvent {
    pub viewport: ViewportId,
    pub kind: MouseEventKind,
    /// Cursor position in viewport pixels
    pub position: Vec2,
    /// Cursor position of the previous event in the same viewport
    pub last_position: Vec2,
    /// Button that caused a press, release or double click
    pub button: Option<MouseButton>,
    /// Buttons held down after this event
    pub buttons: MouseButtons,
    pub wheel_delta: f32,
    pub modifiers: Modifiers,
}

impl ViewportMouseEvent {
    fn new(viewport: ViewportId, kind: MouseEventKind, position: Vec2) -> Self {
        Self {
            viewport,
            kind,
            position,
            last_position: position,
            button: None,
            buttons: MouseButtons::default(),
            wheel_delta: 0.0,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(viewport: ViewportId, position: Vec2) -> Self {
        Self::new(viewport, MouseEventKind::Move, position)
    }

    pub fn pressed(viewport: ViewportId, position: Vec2, button: MouseButton) -> Self {
        let mut event = Self::new(viewport, MouseEventKind::Press, position);
        event.button = Some(button);
        event.buttons = MouseButtons::default().with(button);
        event
    }

    pub fn released(viewport: ViewportId, position: Vec2, button: MouseButton) -> Self {
        let mut event = Self::new(viewport, MouseEventKind::Release, position);
        event.button = Some(button);
        event
    }

    pub fn double_clicked(viewport: ViewportId, position: Vec2, button: MouseButton) -> Self {
        let mut event = Self::pressed(viewport, position, button);
        event.kind = MouseEventKind::DoubleClick;
        event
    }

    pub fn scrolled(viewport: ViewportId, position: Vec2, wheel_delta: f32) -> Self {
        let mut event = Self::new(viewport, MouseEventKind::Scroll, position);
        event.wheel_delta = wheel_delta;
        event
    }

    pub fn with_last_position(mut self, last_position: Vec2) -> Self {
        self.last_position = last_position;
        self
    }

    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Movement since the previous event
    pub fn delta(&self) -> Vec2 {
        self.position - self.last_position
    }

    pub fn left_down(&self) -> bool {
        self.buttons.left
    }

    pub fn middle_down(&self) -> bool {
        self.buttons.middle
    }

    pub fn right_down(&self) -> bool {
        self.buttons.right
    }

    pub fn just_pressed(&self, button: MouseButton) -> bool {
        self.kind == MouseEventKind::Press && self.button == Some(button)
    }

    pub fn just_released(&self, button: MouseButton) -> bool {
        self.kind == MouseEventKind::Release && self.button == Some(button)
    }
}

/// The render panel a key event was delivered to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderPanel {
    pub viewport: ViewportId,
    /// Size in physical pixels
    pub size: UVec2,
}

impl RenderPanel {
    pub fn new(viewport: ViewportId, size: UVec2) -> Self {
        Self { viewport, size }
    }
}

/// A key press or release
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: KeyCode,
    /// Text the key produced, if any
    pub text: Option<char>,
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn pressed(key: KeyCode) -> Self {
        Self {
            key,
            text: keycode_char(key),
            pressed: true,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn released(key: KeyCode) -> Self {
        Self {
            pressed: false,
            ..Self::pressed(key)
        }
    }

    pub fn with_text(mut self, text: char) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Translate Bevy's keyboard input, taking modifiers from `modifiers`
    pub fn from_keyboard_input(input: &KeyboardInput, modifiers: Modifiers) -> Self {
        let text = input
            .text
            .as_ref()
            .and_then(|text| text.chars().next())
            .or_else(|| keycode_char(input.key_code));
        Self {
            key: input.key_code,
            text,
            pressed: input.state == ButtonState::Pressed,
            modifiers,
        }
    }

    /// Character used to match tool shortcuts, lowercased
    pub fn shortcut_char(&self) -> Option<char> {
        self.text.map(|c| c.to_ascii_lowercase())
    }
}

/// A key event together with the panel it was delivered to
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PanelKeyEvent {
    pub event: KeyEvent,
    pub panel: RenderPanel,
}

/// Character typed by `key` on a US layout without modifiers
pub fn keycode_char(key: KeyCode) -> Option<char> {
    let c = match key {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 => '0',
        KeyCode::Digit1 => '1',
        KeyCode::Digit2 => '2',
        KeyCode::Digit3 => '3',
        KeyCode::Digit4 => '4',
        KeyCode::Digit5 => '5',
        KeyCode::Digit6 => '6',
        KeyCode::Digit7 => '7',
        KeyCode::Digit8 => '8',
        KeyCode::Digit9 => '9',
        KeyCode::Space => ' ',
        _ => return None,
    };
    Some(c)
}
