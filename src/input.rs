//! Interaction sampler: pointer, buttons, scroll and keys.
//!
//! Event handlers write into [`Input`] between frames; the simulation reads it
//! once per frame. Both run on the host's single event thread, so there is no
//! locking.
//!
//! Frame protocol, driven by [`Stage`](crate::stage::Stage):
//!
//! 1. events arrive through [`Input::handle_event`] or the host-independent
//!    mutators (`pointer_moved`, `button_pressed`, ...)
//! 2. [`Input::sample_frame`] advances the smoothed pointer once
//! 3. the sketch updates and renders, reading the state
//! 4. [`Input::end_frame`] clears the per-frame edges
//!
//! ```ignore
//! if ctx.input.mouse_pressed(MouseButton::Left) {
//!     store.spawn(Overrides::at(ctx.input.pointer()));
//! }
//! let follow = ctx.input.smoothed_pointer();
//! ```

use glam::Vec2;
use std::collections::HashSet;
use std::time::Instant;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Default per-frame blend factor of the smoothed pointer.
pub const DEFAULT_SMOOTHING: f32 = 0.1;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

/// Keyboard keys, by physical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Lowercase ASCII letter.
    Letter(char),
    Digit(u8),
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    /// Any key without its own variant.
    Other,
}

const LETTER_KEYS: [WinitKeyCode; 26] = [
    WinitKeyCode::KeyA,
    WinitKeyCode::KeyB,
    WinitKeyCode::KeyC,
    WinitKeyCode::KeyD,
    WinitKeyCode::KeyE,
    WinitKeyCode::KeyF,
    WinitKeyCode::KeyG,
    WinitKeyCode::KeyH,
    WinitKeyCode::KeyI,
    WinitKeyCode::KeyJ,
    WinitKeyCode::KeyK,
    WinitKeyCode::KeyL,
    WinitKeyCode::KeyM,
    WinitKeyCode::KeyN,
    WinitKeyCode::KeyO,
    WinitKeyCode::KeyP,
    WinitKeyCode::KeyQ,
    WinitKeyCode::KeyR,
    WinitKeyCode::KeyS,
    WinitKeyCode::KeyT,
    WinitKeyCode::KeyU,
    WinitKeyCode::KeyV,
    WinitKeyCode::KeyW,
    WinitKeyCode::KeyX,
    WinitKeyCode::KeyY,
    WinitKeyCode::KeyZ,
];

const DIGIT_KEYS: [WinitKeyCode; 10] = [
    WinitKeyCode::Digit0,
    WinitKeyCode::Digit1,
    WinitKeyCode::Digit2,
    WinitKeyCode::Digit3,
    WinitKeyCode::Digit4,
    WinitKeyCode::Digit5,
    WinitKeyCode::Digit6,
    WinitKeyCode::Digit7,
    WinitKeyCode::Digit8,
    WinitKeyCode::Digit9,
];

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        if let Some(i) = LETTER_KEYS.iter().position(|k| *k == key) {
            return KeyCode::Letter((b'a' + i as u8) as char);
        }
        if let Some(i) = DIGIT_KEYS.iter().position(|k| *k == key) {
            return KeyCode::Digit(i as u8);
        }
        match key {
            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Enter => KeyCode::Enter,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Tab => KeyCode::Tab,
            WinitKeyCode::Backspace => KeyCode::Backspace,
            _ => KeyCode::Other,
        }
    }
}

/// Pointer, button and keyboard state for one stage.
#[derive(Debug)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,
    mouse_released: HashSet<MouseButton>,

    pointer: Vec2,
    smoothed: Vec2,
    smoothing: f32,
    pointer_present: bool,
    smoothed_ready: bool,
    pointer_delta: Vec2,

    last_click: Option<Instant>,
    click_count: u64,

    scroll_delta: f32,
    window_size: (u32, u32),
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            mouse_held: HashSet::new(),
            mouse_pressed: HashSet::new(),
            mouse_released: HashSet::new(),
            pointer: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            smoothing: DEFAULT_SMOOTHING,
            pointer_present: false,
            smoothed_ready: false,
            pointer_delta: Vec2::ZERO,
            last_click: None,
            click_count: 0,
            scroll_delta: 0.0,
            window_size: (0, 0),
        }
    }

    /// Set the smoothed pointer's blend factor, clamped to `0.0..=1.0`.
    /// `1.0` follows the pointer exactly.
    pub fn with_smoothing(mut self, factor: f32) -> Self {
        self.smoothing = factor.clamp(0.0, 1.0);
        self
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    // ========== Pointer Queries ==========

    /// Latest pointer position in surface pixels.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Lagged pointer position: an exponential moving average toward
    /// [`pointer`](Self::pointer), advanced once per frame.
    pub fn smoothed_pointer(&self) -> Vec2 {
        self.smoothed
    }

    /// Whether the pointer is over the surface.
    pub fn pointer_present(&self) -> bool {
        self.pointer_present
    }

    /// Whether any mouse button is held.
    pub fn is_pointer_down(&self) -> bool {
        !self.mouse_held.is_empty()
    }

    /// Pointer movement since the previous frame.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Time of the most recent left click.
    pub fn last_click(&self) -> Option<Instant> {
        self.last_click
    }

    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    /// Scroll wheel delta this frame, positive is up.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    // ========== Button and Key Queries ==========

    /// Check if a mouse button went down this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_released.contains(&button)
    }

    /// Check if a key went down this frame (repeats excluded).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    // ========== Mutators ==========

    pub fn pointer_moved(&mut self, position: Vec2) {
        if self.pointer_present {
            self.pointer_delta += position - self.pointer;
        }
        self.pointer = position;
        self.pointer_present = true;
    }

    pub fn pointer_left(&mut self) {
        self.pointer_present = false;
    }

    pub fn button_pressed(&mut self, button: MouseButton) {
        self.mouse_pressed.insert(button);
        self.mouse_held.insert(button);
        if button == MouseButton::Left {
            self.last_click = Some(Instant::now());
            self.click_count += 1;
        }
    }

    pub fn button_released(&mut self, button: MouseButton) {
        self.mouse_held.remove(&button);
        self.mouse_released.insert(button);
    }

    pub fn key_down(&mut self, key: KeyCode) {
        // Only fire pressed if not already held (no repeat)
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
        self.keys_released.insert(key);
    }

    pub fn scrolled(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Advance the smoothed pointer by one frame.
    ///
    /// The first time the pointer is seen the smoothed position snaps to it,
    /// so the lag starts from a real location instead of the origin.
    pub fn sample_frame(&mut self) {
        if !self.pointer_present {
            return;
        }
        if self.smoothed_ready {
            self.smoothed += (self.pointer - self.smoothed) * self.smoothing;
        } else {
            self.smoothed = self.pointer;
            self.smoothed_ready = true;
        }
    }

    /// Clear per-frame edges and deltas.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.clear();
        self.mouse_released.clear();
        self.pointer_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Forget everything, e.g. when the stage is torn down.
    pub fn reset(&mut self) {
        *self = Self::new().with_smoothing(self.smoothing);
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let key = KeyCode::from(code);
                    match event.state {
                        ElementState::Pressed => self.key_down(key),
                        ElementState::Released => self.key_up(key),
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let btn = MouseButton::from(*button);
                match state {
                    ElementState::Pressed => self.button_pressed(btn),
                    ElementState::Released => self.button_released(btn),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => self.pointer_left(),

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scrolled(lines);
            }

            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),

            _ => {}
        }
    }
}
