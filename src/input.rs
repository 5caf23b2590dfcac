//! Window input for the heart field.
//!
//! Pointer movement is kept as a single most-recent value: intermediate
//! positions between two frames are never observed. Key presses are kept
//! until the next [`Input::begin_frame`].

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::viewport::pixel_to_ndc;

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Regenerate the shape now.
    Reshape,
    /// Freeze or resume the clock.
    TogglePause,
    Quit,
}

impl Action {
    fn from_key(key: WinitKeyCode) -> Option<Self> {
        match key {
            WinitKeyCode::KeyR => Some(Action::Reshape),
            WinitKeyCode::Space => Some(Action::TogglePause),
            WinitKeyCode::Escape => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Most recent pointer position and pending key actions.
#[derive(Debug)]
pub struct Input {
    actions: HashSet<Action>,
    pointer_pixels: Vec2,
    pointer_ndc: Vec2,
    pointer_seen: bool,
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
            actions: HashSet::new(),
            pointer_pixels: Vec2::ZERO,
            pointer_ndc: Vec2::ZERO,
            pointer_seen: false,
            window_size: (800, 600),
        }
    }

    /// Whether `action` was triggered since the last frame.
    pub fn triggered(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Pointer in normalized device coordinates (-1 to 1, y up).
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    /// Clear one-shot key actions.
    pub(crate) fn begin_frame(&mut self) {
        self.actions.clear();
    }

    /// Returns the rescaled pointer NDC once the pointer has been seen, since
    /// the same pixel maps to a new NDC after a resize.
    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) -> Option<Vec2> {
        self.window_size = (width, height);
        if !self.pointer_seen {
            return None;
        }
        self.pointer_ndc = pixel_to_ndc(self.pointer_pixels, self.window_size);
        Some(self.pointer_ndc)
    }

    /// Process a winit window event. Returns `true` if the pointer moved.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if let Some(action) = Action::from_key(code) {
                            self.actions.insert(action);
                        }
                    }
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(Vec2::new(position.x as f32, position.y as f32));
                true
            }
            _ => false,
        }
    }

    fn move_pointer(&mut self, pixels: Vec2) {
        self.pointer_pixels = pixels;
        self.pointer_ndc = pixel_to_ndc(pixels, self.window_size);
        self.pointer_seen = true;
    }
}
