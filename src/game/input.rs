//! Input Capture
//!
//! One [`InputFrame`] per host update: direction bits plus action bits.
//! Action bits are edge-triggered; the host sets them only on the frame
//! the key went down. Direction bits may be held.
//!
//! [`InputRecording`] keeps the frames of a run delta-compressed so the run
//! can be replayed against the same seed.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::grid::Direction;

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Raw input for a single host update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct InputFrame {
    /// Direction bits:
    /// - Bit 0: Up
    /// - Bit 1: Right
    /// - Bit 2: Down
    /// - Bit 3: Left
    pub directions: u8,

    /// Action bits:
    /// - Bit 0: Start a run
    /// - Bit 1: Toggle pause
    /// - Bit 2: Back to menu
    /// - Bit 3: Show high scores
    pub actions: u8,
}

impl InputFrame {
    /// Up direction bit
    pub const FLAG_UP: u8 = 0x01;
    /// Right direction bit
    pub const FLAG_RIGHT: u8 = 0x02;
    /// Down direction bit
    pub const FLAG_DOWN: u8 = 0x04;
    /// Left direction bit
    pub const FLAG_LEFT: u8 = 0x08;

    /// Start action bit
    pub const FLAG_START: u8 = 0x01;
    /// Pause action bit
    pub const FLAG_PAUSE: u8 = 0x02;
    /// Menu action bit
    pub const FLAG_MENU: u8 = 0x04;
    /// High-scores action bit
    pub const FLAG_HIGH_SCORES: u8 = 0x08;

    /// Create an idle frame.
    pub const fn new() -> Self {
        Self {
            directions: 0,
            actions: 0,
        }
    }

    /// Frame with a single direction held.
    pub const fn with_direction(direction: Direction) -> Self {
        Self {
            directions: Self::direction_bit(direction),
            actions: 0,
        }
    }

    /// Frame with a single action pressed.
    pub const fn with_action(action: u8) -> Self {
        Self {
            directions: 0,
            actions: action,
        }
    }

    /// Bit for a direction.
    pub const fn direction_bit(direction: Direction) -> u8 {
        match direction {
            Direction::Up => Self::FLAG_UP,
            Direction::Right => Self::FLAG_RIGHT,
            Direction::Down => Self::FLAG_DOWN,
            Direction::Left => Self::FLAG_LEFT,
        }
    }

    /// Add a held direction.
    #[inline]
    pub fn press(&mut self, direction: Direction) {
        self.directions |= Self::direction_bit(direction);
    }

    /// Add an action bit.
    #[inline]
    pub fn set_action(&mut self, action: u8, pressed: bool) {
        if pressed {
            self.actions |= action;
        } else {
            self.actions &= !action;
        }
    }

    /// Held directions in application order: Up, Right, Down, Left.
    pub fn pressed_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| self.directions & Self::direction_bit(*d) != 0)
    }

    /// Check if start was pressed this frame.
    #[inline]
    pub fn start_pressed(&self) -> bool {
        self.actions & Self::FLAG_START != 0
    }

    /// Check if pause was pressed this frame.
    #[inline]
    pub fn pause_pressed(&self) -> bool {
        self.actions & Self::FLAG_PAUSE != 0
    }

    /// Check if menu was pressed this frame.
    #[inline]
    pub fn menu_pressed(&self) -> bool {
        self.actions & Self::FLAG_MENU != 0
    }

    /// Check if high scores was pressed this frame.
    #[inline]
    pub fn high_scores_pressed(&self) -> bool {
        self.actions & Self::FLAG_HIGH_SCORES != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.directions == 0 && self.actions == 0
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Frame index at which the input changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Host frame when this input began
    pub frame: u32,
    /// The new input
    pub input: InputFrame,
}

/// Every input of one run, sampled at a fixed host frame step.
///
/// Only frames where the input changed are stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Seed the run was started with
    pub rng_seed: u64,

    /// Host time between frames
    pub frame_step: Duration,

    /// Last recorded frame index
    pub end_frame: u32,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_input: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(rng_seed: u64, frame_step: Duration) -> Self {
        Self {
            rng_seed,
            frame_step,
            end_frame: 0,
            deltas: Vec::new(),
            last_input: InputFrame::new(),
        }
    }

    /// Record the input for `frame`. Stored only if it changed.
    pub fn record(&mut self, frame: u32, input: InputFrame) {
        self.end_frame = frame;
        if input != self.last_input {
            self.deltas.push(InputDelta { frame, input });
            self.last_input = input;
        }
    }

    /// Input in effect at `frame`.
    pub fn input_at(&self, frame: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.frame <= frame);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].input
        }
    }

    /// Host time of `frame`.
    #[inline]
    pub fn frame_time(&self, frame: u32) -> Duration {
        self.frame_step * frame
    }

    /// Stored changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Every frame from 0 to `end_frame` with its host time and input.
    pub fn frames(&self) -> impl Iterator<Item = (Duration, InputFrame)> + '_ {
        let mut delta_idx = 0;
        let mut current = InputFrame::new();
        (0..=self.end_frame).map(move |frame| {
            while let Some(delta) = self.deltas.get(delta_idx) {
                if delta.frame > frame {
                    break;
                }
                current = delta.input;
                delta_idx += 1;
            }
            (self.frame_time(frame), current)
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
