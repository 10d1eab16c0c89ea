//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Movement and boost read this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the frame
//!   the transition happened; cleared by `end_frame()`, which the host calls after
//!   the controller has consumed the frame.
//!
//! The controller itself never sees `InputState`. The host reads a
//! [`DirectionalInput`] snapshot from it once per frame.

use std::collections::HashSet;

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    W,
    A,
    S,
    D,
}

impl Key {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "space" => Some(Self::Space),
            "w" => Some(Self::W),
            "a" => Some(Self::A),
            "s" => Some(Self::S),
            "d" => Some(Self::D),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Make `keys` the exact held set: presses what is new, releases what is gone.
    pub fn set_held(&mut self, keys: &HashSet<Key>) {
        let released: Vec<Key> = self.held.difference(keys).copied().collect();
        for key in released {
            self.key_up(key);
        }
        for &key in keys {
            self.key_down(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// One frame's movement-relevant input. Recreated every frame; carries no identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub boost: bool,
}

impl DirectionalInput {
    /// Arrow keys or WASD for directions, Space for boost.
    pub fn from_input_state(input: &InputState) -> Self {
        Self {
            up: input.is_held(Key::Up) || input.is_held(Key::W),
            down: input.is_held(Key::Down) || input.is_held(Key::S),
            left: input.is_held(Key::Left) || input.is_held(Key::A),
            right: input.is_held(Key::Right) || input.is_held(Key::D),
            boost: input.is_held(Key::Space),
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn any_direction(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// The held direction that wins animation selection: left > right > up > down.
    pub fn priority_direction(&self) -> Option<Direction> {
        Direction::PRIORITY
            .iter()
            .copied()
            .find(|&dir| self.is_held(dir))
    }

    /// Horizontal intent; left wins when both are held.
    pub fn horizontal(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    /// Vertical intent; up wins when both are held.
    pub fn vertical(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}
