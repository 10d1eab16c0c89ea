//! Per-frame movement and animation selection for one top-down entity.
//!
//! Frame contract with the host:
//!
//!   1. Physics phase: the host moves the entity with last frame's velocity and
//!      reports what happened via `notify_collision` / `notify_special_terrain`
//!      (or an explicit `FrameEvent` list passed to `step_with_events`).
//!   2. `step` turns this frame's input plus those outcomes into a velocity and
//!      exactly one `AnimationSelection`.
//!   3. The collision and terrain flags are cleared before `step` returns, so a
//!      notification only ever counts for the frame it was delivered in.

use glam::Vec2;
use serde::Deserialize;

use crate::animation::{AnimationKey, AnimationSelection, IdleFrame, IdleVariant};
use crate::direction::Direction;
use crate::input::DirectionalInput;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Walking speed in pixels per second.
    pub base_speed: f32,
    /// Speed while boost is held and nothing is in the way.
    pub boost_speed: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_speed: 175.0,
            boost_speed: 300.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(format!(
                "Controller validation failed: base_speed must be > 0 (got {})",
                self.base_speed
            ));
        }
        if !self.boost_speed.is_finite() || self.boost_speed <= 0.0 {
            return Err(format!(
                "Controller validation failed: boost_speed must be > 0 (got {})",
                self.boost_speed
            ));
        }
        Ok(())
    }
}

/// Something the host's physics phase observed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Collided,
    EnteredSpecialTerrain,
}

/// Collision and terrain outcomes for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSignals {
    pub collided: bool,
    pub on_special_terrain: bool,
}

impl FrameSignals {
    pub fn from_events(events: &[FrameEvent]) -> Self {
        let mut signals = Self::default();
        for &event in events {
            signals.apply(event);
        }
        signals
    }

    pub fn apply(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Collided => self.collided = true,
            FrameEvent::EnteredSpecialTerrain => self.on_special_terrain = true,
        }
    }
}

/// Motion record owned by one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMotionState {
    pub previous_velocity: Vec2,
    pub current_velocity: Vec2,
    /// Transient: cleared at the end of every `step`.
    pub is_colliding: bool,
    /// Transient: cleared at the end of every `step`.
    pub is_on_special_terrain: bool,
    pub base_speed: f32,
    pub boost_speed: f32,
    /// Speed in force for the frame last stepped.
    pub active_speed: f32,
    /// Last direction the entity faced. Used for the special move and for idle
    /// when there is no previous velocity to read a direction from.
    pub facing: Direction,
}

impl EntityMotionState {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            previous_velocity: Vec2::ZERO,
            current_velocity: Vec2::ZERO,
            is_colliding: false,
            is_on_special_terrain: false,
            base_speed: config.base_speed,
            boost_speed: config.boost_speed,
            active_speed: config.base_speed,
            facing: Direction::default(),
        }
    }

    fn config(&self) -> ControllerConfig {
        ControllerConfig {
            base_speed: self.base_speed,
            boost_speed: self.boost_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub velocity: Vec2,
    pub selection: AnimationSelection,
}

/// Full result of one selection pass, including the state it carries forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub velocity: Vec2,
    pub selection: AnimationSelection,
    pub active_speed: f32,
    pub facing: Direction,
}

/// Pure selection procedure. Total over its inputs; every combination maps to
/// exactly one velocity and one selection.
pub fn resolve(
    input: DirectionalInput,
    signals: FrameSignals,
    previous_velocity: Vec2,
    facing: Direction,
    config: ControllerConfig,
) -> Resolution {
    let boosting = input.boost && !signals.collided;
    let active_speed = if boosting {
        config.boost_speed
    } else {
        config.base_speed
    };

    let intent = input.horizontal().map_or(Vec2::ZERO, Direction::unit)
        + input.vertical().map_or(Vec2::ZERO, Direction::unit);
    let velocity = intent.normalize_or_zero() * active_speed;

    let held = input.priority_direction();
    let mut facing = held.unwrap_or(facing);

    let selection = match (signals.collided, held) {
        (false, _) if input.boost => AnimationSelection::Play(AnimationKey::special(facing)),
        (false, Some(dir)) => AnimationSelection::Play(AnimationKey::walk(dir)),
        (false, None) => {
            let direction = Direction::from_velocity(previous_velocity).unwrap_or(facing);
            facing = direction;
            let variant = if signals.on_special_terrain {
                IdleVariant::SpecialTerrain
            } else {
                IdleVariant::Default
            };
            AnimationSelection::Idle(IdleFrame { direction, variant })
        }
        (true, Some(dir)) => AnimationSelection::Play(AnimationKey::push(dir)),
        (true, None) => AnimationSelection::Stop,
    };

    Resolution {
        velocity,
        selection,
        active_speed,
        facing,
    }
}

#[derive(Debug, Clone)]
pub struct MovementAnimationController {
    state: EntityMotionState,
}

impl MovementAnimationController {
    pub fn new(config: ControllerConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            state: EntityMotionState::new(config),
        })
    }

    pub fn state(&self) -> &EntityMotionState {
        &self.state
    }

    pub fn facing(&self) -> Direction {
        self.state.facing
    }

    /// Idempotent within a frame.
    pub fn notify_collision(&mut self) {
        self.state.is_colliding = true;
    }

    /// Idempotent within a frame.
    pub fn notify_special_terrain(&mut self) {
        self.state.is_on_special_terrain = true;
    }

    pub fn notify(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::Collided => self.notify_collision(),
            FrameEvent::EnteredSpecialTerrain => self.notify_special_terrain(),
        }
    }

    /// Run one frame using the notifications delivered since the last step.
    pub fn step(&mut self, input: DirectionalInput, previous_velocity: Vec2) -> FrameOutput {
        let signals = FrameSignals {
            collided: self.state.is_colliding,
            on_special_terrain: self.state.is_on_special_terrain,
        };
        let resolution = resolve(
            input,
            signals,
            previous_velocity,
            self.state.facing,
            self.state.config(),
        );
        log::trace!(
            "step: input={input:?} signals={signals:?} prev={previous_velocity} -> v={} {}",
            resolution.velocity,
            resolution.selection
        );

        self.state.previous_velocity = previous_velocity;
        self.state.current_velocity = resolution.velocity;
        self.state.active_speed = resolution.active_speed;
        self.state.facing = resolution.facing;
        self.state.is_colliding = false;
        self.state.is_on_special_terrain = false;

        FrameOutput {
            velocity: resolution.velocity,
            selection: resolution.selection,
        }
    }

    /// Run one frame with this frame's physics outcomes passed explicitly.
    /// Events are merged with any notifications already delivered.
    pub fn step_with_events(
        &mut self,
        input: DirectionalInput,
        events: &[FrameEvent],
        previous_velocity: Vec2,
    ) -> FrameOutput {
        for &event in events {
            self.notify(event);
        }
        self.step(input, previous_velocity)
    }
}

impl Default for MovementAnimationController {
    fn default() -> Self {
        Self {
            state: EntityMotionState::new(ControllerConfig::default()),
        }
    }
}
