//! Named animation identifiers produced by the controller.
//!
//! The controller speaks only in these keys. Mapping a key to actual sheet
//! frames is the job of [`crate::sheet::SheetCatalog`], which validates the
//! mapping once at load time instead of scattering frame numbers through code.

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionMode {
    Walk,
    /// Moving into a solid obstacle.
    Push,
    /// Boost move (back-flip on the reference sheet).
    SpecialMove,
}

impl MotionMode {
    pub const ALL: &'static [MotionMode] =
        &[MotionMode::Walk, MotionMode::Push, MotionMode::SpecialMove];

    pub fn name(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Push => "push",
            Self::SpecialMove => "special",
        }
    }
}

/// A looping animation: one direction in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationKey {
    pub direction: Direction,
    pub mode: MotionMode,
}

impl AnimationKey {
    pub fn new(mode: MotionMode, direction: Direction) -> Self {
        Self { direction, mode }
    }

    pub fn walk(direction: Direction) -> Self {
        Self::new(MotionMode::Walk, direction)
    }

    pub fn push(direction: Direction) -> Self {
        Self::new(MotionMode::Push, direction)
    }

    pub fn special(direction: Direction) -> Self {
        Self::new(MotionMode::SpecialMove, direction)
    }

    /// Every key in the catalog: each mode crossed with each direction.
    pub fn all() -> impl Iterator<Item = AnimationKey> {
        MotionMode::ALL.iter().flat_map(|&mode| {
            Direction::PRIORITY
                .iter()
                .map(move |&direction| AnimationKey::new(mode, direction))
        })
    }

    /// Canonical name, e.g. `walk-left`, `push-up`, `special-down`.
    pub fn name(self) -> String {
        format!("{}-{}", self.mode.name(), self.direction.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let (mode, direction) = name.split_once('-')?;
        let mode = MotionMode::ALL.iter().copied().find(|m| m.name() == mode)?;
        let direction = Direction::from_name(direction)?;
        Some(Self::new(mode, direction))
    }
}

impl std::fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.mode.name(), self.direction.name())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdleVariant {
    #[default]
    Default,
    /// Standing on special terrain (e.g. tall grass).
    SpecialTerrain,
}

/// A static idle frame, chosen by the last direction of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdleFrame {
    pub direction: Direction,
    pub variant: IdleVariant,
}

impl std::fmt::Display for IdleFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variant {
            IdleVariant::Default => write!(f, "idle-{}", self.direction),
            IdleVariant::SpecialTerrain => write!(f, "idle-terrain-{}", self.direction),
        }
    }
}

/// Exactly one of these is produced per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSelection {
    Play(AnimationKey),
    /// Stop animating and show a static idle frame.
    Idle(IdleFrame),
    /// Stop animating and keep whatever frame is showing.
    Stop,
}

impl std::fmt::Display for AnimationSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Play(key) => write!(f, "{key}"),
            Self::Idle(frame) => write!(f, "{frame}"),
            Self::Stop => f.write_str("stop"),
        }
    }
}
