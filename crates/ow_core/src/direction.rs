use glam::Vec2;

/// One of the four screen-space facings. `Up` is negative Y.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    /// Front-facing; the facing every entity spawns with.
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in selection priority order (left > right > up > down).
    pub const PRIORITY: &'static [Direction] = &[
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Lowercase name used in asset files and animation key names.
    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit vector in screen space.
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::NEG_Y,
            Self::Down => Vec2::Y,
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
        }
    }

    /// Facing implied by the sign of a velocity. X is checked before Y, so an
    /// exact diagonal reports its horizontal half. Zero velocity has no facing.
    pub fn from_velocity(velocity: Vec2) -> Option<Self> {
        if velocity.x < 0.0 {
            Some(Self::Left)
        } else if velocity.x > 0.0 {
            Some(Self::Right)
        } else if velocity.y < 0.0 {
            Some(Self::Up)
        } else if velocity.y > 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
