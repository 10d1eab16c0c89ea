//! Headless host loop: stands in for the game engine around the controller.
//!
//! Each `run_frame` performs, in order:
//!
//!   1. Physics -- move the actor by last frame's velocity through the tile grid.
//!      A blocked move notifies a collision and zeroes the blocked axis; overlap
//!      with special cells notifies special terrain.
//!   2. Input -- apply the held-key set and read a `DirectionalInput` snapshot.
//!   3. Control -- `controller.step` with the physical velocity as the previous
//!      velocity. Its output becomes next frame's physics velocity.
//!   4. Animation -- apply the selection to the animator and tick it.

use std::collections::HashSet;

use glam::Vec2;
use ow_core::animation::{AnimationSelection, IdleFrame, IdleVariant};
use ow_core::controller::MovementAnimationController;
use ow_core::direction::Direction;
use ow_core::input::{DirectionalInput, InputState, Key};
use ow_core::sheet::{SheetCatalog, SpriteAnimator};

use crate::config::HostConfig;
use crate::tilemap::{Aabb, TileGrid};

/// What one frame produced, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub selection: AnimationSelection,
    pub sheet_frame: u32,
    pub collided: bool,
    pub on_special_terrain: bool,
}

pub struct HostWorld {
    grid: TileGrid,
    sheet: SheetCatalog,
    controller: MovementAnimationController,
    animator: SpriteAnimator,
    input: InputState,
    actor: Aabb,
    body_velocity: Vec2,
    frame: u64,
}

impl HostWorld {
    pub fn new(grid: TileGrid, sheet: SheetCatalog, config: &HostConfig) -> Result<Self, String> {
        let controller = MovementAnimationController::new(config.controller)?;
        let actor = Aabb {
            center_x: config.spawn_x,
            center_y: config.spawn_y,
            half_w: config.half_w,
            half_h: config.half_h,
        };
        let (cell_x, cell_y) = grid.cell_at(actor.center());
        if grid.is_solid(cell_x, cell_y) {
            return Err(format!(
                "Spawn ({}, {}) is inside solid cell ({}, {}) of map '{}'",
                actor.center_x, actor.center_y, cell_x, cell_y, grid.map_id
            ));
        }

        let idle = IdleFrame {
            direction: controller.facing(),
            variant: IdleVariant::Default,
        };
        let animator = SpriteAnimator::new(sheet.idle_frame(idle));

        Ok(Self {
            grid,
            sheet,
            controller,
            animator,
            input: InputState::new(),
            actor,
            body_velocity: Vec2::ZERO,
            frame: 0,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.actor.center()
    }

    pub fn facing(&self) -> Direction {
        self.controller.facing()
    }

    pub fn run_frame(&mut self, held: &HashSet<Key>, dt: f32, dt_us: u64) -> FrameReport {
        self.frame += 1;

        let delta = self.body_velocity * dt;
        let moved = self.grid.move_and_collide_detailed(self.actor, delta.x, delta.y);
        self.actor = moved.aabb;
        let collided = moved.collided();
        if collided {
            self.controller.notify_collision();
            if moved.blocked_left || moved.blocked_right {
                self.body_velocity.x = 0.0;
            }
            if moved.blocked_up || moved.blocked_down {
                self.body_velocity.y = 0.0;
            }
        }
        let on_special_terrain = self.grid.overlaps_special(self.actor);
        if on_special_terrain {
            self.controller.notify_special_terrain();
        }

        self.input.set_held(held);
        let snapshot = DirectionalInput::from_input_state(&self.input);
        let output = self.controller.step(snapshot, self.body_velocity);
        self.body_velocity = output.velocity;

        self.animator.apply(output.selection, &self.sheet);
        let sheet_frame = self.animator.tick(dt_us, &self.sheet);
        self.input.end_frame();

        FrameReport {
            frame: self.frame,
            position: self.actor.center(),
            velocity: output.velocity,
            selection: output.selection,
            sheet_frame,
            collided,
            on_special_terrain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::{GridCell, GridOrigin, TileMapFile};
    use ow_core::animation::AnimationKey;
    use ow_core::sheet::parse_sheet;

    const DT: f32 = 1.0 / 60.0;
    const DT_US: u64 = 16_667;

    fn reference_sheet() -> SheetCatalog {
        parse_sheet(include_str!("../../../assets/sheets/link.json"))
            .expect("reference sheet should parse")
    }

    /// 10x10 room of 16px cells with solid border, grass at (2..4, 6..8).
    fn room() -> TileGrid {
        let mut solids = Vec::new();
        for i in 0..10 {
            solids.push(GridCell { x: i, y: 0 });
            solids.push(GridCell { x: i, y: 9 });
        }
        for j in 1..9 {
            solids.push(GridCell { x: 0, y: j });
            solids.push(GridCell { x: 9, y: j });
        }
        let mut special = Vec::new();
        for x in 2..5 {
            for y in 6..9 {
                special.push(GridCell { x, y });
            }
        }
        TileGrid::from_file(TileMapFile {
            version: "0.1".to_string(),
            map_id: "room".to_string(),
            cell_size: 16,
            origin: GridOrigin { x: 0, y: 0 },
            width: 10,
            height: 10,
            solids,
            special,
        })
    }

    fn world_at(x: f32, y: f32) -> HostWorld {
        let config = HostConfig {
            spawn_x: x,
            spawn_y: y,
            ..HostConfig::default()
        };
        HostWorld::new(room(), reference_sheet(), &config).expect("world should build")
    }

    fn keys(list: &[Key]) -> HashSet<Key> {
        list.iter().copied().collect()
    }

    #[test]
    fn walk_then_release_idles_facing_left() {
        let mut world = world_at(80.0, 40.0);
        let first = world.run_frame(&keys(&[Key::Left]), DT, DT_US);
        assert_eq!(
            first.selection,
            AnimationSelection::Play(AnimationKey::walk(Direction::Left))
        );
        assert!((first.velocity - Vec2::new(-175.0, 0.0)).length() < 0.001);
        assert_eq!(first.sheet_frame, 4);

        let second = world.run_frame(&HashSet::new(), DT, DT_US);
        assert_eq!(
            second.selection,
            AnimationSelection::Idle(IdleFrame {
                direction: Direction::Left,
                variant: IdleVariant::Default,
            })
        );
        assert_eq!(second.velocity, Vec2::ZERO);
        assert_eq!(second.sheet_frame, 5);
        assert!(world.position().x < 80.0);
    }

    #[test]
    fn holding_into_wall_switches_to_push() {
        let mut world = world_at(120.0, 40.0);
        let right = keys(&[Key::Right]);
        let mut last = None;
        for _ in 0..60 {
            last = Some(world.run_frame(&right, DT, DT_US));
        }
        let report = last.expect("ran frames");
        assert!(report.collided);
        assert_eq!(
            report.selection,
            AnimationSelection::Play(AnimationKey::push(Direction::Right))
        );
        // Flush against the border wall at x = 144.
        assert!((report.position.x - (144.0 - 8.0)).abs() < 0.001);

        // The first released frame still moves with last frame's velocity and
        // hits the wall: no idle override while colliding.
        let stopped = world.run_frame(&HashSet::new(), DT, DT_US);
        assert!(stopped.collided);
        assert_eq!(stopped.selection, AnimationSelection::Stop);
        assert_eq!(stopped.sheet_frame, report.sheet_frame);

        // Next frame nothing moves, and with zero velocity idle uses the facing.
        let idle = world.run_frame(&HashSet::new(), DT, DT_US);
        assert!(!idle.collided);
        assert_eq!(
            idle.selection,
            AnimationSelection::Idle(IdleFrame {
                direction: Direction::Right,
                variant: IdleVariant::Default,
            })
        );
        assert_eq!(idle.sheet_frame, 2);
    }

    #[test]
    fn idle_on_grass_uses_terrain_frame() {
        let mut world = world_at(56.0, 120.0);
        let report = world.run_frame(&HashSet::new(), DT, DT_US);
        assert!(report.on_special_terrain);
        assert_eq!(
            report.selection,
            AnimationSelection::Idle(IdleFrame {
                direction: Direction::Down,
                variant: IdleVariant::SpecialTerrain,
            })
        );
        assert_eq!(report.sheet_frame, 27);
    }

    #[test]
    fn boost_moves_faster_until_released() {
        let mut world = world_at(40.0, 56.0);
        let boosted = world.run_frame(&keys(&[Key::Right, Key::Space]), DT, DT_US);
        assert_eq!(
            boosted.selection,
            AnimationSelection::Play(AnimationKey::special(Direction::Right))
        );
        assert!((boosted.velocity.length() - 300.0).abs() < 0.001);

        let walking = world.run_frame(&keys(&[Key::Right]), DT, DT_US);
        assert!((walking.velocity.length() - 175.0).abs() < 0.001);
        assert_eq!(
            walking.selection,
            AnimationSelection::Play(AnimationKey::walk(Direction::Right))
        );
    }

    #[test]
    fn wasd_and_diagonal_speed() {
        let mut world = world_at(80.0, 80.0);
        let report = world.run_frame(&keys(&[Key::A, Key::W]), DT, DT_US);
        assert_eq!(
            report.selection,
            AnimationSelection::Play(AnimationKey::walk(Direction::Left))
        );
        assert!((report.velocity.length() - 175.0).abs() < 0.001);
        assert!(report.velocity.x < 0.0 && report.velocity.y < 0.0);
    }

    #[test]
    fn spawn_inside_wall_is_rejected() {
        let config = HostConfig {
            spawn_x: 8.0,
            spawn_y: 8.0,
            ..HostConfig::default()
        };
        let err = HostWorld::new(room(), reference_sheet(), &config)
            .err()
            .expect("spawn in wall should fail");
        assert!(err.contains("inside solid cell"));
    }

    #[test]
    fn identical_runs_are_deterministic() {
        let script: Vec<HashSet<Key>> = [
            (vec![Key::Right], 40),
            (vec![Key::Down, Key::Space], 20),
            (vec![], 10),
            (vec![Key::Left, Key::Up], 50),
        ]
        .into_iter()
        .flat_map(|(held, n)| std::iter::repeat(keys(&held)).take(n))
        .collect();

        let mut a = world_at(40.0, 40.0);
        let mut b = world_at(40.0, 40.0);
        for held in &script {
            let ra = a.run_frame(held, DT, DT_US);
            let rb = b.run_frame(held, DT, DT_US);
            assert_eq!(ra, rb);
        }
    }
}
