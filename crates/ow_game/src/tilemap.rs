//! Tile collision underlay for the top-down map.
//!
//! Solid cells block movement; special cells (tall grass) never block but are
//! reported as terrain overlap. The map is a simplified grid kept separate from
//! the visual tile layers, with +Y pointing down the screen.
//!
//! Movement uses **axis-separable move-and-slide**: resolve X against the grid,
//! then resolve Y from the already-corrected X. Walking diagonally into a wall
//! slides along it instead of stopping dead.

use glam::Vec2;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct TileMapFile {
    pub version: String,
    pub map_id: String,
    pub cell_size: i32,
    #[serde(default)]
    pub origin: GridOrigin,
    pub width: i32,
    pub height: i32,
    pub solids: Vec<GridCell>,
    #[serde(default)]
    pub special: Vec<GridCell>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct GridOrigin {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MoveResult {
    pub aabb: Aabb,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_up: bool,
    pub blocked_down: bool,
}

impl MoveResult {
    pub fn collided(&self) -> bool {
        self.blocked_left || self.blocked_right || self.blocked_up || self.blocked_down
    }
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    pub map_id: String,
    pub cell_size: i32,
    pub origin: GridOrigin,
    pub width: i32,
    pub height: i32,
    solids: HashSet<GridCell>,
    special: HashSet<GridCell>,
}

impl TileGrid {
    pub fn from_file(file: TileMapFile) -> Self {
        Self {
            map_id: file.map_id,
            cell_size: file.cell_size,
            origin: file.origin,
            width: file.width,
            height: file.height,
            solids: file.solids.into_iter().collect(),
            special: file.special.into_iter().collect(),
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.solids.contains(&GridCell { x, y })
    }

    pub fn is_special(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.special.contains(&GridCell { x, y })
    }

    /// Cell centre in world space.
    #[allow(dead_code)]
    pub fn cell_center(&self, x: i32, y: i32) -> Vec2 {
        let half = self.cell_size as f32 * 0.5;
        Vec2::new(
            self.cell_left_world(x) + half,
            self.cell_top_world(y) + half,
        )
    }

    pub fn cell_at(&self, world: Vec2) -> (i32, i32) {
        (self.world_to_cell_x(world.x), self.world_to_cell_y(world.y))
    }

    /// True when any cell under the box is special terrain.
    pub fn overlaps_special(&self, aabb: Aabb) -> bool {
        const EPS: f32 = 0.001;
        let x0 = self.world_to_cell_x(aabb.center_x - aabb.half_w + EPS);
        let x1 = self.world_to_cell_x(aabb.center_x + aabb.half_w - EPS);
        let y0 = self.world_to_cell_y(aabb.center_y - aabb.half_h + EPS);
        let y1 = self.world_to_cell_y(aabb.center_y + aabb.half_h - EPS);
        (y0..=y1).any(|y| (x0..=x1).any(|x| self.is_special(x, y)))
    }

    pub fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> MoveResult {
        const EPS: f32 = 0.0001;

        let resolved_x = self.resolve_axis_x(aabb, dx);
        let collided_x = (resolved_x - (aabb.center_x + dx)).abs() > EPS;

        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        let collided_y = (resolved_y - (aabb.center_y + dy)).abs() > EPS;
        moved.center_y = resolved_y;

        MoveResult {
            aabb: moved,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            blocked_up: collided_y && dy < 0.0,
            blocked_down: collided_y && dy > 0.0,
        }
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        let y0 = self.world_to_cell_y(aabb.center_y - aabb.half_h + EPS);
        let y1 = self.world_to_cell_y(aabb.center_y + aabb.half_h - EPS);

        if dx > 0.0 {
            let x_cell = self.world_to_cell_x(candidate_x + aabb.half_w - EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.min(self.cell_left_world(x_cell) - aabb.half_w);
                }
            }
            // Never push opposite to the motion.
            candidate_x = candidate_x.max(aabb.center_x);
        } else {
            let x_cell = self.world_to_cell_x(candidate_x - aabb.half_w + EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.max(self.cell_right_world(x_cell) + aabb.half_w);
                }
            }
            candidate_x = candidate_x.min(aabb.center_x);
        }

        candidate_x
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        let x0 = self.world_to_cell_x(aabb.center_x - aabb.half_w + EPS);
        let x1 = self.world_to_cell_x(aabb.center_x + aabb.half_w - EPS);

        if dy > 0.0 {
            let y_cell = self.world_to_cell_y(candidate_y + aabb.half_h - EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.min(self.cell_top_world(y_cell) - aabb.half_h);
                }
            }
            candidate_y = candidate_y.max(aabb.center_y);
        } else {
            let y_cell = self.world_to_cell_y(candidate_y - aabb.half_h + EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.max(self.cell_bottom_world(y_cell) + aabb.half_h);
                }
            }
            candidate_y = candidate_y.min(aabb.center_y);
        }

        candidate_y
    }

    fn world_to_cell_x(&self, world_x: f32) -> i32 {
        ((world_x - self.origin.x as f32) / self.cell_size as f32).floor() as i32
    }

    fn world_to_cell_y(&self, world_y: f32) -> i32 {
        ((world_y - self.origin.y as f32) / self.cell_size as f32).floor() as i32
    }

    fn cell_left_world(&self, x: i32) -> f32 {
        self.origin.x as f32 + (x * self.cell_size) as f32
    }

    fn cell_right_world(&self, x: i32) -> f32 {
        self.origin.x as f32 + ((x + 1) * self.cell_size) as f32
    }

    fn cell_top_world(&self, y: i32) -> f32 {
        self.origin.y as f32 + (y * self.cell_size) as f32
    }

    fn cell_bottom_world(&self, y: i32) -> f32 {
        self.origin.y as f32 + ((y + 1) * self.cell_size) as f32
    }
}

pub fn load_tilemap_from_path(path: &Path) -> Result<TileGrid, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let file: TileMapFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse tilemap JSON {}: {e}", path.display()))?;
    validate_tilemap_file(&file)?;
    Ok(TileGrid::from_file(file))
}

fn validate_tilemap_file(file: &TileMapFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Tilemap validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.cell_size <= 0 {
        return Err("Tilemap validation failed: cell_size must be > 0".to_string());
    }
    if file.width <= 0 || file.height <= 0 {
        return Err("Tilemap validation failed: width and height must be > 0".to_string());
    }

    let solids = validate_cells("solid", &file.solids, file.width, file.height)?;
    let special = validate_cells("special", &file.special, file.width, file.height)?;
    if let Some(cell) = solids.intersection(&special).next() {
        return Err(format!(
            "Tilemap validation failed: cell ({}, {}) is both solid and special",
            cell.x, cell.y
        ));
    }
    Ok(())
}

fn validate_cells(
    kind: &str,
    cells: &[GridCell],
    width: i32,
    height: i32,
) -> Result<HashSet<GridCell>, String> {
    let mut seen = HashSet::new();
    for cell in cells {
        if cell.x < 0 || cell.x >= width || cell.y < 0 || cell.y >= height {
            return Err(format!(
                "Tilemap validation failed: {} cell out of bounds ({}, {})",
                kind, cell.x, cell.y
            ));
        }
        if !seen.insert(*cell) {
            return Err(format!(
                "Tilemap validation failed: duplicate {} cell ({}, {})",
                kind, cell.x, cell.y
            ));
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ow_tilemap_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn grid_with(solids: Vec<GridCell>, special: Vec<GridCell>) -> TileGrid {
        TileGrid::from_file(TileMapFile {
            version: "0.1".to_string(),
            map_id: "test".to_string(),
            cell_size: 16,
            origin: GridOrigin { x: 0, y: 0 },
            width: 8,
            height: 8,
            solids,
            special,
        })
    }

    fn actor_at(center: Vec2) -> Aabb {
        Aabb {
            center_x: center.x,
            center_y: center.y,
            half_w: 6.0,
            half_h: 6.0,
        }
    }

    #[test]
    fn load_tilemap_valid_file_parses() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version":"0.1",
              "map_id":"test",
              "cell_size":16,
              "width":4,
              "height":4,
              "solids":[{"x":1,"y":1},{"x":2,"y":1}],
              "special":[{"x":0,"y":3}]
            }"#,
        )
        .expect("write temp file");

        let grid = load_tilemap_from_path(&path).expect("valid tilemap should load");
        assert_eq!(grid.cell_size, 16);
        assert!(grid.is_solid(1, 1));
        assert!(!grid.is_solid(0, 0));
        assert!(grid.is_special(0, 3));
        assert!(!grid.is_special(1, 1));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_tilemap_rejects_duplicate_cells() {
        let path = temp_file_path("dup");
        fs::write(
            &path,
            r#"{
              "version":"0.1",
              "map_id":"test",
              "cell_size":16,
              "width":4,
              "height":4,
              "solids":[{"x":1,"y":1},{"x":1,"y":1}]
            }"#,
        )
        .expect("write temp file");

        let err = load_tilemap_from_path(&path).expect_err("duplicate cells should fail");
        assert!(err.contains("duplicate solid cell"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_tilemap_rejects_cell_both_solid_and_special() {
        let path = temp_file_path("both");
        fs::write(
            &path,
            r#"{
              "version":"0.1",
              "map_id":"test",
              "cell_size":16,
              "width":4,
              "height":4,
              "solids":[{"x":2,"y":2}],
              "special":[{"x":2,"y":2}]
            }"#,
        )
        .expect("write temp file");

        let err = load_tilemap_from_path(&path).expect_err("overlapping cell kinds should fail");
        assert!(err.contains("both solid and special"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn move_right_into_wall_blocks_and_flags() {
        let grid = grid_with(vec![GridCell { x: 3, y: 1 }], vec![]);
        let start = actor_at(grid.cell_center(1, 1));
        let result = grid.move_and_collide_detailed(start, 20.0, 0.0);
        assert!(result.blocked_right);
        assert!(!result.blocked_left);
        assert!(result.collided());
        assert!((result.aabb.center_x - (48.0 - start.half_w)).abs() < 0.001);
    }

    #[test]
    fn move_up_into_wall_uses_screen_space() {
        let grid = grid_with(vec![GridCell { x: 1, y: 1 }], vec![]);
        let start = actor_at(grid.cell_center(1, 2));
        let result = grid.move_and_collide_detailed(start, 0.0, -10.0);
        assert!(result.blocked_up);
        assert!(!result.blocked_down);
        assert!((result.aabb.center_y - (32.0 + start.half_h)).abs() < 0.001);
    }

    #[test]
    fn flush_against_wall_still_reports_collision() {
        let grid = grid_with(vec![GridCell { x: 3, y: 1 }], vec![]);
        let start = actor_at(grid.cell_center(1, 1));
        let first = grid.move_and_collide_detailed(start, 20.0, 0.0);
        let second = grid.move_and_collide_detailed(first.aabb, 3.0, 0.0);
        assert!(second.blocked_right);
        assert!((second.aabb.center_x - first.aabb.center_x).abs() < 0.0001);
    }

    #[test]
    fn diagonal_into_wall_slides_along_it() {
        let grid = grid_with(vec![GridCell { x: 3, y: 1 }, GridCell { x: 3, y: 2 }], vec![]);
        let start = actor_at(grid.cell_center(2, 1));
        let result = grid.move_and_collide_detailed(start, 10.0, 5.0);
        assert!(result.blocked_right);
        assert!(!result.blocked_down);
        assert!((result.aabb.center_y - (start.center_y + 5.0)).abs() < 0.0001);
    }

    #[test]
    fn free_move_does_not_collide() {
        let grid = grid_with(vec![], vec![]);
        let start = actor_at(grid.cell_center(3, 3));
        let result = grid.move_and_collide_detailed(start, -2.0, 2.0);
        assert!(!result.collided());
        assert!((result.aabb.center() - Vec2::new(54.0, 58.0)).length() < 0.0001);
    }

    #[test]
    fn special_overlap_detects_partial_cover() {
        let grid = grid_with(vec![], vec![GridCell { x: 2, y: 2 }]);
        assert!(grid.overlaps_special(actor_at(grid.cell_center(2, 2))));
        // Straddling the edge of the grass cell still counts.
        assert!(grid.overlaps_special(actor_at(Vec2::new(30.0, 40.0))));
        assert!(!grid.overlaps_special(actor_at(grid.cell_center(5, 5))));
    }
}
