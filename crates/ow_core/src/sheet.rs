//! Sprite-sheet animation catalog and deterministic playback.
//!
//! A sheet file maps every [`AnimationKey`] to a run of frame indices on one
//! uniform-grid sprite sheet, plus the static idle frames. The whole mapping is
//! checked against the sheet's `frame_count` when it is loaded, so playback
//! never has to handle a missing clip or an out-of-range frame.
//!
//! Timing uses integer microseconds (`u64`), matching the host's fixed step.
//! The JSON stores `frame_rate` in frames per second; on load this becomes a
//! per-frame `frame_duration_us`.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::animation::{AnimationKey, AnimationSelection, IdleFrame, IdleVariant};
use crate::direction::Direction;

const MAX_FRAME_RATE: u32 = 1000;

/// A looping (or play-once) run of sheet frames at a fixed rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetClip {
    pub frames: Vec<u32>,
    pub frame_duration_us: u64,
    pub looping: bool,
}

impl SheetClip {
    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frame_duration_us * self.frames.len() as u64
    }
}

#[derive(Debug, Clone)]
pub struct SheetCatalog {
    pub sheet_id: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    clips: HashMap<AnimationKey, SheetClip>,
    idle: [u32; 4],
    terrain_idle: [Option<u32>; 4],
}

impl SheetCatalog {
    pub fn clip(&self, key: AnimationKey) -> Option<&SheetClip> {
        self.clips.get(&key)
    }

    /// Sheet frame for an idle selection. A special-terrain idle falls back to
    /// the default frame for the same direction when the sheet has none.
    pub fn idle_frame(&self, idle: IdleFrame) -> u32 {
        let slot = direction_slot(idle.direction);
        match idle.variant {
            IdleVariant::SpecialTerrain => self.terrain_idle[slot].unwrap_or(self.idle[slot]),
            IdleVariant::Default => self.idle[slot],
        }
    }

    pub fn has_terrain_idle(&self, direction: Direction) -> bool {
        self.terrain_idle[direction_slot(direction)].is_some()
    }
}

fn direction_slot(direction: Direction) -> usize {
    match direction {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct SheetFileJson {
    version: String,
    sheet_id: String,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    animations: HashMap<String, SheetClipJson>,
    idle_frames: HashMap<String, u32>,
    #[serde(default)]
    terrain_idle_frames: HashMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct SheetClipJson {
    frames: Vec<u32>,
    frame_rate: u32,
    #[serde(default = "default_looping")]
    looping: bool,
}

const fn default_looping() -> bool {
    true
}

/// Load and validate a sheet definition file from disk.
pub fn load_sheet_from_path(path: &Path) -> Result<SheetCatalog, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sheet file {}: {e}", path.display()))?;
    parse_sheet(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Parse and validate a sheet definition from a JSON string.
pub fn parse_sheet(raw: &str) -> Result<SheetCatalog, String> {
    let json: SheetFileJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse sheet JSON: {e}"))?;
    validate_sheet_json(&json)?;

    let mut clips = HashMap::new();
    for (name, clip) in json.animations {
        // Unknown names were rejected by validation.
        let Some(key) = AnimationKey::from_name(&name) else {
            continue;
        };
        clips.insert(
            key,
            SheetClip {
                frames: clip.frames,
                frame_duration_us: 1_000_000 / u64::from(clip.frame_rate),
                looping: clip.looping,
            },
        );
    }

    let mut idle = [0u32; 4];
    for (name, frame) in &json.idle_frames {
        if let Some(dir) = Direction::from_name(name) {
            idle[direction_slot(dir)] = *frame;
        }
    }
    let mut terrain_idle = [None; 4];
    for (name, frame) in &json.terrain_idle_frames {
        if let Some(dir) = Direction::from_name(name) {
            terrain_idle[direction_slot(dir)] = Some(*frame);
        }
    }

    Ok(SheetCatalog {
        sheet_id: json.sheet_id,
        frame_width: json.frame_width,
        frame_height: json.frame_height,
        frame_count: json.frame_count,
        clips,
        idle,
        terrain_idle,
    })
}

fn validate_sheet_json(json: &SheetFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Sheet validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.sheet_id.is_empty() {
        return Err("Sheet validation failed: sheet_id is empty".to_string());
    }
    if json.frame_width == 0 || json.frame_height == 0 {
        return Err("Sheet validation failed: frame size must be > 0".to_string());
    }
    if json.frame_count == 0 {
        return Err("Sheet validation failed: frame_count must be > 0".to_string());
    }

    for (name, clip) in &json.animations {
        if AnimationKey::from_name(name).is_none() {
            return Err(format!(
                "Sheet validation failed: unknown animation '{}'",
                name
            ));
        }
        if clip.frames.is_empty() {
            return Err(format!(
                "Sheet validation failed: animation '{}' has no frames",
                name
            ));
        }
        if clip.frame_rate == 0 || clip.frame_rate > MAX_FRAME_RATE {
            return Err(format!(
                "Sheet validation failed: animation '{}' frame_rate must be 1..={}",
                name, MAX_FRAME_RATE
            ));
        }
        for (i, &frame) in clip.frames.iter().enumerate() {
            if frame >= json.frame_count {
                return Err(format!(
                    "Sheet validation failed: animation '{}' frame {} is index {} but sheet has {} frames",
                    name, i, frame, json.frame_count
                ));
            }
        }
    }
    for key in AnimationKey::all() {
        if !json.animations.contains_key(&key.name()) {
            return Err(format!(
                "Sheet validation failed: missing animation '{}'",
                key
            ));
        }
    }

    validate_idle_table("idle_frames", &json.idle_frames, json.frame_count)?;
    validate_idle_table(
        "terrain_idle_frames",
        &json.terrain_idle_frames,
        json.frame_count,
    )?;
    for &dir in Direction::PRIORITY {
        if !json.idle_frames.contains_key(dir.name()) {
            return Err(format!(
                "Sheet validation failed: idle_frames missing direction '{}'",
                dir
            ));
        }
    }
    Ok(())
}

fn validate_idle_table(
    table: &str,
    frames: &HashMap<String, u32>,
    frame_count: u32,
) -> Result<(), String> {
    for (name, &frame) in frames {
        if Direction::from_name(name).is_none() {
            return Err(format!(
                "Sheet validation failed: {} has unknown direction '{}'",
                table, name
            ));
        }
        if frame >= frame_count {
            return Err(format!(
                "Sheet validation failed: {} '{}' is index {} but sheet has {} frames",
                table, name, frame, frame_count
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Playback {
    key: AnimationKey,
    frame_index: usize,
    elapsed_us: u64,
    finished: bool,
}

/// Turns controller selections into the sheet frame to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteAnimator {
    playing: Option<Playback>,
    frame: u32,
}

impl SpriteAnimator {
    pub fn new(initial_frame: u32) -> Self {
        Self {
            playing: None,
            frame: initial_frame,
        }
    }

    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    pub fn current_key(&self) -> Option<AnimationKey> {
        self.playing.as_ref().map(|p| p.key)
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Apply one frame's selection. Re-selecting the clip already playing keeps
    /// its position instead of restarting it.
    pub fn apply(&mut self, selection: AnimationSelection, catalog: &SheetCatalog) {
        match selection {
            AnimationSelection::Play(key) => {
                if self.current_key() == Some(key) {
                    return;
                }
                let Some(clip) = catalog.clip(key) else {
                    log::warn!(
                        "Sheet '{}' has no clip for '{}'; keeping current frame",
                        catalog.sheet_id,
                        key
                    );
                    return;
                };
                log::debug!("Animation switch: {:?} -> {}", self.current_key(), key);
                self.playing = Some(Playback {
                    key,
                    frame_index: 0,
                    elapsed_us: 0,
                    finished: false,
                });
                if let Some(&first) = clip.frames.first() {
                    self.frame = first;
                }
            }
            AnimationSelection::Idle(idle) => {
                self.playing = None;
                self.frame = catalog.idle_frame(idle);
            }
            AnimationSelection::Stop => {
                self.playing = None;
            }
        }
    }

    /// Advance the playing clip by `dt_us` microseconds and return the frame to
    /// draw. Uses integer arithmetic only.
    pub fn tick(&mut self, dt_us: u64, catalog: &SheetCatalog) -> u32 {
        let Some(playback) = self.playing.as_mut() else {
            return self.frame;
        };
        let Some(clip) = catalog.clip(playback.key) else {
            return self.frame;
        };
        if clip.frames.is_empty() || clip.frame_duration_us == 0 || playback.finished {
            return self.frame;
        }

        playback.elapsed_us += dt_us;
        while playback.elapsed_us >= clip.frame_duration_us {
            playback.elapsed_us -= clip.frame_duration_us;
            playback.frame_index += 1;

            if playback.frame_index >= clip.frames.len() {
                if clip.looping {
                    playback.frame_index = 0;
                } else {
                    playback.frame_index = clip.frames.len() - 1;
                    playback.elapsed_us = 0;
                    playback.finished = true;
                    break;
                }
            }
        }

        self.frame = clip.frames[playback.frame_index];
        self.frame
    }
}
