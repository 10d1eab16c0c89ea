use ow_core::input::Key;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A scripted run: each frame lists the keys held during it.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One held-key set per simulated frame.
    pub fn expanded_inputs(&self) -> Vec<HashSet<Key>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let held: HashSet<Key> = frame
                .held
                .iter()
                .filter_map(|name| Key::from_name(name))
                .collect();
            for _ in 0..frame.repeat.max(1) {
                out.push(held.clone());
            }
        }
        out
    }

    pub fn fixed_dt_us(&self) -> u64 {
        (f64::from(self.fixed_dt) * 1_000_000.0).round() as u64
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !replay.fixed_dt.is_finite() || replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (i, frame) in replay.frames.iter().enumerate() {
        if let Some(name) = frame.held.iter().find(|n| Key::from_name(n).is_none()) {
            return Err(format!(
                "Replay validation failed: frame {} holds unknown key '{}'",
                i, name
            ));
        }
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
