use serde::Deserialize;
use std::path::PathBuf;

use crate::analysis::tempo::TempoRange;
use crate::analysis::vocal::VocalParams;
use crate::analysis::AnalysisParams;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub frames: FrameConfig,
    #[serde(default)]
    pub tempo: TempoConfig,
    #[serde(default)]
    pub vocals: VocalConfig,
}

#[derive(Debug, Deserialize)]
pub struct FrameConfig {
    #[serde(default = "default_frame_length")]
    pub frame_length: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct TempoConfig {
    #[serde(default = "default_min_bpm")]
    pub min_bpm: f32,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f32,
    #[serde(default = "default_anchor_bpm")]
    pub anchor_bpm: f32,
}

#[derive(Debug, Deserialize)]
pub struct VocalConfig {
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f32,
    #[serde(default = "default_min_segment_seconds")]
    pub min_segment_seconds: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_length: default_frame_length(),
            hop_length: default_hop_length(),
        }
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            anchor_bpm: default_anchor_bpm(),
        }
    }
}

impl Default for VocalConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: default_threshold_ratio(),
            min_segment_seconds: default_min_segment_seconds(),
        }
    }
}

fn default_frame_length() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_min_bpm() -> f32 { 40.0 }
fn default_max_bpm() -> f32 { 240.0 }
fn default_anchor_bpm() -> f32 { 120.0 }
fn default_threshold_ratio() -> f32 { 0.5 }
fn default_min_segment_seconds() -> f32 { 0.5 }

impl Config {
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams {
            frame_length: self.frames.frame_length,
            hop_length: self.frames.hop_length,
            tempo: TempoRange {
                min_bpm: self.tempo.min_bpm,
                max_bpm: self.tempo.max_bpm,
                anchor_bpm: self.tempo.anchor_bpm,
            },
            vocal: VocalParams {
                threshold_ratio: self.vocals.threshold_ratio,
                min_segment_seconds: self.vocals.min_segment_seconds,
            },
        }
    }
}

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
