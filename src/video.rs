// src/video.rs - Video probing and sampled-frame decoding via ffmpeg
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::ExtractError;

/// Container metadata from ffprobe. `total_frames` is 0 when the container
/// does not report a frame count (some formats leave nb_frames as N/A).
#[derive(Debug, Clone, Copy)]
pub struct VideoMetadata {
    pub fps: f64,
    pub total_frames: u64,
}

/// Probe a video container for frame rate and frame count.
pub fn probe(path: &Path) -> Result<VideoMetadata> {
    if Command::new("ffprobe").arg("-version").output().is_err() {
        return Err(ExtractError::FfmpegMissing.into());
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=r_frame_rate,nb_frames",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        return Err(ExtractError::VideoUnopenable(path.display().to_string()).into());
    }

    let info = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = info.trim().split(',').collect();
    if parts.len() < 2 {
        return Err(ExtractError::VideoUnopenable(path.display().to_string()).into());
    }

    let fps = parse_frame_rate(parts[0]);
    // nb_frames is "N/A" for some containers; treat as unknown.
    let total_frames: u64 = parts[1].parse().unwrap_or(0);

    debug!("probed {}: {fps} fps, {total_frames} frames", path.display());
    Ok(VideoMetadata { fps, total_frames })
}

/// ffprobe reports the rate as a rational like "30000/1001".
fn parse_frame_rate(raw: &str) -> f64 {
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.parse().unwrap_or(0.0);
        let den: f64 = den.parse().unwrap_or(0.0);
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    } else {
        raw.parse().unwrap_or(0.0)
    }
}

/// Frames decoded out of a video at a fixed sampling interval, held as PNG
/// files in a temp directory that is removed when this value drops, on
/// success and on every error path alike.
pub struct SampledFrames {
    temp_dir: PathBuf,
    frames: Vec<(u64, PathBuf)>,
}

impl SampledFrames {
    /// The sampled frames in stream order: `(original frame index, path)`.
    /// Only indices divisible by the sample rate ever appear; frame 0 is
    /// always a candidate.
    pub fn frames(&self) -> &[(u64, PathBuf)] {
        &self.frames
    }
}

impl Drop for SampledFrames {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.temp_dir) {
            warn!(
                "failed to remove temp frame dir {}: {err}",
                self.temp_dir.display()
            );
        }
    }
}

/// Decode every `sample_rate`-th frame of `path` (frame 0 first) into a
/// temp directory. Frames between samples are never decoded or analyzed.
pub fn extract_sampled_frames(path: &Path, sample_rate: u32) -> Result<SampledFrames> {
    if Command::new("ffmpeg").arg("-version").output().is_err() {
        return Err(ExtractError::FfmpegMissing.into());
    }

    let temp_dir = std::env::temp_dir().join(format!("pose_extractor_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Cannot create temp directory: {}", temp_dir.display()))?;

    // select='not(mod(n,k))' keeps exactly the frames at indices 0, k, 2k, …
    let select = format!("select='not(mod(n\\,{}))'", sample_rate);
    let pattern = temp_dir.join("frame_%06d.png");
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-vf", &select, "-vsync", "vfr", "-start_number", "0"])
        .arg(&pattern)
        .status()
        .context("Failed to run ffmpeg");

    let status = match status {
        Ok(status) => status,
        Err(err) => {
            let _ = fs::remove_dir_all(&temp_dir);
            return Err(err);
        }
    };
    if !status.success() {
        let _ = fs::remove_dir_all(&temp_dir);
        return Err(ExtractError::VideoUnopenable(path.display().to_string()).into());
    }

    let frames = collect_frames(&temp_dir, sample_rate);
    debug!(
        "extracted {} sampled frames from {}",
        frames.len(),
        path.display()
    );

    Ok(SampledFrames { temp_dir, frames })
}

/// Map ffmpeg's sequentially numbered output files back to original frame
/// indices: output `i` came from stream frame `i * sample_rate`.
fn collect_frames(dir: &Path, sample_rate: u32) -> Vec<(u64, PathBuf)> {
    let mut frames = Vec::new();
    let mut output_index: u64 = 0;
    loop {
        let frame_path = dir.join(format!("frame_{:06}.png", output_index));
        if !frame_path.exists() {
            break;
        }
        frames.push((output_index * sample_rate as u64, frame_path));
        output_index += 1;
    }
    frames
}
