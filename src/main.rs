// src/main.rs - CLI entry point: dispatch by extension, print one JSON result
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use serde_json::json;

use pose_extractor::model::OnnxPoseModel;
use pose_extractor::pipeline::{PoseExtractionPipeline, DEFAULT_SAMPLE_RATE};

const SUPPORTED_FORMATS: [&str; 10] = [
    ".jpg", ".jpeg", ".png", ".bmp", ".webp", ".mp4", ".avi", ".mov", ".mkv", ".webm",
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract pose landmarks from images and videos", long_about = None)]
struct Args {
    /// Image or video file to process
    path: Option<String>,

    /// Process every nth video frame
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Pose landmark ONNX model
    #[arg(long, default_value = OnnxPoseModel::DEFAULT_MODEL_PATH)]
    model: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileKind {
    Image,
    Video,
    Unsupported,
}

fn classify(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "bmp" | "webp" => FileKind::Image,
        "mp4" | "avi" | "mov" | "mkv" | "webm" => FileKind::Video,
        _ => FileKind::Unsupported,
    }
}

/// Everything on stdout is exactly one pretty-printed result object; logs
/// go to stderr.
fn print_result<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("Failed to serialize result: {err}"),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let path_arg = match args.path {
        Some(path) => path,
        None => {
            print_result(&json!({
                "success": false,
                "error": "No file path provided",
                "usage": "pose_extractor <image_or_video_path>",
            }));
            return ExitCode::from(1);
        }
    };

    let path = Path::new(&path_arg);
    if !path.exists() {
        print_result(&json!({
            "success": false,
            "error": "File not found",
            "file": path_arg,
        }));
        return ExitCode::from(1);
    }

    let kind = classify(path);
    if kind == FileKind::Unsupported {
        // Reported through the normal result path: the process still
        // exits 0, only pre-dispatch validation exits non-zero.
        print_result(&json!({
            "success": false,
            "error": "Unsupported file format",
            "supported_formats": SUPPORTED_FORMATS,
        }));
        return ExitCode::SUCCESS;
    }

    let mut pipeline = match PoseExtractionPipeline::new(Path::new(&args.model)) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            print_result(&json!({
                "success": false,
                "error": format!("{err:#}"),
            }));
            return ExitCode::from(1);
        }
    };

    match kind {
        FileKind::Image => print_result(&pipeline.extract_from_image(path)),
        FileKind::Video => print_result(&pipeline.extract_from_video(path, args.sample_rate)),
        FileKind::Unsupported => unreachable!("rejected before dispatch"),
    }
    pipeline.close();

    ExitCode::SUCCESS
}
