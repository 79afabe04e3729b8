// src/lib.rs - Pose landmark extraction from images and videos
pub mod angles;
pub mod error;
pub mod landmarks;
pub mod model;
pub mod pipeline;
pub mod result;
pub mod video;
