//! WebGPU rendering module
//!
//! Draws a `Snapshot` using SDF (Signed Distance Fields) in the fragment shader.

pub mod sdf_pipeline;

pub use sdf_pipeline::SdfRenderState;
