//! Image processing: canvas extension, crop-scale-center and matting.
//!
//! | Operation | Entry point | Resampling |
//! |---|---|---|
//! | **Threshold** | [`threshold::estimate_threshold`] | n/a (BT.601 luma mean) |
//! | **Bounds** | [`bounds::find_foreground_bounds`] | n/a |
//! | **Extend** | [`extend::extend_canvas`] | area fillers, Lanczos3 final fit |
//! | **Crop** | [`crop::crop_scale_center`] | Lanczos3 |
//! | **Matte** | [`matte::compose_matte`] | area |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Raw requests and the validated params built from them
//! - **Raster**: Owned RGB buffer with allocation-returning operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Algorithms**: One module per operation, pixels in, pixels out
//! - **Operations**: Glue combining the backend with one algorithm

pub mod backend;
pub mod bounds;
mod calculations;
pub mod crop;
pub mod error;
pub mod extend;
pub mod matte;
pub mod operations;
pub mod params;
pub mod raster;
pub mod rust_backend;
pub mod threshold;

pub use backend::{BackendError, ImageBackend};
pub use error::{CanvasError, ProcessingError, RequestedRect, ValidationError};
pub use operations::{CanvasOp, OpReport, ProbeReport, probe, run};
pub use params::{
    BackgroundColor, CropRequest, ExtendRequest, MatteRequest, Quality, ThresholdChoice,
};
pub use raster::RasterImage;
pub use rust_backend::RustBackend;
