//! Frame production: scales, the retained renderer, scene snapshots and rasterization.

pub(crate) mod pipeline;
pub(crate) mod raster;
pub(crate) mod renderer;
pub(crate) mod scale;
pub(crate) mod scene;
