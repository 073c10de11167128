// Core rendering pipeline: density fields, color scales, raster images and
// the drawing primitives the figure renderers build on.

pub mod canvas;
pub mod colormap;
pub mod density;
pub mod font;
pub mod heatmap;
pub mod pitch;
pub mod raster;

pub use colormap::{ColorScale, Palette};
pub use density::{
    build_density_field, DensityError, DensityField, DensityGrid, DensityParams, Normalization,
    Point, SmoothedGrid,
};
pub use heatmap::{build_density_image, DensityImage};
pub use raster::{PixelFormat, RasterError, RasterImage};
