pub mod config;
pub mod consts;
pub mod error;
pub mod filters;
pub mod interaction;
pub mod notify;
pub mod overlay;
pub mod query;
pub mod raster;
pub mod render;
pub mod resample;
pub mod selection;
pub mod transform;
pub mod view;
pub mod viewport;

pub use view::ImageView;
