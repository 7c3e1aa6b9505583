pub mod cropper;
pub mod handle;

pub use cropper::{CropperResponse, ImageCropper};
pub use handle::CropHandle;
