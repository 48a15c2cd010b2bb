pub mod descriptor;
pub mod frame;
pub mod keypoint;
pub mod robust;
pub mod runtime;

pub use descriptor::*;
pub use frame::*;
pub use keypoint::*;
pub use robust::*;
pub use runtime::*;

pub use image::{GrayImage, RgbImage};
