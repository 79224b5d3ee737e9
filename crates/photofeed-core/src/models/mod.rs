pub mod image;
pub mod subscriber;

pub use image::{Detection, ImageMeta, ImagePage, StoredImage, NO_DESCRIPTION};
pub use subscriber::Subscriber;
