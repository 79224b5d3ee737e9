pub mod gallery;
pub mod image;
pub mod purge;
pub mod subscribe;
pub mod upload;
