pub mod board;
pub mod error;
pub mod media;

pub const PREDICT_PATH: &'static str = "/predict";
pub const EXAMPLE_IMAGE_PATH: &'static str = "/static/imgs/exampleImg.jpg";
pub const EXAMPLE_IMAGE_NAME: &'static str = "exampleImg.jpg";
pub const EXAMPLE_IMAGE_MIME_TYPE: &'static str = "image/jpeg";

/// Multipart field the predict endpoint reads the upload from.
pub const PREDICT_FIELD: &'static str = "file";
