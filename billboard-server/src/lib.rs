pub mod inference;
pub mod static_files;
