pub mod error;
pub mod json_file;
