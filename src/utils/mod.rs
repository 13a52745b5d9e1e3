// Shared helpers

pub mod log_files;
