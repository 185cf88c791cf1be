//! Data access layer

pub mod loader;

pub use loader::{load_dir, load_files, read_csv, read_file, resolve_inputs};
