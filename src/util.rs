//! Module for utility types and functions not belonging to other modules

use std::fmt::Display;
use std::fs::create_dir_all;
use std::path::Path;

/// Create a directory if it does not exist
/// Fails if the directory could not be created
pub fn touch_dir(p: &Path) -> Result<(), String> {
    if !p.exists() {
        create_dir_all(p)
            .map_err(|e| format!("Failed to create directory at {}: {}", p.display(), e))?;
    }

    Ok(())
}

/// Trait for printing errors in a postfix style
pub trait PrintErr {
    fn print_err(self) -> Self;
}

impl<T, E: Display> PrintErr for Result<T, E> {
    fn print_err(self) -> Self {
        if let Err(e) = &self {
            log::error!("{}", e);
        }

        self
    }
}
