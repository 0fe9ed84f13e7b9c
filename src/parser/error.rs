//! Argument parsing errors.

use std::ffi::OsString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgParseError {
    #[error("argument is not valid unicode: {}", .0.to_string_lossy())]
    InvalidUnicode(OsString),
}
