//! Construction-time errors
//!
//! A running simulation never fails: numeric edge cases are clamped. Errors
//! only come from building a session out of bad parameters or from loading a
//! configuration file.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// A terrain parameter would produce degenerate terrain
    #[error("invalid terrain parameter `{name}` = {value}: {reason}")]
    InvalidTerrain {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Pads are wider than the segment they are centred in
    #[error("{pad_count} pads of width {pad_width} do not fit in terrain width {width}")]
    PadsDoNotFit {
        pad_count: u32,
        pad_width: f64,
        width: f64,
    },

    /// A configuration value is outside its usable range
    #[error("invalid config value `{name}` = {value}: expected {expected}")]
    InvalidConfig {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
