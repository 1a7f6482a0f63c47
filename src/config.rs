use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::eval::numeric::{DecimalFormat, DEFAULT_SCALE_LIMIT};
use crate::{Error, InternalResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Decimal separator of numbers read from and written to text.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// `MAX` scale of `DIVIDE`/`FORMAT` without `BY` and without `MAX`.
    #[serde(default = "default_max_scale")]
    pub default_max_scale: u32,

    /// Largest power of ten, in either direction, a numeric operand may carry.
    /// Larger exponents make the operand malformed.
    #[serde(default = "default_number_scale_limit")]
    pub number_scale_limit: u32,

    /// Characters of the offending subtree quoted in parse errors.
    #[serde(default = "default_error_excerpt_len")]
    pub error_excerpt_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            default_max_scale: default_max_scale(),
            number_scale_limit: default_number_scale_limit(),
            error_excerpt_len: default_error_excerpt_len(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> InternalResult<Self> {
        from_file(path)
    }

    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    pub fn decimal_format(&self) -> DecimalFormat {
        DecimalFormat::new(self.decimal_separator).with_scale_limit(self.number_scale_limit)
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Internal(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Internal(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Internal(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_decimal_separator() -> char {
    '.'
}
fn default_max_scale() -> u32 {
    1024
}
fn default_number_scale_limit() -> u32 {
    DEFAULT_SCALE_LIMIT
}
fn default_error_excerpt_len() -> usize {
    100
}
