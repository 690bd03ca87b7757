//! Configuration access port trait.

use crate::domain::error::VolcrossError;

/// Numeric getters fall back to `default` only when the key is absent; a
/// value that is present but does not parse is `ConfigInvalid`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VolcrossError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, VolcrossError>;
}
