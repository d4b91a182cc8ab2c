//! Configuration access port trait.
//!
//! Typed getters fall back to `default` only when the key is absent; a present
//! value that does not parse is an `InvalidParameter` error.

use crate::domain::error::SignalError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SignalError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, SignalError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, SignalError>;
}
