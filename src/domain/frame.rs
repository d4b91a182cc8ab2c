//! Candle series with named, position-aligned columns.
//!
//! Host adapters map their native row representation to and from this
//! structure; the strategy entry points only append or overwrite columns.

use crate::domain::candle::{validate_candles, Candle};
use crate::domain::error::SignalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric column; `None` marks an undefined value.
    Float(Vec<Option<f64>>),
    /// Decision column; `true` is written as 1, `false` as 0.
    Flag(Vec<bool>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Flag(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandleFrame {
    candles: Vec<Candle>,
    // Insertion order is preserved for output.
    columns: Vec<(String, Column)>,
}

impl CandleFrame {
    pub fn new(candles: Vec<Candle>) -> Result<Self, SignalError> {
        validate_candles(&candles)?;
        Ok(Self {
            candles,
            columns: Vec::new(),
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn float(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name)? {
            Column::Float(v) => Some(v),
            Column::Flag(_) => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<&[bool]> {
        match self.column(name)? {
            Column::Flag(v) => Some(v),
            Column::Float(_) => None,
        }
    }

    /// Float column by name, or `MalformedInput` naming the missing column.
    pub fn require_float(&self, name: &str) -> Result<&[Option<f64>], SignalError> {
        self.float(name).ok_or_else(|| {
            SignalError::malformed(0, format!("missing numeric column '{name}'"))
        })
    }

    /// Appends a column, or replaces an existing one of the same name in place.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<(), SignalError> {
        if column.len() != self.candles.len() {
            return Err(SignalError::malformed(
                column.len().min(self.candles.len()),
                format!(
                    "column '{name}' has {} rows, frame has {}",
                    column.len(),
                    self.candles.len()
                ),
            ));
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    pub fn set_float(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), SignalError> {
        self.set_column(name, Column::Float(values))
    }

    pub fn set_flag(&mut self, name: &str, values: Vec<bool>) -> Result<(), SignalError> {
        self.set_column(name, Column::Flag(values))
    }
}
