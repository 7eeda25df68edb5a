//! Per-container error log

use super::error::ValidationError;

/// Append-only list of rejected writes, cleared explicitly.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<ValidationError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ErrorCollector) {
        self.errors.extend(other.errors);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }
}
