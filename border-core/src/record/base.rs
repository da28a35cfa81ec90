//! Base implementation of records.
use crate::error::LrrError;
use std::collections::HashMap;

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, like the return of an episode.
    Scalar(f32),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),
}

/// A container for storing key-value pairs of various data types.
#[derive(Debug, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, LrrError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(LrrError::RecordValueTypeError("Scalar".to_string())),
            None => Err(LrrError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, LrrError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(LrrError::RecordValueTypeError("Array1".to_string())),
            None => Err(LrrError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_check_value_type() {
        let mut record = Record::from_scalar("Episode return", 3.0);
        record.insert("Episode returns", RecordValue::Array1(vec![2.0, 4.0]));

        assert_eq!(record.get_scalar("Episode return").unwrap(), 3.0);
        assert_eq!(record.get_array1("Episode returns").unwrap(), vec![2.0, 4.0]);
        assert!(matches!(
            record.get_scalar("Episode returns"),
            Err(LrrError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_array1("missing"),
            Err(LrrError::RecordKeyError(_))
        ));
    }

    #[test]
    fn insert_overwrites_the_same_key() {
        let mut record = Record::empty();
        record.insert("Episode return", RecordValue::Scalar(1.0));
        record.insert("Episode return", RecordValue::Scalar(2.0));

        assert_eq!(record.get_scalar("Episode return").unwrap(), 2.0);
    }
}
