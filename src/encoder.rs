//! Turns a raw record into the exact feature row the classifier expects.
//!
//! Encoding runs in a fixed order:
//!
//! 1. derive the `AgeGroup` bucket from the enrollment age and drop the age;
//! 2. split the record into numeric and categorical attributes;
//! 3. one-hot expand every categorical attribute into `"<attr>_<label>"`;
//! 4. reindex against the schema, zero-filling absent columns and dropping
//!    columns the schema does not know.

use crate::data::{FieldValue, RawRecord, AGE_COLUMN};
use crate::schema::ModelSchema;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;

pub const AGE_GROUP_COLUMN: &str = "AgeGroup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    UpTo20,
    From21To24,
    From25To30,
    Over30,
}

impl AgeGroup {
    /// Buckets are left-closed, right-open: `[0,20) [20,24) [24,30) [30,100)`.
    pub fn from_age(age: f64) -> Option<Self> {
        if age < 0.0 || age.is_nan() {
            None
        } else if age < 20.0 {
            Some(AgeGroup::UpTo20)
        } else if age < 24.0 {
            Some(AgeGroup::From21To24)
        } else if age < 30.0 {
            Some(AgeGroup::From25To30)
        } else if age < 100.0 {
            Some(AgeGroup::Over30)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::UpTo20 => "<=20",
            AgeGroup::From21To24 => "21-24",
            AgeGroup::From25To30 => "25-30",
            AgeGroup::Over30 => "31+",
        }
    }
}

/// A single feature row aligned column-for-column with a [`ModelSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector<'s> {
    schema: &'s ModelSchema,
    values: Array1<f64>,
}

impl<'s> EncodedVector<'s> {
    pub fn schema(&self) -> &'s ModelSchema {
        self.schema
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// The row as a one-sample record matrix.
    pub fn to_records(&self) -> Array2<f64> {
        self.values.clone().insert_axis(ndarray::Axis(0))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub struct FeatureEncoder<'s> {
    schema: &'s ModelSchema,
}

impl<'s> FeatureEncoder<'s> {
    pub fn new(schema: &'s ModelSchema) -> Self {
        Self { schema }
    }

    /// Encodes a complete, validated record. No validation happens here: an
    /// age outside `[0,100)` simply yields no `AgeGroup` indicator.
    pub fn encode(&self, record: RawRecord) -> EncodedVector<'s> {
        let expanded = one_hot(record);
        self.warn_dropped(&expanded.features);
        for column in self.unexpected_gaps(&expanded.features, &expanded.categorical) {
            log::warn!("schema column {column:?} not produced by the record; filling with 0");
        }
        self.align(&expanded.features)
    }

    /// Aligns arbitrary `(column, value)` pairs to the schema: first collect
    /// them into a map, then walk the schema in order, defaulting to 0.
    pub fn reindex<I, S>(&self, features: I) -> EncodedVector<'s>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let features: Vec<(String, f64)> = features
            .into_iter()
            .map(|(column, value)| (column.as_ref().to_string(), value))
            .collect();
        self.warn_dropped(&features);
        self.align(&features)
    }

    fn warn_dropped(&self, features: &[(String, f64)]) {
        for column in self.dropped_columns(features) {
            log::warn!("dropping column {column:?}: not in model schema");
        }
    }

    fn align(&self, features: &[(String, f64)]) -> EncodedVector<'s> {
        let produced: HashMap<&str, f64> = features
            .iter()
            .filter(|(column, _)| self.schema.contains(column))
            .map(|(column, value)| (column.as_str(), *value))
            .collect();

        let values = self
            .schema
            .columns()
            .iter()
            .map(|column| produced.get(column.as_str()).copied().unwrap_or(0.0))
            .collect::<Array1<f64>>();

        EncodedVector {
            schema: self.schema,
            values,
        }
    }

    /// Produced columns the schema does not know, in production order.
    fn dropped_columns<'f>(&self, features: &'f [(String, f64)]) -> Vec<&'f str> {
        features
            .iter()
            .map(|(column, _)| column.as_str())
            .filter(|column| !self.schema.contains(column))
            .collect()
    }

    /// Schema columns the record left at 0 that are not an indicator sibling
    /// of one of its categorical attributes.
    fn unexpected_gaps(&self, features: &[(String, f64)], categorical: &[String]) -> Vec<&'s str> {
        let schema: &'s ModelSchema = self.schema;
        schema
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|column| !features.iter().any(|(produced, _)| produced.as_str() == *column))
            .filter(|column| {
                !categorical.iter().any(|attr| {
                    column
                        .strip_prefix(attr.as_str())
                        .map_or(false, |rest| rest.starts_with('_'))
                })
            })
            .collect()
    }
}

/// A record expanded into named feature values.
struct OneHot {
    features: Vec<(String, f64)>,
    /// Attributes that were expanded into `"<attr>_<label>"` indicators.
    categorical: Vec<String>,
}

/// Swaps the raw age for its `AgeGroup` and expands every categorical
/// attribute into a single indicator set to 1.
fn one_hot(mut record: RawRecord) -> OneHot {
    if let Some(FieldValue::Numeric(age)) = record.remove(AGE_COLUMN) {
        if let Some(group) = AgeGroup::from_age(age) {
            record.insert(
                AGE_GROUP_COLUMN,
                FieldValue::Category(group.label().to_string()),
            );
        }
    }

    let mut features = Vec::with_capacity(record.len());
    let mut categorical = Vec::new();
    for (name, value) in record.iter() {
        match value {
            FieldValue::Numeric(v) => features.push((name.to_string(), *v)),
            FieldValue::Category(label) => {
                categorical.push(name.to_string());
                features.push((format!("{name}_{label}"), 1.0));
            }
        }
    }
    OneHot {
        features,
        categorical,
    }
}
