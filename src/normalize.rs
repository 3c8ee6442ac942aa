//! Maps labels the trained schema never saw onto the `Other` bucket.

use crate::lookup::CategoricalField;
use crate::schema::ModelSchema;
use serde::{Deserialize, Serialize};

pub const OTHER_LABEL: &str = "Other";

/// Which categorical attributes get the `Other` fallback.
///
/// The deployed model was built with the fallback applied to nationality
/// only, so that stays the default. Occupation and qualification codes
/// have equally sparse label spaces; `AllCategorical` covers them too, at
/// the cost of predictions diverging from the reference behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    #[default]
    NationalityOnly,
    AllCategorical,
}

impl FallbackPolicy {
    pub fn applies_to(self, field: CategoricalField) -> bool {
        match self {
            FallbackPolicy::NationalityOnly => field == CategoricalField::Nationality,
            FallbackPolicy::AllCategorical => true,
        }
    }
}

pub struct CategoryNormalizer<'s> {
    schema: &'s ModelSchema,
    policy: FallbackPolicy,
}

impl<'s> CategoryNormalizer<'s> {
    pub fn new(schema: &'s ModelSchema, policy: FallbackPolicy) -> Self {
        Self { schema, policy }
    }

    /// Returns `label` if `"<attribute>_<label>"` is a schema column,
    /// otherwise [`OTHER_LABEL`].
    pub fn normalize<'a>(&self, attribute: &str, label: &'a str) -> &'a str {
        log::debug!("checking {attribute} label {label:?}");
        if self.schema.contains(&format!("{attribute}_{label}")) {
            label
        } else {
            log::debug!("{attribute} label {label:?} not in schema, using {OTHER_LABEL:?}");
            OTHER_LABEL
        }
    }

    /// Applies [`normalize`](Self::normalize) when the policy covers `field`.
    pub fn normalize_field<'a>(&self, field: CategoricalField, label: &'a str) -> &'a str {
        if self.policy.applies_to(field) {
            self.normalize(field.column(), label)
        } else {
            label
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }
}
