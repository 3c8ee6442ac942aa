//! validate → normalize → encode → predict, once per submission.

use crate::config::ModelConfig;
use crate::data::{EnrollmentForm, ValidationError};
use crate::encoder::{EncodedVector, FeatureEncoder};
use crate::error::{ArtifactError, PredictError};
use crate::model::{DropoutModel, Prediction};
use crate::normalize::{CategoryNormalizer, FallbackPolicy};

/// Process-wide prediction state. Everything in here is read-only after
/// construction, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: DropoutModel,
    policy: FallbackPolicy,
}

impl Predictor {
    pub fn new(model: DropoutModel, policy: FallbackPolicy) -> Self {
        Self { model, policy }
    }

    pub fn load(config: &ModelConfig, policy: FallbackPolicy) -> Result<Self, ArtifactError> {
        let model = DropoutModel::load(&config.forest, &config.columns)?;
        Ok(Self::new(model, policy))
    }

    pub fn encode(&self, form: &EnrollmentForm) -> Result<EncodedVector<'_>, ValidationError> {
        let validated = form.validate()?;
        let schema = self.model.schema();
        let record = validated.into_record(&CategoryNormalizer::new(schema, self.policy));
        Ok(FeatureEncoder::new(schema).encode(record))
    }

    pub fn predict(&self, form: &EnrollmentForm) -> Result<Prediction, PredictError> {
        let vector = self.encode(form)?;
        let prediction = self.model.predict(&vector)?;
        log::debug!("prediction: {prediction}");
        Ok(prediction)
    }

    pub fn model(&self) -> &DropoutModel {
        &self.model
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }
}
