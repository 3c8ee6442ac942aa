//! Student dropout prediction: turns an enrollment form into the feature
//! row a pre-trained forest classifier expects and reports its verdict.

pub mod config;
pub mod data;
pub mod encoder;
pub mod error;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod server;

pub use data::{EnrollmentForm, ValidationError};
pub use encoder::{EncodedVector, FeatureEncoder};
pub use error::PredictError;
pub use model::{DropoutModel, Prediction};
pub use normalize::{CategoryNormalizer, FallbackPolicy};
pub use pipeline::Predictor;
pub use schema::ModelSchema;
