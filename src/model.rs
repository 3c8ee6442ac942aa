use crate::encoder::EncodedVector;
use crate::error::{ArtifactError, PredictError};
use crate::schema::ModelSchema;
use linfa::traits::{Predict, PredictInplace};
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// `None` only for a tree that failed validation.
    fn leaf_for(&self, row: ArrayView1<'_, f64>) -> Option<&[f64]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index)? {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if *row.get(*feature)? <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return Some(value),
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {index} splits on feature {feature} of {n_features}"));
                    }
                    // Children always follow their parent, so traversal terminates.
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {index} has {} class weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {index} has a negative or non-finite weight"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A random-forest classifier: each tree votes with its leaf's class
/// distribution and the averaged distribution picks the label.
///
/// Only validated forests exist: deserializing runs the same checks as
/// [`RandomForest::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ForestArtifact")]
pub struct RandomForest {
    classes: Vec<i64>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

#[derive(Deserialize)]
struct ForestArtifact {
    classes: Vec<i64>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<ForestArtifact> for RandomForest {
    type Error = ArtifactError;

    fn try_from(artifact: ForestArtifact) -> Result<Self, Self::Error> {
        let forest = RandomForest {
            classes: artifact.classes,
            n_features: artifact.n_features,
            trees: artifact.trees,
        };
        forest.validate()?;
        Ok(forest)
    }
}

impl RandomForest {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.classes.is_empty() {
            return Err(ArtifactError::InvalidForest("no class labels".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::InvalidForest("no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|msg| ArtifactError::InvalidForest(format!("tree {i}: {msg}")))?;
        }
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> i64 {
        let mut votes = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let Some(leaf) = tree.leaf_for(row) else {
                continue;
            };
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (vote, weight) in votes.iter_mut().zip(leaf) {
                    *vote += weight / total;
                }
            }
        }

        // First maximum wins on ties.
        let mut best = 0;
        for (i, vote) in votes.iter().enumerate() {
            if *vote > votes[best] {
                best = i;
            }
        }
        self.classes[best]
    }
}

/// Panics when `x` does not have `n_features` columns, like linfa's own
/// models. [`DropoutModel::predict`] checks the row before calling in.
impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<i64>> for RandomForest {
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<i64>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.n_features,
            "The number of features must match the forest's feature count."
        );

        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.predict_row(row);
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<i64> {
        Array1::zeros(x.nrows())
    }
}

/// The only two outcomes ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Prediction {
    #[serde(rename = "not dropout")]
    NotDropout,
    #[serde(rename = "will drop out")]
    WillDropOut,
}

impl Prediction {
    /// Label 0 is the retained class; anything else is a dropout.
    pub fn from_label(label: i64) -> Self {
        if label == 0 {
            Prediction::NotDropout
        } else {
            Prediction::WillDropOut
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Prediction::NotDropout => "not dropout",
            Prediction::WillDropOut => "will drop out",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier plus the column schema it was trained on, loaded together
/// and never modified afterwards.
#[derive(Debug, Clone)]
pub struct DropoutModel {
    forest: RandomForest,
    schema: ModelSchema,
}

impl DropoutModel {
    pub fn new(forest: RandomForest, schema: ModelSchema) -> Result<Self, ArtifactError> {
        if forest.n_features != schema.len() {
            return Err(ArtifactError::FeatureCount {
                expected: forest.n_features,
                actual: schema.len(),
            });
        }
        Ok(Self { forest, schema })
    }

    pub fn load(forest_path: &Path, columns_path: &Path) -> Result<Self, ArtifactError> {
        let forest = RandomForest::load(forest_path)?;
        let schema = ModelSchema::load(columns_path)?;
        log::info!(
            "loaded forest with {} trees from {} and {} columns from {}",
            forest.trees.len(),
            forest_path.display(),
            schema.len(),
            columns_path.display()
        );
        Self::new(forest, schema)
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Classifies one encoded row. The row must have been encoded against
    /// this model's schema.
    pub fn predict(&self, vector: &EncodedVector<'_>) -> Result<Prediction, PredictError> {
        if vector.schema().columns() != self.schema.columns() {
            return Err(PredictError::SchemaMismatch {
                expected: self.schema.len(),
                actual: vector.len(),
            });
        }
        let labels: Array1<i64> = self.forest.predict(&vector.to_records());
        Ok(Prediction::from_label(labels[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FeatureEncoder;
    use ndarray::{array, Array2};
    use serde_json::json;

    /// Two stumps on feature 0 and one on feature 1.
    fn forest() -> RandomForest {
        serde_json::from_str(
            r#"{
                "classes": [0, 1],
                "n_features": 2,
                "trees": [
                    {"nodes": [
                        {"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                        {"kind": "leaf", "value": [10.0, 2.0]},
                        {"kind": "leaf", "value": [1.0, 9.0]}
                    ]},
                    {"nodes": [
                        {"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                        {"kind": "leaf", "value": [0.8, 0.2]},
                        {"kind": "leaf", "value": [0.3, 0.7]}
                    ]},
                    {"nodes": [
                        {"kind": "split", "feature": 1, "threshold": 10.0, "left": 1, "right": 2},
                        {"kind": "leaf", "value": [0.0, 4.0]},
                        {"kind": "leaf", "value": [4.0, 0.0]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn schema() -> ModelSchema {
        ModelSchema::new(vec!["Debtor_Yes".to_string(), "Admission_grade".to_string()]).unwrap()
    }

    #[test]
    fn test_forest_predicts_batch() {
        let forest = forest();
        let x: Array2<f64> = array![[0.0, 150.0], [1.0, 150.0], [1.0, 5.0], [0.0, 5.0]];
        let labels: Array1<i64> = forest.predict(&x);
        assert_eq!(labels.to_vec(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_tie_goes_to_first_class() {
        let forest: RandomForest = serde_json::from_str(
            r#"{"classes": [0, 1], "n_features": 1,
                "trees": [{"nodes": [{"kind": "leaf", "value": [1.0, 1.0]}]}]}"#,
        )
        .unwrap();
        let labels: Array1<i64> = forest.predict(&array![[3.0]]);
        assert_eq!(labels[0], 0);
    }

    #[test]
    fn test_prediction_strings() {
        assert_eq!(Prediction::from_label(0).to_string(), "not dropout");
        assert_eq!(Prediction::from_label(1).to_string(), "will drop out");
        assert_eq!(Prediction::from_label(7), Prediction::WillDropOut);
        assert_eq!(
            serde_json::to_string(&Prediction::WillDropOut).unwrap(),
            "\"will drop out\""
        );
    }

    #[test]
    fn test_model_predicts_single_row() {
        let model = DropoutModel::new(forest(), schema()).unwrap();
        let encoder = FeatureEncoder::new(model.schema());

        let debtor = encoder.reindex([("Debtor_Yes", 1.0), ("Admission_grade", 120.0)]);
        assert_eq!(model.predict(&debtor).unwrap(), Prediction::WillDropOut);
        let clear = encoder.reindex([("Admission_grade", 120.0)]);
        assert_eq!(model.predict(&clear).unwrap(), Prediction::NotDropout);
    }

    #[test]
    fn test_row_from_other_schema_is_an_error() {
        let model = DropoutModel::new(forest(), schema()).unwrap();

        let wide = ModelSchema::new((0..10).map(|i| format!("col_{i}")).collect()).unwrap();
        let row = FeatureEncoder::new(&wide).reindex([("col_0", 1.0)]);
        let err = model.predict(&row).unwrap_err();
        assert!(matches!(err, PredictError::SchemaMismatch { expected: 2, actual: 10 }));

        let renamed =
            ModelSchema::new(vec!["Admission_grade".to_string(), "Debtor_Yes".to_string()])
                .unwrap();
        let row = FeatureEncoder::new(&renamed).reindex([("Debtor_Yes", 1.0)]);
        assert!(model.predict(&row).is_err());
    }

    #[test]
    fn test_feature_count_mismatch() {
        let one_column = ModelSchema::new(vec!["GDP".to_string()]).unwrap();
        let err = DropoutModel::new(forest(), one_column).unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureCount { expected: 2, actual: 1 }));
    }

    fn parse_with(edit: impl FnOnce(&mut serde_json::Value)) -> Result<RandomForest, String> {
        let mut value = serde_json::to_value(forest()).unwrap();
        edit(&mut value);
        serde_json::from_value(value).map_err(|err| err.to_string())
    }

    #[test]
    fn test_rejects_malformed_trees() {
        let backwards = parse_with(|v| {
            v["trees"][0]["nodes"][0] =
                json!({"kind": "split", "feature": 0, "threshold": 0.5, "left": 0, "right": 2});
        });
        assert!(backwards.unwrap_err().contains("invalid forest: tree 0"));

        let dangling = parse_with(|v| {
            v["trees"][0]["nodes"][0] =
                json!({"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 9});
        });
        assert!(dangling.is_err());

        let out_of_range = parse_with(|v| v["trees"][2]["nodes"][0]["feature"] = json!(5));
        assert!(out_of_range.unwrap_err().contains("tree 2"));

        let short_leaf = parse_with(|v| v["trees"][1]["nodes"][1]["value"] = json!([1.0]));
        assert!(short_leaf.is_err());

        let empty = parse_with(|v| v["trees"] = json!([]));
        assert!(empty.unwrap_err().contains("no trees"));

        assert!(parse_with(|_| {}).is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_forest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(
            &path,
            r#"{"classes": [0, 1], "n_features": 1, "trees": [{"nodes": []}]}"#,
        )
        .unwrap();
        let err = RandomForest::load(&path).unwrap_err();
        assert!(err.to_string().contains("tree has no nodes"), "{err}");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let forest_path = dir.path().join("forest.json");
        let columns_path = dir.path().join("columns.json");
        std::fs::write(&forest_path, serde_json::to_string(&forest()).unwrap()).unwrap();
        std::fs::write(&columns_path, r#"["Debtor_Yes", "Admission_grade"]"#).unwrap();

        let model = DropoutModel::load(&forest_path, &columns_path).unwrap();
        assert_eq!(model.schema().len(), 2);
        assert_eq!(model.forest().trees().len(), 3);
        assert_eq!(model.forest().classes(), &[0, 1]);
    }
}
