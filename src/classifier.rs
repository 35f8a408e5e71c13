//! Binary classifiers loaded from JSON model artifacts.
//!
//! Three model families are understood, selected by the artifact's `kind` tag:
//! logistic regression, a single decision tree and a random forest of trees.
//! Trees are stored as flat node arrays with the root at index 0 and every
//! child placed after its parent.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::models::{Diagnosis, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("Input contains NaN or infinity in feature {0}")]
    NonFinite(&'static str),
    #[error("malformed decision tree: {0}")]
    MalformedTree(String),
}

pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Diagnosis, InferenceError>;
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl Model {
    /// Structural checks run once at load time.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Model::LogisticRegression(m) => m.check(),
            Model::DecisionTree(m) => m.check(),
            Model::RandomForest(m) => m.check(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Model::LogisticRegression(_) => "logistic_regression",
            Model::DecisionTree(_) => "decision_tree",
            Model::RandomForest(_) => "random_forest",
        }
    }
}

impl Classifier for Model {
    fn predict(&self, features: &FeatureVector) -> Result<Diagnosis, InferenceError> {
        if let Some(pos) = features.iter().position(|x| !x.is_finite()) {
            return Err(InferenceError::NonFinite(FEATURE_NAMES[pos]));
        }
        match self {
            Model::LogisticRegression(m) => Ok(m.predict(features)),
            Model::DecisionTree(m) => m.distribution(features).map(argmax),
            Model::RandomForest(m) => m.distribution(features).map(argmax),
        }
    }
}

fn argmax(dist: [f64; 2]) -> Diagnosis {
    // ties go to the first class
    if dist[1] > dist[0] {
        Diagnosis::Diabetes
    } else {
        Diagnosis::NoDiabetes
    }
}

fn finite(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be finite, got {value}"))
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct LogisticRegression {
    #[validate(length(equal = 7))]
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        finite("intercept", self.intercept)?;
        self.coefficients
            .iter()
            .try_for_each(|w| finite("coefficient", *w))
    }

    fn predict(&self, features: &FeatureVector) -> Diagnosis {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        if z > 0.0 {
            Diagnosis::Diabetes
        } else {
            Diagnosis::NoDiabetes
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
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

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct DecisionTree {
    #[validate(length(min = 1))]
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {idx}: feature index {feature} out of range"));
                    }
                    finite("threshold", *threshold)?;
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(format!("node {idx}: invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != 2 {
                        return Err(format!("node {idx}: leaf needs 2 class weights"));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("node {idx}: leaf weights must be finite and >= 0"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("node {idx}: leaf weights sum to zero"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalised class distribution of the leaf reached by `features`.
    fn distribution(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let mut idx = 0;
        // each step moves strictly forward, so the walk is bounded by the node count
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).ok_or_else(|| {
                        InferenceError::MalformedTree(format!("feature index {feature}"))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) if value.len() == 2 => {
                    let total = value[0] + value[1];
                    return Ok([value[0] / total, value[1] / total]);
                }
                Some(TreeNode::Leaf { .. }) => {
                    return Err(InferenceError::MalformedTree(format!("leaf {idx}")));
                }
                None => {
                    return Err(InferenceError::MalformedTree(format!("missing node {idx}")));
                }
            }
        }
        Err(InferenceError::MalformedTree("walk did not reach a leaf".to_string()))
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct RandomForest {
    #[validate(length(min = 1))]
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.check().map_err(|e| format!("tree {i}: {e}")))
    }

    /// Mean of the per-tree leaf distributions.
    fn distribution(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let dist = tree.distribution(features)?;
            sum[0] += dist[0];
            sum[1] += dist[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}
