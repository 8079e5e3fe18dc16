//! Inference over the pre-trained FAQ model bundle.
//!
//! The bundle is a single JSON artifact produced by the offline training
//! step: a TF-IDF vectorizer (term vocabulary plus per-term IDF weights), a
//! linear classifier (per-class intercepts and coefficient rows), and the
//! label list decoding class index to intent name. Class probabilities come
//! from a softmax over the class scores. Nothing is trained here.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::DomainError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term to feature-column index.
    pub vocabulary: HashMap<String, usize>,
    /// Per-column inverse document frequency weight.
    pub idf: Vec<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub intercepts: Vec<f64>,
    /// One row per class, one column per vocabulary term.
    pub coefficients: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelBundle {
    pub vectorizer: TfidfVectorizer,
    pub classifier: LinearClassifier,
    pub labels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Maximum class probability.
    pub confidence: f64,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model bundle has no classes")]
    NoClasses,
}

impl ModelBundle {
    /// Read and validate a bundle from disk. Dimensional incoherence is a
    /// startup failure, never a per-request one.
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let shown = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|err| DomainError::read(&shown, err))?;
        let bundle: ModelBundle =
            serde_json::from_str(&raw).map_err(|err| DomainError::shape(&shown, err))?;
        bundle.ensure_coherent().map_err(|message| DomainError::shape(&shown, message))?;
        Ok(bundle)
    }

    pub fn ensure_coherent(&self) -> Result<(), String> {
        let classes = self.labels.len();
        let features = self.vectorizer.idf.len();

        if classes == 0 {
            return Err("label list is empty".to_string());
        }
        if self.vectorizer.vocabulary.is_empty() {
            return Err("vocabulary is empty".to_string());
        }
        if let Some((term, &column)) =
            self.vectorizer.vocabulary.iter().find(|(_, &column)| column >= features)
        {
            return Err(format!(
                "term `{term}` maps to column {column}, but only {features} idf weights exist"
            ));
        }
        if self.classifier.intercepts.len() != classes {
            return Err(format!(
                "{} intercepts for {classes} classes",
                self.classifier.intercepts.len()
            ));
        }
        if self.classifier.coefficients.len() != classes {
            return Err(format!(
                "{} coefficient rows for {classes} classes",
                self.classifier.coefficients.len()
            ));
        }
        if let Some((index, row)) =
            self.classifier.coefficients.iter().enumerate().find(|(_, row)| row.len() != features)
        {
            return Err(format!(
                "coefficient row {index} has {} columns, expected {features}",
                row.len()
            ));
        }

        Ok(())
    }

    /// Score `text` and decode the best class. Out-of-vocabulary input is not
    /// an error: the feature vector is simply zero and the scores collapse to
    /// the intercepts.
    pub fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        if self.labels.is_empty() {
            return Err(ModelError::NoClasses);
        }

        let features = self.vectorize(text);
        let scores: Vec<f64> = self
            .classifier
            .coefficients
            .iter()
            .zip(&self.classifier.intercepts)
            .map(|(row, intercept)| {
                intercept
                    + features.iter().map(|(&column, value)| row[column] * value).sum::<f64>()
            })
            .collect();

        // First-wins argmax, matching the decoder the bundle was trained with.
        let probabilities = softmax(&scores);
        let mut best = 0;
        for (index, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best] {
                best = index;
            }
        }

        Ok(Prediction { label: self.labels[best].clone(), confidence: probabilities[best] })
    }

    /// Sparse L2-normalized TF-IDF embedding of `text`.
    fn vectorize(&self, text: &str) -> HashMap<usize, f64> {
        let mut features: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&column) = self.vectorizer.vocabulary.get(&token) {
                *features.entry(column).or_insert(0.0) += 1.0;
            }
        }

        for (&column, value) in features.iter_mut() {
            *value *= self.vectorizer.idf[column];
        }

        let norm = features.values().map(|value| value * value).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in features.values_mut() {
                *value /= norm;
            }
        }

        features
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|value| value / sum).collect()
}
