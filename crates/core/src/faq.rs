//! Classifier-gated canned answers.
//!
//! A segment is scored by the model bundle; only a sufficiently confident
//! intent yields an answer, picked uniformly at random among that intent's
//! rows. Every internal failure is swallowed into "no answer" — replies are
//! best-effort, never errors.

use std::path::Path;
use std::sync::OnceLock;

use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::model::ModelBundle;

/// Minimum class probability for a prediction to produce an answer.
pub const CONFIDENCE_THRESHOLD: f64 = 0.4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub intent: String,
    pub answer: String,
}

/// The static answer table. Many rows may share an intent.
#[derive(Clone, Debug, Default)]
pub struct FaqTable {
    entries: Vec<FaqEntry>,
}

impl FaqTable {
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let shown = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|err| DomainError::read(&shown, err))?;

        let headers = reader.headers().map_err(|err| DomainError::shape(&shown, err))?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);
        let intent_col =
            column("intent").ok_or_else(|| DomainError::shape(&shown, "missing column `intent`"))?;
        let answer_col =
            column("answer").ok_or_else(|| DomainError::shape(&shown, "missing column `answer`"))?;

        let mut entries = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|err| DomainError::shape(&shown, err))?;
            let intent = row.get(intent_col).unwrap_or("");
            let answer = row.get(answer_col).unwrap_or("");
            if intent.is_empty() || answer.is_empty() {
                continue;
            }
            entries.push(FaqEntry { intent: intent.to_string(), answer: answer.to_string() });
        }

        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    pub fn answers_for(&self, intent: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.intent == intent)
            .map(|entry| entry.answer.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct FaqResponder {
    model: ModelBundle,
    table: FaqTable,
}

impl FaqResponder {
    pub fn new(model: ModelBundle, table: FaqTable) -> Self {
        Self { model, table }
    }

    /// Answer one segment, or nothing. Nothing means: empty segment, a
    /// prediction below [`CONFIDENCE_THRESHOLD`], an intent with no table
    /// rows, or a model failure.
    pub fn answer(&self, segment: &str) -> Option<String> {
        let segment = segment.trim();
        if segment.is_empty() {
            return None;
        }

        let prediction = self.model.predict(segment).ok()?;
        if prediction.confidence < CONFIDENCE_THRESHOLD {
            return None;
        }

        let candidates = self.table.answers_for(&prediction.label);
        candidates.choose(&mut rand::thread_rng()).map(|answer| answer.to_string())
    }

    /// Split the input on the `"and"` / `","` delimiters (case-insensitive
    /// substrings, so words containing them split too), answer each segment
    /// independently, and join the hits with line breaks in segment order.
    pub fn answer_multi(&self, text: &str) -> Option<String> {
        let answers: Vec<String> =
            segment_splitter().split(text).filter_map(|segment| self.answer(segment)).collect();
        (!answers.is_empty()).then(|| answers.join("\n"))
    }
}

fn segment_splitter() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("(?i)and|,").expect("splitter pattern is valid"))
}
