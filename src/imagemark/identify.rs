use std::path::{Path, PathBuf};

use crate::foundation::error::{TracemarkError, TracemarkResult};

/// Opaque similarity metric between a candidate and a reference image file.
pub trait Similarity {
    /// Score `candidate` against `reference`.
    fn compare(&self, candidate: &Path, reference: &Path) -> TracemarkResult<f64>;
}

impl<F> Similarity for F
where
    F: Fn(&Path, &Path) -> TracemarkResult<f64>,
{
    fn compare(&self, candidate: &Path, reference: &Path) -> TracemarkResult<f64> {
        self(candidate, reference)
    }
}

/// Which end of the metric means "closer".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    /// Distance-like metrics (entropy, variation of information).
    #[default]
    LowerIsCloser,
    /// Similarity-like metrics (SSIM, cosine).
    HigherIsCloser,
}

/// Best reference for a candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    /// Index into the reference list.
    pub index: usize,
    /// Path of the matched reference.
    pub reference: PathBuf,
    /// Score reported by the metric.
    pub score: f64,
}

/// Pick the reference closest to `candidate`. Ties keep the earliest reference; NaN scores
/// are ignored.
pub fn identify(
    candidate: &Path,
    references: &[PathBuf],
    metric: &dyn Similarity,
    order: ScoreOrder,
) -> TracemarkResult<Match> {
    if references.is_empty() {
        return Err(TracemarkError::validation(
            "identify needs at least one reference",
        ));
    }

    let mut best: Option<Match> = None;
    for (index, reference) in references.iter().enumerate() {
        let score = metric.compare(candidate, reference)?;
        tracing::debug!(reference = %reference.display(), score, "compared");
        if score.is_nan() {
            tracing::warn!(reference = %reference.display(), "metric returned NaN, skipped");
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => match order {
                ScoreOrder::LowerIsCloser => score < b.score,
                ScoreOrder::HigherIsCloser => score > b.score,
            },
        };
        if better {
            best = Some(Match {
                index,
                reference: reference.clone(),
                score,
            });
        }
    }
    best.ok_or_else(|| TracemarkError::validation("metric produced no comparable scores"))
}

#[cfg(test)]
#[path = "../../tests/unit/imagemark/identify.rs"]
mod tests;
