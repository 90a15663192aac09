//! Batch assessment
//!
//! A batch resolves its product line once, then evaluates every subject on
//! the engine's bounded worker pool. Output order always matches input
//! order. A subject that fails, whether through bad data or a panic, becomes
//! an [`ItemError`] in its slot and never affects its siblings.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use crate::decision::DecisionStatus;
use crate::engine::{CompositeVerdict, RiskEngine};
use crate::error::{ConfigurationError, ItemError};
use crate::product::{AssessmentMode, ProductLine};
use crate::registry::ProductLineConfig;
use crate::subject::SubjectRecord;

/// Result for one subject of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Verdict(CompositeVerdict),
    Failed(ItemError),
}

impl BatchOutcome {
    pub fn verdict(&self) -> Option<&CompositeVerdict> {
        match self {
            BatchOutcome::Verdict(verdict) => Some(verdict),
            BatchOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ItemError> {
        match self {
            BatchOutcome::Verdict(_) => None,
            BatchOutcome::Failed(error) => Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BatchOutcome::Failed(_))
    }
}

/// Totals over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub verdicts: usize,
    pub failures: usize,
    /// Verdict count per decision status
    pub by_status: BTreeMap<DecisionStatus, usize>,
    /// Number of verdicts raised by the amount override
    pub escalated: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                BatchOutcome::Verdict(verdict) => {
                    summary.verdicts += 1;
                    *summary.by_status.entry(verdict.status).or_insert(0) += 1;
                    if verdict.escalated {
                        summary.escalated += 1;
                    }
                }
                BatchOutcome::Failed(_) => summary.failures += 1,
            }
        }
        summary
    }
}

impl RiskEngine {
    /// Assesses a collection of subjects
    ///
    /// Fails as a whole only when the product line cannot be resolved; that
    /// check happens before any subject is evaluated.
    pub fn assess_batch(
        &self,
        product_line: &str,
        subjects: &[Value],
        mode: AssessmentMode,
    ) -> Result<Vec<BatchOutcome>, ConfigurationError> {
        let requested: ProductLine = product_line.parse()?;
        let config = self.registry().get(requested, mode)?;

        info!(
            product_line = %requested,
            mode = %mode,
            size = subjects.len(),
            workers = self.pool.current_num_threads(),
            "Starting batch assessment"
        );

        let outcomes: Vec<BatchOutcome> = self.pool.install(|| {
            subjects
                .par_iter()
                .enumerate()
                .map(|(index, subject)| self.assess_item(index, requested, &config, subject))
                .collect()
        });

        let failures = outcomes.iter().filter(|o| o.is_failure()).count();
        info!(
            size = outcomes.len(),
            failures,
            "Batch assessment complete"
        );

        Ok(outcomes)
    }

    fn assess_item(
        &self,
        index: usize,
        requested: ProductLine,
        config: &ProductLineConfig,
        subject: &Value,
    ) -> BatchOutcome {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.assess_with(requested, config, subject)
        }));

        let message = match attempt {
            Ok(Ok(verdict)) => return BatchOutcome::Verdict(verdict),
            Ok(Err(error)) => error.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        let subject_id = SubjectRecord::from_value(subject)
            .ok()
            .and_then(|record| record.subject_id());
        warn!(
            index,
            subject_id = ?subject_id,
            error = %message,
            "Batch item failed"
        );

        BatchOutcome::Failed(ItemError {
            index,
            subject_id,
            message,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("evaluation panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("evaluation panicked: {message}")
    } else {
        "evaluation panicked".to_string()
    }
}
