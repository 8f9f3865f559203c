//! Human-driven resolution of one conflicted target field at a time.
//!
//! The resolver holds only which target is open. The competing columns are
//! re-derived from the live assignment whenever they are read, so the view
//! stays correct if the assignment changes while the field is open.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use taxmap_model::{Assignment, FieldCandidate, SampleData, candidate_score};

use crate::error::{MappingError, Result};
use crate::store::AssignmentStore;

/// Sample values shown per competing column.
pub const CONTENDER_SAMPLE_LIMIT: usize = 5;

/// Resolver state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Disambiguation {
    #[default]
    Idle,
    Open { target: String },
}

/// One column competing for the open target field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contender {
    pub column: String,
    pub sample_values: Vec<String>,
    /// Candidate score the AI gave this column for the target, if any.
    /// Used for ordering only; the winner is always picked by the user.
    pub score: Option<f64>,
}

/// Outcome of a committed disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub target: String,
    pub winner: String,
    /// Columns reset to unassigned.
    pub released: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Disambiguator {
    state: Disambiguation,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Disambiguation {
        &self.state
    }

    pub fn open_target(&self) -> Option<&str> {
        match &self.state {
            Disambiguation::Open { target } => Some(target),
            Disambiguation::Idle => None,
        }
    }

    /// Focus `target`. Any previously open field is closed.
    pub fn open(&mut self, store: &AssignmentStore, target: &str) -> Result<()> {
        if store.columns_for(target).len() < 2 {
            return Err(MappingError::NotConflicted(target.to_string()));
        }
        if let Some(previous) = self.open_target()
            && previous != target
        {
            debug!(previous, field = target, "switching disambiguation focus");
        }
        self.state = Disambiguation::Open {
            target: target.to_string(),
        };
        Ok(())
    }

    pub fn close(&mut self) {
        self.state = Disambiguation::Idle;
    }

    /// Columns currently assigned to the open target, highest score first.
    ///
    /// Columns without a score keep their upload order after scored ones.
    pub fn contenders(
        &self,
        store: &AssignmentStore,
        samples: &SampleData,
        candidates: &BTreeMap<String, Vec<FieldCandidate>>,
    ) -> Result<Vec<Contender>> {
        let target = self
            .open_target()
            .ok_or(MappingError::NoDisambiguationOpen)?;
        let mut contenders: Vec<Contender> = store
            .columns_for(target)
            .into_iter()
            .map(|column| Contender {
                column: column.to_string(),
                sample_values: samples
                    .values_for(column, CONTENDER_SAMPLE_LIMIT)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                score: candidate_score(candidates, column, target),
            })
            .collect();
        contenders.sort_by(|a, b| compare_scores(a.score, b.score));
        Ok(contenders)
    }

    /// Keep `winner` on the open target and release every other column bound to it.
    pub fn resolve(&mut self, store: &mut AssignmentStore, winner: &str) -> Result<Resolution> {
        let target = self
            .open_target()
            .ok_or(MappingError::NoDisambiguationOpen)?
            .to_string();
        let competing: Vec<String> = store
            .columns_for(&target)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !competing.iter().any(|c| c == winner) {
            return Err(MappingError::NotAContender {
                column: winner.to_string(),
                target,
            });
        }

        let released: Vec<String> = competing.into_iter().filter(|c| c != winner).collect();
        for column in &released {
            store.set(column, Assignment::Unassigned);
        }
        info!(
            field = %target,
            winner,
            released = released.len(),
            "conflict resolved"
        );
        self.state = Disambiguation::Idle;
        Ok(Resolution {
            target,
            winner: winner.to_string(),
            released,
        })
    }
}

/// Descending by score, unscored last.
fn compare_scores(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
