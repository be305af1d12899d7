//! Metadata Store Metrics

use metrics::Counter;

use crate::UpsertOutcome;

/// Metadata Store Metrics
#[derive(Clone, Debug)]
pub(crate) struct MetaMetrics {
    /// Number of scores written to the leaderboard
    scores_recorded_total: Counter,
    /// Number of scores left off the leaderboard
    scores_rejected_total: Counter,
    /// Number of repositories counted as new
    repos_new_total: Counter,
    /// Number of views added to the recent list
    views_recorded_total: Counter,
    /// Number of score lookups
    lookups_total: Counter,
}

impl Default for MetaMetrics {
    fn default() -> Self {
        Self {
            scores_recorded_total: metrics::counter!("reportcard.scores.recorded_total"),
            scores_rejected_total: metrics::counter!("reportcard.scores.rejected_total"),
            repos_new_total: metrics::counter!("reportcard.repos.new_total"),
            views_recorded_total: metrics::counter!("reportcard.views.recorded_total"),
            lookups_total: metrics::counter!("reportcard.lookups.total"),
        }
    }
}

impl MetaMetrics {
    /// Records the outcome of a committed score update.
    pub(crate) fn on_score(&self, outcome: UpsertOutcome, new_repo: bool) {
        if outcome.is_changed() {
            self.scores_recorded_total.increment(1);
        } else {
            self.scores_rejected_total.increment(1);
        }
        if new_repo {
            self.repos_new_total.increment(1);
        }
    }

    /// Increments the counter for recorded views.
    pub(crate) fn inc_views(&self) {
        self.views_recorded_total.increment(1);
    }

    /// Increments the counter for lookups.
    pub(crate) fn inc_lookups(&self) {
        self.lookups_total.increment(1);
    }
}
