//! Aggregate statistics across saved score reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Badge, HazardType};
use crate::report::ScoreReport;

/// Statistics for one scenario across every saved attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStats {
    pub scenario_id: String,
    pub scenario_title: String,
    pub hazard: HazardType,
    /// Number of completed attempts.
    pub attempts: usize,
    pub best_points: i64,
    pub mean_points: f64,
    pub best_accuracy: f64,
    pub mean_accuracy: f64,
    /// Timeouts summed across attempts.
    pub total_timeouts: usize,
    /// Every badge earned in at least one attempt.
    pub badges: Vec<Badge>,
}

/// Group reports by scenario id and compute per-scenario statistics.
pub fn summarize_reports(reports: &[ScoreReport]) -> BTreeMap<String, ScenarioStats> {
    let mut grouped: BTreeMap<&str, Vec<&ScoreReport>> = BTreeMap::new();
    for r in reports {
        grouped.entry(r.scenario_id.as_str()).or_default().push(r);
    }

    grouped
        .into_iter()
        .map(|(id, group)| (id.to_string(), scenario_stats(&group)))
        .collect()
}

fn scenario_stats(group: &[&ScoreReport]) -> ScenarioStats {
    // `group` is never empty; it is built from at least one report.
    let latest = group[group.len() - 1];
    let n = group.len() as f64;

    let mut badges: Vec<Badge> = Vec::new();
    for badge in group.iter().flat_map(|r| r.badges.iter()) {
        if !badges.contains(badge) {
            badges.push(*badge);
        }
    }

    ScenarioStats {
        scenario_id: latest.scenario_id.clone(),
        scenario_title: latest.scenario_title.clone(),
        hazard: latest.hazard,
        attempts: group.len(),
        best_points: group.iter().map(|r| r.total_points).max().unwrap_or(0),
        mean_points: group.iter().map(|r| r.total_points as f64).sum::<f64>() / n,
        best_accuracy: group.iter().map(|r| r.accuracy).fold(0.0, f64::max),
        mean_accuracy: group.iter().map(|r| r.accuracy).sum::<f64>() / n,
        total_timeouts: group.iter().map(|r| r.timeout_count).sum(),
        badges,
    }
}
