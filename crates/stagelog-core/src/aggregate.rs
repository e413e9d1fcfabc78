//! Batch aggregation
//!
//! Regroups trial results by algorithm, then difficulty. Keys keep the order
//! in which they were first seen; nothing is sorted.

use serde::{Deserialize, Serialize};

use crate::metrics::elapsed_time;
use crate::trial::TrialResult;

/// Items sharing one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyGroup<T> {
    pub difficulty: String,
    pub items: Vec<T>,
}

/// All difficulties for one algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmGroup<T> {
    pub algorithm: String,
    pub difficulties: Vec<DifficultyGroup<T>>,
}

/// Two-level grouping `algorithm -> difficulty -> items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedTrials<T> {
    pub algorithms: Vec<AlgorithmGroup<T>>,
}

impl<T> Default for GroupedTrials<T> {
    fn default() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }
}

impl<T> GroupedTrials<T> {
    /// Group `items` using `key` to extract `(algorithm, difficulty)`
    pub fn from_items<I, F>(items: I, key: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> (String, String),
    {
        let mut grouped = Self::default();
        for item in items {
            let (algorithm, difficulty) = key(&item);
            grouped.push(algorithm, difficulty, item);
        }
        grouped
    }

    fn push(&mut self, algorithm: String, difficulty: String, item: T) {
        let a = match self.algorithms.iter().position(|g| g.algorithm == algorithm) {
            Some(a) => a,
            None => {
                self.algorithms.push(AlgorithmGroup {
                    algorithm,
                    difficulties: Vec::new(),
                });
                self.algorithms.len() - 1
            }
        };
        let difficulties = &mut self.algorithms[a].difficulties;
        let d = match difficulties.iter().position(|g| g.difficulty == difficulty) {
            Some(d) => d,
            None => {
                difficulties.push(DifficultyGroup {
                    difficulty,
                    items: Vec::new(),
                });
                difficulties.len() - 1
            }
        };
        difficulties[d].items.push(item);
    }

    /// Look up the items for one algorithm/difficulty pair
    pub fn get(&self, algorithm: &str, difficulty: &str) -> Option<&[T]> {
        self.algorithms
            .iter()
            .find(|g| g.algorithm == algorithm)?
            .difficulties
            .iter()
            .find(|g| g.difficulty == difficulty)
            .map(|g| g.items.as_slice())
    }

    /// Iterate `(algorithm, difficulty, items)` in group order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[T])> {
        self.algorithms.iter().flat_map(|a| {
            a.difficulties
                .iter()
                .map(move |d| (a.algorithm.as_str(), d.difficulty.as_str(), d.items.as_slice()))
        })
    }

    /// Same shape with every item transformed
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> GroupedTrials<U> {
        GroupedTrials {
            algorithms: self
                .algorithms
                .iter()
                .map(|a| AlgorithmGroup {
                    algorithm: a.algorithm.clone(),
                    difficulties: a
                        .difficulties
                        .iter()
                        .map(|d| DifficultyGroup {
                            difficulty: d.difficulty.clone(),
                            items: d.items.iter().map(&mut f).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Total item count
    pub fn len(&self) -> usize {
        self.iter().map(|(_, _, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group decoded trials by their metadata
pub fn group_results<I: IntoIterator<Item = TrialResult>>(results: I) -> GroupedTrials<TrialResult> {
    GroupedTrials::from_items(results, |r| {
        (r.metadata.algorithm.clone(), r.metadata.difficulty.clone())
    })
}

/// Elapsed times per `"<algorithm> - <difficulty>"` label, in group order
pub fn time_comparison(groups: &GroupedTrials<TrialResult>) -> Vec<(String, Vec<f64>)> {
    groups
        .iter()
        .map(|(algorithm, difficulty, trials)| {
            (
                format!("{} - {}", algorithm, difficulty),
                trials.iter().map(|t| elapsed_time(&t.pose_samples)).collect(),
            )
        })
        .collect()
}
