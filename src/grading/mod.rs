//! Grade aggregation.
//!
//! Pure functions over `(value, weight)` pairs: weighted averages, class
//! ranking and descriptive statistics. Nothing here touches storage.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Weighted average `Σ(value·weight) / Σweight`.
///
/// Returns `0.0` for an empty slice or when the weights do not sum to a
/// positive number.
pub fn weighted_average(grades: &[(i32, f64)]) -> f64 {
    let (weighted_sum, total_weight) = grades
        .iter()
        .fold((0.0, 0.0), |(sum, total), &(value, weight)| {
            (sum + f64::from(value) * weight, total + weight)
        });

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

/// Groups `(key, value, weight)` rows and computes a weighted average per key.
///
/// The result is ordered by key.
pub fn averages_by_key<K, I>(rows: I) -> Vec<(K, f64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, i32, f64)>,
{
    let mut groups: BTreeMap<K, Vec<(i32, f64)>> = BTreeMap::new();
    for (key, value, weight) in rows {
        groups.entry(key).or_default().push((value, weight));
    }

    groups
        .into_iter()
        .map(|(key, grades)| {
            let average = weighted_average(&grades);
            (key, average)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedStudent {
    pub student_id: i64,
    pub average: f64,
    /// 1-based
    pub position: usize,
}

/// Ranks students by descending average.
///
/// The sort is stable, so students with equal averages keep their input
/// order and still get distinct positions.
pub fn rank(averages: &[(i64, f64)]) -> Vec<RankedStudent> {
    let mut sorted = averages.to_vec();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, (student_id, average))| RankedStudent {
            student_id,
            average,
            position: index + 1,
        })
        .collect()
}

pub fn position_of(ranking: &[RankedStudent], student_id: i64) -> Option<usize> {
    ranking
        .iter()
        .find(|entry| entry.student_id == student_id)
        .map(|entry| entry.position)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticsError {
    /// No grades to describe
    Empty,
    /// Several values share the highest frequency
    NoUniqueMode { candidates: usize },
}

impl fmt::Display for StatisticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticsError::Empty => write!(f, "no grades to describe"),
            StatisticsError::NoUniqueMode { candidates } => write!(
                f,
                "no unique mode; found {candidates} equally common values"
            ),
        }
    }
}

impl std::error::Error for StatisticsError {}

pub fn median(values: &[i32]) -> Result<f64, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::Empty);
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        Ok(f64::from(sorted[n / 2]))
    } else {
        Ok((f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0)
    }
}

/// The single most frequent value.
pub fn mode(values: &[i32]) -> Result<i32, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::Empty);
    }

    let mut counts: HashMap<i32, usize> = HashMap::new();
    for &value in values {
        *counts.entry(value).or_default() += 1;
    }

    let highest = counts.values().copied().max().unwrap_or(0);
    let mut winners: Vec<i32> = counts
        .into_iter()
        .filter(|&(_, count)| count == highest)
        .map(|(value, _)| value)
        .collect();

    match winners.len() {
        1 => Ok(winners.remove(0)),
        candidates => Err(StatisticsError::NoUniqueMode { candidates }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassStatistics {
    pub median: Result<f64, StatisticsError>,
    pub mode: Result<i32, StatisticsError>,
}

pub fn class_statistics(values: &[i32]) -> ClassStatistics {
    ClassStatistics {
        median: median(values),
        mode: mode(values),
    }
}
