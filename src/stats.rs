use crate::models::RawRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one indicator across countries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub indicator_id: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute per-indicator statistics over table rows.
pub fn indicator_summary(rows: &[RawRow], indexes: &[String]) -> Vec<Summary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<&str, usize> = BTreeMap::new();
    for index in indexes {
        groups.entry(index).or_default();
        missing.entry(index).or_default();
    }
    for row in rows {
        for index in indexes {
            match row.value(index) {
                Some(v) => groups.entry(index).or_default().push(v),
                None => *missing.entry(index).or_default() += 1,
            }
        }
    }

    let mut out = Vec::new();
    for (index, mut vals) in groups {
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.get(index).cloned().unwrap_or(0);
        out.push(Summary {
            indicator_id: index.to_string(),
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
