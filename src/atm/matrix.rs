use std::fmt::Write as _;

/// Raw perturbation hit counts between attractors.
///
/// The matrix is square; row `i` counts how often a perturbation of a state
/// inside attractor `i` landed in each destination attractor. It grows by one
/// row and one column whenever perturbation discovers a previously unseen
/// attractor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtmCounts {
    entries: Vec<Vec<u64>>,
}

impl AtmCounts {
    /// A zero matrix for `dim` attractors.
    pub fn new(dim: usize) -> AtmCounts {
        AtmCounts {
            entries: vec![vec![0; dim]; dim],
        }
    }

    /// Adopt an existing count matrix (rows must all have length
    /// `rows.len()`).
    pub fn from_rows(rows: Vec<Vec<u64>>) -> AtmCounts {
        for row in &rows {
            assert_eq!(row.len(), rows.len(), "Count matrix must be square");
        }
        AtmCounts { entries: rows }
    }

    /// The number of attractors the matrix currently covers.
    pub fn dim(&self) -> usize {
        self.entries.len()
    }

    /// The count in row `from`, column `to`.
    pub fn entry(&self, from: usize, to: usize) -> u64 {
        self.entries[from][to]
    }

    /// A copy of this matrix extended by one attractor: all existing entries
    /// are preserved and the new row and column are zero.
    ///
    /// Growth always produces a new value so that code still iterating the
    /// old dimensions keeps observing them unchanged.
    #[must_use]
    pub fn grow_by_one(&self) -> AtmCounts {
        let dim = self.dim() + 1;
        let mut entries = Vec::with_capacity(dim);
        for row in &self.entries {
            let mut grown = Vec::with_capacity(dim);
            grown.extend_from_slice(row);
            grown.push(0);
            entries.push(grown);
        }
        entries.push(vec![0; dim]);
        AtmCounts { entries }
    }

    /// Record one observed transition.
    pub fn increment(&mut self, from: usize, to: usize) {
        self.entries[from][to] += 1;
    }

    /// Normalize every row into a probability distribution, recording the
    /// per-row totals. Rows with no observed hits become the uniform
    /// distribution `1/dim`.
    pub fn normalize(&self) -> Atm {
        let dim = self.dim();
        let mut probabilities = Vec::with_capacity(dim);
        let mut row_totals = Vec::with_capacity(dim);
        for row in &self.entries {
            let total: u64 = row.iter().sum();
            let normalized = if total == 0 {
                vec![1.0 / dim as f64; dim]
            } else {
                row.iter().map(|&hits| hits as f64 / total as f64).collect()
            };
            probabilities.push(normalized);
            row_totals.push(total);
        }
        Atm {
            probabilities,
            row_totals,
        }
    }
}

/// A normalized attractor transition matrix: row `i` is the probability
/// distribution of perturbation destinations when perturbing attractor `i`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atm {
    probabilities: Vec<Vec<f64>>,
    row_totals: Vec<u64>,
}

impl Atm {
    /// The number of attractors the matrix covers.
    pub fn dim(&self) -> usize {
        self.probabilities.len()
    }

    /// All rows of the normalized matrix.
    pub fn probabilities(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    /// One row of the normalized matrix.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.probabilities[from]
    }

    /// The observed hit count behind each row (zero for rows that were
    /// normalized to the uniform distribution).
    pub fn row_totals(&self) -> &[u64] {
        &self.row_totals
    }

    /// The inverse of normalization: each row multiplied back by its recorded
    /// total. Rows whose total was zero are multiplied by the attractor count
    /// instead, so their uniform `1/dim` entries become `1.0`.
    pub fn denormalized(&self) -> Vec<Vec<f64>> {
        self.probabilities
            .iter()
            .zip(&self.row_totals)
            .map(|(row, &total)| {
                let factor = if total == 0 {
                    self.dim() as f64
                } else {
                    total as f64
                };
                row.iter().map(|value| value * factor).collect()
            })
            .collect()
    }

    /// A copy of the matrix with every entry below `delta` replaced by zero.
    /// The matrix itself is not modified.
    pub fn thresholded(&self, delta: f64) -> Vec<Vec<f64>> {
        self.probabilities
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&value| if value < delta { 0.0 } else { value })
                    .collect()
            })
            .collect()
    }

    /// The distinct positive entries of the matrix in ascending order. These
    /// are the candidate thresholds a delta search enumerates.
    pub fn distinct_positive_entries(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .probabilities
            .iter()
            .flatten()
            .copied()
            .filter(|&value| value > 0.0)
            .collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();
        values
    }

    /// Render the matrix row-major as comma-separated values, one row per
    /// line. This is the format consumed by external reporting tools.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for (position, row) in self.probabilities.iter().enumerate() {
            if position != 0 {
                out.push('\n');
            }
            for (column, value) in row.iter().enumerate() {
                if column != 0 {
                    out.push(',');
                }
                let _ = write!(out, "{value}");
            }
        }
        out
    }
}
