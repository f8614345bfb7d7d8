//! Ensemble forecasts: one value per case, target and member.

use crate::error::IoError;
use crate::matrix::Matrix;

/// A 3D array of ensemble member predictions with shape
/// `(n_cases, n_targets, n_members)`.
///
/// Stored case-major, then target, then member, so the members for one
/// `(case, target)` cell are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    n_cases: usize,
    n_targets: usize,
    n_members: usize,
    data: Vec<f64>,
}

impl Ensemble {
    /// Creates an ensemble from flat data in `(case, target, member)` order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if the data length does not
    /// match the shape.
    pub fn new(
        n_cases: usize,
        n_targets: usize,
        n_members: usize,
        data: Vec<f64>,
    ) -> Result<Self, IoError> {
        let expected = n_cases * n_targets * n_members;
        if data.len() != expected {
            return Err(IoError::DimensionMismatch {
                name: "ensemble data".to_string(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            n_cases,
            n_targets,
            n_members,
            data,
        })
    }

    /// Stacks per-member prediction matrices (each `n_cases × n_targets`)
    /// along a trailing member axis.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `members` is empty, or
    /// [`IoError::DimensionMismatch`] if member shapes differ.
    pub fn from_members(members: &[Matrix]) -> Result<Self, IoError> {
        let Some(first) = members.first() else {
            return Err(IoError::Validation {
                count: 1,
                details: "ensemble needs at least one member".to_string(),
            });
        };
        let (n_cases, n_targets) = first.shape();
        for m in members {
            if m.shape() != (n_cases, n_targets) {
                return Err(IoError::DimensionMismatch {
                    name: "ensemble member".to_string(),
                    expected: n_cases * n_targets,
                    got: m.n_rows() * m.n_cols(),
                });
            }
        }
        let n_members = members.len();
        let mut data = Vec::with_capacity(n_cases * n_targets * n_members);
        for c in 0..n_cases {
            for t in 0..n_targets {
                data.extend(members.iter().map(|m| m.get(c, t)));
            }
        }
        Ok(Self {
            n_cases,
            n_targets,
            n_members,
            data,
        })
    }

    /// Number of cases.
    pub fn n_cases(&self) -> usize {
        self.n_cases
    }

    /// Number of targets.
    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    /// Number of members.
    pub fn n_members(&self) -> usize {
        self.n_members
    }

    /// `(n_cases, n_targets, n_members)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_cases, self.n_targets, self.n_members)
    }

    fn offset(&self, case: usize, target: usize) -> usize {
        assert!(
            case < self.n_cases && target < self.n_targets,
            "index out of bounds"
        );
        (case * self.n_targets + target) * self.n_members
    }

    /// Member values for one `(case, target)` cell.
    pub fn members(&self, case: usize, target: usize) -> &[f64] {
        let start = self.offset(case, target);
        &self.data[start..start + self.n_members]
    }

    /// Mutable member values for one `(case, target)` cell.
    pub fn members_mut(&mut self, case: usize, target: usize) -> &mut [f64] {
        let start = self.offset(case, target);
        &mut self.data[start..start + self.n_members]
    }

    /// Mean over members, as an `n_cases × n_targets` matrix.
    pub fn mean(&self) -> Matrix {
        let mut out = Matrix::zeros(self.n_cases, self.n_targets);
        for c in 0..self.n_cases {
            for t in 0..self.n_targets {
                let m = self.members(c, t);
                let mean = if m.is_empty() {
                    f64::NAN
                } else {
                    m.iter().sum::<f64>() / m.len() as f64
                };
                out.set(c, t, mean);
            }
        }
        out
    }
}
