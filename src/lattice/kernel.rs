// src/lattice/kernel.rs
/*!
Imaginary-time integration weights for the three-current correlator.

Row `r` belongs to the later time `t + dt` (or `t` for the second rotation); the
table is `L` rows wide `L + 2` columns:

- column `t` of row `t + dt`: weight of the first rotation,
- column `t + 1 + dt` of row `t`: weight of the second rotation,
- column `L + 1` of row `t + dt`: weight of the boundary rotation at `t = 0`.

A full `(L+2)×(L+2)` table is accepted as well; its extra rows are never read.
*/

use serde::Serialize;

use super::error::TableError;
use crate::math::tensor::dense::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeKernel {
    table: Tensor<f64>,
}

impl TimeKernel {
    /// Wrap a row-major `rows × cols` table.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, TableError> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(TableError::LengthMismatch {
                map: "time_kernel",
                shape: vec![rows, cols],
                actual: data.len(),
            });
        }
        Ok(Self { table: Tensor::from_vec(vec![rows, cols], data) })
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self { table: Tensor::from_fn(vec![rows, cols], |idx| f(idx[0], idx[1])) }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.table.shape[0]
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.table.shape[1]
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.table.get(&[row, col])
    }

    /// Weights `(first, second, boundary)` for the time pair `(t, t + dt)`.
    #[inline(always)]
    pub fn rotation_weights(&self, t: usize, dt: usize) -> (f64, f64, f64) {
        let boundary = self.cols() - 1;
        (
            self.get(t + dt, t),
            self.get(t, t + 1 + dt),
            self.get(t + dt, boundary),
        )
    }

    pub(crate) fn check(&self, n_slices: usize) -> Result<(), TableError> {
        let width = n_slices + 2;
        if self.rows() < n_slices || self.cols() != width {
            return Err(TableError::KernelShape {
                rows: self.rows(),
                cols: self.cols(),
                min_rows: n_slices,
                width,
            });
        }
        Ok(())
    }
}
