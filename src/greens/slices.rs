// src/greens/slices.rs
/*!
Time-resolved Green's-function storage.

- [`GreenSlices`]: `L` matrices `G_t` (shape `[L, N, N]`), one per imaginary-time slice,
  all sharing a common reference slice. This is the compact unequal-time input.
- [`GreenTensor`]: the full space-time tensor `G(t1, t2)` (shape `[L, L, N, N]`).
  `block(t1, t2)` is the propagator from slice `t2` to slice `t1`, so `block(t, 0)`
  is `G(t, 0)` and `block(0, t)` is `G(0, t)`.

Both are row-major in every axis; each `N×N` block is exposed as a [`MatrixView`].
*/

use serde::Serialize;

use super::matrix::MatrixView;
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

// ======================================================================================
// ------------------------------------ Time Slices -------------------------------------
// ======================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenSlices<T: Scalar> {
    inner: Tensor<T>,
}

impl<T: Scalar> GreenSlices<T> {
    pub fn zeros(n_slices: usize, n_sites: usize) -> Self {
        Self { inner: Tensor::new(vec![n_slices, n_sites, n_sites]) }
    }

    /// Wrap row-major `[L, N, N]` storage.
    pub fn from_vec(n_slices: usize, n_sites: usize, data: Vec<T>) -> Self {
        Self { inner: Tensor::from_vec(vec![n_slices, n_sites, n_sites], data) }
    }

    pub fn from_fn<F>(n_slices: usize, n_sites: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> T,
    {
        Self {
            inner: Tensor::from_fn(vec![n_slices, n_sites, n_sites], |idx| f(idx[0], idx[1], idx[2])),
        }
    }

    #[inline(always)]
    pub fn n_slices(&self) -> usize {
        self.inner.shape[0]
    }

    #[inline(always)]
    pub fn n_sites(&self) -> usize {
        self.inner.shape[1]
    }

    /// Matrix of slice `t`.
    #[inline]
    pub fn slice(&self, t: usize) -> MatrixView<'_, T> {
        MatrixView::new(self.n_sites(), self.inner.row(t))
    }

    #[inline(always)]
    pub fn get(&self, t: usize, row: usize, col: usize) -> T {
        self.inner.get(&[t, row, col])
    }

    #[inline(always)]
    pub fn set(&mut self, t: usize, row: usize, col: usize, val: T) {
        self.inner.set(&[t, row, col], val);
    }
}

// ======================================================================================
// -------------------------------- Full Space-Time Tensor ------------------------------
// ======================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenTensor<T: Scalar> {
    inner: Tensor<T>,
}

impl<T: Scalar> GreenTensor<T> {
    pub fn zeros(n_slices: usize, n_sites: usize) -> Self {
        Self { inner: Tensor::new(vec![n_slices, n_slices, n_sites, n_sites]) }
    }

    /// Wrap row-major `[L, L, N, N]` storage, `(t1, t2, row, col)` order.
    pub fn from_vec(n_slices: usize, n_sites: usize, data: Vec<T>) -> Self {
        Self { inner: Tensor::from_vec(vec![n_slices, n_slices, n_sites, n_sites], data) }
    }

    pub fn from_fn<F>(n_slices: usize, n_sites: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize, usize) -> T,
    {
        Self {
            inner: Tensor::from_fn(vec![n_slices, n_slices, n_sites, n_sites], |idx| {
                f(idx[0], idx[1], idx[2], idx[3])
            }),
        }
    }

    #[inline(always)]
    pub fn n_slices(&self) -> usize {
        self.inner.shape[0]
    }

    #[inline(always)]
    pub fn n_sites(&self) -> usize {
        self.inner.shape[2]
    }

    /// `G(t1, t2)` as an `N×N` view.
    #[inline]
    pub fn block(&self, t1: usize, t2: usize) -> MatrixView<'_, T> {
        let l = self.n_slices();
        assert!(t1 < l && t2 < l, "block ({t1}, {t2}) out of range for L = {l}");
        let n = self.n_sites();
        let start = (t1 * l + t2) * n * n;
        MatrixView::new(n, &self.inner.data[start..start + n * n])
    }

    #[inline(always)]
    pub fn get(&self, t1: usize, t2: usize, row: usize, col: usize) -> T {
        self.inner.get(&[t1, t2, row, col])
    }

    #[inline(always)]
    pub fn set(&mut self, t1: usize, t2: usize, row: usize, col: usize, val: T) {
        self.inner.set(&[t1, t2, row, col], val);
    }
}
