// src/greens/matrix.rs
//! Square `N×N` Green's-function matrices and borrowed views into them.
//!
//! Storage is row-major: `G[row, col]` lives at `row * N + col`.

use serde::Serialize;

use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

// ======================================================================================
// ------------------------------------ Borrowed View -----------------------------------
// ======================================================================================

/// Read-only `N×N` window into any Green's-function buffer.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T: Scalar> {
    n: usize,
    data: &'a [T],
}

impl<'a, T: Scalar> MatrixView<'a, T> {
    /// # Panics
    /// Panics if `data.len() != n * n`.
    #[inline]
    pub fn new(n: usize, data: &'a [T]) -> Self {
        assert_eq!(
            data.len(),
            n * n,
            "MatrixView: expected {n}x{n} = {} entries, got {}",
            n * n,
            data.len()
        );
        Self { n, data }
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.n
    }

    /// `G[row, col]`.
    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.n && col < self.n, "({row}, {col}) outside {0}x{0}", self.n);
        self.data[row * self.n + col]
    }

    /// `G[i, i]`.
    #[inline(always)]
    pub fn diag(&self, i: usize) -> T {
        self.get(i, i)
    }
}

// ======================================================================================
// ------------------------------------ Owned Matrix ------------------------------------
// ======================================================================================

/// Owned equal-time Green's function of one spin species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenMatrix<T: Scalar> {
    inner: Tensor<T>,
}

impl<T: Scalar> GreenMatrix<T> {
    /// Zero matrix of side `n`.
    pub fn zeros(n: usize) -> Self {
        Self { inner: Tensor::new(vec![n, n]) }
    }

    /// `n×n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, |r, c| T::delta(r == c))
    }

    /// Wrap row-major storage of length `n*n`.
    pub fn from_vec(n: usize, data: Vec<T>) -> Self {
        Self { inner: Tensor::from_vec(vec![n, n], data) }
    }

    pub fn from_fn<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        Self { inner: Tensor::from_fn(vec![n, n], |idx| f(idx[0], idx[1])) }
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.inner.shape[0]
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.inner.get(&[row, col])
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, val: T) {
        self.inner.set(&[row, col], val);
    }

    #[inline]
    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView::new(self.n(), &self.inner.data)
    }
}
