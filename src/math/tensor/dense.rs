// src/math/tensor/dense.rs
/*!
Row-major N-dimensional dense storage backed by a flat `Vec<T>`.

Used for every accumulator and every Green's-function buffer in the crate.

# Highlights

- `Tensor<T>::new(shape)`: zero-initialized tensor of shape `shape`.
- `Tensor<T>::from_vec(shape, data)` / `from_fn(shape, f)`: checked construction.
- `index`, `get`, `set`: multi-index access, **bounds-checked** on every axis.
- `rows_mut()`: split the leading axis into disjoint mutable rows (one per time slice),
  the unit of parallel work in the unequal-time measurements.
- `par_fill`, `par_zip_with_inplace`: parallel in-place transforms.
- `AddAssign<&Tensor>`: parallel elementwise merge with shape check.

> **Semantics**
> - Row-major (C-style) linearization: the last axis is contiguous.
> - Out-of-range or rank-mismatched indices **panic** with the offending index and shape.
>   Indices never wrap.
*/

use std::ops::AddAssign;

use rayon::prelude::*;
use serde::Serialize;

use super::super::scalar::Scalar;

//===================================================================
// -------------------------- Basic Struct --------------------------
//===================================================================

/// A dense N-D tensor with row-major (C-style) linearization.
///
/// # Invariants
/// - `data.len() == shape.iter().product()`.
/// - Every extent is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor<T: Scalar> {
    /// The extents along each axis. Example: `[rows, cols]` for 2D.
    pub shape: Vec<usize>,
    /// Flat, row-major storage of all elements.
    pub data: Vec<T>,
}

impl<T: Scalar> Tensor<T> {
    /// Create a new tensor with the given `shape`, filled with zeros.
    ///
    /// # Panics
    /// Panics if `shape` is empty or contains a zero dimension.
    #[inline]
    pub fn new(shape: Vec<usize>) -> Self {
        assert_valid_shape(&shape);
        let size = shape.iter().product::<usize>();
        Self {
            shape,
            data: vec![T::zero(); size],
        }
    }

    /// Wrap existing row-major storage.
    ///
    /// # Panics
    /// Panics if `data.len()` differs from the product of `shape`.
    #[inline]
    pub fn from_vec(shape: Vec<usize>, data: Vec<T>) -> Self {
        assert_valid_shape(&shape);
        let size = shape.iter().product::<usize>();
        assert_eq!(
            data.len(),
            size,
            "Tensor data length {} does not match shape {shape:?} (expected {size})",
            data.len()
        );
        Self { shape, data }
    }

    /// Build by evaluating `f` at every multi-index, in row-major order.
    pub fn from_fn<F>(shape: Vec<usize>, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        assert_valid_shape(&shape);
        let size = shape.iter().product::<usize>();
        let mut idx = vec![0usize; shape.len()];
        let mut data = Vec::with_capacity(size);
        for _ in 0..size {
            data.push(f(&idx));
            // odometer increment, last axis fastest
            for ax in (0..shape.len()).rev() {
                idx[ax] += 1;
                if idx[ax] < shape[ax] {
                    break;
                }
                idx[ax] = 0;
            }
        }
        Self { shape, data }
    }

    #[inline(always)]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[inline]
fn assert_valid_shape(shape: &[usize]) {
    assert!(!shape.is_empty(), "Tensor rank must be > 0");
    assert!(
        shape.iter().all(|&d| d > 0),
        "All dimensions must be > 0; got {shape:?}"
    );
}

//===================================================================
// ------------------------- Index Helpers --------------------------
//===================================================================

/// Row-major flat offset of `indices` inside `shape`.
///
/// # Panics
/// Panics on rank mismatch or when any axis index is out of range.
#[inline(always)]
pub fn row_major_offset(shape: &[usize], indices: &[usize]) -> usize {
    assert_eq!(
        indices.len(),
        shape.len(),
        "Index rank mismatch: got {indices:?} for shape {shape:?}"
    );
    let mut flat = 0usize;
    for (&dim, &a) in shape.iter().zip(indices.iter()) {
        assert!(a < dim, "Index {indices:?} out of range for shape {shape:?}");
        flat = flat * dim + a;
    }
    flat
}

//===================================================================
// ----------------------- Multi-index Access -----------------------
//===================================================================

impl<T: Scalar> Tensor<T> {
    /// Row-major linearization with per-axis bounds checks.
    #[inline(always)]
    pub fn index(&self, indices: &[usize]) -> usize {
        row_major_offset(&self.shape, indices)
    }

    #[inline(always)]
    pub fn get(&self, indices: &[usize]) -> T {
        self.data[self.index(indices)]
    }

    #[inline(always)]
    pub fn set(&mut self, indices: &[usize], val: T) {
        let k = self.index(indices);
        self.data[k] = val;
    }

    /// Length of one slab along the leading axis.
    #[inline(always)]
    pub fn row_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Immutable view of the `r`-th slab along the leading axis.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        assert!(r < self.shape[0], "Row {r} out of range for shape {:?}", self.shape);
        let w = self.row_len();
        &self.data[r * w..(r + 1) * w]
    }

    /// Disjoint mutable slabs along the leading axis.
    #[inline]
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, T> {
        let w = self.row_len();
        self.data.chunks_mut(w)
    }
}

//===================================================================
// ------------------------ Parallel Transforms ---------------------
//===================================================================

impl<T: Scalar> Tensor<T> {
    /// Parallel fill with a constant value.
    #[inline]
    pub fn par_fill(&mut self, value: T) {
        self.data.par_iter_mut().for_each(|x| *x = value);
    }

    /// Parallel in-place zip with another tensor of the same shape.
    ///
    /// # Panics
    /// Panics on shape mismatch.
    #[inline]
    pub fn par_zip_with_inplace<F>(&mut self, other: &Tensor<T>, f: F)
    where
        F: Fn(T, T) -> T + Sync + Send,
    {
        assert_eq!(self.shape, other.shape, "Tensor shape mismatch");
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, &b)| *a = f(*a, b));
    }
}

//===================================================================
// ------------------------- Arithmetic Ops -------------------------
//===================================================================

impl<T: Scalar> AddAssign<&Tensor<T>> for Tensor<T> {
    /// Parallel elementwise accumulation with shape check.
    #[inline]
    fn add_assign(&mut self, rhs: &Tensor<T>) {
        self.par_zip_with_inplace(rhs, |a, b| a + b);
    }
}
