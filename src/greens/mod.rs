// src/greens/mod.rs
/*!
Green's-function inputs, one spin species at a time.

Every correlator for a time displacement `t` needs four propagators of each spin:

| name  | meaning   | used as              |
|-------|-----------|----------------------|
| `g0t` | `G(0, t)` | contraction `j → i`  |
| `gtt` | `G(t, t)` | equal-time at `i`    |
| `gt0` | `G(t, 0)` | contraction `i → j`  |
| `g00` | `G(0, 0)` | equal-time at `j`    |

where operators labelled `i` sit at slice `t` and operators labelled `j` at slice 0.
[`TimeDisplaced`] abstracts over where these come from: the compact input
([`SpinSlices`], reference slice fixed at 0) or the full space-time tensor
([`GreenTensor`]). The equal-time measurement uses [`Propagators::equal_time`], which
points all four at the same matrix.
*/

pub mod matrix;
pub mod slices;

pub use matrix::{GreenMatrix, MatrixView};
pub use slices::{GreenSlices, GreenTensor};

use crate::math::scalar::Scalar;

// ======================================================================================
// ----------------------------------- Propagator Set -----------------------------------
// ======================================================================================

/// The four `N×N` propagators of one spin species for one displacement.
#[derive(Debug, Clone, Copy)]
pub struct Propagators<'a, T: Scalar> {
    pub g0t: MatrixView<'a, T>,
    pub gtt: MatrixView<'a, T>,
    pub gt0: MatrixView<'a, T>,
    pub g00: MatrixView<'a, T>,
}

impl<'a, T: Scalar> Propagators<'a, T> {
    /// All four propagators collapsed onto one same-time matrix.
    #[inline]
    pub fn equal_time(g: MatrixView<'a, T>) -> Self {
        Self { g0t: g, gtt: g, gt0: g, g00: g }
    }

    #[inline(always)]
    pub fn n(&self) -> usize {
        self.gtt.n()
    }
}

// ======================================================================================
// ------------------------------------ Source Trait ------------------------------------
// ======================================================================================

/// Anything able to hand out the propagators for each displacement `t ∈ [0, L)`.
pub trait TimeDisplaced<T: Scalar>: Sync {
    fn n_sites(&self) -> usize;
    fn n_slices(&self) -> usize;

    /// Propagators between slice 0 and slice `t`.
    fn at(&self, t: usize) -> Propagators<'_, T>;

    /// `G(0, 0)`.
    fn reference(&self) -> MatrixView<'_, T> {
        self.at(0).g00
    }
}

/// Compact unequal-time input of one spin: `G(0,t)`, `G(t,t)`, `G(t,0)` for every `t`.
///
/// `G(0, 0)` is taken from `gtt` at slice 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSlices<T: Scalar> {
    pub g0t: GreenSlices<T>,
    pub gtt: GreenSlices<T>,
    pub gt0: GreenSlices<T>,
}

impl<T: Scalar> SpinSlices<T> {
    /// # Panics
    /// Panics unless all three arrays share `[L, N, N]`.
    pub fn new(g0t: GreenSlices<T>, gtt: GreenSlices<T>, gt0: GreenSlices<T>) -> Self {
        let dims = |g: &GreenSlices<T>| (g.n_slices(), g.n_sites());
        assert!(
            dims(&g0t) == dims(&gtt) && dims(&gtt) == dims(&gt0),
            "SpinSlices: g0t {:?}, gtt {:?} and gt0 {:?} must share (L, N)",
            dims(&g0t),
            dims(&gtt),
            dims(&gt0)
        );
        Self { g0t, gtt, gt0 }
    }
}

impl<T: Scalar> TimeDisplaced<T> for SpinSlices<T> {
    #[inline]
    fn n_sites(&self) -> usize {
        self.gtt.n_sites()
    }

    #[inline]
    fn n_slices(&self) -> usize {
        self.gtt.n_slices()
    }

    #[inline]
    fn at(&self, t: usize) -> Propagators<'_, T> {
        Propagators {
            g0t: self.g0t.slice(t),
            gtt: self.gtt.slice(t),
            gt0: self.gt0.slice(t),
            g00: self.gtt.slice(0),
        }
    }
}

impl<T: Scalar> TimeDisplaced<T> for GreenTensor<T> {
    #[inline]
    fn n_sites(&self) -> usize {
        GreenTensor::n_sites(self)
    }

    #[inline]
    fn n_slices(&self) -> usize {
        GreenTensor::n_slices(self)
    }

    #[inline]
    fn at(&self, t: usize) -> Propagators<'_, T> {
        Propagators {
            g0t: self.block(0, t),
            gtt: self.block(t, t),
            gt0: self.block(t, 0),
            g00: self.block(0, 0),
        }
    }
}
