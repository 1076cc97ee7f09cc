//! Peierls (gauge) phases per directed site pair.
//!
//! A Green's-function entry `G(a, b)` entering a bond observable is always multiplied
//! by the phase of the reversed pair `(b, a)`. Without applied flux every phase is 1
//! and [`Peierls::Uniform`] is used, so the real and the gauged run share one formula.

use serde::Serialize;

use crate::greens::GreenMatrix;
use crate::math::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Spin {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub enum Peierls<T: Scalar> {
    /// All phases equal to one.
    Uniform,
    /// `N×N` tables, `up[a, b]` is the phase of the directed pair `a → b`.
    Table { up: GreenMatrix<T>, down: GreenMatrix<T> },
}

/// Phases of one bond `i0 → i1` for one spin.
#[derive(Debug, Clone, Copy)]
pub struct BondPhase<T> {
    /// `P(i0, i1)`.
    pub fwd: T,
    /// `P(i1, i0)`.
    pub rev: T,
}

impl<T: Scalar> Peierls<T> {
    #[inline(always)]
    pub fn get(&self, spin: Spin, a: usize, b: usize) -> T {
        match self {
            Peierls::Uniform => T::one(),
            Peierls::Table { up, down } => match spin {
                Spin::Up => up.get(a, b),
                Spin::Down => down.get(a, b),
            },
        }
    }

    #[inline(always)]
    pub fn bond(&self, spin: Spin, from: usize, to: usize) -> BondPhase<T> {
        BondPhase { fwd: self.get(spin, from, to), rev: self.get(spin, to, from) }
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        matches!(self, Peierls::Uniform)
    }
}
