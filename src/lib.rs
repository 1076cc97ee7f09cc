// src/lib.rs
/*!
Observable accumulation for determinant quantum Monte Carlo.

Given the single-particle Green's functions of one sampled configuration, the
`meas` entry points evaluate the Wick contractions of a fixed family of
correlators, reduce them onto lattice symmetry classes and fold them into
running accumulators weighted by the configuration's phase.

# Layout

- [`math`]: the `Scalar` numeric policy (real or complex) and a dense row-major tensor.
- [`greens`]: equal-time matrices, compact time-sliced arrays and the full space-time tensor.
- [`lattice`]: bonds, class maps with degeneracies, Peierls phases, the three-current
  time kernel and measurement flags.
- [`meas`]: accumulators and the equal-time / unequal-time entry points.
*/

pub mod greens;
pub mod lattice;
pub mod math;
pub mod meas;

pub use greens::{GreenMatrix, GreenSlices, GreenTensor, SpinSlices, TimeDisplaced};
pub use lattice::{Bond, ClassId, ClassMap, Lattice, LatticeBuilder, MeasFlags, Peierls, TableError, TimeKernel};
pub use math::scalar::Scalar;
pub use math::tensor::dense::Tensor;
pub use meas::accum::{EqltMeas, UneqltMeas};
pub use meas::{measure_eqlt, measure_uneqlt, measure_uneqlt_full};

#[cfg(test)]
mod tests;
