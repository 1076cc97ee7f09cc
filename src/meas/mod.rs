// src/meas/mod.rs
/*!
Measurement entry points and their accumulators.

The driver calls exactly one entry point per sampled configuration:

- [`measure_eqlt`]: one pair of equal-time matrices.
- [`measure_uneqlt`]: compact time-sliced arrays.
- [`measure_uneqlt_full`]: full space-time tensors (adds the three-current correlators).

Each call adds one sample: `n_sample += 1`, `sign += phase`, and every enabled bin
receives `phase / degeneracy(class) * value` for each raw tuple of its class.
*/

pub mod accum;
pub mod contract;
pub mod current3;
pub mod eqlt;
pub mod nematic;
mod pass;
pub mod uneqlt;

pub use accum::{BondCorr, EqltEnergy, EqltMeas, NematicCorr, UneqltEnergy, UneqltMeas};
pub use current3::{three_current, TripleSlices};
pub use eqlt::measure_eqlt;
pub use nematic::NematicWick;
pub use uneqlt::{measure_uneqlt, measure_uneqlt_full};
