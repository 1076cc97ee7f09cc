// src/meas/uneqlt.rs
/*!
Unequal-time (time-displaced) measurement of one configuration.

Two entry points share one driver, generic over [`TimeDisplaced`]:

- [`measure_uneqlt`]: compact input, three `[L, N, N]` arrays per spin.
- [`measure_uneqlt_full`]: full `[L, L, N, N]` space-time tensor per spin; the only
  input with enough time pairs for the three-current correlators.

# Parallelism
Every per-time accumulator is split into its `L` rows up front; slice `t` is processed
by one rayon task that owns row `t` of every bin it writes, so no two tasks touch
the same memory. `n_sample` and `sign` are updated once, before the parallel region.

# Time-zero contact terms
At `t = 0` the operators at `i` and `j` share a slice and the same-site deltas of the
Wick expansion survive. Bond-pair and nematic correlators evaluate that slice on the
reference matrix `G(0, 0)` alone; for `t > 0` they use the displaced propagators with
every cross delta zero.
*/

use rayon::prelude::*;
use tracing::{trace, trace_span};

use crate::greens::{GreenTensor, Propagators, SpinSlices, TimeDisplaced};
use crate::lattice::Lattice;
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

use super::accum::{family, UneqltMeas};
use super::contract::SpinPair;
use super::current3;
use super::nematic::NematicWick;
use super::pass::{
    sweep_bond_pair, sweep_bond_site, sweep_nematic, sweep_two_site, BondPairRows, BondSiteRows, CurrentRows,
    NematicRows, TwoSiteRows,
};

/// Compact unequal-time measurement.
///
/// `up` / `dn` hold `G(0,t)`, `G(t,t)`, `G(t,0)` for every slice `t`, with slice 0 as
/// the common reference. Three-current bins, if allocated, are left untouched.
///
/// # Panics
/// Panics if the inputs are not `[L, N, N]` or `m` was allocated for another lattice.
pub fn measure_uneqlt<T: Scalar>(
    lattice: &Lattice<T>,
    phase: T,
    up: &SpinSlices<T>,
    dn: &SpinSlices<T>,
    m: &mut UneqltMeas<T>,
) {
    let _span = trace_span!("measure_uneqlt", n_sample = m.n_sample).entered();
    measure_displaced(lattice, phase, up, dn, m);
    if lattice.triple_map().is_some() || lattice.triple_map_limited().is_some() {
        trace!("three-current correlators need the full space-time tensor; skipped");
    }
}

/// Unequal-time measurement from the full space-time tensors `G(t1, t2)`,
/// including the three-current correlators `jjj` / `jjj_l` when enabled.
///
/// # Panics
/// Panics if the inputs are not `[L, L, N, N]` or `m` was allocated for another lattice.
pub fn measure_uneqlt_full<T: Scalar>(
    lattice: &Lattice<T>,
    phase: T,
    gu: &GreenTensor<T>,
    gd: &GreenTensor<T>,
    m: &mut UneqltMeas<T>,
) {
    let _span = trace_span!("measure_uneqlt_full", n_sample = m.n_sample).entered();
    measure_displaced(lattice, phase, gu, gd, m);

    let bonds = lattice.bonds();
    let triples = lattice.triple_map();
    if let (Some(out), Some((map, kernel))) = (family("jjj", triples.is_some(), &mut m.jjj), triples) {
        current3::accumulate(bonds, map, kernel, phase, gu, gd, out);
        trace!("three-current correlators done");
    }
    let limited = lattice.triple_map_limited();
    if let (Some(out), Some((map, kernel))) = (family("jjj_l", limited.is_some(), &mut m.jjj_l), limited) {
        current3::accumulate(bonds, map, kernel, phase, gu, gd, out);
        trace!("limited three-current correlators done");
    }
}

// ======================================================================================
// ----------------------------------- Shared Driver ------------------------------------
// ======================================================================================

fn check_input<T: Scalar, G: TimeDisplaced<T>>(lattice: &Lattice<T>, spin: &str, g: &G) {
    assert!(
        g.n_sites() == lattice.n_sites() && g.n_slices() == lattice.n_slices(),
        "{spin} Green's functions cover N = {}, L = {}; lattice has N = {}, L = {}",
        g.n_sites(),
        g.n_slices(),
        lattice.n_sites(),
        lattice.n_slices()
    );
}

/// Rows `t` of two bins, or `L` empty slots.
fn paired_rows<'a, T: Scalar>(
    n_slices: usize,
    bins: Option<(&'a mut Tensor<T>, &'a mut Tensor<T>)>,
) -> Vec<Option<(&'a mut [T], &'a mut [T])>> {
    match bins {
        Some((a, b)) => a.rows_mut().zip(b.rows_mut()).map(Some).collect(),
        None => (0..n_slices).map(|_| None).collect(),
    }
}

fn measure_displaced<T: Scalar, G: TimeDisplaced<T>>(
    lattice: &Lattice<T>,
    phase: T,
    up: &G,
    dn: &G,
    m: &mut UneqltMeas<T>,
) {
    check_input(lattice, "spin-up", up);
    check_input(lattice, "spin-down", dn);
    m.assert_fits(lattice);

    m.n_sample += 1;
    m.sign += phase;

    let l = lattice.n_slices();
    let displaced = |t: usize| SpinPair::new(up.at(t), dn.at(t), t == 0);
    let reference = || {
        SpinPair::new(
            Propagators::equal_time(up.reference()),
            Propagators::equal_time(dn.reference()),
            true,
        )
    };

    // ------------------------ two sites ------------------------
    let energy = family("energy", lattice.energy_maps().is_some(), &mut m.energy);
    let (vv_vn, kv_kn) = match energy {
        Some(e) => (Some((&mut e.vv, &mut e.vn)), Some((&mut e.kv, &mut e.kn))),
        None => (None, None),
    };
    let rows: Vec<TwoSiteRows<'_, T>> = m
        .gt0
        .rows_mut()
        .zip(m.nn.rows_mut())
        .zip(m.xx.rows_mut())
        .zip(m.zz.rows_mut())
        .zip(m.pair_sw.rows_mut())
        .zip(paired_rows(l, vv_vn))
        .map(|(((((green, nn), xx), zz), pair_sw), energy)| TwoSiteRows { green, nn, xx, zz, pair_sw, energy })
        .collect();
    rows.into_par_iter()
        .enumerate()
        .for_each(|(t, rows)| sweep_two_site(lattice, &displaced(t), phase, rows));
    trace!("two-site correlators done");

    // ---------------------- bond - site ------------------------
    if let (Some((kv, kn)), Some((bs, _))) = (kv_kn, lattice.energy_maps()) {
        kv.rows_mut()
            .zip(kn.rows_mut())
            .collect::<Vec<_>>()
            .into_par_iter()
            .enumerate()
            .for_each(|(t, (kv, kn))| {
                sweep_bond_site(lattice, bs, &displaced(t), phase, BondSiteRows { kv, kn });
            });
        trace!("bond-site correlators done");
    }

    // ---------------------- bond - bond ------------------------
    let bond = family("bond", lattice.bond_map().is_some(), &mut m.bond);
    if let (Some(b), Some(bb)) = (bond, lattice.bond_map()) {
        let rows: Vec<BondPairRows<'_, T>> = b
            .kk
            .rows_mut()
            .zip(b.pair_bb.rows_mut())
            .zip(b.jj.rows_mut())
            .zip(b.jsjs.rows_mut())
            .zip(b.ksks.rows_mut())
            .map(|((((kk, pair_bb), jj), jsjs), ksks)| BondPairRows {
                kk,
                currents: Some(CurrentRows { pair_bb, jj, jsjs, ksks }),
            })
            .collect();
        rows.into_par_iter().enumerate().for_each(|(t, rows)| {
            let s = if t == 0 { reference() } else { displaced(t) };
            sweep_bond_pair(lattice, bb, &s, phase, rows);
        });
        trace!("bond-bond correlators done");
    }

    // ------------------------ nematic --------------------------
    let nematic = family("nematic", lattice.nematic_map().is_some(), &mut m.nematic);
    if let (Some(nem), Some((bb, num_bonds))) = (nematic, lattice.nematic_map()) {
        let wick = NematicWick::new();
        nem.nem_nnnn
            .rows_mut()
            .zip(nem.nem_ssss.rows_mut())
            .collect::<Vec<_>>()
            .into_par_iter()
            .enumerate()
            .for_each(|(t, (nnnn, ssss))| {
                let s = if t == 0 { reference() } else { displaced(t) };
                sweep_nematic(lattice, bb, num_bonds, &wick, &s, phase, NematicRows { nnnn, ssss });
            });
        trace!("nematic correlators done");
    }
}
