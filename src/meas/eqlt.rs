// src/meas/eqlt.rs
//! Equal-time measurement of one configuration.

use tracing::{trace, trace_span};

use crate::greens::{GreenMatrix, Propagators};
use crate::lattice::Lattice;
use crate::math::scalar::Scalar;

use super::accum::{family, EqltMeas};
use super::contract::SpinPair;
use super::pass::{sweep_bond_pair, sweep_bond_site, sweep_one_site, sweep_two_site, BondPairRows, BondSiteRows, TwoSiteRows};

/// Fold the equal-time Green's functions `gu`, `gd` of one configuration with
/// Monte Carlo phase `phase` into `m`.
///
/// Runs single-threaded: its cost is dwarfed by the unequal-time measurements.
///
/// # Panics
/// Panics if the matrices are not `N×N` or `m` was allocated for another lattice.
pub fn measure_eqlt<T: Scalar>(
    lattice: &Lattice<T>,
    phase: T,
    gu: &GreenMatrix<T>,
    gd: &GreenMatrix<T>,
    m: &mut EqltMeas<T>,
) {
    let _span = trace_span!("measure_eqlt", n_sample = m.n_sample).entered();
    let n = lattice.n_sites();
    assert!(
        gu.n() == n && gd.n() == n,
        "equal-time Green's functions are {}x{} / {}x{}, lattice has N = {n}",
        gu.n(),
        gu.n(),
        gd.n(),
        gd.n()
    );
    m.assert_fits(lattice);

    m.n_sample += 1;
    m.sign += phase;

    let s = SpinPair::new(Propagators::equal_time(gu.view()), Propagators::equal_time(gd.view()), true);

    sweep_one_site(lattice, &s, phase, &mut m.density.data, &mut m.double_occ.data);

    let energy = family("energy", lattice.energy_maps().is_some(), &mut m.energy);
    let (vv_vn, rest) = match energy {
        Some(e) => (Some((&mut e.vv.data[..], &mut e.vn.data[..])), Some((&mut e.kv, &mut e.kn, &mut e.kk))),
        None => (None, None),
    };
    sweep_two_site(
        lattice,
        &s,
        phase,
        TwoSiteRows {
            green: &mut m.g00.data,
            nn: &mut m.nn.data,
            xx: &mut m.xx.data,
            zz: &mut m.zz.data,
            pair_sw: &mut m.pair_sw.data,
            energy: vv_vn,
        },
    );
    trace!("two-site correlators done");

    if let (Some((kv, kn, kk)), Some((bs, bb))) = (rest, lattice.energy_maps()) {
        sweep_bond_site(lattice, bs, &s, phase, BondSiteRows { kv: &mut kv.data, kn: &mut kn.data });
        sweep_bond_pair(lattice, bb, &s, phase, BondPairRows { kk: &mut kk.data, currents: None });
        trace!("bond energy correlators done");
    }
}
