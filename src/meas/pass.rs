// src/meas/pass.rs
//! Sweeps over raw tuples for one time slice, folding each contraction into its
//! class bin. Each routine writes only to the row slices it is handed, which lets
//! the unequal-time entry points run one slice per worker.

use crate::lattice::{ClassId, ClassMap, Lattice};
use crate::math::scalar::Scalar;

use super::contract::{bond_pair, bond_site, one_site, two_site, SpinPair};
use super::nematic::NematicWick;

// ======================================================================================
// ----------------------------------------- Rows ---------------------------------------
// ======================================================================================

/// Pair-class bins of one slice.
pub(crate) struct TwoSiteRows<'a, T> {
    pub green: &'a mut [T],
    pub nn: &'a mut [T],
    pub xx: &'a mut [T],
    pub zz: &'a mut [T],
    pub pair_sw: &'a mut [T],
    /// `(vv, vn)`.
    pub energy: Option<(&'a mut [T], &'a mut [T])>,
}

/// Bond-site bins of one slice.
pub(crate) struct BondSiteRows<'a, T> {
    pub kv: &'a mut [T],
    pub kn: &'a mut [T],
}

/// Bond-pair bins of one slice. The equal-time measurement only carries `kk`.
pub(crate) struct BondPairRows<'a, T> {
    pub kk: &'a mut [T],
    pub currents: Option<CurrentRows<'a, T>>,
}

pub(crate) struct CurrentRows<'a, T> {
    pub pair_bb: &'a mut [T],
    pub jj: &'a mut [T],
    pub jsjs: &'a mut [T],
    pub ksks: &'a mut [T],
}

pub(crate) struct NematicRows<'a, T> {
    pub nnnn: &'a mut [T],
    pub ssss: &'a mut [T],
}

// ======================================================================================
// ---------------------------------------- Sweeps --------------------------------------
// ======================================================================================

/// `density`, `double_occ` over all sites.
pub(crate) fn sweep_one_site<T: Scalar>(
    lattice: &Lattice<T>,
    s: &SpinPair<'_, T>,
    phase: T,
    density: &mut [T],
    double_occ: &mut [T],
) {
    let map = lattice.sites();
    for i in 0..lattice.n_sites() {
        let r = map.get(&[i]);
        let pre = map.prefactor(phase, r);
        let (n, d) = one_site(s, i);
        density[r] += pre * n;
        double_occ[r] += pre * d;
    }
}

/// Every ordered site pair `(i, j)`.
pub(crate) fn sweep_two_site<T: Scalar>(
    lattice: &Lattice<T>,
    s: &SpinPair<'_, T>,
    phase: T,
    rows: TwoSiteRows<'_, T>,
) {
    let map = lattice.pairs();
    let peierls = lattice.peierls();
    let TwoSiteRows { green, nn, xx, zz, pair_sw, mut energy } = rows;
    for j in 0..lattice.n_sites() {
        for i in 0..lattice.n_sites() {
            let r = map.get(&[i, j]);
            let pre = map.prefactor(phase, r);
            let v = two_site(s, peierls, i, j);
            green[r] += pre * v.green;
            nn[r] += pre * v.nn;
            xx[r] += pre * v.xx;
            zz[r] += pre * v.zz;
            pair_sw[r] += pre * v.pair_sw;
            if let Some((vv, vn)) = energy.as_mut() {
                vv[r] += pre * v.vv;
                vn[r] += pre * v.vn;
            }
        }
    }
}

/// Every `(bond b, site j)`.
pub(crate) fn sweep_bond_site<T: Scalar>(
    lattice: &Lattice<T>,
    map: &ClassMap<ClassId>,
    s: &SpinPair<'_, T>,
    phase: T,
    rows: BondSiteRows<'_, T>,
) {
    let peierls = lattice.peierls();
    for j in 0..lattice.n_sites() {
        for (b, &bond) in lattice.bonds().iter().enumerate() {
            let r = map.get(&[b, j]);
            let pre = map.prefactor(phase, r);
            let (kv, kn) = bond_site(s, peierls, bond, j);
            rows.kv[r] += pre * kv;
            rows.kn[r] += pre * kn;
        }
    }
}

/// Every `(bond b, bond c)`.
pub(crate) fn sweep_bond_pair<T: Scalar>(
    lattice: &Lattice<T>,
    map: &ClassMap<ClassId>,
    s: &SpinPair<'_, T>,
    phase: T,
    rows: BondPairRows<'_, T>,
) {
    let peierls = lattice.peierls();
    let BondPairRows { kk, mut currents } = rows;
    for (c, &bond_c) in lattice.bonds().iter().enumerate() {
        for (b, &bond_b) in lattice.bonds().iter().enumerate() {
            let r = map.get(&[b, c]);
            let pre = map.prefactor(phase, r);
            let v = bond_pair(s, peierls, bond_b, bond_c);
            kk[r] += pre * v.kk;
            if let Some(cur) = currents.as_mut() {
                cur.pair_bb[r] += pre * v.pair_bb;
                cur.jj[r] += pre * v.jj;
                cur.jsjs[r] += pre * v.jsjs;
                cur.ksks[r] += pre * v.ksks;
            }
        }
    }
}

/// `(bond b, bond c)` over the first `num_bonds` bonds.
pub(crate) fn sweep_nematic<T: Scalar>(
    lattice: &Lattice<T>,
    map: &ClassMap<ClassId>,
    num_bonds: usize,
    wick: &NematicWick,
    s: &SpinPair<'_, T>,
    phase: T,
    rows: NematicRows<'_, T>,
) {
    let bonds = &lattice.bonds()[..num_bonds];
    for (c, bond_c) in bonds.iter().enumerate() {
        for (b, bond_b) in bonds.iter().enumerate() {
            let r = map.get(&[b, c]);
            let pre = map.prefactor(phase, r);
            let (nnnn, ssss) = wick.evaluate(s, [bond_b.from, bond_b.to, bond_c.from, bond_c.to]);
            rows.nnnn[r] += pre * nnnn;
            rows.ssss[r] += pre * ssss;
        }
    }
}
