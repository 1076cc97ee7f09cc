// src/meas/contract.rs
/*!
Wick contractions of two-site, bond-site and bond-bond observables.

Operators labelled `i` (site `i`, bond `b = i0 → i1`) sit at slice `t`; operators
labelled `j` (site `j`, bond `c = j0 → j1`) sit at slice 0. With `G(a, b) = ⟨c_a c†_b⟩`
each formula below is the fully contracted expectation value, built from

- `⟨c†_a c_a⟩ = 1 − G(a, a)`,
- `⟨c†_a c_b⟩ = δ_ab − G(b, a)`, where the delta survives only for operators at the
  same time (`contact`); across different slices it is zero.

Bond terms carry the Peierls phase of the reversed pair: `G(a, b)` comes with `P(b, a)`.
The same routines serve the equal-time measurement (all propagators collapsed onto
one matrix, `contact = true`) and every slice of the unequal-time measurements.
*/

use crate::greens::Propagators;
use crate::lattice::{Bond, BondPhase, Peierls, Spin};
use crate::math::scalar::Scalar;

/// Both spin species for one displacement.
#[derive(Debug, Clone, Copy)]
pub struct SpinPair<'a, T: Scalar> {
    pub up: Propagators<'a, T>,
    pub dn: Propagators<'a, T>,
    /// Same-time deltas between the `i` and `j` operators survive.
    pub contact: bool,
}

impl<'a, T: Scalar> SpinPair<'a, T> {
    #[inline]
    pub fn new(up: Propagators<'a, T>, dn: Propagators<'a, T>, contact: bool) -> Self {
        Self { up, dn, contact }
    }

    /// Kronecker delta between an `i` site and a `j` site.
    #[inline(always)]
    fn delta(&self, a: usize, b: usize) -> T {
        T::delta(self.contact && a == b)
    }
}

// ======================================================================================
// -------------------------------------- One Site --------------------------------------
// ======================================================================================

/// `(density, double_occ)` at site `i` of an equal-time matrix pair.
#[inline(always)]
pub fn one_site<T: Scalar>(s: &SpinPair<'_, T>, i: usize) -> (T, T) {
    let one = T::one();
    let guii = s.up.gtt.diag(i);
    let gdii = s.dn.gtt.diag(i);
    (one + one - guii - gdii, (one - guii) * (one - gdii))
}

// ======================================================================================
// -------------------------------------- Two Sites -------------------------------------
// ======================================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TwoSite<T> {
    /// Spin-averaged, gauge-corrected `G(i, j)`.
    pub green: T,
    pub nn: T,
    pub xx: T,
    pub zz: T,
    pub pair_sw: T,
    pub vv: T,
    pub vn: T,
}

pub fn two_site<T: Scalar>(s: &SpinPair<'_, T>, peierls: &Peierls<T>, i: usize, j: usize) -> TwoSite<T> {
    let one = T::one();
    let two = one + one;
    let half = T::from_f64(0.5);
    let quarter = T::from_f64(0.25);
    let delta = s.delta(i, j);

    let (u, d) = (&s.up, &s.dn);
    let guii = u.gtt.diag(i);
    let guij = u.gt0.get(i, j);
    let guji = u.g0t.get(j, i);
    let gujj = u.g00.diag(j);
    let gdii = d.gtt.diag(i);
    let gdij = d.gt0.get(i, j);
    let gdji = d.g0t.get(j, i);
    let gdjj = d.g00.diag(j);

    let green = half * (guij * peierls.get(Spin::Up, j, i) + gdij * peierls.get(Spin::Down, j, i));
    let x = delta * (guii + gdii) - (guji * guij + gdji * gdij);
    let nn = (two - guii - gdii) * (two - gujj - gdjj) + x;
    let xx = quarter * (delta * (guii + gdii) - (guji * gdij + gdji * guij));
    let zz = quarter * ((gdii - guii) * (gdjj - gujj) + x);
    let pair_sw = guij * gdij;

    let nuinuj = (one - guii) * (one - gujj) + (delta - guji) * guij;
    let ndindj = (one - gdii) * (one - gdjj) + (delta - gdji) * gdij;
    let vv = nuinuj * ndindj;
    let vn = nuinuj * (one - gdii) + (one - guii) * ndindj;

    TwoSite { green, nn, xx, zz, pair_sw, vv, vn }
}

// ======================================================================================
// ------------------------------------- Bond - Site ------------------------------------
// ======================================================================================

/// Kinetic energy of bond `b` (at `t`) against `(kv, kn)` at site `j` (at 0).
pub fn bond_site<T: Scalar>(s: &SpinPair<'_, T>, peierls: &Peierls<T>, b: Bond, j: usize) -> (T, T) {
    let one = T::one();
    let (i0, i1) = (b.from, b.to);

    // bond kinetic term and its exchange with site j, one spin
    let spin = |g: &Propagators<'_, T>, p: BondPhase<T>| {
        let k = -(p.rev * g.gtt.get(i0, i1) + p.fwd * g.gtt.get(i1, i0));
        let x = p.fwd * (s.delta(i0, j) - g.g0t.get(j, i0)) * g.gt0.get(i1, j)
            + p.rev * (s.delta(i1, j) - g.g0t.get(j, i1)) * g.gt0.get(i0, j);
        (k, x, g.g00.diag(j))
    };
    let (ku, xu, gujj) = spin(&s.up, peierls.bond(Spin::Up, i0, i1));
    let (kd, xd, gdjj) = spin(&s.dn, peierls.bond(Spin::Down, i0, i1));

    let kv = (ku * (one - gujj) + xu) * (one - gdjj) + (kd * (one - gdjj) + xd) * (one - gujj);
    let kn = (ku + kd) * (one + one - gujj - gdjj) + xu + xd;
    (kv, kn)
}

// ======================================================================================
// ------------------------------------- Bond - Bond ------------------------------------
// ======================================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BondPair<T> {
    pub kk: T,
    pub ksks: T,
    pub jj: T,
    pub jsjs: T,
    pub pair_bb: T,
}

/// Per-spin pieces of one bond pair.
struct BondBondSpin<T> {
    /// `P(i1,i0) G(i0,i1) ± P(i0,i1) G(i1,i0)` for bond `b`.
    kin_i: T,
    cur_i: T,
    kin_j: T,
    cur_j: T,
    /// Exchange terms pairing `i0` with `j1` and `i1` with `j0`.
    x: T,
    /// Exchange terms pairing `i0` with `j0` and `i1` with `j1`.
    y: T,
}

#[inline(always)]
fn bond_bond_spin<T: Scalar>(
    s: &SpinPair<'_, T>,
    g: &Propagators<'_, T>,
    pi: BondPhase<T>,
    pj: BondPhase<T>,
    b: Bond,
    c: Bond,
) -> BondBondSpin<T> {
    let (i0, i1, j0, j1) = (b.from, b.to, c.from, c.to);
    let gi01 = pi.rev * g.gtt.get(i0, i1);
    let gi10 = pi.fwd * g.gtt.get(i1, i0);
    let gj01 = pj.rev * g.g00.get(j0, j1);
    let gj10 = pj.fwd * g.g00.get(j1, j0);

    let x = pi.fwd * pj.fwd * (s.delta(i0, j1) - g.g0t.get(j1, i0)) * g.gt0.get(i1, j0)
        + pi.rev * pj.rev * (s.delta(i1, j0) - g.g0t.get(j0, i1)) * g.gt0.get(i0, j1);
    let y = pi.fwd * pj.rev * (s.delta(i0, j0) - g.g0t.get(j0, i0)) * g.gt0.get(i1, j1)
        + pi.rev * pj.fwd * (s.delta(i1, j1) - g.g0t.get(j1, i1)) * g.gt0.get(i0, j0);

    BondBondSpin {
        kin_i: gi01 + gi10,
        cur_i: gi01 - gi10,
        kin_j: gj01 + gj10,
        cur_j: gj01 - gj10,
        x,
        y,
    }
}

/// Kinetic, current and pair correlators between bond `b` (at `t`) and bond `c` (at 0).
pub fn bond_pair<T: Scalar>(s: &SpinPair<'_, T>, peierls: &Peierls<T>, b: Bond, c: Bond) -> BondPair<T> {
    let u = bond_bond_spin(
        s,
        &s.up,
        peierls.bond(Spin::Up, b.from, b.to),
        peierls.bond(Spin::Up, c.from, c.to),
        b,
        c,
    );
    let d = bond_bond_spin(
        s,
        &s.dn,
        peierls.bond(Spin::Down, b.from, b.to),
        peierls.bond(Spin::Down, c.from, c.to),
        b,
        c,
    );
    let x = u.x + d.x;
    let y = u.y + d.y;

    let (i0, i1, j0, j1) = (b.from, b.to, c.from, c.to);
    let (gu, gd) = (&s.up.gt0, &s.dn.gt0);
    let pair_bb = T::from_f64(0.5)
        * (gu.get(i0, j0) * gd.get(i1, j1)
            + gu.get(i1, j0) * gd.get(i0, j1)
            + gu.get(i0, j1) * gd.get(i1, j0)
            + gu.get(i1, j1) * gd.get(i0, j0));

    BondPair {
        kk: (u.kin_i + d.kin_i) * (u.kin_j + d.kin_j) + x + y,
        ksks: (u.kin_i - d.kin_i) * (u.kin_j - d.kin_j) + x + y,
        jj: (u.cur_i + d.cur_i) * (u.cur_j + d.cur_j) + x - y,
        jsjs: (u.cur_i - d.cur_i) * (u.cur_j - d.cur_j) + x - y,
        pair_bb,
    }
}
