// src/meas/accum.rs
/*!
Running sums of every observable, one bin per symmetry class (and per time
displacement for unequal-time quantities).

Per-time observables are `[L, num_classes]` tensors, so the bin of class `r` at
displacement `t` sits at flat offset `r + num_classes * t` and every time slice is
one contiguous row. This is what lets the unequal-time passes hand out disjoint
rows to parallel workers.

Accumulators only grow during a measurement phase. `merge` folds in partial sums
(independent chains or workers) and `reset` zeroes everything at a statistics
boundary owned by the driver.
*/

use serde::Serialize;

use crate::lattice::{ClassId, ClassMap, ClassSlot, Lattice};
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

// ======================================================================================
// ---------------------------------------- Bins ----------------------------------------
// ======================================================================================

/// Elementwise accumulate / clear, implemented by every bin container.
trait Bins {
    fn absorb(&mut self, other: &Self);
    fn clear(&mut self);
}

impl<T: Scalar> Bins for Tensor<T> {
    #[inline]
    fn absorb(&mut self, other: &Self) {
        *self += other;
    }

    #[inline]
    fn clear(&mut self) {
        self.par_fill(T::zero());
    }
}

impl<B: Bins> Bins for Option<B> {
    fn absorb(&mut self, other: &Self) {
        match (self.as_mut(), other.as_ref()) {
            (Some(a), Some(b)) => a.absorb(b),
            (None, None) => {}
            _ => panic!("cannot merge accumulators built with different measurement flags"),
        }
    }

    fn clear(&mut self) {
        if let Some(b) = self.as_mut() {
            b.clear();
        }
    }
}

macro_rules! impl_bins {
    ($name:ident { $($field:ident),* $(,)? }) => {
        impl<T: Scalar> Bins for $name<T> {
            fn absorb(&mut self, other: &Self) {
                $( self.$field.absorb(&other.$field); )*
            }
            fn clear(&mut self) {
                $( self.$field.clear(); )*
            }
        }
    };
}

/// Hand out an optional family iff the lattice enables it.
///
/// # Panics
/// Panics when the accumulator was allocated under different flags.
#[inline]
pub(crate) fn family<'a, A>(name: &str, enabled: bool, slot: &'a mut Option<A>) -> Option<&'a mut A> {
    assert_eq!(
        enabled,
        slot.is_some(),
        "accumulator family `{name}` does not match the lattice flags (enabled = {enabled})"
    );
    slot.as_mut()
}

#[inline]
fn bins<T: Scalar, C: ClassSlot>(map: &ClassMap<C>) -> Tensor<T> {
    Tensor::new(vec![map.num_classes()])
}

#[inline]
fn timed_bins<T: Scalar, C: ClassSlot>(n_slices: usize, map: &ClassMap<C>) -> Tensor<T> {
    Tensor::new(vec![n_slices, map.num_classes()])
}

fn assert_bins<T: Scalar>(what: &str, bins: &Tensor<T>, expected: &[usize]) {
    assert_eq!(
        bins.shape(),
        expected,
        "accumulator `{what}` has shape {:?}, lattice requires {expected:?}",
        bins.shape()
    );
}

// ======================================================================================
// ------------------------------------- Equal Time -------------------------------------
// ======================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqltEnergy<T: Scalar> {
    /// Pair classes.
    pub vv: Tensor<T>,
    pub vn: Tensor<T>,
    /// Bond-site classes.
    pub kv: Tensor<T>,
    pub kn: Tensor<T>,
    /// Bond-pair classes.
    pub kk: Tensor<T>,
}
impl_bins!(EqltEnergy { vv, vn, kv, kn, kk });

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqltMeas<T: Scalar> {
    pub n_sample: u64,
    pub sign: T,
    /// Site classes.
    pub density: Tensor<T>,
    pub double_occ: Tensor<T>,
    /// Pair classes.
    pub g00: Tensor<T>,
    pub nn: Tensor<T>,
    pub xx: Tensor<T>,
    pub zz: Tensor<T>,
    pub pair_sw: Tensor<T>,
    pub energy: Option<EqltEnergy<T>>,
}
impl_bins!(EqltMeas { density, double_occ, g00, nn, xx, zz, pair_sw, energy });

impl<T: Scalar> EqltMeas<T> {
    /// Zeroed accumulator carrying exactly the families `lattice` enables.
    pub fn new(lattice: &Lattice<T>) -> Self {
        let pairs = lattice.pairs();
        Self {
            n_sample: 0,
            sign: T::zero(),
            density: bins(lattice.sites()),
            double_occ: bins(lattice.sites()),
            g00: bins(pairs),
            nn: bins(pairs),
            xx: bins(pairs),
            zz: bins(pairs),
            pair_sw: bins(pairs),
            energy: lattice.energy_maps().map(|(bs, bb)| EqltEnergy {
                vv: bins(pairs),
                vn: bins(pairs),
                kv: bins(bs),
                kn: bins(bs),
                kk: bins(bb),
            }),
        }
    }

    /// Add another accumulator's sums, samples and sign.
    pub fn merge(&mut self, other: &Self) {
        self.n_sample += other.n_sample;
        self.sign += other.sign;
        self.absorb(other);
    }

    pub fn reset(&mut self) {
        self.n_sample = 0;
        self.sign = T::zero();
        self.clear();
    }

    pub(crate) fn assert_fits(&self, lattice: &Lattice<T>) {
        let ni = [lattice.sites().num_classes()];
        let nij = [lattice.pairs().num_classes()];
        assert_bins("density", &self.density, &ni);
        assert_bins("double_occ", &self.double_occ, &ni);
        for (what, b) in [("g00", &self.g00), ("nn", &self.nn), ("xx", &self.xx), ("zz", &self.zz), ("pair_sw", &self.pair_sw)] {
            assert_bins(what, b, &nij);
        }
        if let (Some(e), Some((bs, bb))) = (&self.energy, lattice.energy_maps()) {
            assert_bins("vv", &e.vv, &nij);
            assert_bins("vn", &e.vn, &nij);
            assert_bins("kv", &e.kv, &[bs.num_classes()]);
            assert_bins("kn", &e.kn, &[bs.num_classes()]);
            assert_bins("kk", &e.kk, &[bb.num_classes()]);
        }
    }
}

// ======================================================================================
// ------------------------------------ Unequal Time ------------------------------------
// ======================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UneqltEnergy<T: Scalar> {
    /// `[L, pair classes]`.
    pub vv: Tensor<T>,
    pub vn: Tensor<T>,
    /// `[L, bond-site classes]`.
    pub kv: Tensor<T>,
    pub kn: Tensor<T>,
}
impl_bins!(UneqltEnergy { vv, vn, kv, kn });

/// `[L, bond-pair classes]` each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondCorr<T: Scalar> {
    pub pair_bb: Tensor<T>,
    pub jj: Tensor<T>,
    pub jsjs: Tensor<T>,
    pub kk: Tensor<T>,
    pub ksks: Tensor<T>,
}
impl_bins!(BondCorr { pair_bb, jj, jsjs, kk, ksks });

/// `[L, bond-pair classes]` each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NematicCorr<T: Scalar> {
    pub nem_nnnn: Tensor<T>,
    pub nem_ssss: Tensor<T>,
}
impl_bins!(NematicCorr { nem_nnnn, nem_ssss });

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UneqltMeas<T: Scalar> {
    pub n_sample: u64,
    pub sign: T,
    /// `[L, pair classes]`.
    pub gt0: Tensor<T>,
    pub nn: Tensor<T>,
    pub xx: Tensor<T>,
    pub zz: Tensor<T>,
    pub pair_sw: Tensor<T>,
    pub energy: Option<UneqltEnergy<T>>,
    pub bond: Option<BondCorr<T>>,
    pub nematic: Option<NematicCorr<T>>,
    /// `[L, triple classes]`.
    pub jjj: Option<Tensor<T>>,
    /// `[L, limited triple classes]`.
    pub jjj_l: Option<Tensor<T>>,
}
impl_bins!(UneqltMeas { gt0, nn, xx, zz, pair_sw, energy, bond, nematic, jjj, jjj_l });

impl<T: Scalar> UneqltMeas<T> {
    /// Zeroed accumulator carrying exactly the families `lattice` enables.
    pub fn new(lattice: &Lattice<T>) -> Self {
        let l = lattice.n_slices();
        let pairs = lattice.pairs();
        Self {
            n_sample: 0,
            sign: T::zero(),
            gt0: timed_bins(l, pairs),
            nn: timed_bins(l, pairs),
            xx: timed_bins(l, pairs),
            zz: timed_bins(l, pairs),
            pair_sw: timed_bins(l, pairs),
            energy: lattice.energy_maps().map(|(bs, _)| UneqltEnergy {
                vv: timed_bins(l, pairs),
                vn: timed_bins(l, pairs),
                kv: timed_bins(l, bs),
                kn: timed_bins(l, bs),
            }),
            bond: lattice.bond_map().map(|bb| BondCorr {
                pair_bb: timed_bins(l, bb),
                jj: timed_bins(l, bb),
                jsjs: timed_bins(l, bb),
                kk: timed_bins(l, bb),
                ksks: timed_bins(l, bb),
            }),
            nematic: lattice.nematic_map().map(|(bb, _)| NematicCorr {
                nem_nnnn: timed_bins(l, bb),
                nem_ssss: timed_bins(l, bb),
            }),
            jjj: lattice.triple_map().map(|(bbb, _)| timed_bins(l, bbb)),
            jjj_l: lattice.triple_map_limited().map(|(bbb, _)| timed_bins(l, bbb)),
        }
    }

    /// Add another accumulator's sums, samples and sign.
    pub fn merge(&mut self, other: &Self) {
        self.n_sample += other.n_sample;
        self.sign += other.sign;
        self.absorb(other);
    }

    pub fn reset(&mut self) {
        self.n_sample = 0;
        self.sign = T::zero();
        self.clear();
    }

    pub(crate) fn assert_fits(&self, lattice: &Lattice<T>) {
        let l = lattice.n_slices();
        let nij = [l, lattice.pairs().num_classes()];
        for (what, b) in [("gt0", &self.gt0), ("nn", &self.nn), ("xx", &self.xx), ("zz", &self.zz), ("pair_sw", &self.pair_sw)] {
            assert_bins(what, b, &nij);
        }
        let timed = |map: &ClassMap<ClassId>| [l, map.num_classes()];
        if let (Some(e), Some((bs, _))) = (&self.energy, lattice.energy_maps()) {
            assert_bins("vv", &e.vv, &nij);
            assert_bins("vn", &e.vn, &nij);
            assert_bins("kv", &e.kv, &timed(bs));
            assert_bins("kn", &e.kn, &timed(bs));
        }
        if let (Some(b), Some(bb)) = (&self.bond, lattice.bond_map()) {
            for (what, t) in [("pair_bb", &b.pair_bb), ("jj", &b.jj), ("jsjs", &b.jsjs), ("kk", &b.kk), ("ksks", &b.ksks)] {
                assert_bins(what, t, &timed(bb));
            }
        }
        if let (Some(nem), Some((bb, _))) = (&self.nematic, lattice.nematic_map()) {
            assert_bins("nem_nnnn", &nem.nem_nnnn, &timed(bb));
            assert_bins("nem_ssss", &nem.nem_ssss, &timed(bb));
        }
        if let (Some(j), Some((bbb, _))) = (&self.jjj, lattice.triple_map()) {
            assert_bins("jjj", j, &timed(bbb));
        }
        if let (Some(j), Some((bbb, _))) = (&self.jjj_l, lattice.triple_map_limited()) {
            assert_bins("jjj_l", j, &[l, bbb.num_classes()]);
        }
    }
}
