// src/tests/current3.rs

use rand::Rng;

use crate::greens::GreenTensor;
use crate::lattice::{Lattice, LatticeBuilder, MeasFlags, TimeKernel};
use crate::math::tensor::dense::Tensor;
use crate::meas::{measure_uneqlt_full, three_current, TripleSlices, UneqltMeas};

use super::common::{approx_eq, identity_map, random_tensor, rng, Square};

const L: usize = 3;

struct Fixture {
    sq: Square,
    gu: GreenTensor<f64>,
    gd: GreenTensor<f64>,
}

impl Fixture {
    fn new(seed: u64) -> Self {
        let sq = Square::new(2, 2);
        let mut r = rng(seed);
        let gu = random_tensor(&mut r, L, sq.n());
        let gd = random_tensor(&mut r, L, sq.n());
        Self { sq, gu, gd }
    }

    fn nb(&self) -> usize {
        self.sq.nb()
    }

    /// Every triple in its own class.
    fn lattice(&self, kernel: TimeKernel) -> Lattice<f64> {
        let nb = self.nb();
        LatticeBuilder::new(self.sq.n(), L, self.sq.bonds.clone(), self.sq.sites(), self.sq.pairs())
            .bond_triples(identity_map("bond_triples", vec![nb, nb, nb]))
            .kernel(kernel)
            .flags(MeasFlags { three_current: true, ..MeasFlags::default() })
            .build()
            .unwrap()
    }

    fn jjj(&self, kernel: TimeKernel) -> Tensor<f64> {
        let lattice = self.lattice(kernel);
        let mut m = UneqltMeas::new(&lattice);
        measure_uneqlt_full(&lattice, 1.0, &self.gu, &self.gd, &mut m);
        m.jjj.unwrap()
    }

    fn class(&self, c: usize, b1: usize, b2: usize) -> usize {
        (c * self.nb() + b1) * self.nb() + b2
    }

    fn value(&self, t: usize, dt: usize, c: usize, b1: usize, b2: usize) -> f64 {
        let b = &self.sq.bonds;
        three_current(
            &TripleSlices::new(&self.gu, t, dt),
            &TripleSlices::new(&self.gd, t, dt),
            b[b1],
            b[c],
            b[b2],
        )
    }

    fn triples(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let nb = self.nb();
        (0..nb * nb * nb).map(move |k| (k / (nb * nb), k / nb % nb, k % nb))
    }
}

fn single_entry(row: usize, col: usize) -> TimeKernel {
    TimeKernel::from_fn(L, L + 2, |r, c| if (r, c) == (row, col) { 1.0 } else { 0.0 })
}

fn assert_row_zero(jjj: &Tensor<f64>, t: usize) {
    assert!(jjj.row(t).iter().all(|&x| x == 0.0), "slot {t} written");
}

#[test]
fn first_rotation_lands_at_later_slot() {
    let f = Fixture::new(31);
    let dt = 1;
    let jjj = f.jjj(single_entry(dt, 0));
    for (c, b1, b2) in f.triples() {
        let got = jjj.get(&[dt, f.class(c, b1, b2)]);
        assert!(approx_eq(got, f.value(0, dt, c, b1, b2), 1e-12), "({c}, {b1}, {b2})");
    }
    assert_row_zero(&jjj, 0);
    assert_row_zero(&jjj, 2);
}

#[test]
fn second_rotation_swaps_displaced_bonds() {
    let f = Fixture::new(32);
    let dt = 1;
    let jjj = f.jjj(single_entry(0, 1 + dt));
    for (c, b1, b2) in f.triples() {
        let got = jjj.get(&[0, f.class(c, b2, b1)]);
        assert!(approx_eq(got, f.value(0, dt, c, b1, b2), 1e-12), "({c}, {b1}, {b2})");
    }
    assert_row_zero(&jjj, 1);
    assert_row_zero(&jjj, 2);
}

#[test]
fn boundary_rotation_only_at_time_zero() {
    let f = Fixture::new(33);
    let jjj = f.jjj(TimeKernel::from_fn(L, L + 2, |_, c| if c == L + 1 { 1.0 } else { 0.0 }));
    for dt in 0..L {
        for (c, b1, b2) in f.triples() {
            let got = jjj.get(&[dt, f.class(b1, c, b2)]);
            assert!(approx_eq(got, f.value(0, dt, c, b1, b2), 1e-12), "dt {dt}: ({c}, {b1}, {b2})");
        }
    }
}

#[test]
fn rotations_cover_every_time_pair() {
    let f = Fixture::new(34);
    let jjj = f.jjj(TimeKernel::from_fn(L, L + 2, |_, _| 1.0));
    let mut expected = 0.0;
    for t in 0..L {
        for dt in 0..L - t {
            let copies = if t == 0 { 3.0 } else { 2.0 };
            expected += copies * f.triples().map(|(c, b1, b2)| f.value(t, dt, c, b1, b2)).sum::<f64>();
        }
    }
    let total: f64 = jjj.data.iter().sum();
    assert!(approx_eq(total, expected, 1e-10), "{total} vs {expected}");
}

#[test]
fn limited_map_agrees_on_kept_classes() {
    let f = Fixture::new(35);
    let mut r = rng(36);
    let weights: Vec<f64> = (0..L * (L + 2)).map(|_| r.random_range(-1.0..1.0)).collect();
    let kernel = TimeKernel::new(L, L + 2, weights).unwrap();

    let flags = MeasFlags { three_current: true, three_current_limited: true, ..MeasFlags::default() };
    let lattice = f.sq.builder::<f64>(L, flags).kernel(kernel).build().unwrap();
    let mut m = UneqltMeas::new(&lattice);
    measure_uneqlt_full(&lattice, -1.0, &f.gu, &f.gd, &mut m);

    let (full, lim) = (m.jjj.unwrap(), m.jjj_l.unwrap());
    let (full_map, _) = lattice.triple_map().unwrap();
    let (lim_map, _) = lattice.triple_map_limited().unwrap();
    let mut kept = 0;
    for (c, b1, b2) in f.triples() {
        let Some(rl) = lim_map.slot(&[c, b1, b2]) else { continue };
        kept += 1;
        let rf = full_map.get(&[c, b1, b2]);
        for t in 0..L {
            assert!(approx_eq(lim.get(&[t, rl]), full.get(&[t, rf]), 1e-12), "t {t}: ({c}, {b1}, {b2})");
        }
    }
    assert!(kept > 0 && kept < f.nb().pow(3));
}

#[test]
fn phase_scales_contributions() {
    let f = Fixture::new(37);
    let kernel = || TimeKernel::from_fn(L, L + 2, |r, c| 1.0 + 0.1 * (r + c) as f64);
    let lattice = f.lattice(kernel());
    let mut m = UneqltMeas::new(&lattice);
    measure_uneqlt_full(&lattice, -0.5, &f.gu, &f.gd, &mut m);
    let unit = f.jjj(kernel());
    for (x, u) in m.jjj.unwrap().data.iter().zip(&unit.data) {
        assert!(approx_eq(*x, -0.5 * u, 1e-12));
    }
}
