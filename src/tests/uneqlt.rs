// src/tests/uneqlt.rs

use crate::greens::{GreenMatrix, GreenSlices, GreenTensor, SpinSlices};
use crate::lattice::MeasFlags;
use crate::meas::{measure_eqlt, measure_uneqlt, measure_uneqlt_full, EqltMeas, UneqltMeas};

use super::common::{assert_close, assert_slices_close, random_green, random_slices, random_tensor, rng, Square};

fn flags() -> MeasFlags {
    MeasFlags { energy: true, bond: true, nematic: true, ..MeasFlags::default() }
}

/// Compact arrays whose slice 0 is `g` in all three entries.
fn anchored(r: &mut rand::rngs::StdRng, l: usize, g: &GreenMatrix<f64>) -> SpinSlices<f64> {
    let n = g.n();
    let mut arrays = [random_slices(r, l, n), random_slices(r, l, n), random_slices(r, l, n)];
    for a in arrays.iter_mut() {
        for row in 0..n {
            for col in 0..n {
                a.set(0, row, col, g.get(row, col));
            }
        }
    }
    let [g0t, gtt, gt0] = arrays;
    SpinSlices::new(g0t, gtt, gt0)
}

/// Compact view of a full space-time tensor.
fn compact(g: &GreenTensor<f64>) -> SpinSlices<f64> {
    let (l, n) = (g.n_slices(), g.n_sites());
    SpinSlices::new(
        GreenSlices::from_fn(l, n, |t, r, c| g.get(0, t, r, c)),
        GreenSlices::from_fn(l, n, |t, r, c| g.get(t, t, r, c)),
        GreenSlices::from_fn(l, n, |t, r, c| g.get(t, 0, r, c)),
    )
}

fn assert_same(a: &UneqltMeas<f64>, b: &UneqltMeas<f64>) {
    assert_eq!(a.n_sample, b.n_sample);
    assert_close("gt0", &a.gt0, &b.gt0);
    assert_close("nn", &a.nn, &b.nn);
    assert_close("xx", &a.xx, &b.xx);
    assert_close("zz", &a.zz, &b.zz);
    assert_close("pair_sw", &a.pair_sw, &b.pair_sw);
    let (ea, eb) = (a.energy.as_ref().unwrap(), b.energy.as_ref().unwrap());
    assert_close("vv", &ea.vv, &eb.vv);
    assert_close("vn", &ea.vn, &eb.vn);
    assert_close("kv", &ea.kv, &eb.kv);
    assert_close("kn", &ea.kn, &eb.kn);
    let (ba, bb) = (a.bond.as_ref().unwrap(), b.bond.as_ref().unwrap());
    assert_close("pair_bb", &ba.pair_bb, &bb.pair_bb);
    assert_close("jj", &ba.jj, &bb.jj);
    assert_close("jsjs", &ba.jsjs, &bb.jsjs);
    assert_close("kk", &ba.kk, &bb.kk);
    assert_close("ksks", &ba.ksks, &bb.ksks);
    let (na, nb) = (a.nematic.as_ref().unwrap(), b.nematic.as_ref().unwrap());
    assert_close("nem_nnnn", &na.nem_nnnn, &nb.nem_nnnn);
    assert_close("nem_ssss", &na.nem_ssss, &nb.nem_ssss);
}

#[test]
fn slice_zero_matches_equal_time() {
    let sq = Square::new(3, 2);
    let n = sq.n();
    let lattice = sq.builder::<f64>(3, flags()).build().unwrap();
    let mut r = rng(21);
    let (gu, gd) = (random_green(&mut r, n), random_green(&mut r, n));
    let (up, dn) = (anchored(&mut r, 3, &gu), anchored(&mut r, 3, &gd));

    let mut eq = EqltMeas::new(&lattice);
    let mut uneq = UneqltMeas::new(&lattice);
    measure_eqlt(&lattice, 0.5, &gu, &gd, &mut eq);
    measure_uneqlt(&lattice, 0.5, &up, &dn, &mut uneq);

    assert_slices_close("g00", &eq.g00.data, uneq.gt0.row(0));
    assert_slices_close("nn", &eq.nn.data, uneq.nn.row(0));
    assert_slices_close("xx", &eq.xx.data, uneq.xx.row(0));
    assert_slices_close("zz", &eq.zz.data, uneq.zz.row(0));
    assert_slices_close("pair_sw", &eq.pair_sw.data, uneq.pair_sw.row(0));

    let (e, u) = (eq.energy.as_ref().unwrap(), uneq.energy.as_ref().unwrap());
    assert_slices_close("vv", &e.vv.data, u.vv.row(0));
    assert_slices_close("vn", &e.vn.data, u.vn.row(0));
    assert_slices_close("kv", &e.kv.data, u.kv.row(0));
    assert_slices_close("kn", &e.kn.data, u.kn.row(0));
    assert_slices_close("kk", &e.kk.data, uneq.bond.as_ref().unwrap().kk.row(0));
}

#[test]
fn full_tensor_matches_compact() {
    let sq = Square::new(2, 2);
    let lattice = sq.builder::<f64>(4, flags()).build().unwrap();
    let mut r = rng(8);
    let (gu, gd) = (random_tensor(&mut r, 4, 4), random_tensor(&mut r, 4, 4));

    let mut full = UneqltMeas::new(&lattice);
    let mut slim = UneqltMeas::new(&lattice);
    measure_uneqlt_full(&lattice, -1.0, &gu, &gd, &mut full);
    measure_uneqlt(&lattice, -1.0, &compact(&gu), &compact(&gd), &mut slim);
    assert_same(&full, &slim);
}

#[test]
fn slices_are_independent() {
    let sq = Square::new(2, 2);
    let lattice = sq.builder::<f64>(3, flags()).build().unwrap();
    let mut r = rng(13);
    let (gu, gd) = (random_tensor(&mut r, 3, 4), random_tensor(&mut r, 3, 4));
    let (up, dn) = (compact(&gu), compact(&gd));

    let mut touched = up.clone();
    touched.gt0.set(2, 1, 3, touched.gt0.get(2, 1, 3) + 0.25);
    touched.gtt.set(2, 0, 0, touched.gtt.get(2, 0, 0) - 0.1);

    let mut a = UneqltMeas::new(&lattice);
    let mut b = UneqltMeas::new(&lattice);
    measure_uneqlt(&lattice, 1.0, &up, &dn, &mut a);
    measure_uneqlt(&lattice, 1.0, &touched, &dn, &mut b);

    for t in 0..2 {
        assert_slices_close("nn", a.nn.row(t), b.nn.row(t));
        assert_slices_close("kk", a.bond.as_ref().unwrap().kk.row(t), b.bond.as_ref().unwrap().kk.row(t));
        assert_slices_close(
            "nem_nnnn",
            a.nematic.as_ref().unwrap().nem_nnnn.row(t),
            b.nematic.as_ref().unwrap().nem_nnnn.row(t),
        );
    }
    assert_ne!(a.nn.row(2), b.nn.row(2));
}

#[test]
fn compact_input_leaves_three_current_untouched() {
    let sq = Square::new(2, 2);
    let lattice = sq.builder::<f64>(2, MeasFlags::all()).build().unwrap();
    let mut r = rng(2);
    let (gu, gd) = (random_tensor(&mut r, 2, 4), random_tensor(&mut r, 2, 4));
    let mut m = UneqltMeas::new(&lattice);
    measure_uneqlt(&lattice, 1.0, &compact(&gu), &compact(&gd), &mut m);

    assert_eq!(m.n_sample, 1);
    assert!(m.jjj.as_ref().unwrap().data.iter().all(|&x| x == 0.0));
    assert!(m.jjj_l.as_ref().unwrap().data.iter().all(|&x| x == 0.0));
}

#[test]
fn merge_then_reset() {
    let sq = Square::new(2, 2);
    let lattice = sq.builder::<f64>(3, flags()).build().unwrap();
    let mut r = rng(4);
    let samples: Vec<_> = (0..2).map(|_| (random_tensor(&mut r, 3, 4), random_tensor(&mut r, 3, 4))).collect();

    let mut serial = UneqltMeas::new(&lattice);
    let mut parts = [UneqltMeas::new(&lattice), UneqltMeas::new(&lattice)];
    for ((gu, gd), part) in samples.iter().zip(parts.iter_mut()) {
        measure_uneqlt_full(&lattice, -1.0, gu, gd, &mut serial);
        measure_uneqlt_full(&lattice, -1.0, gu, gd, part);
    }
    let [mut merged, other] = parts;
    merged.merge(&other);
    assert_eq!(merged.sign, -2.0);
    assert_same(&merged, &serial);

    merged.reset();
    assert_eq!(merged, UneqltMeas::new(&lattice));
}

#[test]
#[should_panic(expected = "Green's functions cover")]
fn wrong_slice_count_rejected() {
    let sq = Square::new(2, 2);
    let lattice = sq.builder::<f64>(3, flags()).build().unwrap();
    let mut r = rng(1);
    let g = random_tensor(&mut r, 2, 4);
    let mut m = UneqltMeas::new(&lattice);
    measure_uneqlt_full(&lattice, 1.0, &g, &g, &mut m);
}
