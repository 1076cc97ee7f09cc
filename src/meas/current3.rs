// src/meas/current3.rs
/*!
Three-current correlator `⟨ j_k(t + dt) j_i(t) j_j(0) ⟩` over bond triples.

Bond `i` (`b1`) sits at slice `t`, bond `k` (`b2`) at slice `t + dt` and bond `j` (`c`)
at slice 0, with bond current `j_x = G(x0, x1) − G(x1, x0)` per spin. The six-operator
Wick expansion splits into

- the product of the three single-bond currents,
- three "2×1" terms: one current times the connected pair of the other two bonds,
- two fully connected loops, one per orientation of the cycle `i → k → j → i`.

The same value is folded into three rotated classes, each weighted by an entry of the
[`TimeKernel`]:

| rotation | class           | time slot | kernel entry          |
|----------|-----------------|-----------|-----------------------|
| 1        | `(c, b1, b2)`   | `t + dt`  | `(t + dt, t)`         |
| 2        | `(c, b2, b1)`   | `t`       | `(t, t + 1 + dt)`     |
| 3        | `(b1, c, b2)`   | `t + dt`  | `(t + dt, L + 1)`     |

Rotation 3 closes the time integral at the imaginary-time boundary and only exists
at `t = 0`. With a limited map a rotation whose class is `None` is neither looked up
nor written; a triple with no remaining rotation is skipped entirely.

Contributions from different `t` land in overlapping time slots (`t + dt` of one `t`
is `t'` of another), so the parallel loop folds into per-worker buffers that are
reduced before touching the accumulator.
*/

use rayon::prelude::*;

use crate::greens::{GreenTensor, MatrixView};
use crate::lattice::{Bond, ClassMap, ClassSlot, TimeKernel};
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

// ======================================================================================
// ----------------------------------- Triple Slices ------------------------------------
// ======================================================================================

/// The nine propagator blocks of one spin for the time points `(0, t, t + dt)`.
///
/// Naming: `xy` is `G(τx, τy)` with `τi = t`, `τk = t + dt`, `τj = 0`.
#[derive(Debug, Clone, Copy)]
pub struct TripleSlices<'a, T: Scalar> {
    pub ii: MatrixView<'a, T>,
    pub ij: MatrixView<'a, T>,
    pub ji: MatrixView<'a, T>,
    pub jj: MatrixView<'a, T>,
    pub kk: MatrixView<'a, T>,
    pub kj: MatrixView<'a, T>,
    pub jk: MatrixView<'a, T>,
    pub ki: MatrixView<'a, T>,
    pub ik: MatrixView<'a, T>,
    /// Same-time deltas between the operator pairs.
    pub contact_ik: bool,
    pub contact_ij: bool,
    pub contact_jk: bool,
}

impl<'a, T: Scalar> TripleSlices<'a, T> {
    pub fn new(g: &'a GreenTensor<T>, t: usize, dt: usize) -> Self {
        let tk = t + dt;
        Self {
            ii: g.block(t, t),
            ij: g.block(t, 0),
            ji: g.block(0, t),
            jj: g.block(0, 0),
            kk: g.block(tk, tk),
            kj: g.block(tk, 0),
            jk: g.block(0, tk),
            ki: g.block(tk, t),
            ik: g.block(t, tk),
            contact_ik: dt == 0,
            contact_ij: t == 0,
            contact_jk: t == 0 && dt == 0,
        }
    }
}

#[inline(always)]
fn delta<T: Scalar>(contact: bool, a: usize, b: usize) -> T {
    T::delta(contact && a == b)
}

#[inline(always)]
fn ends(b: Bond) -> [usize; 2] {
    [b.from, b.to]
}

/// Bond current `G(x0, x1) − G(x1, x0)`.
#[inline(always)]
fn current<T: Scalar>(g: MatrixView<'_, T>, x: Bond) -> T {
    g.get(x.from, x.to) - g.get(x.to, x.from)
}

/// Connected current-current pair between bond `x` (later) and bond `y` (earlier).
#[inline(always)]
fn pair<T: Scalar>(
    gxx: MatrixView<'_, T>,
    gyy: MatrixView<'_, T>,
    gxy: MatrixView<'_, T>,
    gyx: MatrixView<'_, T>,
    x: Bond,
    y: Bond,
    contact: bool,
) -> T {
    let ([x0, x1], [y0, y1]) = (ends(x), ends(y));
    let ex = |a: usize, b: usize| delta::<T>(contact, a, b) - gyx.get(b, a);
    current(gxx, x) * current(gyy, y)
        + ex(x0, y1) * gxy.get(x1, y0)
        - ex(x0, y0) * gxy.get(x1, y1)
        + ex(x1, y0) * gxy.get(x0, y1)
        - ex(x1, y1) * gxy.get(x0, y0)
}

/// Per-spin pieces of the expansion.
struct SpinTerms<T> {
    cur_i: T,
    cur_j: T,
    cur_k: T,
    pair_ij: T,
    pair_kj: T,
    pair_ki: T,
    /// Connected loop through `G(i, k)`, `G(k, j)`, `G(j, i)`.
    loop_kj: T,
    /// Connected loop through `G(k, i)`, `G(i, j)`, `G(j, k)`.
    loop_ki: T,
}

fn spin_terms<T: Scalar>(g: &TripleSlices<'_, T>, i: Bond, j: Bond, k: Bond) -> SpinTerms<T> {
    let (ie, je, ke) = (ends(i), ends(j), ends(k));
    let mut loop_kj = T::zero();
    let mut loop_ki = T::zero();
    for a in 0..2 {
        for b in 0..2 {
            for c in 0..2 {
                let parity = if (a + b + c) % 2 == 0 { T::one() } else { -T::one() };
                let (ia, ia_) = (ie[a], ie[1 - a]);
                let (kb, kb_) = (ke[b], ke[1 - b]);
                let (jc, jc_) = (je[c], je[1 - c]);

                loop_kj += parity
                    * (delta::<T>(g.contact_ik, ia, kb) - g.ik.get(ia, kb))
                    * g.kj.get(kb_, jc)
                    * (delta::<T>(g.contact_ij, ia_, jc_) - g.ji.get(jc_, ia_));

                loop_ki += parity
                    * g.ki.get(kb_, ia)
                    * g.ij.get(ia_, jc)
                    * (delta::<T>(g.contact_jk, jc_, kb) - g.jk.get(jc_, kb));
            }
        }
    }
    SpinTerms {
        cur_i: current(g.ii, i),
        cur_j: current(g.jj, j),
        cur_k: current(g.kk, k),
        pair_ij: pair(g.ii, g.jj, g.ij, g.ji, i, j, g.contact_ij),
        pair_kj: pair(g.kk, g.jj, g.kj, g.jk, k, j, g.contact_jk),
        pair_ki: pair(g.kk, g.ii, g.ki, g.ik, k, i, g.contact_ik),
        loop_kj,
        loop_ki,
    }
}

/// Fully contracted three-current value for bonds `i` (at `t`), `j` (at 0), `k` (at `t + dt`).
pub fn three_current<T: Scalar>(
    up: &TripleSlices<'_, T>,
    dn: &TripleSlices<'_, T>,
    i: Bond,
    j: Bond,
    k: Bond,
) -> T {
    let u = spin_terms(up, i, j, k);
    let d = spin_terms(dn, i, j, k);
    let two = T::one() + T::one();

    let disconnected = -two * (u.cur_k * u.cur_i * u.cur_j + d.cur_k * d.cur_i * d.cur_j);
    let two_by_one = (u.cur_k + d.cur_k) * (u.pair_ij + d.pair_ij)
        + (u.cur_i + d.cur_i) * (u.pair_kj + d.pair_kj)
        + (u.cur_j + d.cur_j) * (u.pair_ki + d.pair_ki);
    disconnected + two_by_one + (u.loop_kj + d.loop_kj) + (u.loop_ki + d.loop_ki)
}

// ======================================================================================
// ------------------------------------ Accumulation ------------------------------------
// ======================================================================================

/// Fold every `(t, dt, c, b1, b2)` contribution into `out` (`[L, num_classes]`).
pub(crate) fn accumulate<T: Scalar, C: ClassSlot>(
    bonds: &[Bond],
    map: &ClassMap<C>,
    kernel: &TimeKernel,
    phase: T,
    up: &GreenTensor<T>,
    dn: &GreenTensor<T>,
    out: &mut Tensor<T>,
) {
    let l = up.n_slices();
    let nc = map.num_classes();
    let nb = bonds.len();
    assert_eq!(out.shape(), &[l, nc][..], "three-current bins do not match [L, classes]");

    let zeros = || vec![T::zero(); l * nc];
    let partial = (0..l)
        .into_par_iter()
        .fold(zeros, |mut buf, t| {
            for dt in 0..l - t {
                let gu = TripleSlices::new(up, t, dt);
                let gd = TripleSlices::new(dn, t, dt);
                let (w1, w2, w3) = kernel.rotation_weights(t, dt);
                let (w1, w2, w3) = (T::from_f64(w1), T::from_f64(w2), T::from_f64(w3));

                for c in 0..nb {
                    for b1 in 0..nb {
                        for b2 in 0..nb {
                            let r1 = map.slot(&[c, b1, b2]).class();
                            let r2 = map.slot(&[c, b2, b1]).class();
                            let r3 = if t == 0 { map.slot(&[b1, c, b2]).class() } else { None };
                            if r1.is_none() && r2.is_none() && r3.is_none() {
                                continue;
                            }

                            let value = three_current(&gu, &gd, bonds[b1], bonds[c], bonds[b2]);
                            if let Some(r) = r1 {
                                buf[r + nc * (t + dt)] += map.prefactor(phase, r) * value * w1;
                            }
                            if let Some(r) = r2 {
                                buf[r + nc * t] += map.prefactor(phase, r) * value * w2;
                            }
                            if let Some(r) = r3 {
                                buf[r + nc * (t + dt)] += map.prefactor(phase, r) * value * w3;
                            }
                        }
                    }
                }
            }
            buf
        })
        .reduce(zeros, |mut a, b| {
            a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
            a
        });

    out.data
        .par_iter_mut()
        .zip(partial.par_iter())
        .for_each(|(x, &y)| *x += y);
}
