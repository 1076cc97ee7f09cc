// src/tests/common.rs
//! Shared fixtures: a periodic square lattice with translation classes and seeded
//! random Green's functions.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::greens::{GreenMatrix, GreenSlices, GreenTensor};
use crate::lattice::{Bond, ClassId, ClassMap, ClassSlot, LatticeBuilder, MeasFlags, TableError, TimeKernel};
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::Tensor;

pub const EPS: f64 = 1e-10;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
}

pub fn assert_close<T: Scalar + Into<Complex64>>(what: &str, a: &Tensor<T>, b: &Tensor<T>) {
    assert_eq!(a.shape(), b.shape(), "{what}: shapes differ");
    assert_slices_close(what, &a.data, &b.data);
}

pub fn assert_slices_close<T: Scalar + Into<Complex64>>(what: &str, a: &[T], b: &[T]) {
    assert_eq!(a.len(), b.len(), "{what}: lengths differ");
    for (k, (&x, &y)) in a.iter().zip(b).enumerate() {
        let (zx, zy): (Complex64, Complex64) = (x.into(), y.into());
        let scale = 1.0 + zx.norm().max(zy.norm());
        assert!((zx - zy).norm() <= EPS * scale, "{what}[{k}]: {x} vs {y}");
    }
}

// ======================================================================================
// ---------------------------------- Square Lattice ------------------------------------
// ======================================================================================

/// Periodic `lx × ly` lattice; bonds `0..N` point along +x, `N..2N` along +y.
#[derive(Debug, Clone)]
pub struct Square {
    pub lx: usize,
    pub ly: usize,
    pub bonds: Vec<Bond>,
}

impl Square {
    pub fn new(lx: usize, ly: usize) -> Self {
        assert!(lx >= 2 && ly >= 2);
        let n = lx * ly;
        let shift = |i: usize, dx: usize, dy: usize| (i % lx + dx) % lx + lx * ((i / lx + dy) % ly);
        let bonds = (0..n)
            .map(|i| Bond::new(i, shift(i, 1, 0)))
            .chain((0..n).map(|i| Bond::new(i, shift(i, 0, 1))))
            .collect();
        Self { lx, ly, bonds }
    }

    pub fn n(&self) -> usize {
        self.lx * self.ly
    }

    pub fn nb(&self) -> usize {
        self.bonds.len()
    }

    fn bond_type(&self, b: usize) -> usize {
        b / self.n()
    }

    /// Translation class of the displacement `i → j`.
    pub fn disp(&self, i: usize, j: usize) -> usize {
        let (lx, ly) = (self.lx, self.ly);
        let dx = (j % lx + lx - i % lx) % lx;
        let dy = (j / lx + ly - i / lx) % ly;
        dx + lx * dy
    }

    pub fn sites(&self) -> ClassMap<ClassId> {
        ok(ClassMap::counted("sites", vec![self.n()], vec![0; self.n()]))
    }

    pub fn pairs(&self) -> ClassMap<ClassId> {
        let n = self.n();
        let classes = (0..n * n).map(|k| self.disp(k / n, k % n)).collect();
        ok(ClassMap::counted("pairs", vec![n, n], classes))
    }

    pub fn bond_sites(&self) -> ClassMap<ClassId> {
        let (n, nb) = (self.n(), self.nb());
        let classes = (0..nb * n)
            .map(|k| {
                let (b, j) = (k / n, k % n);
                self.bond_type(b) * n + self.disp(self.bonds[b].from, j)
            })
            .collect();
        ok(ClassMap::counted("bond_sites", vec![nb, n], classes))
    }

    pub fn bond_pairs(&self) -> ClassMap<ClassId> {
        let (n, nb) = (self.n(), self.nb());
        let classes = (0..nb * nb)
            .map(|k| {
                let (b, c) = (k / nb, k % nb);
                (2 * self.bond_type(b) + self.bond_type(c)) * n + self.disp(self.bonds[b].from, self.bonds[c].from)
            })
            .collect();
        ok(ClassMap::counted("bond_pairs", vec![nb, nb], classes))
    }

    fn triple_class(&self, c: usize, b1: usize, b2: usize) -> usize {
        let n = self.n();
        let types = (2 * self.bond_type(c) + self.bond_type(b1)) * 2 + self.bond_type(b2);
        let origin = self.bonds[c].from;
        (types * n + self.disp(origin, self.bonds[b1].from)) * n + self.disp(origin, self.bonds[b2].from)
    }

    pub fn bond_triples(&self) -> ClassMap<ClassId> {
        let nb = self.nb();
        let classes = (0..nb * nb * nb)
            .map(|k| self.triple_class(k / (nb * nb), k / nb % nb, k % nb))
            .collect();
        ok(ClassMap::counted("bond_triples", vec![nb, nb, nb], classes))
    }

    /// Triples whose `b1` and `b2` both differ from `c`, renumbered densely.
    pub fn bond_triples_limited(&self) -> ClassMap<Option<ClassId>> {
        let nb = self.nb();
        let raw: Vec<Option<usize>> = (0..nb * nb * nb)
            .map(|k| {
                let (c, b1, b2) = (k / (nb * nb), k / nb % nb, k % nb);
                (b1 != c && b2 != c).then(|| self.triple_class(c, b1, b2))
            })
            .collect();
        let mut used: Vec<usize> = raw.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        let classes = raw
            .into_iter()
            .map(|r| r.map(|r| used.binary_search(&r).unwrap()))
            .collect();
        ok(ClassMap::counted("bond_triples_lim", vec![nb, nb, nb], classes))
    }

    /// Builder carrying every table and a kernel of ones.
    pub fn builder<T: Scalar>(&self, n_slices: usize, flags: MeasFlags) -> LatticeBuilder<T> {
        LatticeBuilder::new(self.n(), n_slices, self.bonds.clone(), self.sites(), self.pairs())
            .bond_sites(self.bond_sites())
            .bond_pairs(self.bond_pairs())
            .bond_triples(self.bond_triples())
            .bond_triples_limited(self.bond_triples_limited())
            .kernel(TimeKernel::from_fn(n_slices, n_slices + 2, |_, _| 1.0))
            .flags(flags)
    }
}

fn ok<C: ClassSlot>(map: Result<ClassMap<C>, TableError>) -> ClassMap<C> {
    map.expect("fixture map rejected")
}

/// Every tuple of `shape` in its own class.
pub fn identity_map(name: &'static str, shape: Vec<usize>) -> ClassMap<ClassId> {
    let len = shape.iter().product();
    ok(ClassMap::counted(name, shape, (0..len).collect()))
}

// ======================================================================================
// ------------------------------- Random Green's Functions -----------------------------
// ======================================================================================

fn entry(rng: &mut StdRng, diagonal: bool) -> f64 {
    if diagonal {
        0.5 + rng.random_range(-0.3..0.3)
    } else {
        rng.random_range(-0.2..0.2)
    }
}

pub fn random_green(rng: &mut StdRng, n: usize) -> GreenMatrix<f64> {
    GreenMatrix::from_fn(n, |r, c| entry(rng, r == c))
}

pub fn random_slices(rng: &mut StdRng, l: usize, n: usize) -> GreenSlices<f64> {
    GreenSlices::from_fn(l, n, |_, r, c| entry(rng, r == c))
}

pub fn random_tensor(rng: &mut StdRng, l: usize, n: usize) -> GreenTensor<f64> {
    GreenTensor::from_fn(l, n, |t1, t2, r, c| entry(rng, t1 == t2 && r == c))
}

/// Random Hermitian matrix around `0.5·I`.
pub fn hermitian(rng: &mut StdRng, n: usize) -> GreenMatrix<Complex64> {
    let mut g = GreenMatrix::zeros(n);
    for r in 0..n {
        g.set(r, r, Complex64::new(entry(rng, true), 0.0));
        for c in r + 1..n {
            let z = Complex64::new(rng.random_range(-0.2..0.2), rng.random_range(-0.2..0.2));
            g.set(r, c, z);
            g.set(c, r, z.conj());
        }
    }
    g
}
