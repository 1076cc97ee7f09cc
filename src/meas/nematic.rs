// src/meas/nematic.rs
/*!
Four-point density correlator between the endpoints of two bonds.

For bond `b = i0 → i1` at slice `t` and bond `c = j0 → j1` at slice 0, each spin
sector `σ = (σ0, σ1, σ2, σ3)` is

```text
⟨ n_{i0 σ0}(t) n_{i1 σ1}(t) n_{j0 σ2}(0) n_{j1 σ3}(0) ⟩ = det M_σ
```

with the operators numbered `0..4` in that order and the contraction matrix

```text
M[k][k] = 1 − G(τk, τk)[xk, xk]
M[k][l] = δ(xk, xl) − G(τl, τk)[xl, xk]     k < l
M[k][l] =           − G(τl, τk)[xl, xk]     k > l
```

where the delta survives only for operators at the same time, and `M[k][l] = 0`
whenever `σk ≠ σl`. [`NematicWick`] expands every determinant once into its list
of surviving permutations (sign = permutation parity), so a sector with all four
spins equal has 24 terms, one with a 3+1 split has 6 and one with a 2+2 split has 4.

`nem_nnnn` sums all 16 sectors; `nem_ssss` weights each by `(−1)^(#down)`.
*/

use crate::greens::{MatrixView, Propagators};
use crate::math::scalar::Scalar;

use super::contract::SpinPair;

const POINTS: usize = 4;
const SECTORS: usize = 1 << POINTS;

/// Operators `0, 1` (bond `b`) sit at the displaced slice.
#[inline(always)]
const fn displaced(k: usize) -> bool {
    k < 2
}

// ======================================================================================
// ----------------------------------- Term Tables --------------------------------------
// ======================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Row `k` is contracted with column `perm[k]`.
    pub perm: [usize; POINTS],
    /// Parity of `perm`.
    pub sign: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    /// Bit `k` set: operator `k` is spin down.
    pub spins: usize,
    pub terms: Vec<Term>,
}

impl Sector {
    #[inline(always)]
    pub fn is_down(&self, k: usize) -> bool {
        self.spins >> k & 1 == 1
    }

    /// `(−1)^(#down)`.
    #[inline]
    pub fn spin_sign(&self) -> i8 {
        if self.spins.count_ones() % 2 == 0 { 1 } else { -1 }
    }
}

/// All 16 spin sectors with their surviving permutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NematicWick {
    sectors: Vec<Sector>,
}

impl Default for NematicWick {
    fn default() -> Self {
        Self::new()
    }
}

impl NematicWick {
    pub fn new() -> Self {
        let perms = permutations();
        let sectors = (0..SECTORS)
            .map(|spins| {
                let spin = |k: usize| spins >> k & 1;
                let terms = perms
                    .iter()
                    .copied()
                    .filter(|t| (0..POINTS).all(|k| spin(k) == spin(t.perm[k])))
                    .collect();
                Sector { spins, terms }
            })
            .collect();
        Self { sectors }
    }

    #[inline]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// `(nem_nnnn, nem_ssss)` for bond `b` at `t` against bond `c` at 0.
    pub fn evaluate<T: Scalar>(&self, s: &SpinPair<'_, T>, x: [usize; POINTS]) -> (T, T) {
        let mu = contraction_matrix(&s.up, s.contact, x);
        let md = contraction_matrix(&s.dn, s.contact, x);

        let mut nnnn = T::zero();
        let mut ssss = T::zero();
        for sector in &self.sectors {
            let mut value = T::zero();
            for term in &sector.terms {
                let mut prod = T::from_f64(f64::from(term.sign));
                for k in 0..POINTS {
                    let m = if sector.is_down(k) { &md } else { &mu };
                    prod *= m[k][term.perm[k]];
                }
                value += prod;
            }
            nnnn += value;
            if sector.spin_sign() > 0 {
                ssss += value;
            } else {
                ssss -= value;
            }
        }
        (nnnn, ssss)
    }
}

/// All permutations of `0..4` with their parity.
fn permutations() -> Vec<Term> {
    let mut out = Vec::with_capacity(24);
    for a in 0..POINTS {
        for b in 0..POINTS {
            for c in 0..POINTS {
                for d in 0..POINTS {
                    let perm = [a, b, c, d];
                    let distinct = (0..POINTS).all(|k| perm[k + 1..].iter().all(|&v| v != perm[k]));
                    if !distinct {
                        continue;
                    }
                    let inversions = (0..POINTS)
                        .flat_map(|k| (k + 1..POINTS).map(move |l| (k, l)))
                        .filter(|&(k, l)| perm[k] > perm[l])
                        .count();
                    let sign = if inversions % 2 == 0 { 1 } else { -1 };
                    out.push(Term { perm, sign });
                }
            }
        }
    }
    out
}

// ======================================================================================
// --------------------------------- Contraction Matrix ---------------------------------
// ======================================================================================

/// `G(τl, τk)`: propagator from operator `k`'s slice to operator `l`'s slice.
#[inline(always)]
fn propagator<'a, T: Scalar>(g: &Propagators<'a, T>, l: usize, k: usize) -> MatrixView<'a, T> {
    match (displaced(l), displaced(k)) {
        (true, true) => g.gtt,
        (false, false) => g.g00,
        (true, false) => g.gt0,
        (false, true) => g.g0t,
    }
}

fn contraction_matrix<T: Scalar>(g: &Propagators<'_, T>, contact: bool, x: [usize; POINTS]) -> [[T; POINTS]; POINTS] {
    let mut m = [[T::zero(); POINTS]; POINTS];
    for k in 0..POINTS {
        for l in 0..POINTS {
            let gl = propagator(g, l, k).get(x[l], x[k]);
            m[k][l] = if k == l {
                T::one() - gl
            } else if k < l {
                let same_time = contact || displaced(k) == displaced(l);
                T::delta(same_time && x[k] == x[l]) - gl
            } else {
                -gl
            };
        }
    }
    m
}
