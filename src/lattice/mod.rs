// src/lattice/mod.rs
/*!
Immutable per-run lattice tables consumed by the measurements.

The geometry (bond list) and the symmetry reduction (class maps with degeneracies)
are computed elsewhere; this module only holds and validates them.

# Tuple conventions
All maps are indexed row-major in the order of their accessor arguments:

| map                    | tuple           | shape            |
|------------------------|-----------------|------------------|
| `sites`                | `(i)`           | `[N]`            |
| `pairs`                | `(i, j)`        | `[N, N]`         |
| `bond_sites`           | `(b, j)`        | `[B, N]`         |
| `bond_pairs`           | `(b, c)`        | `[B, B]`         |
| `bond_triples[_lim]`   | `(c, b1, b2)`   | `[B, B, B]`      |

Site / bond `i` (or `b`, `b1`) sits at the displaced time `t`, `j` (or `c`) at the
reference time 0, and `b2` at the second displaced time `t + dt`.

# Validation
[`LatticeBuilder::build`] checks every table against `N`, `L` and the bond count
and refuses a configuration whose enabled families miss a table. The measurement
entry points rely on these checks and never re-validate.
*/

pub mod class_map;
pub mod config;
pub mod error;
pub mod kernel;
pub mod peierls;

pub use class_map::{ClassId, ClassMap, ClassSlot};
pub use config::{MeasFlags, NEMATIC_BOND_TYPES};
pub use error::TableError;
pub use kernel::TimeKernel;
pub use peierls::{BondPhase, Peierls, Spin};

use serde::Serialize;
use tracing::debug;

use crate::math::scalar::Scalar;

// ======================================================================================
// ---------------------------------------- Bond ----------------------------------------
// ======================================================================================

/// Directed bond `from → to` (`i0 → i1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bond {
    pub from: usize,
    pub to: usize,
}

impl Bond {
    #[inline]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

// ======================================================================================
// --------------------------------------- Lattice --------------------------------------
// ======================================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Lattice<T: Scalar> {
    n_sites: usize,
    n_slices: usize,
    bonds: Vec<Bond>,
    sites: ClassMap<ClassId>,
    pairs: ClassMap<ClassId>,
    bond_sites: Option<ClassMap<ClassId>>,
    bond_pairs: Option<ClassMap<ClassId>>,
    bond_triples: Option<ClassMap<ClassId>>,
    bond_triples_lim: Option<ClassMap<Option<ClassId>>>,
    peierls: Peierls<T>,
    kernel: Option<TimeKernel>,
    flags: MeasFlags,
}

impl<T: Scalar> Lattice<T> {
    #[inline(always)]
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    #[inline(always)]
    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    #[inline(always)]
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    #[inline(always)]
    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    #[inline(always)]
    pub fn sites(&self) -> &ClassMap<ClassId> {
        &self.sites
    }

    #[inline(always)]
    pub fn pairs(&self) -> &ClassMap<ClassId> {
        &self.pairs
    }

    #[inline(always)]
    pub fn peierls(&self) -> &Peierls<T> {
        &self.peierls
    }

    #[inline(always)]
    pub fn flags(&self) -> &MeasFlags {
        &self.flags
    }

    // ------------------------ Family gates ------------------------
    // Each returns the tables of a family only when the family is enabled.

    /// `(bond_sites, bond_pairs)` when energy correlators are on.
    pub fn energy_maps(&self) -> Option<(&ClassMap<ClassId>, &ClassMap<ClassId>)> {
        if !self.flags.energy {
            return None;
        }
        Some((self.bond_sites.as_ref()?, self.bond_pairs.as_ref()?))
    }

    /// Bond-pair classes when the unequal-time bond correlators are on.
    pub fn bond_map(&self) -> Option<&ClassMap<ClassId>> {
        if !self.flags.bond {
            return None;
        }
        self.bond_pairs.as_ref()
    }

    /// Bond-pair classes and the number of bonds entering the nematic correlators.
    pub fn nematic_map(&self) -> Option<(&ClassMap<ClassId>, usize)> {
        if !self.flags.nematic {
            return None;
        }
        let bonds = self.flags.nematic_bond_types * self.n_sites;
        Some((self.bond_pairs.as_ref()?, bonds))
    }

    pub fn triple_map(&self) -> Option<(&ClassMap<ClassId>, &TimeKernel)> {
        if !self.flags.three_current {
            return None;
        }
        Some((self.bond_triples.as_ref()?, self.kernel.as_ref()?))
    }

    pub fn triple_map_limited(&self) -> Option<(&ClassMap<Option<ClassId>>, &TimeKernel)> {
        if !self.flags.three_current_limited {
            return None;
        }
        Some((self.bond_triples_lim.as_ref()?, self.kernel.as_ref()?))
    }
}

// ======================================================================================
// --------------------------------------- Builder --------------------------------------
// ======================================================================================

/// Assembles and validates a [`Lattice`].
#[derive(Debug, Clone)]
pub struct LatticeBuilder<T: Scalar> {
    n_sites: usize,
    n_slices: usize,
    bonds: Vec<Bond>,
    sites: ClassMap<ClassId>,
    pairs: ClassMap<ClassId>,
    bond_sites: Option<ClassMap<ClassId>>,
    bond_pairs: Option<ClassMap<ClassId>>,
    bond_triples: Option<ClassMap<ClassId>>,
    bond_triples_lim: Option<ClassMap<Option<ClassId>>>,
    peierls: Peierls<T>,
    kernel: Option<TimeKernel>,
    flags: MeasFlags,
}

impl<T: Scalar> LatticeBuilder<T> {
    pub fn new(
        n_sites: usize,
        n_slices: usize,
        bonds: Vec<Bond>,
        sites: ClassMap<ClassId>,
        pairs: ClassMap<ClassId>,
    ) -> Self {
        Self {
            n_sites,
            n_slices,
            bonds,
            sites,
            pairs,
            bond_sites: None,
            bond_pairs: None,
            bond_triples: None,
            bond_triples_lim: None,
            peierls: Peierls::Uniform,
            kernel: None,
            flags: MeasFlags::default(),
        }
    }

    pub fn bond_sites(mut self, map: ClassMap<ClassId>) -> Self {
        self.bond_sites = Some(map);
        self
    }

    pub fn bond_pairs(mut self, map: ClassMap<ClassId>) -> Self {
        self.bond_pairs = Some(map);
        self
    }

    pub fn bond_triples(mut self, map: ClassMap<ClassId>) -> Self {
        self.bond_triples = Some(map);
        self
    }

    pub fn bond_triples_limited(mut self, map: ClassMap<Option<ClassId>>) -> Self {
        self.bond_triples_lim = Some(map);
        self
    }

    pub fn peierls(mut self, peierls: Peierls<T>) -> Self {
        self.peierls = peierls;
        self
    }

    pub fn kernel(mut self, kernel: TimeKernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn flags(mut self, flags: MeasFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn build(self) -> Result<Lattice<T>, TableError> {
        let (n, l, nb) = (self.n_sites, self.n_slices, self.bonds.len());
        if n == 0 || l == 0 {
            return Err(TableError::EmptyLattice { n_sites: n, n_slices: l });
        }

        for (bond, b) in self.bonds.iter().enumerate() {
            for site in [b.from, b.to] {
                if site >= n {
                    return Err(TableError::SiteOutOfRange { bond, site, n_sites: n });
                }
            }
            if b.from == b.to {
                return Err(TableError::SelfLoop { bond, from: b.from });
            }
        }

        self.sites.expect_shape(&[n])?;
        self.pairs.expect_shape(&[n, n])?;
        if let Some(m) = &self.bond_sites {
            m.expect_shape(&[nb, n])?;
        }
        if let Some(m) = &self.bond_pairs {
            m.expect_shape(&[nb, nb])?;
        }
        if let Some(m) = &self.bond_triples {
            m.expect_shape(&[nb, nb, nb])?;
        }
        if let Some(m) = &self.bond_triples_lim {
            m.expect_shape(&[nb, nb, nb])?;
        }
        if let Some(k) = &self.kernel {
            k.check(l)?;
        }
        if let Peierls::Table { up, down } = &self.peierls {
            for (spin, table) in [("up", up), ("down", down)] {
                if table.n() != n {
                    return Err(TableError::PeierlsShape { spin, expected: n, actual: table.n() });
                }
            }
        }

        let flags = self.flags;
        let require = |on: bool, present: bool, family: &'static str, table: &'static str| {
            if on && !present {
                Err(TableError::MissingTable { family, table })
            } else {
                Ok(())
            }
        };
        require(flags.energy, self.bond_sites.is_some(), "energy", "bond_sites")?;
        require(flags.energy, self.bond_pairs.is_some(), "energy", "bond_pairs")?;
        require(flags.bond, self.bond_pairs.is_some(), "bond", "bond_pairs")?;
        require(flags.nematic, self.bond_pairs.is_some(), "nematic", "bond_pairs")?;
        require(flags.three_current, self.bond_triples.is_some(), "three_current", "bond_triples")?;
        require(flags.three_current, self.kernel.is_some(), "three_current", "time_kernel")?;
        require(
            flags.three_current_limited,
            self.bond_triples_lim.is_some(),
            "three_current_limited",
            "bond_triples_lim",
        )?;
        require(flags.three_current_limited, self.kernel.is_some(), "three_current_limited", "time_kernel")?;

        if flags.nematic && flags.nematic_bond_types * n > nb {
            return Err(TableError::NematicBondsOutOfRange {
                requested: flags.nematic_bond_types * n,
                available: nb,
            });
        }

        debug!(
            n_sites = n,
            n_slices = l,
            num_bonds = nb,
            num_site_classes = self.sites.num_classes(),
            num_pair_classes = self.pairs.num_classes(),
            gauged = !self.peierls.is_uniform(),
            ?flags,
            "lattice tables validated"
        );

        Ok(Lattice {
            n_sites: n,
            n_slices: l,
            bonds: self.bonds,
            sites: self.sites,
            pairs: self.pairs,
            bond_sites: self.bond_sites,
            bond_pairs: self.bond_pairs,
            bond_triples: self.bond_triples,
            bond_triples_lim: self.bond_triples_lim,
            peierls: self.peierls,
            kernel: self.kernel,
            flags,
        })
    }
}
