// src/lattice/class_map.rs
/*!
Symmetry-class maps: surjections from raw lattice tuples onto class indices.

A [`ClassMap`] stores, for a tuple space of shape `[d0, d1, ...]`, one class slot per
tuple in row-major order of the tuple's arguments, plus the degeneracy (number of raw
tuples) of every class. Accumulated sums are normalized with `phase / degeneracy`.

The slot type is generic:
- `ClassId`: every tuple belongs to a class.
- `Option<ClassId>`: limited maps, where `None` marks a tuple that is not of interest.

# Invariants
- `classes.len() == shape.iter().product()`.
- Every present class index is `< degeneracy.len()`.
- Every degeneracy is `> 0`.
*/

use serde::Serialize;

use super::error::TableError;
use crate::math::scalar::Scalar;
use crate::math::tensor::dense::row_major_offset;

/// Index of a symmetry class.
pub type ClassId = usize;

// ======================================================================================
// ------------------------------------- Slot Trait -------------------------------------
// ======================================================================================

/// A class-map entry: either a class or (for limited maps) possibly nothing.
pub trait ClassSlot: Copy + Send + Sync + 'static {
    fn class(self) -> Option<ClassId>;
}

impl ClassSlot for ClassId {
    #[inline(always)]
    fn class(self) -> Option<ClassId> {
        Some(self)
    }
}

impl ClassSlot for Option<ClassId> {
    #[inline(always)]
    fn class(self) -> Option<ClassId> {
        self
    }
}

// ======================================================================================
// -------------------------------------- ClassMap --------------------------------------
// ======================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMap<C: ClassSlot> {
    name: &'static str,
    shape: Vec<usize>,
    classes: Vec<C>,
    degeneracy: Vec<usize>,
}

impl<C: ClassSlot> ClassMap<C> {
    /// Map with explicitly supplied degeneracies.
    pub fn with_degeneracy(
        name: &'static str,
        shape: Vec<usize>,
        classes: Vec<C>,
        degeneracy: Vec<usize>,
    ) -> Result<Self, TableError> {
        let expected = shape.iter().product::<usize>();
        if shape.is_empty() || expected == 0 || classes.len() != expected {
            return Err(TableError::LengthMismatch { map: name, shape, actual: classes.len() });
        }
        if degeneracy.is_empty() {
            return Err(TableError::EmptyMap { map: name });
        }
        let num_classes = degeneracy.len();
        if let Some(class) = classes
            .iter()
            .filter_map(|c| c.class())
            .find(|&c| c >= num_classes)
        {
            return Err(TableError::ClassOutOfRange { map: name, class, num_classes });
        }
        if let Some(class) = degeneracy.iter().position(|&d| d == 0) {
            return Err(TableError::ZeroDegeneracy { map: name, class });
        }
        Ok(Self { name, shape, classes, degeneracy })
    }

    /// Map whose degeneracies are the number of tuples landing in each class.
    ///
    /// Classes are `0..=max`; a class index nobody maps to is a zero degeneracy.
    pub fn counted(name: &'static str, shape: Vec<usize>, classes: Vec<C>) -> Result<Self, TableError> {
        let num_classes = classes
            .iter()
            .filter_map(|c| c.class())
            .max()
            .map_or(0, |m| m + 1);
        let mut degeneracy = vec![0usize; num_classes];
        for r in classes.iter().filter_map(|c| c.class()) {
            degeneracy[r] += 1;
        }
        Self::with_degeneracy(name, shape, classes, degeneracy)
    }

    #[inline(always)]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline(always)]
    pub fn num_classes(&self) -> usize {
        self.degeneracy.len()
    }

    #[inline(always)]
    pub fn degeneracy(&self, class: ClassId) -> usize {
        self.degeneracy[class]
    }

    /// Slot of the tuple `indices`.
    #[inline(always)]
    pub fn slot(&self, indices: &[usize]) -> C {
        self.classes[row_major_offset(&self.shape, indices)]
    }

    /// Normalization `phase / degeneracy(class)`.
    #[inline(always)]
    pub fn prefactor<T: Scalar>(&self, phase: T, class: ClassId) -> T {
        phase / T::from_count(self.degeneracy[class])
    }

    /// Fail unless the tuple space is exactly `expected`.
    pub(crate) fn expect_shape(&self, expected: &[usize]) -> Result<(), TableError> {
        if self.shape != expected {
            return Err(TableError::ShapeMismatch {
                map: self.name,
                expected: expected.to_vec(),
                actual: self.shape.clone(),
            });
        }
        Ok(())
    }
}

impl ClassMap<ClassId> {
    /// Class of the tuple `indices`.
    #[inline(always)]
    pub fn get(&self, indices: &[usize]) -> ClassId {
        self.slot(indices)
    }
}
