// src/math/scalar.rs
//! One sealed `Scalar` trait for the numeric types a measurement can run in.
//!
//! - `f64` (or `f32`) for real Green's functions without applied flux.
//! - `Complex<f64>` (or `Complex<f32>`) when Peierls phases make the propagators complex.
//!
//! Every correlator formula is written once against this trait; the real and the
//! complex configuration share the same code path.
//!
//! `from_count` and `delta` are exact: class degeneracies and Kronecker deltas are
//! small integers, representable without rounding in every supported type.

use core::fmt::{Debug, Display};
use core::iter::{Product, Sum};
use core::ops::{AddAssign, MulAssign, Neg, SubAssign};

use num_complex::Complex;
use num_traits::{Num, NumCast, One, Zero};

// ==============================================================================
// ------------------- Sealing: keep impl surface controlled --------------------
// ==============================================================================

mod sealed {
    pub trait Sealed {}
    macro_rules! impl_sealed_for {
        ($($t:ty),* $(,)?) => { $(impl Sealed for $t {})* };
    }
    impl_sealed_for!(f32, f64, num_complex::Complex<f32>, num_complex::Complex<f64>);
}
use sealed::Sealed;



// ==============================================================================
// --------------------------------- Trait Def ----------------------------------
// ==============================================================================

/// Floating scalar (real or complex) used for Green's-function entries,
/// phases and accumulated sums.
pub trait Scalar:
    Num
    + NumCast
    + Zero
    + One
    + Copy
    + Clone
    + Default
    + Send
    + Sync
    + 'static
    + Debug
    + Display
    + Sum<Self>
    + Product<Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + Neg<Output = Self>
    + Sealed
{
    /// Real-valued constant lifted into the scalar type.
    fn from_f64(x: f64) -> Self;

    /// Exact conversion of a tuple count (class degeneracy) into the scalar type.
    #[inline]
    fn from_count(n: usize) -> Self {
        Self::from_f64(n as f64)
    }

    /// Kronecker delta: one when `hit`, zero otherwise.
    #[inline(always)]
    fn delta(hit: bool) -> Self {
        if hit { Self::one() } else { Self::zero() }
    }
}



// ==============================================================================
// -------------------------------- IMPL: Real ----------------------------------
// ==============================================================================

macro_rules! impl_scalar_float {
    ($($t:ty),* $(,)?) => {$(
        impl Scalar for $t {
            #[inline] fn from_f64(x: f64) -> Self { x as $t }
        }
    )*}
}
impl_scalar_float!(f32, f64);



// ==============================================================================
// ------------------------------- IMPL: Complex --------------------------------
// ==============================================================================

macro_rules! impl_scalar_complex {
    ($($t:ty),* $(,)?) => {$(
        impl Scalar for Complex<$t> {
            #[inline] fn from_f64(x: f64) -> Self { Complex::new(x as $t, 0.0) }
        }
    )*}
}
impl_scalar_complex!(f32, f64);
