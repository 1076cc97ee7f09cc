//! Errors raised while assembling the lattice tables and measurement flags.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    // Shape errors
    #[error("Map `{map}` has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        map: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Map `{map}` holds {actual} entries for shape {shape:?}")]
    LengthMismatch {
        map: &'static str,
        shape: Vec<usize>,
        actual: usize,
    },

    // Class errors
    #[error("Map `{map}` references class {class}, but only {num_classes} classes exist")]
    ClassOutOfRange {
        map: &'static str,
        class: usize,
        num_classes: usize,
    },

    #[error("Map `{map}` has zero degeneracy for class {class}")]
    ZeroDegeneracy { map: &'static str, class: usize },

    #[error("Map `{map}` has no classes")]
    EmptyMap { map: &'static str },

    // Geometry errors
    #[error("Lattice needs at least one site and one time slice, got N = {n_sites}, L = {n_slices}")]
    EmptyLattice { n_sites: usize, n_slices: usize },

    #[error("Bond {bond} joins site {from} to itself")]
    SelfLoop { bond: usize, from: usize },

    #[error("Bond {bond} references site {site}, but N = {n_sites}")]
    SiteOutOfRange { bond: usize, site: usize, n_sites: usize },

    #[error("Nematic correlators use {requested} bonds, but only {available} exist")]
    NematicBondsOutOfRange { requested: usize, available: usize },

    // Optional tables
    #[error("Measurement `{family}` is enabled but table `{table}` is missing")]
    MissingTable {
        family: &'static str,
        table: &'static str,
    },

    #[error("Peierls table for spin {spin} is {actual}x{actual}, expected {expected}x{expected}")]
    PeierlsShape {
        spin: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Time kernel is {rows}x{cols}; needs at least {min_rows} rows of width {width}")]
    KernelShape {
        rows: usize,
        cols: usize,
        min_rows: usize,
        width: usize,
    },

    // Config errors
    #[error("Invalid measurement config: {0}")]
    Config(#[from] serde_json::Error),
}
