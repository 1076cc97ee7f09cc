//! Measurement flags selecting the optional correlator families.

use serde::{Deserialize, Serialize};

use super::error::TableError;

/// Number of bond types entering the four-point nematic correlator by default.
pub const NEMATIC_BOND_TYPES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasFlags {
    /// `vv`, `vn`, `kv`, `kn` (and equal-time `kk`).
    pub energy: bool,
    /// Unequal-time `pair_bb`, `jj`, `jsjs`, `kk`, `ksks`.
    pub bond: bool,
    /// Unequal-time `nem_nnnn`, `nem_ssss`.
    pub nematic: bool,
    /// Full-tensor three-current `jjj`.
    pub three_current: bool,
    /// Full-tensor three-current `jjj_l` over the limited triple map.
    pub three_current_limited: bool,
    /// Nematic correlators run over the first `nematic_bond_types * N` bonds.
    pub nematic_bond_types: usize,
}

impl Default for MeasFlags {
    fn default() -> Self {
        Self {
            energy: false,
            bond: false,
            nematic: false,
            three_current: false,
            three_current_limited: false,
            nematic_bond_types: NEMATIC_BOND_TYPES,
        }
    }
}

impl MeasFlags {
    /// Every family on.
    pub fn all() -> Self {
        Self {
            energy: true,
            bond: true,
            nematic: true,
            three_current: true,
            three_current_limited: true,
            ..Self::default()
        }
    }

    /// Parse from a JSON object; absent fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(text)?)
    }
}
