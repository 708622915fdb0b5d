use phf::{Set, phf_set};

static WATER_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "DOD",
};

/// Sulfur-gamma of cysteine, the atom pair that forms disulfide bridges.
pub const CYSTEINE_SULFUR_GAMMA: &str = "SG";

pub fn is_water_residue(residue_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(residue_name.trim())
}

pub fn is_disulfide_sulfur(atom_name: &str) -> bool {
    atom_name.trim() == CYSTEINE_SULFUR_GAMMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_residue_names_are_recognized() {
        for name in ["HOH", "WAT", " DOD"] {
            assert!(is_water_residue(name), "{name} should be water");
        }
        assert!(!is_water_residue("HIS"));
        assert!(!is_water_residue("CYS"));
    }

    #[test]
    fn disulfide_sulfur_matches_sg_only() {
        assert!(is_disulfide_sulfur("SG"));
        assert!(!is_disulfide_sulfur("SD"));
    }
}
