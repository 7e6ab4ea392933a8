//! The fixed vocabulary of tilted-ring parameters and their units.

/// Recognized tilted-ring parameters with their display units.
pub const STANDARD_PARAMETERS: &[(&str, &str)] = &[
    ("VROT", "km s-1"),
    ("SBR", "Jy km s-1 arcsec-2"),
    ("INCL", "degrees"),
    ("PA", "degrees"),
    ("RADI", "arcsec"),
    ("Z0", "arcsec"),
    ("SDIS", "km s-1"),
    ("XPOS", "degrees"),
    ("YPOS", "degrees"),
    ("VSYS", "km s-1"),
    ("DVRO", "km s-1 arcsec-1"),
    ("DVRA", "km s-1 arcsec-1"),
    ("VRAD", "km s-1"),
];

/// Display unit for a recognized parameter name.
pub fn standard_unit(name: &str) -> Option<&'static str> {
    STANDARD_PARAMETERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, unit)| *unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_lookups() {
        assert_eq!(standard_unit("VROT"), Some("km s-1"));
        assert_eq!(standard_unit("RADI"), Some("arcsec"));
        assert_eq!(standard_unit("NOPE"), None);
    }
}
