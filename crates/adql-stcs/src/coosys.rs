use std::str::FromStr;

use adql_core::{AdqlError, AdqlResult, TextPosition};
use strum_macros::{AsRefStr, EnumString};

/// Reference frame vocabulary (§4.5/C5), longest-match parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Frame {
    Ecliptic,
    Fk4,
    Fk5,
    J2000,
    Galactic,
    Icrs,
    #[default]
    Unknownframe,
}

/// Reference position vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RefPos {
    Barycenter,
    Geocenter,
    Heliocenter,
    Lsr,
    Topocenter,
    Relocatable,
    #[default]
    Unknownrefpos,
}

/// Coordinate flavor vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Flavor {
    Cartesian2,
    Cartesian3,
    #[default]
    Spherical2,
}

impl Flavor {
    fn is_cartesian(self) -> bool {
        matches!(self, Flavor::Cartesian2 | Flavor::Cartesian3)
    }
}

/// A parsed coordinate system triple (Frame, RefPos, Flavor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSystem {
    pub frame: Frame,
    pub refpos: RefPos,
    pub flavor: Flavor,
    /// Set when the input was empty/whitespace, yielding the all-defaults
    /// system rather than one explicitly spelled out by the caller.
    pub is_default: bool,
}

impl CoordinateSystem {
    pub const DEFAULT: CoordinateSystem = CoordinateSystem {
        frame: Frame::Unknownframe,
        refpos: RefPos::Unknownrefpos,
        flavor: Flavor::Spherical2,
        is_default: true,
    };

    /// Parses a coordinate-system string by longest-match, field by field
    /// (Frame, then RefPos, then Flavor); a token that matches neither
    /// vocabulary at its turn leaves the field at its default and is
    /// retried against the next field.
    pub fn parse(raw: &str) -> AdqlResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(CoordinateSystem::DEFAULT);
        }
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let mut idx = 0;
        let frame = match_field::<Frame>(&tokens, &mut idx);
        let refpos = match_field::<RefPos>(&tokens, &mut idx);
        let flavor = match_field::<Flavor>(&tokens, &mut idx);
        if idx != tokens.len() {
            return Err(AdqlError::syntax(
                format!("Incorrect syntax: unexpected word \"{}\" in coordinate system", tokens[idx]),
                TextPosition::default(),
                vec!["<frame>".into(), "<refpos>".into(), "<flavor>".into()],
            ));
        }
        let system = CoordinateSystem {
            frame,
            refpos,
            flavor,
            is_default: false,
        };
        system.check_cartesian_constraint()?;
        Ok(system)
    }

    /// CARTESIAN2/CARTESIAN3 require an unknown frame and reference position.
    fn check_cartesian_constraint(&self) -> AdqlResult<()> {
        if self.flavor.is_cartesian()
            && (self.frame != Frame::Unknownframe || self.refpos != RefPos::Unknownrefpos)
        {
            return Err(AdqlError::syntax(
                format!(
                    "Incorrect syntax: {} requires UNKNOWNFRAME and UNKNOWNREFPOS",
                    self.flavor.as_ref()
                ),
                TextPosition::default(),
                vec!["UNKNOWNFRAME".into(), "UNKNOWNREFPOS".into()],
            ));
        }
        Ok(())
    }

    /// Matches this system against an allow-list pattern (§4.8) where each
    /// field may be `*` (matches anything, including `UNKNOWN*`).
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        let tokens: Vec<&str> = pattern.split_whitespace().collect();
        let frame_pat = tokens.first().copied().unwrap_or("*");
        let refpos_pat = tokens.get(1).copied().unwrap_or("*");
        let flavor_pat = tokens.get(2).copied().unwrap_or("*");
        field_matches(frame_pat, self.frame.as_ref())
            && field_matches(refpos_pat, self.refpos.as_ref())
            && field_matches(flavor_pat, self.flavor.as_ref())
    }
}

fn field_matches(pattern: &str, actual: &str) -> bool {
    pattern == "*" || pattern.eq_ignore_ascii_case(actual)
}

fn match_field<T: FromStr + Default + Copy>(tokens: &[&str], idx: &mut usize) -> T {
    if let Some(token) = tokens.get(*idx) {
        if let Ok(value) = T::from_str(token) {
            *idx += 1;
            return value;
        }
    }
    T::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_default_system() {
        let sys = CoordinateSystem::parse("  ").unwrap();
        assert!(sys.is_default);
        assert_eq!(sys.frame, Frame::Unknownframe);
    }

    #[test]
    fn fields_may_be_omitted_from_the_front() {
        let sys = CoordinateSystem::parse("GEOCENTER SPHERICAL2").unwrap();
        assert_eq!(sys.frame, Frame::Unknownframe);
        assert_eq!(sys.refpos, RefPos::Geocenter);
        assert_eq!(sys.flavor, Flavor::Spherical2);
    }

    #[test]
    fn full_triple_parses_in_order() {
        let sys = CoordinateSystem::parse("ICRS GEOCENTER SPHERICAL2").unwrap();
        assert_eq!(sys.frame, Frame::Icrs);
        assert_eq!(sys.refpos, RefPos::Geocenter);
        assert_eq!(sys.flavor, Flavor::Spherical2);
    }

    #[test]
    fn unrecognized_word_fails() {
        assert!(CoordinateSystem::parse("ICRS BOGUS SPHERICAL2").is_err());
    }

    #[test]
    fn cartesian_requires_unknown_frame_and_refpos() {
        assert!(CoordinateSystem::parse("ICRS CARTESIAN3").is_err());
        assert!(CoordinateSystem::parse("CARTESIAN3").is_ok());
    }

    #[test]
    fn allow_list_pattern_matching_with_wildcards() {
        let sys = CoordinateSystem::parse("ICRS GEOCENTER SPHERICAL2").unwrap();
        assert!(sys.matches_pattern("ICRS * *"));
        assert!(!sys.matches_pattern("FK5 * *"));
        assert!(sys.matches_pattern("* * *"));
    }
}
