use adql_core::{AdqlError, AdqlResult};
use adql_parser::ast::GeometryFunctionKind;
use adql_stcs::{CoordinateSystem, Flavor, Frame, RefPos, Region};

use crate::dialect::Dialect;
use crate::dialects::postgres::PostgresDialect;

/// PostgreSQL with the PgSphere spherical-geometry extension: the only
/// dialect in this crate that can express ADQL's geometry functions and
/// round-trip `POINT`/`REGION` result values through a native column type
/// (§4.9).
///
/// Delegates everything but geometry to [`PostgresDialect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PgSphereDialect {
    postgres: PostgresDialect,
}

impl Dialect for PgSphereDialect {
    fn name(&self) -> &'static str {
        "postgresql+pgsphere"
    }

    fn quote(&self, name: &str, case_sensitive: bool) -> String {
        self.postgres.quote(name, case_sensitive)
    }

    fn translate_math_fn(&self, name: &str, args: &[String]) -> Option<String> {
        self.postgres.translate_math_fn(name, args)
    }

    fn translate_geometry_fn(&self, kind: GeometryFunctionKind, args: &[String]) -> Option<String> {
        use GeometryFunctionKind::*;
        Some(match kind {
            Point => format!("spoint(radians({}), radians({}))", args[1], args[2]),
            Circle => format!("scircle(spoint(radians({}), radians({})), radians({}))", args[1], args[2], args[3]),
            Box => {
                let (ra, dec, w, h) = (&args[1], &args[2], &args[3], &args[4]);
                format!(
                    "sbox(spoint(radians(({ra}) - ({w})/2.0), radians(({dec}) - ({h})/2.0)), \
                     spoint(radians(({ra}) + ({w})/2.0), radians(({dec}) + ({h})/2.0)))"
                )
            }
            Polygon => {
                let points = args[1..]
                    .chunks_exact(2)
                    .map(|pair| format!("spoint(radians({}), radians({}))", pair[0], pair[1]))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("spoly(ARRAY[{points}])")
            }
            // A non-literal STC-S string can't be rewritten without
            // evaluating it; fall back to the default ADQL-like call so
            // the caller sees a clear "can't translate" failure downstream
            // rather than a silently wrong spoly literal.
            Region => return None,
            Contains => format!("(({}) @> ({}))::smallint", args[1], args[0]),
            Intersects => format!("(({}) && ({}))::smallint", args[0], args[1]),
            Distance => format!("degrees(({}) <-> ({}))", args[0], args[1]),
            Area => format!("area({})", args[0]),
            Centroid => format!("center({})", args[0]),
            Coord1 => format!("degrees(long({}))", args[0]),
            Coord2 => format!("degrees(lat({}))", args[0]),
            // PgSphere values carry no frame metadata of their own; ICRS is
            // the only frame this dialect's geometry functions assume.
            Coordsys => "'ICRS GEOCENTER'".to_string(),
        })
    }

    fn translate_geometry_from_db(&self, value: &str) -> AdqlResult<Region> {
        parse_pgsphere_value(value)
    }

    fn translate_geometry_to_db(&self, region: &Region) -> AdqlResult<String> {
        render_pgsphere_value(region)
    }
}

fn icrs() -> CoordinateSystem {
    CoordinateSystem {
        frame: Frame::Icrs,
        refpos: RefPos::Geocenter,
        flavor: Flavor::Spherical2,
        is_default: false,
    }
}

/// Parses one of PgSphere's own textual output forms: `spoint`/`(lon,lat)`,
/// `scircle`/`<(lon,lat),radius>`, `sbox`/`(lon1,lat1),(lon2,lat2)`, or
/// `spoly`/`{(lon,lat),...}`. Each angle accepts either a bare radians
/// float or the common `DdMm'Ss"`/`HhMmSs` sexagesimal forms.
fn parse_pgsphere_value(raw: &str) -> AdqlResult<Region> {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let close = inner
            .find(')')
            .ok_or_else(|| bad_value(raw, "expected a \"(lon,lat)\" pair inside scircle"))?;
        let (lon, lat) = parse_point_body(&inner[1..close])?;
        let radius_str = inner[close + 1..].trim_start_matches(',').trim();
        let radius = parse_angle(radius_str)?;
        return Ok(Region::Circle {
            coosys: icrs(),
            center: (lon, lat),
            radius: radius.to_degrees(),
        });
    }
    if let Some(inner) = trimmed.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let vertices = parse_points(inner)?;
        return Ok(Region::Polygon { coosys: icrs(), vertices });
    }
    let points = parse_points(trimmed)?;
    match points.len() {
        1 => Ok(Region::Position {
            coosys: icrs(),
            point: points[0],
        }),
        2 => {
            let (lon1, lat1) = points[0];
            let (lon2, lat2) = points[1];
            Ok(Region::Box {
                coosys: icrs(),
                center: ((lon1 + lon2) / 2.0, (lat1 + lat2) / 2.0),
                width: (lon2 - lon1).abs(),
                height: (lat2 - lat1).abs(),
            })
        }
        n => Err(bad_value(raw, &format!("{n} coordinate pairs do not match spoint/sbox/spoly"))),
    }
}

fn render_pgsphere_value(region: &Region) -> AdqlResult<String> {
    match region {
        Region::Position { point, .. } => Ok(format!("spoint({}, {})", point.0.to_radians(), point.1.to_radians())),
        Region::Circle { center, radius, .. } => Ok(format!(
            "scircle(spoint({}, {}), {})",
            center.0.to_radians(),
            center.1.to_radians(),
            radius.to_radians()
        )),
        Region::Box { center, width, height, .. } => {
            let (lon, lat) = *center;
            Ok(format!(
                "sbox(spoint({}, {}), spoint({}, {}))",
                (lon - width / 2.0).to_radians(),
                (lat - height / 2.0).to_radians(),
                (lon + width / 2.0).to_radians(),
                (lat + height / 2.0).to_radians()
            ))
        }
        Region::Polygon { vertices, .. } => {
            let points = vertices
                .iter()
                .map(|(lon, lat)| format!("spoint({}, {})", lon.to_radians(), lat.to_radians()))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!("spoly(ARRAY[{points}])"))
        }
        Region::Union { .. } | Region::Intersection { .. } | Region::Not(_) => {
            Err(AdqlError::translation("PgSphere has no native type for UNION/INTERSECTION/NOT regions"))
        }
    }
}

fn parse_points(s: &str) -> AdqlResult<Vec<(f64, f64)>> {
    let mut points = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        rest = rest.trim_start_matches(',').trim();
        if rest.is_empty() {
            break;
        }
        if !rest.starts_with('(') {
            return Err(bad_value(s, "expected '(' starting a coordinate pair"));
        }
        let close = rest
            .find(')')
            .ok_or_else(|| bad_value(s, "unterminated coordinate pair"))?;
        let (lon, lat) = parse_point_body(&rest[1..close])?;
        points.push((lon, lat));
        rest = rest[close + 1..].trim();
    }
    Ok(points)
}

fn parse_point_body(body: &str) -> AdqlResult<(f64, f64)> {
    let comma = body.find(',').ok_or_else(|| bad_value(body, "expected \"lon,lat\""))?;
    let lon = parse_angle(body[..comma].trim())?.to_degrees();
    let lat = parse_angle(body[comma + 1..].trim())?.to_degrees();
    Ok((lon, lat))
}

/// Parses one angle token as radians, returning radians either way:
/// a bare float is already radians; `<n>h<n>m<n>s` is hours-minutes-seconds
/// of right ascension; `<sign><n>d<n>m<n>s` is degrees-minutes-seconds.
fn parse_angle(token: &str) -> AdqlResult<f64> {
    if let Ok(radians) = token.parse::<f64>() {
        return Ok(radians);
    }
    if let Some(degrees) = parse_sexagesimal(token, 'h', 15.0).or_else(|| parse_sexagesimal(token, 'd', 1.0)) {
        return Ok(degrees.to_radians());
    }
    Err(bad_value(token, "not a radians float or h/m/s, d/m/s angle"))
}

/// Parses `<sign><N><unit>[<N>m][<N>[.f]s]`, returning degrees. `scale`
/// converts the leading unit into degrees (15 for hours, 1 for degrees).
fn parse_sexagesimal(token: &str, unit: char, scale: f64) -> Option<f64> {
    let (sign, rest) = match token.strip_prefix('-') {
        Some(r) => (-1.0, r),
        None => (1.0, token.strip_prefix('+').unwrap_or(token)),
    };
    let (whole, rest) = split_on(rest, unit)?;
    let whole: f64 = whole.parse().ok()?;
    let (minutes, rest) = split_on(rest, 'm').unwrap_or(("0", rest));
    let minutes: f64 = minutes.parse().ok()?;
    let seconds = rest.strip_suffix('s').unwrap_or(rest);
    let seconds: f64 = if seconds.is_empty() { 0.0 } else { seconds.parse().ok()? };
    Some(sign * scale * (whole + minutes / 60.0 + seconds / 3600.0))
}

fn split_on(s: &str, marker: char) -> Option<(&str, &str)> {
    let idx = s.find(marker)?;
    Some((&s[..idx], &s[idx + marker.len_utf8()..]))
}

fn bad_value(raw: &str, why: &str) -> AdqlError {
    AdqlError::translation(format!("cannot parse PgSphere value \"{raw}\": {why}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_radians_point() {
        let region = parse_pgsphere_value("(0.1,0.2)").unwrap();
        match region {
            Region::Position { point, .. } => {
                assert!((point.0 - 0.1f64.to_degrees()).abs() < 1e-9);
            }
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn parses_circle_with_sexagesimal_center() {
        let region = parse_pgsphere_value("<(10h30m0s,+20d0m0s),0.01>").unwrap();
        match region {
            Region::Circle { center, radius, .. } => {
                assert!((center.0 - 157.5).abs() < 1e-6);
                assert!((center.1 - 20.0).abs() < 1e-6);
                assert!(radius > 0.0);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn parses_polygon() {
        let region = parse_pgsphere_value("{(0,0),(0.1,0),(0.05,0.1)}").unwrap();
        assert!(matches!(region, Region::Polygon { .. }));
    }

    #[test]
    fn renders_point_as_spoint_call() {
        let region = Region::Position {
            coosys: icrs(),
            point: (90.0, 0.0),
        };
        let sql = render_pgsphere_value(&region).unwrap();
        assert!(sql.starts_with("spoint("));
    }

    #[test]
    fn point_function_translates_with_radians() {
        let d = PgSphereDialect::default();
        let sql = d
            .translate_geometry_fn(GeometryFunctionKind::Point, &["'ICRS'".into(), "ra".into(), "dec".into()])
            .unwrap();
        assert_eq!(sql, "spoint(radians(ra), radians(dec))");
    }

    #[test]
    fn contains_swaps_operand_order_for_the_at_gt_operator() {
        let d = PgSphereDialect::default();
        let sql = d.translate_geometry_fn(GeometryFunctionKind::Contains, &["p".into(), "c".into()]).unwrap();
        assert_eq!(sql, "((c) @> (p))::smallint");
    }
}
