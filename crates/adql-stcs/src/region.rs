use adql_core::{AdqlError, AdqlResult, TextPosition};

use crate::coosys::CoordinateSystem;

/// A point in the region grammar's flat coordinate list.
pub type Coord = (f64, f64);

/// A parsed STC-S region (§4.5/C5). Both the DALI-compact numeric-only form
/// and the keyword-prefixed STC/s form parse into the same tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Position {
        coosys: CoordinateSystem,
        point: Coord,
    },
    Circle {
        coosys: CoordinateSystem,
        center: Coord,
        radius: f64,
    },
    Box {
        coosys: CoordinateSystem,
        center: Coord,
        width: f64,
        height: f64,
    },
    Polygon {
        coosys: CoordinateSystem,
        vertices: Vec<Coord>,
    },
    Union {
        coosys: CoordinateSystem,
        regions: Vec<Region>,
    },
    Intersection {
        coosys: CoordinateSystem,
        regions: Vec<Region>,
    },
    Not(Box<Region>),
}

struct Token<'a> {
    text: &'a str,
    offset: usize,
}

fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '(' || c == ')' {
            chars.next();
            tokens.push(Token {
                text: &raw[start..start + 1],
                offset: start,
            });
            continue;
        }
        let mut end = start + c.len_utf8();
        chars.next();
        while let Some(&(i, c2)) = chars.peek() {
            if c2.is_whitespace() || c2 == '(' || c2 == ')' {
                break;
            }
            end = i + c2.len_utf8();
            chars.next();
        }
        tokens.push(Token {
            text: &raw[start..end],
            offset: start,
        });
    }
    tokens
}

fn pos_at(offset: usize) -> TextPosition {
    TextPosition::at(1, offset + 1)
}

pub fn parse_region(raw: &str) -> AdqlResult<Region> {
    let tokens = tokenize(raw);
    let mut idx = 0;
    let region = parse_region_tokens(&tokens, &mut idx)?;
    if idx != tokens.len() {
        return Err(AdqlError::syntax(
            format!("Incorrect syntax: unexpected trailing token \"{}\"", tokens[idx].text),
            pos_at(tokens[idx].offset),
            vec![],
        ));
    }
    Ok(region)
}

fn parse_region_tokens(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<Region> {
    let keyword = tokens.get(*idx).map(|t| t.text.to_ascii_uppercase());
    match keyword.as_deref() {
        Some("NOT") => {
            *idx += 1;
            expect_token(tokens, idx, "(")?;
            let inner = parse_region_tokens(tokens, idx)?;
            expect_token(tokens, idx, ")")?;
            Ok(Region::Not(Box::new(inner)))
        }
        Some("POSITION") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let coords = take_numbers(tokens, idx, 2)?;
            Ok(Region::Position {
                coosys,
                point: (coords[0], coords[1]),
            })
        }
        Some("CIRCLE") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let coords = take_numbers(tokens, idx, 3)?;
            Ok(Region::Circle {
                coosys,
                center: (coords[0], coords[1]),
                radius: coords[2],
            })
        }
        Some("BOX") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let coords = take_numbers(tokens, idx, 4)?;
            Ok(Region::Box {
                coosys,
                center: (coords[0], coords[1]),
                width: coords[2],
                height: coords[3],
            })
        }
        Some("POLYGON") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let vertices = take_remaining_coord_pairs(tokens, idx)?;
            if vertices.len() < 3 {
                return Err(AdqlError::syntax(
                    "Incorrect syntax: a POLYGON requires at least 3 vertices",
                    tokens.get(*idx).map(|t| pos_at(t.offset)).unwrap_or_default(),
                    vec![],
                ));
            }
            Ok(Region::Polygon { coosys, vertices })
        }
        Some("UNION") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let regions = parse_parenthesized_region_list(tokens, idx)?;
            Ok(Region::Union { coosys, regions })
        }
        Some("INTERSECTION") => {
            *idx += 1;
            let coosys = parse_coosys_prefix(tokens, idx)?;
            let regions = parse_parenthesized_region_list(tokens, idx)?;
            Ok(Region::Intersection { coosys, regions })
        }
        _ => parse_dali_compact(tokens, idx),
    }
}

/// The coordinate-system prefix consumes as many leading tokens as match the
/// Frame/RefPos/Flavor vocabularies (see `CoordinateSystem::parse`), leaving
/// numeric tokens untouched.
fn parse_coosys_prefix(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<CoordinateSystem> {
    let mut consumed = Vec::new();
    while let Some(token) = tokens.get(*idx) {
        if token.text == "(" || token.text == ")" || token.text.parse::<f64>().is_ok() {
            break;
        }
        consumed.push(token.text);
        *idx += 1;
    }
    CoordinateSystem::parse(&consumed.join(" "))
}

fn take_numbers(tokens: &[Token<'_>], idx: &mut usize, count: usize) -> AdqlResult<Vec<f64>> {
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(take_number(tokens, idx)?);
    }
    Ok(values)
}

fn take_number(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<f64> {
    let token = tokens.get(*idx).ok_or_else(|| {
        AdqlError::syntax("Incorrect syntax: expected a number, found end of input", TextPosition::default(), vec!["<number>".into()])
    })?;
    let value = token.text.parse::<f64>().map_err(|_| {
        AdqlError::syntax(
            format!("Incorrect syntax: expected a number, found \"{}\"", token.text),
            pos_at(token.offset),
            vec!["<number>".into()],
        )
    })?;
    *idx += 1;
    Ok(value)
}

fn take_remaining_coord_pairs(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<Vec<Coord>> {
    let mut coords = Vec::new();
    while tokens.get(*idx).map(|t| t.text != ")" && t.text != "(").unwrap_or(false) {
        let lon = take_number(tokens, idx)?;
        let lat = take_number(tokens, idx)?;
        coords.push((lon, lat));
    }
    Ok(coords)
}

fn parse_parenthesized_region_list(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<Vec<Region>> {
    expect_token(tokens, idx, "(")?;
    let mut regions = Vec::new();
    while tokens.get(*idx).map(|t| t.text != ")").unwrap_or(false) {
        regions.push(parse_region_tokens(tokens, idx)?);
    }
    expect_token(tokens, idx, ")")?;
    if regions.len() < 2 {
        return Err(AdqlError::syntax(
            "Incorrect syntax: UNION/INTERSECTION requires at least 2 regions",
            tokens.get(*idx).map(|t| pos_at(t.offset)).unwrap_or_default(),
            vec![],
        ));
    }
    Ok(regions)
}

fn expect_token(tokens: &[Token<'_>], idx: &mut usize, expected: &str) -> AdqlResult<()> {
    match tokens.get(*idx) {
        Some(token) if token.text == expected => {
            *idx += 1;
            Ok(())
        }
        Some(token) => Err(AdqlError::syntax(
            format!("Incorrect syntax: expected \"{expected}\", found \"{}\"", token.text),
            pos_at(token.offset),
            vec![expected.to_string()],
        )),
        None => Err(AdqlError::syntax(
            format!("Incorrect syntax: expected \"{expected}\", found end of input"),
            TextPosition::default(),
            vec![expected.to_string()],
        )),
    }
}

/// The DALI-compact form: an optional coordinate-system prefix followed by a
/// bare list of numbers whose count selects the shape (2 → POSITION,
/// 3 → CIRCLE, 4 → BOX, even and ≥ 6 → POLYGON).
fn parse_dali_compact(tokens: &[Token<'_>], idx: &mut usize) -> AdqlResult<Region> {
    let coosys = parse_coosys_prefix(tokens, idx)?;
    let mut numbers = Vec::new();
    while let Some(token) = tokens.get(*idx) {
        if token.text == ")" || token.text == "(" {
            break;
        }
        numbers.push(take_number(tokens, idx)?);
    }
    match numbers.len() {
        2 => Ok(Region::Position {
            coosys,
            point: (numbers[0], numbers[1]),
        }),
        3 => Ok(Region::Circle {
            coosys,
            center: (numbers[0], numbers[1]),
            radius: numbers[2],
        }),
        4 => Ok(Region::Box {
            coosys,
            center: (numbers[0], numbers[1]),
            width: numbers[2],
            height: numbers[3],
        }),
        n if n >= 6 && n % 2 == 0 => {
            let vertices = numbers.chunks_exact(2).map(|c| (c[0], c[1])).collect();
            Ok(Region::Polygon { coosys, vertices })
        }
        n => Err(AdqlError::syntax(
            format!("Incorrect syntax: {n} numbers do not match any known region shape"),
            TextPosition::default(),
            vec!["2".into(), "3".into(), "4".into(), ">=6 (even)".into()],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coosys::Frame;

    #[test]
    fn dali_compact_three_numbers_is_a_circle() {
        let region = parse_region("1 2 3").unwrap();
        match region {
            Region::Circle { coosys, center, radius } => {
                assert!(coosys.is_default);
                assert_eq!(center, (1.0, 2.0));
                assert_eq!(radius, 3.0);
            }
            other => panic!("expected Circle, got {other:?}"),
        }
    }

    #[test]
    fn dali_compact_with_coosys_prefix() {
        let region = parse_region("ICRS 10.5 -20.25").unwrap();
        match region {
            Region::Position { coosys, point } => {
                assert_eq!(coosys.frame, Frame::Icrs);
                assert_eq!(point, (10.5, -20.25));
            }
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn keyword_prefixed_box() {
        let region = parse_region("BOX ICRS 1 2 3 4").unwrap();
        assert!(matches!(region, Region::Box { .. }));
    }

    #[test]
    fn polygon_requires_at_least_three_vertices() {
        assert!(parse_region("POLYGON ICRS 1 2 3 4").is_err());
        assert!(parse_region("POLYGON ICRS 1 2 3 4 5 6").is_ok());
    }

    #[test]
    fn union_of_two_circles() {
        let region = parse_region("UNION ICRS ( CIRCLE ICRS 1 2 3 CIRCLE ICRS 4 5 6 )").unwrap();
        match region {
            Region::Union { regions, .. } => assert_eq!(regions.len(), 2),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn not_wraps_a_single_region() {
        let region = parse_region("NOT ( CIRCLE ICRS 1 2 3 )").unwrap();
        assert!(matches!(region, Region::Not(_)));
    }
}
