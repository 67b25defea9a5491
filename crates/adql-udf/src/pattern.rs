use adql_core::{AdqlError, AdqlResult};

/// One piece of a parsed translation pattern (§4.4/§9).
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternPiece {
    Literal(String),
    /// `$N`: the Nth argument (1-indexed).
    ArgRef(usize),
    /// `$N..`: every argument from the Nth onward, comma-joined.
    ArgSplice(usize),
    /// `$N?{then}{else}`: `then` if argument N was supplied, `else` otherwise.
    Ternary(usize, Vec<PatternPiece>, Vec<PatternPiece>),
}

/// A parsed translation pattern, ready to be applied to call arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pieces: Vec<PatternPiece>,
}

impl Pattern {
    pub fn parse(raw: &str) -> AdqlResult<Self> {
        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;
        let pieces = parse_pieces(&chars, &mut pos, false)?;
        if pos != chars.len() {
            return Err(AdqlError::syntax(
                format!("unexpected '{}' in translation pattern", chars[pos]),
                Default::default(),
                vec!["}".into()],
            ));
        }
        Ok(Pattern { pieces })
    }

    /// Validates that every `$N`/`$N..` reference stays within
    /// `1..=n_params` (a caller-chosen bound on the number of
    /// pattern-referenceable trailing slots, independent of the function's
    /// strictly-declared arity -- some patterns legitimately reference a
    /// slot beyond the declared params to cover an optional trailing
    /// argument the translator may or may not receive at call time).
    pub fn check(&self, n_params: usize) -> AdqlResult<()> {
        check_pieces(&self.pieces, n_params)
    }

    /// Expands the pattern against the actual call-site arguments. A `$N`
    /// or `$N..` reference beyond `args.len()` expands to an empty string,
    /// which in turn drives a `Ternary`'s else-branch.
    pub fn apply(&self, args: &[String]) -> String {
        let mut out = String::new();
        apply_pieces(&self.pieces, args, &mut out);
        out
    }
}

fn check_pieces(pieces: &[PatternPiece], n_params: usize) -> AdqlResult<()> {
    for piece in pieces {
        match piece {
            PatternPiece::Literal(_) => {}
            PatternPiece::ArgRef(n) | PatternPiece::ArgSplice(n) => {
                if *n == 0 || *n > n_params {
                    return Err(AdqlError::syntax(
                        format!("pattern references argument ${n} but only {n_params} are allowed"),
                        Default::default(),
                        vec![],
                    ));
                }
            }
            PatternPiece::Ternary(n, then_branch, else_branch) => {
                if *n == 0 || *n > n_params {
                    return Err(AdqlError::syntax(
                        format!("pattern references argument ${n} but only {n_params} are allowed"),
                        Default::default(),
                        vec![],
                    ));
                }
                check_pieces(then_branch, n_params)?;
                check_pieces(else_branch, n_params)?;
            }
        }
    }
    Ok(())
}

fn apply_pieces(pieces: &[PatternPiece], args: &[String], out: &mut String) {
    for piece in pieces {
        match piece {
            PatternPiece::Literal(s) => out.push_str(s),
            PatternPiece::ArgRef(n) => {
                if let Some(arg) = args.get(n - 1) {
                    out.push_str(arg);
                }
            }
            PatternPiece::ArgSplice(n) => {
                if *n <= args.len() {
                    let joined = args[n - 1..].join(", ");
                    out.push_str(&joined);
                }
            }
            PatternPiece::Ternary(n, then_branch, else_branch) => {
                if *n <= args.len() {
                    apply_pieces(then_branch, args, out);
                } else {
                    apply_pieces(else_branch, args, out);
                }
            }
        }
    }
}

/// Recursive-descent over the pattern's char stream. `in_branch` stops at
/// an unescaped `}` so ternary branches can be parsed as nested calls.
fn parse_pieces(chars: &[char], pos: &mut usize, in_branch: bool) -> AdqlResult<Vec<PatternPiece>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    while *pos < chars.len() {
        let c = chars[*pos];
        if in_branch && c == '}' {
            break;
        }
        if c == '$' {
            *pos += 1;
            if chars.get(*pos) == Some(&'$') {
                *pos += 1;
                literal.push('$');
                continue;
            }
            flush_literal(&mut pieces, &mut literal);
            pieces.push(parse_dollar(chars, pos)?);
        } else {
            literal.push(c);
            *pos += 1;
        }
    }
    flush_literal(&mut pieces, &mut literal);
    Ok(pieces)
}

fn flush_literal(pieces: &mut Vec<PatternPiece>, literal: &mut String) {
    if !literal.is_empty() {
        pieces.push(PatternPiece::Literal(std::mem::take(literal)));
    }
}

fn parse_dollar(chars: &[char], pos: &mut usize) -> AdqlResult<PatternPiece> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if *pos == start {
        return Err(AdqlError::syntax(
            "expected a digit after '$' in translation pattern",
            Default::default(),
            vec!["$N".into()],
        ));
    }
    let n: usize = chars[start..*pos]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| AdqlError::syntax("argument index too large", Default::default(), vec![]))?;

    if chars[*pos..].starts_with(&['.', '.']) {
        *pos += 2;
        return Ok(PatternPiece::ArgSplice(n));
    }

    if chars.get(*pos) == Some(&'?') {
        *pos += 1;
        expect(chars, pos, '{')?;
        let then_branch = parse_pieces(chars, pos, true)?;
        expect(chars, pos, '}')?;
        expect(chars, pos, '{')?;
        let else_branch = parse_pieces(chars, pos, true)?;
        expect(chars, pos, '}')?;
        return Ok(PatternPiece::Ternary(n, then_branch, else_branch));
    }

    Ok(PatternPiece::ArgRef(n))
}

fn expect(chars: &[char], pos: &mut usize, expected: char) -> AdqlResult<()> {
    if chars.get(*pos) == Some(&expected) {
        *pos += 1;
        Ok(())
    } else {
        Err(AdqlError::syntax(
            format!("expected '{expected}' in translation pattern"),
            Default::default(),
            vec![expected.to_string()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only_pattern_passes_through() {
        let p = Pattern::parse("NOW()").unwrap();
        assert_eq!(p.apply(&[]), "NOW()");
    }

    #[test]
    fn simple_arg_refs_are_substituted() {
        let p = Pattern::parse("POWER($1, $2)").unwrap();
        assert_eq!(p.apply(&["x".into(), "2".into()]), "POWER(x, 2)");
    }

    #[test]
    fn arg_splice_joins_remaining_args() {
        let p = Pattern::parse("CONCAT($1..)").unwrap();
        assert_eq!(p.apply(&["a".into(), "b".into(), "c".into()]), "CONCAT(a, b, c)");
    }

    #[test]
    fn ternary_picks_then_when_argument_supplied() {
        let p = Pattern::parse("f($1?{yes}{no})").unwrap();
        assert_eq!(p.apply(&["1".into()]), "f(yes)");
        assert_eq!(p.apply(&[]), "f(no)");
    }

    #[test]
    fn scenario_six_worked_example() {
        let p = Pattern::parse("anyFunction($1$2?{, $2*10}{}$4?{, $4+10}{, 0})").unwrap();
        p.check(4).unwrap();
        let args = vec!["'Blabla'".to_string(), "123".to_string(), "1.23".to_string()];
        assert_eq!(p.apply(&args), "anyFunction('Blabla', 123*10, 0)");
    }

    #[test]
    fn check_rejects_reference_past_bound() {
        let p = Pattern::parse("f($5)").unwrap();
        assert!(p.check(4).is_err());
        assert!(p.check(5).is_ok());
    }

    #[test]
    fn double_dollar_escapes_to_literal_dollar() {
        let p = Pattern::parse("cost: $$$1").unwrap();
        assert_eq!(p.apply(&["5".into()]), "cost: $5");
    }

    #[test]
    fn leading_zeros_are_not_an_escape() {
        let p = Pattern::parse("$01").unwrap();
        assert_eq!(p.apply(&["x".into()]), "x");
    }

    #[test]
    fn bare_dollar_at_end_of_string_is_an_error() {
        assert!(Pattern::parse("trailing $").is_err());
    }
}
