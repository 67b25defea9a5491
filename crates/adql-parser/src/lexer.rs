use adql_core::{AdqlError, AdqlResult, TextPosition};

/// A lexical token of the ADQL grammar, paired with its source span.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A keyword or regular identifier, as written (case preserved; the
    /// parser decides keyword-ness by case-insensitive comparison).
    Word(String),
    /// A double-quote-delimited identifier, already unescaped of its `""`
    /// pairs but still carrying its original quoted text for diagnostics.
    DelimitedIdentifier(String),
    Number(String),
    StringConstant(String),
    /// `+ - * / || ( ) , . = < > <= >= <> !=`
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: TextPosition,
}

pub struct Lexer<'a> {
    chars: Vec<char>,
    src: &'a str,
    idx: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            src,
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(mut self) -> AdqlResult<Vec<SpannedToken>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (line, col) = (self.line, self.col);
            let Some(c) = self.peek() else {
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    position: TextPosition::at(line, col),
                });
                break;
            };

            let token = if c == '"' {
                self.lex_delimited_identifier()?
            } else if c == '\'' {
                self.lex_string_constant()?
            } else if c.is_ascii_digit() {
                self.lex_number()
            } else if is_identifier_start(c) {
                self.lex_word()
            } else {
                self.lex_punct()?
            };

            let end = (self.line, self.col);
            tokens.push(SpannedToken {
                token,
                position: TextPosition::new(line, col, end.0, end.1),
            });
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_position(&self) -> TextPosition {
        TextPosition::at(self.line, self.col)
    }

    fn lex_delimited_identifier(&mut self) -> AdqlResult<Token> {
        let start = self.current_position();
        self.advance();
        let mut text = String::from("\"");
        loop {
            match self.advance() {
                None => {
                    return Err(AdqlError::syntax("unterminated delimited identifier", start, vec!["\"".into()]));
                }
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.advance();
                        text.push_str("\"\"");
                    } else {
                        text.push('"');
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Token::DelimitedIdentifier(text))
    }

    fn lex_string_constant(&mut self) -> AdqlResult<Token> {
        let start = self.current_position();
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                None => return Err(AdqlError::syntax("unterminated string constant", start, vec!["'".into()])),
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                        text.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Token::StringConstant(text))
    }

    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.idx;
            let mut exp = String::new();
            exp.push(self.advance().unwrap());
            if matches!(self.peek(), Some('+') | Some('-')) {
                exp.push(self.advance().unwrap());
            }
            let mut has_digits = false;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    has_digits = true;
                    exp.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            if has_digits {
                text.push_str(&exp);
            } else {
                self.idx = mark;
            }
        }
        Token::Number(text)
    }

    fn lex_word(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_identifier_part(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Word(text)
    }

    fn lex_punct(&mut self) -> AdqlResult<Token> {
        let start = self.current_position();
        let c = self.advance().unwrap();
        let punct = match c {
            '|' if self.peek() == Some('|') => {
                self.advance();
                "||"
            }
            '<' if self.peek() == Some('=') => {
                self.advance();
                "<="
            }
            '>' if self.peek() == Some('=') => {
                self.advance();
                ">="
            }
            '<' if self.peek() == Some('>') => {
                self.advance();
                "<>"
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                "!="
            }
            '+' => "+",
            '-' => "-",
            '*' => "*",
            '/' => "/",
            '(' => "(",
            ')' => ")",
            ',' => ",",
            '.' => ".",
            '=' => "=",
            '<' => "<",
            '>' => ">",
            _ => return Err(AdqlError::syntax(format!("unexpected character '{c}'"), start, vec![])),
        };
        Ok(Token::Punct(punct))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn tokenize(src: &str) -> AdqlResult<Vec<SpannedToken>> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_select() {
        let tokens = tokenize("SELECT ra FROM t").unwrap();
        let words: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.token {
                Token::Word(w) => Some(w.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(words, vec!["SELECT", "ra", "FROM", "t"]);
    }

    #[test]
    fn delimited_identifier_preserves_escaped_quotes() {
        let tokens = tokenize("\"a\"\"b\"").unwrap();
        assert_eq!(tokens[0].token, Token::DelimitedIdentifier("\"a\"\"b\"".into()));
    }

    #[test]
    fn string_constant_unescapes_doubled_quote() {
        let tokens = tokenize("'it''s'").unwrap();
        assert_eq!(tokens[0].token, Token::StringConstant("it's".into()));
    }

    #[test]
    fn number_with_exponent() {
        let tokens = tokenize("1.5e-10").unwrap();
        assert_eq!(tokens[0].token, Token::Number("1.5e-10".into()));
    }

    #[test]
    fn line_comment_is_skipped() {
        let tokens = tokenize("SELECT 1 -- comment\nFROM t").unwrap();
        let words: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.token {
                Token::Word(w) => Some(w.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(words, vec!["SELECT", "FROM", "t"]);
    }
}
