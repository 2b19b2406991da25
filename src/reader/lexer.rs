/*!
The tokenizer.

Whitespace, `%` line comments, and `/* … */` block comments separate tokens and are otherwise skipped.
A `.` followed by layout, a comment, or the end of input is the [End](Token::End) token which closes a term; any other `.` begins or continues a symbolic atom, so `0..9` reads as an integer, the atom `..`, and another integer.

An open parenthesis immediately after a name, with no layout between, is [OpenCT](Token::OpenCT): the argument list of a compound.
With layout between it is plain grouping, which is how `foo (1,2)` differs from `foo(1,2)`.
*/

use num_bigint::BigInt;

use crate::structures::term::SYMBOL_CHARS;
use crate::structures::{RTerm, Term};
use crate::types::err::ParseError;

/// A token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// An atom-like name: unquoted, quoted, symbolic, or solo.
    Name(String),

    /// A variable name, beginning upper-case or with `_`.
    Var(String),

    /// An integer literal.
    Int(BigInt),

    /// A float literal.
    Float(f64),

    /// A double-quoted string.
    Str(String),

    /// `(` with layout before it: grouping.
    Open,

    /// `(` immediately after a name: a compound's argument list.
    OpenCT,

    /// `)`
    Close,

    /// `[`
    OpenList,

    /// `]`
    CloseList,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// `,`
    Comma,

    /// `|`
    Bar,

    /// The `.` which ends a term.
    End,
}

/// A token with the line it began on.
#[derive(Clone, Debug)]
pub struct Lexed {
    pub token: Token,
    pub line: usize,
}

/// The tokenizer.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,

    /// True when the previous token was a name and no layout has intervened.
    name_attached: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            name_attached: false,
        }
    }

    /// Tokenizes the whole of the source.
    pub fn tokenize(source: &str) -> Result<Vec<Lexed>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::default();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skips layout and comments, reporting whether anything was skipped.
    fn skip_layout(&mut self) -> Result<bool, ParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }

                Some('%') => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }

                Some('/') if self.peek_at(1) == Some('*') => {
                    let open_line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(ParseError::Unterminated(open_line)),
                        }
                    }
                }

                _ => break,
            }
        }
        Ok(self.pos != start)
    }

    /// The next token, or [None] at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Lexed>, ParseError> {
        if self.skip_layout()? {
            self.name_attached = false;
        }

        let line = self.line;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let was_attached = self.name_attached;
        self.name_attached = false;

        let token = match c {
            '(' => {
                self.bump();
                match was_attached {
                    true => Token::OpenCT,
                    false => Token::Open,
                }
            }
            ')' => {
                self.bump();
                Token::Close
            }
            '[' => {
                self.bump();
                Token::OpenList
            }
            ']' => {
                self.bump();
                self.name_attached = true;
                Token::CloseList
            }
            '{' => {
                self.bump();
                Token::OpenCurly
            }
            '}' => {
                self.bump();
                self.name_attached = true;
                Token::CloseCurly
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            '|' => {
                self.bump();
                Token::Bar
            }

            ';' => {
                self.bump();
                self.name_attached = true;
                Token::Name(";".to_string())
            }
            '!' => {
                self.bump();
                self.name_attached = true;
                Token::Name("!".to_string())
            }

            '\'' => {
                self.bump();
                let text = self.quoted('\'')?;
                self.name_attached = true;
                Token::Name(text)
            }

            '"' => {
                self.bump();
                let text = self.quoted('"')?;
                Token::Str(text)
            }

            '_' => {
                let text = self.identifier();
                Token::Var(text)
            }

            c if c.is_ascii_uppercase() => {
                let text = self.identifier();
                Token::Var(text)
            }

            c if c.is_ascii_lowercase() => {
                let text = self.identifier();
                self.name_attached = true;
                Token::Name(text)
            }

            c if c.is_ascii_digit() => {
                let token = self.number()?;
                token
            }

            '.' => {
                // Terminator, or the start of a symbolic atom.
                match self.peek_at(1) {
                    None => {
                        self.bump();
                        Token::End
                    }
                    Some(next) if next.is_whitespace() || next == '%' => {
                        self.bump();
                        Token::End
                    }
                    _ => {
                        let text = self.symbolic();
                        self.name_attached = true;
                        Token::Name(text)
                    }
                }
            }

            c if SYMBOL_CHARS.contains(c) => {
                let text = self.symbolic();
                self.name_attached = true;
                Token::Name(text)
            }

            other => {
                return Err(ParseError::Unexpected(line, format!("character '{other}'")));
            }
        };

        Ok(Some(Lexed { token, line }))
    }

    fn identifier(&mut self) -> String {
        let mut text = String::default();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    fn symbolic(&mut self) -> String {
        let mut text = String::default();
        while let Some(c) = self.peek() {
            if SYMBOL_CHARS.contains(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    /// The body of a quoted atom or string, after the opening quote.
    fn quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let open_line = self.line;
        let mut text = String::default();

        loop {
            match self.bump() {
                None => return Err(ParseError::Unterminated(open_line)),

                Some(c) if c == quote => {
                    // A doubled quote is a literal quote character.
                    if self.peek() == Some(quote) {
                        self.bump();
                        text.push(quote);
                    } else {
                        return Ok(text);
                    }
                }

                Some('\\') => match self.escape()? {
                    Some(c) => text.push(c),
                    None => {}
                },

                Some(c) => text.push(c),
            }
        }
    }

    /// One escape sequence, after the backslash. [None] for a line continuation.
    fn escape(&mut self) -> Result<Option<char>, ParseError> {
        let line = self.line;
        match self.bump() {
            None => Err(ParseError::BadEscape(line)),
            Some('n') => Ok(Some('\n')),
            Some('t') => Ok(Some('\t')),
            Some('r') => Ok(Some('\r')),
            Some('a') => Ok(Some('\x07')),
            Some('b') => Ok(Some('\x08')),
            Some('f') => Ok(Some('\x0c')),
            Some('v') => Ok(Some('\x0b')),
            Some('0') => Ok(Some('\0')),
            Some('\\') => Ok(Some('\\')),
            Some('\'') => Ok(Some('\'')),
            Some('"') => Ok(Some('"')),
            Some('`') => Ok(Some('`')),
            Some('\n') => Ok(None),
            Some('x') => {
                let mut value = 0_u32;
                let mut any = false;
                while let Some(c) = self.peek() {
                    match c.to_digit(16) {
                        Some(digit) => {
                            value = value * 16 + digit;
                            any = true;
                            self.bump();
                        }
                        None => break,
                    }
                }
                if self.peek() == Some('\\') {
                    self.bump();
                }
                match any {
                    true => char::from_u32(value)
                        .map(Some)
                        .ok_or(ParseError::BadEscape(line)),
                    false => Err(ParseError::BadEscape(line)),
                }
            }
            Some(_) => Err(ParseError::BadEscape(line)),
        }
    }

    /// A numeric literal: decimal, based, char-code, or float.
    fn number(&mut self) -> Result<Token, ParseError> {
        let line = self.line;

        // Based and char-code literals hang off a leading zero.
        if self.peek() == Some('0') {
            match self.peek_at(1) {
                Some('\'') => {
                    self.bump();
                    self.bump();
                    let code = match self.bump() {
                        None => return Err(ParseError::BadNumber(line)),
                        Some('\\') => match self.escape()? {
                            Some(c) => c as u32,
                            None => return Err(ParseError::BadEscape(line)),
                        },
                        Some('\'') => {
                            // 0''' and 0'' both give the quote character.
                            if self.peek() == Some('\'') {
                                self.bump();
                            }
                            '\'' as u32
                        }
                        Some(c) => c as u32,
                    };
                    return Ok(Token::Int(BigInt::from(code)));
                }

                Some('x') | Some('o') | Some('b') => {
                    let radix = match self.peek_at(1) {
                        Some('x') => 16,
                        Some('o') => 8,
                        _ => 2,
                    };
                    self.bump();
                    self.bump();

                    let mut value = BigInt::from(0);
                    let mut any = false;
                    while let Some(c) = self.peek() {
                        match c.to_digit(radix) {
                            Some(digit) => {
                                value = value * radix + digit;
                                any = true;
                                self.bump();
                            }
                            None => break,
                        }
                    }
                    return match any {
                        true => Ok(Token::Int(value)),
                        false => Err(ParseError::BadNumber(line)),
                    };
                }

                _ => {}
            }
        }

        let mut text = String::default();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }

        // A fraction continues the literal only when a digit follows the point.
        let mut float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            float = true;
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }

        if float && matches!(self.peek(), Some('e') | Some('E')) {
            let mut offset = 1;
            if matches!(self.peek_at(1), Some('+') | Some('-')) {
                offset = 2;
            }
            if self.peek_at(offset).is_some_and(|c| c.is_ascii_digit()) {
                text.push('e');
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    text.push(self.bump().expect("sign peeked"));
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        match float {
            true => text
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ParseError::BadNumber(line)),
            false => text
                .parse::<BigInt>()
                .map(Token::Int)
                .map_err(|_| ParseError::BadNumber(line)),
        }
    }
}

/// Reads a complete number from text, as `atom_number/2` and `number_codes/2` require.
///
/// The text must be exactly one optionally signed numeric literal.
pub fn parse_number(text: &str) -> Option<RTerm> {
    let tokens = Lexer::tokenize(text.trim()).ok()?;

    let (sign, rest) = match tokens.split_first() {
        Some((
            Lexed {
                token: Token::Name(name),
                ..
            },
            rest,
        )) if name == "-" => (-1, rest),
        _ => (1, tokens.as_slice()),
    };

    match rest {
        [Lexed {
            token: Token::Int(value),
            ..
        }] => Some(std::rc::Rc::new(Term::Int(value.clone() * sign))),
        [Lexed {
            token: Token::Float(value),
            ..
        }] => Some(Term::float(*value * sign as f64)),
        _ => None,
    }
}

#[cfg(test)]
mod lexer_tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::tokenize(source)
            .expect("lexes")
            .into_iter()
            .map(|lexed| lexed.token)
            .collect()
    }

    #[test]
    fn clause_shapes() {
        assert_eq!(
            tokens("likes(alice, prolog)."),
            vec![
                Token::Name("likes".to_string()),
                Token::OpenCT,
                Token::Name("alice".to_string()),
                Token::Comma,
                Token::Name("prolog".to_string()),
                Token::Close,
                Token::End,
            ]
        );
    }

    #[test]
    fn attached_parens_differ_from_grouping() {
        assert_eq!(tokens("f(")[1], Token::OpenCT);
        assert_eq!(tokens("f (")[1], Token::Open);
    }

    #[test]
    fn dots_and_terminators() {
        // 0..1 keeps its range dots; the final dot ends the term.
        assert_eq!(
            tokens("0..1."),
            vec![
                Token::Int(0.into()),
                Token::Name("..".to_string()),
                Token::Int(1.into()),
                Token::End,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(tokens("42")[0], Token::Int(42.into()));
        assert_eq!(tokens("0xff")[0], Token::Int(255.into()));
        assert_eq!(tokens("0o17")[0], Token::Int(15.into()));
        assert_eq!(tokens("0b101")[0], Token::Int(5.into()));
        assert_eq!(tokens("0'a")[0], Token::Int(97.into()));
        assert_eq!(tokens("0'\\n")[0], Token::Int(10.into()));
        assert_eq!(tokens("3.25")[0], Token::Float(3.25));
        assert_eq!(tokens("1.0e3")[0], Token::Float(1000.0));
    }

    #[test]
    fn trailing_dot_after_integer_ends_the_term() {
        assert_eq!(
            tokens("X = 1."),
            vec![
                Token::Var("X".to_string()),
                Token::Name("=".to_string()),
                Token::Int(1.into()),
                Token::End,
            ]
        );
    }

    #[test]
    fn quoted_atoms_escape() {
        assert_eq!(tokens("'two words'")[0], Token::Name("two words".to_string()));
        assert_eq!(tokens("'it''s'")[0], Token::Name("it's".to_string()));
        assert_eq!(tokens("'line\\n'")[0], Token::Name("line\n".to_string()));
        assert_eq!(tokens("'\\x41\\'")[0], Token::Name("A".to_string()));
    }

    #[test]
    fn comments_are_layout() {
        assert_eq!(
            tokens("a % trailing\n/* block */ b"),
            vec![Token::Name("a".to_string()), Token::Name("b".to_string())]
        );
    }

    #[test]
    fn read_numbers_from_text() {
        assert!(matches!(
            parse_number("42").as_deref(),
            Some(Term::Int(value)) if *value == 42.into()
        ));
        assert!(parse_number("abc").is_none());
        assert!(parse_number("1 2").is_none());
        assert!(matches!(
            parse_number("-7").as_deref(),
            Some(Term::Int(value)) if *value == (-7).into()
        ));
    }
}
