/*!
The operator-precedence term parser.

Terms are parsed by precedence climbing over the current operator table.
With priorities running 1--1200 and higher values binding looser, a term is read at a maximum priority: 1200 at top level, 999 inside argument lists and list elements (the priority just under `,` at 1000).

For an infix operator of priority P, the left argument must have parsed at priority P-1 (`xf…`) or P (`yf…`), and the right argument is read at P-1 (`…fx`) or P (`…fy`).
Prefix operators read their argument at P-1 (`fx`) or P (`fy`).
A `-` or `+` immediately before a numeric literal folds into a signed literal instead of applying as an operator.

The parser consults the operator table through a [RefCell] on each decision, so a directive executed between terms is visible to the very next term.
Variables are scoped per term: every occurrence of a name within one term is the same variable, and `_` is always fresh.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::DoubleQuotes;
use crate::db::operators::{OperatorTable, OpSpec};
use crate::reader::lexer::{Lexed, Lexer, Token};
use crate::structures::{RTerm, Term, Variable};
use crate::types::err::ParseError;

/// A term read from source, with the named variables it mentions in order of first occurrence.
#[derive(Clone, Debug)]
pub struct ReadTerm {
    pub term: RTerm,

    /// Pairs of written name and variable, excluding `_`.
    pub vars: Vec<(String, RTerm)>,
}

/// The parser: an iterator-like reader of terms from tokenized source.
pub struct Parser<'a> {
    ops: &'a RefCell<OperatorTable>,
    fresh: &'a dyn Fn() -> u64,
    double_quotes: DoubleQuotes,

    tokens: Vec<Lexed>,
    pos: usize,

    vars: HashMap<String, RTerm>,
    var_order: Vec<(String, RTerm)>,
}

impl<'a> Parser<'a> {
    /// Tokenizes the source and prepares to read terms against the given table.
    pub fn new(
        source: &str,
        ops: &'a RefCell<OperatorTable>,
        fresh: &'a dyn Fn() -> u64,
        double_quotes: DoubleQuotes,
    ) -> Result<Self, ParseError> {
        Ok(Parser {
            ops,
            fresh,
            double_quotes,
            tokens: Lexer::tokenize(source)?,
            pos: 0,
            vars: HashMap::default(),
            var_order: Vec::default(),
        })
    }

    /// The next term, or [None] at the end of the source.
    pub fn next_term(&mut self) -> Result<Option<ReadTerm>, ParseError> {
        if self.pos >= self.tokens.len() {
            return Ok(None);
        }

        self.vars.clear();
        self.var_order.clear();

        let (term, _) = self.parse(1200)?;

        match self.bump() {
            Some(Lexed {
                token: Token::End, ..
            }) => Ok(Some(ReadTerm {
                term,
                vars: std::mem::take(&mut self.var_order),
            })),
            Some(lexed) => Err(ParseError::MissingEnd(lexed.line)),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Skips past the next [End](Token::End), for error recovery during permissive scans.
    pub fn recover(&mut self) {
        while let Some(lexed) = self.bump() {
            if lexed.token == Token::End {
                break;
            }
        }
    }

    fn peek(&self) -> Option<&Lexed> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Lexed> {
        let lexed = self.tokens.get(self.pos).cloned();
        if lexed.is_some() {
            self.pos += 1;
        }
        lexed
    }

    /// True when the token could begin a term.
    fn starts_term(token: &Token) -> bool {
        matches!(
            token,
            Token::Name(_)
                | Token::Var(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Str(_)
                | Token::Open
                | Token::OpenCT
                | Token::OpenList
                | Token::OpenCurly
        )
    }

    /// Reads a term at maximum priority `max`, returning the term and the priority it parsed at.
    fn parse(&mut self, max: u16) -> Result<(RTerm, u16), ParseError> {
        let (mut left, mut left_prec) = self.parse_primary(max)?;

        loop {
            let name = match self.peek() {
                Some(Lexed {
                    token: Token::Name(name),
                    ..
                }) => name.clone(),
                Some(Lexed {
                    token: Token::Comma,
                    ..
                }) => ",".to_string(),
                Some(Lexed {
                    token: Token::Bar, ..
                }) => "|".to_string(),
                _ => break,
            };

            let infix = self.ops.borrow().infix(&name);
            let postfix = self.ops.borrow().postfix(&name);

            if let Some(op) = infix {
                let left_max = match op.spec {
                    OpSpec::YFX => op.priority,
                    _ => op.priority - 1,
                };
                if op.priority <= max && left_prec <= left_max {
                    self.bump();
                    let right_max = match op.spec {
                        OpSpec::XFY => op.priority,
                        _ => op.priority - 1,
                    };
                    let (right, _) = self.parse(right_max)?;

                    // The solo bar reads as disjunction.
                    let functor = match name.as_str() {
                        "|" => ";".to_string(),
                        _ => name,
                    };
                    left = Term::compound(functor, vec![left, right]);
                    left_prec = op.priority;
                    continue;
                }
            }

            if let Some(op) = postfix {
                let left_max = match op.spec {
                    OpSpec::YF => op.priority,
                    _ => op.priority - 1,
                };
                if op.priority <= max && left_prec <= left_max {
                    self.bump();
                    left = Term::compound(name, vec![left]);
                    left_prec = op.priority;
                    continue;
                }
            }

            break;
        }

        Ok((left, left_prec))
    }

    /// Reads a primary: a terminal from the point of view of the operator parser.
    fn parse_primary(&mut self, max: u16) -> Result<(RTerm, u16), ParseError> {
        let lexed = match self.bump() {
            Some(lexed) => lexed,
            None => return Err(ParseError::UnexpectedEof),
        };

        match lexed.token {
            Token::Name(name) => self.parse_name(name, max),

            Token::Var(name) => Ok((self.variable(&name), 0)),

            Token::Int(value) => Ok((Rc::new(Term::Int(value)), 0)),
            Token::Float(value) => Ok((Term::float(value), 0)),

            Token::Str(text) => Ok((self.string_term(&text), 0)),

            Token::Open | Token::OpenCT => {
                let (term, _) = self.parse(1200)?;
                match self.bump() {
                    Some(Lexed {
                        token: Token::Close,
                        ..
                    }) => Ok((term, 0)),
                    _ => Err(ParseError::Unbalanced(lexed.line, '(')),
                }
            }

            Token::OpenList => self.parse_list(lexed.line),

            Token::OpenCurly => {
                if matches!(
                    self.peek(),
                    Some(Lexed {
                        token: Token::CloseCurly,
                        ..
                    })
                ) {
                    self.bump();
                    return Ok((Term::atom("{}"), 0));
                }
                let (inner, _) = self.parse(1200)?;
                match self.bump() {
                    Some(Lexed {
                        token: Token::CloseCurly,
                        ..
                    }) => Ok((Term::compound("{}", vec![inner]), 0)),
                    _ => Err(ParseError::Unbalanced(lexed.line, '{')),
                }
            }

            Token::End => Err(ParseError::Unexpected(lexed.line, "'.'".to_string())),
            Token::Close => Err(ParseError::Unbalanced(lexed.line, ')')),
            Token::CloseList => Err(ParseError::Unbalanced(lexed.line, ']')),
            Token::CloseCurly => Err(ParseError::Unbalanced(lexed.line, '}')),
            Token::Comma => Err(ParseError::Unexpected(lexed.line, "','".to_string())),
            Token::Bar => Err(ParseError::Unexpected(lexed.line, "'|'".to_string())),
        }
    }

    /// A name in primary position: compound, signed literal, prefix operator, or plain atom.
    fn parse_name(&mut self, name: String, max: u16) -> Result<(RTerm, u16), ParseError> {
        // An attached parenthesis always means a compound.
        if matches!(
            self.peek(),
            Some(Lexed {
                token: Token::OpenCT,
                ..
            })
        ) {
            self.bump();
            let args = self.parse_args()?;
            return Ok((Term::compound(name, args), 0));
        }

        // A sign folds into a numeric literal.
        if name == "-" || name == "+" {
            match self.peek().map(|lexed| lexed.token.clone()) {
                Some(Token::Int(value)) => {
                    self.bump();
                    let value = match name.as_str() {
                        "-" => -value,
                        _ => value,
                    };
                    return Ok((Rc::new(Term::Int(value)), 0));
                }
                Some(Token::Float(value)) => {
                    self.bump();
                    let value = match name.as_str() {
                        "-" => -value,
                        _ => value,
                    };
                    return Ok((Term::float(value), 0));
                }
                _ => {}
            }
        }

        // A prefix operator applies when something parseable follows.
        let prefix = self.ops.borrow().prefix(&name);
        if let Some(op) = prefix {
            if op.priority <= max {
                let followable = match self.peek() {
                    Some(lexed) => Self::starts_term(&lexed.token),
                    None => false,
                };
                // A name which is also an infix operator yields to that reading,
                // so `- = 1` reads the `-` as an atom on the left of `=`.
                let next_is_infix_only = match self.peek() {
                    Some(Lexed {
                        token: Token::Name(next),
                        ..
                    }) => {
                        let table = self.ops.borrow();
                        table.infix(next).is_some()
                            && table.prefix(next).is_none()
                            && !matches!(
                                self.tokens.get(self.pos + 1).map(|l| &l.token),
                                Some(Token::OpenCT)
                            )
                    }
                    _ => false,
                };

                if followable && !next_is_infix_only {
                    let arg_max = match op.spec {
                        OpSpec::FY => op.priority,
                        _ => op.priority - 1,
                    };
                    let (arg, _) = self.parse(arg_max)?;
                    return Ok((Term::compound(name, vec![arg]), op.priority));
                }
            }
        }

        Ok((Term::atom(name), 0))
    }

    /// The comma-separated arguments of a compound, after the opening parenthesis.
    fn parse_args(&mut self) -> Result<Vec<RTerm>, ParseError> {
        let mut args = Vec::default();
        loop {
            let (arg, _) = self.parse(999)?;
            args.push(arg);

            match self.bump() {
                Some(Lexed {
                    token: Token::Comma,
                    ..
                }) => {}
                Some(Lexed {
                    token: Token::Close,
                    ..
                }) => return Ok(args),
                Some(lexed) => {
                    return Err(ParseError::Unexpected(
                        lexed.line,
                        format!("{:?} between arguments", lexed.token),
                    ))
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    /// A list, after the opening bracket.
    fn parse_list(&mut self, open_line: usize) -> Result<(RTerm, u16), ParseError> {
        if matches!(
            self.peek(),
            Some(Lexed {
                token: Token::CloseList,
                ..
            })
        ) {
            self.bump();
            return Ok((Term::nil(), 0));
        }

        let mut elems = Vec::default();
        loop {
            let (elem, _) = self.parse(999)?;
            elems.push(elem);

            match self.bump() {
                Some(Lexed {
                    token: Token::Comma,
                    ..
                }) => {}

                Some(Lexed {
                    token: Token::CloseList,
                    ..
                }) => return Ok((Term::list(elems), 0)),

                Some(Lexed {
                    token: Token::Bar, ..
                }) => {
                    let (tail, _) = self.parse(999)?;
                    return match self.bump() {
                        Some(Lexed {
                            token: Token::CloseList,
                            ..
                        }) => Ok((Term::list_with_tail(elems, tail), 0)),
                        _ => Err(ParseError::Unbalanced(open_line, '[')),
                    };
                }

                Some(lexed) => {
                    return Err(ParseError::Unexpected(
                        lexed.line,
                        format!("{:?} in list", lexed.token),
                    ))
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    /// The variable for a written name, scoped to the current term.
    fn variable(&mut self, name: &str) -> RTerm {
        if name == "_" {
            return Rc::new(Term::Var(Variable {
                id: (self.fresh)(),
                name: Rc::from("_"),
            }));
        }

        if let Some(existing) = self.vars.get(name) {
            return existing.clone();
        }

        let var = Rc::new(Term::Var(Variable {
            id: (self.fresh)(),
            name: Rc::from(name),
        }));
        self.vars.insert(name.to_string(), var.clone());
        self.var_order.push((name.to_string(), var.clone()));
        var
    }

    /// A double-quoted string as the configured list form.
    fn string_term(&self, text: &str) -> RTerm {
        let elems = match self.double_quotes {
            DoubleQuotes::Codes => text
                .chars()
                .map(|c| Term::int(c as u32 as i64))
                .collect::<Vec<_>>(),
            DoubleQuotes::Chars => text
                .chars()
                .map(|c| Term::atom(c.to_string()))
                .collect::<Vec<_>>(),
        };
        Term::list(elems)
    }
}

/// Pre-scans source for the operator directives a parse of the same source will need.
///
/// Local `:- op/3` directives are collected in order, and a `:- use_module(library(M))` of a module
/// with a known operator set contributes that set.
/// The scan is permissive: unreadable terms are skipped, since the main parse will report them.
pub fn extract_op_directives(source: &str) -> Vec<(u16, OpSpec, String)> {
    use num_traits::ToPrimitive;

    let table = RefCell::new(OperatorTable::default());
    let counter = std::cell::Cell::new(0_u64);
    let fresh = || {
        let id = counter.get();
        counter.set(id + 1);
        id
    };

    let mut found = Vec::default();
    let mut parser = match Parser::new(source, &table, &fresh, DoubleQuotes::Codes) {
        Ok(parser) => parser,
        Err(_) => return found,
    };

    loop {
        let term = match parser.next_term() {
            Ok(Some(read)) => read.term,
            Ok(None) => break,
            Err(_) => {
                parser.recover();
                continue;
            }
        };

        let directive = match term.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == ":-" && compound.args.len() == 1 =>
            {
                compound.args[0].clone()
            }
            _ => continue,
        };

        match directive.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == "op" && compound.args.len() == 3 =>
            {
                let priority = match compound.args[0].as_ref() {
                    Term::Int(value) => match value.to_u16() {
                        Some(priority) if priority <= 1200 => priority,
                        _ => continue,
                    },
                    _ => continue,
                };
                let spec = match compound.args[1].atom_name().and_then(OpSpec::from_name) {
                    Some(spec) => spec,
                    None => continue,
                };
                let name = match compound.args[2].atom_name() {
                    Some(name) => name.to_string(),
                    None => continue,
                };

                table.borrow_mut().insert(priority, spec, &name);
                found.push((priority, spec, name));
            }

            Term::Compound(compound)
                if compound.functor.as_ref() == "use_module" && compound.args.len() == 1 =>
            {
                let module = match compound.args[0].as_ref() {
                    Term::Compound(library)
                        if library.functor.as_ref() == "library" && library.args.len() == 1 =>
                    {
                        library.args[0].atom_name().map(str::to_string)
                    }
                    Term::Atom(name) => Some(name.to_string()),
                    _ => None,
                };

                if let Some(module) = module {
                    for (priority, spec, name) in
                        crate::db::modules::library_operators(&module)
                    {
                        table.borrow_mut().insert(priority, spec, &name);
                        found.push((priority, spec, name));
                    }
                }
            }

            _ => {}
        }
    }

    found
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    fn read_all(source: &str) -> Vec<RTerm> {
        let table = RefCell::new(OperatorTable::default());
        let counter = std::cell::Cell::new(0_u64);
        let fresh = || {
            let id = counter.get();
            counter.set(id + 1);
            id
        };
        let mut parser =
            Parser::new(source, &table, &fresh, DoubleQuotes::Codes).expect("tokenizes");

        let mut terms = Vec::default();
        while let Some(read) = parser.next_term().expect("parses") {
            terms.push(read.term);
        }
        terms
    }

    fn read_one(source: &str) -> RTerm {
        let terms = read_all(source);
        assert_eq!(terms.len(), 1, "expected one term from {source}");
        terms[0].clone()
    }

    #[test]
    fn operators_nest_by_priority() {
        let term = read_one("a :- b, c.");
        assert_eq!(format!("{term}"), "a :- b, c");

        let term = read_one("1 + 2 * 3.");
        assert_eq!(format!("{term}"), "1 + 2 * 3");

        let term = read_one("(1 + 2) * 3.");
        assert_eq!(format!("{term}"), "(1 + 2) * 3");
    }

    #[test]
    fn left_associativity() {
        let term = read_one("1 - 2 - 3.");
        // (1 - 2) - 3, not 1 - (2 - 3).
        assert_eq!(format!("{term}"), "1 - 2 - 3");
        match term.as_ref() {
            Term::Compound(outer) => {
                assert!(matches!(outer.args[0].as_ref(), Term::Compound(_)));
                assert!(matches!(outer.args[1].as_ref(), Term::Int(_)));
            }
            _ => panic!("shape"),
        }
    }

    #[test]
    fn right_associativity_of_conjunction() {
        let term = read_one("t :- a, b, c.");
        match term.as_ref() {
            Term::Compound(clause) => match clause.args[1].as_ref() {
                Term::Compound(conj) => {
                    assert_eq!(conj.functor.as_ref(), ",");
                    assert!(matches!(conj.args[1].as_ref(), Term::Compound(_)));
                }
                _ => panic!("body shape"),
            },
            _ => panic!("clause shape"),
        }
    }

    #[test]
    fn lists_with_tails() {
        assert_eq!(format!("{}", read_one("[].")), "[]");
        assert_eq!(format!("{}", read_one("[a, b].")), "[a, b]");
        assert_eq!(format!("{}", read_one("[a | T].")), "[a|T]");
        assert_eq!(format!("{}", read_one("[a, b | [c]].")), "[a, b|[c]]");
    }

    #[test]
    fn curly_terms() {
        let term = read_one("{a, b}.");
        match term.as_ref() {
            Term::Compound(curly) => {
                assert_eq!(curly.functor.as_ref(), "{}");
                assert_eq!(curly.args.len(), 1);
            }
            _ => panic!("curly shape"),
        }
    }

    #[test]
    fn signed_literals_fold() {
        assert!(matches!(
            read_one("-1.").as_ref(),
            Term::Int(value) if *value == (-1).into()
        ));

        // With an operand on the left the minus is an operator.
        let term = read_one("5 - 1.");
        assert!(matches!(term.as_ref(), Term::Compound(_)));
    }

    #[test]
    fn variables_share_within_a_term() {
        let term = read_one("f(X, X, Y).");
        match term.as_ref() {
            Term::Compound(compound) => {
                assert_eq!(compound.args[0], compound.args[1]);
                assert_ne!(compound.args[0], compound.args[2]);
            }
            _ => panic!("shape"),
        }
    }

    #[test]
    fn anonymous_variables_are_distinct() {
        let term = read_one("f(_, _).");
        match term.as_ref() {
            Term::Compound(compound) => {
                assert_ne!(compound.args[0], compound.args[1]);
            }
            _ => panic!("shape"),
        }
    }

    #[test]
    fn user_operators_apply_to_later_terms() {
        let table = RefCell::new(OperatorTable::default());
        let counter = std::cell::Cell::new(0_u64);
        let fresh = || {
            let id = counter.get();
            counter.set(id + 1);
            id
        };

        let source = "before. a ==> b.";
        let mut parser =
            Parser::new(source, &table, &fresh, DoubleQuotes::Codes).expect("tokenizes");

        parser.next_term().expect("first term");

        // The table mutates mid-source, as a directive would mutate it.
        table.borrow_mut().insert(700, OpSpec::XFX, "==>");

        let read = parser.next_term().expect("second term").expect("a term");
        match read.term.as_ref() {
            Term::Compound(compound) => assert_eq!(compound.functor.as_ref(), "==>"),
            _ => panic!("operator did not apply"),
        }
    }

    #[test]
    fn missing_terminator_is_reported() {
        let table = RefCell::new(OperatorTable::default());
        let counter = std::cell::Cell::new(0_u64);
        let fresh = || {
            let id = counter.get();
            counter.set(id + 1);
            id
        };
        let mut parser =
            Parser::new("a b.", &table, &fresh, DoubleQuotes::Codes).expect("tokenizes");

        assert!(matches!(
            parser.next_term(),
            Err(ParseError::MissingEnd(_))
        ));
    }

    #[test]
    fn extracts_op_directives_ahead_of_use() {
        let source = ":- use_module(library(clpz)). goal(X, Y) :- X in 0..1, Y #= X.";
        let ops = extract_op_directives(source);

        assert!(ops.iter().any(|(_, _, name)| name == "#="));
        assert!(ops.iter().any(|(_, _, name)| name == "in"));
    }
}
