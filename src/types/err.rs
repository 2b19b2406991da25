/*!
Error types used in the library.

Two channels are distinguished:
- Host-side errors, surfaced from the public API as [ErrorKind]. \
  For example, a syntax error found while consulting a file.
- Prolog-side errors, carried as [Interrupt]s through a running query. \
  Engine primitives and built-ins raise ISO `error(Formal, Context)` terms via the constructors [below](#functions); `catch/3` may consume them, and an uncaught interrupt surfaces as [ErrorKind::Uncaught].

Pure proof failure is neither: a goal with no solutions is an empty sequence, not an error.
*/

use std::rc::Rc;

use crate::structures::{RTerm, Term};

/// A union of varied error kinds, surfaced from the public API.
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// An error related to parsing.
    Parse(ParseError),

    /// A thrown term no `catch/3` consumed.
    Uncaught(RTerm),

    /// The interpreter was asked to halt with the given exit code.
    Halted(i32),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "syntax: {e}"),
            Self::Uncaught(ball) => write!(f, "uncaught exception: {ball}"),
            Self::Halted(code) => write!(f, "halted: {code}"),
        }
    }
}

/// Errors during parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Input ended where a term was required.
    UnexpectedEof,

    /// A quoted atom or string left open.
    Unterminated(usize),

    /// An escape sequence without a reading.
    BadEscape(usize),

    /// A numeric literal without a reading.
    BadNumber(usize),

    /// An unexpected token, with a note of what was found.
    Unexpected(usize, String),

    /// No operator parse at an acceptable priority.
    PriorityClash(usize, String),

    /// A bracket without a partner.
    Unbalanced(usize, char),

    /// A term without its `.` terminator.
    MissingEnd(usize),

    /// No file was found at the given path.
    NoFile(String),
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::Unterminated(line) => write!(f, "line {line}: unterminated quote"),
            Self::BadEscape(line) => write!(f, "line {line}: unreadable escape sequence"),
            Self::BadNumber(line) => write!(f, "line {line}: unreadable number"),
            Self::Unexpected(line, what) => write!(f, "line {line}: unexpected {what}"),
            Self::PriorityClash(line, name) => {
                write!(f, "line {line}: operator priority clash at '{name}'")
            }
            Self::Unbalanced(line, bracket) => write!(f, "line {line}: unbalanced '{bracket}'"),
            Self::MissingEnd(line) => write!(f, "line {line}: missing '.' after term"),
            Self::NoFile(path) => write!(f, "no file at '{path}'"),
        }
    }
}

/// A non-local exit in flight through a query.
#[derive(Clone, Debug)]
pub enum Interrupt {
    /// A term thrown by `throw/1` or an engine primitive, caught only by a matching `catch/3`.
    Throw(RTerm),

    /// A request to halt, which no `catch/3` consumes.
    Halt(i32),
}

impl Interrupt {
    /// The thrown term, if the interrupt is a throw.
    pub fn ball(&self) -> Option<&RTerm> {
        match self {
            Self::Throw(ball) => Some(ball),
            Self::Halt(_) => None,
        }
    }
}

impl From<Interrupt> for ErrorKind {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Throw(ball) => ErrorKind::Uncaught(ball),
            Interrupt::Halt(code) => ErrorKind::Halted(code),
        }
    }
}

// ISO error terms
// --------------------------------------------------

/// `error(Formal, Context)`, the shape of every engine-raised term.
fn error_term(formal: RTerm, context: &str) -> Interrupt {
    Interrupt::Throw(Term::compound(
        "error",
        vec![formal, Term::atom(context)],
    ))
}

/// `instantiation_error`: a required-bound argument was unbound.
pub fn instantiation_error(context: &str) -> Interrupt {
    error_term(Term::atom("instantiation_error"), context)
}

/// `type_error(Expected, Culprit)`: an argument of the wrong kind.
pub fn type_error(expected: &str, culprit: RTerm, context: &str) -> Interrupt {
    error_term(
        Term::compound("type_error", vec![Term::atom(expected), culprit]),
        context,
    )
}

/// `domain_error(Domain, Culprit)`: the right kind, outside the allowed set.
pub fn domain_error(domain: &str, culprit: RTerm, context: &str) -> Interrupt {
    error_term(
        Term::compound("domain_error", vec![Term::atom(domain), culprit]),
        context,
    )
}

/// `existence_error(procedure, Name/Arity)`: a call to a procedure with no definition.
pub fn existence_error(name: &str, arity: usize, context: &str) -> Interrupt {
    error_term(
        Term::compound(
            "existence_error",
            vec![
                Term::atom("procedure"),
                Term::compound("/", vec![Term::atom(name), Term::int(arity as i64)]),
            ],
        ),
        context,
    )
}

/// `permission_error(Operation, Type, Culprit)`: e.g. modifying a static procedure.
pub fn permission_error(operation: &str, kind: &str, culprit: RTerm, context: &str) -> Interrupt {
    error_term(
        Term::compound(
            "permission_error",
            vec![Term::atom(operation), Term::atom(kind), culprit],
        ),
        context,
    )
}

/// `evaluation_error(Kind)`: e.g. division by zero.
pub fn evaluation_error(kind: &str, context: &str) -> Interrupt {
    error_term(Term::compound("evaluation_error", vec![Term::atom(kind)]), context)
}

/// `resource_error(Kind)`: a limit of the interpreter was hit.
pub fn resource_error(kind: &str, context: &str) -> Interrupt {
    error_term(Term::compound("resource_error", vec![Term::atom(kind)]), context)
}

/// `representation_error(Kind)`: a value the implementation cannot represent.
pub fn representation_error(kind: &str, context: &str) -> Interrupt {
    error_term(
        Term::compound("representation_error", vec![Term::atom(kind)]),
        context,
    )
}

/// `syntax_error(Description)`: the reader could not read.
pub fn syntax_error(description: &str, context: &str) -> Interrupt {
    error_term(
        Term::compound("syntax_error", vec![Term::atom(description)]),
        context,
    )
}

/// The `Name/Arity` indicator term for error culprits.
pub fn indicator_term(name: &str, arity: usize) -> RTerm {
    Term::compound("/", vec![Term::atom(name), Term::int(arity as i64)])
}

/// A `Rc<str>` of the `name/arity` rendering, for error contexts.
pub fn indicator_string(name: &str, arity: usize) -> Rc<str> {
    Rc::from(format!("{name}/{arity}"))
}
