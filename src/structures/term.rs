/*!
(The internal representation of) a term.

Broadly, a term is either:
- An atom, a symbolic constant identified by its name.
- A number, with integers of arbitrary precision and floats kept as distinct kinds.
- A variable, identified by a globally unique id assigned at creation. \
  The name of a variable is kept for display, and plays no part in identity: two variables with the same name and different ids are different variables.
- A compound, a functor name together with a non-empty sequence of argument terms.
- A list, an ordered prefix of element terms plus an optional tail term. \
  An absent tail is the proper empty tail, so `List { elems: [], tail: None }` is the empty list `[]`.
  A present tail may be any term: a variable for an open list, another list for a spliced list, or a non-list for an improper list.

Terms are immutable and shared through [Rc], see the [module](crate::structures) notes.

# Examples

```rust
# use otter_pl::structures::Term;
let hello = Term::atom("hello");
let an_int = Term::int(97);
let pair = Term::compound("pair", vec![hello.clone(), an_int.clone()]);

assert_eq!(format!("{pair}"), "pair(hello, 97)");
assert_eq!(format!("{}", Term::list(vec![hello, an_int])), "[hello, 97]");
```
*/

use std::rc::Rc;

use num_bigint::BigInt;

/// A reference-counted term, the form in which terms are held and passed.
pub type RTerm = Rc<Term>;

/// A term.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A symbolic constant, identified by name.
    Atom(Rc<str>),

    /// An integer, of arbitrary precision.
    Int(BigInt),

    /// A floating point number.
    Float(f64),

    /// A variable, identified by id.
    Var(Variable),

    /// A functor name paired with a non-empty tuple of arguments.
    Compound(Compound),

    /// An ordered prefix of elements with an optional tail.
    List(List),
}

/// A variable.
///
/// Equality and hashing are by id alone.
#[derive(Clone, Debug)]
pub struct Variable {
    /// The globally unique id of the variable.
    pub id: u64,

    /// The name the variable was written with, for display only.
    pub name: Rc<str>,
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A compound term.
#[derive(Clone, Debug, PartialEq)]
pub struct Compound {
    /// The functor name.
    pub functor: Rc<str>,

    /// The arguments, always at least one.
    pub args: Vec<RTerm>,
}

/// A list term.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    /// The element prefix.
    pub elems: Vec<RTerm>,

    /// The tail, with [None] as the proper empty tail.
    pub tail: Option<RTerm>,
}

impl Term {
    /// A fresh atom term.
    pub fn atom(name: impl AsRef<str>) -> RTerm {
        Rc::new(Term::Atom(Rc::from(name.as_ref())))
    }

    /// A fresh integer term from anything convertible to a [BigInt].
    pub fn int(value: impl Into<BigInt>) -> RTerm {
        Rc::new(Term::Int(value.into()))
    }

    /// A fresh float term.
    pub fn float(value: f64) -> RTerm {
        Rc::new(Term::Float(value))
    }

    /// A fresh compound term.
    ///
    /// A compound with no arguments is collapsed to an atom.
    pub fn compound(functor: impl AsRef<str>, args: Vec<RTerm>) -> RTerm {
        if args.is_empty() {
            Term::atom(functor)
        } else {
            Rc::new(Term::Compound(Compound {
                functor: Rc::from(functor.as_ref()),
                args,
            }))
        }
    }

    /// A proper list of the given elements.
    pub fn list(elems: Vec<RTerm>) -> RTerm {
        Rc::new(Term::List(List { elems, tail: None }))
    }

    /// A list of the given elements with an explicit tail.
    pub fn list_with_tail(elems: Vec<RTerm>, tail: RTerm) -> RTerm {
        Rc::new(Term::List(List {
            elems,
            tail: Some(tail),
        }))
    }

    /// The empty list.
    pub fn nil() -> RTerm {
        Rc::new(Term::List(List {
            elems: Vec::default(),
            tail: None,
        }))
    }

    /// The atom `true`.
    pub fn truth() -> RTerm {
        Term::atom("true")
    }

    /// True, exactly when the term is the empty list or the atom `[]`.
    pub fn is_nil(&self) -> bool {
        match self {
            Term::Atom(name) => name.as_ref() == "[]",
            Term::List(list) => list.elems.is_empty() && list.tail.is_none(),
            _ => false,
        }
    }

    /// The name of the term, if the term is an atom (or the atom-like `[]`).
    pub fn atom_name(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name.as_ref()),
            Term::List(list) if list.elems.is_empty() && list.tail.is_none() => Some("[]"),
            _ => None,
        }
    }

    /// True, exactly when the term is an atom or a compound.
    ///
    /// Lists count as compounds, with the exception of the atom-like `[]`.
    pub fn is_callable(&self) -> bool {
        match self {
            Term::Atom(_) | Term::Compound(_) => true,
            Term::List(_) => true,
            _ => false,
        }
    }

    /// The functor name and arity of the term, with atoms at arity zero.
    ///
    /// Non-empty lists read as `'.'/2`.
    pub fn indicator(&self) -> Option<(Rc<str>, usize)> {
        match self {
            Term::Atom(name) => Some((name.clone(), 0)),
            Term::Compound(compound) => Some((compound.functor.clone(), compound.args.len())),
            Term::List(list) => {
                if list.elems.is_empty() && list.tail.is_none() {
                    Some((Rc::from("[]"), 0))
                } else {
                    Some((Rc::from("."), 2))
                }
            }
            _ => None,
        }
    }

    /// True, exactly when no variable occurs in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Atom(_) | Term::Int(_) | Term::Float(_) => true,
            Term::Compound(compound) => compound.args.iter().all(|arg| arg.is_ground()),
            Term::List(list) => {
                list.elems.iter().all(|elem| elem.is_ground())
                    && list.tail.iter().all(|tail| tail.is_ground())
            }
        }
    }

    /// Extends `ids` with the id of every variable occurring in the term, in left-to-right order of first occurrence.
    pub fn variables_into(&self, ids: &mut Vec<u64>) {
        match self {
            Term::Var(var) => {
                if !ids.contains(&var.id) {
                    ids.push(var.id);
                }
            }
            Term::Atom(_) | Term::Int(_) | Term::Float(_) => {}
            Term::Compound(compound) => {
                for arg in &compound.args {
                    arg.variables_into(ids);
                }
            }
            Term::List(list) => {
                for elem in &list.elems {
                    elem.variables_into(ids);
                }
                if let Some(tail) = &list.tail {
                    tail.variables_into(ids);
                }
            }
        }
    }
}

// Display
// --------------------------------------------------

/// Fixity of an operator known to the term writer.
#[derive(Clone, Copy, PartialEq, Eq)]
enum WriterFixity {
    XFX,
    XFY,
    YFX,
    FY,
}

/// Priority and fixity for the operators the writer prints in operator form.
///
/// A static snapshot of the core table: terms built with user-defined operators print in canonical form.
fn writer_op(name: &str, arity: usize) -> Option<(u16, WriterFixity)> {
    use WriterFixity::*;
    match (name, arity) {
        (":-" | "-->", 2) => Some((1200, XFX)),
        (";", 2) => Some((1100, XFY)),
        ("->", 2) => Some((1050, XFY)),
        (",", 2) => Some((1000, XFY)),
        ("\\+", 1) => Some((900, FY)),
        (
            "=" | "\\=" | "==" | "\\==" | "@<" | "@>" | "@=<" | "@>=" | "is" | "=.." | "=:="
            | "=\\=" | "<" | ">" | "=<" | ">=",
            2,
        ) => Some((700, XFX)),
        ("+" | "-" | "/\\" | "\\/" | "xor", 2) => Some((500, YFX)),
        ("*" | "/" | "//" | "mod" | "rem" | "<<" | ">>" | "div", 2) => Some((400, YFX)),
        ("**", 2) => Some((200, XFX)),
        ("^", 2) => Some((200, XFY)),
        ("-" | "+" | "\\", 1) => Some((200, FY)),
        _ => None,
    }
}

/// True when the atom name can be written without quotes.
fn unquoted(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let solo = matches!(name, "[]" | "{}" | "!" | ";" | ",");
    let alpha = name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let symbolic = name.chars().all(|c| SYMBOL_CHARS.contains(c));
    solo || alpha || symbolic
}

/// The characters from which symbolic atoms are formed.
pub const SYMBOL_CHARS: &str = "+-*/\\^<>=~:.?@#&$";

/// Writes an atom name, quoting when required and requested.
pub fn write_atom(f: &mut std::fmt::Formatter, name: &str, quote: bool) -> std::fmt::Result {
    if !quote || unquoted(name) {
        write!(f, "{name}")
    } else {
        write!(f, "'")?;
        for c in name.chars() {
            match c {
                '\'' => write!(f, "\\'")?,
                '\\' => write!(f, "\\\\")?,
                '\n' => write!(f, "\\n")?,
                '\t' => write!(f, "\\t")?,
                _ => write!(f, "{c}")?,
            }
        }
        write!(f, "'")
    }
}

/// The atom name as written source, quoted when required.
pub fn write_atom_string(name: &str) -> String {
    if unquoted(name) {
        return name.to_string();
    }
    let mut out = String::from("'");
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

impl Term {
    /// Writes the term, parenthesising operator sub-terms whose priority exceeds `max`.
    fn write_prec(&self, f: &mut std::fmt::Formatter, max: u16, quote: bool) -> std::fmt::Result {
        match self {
            Term::Atom(name) => write_atom(f, name, quote),

            Term::Int(value) => write!(f, "{value}"),

            // Debug formatting keeps the decimal point on round floats.
            Term::Float(value) => write!(f, "{value:?}"),

            Term::Var(var) => {
                if var.name.starts_with('_') || var.name.is_empty() {
                    write!(f, "_G{}", var.id)
                } else {
                    write!(f, "{}", var.name)
                }
            }

            Term::Compound(compound) => {
                let arity = compound.args.len();
                match writer_op(&compound.functor, arity) {
                    Some((prec, fixity)) if arity == 2 => {
                        let (left_max, right_max) = match fixity {
                            WriterFixity::XFX => (prec - 1, prec - 1),
                            WriterFixity::XFY => (prec - 1, prec),
                            WriterFixity::YFX => (prec, prec - 1),
                            WriterFixity::FY => unreachable!("prefix at arity 2"),
                        };
                        if prec > max {
                            write!(f, "(")?;
                        }
                        compound.args[0].write_prec(f, left_max, quote)?;
                        if compound.functor.as_ref() == "," {
                            write!(f, ", ")?;
                        } else {
                            write!(f, " {} ", compound.functor)?;
                        }
                        compound.args[1].write_prec(f, right_max, quote)?;
                        if prec > max {
                            write!(f, ")")?;
                        }
                        Ok(())
                    }

                    Some((prec, WriterFixity::FY)) => {
                        if prec > max {
                            write!(f, "(")?;
                        }
                        write!(f, "{}", compound.functor)?;
                        // A space keeps symbolic runs apart, e.g. `- -1`.
                        if compound.functor.chars().all(|c| SYMBOL_CHARS.contains(c)) {
                            write!(f, " ")?;
                        }
                        compound.args[0].write_prec(f, prec, quote)?;
                        if prec > max {
                            write!(f, ")")?;
                        }
                        Ok(())
                    }

                    _ => {
                        write_atom(f, &compound.functor, quote)?;
                        write!(f, "(")?;
                        for (i, arg) in compound.args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            arg.write_prec(f, 999, quote)?;
                        }
                        write!(f, ")")
                    }
                }
            }

            Term::List(list) => {
                write!(f, "[")?;
                for (i, elem) in list.elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    elem.write_prec(f, 999, quote)?;
                }
                if let Some(tail) = &list.tail {
                    if !tail.is_nil() {
                        write!(f, "|")?;
                        tail.write_prec(f, 999, quote)?;
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.write_prec(f, 1200, true)
    }
}

/// Displays a term without quoting atoms, as `write/1` does.
pub struct Unquoted<'t>(pub &'t Term);

impl std::fmt::Display for Unquoted<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.write_prec(f, 1200, false)
    }
}

#[cfg(test)]
mod term_tests {
    use super::*;

    #[test]
    fn variable_identity_is_by_id() {
        let x_one = Variable {
            id: 1,
            name: Rc::from("X"),
        };
        let x_two = Variable {
            id: 2,
            name: Rc::from("X"),
        };

        assert_ne!(x_one, x_two);
        assert_eq!(
            x_one,
            Variable {
                id: 1,
                name: Rc::from("Elsewhere")
            }
        );
    }

    #[test]
    fn nil_is_atom_like() {
        assert!(Term::nil().is_nil());
        assert!(Term::atom("[]").is_nil());
        assert_eq!(Term::nil().atom_name(), Some("[]"));
    }

    #[test]
    fn display_quotes_when_needed() {
        assert_eq!(format!("{}", Term::atom("hello")), "hello");
        assert_eq!(format!("{}", Term::atom("two words")), "'two words'");
        assert_eq!(format!("{}", Term::atom("")), "''");
        assert_eq!(format!("{}", Term::atom("=..")), "=..");
    }

    #[test]
    fn display_operators() {
        let sum = Term::compound("+", vec![Term::int(1), Term::int(2)]);
        let product = Term::compound("*", vec![sum.clone(), Term::int(3)]);

        assert_eq!(format!("{sum}"), "1 + 2");
        assert_eq!(format!("{product}"), "(1 + 2) * 3");

        let chain = Term::compound("+", vec![Term::int(1), sum]);
        assert_eq!(format!("{chain}"), "1 + (1 + 2)");
    }

    #[test]
    fn display_lists() {
        let xs = Term::list(vec![Term::atom("a"), Term::atom("b")]);
        assert_eq!(format!("{xs}"), "[a, b]");

        let open = Term::list_with_tail(
            vec![Term::atom("a")],
            Rc::new(Term::Var(Variable {
                id: 9,
                name: Rc::from("T"),
            })),
        );
        assert_eq!(format!("{open}"), "[a|T]");
    }
}
