//! Keys of the clause database.

use std::rc::Rc;

use num_bigint::BigInt;

use crate::structures::{RTerm, Term};

/// A predicate indicator: functor name paired with arity.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PredicateIndicator {
    pub name: Rc<str>,
    pub arity: usize,
}

impl PredicateIndicator {
    pub fn new(name: impl AsRef<str>, arity: usize) -> Self {
        PredicateIndicator {
            name: Rc::from(name.as_ref()),
            arity,
        }
    }

    /// The indicator of a callable term, with atoms at arity zero.
    pub fn of(term: &Term) -> Option<Self> {
        term.indicator().map(|(name, arity)| PredicateIndicator { name, arity })
    }

    /// The `Name/Arity` term, e.g. for error culprits.
    pub fn as_term(&self) -> RTerm {
        Term::compound(
            "/",
            vec![Term::atom(self.name.as_ref()), Term::int(self.arity as i64)],
        )
    }
}

impl std::fmt::Display for PredicateIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// The shape of the first argument of a clause head or goal, for indexing.
///
/// Only the outer shape takes part: arguments of a compound first argument are never examined.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FirstArgKey {
    /// An atom, by name.
    Atom(Rc<str>),

    /// A compound, by functor and arity.
    Functor(Rc<str>, usize),

    /// An integer, by value.
    Int(BigInt),

    /// Any float: floats index as a class, not by value.
    Float,

    /// The empty list.
    EmptyList,

    /// A list with at least one element.
    NonEmptyList,
}

impl FirstArgKey {
    /// The key of a (dereferenced) term, with [None] for variables and open shapes.
    pub fn of(term: &Term) -> Option<Self> {
        match term {
            Term::Var(_) => None,

            Term::Atom(name) => match name.as_ref() {
                "[]" => Some(FirstArgKey::EmptyList),
                _ => Some(FirstArgKey::Atom(name.clone())),
            },

            Term::Int(value) => Some(FirstArgKey::Int(value.clone())),

            Term::Float(_) => Some(FirstArgKey::Float),

            Term::Compound(compound) => Some(FirstArgKey::Functor(
                compound.functor.clone(),
                compound.args.len(),
            )),

            Term::List(list) => {
                if list.elems.is_empty() {
                    match &list.tail {
                        // An all-tail list has whatever shape the tail has, which is unknown here.
                        Some(_) => None,
                        None => Some(FirstArgKey::EmptyList),
                    }
                } else {
                    Some(FirstArgKey::NonEmptyList)
                }
            }
        }
    }
}
