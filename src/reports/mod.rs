/*!
The solution surface of a query.

A query answers with a sequence of [Solution]s, each a map from the names of the variables written in the query to [Value]s.
Values are structural: atoms render as strings, numbers as numbers, lists as sequences, compounds as a functor with arguments, and a variable left unbound renders as a variable with its name.

Only named variables take part: `_` and `_`-prefixed variables are the caller saying the binding is of no interest.
*/

use std::collections::BTreeMap;

use num_bigint::BigInt;

use crate::structures::{RTerm, Term};
use crate::unification::Bindings;

/// A structural rendering of a term.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An atom, by name. The empty list renders as `Atom("[]")` only when it stood alone as an atom.
    Atom(String),

    /// An integer.
    Int(BigInt),

    /// A float.
    Float(f64),

    /// A proper list.
    List(Vec<Value>),

    /// A compound: functor and arguments.
    Compound(String, Vec<Value>),

    /// An unbound variable, by display name.
    Var(String),
}

/// The bindings of one solution, keyed by the variable names written in the query.
pub type Solution = BTreeMap<String, Value>;

impl Value {
    /// Renders a term against the given bindings.
    ///
    /// The term is resolved first, so cyclic bindings are cut at the variable closing the cycle rather than chased without end.
    pub fn of(term: &RTerm, bindings: &Bindings) -> Value {
        let resolved = bindings.resolve(term);
        Value::of_resolved(&resolved, bindings)
    }

    fn of_resolved(term: &RTerm, bindings: &Bindings) -> Value {
        match term.as_ref() {
            Term::Atom(name) => Value::Atom(name.to_string()),

            Term::Int(value) => Value::Int(value.clone()),

            Term::Float(value) => Value::Float(*value),

            Term::Var(var) => Value::Var(if var.name.is_empty() || var.name.starts_with('_') {
                format!("_G{}", var.id)
            } else {
                var.name.to_string()
            }),

            Term::Compound(compound) => Value::Compound(
                compound.functor.to_string(),
                compound
                    .args
                    .iter()
                    .map(|arg| Value::of_resolved(arg, bindings))
                    .collect(),
            ),

            Term::List(list) => {
                let mut values: Vec<Value> = list
                    .elems
                    .iter()
                    .map(|elem| Value::of_resolved(elem, bindings))
                    .collect();
                match &list.tail {
                    None => Value::List(values),
                    Some(tail) => {
                        // An improper or open tail renders as a final `|/2` pair.
                        let rest = Value::of_resolved(tail, bindings);
                        match values.pop() {
                            Some(last) => {
                                values.push(Value::Compound("|".to_string(), vec![last, rest]));
                                Value::List(values)
                            }
                            None => rest,
                        }
                    }
                }
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Atom(name) => write!(f, "{name}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Var(name) => write!(f, "{name}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Compound(functor, args) => {
                write!(f, "{functor}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Builds a solution map from the named variables of a query.
pub fn solution_of(named: &[(String, RTerm)], bindings: &Bindings) -> Solution {
    let mut solution = Solution::default();
    for (name, var) in named {
        solution.insert(name.clone(), Value::of(var, bindings));
    }
    solution
}

#[cfg(test)]
mod report_tests {
    use super::*;

    #[test]
    fn ground_terms_render_structurally() {
        let bindings = Bindings::default();
        let term = Term::compound(
            "point",
            vec![Term::int(1), Term::list(vec![Term::atom("a")])],
        );

        let value = Value::of(&term, &bindings);
        assert_eq!(
            value,
            Value::Compound(
                "point".to_string(),
                vec![
                    Value::Int(1.into()),
                    Value::List(vec![Value::Atom("a".to_string())])
                ]
            )
        );
    }
}
