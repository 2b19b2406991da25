/*!
Clauses, aka. a head term paired with a body term.

A fact is a clause whose body is the atom `true`.

Before a clause takes part in resolution its variables are renamed: every variable is replaced by a fresh variable so bindings made for one call never clash with bindings made for another.
Renaming copies only the parts of the term in which a variable occurs, sharing every ground sub-term with the stored clause.
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::structures::{Compound, List, RTerm, Term, Variable};

/// A clause.
#[derive(Clone, Debug)]
pub struct Clause {
    /// The head, an atom or compound.
    pub head: RTerm,

    /// The body, with the atom `true` for facts.
    pub body: RTerm,
}

impl Clause {
    /// A fact, i.e. a clause with body `true`.
    pub fn fact(head: RTerm) -> Self {
        Clause {
            head,
            body: Term::truth(),
        }
    }

    /// A copy of the clause with every variable replaced by a fresh one drawn from `fresh_id`.
    pub fn rename(&self, fresh_id: &mut impl FnMut() -> u64) -> Clause {
        let mut seen = HashMap::default();
        Clause {
            head: rename_term(&self.head, &mut seen, fresh_id).unwrap_or_else(|| self.head.clone()),
            body: rename_term(&self.body, &mut seen, fresh_id).unwrap_or_else(|| self.body.clone()),
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.body.atom_name() == Some("true") {
            write!(f, "{}.", self.head)
        } else {
            write!(f, "{} :- {}.", self.head, self.body)
        }
    }
}

/// Renames variables in `term`, threading the old-id to fresh-variable map through `seen`.
///
/// Returns [None] when no variable occurs in the term, in which case the caller shares the original.
pub fn rename_term(
    term: &RTerm,
    seen: &mut HashMap<u64, RTerm>,
    fresh_id: &mut impl FnMut() -> u64,
) -> Option<RTerm> {
    match term.as_ref() {
        Term::Atom(_) | Term::Int(_) | Term::Float(_) => None,

        Term::Var(var) => Some(
            seen.entry(var.id)
                .or_insert_with(|| {
                    Rc::new(Term::Var(Variable {
                        id: fresh_id(),
                        name: var.name.clone(),
                    }))
                })
                .clone(),
        ),

        Term::Compound(compound) => {
            let mut changed = false;
            let mut args = Vec::with_capacity(compound.args.len());
            for arg in &compound.args {
                match rename_term(arg, seen, fresh_id) {
                    Some(renamed) => {
                        changed = true;
                        args.push(renamed);
                    }
                    None => args.push(arg.clone()),
                }
            }
            match changed {
                true => Some(Rc::new(Term::Compound(Compound {
                    functor: compound.functor.clone(),
                    args,
                }))),
                false => None,
            }
        }

        Term::List(list) => {
            let mut changed = false;
            let mut elems = Vec::with_capacity(list.elems.len());
            for elem in &list.elems {
                match rename_term(elem, seen, fresh_id) {
                    Some(renamed) => {
                        changed = true;
                        elems.push(renamed);
                    }
                    None => elems.push(elem.clone()),
                }
            }
            let tail = match &list.tail {
                Some(tail) => match rename_term(tail, seen, fresh_id) {
                    Some(renamed) => {
                        changed = true;
                        Some(renamed)
                    }
                    None => Some(tail.clone()),
                },
                None => None,
            };
            match changed {
                true => Some(Rc::new(Term::List(List { elems, tail }))),
                false => None,
            }
        }
    }
}

#[cfg(test)]
mod clause_tests {
    use super::*;

    fn var(id: u64, name: &str) -> RTerm {
        Rc::new(Term::Var(Variable {
            id,
            name: Rc::from(name),
        }))
    }

    #[test]
    fn renaming_freshens_variables_and_shares_ground() {
        let ground = Term::compound("point", vec![Term::int(1), Term::int(2)]);
        let head = Term::compound("at", vec![var(1, "X"), ground.clone()]);
        let body = Term::compound("placed", vec![var(1, "X")]);

        let clause = Clause { head, body };

        let mut next = 100_u64;
        let mut fresh = || {
            next += 1;
            next
        };
        let renamed = clause.rename(&mut fresh);

        // Occurrences of X map to the same fresh variable in head and body.
        let head_x = match renamed.head.as_ref() {
            Term::Compound(c) => c.args[0].clone(),
            _ => panic!("head shape"),
        };
        let body_x = match renamed.body.as_ref() {
            Term::Compound(c) => c.args[0].clone(),
            _ => panic!("body shape"),
        };
        assert_eq!(head_x, body_x);
        assert_ne!(head_x, var(1, "X"));

        // The ground argument is shared, not copied.
        let head_ground = match renamed.head.as_ref() {
            Term::Compound(c) => c.args[1].clone(),
            _ => panic!("head shape"),
        };
        assert!(Rc::ptr_eq(&head_ground, &ground));
    }
}
