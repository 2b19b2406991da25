/*!
The binding store.

Dereferencing is split in two:
- [deref](Bindings::deref) walks variable bindings until a non-variable or an unbound variable is reached, without touching sub-terms.
- [resolve](Bindings::resolve) substitutes bindings throughout the term, normalising list spines along the way.

Resolution guards against cyclic bindings, which are possible exactly when the occurs check is off.
A variable met again on the path into its own binding resolves to the variable itself rather than recursing without end.
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::structures::{Compound, List, RTerm, Term};

/// A substitution: a map from variable id to term.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    map: HashMap<u64, RTerm>,
}

/// The tail of a [ListView].
#[derive(Clone, Debug)]
pub enum Tail {
    /// The list ends with `[]`.
    Proper,

    /// The list ends with an unbound variable.
    Open(RTerm),

    /// The list ends with some non-list, non-variable term.
    Improper(RTerm),
}

/// A list flattened against the current bindings: the elements seen, and how the spine ended.
#[derive(Clone, Debug)]
pub struct ListView {
    pub elems: Vec<RTerm>,
    pub tail: Tail,
}

impl ListView {
    /// The elements, when the list is proper.
    pub fn proper(self) -> Option<Vec<RTerm>> {
        match self.tail {
            Tail::Proper => Some(self.elems),
            _ => None,
        }
    }
}

impl Bindings {
    /// Binds a variable id to a term.
    ///
    /// # Soundness
    /// The id must be unbound: rebinding would lose the earlier binding for good, as there is no trail to restore from.
    pub fn bind(&mut self, id: u64, term: RTerm) {
        debug_assert!(!self.map.contains_key(&id));
        self.map.insert(id, term);
    }

    /// The binding of an id, if any.
    pub fn get(&self, id: u64) -> Option<&RTerm> {
        self.map.get(&id)
    }

    /// A count of bindings made.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no binding has been made.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Walks variable bindings from `term` until a non-variable or an unbound variable.
    pub fn deref(&self, term: &RTerm) -> RTerm {
        let mut current = term.clone();
        loop {
            let next = match current.as_ref() {
                Term::Var(var) => match self.map.get(&var.id) {
                    Some(bound) => bound.clone(),
                    None => return current,
                },
                _ => return current,
            };
            current = next;
        }
    }

    /// Substitutes bindings throughout `term`.
    ///
    /// List spines are normalised: a list whose tail is (bound to) another list is flattened into a single list.
    /// A cyclic binding resolves to the variable at the point the cycle closes.
    pub fn resolve(&self, term: &RTerm) -> RTerm {
        let mut on_path = Vec::default();
        self.resolve_guarded(term, &mut on_path)
    }

    fn resolve_guarded(&self, term: &RTerm, on_path: &mut Vec<u64>) -> RTerm {
        match term.as_ref() {
            Term::Atom(_) | Term::Int(_) | Term::Float(_) => term.clone(),

            Term::Var(var) => {
                if on_path.contains(&var.id) {
                    return term.clone();
                }
                match self.map.get(&var.id) {
                    Some(bound) => {
                        let bound = bound.clone();
                        on_path.push(var.id);
                        let resolved = self.resolve_guarded(&bound, on_path);
                        on_path.pop();
                        resolved
                    }
                    None => term.clone(),
                }
            }

            Term::Compound(compound) => {
                let args = compound
                    .args
                    .iter()
                    .map(|arg| self.resolve_guarded(arg, on_path))
                    .collect();
                Rc::new(Term::Compound(Compound {
                    functor: compound.functor.clone(),
                    args,
                }))
            }

            Term::List(_) => {
                // Walk the spine iteratively, resolving elements as they are met.
                let mut elems = Vec::default();
                let mut current = term.clone();
                let mut walked = Vec::default();

                let tail = loop {
                    match current.clone().as_ref() {
                        Term::List(list) => {
                            for elem in &list.elems {
                                elems.push(self.resolve_guarded(elem, on_path));
                            }
                            match &list.tail {
                                None => break None,
                                Some(tail) => current = tail.clone(),
                            }
                        }

                        Term::Atom(name) if name.as_ref() == "[]" => break None,

                        Term::Var(var) => {
                            if on_path.contains(&var.id) || walked.contains(&var.id) {
                                break Some(current.clone());
                            }
                            match self.map.get(&var.id) {
                                Some(bound) => {
                                    walked.push(var.id);
                                    current = bound.clone();
                                }
                                None => break Some(current.clone()),
                            }
                        }

                        _ => {
                            on_path.extend(walked.iter().copied());
                            let resolved = self.resolve_guarded(&current, on_path);
                            on_path.truncate(on_path.len() - walked.len());
                            break Some(resolved);
                        }
                    }
                };

                Rc::new(Term::List(List { elems, tail }))
            }
        }
    }

    /// Flattens the list structure of `term` against the bindings.
    ///
    /// The walk is iterative over list segments, so deep tails do not recurse.
    pub fn list_view(&self, term: &RTerm) -> ListView {
        let mut elems = Vec::default();
        let mut current = self.deref(term);

        loop {
            match current.clone().as_ref() {
                Term::List(list) => {
                    elems.extend(list.elems.iter().cloned());
                    match &list.tail {
                        None => {
                            return ListView {
                                elems,
                                tail: Tail::Proper,
                            }
                        }
                        Some(tail) => current = self.deref(tail),
                    }
                }

                Term::Atom(name) if name.as_ref() == "[]" => {
                    return ListView {
                        elems,
                        tail: Tail::Proper,
                    }
                }

                Term::Var(_) => {
                    return ListView {
                        elems,
                        tail: Tail::Open(current),
                    }
                }

                _ => {
                    return ListView {
                        elems,
                        tail: Tail::Improper(current),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod bindings_tests {
    use super::*;
    use crate::structures::Variable;

    fn var(id: u64) -> RTerm {
        Rc::new(Term::Var(Variable {
            id,
            name: Rc::from("V"),
        }))
    }

    #[test]
    fn deref_walks_chains() {
        let mut bindings = Bindings::default();
        bindings.bind(1, var(2));
        bindings.bind(2, Term::atom("end"));

        let derefed = bindings.deref(&var(1));
        assert_eq!(derefed.atom_name(), Some("end"));
    }

    #[test]
    fn deref_is_idempotent() {
        let mut bindings = Bindings::default();
        bindings.bind(1, var(2));
        bindings.bind(2, Term::atom("end"));

        let once = bindings.deref(&var(1));
        let twice = bindings.deref(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn list_views_splice_bound_tails() {
        let mut bindings = Bindings::default();
        bindings.bind(7, Term::list(vec![Term::atom("b"), Term::atom("c")]));

        let spliced = Term::list_with_tail(vec![Term::atom("a")], var(7));
        let view = bindings.list_view(&spliced);

        assert_eq!(view.elems.len(), 3);
        assert!(matches!(view.tail, Tail::Proper));
    }

    #[test]
    fn resolve_normalises_lists() {
        let mut bindings = Bindings::default();
        bindings.bind(7, Term::list(vec![Term::atom("b")]));

        let spliced = Term::list_with_tail(vec![Term::atom("a")], var(7));
        let resolved = bindings.resolve(&spliced);

        assert_eq!(resolved, Term::list(vec![Term::atom("a"), Term::atom("b")]));
    }

    #[test]
    fn resolve_terminates_on_cycles() {
        let mut bindings = Bindings::default();
        bindings.bind(1, Rc::new(Term::Compound(Compound {
            functor: Rc::from("f"),
            args: vec![var(1)],
        })));

        // f(f(…)) closes back on variable 1; resolution stops there.
        let resolved = bindings.resolve(&var(1));
        match resolved.as_ref() {
            Term::Compound(compound) => match compound.args[0].as_ref() {
                Term::Var(inner) => assert_eq!(inner.id, 1),
                _ => panic!("cycle not cut at the variable"),
            },
            _ => panic!("outer structure lost"),
        }
    }
}
