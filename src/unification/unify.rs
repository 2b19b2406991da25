/*!
The unifier.

Both sides are dereferenced before case analysis:
- A variable binds to the other side, unless both sides are the same variable.
- Atoms unify by name, numbers by kind and value --- the integer 1 and the float 1.0 do not unify structurally.
- Compounds unify when functor and arity agree and the arguments unify left-to-right, threading the substitution.
- Lists unify element-wise, with any leftover of the longer side unified against the tail of the shorter.
  The empty list unifies with the atom `[]`.

On failure the substitution may hold bindings made before the mismatch was found.
Callers clone the substitution per attempt, so a failed attempt is discarded whole.
*/

use std::rc::Rc;

use crate::structures::{List, RTerm, Term};
use crate::unification::Bindings;

/// Extends `bindings` so `left` and `right` become equal, returning false when no extension does.
///
/// `occurs` requests the occurs check: a variable will not bind to a term it occurs in.
pub fn unify(left: &RTerm, right: &RTerm, bindings: &mut Bindings, occurs: bool) -> bool {
    let left = bindings.deref(left);
    let right = bindings.deref(right);

    match (left.as_ref(), right.as_ref()) {
        (Term::Var(a), Term::Var(b)) if a.id == b.id => true,

        (Term::Var(var), _) => {
            if occurs && occurs_in(var.id, &right, bindings) {
                false
            } else {
                bindings.bind(var.id, right.clone());
                true
            }
        }

        (_, Term::Var(var)) => {
            if occurs && occurs_in(var.id, &left, bindings) {
                false
            } else {
                bindings.bind(var.id, left.clone());
                true
            }
        }

        (Term::Atom(a), Term::Atom(b)) => a == b,

        (Term::Int(a), Term::Int(b)) => a == b,
        (Term::Float(a), Term::Float(b)) => a == b,
        (Term::Int(_), Term::Float(_)) | (Term::Float(_), Term::Int(_)) => false,

        (Term::Atom(_), Term::List(_)) | (Term::List(_), Term::Atom(_)) => {
            left.is_nil() && right.is_nil()
        }

        (Term::Compound(a), Term::Compound(b)) => {
            if a.functor != b.functor || a.args.len() != b.args.len() {
                return false;
            }
            a.args
                .iter()
                .zip(b.args.iter())
                .all(|(x, y)| unify(x, y, bindings, occurs))
        }

        (Term::List(a), Term::List(b)) => unify_lists(a, b, bindings, occurs),

        _ => false,
    }
}

/// Unifies two list terms.
///
/// The shared element prefix unifies pairwise; whatever remains of the longer side becomes a list term unified against the tail of the shorter.
/// Recursion is per list segment rather than per element, so long flat lists do not deepen the stack.
fn unify_lists(a: &List, b: &List, bindings: &mut Bindings, occurs: bool) -> bool {
    let shared = a.elems.len().min(b.elems.len());
    for (x, y) in a.elems[..shared].iter().zip(b.elems[..shared].iter()) {
        if !unify(x, y, bindings, occurs) {
            return false;
        }
    }

    let rest_of = |list: &List| -> RTerm {
        if list.elems.len() > shared {
            Rc::new(Term::List(List {
                elems: list.elems[shared..].to_vec(),
                tail: list.tail.clone(),
            }))
        } else {
            match &list.tail {
                Some(tail) => tail.clone(),
                None => Term::nil(),
            }
        }
    };

    let a_rest = rest_of(a);
    let b_rest = rest_of(b);
    unify(&a_rest, &b_rest, bindings, occurs)
}

/// True when the variable `id` occurs in `term` under the given bindings.
pub fn occurs_in(id: u64, term: &RTerm, bindings: &Bindings) -> bool {
    let term = bindings.deref(term);
    match term.as_ref() {
        Term::Var(var) => var.id == id,
        Term::Atom(_) | Term::Int(_) | Term::Float(_) => false,
        Term::Compound(compound) => compound
            .args
            .iter()
            .any(|arg| occurs_in(id, arg, bindings)),
        Term::List(list) => {
            list.elems.iter().any(|elem| occurs_in(id, elem, bindings))
                || list.tail.iter().any(|tail| occurs_in(id, tail, bindings))
        }
    }
}

#[cfg(test)]
mod unify_tests {
    use super::*;
    use crate::structures::Variable;

    fn var(id: u64) -> RTerm {
        Rc::new(Term::Var(Variable {
            id,
            name: Rc::from("V"),
        }))
    }

    #[test]
    fn atoms_by_name() {
        let mut bindings = Bindings::default();
        assert!(unify(&Term::atom("a"), &Term::atom("a"), &mut bindings, false));
        assert!(!unify(&Term::atom("a"), &Term::atom("b"), &mut bindings, false));
    }

    #[test]
    fn integer_and_float_are_distinct() {
        let mut bindings = Bindings::default();
        assert!(!unify(&Term::int(1), &Term::float(1.0), &mut bindings, false));
    }

    #[test]
    fn variables_bind() {
        let mut bindings = Bindings::default();
        assert!(unify(&var(1), &Term::atom("a"), &mut bindings, false));
        assert_eq!(bindings.deref(&var(1)).atom_name(), Some("a"));
    }

    #[test]
    fn compound_argument_threading() {
        let mut bindings = Bindings::default();
        let left = Term::compound("f", vec![var(1), Term::atom("b")]);
        let right = Term::compound("f", vec![Term::atom("a"), var(2)]);

        assert!(unify(&left, &right, &mut bindings, false));
        assert_eq!(bindings.deref(&var(1)).atom_name(), Some("a"));
        assert_eq!(bindings.deref(&var(2)).atom_name(), Some("b"));
    }

    #[test]
    fn open_list_takes_leftover() {
        let mut bindings = Bindings::default();
        let short = Term::list_with_tail(vec![Term::atom("a")], var(1));
        let long = Term::list(vec![Term::atom("a"), Term::atom("b"), Term::atom("c")]);

        assert!(unify(&short, &long, &mut bindings, false));
        let view = bindings.list_view(&var(1));
        assert_eq!(view.elems.len(), 2);
    }

    #[test]
    fn empty_list_unifies_with_nil_atom() {
        let mut bindings = Bindings::default();
        assert!(unify(&Term::nil(), &Term::atom("[]"), &mut bindings, false));
    }

    #[test]
    fn occurs_check_blocks_self_reference() {
        let mut bindings = Bindings::default();
        let loops = Term::compound("f", vec![var(1)]);
        assert!(!unify(&var(1), &loops, &mut bindings, true));

        let mut without = Bindings::default();
        assert!(unify(&var(1), &loops, &mut without, false));
    }

    #[test]
    fn repeated_unification_is_stable() {
        let left = Term::compound("f", vec![var(1), Term::int(3)]);
        let right = Term::compound("f", vec![Term::atom("a"), var(2)]);

        let mut first = Bindings::default();
        let mut second = Bindings::default();
        assert_eq!(
            unify(&left, &right, &mut first, false),
            unify(&left, &right, &mut second, false)
        );
        assert_eq!(first.len(), second.len());
    }
}
