/*!
The standard order of terms.

Variables precede numbers, numbers precede atoms, and atoms precede compound terms.
Numbers compare by value across kinds, atoms alphabetically, and compounds by arity, then functor, then arguments left-to-right.
Lists take part as the `'.'/2` compounds they abbreviate.

The comparison is structural: callers are expected to resolve terms against the current bindings first, as [compare](crate::builtins) and friends do.
*/

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::structures::{List, RTerm, Term};

/// The rank of a term in the standard order: Var < Number < Atom < Compound.
fn rank(term: &Term) -> u8 {
    match term {
        Term::Var(_) => 0,
        Term::Float(_) | Term::Int(_) => 1,
        Term::Atom(_) => 2,
        Term::List(list) if list.elems.is_empty() && list.tail.is_none() => 2,
        Term::Compound(_) | Term::List(_) => 3,
    }
}

/// Compares an integer against a float by value, breaking ties in favour of the float.
fn cmp_int_float(int: &BigInt, float: f64) -> Ordering {
    match int.to_f64() {
        Some(as_float) => as_float.partial_cmp(&float).unwrap_or(Ordering::Equal),
        None => {
            // Out of f64 range, so the sign decides.
            if int.sign() == num_bigint::Sign::Minus {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

/// The functor and arity of a compound or non-empty list, for cross-kind comparison.
fn shape(term: &Term) -> (usize, &str) {
    match term {
        Term::Compound(compound) => (compound.args.len(), compound.functor.as_ref()),
        Term::List(_) => (2, "."),
        _ => unreachable!("shape of a non-compound"),
    }
}

/// A non-empty list viewed as head plus tail, with the absent tail read as `[]`.
fn uncons(list: &List) -> (RTerm, RTerm) {
    let head = list.elems[0].clone();
    let tail = if list.elems.len() > 1 {
        std::rc::Rc::new(Term::List(List {
            elems: list.elems[1..].to_vec(),
            tail: list.tail.clone(),
        }))
    } else {
        match &list.tail {
            Some(tail) => tail.clone(),
            None => Term::nil(),
        }
    };
    (head, tail)
}

/// Compares two terms in the standard order of terms.
pub fn compare_terms(left: &Term, right: &Term) -> Ordering {
    let ranks = rank(left).cmp(&rank(right));
    if ranks != Ordering::Equal {
        return ranks;
    }

    match (left, right) {
        (Term::Var(a), Term::Var(b)) => a.id.cmp(&b.id),

        (Term::Int(a), Term::Int(b)) => a.cmp(b),
        (Term::Float(a), Term::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Term::Int(a), Term::Float(b)) => cmp_int_float(a, *b),
        (Term::Float(a), Term::Int(b)) => cmp_int_float(b, *a).reverse(),

        (Term::Atom(_) | Term::List(_), Term::Atom(_) | Term::List(_))
            if rank(left) == 2 && rank(right) == 2 =>
        {
            let a = left.atom_name().unwrap_or("[]");
            let b = right.atom_name().unwrap_or("[]");
            a.cmp(b)
        }

        (Term::List(a), Term::List(b)) => {
            let (a_head, a_tail) = uncons(a);
            let (b_head, b_tail) = uncons(b);
            match compare_terms(&a_head, &b_head) {
                Ordering::Equal => compare_terms(&a_tail, &b_tail),
                other => other,
            }
        }

        (Term::Compound(a), Term::Compound(b)) => {
            let by_shape = shape(left).cmp(&shape(right));
            if by_shape != Ordering::Equal {
                return by_shape;
            }
            for (x, y) in a.args.iter().zip(b.args.iter()) {
                match compare_terms(x, y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        }

        (Term::Compound(c), Term::List(l)) => {
            let by_shape = shape(left).cmp(&shape(right));
            if by_shape != Ordering::Equal {
                return by_shape;
            }
            let (head, tail) = uncons(l);
            match compare_terms(&c.args[0], &head) {
                Ordering::Equal => compare_terms(&c.args[1], &tail),
                other => other,
            }
        }

        (Term::List(_), Term::Compound(_)) => compare_terms(right, left).reverse(),

        _ => unreachable!("ranks agree"),
    }
}

#[cfg(test)]
mod order_tests {
    use super::*;

    #[test]
    fn ranks() {
        let var = Term::Var(crate::structures::Variable {
            id: 0,
            name: std::rc::Rc::from("X"),
        });
        let atom = Term::atom("zebra");
        let number = Term::int(1_000_000);
        let compound = Term::compound("f", vec![Term::atom("a")]);

        assert_eq!(compare_terms(&var, &number), Ordering::Less);
        assert_eq!(compare_terms(&number, &atom), Ordering::Less);
        assert_eq!(compare_terms(&atom, &compound), Ordering::Less);
    }

    #[test]
    fn numbers_compare_by_value() {
        let one = Term::int(1);
        let one_float = Term::float(1.0);
        let two = Term::float(2.0);

        assert_eq!(compare_terms(&one, &two), Ordering::Less);
        assert_eq!(compare_terms(&one, &one_float), Ordering::Equal);
    }

    #[test]
    fn compounds_by_arity_then_functor() {
        let f_one = Term::compound("f", vec![Term::atom("a")]);
        let g_one = Term::compound("g", vec![Term::atom("a")]);
        let f_two = Term::compound("f", vec![Term::atom("a"), Term::atom("b")]);

        assert_eq!(compare_terms(&f_one, &g_one), Ordering::Less);
        assert_eq!(compare_terms(&f_one, &f_two), Ordering::Less);
    }

    #[test]
    fn lists_read_as_cons() {
        let ab = Term::list(vec![Term::atom("a"), Term::atom("b")]);
        let ac = Term::list(vec![Term::atom("a"), Term::atom("c")]);
        assert_eq!(compare_terms(&ab, &ac), Ordering::Less);
    }
}
