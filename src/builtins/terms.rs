/*!
Term construction, inspection, and order built-ins.

`functor/3`, `arg/3`, and `=../2` treat non-empty lists as the `'.'/2` compounds they abbreviate, and `=..` rebuilding a `'.'/2` produces a list term, so the two codings never drift apart.
*/

use std::cmp::Ordering;
use std::rc::Rc;

use num_traits::ToPrimitive;

use crate::builtins::{unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::order::compare_terms;
use crate::structures::{List, RTerm, Term};
use crate::types::err;
use crate::unification::unify;

/// Register term inspection predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("functor", 3, "terms", functor_3);
    registry.register("arg", 3, "terms", arg_3);
    registry.register("=..", 2, "terms", univ);
    registry.register("copy_term", 2, "terms", copy_term);

    registry.register("==", 2, "terms", identical);
    registry.register("\\==", 2, "terms", not_identical);
    registry.register("@<", 2, "terms", order_lt);
    registry.register("@>", 2, "terms", order_gt);
    registry.register("@=<", 2, "terms", order_le);
    registry.register("@>=", 2, "terms", order_ge);
    registry.register("compare", 3, "terms", compare_3);
}

/// A non-empty list as the pair of its head and tail, the `'.'/2` reading.
fn uncons(list: &List) -> (RTerm, RTerm) {
    let head = list.elems[0].clone();
    let tail = if list.elems.len() > 1 {
        Rc::new(Term::List(List {
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

fn functor_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let term = &call.args[0];

    match term.as_ref() {
        Term::Var(_) => {
            // Construction mode: name and arity must be supplied.
            let name = &call.args[1];
            let arity = match call.args[2].as_ref() {
                Term::Var(_) => return answer_err(err::instantiation_error("functor/3")),
                Term::Int(value) => match value.to_usize() {
                    Some(arity) => arity,
                    None => {
                        return answer_err(err::type_error(
                            "integer",
                            call.args[2].clone(),
                            "functor/3",
                        ))
                    }
                },
                _ => {
                    return answer_err(err::type_error("integer", call.args[2].clone(), "functor/3"))
                }
            };

            let built = match (name.as_ref(), arity) {
                (Term::Var(_), _) => return answer_err(err::instantiation_error("functor/3")),
                (_, 0) => name.clone(),
                (Term::Atom(functor), _) => {
                    if functor.as_ref() == "." && arity == 2 {
                        Term::list_with_tail(vec![ctx.fresh_var("_")], ctx.fresh_var("_"))
                    } else {
                        let args = (0..arity).map(|_| ctx.fresh_var("_")).collect();
                        Term::compound(functor.as_ref(), args)
                    }
                }
                _ => {
                    return answer_err(err::type_error("atom", name.clone(), "functor/3"));
                }
            };
            unify_answer(term, &built, &call.bindings)
        }

        Term::Atom(_) | Term::Int(_) | Term::Float(_) => {
            let mut trial = call.bindings.clone();
            if unify(&call.args[1], term, &mut trial, false)
                && unify(&call.args[2], &Term::int(0), &mut trial, false)
            {
                answer_once(trial)
            } else {
                answer_none()
            }
        }

        Term::Compound(compound) => {
            let mut trial = call.bindings.clone();
            let name = Term::atom(compound.functor.as_ref());
            let arity = Term::int(compound.args.len() as i64);
            if unify(&call.args[1], &name, &mut trial, false)
                && unify(&call.args[2], &arity, &mut trial, false)
            {
                answer_once(trial)
            } else {
                answer_none()
            }
        }

        Term::List(list) => {
            let mut trial = call.bindings.clone();
            let (name, arity) = match list.elems.is_empty() && list.tail.is_none() {
                true => (Term::atom("[]"), Term::int(0)),
                false => (Term::atom("."), Term::int(2)),
            };
            if unify(&call.args[1], &name, &mut trial, false)
                && unify(&call.args[2], &arity, &mut trial, false)
            {
                answer_once(trial)
            } else {
                answer_none()
            }
        }
    }
}

fn arg_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let term = &call.args[1];
    let args: Vec<RTerm> = match term.as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("arg/3")),
        Term::Compound(compound) => compound.args.clone(),
        Term::List(list) if !term.is_nil() => {
            let (head, tail) = uncons(list);
            vec![head, tail]
        }
        _ => return answer_err(err::type_error("compound", term.clone(), "arg/3")),
    };

    match call.args[0].as_ref() {
        Term::Int(n) => match n.to_usize() {
            Some(n) if n >= 1 && n <= args.len() => {
                unify_answer(&call.args[2], &args[n - 1], &call.bindings)
            }
            _ => answer_none(),
        },

        Term::Var(_) => {
            // Enumerate (N, Arg) pairs.
            let position_var = call.args[0].clone();
            let value_var = call.args[2].clone();
            let bindings = call.bindings;
            let mut n = 0;

            Box::new(std::iter::from_fn(move || {
                while n < args.len() {
                    n += 1;
                    let mut trial = bindings.clone();
                    if unify(&position_var, &Term::int(n as i64), &mut trial, false)
                        && unify(&value_var, &args[n - 1], &mut trial, false)
                    {
                        return Some(Ok(trial));
                    }
                }
                None
            }))
        }

        _ => answer_err(err::type_error("integer", call.args[0].clone(), "arg/3")),
    }
}

fn univ<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let term = &call.args[0];

    match term.as_ref() {
        Term::Var(_) => {
            // Build from the list side.
            let items = match crate::builtins::proper_list_arg(
                &call.args[1],
                &call.bindings,
                "=../2",
            ) {
                Ok(items) => items,
                Err(interrupt) => return answer_err(interrupt),
            };
            let items: Vec<RTerm> = items
                .iter()
                .map(|item| call.bindings.deref(item))
                .collect();

            let built = match items.split_first() {
                None => {
                    return answer_err(err::domain_error(
                        "non_empty_list",
                        Term::nil(),
                        "=../2",
                    ))
                }
                Some((head, [])) => match head.as_ref() {
                    Term::Var(_) => return answer_err(err::instantiation_error("=../2")),
                    Term::Compound(_) | Term::List(_) if !head.is_nil() => {
                        return answer_err(err::type_error("atomic", head.clone(), "=../2"))
                    }
                    _ => head.clone(),
                },
                Some((head, rest)) => match head.as_ref() {
                    Term::Var(_) => return answer_err(err::instantiation_error("=../2")),
                    Term::Atom(name) => {
                        if name.as_ref() == "." && rest.len() == 2 {
                            Term::list_with_tail(vec![rest[0].clone()], rest[1].clone())
                        } else {
                            Term::compound(name.as_ref(), rest.to_vec())
                        }
                    }
                    _ => return answer_err(err::type_error("atom", head.clone(), "=../2")),
                },
            };
            unify_answer(term, &built, &call.bindings)
        }

        Term::Atom(_) | Term::Int(_) | Term::Float(_) => {
            let listing = Term::list(vec![term.clone()]);
            unify_answer(&call.args[1], &listing, &call.bindings)
        }

        Term::Compound(compound) => {
            let mut items = vec![Term::atom(compound.functor.as_ref())];
            items.extend(compound.args.iter().cloned());
            unify_answer(&call.args[1], &Term::list(items), &call.bindings)
        }

        Term::List(list) => {
            let listing = match term.is_nil() {
                true => Term::list(vec![Term::atom("[]")]),
                false => {
                    let (head, tail) = uncons(list);
                    Term::list(vec![Term::atom("."), head, tail])
                }
            };
            unify_answer(&call.args[1], &listing, &call.bindings)
        }
    }
}

fn copy_term<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let copy = ctx.rename_term(&call.bindings.resolve(&call.args[0]));
    unify_answer(&call.args[1], &copy, &call.bindings)
}

// Standard order
// --------------------------------------------------

fn ordering(call: &BuiltinCall) -> Ordering {
    let left = call.bindings.resolve(&call.args[0]);
    let right = call.bindings.resolve(&call.args[1]);
    compare_terms(&left, &right)
}

fn order_answer<'a>(call: BuiltinCall, holds: bool) -> Solutions<'a> {
    match holds {
        true => answer_once(call.bindings),
        false => answer_none(),
    }
}

fn identical<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) == Ordering::Equal;
    order_answer(call, holds)
}

fn not_identical<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) != Ordering::Equal;
    order_answer(call, holds)
}

fn order_lt<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) == Ordering::Less;
    order_answer(call, holds)
}

fn order_gt<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) == Ordering::Greater;
    order_answer(call, holds)
}

fn order_le<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) != Ordering::Greater;
    order_answer(call, holds)
}

fn order_ge<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = ordering(&call) != Ordering::Less;
    order_answer(call, holds)
}

fn compare_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let left = call.bindings.resolve(&call.args[1]);
    let right = call.bindings.resolve(&call.args[2]);
    let order = match compare_terms(&left, &right) {
        Ordering::Less => Term::atom("<"),
        Ordering::Equal => Term::atom("="),
        Ordering::Greater => Term::atom(">"),
    };
    unify_answer(&call.args[0], &order, &call.bindings)
}
