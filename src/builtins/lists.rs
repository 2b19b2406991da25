/*!
List processing built-ins.

The relational predicates --- `append/3`, `member/2`, `length/2`, `select/3` --- work in whichever mode their arguments allow, enumerating lazily where the mode is generative.
The sorting predicates demand proper lists and raise otherwise: a sort over an unbound or improper list is a programming mistake, and failure would hide it.
*/

use std::rc::Rc;

use num_traits::ToPrimitive;

use crate::builtins::{proper_list_arg, unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_none};
use crate::procedures::Solutions;
use crate::structures::order::compare_terms;
use crate::structures::{List, RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{unify, Bindings, Tail};

/// Register list predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("length", 2, "lists", length_2);
    registry.register("append", 3, "lists", append_3);
    registry.register("member", 2, "lists", member_2);
    registry.register("memberchk", 2, "lists", memberchk_2);
    registry.register("reverse", 2, "lists", reverse_2);
    registry.register("nth0", 3, "lists", nth0_3);
    registry.register("nth1", 3, "lists", nth1_3);
    registry.register("last", 2, "lists", last_2);
    registry.register("msort", 2, "lists", msort_2);
    registry.register("sort", 2, "lists", sort_2);
    registry.register("keysort", 2, "lists", keysort_2);
    registry.register("select", 3, "lists", select_3);
    registry.register("sum_list", 2, "lists", sum_list_2);
    registry.register("sumlist", 2, "lists", sum_list_2);
    registry.register("max_list", 2, "lists", max_list_2);
    registry.register("min_list", 2, "lists", min_list_2);
    registry.register("numlist", 3, "lists", numlist_3);
}

fn length_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let length_term = call.args[1].clone();

    // Reject a non-integer length before looking at the list.
    let wanted: Option<usize> = match length_term.as_ref() {
        Term::Var(_) => None,
        Term::Int(value) => match value.to_usize() {
            Some(n) => Some(n),
            None => return answer_none(),
        },
        _ => {
            return answer_err(err::type_error("integer", length_term, "length/2"));
        }
    };

    let view = call.bindings.list_view(&call.args[0]);
    match view.tail {
        Tail::Proper => {
            let length = Term::int(view.elems.len() as i64);
            unify_answer(&call.args[1], &length, &call.bindings)
        }

        Tail::Improper(_) => answer_none(),

        Tail::Open(tail) => match wanted {
            Some(n) => {
                if n < view.elems.len() {
                    return answer_none();
                }
                let fresh: Vec<RTerm> =
                    (0..n - view.elems.len()).map(|_| ctx.fresh_var("_")).collect();
                unify_answer(&tail, &Term::list(fresh), &call.bindings)
            }

            None => {
                // Enumerate lengths from the known prefix upward.
                let base = view.elems.len();
                let bindings = call.bindings;
                let mut extra = 0_usize;

                Box::new(std::iter::from_fn(move || {
                    let fresh: Vec<RTerm> = (0..extra).map(|_| ctx.fresh_var("_")).collect();
                    let total = Term::int((base + extra) as i64);
                    extra += 1;

                    let mut trial = bindings.clone();
                    if unify(&tail, &Term::list(fresh), &mut trial, false)
                        && unify(&length_term, &total, &mut trial, false)
                    {
                        Some(Ok(trial))
                    } else {
                        None
                    }
                }))
            }
        },
    }
}

fn append_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let front_view = call.bindings.list_view(&call.args[0]);

    // With a proper front the relation is a function of the front and back.
    if matches!(front_view.tail, Tail::Proper) {
        let joined = match call.bindings.deref(&call.args[1]).is_nil() {
            true => Term::list(front_view.elems),
            false => Term::list_with_tail(front_view.elems, call.args[1].clone()),
        };
        return unify_answer(&call.args[2], &joined, &call.bindings);
    }

    let whole_view = call.bindings.list_view(&call.args[2]);
    let front_term = call.args[0].clone();
    let back_term = call.args[1].clone();
    let whole_term = call.args[2].clone();
    let bindings = call.bindings;

    match whole_view.tail {
        // Enumerate splits of the whole.
        Tail::Proper => {
            let elems = whole_view.elems;
            let mut split = 0;

            Box::new(std::iter::from_fn(move || {
                while split <= elems.len() {
                    let front = Term::list(elems[..split].to_vec());
                    let back = Term::list(elems[split..].to_vec());
                    split += 1;

                    let mut trial = bindings.clone();
                    if unify(&front_term, &front, &mut trial, false)
                        && unify(&back_term, &back, &mut trial, false)
                    {
                        return Some(Ok(trial));
                    }
                }
                None
            }))
        }

        // Open on both sides: generate fronts of growing length.
        Tail::Open(_) => {
            let mut take = 0_usize;

            Box::new(std::iter::from_fn(move || {
                let fresh: Vec<RTerm> = (0..take).map(|_| ctx.fresh_var("_")).collect();
                let rest = ctx.fresh_var("_");
                take += 1;

                let front = Term::list(fresh.clone());
                let whole = Term::list_with_tail(fresh, rest.clone());

                let mut trial = bindings.clone();
                if unify(&front_term, &front, &mut trial, false)
                    && unify(&whole_term, &whole, &mut trial, false)
                    && unify(&back_term, &rest, &mut trial, false)
                {
                    Some(Ok(trial))
                } else {
                    None
                }
            }))
        }

        // An improper whole bounds the splits at its element prefix.
        Tail::Improper(rest) => {
            let elems = whole_view.elems;
            let mut split = 0;

            Box::new(std::iter::from_fn(move || {
                while split <= elems.len() {
                    let front = Term::list(elems[..split].to_vec());
                    let back = match split == elems.len() {
                        true => rest.clone(),
                        false => Term::list_with_tail(elems[split..].to_vec(), rest.clone()),
                    };
                    split += 1;

                    let mut trial = bindings.clone();
                    if unify(&front_term, &front, &mut trial, false)
                        && unify(&back_term, &back, &mut trial, false)
                    {
                        return Some(Ok(trial));
                    }
                }
                None
            }))
        }
    }
}

fn member_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    Box::new(Member {
        ctx,
        sought: call.args[0].clone(),
        cursor: call.args[1].clone(),
        bindings: call.bindings,
    })
}

/// `member/2` over a possibly open list: elements in order, then --- for an open tail --- ever longer extensions.
struct Member<'a> {
    ctx: &'a Context,
    sought: RTerm,
    cursor: RTerm,
    bindings: Bindings,
}

impl<'a> Iterator for Member<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.bindings.deref(&self.cursor);

            match current.as_ref() {
                Term::List(list) if !list.elems.is_empty() => {
                    let head = list.elems[0].clone();
                    self.cursor = Rc::new(Term::List(List {
                        elems: list.elems[1..].to_vec(),
                        tail: list.tail.clone(),
                    }));

                    let mut trial = self.bindings.clone();
                    if unify(&self.sought, &head, &mut trial, false) {
                        return Some(Ok(trial));
                    }
                }

                Term::List(list) => match &list.tail {
                    Some(tail) => self.cursor = tail.clone(),
                    None => return None,
                },

                Term::Var(var) => {
                    // Extend the open tail: one solution placing the sought element here,
                    // and a longer spine for the alternatives after it.
                    let next_tail = self.ctx.fresh_var("_");

                    let mut trial = self.bindings.clone();
                    let here = Term::list_with_tail(vec![self.sought.clone()], next_tail.clone());
                    trial.bind(var.id, here);

                    let skipped = self.ctx.fresh_var("_");
                    self.bindings.bind(
                        var.id,
                        Term::list_with_tail(vec![skipped], next_tail.clone()),
                    );
                    self.cursor = next_tail;

                    return Some(Ok(trial));
                }

                _ => return None,
            }
        }
    }
}

fn memberchk_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let mut solutions = member_2(ctx, call);
    match solutions.next() {
        Some(first) => Box::new(std::iter::once(first)),
        None => answer_none(),
    }
}

fn reverse_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let forward_view = call.bindings.list_view(&call.args[0]);
    if matches!(forward_view.tail, Tail::Proper) {
        let mut elems = forward_view.elems;
        elems.reverse();
        return unify_answer(&call.args[1], &Term::list(elems), &call.bindings);
    }

    let backward_view = call.bindings.list_view(&call.args[1]);
    if matches!(backward_view.tail, Tail::Proper) {
        let mut elems = backward_view.elems;
        elems.reverse();
        return unify_answer(&call.args[0], &Term::list(elems), &call.bindings);
    }

    answer_err(err::instantiation_error("reverse/2"))
}

fn nth_common<'a>(call: BuiltinCall, offset: usize, context: &'static str) -> Solutions<'a> {
    let view = call.bindings.list_view(&call.args[1]);
    let elems = match view.proper() {
        Some(elems) => elems,
        None => {
            return match call.args[1].as_ref() {
                Term::Var(_) => answer_err(err::instantiation_error(context)),
                _ => answer_none(),
            }
        }
    };

    match call.args[0].as_ref() {
        Term::Int(position) => {
            let index = match position.to_usize() {
                Some(index) => match index.checked_sub(offset) {
                    Some(index) => index,
                    None => return answer_none(),
                },
                None => return answer_none(),
            };
            match elems.get(index) {
                Some(elem) => unify_answer(&call.args[2], elem, &call.bindings),
                None => answer_none(),
            }
        }

        Term::Var(_) => {
            let position_term = call.args[0].clone();
            let value_term = call.args[2].clone();
            let bindings = call.bindings;
            let mut index = 0;

            Box::new(std::iter::from_fn(move || {
                while index < elems.len() {
                    let position = Term::int((index + offset) as i64);
                    let elem = elems[index].clone();
                    index += 1;

                    let mut trial = bindings.clone();
                    if unify(&position_term, &position, &mut trial, false)
                        && unify(&value_term, &elem, &mut trial, false)
                    {
                        return Some(Ok(trial));
                    }
                }
                None
            }))
        }

        _ => answer_err(err::type_error("integer", call.args[0].clone(), context)),
    }
}

fn nth0_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    nth_common(call, 0, "nth0/3")
}

fn nth1_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    nth_common(call, 1, "nth1/3")
}

fn last_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let elems = match proper_list_arg(&call.args[0], &call.bindings, "last/2") {
        Ok(elems) => elems,
        Err(interrupt) => return answer_err(interrupt),
    };
    match elems.last() {
        Some(last) => unify_answer(&call.args[1], last, &call.bindings),
        None => answer_none(),
    }
}

/// Resolves and stably sorts the elements of a proper list argument.
fn sorted_elems(
    call: &BuiltinCall,
    context: &str,
) -> Result<Vec<RTerm>, Interrupt> {
    let elems = proper_list_arg(&call.args[0], &call.bindings, context)?;
    let mut resolved: Vec<RTerm> = elems
        .iter()
        .map(|elem| call.bindings.resolve(elem))
        .collect();
    resolved.sort_by(|a, b| compare_terms(a, b));
    Ok(resolved)
}

fn msort_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match sorted_elems(&call, "msort/2") {
        Ok(sorted) => unify_answer(&call.args[1], &Term::list(sorted), &call.bindings),
        Err(interrupt) => answer_err(interrupt),
    }
}

fn sort_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match sorted_elems(&call, "sort/2") {
        Ok(sorted) => {
            let mut deduped: Vec<RTerm> = Vec::with_capacity(sorted.len());
            for elem in sorted {
                let duplicate = deduped
                    .last()
                    .is_some_and(|kept| compare_terms(kept, &elem) == std::cmp::Ordering::Equal);
                if !duplicate {
                    deduped.push(elem);
                }
            }
            unify_answer(&call.args[1], &Term::list(deduped), &call.bindings)
        }
        Err(interrupt) => answer_err(interrupt),
    }
}

fn keysort_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let elems = match proper_list_arg(&call.args[0], &call.bindings, "keysort/2") {
        Ok(elems) => elems,
        Err(interrupt) => return answer_err(interrupt),
    };

    let mut pairs: Vec<(RTerm, RTerm)> = Vec::with_capacity(elems.len());
    for elem in &elems {
        let resolved = call.bindings.resolve(elem);
        match resolved.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == "-" && compound.args.len() == 2 =>
            {
                pairs.push((compound.args[0].clone(), resolved.clone()));
            }
            _ => {
                return answer_err(err::type_error("pair", resolved, "keysort/2"));
            }
        }
    }

    // Stable by key alone: pairs with equal keys keep their input order.
    pairs.sort_by(|a, b| compare_terms(&a.0, &b.0));

    let sorted = pairs.into_iter().map(|(_, pair)| pair).collect();
    unify_answer(&call.args[1], &Term::list(sorted), &call.bindings)
}

fn select_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let list_view = call.bindings.list_view(&call.args[1]);

    if let Some(elems) = list_view.clone().proper() {
        // Remove one occurrence.
        let sought = call.args[0].clone();
        let rest_term = call.args[2].clone();
        let bindings = call.bindings;
        let mut index = 0;

        return Box::new(std::iter::from_fn(move || {
            while index < elems.len() {
                let candidate = elems[index].clone();
                let mut rest = elems.clone();
                rest.remove(index);
                index += 1;

                let mut trial = bindings.clone();
                if unify(&sought, &candidate, &mut trial, false)
                    && unify(&rest_term, &Term::list(rest), &mut trial, false)
                {
                    return Some(Ok(trial));
                }
            }
            None
        }));
    }

    let rest_view = call.bindings.list_view(&call.args[2]);
    if let Some(rest) = rest_view.proper() {
        // Insertion mode: place the element at each position of the remainder.
        let sought = call.args[0].clone();
        let list_term = call.args[1].clone();
        let bindings = call.bindings;
        let mut position = 0;

        return Box::new(std::iter::from_fn(move || {
            while position <= rest.len() {
                let mut inserted = rest.clone();
                inserted.insert(position, sought.clone());
                position += 1;

                let mut trial = bindings.clone();
                if unify(&list_term, &Term::list(inserted), &mut trial, false) {
                    return Some(Ok(trial));
                }
            }
            None
        }));
    }

    match call.args[1].as_ref() {
        Term::Var(_) => answer_err(err::instantiation_error("select/3")),
        _ => answer_none(),
    }
}

/// Numeric elements of a proper list, for the aggregating predicates.
fn numeric_elems(
    call: &BuiltinCall,
    context: &str,
) -> Result<Vec<crate::builtins::arithmetic::Num>, Interrupt> {
    use crate::builtins::arithmetic::Num;

    let elems = proper_list_arg(&call.args[0], &call.bindings, context)?;
    let mut numbers = Vec::with_capacity(elems.len());
    for elem in elems {
        let elem = call.bindings.deref(&elem);
        match elem.as_ref() {
            Term::Int(value) => numbers.push(Num::Int(value.clone())),
            Term::Float(value) => numbers.push(Num::Float(*value)),
            Term::Var(_) => return Err(err::instantiation_error(context)),
            _ => return Err(err::type_error("number", elem.clone(), context)),
        }
    }
    Ok(numbers)
}

fn sum_list_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    use crate::builtins::arithmetic::Num;

    let numbers = match numeric_elems(&call, "sum_list/2") {
        Ok(numbers) => numbers,
        Err(interrupt) => return answer_err(interrupt),
    };

    let mut total = Num::Int(0.into());
    for number in numbers {
        total = match (total, number) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a + b),
            (a, b) => {
                let (a, b) = (num_as_float(&a), num_as_float(&b));
                Num::Float(a + b)
            }
        };
    }
    unify_answer(&call.args[1], &total.into_term(), &call.bindings)
}

fn num_as_float(number: &crate::builtins::arithmetic::Num) -> f64 {
    use crate::builtins::arithmetic::Num;
    match number {
        Num::Int(value) => value.to_f64().unwrap_or(f64::INFINITY),
        Num::Float(value) => *value,
    }
}

fn extreme_list<'a>(
    call: BuiltinCall,
    context: &'static str,
    keep: std::cmp::Ordering,
) -> Solutions<'a> {
    let numbers = match numeric_elems(&call, context) {
        Ok(numbers) => numbers,
        Err(interrupt) => return answer_err(interrupt),
    };

    let mut numbers = numbers.into_iter();
    let mut best = match numbers.next() {
        Some(first) => first,
        None => return answer_none(),
    };
    for number in numbers {
        if crate::builtins::arithmetic::compare_nums(&number, &best) == keep {
            best = number;
        }
    }
    unify_answer(&call.args[1], &best.into_term(), &call.bindings)
}

fn max_list_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    extreme_list(call, "max_list/2", std::cmp::Ordering::Greater)
}

fn min_list_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    extreme_list(call, "min_list/2", std::cmp::Ordering::Less)
}

fn numlist_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let low = match crate::builtins::int_arg(&call.args[0], "numlist/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };
    let high = match crate::builtins::int_arg(&call.args[1], "numlist/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };

    if low > high {
        return answer_none();
    }

    let mut elems = Vec::default();
    let mut current = low;
    while current <= high {
        elems.push(Rc::new(Term::Int(current.clone())));
        current += 1;
    }
    unify_answer(&call.args[2], &Term::list(elems), &call.bindings)
}
