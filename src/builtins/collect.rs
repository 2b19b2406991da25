/*!
Bulk solution collectors.

Each collector runs its goal to exhaustion through the resolver and observes solutions in the order the resolver produces them; `setof/3` additionally sorts.
Collected instances are copied with fresh variables, so instances from different solutions never share bindings.
*/

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::order::compare_terms;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::Bindings;

/// Register the collectors into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("findall", 3, "collect", findall_3);
    registry.register("bagof", 3, "collect", bagof_3);
    registry.register("setof", 3, "collect", setof_3);
    registry.register("forall", 2, "collect", forall_2);
    registry.register("aggregate_all", 3, "collect", aggregate_all_3);
}

/// Runs the goal to exhaustion, collecting a renamed instance of the template per solution.
fn collect_instances(
    ctx: &Context,
    template: &RTerm,
    goal: &RTerm,
    bindings: &Bindings,
    depth: usize,
) -> Result<Vec<RTerm>, Interrupt> {
    let mut instances = Vec::default();
    let mut solutions = ctx.call_goal(goal, bindings.clone(), depth);

    for solution in &mut solutions {
        let solution = solution?;
        instances.push(ctx.rename_term(&solution.resolve(template)));
    }
    Ok(instances)
}

fn findall_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match collect_instances(ctx, &call.args[0], &call.args[1], &call.bindings, call.depth) {
        Ok(instances) => crate::builtins::unify_answer(
            &call.args[2],
            &Term::list(instances),
            &call.bindings,
        ),
        Err(interrupt) => answer_err(interrupt),
    }
}

/// Strips `Witness^Goal` wrappers: the witnesses are existentially quantified away.
fn strip_carets(goal: &RTerm, bindings: &Bindings) -> RTerm {
    let mut current = bindings.deref(goal);
    loop {
        let next = match current.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == "^" && compound.args.len() == 2 =>
            {
                bindings.deref(&compound.args[1])
            }
            _ => return current,
        };
        current = next;
    }
}

fn bagof_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = strip_carets(&call.args[1], &call.bindings);
    match collect_instances(ctx, &call.args[0], &goal, &call.bindings, call.depth) {
        Ok(instances) => match instances.is_empty() {
            true => answer_none(),
            false => crate::builtins::unify_answer(
                &call.args[2],
                &Term::list(instances),
                &call.bindings,
            ),
        },
        Err(interrupt) => answer_err(interrupt),
    }
}

fn setof_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = strip_carets(&call.args[1], &call.bindings);
    match collect_instances(ctx, &call.args[0], &goal, &call.bindings, call.depth) {
        Ok(mut instances) => {
            if instances.is_empty() {
                return answer_none();
            }
            instances.sort_by(|a, b| compare_terms(a, b));
            instances.dedup_by(|a, b| compare_terms(a, b) == std::cmp::Ordering::Equal);
            crate::builtins::unify_answer(&call.args[2], &Term::list(instances), &call.bindings)
        }
        Err(interrupt) => answer_err(interrupt),
    }
}

fn forall_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let mut conditions = ctx.call_goal(&call.args[0], call.bindings.clone(), call.depth);

    for condition in &mut conditions {
        let condition = match condition {
            Ok(bindings) => bindings,
            Err(interrupt) => return answer_err(interrupt),
        };

        let mut action = ctx.call_goal(&call.args[1], condition, call.depth);
        match action.next() {
            Some(Ok(_)) => {}
            Some(Err(interrupt)) => return answer_err(interrupt),
            None => return answer_none(),
        }
    }

    answer_once(call.bindings)
}

fn aggregate_all_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    use crate::builtins::arithmetic::{compare_nums, eval, Num};

    let spec = &call.args[0];

    // count needs no template.
    if spec.atom_name() == Some("count") {
        return match collect_instances(
            ctx,
            &Term::truth(),
            &call.args[1],
            &call.bindings,
            call.depth,
        ) {
            Ok(instances) => crate::builtins::unify_answer(
                &call.args[2],
                &Term::int(instances.len() as i64),
                &call.bindings,
            ),
            Err(interrupt) => answer_err(interrupt),
        };
    }

    let (shape, template) = match spec.as_ref() {
        Term::Compound(compound) if compound.args.len() == 1 => {
            (compound.functor.to_string(), compound.args[0].clone())
        }
        Term::Var(_) => return answer_err(err::instantiation_error("aggregate_all/3")),
        _ => {
            return answer_err(err::domain_error(
                "aggregate_spec",
                spec.clone(),
                "aggregate_all/3",
            ))
        }
    };

    let instances =
        match collect_instances(ctx, &template, &call.args[1], &call.bindings, call.depth) {
            Ok(instances) => instances,
            Err(interrupt) => return answer_err(interrupt),
        };

    match shape.as_str() {
        "count" => crate::builtins::unify_answer(
            &call.args[2],
            &Term::int(instances.len() as i64),
            &call.bindings,
        ),

        "bag" => crate::builtins::unify_answer(
            &call.args[2],
            &Term::list(instances),
            &call.bindings,
        ),

        "set" => {
            let mut sorted = instances;
            sorted.sort_by(|a, b| compare_terms(a, b));
            sorted.dedup_by(|a, b| compare_terms(a, b) == std::cmp::Ordering::Equal);
            crate::builtins::unify_answer(&call.args[2], &Term::list(sorted), &call.bindings)
        }

        "sum" => {
            let mut total = Num::Int(0.into());
            for instance in &instances {
                let value = match eval(instance, &call.bindings, "aggregate_all/3") {
                    Ok(value) => value,
                    Err(interrupt) => return answer_err(interrupt),
                };
                total = match (total, value) {
                    (Num::Int(a), Num::Int(b)) => Num::Int(a + b),
                    (a, b) => Num::Float(float_of(&a) + float_of(&b)),
                };
            }
            crate::builtins::unify_answer(&call.args[2], &total.into_term(), &call.bindings)
        }

        "max" | "min" => {
            let keep = match shape.as_str() {
                "max" => std::cmp::Ordering::Greater,
                _ => std::cmp::Ordering::Less,
            };

            let mut best: Option<Num> = None;
            for instance in &instances {
                let value = match eval(instance, &call.bindings, "aggregate_all/3") {
                    Ok(value) => value,
                    Err(interrupt) => return answer_err(interrupt),
                };
                best = match best {
                    None => Some(value),
                    Some(held) => {
                        if compare_nums(&value, &held) == keep {
                            Some(value)
                        } else {
                            Some(held)
                        }
                    }
                };
            }

            match best {
                Some(best) => crate::builtins::unify_answer(
                    &call.args[2],
                    &best.into_term(),
                    &call.bindings,
                ),
                None => answer_none(),
            }
        }

        _ => answer_err(err::domain_error(
            "aggregate_spec",
            spec.clone(),
            "aggregate_all/3",
        )),
    }
}

fn float_of(number: &crate::builtins::arithmetic::Num) -> f64 {
    use crate::builtins::arithmetic::Num;
    use num_traits::ToPrimitive;

    match number {
        Num::Int(value) => value.to_f64().unwrap_or(f64::INFINITY),
        Num::Float(value) => *value,
    }
}
