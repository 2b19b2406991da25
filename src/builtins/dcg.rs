/*!
DCG invocation built-ins.

`phrase(Body, List)` appends `(List, [])` to the non-terminal's arguments and resolves the result; `phrase(Body, List, Rest)` appends `(List, Rest)`.
The expanded goal must name a defined predicate --- the usual existence check applies before the call.

Translation of `-->/2` rules into plain clauses happens at consult time, in the [builder](crate::builder).
*/

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::db::PredicateIndicator;
use crate::procedures::solve::answer_err;
use crate::procedures::Solutions;
use crate::structures::{RTerm, Term};
use crate::types::err;

/// Register DCG predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("phrase", 2, "dcg", phrase_2);
    registry.register("phrase", 3, "dcg", phrase_3);
}

/// Builds the expanded goal and checks the target predicate exists.
fn expand<'a>(
    ctx: &'a Context,
    body: &RTerm,
    list: RTerm,
    rest: RTerm,
    context: &str,
) -> Result<RTerm, crate::types::err::Interrupt> {
    let goal = match body.as_ref() {
        Term::Var(_) => return Err(err::instantiation_error(context)),

        Term::Atom(name) => Term::compound(name.as_ref(), vec![list, rest]),

        Term::Compound(compound) => {
            let mut args = compound.args.clone();
            args.push(list);
            args.push(rest);
            Term::compound(compound.functor.as_ref(), args)
        }

        _ => return Err(err::type_error("callable", body.clone(), context)),
    };

    let indicator = PredicateIndicator::of(&goal).expect("goal built callable");
    let known = ctx.builtins.contains(&indicator) || ctx.clause_db.borrow().known(&indicator);
    match known {
        true => Ok(goal),
        false => Err(err::existence_error(
            &indicator.name,
            indicator.arity,
            context,
        )),
    }
}

fn phrase_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = match expand(
        ctx,
        &call.args[0],
        call.args[1].clone(),
        Term::nil(),
        "phrase/2",
    ) {
        Ok(goal) => goal,
        Err(interrupt) => return answer_err(interrupt),
    };
    ctx.call_goal(&goal, call.bindings, call.depth)
}

fn phrase_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = match expand(
        ctx,
        &call.args[0],
        call.args[1].clone(),
        call.args[2].clone(),
        "phrase/3",
    ) {
        Ok(goal) => goal,
        Err(interrupt) => return answer_err(interrupt),
    };
    ctx.call_goal(&goal, call.bindings, call.depth)
}
