/*!
Random number built-ins, backed by the context's [PCG32](crate::generic::minimal_pcg) source.

The source is seeded from the configuration, so runs are reproducible by default; `set_random/1` reseeds mid-session.
*/

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rand::SeedableRng;
use rand_core::RngCore;

use crate::builtins::{unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::generic::MinimalPCG32;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::Term;
use crate::types::err;

/// Register random predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("random", 1, "random", random_1);
    registry.register("random_between", 3, "random", random_between);
    registry.register("set_random", 1, "random", set_random);
}

/// A float uniform on [0, 1).
fn random_1<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let draw = ctx.rng.borrow_mut().next_u32();
    let value = draw as f64 / (u32::MAX as f64 + 1.0);
    unify_answer(&call.args[0], &Term::float(value), &call.bindings)
}

/// An integer uniform on the inclusive range.
fn random_between<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let low = match crate::builtins::int_arg(&call.args[0], "random_between/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };
    let high = match crate::builtins::int_arg(&call.args[1], "random_between/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };

    if low > high {
        return answer_none();
    }

    let span = (&high - &low + 1_i32).to_u64();
    let span = match span {
        Some(span) => span,
        None => {
            return answer_err(err::resource_error("random_range", "random_between/3"));
        }
    };

    let draw = ctx.rng.borrow_mut().next_u64() % span;
    let value = low + BigInt::from(draw);
    unify_answer(
        &call.args[2],
        &std::rc::Rc::new(Term::Int(value)),
        &call.bindings,
    )
}

/// Reseeds the source: `set_random(seed(N))`, or a bare integer.
fn set_random<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let seed = match call.args[0].as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("set_random/1")),

        Term::Int(value) => value.to_u64(),

        Term::Compound(compound)
            if compound.functor.as_ref() == "seed" && compound.args.len() == 1 =>
        {
            match call.bindings.deref(&compound.args[0]).as_ref() {
                Term::Int(value) => value.to_u64(),
                _ => None,
            }
        }

        _ => None,
    };

    match seed {
        Some(seed) => {
            *ctx.rng.borrow_mut() = MinimalPCG32::from_seed(seed.to_le_bytes());
            answer_once(call.bindings)
        }
        None => answer_err(err::domain_error(
            "random_seed",
            call.args[0].clone(),
            "set_random/1",
        )),
    }
}
