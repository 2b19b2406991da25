//! Unification built-ins.

use crate::builtins::{unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_none, answer_once};
use crate::procedures::Solutions;
use crate::unification::unify;

/// Register unification predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("=", 2, "unify", unify_2);
    registry.register("\\=", 2, "unify", not_unifiable);
    registry.register("unify_with_occurs_check", 2, "unify", with_occurs_check);
}

fn unify_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    unify_answer(&call.args[0], &call.args[1], &call.bindings)
}

fn not_unifiable<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let mut trial = call.bindings.clone();
    match unify(&call.args[0], &call.args[1], &mut trial, false) {
        true => answer_none(),
        false => answer_once(call.bindings),
    }
}

/// `unify_with_occurs_check/2` checks regardless of the global configuration.
fn with_occurs_check<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let mut trial = call.bindings.clone();
    match unify(&call.args[0], &call.args[1], &mut trial, true) {
        true => answer_once(trial),
        false => answer_none(),
    }
}
