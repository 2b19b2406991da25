//! Type-testing built-ins.
//!
//! Each inspects its single argument after dereferencing and succeeds or fails without binding anything.
//! The empty list is atom-like: `atom([])` and `atomic([])` hold, while a non-empty list counts as compound.

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::Term;
use crate::unification::Tail;

/// Register type-testing predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("var", 1, "typecheck", var_1);
    registry.register("nonvar", 1, "typecheck", nonvar_1);
    registry.register("atom", 1, "typecheck", atom_1);
    registry.register("number", 1, "typecheck", number_1);
    registry.register("integer", 1, "typecheck", integer_1);
    registry.register("float", 1, "typecheck", float_1);
    registry.register("atomic", 1, "typecheck", atomic_1);
    registry.register("compound", 1, "typecheck", compound_1);
    registry.register("callable", 1, "typecheck", callable_1);
    registry.register("is_list", 1, "typecheck", is_list_1);
    registry.register("ground", 1, "typecheck", ground_1);
}

fn answer_when<'a>(call: BuiltinCall, holds: bool) -> Solutions<'a> {
    match holds {
        true => answer_once(call.bindings),
        false => answer_none(),
    }
}

fn var_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = matches!(call.args[0].as_ref(), Term::Var(_));
    answer_when(call, holds)
}

fn nonvar_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = !matches!(call.args[0].as_ref(), Term::Var(_));
    answer_when(call, holds)
}

fn atom_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = match call.args[0].as_ref() {
        Term::Atom(_) => true,
        term => term.is_nil(),
    };
    answer_when(call, holds)
}

fn number_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = matches!(call.args[0].as_ref(), Term::Int(_) | Term::Float(_));
    answer_when(call, holds)
}

fn integer_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = matches!(call.args[0].as_ref(), Term::Int(_));
    answer_when(call, holds)
}

fn float_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = matches!(call.args[0].as_ref(), Term::Float(_));
    answer_when(call, holds)
}

fn atomic_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = match call.args[0].as_ref() {
        Term::Atom(_) | Term::Int(_) | Term::Float(_) => true,
        term => term.is_nil(),
    };
    answer_when(call, holds)
}

fn compound_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = match call.args[0].as_ref() {
        Term::Compound(_) => true,
        Term::List(_) => !call.args[0].is_nil(),
        _ => false,
    };
    answer_when(call, holds)
}

fn callable_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = call.args[0].is_callable();
    answer_when(call, holds)
}

fn is_list_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = match call.args[0].as_ref() {
        Term::List(_) => matches!(
            call.bindings.list_view(&call.args[0]).tail,
            Tail::Proper
        ),
        term => term.is_nil(),
    };
    answer_when(call, holds)
}

fn ground_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let holds = call.bindings.resolve(&call.args[0]).is_ground();
    answer_when(call, holds)
}
