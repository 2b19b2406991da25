/*!
Built-in predicates: registration and dispatch.

A built-in is identified by name and arity and implemented as a function receiving the argument tuple (each argument dereferenced at the outermost level only), the current substitution, and the context.
Its result is a lazy sequence of solutions, so a built-in may be deterministic (at most one item), nondeterministic (many), fail (none), or raise (an [Err] item), exactly as a user predicate might.

Built-ins which evaluate sub-goals --- `call/N`, `findall/3`, `phrase/2`, and the rest --- call back into the [resolver](crate::procedures::solve) through [call_goal](crate::context::Context::call_goal), which opens a fresh cut barrier: a cut inside a goal passed to a built-in is local to that goal.

Registration is grouped by concern, one module per group, each exposing a `register` hook called when the [registry](Registry) is built:

| group | concern |
|-------|---------|
| [control] | conjunction, disjunction, call, once, negation, catch/throw, cleanup |
| [unify] | `=/2`, `\=/2`, `unify_with_occurs_check/2` |
| [typecheck] | `var/1`, `atom/1`, `is_list/1`, … |
| [terms] | `functor/3`, `arg/3`, `=../2`, `copy_term/2`, term order |
| [arithmetic] | `is/2`, arithmetic comparison, `between/3` |
| [atoms] | atom and number text processing |
| [lists] | list processing, sorting |
| [collect] | `findall/3`, `bagof/3`, `setof/3`, `forall/2`, `aggregate_all/3` |
| [database] | assert/retract, properties, `op/3`, `use_module/1` |
| [dcg] | `phrase/2`, `phrase/3` |
| [io] | `write/1`, `nl/0`, … |
| [random] | `random/1`, `random_between/3`, `set_random/1` |
*/

use std::collections::HashMap;

use crate::context::Context;
use crate::db::PredicateIndicator;
use crate::procedures::Solutions;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{Bindings, Tail};

pub mod arithmetic;
pub mod atoms;
pub mod collect;
pub mod control;
pub mod database;
pub mod dcg;
pub mod io;
pub mod lists;
pub mod random;
pub mod terms;
pub mod typecheck;
pub mod unify;

/// The inputs of one built-in dispatch.
pub struct BuiltinCall {
    /// The goal's arguments, each dereferenced at the outermost level.
    pub args: Vec<RTerm>,

    /// The substitution at the point of the call.
    pub bindings: Bindings,

    /// The depth of the enclosing frame, threaded so sub-goals observe the limit.
    pub depth: usize,
}

/// The implementation of a built-in.
pub type BuiltinFn = for<'a> fn(&'a Context, BuiltinCall) -> Solutions<'a>;

/// A registered built-in.
pub struct Builtin {
    /// The implementation.
    pub run: BuiltinFn,

    /// The registration group, for documentation and logs.
    pub group: &'static str,
}

/// The built-in registry.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<PredicateIndicator, Builtin>,
}

impl Registry {
    /// A registry holding every core group.
    pub fn with_core() -> Self {
        let mut registry = Registry::default();

        control::register(&mut registry);
        unify::register(&mut registry);
        typecheck::register(&mut registry);
        terms::register(&mut registry);
        arithmetic::register(&mut registry);
        atoms::register(&mut registry);
        lists::register(&mut registry);
        collect::register(&mut registry);
        database::register(&mut registry);
        dcg::register(&mut registry);
        io::register(&mut registry);
        random::register(&mut registry);

        registry
    }

    /// Registers a built-in, replacing any existing entry of the same indicator.
    pub fn register(&mut self, name: &str, arity: usize, group: &'static str, run: BuiltinFn) {
        self.entries
            .insert(PredicateIndicator::new(name, arity), Builtin { run, group });
    }

    /// The built-in of an indicator, if registered.
    pub fn get(&self, indicator: &PredicateIndicator) -> Option<&Builtin> {
        self.entries.get(indicator)
    }

    /// True when the indicator names a built-in.
    pub fn contains(&self, indicator: &PredicateIndicator) -> bool {
        self.entries.contains_key(indicator)
    }

    /// An iterator over every registered indicator.
    pub fn indicators(&self) -> impl Iterator<Item = &PredicateIndicator> {
        self.entries.keys()
    }
}

// Argument helpers shared by the groups.
// --------------------------------------------------

/// The atom name of a (dereferenced) argument, or a type/instantiation error.
pub(crate) fn atom_arg(arg: &RTerm, context: &str) -> Result<String, Interrupt> {
    match arg.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),
        Term::Atom(name) => Ok(name.to_string()),
        Term::List(list) if list.elems.is_empty() && list.tail.is_none() => Ok("[]".to_string()),
        _ => Err(err::type_error("atom", arg.clone(), context)),
    }
}

/// The integer value of a (dereferenced) argument, or a type/instantiation error.
pub(crate) fn int_arg(arg: &RTerm, context: &str) -> Result<num_bigint::BigInt, Interrupt> {
    match arg.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),
        Term::Int(value) => Ok(value.clone()),
        _ => Err(err::type_error("integer", arg.clone(), context)),
    }
}

/// The elements of a proper list argument: instantiation error for an open tail, type error otherwise.
pub(crate) fn proper_list_arg(
    arg: &RTerm,
    bindings: &Bindings,
    context: &str,
) -> Result<Vec<RTerm>, Interrupt> {
    match arg.as_ref() {
        Term::Var(_) => return Err(err::instantiation_error(context)),
        Term::List(_) => {}
        Term::Atom(name) if name.as_ref() == "[]" => {}
        _ => return Err(err::type_error("list", arg.clone(), context)),
    }

    let view = bindings.list_view(arg);
    match view.tail {
        Tail::Proper => Ok(view.elems),
        Tail::Open(_) => Err(err::instantiation_error(context)),
        Tail::Improper(_) => Err(err::type_error("list", arg.clone(), context)),
    }
}

/// Unifies a pair against a clone of the bindings: the usual final step of a deterministic built-in.
pub(crate) fn unify_answer<'a>(
    left: &RTerm,
    right: &RTerm,
    bindings: &Bindings,
) -> Solutions<'a> {
    use crate::procedures::solve::{answer_none, answer_once};

    let mut trial = bindings.clone();
    match crate::unification::unify(left, right, &mut trial, false) {
        true => answer_once(trial),
        false => answer_none(),
    }
}
