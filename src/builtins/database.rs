/*!
Database built-ins: assertion, retraction, properties, operators, imports.

Assertion and retraction follow the logical update view: a clause asserted or retracted during a call changes the database immediately, but the call in progress keeps the snapshot it started from, and nothing is undone on backtracking.

Modifying a procedure with a static definition --- consulted clauses not declared dynamic, or any built-in --- is a permission error, not a quiet failure.
*/

use std::rc::Rc;

use num_traits::ToPrimitive;

use crate::builtins::{unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::db::operators::OpSpec;
use crate::db::PredicateIndicator;
use crate::misc::log::targets;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::{Clause, RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{unify, Bindings, Tail};

/// Register database predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("assert", 1, "database", assertz);
    registry.register("assertz", 1, "database", assertz);
    registry.register("asserta", 1, "database", asserta);
    registry.register("retract", 1, "database", retract);
    registry.register("abolish", 1, "database", abolish);

    registry.register("dynamic", 1, "database", dynamic_1);
    registry.register("multifile", 1, "database", multifile_1);
    registry.register("discontiguous", 1, "database", discontiguous_1);

    registry.register("current_predicate", 1, "database", current_predicate);
    registry.register("predicate_property", 2, "database", predicate_property);
    registry.register("clause", 2, "database", clause_2);

    registry.register("op", 3, "database", op_3);
    registry.register("current_op", 3, "database", current_op);

    registry.register("use_module", 1, "database", use_module);
}

/// Splits a clause term into head and body, validating both.
fn clause_parts(
    term: &RTerm,
    bindings: &Bindings,
    context: &str,
) -> Result<(RTerm, RTerm), Interrupt> {
    let term = bindings.deref(term);
    let (head, body) = match term.as_ref() {
        Term::Compound(compound)
            if compound.functor.as_ref() == ":-" && compound.args.len() == 2 =>
        {
            (
                bindings.deref(&compound.args[0]),
                bindings.deref(&compound.args[1]),
            )
        }
        _ => (term.clone(), Term::truth()),
    };

    match head.as_ref() {
        Term::Var(_) => return Err(err::instantiation_error(context)),
        Term::Atom(_) | Term::Compound(_) => {}
        _ => return Err(err::type_error("callable", head.clone(), context)),
    }

    match body.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),
        _ if !body.is_callable() => Err(err::type_error("callable", body.clone(), context)),
        _ => Ok((head, body)),
    }
}

/// The static-procedure guard shared by the mutating predicates.
fn modifiable(
    ctx: &Context,
    indicator: &PredicateIndicator,
    context: &str,
) -> Result<(), Interrupt> {
    if ctx.builtins.contains(indicator) {
        return Err(err::permission_error(
            "modify",
            "static_procedure",
            indicator.as_term(),
            context,
        ));
    }

    let db = ctx.clause_db.borrow();
    if let Some(record) = db.record(indicator) {
        if !record.dynamic && !record.clauses().is_empty() {
            return Err(err::permission_error(
                "modify",
                "static_procedure",
                indicator.as_term(),
                context,
            ));
        }
    }
    Ok(())
}

fn assert_common<'a>(ctx: &'a Context, call: BuiltinCall, front: bool, context: &str) -> Solutions<'a> {
    let (head, body) = match clause_parts(&call.args[0], &call.bindings, context) {
        Ok(parts) => parts,
        Err(interrupt) => return answer_err(interrupt),
    };

    let indicator = match PredicateIndicator::of(&head) {
        Some(indicator) => indicator,
        None => return answer_err(err::type_error("callable", head, context)),
    };

    if let Err(interrupt) = modifiable(ctx, &indicator, context) {
        return answer_err(interrupt);
    }

    // The stored clause is detached: resolved against the current bindings, then renamed apart.
    let snapshot = Clause {
        head: call.bindings.resolve(&head),
        body: call.bindings.resolve(&body),
    };
    let detached = ctx.rename_clause(&snapshot);

    {
        let mut db = ctx.clause_db.borrow_mut();
        db.set_dynamic(indicator.clone());
        db.add_clause(indicator, detached, front);
    }

    answer_once(call.bindings)
}

fn assertz<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    assert_common(ctx, call, false, "assertz/1")
}

fn asserta<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    assert_common(ctx, call, true, "asserta/1")
}

fn retract<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let (head, body) = match clause_parts(&call.args[0], &call.bindings, "retract/1") {
        Ok(parts) => parts,
        Err(interrupt) => return answer_err(interrupt),
    };

    let indicator = match PredicateIndicator::of(&head) {
        Some(indicator) => indicator,
        None => return answer_err(err::type_error("callable", head, "retract/1")),
    };

    if ctx.builtins.contains(&indicator) {
        return answer_err(err::permission_error(
            "modify",
            "static_procedure",
            indicator.as_term(),
            "retract/1",
        ));
    }

    let candidates = {
        let mut db = ctx.clause_db.borrow_mut();
        if db.known(&indicator) && !db.is_dynamic(&indicator) {
            let has_clauses = db
                .record(&indicator)
                .is_some_and(|record| !record.clauses().is_empty());
            if has_clauses {
                return answer_err(err::permission_error(
                    "modify",
                    "static_procedure",
                    indicator.as_term(),
                    "retract/1",
                ));
            }
        }
        match db.candidates(&indicator, None) {
            Some(clauses) => clauses,
            None => return answer_none(),
        }
    };

    // First matching clause only: the match binds, the clause goes.
    for stored in candidates {
        let renamed = ctx.rename_clause(&stored);
        let mut trial = call.bindings.clone();
        if unify(&head, &renamed.head, &mut trial, false)
            && unify(&body, &renamed.body, &mut trial, false)
        {
            let removed = ctx.clause_db.borrow_mut().remove_clause(&indicator, &stored);
            if removed {
                log::debug!(target: targets::CLAUSE_DB, "retract {indicator}: {stored}");
                return answer_once(trial);
            }
        }
    }

    answer_none()
}

/// Reads a `Name/Arity` term, with errors in the usual places.
fn indicator_arg(
    term: &RTerm,
    bindings: &Bindings,
    context: &str,
) -> Result<PredicateIndicator, Interrupt> {
    let term = bindings.deref(term);
    match term.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),
        Term::Compound(compound)
            if compound.functor.as_ref() == "/" && compound.args.len() == 2 =>
        {
            let name = bindings.deref(&compound.args[0]);
            let arity = bindings.deref(&compound.args[1]);
            match (name.as_ref(), arity.as_ref()) {
                (Term::Var(_), _) | (_, Term::Var(_)) => Err(err::instantiation_error(context)),
                (Term::Atom(name), Term::Int(arity)) => match arity.to_usize() {
                    Some(arity) => Ok(PredicateIndicator::new(name.as_ref(), arity)),
                    None => Err(err::domain_error(
                        "predicate_indicator",
                        term.clone(),
                        context,
                    )),
                },
                _ => Err(err::type_error(
                    "predicate_indicator",
                    term.clone(),
                    context,
                )),
            }
        }
        _ => Err(err::type_error(
            "predicate_indicator",
            term.clone(),
            context,
        )),
    }
}

fn abolish<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let indicator = match indicator_arg(&call.args[0], &call.bindings, "abolish/1") {
        Ok(indicator) => indicator,
        Err(interrupt) => return answer_err(interrupt),
    };

    if let Err(interrupt) = modifiable(ctx, &indicator, "abolish/1") {
        return answer_err(interrupt);
    }

    ctx.clause_db.borrow_mut().abolish(&indicator);
    answer_once(call.bindings)
}

/// Walks a declaration argument: `a/1`, `(a/1, b/2)`, or a list of indicators.
fn declared_indicators(
    term: &RTerm,
    bindings: &Bindings,
    context: &str,
    into: &mut Vec<PredicateIndicator>,
) -> Result<(), Interrupt> {
    let term = bindings.deref(term);
    match term.as_ref() {
        Term::Compound(compound)
            if compound.functor.as_ref() == "," && compound.args.len() == 2 =>
        {
            declared_indicators(&compound.args[0], bindings, context, into)?;
            declared_indicators(&compound.args[1], bindings, context, into)
        }

        Term::List(_) => {
            let view = bindings.list_view(&term);
            match view.tail {
                Tail::Proper => {
                    for item in view.elems {
                        declared_indicators(&item, bindings, context, into)?;
                    }
                    Ok(())
                }
                _ => Err(err::type_error("list", term.clone(), context)),
            }
        }

        _ => {
            into.push(indicator_arg(&term, bindings, context)?);
            Ok(())
        }
    }
}

fn declaration_common<'a>(
    ctx: &'a Context,
    call: BuiltinCall,
    context: &'static str,
    apply: fn(&mut crate::db::clause::ClauseDB, PredicateIndicator),
) -> Solutions<'a> {
    let mut indicators = Vec::default();
    if let Err(interrupt) =
        declared_indicators(&call.args[0], &call.bindings, context, &mut indicators)
    {
        return answer_err(interrupt);
    }

    for indicator in &indicators {
        if ctx.builtins.contains(indicator) {
            return answer_err(err::permission_error(
                "modify",
                "static_procedure",
                indicator.as_term(),
                context,
            ));
        }
    }

    let mut db = ctx.clause_db.borrow_mut();
    for indicator in indicators {
        apply(&mut db, indicator);
    }
    drop(db);

    answer_once(call.bindings)
}

fn dynamic_1<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    declaration_common(ctx, call, "dynamic/1", |db, pi| db.set_dynamic(pi))
}

fn multifile_1<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    declaration_common(ctx, call, "multifile/1", |db, pi| db.set_multifile(pi))
}

fn discontiguous_1<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    declaration_common(ctx, call, "discontiguous/1", |db, pi| {
        db.set_discontiguous(pi)
    })
}

fn current_predicate<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    // User predicates first, then built-ins, each batch in name order for stable enumeration.
    let mut indicators: Vec<PredicateIndicator> = ctx
        .clause_db
        .borrow()
        .indicators()
        .cloned()
        .collect();
    indicators.sort_by(|a, b| (a.name.as_ref(), a.arity).cmp(&(b.name.as_ref(), b.arity)));

    let mut builtin_indicators: Vec<PredicateIndicator> =
        ctx.builtins.indicators().cloned().collect();
    builtin_indicators.sort_by(|a, b| (a.name.as_ref(), a.arity).cmp(&(b.name.as_ref(), b.arity)));
    indicators.extend(builtin_indicators);

    let pattern = call.args[0].clone();
    let bindings = call.bindings;
    let mut next = 0;

    Box::new(std::iter::from_fn(move || {
        while next < indicators.len() {
            let candidate = indicators[next].as_term();
            next += 1;

            let mut trial = bindings.clone();
            if unify(&pattern, &candidate, &mut trial, false) {
                return Some(Ok(trial));
            }
        }
        None
    }))
}

fn predicate_property<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let head = &call.args[0];
    let indicator = match head.as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("predicate_property/2")),
        _ => match PredicateIndicator::of(head) {
            Some(indicator) => indicator,
            None => {
                return answer_err(err::type_error(
                    "callable",
                    head.clone(),
                    "predicate_property/2",
                ))
            }
        },
    };

    let mut properties: Vec<&'static str> = Vec::default();

    if ctx.builtins.contains(&indicator) {
        properties.push("built_in");
        properties.push("static");
    } else {
        let db = ctx.clause_db.borrow();
        match db.record(&indicator) {
            Some(record) => {
                match record.dynamic {
                    true => properties.push("dynamic"),
                    false => properties.push("static"),
                }
                if record.multifile {
                    properties.push("multifile");
                }
                if record.discontiguous {
                    properties.push("discontiguous");
                }
            }
            None => return answer_none(),
        }
    }

    let pattern = call.args[1].clone();
    let bindings = call.bindings;
    let mut next = 0;

    Box::new(std::iter::from_fn(move || {
        while next < properties.len() {
            let candidate = Term::atom(properties[next]);
            next += 1;

            let mut trial = bindings.clone();
            if unify(&pattern, &candidate, &mut trial, false) {
                return Some(Ok(trial));
            }
        }
        None
    }))
}

fn clause_2<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let head = &call.args[0];
    let indicator = match head.as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("clause/2")),
        _ => match PredicateIndicator::of(head) {
            Some(indicator) => indicator,
            None => {
                return answer_err(err::type_error("callable", head.clone(), "clause/2"))
            }
        },
    };

    if ctx.builtins.contains(&indicator) {
        return answer_err(err::permission_error(
            "access",
            "private_procedure",
            indicator.as_term(),
            "clause/2",
        ));
    }

    let candidates = match ctx.clause_db.borrow_mut().candidates(&indicator, None) {
        Some(clauses) => clauses,
        None => return answer_none(),
    };

    let head = head.clone();
    let body_pattern = call.args[1].clone();
    let bindings = call.bindings;
    let mut next = 0;

    Box::new(std::iter::from_fn(move || {
        while next < candidates.len() {
            let renamed = ctx.rename_clause(&candidates[next]);
            next += 1;

            let mut trial = bindings.clone();
            if unify(&head, &renamed.head, &mut trial, false)
                && unify(&body_pattern, &renamed.body, &mut trial, false)
            {
                return Some(Ok(trial));
            }
        }
        None
    }))
}

fn op_3<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let priority = match call.args[0].as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("op/3")),
        Term::Int(value) => match value.to_u16() {
            Some(priority) if priority <= 1200 => priority,
            _ => {
                return answer_err(err::domain_error(
                    "operator_priority",
                    call.args[0].clone(),
                    "op/3",
                ))
            }
        },
        _ => {
            return answer_err(err::type_error("integer", call.args[0].clone(), "op/3"));
        }
    };

    let spec = match call.args[1].as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("op/3")),
        Term::Atom(name) => match OpSpec::from_name(name) {
            Some(spec) => spec,
            None => {
                return answer_err(err::domain_error(
                    "operator_specifier",
                    call.args[1].clone(),
                    "op/3",
                ))
            }
        },
        _ => {
            return answer_err(err::type_error("atom", call.args[1].clone(), "op/3"));
        }
    };

    let mut names = Vec::default();
    let name_arg = &call.args[2];
    match name_arg.as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("op/3")),
        Term::Atom(name) => names.push(name.to_string()),
        Term::List(_) => {
            let items = match crate::builtins::proper_list_arg(name_arg, &call.bindings, "op/3") {
                Ok(items) => items,
                Err(interrupt) => return answer_err(interrupt),
            };
            for item in items {
                match call.bindings.deref(&item).as_ref() {
                    Term::Atom(name) => names.push(name.to_string()),
                    other => {
                        return answer_err(err::type_error(
                            "atom",
                            Rc::new(other.clone()),
                            "op/3",
                        ))
                    }
                }
            }
        }
        _ => {
            return answer_err(err::type_error("atom", name_arg.clone(), "op/3"));
        }
    }

    for name in &names {
        if name == "," {
            return answer_err(err::permission_error(
                "modify",
                "operator",
                Term::atom(","),
                "op/3",
            ));
        }
    }

    let mut operators = ctx.operators.borrow_mut();
    for name in names {
        log::info!(target: targets::BUILDER, "op {priority} {} {name}", spec.name());
        operators.insert(priority, spec, name);
    }
    drop(operators);

    answer_once(call.bindings)
}

fn current_op<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let snapshot: Vec<(u16, OpSpec, String)> = ctx
        .operators
        .borrow()
        .iter()
        .map(|(priority, spec, name)| (priority, spec, name.to_string()))
        .collect();

    let priority_pattern = call.args[0].clone();
    let spec_pattern = call.args[1].clone();
    let name_pattern = call.args[2].clone();
    let bindings = call.bindings;
    let mut next = 0;

    Box::new(std::iter::from_fn(move || {
        while next < snapshot.len() {
            let (priority, spec, name) = &snapshot[next];
            next += 1;

            let mut trial = bindings.clone();
            if unify(&priority_pattern, &Term::int(*priority as i64), &mut trial, false)
                && unify(&spec_pattern, &Term::atom(spec.name()), &mut trial, false)
                && unify(&name_pattern, &Term::atom(name), &mut trial, false)
            {
                return Some(Ok(trial));
            }
        }
        None
    }))
}

fn use_module<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let spec = &call.args[0];
    let name = match spec.as_ref() {
        Term::Var(_) => return answer_err(err::instantiation_error("use_module/1")),
        Term::Atom(name) => name.to_string(),
        Term::Compound(compound)
            if compound.functor.as_ref() == "library" && compound.args.len() == 1 =>
        {
            match call.bindings.deref(&compound.args[0]).as_ref() {
                Term::Atom(name) => name.to_string(),
                Term::Var(_) => return answer_err(err::instantiation_error("use_module/1")),
                _ => {
                    return answer_err(err::type_error(
                        "atom",
                        compound.args[0].clone(),
                        "use_module/1",
                    ))
                }
            }
        }
        _ => {
            return answer_err(err::type_error(
                "module_specifier",
                spec.clone(),
                "use_module/1",
            ))
        }
    };

    log::info!(target: targets::BUILDER, "use_module: {name}");

    let operators: Vec<(u16, OpSpec, String)> = {
        let mut modules = ctx.modules.borrow_mut();
        modules.import(&name).operators.clone()
    };

    let mut table = ctx.operators.borrow_mut();
    for (priority, spec, name) in operators {
        table.insert(priority, spec, name);
    }
    drop(table);

    answer_once(call.bindings)
}
