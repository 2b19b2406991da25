/*!
Control built-ins: call, once, negation, exceptions, cleanup.

The control structures the resolver handles in place --- conjunction, disjunction, if-then-else, `\+/1`, `!` --- are registered here as well, so they carry the `built_in` property and remain reachable through `call/1`.
Reached that way each reconstructs its goal term and hands it back to the resolver under the call's own barrier, which is exactly the locality `call/1` asks for.
*/

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::misc::log::targets;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{unify, Bindings};

/// Register control predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("true", 0, "control", succeed);
    registry.register("fail", 0, "control", never);
    registry.register("false", 0, "control", never);

    // Reached only through call/1, where cut is local: one quiet success.
    registry.register("!", 0, "control", succeed);

    registry.register(",", 2, "control", conjunction);
    registry.register(";", 2, "control", disjunction);
    registry.register("->", 2, "control", if_then);
    registry.register("\\+", 1, "control", negation);
    registry.register("not", 1, "control", negation);

    for arity in 1..=7 {
        registry.register("call", arity, "control", call_n);
    }

    registry.register("once", 1, "control", once);
    registry.register("ignore", 1, "control", ignore);

    registry.register("halt", 0, "control", halt_0);
    registry.register("halt", 1, "control", halt_1);

    registry.register("throw", 1, "control", throw);
    registry.register("catch", 3, "control", catch);

    registry.register("setup_call_cleanup", 3, "control", setup_call_cleanup);
    registry.register("call_cleanup", 2, "control", call_cleanup);
}

fn succeed<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    answer_once(call.bindings)
}

fn never<'a>(_: &'a Context, _: BuiltinCall) -> Solutions<'a> {
    answer_none()
}

fn halt_0<'a>(_: &'a Context, _: BuiltinCall) -> Solutions<'a> {
    answer_err(Interrupt::Halt(0))
}

fn conjunction<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = Term::compound(",", call.args);
    ctx.call_goal(&goal, call.bindings, call.depth)
}

fn disjunction<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = Term::compound(";", call.args);
    ctx.call_goal(&goal, call.bindings, call.depth)
}

fn if_then<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = Term::compound("->", call.args);
    ctx.call_goal(&goal, call.bindings, call.depth)
}

fn negation<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    ctx.solve_negation(call.args[0].clone(), call.bindings, call.depth)
}

/// Builds the goal of `call/N`: the closure gains the extra arguments on its right.
pub(crate) fn build_call_goal(
    closure: &RTerm,
    extra: &[RTerm],
    context: &str,
) -> Result<RTerm, Interrupt> {
    match closure.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),

        Term::Atom(name) => match extra.is_empty() {
            true => Ok(closure.clone()),
            false => Ok(Term::compound(name.as_ref(), extra.to_vec())),
        },

        Term::Compound(compound) => {
            let mut args = compound.args.clone();
            args.extend(extra.iter().cloned());
            Ok(Term::compound(compound.functor.as_ref(), args))
        }

        _ => Err(err::type_error("callable", closure.clone(), context)),
    }
}

fn call_n<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let goal = match build_call_goal(&call.args[0], &call.args[1..], "call/N") {
        Ok(goal) => goal,
        Err(interrupt) => return answer_err(interrupt),
    };
    ctx.call_goal(&goal, call.bindings, call.depth)
}

fn once<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let mut solutions = ctx.call_goal(&call.args[0], call.bindings, call.depth);
    let mut done = false;

    Box::new(std::iter::from_fn(move || {
        if done {
            return None;
        }
        done = true;
        solutions.next()
    }))
}

fn ignore<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let original = call.bindings.clone();
    let mut solutions = ctx.call_goal(&call.args[0], call.bindings, call.depth);
    let mut done = false;

    Box::new(std::iter::from_fn(move || {
        if done {
            return None;
        }
        done = true;
        match solutions.next() {
            Some(item) => Some(item),
            None => Some(Ok(original.clone())),
        }
    }))
}

fn halt_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    use num_traits::ToPrimitive;

    match call.args[0].as_ref() {
        Term::Var(_) => answer_err(err::instantiation_error("halt/1")),
        Term::Int(code) => answer_err(Interrupt::Halt(code.to_i32().unwrap_or(1))),
        _ => answer_err(err::type_error("integer", call.args[0].clone(), "halt/1")),
    }
}

fn throw<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match call.args[0].as_ref() {
        Term::Var(_) => answer_err(err::instantiation_error("throw/1")),
        _ => {
            // The ball is copied out of the throwing context, so bindings local to the
            // aborted branch do not leak through the catch.
            let ball = ctx.rename_term(&call.bindings.resolve(&call.args[0]));
            answer_err(Interrupt::Throw(ball))
        }
    }
}

fn catch<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let [goal, catcher, recovery] = match <[RTerm; 3]>::try_from(call.args) {
        Ok(args) => args,
        Err(_) => unreachable!("catch/3 arity"),
    };

    let inner = ctx.call_goal(&goal, call.bindings.clone(), call.depth);
    Box::new(Catch {
        ctx,
        inner,
        catcher,
        recovery,
        bindings: call.bindings,
        depth: call.depth,
        recovering: false,
        done: false,
    })
}

/// `catch/3`: pass solutions through, intercepting a matching throw.
struct Catch<'a> {
    ctx: &'a Context,
    inner: Solutions<'a>,
    catcher: RTerm,
    recovery: RTerm,
    bindings: Bindings,
    depth: usize,
    recovering: bool,
    done: bool,
}

impl<'a> Iterator for Catch<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.inner.next() {
                Some(Ok(bindings)) => return Some(Ok(bindings)),

                Some(Err(Interrupt::Throw(ball))) if !self.recovering => {
                    // The substitution rewinds to the catch point before the catcher is tried.
                    let mut trial = self.bindings.clone();
                    if unify(&self.catcher, &ball, &mut trial, false) {
                        log::debug!(target: targets::SOLVE, "caught: {ball}");
                        self.recovering = true;
                        self.inner = self.ctx.call_goal(&self.recovery, trial, self.depth);
                    } else {
                        self.done = true;
                        return Some(Err(Interrupt::Throw(ball)));
                    }
                }

                Some(Err(interrupt)) => {
                    self.done = true;
                    return Some(Err(interrupt));
                }

                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

fn setup_call_cleanup<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let [setup, goal, cleanup] = match <[RTerm; 3]>::try_from(call.args) {
        Ok(args) => args,
        Err(_) => unreachable!("setup_call_cleanup/3 arity"),
    };

    // Setup runs once, committed to its first solution.
    let mut setup_solutions = ctx.call_goal(&setup, call.bindings, call.depth);
    let setup_bindings = match setup_solutions.next() {
        Some(Ok(bindings)) => bindings,
        Some(Err(interrupt)) => return answer_err(interrupt),
        None => return answer_none(),
    };
    drop(setup_solutions);

    let inner = ctx.call_goal(&goal, setup_bindings.clone(), call.depth);
    Box::new(Cleanup {
        ctx,
        inner: Some(inner),
        cleanup,
        cleanup_bindings: setup_bindings,
        depth: call.depth,
        fired: false,
    })
}

fn call_cleanup<'a>(ctx: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let [goal, cleanup] = match <[RTerm; 2]>::try_from(call.args) {
        Ok(args) => args,
        Err(_) => unreachable!("call_cleanup/2 arity"),
    };

    let inner = ctx.call_goal(&goal, call.bindings.clone(), call.depth);
    Box::new(Cleanup {
        ctx,
        inner: Some(inner),
        cleanup,
        cleanup_bindings: call.bindings,
        depth: call.depth,
        fired: false,
    })
}

/// Guards a goal's solutions so the cleanup goal runs exactly once, on every exit path:
/// exhaustion, failure, an escaping interrupt, or the caller dropping the sequence.
struct Cleanup<'a> {
    ctx: &'a Context,
    inner: Option<Solutions<'a>>,
    cleanup: RTerm,
    cleanup_bindings: Bindings,
    depth: usize,
    fired: bool,
}

impl<'a> Cleanup<'a> {
    fn fire(&mut self) {
        if self.fired {
            return;
        }
        self.fired = true;

        let mut cleanup =
            self.ctx
                .call_goal(&self.cleanup, self.cleanup_bindings.clone(), self.depth);
        match cleanup.next() {
            Some(Err(interrupt)) => {
                log::warn!(target: targets::SOLVE, "cleanup goal raised: {interrupt:?}");
            }
            _ => {}
        }
    }
}

impl<'a> Iterator for Cleanup<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        match inner.next() {
            Some(Ok(bindings)) => Some(Ok(bindings)),
            Some(Err(interrupt)) => {
                self.inner = None;
                self.fire();
                Some(Err(interrupt))
            }
            None => {
                self.inner = None;
                self.fire();
                None
            }
        }
    }
}

impl<'a> Drop for Cleanup<'a> {
    fn drop(&mut self) {
        // The goal's own solvers release first, so nested cleanups run innermost-out.
        self.inner = None;
        self.fire();
    }
}
