/*!
Arithmetic built-ins and the expression evaluator.

Expressions evaluate over two kinds of number: arbitrary-precision integers and floats.
An operation over two integers stays integral where it can (`/` falls back to a float only when the division is inexact), and any float operand makes the result a float.

Evaluation raises rather than fails: an unbound sub-expression is an instantiation error, an unknown functor a type error against `evaluable`, and division by zero `evaluation_error(zero_divisor)`.
*/

use num_bigint::BigInt;
use num_traits::{Pow, Signed, ToPrimitive, Zero};

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{unify, Bindings};

/// Register arithmetic predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("is", 2, "arithmetic", is_2);

    registry.register("=:=", 2, "arithmetic", num_eq);
    registry.register("=\\=", 2, "arithmetic", num_ne);
    registry.register("<", 2, "arithmetic", num_lt);
    registry.register(">", 2, "arithmetic", num_gt);
    registry.register("=<", 2, "arithmetic", num_le);
    registry.register(">=", 2, "arithmetic", num_ge);

    registry.register("succ", 2, "arithmetic", succ_2);
    registry.register("plus", 3, "arithmetic", plus_3);
    registry.register("between", 3, "arithmetic", between_3);
}

/// An evaluated number.
#[derive(Clone, Debug)]
pub enum Num {
    Int(BigInt),
    Float(f64),
}

impl Num {
    /// The number as a term.
    pub fn into_term(self) -> RTerm {
        match self {
            Num::Int(value) => std::rc::Rc::new(Term::Int(value)),
            Num::Float(value) => Term::float(value),
        }
    }

    fn as_float(&self) -> f64 {
        match self {
            Num::Int(value) => value.to_f64().unwrap_or(f64::INFINITY),
            Num::Float(value) => *value,
        }
    }
}

fn both_ints(a: &Num, b: &Num) -> Option<(BigInt, BigInt)> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Some((x.clone(), y.clone())),
        _ => None,
    }
}

/// Numeric comparison across kinds.
pub fn compare_nums(a: &Num, b: &Num) -> std::cmp::Ordering {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(y),
        _ => a
            .as_float()
            .partial_cmp(&b.as_float())
            .unwrap_or(std::cmp::Ordering::Equal),
    }
}

/// Evaluates an arithmetic expression against the bindings.
pub fn eval(expr: &RTerm, bindings: &Bindings, context: &str) -> Result<Num, Interrupt> {
    let expr = bindings.deref(expr);
    match expr.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),

        Term::Int(value) => Ok(Num::Int(value.clone())),
        Term::Float(value) => Ok(Num::Float(*value)),

        Term::Atom(name) => match name.as_ref() {
            "pi" => Ok(Num::Float(std::f64::consts::PI)),
            "e" => Ok(Num::Float(std::f64::consts::E)),
            "epsilon" => Ok(Num::Float(f64::EPSILON)),
            "inf" | "infinite" => Ok(Num::Float(f64::INFINITY)),
            "nan" => Ok(Num::Float(f64::NAN)),
            _ => Err(err::type_error(
                "evaluable",
                err::indicator_term(name, 0),
                context,
            )),
        },

        Term::Compound(compound) => {
            let functor = compound.functor.as_ref();
            match compound.args.len() {
                1 => {
                    let a = eval(&compound.args[0], bindings, context)?;
                    eval_unary(functor, a, context).ok_or_else(|| {
                        err::type_error("evaluable", err::indicator_term(functor, 1), context)
                    })?
                }
                2 => {
                    let a = eval(&compound.args[0], bindings, context)?;
                    let b = eval(&compound.args[1], bindings, context)?;
                    eval_binary(functor, a, b, context).ok_or_else(|| {
                        err::type_error("evaluable", err::indicator_term(functor, 2), context)
                    })?
                }
                arity => Err(err::type_error(
                    "evaluable",
                    err::indicator_term(functor, arity),
                    context,
                )),
            }
        }

        Term::List(_) => Err(err::type_error("evaluable", expr.clone(), context)),
    }
}

/// Unary evaluable functors; [None] when the functor is unknown.
fn eval_unary(functor: &str, a: Num, context: &str) -> Option<Result<Num, Interrupt>> {
    let result = match functor {
        "-" => match a {
            Num::Int(x) => Ok(Num::Int(-x)),
            Num::Float(x) => Ok(Num::Float(-x)),
        },
        "+" => Ok(a),
        "abs" => match a {
            Num::Int(x) => Ok(Num::Int(x.abs())),
            Num::Float(x) => Ok(Num::Float(x.abs())),
        },
        "sign" => match a {
            Num::Int(x) => Ok(Num::Int(x.signum())),
            Num::Float(x) => Ok(Num::Float(if x == 0.0 { 0.0 } else { x.signum() })),
        },
        "min" | "max" => return None,

        "truncate" => Ok(Num::Int(float_to_int(a.as_float().trunc()))),
        "round" => Ok(Num::Int(float_to_int(a.as_float().round()))),
        "ceiling" => Ok(Num::Int(float_to_int(a.as_float().ceil()))),
        "floor" => Ok(Num::Int(float_to_int(a.as_float().floor()))),
        "integer" => Ok(Num::Int(float_to_int(a.as_float().round()))),
        "float" => Ok(Num::Float(a.as_float())),
        "float_integer_part" => Ok(Num::Float(a.as_float().trunc())),
        "float_fractional_part" => Ok(Num::Float(a.as_float().fract())),

        "sqrt" => Ok(Num::Float(a.as_float().sqrt())),
        "sin" => Ok(Num::Float(a.as_float().sin())),
        "cos" => Ok(Num::Float(a.as_float().cos())),
        "tan" => Ok(Num::Float(a.as_float().tan())),
        "asin" => Ok(Num::Float(a.as_float().asin())),
        "acos" => Ok(Num::Float(a.as_float().acos())),
        "atan" => Ok(Num::Float(a.as_float().atan())),
        "exp" => Ok(Num::Float(a.as_float().exp())),
        "log" => {
            let x = a.as_float();
            if x <= 0.0 {
                Err(err::evaluation_error("undefined", context))
            } else {
                Ok(Num::Float(x.ln()))
            }
        }

        "\\" => match a {
            Num::Int(x) => Ok(Num::Int(!x)),
            Num::Float(_) => Err(err::type_error(
                "integer",
                a.into_term(),
                context,
            )),
        },

        "msb" => match a {
            Num::Int(x) if x.is_positive() => Ok(Num::Int(BigInt::from(x.bits() - 1))),
            _ => Err(err::evaluation_error("undefined", context)),
        },

        _ => return None,
    };
    Some(result)
}

/// Binary evaluable functors; [None] when the functor is unknown.
fn eval_binary(functor: &str, a: Num, b: Num, context: &str) -> Option<Result<Num, Interrupt>> {
    let result = match functor {
        "+" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x + y)),
            None => Ok(Num::Float(a.as_float() + b.as_float())),
        },
        "-" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x - y)),
            None => Ok(Num::Float(a.as_float() - b.as_float())),
        },
        "*" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x * y)),
            None => Ok(Num::Float(a.as_float() * b.as_float())),
        },

        "/" => match both_ints(&a, &b) {
            Some((x, y)) => {
                if y.is_zero() {
                    Err(err::evaluation_error("zero_divisor", context))
                } else if (&x % &y).is_zero() {
                    Ok(Num::Int(x / y))
                } else {
                    Ok(Num::Float(
                        x.to_f64().unwrap_or(f64::NAN) / y.to_f64().unwrap_or(f64::NAN),
                    ))
                }
            }
            None => {
                if b.as_float() == 0.0 {
                    Err(err::evaluation_error("zero_divisor", context))
                } else {
                    Ok(Num::Float(a.as_float() / b.as_float()))
                }
            }
        },

        "//" => match both_ints(&a, &b) {
            Some((x, y)) => {
                if y.is_zero() {
                    Err(err::evaluation_error("zero_divisor", context))
                } else {
                    Ok(Num::Int(x / y))
                }
            }
            None => Err(int_expected(&a, &b, context)),
        },

        "div" => match both_ints(&a, &b) {
            Some((x, y)) => {
                if y.is_zero() {
                    Err(err::evaluation_error("zero_divisor", context))
                } else {
                    Ok(Num::Int(floor_div(x, y)))
                }
            }
            None => Err(int_expected(&a, &b, context)),
        },

        "mod" => match both_ints(&a, &b) {
            Some((x, y)) => {
                if y.is_zero() {
                    Err(err::evaluation_error("zero_divisor", context))
                } else {
                    // Result takes the sign of the divisor.
                    Ok(Num::Int(((&x % &y) + &y) % &y))
                }
            }
            None => Err(int_expected(&a, &b, context)),
        },

        "rem" => match both_ints(&a, &b) {
            Some((x, y)) => {
                if y.is_zero() {
                    Err(err::evaluation_error("zero_divisor", context))
                } else {
                    Ok(Num::Int(x % y))
                }
            }
            None => Err(int_expected(&a, &b, context)),
        },

        "min" => Ok(match compare_nums(&a, &b) {
            std::cmp::Ordering::Greater => b,
            _ => a,
        }),
        "max" => Ok(match compare_nums(&a, &b) {
            std::cmp::Ordering::Less => b,
            _ => a,
        }),

        "gcd" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(gcd(x.abs(), y.abs()))),
            None => Err(int_expected(&a, &b, context)),
        },

        "**" => Ok(Num::Float(a.as_float().powf(b.as_float()))),

        "^" => match both_ints(&a, &b) {
            Some((x, y)) => match y.to_u32() {
                Some(exp) => Ok(Num::Int(x.pow(exp))),
                None => {
                    if y.is_negative() {
                        Ok(Num::Float(a.as_float().powf(b.as_float())))
                    } else {
                        Err(err::resource_error("memory", context))
                    }
                }
            },
            None => Ok(Num::Float(a.as_float().powf(b.as_float()))),
        },

        ">>" => match both_ints(&a, &b) {
            Some((x, y)) => match y.to_u64() {
                Some(shift) => Ok(Num::Int(x >> shift)),
                None => Err(err::evaluation_error("undefined", context)),
            },
            None => Err(int_expected(&a, &b, context)),
        },
        "<<" => match both_ints(&a, &b) {
            Some((x, y)) => match y.to_u64() {
                Some(shift) => Ok(Num::Int(x << shift)),
                None => Err(err::evaluation_error("undefined", context)),
            },
            None => Err(int_expected(&a, &b, context)),
        },

        "/\\" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x & y)),
            None => Err(int_expected(&a, &b, context)),
        },
        "\\/" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x | y)),
            None => Err(int_expected(&a, &b, context)),
        },
        "xor" => match both_ints(&a, &b) {
            Some((x, y)) => Ok(Num::Int(x ^ y)),
            None => Err(int_expected(&a, &b, context)),
        },

        "atan" | "atan2" => Ok(Num::Float(a.as_float().atan2(b.as_float()))),

        _ => return None,
    };
    Some(result)
}

fn int_expected(a: &Num, b: &Num, context: &str) -> Interrupt {
    let culprit = match a {
        Num::Float(_) => a.clone(),
        _ => b.clone(),
    };
    err::type_error("integer", culprit.into_term(), context)
}

fn float_to_int(value: f64) -> BigInt {
    BigInt::from(value as i64)
}

fn floor_div(x: BigInt, y: BigInt) -> BigInt {
    let quotient = &x / &y;
    let remainder = &x - &quotient * &y;
    if !remainder.is_zero() && (remainder.is_negative() != y.is_negative()) {
        quotient - 1
    } else {
        quotient
    }
}

fn gcd(mut x: BigInt, mut y: BigInt) -> BigInt {
    while !y.is_zero() {
        let rest = &x % &y;
        x = y;
        y = rest;
    }
    x
}

// Predicates
// --------------------------------------------------

fn is_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match eval(&call.args[1], &call.bindings, "is/2") {
        Ok(value) => {
            let mut trial = call.bindings.clone();
            match unify(&call.args[0], &value.into_term(), &mut trial, false) {
                true => answer_once(trial),
                false => answer_none(),
            }
        }
        Err(interrupt) => answer_err(interrupt),
    }
}

fn compare_answer<'a>(
    call: BuiltinCall,
    context: &str,
    holds: fn(std::cmp::Ordering) -> bool,
) -> Solutions<'a> {
    let left = match eval(&call.args[0], &call.bindings, context) {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };
    let right = match eval(&call.args[1], &call.bindings, context) {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };

    match holds(compare_nums(&left, &right)) {
        true => answer_once(call.bindings),
        false => answer_none(),
    }
}

fn num_eq<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, "=:=/2", |order| order == std::cmp::Ordering::Equal)
}

fn num_ne<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, "=\\=/2", |order| order != std::cmp::Ordering::Equal)
}

fn num_lt<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, "</2", |order| order == std::cmp::Ordering::Less)
}

fn num_gt<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, ">/2", |order| order == std::cmp::Ordering::Greater)
}

fn num_le<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, "=</2", |order| order != std::cmp::Ordering::Greater)
}

fn num_ge<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    compare_answer(call, ">=/2", |order| order != std::cmp::Ordering::Less)
}

fn succ_2<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match (call.args[0].as_ref(), call.args[1].as_ref()) {
        (Term::Int(x), _) => {
            if x.is_negative() {
                return answer_err(err::type_error(
                    "not_less_than_zero",
                    call.args[0].clone(),
                    "succ/2",
                ));
            }
            let next = std::rc::Rc::new(Term::Int(x + 1));
            crate::builtins::unify_answer(&call.args[1], &next, &call.bindings)
        }
        (Term::Var(_), Term::Int(y)) => {
            if y.is_positive() {
                let previous = std::rc::Rc::new(Term::Int(y - 1));
                crate::builtins::unify_answer(&call.args[0], &previous, &call.bindings)
            } else {
                answer_none()
            }
        }
        (Term::Var(_), Term::Var(_)) => answer_err(err::instantiation_error("succ/2")),
        _ => answer_err(err::type_error(
            "integer",
            call.args[0].clone(),
            "succ/2",
        )),
    }
}

fn plus_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let ints: Vec<Option<BigInt>> = call
        .args
        .iter()
        .map(|arg| match arg.as_ref() {
            Term::Int(value) => Some(value.clone()),
            _ => None,
        })
        .collect();

    match (&ints[0], &ints[1], &ints[2]) {
        (Some(a), Some(b), _) => {
            let sum = std::rc::Rc::new(Term::Int(a + b));
            crate::builtins::unify_answer(&call.args[2], &sum, &call.bindings)
        }
        (Some(a), None, Some(c)) => {
            let b = std::rc::Rc::new(Term::Int(c - a));
            crate::builtins::unify_answer(&call.args[1], &b, &call.bindings)
        }
        (None, Some(b), Some(c)) => {
            let a = std::rc::Rc::new(Term::Int(c - b));
            crate::builtins::unify_answer(&call.args[0], &a, &call.bindings)
        }
        _ => answer_err(err::instantiation_error("plus/3")),
    }
}

fn between_3<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let low = match crate::builtins::int_arg(&call.args[0], "between/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };
    let high = match crate::builtins::int_arg(&call.args[1], "between/3") {
        Ok(value) => value,
        Err(interrupt) => return answer_err(interrupt),
    };

    match call.args[2].as_ref() {
        Term::Int(x) => {
            let inside = low <= *x && *x <= high;
            match inside {
                true => answer_once(call.bindings),
                false => answer_none(),
            }
        }

        Term::Var(_) => {
            let target = call.args[2].clone();
            let bindings = call.bindings;
            let mut current = low;

            Box::new(std::iter::from_fn(move || {
                while current <= high {
                    let candidate = std::rc::Rc::new(Term::Int(current.clone()));
                    current += 1;
                    let mut trial = bindings.clone();
                    if unify(&target, &candidate, &mut trial, false) {
                        return Some(Ok(trial));
                    }
                }
                None
            }))
        }

        _ => answer_err(err::type_error(
            "integer",
            call.args[2].clone(),
            "between/3",
        )),
    }
}
