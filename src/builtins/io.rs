/*!
Output built-ins.

Terms write to standard output: `write/1` and `print/1` unquoted with operators, `write_canonical/1` quoted in functional notation.
File and stream handling sit outside the interpreter's boundary, so there is no stream argument to any of these.
*/

use crate::builtins::{BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_once};
use crate::procedures::Solutions;
use crate::structures::term::write_atom_string;
use crate::structures::{RTerm, Term, Unquoted};

/// Register output predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("write", 1, "io", write_1);
    registry.register("print", 1, "io", write_1);
    registry.register("writeln", 1, "io", writeln_1);
    registry.register("write_canonical", 1, "io", write_canonical_1);
    registry.register("nl", 0, "io", nl_0);
    registry.register("tab", 1, "io", tab_1);
}

fn write_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let resolved = call.bindings.resolve(&call.args[0]);
    print!("{}", Unquoted(&resolved));
    answer_once(call.bindings)
}

fn writeln_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let resolved = call.bindings.resolve(&call.args[0]);
    println!("{}", Unquoted(&resolved));
    answer_once(call.bindings)
}

fn write_canonical_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let resolved = call.bindings.resolve(&call.args[0]);
    print!("{}", canonical(&resolved));
    answer_once(call.bindings)
}

fn nl_0<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    println!();
    answer_once(call.bindings)
}

fn tab_1<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    use num_traits::ToPrimitive;

    let count = match crate::builtins::arithmetic::eval(&call.args[0], &call.bindings, "tab/1") {
        Ok(crate::builtins::arithmetic::Num::Int(value)) => value.to_usize().unwrap_or(0),
        Ok(other) => {
            return answer_err(crate::types::err::type_error(
                "integer",
                other.into_term(),
                "tab/1",
            ))
        }
        Err(interrupt) => return answer_err(interrupt),
    };
    print!("{}", " ".repeat(count));
    answer_once(call.bindings)
}

/// Functional notation with quoting: no operators, no list sugar beyond brackets.
fn canonical(term: &RTerm) -> String {
    match term.as_ref() {
        Term::Atom(name) => write_atom_string(name),
        Term::Int(value) => value.to_string(),
        Term::Float(value) => format!("{value:?}"),
        Term::Var(var) => format!("_G{}", var.id),
        Term::Compound(compound) => {
            let args: Vec<String> = compound.args.iter().map(canonical).collect();
            format!("{}({})", write_atom_string(&compound.functor), args.join(","))
        }
        Term::List(list) => {
            let elems: Vec<String> = list.elems.iter().map(canonical).collect();
            match &list.tail {
                Some(tail) if !tail.is_nil() => {
                    format!("[{}|{}]", elems.join(","), canonical(tail))
                }
                _ => format!("[{}]", elems.join(",")),
            }
        }
    }
}
