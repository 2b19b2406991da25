/*!
DCG rule translation.

`Head --> Body` becomes an ordinary clause over two extra arguments threading the input list:
the head gains `(S0, S)`, and each body item consumes a segment of the difference.

| body item | translation |
|-----------|-------------|
| non-terminal `nt(...)` | `nt(..., S0, S1)` |
| terminal list `[a, b]` | `S0 = [a, b \| S1]` |
| `{Goal}` | `Goal, S0 = S1` |
| `!` | `!, S0 = S1` |
| `(A, B)` / `(A ; B)` / `(A -> B)` / `\+ A` | threaded recursively |
| a variable | `call(V, S0, S1)` |

The empty terminal list `[]` is `S0 = S1`: it consumes nothing.
*/

use crate::context::Context;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::Bindings;

/// Translates `Head --> Body` into a plain (head, body) clause pair.
pub fn translate_rule(
    ctx: &Context,
    head: &RTerm,
    body: &RTerm,
) -> Result<(RTerm, RTerm), Interrupt> {
    let s0 = ctx.fresh_var("S0");
    let s = ctx.fresh_var("S");

    let translated_head = match head.as_ref() {
        Term::Atom(name) => Term::compound(name.as_ref(), vec![s0.clone(), s.clone()]),
        Term::Compound(compound) => {
            let mut args = compound.args.clone();
            args.push(s0.clone());
            args.push(s.clone());
            Term::compound(compound.functor.as_ref(), args)
        }
        _ => return Err(err::type_error("callable", head.clone(), "-->/2")),
    };

    let translated_body = translate_body(ctx, body, s0, s)?;
    Ok((translated_head, translated_body))
}

/// Translates one body item consuming the difference between `from` and `to`.
fn translate_body(
    ctx: &Context,
    item: &RTerm,
    from: RTerm,
    to: RTerm,
) -> Result<RTerm, Interrupt> {
    match item.as_ref() {
        Term::Var(_) => Ok(Term::compound("call", vec![item.clone(), from, to])),

        Term::Atom(name) => match name.as_ref() {
            "[]" => Ok(Term::compound("=", vec![from, to])),
            "!" => Ok(Term::compound(
                ",",
                vec![Term::atom("!"), Term::compound("=", vec![from, to])],
            )),
            _ => Ok(Term::compound(name.as_ref(), vec![from, to])),
        },

        Term::List(_) => {
            if item.is_nil() {
                return Ok(Term::compound("=", vec![from, to]));
            }
            // A terminal list consumes exactly its elements.
            let bindings = Bindings::default();
            let view = bindings.list_view(item);
            match view.proper() {
                Some(elems) => Ok(Term::compound(
                    "=",
                    vec![from, Term::list_with_tail(elems, to)],
                )),
                None => Err(err::type_error("list", item.clone(), "-->/2")),
            }
        }

        Term::Compound(compound) => match (compound.functor.as_ref(), compound.args.len()) {
            (",", 2) => {
                let mid = ctx.fresh_var("S");
                let first = translate_body(ctx, &compound.args[0], from, mid.clone())?;
                let second = translate_body(ctx, &compound.args[1], mid, to)?;
                Ok(Term::compound(",", vec![first, second]))
            }

            (";", 2) => {
                let first = translate_body(ctx, &compound.args[0], from.clone(), to.clone())?;
                let second = translate_body(ctx, &compound.args[1], from, to)?;
                Ok(Term::compound(";", vec![first, second]))
            }

            ("->", 2) => {
                let mid = ctx.fresh_var("S");
                let first = translate_body(ctx, &compound.args[0], from, mid.clone())?;
                let second = translate_body(ctx, &compound.args[1], mid, to)?;
                Ok(Term::compound("->", vec![first, second]))
            }

            ("\\+", 1) => {
                let scratch = ctx.fresh_var("S");
                let inner = translate_body(ctx, &compound.args[0], from.clone(), scratch)?;
                Ok(Term::compound(
                    ",",
                    vec![
                        Term::compound("\\+", vec![inner]),
                        Term::compound("=", vec![from, to]),
                    ],
                ))
            }

            ("{}", 1) => Ok(Term::compound(
                ",",
                vec![
                    compound.args[0].clone(),
                    Term::compound("=", vec![from, to]),
                ],
            )),

            _ => {
                let mut args = compound.args.clone();
                args.push(from);
                args.push(to);
                Ok(Term::compound(compound.functor.as_ref(), args))
            }
        },

        Term::Int(_) | Term::Float(_) => {
            Err(err::type_error("callable", item.clone(), "-->/2"))
        }
    }
}
