/*!
Atom and number text processing built-ins.

Atoms are processed as sequences of characters (not bytes), so multi-byte text behaves.
`atom_concat/3` and `sub_atom/5` are nondeterministic where the mode allows, enumerating decompositions left to right.
*/

use num_traits::ToPrimitive;

use crate::builtins::{atom_arg, proper_list_arg, unify_answer, BuiltinCall, Registry};
use crate::context::Context;
use crate::procedures::solve::{answer_err, answer_none, answer_once};
use crate::procedures::Solutions;
use crate::reader::lexer::parse_number;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::unify;

/// Register atom processing predicates into the registry.
pub fn register(registry: &mut Registry) {
    registry.register("atom_length", 2, "atoms", atom_length);
    registry.register("atom_chars", 2, "atoms", atom_chars);
    registry.register("atom_codes", 2, "atoms", atom_codes);
    registry.register("atom_concat", 3, "atoms", atom_concat);
    registry.register("char_code", 2, "atoms", char_code);
    registry.register("sub_atom", 5, "atoms", sub_atom);
    registry.register("atom_number", 2, "atoms", atom_number);
    registry.register("number_chars", 2, "atoms", number_chars);
    registry.register("number_codes", 2, "atoms", number_codes);
    registry.register("upcase_atom", 2, "atoms", upcase_atom);
    registry.register("downcase_atom", 2, "atoms", downcase_atom);
}

/// The atomic text of an argument: atoms read as their name, numbers as their canonical text.
fn text_of(arg: &RTerm, context: &str) -> Result<String, Interrupt> {
    match arg.as_ref() {
        Term::Var(_) => Err(err::instantiation_error(context)),
        Term::Atom(name) => Ok(name.to_string()),
        Term::Int(value) => Ok(value.to_string()),
        Term::Float(value) => Ok(format!("{value:?}")),
        Term::List(_) if arg.is_nil() => Ok("[]".to_string()),
        _ => Err(err::type_error("atom", arg.clone(), context)),
    }
}

fn atom_length<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let text = match atom_arg(&call.args[0], "atom_length/2") {
        Ok(text) => text,
        Err(interrupt) => return answer_err(interrupt),
    };
    let length = Term::int(text.chars().count() as i64);
    unify_answer(&call.args[1], &length, &call.bindings)
}

/// One-char atoms of a string.
fn chars_term(text: &str) -> RTerm {
    Term::list(text.chars().map(|c| Term::atom(c.to_string())).collect())
}

/// Character codes of a string.
fn codes_term(text: &str) -> RTerm {
    Term::list(text.chars().map(|c| Term::int(c as u32 as i64)).collect())
}

/// Collects a proper list of one-char atoms into a string.
fn string_from_chars(
    list: &RTerm,
    call: &BuiltinCall,
    context: &str,
) -> Result<String, Interrupt> {
    let items = proper_list_arg(list, &call.bindings, context)?;
    let mut text = String::default();
    for item in items {
        let item = call.bindings.deref(&item);
        match item.as_ref() {
            Term::Var(_) => return Err(err::instantiation_error(context)),
            Term::Atom(name) if name.chars().count() == 1 => text.push_str(name),
            _ => return Err(err::type_error("character", item.clone(), context)),
        }
    }
    Ok(text)
}

/// Collects a proper list of character codes into a string.
fn string_from_codes(
    list: &RTerm,
    call: &BuiltinCall,
    context: &str,
) -> Result<String, Interrupt> {
    let items = proper_list_arg(list, &call.bindings, context)?;
    let mut text = String::default();
    for item in items {
        let item = call.bindings.deref(&item);
        match item.as_ref() {
            Term::Var(_) => return Err(err::instantiation_error(context)),
            Term::Int(code) => match code.to_u32().and_then(char::from_u32) {
                Some(c) => text.push(c),
                None => {
                    return Err(err::type_error("character_code", item.clone(), context));
                }
            },
            _ => return Err(err::type_error("character_code", item.clone(), context)),
        }
    }
    Ok(text)
}

fn atom_chars<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match call.args[0].as_ref() {
        Term::Var(_) => {
            let text = match string_from_chars(&call.args[1], &call, "atom_chars/2") {
                Ok(text) => text,
                Err(interrupt) => return answer_err(interrupt),
            };
            unify_answer(&call.args[0], &Term::atom(text), &call.bindings)
        }
        _ => match text_of(&call.args[0], "atom_chars/2") {
            Ok(text) => unify_answer(&call.args[1], &chars_term(&text), &call.bindings),
            Err(interrupt) => answer_err(interrupt),
        },
    }
}

fn atom_codes<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match call.args[0].as_ref() {
        Term::Var(_) => {
            let text = match string_from_codes(&call.args[1], &call, "atom_codes/2") {
                Ok(text) => text,
                Err(interrupt) => return answer_err(interrupt),
            };
            unify_answer(&call.args[0], &Term::atom(text), &call.bindings)
        }
        _ => match text_of(&call.args[0], "atom_codes/2") {
            Ok(text) => unify_answer(&call.args[1], &codes_term(&text), &call.bindings),
            Err(interrupt) => answer_err(interrupt),
        },
    }
}

fn atom_concat<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let left_bound = !matches!(call.args[0].as_ref(), Term::Var(_));
    let right_bound = !matches!(call.args[1].as_ref(), Term::Var(_));

    if left_bound && right_bound {
        let left = match text_of(&call.args[0], "atom_concat/3") {
            Ok(text) => text,
            Err(interrupt) => return answer_err(interrupt),
        };
        let right = match text_of(&call.args[1], "atom_concat/3") {
            Ok(text) => text,
            Err(interrupt) => return answer_err(interrupt),
        };
        let whole = Term::atom(format!("{left}{right}"));
        return unify_answer(&call.args[2], &whole, &call.bindings);
    }

    // Decomposition: enumerate splits of the whole atom, in order from the empty prefix.
    let whole = match atom_arg(&call.args[2], "atom_concat/3") {
        Ok(text) => text,
        Err(interrupt) => return answer_err(interrupt),
    };

    let chars: Vec<char> = whole.chars().collect();
    let left_term = call.args[0].clone();
    let right_term = call.args[1].clone();
    let bindings = call.bindings;
    let mut split = 0;

    Box::new(std::iter::from_fn(move || {
        while split <= chars.len() {
            let prefix: String = chars[..split].iter().collect();
            let suffix: String = chars[split..].iter().collect();
            split += 1;

            let mut trial = bindings.clone();
            if unify(&left_term, &Term::atom(prefix), &mut trial, false)
                && unify(&right_term, &Term::atom(suffix), &mut trial, false)
            {
                return Some(Ok(trial));
            }
        }
        None
    }))
}

fn char_code<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match (call.args[0].as_ref(), call.args[1].as_ref()) {
        (Term::Atom(name), _) if name.chars().count() == 1 => {
            let code = name.chars().next().expect("one char") as u32;
            unify_answer(&call.args[1], &Term::int(code as i64), &call.bindings)
        }
        (Term::Var(_), Term::Int(code)) => match code.to_u32().and_then(char::from_u32) {
            Some(c) => unify_answer(&call.args[0], &Term::atom(c.to_string()), &call.bindings),
            None => answer_err(err::representation_error("character_code", "char_code/2")),
        },
        (Term::Var(_), Term::Var(_)) => answer_err(err::instantiation_error("char_code/2")),
        (Term::Atom(_), _) => answer_err(err::type_error(
            "character",
            call.args[0].clone(),
            "char_code/2",
        )),
        _ => answer_err(err::type_error(
            "character",
            call.args[0].clone(),
            "char_code/2",
        )),
    }
}

fn sub_atom<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    let whole = match atom_arg(&call.args[0], "sub_atom/5") {
        Ok(text) => text,
        Err(interrupt) => return answer_err(interrupt),
    };
    let chars: Vec<char> = whole.chars().collect();
    let total = chars.len();

    let before_term = call.args[1].clone();
    let length_term = call.args[2].clone();
    let after_term = call.args[3].clone();
    let sub_term = call.args[4].clone();
    let bindings = call.bindings;

    let mut before = 0;
    let mut length = 0;

    Box::new(std::iter::from_fn(move || {
        while before <= total {
            while before + length <= total {
                let this_before = before;
                let this_length = length;
                length += 1;

                let sub: String = chars[this_before..this_before + this_length].iter().collect();
                let after = total - this_before - this_length;

                let mut trial = bindings.clone();
                if unify(&before_term, &Term::int(this_before as i64), &mut trial, false)
                    && unify(&length_term, &Term::int(this_length as i64), &mut trial, false)
                    && unify(&after_term, &Term::int(after as i64), &mut trial, false)
                    && unify(&sub_term, &Term::atom(sub), &mut trial, false)
                {
                    return Some(Ok(trial));
                }
            }
            before += 1;
            length = 0;
        }
        None
    }))
}

fn atom_number<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match call.args[0].as_ref() {
        Term::Atom(name) => match parse_number(name) {
            // Unreadable text fails quietly: the atom simply names no number.
            Some(number) => unify_answer(&call.args[1], &number, &call.bindings),
            None => answer_none(),
        },
        Term::Var(_) => match call.args[1].as_ref() {
            Term::Int(value) => {
                unify_answer(&call.args[0], &Term::atom(value.to_string()), &call.bindings)
            }
            Term::Float(value) => {
                unify_answer(&call.args[0], &Term::atom(format!("{value:?}")), &call.bindings)
            }
            Term::Var(_) => answer_err(err::instantiation_error("atom_number/2")),
            _ => answer_err(err::type_error(
                "number",
                call.args[1].clone(),
                "atom_number/2",
            )),
        },
        _ => answer_err(err::type_error("atom", call.args[0].clone(), "atom_number/2")),
    }
}

fn number_text(arg: &RTerm) -> Option<String> {
    match arg.as_ref() {
        Term::Int(value) => Some(value.to_string()),
        Term::Float(value) => Some(format!("{value:?}")),
        _ => None,
    }
}

fn number_chars<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match number_text(&call.args[0]) {
        Some(text) => unify_answer(&call.args[1], &chars_term(&text), &call.bindings),
        None => {
            if !matches!(call.args[0].as_ref(), Term::Var(_)) {
                return answer_err(err::type_error(
                    "number",
                    call.args[0].clone(),
                    "number_chars/2",
                ));
            }
            let text = match string_from_chars(&call.args[1], &call, "number_chars/2") {
                Ok(text) => text,
                Err(interrupt) => return answer_err(interrupt),
            };
            match parse_number(text.trim()) {
                Some(number) => unify_answer(&call.args[0], &number, &call.bindings),
                None => answer_err(err::syntax_error("illegal_number", "number_chars/2")),
            }
        }
    }
}

fn number_codes<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match number_text(&call.args[0]) {
        Some(text) => unify_answer(&call.args[1], &codes_term(&text), &call.bindings),
        None => {
            if !matches!(call.args[0].as_ref(), Term::Var(_)) {
                return answer_err(err::type_error(
                    "number",
                    call.args[0].clone(),
                    "number_codes/2",
                ));
            }
            let text = match string_from_codes(&call.args[1], &call, "number_codes/2") {
                Ok(text) => text,
                Err(interrupt) => return answer_err(interrupt),
            };
            match parse_number(text.trim()) {
                Some(number) => unify_answer(&call.args[0], &number, &call.bindings),
                None => answer_err(err::syntax_error("illegal_number", "number_codes/2")),
            }
        }
    }
}

fn upcase_atom<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match text_of(&call.args[0], "upcase_atom/2") {
        Ok(text) => unify_answer(
            &call.args[1],
            &Term::atom(text.to_uppercase()),
            &call.bindings,
        ),
        Err(interrupt) => answer_err(interrupt),
    }
}

fn downcase_atom<'a>(_: &'a Context, call: BuiltinCall) -> Solutions<'a> {
    match text_of(&call.args[0], "downcase_atom/2") {
        Ok(text) => unify_answer(
            &call.args[1],
            &Term::atom(text.to_lowercase()),
            &call.bindings,
        ),
        Err(interrupt) => answer_err(interrupt),
    }
}
