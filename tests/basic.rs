use otter_pl::{config::Config, context::Context, reports::Value};

fn fresh() -> Context {
    Context::from_config(Config::default())
}

mod basic {
    use super::*;

    #[test]
    fn facts_answer() {
        let mut ctx = fresh();
        ctx.consult_str("likes(alice, prolog). likes(bob, rust).").unwrap();

        assert!(ctx.has_solution("likes(alice, prolog).").unwrap());
        assert!(!ctx.has_solution("likes(alice, rust).").unwrap());
    }

    #[test]
    fn rules_chain() {
        let mut ctx = fresh();
        ctx.consult_str(
            "parent(tom, bob). parent(bob, ann).
             grandparent(X, Z) :- parent(X, Y), parent(Y, Z).",
        )
        .unwrap();

        let solution = ctx.query_once("grandparent(tom, Who).").unwrap().unwrap();
        assert_eq!(solution.get("Who"), Some(&Value::Atom("ann".to_string())));
    }

    #[test]
    fn solutions_arrive_in_clause_order() {
        let mut ctx = fresh();
        ctx.consult_str("colour(red). colour(green). colour(blue).").unwrap();

        let all: Vec<_> = ctx
            .query("colour(C).")
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        let names: Vec<_> = all
            .iter()
            .map(|solution| solution.get("C").unwrap().clone())
            .collect();
        assert_eq!(
            names,
            vec![
                Value::Atom("red".to_string()),
                Value::Atom("green".to_string()),
                Value::Atom("blue".to_string()),
            ]
        );
    }

    #[test]
    fn backtracking_through_bodies() {
        let mut ctx = fresh();
        ctx.consult_str(
            "edge(a, b). edge(a, c). edge(b, d).
             path(X, Y) :- edge(X, Y).
             path(X, Z) :- edge(X, Y), path(Y, Z).",
        )
        .unwrap();

        let all = ctx.query_n("path(a, Where).", 10).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn anonymous_and_underscored_variables_stay_hidden() {
        let mut ctx = fresh();
        ctx.consult_str("pair(1, 2).").unwrap();

        let solution = ctx.query_once("pair(X, _Y).").unwrap().unwrap();
        assert!(solution.contains_key("X"));
        assert!(!solution.contains_key("_Y"));
    }

    #[test]
    fn programmatic_clauses() {
        use otter_pl::structures::Term;

        let mut ctx = fresh();
        let head = Term::compound("fact", vec![Term::int(7)]);
        ctx.add_clause(head, Term::truth()).unwrap();

        assert!(ctx.has_solution("fact(7).").unwrap());
    }

    #[test]
    fn unknown_predicates_raise_existence_errors() {
        let mut ctx = fresh();
        let outcome = ctx.has_solution("nothing_here(1).");

        match outcome {
            Err(otter_pl::types::err::ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("existence_error"));
            }
            other => panic!("expected an existence error, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_predicates_without_clauses_fail_quietly() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(maybe/1).").unwrap();

        assert!(!ctx.has_solution("maybe(1).").unwrap());
    }

    #[test]
    fn integers_may_exceed_machine_width() {
        let mut ctx = fresh();
        let solution = ctx.query_once("X is 2 ^ 100.").unwrap().unwrap();

        let expected = num_bigint::BigInt::parse_bytes(b"1267650600228229401496703205376", 10)
            .expect("parses");
        assert_eq!(solution.get("X"), Some(&Value::Int(expected)));
    }

    #[test]
    fn double_quoted_strings_read_as_code_lists() {
        let mut ctx = fresh();
        let solution = ctx.query_once("X = \"ab\".").unwrap().unwrap();

        assert_eq!(
            solution.get("X"),
            Some(&Value::List(vec![
                Value::Int(97.into()),
                Value::Int(98.into())
            ]))
        );
    }

    #[test]
    fn structural_values_render_compounds() {
        let mut ctx = fresh();
        let solution = ctx.query_once("X = point(1, [a]).").unwrap().unwrap();

        assert_eq!(
            solution.get("X"),
            Some(&Value::Compound(
                "point".to_string(),
                vec![
                    Value::Int(1.into()),
                    Value::List(vec![Value::Atom("a".to_string())])
                ]
            ))
        );
    }
}

mod unification {
    use super::*;

    #[test]
    fn integer_and_float_do_not_unify() {
        let mut ctx = fresh();
        assert!(!ctx.has_solution("1 = 1.0.").unwrap());
        assert!(ctx.has_solution("1.0 = 1.0.").unwrap());
    }

    #[test]
    fn nil_atom_and_empty_list_unify() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("[] = [].").unwrap());
        assert!(ctx.has_solution("atom([]).").unwrap());
    }

    #[test]
    fn occurs_check_only_on_request() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("X = f(X).").unwrap());
        assert!(!ctx.has_solution("unify_with_occurs_check(X, f(X)).").unwrap());
    }

    #[test]
    fn not_unifiable() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("a \\= b.").unwrap());
        assert!(!ctx.has_solution("X \\= b.").unwrap());
    }

    #[test]
    fn open_tails_take_the_rest() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("[a, b | T] = [a, b, c, d].")
            .unwrap()
            .unwrap();

        assert_eq!(
            solution.get("T"),
            Some(&Value::List(vec![
                Value::Atom("c".to_string()),
                Value::Atom("d".to_string())
            ]))
        );
    }
}
