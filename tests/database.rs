use otter_pl::{config::Config, context::Context, reports::Value, types::err::ErrorKind};

fn fresh() -> Context {
    Context::from_config(Config::default())
}

fn expect_ball(outcome: Result<bool, ErrorKind>, needle: &str) {
    match outcome {
        Err(ErrorKind::Uncaught(ball)) => {
            let text = format!("{ball}");
            assert!(text.contains(needle), "expected {needle} in {text}");
        }
        other => panic!("expected an uncaught {needle}, got {other:?}"),
    }
}

mod assertion {
    use super::*;

    #[test]
    fn asserted_clauses_are_immediately_visible() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("assertz(fact(1)).").unwrap());
        assert!(ctx.has_solution("fact(1).").unwrap());
    }

    #[test]
    fn asserta_prepends_and_assertz_appends() {
        let mut ctx = fresh();
        ctx.consult_str(
            ":- dynamic(item/1).
             :- assertz(item(middle)).
             :- assertz(item(last)).
             :- asserta(item(first)).",
        )
        .unwrap();

        let all = ctx.query_n("item(X).", 10).unwrap();
        let values: Vec<_> = all.iter().map(|s| s.get("X").unwrap().clone()).collect();
        assert_eq!(
            values,
            vec![
                Value::Atom("first".to_string()),
                Value::Atom("middle".to_string()),
                Value::Atom("last".to_string()),
            ]
        );
    }

    #[test]
    fn rules_may_be_asserted() {
        let mut ctx = fresh();
        assert!(ctx
            .has_solution("assertz((double(X, Y) :- Y is X * 2)).")
            .unwrap());

        let solution = ctx.query_once("double(4, Y).").unwrap().unwrap();
        assert_eq!(solution.get("Y"), Some(&Value::Int(8.into())));
    }

    #[test]
    fn consulted_predicates_are_static() {
        let mut ctx = fresh();
        ctx.consult_str("settled(1).").unwrap();

        expect_ball(ctx.has_solution("assertz(settled(2))."), "permission_error");
        expect_ball(ctx.has_solution("retract(settled(1))."), "permission_error");
    }

    #[test]
    fn builtins_may_not_be_redefined() {
        let mut ctx = fresh();
        expect_ball(ctx.has_solution("assertz(append(x, y, z))."), "permission_error");
        expect_ball(ctx.has_solution("dynamic(append/3)."), "permission_error");
    }

    #[test]
    fn asserted_bindings_are_snapshotted() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("X = stored, assertz(kept(X)).").unwrap());
        assert!(ctx.has_solution("kept(stored).").unwrap());
    }
}

mod retraction {
    use super::*;

    #[test]
    fn retract_removes_the_first_match() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(count/1). :- assertz(count(1)). :- assertz(count(2)).")
            .unwrap();

        let solution = ctx.query_once("retract(count(X)).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(1.into())));

        let remaining = ctx.query_n("count(X).", 10).unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn retract_drains_under_repetition() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(item/1). :- assertz(item(a)). :- assertz(item(b)).")
            .unwrap();

        assert!(ctx.has_solution("retract(item(_)), retract(item(_)).").unwrap());
        assert!(!ctx.has_solution("item(_).").unwrap());
    }

    #[test]
    fn retracting_an_absent_clause_fails() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(gone/1).").unwrap();
        assert!(!ctx.has_solution("retract(gone(1)).").unwrap());
    }

    #[test]
    fn abolish_clears_a_dynamic_predicate() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(temp/1). :- assertz(temp(1)).").unwrap();

        assert!(ctx.has_solution("abolish(temp/1).").unwrap());
        assert!(!ctx.has_solution("temp(_).").unwrap());
    }
}

mod properties {
    use super::*;

    #[test]
    fn builtins_report_built_in_and_static() {
        let mut ctx = fresh();

        let all = ctx.query_n("predicate_property(append(_, _, _), P).", 10).unwrap();
        let properties: Vec<_> = all.iter().map(|s| s.get("P").unwrap().clone()).collect();
        assert!(properties.contains(&Value::Atom("built_in".to_string())));
        assert!(properties.contains(&Value::Atom("static".to_string())));
    }

    #[test]
    fn dynamic_predicates_report_dynamic_not_static() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(foo/1). :- assertz(foo(a)).").unwrap();

        assert!(ctx
            .has_solution("predicate_property(foo(_), dynamic).")
            .unwrap());
        assert!(!ctx
            .has_solution("predicate_property(foo(_), static).")
            .unwrap());
    }

    #[test]
    fn consulted_predicates_report_static() {
        let mut ctx = fresh();
        ctx.consult_str("my_static(42).").unwrap();

        assert!(ctx
            .has_solution("predicate_property(my_static(_), static).")
            .unwrap());
        assert!(!ctx
            .has_solution("predicate_property(my_static(_), dynamic).")
            .unwrap());
        assert!(!ctx
            .has_solution("predicate_property(my_static(_), built_in).")
            .unwrap());
    }

    #[test]
    fn declarations_surface_as_properties() {
        let mut ctx = fresh();
        ctx.consult_str(
            ":- dynamic(multi/1). :- multifile(multi/1). :- discontiguous(multi/1).
             :- assertz(multi(1)).",
        )
        .unwrap();

        let all = ctx.query_n("predicate_property(multi(_), P).", 10).unwrap();
        let properties: Vec<_> = all.iter().map(|s| s.get("P").unwrap().clone()).collect();
        for expected in ["dynamic", "multifile", "discontiguous"] {
            assert!(properties.contains(&Value::Atom(expected.to_string())));
        }
        assert!(!properties.contains(&Value::Atom("static".to_string())));
    }

    #[test]
    fn current_predicate_covers_user_and_builtin() {
        let mut ctx = fresh();
        ctx.consult_str("known(1).").unwrap();

        assert!(ctx.has_solution("current_predicate(known/1).").unwrap());
        assert!(ctx.has_solution("current_predicate(member/2).").unwrap());
        assert!(!ctx.has_solution("current_predicate(unknown_thing/3).").unwrap());
    }

    #[test]
    fn current_predicate_enumerates() {
        let mut ctx = fresh();
        ctx.consult_str("solo_marker(1).").unwrap();

        let solution = ctx
            .query_once("current_predicate(solo_marker/N).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(1.into())));
    }

    #[test]
    fn clause_reads_the_database() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(rule/1). :- assertz((rule(X) :- member(X, [1]))).").unwrap();

        assert!(ctx.has_solution("clause(rule(_), member(_, [1])).").unwrap());

        expect_ball(
            ctx.has_solution("clause(append(_, _, _), _)."),
            "permission_error",
        );
    }
}
