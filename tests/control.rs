use otter_pl::{config::Config, context::Context, reports::Value, types::err::ErrorKind};

fn fresh() -> Context {
    Context::from_config(Config::default())
}

fn atom(name: &str) -> Value {
    Value::Atom(name.to_string())
}

mod cut {
    use super::*;

    #[test]
    fn commits_to_the_first_clause() {
        let mut ctx = fresh();
        ctx.consult_str(
            "pick(X) :- member(X, [1, 2, 3]), !.
             pick(none).",
        )
        .unwrap();

        let all = ctx.query_n("pick(X).", 10).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("X"), Some(&Value::Int(1.into())));
    }

    #[test]
    fn seals_choice_points_to_its_left() {
        let mut ctx = fresh();
        ctx.consult_str("q. p(X) :- (X = 1 ; X = 2), !, q.").unwrap();

        let all = ctx.query_n("p(X).", 10).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("X"), Some(&Value::Int(1.into())));
    }

    #[test]
    fn leaves_earlier_frames_untouched() {
        let mut ctx = fresh();
        ctx.consult_str(
            "inner(Y) :- (Y = a ; Y = b), !.
             outer(X, Y) :- member(X, [1, 2]), inner(Y).",
        )
        .unwrap();

        // The cut is local to inner/1: backtracking into member/2 continues.
        let all = ctx.query_n("outer(X, Y).", 10).unwrap();
        let pairs: Vec<_> = all
            .iter()
            .map(|s| (s.get("X").unwrap().clone(), s.get("Y").unwrap().clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Value::Int(1.into()), atom("a")),
                (Value::Int(2.into()), atom("a")),
            ]
        );
    }

    #[test]
    fn is_local_to_call() {
        let mut ctx = fresh();
        ctx.consult_str("t(X) :- member(X, [1, 2]), call((! ; true)).").unwrap();

        // The cut inside call/1 cannot prune member/2.
        let all = ctx.query_n("t(X).", 10).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn does_not_truncate_solutions_to_its_right() {
        let mut ctx = fresh();
        ctx.consult_str("r(X) :- !, member(X, [1, 2, 3]).").unwrap();

        let all = ctx.query_n("r(X).", 10).unwrap();
        assert_eq!(all.len(), 3);
    }
}

mod conditionals {
    use super::*;

    #[test]
    fn if_then_else_takes_the_then_branch() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("(1 < 2 -> X = yes ; X = no).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("X"), Some(&atom("yes")));
    }

    #[test]
    fn if_then_else_takes_the_else_branch() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("(2 < 1 -> X = yes ; X = no).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("X"), Some(&atom("no")));
    }

    #[test]
    fn the_condition_commits_to_its_first_solution() {
        let mut ctx = fresh();
        let all = ctx
            .query_n("(member(X, [1, 2]) -> Y = X ; Y = none).", 10)
            .unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("Y"), Some(&Value::Int(1.into())));
    }

    #[test]
    fn bare_if_then_has_no_else() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("(1 < 2 -> true).").unwrap());
        assert!(!ctx.has_solution("(2 < 1 -> true).").unwrap());
    }

    #[test]
    fn disjunction_tries_left_then_right() {
        let mut ctx = fresh();
        let all = ctx.query_n("(X = left ; X = right).", 10).unwrap();
        let values: Vec<_> = all.iter().map(|s| s.get("X").unwrap().clone()).collect();
        assert_eq!(values, vec![atom("left"), atom("right")]);
    }
}

mod negation {
    use super::*;

    #[test]
    fn succeeds_when_the_goal_fails() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("\\+ fail.").unwrap());
        assert!(!ctx.has_solution("\\+ true.").unwrap());
    }

    #[test]
    fn discards_inner_bindings() {
        let mut ctx = fresh();
        let solution = ctx.query_once("\\+ (X = 1, fail), X = 2.").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(2.into())));
    }
}

mod call_and_once {
    use super::*;

    #[test]
    fn call_builds_goals_from_closures() {
        let mut ctx = fresh();
        ctx.consult_str("add(X, Y, Z) :- Z is X + Y.").unwrap();

        let solution = ctx.query_once("call(add(1), 2, Z).").unwrap().unwrap();
        assert_eq!(solution.get("Z"), Some(&Value::Int(3.into())));

        let solution = ctx.query_once("call(add, 1, 2, Z).").unwrap().unwrap();
        assert_eq!(solution.get("Z"), Some(&Value::Int(3.into())));
    }

    #[test]
    fn call_requires_a_callable() {
        let mut ctx = fresh();
        match ctx.has_solution("call(1).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("type_error"));
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn once_stops_after_the_first_solution() {
        let mut ctx = fresh();
        let all = ctx.query_n("once(member(X, [a, b, c])).", 10).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("X"), Some(&atom("a")));
    }

    #[test]
    fn ignore_always_succeeds_once() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("ignore(fail).").unwrap());
        assert!(ctx.has_solution("ignore(true).").unwrap());
    }
}

mod exceptions {
    use super::*;

    #[test]
    fn catch_consumes_a_matching_ball() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("catch(throw(foo), foo, true).").unwrap());
    }

    #[test]
    fn the_handler_sees_catcher_bindings() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("catch(throw(oops(42)), oops(X), true).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(42.into())));
    }

    #[test]
    fn a_mismatched_catcher_propagates() {
        let mut ctx = fresh();

        // caught(foo) does not unify with foo, so the handler never runs.
        assert!(!ctx.has_solution("catch(throw(foo), E, E = caught(foo)).").unwrap());

        match ctx.has_solution("catch(throw(foo), bar, true).") {
            Err(ErrorKind::Uncaught(ball)) => assert_eq!(format!("{ball}"), "foo"),
            other => panic!("expected the ball to escape, got {other:?}"),
        }
    }

    #[test]
    fn errors_from_builtins_are_catchable() {
        let mut ctx = fresh();
        assert!(ctx
            .has_solution("catch(atom_length(X, _), error(instantiation_error, _), true).")
            .unwrap());
    }

    #[test]
    fn throws_cross_predicate_frames() {
        let mut ctx = fresh();
        ctx.consult_str("deep :- deeper. deeper :- throw(from_below).").unwrap();

        assert!(ctx
            .has_solution("catch(deep, from_below, true).")
            .unwrap());
    }
}

mod cleanup {
    use super::*;

    #[test]
    fn runs_after_exhaustion() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        let all = ctx
            .query_n(
                "setup_call_cleanup(assertz(trace(setup)), member(X, [1, 2]), assertz(trace(cleanup))).",
                10,
            )
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(ctx.has_solution("trace(setup).").unwrap());
        assert!(ctx.has_solution("trace(cleanup).").unwrap());
    }

    #[test]
    fn runs_when_the_goal_fails() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        assert!(!ctx
            .has_solution("setup_call_cleanup(true, fail, assertz(trace(cleanup))).")
            .unwrap());
        assert!(ctx.has_solution("trace(cleanup).").unwrap());
    }

    #[test]
    fn runs_when_the_caller_stops_early() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        // query_once drops the solution sequence after one answer.
        let first = ctx
            .query_once(
                "setup_call_cleanup(true, member(X, [1, 2, 3]), assertz(trace(cleanup))).",
            )
            .unwrap();
        assert!(first.is_some());
        assert!(ctx.has_solution("trace(cleanup).").unwrap());
    }

    #[test]
    fn runs_when_an_exception_escapes() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        let outcome = ctx.has_solution(
            "setup_call_cleanup(true, (member(X, [1, 2]), X = 2, throw(bang)), assertz(trace(cleanup))).",
        );
        assert!(matches!(outcome, Err(ErrorKind::Uncaught(_))));
        assert!(ctx.has_solution("trace(cleanup).").unwrap());
    }

    #[test]
    fn runs_exactly_once() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        let all = ctx
            .query_n(
                "setup_call_cleanup(true, member(X, [1, 2]), assertz(trace(ran))).",
                10,
            )
            .unwrap();
        assert_eq!(all.len(), 2);

        let count = ctx.query_n("trace(ran).", 10).unwrap();
        assert_eq!(count.len(), 1);
    }

    #[test]
    fn call_cleanup_without_setup() {
        let mut ctx = fresh();
        ctx.consult_str(":- dynamic(trace/1).").unwrap();

        assert!(!ctx
            .has_solution("call_cleanup(fail, assertz(trace(cleanup))).")
            .unwrap());
        assert!(ctx.has_solution("trace(cleanup).").unwrap());
    }
}

mod halting {
    use super::*;

    #[test]
    fn halt_surfaces_the_exit_code() {
        let mut ctx = fresh();
        assert!(matches!(ctx.has_solution("halt."), Err(ErrorKind::Halted(0))));
        assert!(matches!(ctx.has_solution("halt(3)."), Err(ErrorKind::Halted(3))));
    }

    #[test]
    fn halt_passes_catch_untouched() {
        let mut ctx = fresh();
        assert!(matches!(
            ctx.has_solution("catch(halt(2), _, true)."),
            Err(ErrorKind::Halted(2))
        ));
    }
}
