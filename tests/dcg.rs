use otter_pl::{config::Config, context::Context, reports::Value, types::err::ErrorKind};

fn fresh() -> Context {
    Context::from_config(Config::default())
}

fn atom(name: &str) -> Value {
    Value::Atom(name.to_string())
}

mod phrase {
    use super::*;

    #[test]
    fn rules_consume_terminal_lists() {
        let mut ctx = fresh();
        ctx.consult_str(
            "greeting --> [hello], name.
             name --> [world].
             name --> [prolog].",
        )
        .unwrap();

        assert!(ctx.has_solution("phrase(greeting, [hello, world]).").unwrap());
        assert!(ctx.has_solution("phrase(greeting, [hello, prolog]).").unwrap());
        assert!(!ctx.has_solution("phrase(greeting, [hello]).").unwrap());
        assert!(!ctx.has_solution("phrase(greeting, [hello, world, extra]).").unwrap());
    }

    #[test]
    fn phrase_three_leaves_a_rest() {
        let mut ctx = fresh();
        ctx.consult_str("article --> [the].").unwrap();

        let solution = ctx
            .query_once("phrase(article, [the, cat], Rest).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("Rest"), Some(&Value::List(vec![atom("cat")])));
    }

    #[test]
    fn nonterminals_thread_arguments() {
        let mut ctx = fresh();
        ctx.consult_str(
            "digits([D|T]) --> digit(D), digits(T).
             digits([D]) --> digit(D).
             digit(D) --> [D], { member(D, [0, 1]) }.",
        )
        .unwrap();

        let solution = ctx.query_once("phrase(digits(L), [1, 0, 1]).").unwrap().unwrap();
        assert_eq!(
            solution.get("L"),
            Some(&Value::List(vec![
                Value::Int(1.into()),
                Value::Int(0.into()),
                Value::Int(1.into())
            ]))
        );
    }

    #[test]
    fn bodies_may_generate() {
        let mut ctx = fresh();
        ctx.consult_str("ab --> [a]. ab --> [b].").unwrap();

        let all = ctx.query_n("phrase(ab, L).", 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get("L"), Some(&Value::List(vec![atom("a")])));
    }

    #[test]
    fn control_threads_through_bodies() {
        let mut ctx = fresh();
        ctx.consult_str(
            "choice --> ([a] ; [b]), [end].
             guarded --> [X], { X = ok } .",
        )
        .unwrap();

        assert!(ctx.has_solution("phrase(choice, [a, end]).").unwrap());
        assert!(ctx.has_solution("phrase(choice, [b, end]).").unwrap());
        assert!(ctx.has_solution("phrase(guarded, [ok]).").unwrap());
        assert!(!ctx.has_solution("phrase(guarded, [bad]).").unwrap());
    }

    #[test]
    fn the_body_must_be_callable() {
        let mut ctx = fresh();

        match ctx.has_solution("phrase(X, [a]).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("instantiation_error"));
            }
            other => panic!("expected an instantiation error, got {other:?}"),
        }

        match ctx.has_solution("phrase(1, [a]).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("type_error"));
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn the_expanded_goal_must_exist() {
        let mut ctx = fresh();

        match ctx.has_solution("phrase(no_such_rule, [a]).") {
            Err(ErrorKind::Uncaught(ball)) => {
                let text = format!("{ball}");
                assert!(text.contains("existence_error"));
                assert!(text.contains("no_such_rule"));
            }
            other => panic!("expected an existence error, got {other:?}"),
        }
    }

    #[test]
    fn empty_productions_consume_nothing() {
        let mut ctx = fresh();
        ctx.consult_str(
            "maybe_a --> [a].
             maybe_a --> [].",
        )
        .unwrap();

        assert!(ctx.has_solution("phrase(maybe_a, [a]).").unwrap());
        assert!(ctx.has_solution("phrase(maybe_a, []).").unwrap());
    }
}
