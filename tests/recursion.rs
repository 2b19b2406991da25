use otter_pl::{config::Config, context::Context, types::err::ErrorKind};

mod deep_recursion {
    use super::*;

    #[test]
    fn mutual_recursion_reaches_five_hundred() {
        let mut ctx = Context::from_config(Config::default());
        ctx.consult_str(
            "even(0).
             even(N) :- N > 0, N1 is N - 1, odd(N1).
             odd(N) :- N > 0, N1 is N - 1, even(N1).",
        )
        .unwrap();

        assert!(ctx.has_solution("even(500).").unwrap());
        assert!(!ctx.has_solution("even(501).").unwrap());
    }

    #[test]
    fn count_down_terminates() {
        let mut ctx = Context::from_config(Config::default());
        ctx.consult_str(
            "count_down(0).
             count_down(N) :- N > 0, N1 is N - 1, count_down(N1).",
        )
        .unwrap();

        assert!(ctx.has_solution("count_down(300).").unwrap());
    }

    #[test]
    fn accumulators_thread_results() {
        let mut ctx = Context::from_config(Config::default());
        ctx.consult_str(
            "sum_to(0, Acc, Acc).
             sum_to(N, Acc, Sum) :- N > 0, Acc1 is Acc + N, N1 is N - 1, sum_to(N1, Acc1, Sum).",
        )
        .unwrap();

        let solution = ctx.query_once("sum_to(100, 0, Sum).").unwrap().unwrap();
        assert_eq!(
            solution.get("Sum"),
            Some(&otter_pl::reports::Value::Int(5050.into()))
        );
    }
}

mod depth_limit {
    use super::*;

    /// A tight limit keeps the host stack shallow while the error path is exercised.
    fn shallow() -> Context {
        let mut config = Config::default();
        config.depth_limit.value = 128;
        Context::from_config(config)
    }

    #[test]
    fn left_recursion_raises_a_resource_error() {
        let mut ctx = shallow();
        ctx.consult_str("loop :- loop.").unwrap();

        match ctx.has_solution("loop.") {
            Err(ErrorKind::Uncaught(ball)) => {
                let text = format!("{ball}");
                assert!(text.contains("resource_error"), "unexpected ball: {text}");
                assert!(text.contains("recursion_depth_exceeded"), "unexpected ball: {text}");
            }
            other => panic!("expected a resource error, got {other:?}"),
        }
    }

    #[test]
    fn the_limit_is_catchable() {
        let mut ctx = shallow();
        ctx.consult_str("loop :- loop. safe :- catch(loop, error(resource_error(_), _), true).")
            .unwrap();

        assert!(ctx.has_solution("safe.").unwrap());
    }

    #[test]
    fn work_under_the_limit_is_untouched() {
        let mut ctx = shallow();
        ctx.consult_str(
            "count_down(0).
             count_down(N) :- N > 0, N1 is N - 1, count_down(N1).",
        )
        .unwrap();

        assert!(ctx.has_solution("count_down(100).").unwrap());
    }

    #[test]
    fn the_counter_resets_between_queries() {
        let mut ctx = shallow();
        ctx.consult_str(
            "count_down(0).
             count_down(N) :- N > 0, N1 is N - 1, count_down(N1).",
        )
        .unwrap();

        for _ in 0..5 {
            assert!(ctx.has_solution("count_down(100).").unwrap());
        }
    }
}
