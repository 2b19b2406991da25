use otter_pl::{config::Config, context::Context, reports::Value, types::err::ErrorKind};

fn fresh() -> Context {
    Context::from_config(Config::default())
}

fn atom(name: &str) -> Value {
    Value::Atom(name.to_string())
}

fn ints(values: &[i64]) -> Value {
    Value::List(values.iter().map(|v| Value::Int((*v).into())).collect())
}

mod lists {
    use super::*;

    #[test]
    fn append_joins() {
        let mut ctx = fresh();
        let solution = ctx.query_once("append([1,2], [3,4], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&ints(&[1, 2, 3, 4])));
    }

    #[test]
    fn append_splits_in_order() {
        let mut ctx = fresh();
        let all = ctx.query_n("append(X, Y, [a, b]).", 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].get("X"), Some(&Value::List(vec![])));
        assert_eq!(all[2].get("Y"), Some(&Value::List(vec![])));
    }

    #[test]
    fn member_enumerates_with_duplicates() {
        let mut ctx = fresh();
        let all = ctx.query_n("member(X, [a, b, a]).", 10).unwrap();
        let values: Vec<_> = all.iter().map(|s| s.get("X").unwrap().clone()).collect();
        assert_eq!(values, vec![atom("a"), atom("b"), atom("a")]);
    }

    #[test]
    fn memberchk_stops_at_the_first() {
        let mut ctx = fresh();
        let all = ctx.query_n("memberchk(X, [a, b]).", 10).unwrap();
        assert_eq!(all.len(), 1);
        assert!(ctx.has_solution("memberchk(b, [a, b, c]).").unwrap());
        assert!(!ctx.has_solution("memberchk(d, [a, b, c]).").unwrap());
    }

    #[test]
    fn length_measures_and_builds() {
        let mut ctx = fresh();
        let solution = ctx.query_once("length([a, b, c], N).").unwrap().unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(3.into())));

        let solution = ctx.query_once("length(L, 2).").unwrap().unwrap();
        match solution.get("L") {
            Some(Value::List(elems)) => assert_eq!(elems.len(), 2),
            other => panic!("expected a two-element list, got {other:?}"),
        }
    }

    #[test]
    fn nth_and_last() {
        let mut ctx = fresh();

        let solution = ctx.query_once("nth0(0, [a, b, c], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("a")));

        let solution = ctx.query_once("nth1(3, [a, b, c, d], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("c")));

        assert!(!ctx.has_solution("nth0(5, [a, b, c], _).").unwrap());

        let solution = ctx.query_once("last([a, b, c], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("c")));
        assert!(!ctx.has_solution("last([], _).").unwrap());
    }

    #[test]
    fn reverse_and_select() {
        let mut ctx = fresh();

        let solution = ctx.query_once("reverse([1, 2, 3], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&ints(&[3, 2, 1])));

        let solution = ctx.query_once("select(b, [a, b, c], X).").unwrap().unwrap();
        assert_eq!(
            solution.get("X"),
            Some(&Value::List(vec![atom("a"), atom("c")]))
        );

        let solution = ctx.query_once("select(X, [a, b, c], [a, c]).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("b")));
    }

    #[test]
    fn msort_orders_and_keeps_duplicates() {
        let mut ctx = fresh();

        let solution = ctx.query_once("msort([3, 1, 2, 1], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&ints(&[1, 1, 2, 3])));

        let solution = ctx.query_once("msort([b, a, c, a], X).").unwrap().unwrap();
        assert_eq!(
            solution.get("X"),
            Some(&Value::List(vec![atom("a"), atom("a"), atom("b"), atom("c")]))
        );

        let solution = ctx.query_once("msort([], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::List(vec![])));
    }

    #[test]
    fn sort_removes_duplicates() {
        let mut ctx = fresh();
        let solution = ctx.query_once("sort([3, 1, 2, 1], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&ints(&[1, 2, 3])));
    }

    #[test]
    fn sorting_an_unbound_or_improper_argument_raises() {
        let mut ctx = fresh();

        match ctx.has_solution("msort(X, Y).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("instantiation_error"));
            }
            other => panic!("expected an instantiation error, got {other:?}"),
        }

        match ctx.has_solution("msort(atom, X).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("type_error"));
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn keysort_is_stable_on_equal_keys() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("keysort([3-a, 1-b, 2-c, 1-d], X).")
            .unwrap()
            .unwrap();

        let pair = |k: i64, v: &str| {
            Value::Compound("-".to_string(), vec![Value::Int(k.into()), atom(v)])
        };
        assert_eq!(
            solution.get("X"),
            Some(&Value::List(vec![
                pair(1, "b"),
                pair(1, "d"),
                pair(2, "c"),
                pair(3, "a")
            ]))
        );
    }

    #[test]
    fn keysort_demands_pairs() {
        let mut ctx = fresh();
        match ctx.has_solution("keysort([not_a_pair], X).") {
            Err(ErrorKind::Uncaught(ball)) => {
                assert!(format!("{ball}").contains("type_error"));
            }
            other => panic!("expected a type error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_aggregates() {
        let mut ctx = fresh();

        let solution = ctx.query_once("sum_list([1, 2, 3, 4], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(10.into())));

        let solution = ctx.query_once("sumlist([1.5, 2.5], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Float(4.0)));

        let solution = ctx.query_once("sum_list([], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(0.into())));

        let solution = ctx.query_once("max_list([3, 1, 4, 1, 5], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(5.into())));

        let solution = ctx.query_once("min_list([-5, -10, -3], X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int((-10).into())));

        assert!(!ctx.has_solution("max_list([], _).").unwrap());
        assert!(ctx.has_solution("catch(sum_list([1, atom, 3], _), error(type_error(_, _), _), true).").unwrap());
    }

    #[test]
    fn is_list_demands_proper_lists() {
        let mut ctx = fresh();
        assert!(ctx.has_solution("is_list([]).").unwrap());
        assert!(ctx.has_solution("is_list([a, b]).").unwrap());
        assert!(!ctx.has_solution("is_list([a | b]).").unwrap());
        assert!(!ctx.has_solution("is_list(atom).").unwrap());
        assert!(!ctx.has_solution("is_list(_).").unwrap());
    }

    #[test]
    fn numlist_builds_ranges() {
        let mut ctx = fresh();
        let solution = ctx.query_once("numlist(2, 5, X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&ints(&[2, 3, 4, 5])));
        assert!(!ctx.has_solution("numlist(5, 2, _).").unwrap());
    }
}

mod atoms {
    use super::*;

    #[test]
    fn atom_length_counts_characters() {
        let mut ctx = fresh();
        let solution = ctx.query_once("atom_length(hello, N).").unwrap().unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(5.into())));
    }

    #[test]
    fn atom_chars_round_trips() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("atom_chars(abc, L), atom_chars(X, L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("X"), Some(&atom("abc")));
        assert_eq!(
            solution.get("L"),
            Some(&Value::List(vec![atom("a"), atom("b"), atom("c")]))
        );
    }

    #[test]
    fn atom_codes_round_trips() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("atom_codes(abc, L), atom_codes(X, L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("X"), Some(&atom("abc")));
        assert_eq!(solution.get("L"), Some(&ints(&[97, 98, 99])));
    }

    #[test]
    fn atom_concat_enumerates_every_split() {
        let mut ctx = fresh();
        let all = ctx.query_n("atom_concat(X, Y, abc).", 10).unwrap();

        let pairs: Vec<_> = all
            .iter()
            .map(|s| (s.get("X").unwrap().clone(), s.get("Y").unwrap().clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (atom(""), atom("abc")),
                (atom("a"), atom("bc")),
                (atom("ab"), atom("c")),
                (atom("abc"), atom("")),
            ]
        );
    }

    #[test]
    fn atom_concat_joins() {
        let mut ctx = fresh();
        let solution = ctx.query_once("atom_concat(foo, bar, X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("foobar")));
    }

    #[test]
    fn sub_atom_finds_occurrences() {
        let mut ctx = fresh();
        let all = ctx
            .query_n("sub_atom(abracadabra, B, 2, _, ab).", 10)
            .unwrap();

        let befores: Vec<_> = all.iter().map(|s| s.get("B").unwrap().clone()).collect();
        assert_eq!(befores, vec![Value::Int(0.into()), Value::Int(7.into())]);
    }

    #[test]
    fn char_code_converts_both_ways() {
        let mut ctx = fresh();

        let solution = ctx.query_once("char_code(a, X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(97.into())));

        let solution = ctx.query_once("char_code(X, 98).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("b")));
    }

    #[test]
    fn atom_number_reads_and_writes() {
        let mut ctx = fresh();

        let solution = ctx.query_once("atom_number('42', X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&Value::Int(42.into())));

        let solution = ctx.query_once("atom_number(X, 3.5).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("3.5")));

        assert!(!ctx.has_solution("atom_number(hello, _).").unwrap());
    }

    #[test]
    fn case_mapping() {
        let mut ctx = fresh();

        let solution = ctx.query_once("upcase_atom(hello, X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("HELLO")));

        let solution = ctx.query_once("downcase_atom('HELLO', X).").unwrap().unwrap();
        assert_eq!(solution.get("X"), Some(&atom("hello")));
    }
}

mod collectors {
    use super::*;

    #[test]
    fn findall_collects_in_resolver_order() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("findall(X, member(X, [c, a, b]), L).")
            .unwrap()
            .unwrap();
        assert_eq!(
            solution.get("L"),
            Some(&Value::List(vec![atom("c"), atom("a"), atom("b")]))
        );
    }

    #[test]
    fn findall_yields_nil_on_failure() {
        let mut ctx = fresh();
        let solution = ctx.query_once("findall(X, member(X, []), L).").unwrap().unwrap();
        assert_eq!(solution.get("L"), Some(&Value::List(vec![])));
    }

    #[test]
    fn bagof_fails_on_no_solutions() {
        let mut ctx = fresh();
        assert!(!ctx.has_solution("bagof(X, member(X, []), _).").unwrap());

        let solution = ctx
            .query_once("bagof(X, member(X, [b, a]), L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("L"), Some(&Value::List(vec![atom("b"), atom("a")])));
    }

    #[test]
    fn setof_sorts_and_deduplicates() {
        let mut ctx = fresh();
        let solution = ctx
            .query_once("setof(X, member(X, [b, a, b]), L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("L"), Some(&Value::List(vec![atom("a"), atom("b")])));
    }

    #[test]
    fn caret_witnesses_are_stripped() {
        let mut ctx = fresh();
        ctx.consult_str("likes(alice, prolog). likes(bob, prolog).").unwrap();

        let solution = ctx
            .query_once("setof(What, Who^likes(Who, What), L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("L"), Some(&Value::List(vec![atom("prolog")])));
    }

    #[test]
    fn forall_checks_every_solution() {
        let mut ctx = fresh();
        assert!(ctx
            .has_solution("forall(member(X, [1, 2, 3]), X > 0).")
            .unwrap());
        assert!(!ctx
            .has_solution("forall(member(X, [1, -2, 3]), X > 0).")
            .unwrap());
    }

    #[test]
    fn aggregate_all_shapes() {
        let mut ctx = fresh();

        let solution = ctx
            .query_once("aggregate_all(count, member(_, [a, b, c]), N).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(3.into())));

        let solution = ctx
            .query_once("aggregate_all(sum(X), member(X, [1, 2, 3]), N).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(6.into())));

        let solution = ctx
            .query_once("aggregate_all(max(X), member(X, [1, 9, 3]), N).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("N"), Some(&Value::Int(9.into())));

        let solution = ctx
            .query_once("aggregate_all(set(X), member(X, [b, a, b]), L).")
            .unwrap()
            .unwrap();
        assert_eq!(solution.get("L"), Some(&Value::List(vec![atom("a"), atom("b")])));
    }
}
