use claimpath::{
    ast::AttributePath, ComposedPredicate, Condition, EvalError, Expression, MatchOptions,
    Matcher, Operand, Operator, Predicate, Query,
};
use serde_json::{json, Value};
use std::{sync::Arc, thread};

fn eval(query: &str, doc: &Value) -> Result<bool, EvalError> {
    Query::compile(query)
        .unwrap_or_else(|e| panic!("Failed to compile {:?}: {}", query, e))
        .matches(doc)
}

fn check(query: &str, doc: &Value) -> bool {
    eval(query, doc).unwrap_or_else(|e| panic!("Failed to match {:?}: {}", query, e))
}

fn single(predicate: Predicate) -> ComposedPredicate {
    ComposedPredicate::new(vec![Expression {
        logical: None,
        negated: false,
        condition: Condition::Predicate(predicate),
    }])
}

fn path(name: &str) -> Operand {
    Operand::Path(AttributePath::new(vec![name.to_string()]))
}

// ============================================================================
// Null and Missing Values
// ============================================================================

#[test]
fn test_missing_attribute_is_null() {
    let doc = json!({"sub": "username"});
    assert!(check("@.foo == null", &doc));
    assert!(!check("@.foo != null", &doc));
    assert!(!check("@.foo == 'x'", &doc));
    assert!(check("@.foo != 'x'", &doc));
    assert!(check("@.foo in [null]", &doc));
    assert!(!check("@.foo nin [null]", &doc));
}

#[test]
fn test_json_null() {
    let doc = json!({"n": null});
    assert!(check("@.n == null", &doc));
    assert!(!check("@.n", &doc));
    assert!(check("@.n in ['x', null]", &doc));
}

#[test]
fn test_bare_attribute() {
    let doc = json!({"empty": "", "zero": 0, "off": false, "obj": {}});
    assert!(check("@.empty", &doc));
    assert!(check("@.zero", &doc));
    assert!(check("@.obj", &doc));
    assert!(!check("@.off", &doc));
    assert!(!check("@.missing", &doc));
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_numbers_compare_as_decimals() {
    for doc in [json!({"level": 9}), json!({"level": 9.0})] {
        assert!(check("@.level == 9", &doc), "{}", doc);
        assert!(check("@.level == 9.0", &doc), "{}", doc);
        assert!(!check("@.level == 9.0000001", &doc), "{}", doc);
        assert!(check("@.level in [8, 9.0]", &doc), "{}", doc);
    }
}

#[test]
fn test_long_number_literals() {
    let doc = json!({"x": 1e29, "small": 5, "frac": 0.5});
    assert!(check("@.x == 100000000000000000000000000000", &doc));
    assert!(!check("@.x == 100000000000000000000000000001", &doc));
    assert!(check("@.x in [1, 100000000000000000000000000000.000]", &doc));
    assert!(!check("@.small > 100000000000000000000000000000", &doc));
    assert!(check("@.small < 100000000000000000000000000000", &doc));
    assert!(!check("@.frac == 0.50000000000000000000000000000001", &doc));
    assert!(check(
        "0.12345678901234567890123456789012 in [0.123456789012345678901234567890120]",
        &doc
    ));
}

#[test]
fn test_string_equality_is_typed() {
    let doc = json!({"num": 9, "text": "9"});
    assert!(!check("@.num == '9'", &doc));
    assert!(!check("@.text == 9", &doc));
    assert!(check("@.text == '9'", &doc));
}

#[test]
fn test_path_equality() {
    let doc = json!({"a": [1, 2], "b": [1.0, 2], "c": {"k": "v"}, "d": {"k": "v"}, "n": null});
    assert!(check("@.a == @.b", &doc));
    assert!(check("@.c == @.d", &doc));
    assert!(!check("@.a == @.c", &doc));
    assert!(check("@.x == @.y", &doc));
    assert!(check("@.n == @.missing", &doc));
    assert!(!check("@.a == @.missing", &doc));
    assert!(!check("@.missing == @.a", &doc));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_number_ordering() {
    let doc = json!({"iat": 0, "exp": 600});
    assert!(check("@.exp > 500", &doc));
    assert!(!check("@.exp < 500", &doc));
    assert!(check("@.exp >= 600", &doc));
    assert!(check("@.exp <= 600", &doc));
    assert!(!check("@.exp <= 599.5", &doc));
    assert!(check("@.iat > -1", &doc));
    assert!(check("@.exp > @.iat", &doc));
    assert!(!check("@.exp < @.iat", &doc));
}

#[test]
fn test_text_ordering() {
    let doc = json!({"sub": "username", "other": "zeta"});
    assert!(check("@.sub > 'a'", &doc));
    assert!(!check("@.sub < 'a'", &doc));
    assert!(check("@.sub < @.other", &doc));
}

#[test]
fn test_mistyped_literal_comparison_degrades() {
    let doc = json!({"s": "text", "n": 5});
    assert_eq!(eval("@.s > 5", &doc), Ok(false));
    assert_eq!(eval("@.s < 5", &doc), Ok(false));
    assert_eq!(eval("@.n > 'a'", &doc), Ok(false));
    assert_eq!(eval("@.missing > 5", &doc), Ok(false));
    assert_eq!(eval("@.missing < 5", &doc), Ok(false));

    // Degraded comparisons compose like any other false
    assert_eq!(eval("@.s > 5 or @.s == 'text'", &doc), Ok(true));
    assert_eq!(eval("@.s == 'text' and @.s > 5", &doc), Ok(false));
}

#[test]
fn test_degraded_gte_and_lte_are_false() {
    let doc = json!({"s": "text"});
    assert_eq!(eval("@.s >= 5", &doc), Ok(false));
    assert_eq!(eval("@.s <= 5", &doc), Ok(false));
}

#[test]
fn test_negated_degraded_comparison() {
    let doc = json!({"s": "text"});
    assert_eq!(eval("!@.s > 5", &doc), Ok(true));
    assert_eq!(eval("!(@.s > 5)", &doc), Ok(true));
}

#[test]
fn test_missing_side_of_path_comparison_degrades() {
    let doc = json!({"n": 5, "z": null});
    assert_eq!(eval("@.n > @.missing", &doc), Ok(false));
    assert_eq!(eval("@.z < @.n", &doc), Ok(false));
}

#[test]
fn test_incomparable_paths_propagate() {
    let doc = json!({"s": "text", "n": 5, "b": true});
    assert_eq!(
        eval("@.s > @.n", &doc),
        Err(EvalError::Incomparable {
            left: "string",
            right: "number"
        })
    );
    assert!(eval("@.b < @.n", &doc).is_err());
    assert_eq!(
        eval("@.s > @.n", &doc).unwrap_err().to_string(),
        "Can't compare string value to number value"
    );
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_false_and_skips_remaining_predicates() {
    let doc = json!({"s": "text", "n": 5});
    assert_eq!(eval("@.n == 1 and @.s > @.n", &doc), Ok(false));
    assert!(eval("@.n == 5 and @.s > @.n", &doc).is_err());
}

#[test]
fn test_false_and_ends_match_before_or() {
    let doc = json!({"n": 5});
    assert_eq!(eval("@.n == 1 and @.n == 2 or @.n == 5", &doc), Ok(false));
    assert_eq!(eval("(@.n == 1 and @.n == 2) or @.n == 5", &doc), Ok(true));
}

#[test]
fn test_or_does_not_short_circuit() {
    let doc = json!({"s": "text", "n": 5});
    assert!(eval("@.n == 5 or @.s > @.n", &doc).is_err());
}

#[test]
fn test_left_to_right_folding() {
    let doc = json!({"n": 5, "s": "text"});
    assert!(check("@.n == 5 or @.n == 1 and @.s == 'text'", &doc));
    assert!(!check("@.n == 1 or @.n == 5 and @.s == 'other'", &doc));
}

#[test]
fn test_grouping() {
    let query = "(@.a == 1 or @.a == 2) and @.b == 'x'";
    assert!(check(query, &json!({"a": 2, "b": "x"})));
    assert!(!check(query, &json!({"a": 3, "b": "x"})));
    assert!(!check(query, &json!({"a": 1, "b": "y"})));
}

#[test]
fn test_negation() {
    let doc = json!({"a": 1});
    assert!(!check("!(@.a == 1)", &doc));
    assert!(check("!(@.a == 2)", &doc));
    assert!(check("!@.missing", &doc));
    assert!(check("!(!(@.a == 1))", &doc));
    assert!(!check("!(@.a == 1) and @.a == 1", &doc));
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_path_in_list() {
    let doc = json!({"custom": "custom-value", "level": 9, "obj": {"a": 1}, "arr": ["x"]});
    assert!(check("@.custom in ['a', 'custom-value']", &doc));
    assert!(!check("@.custom in ['a', 42]", &doc));
    assert!(check("@.level in [1, 9, 20]", &doc));
    assert!(!check("@.level in ['9']", &doc));
    assert!(!check("@.obj in ['x']", &doc));
    assert!(!check("@.arr in ['x']", &doc));
    assert!(check("@.arr nin ['x']", &doc));
}

#[test]
fn test_literal_in_path() {
    let doc = json!({"aud": ["uma_authorization", "kafka"], "nums": [1, 2.5], "nulls": [null], "sub": "kafka"});
    assert!(check("'kafka' in @.aud", &doc));
    assert!(!check("'kafka' in @.missing", &doc));
    assert!(!check("'kafka' in @.sub", &doc));
    assert!(check("2.50 in @.nums", &doc));
    assert!(!check("'1' in @.nums", &doc));
    assert!(check("null in @.nulls", &doc));
    assert!(check("'other' nin @.aud", &doc));

    assert!(!check("'kafka' in @.aud", &json!({"aud": ["other"]})));
}

#[test]
fn test_path_in_path() {
    let doc = json!({"sub": "u", "allowed": ["u", "v"], "level": 9, "levels": [9.0]});
    assert!(check("@.sub in @.allowed", &doc));
    assert!(check("@.level in @.levels", &doc));
    assert!(!check("@.sub in @.levels", &doc));
    assert!(!check("@.sub in @.sub", &doc));
    assert!(!check("@.missing in @.allowed", &doc));
    assert!(check("@.x in @.y", &doc));
}

#[test]
fn test_literal_in_list() {
    let doc = json!({});
    assert!(check("5 in [5.0]", &doc));
    assert!(check("'a' nin ['b']", &doc));
    assert!(check("null in [null]", &doc));
}

#[test]
fn test_anyof_and_noneof() {
    let doc = json!({"roles": ["a", "b"], "single": "b", "nul": null, "level": 9});
    assert!(check("@.roles anyof ['b', 'z']", &doc));
    assert!(!check("@.roles anyof ['z']", &doc));
    assert!(check("@.single anyof ['b']", &doc));
    assert!(check("@.level anyof [9.0]", &doc));
    assert!(check("@.nul anyof [null]", &doc));
    assert!(!check("@.missing anyof ['b', null]", &doc));
    assert!(check("@.missing noneof ['b']", &doc));
    assert!(!check("@.roles noneof ['a']", &doc));
    assert!(check("@.roles noneof []", &doc));
}

// ============================================================================
// Regex
// ============================================================================

#[test]
fn test_regex_matching() {
    let doc = json!({
        "iss": "https://auth-server/token/",
        "exp": 600,
        "flag": true,
        "aud": ["kafka"],
        "multi": "first\nsecond"
    });
    assert!(check(r"@.iss =~ /^https:\/\/auth-server\/.+/", &doc));
    assert!(check("@.iss =~ /^HTTPS/i", &doc));
    assert!(!check("@.iss =~ /^HTTPS/", &doc));
    assert!(check(r"@.exp =~ /^6\d+$/", &doc));
    assert!(check("@.flag =~ /^true$/", &doc));
    assert!(!check("@.aud =~ /kafka/", &doc));
    assert!(!check("@.missing =~ /.*/", &doc));
    assert!(check("@.multi =~ /^second$/m", &doc));
    assert!(check("@.multi =~ /first.second/s", &doc));
    assert!(!check("@.multi =~ /first.second/", &doc));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_compatible_mode() {
    let doc = json!({"a": 1, "roles": ["x"]});
    let compile = |q: &str| Query::compile(q).unwrap().with_options(MatchOptions::compatible());

    assert_eq!(compile("!(@.a == 1)").matches(&doc), Ok(true));
    assert_eq!(compile("!@.a == 2").matches(&doc), Ok(false));
    assert_eq!(
        compile("@.a == 1 or @.a =~ /1/").matches(&doc),
        Err(EvalError::UnsupportedOperator(Operator::MatchRegex))
    );
    assert_eq!(
        compile("@.roles anyof ['x']").matches(&doc),
        Err(EvalError::UnsupportedOperator(Operator::AnyOf))
    );
    assert_eq!(compile("@.a == 2 and @.roles anyof ['x']").matches(&doc), Ok(false));
}

#[test]
fn test_options_can_be_mixed() {
    let options = MatchOptions {
        apply_negation: false,
        ..MatchOptions::default()
    };
    let query = Query::compile("!(@.a anyof [1])").unwrap().with_options(options);
    assert_eq!(query.options(), options);
    assert_eq!(query.matches(&json!({"a": 1})), Ok(true));
}

// ============================================================================
// Hand-built Trees
// ============================================================================

#[test]
fn test_bare_literal_fails_match() {
    let tree = single(Predicate::exists(Operand::String("x".into())));
    assert_eq!(
        Matcher::default().evaluate(&tree, &json!({})),
        Err(EvalError::BareValue("string"))
    );
}

#[test]
fn test_invalid_operands_fail_match() {
    let tree = single(Predicate::compare(
        path("a"),
        Operator::Equal,
        Operand::List(vec![]),
    ));
    let err = Matcher::default().evaluate(&tree, &json!({"a": 1})).unwrap_err();
    assert!(!err.is_degrading());
    assert!(matches!(
        err,
        EvalError::InvalidOperands {
            operator: Operator::Equal,
            ..
        }
    ));
}

#[test]
fn test_empty_tree_is_false() {
    let tree = ComposedPredicate::default();
    assert_eq!(Matcher::default().evaluate(&tree, &json!({})), Ok(false));
}

// ============================================================================
// Query Values
// ============================================================================

#[test]
fn test_compile_is_deterministic() {
    let text = "@.a in [1, 'x'] and !(@.b =~ /x/i or @.c != null)";
    assert_eq!(Query::compile(text).unwrap(), Query::compile(text).unwrap());
    assert_eq!(text.parse::<Query>().unwrap(), Query::compile(text).unwrap());
}

#[test]
fn test_display_reparses_to_same_query() {
    let test_cases = vec![
        "@.exp  >  1000",
        "@.a == 'x' && @.b || @.c",
        "!(@.a == 1 or @.b != null) and @.c <= -1.50",
        "@.x > 0.12345678901234567890123456789012 or @.y in [0.0000001]",
        "\"it's\" in @.aud",
        "@.custom nin ['a', 42, null]",
        r"@.iss =~ /https:\/\/auth-server\/.+/im",
        "@.roles.client-roles.kafka anyof ['kafka-user'] or @.x noneof []",
        "((@.a))",
    ];

    let doc = json!({"exp": 2000, "a": "x", "c": -3, "aud": ["it's"], "custom": "b"});
    for text in test_cases {
        let query = Query::compile(text).unwrap();
        let canonical = query.to_string();
        let reparsed = Query::compile(&canonical)
            .unwrap_or_else(|e| panic!("Failed to re-parse {:?}: {}", canonical, e));
        assert_eq!(reparsed, query, "Failed for query: {}", text);
        assert_eq!(reparsed.to_string(), canonical);
        assert_eq!(reparsed.matches(&doc), query.matches(&doc));
    }
}

#[test]
fn test_canonical_text() {
    let query = Query::compile("!( @.a  ==  'x' )  ||  @.b  in  [ 1 ,null ]").unwrap();
    assert_eq!(query.to_string(), "!(@.a == 'x') or @.b in [1, null]");
}

#[test]
fn test_query_is_shareable() {
    fn assert_send_sync<T: Send + Sync + Clone>() {}
    assert_send_sync::<Query>();

    let query = Arc::new(Query::compile("'kafka' in @.aud and @.exp > 100").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let query = Arc::clone(&query);
            thread::spawn(move || {
                let aud = if i % 2 == 0 { "kafka" } else { "other" };
                query.matches(&json!({"aud": [aud], "exp": 600})).unwrap()
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, false, true, false]);
}
