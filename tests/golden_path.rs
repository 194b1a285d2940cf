use std::str::FromStr;

use golden_path::{
    escape, CompareOp, Condition, Error, GoldenPath, Literal, PathKey, Resolution, Segment, Value,
    DEFAULT_MAX_DEPTH,
};
use serde_json::{json, Number};

#[test]
fn parse() {
    #[track_caller]
    fn test(s: &str) {
        test1(s, s);
    }
    #[track_caller]
    fn test1(s: &str, display: &str) {
        let path = GoldenPath::from_str(s).unwrap();
        assert_eq!(path.to_string(), display);
        // the display form parses back to the same query
        assert_eq!(GoldenPath::new(display).unwrap(), path);
    }

    test("");
    test("islam");
    test("peoples.0.name");
    test("peoples[id=1]");
    test("peoples[id=1].name");
    test("peoples[id=1][other=true]");
    test("peoples*[sex='male'].friends*[sex='male'].name");
    test("peoples.*.name");
    test("*");
    test("*.*");
    test("*[id=1]");
    test("[id=1].name");
    test("a[x>=1.5]");
    test("a[x<=-2]");
    test("a[x!=false]");
    test("a[x>'b']");
    test("a[x<1]");
    test("a[0='b']");
    test1("a..b", "a.b");
    test1(".a.", "a");
    test1("a.*[x=1]", "a*[x=1]");
    test1("a.[x=1]", "a[x=1]");
    test1("peoples[sex=male]", "peoples[sex='male']");
    test1("a[x=\"s\"]", "a[x='s']");
    test1("a[x=`s`]", "a[x='s']");
    test1("a*", "a.*");
    test1(&format!("{}.c", escape("a.b")), "##a.b##.c");
    test1(&format!("a{}c", escape(".b.")), "##a.b.c##");
    test1(&format!("a[x='{}']", escape("[]'")), "a[x='##[]'##']");
    test1(&format!("a[{}=1]", escape("p=q")), "a[##p=q##=1]");
    test("a.####.b");
    test("[####=1]");
    test1(&format!("a.{}", escape("")), "a.####");
}

#[test]
fn parse_error() {
    #[track_caller]
    fn test_err(s: &str, position: usize, message: &str) {
        let err = GoldenPath::new(s).unwrap_err();
        assert_eq!((err.position(), err.message()), (position, message), "{s}");
        assert_eq!(err.to_string(), format!("at position {position}, {message}"));
    }

    test_err("a[", 2, "missing property");
    test_err("a[=1]", 2, "missing property");
    test_err("a[b]", 3, "unrecognized operator");
    test_err("a[b!c]", 3, "unrecognized operator");
    test_err("a[b=]", 4, "missing literal");
    test_err("a[b=1", 5, "unbalanced brackets");
    test_err("a[b=1[c=2]]", 5, "unbalanced brackets");
    test_err("a]", 1, "unbalanced brackets");
    test_err("a[b=1]]", 6, "unbalanced brackets");
    test_err("a=b", 1, "unexpected character");
    test_err("a*b", 2, "unexpected character");
    test_err("a##b", 3, "unterminated escape");
}

#[test]
fn segments() {
    #[track_caller]
    fn literal(s: &str) -> Literal {
        let path = GoldenPath::new(&format!("a[x={s}]")).unwrap();
        match path.segments() {
            [_, Segment::Filter { conditions, .. }] => conditions[0].literal.clone(),
            other => panic!("unexpected segments: {other:?}"),
        }
    }

    let path = GoldenPath::new("peoples.0*[id!=1].*").unwrap();
    assert_eq!(
        path.segments(),
        [
            Segment::Key(PathKey::Key("peoples".into())),
            Segment::Key(PathKey::Index(0)),
            Segment::Filter {
                greedy: true,
                conditions: vec![Condition {
                    property: "id".into(),
                    op: CompareOp::Ne,
                    literal: Literal::Number(1.into()),
                }],
            },
            Segment::Wildcard,
        ]
    );

    assert_eq!(literal("true"), Literal::Bool(true));
    assert_eq!(literal("false"), Literal::Bool(false));
    assert_eq!(literal("1"), Literal::Number(1.into()));
    assert_eq!(literal("-2"), Literal::Number((-2).into()));
    assert_eq!(literal("2.5"), Literal::Number(Number::from_f64(2.5).unwrap()));
    assert_eq!(literal("1e3"), Literal::Number(Number::from_f64(1000.0).unwrap()));
    assert_eq!(literal("'1'"), Literal::String("1".into()));
    assert_eq!(literal("\"true\""), Literal::String("true".into()));
    assert_eq!(literal("''"), Literal::String("".into()));
    assert_eq!(literal("male"), Literal::String("male".into()));
    assert_eq!(literal("1a"), Literal::String("1a".into()));
    assert_eq!(literal("null"), Literal::String("null".into()));
    assert_eq!(literal("'open"), Literal::String("'open".into()));
    // escaped text is typed like plain text
    assert_eq!(literal(&escape("1")), Literal::Number(1.into()));
    assert_eq!(literal(&escape("x]")), Literal::String("x]".into()));
}

#[test]
fn greediness() {
    #[track_caller]
    fn test(s: &str, greedy: bool) {
        assert_eq!(GoldenPath::new(s).unwrap().is_greedy(), greedy, "{s}");
    }

    test("", false);
    test("a.b.0", false);
    test("a[x=1].b[y=2]", false);
    test("a.*", true);
    test("a*[x=1].b", true);
    test("a[x=1].b*[y=2]", true);
}

#[test]
fn resolve() {
    let root = Value::from(json!({
        "peoples": [
            { "id": 1, "friends": [{ "name": "a" }, { "name": "b" }] },
            { "id": 2, "friends": [{ "name": "c" }] }
        ]
    }));

    #[track_caller]
    fn test(query: &str, root: &Value, expected: Resolution) {
        let path = GoldenPath::new(query).unwrap();
        assert_eq!(path.resolve(root).unwrap(), expected, "{query}");
    }
    fn path<const N: usize>(keys: [PathKey; N]) -> Vec<PathKey> {
        keys.into()
    }

    test("", &root, Resolution::Single(vec![]));
    test(
        "peoples[id=2].friends.0.name",
        &root,
        Resolution::Single(path(["peoples".into(), 1.into(), "friends".into(), 0.into(), "name".into()])),
    );
    // keys are taken as written, whether or not they exist
    test("missing.0", &root, Resolution::Single(path(["missing".into(), 0.into()])));
    test(
        "peoples.*.id",
        &root,
        Resolution::Multiple(vec![
            path(["peoples".into(), 0.into(), "id".into()]),
            path(["peoples".into(), 1.into(), "id".into()]),
        ]),
    );
    test(
        "peoples.*.friends.*",
        &root,
        Resolution::Multiple(vec![
            path(["peoples".into(), 0.into(), "friends".into(), 0.into()]),
            path(["peoples".into(), 0.into(), "friends".into(), 1.into()]),
            path(["peoples".into(), 1.into(), "friends".into(), 0.into()]),
        ]),
    );
    test(
        "peoples*[id=1].friends[name=b]",
        &root,
        Resolution::Multiple(vec![path(["peoples".into(), 0.into(), "friends".into(), 1.into()])]),
    );
    test(
        "peoples[id=3].friends",
        &root,
        Resolution::NotFound {
            partial: path(["peoples".into()]),
            greedy: false,
        },
    );
    test(
        "peoples[id=2].friends[name=a]",
        &root,
        Resolution::NotFound {
            partial: path(["peoples".into(), 1.into(), "friends".into()]),
            greedy: false,
        },
    );
    test(
        "peoples.0*[id=1]",
        &root,
        Resolution::NotFound {
            partial: path(["peoples".into(), 0.into()]),
            greedy: true,
        },
    );
    // a miss in every branch is still a list of nothing
    test("peoples.*.friends[name=z]", &root, Resolution::Multiple(vec![]));

    let resolution = GoldenPath::new("peoples[id=9]").unwrap().resolve(&root).unwrap();
    assert!(resolution.into_paths().is_empty());
}

#[test]
fn max_depth() {
    let root = Value::from(json!({ "a": [[[1]]] }));

    let path = GoldenPath::new("a.*.*.*").unwrap();
    assert_eq!(path.max_depth(), DEFAULT_MAX_DEPTH);
    assert_eq!(path.get(&root).unwrap(), Value::from(json!([1])));

    let path = path.with_max_depth(2);
    assert_eq!(
        path.get(&root).unwrap_err(),
        Error::TooDeep {
            query: "a.*.*.*".into(),
            limit: 2,
        }
    );
    assert!(path.update(json!(0), &root).is_err());

    let path = GoldenPath::new("a.*.*").unwrap().with_max_depth(2);
    assert_eq!(path.get(&root).unwrap(), Value::from(json!([[1]])));

    // nothing is expanded, so the limit is not reached
    let path = GoldenPath::new("b.*.*.*").unwrap().with_max_depth(0);
    assert_eq!(path.get(&root).unwrap(), Value::from(json!([])));
}

#[test]
fn escape_marker() {
    assert_eq!(escape("a.b"), "##a.b##");
    assert_eq!(escape(""), "####");
    let path = GoldenPath::new(&format!("a[x={}]", escape(""))).unwrap();
    assert_eq!(path.to_string(), "a[x='']");
}
