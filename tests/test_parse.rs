use pretty_assertions::assert_eq;
use qs_url::{ArrayFormat, Config, Error, Options, ParsedQuery, Sort, Value};

fn keys(query: &ParsedQuery) -> Vec<&str> {
    query.keys().map(String::as_str).collect()
}

fn strings(values: &[&str]) -> Value {
    Value::Array(values.iter().map(|&v| Value::from(v)).collect())
}

#[test]
fn empty_input() {
    assert!(qs_url::parse("").is_empty());
    assert!(qs_url::parse(None).is_empty());
    assert!(qs_url::parse("?").is_empty());
    assert!(qs_url::parse("   ").is_empty());
    assert!(qs_url::parse("&&&").is_empty());
}

#[test]
fn leading_marker_is_dropped() {
    for input in ["?a=1", "#a=1", "&a=1", "  ?a=1  "] {
        let query = qs_url::parse(input);
        assert_eq!(query["a"], Value::from("1"), "input: {input:?}");
        assert_eq!(query.len(), 1);
    }
}

#[test]
fn repeated_keys_collect() {
    let query = qs_url::parse("a=1&a=2");
    assert_eq!(query["a"], strings(&["1", "2"]));

    let query = qs_url::parse("a=1&b=x&a=2&a=3");
    assert_eq!(query["a"], strings(&["1", "2", "3"]));
    assert_eq!(query["b"], Value::from("x"));
}

#[test]
fn bare_key_versus_empty_value() {
    let query = qs_url::parse("a&b=&c=1=2");
    assert_eq!(query["a"], Value::Null);
    assert_eq!(query["b"], Value::from(""));
    assert_eq!(query["c"], Value::from("1=2"));
}

#[test]
fn decoding() {
    let query = qs_url::parse("q=a+b%20c&k%C3%A9y=%E2%9C%93");
    assert_eq!(query["q"], Value::from("a b c"));
    assert_eq!(query["kéy"], Value::from("✓"));

    let query = Config::new().decode(false).parse("q=a+b%20c");
    assert_eq!(query["q"], Value::from("a+b%20c"));
}

#[test]
fn malformed_escapes_are_kept() {
    let query = qs_url::parse("a=%E0%A4%A&b=%zz&c=100%");
    assert_eq!(query["a"], Value::from("%E0%A4%A"));
    assert_eq!(query["b"], Value::from("%zz"));
    assert_eq!(query["c"], Value::from("100%"));
}

#[test]
fn keys_are_sorted_by_default() {
    let query = qs_url::parse("c=1&a=2&b=3");
    assert_eq!(keys(&query), ["a", "b", "c"]);

    let query = Config::new().sort(Sort::Unsorted).parse("c=1&a=2&b=3");
    assert_eq!(keys(&query), ["c", "a", "b"]);

    let query = Config::new()
        .sort(Sort::Custom(|a, b| b.cmp(a)))
        .parse("c=1&a=2&b=3");
    assert_eq!(keys(&query), ["c", "b", "a"]);
}

#[test]
fn bracket_format() {
    let config = Config::new().array_format(ArrayFormat::Bracket);
    assert_eq!(config.parse("a[]=1&a[]=2")["a"], strings(&["1", "2"]));
    assert_eq!(config.parse("a[]=1")["a"], strings(&["1"]));
    assert_eq!(config.parse("a=1")["a"], Value::from("1"));
    assert_eq!(config.parse("a%5B%5D=1&a[]=2")["a"], strings(&["1", "2"]));
}

#[test]
fn index_format() {
    let config = Config::new().array_format(ArrayFormat::Index);
    let query = config.parse("a[1]=b&a[0]=a&a[10]=c&x=y");
    assert_eq!(query["a"], strings(&["a", "b", "c"]));
    assert_eq!(query["x"], Value::from("y"));

    // without sorting the positions are kept as parsed
    let query = config.sort(Sort::Unsorted).parse("a[1]=b&a[0]=a");
    let Value::Indexed(map) = &query["a"] else {
        panic!("expected an indexed map, got {:?}", query["a"]);
    };
    assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["1", "0"]);
}

#[test]
fn colon_list_format() {
    let config = Config::new().array_format(ArrayFormat::ColonListSeparator);
    let query = config.parse("a:list=1&a:list=2&b:list=3");
    assert_eq!(query["a"], strings(&["1", "2"]));
    assert_eq!(query["b"], strings(&["3"]));
}

#[test]
fn comma_format() {
    let config = Config::new().array_format(ArrayFormat::Comma);
    assert_eq!(config.parse("a=1,2")["a"], strings(&["1", "2"]));
    assert_eq!(config.parse("a=1")["a"], Value::from("1"));
    assert_eq!(config.parse("a=x%2Cy,z")["a"], strings(&["x,y", "z"]));
    // an encoded separator in an otherwise plain value still splits
    assert_eq!(config.parse("a=1%2C2")["a"], strings(&["1", "2"]));
    // the last occurrence wins
    assert_eq!(config.parse("a=1,2&a=3")["a"], Value::from("3"));
}

#[test]
fn separator_format() {
    let config = Config::new()
        .array_format(ArrayFormat::Separator)
        .array_format_separator("|")
        .unwrap();
    assert_eq!(config.parse("a=1|2|3")["a"], strings(&["1", "2", "3"]));
    assert_eq!(config.parse("a=1,2")["a"], Value::from("1,2"));
}

#[test]
fn bracket_separator_format() {
    let config = Config::new()
        .array_format(ArrayFormat::BracketSeparator)
        .array_format_separator("|")
        .unwrap();
    assert_eq!(config.parse("a[]=1|2&a[]=3")["a"], strings(&["1", "2", "3"]));
    assert_eq!(config.parse("a[]")["a"], Value::Array(vec![]));
    assert_eq!(config.parse("a=1|2")["a"], Value::from("1|2"));
}

#[test]
fn number_and_boolean_coercion() {
    let query = Config::new().parse_numbers(true).parse("page=3&ratio=0.5&name=x&empty=");
    assert_eq!(query["page"], Value::Number(3.0));
    assert_eq!(query["ratio"], Value::Number(0.5));
    assert_eq!(query["name"], Value::from("x"));
    assert_eq!(query["empty"], Value::from(""));

    let query = Config::new()
        .parse_booleans(true)
        .parse("a=true&b=FALSE&c=yes&d");
    assert_eq!(query["a"], Value::Bool(true));
    assert_eq!(query["b"], Value::Bool(false));
    assert_eq!(query["c"], Value::from("yes"));
    assert_eq!(query["d"], Value::Null);

    let query = Config::new()
        .array_format(ArrayFormat::Bracket)
        .parse_numbers(true)
        .parse_booleans(true)
        .parse("a[]=1&a[]=true&a[]=z");
    assert_eq!(
        query["a"],
        Value::Array(vec![Value::Number(1.0), Value::Bool(true), Value::from("z")])
    );
}

#[test]
fn invalid_separator_is_a_configuration_error() {
    for separator in ["", "||", "ab"] {
        assert!(matches!(
            Config::new().array_format_separator(separator),
            Err(Error::InvalidSeparator(_))
        ));

        let options = Options {
            array_format: Some(ArrayFormat::Separator),
            array_format_separator: Some(separator.to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            Config::try_from(options),
            Err(Error::InvalidSeparator(_))
        ));
    }
}

#[test]
fn options_from_json() {
    let options: Options = serde_json::from_str(
        r#"{ "arrayFormat": "bracket-separator", "arrayFormatSeparator": ";", "parseNumbers": true }"#,
    )
    .unwrap();
    let config = Config::try_from(options).unwrap();
    assert_eq!(
        config.parse("a[]=1;2")["a"],
        Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
    );
}
