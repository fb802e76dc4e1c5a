//! End-to-end parsing of realistic requests.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, StatusCode};
use proptest::prelude::*;
use reqparse::{
    current, Action, ArgType, Argument, ArgumentErrorKind, Location, Namespace, ParseError,
    ParseOptions, RequestContext, RequestParser, UploadedFile, Value,
};
use serde_json::json;

fn get(uri: &str) -> RequestContext {
    RequestContext::builder()
        .uri(uri.parse().unwrap())
        .build()
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> RequestContext {
    RequestContext::builder()
        .method(Method::POST)
        .uri(uri.parse().unwrap())
        .json(&body)
        .build()
        .unwrap()
}

fn post_form(uri: &str, body: &'static str) -> RequestContext {
    RequestContext::builder()
        .method(Method::POST)
        .uri(uri.parse().unwrap())
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .build()
        .unwrap()
}

#[test]
fn test_help_message_on_invalid_choice() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .choices(["one", "two"])
            .help("Bad choice: {error_msg}"),
    );
    let err = parser.parse_args(&get("/bubble?foo=three")).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        err.body(),
        json!({"message": "Bad choice: three is not a valid choice"})
    );
}

#[test]
fn test_help_without_placeholder() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .choices(["one", "two"])
            .help("Please select a valid choice"),
    );
    let err = parser.parse_args(&get("/bubble?foo=three")).unwrap_err();
    assert_eq!(err.body(), json!({"message": "Please select a valid choice"}));
}

#[test]
fn test_view_args() {
    let ctx = RequestContext::builder()
        .uri("/bubble/123".parse().unwrap())
        .view_arg("foo", "bar")
        .build()
        .unwrap();
    let parser = RequestParser::new().argument(Argument::new("foo").location(Location::ViewArgs));
    assert_eq!(parser.parse_args(&ctx).unwrap()["foo"], Value::from("bar"));
}

#[test]
fn test_unicode_query() {
    let parser = RequestParser::new().argument("foo");
    let ns = parser.parse_args(&get("/bubble?foo=bar%C3%9F")).unwrap();
    assert_eq!(ns["foo"], Value::from("barß"));
}

#[test]
fn test_json_location_without_body() {
    let parser = RequestParser::new().argument(Argument::new("foo").location(Location::Json));
    let ns = parser.parse_args(&get("/bubble?foo=bar")).unwrap();
    assert_eq!(ns["foo"], Value::Null);
}

#[test]
fn test_json_null_is_none() {
    let parser = RequestParser::new().argument(Argument::new("foo").location(Location::Json));
    let ns = parser.parse_args(&post_json("/bubble", json!({"foo": null}))).unwrap();
    assert_eq!(ns["foo"], Value::Null);
}

#[test]
fn test_json_and_values_locations() {
    let parser = RequestParser::new()
        .argument(Argument::new("foo").locations([Location::Json, Location::Values]))
        .argument(Argument::new("baz").locations([Location::Json, Location::Values]));
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri("/bubble?baz=qux".parse().unwrap())
        .json(&json!({"foo": "bar"}))
        .build()
        .unwrap();
    let ns = parser.parse_args(&ctx).unwrap();
    assert_eq!(ns["foo"], Value::from("bar"));
    assert_eq!(ns["baz"], Value::from("qux"));
}

#[test]
fn test_form_body() {
    let parser = RequestParser::new()
        .argument(Argument::new("name").location(Location::Form))
        .argument(Argument::new("role").action(Action::Append));
    let ns = parser
        .parse_args(&post_form("/users", "name=alice&role=admin&role=ops"))
        .unwrap();
    assert_eq!(ns["name"], Value::from("alice"));
    assert_eq!(ns["role"], Value::from(vec!["admin", "ops"]));
}

#[test]
fn test_headers_are_case_insensitive() {
    let ctx = RequestContext::builder()
        .header("X-Request-Id", "abc")
        .build()
        .unwrap();
    let parser = RequestParser::new()
        .argument(Argument::new("x-request-id").location(Location::Headers).dest("request_id"));
    assert_eq!(parser.parse_args(&ctx).unwrap()["request_id"], Value::from("abc"));
}

#[test]
fn test_cookies() {
    let ctx = RequestContext::builder()
        .header("cookie", "session=s3cr3t; theme=dark")
        .build()
        .unwrap();
    let parser = RequestParser::new()
        .argument(Argument::new("session").location(Location::Cookies).required(true));
    assert_eq!(parser.parse_args(&ctx).unwrap()["session"], Value::from("s3cr3t"));

    let err = parser.parse_args(&get("/")).unwrap_err();
    assert_eq!(
        err.body(),
        json!({"message": "Missing required parameter session in the request's cookies"})
    );
}

#[test]
fn test_append_and_default() {
    let parser = RequestParser::new().argument(Argument::new("foo").action(Action::Append));
    let ns = parser.parse_args(&get("/bubble?foo=bar&foo=bat")).unwrap();
    assert_eq!(ns["foo"], Value::from(vec!["bar", "bat"]));

    let parser = RequestParser::new()
        .argument(Argument::new("foo").action(Action::Append).default(vec!["bar"]));
    let ns = parser.parse_args(&get("/bubble")).unwrap();
    assert_eq!(ns["foo"], Value::from(vec!["bar"]));
}

#[test]
fn test_operators_with_append() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .operators([">=", "<=", "="])
            .action(Action::Append),
    );
    let ns = parser.parse_args(&get("/bubble?foo%3E=bar&foo%3C=bat&foo=foo")).unwrap();
    assert_eq!(ns["foo"], Value::from(vec!["bar", "bat", "foo"]));
}

#[test]
fn test_contextual_type_receives_name_and_operator() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = std::sync::Arc::clone(&seen);
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .operators(["<="])
            .arg_type(ArgType::with_context(move |value: &Value, name: &str, op: &str| {
                log.lock()
                    .unwrap()
                    .push((value.to_string(), name.to_string(), op.to_string()));
                Ok::<_, String>(value.clone())
            })),
    );
    parser.parse_args(&get("/bubble?foo%3C=bar")).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("bar".to_string(), "foo".to_string(), "<=".to_string())]
    );
}

#[test]
fn test_int_type_failure_is_400() {
    let parser = RequestParser::new().argument(Argument::new("foo").arg_type(ArgType::integer()));
    let err = parser.parse_args(&get("/bubble?foo=bar")).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.errors()[0].kind, ArgumentErrorKind::TypeCoercion);
    assert_eq!(
        err.body(),
        json!({"message": "foo: invalid literal for int() with base 10: 'bar'"})
    );
}

#[test]
fn test_url_type() {
    let parser = RequestParser::new().argument(Argument::new("site").arg_type(ArgType::url()));

    let ns = parser
        .parse_args(&get("/links?site=http%3A%2F%2Fexample.com%2F"))
        .unwrap();
    assert_eq!(ns["site"], Value::from("http://example.com/"));

    let err = parser.parse_args(&get("/links?site=example.com")).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.errors()[0].kind, ArgumentErrorKind::TypeCoercion);
    assert_eq!(
        err.body(),
        json!({"message": "site: example.com is not a valid URL. Did you mean: http://example.com"})
    );
}

#[test]
fn test_ignore() {
    let parser = RequestParser::new()
        .argument(Argument::new("foo").arg_type(ArgType::integer()).ignore(true));
    let ns = parser.parse_args(&get("/bubble?foo=bar")).unwrap();
    assert_eq!(ns["foo"], Value::Null);
}

#[test]
fn test_required_message() {
    let parser = RequestParser::new().argument(Argument::new("foo").required(true));
    let err = parser.parse_args(&get("/bubble")).unwrap_err();
    assert_eq!(
        err.body(),
        json!({"message": "Missing required parameter foo in the post body or the query string"})
    );
}

#[test]
fn test_callable_default() {
    let parser = RequestParser::new().argument(Argument::new("foo").default_with(|| Value::from("bar")));
    assert_eq!(parser.parse_args(&get("/bubble")).unwrap()["foo"], Value::from("bar"));
}

#[test]
fn test_store_missing_false() {
    let parser = RequestParser::new().argument(Argument::new("foo").store_missing(false));
    let ns = parser.parse_args(&get("/bubble")).unwrap();
    assert!(!ns.contains_key("foo"));
    assert!(ns.require("foo").is_err());
}

#[test]
fn test_case_insensitive_choices() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .choices(["bat"])
            .case_sensitive(false),
    );
    let ns = parser.parse_args(&get("/bubble?foo=BAT")).unwrap();
    assert_eq!(ns["foo"], Value::from("bat"));
}

#[test]
fn test_file_upload() {
    let file = UploadedFile::new(
        Some("upload".to_string()),
        Some("notes.txt".to_string()),
        Some("text/plain".to_string()),
        Bytes::from_static(b"hello"),
    );
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .file("upload", file.clone())
        .build()
        .unwrap();

    let parser = RequestParser::new().argument(
        Argument::new("upload")
            .location(Location::Files)
            .arg_type(ArgType::file())
            .required(true),
    );
    let ns = parser.parse_args(&ctx).unwrap();
    assert_eq!(ns["upload"].as_file(), Some(&file));

    let err = parser.parse_args(&get("/")).unwrap_err();
    assert_eq!(
        err.body(),
        json!({"message": "Missing required parameter upload in an uploaded file"})
    );
}

#[test]
fn test_int_choices() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .arg_type(ArgType::integer())
            .choices(vec![1, 2, 3])
            .location(Location::Json),
    );
    assert_eq!(
        parser.parse_args(&post_json("/bubble", json!({"foo": 3}))).unwrap()["foo"],
        Value::Int(3)
    );
    let err = parser.parse_args(&post_json("/bubble", json!({"foo": 5}))).unwrap_err();
    assert_eq!(err.body(), json!({"message": "5 is not a valid choice"}));
}

#[test]
fn test_range_choices() {
    let parser = RequestParser::new().argument(
        Argument::new("foo")
            .arg_type(ArgType::integer())
            .choices(0..100)
            .location(Location::Json),
    );
    assert!(parser.parse_args(&post_json("/bubble", json!({"foo": 0}))).is_ok());
    let err = parser.parse_args(&post_json("/bubble", json!({"foo": 101}))).unwrap_err();
    assert_eq!(err.errors()[0].kind, ArgumentErrorKind::InvalidChoice);
}

#[test]
fn test_int_range_type() {
    let parser = RequestParser::new().argument(Argument::new("page").arg_type(ArgType::int_range(1, 10)));
    assert_eq!(parser.parse_args(&get("/?page=10")).unwrap()["page"], Value::Int(10));
    let err = parser.parse_args(&get("/?page=11")).unwrap_err();
    assert!(err.errors()[0].message.starts_with("page: "));
    assert!(err.errors()[0].message.contains("page"));
}

#[test]
fn test_boolean_and_dates() {
    let parser = RequestParser::new()
        .argument(Argument::new("active").arg_type(ArgType::boolean()))
        .argument(Argument::new("day").arg_type(ArgType::date()))
        .argument(Argument::new("at").arg_type(ArgType::datetime_iso8601()));
    let ns = parser
        .parse_args(&post_json(
            "/",
            json!({"active": "true", "day": "2012-01-01", "at": "2012-01-01T23:30:00+02:00"}),
        ))
        .unwrap();
    assert_eq!(ns["active"], Value::Bool(true));
    assert_eq!(ns.to_json()["day"], json!("2012-01-01"));
    assert_eq!(
        ns["at"].as_datetime().map(|dt| dt.to_rfc3339()),
        Some("2012-01-01T21:30:00+00:00".to_string())
    );
}

#[test]
fn test_filter_action() {
    let parser = RequestParser::new().argument(
        Argument::new("age")
            .operators([">=", "<="])
            .action(Action::Filter),
    );
    let ns = parser.parse_args(&get("/people?age%3E=18&age%3C=65")).unwrap();
    let comparisons = ns["age"].as_comparisons().unwrap();
    assert_eq!(comparisons.len(), 2);
    assert_eq!(comparisons[0].operator, ">=");
    assert_eq!(comparisons[0].value, Value::from("18"));
    assert_eq!(comparisons[1].operator, "<=");
}

#[test]
fn test_copy_independence() {
    let parser = RequestParser::new().argument(Argument::new("foo").arg_type(ArgType::integer()));
    let mut copy = parser.copy();
    copy.add_argument("bar");

    assert_eq!(parser.args().len(), 1);
    assert_eq!(copy.args().len(), 2);

    let ns = copy.parse_args(&get("/bubble?foo=101&bar=baz")).unwrap();
    assert_eq!(ns["foo"], Value::Int(101));
    assert_eq!(ns["bar"], Value::from("baz"));
}

#[test]
fn test_replace_argument() {
    let mut parser = RequestParser::new().argument(Argument::new("foo").arg_type(ArgType::integer()));
    let mut copy = parser.copy();
    copy.replace_argument("foo", Argument::new("foo").arg_type(ArgType::string()));

    let ns = copy.parse_args(&get("/bubble?foo=baz")).unwrap();
    assert_eq!(ns["foo"], Value::from("baz"));
    assert!(parser.parse_args(&get("/bubble?foo=baz")).is_err());

    parser.remove_argument("foo");
    assert!(parser.parse_args(&get("/bubble?foo=baz")).unwrap().is_empty());
}

#[test]
fn test_strict_mode() {
    let parser = RequestParser::new().argument("foo");
    let options = ParseOptions::default().strict(true);

    let err = parser
        .parse_args_with(Some(&get("/bubble?foo=baz&bar=1")), options)
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.body(), json!({"message": "Unknown arguments: bar"}));

    let err = parser
        .parse_args_with(Some(&post_json("/bubble", json!({"foo": 1, "bar": 2}))), options)
        .unwrap_err();
    assert!(matches!(err, ParseError::UnrecognizedArguments { .. }));

    let err = parser
        .parse_args_with(Some(&post_form("/bubble", "foo=1&baz=2")), options)
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown arguments: baz");
}

#[test]
fn test_bundle_errors() {
    let parser = RequestParser::new()
        .bundle_errors(true)
        .argument(Argument::new("foo").arg_type(ArgType::integer()))
        .argument(Argument::new("bar").required(true).location(Location::Args))
        .argument(Argument::new("baz").choices(["x"]));
    let err = parser
        .parse_args_with(
            Some(&get("/bubble?foo=a&baz=y")),
            ParseOptions::default().http_error_code(StatusCode::UNPROCESSABLE_ENTITY),
        )
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let names: Vec<&str> = err.errors().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["foo", "bar", "baz"]);

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        body,
        json!({"message": {
            "foo": "foo: invalid literal for int() with base 10: 'a'",
            "bar": "Missing required parameter bar in the query string",
            "baz": "y is not a valid choice",
        }})
    );
}

#[test]
fn test_result_map_hashmap() {
    let parser = RequestParser::<HashMap<String, Value>>::with_result()
        .argument(Argument::new("foo").dest("bar"));
    let map = parser.parse_args(&get("/bubble?foo=baz")).unwrap();
    assert_eq!(map.get("bar"), Some(&Value::from("baz")));
    assert!(!map.contains_key("foo"));
}

#[test]
fn test_namespace_serializes_for_responses() {
    let parser = RequestParser::new()
        .argument(Argument::new("n").arg_type(ArgType::integer()))
        .argument("s");
    let ns: Namespace = parser.parse_args(&get("/?n=3&s=x")).unwrap();
    assert_eq!(serde_json::to_string(&ns).unwrap(), r#"{"n":3,"s":"x"}"#);
}

#[test]
fn test_current_request() {
    let parser = RequestParser::new().argument("foo");

    let err = parser.parse_args_with(None, ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::NoActiveRequest));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let ns = current::scope(get("/bubble?foo=bar"), || {
        parser.parse_args_with(None, ParseOptions::default())
    })
    .unwrap();
    assert_eq!(ns["foo"], Value::from("bar"));
    assert!(!current::is_active());
}

#[test]
fn test_from_http_request() {
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/items?limit=5")
        .header("content-type", "application/json")
        .body(Bytes::from_static(br#"{"name": "widget"}"#))
        .unwrap();
    let ctx = RequestContext::try_from(request).unwrap();

    let parser = RequestParser::new()
        .argument(Argument::new("name").required(true))
        .argument(Argument::new("limit").arg_type(ArgType::positive()));
    let ns = parser.parse_args(&ctx).unwrap();
    assert_eq!(ns["name"], Value::from("widget"));
    assert_eq!(ns["limit"], Value::Int(5));
}

proptest! {
    #[test]
    fn prop_integer_query_values_parse(n in any::<i64>()) {
        let parser = RequestParser::new().argument(Argument::new("n").arg_type(ArgType::integer()));
        let ns = parser.parse_args(&get(&format!("/?n={n}"))).unwrap();
        prop_assert_eq!(&ns["n"], &Value::Int(n));
    }

    #[test]
    fn prop_choices_accept_only_members(word in "[a-z]{1,8}") {
        let parser = RequestParser::new().argument(Argument::new("w").choices(["alpha", "beta"]));
        let result = parser.parse_args(&get(&format!("/?w={word}")));
        prop_assert_eq!(result.is_ok(), word == "alpha" || word == "beta");
    }
}
