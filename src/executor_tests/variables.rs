use pretty_assertions::assert_eq;

use crate::{
    Context, ExecutionError, GraphQLError, InputValue, OperationType, Schema, Value, Variables,
    graphql_value,
};

#[derive(Debug)]
struct TestInputObject {
    a: Option<String>,
    b: Option<Vec<Option<String>>>,
    c: String,
}

graphql_input_object!(TestInputObject { a, b, c });

#[derive(Debug)]
struct TestNestedInputObject {
    na: TestInputObject,
    nb: String,
}

graphql_input_object!(TestNestedInputObject { na, nb });

fn schema() -> Schema {
    Schema::build()
        .query("fieldWithObjectInput", |q| {
            q.args(["input"])
                .resolver(|input: Option<TestInputObject>| format!("{input:?}"))
        })
        .query("fieldWithNullableStringInput", |q| {
            q.args(["input"])
                .resolver(|input: Option<String>| format!("{input:?}"))
        })
        .query("fieldWithNonNullableStringInput", |q| {
            q.args(["input"]).resolver(|input: String| format!("{input:?}"))
        })
        .query("fieldWithNestedObjectInput", |q| {
            q.args(["input"])
                .resolver(|input: TestNestedInputObject| format!("{input:?}"))
        })
        .query("list", |q| {
            q.args(["input"]).resolver(|input: Vec<i32>| input.iter().sum::<i32>())
        })
        .build()
        .expect("valid schema")
}

async fn run_variable_query(query: &str, vars: Variables) -> (Value, Vec<ExecutionError>) {
    schema()
        .execute_query(query, None, &vars, &Context::new())
        .await
        .expect("Execution failed")
}

async fn run_query(query: &str) -> (Value, Vec<ExecutionError>) {
    run_variable_query(query, Variables::new()).await
}

#[tokio::test]
async fn inline_complex_input() {
    let (result, errs) = run_query(
        r#"{ fieldWithObjectInput(input: {a: "foo", b: ["bar"], c: "baz"}) }"#,
    )
    .await;

    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({
            "fieldWithObjectInput": r#"Some(TestInputObject { a: Some("foo"), b: Some([Some("bar")]), c: "baz" })"#,
        }),
    );
}

#[tokio::test]
async fn single_value_coerces_into_list() {
    let (result, errs) = run_query(
        r#"{ fieldWithObjectInput(input: {b: "bar", c: "baz"}) list(input: 4) }"#,
    )
    .await;

    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({
            "fieldWithObjectInput": r#"Some(TestInputObject { a: None, b: Some([Some("bar")]), c: "baz" })"#,
            "list": 4,
        }),
    );
}

#[tokio::test]
async fn variable_complex_input() {
    let mut vars = Variables::new();
    _ = vars.insert(
        "input".into(),
        InputValue::object([
            ("a", InputValue::scalar("foo")),
            ("b", InputValue::list(vec![InputValue::scalar("bar")])),
            ("c", InputValue::scalar("baz")),
        ]),
    );

    let (result, errs) = run_variable_query(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        vars,
    )
    .await;

    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({
            "fieldWithObjectInput": r#"Some(TestInputObject { a: Some("foo"), b: Some([Some("bar")]), c: "baz" })"#,
        }),
    );
}

#[tokio::test]
async fn variable_default_applies() {
    let (result, errs) = run_query(
        r#"query q($value: String = "Default value") {
            fieldWithNullableStringInput(input: $value)
        }"#,
    )
    .await;

    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({"fieldWithNullableStringInput": r#"Some("Default value")"#}),
    );
}

#[tokio::test]
async fn undefined_variable_is_null() {
    let (result, errs) = run_query("{ fieldWithNullableStringInput(input: $missing) }").await;

    assert_eq!(errs, []);
    assert_eq!(result, graphql_value!({"fieldWithNullableStringInput": "None"}));
}

#[tokio::test]
async fn missing_nested_field_fails_binding() {
    let (result, errs) = run_query(
        r#"{ fieldWithNestedObjectInput(input: {na: {a: "foo"}, nb: "bar"}) }"#,
    )
    .await;

    assert_eq!(result, graphql_value!(null));
    assert_eq!(
        errs.iter().map(|e| e.error().message()).collect::<Vec<_>>(),
        [
            "Invalid value for argument \"input\": In field \"na\": \
             In field \"c\": Expected \"String\", found null",
        ],
    );
    assert_eq!(errs[0].kind(), crate::ErrorKind::ArgumentBinding);
}

#[tokio::test]
async fn inline_unknown_field_fails_binding() {
    let (result, errs) = run_query(
        r#"{ fieldWithNestedObjectInput(input: {na: {c: "baz", bogus: 42}, nb: "bar"}) }"#,
    )
    .await;

    assert_eq!(result, graphql_value!(null));
    assert_eq!(
        errs.iter().map(|e| e.error().message()).collect::<Vec<_>>(),
        [
            "Invalid value for argument \"input\": In field \"na\": \
             Unknown field \"bogus\" on input type \"TestInputObject\"",
        ],
    );
    assert_eq!(errs[0].kind(), crate::ErrorKind::ArgumentBinding);
}

#[tokio::test]
async fn variable_unknown_field_fails_binding() {
    let vars: Variables =
        serde_json::from_str(r#"{"input": {"c": "baz", "extra": [1, 2]}}"#).expect("valid JSON");

    let (result, errs) = run_variable_query(
        "query q($input: TestInputObject) { fieldWithObjectInput(input: $input) }",
        vars,
    )
    .await;

    assert_eq!(result, graphql_value!(null));
    assert_eq!(
        errs.iter().map(|e| e.error().message()).collect::<Vec<_>>(),
        ["Invalid value for argument \"input\": Unknown field \"extra\" on input type \"TestInputObject\""],
    );
}

#[tokio::test]
async fn null_for_non_nullable_argument_fails_binding() {
    let (_, errs) = run_query("{ fieldWithNonNullableStringInput }").await;

    assert_eq!(
        errs.iter().map(|e| e.error().message()).collect::<Vec<_>>(),
        ["Invalid value for argument \"input\": Expected \"String\", found null"],
    );
}

#[tokio::test]
async fn variable_type_must_exist() {
    let err = schema()
        .execute_query(
            "query q($input: NoSuchType) { fieldWithObjectInput(input: $input) }",
            None,
            &Variables::new(),
            &Context::new(),
        )
        .await
        .expect_err("unknown variable type");

    assert_eq!(
        err,
        GraphQLError::UnknownVariableType {
            variable: "input".into(),
            type_name: "NoSuchType".into(),
        },
    );
}

#[tokio::test]
async fn operation_is_picked_by_name() {
    let source = r#"
        query first { fieldWithNullableStringInput(input: "one") }
        query second { fieldWithNullableStringInput(input: "two") }
    "#;
    let schema = schema();

    let (result, _) = schema
        .execute_query(source, Some("second"), &Variables::new(), &Context::new())
        .await
        .expect("Execution failed");
    assert_eq!(
        result,
        graphql_value!({"fieldWithNullableStringInput": r#"Some("two")"#}),
    );

    let err = schema
        .execute_query(source, None, &Variables::new(), &Context::new())
        .await
        .expect_err("ambiguous operation");
    assert_eq!(err, GraphQLError::MultipleOperationsProvided);

    let err = schema
        .execute_query(source, Some("third"), &Variables::new(), &Context::new())
        .await
        .expect_err("unknown operation");
    assert_eq!(err, GraphQLError::UnknownOperationName);

    let err = schema
        .execute_query("fragment F on Query { list }", None, &Variables::new(), &Context::new())
        .await
        .expect_err("no operation");
    assert_eq!(err, GraphQLError::NoOperationProvided);

    let err = schema
        .execute_query("mutation { list }", None, &Variables::new(), &Context::new())
        .await
        .expect_err("no mutation root");
    assert_eq!(err, GraphQLError::UnsupportedOperation(OperationType::Mutation));
}
