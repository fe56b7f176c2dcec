use crate::{
    Context, Object, Schema, Variables, graphql_value, value::Value,
};

#[derive(Clone)]
struct Film {
    title: String,
    year: i32,
}

graphql_object!(Film { title, year });

fn schema() -> Schema {
    Schema::build()
        .query("a", |q| q.resolver(|| String::from("a")))
        .query("b", |q| q.resolver(|| String::from("b")))
        .query("film", |q| {
            q.resolver(|| Film {
                title: "Psy".into(),
                year: 1992,
            })
        })
        .build()
        .expect("valid schema")
}

async fn run_variable_query<F>(query: &str, vars: Variables, f: F)
where
    F: Fn(&Object),
{
    let (result, errs) = schema()
        .execute_query(query, None, &vars, &Context::new())
        .await
        .expect("Execution failed");

    assert_eq!(errs, []);

    let obj = result.as_object_value().expect("Result is not an object");

    f(obj);
}

async fn run_query<F>(query: &str, f: F)
where
    F: Fn(&Object),
{
    run_variable_query(query, Variables::new(), f).await;
}

#[tokio::test]
async fn scalar_include_true() {
    run_query("{ a, b @include(if: true) }", |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), Some(&graphql_value!("b")));
    })
    .await;
}

#[tokio::test]
async fn scalar_include_false() {
    run_query("{ a, b @include(if: false) }", |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), None);
    })
    .await;
}

#[tokio::test]
async fn scalar_skip_true() {
    run_query("{ a, b @skip(if: true) }", |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), None);
    })
    .await;
}

#[tokio::test]
async fn skip_by_variable() {
    let mut vars = Variables::new();
    _ = vars.insert("hide".into(), crate::InputValue::scalar(true));

    run_variable_query("query($hide: Boolean!) { a, b @skip(if: $hide) }", vars, |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), None);
    })
    .await;
}

#[tokio::test]
async fn fragment_spread_skip_true() {
    run_query("{ a, ...Frag @skip(if: true) } fragment Frag on Query { b }", |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), None);
    })
    .await;
}

#[tokio::test]
async fn inline_fragment_include_false() {
    run_query("{ a, ... on Query @include(if: false) { b } }", |result| {
        assert_eq!(result.get_field_value("a"), Some(&graphql_value!("a")));
        assert_eq!(result.get_field_value("b"), None);
    })
    .await;
}

#[tokio::test]
async fn fragments_merge_into_one_object() {
    run_query(
        "{ film { ...Title year } ...Root }
         fragment Title on Film { title }
         fragment Root on Query { b }",
        |result| {
            assert_eq!(
                result.get_field_value("film"),
                Some(&graphql_value!({"title": "Psy", "year": 1992})),
            );
            assert_eq!(result.get_field_value("b"), Some(&graphql_value!("b")));
        },
    )
    .await;
}

#[tokio::test]
async fn fragment_for_another_type_is_ignored() {
    run_query(
        "{ film { ...OnQuery title } } fragment OnQuery on Query { a }",
        |result| {
            assert_eq!(
                result.get_field_value("film"),
                Some(&graphql_value!({"title": "Psy"})),
            );
        },
    )
    .await;
}

#[tokio::test]
async fn aliases_and_typename() {
    run_query("{ first: a, second: a, film { __typename name: title } }", |result| {
        assert_eq!(
            Value::object(result.clone()),
            graphql_value!({
                "first": "a",
                "second": "a",
                "film": {"__typename": "Film", "name": "Psy"},
            }),
        );
    })
    .await;
}
