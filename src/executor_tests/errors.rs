use pretty_assertions::assert_eq;

use crate::{
    Context, ErrorKind, ExecutionError, FieldError, PathSegment, Schema, SourcePosition, Value,
    Variables, graphql_value,
};

#[derive(Clone)]
struct Actor {
    name: String,
}

graphql_object!(Actor { name });

/// Database handle resolvers pick from the [`Context`].
struct Casting {
    names: Vec<&'static str>,
}

fn schema() -> Schema {
    Schema::build()
        .query("ping", |q| q.resolver(|| String::from("pong")))
        .query("fail", |q| {
            q.resolver(|| -> Result<Option<i32>, _> {
                Err(FieldError::new("Not available", graphql_value!({"code": 503})))
            })
        })
        .query("failNonNull", |q| q.resolver(|| Err::<i32, _>("Always fails")))
        .query("maybeActor", |q| {
            q.resolver(|| {
                Some(Actor {
                    name: "Boguś Linda".into(),
                })
            })
        })
        .query("actors", |q| {
            q.resolver(|| {
                vec![
                    Actor {
                        name: "Boguś Linda".into(),
                    },
                    Actor {
                        name: "Jerzy Stuhr".into(),
                    },
                ]
            })
        })
        .query("casting", |q| {
            q.resolver(|ctx: Context| {
                ctx.get::<Casting>()
                    .map(|c| c.names.iter().map(|n| (*n).to_owned()).collect::<Vec<_>>())
                    .ok_or("No casting in context")
            })
        })
        .type_::<Actor>(|t| {
            t.property("broken", |p| {
                p.resolver(|actor: &Actor| -> Result<String, String> {
                    if actor.name.starts_with('J') {
                        Err(format!("{} is unavailable", actor.name))
                    } else {
                        Ok(actor.name.to_uppercase())
                    }
                })
            })
        })
        .build()
        .expect("valid schema")
}

async fn run_query(query: &str) -> (Value, Vec<ExecutionError>) {
    run_query_with(query, &Context::new()).await
}

async fn run_query_with(query: &str, context: &Context) -> (Value, Vec<ExecutionError>) {
    schema()
        .execute_query(query, None, &Variables::new(), context)
        .await
        .expect("Execution failed")
}

#[tokio::test]
async fn nullable_field_error_keeps_siblings() {
    let (result, errs) = run_query("{ ping fail }").await;

    assert_eq!(result, graphql_value!({"ping": "pong", "fail": null}));
    assert_eq!(
        errs,
        [ExecutionError::new(
            SourcePosition::new(0, 7),
            vec![PathSegment::Field("fail".into())],
            FieldError::new("Not available", graphql_value!({"code": 503})),
            ErrorKind::Resolver,
        )],
    );
}

#[tokio::test]
async fn non_null_error_nulls_nearest_nullable_parent() {
    let (result, errs) = run_query("{ ping maybeActor { name broken } }").await;
    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({"ping": "pong", "maybeActor": {"name": "Boguś Linda", "broken": "BOGUŚ LINDA"}}),
    );

    let (result, errs) = run_query("{ ping actors { name broken } }").await;
    assert_eq!(result, graphql_value!(null));
    assert_eq!(
        errs.iter().map(|e| e.path().to_vec()).collect::<Vec<_>>(),
        [vec![
            PathSegment::Field("actors".into()),
            PathSegment::Index(1),
            PathSegment::Field("broken".into()),
        ]],
    );
    assert_eq!(errs[0].error().message(), "Jerzy Stuhr is unavailable");
}

#[tokio::test]
async fn non_null_root_error_nulls_data() {
    let (result, errs) = run_query("{ ping failNonNull }").await;

    assert_eq!(result, graphql_value!(null));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].error().message(), "Always fails");
    assert_eq!(errs[0].kind(), ErrorKind::Resolver);
}

#[tokio::test]
async fn errors_are_sorted_by_location() {
    let (result, errs) = run_query("{ b: fail a: fail ping }").await;

    assert_eq!(result, graphql_value!({"b": null, "a": null, "ping": "pong"}));
    assert_eq!(
        errs.iter().map(|e| e.path().to_vec()).collect::<Vec<_>>(),
        [
            vec![PathSegment::Field("b".into())],
            vec![PathSegment::Field("a".into())],
        ],
    );
}

#[tokio::test]
async fn unknown_field_is_null() {
    let (result, errs) = run_query("{ ping nope maybeActor { age } }").await;

    assert_eq!(
        result,
        graphql_value!({"ping": "pong", "nope": null, "maybeActor": {"age": null}}),
    );
    assert_eq!(
        errs.iter()
            .map(|e| (e.error().message(), e.kind()))
            .collect::<Vec<_>>(),
        [
            ("Unknown field \"nope\" on type \"Query\"", ErrorKind::UnknownField),
            ("Unknown field \"age\" on type \"Actor\"", ErrorKind::UnknownField),
        ],
    );
}

#[tokio::test]
async fn unknown_argument_fails_field() {
    let (result, errs) = run_query("{ ping(loud: true) }").await;

    assert_eq!(result, graphql_value!(null));
    assert_eq!(
        errs.iter()
            .map(|e| (e.error().message(), e.kind()))
            .collect::<Vec<_>>(),
        [(
            "Unknown argument \"loud\" on field \"ping\" of type \"Query\"",
            ErrorKind::UnknownField,
        )],
    );
}

#[tokio::test]
async fn unknown_fragment_is_reported() {
    let (result, errs) = run_query("{ ping ...Missing }").await;

    assert_eq!(result, graphql_value!({"ping": "pong"}));
    assert_eq!(
        errs.iter().map(|e| e.error().message()).collect::<Vec<_>>(),
        ["Unknown fragment \"Missing\""],
    );
}

#[tokio::test]
async fn context_is_injected() {
    let context = Context::new().with(Casting {
        names: vec!["Boguś Linda", "Jerzy Stuhr"],
    });

    let (result, errs) = run_query_with("{ casting }", &context).await;
    assert_eq!(errs, []);
    assert_eq!(
        result,
        graphql_value!({"casting": ["Boguś Linda", "Jerzy Stuhr"]}),
    );

    let (result, errs) = run_query("{ casting }").await;
    assert_eq!(result, graphql_value!(null));
    assert_eq!(errs[0].error().message(), "No casting in context");
}

#[tokio::test]
async fn parse_errors_are_fatal() {
    let err = schema()
        .execute_query("{ ping", None, &Variables::new(), &Context::new())
        .await
        .expect_err("query doesn't parse");

    assert!(matches!(err, crate::GraphQLError::ParseError(_)), "{err}");
}
