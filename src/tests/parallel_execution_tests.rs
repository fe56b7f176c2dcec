use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use serial_test::serial;
use tokio::time;

use super::run_query;
use crate::{Schema, SchemaBuilder, graphql_value};

const FIELDS: i32 = 1000;

const SLEEP: Duration = Duration::from_millis(3);

/// Bound on the wall time of a thousand resolvers that each take a few
/// milliseconds: far below running them one after another.
const WALL_TIME: Duration = Duration::from_millis(1500);

#[derive(Clone)]
struct Parent {
    id: i32,
}

graphql_object!(Parent { id });

#[derive(Clone)]
struct Child {
    id: i32,
}

graphql_object!(Child { id });

/// Delay of a resolver, spread over 1 to 9 milliseconds.
fn delay(id: i32, idx: i32) -> Duration {
    Duration::from_millis(((id * 31 + idx * 17) % 9 + 1) as u64)
}

fn automated_query() -> String {
    let fields: Vec<_> = (0..FIELDS).map(|i| format!("automated_{i}")).collect();
    format!("{{ {} }}", fields.join(" "))
}

fn assert_automated_fields(data: &crate::Value) {
    for i in [0, 1, 500, FIELDS - 1] {
        assert_eq!(
            data.lookup(&format!("automated_{i}")),
            Some(&graphql_value!(i)),
        );
    }
}

#[test]
#[serial]
fn blocking_resolvers_run_in_parallel() {
    let mut builder = Schema::build();
    for i in 0..FIELDS {
        _ = builder.query(format!("automated_{i}"), |q| {
            q.resolver(move || {
                thread::sleep(SLEEP);
                i
            })
        });
    }
    let schema = builder.build().expect("valid schema");

    let start = Instant::now();
    let (data, errors) = run_query(&schema, &automated_query());
    let elapsed = start.elapsed();

    assert!(errors.is_empty(), "{errors:?}");
    assert_automated_fields(&data);
    assert!(elapsed < WALL_TIME, "took {elapsed:?}");
}

#[test]
#[serial]
fn suspending_resolvers_outnumber_blocking_workers() {
    let mut builder = Schema::build();
    for i in 0..FIELDS {
        _ = builder.query(format!("automated_{i}"), |q| {
            q.suspend_resolver(move || async move {
                time::sleep(delay(i, 0)).await;
                i
            })
        });
    }
    let schema = builder
        .configure(|c| c.blocking_workers(4))
        .build()
        .expect("valid schema");

    let start = Instant::now();
    let (data, errors) = run_query(&schema, &automated_query());
    let elapsed = start.elapsed();

    assert!(errors.is_empty(), "{errors:?}");
    assert_automated_fields(&data);
    assert!(elapsed < WALL_TIME, "took {elapsed:?}");
}

fn nested_schema(builder: &mut SchemaBuilder) -> Schema {
    builder
        .query("getAll", |q| {
            q.suspend_resolver(|| async { (0..FIELDS).map(|id| Parent { id }).collect::<Vec<_>>() })
        })
        .type_::<Parent>(|t| {
            t.property("children", |p| {
                p.args(["size"])
                    .suspend_resolver(|parent: Arc<Parent>, size: i32| async move {
                        time::sleep(delay(parent.id, size)).await;
                        (0..size)
                            .map(|idx| Child {
                                id: parent.id * 10 + idx,
                            })
                            .collect::<Vec<_>>()
                    })
            })
        })
        .type_::<Child>(|t| {
            t.property("label", |p| {
                p.resolver(|child: &Child| {
                    thread::sleep(Duration::from_micros(50));
                    format!("child {}", child.id)
                })
            })
        })
        .build()
        .expect("valid schema")
}

#[test]
#[serial]
fn nested_lists_keep_their_order() {
    let schema = nested_schema(&mut Schema::build());

    let (data, errors) = run_query(&schema, "{ getAll { id children(size: 51) { id } } }");

    assert!(errors.is_empty(), "{errors:?}");
    for (path, id) in [
        ("getAll[5]/children[5]/id", 55),
        ("getAll[75]/children[9]/id", 759),
        ("getAll[888]/children[50]/id", 8930),
    ] {
        assert_eq!(data.lookup(path), Some(&graphql_value!(id)), "at {path}");
    }
    assert_eq!(
        data.lookup("getAll[999]/id"),
        Some(&graphql_value!(999)),
    );
}

#[test]
#[serial]
fn mixed_resolvers_share_one_tree() {
    let schema = nested_schema(&mut Schema::build());

    let (data, errors) = run_query(
        &schema,
        "{ getAll { children(size: 3) { id label } } }",
    );

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        data.lookup("getAll[42]/children[2]/label"),
        Some(&graphql_value!("child 422")),
    );
    let parents = data
        .lookup("getAll")
        .and_then(|v| v.as_list_value())
        .expect("getAll is a list");
    assert_eq!(parents.len(), FIELDS as usize);
}
