use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use serial_test::serial;
use tokio::time;

use crate::{Context, GraphQLError, GraphQLResponse, Schema, Variables, graphql_value};

/// Order in which resolvers finished.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn record(&self, entry: &'static str) -> i32 {
        let mut entries = self.0.lock().expect("journal lock");
        entries.push(entry);
        entries.len() as i32
    }

    fn entries(&self) -> Vec<&'static str> {
        self.0.lock().expect("journal lock").clone()
    }
}

fn slow_then_fast(builder: &mut crate::SchemaBuilder) -> &mut crate::SchemaBuilder {
    builder
        .query("slow", |q| {
            q.suspend_resolver(|ctx: Context| async move {
                time::sleep(Duration::from_millis(30)).await;
                ctx.get::<Journal>().map_or(0, |j| j.record("slow"))
            })
        })
        .query("fast", |q| {
            q.resolver(|ctx: Context| ctx.get::<Journal>().map_or(0, |j| j.record("fast")))
        })
}

fn schema() -> Schema {
    let mut builder = Schema::build();
    _ = slow_then_fast(&mut builder);
    builder
        .mutation("slow", |m| {
            m.suspend_resolver(|ctx: Context| async move {
                time::sleep(Duration::from_millis(30)).await;
                ctx.get::<Journal>().map_or(0, |j| j.record("slow"))
            })
        })
        .mutation("fast", |m| {
            m.resolver(|ctx: Context| ctx.get::<Journal>().map_or(0, |j| j.record("fast")))
        })
        .build()
        .expect("valid schema")
}

#[tokio::test(flavor = "multi_thread")]
async fn mutation_fields_run_one_after_another() {
    let journal = Journal::default();
    let context = Context::new().with(journal.clone());

    let (result, errs) = schema()
        .execute_query("mutation { slow fast }", None, &Variables::new(), &context)
        .await
        .expect("Execution failed");

    assert_eq!(errs, []);
    assert_eq!(result, graphql_value!({"slow": 1, "fast": 2}));
    assert_eq!(journal.entries(), ["slow", "fast"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn query_fields_run_concurrently() {
    let journal = Journal::default();
    let context = Context::new().with(journal.clone());

    let (result, errs) = schema()
        .execute_query("{ slow fast }", None, &Variables::new(), &context)
        .await
        .expect("Execution failed");

    assert_eq!(errs, []);
    assert_eq!(result, graphql_value!({"slow": 2, "fast": 1}));
    assert_eq!(journal.entries(), ["fast", "slow"]);
}

#[tokio::test]
async fn timeout_abandons_execution() {
    let schema = Schema::build()
        .query("never", |q| {
            q.suspend_resolver(|| async {
                time::sleep(Duration::from_secs(60)).await;
                true
            })
        })
        .configure(|c| c.timeout(Duration::from_millis(20)))
        .build()
        .expect("valid schema");

    let err = schema
        .execute_query("{ never }", None, &Variables::new(), &Context::new())
        .await
        .expect_err("execution must time out");

    assert_eq!(err, GraphQLError::Timeout(Duration::from_millis(20)));
    assert_eq!(
        serde_json::to_value(GraphQLResponse::from_result(Err(err))).expect("serializes"),
        serde_json::json!({"errors": [{"message": "Execution timed out after 20ms"}]}),
    );
}

#[test]
#[serial]
fn timeout_does_not_wait_for_blocking_resolvers() {
    let schema = Schema::build()
        .query("stuck", |q| {
            q.resolver(|| {
                thread::sleep(Duration::from_secs(2));
                true
            })
        })
        .configure(|c| c.timeout(Duration::from_millis(20)).worker_threads(2))
        .build()
        .expect("valid schema");

    let start = std::time::Instant::now();
    let result = schema.execute_sync("{ stuck }", None, &Variables::new(), &Context::new());

    assert_eq!(result, Err(GraphQLError::Timeout(Duration::from_millis(20))));
    assert!(start.elapsed() < Duration::from_secs(1), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn sync_execution_inside_runtime_fails() {
    let err = schema()
        .execute_sync("{ fast }", None, &Variables::new(), &Context::new())
        .expect_err("nested runtime");

    assert!(matches!(err, GraphQLError::Runtime(_)), "{err:?}");
    assert_eq!(
        err.to_string(),
        "Failed to start execution runtime: execute_sync was called from within an async runtime",
    );
}
