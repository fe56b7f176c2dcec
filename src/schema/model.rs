//! Built schema and its entry points for execution.

use std::{any::TypeId, fmt, ops::Deref, sync::Arc};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use static_assertions::assert_impl_all;
use tokio::time;
use tracing::warn;

use crate::{
    GraphQLError,
    ast::Document,
    config::SchemaConfiguration,
    executor::{BlockingPool, Context, ExecutionError, Variables, execute_validated_query},
    parser::parse_document,
    schema::{
        builder::SchemaBuilder,
        meta::{EnumType, InputObjectType, ObjectType, Property, TypeNode, UnionType},
        scalar::ScalarType,
    },
    value::Value,
};

/// Immutable type graph of a schema.
///
/// Types are reachable by name, and by the identity of the Rust type backing
/// them.
#[derive(Debug)]
pub struct SchemaType {
    types: IndexMap<ArcStr, TypeNode>,
    output_ids: FnvHashMap<TypeId, ArcStr>,
    input_ids: FnvHashMap<TypeId, ArcStr>,
    scalar_ids: FnvHashMap<TypeId, ArcStr>,
    query_type_name: ArcStr,
    mutation_type_name: Option<ArcStr>,
}

impl SchemaType {
    pub(crate) fn new(
        types: IndexMap<ArcStr, TypeNode>,
        output_ids: FnvHashMap<TypeId, ArcStr>,
        input_ids: FnvHashMap<TypeId, ArcStr>,
        scalar_ids: FnvHashMap<TypeId, ArcStr>,
        query_type_name: ArcStr,
        mutation_type_name: Option<ArcStr>,
    ) -> Self {
        Self {
            types,
            output_ids,
            input_ids,
            scalar_ids,
            query_type_name,
            mutation_type_name,
        }
    }

    /// All types, in registration order.
    pub fn types(&self) -> &IndexMap<ArcStr, TypeNode> {
        &self.types
    }

    /// Gets a type by its name.
    pub fn type_by_name(&self, name: &str) -> Option<&TypeNode> {
        self.types.get(name)
    }

    /// Gets the root type of queries.
    pub fn query_type(&self) -> Option<&ObjectType> {
        self.type_by_name(&self.query_type_name)?.as_object()
    }

    /// Gets the root type of mutations, if any mutation is declared.
    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.type_by_name(self.mutation_type_name.as_deref()?)?
            .as_object()
    }

    /// Gets a root query field.
    pub fn query(&self, name: &str) -> Option<&Property> {
        self.query_type()?.property(name)
    }

    /// Gets a root mutation field.
    pub fn mutation(&self, name: &str) -> Option<&Property> {
        self.mutation_type()?.property(name)
    }

    /// Gets the object type backed by `T`.
    pub fn object_type<T: 'static>(&self) -> Option<&ObjectType> {
        self.object_type_by_id(TypeId::of::<T>())
    }

    /// Gets the object type backed by the Rust type with the given id.
    pub fn object_type_by_id(&self, id: TypeId) -> Option<&ObjectType> {
        self.type_by_name(self.output_ids.get(&id)?)?.as_object()
    }

    /// Gets the enum type backed by `T`.
    pub fn enum_type<T: 'static>(&self) -> Option<&EnumType> {
        self.type_by_name(self.output_ids.get(&TypeId::of::<T>())?)?
            .as_enum()
    }

    /// Gets the input type backed by `T`, whether it was registered
    /// explicitly or discovered through a resolver argument.
    pub fn input_type<T: 'static>(&self) -> Option<&InputObjectType> {
        self.input_type_by_id(TypeId::of::<T>())
    }

    /// Gets the input type backed by the Rust type with the given id.
    pub fn input_type_by_id(&self, id: TypeId) -> Option<&InputObjectType> {
        self.type_by_name(self.input_ids.get(&id)?)?
            .as_input_object()
    }

    /// Gets a union by its name.
    pub fn union_type(&self, name: &str) -> Option<&UnionType> {
        self.type_by_name(name)?.as_union()
    }

    /// Gets a scalar by its name.
    pub fn scalar(&self, name: &str) -> Option<&ScalarType> {
        self.type_by_name(name)?.as_scalar()
    }

    /// All scalars, built-in ones first.
    pub fn scalars(&self) -> impl Iterator<Item = &ScalarType> {
        self.types.values().filter_map(TypeNode::as_scalar)
    }

    pub(crate) fn scalar_by_type_id(&self, id: TypeId) -> Option<&ScalarType> {
        self.scalar(self.scalar_ids.get(&id)?)
    }
}

/// Built schema, ready to execute queries.
///
/// Cloning a schema is cheap, and clones share the blocking worker bound.
/// The type graph is reachable through [`Deref`] to [`SchemaType`].
#[derive(Clone)]
pub struct Schema(Arc<SchemaInner>);

struct SchemaInner {
    schema: SchemaType,
    configuration: SchemaConfiguration,
    pool: BlockingPool,
}

assert_impl_all!(Schema: Send, Sync);

impl Schema {
    /// Starts declaring a schema.
    pub fn build() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub(crate) fn new(schema: SchemaType, configuration: SchemaConfiguration) -> Self {
        let pool = BlockingPool::new(configuration.blocking_workers_limit());
        Self(Arc::new(SchemaInner {
            schema,
            configuration,
            pool,
        }))
    }

    /// Settings the schema was built with.
    pub fn configuration(&self) -> &SchemaConfiguration {
        &self.0.configuration
    }

    /// Executes an already parsed document.
    ///
    /// # Errors
    ///
    /// If no operation can be selected from the document, its variables
    /// don't fit the schema, or the configured timeout expires. Failures of
    /// single fields are reported next to the data instead.
    pub async fn execute(
        &self,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
        context: &Context,
    ) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        let execution = execute_validated_query(
            document,
            operation_name,
            &self.0.schema,
            &self.0.pool,
            variables,
            context,
        );
        match self.0.configuration.timeout_limit() {
            Some(limit) => time::timeout(limit, execution).await.unwrap_or_else(|_| {
                warn!(timeout = ?limit, "query execution timed out");
                Err(GraphQLError::Timeout(limit))
            }),
            None => execution.await,
        }
    }

    /// Parses `source` and executes it.
    ///
    /// # Errors
    ///
    /// See [`Schema::execute()`]; additionally fails if `source` doesn't
    /// parse.
    pub async fn execute_query(
        &self,
        source: &str,
        operation_name: Option<&str>,
        variables: &Variables,
        context: &Context,
    ) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        let document = parse_document(source)?;
        self.execute(&document, operation_name, variables, context)
            .await
    }

    /// Parses `source` and executes it on a runtime created for this call.
    ///
    /// Use [`Schema::execute_query()`] from async code instead.
    ///
    /// # Errors
    ///
    /// See [`Schema::execute_query()`]; additionally fails with
    /// [`GraphQLError::Runtime`] if called from within an async runtime or
    /// if the runtime can't be created.
    pub fn execute_sync(
        &self,
        source: &str,
        operation_name: Option<&str>,
        variables: &Variables,
        context: &Context,
    ) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(GraphQLError::Runtime(
                "execute_sync was called from within an async runtime".into(),
            ));
        }
        let runtime = self
            .0
            .configuration
            .runtime()
            .map_err(|e| GraphQLError::Runtime(e.to_string()))?;
        let result = runtime.block_on(self.execute_query(source, operation_name, variables, context));
        // Blocking resolvers abandoned by a timeout must not hold up the caller.
        runtime.shutdown_background();
        result
    }
}

impl Deref for Schema {
    type Target = SchemaType;

    fn deref(&self) -> &Self::Target {
        &self.0.schema
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.0.schema.types.len())
            .field("configuration", &self.0.configuration)
            .finish_non_exhaustive()
    }
}
