//! Field resolution units.
//!
//! A [`FieldResolver`] wraps one user-supplied function together with the
//! description of its parameters and its return type. The schema builder
//! accepts plain Rust closures; the traits in this module turn them into
//! resolvers for every supported arity.

use std::{
    any::{Any, type_name},
    future::Future,
    slice,
    sync::Arc,
};

use arcstr::ArcStr;
use futures::future::{BoxFuture, FutureExt as _};
use indexmap::IndexMap;

use crate::{
    ast::InputValue,
    executor::{BlockingPool, Context, ErrorKind, FieldError, FieldResult},
    types::base::{
        Accessor, AnyValue, FieldDescription, InputContext, InputType, Output, OutputType,
        RustType, TypeRef,
    },
};

/// How a [`FieldResolver`] is invoked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolverMode {
    /// Reads a field of the parent value inline.
    Native,
    /// Runs on the bounded blocking worker pool.
    Blocking,
    /// Returns a future awaited by the executor.
    Suspending,
}

/// Declared parameter of a resolver or transformation.
#[derive(Clone, Debug)]
pub enum ParameterKind {
    /// Bound from the query argument of the same position in the declared
    /// argument names.
    Argument(TypeRef),
    /// Injected [`Context`].
    Context,
}

pub(crate) type BoundArgs = Box<dyn Any + Send>;

/// Failure of a single invocation, before it is attached to a response path.
#[derive(Debug)]
#[doc(hidden)]
pub enum InvocationError {
    Binding { argument: ArcStr, error: FieldError },
    Resolver(FieldError),
}

impl InvocationError {
    pub(crate) fn into_parts(self) -> (ErrorKind, FieldError) {
        match self {
            Self::Binding { argument, error } => (
                ErrorKind::ArgumentBinding,
                error.prefixed(&format!("Invalid value for argument \"{argument}\": ")),
            ),
            Self::Resolver(error) => (ErrorKind::Resolver, error),
        }
    }
}

/// Walks the declared argument names while parameters are bound in order.
pub struct ArgumentCursor<'a> {
    names: slice::Iter<'a, ArcStr>,
    provided: &'a IndexMap<&'a str, InputValue>,
    input: InputContext<'a>,
    context: &'a Context,
}

impl<'a> ArgumentCursor<'a> {
    fn next_argument(&mut self) -> Result<(&'a ArcStr, &'a InputValue), InvocationError> {
        static NULL: InputValue = InputValue::Null;

        let name = self.names.next().ok_or_else(|| {
            InvocationError::Resolver("Resolver declares more parameters than argument names".into())
        })?;
        Ok((name, self.provided.get(name.as_str()).unwrap_or(&NULL)))
    }
}

/// Parameter of a resolver function.
///
/// Implemented for every [`InputType`], bound from query arguments, and for
/// [`Context`], which is injected.
pub trait ResolverArg: Sized + Send + 'static {
    #[doc(hidden)]
    fn parameter() -> ParameterKind;

    #[doc(hidden)]
    fn bind(cursor: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError>;
}

impl<T: InputType> ResolverArg for T {
    fn parameter() -> ParameterKind {
        ParameterKind::Argument(T::input_ref())
    }

    fn bind(cursor: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError> {
        let (name, value) = cursor.next_argument()?;
        T::from_input(value, &cursor.input).map_err(|error| InvocationError::Binding {
            argument: name.clone(),
            error,
        })
    }
}

impl ResolverArg for Context {
    fn parameter() -> ParameterKind {
        ParameterKind::Context
    }

    fn bind(cursor: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError> {
        Ok(cursor.context.clone())
    }
}

/// Ordered parameter list of a resolver function.
#[doc(hidden)]
pub trait ArgumentTuple: Sized + Send + 'static {
    fn parameters() -> Vec<ParameterKind>;

    fn bind(cursor: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError>;
}

impl ArgumentTuple for () {
    fn parameters() -> Vec<ParameterKind> {
        vec![]
    }

    fn bind(_: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError> {
        Ok(())
    }
}

/// Value a resolver function may return: any [`OutputType`], or a [`Result`]
/// of one whose error converts into a [`FieldError`].
pub trait IntoResolvable: Send + 'static {
    /// Type of the resolved value.
    type Type: OutputType;

    #[doc(hidden)]
    fn into_resolvable(self) -> FieldResult<Self::Type>;
}

impl<T: OutputType> IntoResolvable for T {
    type Type = T;

    fn into_resolvable(self) -> FieldResult<T> {
        Ok(self)
    }
}

impl<T: OutputType, E: Into<FieldError> + Send + 'static> IntoResolvable for Result<T, E> {
    type Type = T;

    fn into_resolvable(self) -> FieldResult<T> {
        self.map_err(Into::into)
    }
}

type BindFn = dyn Fn(&mut ArgumentCursor<'_>) -> Result<BoundArgs, InvocationError> + Send + Sync;
type BlockingFn = dyn Fn(Option<AnyValue>, BoundArgs) -> FieldResult<Output> + Send + Sync;
type SuspendingFn = dyn Fn(Option<AnyValue>, BoundArgs) -> FieldResult<BoxFuture<'static, FieldResult<Output>>>
    + Send
    + Sync;
type TransformFn = dyn Fn(Output, BoundArgs) -> FieldResult<Output> + Send + Sync;

/// Parameters of a resolver function together with the names of the query
/// arguments they bind.
#[derive(Clone, derive_more::Debug)]
pub(crate) struct Parameters {
    kinds: Vec<ParameterKind>,
    names: Vec<ArcStr>,
    #[debug(skip)]
    bind: Arc<BindFn>,
}

impl Parameters {
    fn of<Args: ArgumentTuple>() -> Self {
        Self {
            kinds: Args::parameters(),
            names: vec![],
            bind: Arc::new(|cursor: &mut ArgumentCursor<'_>| {
                Args::bind(cursor).map(|args| Box::new(args) as BoundArgs)
            }),
        }
    }

    fn argument_count(&self) -> usize {
        self.kinds
            .iter()
            .filter(|k| matches!(k, ParameterKind::Argument(_)))
            .count()
    }

    /// Names the argument parameters, failing with the expected count on a
    /// mismatch.
    fn name_arguments(&mut self, names: Vec<ArcStr>) -> Result<(), usize> {
        let expected = self.argument_count();
        if names.len() != expected {
            return Err(expected);
        }
        self.names = names;
        Ok(())
    }

    fn arguments(&self) -> impl Iterator<Item = (&ArcStr, &TypeRef)> {
        let types = self.kinds.iter().filter_map(|k| match k {
            ParameterKind::Argument(ty) => Some(ty),
            ParameterKind::Context => None,
        });
        self.names.iter().zip(types)
    }

    fn bind(
        &self,
        provided: &IndexMap<&str, InputValue>,
        input: InputContext<'_>,
        context: &Context,
    ) -> Result<BoundArgs, InvocationError> {
        let mut cursor = ArgumentCursor {
            names: self.names.iter(),
            provided,
            input,
            context,
        };
        (self.bind)(&mut cursor)
    }
}

#[derive(Clone)]
enum Invoker {
    Native(Accessor),
    Blocking(Arc<BlockingFn>),
    Suspending(Arc<SuspendingFn>),
}

/// Invocable unit behind a property: its parameters, its return type and the
/// function computing the value.
#[derive(Clone, derive_more::Debug)]
pub struct FieldResolver {
    parameters: Parameters,
    return_type: TypeRef,
    #[debug(skip)]
    invoker: Invoker,
}

impl FieldResolver {
    fn new<Args: ArgumentTuple>(return_type: TypeRef, invoker: Invoker) -> Self {
        Self {
            parameters: Parameters::of::<Args>(),
            return_type,
            invoker,
        }
    }

    /// Resolver reading a field of the parent value.
    pub(crate) fn native(field: &FieldDescription) -> Self {
        Self::new::<()>(field.type_ref().clone(), Invoker::Native(field.accessor()))
    }

    /// How the resolver is invoked.
    pub fn mode(&self) -> ResolverMode {
        match self.invoker {
            Invoker::Native(_) => ResolverMode::Native,
            Invoker::Blocking(_) => ResolverMode::Blocking,
            Invoker::Suspending(_) => ResolverMode::Suspending,
        }
    }

    /// Description of the resolved value's type.
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterKind] {
        &self.parameters.kinds
    }

    /// Number of parameters bound from query arguments.
    pub fn argument_count(&self) -> usize {
        self.parameters.argument_count()
    }

    pub(crate) fn arguments(&self) -> impl Iterator<Item = (&ArcStr, &TypeRef)> {
        self.parameters.arguments()
    }

    pub(crate) fn name_arguments(&mut self, names: Vec<ArcStr>) -> Result<(), usize> {
        self.parameters.name_arguments(names)
    }

    /// Binds the arguments and invokes the function.
    ///
    /// Binding completes before the function is called, so argument failures
    /// never reach user code.
    pub(crate) async fn resolve(
        &self,
        parent: Option<&AnyValue>,
        provided: &IndexMap<&str, InputValue>,
        input: InputContext<'_>,
        context: &Context,
        pool: &BlockingPool,
    ) -> Result<Output, InvocationError> {
        let args = self.parameters.bind(provided, input, context)?;
        let result = match &self.invoker {
            Invoker::Native(get) => match parent {
                Some(parent) => get(&**parent),
                None => Err(missing_receiver()),
            },
            Invoker::Blocking(f) => {
                let f = f.clone();
                let parent = parent.cloned();
                pool.run(move || f(parent, args)).await
            }
            Invoker::Suspending(f) => match f(parent.cloned(), args) {
                Ok(fut) => fut.await,
                Err(e) => Err(e),
            },
        };
        result.map_err(InvocationError::Resolver)
    }
}

/// Post-resolution mapping of a property value.
#[derive(Clone, derive_more::Debug)]
pub struct Transformation {
    value_type: RustType,
    parameters: Parameters,
    #[debug(skip)]
    apply: Arc<TransformFn>,
}

impl Transformation {
    /// Rust type of the value being transformed.
    pub fn value_type(&self) -> RustType {
        self.value_type
    }

    /// Parameters in declaration order, the transformed value excluded.
    pub fn parameters(&self) -> &[ParameterKind] {
        &self.parameters.kinds
    }

    pub(crate) fn arguments(&self) -> impl Iterator<Item = (&ArcStr, &TypeRef)> {
        self.parameters.arguments()
    }

    pub(crate) fn name_arguments(&mut self, names: Vec<ArcStr>) -> Result<(), usize> {
        self.parameters.name_arguments(names)
    }

    pub(crate) fn transform(
        &self,
        output: Output,
        provided: &IndexMap<&str, InputValue>,
        input: InputContext<'_>,
        context: &Context,
    ) -> Result<Output, InvocationError> {
        let args = self.parameters.bind(provided, input, context)?;
        (self.apply)(output, args).map_err(InvocationError::Resolver)
    }
}

/// Blocking function resolving a root field.
pub trait BlockingResolver<Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_resolver(self) -> FieldResolver;
}

/// Future-returning function resolving a root field.
pub trait SuspendingResolver<Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_resolver(self) -> FieldResolver;
}

/// Blocking function resolving a property of `P`, receiving `&P` first.
pub trait BlockingPropertyResolver<P, Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_resolver(self) -> FieldResolver;
}

/// Future-returning function resolving a property of `P`, receiving
/// `Arc<P>` first.
pub trait SuspendingPropertyResolver<P, Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_resolver(self) -> FieldResolver;
}

/// Function mapping a property value of type `V` to a new value of the same
/// type.
pub trait TransformationFn<V, Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_transformation(self) -> Transformation;
}

fn unpack<T: 'static>(args: BoundArgs) -> FieldResult<T> {
    args.downcast::<T>()
        .map(|args| *args)
        .map_err(|_| FieldError::from("Bound arguments don't match the resolver signature"))
}

fn missing_receiver() -> FieldError {
    FieldError::from("Property resolver invoked without a parent value")
}

fn receiver<P: Send + Sync + 'static>(parent: Option<AnyValue>) -> FieldResult<Arc<P>> {
    parent
        .ok_or_else(missing_receiver)?
        .downcast::<P>()
        .map_err(|_| FieldError::from(format!("Expected a parent value of type {}", type_name::<P>())))
}

macro_rules! impl_argument_tuple {
    ($($arg:ident),+) => {
        impl<$($arg: ResolverArg),+> ArgumentTuple for ($($arg,)+) {
            fn parameters() -> Vec<ParameterKind> {
                vec![$(<$arg as ResolverArg>::parameter()),+]
            }

            fn bind(cursor: &mut ArgumentCursor<'_>) -> Result<Self, InvocationError> {
                Ok(($(<$arg as ResolverArg>::bind(cursor)?,)+))
            }
        }
    };
}

macro_rules! impl_resolvers {
    ($($arg:ident $var:ident),*) => {
        impl<F, R, $($arg),*> BlockingResolver<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoResolvable,
            $($arg: ResolverArg,)*
        {
            fn into_resolver(self) -> FieldResolver {
                let f = self;
                FieldResolver::new::<($($arg,)*)>(
                    <R::Type as OutputType>::type_ref(),
                    Invoker::Blocking(Arc::new(move |_: Option<AnyValue>, args: BoundArgs| {
                        let ($($var,)*) = unpack::<($($arg,)*)>(args)?;
                        f($($var),*).into_resolvable().map(OutputType::into_output)
                    })),
                )
            }
        }

        impl<F, Fut, R, $($arg),*> SuspendingResolver<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoResolvable,
            $($arg: ResolverArg,)*
        {
            fn into_resolver(self) -> FieldResolver {
                let f = self;
                FieldResolver::new::<($($arg,)*)>(
                    <R::Type as OutputType>::type_ref(),
                    Invoker::Suspending(Arc::new(move |_: Option<AnyValue>, args: BoundArgs| {
                        let ($($var,)*) = unpack::<($($arg,)*)>(args)?;
                        let fut = f($($var),*);
                        Ok(async move {
                            fut.await.into_resolvable().map(OutputType::into_output)
                        }
                        .boxed())
                    })),
                )
            }
        }

        impl<F, P, R, $($arg),*> BlockingPropertyResolver<P, ($($arg,)*), R> for F
        where
            F: Fn(&P $(, $arg)*) -> R + Send + Sync + 'static,
            P: Send + Sync + 'static,
            R: IntoResolvable,
            $($arg: ResolverArg,)*
        {
            fn into_resolver(self) -> FieldResolver {
                let f = self;
                FieldResolver::new::<($($arg,)*)>(
                    <R::Type as OutputType>::type_ref(),
                    Invoker::Blocking(Arc::new(move |parent: Option<AnyValue>, args: BoundArgs| {
                        let parent = receiver::<P>(parent)?;
                        let ($($var,)*) = unpack::<($($arg,)*)>(args)?;
                        f(&*parent $(, $var)*).into_resolvable().map(OutputType::into_output)
                    })),
                )
            }
        }

        impl<F, Fut, P, R, $($arg),*> SuspendingPropertyResolver<P, ($($arg,)*), R> for F
        where
            F: Fn(Arc<P> $(, $arg)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            P: Send + Sync + 'static,
            R: IntoResolvable,
            $($arg: ResolverArg,)*
        {
            fn into_resolver(self) -> FieldResolver {
                let f = self;
                FieldResolver::new::<($($arg,)*)>(
                    <R::Type as OutputType>::type_ref(),
                    Invoker::Suspending(Arc::new(move |parent: Option<AnyValue>, args: BoundArgs| {
                        let parent = receiver::<P>(parent)?;
                        let ($($var,)*) = unpack::<($($arg,)*)>(args)?;
                        let fut = f(parent $(, $var)*);
                        Ok(async move {
                            fut.await.into_resolvable().map(OutputType::into_output)
                        }
                        .boxed())
                    })),
                )
            }
        }

        impl<F, V, R, $($arg),*> TransformationFn<V, ($($arg,)*), R> for F
        where
            F: Fn(V $(, $arg)*) -> R + Send + Sync + 'static,
            V: OutputType,
            R: IntoResolvable<Type = V>,
            $($arg: ResolverArg,)*
        {
            fn into_transformation(self) -> Transformation {
                let f = self;
                Transformation {
                    value_type: V::type_ref().rust(),
                    parameters: Parameters::of::<($($arg,)*)>(),
                    apply: Arc::new(move |output: Output, args: BoundArgs| {
                        let value = V::from_output(output).ok_or_else(|| {
                            FieldError::from(format!("Expected a value of type {}", type_name::<V>()))
                        })?;
                        let ($($var,)*) = unpack::<($($arg,)*)>(args)?;
                        f(value $(, $var)*).into_resolvable().map(OutputType::into_output)
                    }),
                }
            }
        }
    };
}

impl_argument_tuple!(A1);
impl_argument_tuple!(A1, A2);
impl_argument_tuple!(A1, A2, A3);
impl_argument_tuple!(A1, A2, A3, A4);
impl_argument_tuple!(A1, A2, A3, A4, A5);
impl_argument_tuple!(A1, A2, A3, A4, A5, A6);

impl_resolvers!();
impl_resolvers!(A1 a1);
impl_resolvers!(A1 a1, A2 a2);
impl_resolvers!(A1 a1, A2 a2, A3 a3);
impl_resolvers!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_resolvers!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_resolvers!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
