// Runnable interface definition - core concept of the framework
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::RelayError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Runnable interface definition
pub trait Runnable<I: Send + 'static, O: Send + 'static>: Send + Sync {
    // Core async call method (main entry point)
    fn invoke(&self, input: I) -> BoxFuture<'_, Result<O, RelayError>>;

    // Name reported to callbacks
    fn name(&self) -> &str {
        "runnable"
    }
}

// Runnable extension trait
pub trait RunnableExt<I: Send + 'static, O: Send + 'static>: Runnable<I, O> + Sized {
    fn pipe<N, R>(self, next: R) -> Pipe<Self, R, O>
    where
        N: Send + 'static,
        R: Runnable<O, N>,
    {
        pipe(self, next)
    }

    fn boxed(self) -> RunnableSequence<I, O>
    where
        Self: 'static,
    {
        RunnableSequence::new(self)
    }
}

impl<T, I, O> RunnableExt<I, O> for T
where
    T: Runnable<I, O> + Sized,
    I: Send + 'static,
    O: Send + 'static,
{
}

// Two runnables executed in sequence, the output of `first` feeding `second`
pub struct Pipe<A, B, M> {
    first: A,
    second: B,
    _intermediate: PhantomData<fn() -> M>,
}

// Utility function: create a pipeline connecting two Runnables
pub fn pipe<A, B, M>(first: A, second: B) -> Pipe<A, B, M> {
    Pipe {
        first,
        second,
        _intermediate: PhantomData,
    }
}

impl<I, M, O, A, B> Runnable<I, O> for Pipe<A, B, M>
where
    I: Send + 'static,
    M: Send + 'static,
    O: Send + 'static,
    A: Runnable<I, M>,
    B: Runnable<M, O>,
{
    fn invoke(&self, input: I) -> BoxFuture<'_, Result<O, RelayError>> {
        Box::pin(async move {
            let intermediate = self.first.invoke(input).await?;
            self.second.invoke(intermediate).await
        })
    }

    fn name(&self) -> &str {
        self.first.name()
    }
}

// Type-erased chain, used where heterogeneous chains share one slot
pub struct RunnableSequence<I, O> {
    inner: Box<dyn Runnable<I, O>>,
}

impl<I: Send + 'static, O: Send + 'static> RunnableSequence<I, O> {
    pub fn new(runnable: impl Runnable<I, O> + 'static) -> Self {
        Self {
            inner: Box::new(runnable),
        }
    }
}

impl<I: Send + 'static, O: Send + 'static> Runnable<I, O> for RunnableSequence<I, O> {
    fn invoke(&self, input: I) -> BoxFuture<'_, Result<O, RelayError>> {
        self.inner.invoke(input)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<I, O, T> Runnable<I, O> for Arc<T>
where
    I: Send + 'static,
    O: Send + 'static,
    T: Runnable<I, O> + ?Sized,
{
    fn invoke(&self, input: I) -> BoxFuture<'_, Result<O, RelayError>> {
        (**self).invoke(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// Adapter turning a plain closure into a Runnable
pub struct RunnableLambda<F> {
    name: String,
    func: F,
}

impl<F> RunnableLambda<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<I, O, F> Runnable<I, O> for RunnableLambda<F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Result<O, RelayError> + Send + Sync,
{
    fn invoke(&self, input: I) -> BoxFuture<'_, Result<O, RelayError>> {
        let result = (self.func)(input);
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
