//! Work trait and type erasure.
//!
//! # How caller-supplied work is stored
//!
//! A [`Processor`](crate::Processor) needs to hold *some* async function
//! `Input -> Result<Output, E>` without naming its concrete type, so the
//! controller is generic over inputs and outputs but not over the function
//! itself. We use a trait object (`dyn ErasedWork`) to hide the concrete
//! type behind a common interface.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn lookup(term: String) -> Result<Page, ApiError> { … }  ← user writes this
//!        ↓ Processor::new(lookup)
//! lookup.into_boxed_work()                                       ← Work blanket impl
//!        ↓
//! Arc::new(FnWork(lookup))                                       ← heap-allocated wrapper
//!        ↓  stored as BoxedWork = Arc<dyn ErasedWork>
//! work.call(input)  once per attempt                             ← one vtable dispatch
//!        ↓
//! Box::pin(async { lookup(input).await.map_err(boxed) })         ← WorkFuture
//! ```
//!
//! The error type is erased alongside the function: whatever `E` the work
//! produces is boxed into an opaque `dyn Error`, which the controller wraps
//! into [`ProcessError::Work`](crate::ProcessError::Work). The controller
//! never inspects a failure — it only counts it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Opaque failure produced by a work function.
pub(crate) type WorkError = Box<dyn std::error::Error + Send + Sync>;

/// A heap-allocated, type-erased attempt future.
///
/// `Pin<Box<…>>` because the runtime polls the future in-place; `Send` so
/// the driver task can migrate across worker threads.
pub(crate) type WorkFuture<O> = Pin<Box<dyn Future<Output = Result<O, WorkError>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Work` trait's `into_boxed_work` method.
/// External crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedWork<I, O>: Send + Sync {
    fn call(&self, input: I) -> WorkFuture<O>;
}

/// A heap-allocated, type-erased work function.
///
/// `Arc` because retries call the same function again and the driver task
/// needs its own handle to it.
#[doc(hidden)]
pub type BoxedWork<I, O> = Arc<dyn ErasedWork<I, O> + 'static>;

// ── Public Work trait ─────────────────────────────────────────────────────────

/// Implemented for every valid processor function.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(input: I) -> Result<O, E>    // E: std::error::Error + Send + Sync
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Work<I, O>: private::Sealed<I, O> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_work(self) -> BoxedWork<I, O>;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Work` on their own types.
mod private {
    pub trait Sealed<I, O> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, I, O, E> private::Sealed<I, O> for F
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
}

impl<F, Fut, I, O, E> Work<I, O> for F
where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_boxed_work(self) -> BoxedWork<I, O> {
        Arc::new(FnWork(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete work function `F` and implements
/// [`ErasedWork`], bridging the typed world to the trait-object world.
struct FnWork<F>(F);

impl<F, Fut, I, O, E> ErasedWork<I, O> for FnWork<F>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    fn call(&self, input: I) -> WorkFuture<O> {
        let fut = (self.0)(input);
        Box::pin(async move { fut.await.map_err(|e| Box::new(e) as WorkError) })
    }
}
