//! # ripple
//!
//! Ergonomic URL building and reactive request state for HTTP clients.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your transport executes requests. Your presentation layer renders state.
//! ripple owns only the part in between: shaping the request and
//! coordinating its lifecycle. Every feature ripple skips is one your
//! transport or UI framework already ships.
//!
//! What the collaborators own — ripple intentionally ignores:
//!
//! - **Network I/O and connections** — hand an [`http::Request`] to any
//!   transport via [`RequestDescriptor::into_http`]
//! - **Caching** — your transport layer's job
//! - **Authentication** — set the headers; ripple won't mint tokens
//! - **Rendering** — observe a [`Snapshot`], draw it however you like
//!
//! What's left for ripple — the part that changes between applications:
//!
//! - Literal URL construction and non-mutating `with_*` modifiers
//! - A sorted, key-unique query-parameter codec — [`ParameterSet`]
//! - Typed request bodies (text / JSON / form) on an immutable
//!   [`RequestDescriptor`]
//! - A debounced, retrying, cancellable request-state controller —
//!   [`Processor`]
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ripple::{url, Method, Processor, UrlExt};
//!
//! #[tokio::main]
//! async fn main() {
//!     let endpoint = url("https://api.example.com/search");
//!
//!     // Type-ahead search: rapid keystrokes collapse to one request.
//!     let search = Processor::new(move |term: String| {
//!         let target = endpoint.clone()
//!             .with_parameters([("query", Some(term.as_str()))]);
//!         async move {
//!             // hand `target.into_request(Method::Get)` to your transport
//!             let _request = target.into_request(Method::Get);
//!             Ok::<_, std::io::Error>("…response…".to_string())
//!         }
//!     })
//!     .debounce(Duration::from_millis(250))
//!     .timeout(Duration::from_secs(10))
//!     .retries(3);
//!
//!     search.submit("v".into());
//!     search.submit("vik".into());
//!     search.submit("vikram".into()); // only this one runs
//!
//!     let mut state = search.subscribe();
//!     while state.changed().await.is_ok() {
//!         let snapshot = state.borrow().clone();
//!         println!("busy={} output={:?}", snapshot.busy, snapshot.output);
//!     }
//! }
//! ```

mod error;
mod method;
mod params;
mod processor;
mod request;
mod url_ext;
mod work;

pub mod dump;

pub use error::{Error, ProcessError};
pub use method::Method;
pub use params::ParameterSet;
pub use processor::{Processor, Snapshot};
pub use request::{ContentType, RequestDescriptor};
pub use url_ext::{UrlExt, url};
pub use work::Work;
