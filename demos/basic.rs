//! Minimal ripple example — a type-ahead search bound to a fake transport.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Watch the log: three rapid submissions collapse into a single cycle for
//! "vikram", the fake transport "responds", and the final snapshot carries
//! the output with busy=false.

use std::time::Duration;

use ripple::{Method, Processor, UrlExt, dump, url};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let endpoint = url("https://api.example.com/search");

    // The work function: shape the request, pretend a transport ran it.
    let search = Processor::new(move |term: String| {
        let request = endpoint
            .clone()
            .with_parameters([("query", Some(term.as_str())), ("page", Some("1"))])
            .into_request(Method::Get);
        async move {
            // Real app: hand `request.into_http()?` to hyper/reqwest/… here.
            let body = format!(r#"{{"query":"{}","hits":3}}"#, request.url());
            dump::dump("search", body.as_bytes());
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, std::io::Error>(body)
        }
    })
    .debounce(Duration::from_millis(250))
    .timeout(Duration::from_secs(5))
    .retries(2);

    // Rapid keystrokes — only the trailing value runs.
    search.submit("v".to_string());
    search.submit("vik".to_string());
    search.submit("vikram".to_string());

    let mut state = search.subscribe();
    loop {
        state.changed().await.expect("controller dropped");
        let snapshot = state.borrow().clone();
        println!(
            "busy={} error={:?} output={:?}",
            snapshot.busy, snapshot.error, snapshot.output
        );
        if !snapshot.busy && snapshot.output.is_some() {
            break;
        }
    }
}
