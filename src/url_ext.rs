//! Literal URL construction and non-mutating URL modifiers.
//!
//! Every modifier consumes the [`Url`] and returns the modified copy, so a
//! chain of `with_*` calls reads like the builder it is. The original value
//! is never mutated behind the caller's back — there is no original left to
//! mutate.

use url::Url;

use crate::method::Method;
use crate::params::ParameterSet;
use crate::request::RequestDescriptor;

/// Parses a URL known at the call site.
///
/// # Panics
///
/// Panics if `literal` is not a valid URL. A malformed literal is a
/// programming mistake, not runtime input — fail at startup, loudly.
///
/// # Example
///
/// ```rust
/// let endpoint = ripple::url("https://api.example.com/search");
/// assert_eq!(endpoint.host_str(), Some("api.example.com"));
/// ```
pub fn url(literal: &str) -> Url {
    Url::parse(literal).unwrap_or_else(|e| panic!("invalid URL literal `{literal}`: {e}"))
}

/// Dictionary-style query access and `with_*` modifiers for [`Url`].
///
/// ```rust
/// use ripple::{url, UrlExt};
///
/// let base = url("https://api.example.com/search?query=vikram");
/// let paged = base.with_parameters([("page", Some("1"))]);
/// assert_eq!(paged.query(), Some("page=1&query=vikram"));
///
/// let unpaged = paged.with_parameters([("page", None::<&str>)]);
/// assert_eq!(unpaged.query(), Some("query=vikram"));
/// ```
pub trait UrlExt: Sized {
    /// The decoded query string.
    fn parameters(&self) -> ParameterSet;

    /// Merges `changes` into the query: `Some` overwrites, `None` deletes,
    /// unrelated keys are untouched. The resulting query is re-serialized
    /// in ascending key order; an empty result clears the query entirely.
    fn with_parameters<K, V, C>(self, changes: C) -> Self
    where
        C: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>;

    /// Replaces the fragment, or removes it with `None`.
    fn with_fragment(self, fragment: Option<&str>) -> Self;

    /// Wraps the URL into an outbound request descriptor.
    fn into_request(self, method: Method) -> RequestDescriptor;

    /// Appends `path` segment-wise (empty `path` appends nothing), then
    /// wraps into a descriptor.
    fn into_request_at(self, method: Method, path: &str) -> RequestDescriptor;
}

impl UrlExt for Url {
    fn parameters(&self) -> ParameterSet {
        ParameterSet::parse(self.query().unwrap_or(""))
    }

    fn with_parameters<K, V, C>(mut self, changes: C) -> Self
    where
        C: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = self.parameters();
        params.merge(changes);
        if params.is_empty() {
            self.set_query(None);
        } else {
            self.set_query(Some(&params.serialize()));
        }
        self
    }

    fn with_fragment(mut self, fragment: Option<&str>) -> Self {
        self.set_fragment(fragment);
        self
    }

    fn into_request(self, method: Method) -> RequestDescriptor {
        RequestDescriptor::new(method, self)
    }

    fn into_request_at(mut self, method: Method, path: &str) -> RequestDescriptor {
        let path = path.trim_matches('/');
        if !path.is_empty() {
            // cannot-be-a-base URLs have no segments to push onto
            if let Ok(mut segments) = self.path_segments_mut() {
                segments.pop_if_empty().extend(path.split('/'));
            }
        }
        RequestDescriptor::new(method, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_parameters_merges_and_sorts() {
        let modified = url("https://example.com/?query=vikram")
            .with_parameters([("page", Some("1"))]);
        assert_eq!(modified.query(), Some("page=1&query=vikram"));
    }

    #[test]
    fn with_parameters_none_deletes() {
        let modified = url("https://example.com/?page=1&query=vikram")
            .with_parameters([("page", None::<&str>)]);
        assert_eq!(modified.query(), Some("query=vikram"));
    }

    #[test]
    fn deleting_last_parameter_clears_the_query() {
        let modified = url("https://example.com/?page=1")
            .with_parameters([("page", None::<&str>)]);
        assert_eq!(modified.query(), None);
    }

    #[test]
    fn with_fragment_sets_and_removes() {
        let tagged = url("https://example.com/doc").with_fragment(Some("section-2"));
        assert_eq!(tagged.fragment(), Some("section-2"));
        assert_eq!(tagged.with_fragment(None).fragment(), None);
    }

    #[test]
    fn into_request_at_appends_path_segments() {
        let req = url("https://example.com/api").into_request_at(Method::Post, "users/42");
        assert_eq!(req.url().path(), "/api/users/42");
        assert_eq!(req.method(), Method::Post);
    }

    #[test]
    fn into_request_at_with_empty_path_appends_nothing() {
        let req = url("https://example.com/api").into_request_at(Method::Get, "");
        assert_eq!(req.url().path(), "/api");
    }

    #[test]
    #[should_panic(expected = "invalid URL literal")]
    fn malformed_literal_panics() {
        url("not a url");
    }
}
