//! Outbound request descriptor and its typed-body builders.
//!
//! A [`RequestDescriptor`] is an immutable value describing one request:
//! target URL, method, headers, optional body. Every modifier consumes
//! `self` and returns the modified copy. ripple never executes the request
//! — call [`into_http`](RequestDescriptor::into_http) and hand the result
//! to whatever transport you run.

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::method::Method;
use crate::params::ParameterSet;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for typed request bodies.
pub enum ContentType {
    Csv,         // text/csv
    FormData,    // application/x-www-form-urlencoded
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream  (binary / file upload)
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── RequestDescriptor ─────────────────────────────────────────────────────────

/// An outbound HTTP request described as plain data.
///
/// # Shortcuts (typed bodies set the matching `content-type`)
///
/// ```rust
/// use ripple::{url, ContentType, Method, UrlExt};
///
/// let req = url("https://api.example.com/users")
///     .into_request(Method::Post)
///     .adding_header("accept", "application/json")
///     .with_text("hello");
/// assert_eq!(req.header("content-type"), Some("text/plain; charset=utf-8"));
/// ```
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    url: Url,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self { url, method, headers: Vec::new(), body: None }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn url(&self) -> &Url { &self.url }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> Option<&[u8]> { self.body.as_deref() }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a copy with the header set. Header names are unique
    /// case-insensitively; an existing entry is overwritten and takes the
    /// new casing.
    pub fn adding_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Returns a copy with the body replaced. A given content type
    /// sets/overwrites the `content-type` header; `None` leaves headers
    /// alone.
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: Option<ContentType>) -> Self {
        self.body = Some(body.into());
        match content_type {
            Some(ct) => self.adding_header("content-type", ct.as_str()),
            None => self,
        }
    }

    /// Plain-text body — `text/plain; charset=utf-8`.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_body(text.into().into_bytes(), Some(ContentType::Text))
    }

    /// JSON body — `application/json`. Serialization failure is the one
    /// recoverable error on this surface.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value).map_err(Error::Json)?;
        Ok(self.with_body(body, Some(ContentType::Json)))
    }

    /// Form-encoded body — `application/x-www-form-urlencoded`.
    pub fn with_form(self, form: &ParameterSet) -> Self {
        self.with_body(form.serialize().into_bytes(), Some(ContentType::FormData))
    }

    /// Assembles the descriptor into an [`http::Request`] for a transport.
    ///
    /// Header names/values that cannot exist on the wire surface as
    /// [`Error::Header`].
    pub fn into_http(self) -> Result<http::Request<Bytes>, Error> {
        let mut builder = http::Request::builder()
            .method(http::Method::from(self.method))
            .uri(self.url.as_str());
        for (name, value) in &self.headers {
            let header_name = http::header::HeaderName::try_from(name.as_str())
                .map_err(|_| Error::Header { name: name.clone() })?;
            let header_value = http::header::HeaderValue::try_from(value.as_str())
                .map_err(|_| Error::Header { name: name.clone() })?;
            builder = builder.header(header_name, header_value);
        }
        Ok(builder.body(self.body.unwrap_or_default())?)
    }
}
