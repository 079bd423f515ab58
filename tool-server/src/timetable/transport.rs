//! HTTP transports for the timetable endpoint.
//!
//! Two strategies sit behind the one [`Transport`] interface:
//!
//! - [`BlockingTransport`] performs the request on the calling thread and
//!   hands back an already-completed future. It is the one to use from a
//!   host that serves a single call at a time (the stdio server). Like any
//!   `reqwest::blocking` client it must not be created or used directly on
//!   an async runtime thread.
//! - [`AsyncTransport`] performs the request on the tokio runtime, so
//!   several queries can be in flight at once.
//!
//! Both return the raw status, content type and body; interpreting the
//! reply is left to [`normalize_reply`](super::normalize_reply) so the two
//! strategies cannot disagree.

use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use super::client::TimetableConfig;
use super::error::{FetchError, TimetableError};

/// Browser user agent; the endpoint rejects obvious scripted clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Referer expected by the endpoint.
const REFERER: &str = "https://www.thsrc.com.tw";

/// The reply exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    /// `Content-Type` header, empty when absent
    pub content_type: String,
    pub body: String,
}

/// A way of posting the search form to the endpoint.
pub trait Transport: Send + Sync {
    /// Post the form fields and collect the reply.
    fn post_form<'a>(
        &'a self,
        form: &'a [(&'static str, String)],
    ) -> BoxFuture<'a, Result<RawReply, FetchError>>;
}

/// Headers sent with every search.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-TW,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers
}

/// Map a reqwest failure onto the timetable error classes.
fn classify(err: reqwest::Error, timeout_secs: u64) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { secs: timeout_secs }
    } else {
        FetchError::Transport(err.to_string())
    }
}

fn content_type_of(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Transport that blocks the calling thread for the duration of the request.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    http: reqwest::blocking::Client,
    url: String,
    timeout_secs: u64,
}

impl BlockingTransport {
    pub fn new(config: &TimetableConfig) -> Result<Self, TimetableError> {
        let http = reqwest::blocking::Client::builder()
            .default_headers(default_headers())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn send(&self, form: &[(&'static str, String)]) -> Result<RawReply, FetchError> {
        let response = self
            .http
            .post(&self.url)
            .form(form)
            .send()
            .map_err(|e| classify(e, self.timeout_secs))?;

        let status = response.status().as_u16();
        let content_type = content_type_of(response.headers());
        let body = response
            .text()
            .map_err(|e| classify(e, self.timeout_secs))?;

        Ok(RawReply {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for BlockingTransport {
    fn post_form<'a>(
        &'a self,
        form: &'a [(&'static str, String)],
    ) -> BoxFuture<'a, Result<RawReply, FetchError>> {
        // The request completes here, before the future is handed back.
        future::ready(self.send(form)).boxed()
    }
}

/// Transport that runs the request on the tokio runtime.
#[derive(Debug, Clone)]
pub struct AsyncTransport {
    http: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl AsyncTransport {
    pub fn new(config: &TimetableConfig) -> Result<Self, TimetableError> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

impl Transport for AsyncTransport {
    fn post_form<'a>(
        &'a self,
        form: &'a [(&'static str, String)],
    ) -> BoxFuture<'a, Result<RawReply, FetchError>> {
        async move {
            let response = self
                .http
                .post(&self.url)
                .form(form)
                .send()
                .await
                .map_err(|e| classify(e, self.timeout_secs))?;

            let status = response.status().as_u16();
            let content_type = content_type_of(response.headers());
            let body = response
                .text()
                .await
                .map_err(|e| classify(e, self.timeout_secs))?;

            Ok(RawReply {
                status,
                content_type,
                body,
            })
        }
        .boxed()
    }
}
