//! Timetable lookup client.
//!
//! Resolves stations, sends the search form over a [`Transport`] and turns
//! the reply into the text report the agent reads.

use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::stations::Station;

use super::error::{FetchError, TimetableError};
use super::format::{ReportOptions, format_report};
use super::normalize::normalize_reply;
use super::query::{TimetableQuery, TimetableRequest};
use super::transport::{AsyncTransport, BlockingTransport, Transport};
use super::types::TimetableReply;

/// Default search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.thsrc.com.tw/TimeTable/Search";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration for the timetable transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableConfig {
    /// Search endpoint URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Timetable client over a chosen transport.
#[derive(Debug, Clone)]
pub struct TimetableClient<T> {
    transport: T,
    clock: fn() -> NaiveDateTime,
}

impl TimetableClient<BlockingTransport> {
    /// Client that blocks the calling thread for each request.
    pub fn blocking(config: &TimetableConfig) -> Result<Self, TimetableError> {
        Ok(Self::new(BlockingTransport::new(config)?))
    }
}

impl TimetableClient<AsyncTransport> {
    /// Client that runs requests on the tokio runtime.
    pub fn non_blocking(config: &TimetableConfig) -> Result<Self, TimetableError> {
        Ok(Self::new(AsyncTransport::new(config)?))
    }
}

impl<T: Transport> TimetableClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            clock: local_now,
        }
    }

    /// Replace the wall clock used for the return leg.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Resolve the stations of a request into a sendable query.
    pub fn build_query(&self, request: &TimetableRequest) -> Result<TimetableQuery, TimetableError> {
        match (
            Station::resolve(&request.start),
            Station::resolve(&request.destination),
        ) {
            (Ok(start), Ok(end)) => Ok(TimetableQuery::new(
                start,
                end,
                request.date.clone(),
                request.time.clone(),
                (self.clock)(),
            )),
            _ => Err(TimetableError::UnknownRoute {
                start: request.start.clone(),
                destination: request.destination.clone(),
            }),
        }
    }

    /// Send a query and return the normalized JSON reply.
    pub async fn fetch(&self, query: &TimetableQuery) -> Result<Value, FetchError> {
        let form = query.to_form();
        debug!(start = %query.start, end = %query.end, date = %query.outward_date, "sending timetable search");

        let reply = self.transport.post_form(&form).await?;
        info!(
            start = %query.start,
            end = %query.end,
            status = reply.status,
            "timetable search answered"
        );
        normalize_reply(reply)
    }

    /// Look up a request and decode the reply.
    pub async fn lookup(&self, request: &TimetableRequest) -> Result<TimetableReply, TimetableError> {
        let query = self.build_query(request)?;
        let value = self.fetch(&query).await?;

        let reply: TimetableReply =
            serde_json::from_value(value).map_err(|e| TimetableError::Malformed(e.to_string()))?;
        if !reply.success {
            return Err(TimetableError::Rejected);
        }
        Ok(reply)
    }

    /// Look up a request and render the report.
    ///
    /// Failures are rendered as their user-facing message rather than
    /// returned; the report is always text.
    pub async fn search(&self, request: &TimetableRequest, options: &ReportOptions) -> String {
        match self.lookup(request).await {
            Ok(reply) => format_report(&reply, options),
            Err(err) => {
                warn!(
                    start = %request.start,
                    destination = %request.destination,
                    details = %err.details(),
                    "timetable lookup failed"
                );
                err.to_string()
            }
        }
    }

    /// [`search`](Self::search) driven to completion on the calling thread.
    ///
    /// Intended for the blocking transport; with the async transport it
    /// must only be called where a tokio runtime is reachable.
    pub fn search_blocking(&self, request: &TimetableRequest, options: &ReportOptions) -> String {
        futures::executor::block_on(self.search(request, options))
    }

    /// Run several searches concurrently.
    ///
    /// Reports come back in request order. Each search fails on its own;
    /// one failure does not affect the others.
    pub async fn search_many(&self, requests: &[(TimetableRequest, ReportOptions)]) -> Vec<String> {
        join_all(
            requests
                .iter()
                .map(|(request, options)| self.search(request, options)),
        )
        .await
    }
}
