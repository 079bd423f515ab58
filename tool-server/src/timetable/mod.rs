//! Taiwan High Speed Rail timetable client.
//!
//! A lookup runs as a short pipeline:
//!
//! 1. resolve both stations through the [station directory](crate::stations);
//! 2. build the search form, with a return leg at the next half hour;
//! 3. post it through a [`Transport`] (blocking or async);
//! 4. [normalize](normalize_reply) the reply into JSON or a [`FetchError`];
//! 5. render the text report, filtered by [`ReportOptions`].
//!
//! Key characteristics of the endpoint:
//! - It always wants a round-trip form, even for one-way lookups
//! - It sometimes labels JSON replies as `text/html`
//! - Times are `HH:MM` local time, dates `YYYY/MM/DD`

mod client;
mod error;
mod format;
mod normalize;
mod query;
mod transport;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, TimetableClient, TimetableConfig};
pub use error::{BODY_PREVIEW_CHARS, FetchError, TimetableError};
pub use format::{DEFAULT_MAX_RESULTS, ReportOptions, departs_after, format_report};
pub use normalize::normalize_reply;
pub use query::{DATE_FORMAT, TIME_FORMAT, TimetableQuery, TimetableRequest, next_half_hour};
pub use transport::{AsyncTransport, BlockingTransport, RawReply, Transport};
pub use types::{DepartureTable, PriceTable, TimetableData, TimetableReply, Title, TrainItem};
