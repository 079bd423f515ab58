//! Tool dispatcher.
//!
//! Every call goes through the same steps:
//!
//! 1. the tool name is parsed into a [`ToolName`]; unknown names fail;
//! 2. the arguments are checked against the tool's [`ToolSpec`] before
//!    anything else happens;
//! 3. the one matching [`ToolHandler`] runs;
//! 4. the outcome is wrapped in a [`ToolResponse`].
//!
//! A handler returning `Ok` always yields `success: true`, even when the
//! value is a business-level failure message such as an invalid ledger id.

mod calculator;
mod dispatcher;
mod envelope;
mod error;
mod ledger;
mod schema;
mod timetable;

use serde_json::Value;

pub use calculator::{Calculator, evaluate};
pub use dispatcher::Dispatcher;
pub use envelope::{ToolCall, ToolResponse};
pub use error::ToolError;
pub use ledger::AccountBookTool;
pub use schema::{ParamKind, ParamSpec, ToolArgs, ToolName, ToolSpec};
pub use timetable::TimetableTool;

/// A tool the dispatcher can route to.
pub trait ToolHandler: Send + Sync {
    /// Name, description and arguments of the tool.
    fn spec(&self) -> &ToolSpec;

    /// Run the tool on validated arguments.
    fn call(&self, args: &ToolArgs) -> Result<Value, ToolError>;
}
