//! Routing of tool calls to their handlers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::ToolHandler;
use super::calculator::Calculator;
use super::envelope::{ToolCall, ToolResponse};
use super::error::ToolError;
use super::schema::{ToolName, ToolSpec};

/// Owns one handler per [`ToolName`] and runs calls through them.
///
/// Building a dispatcher has no side effects: handlers open their
/// external connections on first use.
pub struct Dispatcher {
    calculator: Calculator,
    timetable: Box<dyn ToolHandler>,
    account_book: Box<dyn ToolHandler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &ToolName::ALL)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}

impl Dispatcher {
    pub fn new(
        timetable: impl ToolHandler + 'static,
        account_book: impl ToolHandler + 'static,
    ) -> Self {
        let dispatcher = Self {
            calculator: Calculator::new(),
            timetable: Box::new(timetable),
            account_book: Box::new(account_book),
        };
        for name in ToolName::ALL {
            debug_assert_eq!(
                dispatcher.handler(name).spec().name,
                name,
                "handler in the {name} slot declares another tool"
            );
        }
        dispatcher
    }

    fn handler(&self, name: ToolName) -> &dyn ToolHandler {
        match name {
            ToolName::Calculator => &self.calculator,
            ToolName::Timetable => self.timetable.as_ref(),
            ToolName::AccountBook => self.account_book.as_ref(),
        }
    }

    /// Declarations of every tool, in listing order.
    pub fn specs(&self) -> Vec<&ToolSpec> {
        ToolName::ALL.iter().map(|&name| self.handler(name).spec()).collect()
    }

    /// Run a call and wrap the outcome in the response envelope.
    pub fn call(&self, call: &ToolCall) -> ToolResponse {
        self.call_tool(&call.tool_name, &call.arguments)
    }

    /// Run a tool by name. Never panics and never fails: every failure is
    /// reported in the envelope.
    pub fn call_tool(&self, tool_name: &str, arguments: &Map<String, Value>) -> ToolResponse {
        let started = Instant::now();
        let outcome = self.try_call(tool_name, arguments);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                info!(tool = tool_name, elapsed_ms, "tool call succeeded");
                debug!(tool = tool_name, %result, "tool result");
                ToolResponse::ok(result)
            }
            Err(err) => {
                warn!(tool = tool_name, elapsed_ms, error = %err, "tool call failed");
                ToolResponse::failed(&err)
            }
        }
    }

    fn try_call(&self, tool_name: &str, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let handler = self.handler(tool_name.parse()?);
        let args = handler.spec().validate(arguments)?;

        panic::catch_unwind(AssertUnwindSafe(|| handler.call(&args)))
            .unwrap_or_else(|payload| Err(ToolError::Internal(panic_message(payload.as_ref()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::schema::{ParamSpec, ToolArgs};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Handler that counts calls and answers according to `mode`.
    struct StubHandler {
        spec: ToolSpec,
        calls: Arc<AtomicUsize>,
        mode: &'static str,
    }

    impl StubHandler {
        fn new(name: ToolName, mode: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let handler = Self {
                spec: ToolSpec::new(name, "stub").param(ParamSpec::integer("n", "a number")),
                calls: Arc::clone(&calls),
                mode,
            };
            (handler, calls)
        }
    }

    impl ToolHandler for StubHandler {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                "business" => Ok(json!(format!("Error: id {} is invalid", args.int("n")))),
                "fail" => Err(ToolError::Failed("store unavailable".into())),
                "panic" => panic!("handler blew up"),
                _ => Ok(json!(args.int("n") * 2)),
            }
        }
    }

    fn dispatcher(timetable: &'static str, ledger: &'static str) -> (Dispatcher, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let (t, t_calls) = StubHandler::new(ToolName::Timetable, timetable);
        let (l, l_calls) = StubHandler::new(ToolName::AccountBook, ledger);
        (Dispatcher::new(t, l), t_calls, l_calls)
    }

    #[test]
    fn lists_every_tool_in_order() {
        let (dispatcher, ..) = dispatcher("ok", "ok");
        let names: Vec<_> = dispatcher.specs().iter().map(|s| s.name).collect();
        assert_eq!(names, ToolName::ALL);
    }

    #[test]
    fn routes_to_exactly_one_handler() {
        let (dispatcher, t_calls, l_calls) = dispatcher("ok", "ok");

        let response = dispatcher.call(&ToolCall::new("account_book", json!({"n": 21})));

        assert_eq!(response, ToolResponse::ok(json!(42)));
        assert_eq!(t_calls.load(Ordering::SeqCst), 0);
        assert_eq!(l_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn calculator_is_built_in() {
        let (dispatcher, ..) = dispatcher("ok", "ok");
        let response = dispatcher.call(&ToolCall::new("calculator", json!({"expression": "6 * 7"})));
        assert_eq!(response, ToolResponse::ok(json!(42)));

        let response = dispatcher.call(&ToolCall::new("calculator", json!({"expression": "6 *"})));
        assert!(!response.success);
        assert!(response.error.is_some());
    }

    #[test]
    fn validation_fails_before_the_handler_runs() {
        let (dispatcher, t_calls, _) = dispatcher("ok", "ok");

        let response = dispatcher.call(&ToolCall::new(
            "taiwan_high_speed_rail_timetable",
            json!({"n": "seven"}),
        ));

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("invalid argument `n`: expected integer, got string")
        );
        assert_eq!(t_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn business_failures_are_successful_calls() {
        let (dispatcher, ..) = dispatcher("ok", "business");
        let response = dispatcher.call(&ToolCall::new("account_book", json!({"n": 1})));
        assert_eq!(response, ToolResponse::ok(json!("Error: id 1 is invalid")));
    }

    #[test]
    fn handler_errors_become_failed_envelopes() {
        let (dispatcher, ..) = dispatcher("ok", "fail");
        let response = dispatcher.call(&ToolCall::new("account_book", json!({"n": 1})));
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"success": false, "error": "store unavailable"})
        );
    }

    #[test]
    fn panics_are_contained() {
        let (dispatcher, ..) = dispatcher("panic", "ok");

        let response = dispatcher.call(&ToolCall::new("taiwan_high_speed_rail_timetable", json!({"n": 1})));
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("internal error: handler blew up"));

        // The dispatcher keeps working afterwards.
        let response = dispatcher.call(&ToolCall::new("account_book", json!({"n": 2})));
        assert_eq!(response, ToolResponse::ok(json!(4)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "declares another tool")]
    fn swapped_handlers_are_rejected() {
        let (timetable, _) = StubHandler::new(ToolName::AccountBook, "ok");
        let (account_book, _) = StubHandler::new(ToolName::Timetable, "ok");
        let _ = Dispatcher::new(timetable, account_book);
    }

    #[test]
    fn every_slot_serves_its_own_declaration() {
        let (dispatcher, ..) = dispatcher("ok", "ok");
        for name in ToolName::ALL {
            assert_eq!(dispatcher.handler(name).spec().name, name);
        }
    }

    #[test]
    fn unknown_tools_are_rejected() {
        let (dispatcher, t_calls, l_calls) = dispatcher("ok", "ok");
        let response = dispatcher.call(&ToolCall::new("weather", json!({})));
        assert_eq!(response.error.as_deref(), Some("unknown tool: \"weather\""));
        assert_eq!(t_calls.load(Ordering::SeqCst) + l_calls.load(Ordering::SeqCst), 0);
    }
}
