//! Tool server.
//!
//! Serves three tools to an LLM client: a calculator, the Taiwan High
//! Speed Rail timetable, and an account book kept in a spreadsheet. The
//! tools are routed by a [`dispatch::Dispatcher`] and hosted over MCP stdio
//! ([`mcp`]) or plain HTTP ([`web`]).

pub mod dispatch;
pub mod ledger;
pub mod logging;
pub mod mcp;
pub mod stations;
pub mod timetable;
pub mod web;
