//! Account book tool.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::warn;

use super::ToolHandler;
use super::error::ToolError;
use super::schema::{ParamSpec, ToolArgs, ToolName, ToolSpec};
use crate::ledger::{
    LedgerAdapter, LedgerError, LedgerMethod, LedgerOp, NewEntry, SessionConnector,
};

/// The `account_book` tool.
///
/// The sheet session is opened on the first call and kept afterwards; a
/// failed open is retried on the next call. Validation, connection and
/// not-found outcomes are returned as the result text. Only store failures
/// fail the call.
pub struct AccountBookTool {
    connector: Box<dyn SessionConnector>,
    adapter: Mutex<LedgerAdapter>,
    spec: ToolSpec,
}

impl std::fmt::Debug for AccountBookTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountBookTool")
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}

impl AccountBookTool {
    pub fn new(connector: impl SessionConnector + 'static) -> Self {
        Self::with_adapter(connector, LedgerAdapter::disconnected())
    }

    /// Use a preconfigured adapter (for example one with a fixed clock).
    pub fn with_adapter(connector: impl SessionConnector + 'static, adapter: LedgerAdapter) -> Self {
        let methods = LedgerMethod::ALL.map(|m| m.as_str());
        let spec = ToolSpec::new(
            ToolName::AccountBook,
            "Manage account book entries with create, read, update and delete operations. \
             Creating returns the new entry's item id, to be used for later reads, updates \
             and deletes.",
        )
        .param(
            ParamSpec::string("method", "The operation to perform.").allowed(methods),
        )
        .param(ParamSpec::integer(
            "itemId",
            "The entry's item id. Set to 0 for 'create'; the id is assigned by the account \
             book. For 'read', 'update' and 'delete' give the id of an existing entry, which \
             is always greater than 1.",
        ))
        .param(
            ParamSpec::string(
                "itemName",
                "Name or description of the item. Used by 'create' and 'update'.",
            )
            .optional(),
        )
        .param(
            ParamSpec::integer("itemCount", "Quantity of the item. Used by 'create' and 'update'.")
                .optional(),
        )
        .param(
            ParamSpec::integer("totalPrice", "Total price of the items. Used by 'create' and 'update'.")
                .optional(),
        );

        Self {
            connector: Box::new(connector),
            adapter: Mutex::new(adapter),
            spec,
        }
    }

    fn run(&self, adapter: &mut LedgerAdapter, args: &ToolArgs) -> Result<String, LedgerError> {
        let method: LedgerMethod = match args.str("method").parse() {
            Ok(method) => method,
            Err(invalid) => return Ok(format!("{invalid}")),
        };

        if !adapter.is_connected() {
            match self.connector.connect() {
                Ok(session) => adapter.attach(session),
                Err(e) => {
                    warn!(error = %e, "cannot open account book");
                    return Ok(format!("{}: {e}", LedgerError::NotConnected));
                }
            }
        }
        let id = args.int("itemId");
        if method != LedgerMethod::Create && id < 1 {
            return Ok(format!(
                "Error: Cannot {method} with item_id < 1. Please provide a valid item_id for {method}."
            ));
        }

        let entry = NewEntry::new(args.str("itemName"), args.int("itemCount"), args.int("totalPrice"));
        adapter.execute(LedgerOp::from_parts(method, id, entry))
    }
}

impl ToolHandler for AccountBookTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &ToolArgs) -> Result<Value, ToolError> {
        // A panic mid-call leaves the adapter usable; its session is only
        // ever replaced whole.
        let mut adapter = self.adapter.lock().unwrap_or_else(PoisonError::into_inner);

        match self.run(&mut adapter, args) {
            Ok(message) => Ok(Value::String(message)),
            Err(e) if e.is_business() => Ok(Value::String(e.to_string())),
            Err(e) => Err(ToolError::Failed(e.to_string())),
        }
    }
}
