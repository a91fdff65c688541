//! # IPC Dispatch
//!
//! Name-to-handler table for the operations the UI may invoke on the shell.
//! Arguments and results travel as JSON values, one request at a time.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::IpcError;
use crate::navigator::WindowNavigator;
use crate::pick::PickServerResult;
use crate::shell::Shell;

/// Operations exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcOperation {
    /// Quit the application.
    Exit,
    /// Stored server URL, or the hosted default.
    GetWebUiUrl,
    /// The hosted default URL.
    GetHostedGlobalWebUiUrl,
    /// Validate and switch to a server; one string argument.
    PickServer,
}

/// Registered operations by wire name.
pub const OPERATIONS: &[(&str, IpcOperation)] = &[
    ("exit", IpcOperation::Exit),
    ("get-web-ui-url", IpcOperation::GetWebUiUrl),
    (
        "get-hosted-global-web-ui-url",
        IpcOperation::GetHostedGlobalWebUiUrl,
    ),
    ("pick-server", IpcOperation::PickServer),
];

impl IpcOperation {
    /// Wire name of the operation.
    #[must_use]
    pub fn name(self) -> &'static str {
        OPERATIONS
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("unknown", |(name, _)| name)
    }
}

impl fmt::Display for IpcOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IpcOperation {
    type Err = IpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATIONS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| IpcError::UnknownOperation(s.to_string()))
    }
}

impl<W: WindowNavigator> Shell<W> {
    /// Dispatches one request by name.
    ///
    /// `args` is a JSON array of positional arguments (or `null` for none).
    ///
    /// # Errors
    ///
    /// * [`IpcError::UnknownOperation`] - no handler under `name`
    /// * [`IpcError::BadArguments`] - wrong arity or argument type
    /// * [`IpcError::Exit`] - the window refused to close
    ///
    /// A failed pick is not an error here; it is an `{"result":"error"}` value.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value, IpcError> {
        let op: IpcOperation = name.parse()?;
        let args = positional(op, args)?;
        tracing::debug!(operation = %op, argc = args.len(), "IPC request");

        match op {
            IpcOperation::Exit => {
                expect_arity(op, &args, 0)?;
                self.window().exit().map_err(IpcError::Exit)?;
                Ok(Value::Null)
            }
            IpcOperation::GetWebUiUrl => {
                expect_arity(op, &args, 0)?;
                Ok(Value::String(self.web_ui_url()))
            }
            IpcOperation::GetHostedGlobalWebUiUrl => {
                expect_arity(op, &args, 0)?;
                Ok(Value::String(self.hosted_global_web_ui_url()))
            }
            IpcOperation::PickServer => {
                expect_arity(op, &args, 1)?;
                let Some(server) = args[0].as_str() else {
                    return Err(IpcError::BadArguments {
                        operation: op.name(),
                        reason: "server must be a string".to_string(),
                    });
                };
                let result = PickServerResult::from(self.pick_server(server).await);
                Ok(serde_json::to_value(result)?)
            }
        }
    }
}

fn positional(op: IpcOperation, args: Value) -> Result<Vec<Value>, IpcError> {
    match args {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        other => Err(IpcError::BadArguments {
            operation: op.name(),
            reason: format!("expected an argument array, got {other}"),
        }),
    }
}

fn expect_arity(op: IpcOperation, args: &[Value], n: usize) -> Result<(), IpcError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(IpcError::BadArguments {
            operation: op.name(),
            reason: format!("expected {n} argument(s), got {}", args.len()),
        })
    }
}
