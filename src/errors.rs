//! Helpers for inspecting error chains.
//!
//! Every layer of the pipeline wraps the error below it with context and
//! keeps it reachable through [`std::error::Error::source`]. These helpers
//! walk that chain to recover the node-reported [`RpcResponseError`], or to
//! build a message a user can act on.

use std::error::Error;

use crate::rpc::{CallError, RpcResponseError};

/// Upper bound on the number of links followed when walking a cause chain.
pub const MAX_CAUSE_DEPTH: usize = 32;

/// Iterates an error and its causes, outermost first, stopping after
/// [`MAX_CAUSE_DEPTH`] links.
pub fn causes<'a>(error: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(error), |&e| e.source()).take(MAX_CAUSE_DEPTH)
}

/// Returns the first error of type `T` in the chain starting at `error`.
pub fn find_cause<'a, T: Error + 'static>(error: &'a (dyn Error + 'static)) -> Option<&'a T> {
    causes(error).find_map(|e| e.downcast_ref::<T>())
}

/// Returns the node-reported error behind `error`, if the failure came from
/// the node rather than the transport or a local step.
pub fn backend_error<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a RpcResponseError> {
    causes(error)
        .filter_map(|e| e.downcast_ref::<CallError>())
        .find_map(CallError::rpc_response_error)
}

/// Formats a node error with its message, codes, name, description, and every
/// detail message in order.
pub fn backend_error_message(error: &RpcResponseError) -> String {
    error.to_string()
}

/// Message of the innermost reachable cause.
pub fn root_cause_message(error: &(dyn Error + 'static)) -> String {
    causes(error).last().map(ToString::to_string).unwrap_or_default()
}

/// User facing description of a failure.
///
/// Prefers the node's own report when there is one; otherwise joins the
/// cause chain so a transport description (timeout, refused connection)
/// stays visible.
pub fn describe(error: &(dyn Error + 'static)) -> String {
    if let Some(backend) = backend_error(error) {
        return backend_error_message(backend);
    }

    let mut message = String::new();
    for cause in causes(error) {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}
