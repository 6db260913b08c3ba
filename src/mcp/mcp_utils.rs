use crate::commands::Out;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{error, warn};

/// The message as text content followed by the structured output, if any, as JSON content.
fn to_content<T>(out: Out<T>) -> Vec<Content>
where
    T: Debug + Clone + Serialize,
{
    let mut content = vec![Content::text(out.message())];
    if let Some(structure) = out.structure() {
        match Content::json(structure) {
            Ok(json) => content.push(json),
            Err(e) => error!("Unable to serialize the tool output as JSON: {e}"),
        };
    }
    content
}

/// Command failures are reported to the agent as tool errors rather than protocol errors, so that
/// it can read the message and correct its request.
pub(super) fn tool_result<T>(result: crate::Result<Out<T>>) -> Result<CallToolResult, ErrorData>
where
    T: Debug + Clone + Serialize,
{
    Ok(match result {
        Ok(out) => CallToolResult::success(to_content(out)),
        Err(e) => {
            warn!("Tool call failed with a {} error: {e}", e.error_type());
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    })
}
