//! Newline-delimited JSON-RPC over stdin/stdout
//!
//! One request per line; one response per line. Blank lines are skipped and
//! notifications produce no output.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::error::Result;
use crate::rpc::RpcDispatcher;

/// Serve requests read from `reader` until EOF
///
/// Lines are handed to the dispatcher as raw bytes, so a line that is not
/// UTF-8 gets a parse error response like any other malformed payload.
pub async fn serve_lines<R, W>(dispatcher: &RpcDispatcher, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let Some(response) = dispatcher.handle_raw(line).await else {
            continue;
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    debug!("stdin closed");
    Ok(())
}

/// Serve requests on the process's stdin/stdout
pub async fn serve_stdio(dispatcher: &RpcDispatcher) -> Result<()> {
    info!("Serving JSON-RPC on stdio");
    serve_lines(
        dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use igdm_core::ToolManager;
    use serde_json::Value;

    async fn run(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let dispatcher = RpcDispatcher::new(ToolManager::new());
        let mut output = Vec::new();
        serve_lines(&dispatcher, input, &mut output)
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let responses = run(concat!(
            r#"{"jsonrpc": "2.0", "method": "ping", "id": 1}"#,
            "\n\n",
            r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc": "2.0", "method": "tools/list", "id": 2}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_line_keeps_serving() {
        let responses = run("not json\n{\"method\": \"ping\", \"id\": \"a\"}\n").await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], "a");
        assert!(responses[1]["error"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_serving() {
        let responses = run_bytes(b"\xff\xfe\n{\"method\":\"ping\",\"id\":1}\n").await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], 1);
        assert_eq!(responses[1]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let responses = run(r#"{"method": "ping", "id": 7}"#).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 7);
    }
}
