//! Command execution and the interactive loop

use std::borrow::Cow;

use nu_ansi_term::{Color, Style};
use reedline::{
    DefaultHinter, Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal,
};
use serde_json::Value;

use crate::command::{Command, HELP_TEXT};
use crate::error::Result;
use crate::rpc::RpcClient;

/// Prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

fn pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run one command and return the text to print
///
/// `Exit` yields an empty string; the caller decides whether to leave.
pub async fn execute(client: &RpcClient, command: &Command) -> Result<String> {
    match command {
        Command::Read { limit } => pretty(&client.read_dms(*limit).await?),
        Command::Send { username, message } => pretty(&client.send_dm(username, message).await?),
        Command::Greet { name } => match client.get_greeting(name).await? {
            Value::String(greeting) => Ok(greeting),
            other => Ok(other.to_string()),
        },
        Command::Health => pretty(&client.health_check().await?),
        Command::Help => Ok(HELP_TEXT.to_string()),
        Command::Exit => Ok(String::new()),
    }
}

/// Read commands until `exit`, Ctrl-C or Ctrl-D
///
/// Errors from a single command are printed and the loop continues.
pub async fn run_interactive(client: &RpcClient) -> anyhow::Result<()> {
    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());
    let mut line_editor = Reedline::create().with_hinter(Box::new(hinter));
    let prompt = ColoredPrompt::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let command = match Command::parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                if command == Command::Exit {
                    break;
                }

                match execute(client, &command).await {
                    Ok(output) => println!("{}", output),
                    Err(e) => println!("{}", e),
                }
            }
            Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_returning(rpc_method: &str, result: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result})),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_greet_prints_plain_string() {
        let server = server_returning("get_greeting", json!("Hello, Ada!")).await;
        let client = RpcClient::new(server.uri());

        let output = execute(
            &client,
            &Command::Greet {
                name: "Ada".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, "Hello, Ada!");
    }

    #[tokio::test]
    async fn test_health_prints_pretty_json() {
        let result = json!({"status": "healthy", "logged_in": "False"});
        let server = server_returning("health_check", result.clone()).await;
        let client = RpcClient::new(server.uri());

        let output = execute(&client, &Command::Health).await.unwrap();
        assert_eq!(output, serde_json::to_string_pretty(&result).unwrap());
        assert!(output.contains('\n'));
    }

    #[tokio::test]
    async fn test_help_needs_no_server() {
        let client = RpcClient::new("http://127.0.0.1:9");
        let output = execute(&client, &Command::Help).await.unwrap();
        assert!(output.contains("send <username> <message>"));
    }
}
