//! Command interpreter, intercepted before the completion pipeline.
//!
//! Classification is an explicit tagged-variant parse; dispatch is a plain
//! `match`, testable without any transport. Validation returns `Result`
//! values instead of raising: a failed validation produces a user-facing
//! reply and mutates nothing.

use tracing::info;

use gptgram_core::types::UserId;

use super::context::MessageContext;

const WELCOME: &str = "Hello! I relay your messages to YandexGPT and keep \
your conversation going across turns. Just write what you want to know, \
or see /help for the available commands.";

const HELP: &str = "**gptgram commands**\n\
- `/start` — welcome message\n\
- `/help` — show this help\n\
- `/new` — reset your dialog and start over\n\
- `/system <text>` — set the system prompt for your dialog\n\
- `/temp <value>` — set sampling temperature (0.0 to 1.0, shared by all users)";

/// An inbound message classified as a control command.
///
/// Argument-carrying variants hold the raw argument text; validation
/// happens at dispatch so a bad argument can answer with a usage hint.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    New,
    System(String),
    Temp(String),
}

/// Validation failures for command arguments.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("empty argument")]
    EmptyArgument,

    #[error("not a number: {0}")]
    ParseError(String),

    #[error("value {0} outside [0.0, 1.0]")]
    RangeError(f64),
}

/// Classify `text` by its first whitespace-delimited token.
///
/// Returns `None` for anything that is not a recognized command (unknown
/// `/foo` tokens included), which sends the message down the content path.
pub fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (token, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (trimmed, ""),
    };

    match token {
        t if t.eq_ignore_ascii_case("/start") => Some(Command::Start),
        t if t.eq_ignore_ascii_case("/help") => Some(Command::Help),
        t if t.eq_ignore_ascii_case("/new") => Some(Command::New),
        t if t.eq_ignore_ascii_case("/system") => Some(Command::System(rest.trim().to_string())),
        t if t.eq_ignore_ascii_case("/temp") => Some(Command::Temp(rest.trim().to_string())),
        _ => None,
    }
}

/// Require a non-empty system prompt argument.
pub fn validate_system_prompt(arg: &str) -> Result<&str, CommandError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(CommandError::EmptyArgument);
    }
    Ok(arg)
}

/// Parse and range-check a temperature argument.
pub fn parse_temperature(arg: &str) -> Result<f64, CommandError> {
    let value: f64 = arg
        .trim()
        .parse()
        .map_err(|_| CommandError::ParseError(arg.trim().to_string()))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(CommandError::RangeError(value));
    }
    Ok(value)
}

/// Handle a control command before the completion pipeline runs.
///
/// Returns `Some(reply)` if the message was a recognized command,
/// `None` if it is conversation content.
pub async fn handle_command<C: MessageContext>(
    text: &str,
    ctx: &C,
    user: &UserId,
) -> Option<String> {
    let reply = match parse_command(text)? {
        Command::Start => WELCOME.to_string(),

        Command::Help => HELP.to_string(),

        Command::New => {
            ctx.dialogs().clear(user).await;
            info!(user = %user, "dialog reset via /new");
            "Dialog reset. Starting a fresh conversation.".to_string()
        }

        Command::System(arg) => match validate_system_prompt(&arg) {
            Ok(prompt) => {
                ctx.dialogs().set_system(user, prompt).await;
                info!(user = %user, "system prompt set via /system");
                "System prompt set for your dialog.".to_string()
            }
            Err(_) => "Send the prompt text after the command, e.g. \
                 `/system You are a terse technical assistant`."
                .to_string(),
        },

        Command::Temp(arg) => match parse_temperature(&arg) {
            Ok(value) => {
                let previous = ctx.model().set_temperature(value).await;
                info!(previous, new = value, "temperature changed via /temp");
                format!("Temperature set: {previous} -> {value}. Applies to all requests.")
            }
            Err(CommandError::ParseError(raw)) => {
                format!("`{raw}` is not a number. Send a value like `/temp 0.7`.")
            }
            Err(CommandError::RangeError(value)) => {
                format!("Temperature {value} is outside the valid range 0.0 to 1.0.")
            }
            Err(e) => e.to_string(),
        },
    };

    Some(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::DialogStore;
    use crate::provider::{
        CompletionProvider, CompletionRequest, CompletionResponse, ProviderError,
    };
    use crate::runtime::ModelRuntime;

    struct NeverCalled;

    #[async_trait::async_trait]
    impl CompletionProvider for NeverCalled {
        fn name(&self) -> &str {
            "never-called"
        }
        async fn complete(
            &self,
            _req: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            panic!("control commands must not reach the completion endpoint");
        }
    }

    struct TestContext {
        model: ModelRuntime,
        dialogs: DialogStore,
    }

    impl MessageContext for TestContext {
        fn model(&self) -> &ModelRuntime {
            &self.model
        }
        fn dialogs(&self) -> &DialogStore {
            &self.dialogs
        }
    }

    fn test_ctx() -> TestContext {
        TestContext {
            model: ModelRuntime::new(
                Box::new(NeverCalled),
                "gpt://folder/yandexgpt-lite/latest".to_string(),
                2000,
                0.5,
            ),
            dialogs: DialogStore::new(None),
        }
    }

    #[test]
    fn classifies_every_command_token() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/help"), Some(Command::Help));
        assert_eq!(parse_command("/new"), Some(Command::New));
        assert_eq!(
            parse_command("/system Be terse"),
            Some(Command::System("Be terse".to_string()))
        );
        assert_eq!(
            parse_command("/temp 0.7"),
            Some(Command::Temp("0.7".to_string()))
        );
    }

    #[test]
    fn plain_text_and_unknown_tokens_are_content() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn bare_system_parses_with_empty_argument() {
        assert_eq!(
            parse_command("/system"),
            Some(Command::System(String::new()))
        );
    }

    #[test]
    fn system_prompt_must_not_be_blank() {
        assert_eq!(
            validate_system_prompt("   "),
            Err(CommandError::EmptyArgument)
        );
        assert_eq!(validate_system_prompt(" Be terse "), Ok("Be terse"));
    }

    #[test]
    fn temperature_parses_and_range_checks() {
        assert_eq!(parse_temperature("0.7"), Ok(0.7));
        assert_eq!(parse_temperature("0"), Ok(0.0));
        assert_eq!(parse_temperature("1"), Ok(1.0));
        assert_eq!(
            parse_temperature("abc"),
            Err(CommandError::ParseError("abc".to_string()))
        );
        assert_eq!(parse_temperature("1.5"), Err(CommandError::RangeError(1.5)));
        assert_eq!(
            parse_temperature("-0.1"),
            Err(CommandError::RangeError(-0.1))
        );
    }

    #[tokio::test]
    async fn start_and_help_touch_no_state() {
        let ctx = test_ctx();
        let user = UserId::from("1");

        assert!(handle_command("/start", &ctx, &user).await.is_some());
        assert!(handle_command("/help", &ctx, &user).await.is_some());

        assert!(ctx.dialogs().dialog(&user).lock().await.is_empty());
        assert_eq!(ctx.model().temperature().await, 0.5);
    }

    #[tokio::test]
    async fn content_returns_none() {
        let ctx = test_ctx();
        let user = UserId::from("1");
        assert!(handle_command("what is the weather like?", &ctx, &user)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn temp_updates_shared_config_on_success_only() {
        let ctx = test_ctx();
        let user = UserId::from("1");

        let reply = handle_command("/temp 0.7", &ctx, &user).await.unwrap();
        assert!(reply.contains("0.7"));
        assert_eq!(ctx.model().temperature().await, 0.7);

        // both failure modes leave the value untouched
        let reply = handle_command("/temp 1.5", &ctx, &user).await.unwrap();
        assert!(reply.contains("range"));
        assert_eq!(ctx.model().temperature().await, 0.7);

        let reply = handle_command("/temp abc", &ctx, &user).await.unwrap();
        assert!(reply.contains("not a number"));
        assert_eq!(ctx.model().temperature().await, 0.7);
    }

    #[tokio::test]
    async fn bare_system_prompts_for_text_without_mutation() {
        let ctx = test_ctx();
        let user = UserId::from("1");

        let reply = handle_command("/system", &ctx, &user).await.unwrap();
        assert!(reply.contains("/system"));
        assert!(ctx.dialogs().dialog(&user).lock().await.is_empty());
    }

    #[tokio::test]
    async fn system_sets_the_prompt() {
        let ctx = test_ctx();
        let user = UserId::from("1");

        handle_command("/system Be terse", &ctx, &user).await.unwrap();
        let dialog = ctx.dialogs().dialog(&user);
        let transcript = dialog.lock().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].text, "Be terse");
    }

    #[tokio::test]
    async fn new_resets_the_dialog() {
        let ctx = test_ctx();
        let user = UserId::from("1");
        ctx.dialogs().set_system(&user, "sys").await;

        handle_command("/new", &ctx, &user).await.unwrap();
        assert!(ctx.dialogs().dialog(&user).lock().await.is_empty());
    }
}
