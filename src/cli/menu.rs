//! Interactive menu
//!
//! Turns operator input into [`HarnessCommand`] values. Input is read from
//! any `AsyncBufRead` so the prompts can be driven from a byte slice in
//! tests.

use crate::config::WorkloadConfig;
use crate::core::HarnessCommand;
use crate::domain::{DocumentId, PartitionKeyValue, TtlSeconds};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Menu entries in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    WritePerson,
    BulkWrite,
    PatchFirstName,
    UpdateEmail,
    SetTtl,
    PointRead,
    QueryAll,
    QueryByUserName,
    QueryByEmail,
    HotPartitionDemo,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 11] = [
        MenuAction::WritePerson,
        MenuAction::BulkWrite,
        MenuAction::PatchFirstName,
        MenuAction::UpdateEmail,
        MenuAction::SetTtl,
        MenuAction::PointRead,
        MenuAction::QueryAll,
        MenuAction::QueryByUserName,
        MenuAction::QueryByEmail,
        MenuAction::HotPartitionDemo,
        MenuAction::Exit,
    ];

    /// Short name accepted at the prompt
    pub fn name(&self) -> &'static str {
        match self {
            MenuAction::WritePerson => "write",
            MenuAction::BulkWrite => "bulk",
            MenuAction::PatchFirstName => "patch",
            MenuAction::UpdateEmail => "update",
            MenuAction::SetTtl => "ttl",
            MenuAction::PointRead => "read",
            MenuAction::QueryAll => "query",
            MenuAction::QueryByUserName => "query-username",
            MenuAction::QueryByEmail => "query-email",
            MenuAction::HotPartitionDemo => "hot-partition",
            MenuAction::Exit => "exit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuAction::WritePerson => "Write a person item",
            MenuAction::BulkWrite => "Run a bulk operation",
            MenuAction::PatchFirstName => "Patch item (first name)",
            MenuAction::UpdateEmail => "Item update with concurrency check (email)",
            MenuAction::SetTtl => "Set item TTL",
            MenuAction::PointRead => "Point read",
            MenuAction::QueryAll => "Query: SELECT * FROM c",
            MenuAction::QueryByUserName => "Query: SELECT * FROM c WHERE c.userName = @userName",
            MenuAction::QueryByEmail => {
                "Query (cross-partition): SELECT * FROM c WHERE c.email = @email"
            }
            MenuAction::HotPartitionDemo => "Hot partition demo",
            MenuAction::Exit => "Exit",
        }
    }

    /// Render the numbered menu
    pub fn render() -> String {
        let mut menu = String::from("\nSelect an action:\n");
        for (index, action) in Self::ALL.iter().enumerate() {
            menu.push_str(&format!(
                "  {:>2}. {:<15} {}\n",
                index + 1,
                action.name(),
                action.description()
            ));
        }
        menu
    }
}

impl FromStr for MenuAction {
    type Err = String;

    /// Accepts the menu number or the action name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        if input.is_empty() {
            return Err("No action selected".to_string());
        }

        if let Ok(number) = input.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| format!("No menu entry {number}"));
        }

        match input.as_str() {
            "quit" | "q" => return Ok(MenuAction::Exit),
            "ttl" | "set-ttl" => return Ok(MenuAction::SetTtl),
            _ => {}
        }

        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == input)
            .ok_or_else(|| format!("Unknown action '{}'", s.trim()))
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Line-oriented prompt reader
///
/// Prompts and operator-facing messages go to the prompter's output, which is
/// stdout when echoing and nothing otherwise.
pub struct Prompter<R> {
    reader: R,
    output: Option<Box<dyn Write + Send>>,
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    /// Create a prompter; with `echo` set, prompts are printed to stdout
    pub fn new(reader: R, echo: bool) -> Self {
        let output: Option<Box<dyn Write + Send>> = if echo {
            Some(Box::new(std::io::stdout()))
        } else {
            None
        };
        Self { reader, output }
    }

    /// Create a prompter that writes prompts and messages to `output`
    pub fn with_output(reader: R, output: impl Write + Send + 'static) -> Self {
        Self {
            reader,
            output: Some(Box::new(output)),
        }
    }

    /// Print `text` as its own line when echoing
    pub fn show(&mut self, text: &str) {
        if let Some(out) = self.output.as_mut() {
            if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
                tracing::debug!(error = %e, "Failed to write to prompt output");
            }
        }
    }

    /// Print `prompt` and read one trimmed line
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing the prompt or reading fails.
    pub async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        if let Some(out) = self.output.as_mut() {
            write!(out, "{prompt}")?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Why a command could not be built from the operator's answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// Input ended before all answers were read
    EndOfInput,

    /// An answer was empty or invalid
    Invalid(String),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EndOfInput => f.write_str("End of input"),
            PromptError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::Invalid(format!("Failed to read input: {err}"))
    }
}

/// Ask the follow-up questions for `action` and build its command
///
/// Returns `Ok(None)` for [`MenuAction::Exit`].
///
/// # Errors
///
/// Returns [`PromptError::Invalid`] for an empty required answer or an
/// unparsable TTL, and [`PromptError::EndOfInput`] if input runs out.
pub async fn build_command<R: AsyncBufRead + Unpin>(
    action: MenuAction,
    prompter: &mut Prompter<R>,
    workload: &WorkloadConfig,
) -> Result<Option<HarnessCommand>, PromptError> {
    let command = match action {
        MenuAction::Exit => return Ok(None),
        MenuAction::WritePerson => HarnessCommand::WritePerson,
        MenuAction::BulkWrite => HarnessCommand::BulkWrite {
            count: workload.bulk_count,
        },
        MenuAction::PatchFirstName => {
            let (id, partition_key) = ask_identity(prompter, "patch").await?;
            let first_name = ask_required(prompter, "Provide a new first name: ", "First name").await?;
            HarnessCommand::PatchFirstName {
                id,
                partition_key,
                first_name,
            }
        }
        MenuAction::UpdateEmail => {
            let (id, partition_key) = ask_identity(prompter, "update").await?;
            let email = ask_required(prompter, "Provide a new email: ", "Email").await?;
            HarnessCommand::UpdateEmail {
                id,
                partition_key,
                email,
            }
        }
        MenuAction::SetTtl => {
            let (id, partition_key) = ask_identity(prompter, "set TTL").await?;
            let answer = ask(prompter, "Provide a TTL in seconds (blank for default): ").await?;
            let ttl = if answer.is_empty() {
                TtlSeconds::new(workload.default_ttl_seconds).map_err(PromptError::Invalid)?
            } else {
                TtlSeconds::from_str(&answer).map_err(PromptError::Invalid)?
            };
            HarnessCommand::SetTtl {
                id,
                partition_key,
                ttl,
            }
        }
        MenuAction::PointRead => {
            let (id, partition_key) = ask_identity(prompter, "read").await?;
            HarnessCommand::PointRead { id, partition_key }
        }
        MenuAction::QueryAll => HarnessCommand::QueryAll,
        MenuAction::QueryByUserName => {
            let user_name = ask_required(prompter, "Provide a user name: ", "User name").await?;
            HarnessCommand::QueryByUserName { user_name }
        }
        MenuAction::QueryByEmail => {
            let email = ask_required(prompter, "Provide an email: ", "Email").await?;
            HarnessCommand::QueryByEmail { email }
        }
        MenuAction::HotPartitionDemo => {
            let prompt = format!(
                "Provide the partition key to overload (blank for '{}'): ",
                workload.hot_partition_key
            );
            let answer = ask(prompter, &prompt).await?;
            let value = if answer.is_empty() {
                workload.hot_partition_key.clone()
            } else {
                answer
            };
            HarnessCommand::HotPartitionDemo {
                count: workload.bulk_count,
                partition_key: PartitionKeyValue::new(value).map_err(PromptError::Invalid)?,
            }
        }
    };

    Ok(Some(command))
}

async fn ask<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    prompt: &str,
) -> Result<String, PromptError> {
    prompter.ask(prompt).await?.ok_or(PromptError::EndOfInput)
}

async fn ask_required<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    prompt: &str,
    label: &str,
) -> Result<String, PromptError> {
    let answer = ask(prompter, prompt).await?;
    if answer.is_empty() {
        return Err(PromptError::Invalid(format!("{label} is required")));
    }
    Ok(answer)
}

async fn ask_identity<R: AsyncBufRead + Unpin>(
    prompter: &mut Prompter<R>,
    verb: &str,
) -> Result<(DocumentId, PartitionKeyValue), PromptError> {
    let id = ask(prompter, &format!("Provide an ID to {verb}: ")).await?;
    let id = DocumentId::new(id).map_err(PromptError::Invalid)?;

    let partition_key = ask(prompter, &format!("Provide a Partition Key to {verb}: ")).await?;
    let partition_key = PartitionKeyValue::new(partition_key).map_err(PromptError::Invalid)?;

    Ok((id, partition_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn prompter(input: &'static str) -> Prompter<&'static [u8]> {
        Prompter::new(input.as_bytes(), false)
    }

    #[test_case("1", MenuAction::WritePerson ; "by number")]
    #[test_case("10", MenuAction::HotPartitionDemo ; "two digit number")]
    #[test_case("bulk", MenuAction::BulkWrite ; "by name")]
    #[test_case("  Query-Email ", MenuAction::QueryByEmail ; "case and whitespace")]
    #[test_case("q", MenuAction::Exit ; "quit alias")]
    #[test_case("11", MenuAction::Exit ; "exit by number")]
    fn test_parse_menu_action(input: &str, expected: MenuAction) {
        assert_eq!(MenuAction::from_str(input).unwrap(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("0" ; "zero")]
    #[test_case("12" ; "out of range")]
    #[test_case("delete" ; "unknown name")]
    fn test_parse_menu_action_invalid(input: &str) {
        assert!(MenuAction::from_str(input).is_err());
    }

    #[test]
    fn test_render_lists_every_action() {
        let menu = MenuAction::render();
        for action in MenuAction::ALL {
            assert!(menu.contains(action.description()));
        }
    }

    #[tokio::test]
    async fn test_build_patch_command() {
        let mut p = prompter("abc\n1\nEve\n");
        let command = build_command(MenuAction::PatchFirstName, &mut p, &WorkloadConfig::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            HarnessCommand::PatchFirstName {
                id: DocumentId::new("abc").unwrap(),
                partition_key: PartitionKeyValue::new("1").unwrap(),
                first_name: "Eve".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let mut p = prompter("\n1\n");
        let err = build_command(MenuAction::PointRead, &mut p, &WorkloadConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_blank_ttl_uses_default() {
        let mut p = prompter("abc\n2\n\n");
        let command = build_command(MenuAction::SetTtl, &mut p, &WorkloadConfig::default())
            .await
            .unwrap()
            .unwrap();
        let HarnessCommand::SetTtl { ttl, .. } = command else {
            panic!("expected SetTtl");
        };
        assert_eq!(ttl.as_secs(), 60);
    }

    #[tokio::test]
    async fn test_invalid_ttl_is_rejected() {
        let mut p = prompter("abc\n2\nsoon\n");
        let err = build_command(MenuAction::SetTtl, &mut p, &WorkloadConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TTL"));
    }

    #[tokio::test]
    async fn test_hot_partition_defaults_to_configured_key() {
        let mut p = prompter("\n");
        let workload = WorkloadConfig::default();
        let command = build_command(MenuAction::HotPartitionDemo, &mut p, &workload)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            HarnessCommand::HotPartitionDemo {
                count: 1000,
                partition_key: PartitionKeyValue::new("3").unwrap(),
            }
        );
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let mut p = prompter("abc\n");
        let err = build_command(MenuAction::PointRead, &mut p, &WorkloadConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err, PromptError::EndOfInput);
    }

    #[tokio::test]
    async fn test_exit_builds_nothing() {
        let mut p = prompter("");
        let command = build_command(MenuAction::Exit, &mut p, &WorkloadConfig::default())
            .await
            .unwrap();
        assert!(command.is_none());
    }
}
