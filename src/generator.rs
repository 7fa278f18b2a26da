//! Action generation: formats the task, history and reduced HTML into the
//! generation prompt and asks the generation model profile for the next
//! action.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::llm::{CompletionGateway, Purpose};
use crate::prompts;

/// One prior step as reported by the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default = "unknown_action")]
    pub action: String,
    #[serde(default)]
    pub result: Option<String>,
}

fn unknown_action() -> String {
    "unknown".to_string()
}

pub struct ActionGenerator {
    gateway: Arc<dyn CompletionGateway>,
}

impl ActionGenerator {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    /// Ask for the next action. Returns the model's raw reply, trimmed;
    /// turning that reply into a canonical action string is the parser's
    /// job, not this one's.
    pub async fn generate(
        &self,
        prompt: &str,
        reduced_html: &str,
        step_index: u32,
        history: &[HistoryEntry],
        url: &str,
    ) -> Result<String> {
        let action_prompt = build_action_prompt(prompt, reduced_html, step_index, history, url);
        let reply = self
            .gateway
            .complete(&action_prompt, Purpose::ActionGeneration)
            .await?;
        Ok(reply.trim().to_string())
    }
}

fn build_action_prompt(
    task: &str,
    reduced_html: &str,
    step_index: u32,
    history: &[HistoryEntry],
    url: &str,
) -> String {
    let transcript = format_history(history);
    // The rendered template never shows a blank history section.
    let previous_actions = if transcript.is_empty() {
        "No previous actions".to_string()
    } else {
        transcript
    };
    prompts::render_action(task, url, step_index, &previous_actions, reduced_html)
}

/// Human-readable transcript: one "Step N:" line per entry, with an
/// indented result line when the entry carries a non-empty result.
fn format_history(history: &[HistoryEntry]) -> String {
    let mut lines = Vec::new();
    for (i, entry) in history.iter().enumerate() {
        lines.push(format!("Step {}: {}", i + 1, entry.action));
        if let Some(result) = entry.result.as_deref().filter(|r| !r.is_empty()) {
            lines.push(format!("  Result: {result}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingGateway {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl CompletionGateway for RecordingGateway {
        async fn complete(&self, prompt: &str, purpose: Purpose) -> Result<String> {
            assert_eq!(purpose, Purpose::ActionGeneration);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn generator_with_reply(reply: &str) -> (ActionGenerator, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        (ActionGenerator::new(gateway.clone()), gateway)
    }

    fn entry(action: &str, result: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            action: action.to_string(),
            result: result.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn generate_trims_the_reply() {
        let (generator, _) = generator_with_reply("  {\"action\":\"WaitAction\"}  \n");
        let raw = generator
            .generate("Wait", "<html/>", 0, &[], "https://example.com")
            .await
            .unwrap();
        assert_eq!(raw, "{\"action\":\"WaitAction\"}");
    }

    #[tokio::test]
    async fn prompt_embeds_task_step_and_html() {
        let (generator, gateway) = generator_with_reply("{}");
        generator
            .generate(
                "Click the login button",
                "<button id='login-button'>Login</button>",
                5,
                &[],
                "https://example.com/login",
            )
            .await
            .unwrap();

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].contains("Click the login button"));
        assert!(prompts[0].contains("Step:\n5"));
        assert!(prompts[0].contains("login-button"));
        assert!(prompts[0].contains("https://example.com/login"));
    }

    #[tokio::test]
    async fn empty_history_renders_sentinel() {
        let (generator, gateway) = generator_with_reply("{}");
        generator
            .generate("Task", "<html/>", 0, &[], "https://example.com")
            .await
            .unwrap();
        assert!(
            gateway.prompts.lock().unwrap()[0].contains("Previous Actions:\nNo previous actions")
        );
    }

    #[test]
    fn history_formats_one_step_line_per_entry_in_order() {
        let history = vec![
            entry("navigate https://example.com", Some("Page loaded")),
            entry("click #login-btn", None),
            entry("type #username testuser", Some("")),
        ];
        let formatted = format_history(&history);
        assert_eq!(
            formatted,
            "Step 1: navigate https://example.com\n  Result: Page loaded\nStep 2: click #login-btn\nStep 3: type #username testuser"
        );
        assert_eq!(formatted.matches("Step ").count(), 3);
    }

    #[test]
    fn empty_history_formats_to_empty_string() {
        assert_eq!(format_history(&[]), "");
    }

    #[test]
    fn history_entry_without_action_field_reads_unknown() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"result":"ok"}"#).unwrap();
        assert_eq!(entry.action, "unknown");
    }
}
