//! HTML reduction: one LLM call that strips a raw page snapshot down to
//! its automation-relevant subset.

use std::sync::Arc;

use anyhow::Result;

use crate::llm::{CompletionGateway, Purpose};
use crate::prompts;

pub struct HtmlReducer {
    gateway: Arc<dyn CompletionGateway>,
}

impl HtmlReducer {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    /// Reduce `html` for the page at `url`. The task context, when given,
    /// is prepended to the raw HTML as a labeled block so the model knows
    /// which elements matter.
    ///
    /// The reply is returned with surrounding whitespace removed and no
    /// further validation; whatever the model produced is passed through.
    /// Gateway failures propagate unchanged.
    pub async fn reduce(&self, html: &str, url: &str, task_context: Option<&str>) -> Result<String> {
        let prompt = build_reduction_prompt(html, url, task_context);
        let reply = self.gateway.complete(&prompt, Purpose::HtmlReduction).await?;
        Ok(reply.trim().to_string())
    }
}

fn build_reduction_prompt(html: &str, url: &str, task_context: Option<&str>) -> String {
    let raw_html = match task_context.filter(|t| !t.is_empty()) {
        Some(task) => format!("Task Context:\n{task}\n\n{html}"),
        None => html.to_string(),
    };
    prompts::render_reduction(url, &raw_html)
}
