//! Fixed instruction templates for the two LLM calls.
//!
//! Placeholders use a `$name` convention and are substituted literally;
//! the surrounding text is full of JSON braces, so positional formatting
//! is deliberately avoided.

/// Template for the HTML-reduction call. Placeholders: `$url`, `$raw_html`.
pub const HTML_REDUCER_TEMPLATE: &str = r##"
You are an HTML OPTIMIZER for a web automation system.
Your ONLY responsibility is to transform raw HTML into a CLEAN, REDUCED, and ACTION-RELEVANT HTML representation.
You do NOT generate actions.
You do NOT explain your reasoning.
You ONLY output optimized HTML.

Input URL:
$url

Raw HTML:
$raw_html

Optimization Goals
- Preserve elements that are potentially interactable or useful for automation
- Remove noise, duplication, and irrelevant content
- Keep the DOM structure understandable and minimal
- Ensure the optimized HTML can be reliably used to generate XPath selectors

Elements to PRESERVE
- Interactive elements:
  - button
  - a (links)
  - input
  - textarea
  - select
  - option
- Elements with attributes:
  - id
  - name
  - role
  - aria-*
  - type
  - value
  - placeholder
  - href
  - data-*
- Elements with visible or actionable text
- Elements that act as containers for interactable elements (e.g., form, dialog, nav)

Elements to REMOVE
- script
- style
- noscript
- svg
- canvas
- iframe (unless clearly interactive)
- meta, link, head
- comments
- tracking or analytics markup
- invisible elements (display:none, hidden, aria-hidden=true)
- excessive nesting with no semantic or functional value

Attribute Rules
- Keep only attributes useful for XPath generation or element identification
- Remove inline styles unless they affect visibility
- Normalize whitespace in text nodes
- Truncate very long text content if not relevant to interaction

Structural Rules
- Preserve parent-child relationships where they help identify elements
- Flatten deeply nested structures when safe
- Remove duplicate sibling elements if they are identical
- Keep forms and dialogs intact

Output Rules
- Output MUST be valid HTML
- Output ONLY the optimized HTML
- Do NOT include explanations, comments, markdown, or extra text
- Do NOT hallucinate elements not present in the raw HTML
- Do NOT add new attributes or modify values
- Maintain the original order of elements as much as possible

Example

Raw HTML:
<div>
  <script>alert("hi")</script>
  <form id="loginForm">
    <label>Email</label>
    <input type="email" name="email" style="color:red">
    <input type="password" name="password">
    <button onclick="submit()">Login</button>
  </form>
</div>

Optimized HTML:
<form id="loginForm">
  <label>Email</label>
  <input type="email" name="email">
  <input type="password" name="password">
  <button>Login</button>
</form>
"##;

/// Template for the action-generation call. Placeholders: `$task`, `$url`,
/// `$step_index`, `$previous_actions`, `$reduced_html`.
pub const ACTION_GENERATOR_TEMPLATE: &str = r##"
You are an ACTION GENERATOR for a web automation system.
Your ONLY responsibility is to generate the NEXT SINGLE ACTION to take on the webpage.
You do NOT explain, reason, describe, or summarize.
You do NOT perform automation yourself.
You ONLY output a valid JSON action object.

Task:
$task

Current URL:
$url

Step:
$step_index

Previous Actions:
$previous_actions

Current Page HTML (reduced):
$reduced_html

Based on the task, the current page state, and previous actions, determine the SINGLE NEXT ACTION to take.

Available Actions
You may return ONLY ONE of the following actions:

ClickAction
NavigateAction
TypeAction
SelectAction
WaitAction

Available Selectors
xpathSelector(value)

Output Rules
- Output MUST be valid JSON
- Return ONLY ONE action
- Do NOT include explanations, comments, reasoning, or extra text
- Use XPath selectors ONLY
- The JSON output MUST strictly match ONE of the schemas below
- Do NOT hallucinate elements that do not exist in the provided HTML
- Prefer deterministic, visible, and interactable elements
- If no safe or valid action is possible, return a WaitAction

Action JSON Schemas

Click
{
  "action": "ClickAction",
  "selector": {
    "type": "xpathSelector",
    "value": "XPATH_EXPRESSION"
  }
}

Navigate
{
  "action": "NavigateAction",
  "url": "TARGET_URL"
}

Type
{
  "action": "TypeAction",
  "text": "TEXT_TO_TYPE",
  "selector": {
    "type": "xpathSelector",
    "value": "XPATH_EXPRESSION"
  }
}

Select
{
  "action": "SelectAction",
  "value": "OPTION_VALUE",
  "selector": {
    "type": "xpathSelector",
    "value": "XPATH_EXPRESSION"
  }
}

Wait
{
  "action": "WaitAction",
  "time_seconds": NUMBER
}

Example Outputs

Example 1: Typing into a login form
{
  "action": "TypeAction",
  "text": "john.doe@example.com",
  "selector": {
    "type": "xpathSelector",
    "value": "//input[@type='email' or @name='email']"
  }
}

Example 2: Clicking a button with multiple matching elements
{
  "action": "ClickAction",
  "selector": {
    "type": "xpathSelector",
    "value": "(//button[contains(normalize-space(text()), 'Continue')])[1]"
  }
}

Example 3: Selecting an option from a dropdown
{
  "action": "SelectAction",
  "value": "United States",
  "selector": {
    "type": "xpathSelector",
    "value": "//select[@name='country']"
  }
}

Example 4: Navigating to a new page explicitly
{
  "action": "NavigateAction",
  "url": "https://example.com/dashboard"
}

Example 5: Waiting due to loading or missing interactable elements
{
  "action": "WaitAction",
  "time_seconds": 3
}

Example 6: Clicking a deeply nested element with attributes
{
  "action": "ClickAction",
  "selector": {
    "type": "xpathSelector",
    "value": "//div[@role='dialog']//button[@aria-label='Close']"
  }
}

Example 7: Typing into a dynamically generated input field
{
  "action": "TypeAction",
  "text": "password123!",
  "selector": {
    "type": "xpathSelector",
    "value": "//input[contains(@id, 'password')]"
  }
}
"##;

/// Fill the reduction template.
pub fn render_reduction(url: &str, raw_html: &str) -> String {
    HTML_REDUCER_TEMPLATE
        .replace("$url", url)
        .replace("$raw_html", raw_html)
}

/// Fill the action-generation template.
pub fn render_action(
    task: &str,
    url: &str,
    step_index: u32,
    previous_actions: &str,
    reduced_html: &str,
) -> String {
    ACTION_GENERATOR_TEMPLATE
        .replace("$task", task)
        .replace("$url", url)
        .replace("$step_index", &step_index.to_string())
        .replace("$previous_actions", previous_actions)
        .replace("$reduced_html", reduced_html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_template_substitutes_both_fields() {
        let prompt = render_reduction("https://example.com", "<html><body/></html>");
        assert!(prompt.contains("Input URL:\nhttps://example.com"));
        assert!(prompt.contains("Raw HTML:\n<html><body/></html>"));
        assert!(!prompt.contains("$url"));
        assert!(!prompt.contains("$raw_html"));
    }

    #[test]
    fn action_template_substitutes_all_fields() {
        let prompt = render_action(
            "Log in",
            "https://example.com/login",
            4,
            "Step 1: navigate https://example.com",
            "<form id='loginForm'></form>",
        );
        assert!(prompt.contains("Task:\nLog in"));
        assert!(prompt.contains("Step:\n4"));
        assert!(prompt.contains("Step 1: navigate https://example.com"));
        assert!(prompt.contains("<form id='loginForm'></form>"));
        assert!(!prompt.contains("$task"));
        assert!(!prompt.contains("$previous_actions"));
    }

    #[test]
    fn action_template_lists_every_action_kind() {
        for kind in [
            "ClickAction",
            "NavigateAction",
            "TypeAction",
            "SelectAction",
            "WaitAction",
        ] {
            assert!(ACTION_GENERATOR_TEMPLATE.contains(kind), "{kind} missing");
        }
    }
}
