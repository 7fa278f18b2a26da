//! Canonical browser actions and the permissive parser for LLM replies.
//!
//! The generation prompt instructs the model to answer with a JSON object
//! like `{"action":"ClickAction","selector":{"type":"xpathSelector",
//! "value":"//button"}}`. Models mostly comply but occasionally return
//! prose or off-schema fields, so anything that does not decode cleanly
//! falls back to the trimmed raw text instead of failing the request.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

/// Locator kinds the benchmark harness understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorKind {
    #[serde(rename = "attributeValueSelector")]
    AttributeValue,
    #[serde(rename = "tagContainsSelector")]
    TagContains,
    #[serde(rename = "xpathSelector")]
    Xpath,
}

/// Locator for the element an action targets. In practice the prompts only
/// ever ask for XPath selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(rename = "type")]
    pub kind: SelectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub value: String,
}

/// The single next browser interaction recommended to the harness.
///
/// Click, Type and Select carry their selector non-optionally: a reply
/// missing one fails shape construction and takes the fallback path.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Click {
        selector: Selector,
    },
    Navigate {
        url: Option<String>,
    },
    Type {
        text: String,
        selector: Selector,
    },
    Select {
        value: String,
        selector: Selector,
    },
    Wait {
        time_seconds: Option<f64>,
    },
    /// Discriminant outside the known set; the tag and selector are kept
    /// verbatim so the harness can decide what to do with it.
    Other {
        tag: String,
        selector: Option<Selector>,
    },
}

impl Action {
    /// Compact JSON rendering, the canonical string form returned to the
    /// harness. Absent optional fields are omitted rather than null.
    pub fn render(&self) -> String {
        let value = match self {
            Action::Click { selector } => {
                json!({"type": "ClickAction", "selector": selector})
            }
            Action::Navigate { url: Some(url) } => {
                json!({"type": "NavigateAction", "url": url})
            }
            Action::Navigate { url: None } => json!({"type": "NavigateAction"}),
            Action::Type { text, selector } => {
                json!({"type": "TypeAction", "text": text, "selector": selector})
            }
            Action::Select { value, selector } => {
                json!({"type": "SelectAction", "value": value, "selector": selector})
            }
            Action::Wait {
                time_seconds: Some(secs),
            } => json!({"type": "WaitAction", "time_seconds": secs}),
            Action::Wait { time_seconds: None } => json!({"type": "WaitAction"}),
            Action::Other {
                tag,
                selector: Some(selector),
            } => json!({"type": tag, "selector": selector}),
            Action::Other {
                tag,
                selector: None,
            } => json!({"type": tag}),
        };
        value.to_string()
    }
}

/// Parse an LLM reply into the canonical action string.
///
/// Never errors: non-JSON input is returned trimmed (it may already be a
/// final plain-text action), and any anomaly while decoding a JSON object
/// is logged and degrades to the same trimmed passthrough.
pub fn parse_action(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return raw.trim().to_string();
    };

    match decode_action(&value) {
        Ok(action) => action.render(),
        Err(e) => {
            warn!("failed to parse action JSON: {e:#}");
            raw.trim().to_string()
        }
    }
}

fn decode_action(value: &Value) -> Result<Action> {
    let object = value.as_object().context("reply is not a JSON object")?;

    // `type` wins the tie-break over `action`; null and empty-string values
    // count as missing.
    let discriminant = object
        .get("type")
        .filter(|v| !discriminant_missing(v))
        .or_else(|| object.get("action").filter(|v| !discriminant_missing(v)))
        .context("missing 'action'/'type' field")?;
    let discriminant = discriminant
        .as_str()
        .with_context(|| format!("discriminant is not a string: {discriminant}"))?;

    // "Click" and "ClickAction" resolve to the same shape.
    let tag = if discriminant.ends_with("Action") {
        discriminant.to_string()
    } else {
        format!("{discriminant}Action")
    };

    let selector = match object.get("selector") {
        Some(sel @ Value::Object(_)) => Some(
            serde_json::from_value::<Selector>(sel.clone()).context("malformed selector")?,
        ),
        _ => None,
    };

    let action = match tag.as_str() {
        "ClickAction" => Action::Click {
            selector: selector.context("ClickAction requires a selector")?,
        },
        "NavigateAction" => Action::Navigate {
            url: string_field(object, "url")?,
        },
        "TypeAction" => Action::Type {
            text: string_field(object, "text")?.unwrap_or_default(),
            selector: selector.context("TypeAction requires a selector")?,
        },
        "SelectAction" => Action::Select {
            value: string_field(object, "value")?.unwrap_or_default(),
            selector: selector.context("SelectAction requires a selector")?,
        },
        "WaitAction" => Action::Wait {
            time_seconds: number_field(object, "time_seconds")?,
        },
        _ => Action::Other { tag, selector },
    };

    Ok(action)
}

fn discriminant_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("field '{key}' is not a string: {other}"),
    }
}

fn number_field(object: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => bail!("field '{key}' is not a number: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(parse_action(""), "");
    }

    #[test]
    fn non_json_input_is_trimmed() {
        assert_eq!(parse_action("  click the login button \n"), "click the login button");
    }

    #[test]
    fn json_without_discriminant_falls_back() {
        let raw = r#"{"selector":{"type":"xpathSelector","value":"//a"}}"#;
        assert_eq!(parse_action(raw), raw);
    }

    #[test]
    fn json_non_object_falls_back() {
        assert_eq!(parse_action(" [1, 2, 3] "), "[1, 2, 3]");
        assert_eq!(parse_action("null"), "null");
        assert_eq!(parse_action("\"click\""), "\"click\"");
    }

    #[test]
    fn click_keeps_xpath_verbatim() {
        let raw = r#"{"action":"ClickAction","selector":{"type":"xpathSelector","value":"//button"}}"#;
        let rendered = parse_action(raw);
        assert!(rendered.contains("ClickAction"));
        assert!(rendered.contains("//button"));
        assert!(rendered.contains("xpathSelector"));
    }

    #[test]
    fn discriminant_suffix_is_idempotent() {
        let short = r#"{"type":"Click","selector":{"type":"xpathSelector","value":"//button"}}"#;
        let long = r#"{"type":"ClickAction","selector":{"type":"xpathSelector","value":"//button"}}"#;
        assert_eq!(parse_action(short), parse_action(long));
    }

    #[test]
    fn type_key_wins_over_action_key() {
        let raw = r#"{"type":"WaitAction","action":"ClickAction","time_seconds":2}"#;
        let rendered = parse_action(raw);
        assert!(rendered.contains("WaitAction"));
        assert!(!rendered.contains("ClickAction"));
    }

    #[test]
    fn empty_type_defers_to_action_key() {
        let raw = r#"{"type":"","action":"WaitAction"}"#;
        assert!(parse_action(raw).contains("WaitAction"));
    }

    #[test]
    fn click_without_selector_falls_back() {
        let raw = r#"{"action":"ClickAction"}"#;
        assert_eq!(parse_action(raw), raw);
    }

    #[test]
    fn type_action_defaults_missing_text() {
        let raw = r#"{"action":"TypeAction","selector":{"type":"xpathSelector","value":"//input"}}"#;
        let rendered = parse_action(raw);
        assert!(rendered.contains(r#""text":"""#));
    }

    #[test]
    fn wait_without_duration_omits_the_field() {
        let rendered = parse_action(r#"{"action":"WaitAction"}"#);
        assert_eq!(rendered, r#"{"type":"WaitAction"}"#);
        // A downstream consumer re-reading this must see no duration at all.
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert!(value.get("time_seconds").is_none());
    }

    #[test]
    fn wait_keeps_integer_durations() {
        let rendered = parse_action(r#"{"action":"WaitAction","time_seconds":3}"#);
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["time_seconds"].as_f64(), Some(3.0));
    }

    #[test]
    fn navigate_url_is_optional() {
        assert_eq!(
            parse_action(r#"{"action":"NavigateAction"}"#),
            r#"{"type":"NavigateAction"}"#
        );
        let rendered = parse_action(r#"{"action":"NavigateAction","url":"https://example.com"}"#);
        assert!(rendered.contains("https://example.com"));
    }

    #[test]
    fn unknown_discriminant_renders_generic_shape() {
        let raw = r#"{"action":"Scroll","selector":{"type":"xpathSelector","value":"//div"}}"#;
        let rendered = parse_action(raw);
        assert!(rendered.contains("ScrollAction"));
        assert!(rendered.contains("//div"));
    }

    #[test]
    fn malformed_selector_falls_back() {
        let raw = r##"{"action":"ClickAction","selector":{"type":"cssSelector","value":"#go"}}"##;
        assert_eq!(parse_action(raw), raw);
    }

    #[test]
    fn non_object_selector_is_ignored() {
        // Matches the shape rules: a selector that is not an object is
        // treated as absent, which for Navigate is fine.
        let rendered = parse_action(r#"{"action":"NavigateAction","selector":"//a"}"#);
        assert_eq!(rendered, r#"{"type":"NavigateAction"}"#);
    }

    #[test]
    fn selector_attribute_round_trips() {
        let raw = r#"{"action":"ClickAction","selector":{"type":"attributeValueSelector","attribute":"id","value":"go"}}"#;
        let rendered = parse_action(raw);
        assert!(rendered.contains("attributeValueSelector"));
        assert!(rendered.contains(r#""attribute":"id""#));
    }
}
