//! JSON Repair Mechanism
//!
//! Unified JSON object extraction and repair for completion text.
//!
//! Handles common LLM JSON output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - JSON embedded in explanatory text
//! - Missing closing braces/brackets
//! - Trailing commas
//! - Truncated strings
//! - Control characters in strings

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{AgriError, ErrorCategory, LlmError, Result};

// =============================================================================
// Convenience Functions
// =============================================================================

/// Locate and parse the first JSON object in completion text.
///
/// Returns `None` when the text holds no recoverable object; never panics.
pub fn extract_json_object(content: &str) -> Option<Map<String, Value>> {
    match JsonRepairer::new().parse_or_repair(content) {
        Ok((Value::Object(map), _)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            debug!("No JSON object in completion: {}", e);
            None
        }
    }
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// JSON repair strategies
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse a JSON object, attempting repair if the initial parse fails.
    ///
    /// Returns (Value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = self.preprocess(raw);

        if cleaned.starts_with('{')
            && let Ok(value) = serde_json::from_str::<Value>(&cleaned)
        {
            return Ok((value, false));
        }

        // Object surrounded by prose or a mid-text code fence
        let candidate = match self.extract_object_from_mixed(&cleaned) {
            Some(extracted) => {
                if let Ok(value) = serde_json::from_str::<Value>(&extracted) {
                    return Ok((value, true));
                }
                extracted
            }
            // Unbalanced: take everything from the first brace and repair it
            None => match cleaned.find('{') {
                Some(start) => cleaned[start..].to_string(),
                None => {
                    return Err(Self::parse_error("no JSON object found", &cleaned));
                }
            },
        };

        for attempt in 1..=self.max_repair_attempts {
            let repaired = self.repair_attempt(&candidate, attempt);

            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                debug!("JSON repaired on attempt {}", attempt);
                return Ok((value, true));
            }
        }

        Err(Self::parse_error(
            &format!(
                "failed to repair JSON after {} attempts",
                self.max_repair_attempts
            ),
            &cleaned,
        ))
    }

    fn parse_error(reason: &str, content: &str) -> AgriError {
        LlmError::new(
            ErrorCategory::ParseError,
            format!(
                "{}. Content preview: {}...",
                reason,
                content.chars().take(200).collect::<String>()
            ),
        )
        .into()
    }

    /// Preprocess raw input
    fn preprocess(&self, raw: &str) -> String {
        let s = raw.trim().trim_start_matches('\u{feff}');
        self.strip_code_fences(s).trim().to_string()
    }

    /// Strip markdown code fences wrapping the whole text
    fn strip_code_fences(&self, s: &str) -> String {
        let mut result = s;

        // Remove ```json ... ``` or ``` ... ```
        if result.starts_with("```") {
            result = match result.find('\n') {
                Some(first_newline) => &result[first_newline + 1..],
                None => result.trim_start_matches('`'),
            };
        }

        if let Some(stripped) = result.trim_end().strip_suffix("```") {
            result = stripped.trim_end();
        }

        result.to_string()
    }

    /// Attempt repair with increasing aggressiveness
    fn repair_attempt(&self, s: &str, level: usize) -> String {
        match level {
            1 => {
                let result = self.fix_trailing_commas(s);
                self.balance_brackets(&result)
            }
            2 => {
                let result = self.fix_trailing_commas(s);
                let result = self.fix_truncated_strings(&result);
                self.balance_brackets(&result)
            }
            _ => {
                let result = self.remove_control_chars(s);
                let result = self.fix_trailing_commas(&result);
                let result = self.fix_truncated_strings(&result);
                let result = self.balance_brackets(&result);
                self.truncate_to_valid(&result)
            }
        }
    }

    /// Fix trailing commas before ] or }
    fn fix_trailing_commas(&self, s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_string = false;
        let mut escape = false;

        for (i, &ch) in chars.iter().enumerate() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                    if matches!(next, Some(']') | Some('}')) {
                        continue;
                    }
                }
                _ => {}
            }

            result.push(ch);
        }

        result
    }

    /// Balance brackets by adding missing closers in nesting order
    fn balance_brackets(&self, s: &str) -> String {
        let mut result = s.to_string();
        let mut stack: Vec<char> = Vec::new();
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' if !in_string => stack.push('}'),
                '[' if !in_string => stack.push(']'),
                '}' | ']' if !in_string => {
                    stack.pop();
                }
                _ => {}
            }
        }

        if in_string {
            result.push('"');
        }

        while let Some(closer) = stack.pop() {
            result.push(closer);
        }

        result
    }

    /// Close strings left open at a line break
    fn fix_truncated_strings(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len() + 10);
        let mut in_string = false;
        let mut escape = false;

        for ch in s.chars() {
            if escape {
                escape = false;
                result.push(ch);
                continue;
            }

            match ch {
                '\\' if in_string => {
                    escape = true;
                    result.push(ch);
                }
                '"' => {
                    in_string = !in_string;
                    result.push(ch);
                }
                '\n' | '\r' if in_string => {
                    result.push('"');
                    in_string = false;
                    result.push(ch);
                }
                _ => result.push(ch),
            }
        }

        if in_string {
            result.push('"');
        }

        result
    }

    /// Remove control characters that break JSON parsing
    fn remove_control_chars(&self, s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\r' || *c == '\t')
            .collect()
    }

    /// Truncate to the end of the first complete top-level value
    fn truncate_to_valid(&self, s: &str) -> String {
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s.char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' | '[' if !in_string => depth += 1,
                '}' | ']' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return s[..i + 1].to_string();
                    }
                }
                _ => {}
            }
        }

        s.to_string()
    }

    /// Extract the first balanced `{...}` from mixed content
    fn extract_object_from_mixed(&self, s: &str) -> Option<String> {
        let start = s.find('{')?;

        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape = false;

        for (i, ch) in s[start..].char_indices() {
            if escape {
                escape = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape = true,
                '"' => in_string = !in_string,
                '{' | '[' if !in_string => depth += 1,
                '}' | ']' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }

        None
    }
}
