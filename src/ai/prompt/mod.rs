//! Prompt Builder System
//!
//! Standardized prompt construction for completion requests.
//! Every advisor prompt is assembled from the same small set of sections so
//! the model always sees role, input data, requested format and hard rules in
//! the same order.
//!
//! ## Section Order Convention
//!
//! 1. **Role**: who the model is and what it must produce
//! 2. **Context**: input data as `Label: value` lines, in insertion order
//! 3. **Format**: numbered points or a JSON schema the parser understands
//! 4. **Rules**: `ВАЖНО:` constraints that keep output parseable

mod templates;

pub use templates::AdvisorPrompts;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Ordered `Label: value` lines
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Numbered points under a header
    Numbered { header: String, items: Vec<String> },
    /// Bulleted lines under a header
    Bullets { header: String, items: Vec<String> },
    /// Fenced block, used for JSON answer schemas
    Code { language: String, content: String },
    /// Hard constraints on the answer
    Rules(Vec<String>),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add a context item, appending to the previous context block when adjacent
    pub fn context_item(mut self, key: &str, value: impl Into<String>) -> Self {
        let item = (key.to_string(), value.into());
        match self.sections.last_mut() {
            Some(PromptSection::Context(items)) => items.push(item),
            _ => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    /// Add text section
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.into(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: impl Into<String>) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.into(),
        });
        self
    }

    pub fn numbered(mut self, header: &str, items: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Numbered {
            header: header.to_string(),
            items: items.into_iter().map(String::from).collect(),
        });
        self
    }

    pub fn bullets(mut self, header: &str, items: Vec<String>) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.to_string(),
            items,
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add hard constraints
    pub fn rules(mut self, rules: Vec<String>) -> Self {
        self.sections.push(PromptSection::Rules(rules));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!("Ты опытный {}. {}\n\n", expertise, task));
                }
                PromptSection::Context(items) => {
                    for (key, value) in items {
                        prompt.push_str(&format!("{}: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}:\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Numbered { header, items } => {
                    prompt.push_str(&format!("{}:\n", header));
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&format!("{}:\n", header));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("ВАЖНО:\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("агроном", "Дай советы.")
            .numbered("Формат ответа", vec!["Прогноз", "Риски"])
            .build();

        assert!(prompt.starts_with("Ты опытный агроном. Дай советы."));
        assert!(prompt.contains("Формат ответа:\n1. Прогноз\n2. Риски"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Поле", "Северное")
            .context_item("Культура", "Пшеница")
            .context_item("Площадь", "12.5 га")
            .build();

        assert_eq!(prompt, "Поле: Северное\nКультура: Пшеница\nПлощадь: 12.5 га");
    }

    #[test]
    fn test_separate_context_blocks() {
        let prompt = PromptBuilder::new()
            .context_item("A", "1")
            .text("между")
            .context_item("B", "2")
            .build();

        assert_eq!(prompt, "A: 1\n\nмежду\n\nB: 2");
    }

    #[test]
    fn test_rules_and_code() {
        let prompt = PromptBuilder::new()
            .code("json", "{\"summary\": \"...\"}")
            .rules(vec!["Цены в тенге (₸)".to_string()])
            .build();

        assert!(prompt.contains("```json\n{\"summary\": \"...\"}\n```"));
        assert!(prompt.ends_with("ВАЖНО:\n- Цены в тенге (₸)"));
    }

    #[test]
    fn test_empty_builder() {
        assert_eq!(PromptBuilder::new().build(), "");
    }
}
