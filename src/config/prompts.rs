//! Prompt templates for tubechat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for retrieval-augmented answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// First assistant message of every session.
    pub greeting: String,
    /// Template wrapping the retrieved chunks and the question.
    pub template: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            greeting: "Hello, I'm a bot. How can I help?".to_string(),

            template: r#"Use the provided excerpts to answer the user's question clearly and concisely.
If needed, complement the answer using the chat history.
If you don't know the answer based on the provided excerpts and the chat history, say that you don't know, without trying to guess or make up information.
When possible, be direct and objective.

### Excerpts:
{{chunks}}

### Question:
{{question}}
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in a single left-to-right pass over the
    /// template; substituted values are never scanned again. Unknown
    /// placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];

            let value = after
                .find("}}")
                .and_then(|close| vars.get(&after[..close]).map(|v| (close, v)));

            match value {
                Some((close, value)) => {
                    result.push_str(value);
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.rag.greeting.is_empty());
        assert!(prompts.rag.template.contains("{{chunks}}"));
        assert!(prompts.rag.template.contains("{{question}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = std::collections::HashMap::new();
        vars.insert("a".to_string(), "{{b}}".to_string());
        vars.insert("b".to_string(), "{{a}}".to_string());

        for _ in 0..50 {
            assert_eq!(Prompts::render("[{{a}}|{{b}}]", &vars), "[{{b}}|{{a}}]");
        }
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Bob".to_string());

        assert_eq!(
            Prompts::render("{{greeting}} {{name}} {{ {{name}}}}", &vars),
            "{{greeting}} Bob {{ Bob}}"
        );
        assert_eq!(Prompts::render("open {{name", &vars), "open {{name");
    }

    #[test]
    fn test_custom_dir_overrides_rag_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "greeting = \"Olá, sou um bot. Como posso ajudar?\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.rag.greeting, "Olá, sou um bot. Como posso ajudar?");
        // Fields missing from the file keep their defaults
        assert!(prompts.rag.template.contains("{{question}}"));
    }

    #[test]
    fn test_provided_vars_win_over_custom() {
        let mut custom = std::collections::HashMap::new();
        custom.insert("tone".to_string(), "formal".to_string());
        custom.insert("question".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = std::collections::HashMap::new();
        vars.insert("question".to_string(), "Why?".to_string());

        let out = prompts.render_with_custom("{{tone}}: {{question}}", &vars);
        assert_eq!(out, "formal: Why?");
    }
}
