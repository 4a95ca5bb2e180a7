//! Natural-language input classification
//!
//! A heuristic gate deciding whether a line typed in AI mode is a literal
//! shell command or a natural-language request. Deterministic and idempotent;
//! the rules are evaluated in order and the first match wins.

/// How a line of input should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A literal shell command, passed through untouched
    Literal,
    /// A natural-language request for the agent
    NaturalLanguage,
}

/// Program names that mark a line as a literal command when they lead it
const COMMON_COMMANDS: &[&str] = &[
    "ls", "cd", "mkdir", "rm", "cp", "mv", "cat", "grep", "find", "git", "npm", "yarn", "pnpm",
    "node", "python", "java", "go", "docker", "kubectl", "ssh", "curl", "wget", "sudo", "apt",
    "brew", "yum", "pip", "vim", "nano", "echo", "touch",
];

/// Interrogative prefixes (English plus Chinese equivalents)
const QUESTION_PREFIXES: &[&str] = &[
    "how", "what", "why", "when", "where", "who", "which", "如何", "怎么", "为什么", "什么", "谁",
    "何时", "哪里",
];

/// Classify a line of terminal input.
///
/// A short, command-shaped phrase is never misclassified merely for sharing
/// a prefix with a question word: the command deny-list is checked before
/// the interrogative prefixes.
pub fn classify(text: &str) -> InputKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return InputKind::Literal;
    }

    if let Some(first) = trimmed.split_whitespace().next() {
        if COMMON_COMMANDS.contains(&first) {
            return InputKind::Literal;
        }
    }

    let word_count = trimmed
        .split_whitespace()
        .filter(|word| word.chars().count() > 1)
        .count();
    if word_count >= 3 {
        return InputKind::NaturalLanguage;
    }

    let lowered = trimmed.to_lowercase();
    for prefix in QUESTION_PREFIXES {
        if lowered.starts_with(prefix) {
            return InputKind::NaturalLanguage;
        }
    }

    InputKind::Literal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_literal() {
        assert_eq!(classify(""), InputKind::Literal);
        assert_eq!(classify("   "), InputKind::Literal);
    }

    #[test]
    fn test_common_commands_are_literal() {
        assert_eq!(classify("ls"), InputKind::Literal);
        assert_eq!(classify("git status"), InputKind::Literal);
        assert_eq!(classify("docker ps -a"), InputKind::Literal);
        // The deny-list wins regardless of trailing word count
        assert_eq!(
            classify("git commit all my changes with a nice message"),
            InputKind::Literal
        );
    }

    #[test]
    fn test_three_meaningful_words_is_natural_language() {
        assert_eq!(
            classify("show all hidden files"),
            InputKind::NaturalLanguage
        );
        assert_eq!(
            classify("delete every temporary file here"),
            InputKind::NaturalLanguage
        );
    }

    #[test]
    fn test_question_prefixes() {
        assert_eq!(classify("how do"), InputKind::NaturalLanguage);
        assert_eq!(classify("what now"), InputKind::NaturalLanguage);
        assert_eq!(
            classify("如何查看当前目录下的所有文件"),
            InputKind::NaturalLanguage
        );
        assert_eq!(classify("怎么办"), InputKind::NaturalLanguage);
    }

    #[test]
    fn test_short_unknown_input_is_literal() {
        assert_eq!(classify("make"), InputKind::Literal);
        assert_eq!(classify("cargo build"), InputKind::Literal);
    }

    #[test]
    fn test_deterministic() {
        let input = "how do I list files";
        assert_eq!(classify(input), classify(input));
    }
}
