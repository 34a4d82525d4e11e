//! Splits a raw input line into words.

/// Ordered words of one command line. Words are never empty.
pub type ArgumentVector = Vec<String>;

fn is_delimiter(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

/// Splits `line` on spaces, tabs and newlines.
///
/// Runs of delimiters never produce empty words, so a blank line yields an
/// empty vector.
pub fn tokenize(line: &str) -> ArgumentVector {
    line.split(is_delimiter)
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("echo test"), vec!["echo", "test"]);
    }

    #[test]
    fn test_tokenize_surrounding_whitespace() {
        assert_eq!(tokenize("  ls   -la \t\n"), vec!["ls", "-la"]);
    }

    #[test]
    fn test_tokenize_blank_lines() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t \n").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_control_tokens() {
        assert_eq!(
            tokenize("sleep 1 &&&echo\tdone &"),
            vec!["sleep", "1", "&&&echo", "done", "&"]
        );
    }

    #[test]
    fn test_tokenize_carriage_return_is_not_a_delimiter() {
        assert_eq!(tokenize("echo hi\r\n"), vec!["echo", "hi\r"]);
    }
}
