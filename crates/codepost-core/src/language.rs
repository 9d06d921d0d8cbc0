//! File extension for the editor's language.

/// Extension (without the dot) for a language name as shown in the editor's
/// language picker. Unknown languages get `txt`.
pub fn extension_for(language: &str) -> &'static str {
    match language.trim() {
        "C++" => "cpp",
        "C" => "c",
        "Java" => "java",
        "Python" | "Python3" => "py",
        "C#" => "cs",
        "JavaScript" => "js",
        "TypeScript" => "ts",
        "PHP" => "php",
        "Swift" => "swift",
        "Kotlin" => "kt",
        "Dart" => "dart",
        "Go" => "go",
        "Ruby" => "rb",
        "Scala" => "scala",
        "Rust" => "rs",
        "Racket" => "rkt",
        "Erlang" => "erl",
        "Elixir" => "ex",
        "MySQL" | "MS SQL Server" | "Oracle" | "PostgreSQL" => "sql",
        "Pandas" => "py",
        "Bash" => "sh",
        _ => "txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(extension_for("Python3"), "py");
        assert_eq!(extension_for("C++"), "cpp");
        assert_eq!(extension_for("C#"), "cs");
        assert_eq!(extension_for("MS SQL Server"), "sql");
        assert_eq!(extension_for(" Rust "), "rs");
    }

    #[test]
    fn test_unknown_language_is_txt() {
        assert_eq!(extension_for("Brainfuck"), "txt");
        assert_eq!(extension_for(""), "txt");
        assert_eq!(extension_for("python3"), "txt");
    }
}
