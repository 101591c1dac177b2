use serde::{Deserialize, Deserializer, Serializer};
use std::{fs, io, path::Path};

/// Converts a not found error to Ok(false)
pub fn path_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

// Helpers for serde to handle multiline notebook text.

/// Write text as a list of lines, each keeping its line ending, the way `nbformat` stores
/// `source`. The empty string becomes an empty list.
pub fn serialize_lines<S>(text: &str, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_seq(split_lines(text))
}

/// Split after every line boundary Python's `str.splitlines` recognises, keeping the endings.
/// `\r\n` counts as one boundary.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let end = match ch {
            '\r' => match chars.peek() {
                Some(&(next, '\n')) => {
                    chars.next();
                    next + 1
                }
                _ => idx + 1,
            },
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => idx + ch.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Accept either a single string or a list of line strings, joining the latter without
/// separators.
pub fn deserialize_lines<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Multiline {
        Block(String),
        Lines(Vec<String>),
    }

    Ok(match Multiline::deserialize(d)? {
        Multiline::Block(text) => text,
        Multiline::Lines(lines) => lines.concat(),
    })
}

pub fn header(header: &str) {
    let len = header.len();
    print!("\n{}\n", header);
    for _ in 0..len {
        print!("=");
    }
    println!("\n")
}

#[cfg(test)]
mod test {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(
            serialize_with = "super::serialize_lines",
            deserialize_with = "super::deserialize_lines"
        )]
        source: String,
    }

    fn lines_of(text: &str) -> serde_json::Value {
        let wrapper = Wrapper {
            source: text.into(),
        };
        serde_json::to_value(&wrapper).unwrap()["source"].clone()
    }

    #[test]
    fn splits_keeping_line_endings() {
        assert_eq!(
            lines_of("import pandas as pd\n\nprint(1)\n"),
            serde_json::json!(["import pandas as pd\n", "\n", "print(1)\n"])
        );
        assert_eq!(
            lines_of("## 1. Load Data"),
            serde_json::json!(["## 1. Load Data"])
        );
        assert_eq!(lines_of(""), serde_json::json!([]));
    }

    #[test]
    fn splits_like_python_splitlines() {
        assert_eq!(
            super::split_lines("a\r\nb\rc\x0bd\x0ce\x1cf\u{85}g\u{2028}h\u{2029}i"),
            [
                "a\r\n", "b\r", "c\x0b", "d\x0c", "e\x1c", "f\u{85}", "g\u{2028}", "h\u{2029}",
                "i"
            ]
        );
        assert_eq!(super::split_lines("x\n\n"), ["x\n", "\n"]);
        assert_eq!(super::split_lines("\r"), ["\r"]);
        assert!(super::split_lines("").is_empty());

        let text = "one\rtwo\u{2028}three\r\n";
        assert_eq!(super::split_lines(text).concat(), text);
        assert_eq!(
            lines_of(text),
            serde_json::json!(["one\r", "two\u{2028}", "three\r\n"])
        );
    }

    #[test]
    fn reads_block_or_lines() {
        let block: Wrapper = serde_json::from_str(r#"{"source": "a\nb"}"#).unwrap();
        assert_eq!(block.source, "a\nb");
        let lines: Wrapper = serde_json::from_str(r#"{"source": ["a\n", "b"]}"#).unwrap();
        assert_eq!(lines.source, "a\nb");
        let empty: Wrapper = serde_json::from_str(r#"{"source": []}"#).unwrap();
        assert_eq!(empty.source, "");
    }
}
