//! Batch script parsing
//!
//! One operation per line: `name arg1 arg2 ...`. Arguments are separated by
//! whitespace; double quotes group an argument containing spaces (`\"` and
//! `\\` escape inside quotes). Lines whose first non-blank character is `#`
//! are comments. Unquoted integer tokens become `Value::Int`.

use kvbatch_core::Value;
use thiserror::Error;

/// One staged operation read from a script
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// 1-based source line
    pub number: usize,
    pub name: String,
    pub args: Vec<Value>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unterminated quoted argument")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: operation name must not be quoted")]
    QuotedName { line: usize },
}

pub fn parse(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = tokenize(trimmed, number)?.into_iter();
        let name = match tokens.next() {
            Some(Token::Bare(name)) => name,
            Some(Token::Quoted(_)) => return Err(ScriptError::QuotedName { line: number }),
            None => continue,
        };

        lines.push(ScriptLine {
            number,
            name,
            args: tokens.map(Token::into_value).collect(),
        });
    }

    Ok(lines)
}

#[derive(Debug, PartialEq)]
enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    fn into_value(self) -> Value {
        match self {
            Token::Bare(text) => match text.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Bulk(text),
            },
            Token::Quoted(text) => Value::Bulk(text),
        }
    }
}

fn tokenize(line: &str, number: usize) -> Result<Vec<Token>, ScriptError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(ScriptError::UnterminatedQuote { line: number }),
                    },
                    Some(other) => text.push(other),
                    None => return Err(ScriptError::UnterminatedQuote { line: number }),
                }
            }
            tokens.push(Token::Quoted(text));
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token::Bare(text));
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_script() {
        let script = "\
# seed a user
set user:1 ada

hset profile name \"Ada Lovelace\" born 1815
get user:1
";
        let lines = parse(script).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[0].name, "set");
        assert_eq!(lines[0].args, vec![Value::from("user:1"), Value::from("ada")]);
        assert_eq!(
            lines[1].args,
            vec![
                Value::from("profile"),
                Value::from("name"),
                Value::from("Ada Lovelace"),
                Value::from("born"),
                Value::Int(1815),
            ]
        );
        assert_eq!(lines[2].number, 5);
    }

    #[test]
    fn test_quoted_numbers_stay_text() {
        let lines = parse("set k \"42\"\nincrby n -3").unwrap();
        assert_eq!(lines[0].args[1], Value::from("42"));
        assert_eq!(lines[1].args[1], Value::Int(-3));
    }

    #[test]
    fn test_escapes_and_empty_quotes() {
        let lines = parse(r#"set k "say \"hi\" \\ bye" """#).unwrap();
        assert_eq!(
            lines[0].args,
            vec![
                Value::from("k"),
                Value::from(r#"say "hi" \ bye"#),
                Value::from("")
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_reports_line() {
        let err = parse("get a\nset k \"open").unwrap_err();
        assert_eq!(err, ScriptError::UnterminatedQuote { line: 2 });
    }

    #[test]
    fn test_quoted_name_rejected() {
        assert_eq!(
            parse("\"set\" k v").unwrap_err(),
            ScriptError::QuotedName { line: 1 }
        );
    }

    #[test]
    fn test_comments_and_blank_lines_only() {
        assert!(parse("  # nothing\n\n   \n").unwrap().is_empty());
    }
}
