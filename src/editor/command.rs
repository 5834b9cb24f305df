use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

pub const USAGE: &str = r#"Commands:
  add --ingredient "<name>" [--quantity "<q>"] [--unit "<u>"]
  modify --id <int> [--quantity "<q>"] [--unit "<u>"] [--ingredient "<name>"]
  delete --id <int>
  modify_all --multiplier <float, 0 or more>
  done"#;

/// One edit to a recipe's ingredient list
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        name: String,
        quantity: Option<String>,
        unit: Option<String>,
    },
    Modify {
        id: u32,
        quantity: Option<String>,
        unit: Option<String>,
        name: Option<String>,
    },
    Delete {
        id: u32,
    },
    ModifyAll {
        multiplier: f64,
    },
    Done,
}

/// Why a line of input was not understood
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("could not read the arguments")]
    Malformed,
    #[error("'{command}' does not take --{option}")]
    UnexpectedOption { command: String, option: String },
    #[error("--{0} given more than once")]
    DuplicateOption(String),
    #[error("--{0} is required")]
    MissingOption(&'static str),
    #[error("--{0} must be double-quoted")]
    Unquoted(&'static str),
    #[error("--{option} expects a number, got '{value}'")]
    InvalidNumber { option: &'static str, value: String },
}

struct OptionValue {
    text: String,
    quoted: bool,
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\s*([A-Za-z_]+)((?:\s+--[A-Za-z_]+\s+(?:"[^"]*"|[^\s"]+))*)\s*$"#)
            .expect("command pattern is valid")
    })
}

fn option_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"--([A-Za-z_]+)\s+(?:"([^"]*)"|([^\s"]+))"#).expect("option pattern is valid")
    })
}

impl Command {
    /// Parse one line of the interactive grammar.
    ///
    /// Keywords and option names are case-insensitive. Quoted values are kept
    /// verbatim, including inner whitespace.
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let caps = match line_pattern().captures(line) {
            Some(caps) => caps,
            None => {
                let keyword = line.split_whitespace().next().unwrap_or_default();
                return Err(if is_keyword(keyword) {
                    ParseError::Malformed
                } else {
                    ParseError::UnknownCommand(keyword.to_string())
                });
            }
        };

        let keyword = caps[1].to_lowercase();
        let allowed: &[&str] = match keyword.as_str() {
            "add" => &["ingredient", "quantity", "unit"],
            "modify" => &["id", "quantity", "unit", "ingredient"],
            "delete" => &["id"],
            "modify_all" => &["multiplier"],
            "done" => &[],
            _ => return Err(ParseError::UnknownCommand(caps[1].to_string())),
        };

        let mut options: HashMap<String, OptionValue> = HashMap::new();
        let rest = caps.get(2).map_or("", |m| m.as_str());
        for opt in option_pattern().captures_iter(rest) {
            let name = opt[1].to_lowercase();
            if !allowed.contains(&name.as_str()) {
                return Err(ParseError::UnexpectedOption {
                    command: keyword,
                    option: name,
                });
            }
            let value = match (opt.get(2), opt.get(3)) {
                (Some(quoted), _) => OptionValue {
                    text: quoted.as_str().to_string(),
                    quoted: true,
                },
                (None, Some(bare)) => OptionValue {
                    text: bare.as_str().to_string(),
                    quoted: false,
                },
                (None, None) => return Err(ParseError::Malformed),
            };
            if options.insert(name.clone(), value).is_some() {
                return Err(ParseError::DuplicateOption(name));
            }
        }

        match keyword.as_str() {
            "add" => Ok(Command::Add {
                name: take_string(&mut options, "ingredient")?
                    .ok_or(ParseError::MissingOption("ingredient"))?,
                quantity: take_string(&mut options, "quantity")?,
                unit: take_string(&mut options, "unit")?,
            }),
            "modify" => Ok(Command::Modify {
                id: take_number(&mut options, "id")?.ok_or(ParseError::MissingOption("id"))?,
                quantity: take_string(&mut options, "quantity")?,
                unit: take_string(&mut options, "unit")?,
                name: take_string(&mut options, "ingredient")?,
            }),
            "delete" => Ok(Command::Delete {
                id: take_number(&mut options, "id")?.ok_or(ParseError::MissingOption("id"))?,
            }),
            "modify_all" => Ok(Command::ModifyAll {
                multiplier: take_number(&mut options, "multiplier")?
                    .ok_or(ParseError::MissingOption("multiplier"))?,
            }),
            _ => Ok(Command::Done),
        }
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word.to_lowercase().as_str(),
        "add" | "modify" | "delete" | "modify_all" | "done"
    )
}

fn take_string(
    options: &mut HashMap<String, OptionValue>,
    name: &'static str,
) -> Result<Option<String>, ParseError> {
    match options.remove(name) {
        Some(OptionValue { text, quoted: true }) => Ok(Some(text)),
        Some(_) => Err(ParseError::Unquoted(name)),
        None => Ok(None),
    }
}

fn take_number<T: std::str::FromStr>(
    options: &mut HashMap<String, OptionValue>,
    name: &'static str,
) -> Result<Option<T>, ParseError> {
    match options.remove(name) {
        Some(value) => value
            .text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber {
                option: name,
                value: value.text,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_all_options() {
        let cmd = Command::parse(r#"add --ingredient "Salt" --quantity "1" --unit "tsp""#).unwrap();
        assert_eq!(
            cmd,
            Command::Add {
                name: "Salt".to_string(),
                quantity: Some("1".to_string()),
                unit: Some("tsp".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_is_case_insensitive_and_keeps_inner_whitespace() {
        let cmd = Command::parse(r#"ADD --Ingredient "  extra virgin  olive oil ""#).unwrap();
        assert_eq!(
            cmd,
            Command::Add {
                name: "  extra virgin  olive oil ".to_string(),
                quantity: None,
                unit: None,
            }
        );
        assert_eq!(Command::parse("  Done  ").unwrap(), Command::Done);
    }

    #[test]
    fn test_parse_modify_partial_fields() {
        let cmd = Command::parse(r#"modify --id 3 --unit "g""#).unwrap();
        assert_eq!(
            cmd,
            Command::Modify {
                id: 3,
                quantity: None,
                unit: Some("g".to_string()),
                name: None,
            }
        );
    }

    #[test]
    fn test_parse_options_in_any_order() {
        let cmd = Command::parse(r#"modify --ingredient "Leek" --id "12""#).unwrap();
        assert_eq!(
            cmd,
            Command::Modify {
                id: 12,
                quantity: None,
                unit: None,
                name: Some("Leek".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_delete_and_modify_all() {
        assert_eq!(
            Command::parse("delete --id 7").unwrap(),
            Command::Delete { id: 7 }
        );
        assert_eq!(
            Command::parse("modify_all --multiplier 1.5").unwrap(),
            Command::ModifyAll { multiplier: 1.5 }
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            Command::parse("remove --id 1"),
            Err(ParseError::UnknownCommand("remove".to_string()))
        );
        assert_eq!(
            Command::parse("delete"),
            Err(ParseError::MissingOption("id"))
        );
        assert_eq!(
            Command::parse("delete --id one"),
            Err(ParseError::InvalidNumber {
                option: "id",
                value: "one".to_string()
            })
        );
        assert_eq!(
            Command::parse("delete --id -1"),
            Err(ParseError::InvalidNumber {
                option: "id",
                value: "-1".to_string()
            })
        );
        assert_eq!(
            Command::parse("add --ingredient Salt"),
            Err(ParseError::Unquoted("ingredient"))
        );
        assert_eq!(
            Command::parse(r#"add --ingredient "Salt" --id 2"#),
            Err(ParseError::UnexpectedOption {
                command: "add".to_string(),
                option: "id".to_string()
            })
        );
        assert_eq!(
            Command::parse("delete --id 1 --id 2"),
            Err(ParseError::DuplicateOption("id".to_string()))
        );
        assert_eq!(
            Command::parse(r#"add --ingredient "unterminated"#),
            Err(ParseError::Malformed)
        );
    }

    #[test]
    fn test_parse_empty_name_is_syntactically_valid() {
        assert_eq!(
            Command::parse(r#"add --ingredient """#).unwrap(),
            Command::Add {
                name: String::new(),
                quantity: None,
                unit: None
            }
        );
    }
}
