//! Command Tokenization
//!
//! A submitted line is split on whitespace; the first token selects a
//! command from a closed set, the rest are positional arguments. There is
//! no flag parsing and no quoting.

/// The closed set of recognized command names, plus a fallback carrying
/// whatever unrecognized name the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandName {
    Ls,
    Cd,
    Cp,
    Echo,
    Uname,
    Exit,
    Unknown(String),
}

impl CommandName {
    pub fn parse(token: &str) -> Self {
        match token {
            "ls" => CommandName::Ls,
            "cd" => CommandName::Cd,
            "cp" => CommandName::Cp,
            "echo" => CommandName::Echo,
            "uname" => CommandName::Uname,
            "exit" => CommandName::Exit,
            other => CommandName::Unknown(other.to_string()),
        }
    }
}

/// Split a line into a command name and its arguments. Whitespace runs
/// collapse; a blank line yields `None`.
pub fn tokenize(line: &str) -> Option<(CommandName, Vec<String>)> {
    let mut tokens = line.split_whitespace();
    let name = CommandName::parse(tokens.next()?);
    let args = tokens.map(str::to_string).collect();
    Some((name, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(CommandName::parse("ls"), CommandName::Ls);
        assert_eq!(CommandName::parse("cd"), CommandName::Cd);
        assert_eq!(CommandName::parse("cp"), CommandName::Cp);
        assert_eq!(CommandName::parse("echo"), CommandName::Echo);
        assert_eq!(CommandName::parse("uname"), CommandName::Uname);
        assert_eq!(CommandName::parse("exit"), CommandName::Exit);
    }

    #[test]
    fn test_parse_unknown_carries_raw_name() {
        assert_eq!(
            CommandName::parse("grep"),
            CommandName::Unknown("grep".to_string())
        );
        // case-sensitive: "LS" is not "ls"
        assert_eq!(
            CommandName::parse("LS"),
            CommandName::Unknown("LS".to_string())
        );
    }

    #[test]
    fn test_tokenize_blank_line() {
        assert_eq!(tokenize(""), None);
        assert_eq!(tokenize("   \t  "), None);
    }

    #[test]
    fn test_tokenize_collapses_whitespace_runs() {
        let (name, args) = tokenize("  echo  a b\t\tc ").unwrap();
        assert_eq!(name, CommandName::Echo);
        assert_eq!(args, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenize_no_args() {
        let (name, args) = tokenize("uname").unwrap();
        assert_eq!(name, CommandName::Uname);
        assert!(args.is_empty());
    }
}
