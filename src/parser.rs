//! Netrc file parsing.
//!
//! The grammar follows the conventional `.netrc` format:
//!
//! ```text
//! # comment
//! machine api.example.com
//!     login alice
//!     password "with spaces"
//! default login anonymous password guest
//! macdef init
//! cd /pub
//!
//! ```
//!
//! - Tokens are separated by whitespace; line breaks only matter for
//!   comments and `macdef` bodies.
//! - `#` starts a comment only where a keyword is expected. Inside a value
//!   it is an ordinary character.
//! - Values are bare words or double-quoted strings (`\\`, `\"`, `\n`,
//!   `\r` and `\t` escapes).
//! - A `macdef` body is any text after its name on the same line, then
//!   every following line up to the first empty line.
//!
//! Anything else is a [`SyntaxError`]; there is no best-effort parse.

use crate::error::{Error, Result, SyntaxError};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, take_while1},
    character::complete::{char, line_ending, not_line_ending},
    combinator::{map, opt, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair, terminated},
    IResult,
};
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Machine,
    Default,
    Login,
    Password,
    Account,
    MacDef,
}

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "machine" => Some(Keyword::Machine),
            "default" => Some(Keyword::Default),
            "login" => Some(Keyword::Login),
            "password" => Some(Keyword::Password),
            "account" => Some(Keyword::Account),
            "macdef" => Some(Keyword::MacDef),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Keyword::Machine => "machine",
            Keyword::Default => "default",
            Keyword::Login => "login",
            Keyword::Password => "password",
            Keyword::Account => "account",
            Keyword::MacDef => "macdef",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `machine` (or `default`) entry.
///
/// The `Debug` implementation redacts the password and account.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Machine {
    name: Option<String>,
    login: Option<String>,
    password: Option<String>,
    account: Option<String>,
}

impl Machine {
    fn named(name: String) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    /// The machine name, or `None` for the `default` entry.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.name.is_none()
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Get a field by its netrc keyword (`login`, `password`, `account`).
    ///
    /// Missing fields and unknown keywords both yield `""`.
    pub fn get(&self, field: &str) -> &str {
        let value = match Keyword::from_token(field) {
            Some(Keyword::Login) => &self.login,
            Some(Keyword::Password) => &self.password,
            Some(Keyword::Account) => &self.account,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Machine")
            .field("name", &self.name)
            .field("login", &self.login)
            .field("password", &redact(&self.password))
            .field("account", &redact(&self.account))
            .finish()
    }
}

/// A `macdef` macro. Bodies are stored verbatim and never run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub body: String,
}

/// A parsed netrc file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netrc {
    machines: Vec<Machine>,
    default: Option<Machine>,
    macros: Vec<Macro>,
}

impl Netrc {
    /// Read and parse a netrc file.
    ///
    /// Returns `Err(Error::FileNotFound)` if the file doesn't exist,
    /// `Err(Error::ReadFile)` if it can't be read and `Err(Error::Format)`
    /// if it isn't UTF-8 or isn't valid netrc syntax.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::ReadFile {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let content = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            Error::Format {
                path: path.to_path_buf(),
                source: SyntaxError::new(line, "file is not valid UTF-8"),
            }
        })?;

        Self::parse(&content).map_err(|source| Error::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse netrc content.
    pub fn parse(content: &str) -> std::result::Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(content);
        let mut netrc = Netrc::default();
        let mut current: Option<Machine> = None;

        while let Some((token, line)) = lexer.next_token() {
            // Never echo the token: it may be part of a password.
            let keyword = Keyword::from_token(token).ok_or_else(|| {
                SyntaxError::new(
                    line,
                    "expected one of machine, default, login, password, account, macdef",
                )
            })?;

            match keyword {
                Keyword::Machine => {
                    let name = lexer.value(keyword, line)?;
                    netrc.finish(current.replace(Machine::named(name)));
                }
                Keyword::Default => netrc.finish(current.replace(Machine::default())),
                Keyword::Login => {
                    let entry = open_entry(&mut current, keyword, line)?;
                    entry.login = Some(lexer.value(keyword, line)?);
                }
                Keyword::Password => {
                    let entry = open_entry(&mut current, keyword, line)?;
                    entry.password = Some(lexer.value(keyword, line)?);
                }
                Keyword::Account => {
                    let entry = open_entry(&mut current, keyword, line)?;
                    entry.account = Some(lexer.value(keyword, line)?);
                }
                Keyword::MacDef => {
                    let name = lexer.value(keyword, line)?;
                    let body = lexer.macro_body();
                    netrc.macros.push(Macro { name, body });
                }
            }
        }
        netrc.finish(current);

        Ok(netrc)
    }

    /// First entry whose name is exactly `name`. The `default` entry never matches.
    pub fn machine(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.name() == Some(name))
    }

    /// All named entries, in file order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn default_machine(&self) -> Option<&Machine> {
        self.default.as_ref()
    }

    pub fn macros(&self) -> &[Macro] {
        &self.macros
    }

    fn finish(&mut self, entry: Option<Machine>) {
        match entry {
            Some(entry) if entry.is_default() => {
                // Only the first `default` counts.
                if self.default.is_none() {
                    self.default = Some(entry);
                }
            }
            Some(entry) => self.machines.push(entry),
            None => {}
        }
    }
}

fn open_entry(
    current: &mut Option<Machine>,
    keyword: Keyword,
    line: usize,
) -> std::result::Result<&mut Machine, SyntaxError> {
    current.as_mut().ok_or_else(|| {
        SyntaxError::new(
            line,
            format!("`{}` outside of a machine or default entry", keyword),
        )
    })
}

/// Walks the input token by token, tracking the line for error reports.
struct Lexer<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            line: 1,
        }
    }

    /// Move forward to `rest`, which must be a suffix of the remaining input.
    fn advance(&mut self, rest: &'a str) {
        let consumed = &self.rest[..self.rest.len() - rest.len()];
        self.line += consumed.matches('\n').count();
        self.rest = rest;
    }

    /// Next token at a keyword position, skipping whitespace and comments.
    fn next_token(&mut self) -> Option<(&'a str, usize)> {
        if let Ok((rest, _)) = trivia(self.rest) {
            self.advance(rest);
        }
        let line = self.line;
        let (rest, token) = word(self.rest).ok()?;
        self.advance(rest);
        Some((token, line))
    }

    /// The value following `keyword`.
    fn value(
        &mut self,
        keyword: Keyword,
        keyword_line: usize,
    ) -> std::result::Result<String, SyntaxError> {
        if let Ok((rest, _)) = whitespace(self.rest) {
            self.advance(rest);
        }
        let line = self.line;

        if self.rest.starts_with('"') {
            let (rest, value) = quoted(self.rest).map_err(|_| {
                SyntaxError::new(
                    line,
                    format!("unterminated or invalid quoted value after `{}`", keyword),
                )
            })?;
            self.advance(rest);
            return Ok(value);
        }

        match word(self.rest) {
            Ok((rest, value)) => {
                self.advance(rest);
                Ok(value.to_string())
            }
            Err(_) => Err(SyntaxError::new(
                keyword_line,
                format!("unexpected end of file: missing value after `{}`", keyword),
            )),
        }
    }

    /// Body of a `macdef`: the rest of the name's line, then every following
    /// line up to the first empty one.
    fn macro_body(&mut self) -> String {
        let mut lines = Vec::new();

        if let Ok((rest, first)) = rest_of_line(self.rest) {
            let first = first.trim();
            if !first.is_empty() {
                lines.push(first);
            }
            self.advance(rest);
        }

        let body = self.rest;
        let mut consumed = 0;
        for line in body.split_inclusive('\n') {
            consumed += line.len();
            let content = line.trim_end_matches(['\n', '\r']);
            if content.is_empty() {
                break;
            }
            lines.push(content);
        }
        self.advance(&body[consumed..]);

        lines.join("\n")
    }
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while1(char::is_whitespace)(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('#'), not_line_ending))(input)
}

fn trivia(input: &str) -> IResult<&str, usize> {
    many0_count(alt((whitespace, comment)))(input)
}

fn rest_of_line(input: &str) -> IResult<&str, &str> {
    terminated(not_line_ending, opt(line_ending))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", char('\\')),
                    value("\"", char('"')),
                    value("\n", char('n')),
                    value("\r", char('r')),
                    value("\t", char('t')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COM: &str = "example.com";
    const ORG: &str = "example.org";

    #[test]
    fn test_parse_simple() {
        const SIMPLE: &str = "
            machine example.com
            login user
            password pass
        ";
        found(SIMPLE, COM, "user", "pass");
        notfound(SIMPLE, ORG);
    }

    #[test]
    fn test_parse_oneliner() {
        found("machine example.com login user password pass", COM, "user", "pass");
    }

    #[test]
    fn test_parse_multiple_records() {
        const MULTI: &str = "
            machine example.com login user password pass
            machine example.org login foo password bar
        ";
        found(MULTI, COM, "user", "pass");
        found(MULTI, ORG, "foo", "bar");
        assert_eq!(parse(MULTI).machines().len(), 2);
    }

    #[test]
    fn test_parse_tokens_across_lines() {
        const MANY_LINES: &str = "
            machine
            example.com
            login

            user
            password
            pass
        ";
        found(MANY_LINES, COM, "user", "pass");
    }

    #[test]
    fn test_parse_account() {
        let netrc = parse("machine example.com login u password p account acc");
        let machine = netrc.machine(COM).unwrap();
        assert_eq!(machine.account(), Some("acc"));
        assert_eq!(machine.get("account"), "acc");
    }

    #[test]
    fn test_missing_fields_are_none() {
        let netrc = parse("machine example.com login user");
        let machine = netrc.machine(COM).unwrap();
        assert_eq!(machine.login(), Some("user"));
        assert_eq!(machine.password(), None);
        assert_eq!(machine.get("password"), "");
    }

    #[test]
    fn test_get_unknown_field() {
        let netrc = parse("machine example.com login user password pass");
        assert_eq!(netrc.machine(COM).unwrap().get("port"), "");
    }

    #[test]
    fn test_repeated_field_overwrites() {
        found(
            "machine example.com login first login second password pass",
            COM,
            "second",
            "pass",
        );
    }

    #[test]
    fn test_duplicate_machine_first_wins() {
        const DUPLICATE: &str = "
            machine example.com login first password one
            machine example.com login second password two
        ";
        found(DUPLICATE, COM, "first", "one");
        assert_eq!(parse(DUPLICATE).machines().len(), 2);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        notfound("machine Example.com login u password p", COM);
    }

    #[test]
    fn test_default_is_not_a_fallback() {
        const WITH_DEFAULT: &str = "
            machine example.com login ex password am
            default login def password ault
        ";
        found(WITH_DEFAULT, COM, "ex", "am");
        notfound(WITH_DEFAULT, ORG);

        let netrc = parse(WITH_DEFAULT);
        let default = netrc.default_machine().unwrap();
        assert!(default.is_default());
        assert_eq!(default.name(), None);
        assert_eq!(default.login(), Some("def"));
        assert_eq!(default.password(), Some("ault"));
    }

    #[test]
    fn test_default_first_then_machine() {
        const DEFAULT_FIRST: &str = "
            default login def password ault
            machine example.com login ex password am
        ";
        found(DEFAULT_FIRST, COM, "ex", "am");
        assert_eq!(
            parse(DEFAULT_FIRST).default_machine().unwrap().login(),
            Some("def")
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        const COMMENT: &str = "
            # machine example.com login user password pass
            machine example.org login lo password pa # trailing comment
            #no space after hash
        ";
        notfound(COMMENT, COM);
        found(COMMENT, ORG, "lo", "pa");
    }

    #[test]
    fn test_hash_inside_value() {
        found("machine example.com login #!@$ password pass", COM, "#!@$", "pass");
    }

    #[test]
    fn test_quoted_values() {
        found(
            r#"machine example.com login "john doe" password "p\"a\\ss""#,
            COM,
            "john doe",
            "p\"a\\ss",
        );
    }

    #[test]
    fn test_quoted_empty_value() {
        found(r#"machine example.com login "" password """#, COM, "", "");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Netrc::parse("machine example.com\nlogin \"john").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unknown_escape() {
        assert!(Netrc::parse(r#"machine example.com password "a\qb""#).is_err());
    }

    #[test]
    fn test_macdef_body_is_skipped() {
        const MACRO: &str = "macdef init
machine example.com login mac password def
cd /pub

machine example.com login user password pass
";
        found(MACRO, COM, "user", "pass");

        let netrc = parse(MACRO);
        assert_eq!(netrc.macros().len(), 1);
        assert_eq!(netrc.macros()[0].name, "init");
        assert_eq!(
            netrc.macros()[0].body,
            "machine example.com login mac password def\ncd /pub"
        );
    }

    #[test]
    fn test_macdef_runs_to_end_of_file() {
        let netrc = parse("machine example.com login u password p\nmacdef init\nbin\nget file");
        assert_eq!(netrc.macros()[0].body, "bin\nget file");
        assert_eq!(netrc.machines().len(), 1);
    }

    #[test]
    fn test_macdef_keeps_current_machine_open() {
        let netrc = parse("machine example.com login u\nmacdef init\nbin\n\npassword p\n");
        let machine = netrc.machine(COM).unwrap();
        assert_eq!(machine.password(), Some("p"));
    }

    #[test]
    fn test_macdef_same_line_text_starts_body() {
        let netrc = parse("macdef init machine example.com login u password p
cd /pub
");
        assert!(netrc.machines().is_empty());
        assert_eq!(
            netrc.macros()[0].body,
            "machine example.com login u password p\ncd /pub"
        );
    }

    #[test]
    fn test_line_numbers_after_macro_and_multiline_quote() {
        const INPUT: &str = "machine a.test password \"two\nlines\"\n\
                             macdef init\n\
                             cd /pub\n\
                             \n\
                             bogus\n";
        let err = Netrc::parse(INPUT).unwrap_err();
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_parse_large_file() {
        let mut content = String::new();
        for i in 0..20_000 {
            content.push_str(&format!("machine host{i}.test login user{i} password pass{i}\n"));
        }

        let netrc = parse(&content);
        assert_eq!(netrc.machines().len(), 20_000);
        let machine = netrc.machine("host19999.test").unwrap();
        assert_eq!(machine.login(), Some("user19999"));

        content.push_str("machine\n");
        let err = Netrc::parse(&content).unwrap_err();
        assert_eq!(err.line, 20_001);
    }

    #[test]
    fn test_empty_input() {
        let netrc = parse("");
        assert!(netrc.machines().is_empty());
        assert!(netrc.default_machine().is_none());

        let netrc = parse("  \n# only a comment\n");
        assert!(netrc.machines().is_empty());
    }

    #[test]
    fn test_unknown_token_is_error() {
        let err = Netrc::parse("machine example.com\nlogin user\nfoo bar\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(!err.message.contains("foo"));
    }

    #[test]
    fn test_unterminated_machine() {
        let err = Netrc::parse("machine example.com login user\nmachine").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("machine"));
    }

    #[test]
    fn test_missing_value_at_eof() {
        let err = Netrc::parse("machine example.com login").unwrap_err();
        assert!(err.message.contains("login"));
    }

    #[test]
    fn test_field_before_machine() {
        let err = Netrc::parse("login user password pass").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("outside"));
    }

    #[test]
    fn test_crlf_line_endings() {
        const CRLF: &str = "machine example.com\r\nlogin user\r\npassword pass\r\n";
        found(CRLF, COM, "user", "pass");
    }

    #[test]
    fn test_debug_redacts_password() {
        let netrc = parse("machine example.com login user password hunter2 account acct-secret");
        let debug_output = format!("{:?}", netrc);
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("acct-secret"));
        assert!(debug_output.contains("user"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".netrc");
        match Netrc::load(&path) {
            Err(Error::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("Expected FileNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let temp = tempfile::tempdir().unwrap();
        let result = Netrc::load(temp.path());
        assert!(matches!(result, Err(Error::ReadFile { .. })));
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".netrc");
        std::fs::write(&path, "machine").unwrap();
        match Netrc::load(&path) {
            Err(Error::Format { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.line, 1);
            }
            other => panic!("Expected Format error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_non_utf8_is_format_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".netrc");
        std::fs::write(&path, b"machine example.com\nlogin u\npassword p\xe9ss\n").unwrap();
        match Netrc::load(&path) {
            Err(Error::Format { source, .. }) => assert_eq!(source.line, 3),
            other => panic!("Expected Format error, got: {:?}", other),
        }
    }

    fn parse(netrc: &str) -> Netrc {
        Netrc::parse(netrc).expect("valid netrc")
    }

    #[track_caller]
    fn found(netrc: &str, host: &str, login: &str, password: &str) {
        let netrc = parse(netrc);
        let machine = netrc.machine(host).expect("Didn't find entry");

        assert_eq!(machine.login(), Some(login));
        assert_eq!(machine.password(), Some(password));
    }

    #[track_caller]
    fn notfound(netrc: &str, host: &str) {
        assert!(parse(netrc).machine(host).is_none(), "Found entry");
    }
}
