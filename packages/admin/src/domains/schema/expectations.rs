//! Post-conditions a migration script claims to establish.
//!
//! Every column added by an `ALTER TABLE ... ADD [COLUMN]` clause becomes an
//! [`ExpectedColumn`] that is checked against `information_schema` once the
//! script has run. The set is tracked through the script in order, so a
//! column the same script later drops or renames is not expected under its
//! old name. String literals, comments and dollar-quoted bodies (`DO $$`
//! blocks, function bodies) are skipped before matching.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use lazy_static::lazy_static;
use regex::Regex;

/// Plain or double-quoted identifier.
const IDENT: &str = r#"(?:"(?:[^"]|"")+"|\w+)"#;

lazy_static! {
    static ref ALTER_TABLE: Regex = Regex::new(&format!(
        r"(?is)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?({id}(?:\s*\.\s*{id})*)\s+(.*)$",
        id = IDENT
    ))
    .unwrap();
    static ref DROP_TABLE: Regex = Regex::new(
        r"(?is)^\s*DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?(.*?)(?:\s+(?:CASCADE|RESTRICT))?\s*$"
    )
    .unwrap();
    static ref ADD_COLUMN: Regex = Regex::new(&format!(
        r"(?is)^ADD\s+(COLUMN\s+)?(?:IF\s+NOT\s+EXISTS\s+)?({id})",
        id = IDENT
    ))
    .unwrap();
    static ref DROP_COLUMN: Regex = Regex::new(&format!(
        r"(?is)^DROP\s+(COLUMN\s+)?(?:IF\s+EXISTS\s+)?({id})",
        id = IDENT
    ))
    .unwrap();
    static ref RENAME_COLUMN: Regex = Regex::new(&format!(
        r"(?is)^RENAME\s+(?:COLUMN\s+)?({id})\s+TO\s+({id})\s*$",
        id = IDENT
    ))
    .unwrap();
    static ref RENAME_TABLE: Regex = Regex::new(&format!(
        r"(?is)^RENAME\s+TO\s+({id})\s*$",
        id = IDENT
    ))
    .unwrap();
}

/// `ADD <keyword>` / `DROP <keyword>` forms that touch something other than
/// a column.
const NON_COLUMN_KEYWORDS: &[&str] = &[
    "constraint",
    "primary",
    "unique",
    "foreign",
    "check",
    "exclude",
];

/// A column that must exist after the migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpectedColumn {
    /// `None` means the connection's current schema.
    pub schema: Option<String>,
    pub table: String,
    pub column: String,
}

impl ExpectedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ExpectedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}.{}", schema, self.table, self.column),
            None => write!(f, "{}.{}", self.table, self.column),
        }
    }
}

/// Parses `table.column` or `schema.table.column`.
impl FromStr for ExpectedColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            bail!("Invalid column reference '{}': empty segment", s);
        }

        match parts.as_slice() {
            [table, column] => Ok(Self::new(normalize_ident(table), normalize_ident(column))),
            [schema, table, column] => Ok(Self {
                schema: Some(normalize_ident(schema)),
                table: normalize_ident(table),
                column: normalize_ident(column),
            }),
            _ => Err(anyhow!(
                "Invalid column reference '{}': expected table.column or schema.table.column",
                s
            )),
        }
    }
}

/// Unquoted identifiers fold to lower case; quoted ones keep their case.
fn normalize_ident(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].replace("\"\"", "\"")
    } else {
        raw.to_lowercase()
    }
}

/// Collect the columns the script leaves behind, in the order they were added.
pub fn expected_columns(sql: &str) -> Vec<ExpectedColumn> {
    let mut expected: Vec<ExpectedColumn> = Vec::new();

    for statement in split_statements(sql) {
        if let Some(caps) = ALTER_TABLE.captures(&statement) {
            let Some(table) = TableRef::parse(&caps[1]) else {
                continue;
            };
            for action in split_top_level(&caps[2], ',') {
                apply_action(&mut expected, &table, action);
            }
        } else if let Some(caps) = DROP_TABLE.captures(&statement) {
            for table in split_top_level(&caps[1], ',')
                .into_iter()
                .filter_map(TableRef::parse)
            {
                expected.retain(|column| !table.owns(column));
            }
        }
    }

    expected
}

/// Table named by a DDL statement, possibly schema-qualified.
struct TableRef {
    schema: Option<String>,
    table: String,
}

impl TableRef {
    fn parse(raw: &str) -> Option<Self> {
        match split_top_level(raw, '.').as_slice() {
            [table] => Some(Self {
                schema: None,
                table: normalize_ident(table),
            }),
            [.., schema, table] => Some(Self {
                schema: Some(normalize_ident(schema)),
                table: normalize_ident(table),
            }),
            [] => None,
        }
    }

    /// An unqualified name on either side matches any schema.
    fn owns(&self, column: &ExpectedColumn) -> bool {
        column.table == self.table
            && match (&self.schema, &column.schema) {
                (Some(ours), Some(theirs)) => ours == theirs,
                _ => true,
            }
    }

    fn column(&self, name: &str) -> ExpectedColumn {
        ExpectedColumn {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: normalize_ident(name),
        }
    }
}

fn is_non_column(keyword: &str) -> bool {
    NON_COLUMN_KEYWORDS.contains(&keyword.to_lowercase().as_str())
}

/// Apply one comma-separated `ALTER TABLE` action to the expected set.
fn apply_action(expected: &mut Vec<ExpectedColumn>, table: &TableRef, action: &str) {
    if let Some(caps) = RENAME_TABLE.captures(action) {
        let renamed = normalize_ident(&caps[1]);
        for column in expected.iter_mut() {
            if table.owns(column) {
                column.table = renamed.clone();
            }
        }
    } else if let Some(caps) = RENAME_COLUMN.captures(action) {
        let from = normalize_ident(&caps[1]);
        let to = normalize_ident(&caps[2]);
        for column in expected.iter_mut() {
            if table.owns(column) && column.column == from {
                column.column = to.clone();
            }
        }
    } else if let Some(caps) = ADD_COLUMN.captures(action) {
        if caps.get(1).is_none() && is_non_column(&caps[2]) {
            return;
        }
        let column = table.column(&caps[2]);
        if !expected.contains(&column) {
            expected.push(column);
        }
    } else if let Some(caps) = DROP_COLUMN.captures(action) {
        if caps.get(1).is_none() && is_non_column(&caps[2]) {
            return;
        }
        let dropped = normalize_ident(&caps[2]);
        expected.retain(|column| !(table.owns(column) && column.column == dropped));
    }
}

/// Split on `separator` outside parentheses and double-quoted identifiers.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            c if c == separator && !quoted && depth == 0 => {
                parts.push(text[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());

    parts.retain(|part| !part.is_empty());
    parts
}

/// Split a script into statements on top-level `;`.
///
/// Comments are dropped, string literals collapse to `''` and dollar-quoted
/// bodies to `$$`. Quoted identifiers are kept as written.
fn split_statements(sql: &str) -> Vec<String> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        match (chars[i], chars.get(i + 1).copied()) {
            ('-', Some('-')) => {
                i = skip_line_comment(&chars, i);
                current.push(' ');
            }
            ('/', Some('*')) => {
                i = skip_block_comment(&chars, i);
                current.push(' ');
            }
            ('\'', _) => {
                i = skip_string_literal(&chars, i, allows_backslash_escapes(&current));
                current.push_str("''");
            }
            ('"', _) => {
                let end = skip_quoted_identifier(&chars, i);
                current.extend(&chars[i..end]);
                i = end;
            }
            ('$', _) if !ends_with_ident_char(&current) => match dollar_tag_len(&chars, i) {
                Some(tag_len) => {
                    i = skip_dollar_body(&chars, i, tag_len);
                    current.push_str("$$");
                }
                None => {
                    current.push('$');
                    i += 1;
                }
            },
            (';', _) => {
                finish_statement(&mut statements, &mut current);
                i += 1;
            }
            (c, _) => {
                current.push(c);
                i += 1;
            }
        }
    }
    finish_statement(&mut statements, &mut current);

    statements
}

fn finish_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = std::mem::take(current);
    if !statement.trim().is_empty() {
        statements.push(statement);
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn ends_with_ident_char(text: &str) -> bool {
    text.chars().next_back().is_some_and(is_ident_char)
}

/// `E'...'` strings treat backslash as an escape character.
fn allows_backslash_escapes(preceding: &str) -> bool {
    let mut rev = preceding.chars().rev();
    matches!(rev.next(), Some('e' | 'E')) && !rev.next().is_some_and(is_ident_char)
}

fn skip_line_comment(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |offset| start + offset)
}

/// Block comments nest in Postgres.
fn skip_block_comment(chars: &[char], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;

    while i < chars.len() {
        match (chars[i], chars.get(i + 1).copied()) {
            ('/', Some('*')) => {
                depth += 1;
                i += 2;
            }
            ('*', Some('/')) => {
                depth = depth.saturating_sub(1);
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }

    chars.len()
}

fn skip_string_literal(chars: &[char], start: usize, backslash_escapes: bool) -> usize {
    let mut i = start + 1;

    while i < chars.len() {
        match chars[i] {
            '\\' if backslash_escapes => i += 2,
            '\'' if chars.get(i + 1) == Some(&'\'') => i += 2,
            '\'' => return i + 1,
            _ => i += 1,
        }
    }

    chars.len()
}

fn skip_quoted_identifier(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;

    while i < chars.len() {
        if chars[i] == '"' {
            if chars.get(i + 1) == Some(&'"') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }

    chars.len()
}

/// Length of the `$tag$` delimiter starting at `start`, if there is one.
/// `$1` style parameters are not delimiters.
fn dollar_tag_len(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;

    while i < chars.len() && chars[i] != '$' {
        let c = chars[i];
        let valid = c == '_' || c.is_alphabetic() || (i > start + 1 && c.is_ascii_digit());
        if !valid {
            return None;
        }
        i += 1;
    }

    (i < chars.len()).then_some(i - start + 1)
}

fn skip_dollar_body(chars: &[char], start: usize, tag_len: usize) -> usize {
    let tag = &chars[start..start + tag_len];
    let mut i = start + tag_len;

    while i + tag_len <= chars.len() {
        if &chars[i..i + tag_len] == tag {
            return i + tag_len;
        }
        i += 1;
    }

    chars.len()
}
