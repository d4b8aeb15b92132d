//! SQL DDL source parsing
//!
//! A tolerant extractor for `CREATE TABLE` statements. It is not a SQL
//! parser: statements it does not recognize are skipped without error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ConstraintDetection;
use crate::schema::parser::SourceParser;
use crate::schema::types::{CanonicalSchema, ColumnAttributes, Table};
use crate::utils::naming::{canonical_identifier, is_word};

static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)--.*$").expect("line comment pattern"));

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

const IDENTIFIER: &str = r#"(?:"[^"]*"|`[^`]*`|\[[^\]]*\]|[\w$]+)"#;

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^create\s+table\s+(?:if\s+not\s+exists\s+)?({id}(?:\s*\.\s*{id})*)\s*\((.*)\)$",
        id = IDENTIFIER
    ))
    .expect("create table pattern")
});

static CREATE_TABLE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcreate\s+table\b").expect("create table keyword pattern"));

static TABLE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:constraint\s+\S+\s+)?(primary\s+key|unique(?:\s+(?:key|index))?)(?:\s+[^\s(]+)?\s*\((.*)\)",
    )
    .expect("table key pattern")
});

/// Keywords that end a column's type and start its constraint clauses
const COLUMN_CONSTRAINT_KEYWORDS: &[&str] = &[
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "REFERENCES",
    "DEFAULT",
    "CHECK",
    "CONSTRAINT",
    "COLLATE",
    "AUTO_INCREMENT",
    "AUTOINCREMENT",
    "GENERATED",
    "COMMENT",
];

/// Strip `--` and `/* */` comments and collapse whitespace runs to a single
/// space.
///
/// Runs before any structural matching so that comments and line breaks
/// cannot leak into column definitions.
pub fn strip_comments_and_normalize(sql: &str) -> String {
    let cleaned = LINE_COMMENT.replace_all(sql, "");
    let cleaned = BLOCK_COMMENT.replace_all(&cleaned, "");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Parser for SQL text containing `CREATE TABLE` statements
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlSource {
    detection: ConstraintDetection,
}

impl SqlSource {
    pub fn new(detection: ConstraintDetection) -> Self {
        Self { detection }
    }

    /// Parse every recognizable `CREATE TABLE` statement in `sql`
    pub fn parse_sql(&self, sql: &str) -> CanonicalSchema {
        let normalized = strip_comments_and_normalize(sql);
        let mut schema = CanonicalSchema::new();

        let pieces = split_top_level(&normalized, ';');
        for piece in &pieces {
            if !piece.terminated {
                if !piece.text.is_empty() {
                    tracing::debug!(fragment = %preview(piece.text), "Ignoring unterminated statement");
                }
                continue;
            }

            match self.parse_create_table(piece.text) {
                Some((name, table)) => {
                    tracing::debug!(table = %name, columns = table.len(), "Parsed CREATE TABLE statement");
                    schema.add_table(&name, table);
                }
                None => {
                    tracing::debug!(statement = %preview(piece.text), "Skipping statement that is not a CREATE TABLE");
                }
            }
        }

        schema
    }

    /// Parse one statement (without its trailing `;`)
    fn parse_create_table(&self, statement: &str) -> Option<(String, Table)> {
        let captures = CREATE_TABLE.captures(create_table_text(statement)?)?;
        let name = canonical_identifier(captures.get(1)?.as_str());
        if name.is_empty() {
            return None;
        }
        let body = captures.get(2)?.as_str();

        let mut table = Table::new();
        let mut table_keys = Vec::new();

        for piece in split_top_level(body, ',') {
            let tokens = top_level_tokens(piece.text);
            if tokens.is_empty() {
                continue;
            }

            if is_table_constraint(&tokens) {
                table_keys.push(piece.text);
                continue;
            }

            match parse_column(&tokens) {
                Some(column) => {
                    let attributes = match self.detection {
                        ConstraintDetection::Scoped => column.scoped_attributes(),
                        ConstraintDetection::Block => column.block_attributes(body),
                    };
                    table.add_column(&column.name, attributes);
                }
                None => {
                    tracing::debug!(table = %name, definition = %piece.text, "Skipping unrecognized column definition");
                }
            }
        }

        if self.detection == ConstraintDetection::Scoped {
            for clause in table_keys {
                apply_table_key(&mut table, clause);
            }
        }

        Some((name, table))
    }
}

impl SourceParser for SqlSource {
    fn format_name(&self) -> &'static str {
        "sql"
    }

    fn parse_source(&self, input: &str) -> Option<CanonicalSchema> {
        Some(self.parse_sql(input))
    }
}

/// A column definition split into name, type and trailing modifiers
#[derive(Debug, PartialEq)]
struct ColumnDefinition {
    name: String,
    data_type: String,
    /// Uppercased modifier tokens following the type
    modifiers: Vec<String>,
}

impl ColumnDefinition {
    fn has_modifier(&self, sequence: &[&str]) -> bool {
        self.modifiers
            .windows(sequence.len())
            .any(|window| window.iter().zip(sequence).all(|(token, word)| token == word))
    }

    fn scoped_attributes(&self) -> ColumnAttributes {
        ColumnAttributes::new(&self.data_type)
            .primary_key(self.has_modifier(&["PRIMARY", "KEY"]))
            .nullable(!self.has_modifier(&["NOT", "NULL"]))
            .unique(self.has_modifier(&["UNIQUE"]))
    }

    /// Substring tests over the whole table body. A column is flagged when
    /// both the keyword and its own name occur anywhere in the body, so one
    /// column's constraint can be attributed to another.
    fn block_attributes(&self, body: &str) -> ColumnAttributes {
        let block = body.to_lowercase();
        let mentions_name = block.contains(&self.name);

        ColumnAttributes::new(&self.data_type)
            .primary_key(block.contains("primary key") && mentions_name)
            .nullable(!block.contains(&format!("{} not null", self.name)))
            .unique(block.contains("unique") && mentions_name)
    }
}

fn parse_column(tokens: &[&str]) -> Option<ColumnDefinition> {
    let (raw_name, rest) = tokens.split_first()?;
    let name = canonical_identifier(raw_name);
    if name.is_empty() || raw_name.starts_with('(') {
        return None;
    }

    let type_len = rest
        .iter()
        .position(|token| COLUMN_CONSTRAINT_KEYWORDS.contains(&token.to_uppercase().as_str()))
        .unwrap_or(rest.len());
    if type_len == 0 {
        return None;
    }

    Some(ColumnDefinition {
        name,
        data_type: rest[..type_len].join(" ").trim().to_lowercase(),
        modifiers: rest[type_len..].iter().map(|token| token.to_uppercase()).collect(),
    })
}

/// The statement text from its last top-level `CREATE TABLE` onwards.
///
/// Text without a `;` of its own (a title line, a `\connect` meta-command)
/// is glued to the front of the following statement and gets dropped here.
fn create_table_text(statement: &str) -> Option<&str> {
    let mut scanner = Scanner::default();
    let mut scanned = 0;
    let mut start = None;

    for keyword in CREATE_TABLE_KEYWORD.find_iter(statement) {
        for c in statement[scanned..keyword.start()].chars() {
            scanner.at_top_level(c);
        }
        scanned = keyword.start();
        if scanner.is_idle() {
            start = Some(keyword.start());
        }
    }

    let start = start?;
    if start > 0 {
        tracing::debug!(prefix = %preview(&statement[..start]), "Ignoring text before CREATE TABLE");
    }
    Some(statement[start..].trim())
}

/// Whether a body entry is a table-level constraint rather than a column
fn is_table_constraint(tokens: &[&str]) -> bool {
    let first = tokens[0].to_uppercase();
    let second = tokens.get(1).map(|token| token.to_uppercase());

    match first.as_str() {
        "PRIMARY" | "FOREIGN" => second.as_deref() == Some("KEY"),
        "UNIQUE" | "CONSTRAINT" | "CHECK" | "EXCLUDE" => true,
        // MySQL inline index definitions: `KEY idx_name (col)`
        "KEY" | "INDEX" => tokens.last().map_or(false, |token| token.starts_with('(')),
        _ => tokens[0].starts_with('('),
    }
}

/// Apply a table-level `PRIMARY KEY (..)` or single-column `UNIQUE (..)`
/// clause to the columns it names
fn apply_table_key(table: &mut Table, clause: &str) {
    let Some(captures) = TABLE_KEY.captures(clause) else {
        return;
    };
    let is_primary = captures[1].to_uppercase().starts_with("PRIMARY");
    let columns: Vec<String> = split_top_level(&captures[2], ',')
        .iter()
        .filter_map(|piece| key_column_name(piece.text))
        .collect();

    if !is_primary && columns.len() != 1 {
        return;
    }

    for name in &columns {
        match table.column_mut(name) {
            Some(column) if is_primary => column.primary_key = true,
            Some(column) => column.unique = true,
            None => {
                tracing::debug!(column = %name, "Table constraint names an unknown column");
            }
        }
    }
}

/// Column name from a key list entry such as `email`, `"Email" DESC` or
/// `name(20)`
fn key_column_name(entry: &str) -> Option<String> {
    let first = top_level_tokens(entry).into_iter().next()?;
    let bare = first.split('(').next().unwrap_or(first);
    let name = canonical_identifier(bare);

    if is_word(&name) || bare.starts_with(['"', '`', '[']) {
        Some(name)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Piece<'a> {
    text: &'a str,
    /// Whether the piece ended at a delimiter (rather than end of input)
    terminated: bool,
}

/// Split on `delimiter` where it is outside parentheses and quotes
fn split_top_level(text: &str, delimiter: char) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if scanner.at_top_level(c) && c == delimiter {
            pieces.push(Piece {
                text: text[start..i].trim(),
                terminated: true,
            });
            start = i + c.len_utf8();
        }
    }

    pieces.push(Piece {
        text: text[start..].trim(),
        terminated: false,
    });
    pieces
}

/// Split on spaces outside parentheses and quotes
fn top_level_tokens(text: &str) -> Vec<&str> {
    split_top_level(text, ' ')
        .into_iter()
        .map(|piece| piece.text)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Tracks parenthesis depth and quoting while walking SQL text
#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    quote: Option<char>,
}

impl Scanner {
    /// Feed one character; returns true when it sits outside any quotes or
    /// parentheses
    fn at_top_level(&mut self, c: char) -> bool {
        if let Some(quote) = self.quote {
            if c == quote {
                self.quote = None;
            }
            return false;
        }

        match c {
            '\'' | '"' | '`' => {
                self.quote = Some(c);
                false
            }
            '(' => {
                self.depth += 1;
                false
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            _ => self.depth == 0,
        }
    }

    /// Outside any quotes or parentheses
    fn is_idle(&self) -> bool {
        self.depth == 0 && self.quote.is_none()
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 60;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}
