/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */

//!
//! Splits SQL files into statements and runs them.
//!

use std::path::Path;
use tracing::debug;
use encoding_rs::Encoding;
use crate::config::{read_text, resolve_encoding};
use crate::dialect::GenDialect;
use crate::errors::{Result, S2JdbcError};
use crate::migration::context::{run_in_transaction, SqlExecutionContext};

/// Number of leading words inspected to recognize a block statement.
const BLOCK_HEAD_WORDS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    /// 1-based line the statement starts on.
    pub line: usize,
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct SqlFileExecutor {
    dialect: GenDialect,
    encoding: &'static Encoding,
    statement_delimiter: char,
    block_delimiter: Option<String>,
}

impl SqlFileExecutor {

    pub fn new<S: Into<String>>(dialect: GenDialect, encoding: S, statement_delimiter: char, block_delimiter: Option<String>) -> Result<Self> {
        let encoding = resolve_encoding(&encoding.into())?;
        Ok(SqlFileExecutor { dialect, encoding, statement_delimiter, block_delimiter })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn block_delimiter(&self) -> Option<&str> {
        self.block_delimiter.as_deref().or_else(|| self.dialect.default_block_delimiter())
    }

    pub fn read_statements(&self, path: &Path) -> Result<Vec<SqlStatement>> {
        let content = read_text(path, self.encoding)?;
        Ok(self.split(&content))
    }

    /// Runs every statement of `path` in its own transaction, reporting
    /// failures through `ctx`.
    pub fn execute(&self, ctx: &mut SqlExecutionContext, path: &Path) -> Result<()> {
        for statement in self.read_statements(path)? {
            debug!("{}:{} {}", path.display(), statement.line, statement.sql);
            let result = run_in_transaction(ctx.connection(), |conn| conn.execute(&statement.sql, &[]))
                .map_err(|e| S2JdbcError::SqlFailed {
                    file: path.to_path_buf(),
                    line: statement.line,
                    sql: statement.sql.clone(),
                    message: e.to_string(),
                });
            if let Err(err) = result {
                ctx.notify_exception(err)?;
            }
        }
        Ok(())
    }

    pub fn split(&self, content: &str) -> Vec<SqlStatement> {
        let mut tokenizer = SqlTokenizer::new(self);
        for (index, line) in content.lines().enumerate() {
            tokenizer.feed_line(index + 1, line);
        }
        tokenizer.finish()
    }
}

struct SqlTokenizer<'a> {
    executor: &'a SqlFileExecutor,
    statements: Vec<SqlStatement>,
    current: String,
    /// `current` with literal contents blanked out.
    bare: String,
    start_line: Option<usize>,
    quote: Option<char>,
    dollar_tag: Option<String>,
    in_block_comment: bool,
}

impl<'a> SqlTokenizer<'a> {

    fn new(executor: &'a SqlFileExecutor) -> Self {
        SqlTokenizer {
            executor,
            statements: Vec::new(),
            current: String::new(),
            bare: String::new(),
            start_line: None,
            quote: None,
            dollar_tag: None,
            in_block_comment: false,
        }
    }

    fn in_literal(&self) -> bool {
        self.quote.is_some() || self.dollar_tag.is_some() || self.in_block_comment
    }

    fn feed_line(&mut self, line_no: usize, line: &str) {
        if !self.in_literal() {
            if let Some(block_delimiter) = self.executor.block_delimiter() {
                if line.trim().eq_ignore_ascii_case(block_delimiter) {
                    self.flush();
                    return;
                }
            }
        }
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if self.in_block_comment {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    self.in_block_comment = false;
                    i += 1;
                }
                i += 1;
                continue;
            }
            if let Some(q) = self.quote {
                self.push_literal(c);
                if c == q {
                    if chars.get(i + 1) == Some(&q) {
                        self.push_literal(q);
                        i += 1;
                    } else {
                        self.quote = None;
                    }
                }
                i += 1;
                continue;
            }
            if let Some(tag) = self.dollar_tag.clone() {
                if starts_with_at(&chars, i, &tag) {
                    for t in tag.chars() {
                        self.push_literal(t);
                    }
                    self.dollar_tag = None;
                    i += tag.chars().count();
                } else {
                    self.push_literal(c);
                    i += 1;
                }
                continue;
            }
            match c {
                '-' if chars.get(i + 1) == Some(&'-') => break,
                '/' if chars.get(i + 1) == Some(&'*') => {
                    self.separate(line_no);
                    self.in_block_comment = true;
                    i += 2;
                    continue;
                }
                '\'' | '"' => {
                    self.push(line_no, c);
                    self.quote = Some(c);
                }
                '$' if self.executor.dialect.supports_dollar_quoting() => {
                    match dollar_tag_at(&chars, i) {
                        Some(tag) => {
                            for t in tag.chars() {
                                self.push(line_no, t);
                            }
                            i += tag.chars().count();
                            self.dollar_tag = Some(tag);
                            continue;
                        }
                        None => self.push(line_no, c),
                    }
                }
                c if c == self.executor.statement_delimiter => {
                    if self.ends_statement() {
                        self.flush();
                    } else {
                        self.push(line_no, c);
                    }
                }
                c => self.push(line_no, c),
            }
            i += 1;
        }
        if self.start_line.is_some() {
            self.current.push('\n');
            self.bare.push('\n');
        }
    }

    fn push(&mut self, line_no: usize, c: char) {
        if self.start_line.is_none() {
            if c.is_whitespace() {
                return;
            }
            self.start_line = Some(line_no);
        }
        self.current.push(c);
        self.bare.push(c);
    }

    /// Keeps the words around a dropped comment apart.
    fn separate(&mut self, line_no: usize) {
        if !self.current.ends_with(char::is_whitespace) {
            self.push(line_no, ' ');
        }
    }

    fn push_literal(&mut self, c: char) {
        self.current.push(c);
        self.bare.push(if c == '\n' { '\n' } else { ' ' });
    }

    /// Whether the delimiter just read closes the current statement.
    fn ends_statement(&self) -> bool {
        let words = words(&self.bare);
        let head: Vec<String> = words.iter().take(BLOCK_HEAD_WORDS).cloned().collect();
        if !self.executor.dialect.is_block_start(&head) {
            return true;
        }
        if self.executor.block_delimiter().is_some() {
            return false;
        }
        block_closed(&words)
    }

    fn flush(&mut self) {
        let sql = self.current.trim();
        if let (false, Some(line)) = (sql.is_empty(), self.start_line) {
            self.statements.push(SqlStatement { line, sql: sql.to_string() });
        }
        self.current.clear();
        self.bare.clear();
        self.start_line = None;
    }

    fn finish(mut self) -> Vec<SqlStatement> {
        self.flush();
        self.statements
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '=' || c == '`' || c == '@'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_uppercase())
        .collect()
}

/// Whether every BEGIN (or CASE) seen so far has been closed by an END.
/// A routine without a BEGIN body ends at its first delimiter.
fn block_closed(words: &[String]) -> bool {
    let mut depth = 0i32;
    let mut opened = false;
    for (i, word) in words.iter().enumerate() {
        match word.as_str() {
            "BEGIN" | "CASE" => {
                depth += 1;
                opened = true;
            }
            "END" => {
                let next = words.get(i + 1).map(String::as_str);
                if !matches!(next, Some("IF") | Some("LOOP") | Some("WHILE") | Some("REPEAT")) {
                    depth -= 1;
                }
            }
            _ => {}
        }
    }
    !opened || depth <= 0
}

fn starts_with_at(chars: &[char], at: usize, tag: &str) -> bool {
    let mut i = at;
    for t in tag.chars() {
        if chars.get(i) != Some(&t) {
            return false;
        }
        i += 1;
    }
    true
}

/// Reads a `$tag$` opening at `at`, e.g. `$$` or `$body$`.
fn dollar_tag_at(chars: &[char], at: usize) -> Option<String> {
    let mut j = at + 1;
    while let Some(c) = chars.get(j) {
        if *c == '$' {
            let tag: String = chars[at..=j].iter().collect();
            let first_is_digit = chars.get(at + 1).map(|c| c.is_ascii_digit()).unwrap_or(false);
            return if first_is_digit { None } else { Some(tag) };
        }
        if !(c.is_alphanumeric() || *c == '_') {
            return None;
        }
        j += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(dialect: GenDialect) -> SqlFileExecutor {
        SqlFileExecutor::new(dialect, "UTF-8", ';', None).unwrap()
    }

    fn sqls(statements: Vec<SqlStatement>) -> Vec<String> {
        statements.into_iter().map(|s| s.sql).collect()
    }

    #[test]
    fn test_split_simple_statements() {
        let statements = executor(GenDialect::Sqlite).split("CREATE TABLE a (id integer);\n\nCREATE TABLE b (id integer);\n");
        assert_eq!(statements, vec![
            SqlStatement { line: 1, sql: "CREATE TABLE a (id integer)".to_string() },
            SqlStatement { line: 3, sql: "CREATE TABLE b (id integer)".to_string() },
        ]);
    }

    #[test]
    fn test_comments_are_dropped() {
        let content = "-- header\nINSERT INTO a VALUES (1); -- trailing\n/* block\n comment */ INSERT INTO a VALUES (2);";
        let statements = executor(GenDialect::Sqlite).split(content);
        assert_eq!(sqls(statements.clone()), vec!["INSERT INTO a VALUES (1)", "INSERT INTO a VALUES (2)"]);
        assert_eq!(statements[1].line, 4);
    }

    #[test]
    fn test_literals_keep_delimiters_and_comment_markers() {
        let content = "INSERT INTO a VALUES ('x;y', 'it''s -- fine', \"q;\");";
        let statements = executor(GenDialect::Sqlite).split(content);
        assert_eq!(sqls(statements), vec!["INSERT INTO a VALUES ('x;y', 'it''s -- fine', \"q;\")"]);
    }

    #[test]
    fn test_literal_spanning_lines() {
        let statements = executor(GenDialect::Sqlite).split("INSERT INTO a VALUES ('line1;\nline2');\nSELECT 1;");
        assert_eq!(sqls(statements), vec!["INSERT INTO a VALUES ('line1;\nline2')", "SELECT 1"]);
    }

    #[test]
    fn test_missing_final_delimiter() {
        let statements = executor(GenDialect::Sqlite).split("DROP TABLE a;\nDROP TABLE b");
        assert_eq!(sqls(statements), vec!["DROP TABLE a", "DROP TABLE b"]);
    }

    #[test]
    fn test_sqlite_trigger_is_one_statement() {
        let content = "CREATE TRIGGER t AFTER INSERT ON a\nBEGIN\n  UPDATE b SET n = n + 1;\n  UPDATE c SET n = n + 1;\nEND;\nCREATE TABLE d (id integer);";
        let statements = executor(GenDialect::Sqlite).split(content);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.starts_with("CREATE TRIGGER"));
        assert!(statements[0].sql.ends_with("END"));
        assert_eq!(statements[1].line, 6);
    }

    #[test]
    fn test_mysql_procedure_with_nested_ends() {
        let content = "CREATE PROCEDURE p()\nBEGIN\n  IF 1 = 1 THEN\n    SELECT 1;\n  END IF;\nEND;\nSELECT 2;";
        let statements = executor(GenDialect::Mysql).split(content);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.contains("END IF;"));
        assert_eq!(statements[1].sql, "SELECT 2");
    }

    #[test]
    fn test_oracle_block_ends_at_slash() {
        let content = "CREATE OR REPLACE PROCEDURE p IS\nBEGIN\n  NULL;\nEND;\n/\nCREATE TABLE a (id number(10));";
        let statements = executor(GenDialect::Oracle).split(content);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.ends_with("END;"));
        assert_eq!(statements[1].sql, "CREATE TABLE a (id number(10))");
    }

    #[test]
    fn test_configured_block_delimiter() {
        let executor = SqlFileExecutor::new(GenDialect::SqlServer, "UTF-8", ';', Some("go".to_string())).unwrap();
        let statements = executor.split("CREATE PROCEDURE p AS\nSELECT 1;\nSELECT 2;\nGO\nDROP TABLE a;");
        assert_eq!(sqls(statements), vec!["CREATE PROCEDURE p AS\nSELECT 1;\nSELECT 2;", "DROP TABLE a"]);
    }

    #[test]
    fn test_postgres_dollar_quoting() {
        let content = "CREATE FUNCTION f() RETURNS int AS $body$\nBEGIN\n  RETURN 1;\nEND;\n$body$ LANGUAGE plpgsql;\nSELECT $1;";
        let statements = executor(GenDialect::Postgres).split(content);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.ends_with("$body$ LANGUAGE plpgsql"));
        assert_eq!(statements[1].sql, "SELECT $1");
    }

    #[test]
    fn test_block_comment_keeps_words_apart() {
        let statements = executor(GenDialect::Sqlite).split("DROP/* old */TABLE a;\nSELECT 1/* one */+/* two */2;");
        assert_eq!(sqls(statements), vec!["DROP TABLE a", "SELECT 1 + 2"]);
    }

    #[test]
    fn test_bodyless_routines_end_at_delimiter() {
        let content = "CREATE FUNCTION f() RETURNS INT DETERMINISTIC RETURN 1;\nCREATE TABLE t (id int);\nCREATE TABLE u (id int);";
        for dialect in [GenDialect::Mysql, GenDialect::Standard] {
            let statements = executor(dialect).split(content);
            assert_eq!(sqls(statements), vec![
                "CREATE FUNCTION f() RETURNS INT DETERMINISTIC RETURN 1",
                "CREATE TABLE t (id int)",
                "CREATE TABLE u (id int)",
            ]);
        }
    }

    #[test]
    fn test_mysql_trigger_without_body() {
        let content = "CREATE TRIGGER t BEFORE INSERT ON a FOR EACH ROW SET NEW.n = 1;\nDROP TABLE b;";
        let statements = executor(GenDialect::Mysql).split(content);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], SqlStatement { line: 2, sql: "DROP TABLE b".to_string() });
    }

    #[test]
    fn test_unsupported_encoding() {
        assert!(matches!(
            SqlFileExecutor::new(GenDialect::Sqlite, "no-such-charset", ';', None),
            Err(S2JdbcError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_read_statements_in_windows_31j() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emp.sql");
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("-- 社員\nINSERT INTO EMP (NAME) VALUES ('山田');\n");
        std::fs::write(&path, &bytes).unwrap();
        let executor = SqlFileExecutor::new(GenDialect::Sqlite, "Windows-31J", ';', None).unwrap();
        assert_eq!(executor.encoding(), encoding_rs::SHIFT_JIS);
        let statements = executor.read_statements(&path).unwrap();
        assert_eq!(statements, vec![SqlStatement { line: 2, sql: "INSERT INTO EMP (NAME) VALUES ('山田')".to_string() }]);
    }
}
