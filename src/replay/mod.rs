use sqlx::PgPool;
use thiserror::Error;

use crate::adapter::{self, CreateViewOptions, ViewCreationError};
use crate::identifier::{IdentifierParseError, QualifiedIdentifier};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("line {line}: expected a create_view directive, found {found:?}")]
    UnexpectedLine { line: usize, found: String },

    #[error("line {line}: malformed create_view directive")]
    MalformedDirective { line: usize },

    #[error("line {line}: invalid view name: {source}")]
    InvalidName {
        line: usize,
        #[source]
        source: IdentifierParseError,
    },

    #[error("line {line}: view body never terminated by delimiter {delimiter:?}")]
    UnterminatedBody { line: usize, delimiter: String },
}

/// One parsed `create_view` block, ready to hand to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDirective {
    pub name: QualifiedIdentifier,
    pub materialized: bool,
    pub sql_definition: String,
}

/// Parse serialized dump text back into directives. This recognizes exactly
/// the block format the serializer emits, which is how round trips are
/// executed: generated text goes through this parser and the adapter instead
/// of being evaluated as code.
pub fn parse_dump(text: &str) -> Result<Vec<ViewDirective>, ReplayError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut directives = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        let (directive, body_delimiter) = parse_header(line, i + 1)?;
        let header_line = i + 1;
        i += 1;

        let mut body_lines: Vec<&str> = Vec::new();
        let mut terminated = false;
        while i < lines.len() {
            if lines[i] == body_delimiter {
                terminated = true;
                i += 1;
                break;
            }
            body_lines.push(lines[i]);
            i += 1;
        }
        if !terminated {
            return Err(ReplayError::UnterminatedBody {
                line: header_line,
                delimiter: body_delimiter,
            });
        }

        directives.push(ViewDirective {
            sql_definition: body_lines.join("\n"),
            ..directive
        });
    }

    Ok(directives)
}

/// Recreate every directive's view, in order, through the adapter.
pub async fn apply(pool: &PgPool, directives: &[ViewDirective]) -> Result<(), ViewCreationError> {
    for directive in directives {
        adapter::create_view(
            pool,
            &directive.name.to_sql(true),
            &directive.sql_definition,
            &CreateViewOptions {
                materialized: directive.materialized,
                no_data: false,
            },
        )
        .await?;
    }

    Ok(())
}

// Header shape: create_view <name>, [materialized: true, ]sql_definition: <<-DELIM
fn parse_header(line: &str, line_number: usize) -> Result<(ViewDirective, String), ReplayError> {
    let rest = line
        .strip_prefix("create_view ")
        .ok_or_else(|| ReplayError::UnexpectedLine {
            line: line_number,
            found: line.to_owned(),
        })?;

    let comma = find_unquoted_comma(rest).ok_or(ReplayError::MalformedDirective {
        line: line_number,
    })?;
    let name = QualifiedIdentifier::parse(rest[..comma].trim()).map_err(|source| {
        ReplayError::InvalidName {
            line: line_number,
            source,
        }
    })?;

    let mut rest = rest[comma + 1..].trim_start();
    let materialized = match rest.strip_prefix("materialized: true,") {
        Some(after) => {
            rest = after.trim_start();
            true
        }
        None => false,
    };

    let delimiter = rest
        .strip_prefix("sql_definition: <<-")
        .ok_or(ReplayError::MalformedDirective { line: line_number })?;
    if delimiter.is_empty()
        || !delimiter
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ReplayError::MalformedDirective { line: line_number });
    }

    Ok((
        ViewDirective {
            name,
            materialized,
            sql_definition: String::new(),
        },
        delimiter.to_owned(),
    ))
}

// The name token may contain quoted commas, so the argument separator is the
// first comma outside double quotes.
fn find_unquoted_comma(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}
