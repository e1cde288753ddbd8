use std::fmt;

use thiserror::Error;

/// PostgreSQL reserved keywords. Using one of these as an unquoted identifier
/// changes the meaning of the statement, so rendering must quote them.
const RESERVED_WORDS: [&str; 77] = [
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc",
    "asymmetric", "both", "case", "cast", "check", "collate", "column",
    "constraint", "create", "current_catalog", "current_date", "current_role",
    "current_time", "current_timestamp", "current_user", "default",
    "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in",
    "initially", "intersect", "into", "lateral", "leading", "limit",
    "localtime", "localtimestamp", "not", "null", "offset", "on", "only",
    "or", "order", "placing", "primary", "references", "returning", "select",
    "session_user", "some", "symmetric", "table", "then", "to", "trailing",
    "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierParseError {
    #[error("identifier {raw:?} has an unterminated quoted segment")]
    UnbalancedQuotes { raw: String },

    #[error("identifier {raw:?} contains an empty name segment")]
    EmptySegment { raw: String },

    #[error("identifier {raw:?} has stray characters outside a quoted segment")]
    StrayCharacters { raw: String },

    #[error("identifier {raw:?} has more than one namespace qualifier")]
    TooManySegments { raw: String },
}

/// A parsed object name split into an optional namespace (schema) and the
/// unqualified local name. Both segments are stored unquoted: quoting is a
/// rendering concern, applied again by `to_sql`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedIdentifier {
    namespace: Option<String>,
    local: String,
}

impl QualifiedIdentifier {
    pub fn new(namespace: Option<String>, local: String) -> Self {
        QualifiedIdentifier { namespace, local }
    }

    /// Parse a raw, possibly schema-qualified, possibly quoted name such as
    /// `searches`, `reporting.searches`, `"search in a haystack"` or
    /// `reporting."search in a haystack"`. A `.` inside a quoted segment is
    /// part of the name, not a namespace separator.
    pub fn parse(raw: &str) -> Result<Self, IdentifierParseError> {
        let mut segments: Vec<String> = Vec::new();
        let mut chars = raw.chars().peekable();

        loop {
            let mut segment = String::new();

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == '"' {
                        // A doubled quote inside a quoted segment is a
                        // literal quote character.
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            segment.push('"');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        segment.push(c);
                    }
                }
                if !closed {
                    return Err(IdentifierParseError::UnbalancedQuotes {
                        raw: raw.to_owned(),
                    });
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == '.' {
                        break;
                    }
                    if c == '"' {
                        return Err(IdentifierParseError::StrayCharacters {
                            raw: raw.to_owned(),
                        });
                    }
                    segment.push(c);
                    chars.next();
                }
            }

            if segment.is_empty() {
                return Err(IdentifierParseError::EmptySegment {
                    raw: raw.to_owned(),
                });
            }
            segments.push(segment);

            match chars.next() {
                None => break,
                Some('.') => continue,
                Some(_) => {
                    return Err(IdentifierParseError::StrayCharacters {
                        raw: raw.to_owned(),
                    })
                }
            }
        }

        match segments.len() {
            1 => Ok(QualifiedIdentifier {
                namespace: None,
                local: segments.pop().expect("One segment was just pushed"),
            }),
            2 => {
                let local = segments.pop().expect("Two segments were just pushed");
                let namespace = segments.pop().expect("Two segments were just pushed");
                Ok(QualifiedIdentifier {
                    namespace: Some(namespace),
                    local,
                })
            }
            _ => Err(IdentifierParseError::TooManySegments {
                raw: raw.to_owned(),
            }),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Render back to SQL, quoting each segment only when it needs it. With
    /// `with_namespace: false` the namespace is omitted entirely so that the
    /// result is portable across search-path configurations.
    pub fn to_sql(&self, with_namespace: bool) -> String {
        let local = quote_if_needed(&self.local);
        match (&self.namespace, with_namespace) {
            (Some(namespace), true) => format!("{}.{}", quote_if_needed(namespace), local),
            _ => local,
        }
    }

    /// The local name rendered with quoting forced on. The dump format always
    /// quotes names so that dumps stay byte-stable when a name drifts in or
    /// out of the safe character set.
    pub fn quoted_local(&self) -> String {
        quote(&self.local)
    }
}

impl fmt::Display for QualifiedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql(true))
    }
}

fn quote(segment: &str) -> String {
    format!("\"{}\"", segment.replace('"', "\"\""))
}

fn quote_if_needed(segment: &str) -> String {
    if needs_quoting(segment) {
        quote(segment)
    } else {
        segment.to_owned()
    }
}

// Unquoted identifiers are folded to lower case by Postgres, so anything
// containing an upper case letter must be quoted to survive a round trip.
fn needs_quoting(segment: &str) -> bool {
    let mut chars = segment.chars();
    let safe_start = matches!(chars.next(), Some('a'..='z') | Some('_'));
    let safe_rest = chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '$'));

    !safe_start || !safe_rest || RESERVED_WORDS.contains(&segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn parse_unquoted_name_works() {
            let ident = QualifiedIdentifier::parse("searches").unwrap();
            assert_eq!(ident.namespace(), None);
            assert_eq!(ident.local(), "searches");
        }

        #[test]
        fn parse_qualified_name_works() {
            let ident = QualifiedIdentifier::parse("reporting.searches").unwrap();
            assert_eq!(ident.namespace(), Some("reporting"));
            assert_eq!(ident.local(), "searches");
        }

        #[test]
        fn parse_quoted_name_works() {
            let ident = QualifiedIdentifier::parse("\"search in a haystack\"").unwrap();
            assert_eq!(ident.namespace(), None);
            assert_eq!(ident.local(), "search in a haystack");
        }

        #[test]
        fn parse_qualified_quoted_name_works() {
            let ident =
                QualifiedIdentifier::parse("reporting.\"search in a haystack\"").unwrap();
            assert_eq!(ident.namespace(), Some("reporting"));
            assert_eq!(ident.local(), "search in a haystack");
        }

        #[test]
        fn dot_inside_quotes_is_not_a_separator() {
            let ident = QualifiedIdentifier::parse("\"v1.searches\"").unwrap();
            assert_eq!(ident.namespace(), None);
            assert_eq!(ident.local(), "v1.searches");
        }

        #[test]
        fn doubled_quotes_become_literal_quotes() {
            let ident = QualifiedIdentifier::parse("\"say \"\"hi\"\"\"").unwrap();
            assert_eq!(ident.local(), "say \"hi\"");
        }

        #[test]
        fn unbalanced_quotes_are_rejected() {
            let err = QualifiedIdentifier::parse("\"searches").unwrap_err();
            assert!(matches!(err, IdentifierParseError::UnbalancedQuotes { .. }));
        }

        #[test]
        fn empty_segments_are_rejected() {
            assert!(matches!(
                QualifiedIdentifier::parse("").unwrap_err(),
                IdentifierParseError::EmptySegment { .. }
            ));
            assert!(matches!(
                QualifiedIdentifier::parse("reporting.").unwrap_err(),
                IdentifierParseError::EmptySegment { .. }
            ));
            assert!(matches!(
                QualifiedIdentifier::parse(".searches").unwrap_err(),
                IdentifierParseError::EmptySegment { .. }
            ));
        }

        #[test]
        fn stray_characters_after_quotes_are_rejected() {
            let err = QualifiedIdentifier::parse("\"searches\"extra").unwrap_err();
            assert!(matches!(err, IdentifierParseError::StrayCharacters { .. }));
        }

        #[test]
        fn three_segments_are_rejected() {
            let err = QualifiedIdentifier::parse("db.reporting.searches").unwrap_err();
            assert!(matches!(err, IdentifierParseError::TooManySegments { .. }));
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn safe_names_render_unquoted() {
            let ident = QualifiedIdentifier::parse("reporting.searches").unwrap();
            assert_eq!(ident.to_sql(true), "reporting.searches");
            assert_eq!(ident.to_sql(false), "searches");
        }

        #[test]
        fn names_with_spaces_render_quoted() {
            let ident =
                QualifiedIdentifier::parse("reporting.\"search in a haystack\"").unwrap();
            assert_eq!(ident.to_sql(true), "reporting.\"search in a haystack\"");
            assert_eq!(ident.to_sql(false), "\"search in a haystack\"");
        }

        #[test]
        fn embedded_quotes_are_doubled() {
            let ident = QualifiedIdentifier::new(None, String::from("say \"hi\""));
            assert_eq!(ident.to_sql(false), "\"say \"\"hi\"\"\"");
        }

        #[test]
        fn reserved_words_render_quoted() {
            let ident = QualifiedIdentifier::parse("select").unwrap();
            assert_eq!(ident.to_sql(false), "\"select\"");
        }

        #[test]
        fn upper_case_names_render_quoted() {
            let ident = QualifiedIdentifier::new(None, String::from("Searches"));
            assert_eq!(ident.to_sql(false), "\"Searches\"");
        }

        #[test]
        fn leading_digit_names_render_quoted() {
            let ident = QualifiedIdentifier::new(None, String::from("1st_view"));
            assert_eq!(ident.to_sql(false), "\"1st_view\"");
        }

        #[test]
        fn quoted_local_always_quotes() {
            let ident = QualifiedIdentifier::parse("searches").unwrap();
            assert_eq!(ident.quoted_local(), "\"searches\"");
        }
    }

    mod round_trip {
        use super::*;

        #[test]
        fn parse_render_parse_is_idempotent() {
            let names = [
                "searches",
                "reporting.searches",
                "\"search in a haystack\"",
                "reporting.\"search in a haystack\"",
                "\"say \"\"hi\"\"\"",
                "\"select\"",
            ];

            for raw in names {
                let parsed = QualifiedIdentifier::parse(raw).unwrap();
                let rendered = parsed.to_sql(true);
                let reparsed = QualifiedIdentifier::parse(&rendered).unwrap();

                assert_eq!(parsed, reparsed, "{} did not round trip", raw);
                assert_eq!(rendered, reparsed.to_sql(true));
            }
        }
    }
}
