use sqlx::PgPool;
use thiserror::Error;

use crate::identifier::{IdentifierParseError, QualifiedIdentifier};

#[derive(Debug, Error)]
pub enum ViewCreationError {
    #[error("cannot create view: {0}")]
    InvalidName(#[from] IdentifierParseError),

    #[error("cannot create view {name}: WITH NO DATA is only valid for materialized views")]
    NoDataOnPlainView { name: String },

    #[error("failed to create view {name}: {source}")]
    Execution {
        name: String,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Debug, Error)]
pub enum ViewDropError {
    #[error("cannot drop view: {0}")]
    InvalidName(#[from] IdentifierParseError),

    #[error("failed to drop view {name}: {source}")]
    Execution {
        name: String,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Debug, Default, Clone)]
pub struct CreateViewOptions {
    pub materialized: bool,
    /// Create the materialized view unpopulated (WITH NO DATA). Only valid
    /// when `materialized` is set.
    pub no_data: bool,
}

#[derive(Debug, Default, Clone)]
pub struct DropViewOptions {
    pub materialized: bool,
    pub if_exists: bool,
    pub cascade: bool,
}

/// Build the CREATE statement for a resolved name. Split out from
/// `create_view` so the exact SQL can be asserted on without a database.
pub fn create_view_statement(
    ident: &QualifiedIdentifier,
    sql_definition: &str,
    options: &CreateViewOptions,
) -> Result<String, ViewCreationError> {
    if options.no_data && !options.materialized {
        return Err(ViewCreationError::NoDataOnPlainView {
            name: ident.to_sql(true),
        });
    }

    let kind = if options.materialized {
        "MATERIALIZED VIEW"
    } else {
        "VIEW"
    };
    let no_data = if options.no_data { " WITH NO DATA" } else { "" };

    Ok(format!(
        "CREATE {} {} AS {}{};",
        kind,
        ident.to_sql(true),
        sql_definition,
        no_data
    ))
}

pub fn drop_view_statement(ident: &QualifiedIdentifier, options: &DropViewOptions) -> String {
    let kind = if options.materialized {
        "MATERIALIZED VIEW"
    } else {
        "VIEW"
    };
    let if_exists = if options.if_exists { " IF EXISTS" } else { "" };
    let cascade = if options.cascade { " CASCADE" } else { "" };

    format!("DROP {}{} {}{};", kind, if_exists, ident.to_sql(true), cascade)
}

/// Execute `CREATE [MATERIALIZED] VIEW <name> AS <sql_definition>`. The name
/// may be schema-qualified and/or quoted; it is resolved before execution.
/// One statement, so the engine's DDL atomicity guarantees the view either
/// exists as requested or the database is unchanged.
pub async fn create_view(
    pool: &PgPool,
    name: &str,
    sql_definition: &str,
    options: &CreateViewOptions,
) -> Result<(), ViewCreationError> {
    let ident = QualifiedIdentifier::parse(name)?;
    let statement = create_view_statement(&ident, sql_definition, options)?;

    sqlx::query(&statement)
        .execute(pool)
        .await
        .map_err(|source| ViewCreationError::Execution {
            name: ident.to_sql(true),
            source,
        })?;

    Ok(())
}

/// Execute `DROP [MATERIALIZED] VIEW <name>`. Dropping a missing view is an
/// error unless `if_exists` is set.
pub async fn drop_view(
    pool: &PgPool,
    name: &str,
    options: &DropViewOptions,
) -> Result<(), ViewDropError> {
    let ident = QualifiedIdentifier::parse(name)?;
    let statement = drop_view_statement(&ident, options);

    sqlx::query(&statement)
        .execute(pool)
        .await
        .map_err(|source| ViewDropError::Execution {
            name: ident.to_sql(true),
            source,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(raw: &str) -> QualifiedIdentifier {
        QualifiedIdentifier::parse(raw).unwrap()
    }

    mod create_statements {
        use super::*;

        #[test]
        fn plain_view_statement_works() {
            let statement = create_view_statement(
                &ident("searches"),
                "SELECT 'needle'::text AS haystack",
                &CreateViewOptions::default(),
            )
            .unwrap();

            assert_eq!(
                statement,
                "CREATE VIEW searches AS SELECT 'needle'::text AS haystack;"
            );
        }

        #[test]
        fn materialized_view_statement_works() {
            let statement = create_view_statement(
                &ident("searches"),
                "SELECT 1",
                &CreateViewOptions {
                    materialized: true,
                    no_data: false,
                },
            )
            .unwrap();

            assert_eq!(statement, "CREATE MATERIALIZED VIEW searches AS SELECT 1;");
        }

        #[test]
        fn no_data_statement_works() {
            let statement = create_view_statement(
                &ident("searches"),
                "SELECT 1",
                &CreateViewOptions {
                    materialized: true,
                    no_data: true,
                },
            )
            .unwrap();

            assert_eq!(
                statement,
                "CREATE MATERIALIZED VIEW searches AS SELECT 1 WITH NO DATA;"
            );
        }

        #[test]
        fn no_data_on_a_plain_view_is_rejected() {
            let err = create_view_statement(
                &ident("searches"),
                "SELECT 1",
                &CreateViewOptions {
                    materialized: false,
                    no_data: true,
                },
            )
            .unwrap_err();

            assert!(matches!(err, ViewCreationError::NoDataOnPlainView { .. }));
        }

        #[test]
        fn qualified_and_quoted_names_are_rendered() {
            let statement = create_view_statement(
                &ident("reporting.\"search in a haystack\""),
                "SELECT 1",
                &CreateViewOptions::default(),
            )
            .unwrap();

            assert_eq!(
                statement,
                "CREATE VIEW reporting.\"search in a haystack\" AS SELECT 1;"
            );
        }
    }

    mod drop_statements {
        use super::*;

        #[test]
        fn plain_drop_statement_works() {
            let statement = drop_view_statement(&ident("searches"), &DropViewOptions::default());
            assert_eq!(statement, "DROP VIEW searches;");
        }

        #[test]
        fn materialized_if_exists_cascade_works() {
            let statement = drop_view_statement(
                &ident("reporting.searches"),
                &DropViewOptions {
                    materialized: true,
                    if_exists: true,
                    cascade: true,
                },
            );

            assert_eq!(
                statement,
                "DROP MATERIALIZED VIEW IF EXISTS reporting.searches CASCADE;"
            );
        }
    }
}
