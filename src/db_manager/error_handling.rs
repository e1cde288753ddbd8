use colored::Colorize;
use sqlx::{postgres::PgDatabaseError, Error};

/// Render a sqlx error with the Postgres detail, hint and position fields so
/// the root SQL cause of a failed statement is visible without re-running it.
pub fn get_db_error(e: &Error) -> String {
    return match e {
        sqlx::Error::Database(e) => match e.try_downcast_ref::<PgDatabaseError>() {
            Some(e) => {
                let detail = e.detail().unwrap_or_default();
                let hint = e.hint().unwrap_or_default();

                let pos = match e.position() {
                    Some(sqlx::postgres::PgErrorPosition::Original(position)) => {
                        position.to_string()
                    }
                    Some(sqlx::postgres::PgErrorPosition::Internal { position, query }) => {
                        format!("{} for query {}", position, query)
                    }
                    None => String::from(""),
                };

                format!(
                    "{}: {}, Position: {}, Detail: {}, Hint: {}",
                    "Error".red(),
                    e.message(),
                    pos,
                    detail,
                    hint
                )
            }
            None => format!("{}: {}", "Error".red(), e),
        },
        _ => format!("{}: {}", "Error".red(), e),
    };
}
