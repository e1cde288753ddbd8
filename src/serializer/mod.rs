use thiserror::Error;

use crate::catalog::{ExclusionList, ViewRecord};
use crate::config::OnSerializeError;
use crate::identifier::QualifiedIdentifier;

// The first candidate that does not occur as a full line of the body is
// used, so unchanged views always serialize to unchanged bytes.
const DELIMITER_CANDIDATES: [&str; 9] = [
    "SQL", "SQL1", "SQL2", "SQL3", "SQL4", "SQL5", "SQL6", "SQL7", "SQL8",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializationError {
    #[error(
        "the definition of view {name} (namespace {namespace:?}) collides with every \
         available body delimiter and cannot be embedded safely"
    )]
    DelimiterCollision {
        namespace: Option<String>,
        name: String,
    },
}

/// Sort records into the stable dump order and drop anything on the exclusion
/// list. The introspector already filters exclusions; filtering again here
/// keeps internal names out of the output even if a caller hands us an
/// unfiltered record set.
pub fn ordered(mut records: Vec<ViewRecord>, exclusions: &ExclusionList) -> Vec<ViewRecord> {
    records.retain(|record| !exclusions.is_excluded(&record.name));
    records.sort_by(|a, b| {
        (a.namespace.as_deref(), a.name.as_str()).cmp(&(b.namespace.as_deref(), b.name.as_str()))
    });
    records
}

/// Render one record as a replayable `create_view` block:
///
/// ```text
/// create_view "searches", materialized: true, sql_definition: <<-SQL
/// SELECT 'needle'::text AS haystack
/// SQL
/// ```
///
/// The name is always quoted and never namespace-qualified, so dumps replay
/// the same under any search-path configuration. The body is embedded with no
/// re-indentation or escaping at all; fidelity comes from picking a delimiter
/// the body cannot terminate early.
pub fn serialize_record(record: &ViewRecord) -> Result<String, SerializationError> {
    let ident = QualifiedIdentifier::new(record.namespace.clone(), record.name.clone());
    let delimiter = choose_delimiter(&record.definition).ok_or_else(|| {
        SerializationError::DelimiterCollision {
            namespace: record.namespace.clone(),
            name: record.name.clone(),
        }
    })?;

    let materialized = if record.materialized {
        "materialized: true, "
    } else {
        ""
    };

    Ok(format!(
        "create_view {}, {}sql_definition: <<-{}\n{}\n{}\n",
        ident.quoted_local(),
        materialized,
        delimiter,
        record.definition,
        delimiter
    ))
}

/// Serialize a whole catalog pass, all-or-nothing. Callers that prefer to
/// skip unserializable records iterate `ordered` + `serialize_record`
/// themselves.
pub fn serialize(
    records: Vec<ViewRecord>,
    exclusions: &ExclusionList,
) -> Result<Vec<String>, SerializationError> {
    ordered(records, exclusions)
        .iter()
        .map(serialize_record)
        .collect()
}

/// Serialize already-ordered records under the configured partial-failure
/// policy. `Abort` fails on the first unserializable record; `Skip` leaves it
/// out and returns its error alongside the blocks so the caller can report
/// it away from the dump stream.
pub fn serialize_with_policy(
    records: &[ViewRecord],
    policy: OnSerializeError,
) -> Result<(Vec<String>, Vec<SerializationError>), SerializationError> {
    let mut blocks = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in records {
        match serialize_record(record) {
            Ok(block) => blocks.push(block),
            Err(e) => match policy {
                OnSerializeError::Abort => return Err(e),
                OnSerializeError::Skip => skipped.push(e),
            },
        }
    }

    Ok((blocks, skipped))
}

fn choose_delimiter(definition: &str) -> Option<&'static str> {
    DELIMITER_CANDIDATES
        .iter()
        .find(|candidate| !definition.lines().any(|line| line == **candidate))
        .copied()
}
