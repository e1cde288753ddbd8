use std::collections::HashSet;

use futures::TryStreamExt;
use sqlx::PgPool;
use thiserror::Error;

/// Bookkeeping relations owned by migration frameworks. These never belong in
/// a dump, even when a database implements them as views.
pub const INTERNAL_OBJECTS: [&str; 3] = [
    "schema_migrations",
    "ar_internal_metadata",
    "_sqlx_migrations",
];

// Merges plain views and materialized views into one pass. Extension-owned
// relations are skipped because recreating the extension recreates them, and
// only namespaces on the current search path are considered.
const LIST_VIEWS_QUERY: &str = "
    SELECT
        n.nspname AS namespace,
        c.relname AS name,
        c.relkind = 'm' AS materialized,
        pg_get_viewdef(c.oid) AS definition
    FROM pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind IN ('m', 'v')
    AND c.oid NOT IN (SELECT objid FROM pg_depend WHERE deptype = 'e')
    AND n.nspname = ANY (current_schemas(false))
    ORDER BY n.nspname, c.relname;
";

#[derive(Debug, Error)]
#[error("failed to introspect the view catalog: {source}")]
pub struct CatalogAccessError {
    #[from]
    source: sqlx::Error,
}

/// One view as reported by the catalog. `(namespace, name)` is unique within
/// a single pass and `definition` is the stored SQL body with only the
/// trailing statement terminator stripped.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    pub namespace: Option<String>,
    pub name: String,
    pub materialized: bool,
    pub definition: String,
}

/// Unqualified names to leave out of a catalog pass. Matching is by exact
/// local name, independent of namespace. Passed explicitly so that two dump
/// passes with different policies do not interfere.
#[derive(Debug, Clone)]
pub struct ExclusionList {
    names: HashSet<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        ExclusionList {
            names: INTERNAL_OBJECTS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl ExclusionList {
    pub fn empty() -> Self {
        ExclusionList {
            names: HashSet::new(),
        }
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, names: I) {
        self.names.extend(names);
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// List every view and materialized view visible on the current search path,
/// excluding internal bookkeeping objects. The result is materialized eagerly
/// so a catalog change mid-pass cannot produce a torn dump; on any query
/// failure nothing is returned.
pub async fn list_views(
    pool: &PgPool,
    exclusions: &ExclusionList,
) -> Result<Vec<ViewRecord>, CatalogAccessError> {
    let records: Vec<ViewRecord> = sqlx::query_as::<_, ViewRecord>(LIST_VIEWS_QUERY)
        .fetch(pool)
        .try_collect()
        .await?;

    Ok(records
        .into_iter()
        .filter(|record| !exclusions.is_excluded(&record.name))
        .map(|mut record| {
            record.definition = normalize_definition(&record.definition);
            record
        })
        .collect())
}

// pg_get_viewdef returns the body with a trailing ";". Strip it so that
// re-wrapping the body inside CREATE VIEW ... AS does not double the
// terminator; everything else is preserved byte for byte.
fn normalize_definition(definition: &str) -> String {
    definition
        .trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || c == ';')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod exclusion_list {
        use super::*;

        #[test]
        fn default_excludes_internal_objects_works() {
            let exclusions = ExclusionList::default();

            assert!(exclusions.is_excluded("schema_migrations"));
            assert!(exclusions.is_excluded("ar_internal_metadata"));
            assert!(exclusions.is_excluded("_sqlx_migrations"));
            assert!(!exclusions.is_excluded("searches"));
        }

        #[test]
        fn extend_adds_names_works() {
            let mut exclusions = ExclusionList::empty();
            assert!(!exclusions.is_excluded("schema_migrations"));

            exclusions.extend([String::from("scratch_view")]);
            assert!(exclusions.is_excluded("scratch_view"));
        }

        #[test]
        fn matching_is_exact_not_prefix() {
            let exclusions = ExclusionList::default();
            assert!(!exclusions.is_excluded("schema_migrations_archive"));
        }
    }

    mod definition_normalization {
        use super::*;

        #[test]
        fn trailing_terminator_is_stripped_works() {
            assert_eq!(
                normalize_definition(" SELECT 'needle'::text AS haystack;\n"),
                "SELECT 'needle'::text AS haystack"
            );
        }

        #[test]
        fn interior_bytes_are_untouched() {
            let body = "SELECT 'a;b' AS x,\n    'c\"d' AS y\nFROM t";
            assert_eq!(normalize_definition(body), body);
        }

        #[test]
        fn already_clean_definitions_pass_through() {
            assert_eq!(normalize_definition("SELECT 1"), "SELECT 1");
        }
    }
}
