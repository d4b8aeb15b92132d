//! Column rename inference
//!
//! Pairs columns that disappeared from a table with columns that appeared in
//! it, when the names are close and the types belong to the same family.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::types::Table;

/// A column inferred to have been renamed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub new_name: String,
    pub old_type: String,
    pub new_type: String,
}

/// Outcome of rename inference over one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameMatches {
    /// Keyed by old column name, in the order the old columns were visited
    pub renamed: IndexMap<String, ColumnRename>,
    /// Deleted candidates left unmatched
    pub deleted: Vec<String>,
    /// Added candidates left unmatched
    pub added: Vec<String>,
}

/// Greedy first-come rename matcher.
///
/// Deleted candidates are visited in order and each claims the closest
/// unclaimed added candidate. This is not a minimum-cost assignment: an
/// early deleted column can claim a candidate that a later one matches more
/// closely.
#[derive(Debug, Clone, Copy)]
pub struct RenameMatcher {
    threshold: usize,
}

impl RenameMatcher {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Match `deleted` columns of `old` against `added` columns of `new`
    pub fn match_columns(
        &self,
        deleted: Vec<String>,
        added: Vec<String>,
        old: &Table,
        new: &Table,
    ) -> RenameMatches {
        let mut renamed = IndexMap::new();
        let mut claimed = vec![false; added.len()];
        let mut unmatched_deleted = Vec::new();

        for old_name in deleted {
            let old_type = old.column(&old_name).map(|c| c.data_type.as_str()).unwrap_or_default();
            let mut best: Option<(usize, usize)> = None;

            for (index, new_name) in added.iter().enumerate() {
                if claimed[index] {
                    continue;
                }
                let new_type = new.column(new_name).map(|c| c.data_type.as_str()).unwrap_or_default();
                if !types_compatible(old_type, new_type) {
                    continue;
                }

                let distance = strsim::levenshtein(&old_name, new_name);
                // Strict comparison keeps the first candidate on ties
                if distance <= self.threshold && best.map_or(true, |(_, d)| distance < d) {
                    best = Some((index, distance));
                }
            }

            match best {
                Some((index, distance)) => {
                    claimed[index] = true;
                    let new_name = added[index].clone();
                    let new_type = new.column(&new_name).map(|c| c.data_type.clone()).unwrap_or_default();

                    tracing::debug!(from = %old_name, to = %new_name, distance, "Inferred column rename");
                    renamed.insert(
                        old_name,
                        ColumnRename {
                            new_name,
                            old_type: old_type.to_string(),
                            new_type,
                        },
                    );
                }
                None => unmatched_deleted.push(old_name),
            }
        }

        let unmatched_added = added
            .into_iter()
            .zip(claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(name, _)| name)
            .collect();

        RenameMatches {
            renamed,
            deleted: unmatched_deleted,
            added: unmatched_added,
        }
    }
}

impl Default for RenameMatcher {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Whether two type strings belong to the same coarse family.
///
/// Identical non-empty types always match. Otherwise both must mention
/// `int`, `decimal`, `varchar` or `date`, or one `text` and the other
/// `varchar`.
pub fn types_compatible(old_type: &str, new_type: &str) -> bool {
    if old_type.is_empty() || new_type.is_empty() {
        return false;
    }
    if old_type == new_type {
        return true;
    }

    let both = |family: &str| old_type.contains(family) && new_type.contains(family);
    let text_varchar = (old_type.contains("text") && new_type.contains("varchar"))
        || (old_type.contains("varchar") && new_type.contains("text"));

    both("int") || both("decimal") || both("varchar") || text_varchar || both("date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ColumnAttributes;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn table(columns: &[(&str, &str)]) -> Table {
        let mut table = Table::new();
        for (name, data_type) in columns {
            table.add_column(name, ColumnAttributes::new(data_type));
        }
        table
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[rstest]
    #[case("int", "int", true)]
    #[case("uuid", "uuid", true)]
    #[case("int", "bigint", true)]
    #[case("integer", "smallint", true)]
    #[case("decimal(10,2)", "decimal(12,4)", true)]
    #[case("varchar(50)", "varchar(100)", true)]
    #[case("text", "varchar(255)", true)]
    #[case("varchar(255)", "text", true)]
    #[case("date", "datetime", true)]
    #[case("int", "varchar(10)", false)]
    #[case("timestamp", "date", false)]
    #[case("boolean", "int", false)]
    #[case("", "", false)]
    #[case("", "int", false)]
    fn test_types_compatible(#[case] old: &str, #[case] new: &str, #[case] expected: bool) {
        assert_eq!(types_compatible(old, new), expected);
    }

    #[test]
    fn test_close_name_same_type_is_renamed() {
        let old = table(&[("username", "varchar(50)")]);
        let new = table(&[("userame", "varchar(50)")]);

        let matches = RenameMatcher::default().match_columns(
            names(&["username"]),
            names(&["userame"]),
            &old,
            &new,
        );

        assert_eq!(
            matches.renamed.get("username"),
            Some(&ColumnRename {
                new_name: "userame".to_string(),
                old_type: "varchar(50)".to_string(),
                new_type: "varchar(50)".to_string(),
            })
        );
        assert!(matches.deleted.is_empty());
        assert!(matches.added.is_empty());
    }

    #[test]
    fn test_incompatible_types_are_not_renamed() {
        let old = table(&[("count", "int")]);
        let new = table(&[("counts", "varchar(10)")]);

        let matches =
            RenameMatcher::default().match_columns(names(&["count"]), names(&["counts"]), &old, &new);

        assert!(matches.renamed.is_empty());
        assert_eq!(matches.deleted, names(&["count"]));
        assert_eq!(matches.added, names(&["counts"]));
    }

    #[test]
    fn test_distant_names_are_not_renamed() {
        let old = table(&[("username", "varchar(50)")]);
        let new = table(&[("full_name", "varchar(100)")]);

        let matches = RenameMatcher::default().match_columns(
            names(&["username"]),
            names(&["full_name"]),
            &old,
            &new,
        );

        assert!(matches.renamed.is_empty());
    }

    #[test]
    fn test_closest_candidate_wins() {
        let old = table(&[("amount", "int")]);
        let new = table(&[("amounts_", "int"), ("amounts", "int")]);

        let matches = RenameMatcher::default().match_columns(
            names(&["amount"]),
            names(&["amounts_", "amounts"]),
            &old,
            &new,
        );

        assert_eq!(matches.renamed["amount"].new_name, "amounts");
        assert_eq!(matches.added, names(&["amounts_"]));
    }

    #[test]
    fn test_ties_go_to_first_added_candidate() {
        let old = table(&[("col_a", "int")]);
        let new = table(&[("col_b", "int"), ("col_c", "int")]);

        let matches = RenameMatcher::default().match_columns(
            names(&["col_a"]),
            names(&["col_b", "col_c"]),
            &old,
            &new,
        );

        assert_eq!(matches.renamed["col_a"].new_name, "col_b");
        assert_eq!(matches.added, names(&["col_c"]));
    }

    #[test]
    fn test_candidate_is_claimed_once() {
        let old = table(&[("name1", "text"), ("name2", "text")]);
        let new = table(&[("name3", "text")]);

        let matches = RenameMatcher::default().match_columns(
            names(&["name1", "name2"]),
            names(&["name3"]),
            &old,
            &new,
        );

        assert_eq!(matches.renamed.len(), 1);
        assert_eq!(matches.renamed["name1"].new_name, "name3");
        assert_eq!(matches.deleted, names(&["name2"]));
        assert!(matches.added.is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let old = table(&[("price", "decimal(10,2)")]);
        let new = table(&[("base_price", "decimal(12,4)")]);

        let strict = RenameMatcher::default().match_columns(
            names(&["price"]),
            names(&["base_price"]),
            &old,
            &new,
        );
        assert!(strict.renamed.is_empty());

        let loose =
            RenameMatcher::new(5).match_columns(names(&["price"]), names(&["base_price"]), &old, &new);
        assert_eq!(loose.renamed["price"].old_type, "decimal(10,2)");
        assert_eq!(loose.renamed["price"].new_type, "decimal(12,4)");
    }

    #[test]
    fn test_distance_counts_characters() {
        let old = table(&[("prénom", "text")]);
        let new = table(&[("prenom", "text")]);

        let matches =
            RenameMatcher::new(1).match_columns(names(&["prénom"]), names(&["prenom"]), &old, &new);
        assert_eq!(matches.renamed["prénom"].new_name, "prenom");
    }
}
