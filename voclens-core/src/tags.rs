//! Tag hierarchy traversal
//!
//! Tags nest via parent links. Statistics and schedules reference tag ids;
//! expanding an id to its whole subtree lets callers aggregate a category
//! (e.g. "Bug") together with every sub-tag under it.

use std::collections::{HashSet, VecDeque};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::Tag;

/// Direct tag lookup, failing with `TagNotFound` for unknown ids.
///
/// Aggregation never uses this (unknown ids degrade to zero rows there);
/// it backs surfaces that address one tag explicitly.
pub fn get_tag(db: &Database, id: &str) -> Result<Tag> {
    db.get_tag(id)?
        .ok_or_else(|| Error::TagNotFound(id.to_string()))
}

/// Expand a tag id into itself plus all descendant ids.
///
/// Breadth-first over `children_of`, with an explicit visited-set so a
/// corrupted parent graph (cycles, shared subtrees) still terminates. An
/// unknown id is not an error; it just has no children.
pub fn resolve_descendants(db: &Database, tag_id: &str) -> Result<Vec<String>> {
    let mut resolved = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(tag_id.to_string());
    queue.push_back(tag_id.to_string());

    while let Some(id) = queue.pop_front() {
        for child in db.children_of(&id)? {
            if visited.insert(child.id.clone()) {
                queue.push_back(child.id);
            }
        }
        resolved.push(id);
    }

    Ok(resolved)
}

/// Expand a list of tag ids with their descendants.
///
/// First-seen order is preserved and ids reached through more than one
/// input are emitted once.
pub fn expand_tag_ids(db: &Database, tag_ids: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut expanded = Vec::new();

    for id in tag_ids {
        for resolved in resolve_descendants(db, id)? {
            if seen.insert(resolved.clone()) {
                expanded.push(resolved);
            }
        }
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn add_tag(db: &Database, id: &str, name: &str, parent: Option<&str>) {
        db.upsert_tag(&Tag::new(id, name, parent.map(String::from)))
            .unwrap();
    }

    #[test]
    fn test_resolves_self_and_descendants() {
        let db = test_db();
        add_tag(&db, "root", "VOC", None);
        add_tag(&db, "bug", "Bug", Some("root"));
        add_tag(&db, "crash", "Crash", Some("bug"));
        add_tag(&db, "feature", "Feature", Some("root"));
        add_tag(&db, "other", "Other", None);

        let resolved = resolve_descendants(&db, "root").unwrap();
        assert_eq!(resolved[0], "root");
        assert_eq!(resolved.len(), 4);
        assert!(resolved.contains(&"crash".to_string()));
        assert!(!resolved.contains(&"other".to_string()));
    }

    #[test]
    fn test_get_tag_direct_lookup() {
        let db = test_db();
        add_tag(&db, "t1", "Bug", None);

        assert_eq!(get_tag(&db, "t1").unwrap().name, "Bug");
        assert!(matches!(
            get_tag(&db, "missing").unwrap_err(),
            crate::error::Error::TagNotFound(_)
        ));
    }

    #[test]
    fn test_unknown_id_resolves_to_itself() {
        let db = test_db();
        let resolved = resolve_descendants(&db, "missing").unwrap();
        assert_eq!(resolved, vec!["missing".to_string()]);
    }

    #[test]
    fn test_cycle_terminates() {
        let db = test_db();
        // a -> b -> a: must not loop forever
        add_tag(&db, "a", "A", Some("b"));
        add_tag(&db, "b", "B", Some("a"));

        let resolved = resolve_descendants(&db, "a").unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&"a".to_string()));
        assert!(resolved.contains(&"b".to_string()));
    }

    #[test]
    fn test_expand_preserves_order_and_dedups() {
        let db = test_db();
        add_tag(&db, "p", "Parent", None);
        add_tag(&db, "c", "Child", Some("p"));

        let expanded =
            expand_tag_ids(&db, &["p".to_string(), "c".to_string(), "p".to_string()]).unwrap();
        assert_eq!(expanded, vec!["p".to_string(), "c".to_string()]);
    }
}
