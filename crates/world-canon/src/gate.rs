//! Hard-contradiction check: the canon-aware stage of diff application.

use crate::canon::{Canon, EntityRecord, HardField};
use crate::diff::{ADDED_FACTS, CanonDiff, DiffError, MODIFIED_FACTS};

/// Every canon-aware problem with `diff`, in entity order.
///
/// A hard field contradicts only when a value is already known (in canon, or
/// added earlier in the same diff) and the diff proposes a different one.
/// Assigning a hard field canon has never recorded is allowed.
pub fn check_hard_contradictions(canon: &Canon, diff: &CanonDiff) -> Vec<DiffError> {
    let mut errors = Vec::new();

    for id in diff.added.keys() {
        if canon.contains(id) {
            errors.push(DiffError::invalid(
                format!("{ADDED_FACTS}.characters.{id}"),
                "entity already exists in canon; use modified_facts",
            ));
        }
    }

    for (id, patch) in &diff.modified {
        let known = canon.entity(id).or_else(|| diff.added.get(id));
        let Some(known) = known else {
            errors.push(DiffError::invalid(
                format!("{MODIFIED_FACTS}.characters.{id}"),
                "entity is not in canon and not added by this diff",
            ));
            continue;
        };
        errors.extend(contradictions(id, known, patch));
    }

    errors
}

pub(crate) fn contradictions(
    entity_id: &str,
    known: &EntityRecord,
    patch: &EntityRecord,
) -> Vec<DiffError> {
    HardField::ALL
        .into_iter()
        .filter_map(|field| {
            let canon_value = field.value_of(known)?;
            let diff_value = field.value_of(patch)?;
            (canon_value != diff_value).then(|| DiffError::Contradiction {
                entity_id: entity_id.to_string(),
                field,
                canon_value,
                diff_value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::apply_canon_diff;
    use serde_json::json;

    fn canon() -> Canon {
        Canon::from_value(&json!({
            "characters": {
                "alice": {"name": "Alice", "alive": true, "location": "Harbor"},
                "bob": {"name": "Bob"}
            }
        }))
        .expect("canon")
    }

    #[test]
    fn differing_known_value_is_a_contradiction() {
        let canon = canon();
        let outcome = apply_canon_diff(
            &canon,
            &json!({"modified_facts": {"characters": {"alice": {"alive": false, "location": "Harbor"}}}}),
        );
        assert!(outcome.canon.ptr_eq(&canon));
        assert_eq!(
            outcome.errors,
            vec![DiffError::Contradiction {
                entity_id: "alice".to_string(),
                field: HardField::Alive,
                canon_value: json!(true),
                diff_value: json!(false),
            }]
        );
    }

    #[test]
    fn first_time_assignment_is_allowed() {
        let canon = canon();
        let outcome = apply_canon_diff(
            &canon,
            &json!({"modified_facts": {"characters": {"bob": {"age": 52, "alive": true}}}}),
        );
        assert!(outcome.is_accepted(), "{:?}", outcome.errors);
        assert_eq!(outcome.canon.entity("bob").and_then(|b| b.age), Some(52));
    }

    #[test]
    fn restating_a_known_value_is_not_a_contradiction() {
        let outcome = apply_canon_diff(
            &canon(),
            &json!({"modified_facts": {"characters": {"alice": {"name": "Alice"}}}}),
        );
        assert!(outcome.is_accepted());
    }

    #[test]
    fn modifying_an_unknown_entity_fails_unless_added_alongside() {
        let canon = canon();
        let orphan = apply_canon_diff(
            &canon,
            &json!({"modified_facts": {"characters": {"zed": {"alive": true}}}}),
        );
        assert_eq!(orphan.errors.len(), 1);
        assert_eq!(orphan.errors[0].code(), "INVALID_DIFF");

        let paired = apply_canon_diff(
            &canon,
            &json!({
                "added_facts": {"characters": {"zed": {"name": "Zed"}}},
                "modified_facts": {"characters": {"zed": {"alive": true}}}
            }),
        );
        assert!(paired.is_accepted(), "{:?}", paired.errors);
        let zed = paired.canon.entity("zed").expect("zed");
        assert_eq!(zed.name.as_deref(), Some("Zed"));
        assert_eq!(zed.alive, Some(true));
    }

    #[test]
    fn same_diff_add_then_conflicting_modify_is_rejected() {
        let outcome = apply_canon_diff(
            &canon(),
            &json!({
                "added_facts": {"characters": {"zed": {"name": "Zed"}}},
                "modified_facts": {"characters": {"zed": {"name": "Zedd"}}}
            }),
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code(), "CONTRADICTION");
    }

    #[test]
    fn re_adding_an_existing_entity_is_rejected() {
        let outcome = apply_canon_diff(
            &canon(),
            &json!({"added_facts": {"characters": {"bob": {"age": 3}}}}),
        );
        assert_eq!(
            outcome.errors[0].to_string(),
            "INVALID_DIFF: added_facts.characters.bob: entity already exists in canon; use modified_facts"
        );
    }
}
