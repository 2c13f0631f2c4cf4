//! Subgroup reconciliation.
//!
//! Turns the caller's subgroup change list into a [`SubGroupPlan`]: the
//! minimal set of inserts, updates and deletes that moves the persisted
//! subgroups of one market to the requested state. Reconciliation is pure;
//! the plan is handed to the store in a single atomic commit.
//!
//! Update requests follow an explicit-flag policy:
//!
//! | identifier | `requestedDeletion` | `requestedEdit` | outcome          |
//! |------------|---------------------|-----------------|------------------|
//! | present    | set                 | any             | remove           |
//! | present    | unset               | set             | overwrite        |
//! | absent     | unset               | any             | add              |
//! | absent     | set                 | any             | ignored          |
//! | present    | unset               | unset           | left untouched   |

use std::collections::{HashMap, HashSet};

use super::error::MarketError;
use super::model::{MarketSubGroup, NewSubGroup, SubGroupChangeRequest, SubGroupId};
use super::validation::{FieldErrors, SubGroupCode, SubGroupName, sub_group_field};

/// One classified and validated change item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSubGroupChange {
    Add {
        index: usize,
        sub_group: NewSubGroup,
    },
    Edit {
        index: usize,
        id: SubGroupId,
        sub_group: NewSubGroup,
    },
    Delete {
        index: usize,
        id: SubGroupId,
    },
    Keep {
        index: usize,
        id: SubGroupId,
    },
}

impl ParsedSubGroupChange {
    fn index(&self) -> usize {
        match self {
            Self::Add { index, .. }
            | Self::Edit { index, .. }
            | Self::Delete { index, .. }
            | Self::Keep { index, .. } => *index,
        }
    }

    /// Name and code the caller asked this item to hold, edits included
    /// even when they match the stored values.
    pub fn requested(&self) -> Option<&NewSubGroup> {
        match self {
            Self::Add { sub_group, .. } | Self::Edit { sub_group, .. } => Some(sub_group),
            Self::Delete { .. } | Self::Keep { .. } => None,
        }
    }

    fn referenced_id(&self) -> Option<SubGroupId> {
        match self {
            Self::Add { .. } => None,
            Self::Edit { id, .. } | Self::Delete { id, .. } | Self::Keep { id, .. } => Some(*id),
        }
    }
}

fn parse_values(
    index: usize,
    item: &SubGroupChangeRequest,
    errors: &mut FieldErrors,
) -> Option<NewSubGroup> {
    let name = errors.check(
        sub_group_field(index, "subGroupName"),
        SubGroupName::new(item.sub_group_name.as_str()),
    );
    let code = errors.check(
        sub_group_field(index, "subGroupCode"),
        SubGroupCode::new(item.sub_group_code.as_str()),
    );
    Some(NewSubGroup {
        name: name?,
        code: code?,
    })
}

/// Classify change items for a new market.
///
/// Every item not flagged for deletion becomes a new subgroup; identifiers
/// are ignored because a new market owns nothing yet.
pub fn parse_for_create(
    items: &[SubGroupChangeRequest],
    errors: &mut FieldErrors,
) -> Vec<NewSubGroup> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.requested_deletion)
        .filter_map(|(index, item)| parse_values(index, item, errors))
        .collect()
}

/// Classify change items for an existing market.
///
/// Name and code are only validated for items that will write them.
pub fn parse_for_update(
    items: &[SubGroupChangeRequest],
    errors: &mut FieldErrors,
) -> Vec<ParsedSubGroupChange> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match (item.sub_group_id, item.requested_deletion) {
            (Some(id), true) => Some(ParsedSubGroupChange::Delete { index, id }),
            (None, true) => None,
            (Some(id), false) if item.requested_edit => parse_values(index, item, errors)
                .map(|sub_group| ParsedSubGroupChange::Edit {
                    index,
                    id,
                    sub_group,
                }),
            (Some(id), false) => Some(ParsedSubGroupChange::Keep { index, id }),
            (None, false) => parse_values(index, item, errors)
                .map(|sub_group| ParsedSubGroupChange::Add { index, sub_group }),
        })
        .collect()
}

/// Minimal write set for one market's subgroups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubGroupPlan {
    pub to_add: Vec<NewSubGroup>,
    pub to_update: Vec<MarketSubGroup>,
    pub to_remove: Vec<SubGroupId>,
}

impl SubGroupPlan {
    /// Plan for a brand-new market.
    pub fn inserts(to_add: Vec<NewSubGroup>) -> Self {
        Self {
            to_add,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    /// Persisted subgroups that neither get removed nor rewritten.
    pub fn untouched<'a>(
        &'a self,
        existing: &'a [MarketSubGroup],
    ) -> impl Iterator<Item = &'a MarketSubGroup> + 'a {
        existing.iter().filter(move |sub| {
            !self.to_remove.contains(&sub.id)
                && !self.to_update.iter().any(|updated| updated.id == sub.id)
        })
    }

    /// Name/code pairs the market will hold once the plan is applied.
    pub fn projected(&self, existing: &[MarketSubGroup]) -> Vec<(SubGroupName, SubGroupCode)> {
        self.untouched(existing)
            .chain(self.to_update.iter())
            .map(|sub| (sub.name.clone(), sub.code.clone()))
            .chain(
                self.to_add
                    .iter()
                    .map(|sub| (sub.name.clone(), sub.code.clone())),
            )
            .collect()
    }
}

/// Compute the plan for `changes` against the persisted `existing` set.
///
/// Deletes of identifiers the market does not own are ignored so replays
/// stay idempotent. Edits of unknown identifiers and identifiers referenced
/// by more than one item are field errors. Edits that change nothing are
/// dropped from the plan.
///
/// # Examples
/// ```
/// use market_backend::domain::{SubGroupPlan, reconcile};
///
/// let plan = reconcile(&[], Vec::new()).unwrap();
/// assert_eq!(plan, SubGroupPlan::default());
/// ```
pub fn reconcile(
    existing: &[MarketSubGroup],
    changes: Vec<ParsedSubGroupChange>,
) -> Result<SubGroupPlan, MarketError> {
    let owned: HashMap<SubGroupId, &MarketSubGroup> =
        existing.iter().map(|sub| (sub.id, sub)).collect();
    let mut errors = FieldErrors::new();
    let mut seen = HashSet::new();
    let mut plan = SubGroupPlan::default();

    for change in changes {
        if let Some(id) = change.referenced_id()
            && !seen.insert(id)
        {
            errors.push(
                sub_group_field(change.index(), "subGroupId"),
                format!("subgroup {id} is referenced more than once"),
            );
            continue;
        }

        match change {
            ParsedSubGroupChange::Add { sub_group, .. } => plan.to_add.push(sub_group),
            ParsedSubGroupChange::Delete { id, .. } => {
                if owned.contains_key(&id) {
                    plan.to_remove.push(id);
                }
            }
            ParsedSubGroupChange::Edit {
                index,
                id,
                sub_group,
            } => match owned.get(&id) {
                None => errors.push(
                    sub_group_field(index, "subGroupId"),
                    format!("subgroup {id} does not belong to this market"),
                ),
                Some(current) if current.name == sub_group.name && current.code == sub_group.code => {}
                Some(current) => plan.to_update.push(MarketSubGroup {
                    id,
                    market_id: current.market_id,
                    name: sub_group.name,
                    code: sub_group.code,
                }),
            },
            ParsedSubGroupChange::Keep { .. } => {}
        }
    }

    errors.finish().map_err(MarketError::FieldValidation)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::markets::model::MarketId;
    use rstest::{fixture, rstest};

    fn persisted(id: i64, name: &str, code: &str) -> MarketSubGroup {
        MarketSubGroup {
            id: SubGroupId::new(id),
            market_id: MarketId::new(1),
            name: SubGroupName::new(name).expect("valid name"),
            code: SubGroupCode::new(code).expect("valid code"),
        }
    }

    #[fixture]
    fn existing() -> Vec<MarketSubGroup> {
        vec![persisted(10, "North", "N"), persisted(11, "South", "S")]
    }

    fn plan_for(
        existing: &[MarketSubGroup],
        items: &[SubGroupChangeRequest],
    ) -> Result<SubGroupPlan, MarketError> {
        let mut errors = FieldErrors::new();
        let parsed = parse_for_update(items, &mut errors);
        errors.finish().map_err(MarketError::FieldValidation)?;
        reconcile(existing, parsed)
    }

    #[rstest]
    fn echoing_existing_items_yields_empty_plan(existing: Vec<MarketSubGroup>) {
        let items: Vec<_> = existing.iter().map(SubGroupChangeRequest::keep).collect();
        let plan = plan_for(&existing, &items).expect("valid request");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn unchanged_edit_is_dropped(existing: Vec<MarketSubGroup>) {
        let items = [SubGroupChangeRequest::edit(SubGroupId::new(10), "North", "N")];
        let plan = plan_for(&existing, &items).expect("valid request");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn unchanged_edits_still_report_their_requested_values() {
        let mut errors = FieldErrors::new();
        let parsed = parse_for_update(
            &[
                SubGroupChangeRequest::edit(SubGroupId::new(10), "North", "N"),
                SubGroupChangeRequest::delete(SubGroupId::new(11)),
            ],
            &mut errors,
        );
        let codes: Vec<_> = parsed
            .iter()
            .filter_map(ParsedSubGroupChange::requested)
            .map(|sub| sub.code.to_string())
            .collect();
        assert_eq!(codes, ["N"]);
    }

    #[rstest]
    fn mixed_changes_produce_three_way_diff(existing: Vec<MarketSubGroup>) {
        let items = [
            SubGroupChangeRequest::delete(SubGroupId::new(10)),
            SubGroupChangeRequest::edit(SubGroupId::new(11), "Southern", "S"),
            SubGroupChangeRequest::add("East", "E"),
        ];
        let plan = plan_for(&existing, &items).expect("valid request");
        assert_eq!(plan.to_remove, [SubGroupId::new(10)]);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].name.as_ref(), "Southern");
        assert_eq!(plan.to_add.len(), 1);
        assert_eq!(plan.to_add[0].code.as_ref(), "E");
    }

    #[rstest]
    fn deletion_wins_over_edit(existing: Vec<MarketSubGroup>) {
        let mut item = SubGroupChangeRequest::edit(SubGroupId::new(10), "Renamed", "R");
        item.requested_deletion = true;
        let plan = plan_for(&existing, &[item]).expect("valid request");
        assert_eq!(plan.to_remove, [SubGroupId::new(10)]);
        assert!(plan.to_update.is_empty());
    }

    #[rstest]
    fn deleting_unknown_id_is_a_no_op(existing: Vec<MarketSubGroup>) {
        let items = [SubGroupChangeRequest::delete(SubGroupId::new(99))];
        let plan = plan_for(&existing, &items).expect("valid request");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn editing_unknown_id_is_rejected(existing: Vec<MarketSubGroup>) {
        let items = [SubGroupChangeRequest::edit(SubGroupId::new(99), "Ghost", "G")];
        let Err(MarketError::FieldValidation(errors)) = plan_for(&existing, &items) else {
            panic!("expected field validation failure");
        };
        assert_eq!(errors[0].field, "subGroups[0].subGroupId");
    }

    #[rstest]
    fn repeated_id_is_rejected(existing: Vec<MarketSubGroup>) {
        let items = [
            SubGroupChangeRequest::edit(SubGroupId::new(10), "A", "A"),
            SubGroupChangeRequest::delete(SubGroupId::new(10)),
        ];
        let Err(MarketError::FieldValidation(errors)) = plan_for(&existing, &items) else {
            panic!("expected field validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "subGroups[1].subGroupId");
    }

    #[rstest]
    fn flagged_deletion_without_id_is_ignored(existing: Vec<MarketSubGroup>) {
        let mut item = SubGroupChangeRequest::add("", "");
        item.requested_deletion = true;
        let plan = plan_for(&existing, &[item]).expect("no validation for dropped items");
        assert!(plan.is_empty());
    }

    #[rstest]
    fn edit_flag_without_id_adds(existing: Vec<MarketSubGroup>) {
        let mut item = SubGroupChangeRequest::add("West", "W");
        item.requested_edit = true;
        let plan = plan_for(&existing, &[item]).expect("valid request");
        assert_eq!(plan.to_add.len(), 1);
    }

    #[rstest]
    fn kept_items_skip_value_validation(existing: Vec<MarketSubGroup>) {
        let item = SubGroupChangeRequest {
            sub_group_id: Some(SubGroupId::new(10)),
            sub_group_code: "too long".into(),
            ..SubGroupChangeRequest::default()
        };
        assert!(plan_for(&existing, &[item]).expect("valid request").is_empty());
    }

    #[rstest]
    fn create_parsing_skips_deleted_items_and_collects_errors() {
        let mut deleted = SubGroupChangeRequest::add("Gone", "G");
        deleted.requested_deletion = true;
        let items = [
            SubGroupChangeRequest::add("North", "N"),
            deleted,
            SubGroupChangeRequest::add("", "ab"),
        ];
        let mut errors = FieldErrors::new();
        let parsed = parse_for_create(&items, &mut errors);
        assert_eq!(parsed.len(), 1);
        let fields: Vec<_> = errors
            .finish()
            .expect_err("third item is invalid")
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, ["subGroups[2].subGroupName", "subGroups[2].subGroupCode"]);
    }

    #[rstest]
    fn projection_reflects_plan(existing: Vec<MarketSubGroup>) {
        let items = [
            SubGroupChangeRequest::delete(SubGroupId::new(10)),
            SubGroupChangeRequest::add("East", "E"),
        ];
        let plan = plan_for(&existing, &items).expect("valid request");
        let codes: Vec<String> = plan
            .projected(&existing)
            .into_iter()
            .map(|(_, code)| code.to_string())
            .collect();
        assert_eq!(codes, ["S", "E"]);
    }
}
