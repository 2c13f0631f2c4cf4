//! Uniqueness rules for market names, market codes and subgroups.
//!
//! Market names and codes are unique across the store and need a lookup;
//! subgroup names and codes are unique inside their market and are checked
//! against the aggregate already in memory. Every comparison ignores case.

use std::collections::HashSet;

use super::error::{MarketError, UniquenessConflict};
use super::model::{MarketId, MarketSubGroup, NewSubGroup};
use super::reconciler::SubGroupPlan;
use super::validation::{MarketCode, MarketName};
use crate::domain::ports::MarketRepository;

/// Fail when another market already uses `name`.
///
/// `exclude` is the market being updated, which may keep its own name.
pub async fn ensure_market_name_free<R>(
    repo: &R,
    name: &MarketName,
    exclude: Option<MarketId>,
) -> Result<(), MarketError>
where
    R: MarketRepository + ?Sized,
{
    match repo.find_by_name(name).await? {
        Some(found) if Some(found.id) != exclude => Err(UniquenessConflict::MarketName(
            name.to_string(),
        )
        .into()),
        _ => Ok(()),
    }
}

/// Fail when another market already uses `code`.
pub async fn ensure_market_code_free<R>(
    repo: &R,
    code: &MarketCode,
    exclude: Option<MarketId>,
) -> Result<(), MarketError>
where
    R: MarketRepository + ?Sized,
{
    match repo.find_by_code(code).await? {
        Some(found) if Some(found.id) != exclude => Err(UniquenessConflict::MarketCode(
            code.to_string(),
        )
        .into()),
        _ => Ok(()),
    }
}

/// Check the subgroups a request asks for against each other and against
/// the persisted siblings the plan leaves untouched.
///
/// `requested` holds every added or edited item as the caller sent it,
/// including edits the plan dropped because they change nothing. Duplicates
/// among those items are reported first; only then is each item the plan
/// writes compared with the untouched siblings.
pub fn ensure_sub_groups_unique<'a>(
    existing: &[MarketSubGroup],
    requested: impl IntoIterator<Item = &'a NewSubGroup>,
    plan: &SubGroupPlan,
) -> Result<(), MarketError> {
    let mut requested_names = HashSet::new();
    let mut requested_codes = HashSet::new();
    for sub in requested {
        if !requested_names.insert(sub.name.folded()) {
            return Err(
                UniquenessConflict::DuplicateRequestedSubGroupName(sub.name.to_string()).into(),
            );
        }
        if !requested_codes.insert(sub.code.folded()) {
            return Err(
                UniquenessConflict::DuplicateRequestedSubGroupCode(sub.code.to_string()).into(),
            );
        }
    }

    let written_names: HashSet<_> = plan
        .to_update
        .iter()
        .map(|sub| sub.name.folded())
        .chain(plan.to_add.iter().map(|sub| sub.name.folded()))
        .collect();
    let written_codes: HashSet<_> = plan
        .to_update
        .iter()
        .map(|sub| sub.code.folded())
        .chain(plan.to_add.iter().map(|sub| sub.code.folded()))
        .collect();

    for sibling in plan.untouched(existing) {
        if written_names.contains(&sibling.name.folded()) {
            return Err(UniquenessConflict::SubGroupNameTaken(sibling.name.to_string()).into());
        }
        if written_codes.contains(&sibling.code.folded()) {
            return Err(UniquenessConflict::SubGroupCodeTaken(sibling.code.to_string()).into());
        }
    }
    Ok(())
}
