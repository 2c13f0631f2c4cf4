//! Market aggregate service.
//!
//! Implements the market driving ports on top of a [`MarketRepository`].
//! Every mutation runs the same pipeline: load, field validation, taxonomy,
//! uniqueness, subgroup reconciliation and one atomic commit. All reads
//! happen before the single write; any failure aborts with nothing written.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::markets::uniqueness::{
    ensure_market_code_free, ensure_market_name_free, ensure_sub_groups_unique,
};
use crate::domain::ports::{MarketCommand, MarketQuery, MarketRepository};
use crate::domain::{
    Cancellation, CheckedScalars, CreateMarketRequest, FieldErrors, Market, MarketCode,
    MarketError, MarketId, MarketName, MarketScalars, NewMarket, NewSubGroup,
    ParsedSubGroupChange, Region, SubGroupListing, SubGroupPlan, SubRegion, UpdateMarketRequest,
    check_scalars, is_valid_sub_region, parse_for_create, parse_for_update, reconcile,
    sort_sub_group_listings,
};

/// Market service implementing [`MarketCommand`] and [`MarketQuery`].
#[derive(Clone)]
pub struct MarketService<R> {
    repo: Arc<R>,
}

impl<R> MarketService<R> {
    /// Create a new service over the given store.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn check_taxonomy(region: Region, sub_region: SubRegion) -> Result<(), MarketError> {
    if is_valid_sub_region(region, sub_region) {
        Ok(())
    } else {
        Err(MarketError::TaxonomyMismatch { region, sub_region })
    }
}

fn log_rejection(operation: &'static str, error: &MarketError) {
    match error {
        MarketError::StoreUnavailable(_) | MarketError::Store(_) => {}
        _ => warn!(operation, %error, "market request rejected"),
    }
}

impl<R> MarketService<R>
where
    R: MarketRepository,
{
    async fn load(&self, id: MarketId, cancellation: &Cancellation) -> Result<Market, MarketError> {
        cancellation.ensure_active()?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MarketError::NotFound(id))
    }

    async fn ensure_unique_scalars(
        &self,
        name: Option<&MarketName>,
        code: Option<&MarketCode>,
        exclude: Option<MarketId>,
        cancellation: &Cancellation,
    ) -> Result<(), MarketError> {
        if let Some(name) = name {
            cancellation.ensure_active()?;
            ensure_market_name_free(self.repo.as_ref(), name, exclude).await?;
        }
        if let Some(code) = code {
            cancellation.ensure_active()?;
            ensure_market_code_free(self.repo.as_ref(), code, exclude).await?;
        }
        Ok(())
    }

    async fn create(
        &self,
        request: CreateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<MarketId, MarketError> {
        let mut errors = FieldErrors::new();
        let scalars = check_scalars(
            Some(request.name),
            Some(request.code),
            Some(request.long_market_code),
            &mut errors,
        );
        let sub_groups = parse_for_create(&request.sub_groups, &mut errors);
        let (Some(name), Some(code), Some(long_market_code)) =
            (scalars.name, scalars.code, scalars.long_market_code)
        else {
            return Err(MarketError::FieldValidation(errors.into_inner()));
        };
        errors.finish().map_err(MarketError::FieldValidation)?;

        check_taxonomy(request.region, request.sub_region)?;
        self.ensure_unique_scalars(Some(&name), Some(&code), None, cancellation)
            .await?;
        let plan = SubGroupPlan::inserts(sub_groups);
        ensure_sub_groups_unique(&[], &plan.to_add, &plan)?;

        let market = NewMarket {
            name,
            code,
            long_market_code,
            region: request.region,
            sub_region: request.sub_region,
            sub_groups: plan.to_add,
        };
        cancellation.ensure_active()?;
        let id = self.repo.insert(&market).await?;
        info!(
            market_id = %id,
            code = %market.code,
            sub_groups = market.sub_groups.len(),
            "market created"
        );
        Ok(id)
    }

    async fn update(
        &self,
        request: UpdateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<Market, MarketError> {
        let existing = self.load(request.id, cancellation).await?;

        let mut errors = FieldErrors::new();
        let CheckedScalars {
            name,
            code,
            long_market_code,
        } = check_scalars(
            request.name,
            request.code,
            request.long_market_code,
            &mut errors,
        );
        let changes = parse_for_update(&request.sub_groups, &mut errors);
        errors.finish().map_err(MarketError::FieldValidation)?;

        check_taxonomy(request.region, request.sub_region)?;
        self.ensure_unique_scalars(name.as_ref(), code.as_ref(), Some(existing.id), cancellation)
            .await?;

        let scalars = MarketScalars {
            name: name.unwrap_or_else(|| existing.name.clone()),
            code: code.unwrap_or_else(|| existing.code.clone()),
            long_market_code: long_market_code
                .unwrap_or_else(|| existing.long_market_code.clone()),
            region: request.region,
            sub_region: request.sub_region,
        };
        let requested: Vec<NewSubGroup> = changes
            .iter()
            .filter_map(ParsedSubGroupChange::requested)
            .cloned()
            .collect();
        let plan = reconcile(&existing.sub_groups, changes)?;
        ensure_sub_groups_unique(&existing.sub_groups, &requested, &plan)?;

        if plan.is_empty() && scalars_match(&existing, &scalars) {
            return Ok(existing);
        }

        cancellation.ensure_active()?;
        let updated = self
            .repo
            .commit_update(existing.id, &scalars, &plan)
            .await?
            .ok_or(MarketError::NotFound(existing.id))?;
        info!(
            market_id = %updated.id,
            added = plan.to_add.len(),
            updated = plan.to_update.len(),
            removed = plan.to_remove.len(),
            "market updated"
        );
        Ok(updated)
    }

    async fn delete(&self, id: MarketId, cancellation: &Cancellation) -> Result<(), MarketError> {
        let existing = self.load(id, cancellation).await?;
        if !existing.sub_groups.is_empty() {
            return Err(MarketError::MarketNotEmpty(id));
        }
        cancellation.ensure_active()?;
        if !self.repo.delete(id).await? {
            return Err(MarketError::NotFound(id));
        }
        info!(market_id = %id, "market deleted");
        Ok(())
    }
}

fn scalars_match(market: &Market, scalars: &MarketScalars) -> bool {
    market.name == scalars.name
        && market.code == scalars.code
        && market.long_market_code == scalars.long_market_code
        && market.region == scalars.region
        && market.sub_region == scalars.sub_region
}

#[async_trait]
impl<R> MarketCommand for MarketService<R>
where
    R: MarketRepository,
{
    async fn create_market(
        &self,
        request: CreateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<MarketId, MarketError> {
        self.create(request, cancellation)
            .await
            .inspect_err(|error| log_rejection("create_market", error))
    }

    async fn update_market(
        &self,
        request: UpdateMarketRequest,
        cancellation: &Cancellation,
    ) -> Result<Market, MarketError> {
        self.update(request, cancellation)
            .await
            .inspect_err(|error| log_rejection("update_market", error))
    }

    async fn delete_market(
        &self,
        id: MarketId,
        cancellation: &Cancellation,
    ) -> Result<(), MarketError> {
        self.delete(id, cancellation)
            .await
            .inspect_err(|error| log_rejection("delete_market", error))
    }
}

#[async_trait]
impl<R> MarketQuery for MarketService<R>
where
    R: MarketRepository,
{
    async fn get_market(&self, id: MarketId) -> Result<Market, MarketError> {
        self.load(id, &Cancellation::never()).await
    }

    async fn list_markets(&self) -> Result<Vec<Market>, MarketError> {
        Ok(self.repo.list().await?)
    }

    async fn search_markets(&self, text: &str) -> Result<Vec<Market>, MarketError> {
        let text = text.trim();
        if text.is_empty() {
            return self.list_markets().await;
        }
        Ok(self.repo.search(text).await?)
    }

    async fn filter_markets_by_regions(
        &self,
        regions: &[Region],
    ) -> Result<Vec<Market>, MarketError> {
        if regions.is_empty() {
            return self.list_markets().await;
        }
        let mut regions = regions.to_vec();
        regions.sort_unstable();
        regions.dedup();
        Ok(self.repo.filter_by_regions(&regions).await?)
    }

    async fn market_name_exists(&self, name: &str) -> Result<bool, MarketError> {
        let Ok(name) = MarketName::new(name) else {
            return Ok(false);
        };
        Ok(self.repo.find_by_name(&name).await?.is_some())
    }

    async fn market_code_exists(&self, code: &str) -> Result<bool, MarketError> {
        let Ok(code) = MarketCode::new(code) else {
            return Ok(false);
        };
        Ok(self.repo.find_by_code(&code).await?.is_some())
    }

    async fn list_sub_groups(
        &self,
        market_code: Option<String>,
    ) -> Result<Vec<SubGroupListing>, MarketError> {
        let filter = match market_code.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match MarketCode::new(raw) {
                Ok(code) => Some(code),
                Err(_) => return Ok(Vec::new()),
            },
        };
        let mut rows = self.repo.list_sub_groups(filter).await?;
        sort_sub_group_listings(&mut rows);
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "market_service_tests.rs"]
mod tests;
