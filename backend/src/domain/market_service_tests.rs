//! Tests for the market aggregate service.

use std::sync::Arc;

use super::*;
use crate::domain::markets::test_fixtures::sample_market;
use crate::domain::ports::{MarketRepositoryError, MockMarketRepository};
use crate::domain::{
    SubGroupChangeRequest, SubGroupCode, SubGroupId, SubGroupName, UniquenessConflict,
};
use rstest::rstest;

fn make_service(repo: MockMarketRepository) -> MarketService<MockMarketRepository> {
    MarketService::new(Arc::new(repo))
}

fn create_request() -> CreateMarketRequest {
    CreateMarketRequest {
        name: "Spain".into(),
        code: "es".into(),
        long_market_code: "e-es.md.ce".into(),
        region: Region::Euro,
        sub_region: SubRegion::Europe,
        sub_groups: vec![
            SubGroupChangeRequest::add("Madrid", "M"),
            SubGroupChangeRequest::add("Barcelona", "B"),
        ],
    }
}

fn update_request(market: &Market) -> UpdateMarketRequest {
    UpdateMarketRequest {
        id: market.id,
        name: None,
        code: None,
        long_market_code: None,
        region: market.region,
        sub_region: market.sub_region,
        sub_groups: market
            .sub_groups
            .iter()
            .map(SubGroupChangeRequest::keep)
            .collect(),
    }
}

fn expect_free_scalars(repo: &mut MockMarketRepository) {
    repo.expect_find_by_name().times(1).return_once(|_| Ok(None));
    repo.expect_find_by_code().times(1).return_once(|_| Ok(None));
}

#[rstest]
#[tokio::test]
async fn create_stores_upper_case_codes() {
    let mut repo = MockMarketRepository::new();
    expect_free_scalars(&mut repo);
    repo.expect_insert()
        .withf(|market: &NewMarket| {
            market.code.as_ref() == "ES"
                && market.long_market_code.as_ref() == "E-ES.MD.CE"
                && market.sub_groups.len() == 2
        })
        .times(1)
        .return_once(|_| Ok(MarketId::new(42)));

    let id = make_service(repo)
        .create_market(create_request(), &Cancellation::never())
        .await
        .expect("create succeeds");
    assert_eq!(id, MarketId::new(42));
}

#[rstest]
#[tokio::test]
async fn create_reports_every_field_error_at_once() {
    let mut request = create_request();
    request.code = "E1".into();
    request.long_market_code = "nope".into();
    request.sub_groups.push(SubGroupChangeRequest::add("", "xx"));

    let result = make_service(MockMarketRepository::new())
        .create_market(request, &Cancellation::never())
        .await;

    let Err(MarketError::FieldValidation(errors)) = result else {
        panic!("expected field validation failure, got {result:?}");
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "code",
            "longMarketCode",
            "subGroups[2].subGroupName",
            "subGroups[2].subGroupCode"
        ]
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_sub_region_outside_region_before_store_access() {
    let mut request = create_request();
    request.sub_region = SubRegion::Canada;

    let result = make_service(MockMarketRepository::new())
        .create_market(request, &Cancellation::never())
        .await;
    assert_eq!(
        result,
        Err(MarketError::TaxonomyMismatch {
            region: Region::Euro,
            sub_region: SubRegion::Canada
        })
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_name_taken_ignoring_case() {
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_name()
        .withf(|name: &MarketName| name.as_ref() == "SPAIN")
        .times(1)
        .return_once(|_| Ok(Some(sample_market(3))));
    let mut request = create_request();
    request.name = "SPAIN".into();

    let result = make_service(repo)
        .create_market(request, &Cancellation::never())
        .await;
    assert_eq!(
        result,
        Err(UniquenessConflict::MarketName("SPAIN".into()).into())
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_requested_sub_group_codes() {
    let mut repo = MockMarketRepository::new();
    expect_free_scalars(&mut repo);
    let mut request = create_request();
    request.sub_groups = vec![
        SubGroupChangeRequest::add("One", "a"),
        SubGroupChangeRequest::add("Two", "A"),
    ];

    let result = make_service(repo)
        .create_market(request, &Cancellation::never())
        .await;
    assert_eq!(
        result,
        Err(UniquenessConflict::DuplicateRequestedSubGroupCode("A".into()).into())
    );
}

#[rstest]
#[tokio::test]
async fn create_maps_unique_violation_to_write_conflict() {
    let mut repo = MockMarketRepository::new();
    expect_free_scalars(&mut repo);
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(MarketRepositoryError::conflict("markets_name_lower_idx")));

    let result = make_service(repo)
        .create_market(create_request(), &Cancellation::never())
        .await;
    assert!(matches!(result, Err(MarketError::WriteConflict(_))));
}

#[rstest]
#[tokio::test]
async fn cancelled_create_touches_nothing() {
    let (tx, cancellation) = Cancellation::channel();
    tx.send(true).expect("receiver alive");

    let result = make_service(MockMarketRepository::new())
        .create_market(create_request(), &cancellation)
        .await;
    assert_eq!(result, Err(MarketError::Cancelled));
}

#[rstest]
#[tokio::test]
async fn update_of_missing_market_is_not_found() {
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let market = sample_market(5);

    let result = make_service(repo)
        .update_market(update_request(&market), &Cancellation::never())
        .await;
    assert_eq!(result, Err(MarketError::NotFound(MarketId::new(5))));
}

#[rstest]
#[tokio::test]
async fn update_without_changes_skips_the_commit() {
    let market = sample_market(5);
    let request = update_request(&market);
    let expected = market.clone();
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));
    repo.expect_commit_update().never();

    let result = make_service(repo)
        .update_market(request, &Cancellation::never())
        .await
        .expect("no-op update succeeds");
    assert_eq!(result, expected);
}

#[rstest]
#[tokio::test]
async fn update_commits_scalars_and_sub_group_delta() {
    let market = sample_market(5);
    let north = market.sub_groups[0].id;
    let south = market.sub_groups[1].id;
    let mut request = update_request(&market);
    request.code = Some("fr".into());
    request.sub_groups = vec![
        SubGroupChangeRequest::delete(north),
        SubGroupChangeRequest::edit(south, "Southern", "S"),
        SubGroupChangeRequest::add("East", "E"),
    ];
    let reloaded = market.clone();
    let stored_name = market.name.clone();
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));
    repo.expect_find_by_code()
        .withf(|code: &MarketCode| code.as_ref() == "FR")
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_commit_update()
        .withf(move |_, scalars: &MarketScalars, plan: &SubGroupPlan| {
            scalars.code.as_ref() == "FR"
                && scalars.name == stored_name
                && plan.to_remove == [north]
                && plan.to_update.len() == 1
                && plan.to_update[0].id == south
                && plan.to_add.len() == 1
        })
        .times(1)
        .return_once(move |_, _, _| Ok(Some(reloaded)));

    make_service(repo)
        .update_market(request, &Cancellation::never())
        .await
        .expect("update succeeds");
}

#[rstest]
#[tokio::test]
async fn update_may_keep_its_own_name_in_another_case() {
    let market = sample_market(5);
    let own = market.clone();
    let mut request = update_request(&market);
    request.name = Some(market.name.as_ref().to_uppercase());
    let reloaded = market.clone();
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));
    repo.expect_find_by_name()
        .times(1)
        .return_once(move |_| Ok(Some(own)));
    repo.expect_commit_update()
        .times(1)
        .return_once(move |_, _, _| Ok(Some(reloaded)));

    make_service(repo)
        .update_market(request, &Cancellation::never())
        .await
        .expect("renaming to own name in another case is allowed");
}

#[rstest]
#[tokio::test]
async fn update_rejects_added_sub_group_clashing_with_sibling() {
    let market = sample_market(5);
    let mut request = update_request(&market);
    request.sub_groups.push(SubGroupChangeRequest::add("Northern", "n"));
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));

    let result = make_service(repo)
        .update_market(request, &Cancellation::never())
        .await;
    assert_eq!(
        result,
        Err(UniquenessConflict::SubGroupCodeTaken("N".into()).into())
    );
}

#[rstest]
#[tokio::test]
async fn update_cancelled_after_load_never_commits() {
    let market = sample_market(5);
    let mut request = update_request(&market);
    request.sub_groups.push(SubGroupChangeRequest::add("East", "E"));
    let (tx, cancellation) = Cancellation::channel();
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id().times(1).return_once(move |_| {
        tx.send(true).expect("receiver alive");
        Ok(Some(market))
    });
    repo.expect_commit_update().never();

    let result = make_service(repo).update_market(request, &cancellation).await;
    assert_eq!(result, Err(MarketError::Cancelled));
}

#[rstest]
#[tokio::test]
async fn delete_refuses_markets_with_sub_groups() {
    let market = sample_market(5);
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));
    repo.expect_delete().never();

    let result = make_service(repo)
        .delete_market(MarketId::new(5), &Cancellation::never())
        .await;
    assert_eq!(result, Err(MarketError::MarketNotEmpty(MarketId::new(5))));
}

#[rstest]
#[tokio::test]
async fn delete_removes_empty_market() {
    let mut market = sample_market(5);
    market.sub_groups.clear();
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(market)));
    repo.expect_delete().times(1).return_once(|_| Ok(true));

    make_service(repo)
        .delete_market(MarketId::new(5), &Cancellation::never())
        .await
        .expect("delete succeeds");
}

#[rstest]
#[tokio::test]
async fn store_outage_surfaces_as_unavailable() {
    let mut repo = MockMarketRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Err(MarketRepositoryError::connection("pool timed out")));

    let result = make_service(repo).get_market(MarketId::new(1)).await;
    assert_eq!(
        result,
        Err(MarketError::StoreUnavailable("pool timed out".into()))
    );
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_search_lists_everything(#[case] text: &str) {
    let mut repo = MockMarketRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(|| Ok(vec![sample_market(1)]));
    repo.expect_search().never();

    let markets = make_service(repo)
        .search_markets(text)
        .await
        .expect("search succeeds");
    assert_eq!(markets.len(), 1);
}

#[rstest]
#[tokio::test]
async fn region_filter_deduplicates_regions() {
    let mut repo = MockMarketRepository::new();
    repo.expect_filter_by_regions()
        .withf(|regions: &[Region]| regions == [Region::Euro, Region::Noam])
        .times(1)
        .return_once(|_| Ok(Vec::new()));

    make_service(repo)
        .filter_markets_by_regions(&[Region::Noam, Region::Euro, Region::Noam])
        .await
        .expect("filter succeeds");
}

#[rstest]
#[tokio::test]
async fn malformed_code_never_exists() {
    let exists = make_service(MockMarketRepository::new())
        .market_code_exists("123")
        .await
        .expect("lookup succeeds");
    assert!(!exists);
}

#[rstest]
#[tokio::test]
async fn sub_group_listing_is_sorted_numeric_first() {
    let row = |id: i64, code: &str| SubGroupListing {
        id: SubGroupId::new(id),
        market_id: MarketId::new(1),
        market_code: MarketCode::new("GB").expect("valid code"),
        sub_group_name: SubGroupName::new(format!("Group {id}")).expect("valid name"),
        sub_group_code: SubGroupCode::new(code).expect("valid code"),
    };
    let rows = vec![row(1, "b"), row(2, "3"), row(3, "A")];
    let mut repo = MockMarketRepository::new();
    repo.expect_list_sub_groups()
        .withf(|code: &Option<MarketCode>| code.as_ref().is_some_and(|c| c.as_ref() == "GB"))
        .times(1)
        .return_once(move |_| Ok(rows));

    let listed = make_service(repo)
        .list_sub_groups(Some("gb".into()))
        .await
        .expect("listing succeeds");
    let ids: Vec<i64> = listed.iter().map(|r| r.id.get()).collect();
    assert_eq!(ids, [2, 3, 1]);
}
