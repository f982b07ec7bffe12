//! Safedrop resolution against SQLite: allocation bound, balance
//! conservation and serialised concurrent resolutions.
//!
//! Amounts are exact in binary floating point so SQLite round-trips them.

mod common;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use common::{account, balance, daily_sale, date, fund, setup, staff};
use forecourt_core::safedrop::{SafedropError, SettlementState};
use forecourt_db::{
    AccountRepository, DailySaleRepository, RecordError, SafedropRepository,
    entities::{
        safedrop_resolutions,
        sea_orm_active_enums::{AccountKind, TransactionOrigin, TransactionType},
        transactions,
    },
    repositories::{
        ResolveSafedropInput, SafedropRepoError, UpdateAccountInput, UpdateDailySaleInput,
        archive,
    },
};

fn input(daily_sale_id: Uuid, target_account_id: Uuid, amount: Decimal) -> ResolveSafedropInput {
    ResolveSafedropInput {
        daily_sale_id,
        target_account_id,
        amount,
        note: None,
        created_by: staff(),
    }
}

#[tokio::test]
async fn test_documented_example() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(500)).await;
    let sale = daily_sale(&db, date(2026, 3, 2), dec!(500)).await;
    let repo = SafedropRepository::new(db.clone());

    let first = repo.resolve(input(sale.id, bank.id, dec!(300))).await.unwrap();
    assert_eq!(first.remaining, dec!(200));
    assert_eq!(first.state, SettlementState::Partial);
    assert!(first.resolution.reference_number.starts_with("SR-20260302-"));
    assert_eq!(first.transaction.transaction_type, TransactionType::Transfer);
    assert_eq!(first.transaction.origin, TransactionOrigin::Safedrop);
    assert_eq!(first.transaction.source_account_id, Some(cash.id));
    assert_eq!(first.transaction.target_account_id, Some(bank.id));
    assert_eq!(first.resolution.transaction_id, first.transaction.id);

    let err = repo.resolve(input(sale.id, bank.id, dec!(250))).await.unwrap_err();
    assert!(matches!(
        err,
        SafedropRepoError::Rule(SafedropError::OverAllocation { .. })
    ));
    assert_eq!(balance(&db, cash.id).await, dec!(200));
    assert_eq!(balance(&db, bank.id).await, dec!(300));
    let resolutions = safedrop_resolutions::Entity::find().count(&db).await.unwrap();
    assert_eq!(resolutions, 1);

    let last = repo.resolve(input(sale.id, bank.id, dec!(200))).await.unwrap();
    assert_eq!(last.remaining, Decimal::ZERO);
    assert_eq!(last.state, SettlementState::Resolved);

    assert_eq!(balance(&db, cash.id).await, Decimal::ZERO);
    assert_eq!(balance(&db, bank.id).await, dec!(500));

    let summary = repo.for_sale(sale.id).await.unwrap();
    assert_eq!(summary.resolutions.len(), 2);
    assert_eq!(summary.resolved_total, dec!(500));
    assert_eq!(summary.state, SettlementState::Resolved);
}

#[tokio::test]
async fn test_each_resolution_conserves_balances() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let savings = account(&db, "Savings", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(1000)).await;
    let sale = daily_sale(&db, date(2026, 3, 3), dec!(1000)).await;
    let repo = SafedropRepository::new(db.clone());

    for (target, amount) in [(bank.id, dec!(250)), (savings.id, dec!(500)), (bank.id, dec!(12.5))] {
        let cash_before = balance(&db, cash.id).await;
        let target_before = balance(&db, target).await;

        repo.resolve(input(sale.id, target, amount)).await.unwrap();

        assert_eq!(cash_before - balance(&db, cash.id).await, amount);
        assert_eq!(balance(&db, target).await - target_before, amount);
    }
}

#[tokio::test]
async fn test_concurrent_resolutions_never_over_allocate() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(500)).await;
    let sale = daily_sale(&db, date(2026, 3, 4), dec!(500)).await;
    let repo = SafedropRepository::new(db.clone());

    let attempts = (0..8).map(|_| {
        let repo = repo.clone();
        let request = input(sale.id, bank.id, dec!(100));
        tokio::spawn(async move { repo.resolve(request).await })
    });
    let results = join_all(attempts).await;

    let succeeded = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();
    assert_eq!(succeeded, 5);

    let summary = repo.for_sale(sale.id).await.unwrap();
    assert_eq!(summary.resolved_total, dec!(500));
    assert_eq!(balance(&db, cash.id).await, Decimal::ZERO);
    assert_eq!(balance(&db, bank.id).await, dec!(500));
}

#[tokio::test]
async fn test_rejects_unusable_targets() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let dormant = account(&db, "Dormant", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(100)).await;
    let sale = daily_sale(&db, date(2026, 3, 5), dec!(100)).await;
    let repo = SafedropRepository::new(db.clone());

    let err = repo.resolve(input(sale.id, cash.id, dec!(50))).await.unwrap_err();
    assert!(matches!(err, SafedropRepoError::Rule(SafedropError::TargetIsCash)));

    AccountRepository::new(db.clone())
        .update(
            dormant.id,
            UpdateAccountInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = repo.resolve(input(sale.id, dormant.id, dec!(50))).await.unwrap_err();
    assert!(matches!(
        err,
        SafedropRepoError::Rule(SafedropError::TargetUnavailable(id)) if id == dormant.id
    ));

    let err = repo.resolve(input(sale.id, Uuid::now_v7(), dec!(50))).await.unwrap_err();
    assert!(matches!(
        err,
        SafedropRepoError::Record(RecordError::NotFound { .. })
    ));

    let err = repo.resolve(input(sale.id, dormant.id, dec!(0))).await.unwrap_err();
    assert!(matches!(err, SafedropRepoError::Rule(_)));

    assert_eq!(balance(&db, cash.id).await, dec!(100));
    let mirrored = transactions::Entity::find()
        .filter(transactions::Column::Origin.eq(TransactionOrigin::Safedrop))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(mirrored, 0);
}

#[tokio::test]
async fn test_rejects_archived_sale_and_missing_cash_account() {
    let db = setup().await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let sale = daily_sale(&db, date(2026, 3, 6), dec!(200)).await;
    let repo = SafedropRepository::new(db.clone());

    let err = repo.resolve(input(sale.id, bank.id, dec!(100))).await.unwrap_err();
    assert!(matches!(err, SafedropRepoError::NoCashAccount));

    account(&db, "Cash", AccountKind::Cash).await;
    archive::<forecourt_db::entities::daily_sales::Entity>(&db, sale.id)
        .await
        .unwrap();
    let err = repo.resolve(input(sale.id, bank.id, dec!(100))).await.unwrap_err();
    assert!(matches!(
        err,
        SafedropRepoError::Record(RecordError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_amendment_cannot_strand_resolutions() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(500)).await;
    let sale = daily_sale(&db, date(2026, 3, 7), dec!(500)).await;
    SafedropRepository::new(db.clone())
        .resolve(input(sale.id, bank.id, dec!(300)))
        .await
        .unwrap();
    let sales = DailySaleRepository::new(db.clone());

    let err = sales
        .update(
            sale.id,
            UpdateDailySaleInput {
                safedrops_amount: Some(dec!(250)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RecordError::Invalid { field: "safedrops_amount", .. }
    ));

    let amended = sales
        .update(
            sale.id,
            UpdateDailySaleInput {
                safedrops_amount: Some(dec!(300)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(amended.safedrops_amount, dec!(300));
}

#[tokio::test]
async fn test_pending_summary_lists_unresolved_days() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(1000)).await;
    let settled = daily_sale(&db, date(2026, 3, 10), dec!(200)).await;
    let partial = daily_sale(&db, date(2026, 3, 11), dec!(500)).await;
    let untouched = daily_sale(&db, date(2026, 3, 12), dec!(250)).await;
    daily_sale(&db, date(2026, 4, 1), dec!(250)).await;
    let repo = SafedropRepository::new(db.clone());

    repo.resolve(input(settled.id, bank.id, dec!(200))).await.unwrap();
    repo.resolve(input(partial.id, bank.id, dec!(300))).await.unwrap();

    let pending = repo.pending(date(2026, 3, 1), date(2026, 3, 31)).await.unwrap();
    let ids: Vec<Uuid> = pending.iter().map(|p| p.daily_sale_id).collect();
    assert_eq!(ids, vec![partial.id, untouched.id]);
    assert_eq!(pending[0].remaining, dec!(200));
    assert_eq!(pending[0].state, SettlementState::Partial);
    assert_eq!(pending[1].state, SettlementState::Pending);
}
