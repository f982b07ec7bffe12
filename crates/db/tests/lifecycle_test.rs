//! Archive, restore and purge across repositories.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{account, balance, daily_sale, date, fund, setup, staff};
use forecourt_core::lifecycle::{LifecycleError, RecordStatus as CoreStatus};
use forecourt_db::{
    AccountRepository, ExpenseTypeRepository, SafedropRepository, TransactionRepository,
    entities::{
        accounts, expense_types,
        sea_orm_active_enums::{AccountKind, RecordStatus, TransactionType},
        transactions,
    },
    repositories::{
        AccountFilter, CreateAccountInput, CreateExpenseTypeInput, CreateTransactionInput, RecordError,
        ResolveSafedropInput, UpdateExpenseTypeInput, archive, purge, restore,
    },
};
use forecourt_shared::types::PageRequest;

fn page(with_archived: bool, only_archived: bool) -> PageRequest {
    PageRequest {
        with_archived,
        only_archived,
        ..PageRequest::default()
    }
}

#[tokio::test]
async fn test_archived_records_hidden_by_default() {
    let db = setup().await;
    let repo = ExpenseTypeRepository::new(db.clone());
    let fuel = repo
        .create(CreateExpenseTypeInput { name: "Fuel".into(), parent_id: None })
        .await
        .unwrap();
    repo.create(CreateExpenseTypeInput { name: "Rent".into(), parent_id: None })
        .await
        .unwrap();

    let archived = archive::<expense_types::Entity>(&db, fuel.id).await.unwrap();
    assert_eq!(archived.status, RecordStatus::Archived);
    assert!(archived.archived_at.is_some());

    let active = repo.list(None, &page(false, false)).await.unwrap();
    assert_eq!(active.meta.total, 1);
    assert_eq!(active.data[0].name, "Rent");

    let all = repo.list(None, &page(true, false)).await.unwrap();
    assert_eq!(all.meta.total, 2);

    let only = repo.list(None, &page(true, true)).await.unwrap();
    assert_eq!(only.meta.total, 1);
    assert_eq!(only.data[0].id, fuel.id);

    let restored = restore::<expense_types::Entity>(&db, fuel.id).await.unwrap();
    assert_eq!(restored.status, RecordStatus::Active);
    assert!(restored.archived_at.is_none());
    assert_eq!(repo.list(None, &page(false, false)).await.unwrap().meta.total, 2);
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let db = setup().await;
    let repo = ExpenseTypeRepository::new(db.clone());
    let kind = repo
        .create(CreateExpenseTypeInput { name: "Utilities".into(), parent_id: None })
        .await
        .unwrap();

    let err = restore::<expense_types::Entity>(&db, kind.id).await.unwrap_err();
    assert!(matches!(
        err,
        RecordError::Lifecycle(LifecycleError::InvalidTransition { from: CoreStatus::Active, .. })
    ));

    archive::<expense_types::Entity>(&db, kind.id).await.unwrap();
    let err = archive::<expense_types::Entity>(&db, kind.id).await.unwrap_err();
    assert!(matches!(err, RecordError::Lifecycle(_)));

    let err = archive::<expense_types::Entity>(&db, uuid::Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound { .. }));
}

#[tokio::test]
async fn test_purge_blocked_by_children_then_allowed() {
    let db = setup().await;
    let repo = ExpenseTypeRepository::new(db.clone());
    let parent = repo
        .create(CreateExpenseTypeInput { name: "Maintenance".into(), parent_id: None })
        .await
        .unwrap();
    let child = repo
        .create(CreateExpenseTypeInput { name: "Pumps".into(), parent_id: Some(parent.id) })
        .await
        .unwrap();
    archive::<expense_types::Entity>(&db, child.id).await.unwrap();

    let err = purge::<expense_types::Entity>(&db, parent.id).await.unwrap_err();
    assert!(matches!(
        err,
        RecordError::Lifecycle(LifecycleError::HasDependents(1))
    ));

    purge::<expense_types::Entity>(&db, child.id).await.unwrap();
    purge::<expense_types::Entity>(&db, parent.id).await.unwrap();
    assert!(matches!(
        repo.find(parent.id).await,
        Err(RecordError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_expense_type_cannot_become_its_own_ancestor() {
    let db = setup().await;
    let repo = ExpenseTypeRepository::new(db.clone());
    let root = repo
        .create(CreateExpenseTypeInput { name: "Store".into(), parent_id: None })
        .await
        .unwrap();
    let leaf = repo
        .create(CreateExpenseTypeInput { name: "Cleaning".into(), parent_id: Some(root.id) })
        .await
        .unwrap();

    let err = repo
        .update(
            root.id,
            UpdateExpenseTypeInput {
                parent_id: Some(Some(leaf.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "parent_id", .. }));
}

#[tokio::test]
async fn test_manual_transaction_lifecycle_moves_balances() {
    let db = setup().await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let card = account(&db, "Card", AccountKind::Credit).await;
    fund(&db, bank.id, dec!(500)).await;

    let transfer = TransactionRepository::new(db.clone())
        .create(CreateTransactionInput {
            transaction_type: TransactionType::Transfer,
            amount: dec!(200),
            source_account_id: Some(bank.id),
            target_account_id: Some(card.id),
            description: Some("Card payment".into()),
            reference_number: None,
            transaction_date: date(2026, 3, 2),
            expense_type_id: None,
            created_by: Some(staff()),
        })
        .await
        .unwrap();
    assert_eq!(balance(&db, bank.id).await, dec!(300));
    assert_eq!(balance(&db, card.id).await, dec!(200));

    archive::<transactions::Entity>(&db, transfer.id).await.unwrap();
    assert_eq!(balance(&db, bank.id).await, dec!(500));
    assert_eq!(balance(&db, card.id).await, Decimal::ZERO);

    restore::<transactions::Entity>(&db, transfer.id).await.unwrap();
    assert_eq!(balance(&db, bank.id).await, dec!(300));

    purge::<transactions::Entity>(&db, transfer.id).await.unwrap();
    assert_eq!(balance(&db, bank.id).await, dec!(500));
    assert_eq!(balance(&db, card.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_restore_rejects_archived_account() {
    let db = setup().await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let card = account(&db, "Card", AccountKind::Credit).await;
    fund(&db, bank.id, dec!(500)).await;

    let transfer = TransactionRepository::new(db.clone())
        .create(CreateTransactionInput {
            transaction_type: TransactionType::Transfer,
            amount: dec!(200),
            source_account_id: Some(bank.id),
            target_account_id: Some(card.id),
            description: None,
            reference_number: None,
            transaction_date: date(2026, 3, 2),
            expense_type_id: None,
            created_by: Some(staff()),
        })
        .await
        .unwrap();
    archive::<transactions::Entity>(&db, transfer.id).await.unwrap();
    archive::<accounts::Entity>(&db, card.id).await.unwrap();

    let err = restore::<transactions::Entity>(&db, transfer.id).await.unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "target_account_id", .. }));
    assert_eq!(balance(&db, bank.id).await, dec!(500));
    assert_eq!(balance(&db, card.id).await, Decimal::ZERO);

    restore::<accounts::Entity>(&db, card.id).await.unwrap();
    restore::<transactions::Entity>(&db, transfer.id).await.unwrap();
    assert_eq!(balance(&db, bank.id).await, dec!(300));
    assert_eq!(balance(&db, card.id).await, dec!(200));
}

#[tokio::test]
async fn test_manual_transaction_validation() {
    let db = setup().await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let repo = TransactionRepository::new(db.clone());
    let base = CreateTransactionInput {
        transaction_type: TransactionType::Expense,
        amount: dec!(12.5),
        source_account_id: Some(bank.id),
        target_account_id: None,
        description: None,
        reference_number: None,
        transaction_date: date(2026, 3, 2),
        expense_type_id: None,
        created_by: None,
    };

    let err = repo
        .create(CreateTransactionInput {
            source_account_id: None,
            ..base.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "source_account_id", .. }));

    let err = repo
        .create(CreateTransactionInput {
            amount: dec!(1.005),
            ..base.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "amount", .. }));

    archive::<accounts::Entity>(&db, bank.id).await.unwrap();
    let err = repo.create(base).await.unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "source_account_id", .. }));
}

#[tokio::test]
async fn test_generated_transactions_are_not_user_managed() {
    let db = setup().await;
    let cash = account(&db, "Cash", AccountKind::Cash).await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    fund(&db, cash.id, dec!(200)).await;
    let sale = daily_sale(&db, date(2026, 3, 2), dec!(200)).await;
    let resolved = SafedropRepository::new(db.clone())
        .resolve(ResolveSafedropInput {
            daily_sale_id: sale.id,
            target_account_id: bank.id,
            amount: dec!(200),
            note: None,
            created_by: staff(),
        })
        .await
        .unwrap();

    let err = archive::<transactions::Entity>(&db, resolved.transaction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid { field: "origin", .. }));
    assert_eq!(balance(&db, bank.id).await, dec!(200));
}

#[tokio::test]
async fn test_account_purge_blocked_by_transactions() {
    let db = setup().await;
    let bank = account(&db, "Bank", AccountKind::Bank).await;
    let spare = account(&db, "Spare", AccountKind::Other).await;
    fund(&db, bank.id, dec!(500)).await;

    let err = purge::<accounts::Entity>(&db, bank.id).await.unwrap_err();
    assert!(matches!(
        err,
        RecordError::Lifecycle(LifecycleError::HasDependents(1))
    ));

    purge::<accounts::Entity>(&db, spare.id).await.unwrap();
}

#[tokio::test]
async fn test_single_active_cash_account() {
    let db = setup().await;
    account(&db, "Cash", AccountKind::Cash).await;
    let repo = AccountRepository::new(db.clone());

    let err = repo
        .create(CreateAccountInput {
            name: "Second till".into(),
            kind: AccountKind::Cash,
            description: None,
            is_active: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Duplicate(_)));

    let err = repo
        .create(CreateAccountInput {
            name: "Cash".into(),
            kind: AccountKind::Bank,
            description: None,
            is_active: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Duplicate(_)));
}

#[tokio::test]
async fn test_restoring_cash_account_keeps_single_active_cash() {
    let db = setup().await;
    let old_till = account(&db, "Old till", AccountKind::Cash).await;
    archive::<accounts::Entity>(&db, old_till.id).await.unwrap();
    let new_till = account(&db, "New till", AccountKind::Cash).await;

    let err = restore::<accounts::Entity>(&db, old_till.id).await.unwrap_err();
    assert!(matches!(err, RecordError::Duplicate(_)));

    let active_cash = AccountRepository::new(db.clone())
        .list(
            AccountFilter {
                kind: Some(AccountKind::Cash),
                is_active: Some(true),
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(active_cash.meta.total, 1);
    assert_eq!(active_cash.data[0].id, new_till.id);

    archive::<accounts::Entity>(&db, new_till.id).await.unwrap();
    let restored = restore::<accounts::Entity>(&db, old_till.id).await.unwrap();
    assert_eq!(restored.status, RecordStatus::Active);
}
