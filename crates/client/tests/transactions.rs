mod common;

use api_types::{
    metadata::PaymentMethod,
    transaction::{TransactionNew, TransactionType},
};
use axum::http::Method;
use chrono::NaiveDate;
use finflow_client::{
    ClientError, ErrorKind, TransactionBrowser, TransactionFilter, TransactionFilterType,
    TransactionKind, TransactionRecord, dashboard::dashboard_key, normalize::UNCATEGORIZED,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

use common::{FakeBackend, authenticated, raw_transaction, settled};

fn new_transaction() -> TransactionNew {
    TransactionNew {
        description: "Mercado".to_string(),
        amount: Decimal::new(8990, 2),
        kind: TransactionType::Expense,
        payment_method: PaymentMethod::Pix,
        account_id: "acc-1".to_string(),
        category_id: "cat-1".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
    }
}

#[tokio::test]
async fn uber_search_is_sent_and_normalised() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions",
        200,
        json!({
            "data": [raw_transaction("t1", "Uber", "EXPENSE", json!({ "name": "Transporte" }))],
            "meta": { "page": 1, "pageSize": 10, "total": 1, "totalPages": 1 },
        }),
    );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new().with_search("uber");
    let page = client.transactions().list(&filter).await.unwrap();

    assert_eq!(page.items.len(), 1);
    let record = &page.items[0];
    assert_eq!(record.description, "Uber");
    assert_eq!(record.kind, TransactionKind::Expense);
    assert_eq!(record.category, "Transporte");
    assert_eq!(record.account, "Nubank");
    assert_eq!(page.meta.total_pages, 1);

    let hits = backend.hits(Method::GET, "/transactions");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].param("page"), Some("1"));
    assert_eq!(hits[0].param("pageSize"), Some("10"));
    assert_eq!(hits[0].param("search"), Some("uber"));
    assert_eq!(hits[0].param("type"), None);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer token-123"));
    assert_eq!(hits[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn first_page_of_all_types_is_normalised() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions",
        200,
        json!({
            "data": [{
                "id": "1",
                "description": "Uber",
                "amount": 22.5,
                "type": "EXPENSE",
                "category": { "name": "Transporte" },
                "account": { "name": "Nubank" },
                "date": "2023-04-04",
            }],
            "meta": { "page": 1, "pageSize": 10, "total": 1, "totalPages": 1 },
        }),
    );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new()
        .with_page(1)
        .with_page_size(10)
        .with_kind(TransactionFilterType::All);
    let page = client.transactions().list(&filter).await.unwrap();

    assert_eq!(
        page.items,
        vec![TransactionRecord {
            id: "1".to_string(),
            description: "Uber".to_string(),
            amount: Decimal::new(225, 1),
            kind: TransactionKind::Expense,
            category: "Transporte".to_string(),
            date: "2023-04-04".to_string(),
            account: "Nubank".to_string(),
        }]
    );
    assert_eq!(page.meta.page, 1);
    assert_eq!(page.meta.page_size, 10);
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.meta.total_pages, 1);

    let hits = backend.hits(Method::GET, "/transactions");
    assert_eq!(hits[0].param("page"), Some("1"));
    assert_eq!(hits[0].param("pageSize"), Some("10"));
    assert_eq!(hits[0].param("type"), None);
}

#[tokio::test]
async fn type_filter_is_upper_cased_on_the_wire() {
    let backend = FakeBackend::new();
    backend.respond(Method::GET, "/transactions", 200, json!({ "data": [] }));
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new().with_kind(TransactionFilterType::Income);
    client.transactions().list(&filter).await.unwrap();

    let hits = backend.hits(Method::GET, "/transactions");
    assert_eq!(hits[0].param("type"), Some("INCOME"));
    assert_eq!(hits[0].param("search"), None);
}

#[tokio::test]
async fn missing_meta_and_category_fall_back() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions",
        200,
        json!({
            "data": [
                raw_transaction("t1", "Salário", "income", json!(null)),
                raw_transaction("t2", "Padaria", "EXPENSE", json!({ "name": "Alimentação" })),
            ],
        }),
    );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new().with_page_size(20).with_page(2);
    let page = client.transactions().list(&filter).await.unwrap();

    assert_eq!(page.items[0].category, UNCATEGORIZED);
    assert_eq!(page.items[0].kind, TransactionKind::Income);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.page_size, 20);
    assert_eq!(page.meta.total, 2);
    assert_eq!(page.meta.total_pages, 1);
}

#[tokio::test]
async fn server_error_fails_with_fetch_error() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions",
        500,
        json!({ "message": "database down" }),
    );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new();
    let err = client.transactions().list(&filter).await.unwrap_err();

    assert_eq!(err.to_string(), "fetch error");
    assert_eq!(err.kind(), ErrorKind::Server);
    let state = client.cache().state(&filter.query_key()).unwrap();
    assert_eq!(state.error(), Some("fetch error"));
}

#[tokio::test]
async fn repeated_list_within_stale_time_hits_the_cache() {
    let backend = FakeBackend::new();
    backend.respond(Method::GET, "/transactions", 200, json!({ "data": [] }));
    let client = finflow_client::Client::builder(backend.spawn().await)
        .session(common::session())
        .cache_config(query_cache::CacheConfig {
            stale_time: Duration::from_secs(60),
            ..Default::default()
        })
        .build()
        .unwrap();

    let filter = TransactionFilter::new();
    client.transactions().list(&filter).await.unwrap();
    client.transactions().list(&filter).await.unwrap();
    client
        .transactions()
        .list(&filter.clone().with_page(2))
        .await
        .unwrap();

    assert_eq!(backend.hits(Method::GET, "/transactions").len(), 2);
}

#[tokio::test]
async fn create_invalidates_transactions_and_dashboard() {
    let backend = FakeBackend::new();
    backend
        .respond(Method::GET, "/transactions", 200, json!({ "data": [] }))
        .respond(
            Method::GET,
            "/dashboard",
            200,
            json!({
                "totalBalance": 100, "monthlyIncome": 50, "monthlyExpense": 20,
                "monthlySavings": 30, "monthlySummary": [], "expensesByCategory": [],
            }),
        )
        .respond(
            Method::POST,
            "/transactions",
            201,
            raw_transaction("t9", "Mercado", "EXPENSE", json!({ "name": "Mercado" })),
        );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new();
    client.transactions().list(&filter).await.unwrap();
    client.dashboard().summary(3, 2025).await.unwrap();
    let mut list_sub = client.cache().subscribe(filter.query_key());

    let created = client.transactions().create(&new_transaction()).await.unwrap();
    assert_eq!(created.id, "t9");

    let posted = backend.hits(Method::POST, "/transactions");
    assert_eq!(posted[0].body.as_ref().unwrap()["paymentMethod"], "PIX");
    assert_eq!(posted[0].body.as_ref().unwrap()["type"], "EXPENSE");

    // Observed list refetches by itself.
    settled(&mut list_sub).await;
    assert_eq!(backend.hits(Method::GET, "/transactions").len(), 2);

    // Unobserved dashboard waits for its next read.
    assert!(client.cache().state(&dashboard_key(3, 2025)).unwrap().stale);
    assert_eq!(backend.hits(Method::GET, "/dashboard").len(), 1);
    client.dashboard().summary(3, 2025).await.unwrap();
    assert_eq!(backend.hits(Method::GET, "/dashboard").len(), 2);
}

#[tokio::test]
async fn invalid_transaction_is_never_sent() {
    let backend = FakeBackend::new();
    let client = authenticated(&backend).await;

    let mut input = new_transaction();
    input.category_id.clear();
    let err = client.transactions().create(&input).await.unwrap_err();

    assert!(matches!(err, ClientError::Invalid(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn delete_failure_carries_the_server_message() {
    let backend = FakeBackend::new();
    backend
        .respond(Method::GET, "/transactions", 200, json!({ "data": [] }))
        .respond(
            Method::DELETE,
            "/transactions/t1",
            404,
            json!({ "message": "Transação não encontrada" }),
        );
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new();
    client.transactions().list(&filter).await.unwrap();
    let err = client.transactions().delete("t1").await.unwrap_err();

    assert_eq!(err.to_string(), "Transação não encontrada");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!client.cache().state(&filter.query_key()).unwrap().stale);
}

#[tokio::test]
async fn delete_keeps_the_id_inside_its_own_path_segment() {
    let backend = FakeBackend::new();
    backend.respond(Method::DELETE, "/accounts/a1", 200, json!(null));
    let client = authenticated(&backend).await;

    let err = client
        .transactions()
        .delete("../accounts/a1")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "not found");
    assert!(backend.hits(Method::DELETE, "/accounts/a1").is_empty());
    let paths: Vec<_> = backend.requests().into_iter().map(|req| req.path).collect();
    assert_eq!(paths, ["/transactions/..%2Faccounts%2Fa1"]);
}

#[tokio::test]
async fn dot_ids_are_refused_before_sending() {
    let backend = FakeBackend::new();
    let client = authenticated(&backend).await;

    for id in ["..", ".", ""] {
        let err = client.transactions().delete(id).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
    }
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn unreadable_create_response_still_counts_as_applied() {
    let backend = FakeBackend::new();
    backend
        .respond(Method::GET, "/transactions", 200, json!({ "data": [] }))
        .respond(Method::POST, "/transactions", 201, json!({ "ok": true }));
    let client = authenticated(&backend).await;

    let filter = TransactionFilter::new();
    client.transactions().list(&filter).await.unwrap();
    let err = client
        .transactions()
        .create(&new_transaction())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
    assert!(client.cache().state(&filter.query_key()).unwrap().stale);
}

#[tokio::test]
async fn delete_without_body_uses_the_fallback_message() {
    let backend = FakeBackend::new();
    backend.respond(Method::DELETE, "/transactions/t1", 500, json!(null));
    let client = authenticated(&backend).await;

    let err = client.transactions().delete("t1").await.unwrap_err();
    assert_eq!(err.to_string(), "Erro ao excluir transação");
}

#[tokio::test]
async fn recent_accepts_a_bare_array() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions/recents",
        200,
        json!([raw_transaction("t1", "Uber", "expense", json!({ "name": "Transporte" }))]),
    );
    let client = authenticated(&backend).await;

    let recent = client.transactions().recent(5).await.unwrap();

    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].category, "Transporte");
    let hits = backend.hits(Method::GET, "/transactions/recents");
    assert_eq!(hits[0].param("limit"), Some("5"));
}

#[tokio::test]
async fn browser_loads_the_settled_search() {
    let backend = FakeBackend::new();
    backend.respond(
        Method::GET,
        "/transactions",
        200,
        json!({
            "data": [raw_transaction("t1", "Uber", "EXPENSE", json!({ "name": "Transporte" }))],
            "meta": { "page": 1, "pageSize": 10, "total": 12, "totalPages": 2 },
        }),
    );
    let client = authenticated(&backend).await;
    let mut browser = TransactionBrowser::new(client, 10, Duration::from_millis(50));

    for text in ["u", "ub", "ube", "uber"] {
        browser.type_search(text);
    }
    assert_eq!(browser.search_settled().await.as_deref(), Some("uber"));
    let page = browser.load().await.unwrap();
    assert_eq!(page.items[0].description, "Uber");

    assert!(browser.next_page());
    browser.load().await.unwrap();

    let hits = backend.hits(Method::GET, "/transactions");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.param("search") == Some("uber")));
    assert_eq!(hits[1].param("page"), Some("2"));
}
