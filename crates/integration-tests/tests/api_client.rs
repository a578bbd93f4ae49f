//! HTTP collaborators and file storage, end to end.
//!
//! Each test starts its own catalog API on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use rocketshoes_cart::testing::sneaker;
use rocketshoes_cart::{
    ApiClient, CartError, CartStore, DEFAULT_CART_KEY, FileStore, LookupError, ProductCatalog,
    StockService,
};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::{
    CatalogApi, broken_product, ids, persisted_cart, spawn_catalog_api,
};

const CACHE_TTL: Duration = Duration::from_secs(60);

async fn client_for(api: &CatalogApi) -> ApiClient {
    ApiClient::new(spawn_catalog_api(api.clone()).await, CACHE_TTL)
}

#[tokio::test]
async fn fetches_product_and_stock() {
    let api = CatalogApi::new(&[(sneaker(1), 3)]);
    let client = client_for(&api).await;

    let product = client.get_product(ProductId::new(1)).await.unwrap();
    let stock = client.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(product.title, "Tênis 1");
    assert_eq!(product.price, sneaker(1).price);
    assert_eq!(product.amount, 0);
    assert_eq!(stock.id, ProductId::new(1));
    assert_eq!(stock.amount, 3);
}

#[tokio::test]
async fn product_records_are_cached_but_stock_is_not() {
    let api = CatalogApi::new(&[(sneaker(2), 3)]);
    let client = client_for(&api).await;

    for _ in 0..3 {
        client.get_product(ProductId::new(2)).await.unwrap();
        client.get_stock(ProductId::new(2)).await.unwrap();
    }

    assert_eq!(api.product_hits(), 1);
    assert_eq!(api.stock_hits(), 3);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let client = client_for(&CatalogApi::new(&[])).await;

    let product = client.get_product(ProductId::new(9)).await.unwrap_err();
    let stock = client.get_stock(ProductId::new(9)).await.unwrap_err();

    assert!(matches!(product, LookupError::NotFound(ref path) if path == "/products/9"));
    assert!(matches!(stock, LookupError::NotFound(ref path) if path == "/stock/9"));
}

#[tokio::test]
async fn server_errors_and_bad_bodies_are_reported() {
    let client = client_for(&CatalogApi::new(&[])).await;

    let product = client.get_product(broken_product()).await.unwrap_err();
    let stock = client.get_stock(broken_product()).await.unwrap_err();

    assert!(matches!(product, LookupError::Unavailable(_)));
    assert!(matches!(stock, LookupError::Parse(_)));
}

#[tokio::test]
async fn unreachable_api_is_an_http_error() {
    let client = ApiClient::new(url::Url::parse("http://127.0.0.1:9").unwrap(), CACHE_TTL);

    let err = client.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, LookupError::Http(_)));
}

#[tokio::test]
async fn cart_survives_restart_over_http_and_file_storage() {
    let api = CatalogApi::new(&[(sneaker(1), 2), (sneaker(2), 5)]);
    let base_url = spawn_catalog_api(api.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    {
        let client = ApiClient::new(base_url.clone(), CACHE_TTL);
        let store = CartStore::initialize(
            client.clone(),
            client,
            FileStore::new(&cart_file),
            DEFAULT_CART_KEY,
        )
        .unwrap();

        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(2)).await.unwrap();
        store.add_product(ProductId::new(1)).await.unwrap();
        let err = store.add_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { available: 2, .. }));
        store
            .update_product_amount(ProductId::new(2), 4)
            .await
            .unwrap();
    }

    let client = ApiClient::new(base_url, CACHE_TTL);
    let store = CartStore::initialize(
        client.clone(),
        client,
        FileStore::new(&cart_file),
        DEFAULT_CART_KEY,
    )
    .unwrap();

    let cart = store.cart();
    assert_eq!(ids(&cart), vec![1, 2]);
    assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 2);
    assert_eq!(cart.get(ProductId::new(2)).unwrap().amount, 4);
    assert_eq!(cart.get(ProductId::new(2)).unwrap().title, "Tênis 2");

    store.remove_product(ProductId::new(1)).await.unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cart_file).unwrap()).unwrap();
    let snapshot = raw[DEFAULT_CART_KEY].as_str().unwrap();
    let persisted: serde_json::Value = serde_json::from_str(snapshot).unwrap();
    assert_eq!(persisted.as_array().unwrap().len(), 1);
    assert_eq!(persisted[0]["id"], 2);
    assert_eq!(persisted[0]["amount"], 4);
}

#[tokio::test]
async fn storage_keys_are_independent() {
    let api = CatalogApi::new(&[(sneaker(3), 5)]);
    let client = client_for(&api).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path().join("carts.json")));

    let first =
        CartStore::initialize(client.clone(), client.clone(), Arc::clone(&storage), "@Shop:a")
            .unwrap();
    let second = CartStore::initialize(client.clone(), client, storage, "@Shop:b").unwrap();

    first.add_product(ProductId::new(3)).await.unwrap();

    assert_eq!(first.cart().len(), 1);
    assert!(second.cart().is_empty());
    assert_eq!(second.storage_key(), "@Shop:b");
}

#[tokio::test]
async fn undecodable_cart_file_starts_empty_and_recovers() {
    let api = CatalogApi::new(&[(sneaker(4), 5)]);
    let client = client_for(&api).await;
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");
    std::fs::write(&cart_file, "<<not a storage file>>").unwrap();

    let store = CartStore::initialize(
        client.clone(),
        client,
        FileStore::new(&cart_file),
        DEFAULT_CART_KEY,
    )
    .unwrap();
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(4)).await.unwrap();

    let reopened = FileStore::new(&cart_file);
    let snapshot = persisted_cart(&reopened);
    assert_eq!(ids(&snapshot), vec![4]);
}
