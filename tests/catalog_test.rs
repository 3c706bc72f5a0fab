mod common;

use assert2::{check, let_assert};
use common::{LISTINGS_JSON, TempWorkspace};
use listing_search::ListingCatalog;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

const ONE_LISTING: &str = r#"[{"id": "ONLY-1", "title": "Lote en Barú", "city": "Cartagena"}]"#;

#[tokio::test]
async fn fresh_entry_is_served_from_memory() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let_assert!(Ok(first) = catalog.get(&source).await);
    check!(first.len() == 4);
    check!(catalog.is_cached(&source).await);

    workspace.create_file("listings.json", ONE_LISTING);
    let_assert!(Ok(second) = catalog.get(&source).await);
    check!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn expired_entry_is_reloaded() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let catalog = ListingCatalog::with_ttl(Duration::ZERO, 4);

    let_assert!(Ok(first) = catalog.get(&source).await);
    check!(first.len() == 4);
    check!(!catalog.is_cached(&source).await);

    workspace.create_file("listings.json", ONE_LISTING);
    let_assert!(Ok(second) = catalog.get(&source).await);
    check!(second.len() == 1);
    check!(second[0].id == "ONLY-1");
}

#[tokio::test]
async fn invalidate_and_clear_force_a_reload() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let_assert!(Ok(_) = catalog.get(&source).await);
    workspace.create_file("listings.json", ONE_LISTING);

    catalog.invalidate(&source).await;
    check!(!catalog.is_cached(&source).await);
    let_assert!(Ok(reloaded) = catalog.get(&source).await);
    check!(reloaded.len() == 1);

    workspace.create_file("listings.json", LISTINGS_JSON);
    catalog.clear().await;
    let_assert!(Ok(reloaded) = catalog.get(&source).await);
    check!(reloaded.len() == 4);
}

#[tokio::test]
async fn concurrent_loads_share_one_read() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let (a, b) = tokio::join!(catalog.get(&source), catalog.get(&source));
    let_assert!(Ok(a) = a);
    let_assert!(Ok(b) = b);
    check!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn failed_load_is_not_cached() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", "not json");
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let_assert!(Err(_) = catalog.get(&source).await);
    check!(!catalog.is_cached(&source).await);

    workspace.create_file("listings.json", LISTINGS_JSON);
    let_assert!(Ok(listings) = catalog.get(&source).await);
    check!(listings.len() == 4);
}

#[tokio::test]
async fn sources_are_cached_independently() {
    let workspace = TempWorkspace::new();
    let first = workspace.create_file("a.json", LISTINGS_JSON);
    let second = workspace.create_file("b.json", ONE_LISTING);
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let_assert!(Ok(a) = catalog.get(&first).await);
    let_assert!(Ok(b) = catalog.get(&second).await);
    check!(a.len() == 4);
    check!(b.len() == 1);
    check!(catalog.is_cached(&first).await);
    check!(catalog.is_cached(&second).await);
}

#[tokio::test]
async fn load_running_during_clear_is_not_cached() {
    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let catalog = ListingCatalog::with_ttl(Duration::from_secs(1200), 4);

    let mut pending = Box::pin(catalog.get(&source));
    let first_poll = futures::poll!(&mut pending);
    catalog.clear().await;

    let result = match first_poll {
        Poll::Ready(result) => result,
        Poll::Pending => pending.await,
    };
    let_assert!(Ok(_) = result);
    check!(!catalog.is_cached(&source).await);

    workspace.create_file("listings.json", ONE_LISTING);
    let_assert!(Ok(reloaded) = catalog.get(&source).await);
    check!(reloaded.len() == 1);
}
