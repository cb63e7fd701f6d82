//! End-to-end tests: the real service on an ephemeral port, driven by the
//! real client types.

use std::sync::Arc;
use std::time::Duration;

use hymnal_common::api::auth::create_session;
use hymnal_common::db::init_database;
use hymnal_common::HymnId;
use hymnal_favorites::{
    merge_local_into_remote, FavoritePresenter, FavoriteReconciler, FavoriteStore, HymnClient,
    IdentityMode, LocalFavoriteStore, MemoryStorage, ReconcileError, RemoteFavoriteStore,
    ToggleOutcome,
};
use hymnal_server::db::{insert_hymn, NewHymn};
use hymnal_server::{build_router, AppState};
use sqlx::SqlitePool;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);

struct TestServer {
    base_url: String,
    db: SqlitePool,
    _dir: TempDir,
}

/// Test helper: seeded database served on 127.0.0.1:0
async fn start_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let db = init_database(&dir.path().join("hymnal.db")).await.unwrap();

    sqlx::query("INSERT INTO users (guid, email) VALUES ('alice', 'alice@example.com')")
        .execute(&db)
        .await
        .unwrap();

    for (id, title, author) in [
        ("h1", "Amazing Grace", "John Newton"),
        ("h2", "Be Thou My Vision", "Dallan Forgaill"),
        ("h9", "Holy, Holy, Holy", "Reginald Heber"),
    ] {
        let mut hymn = NewHymn::new(title);
        hymn.id = Some(id.to_string());
        hymn.author = Some(author.to_string());
        hymn.lyrics = format!("{}\nverse", title);
        insert_hymn(&db, &hymn).await.unwrap();
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState::new(db.clone()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        db,
        _dir: dir,
    }
}

fn id(raw: &str) -> HymnId {
    HymnId::new(raw).unwrap()
}

async fn authenticated_reconciler(server: &TestServer) -> (Arc<RemoteFavoriteStore>, FavoriteReconciler) {
    let token = create_session(&server.db, "alice").await.unwrap();
    let remote = Arc::new(RemoteFavoriteStore::new(&server.base_url, &token, TIMEOUT).unwrap());
    let mode = IdentityMode::from_token(Some(token));
    (remote.clone(), FavoriteReconciler::with_store(mode, remote))
}

// =============================================================================
// Remote store
// =============================================================================

#[tokio::test]
async fn test_remote_store_wire_contract() {
    let server = start_server().await;
    let (remote, _) = authenticated_reconciler(&server).await;

    remote.add(&id("h1")).await.unwrap();
    assert_eq!(
        remote.add(&id("h1")).await,
        Err(hymnal_favorites::FavoriteError::AlreadyExists)
    );
    assert_eq!(
        remote.add(&id("ghost")).await,
        Err(hymnal_favorites::FavoriteError::NotFound)
    );

    assert!(remote.is_favorited(&id("h1")).await.unwrap());
    assert!(!remote.is_favorited(&id("h2")).await.unwrap());
    assert_eq!(remote.list().await.unwrap(), vec![id("h1")]);
    assert_eq!(remote.global_count().await.unwrap(), 1);

    let popular = remote.most_popular().await.unwrap().unwrap();
    assert_eq!(popular.hymn_id, id("h1"));
    assert_eq!(popular.count, 1);

    remote.remove(&id("h1")).await.unwrap();
    assert_eq!(
        remote.remove(&id("h1")).await,
        Err(hymnal_favorites::FavoriteError::NotFound)
    );
}

#[tokio::test]
async fn test_public_reads_need_no_session() {
    let server = start_server().await;
    let anonymous = RemoteFavoriteStore::new(&server.base_url, "", TIMEOUT).unwrap();

    assert_eq!(anonymous.global_count().await.unwrap(), 0);
    assert_eq!(anonymous.most_popular().await.unwrap(), None);
    assert_eq!(
        anonymous.list().await,
        Err(hymnal_favorites::FavoriteError::Unauthenticated)
    );
}

// =============================================================================
// Reconciler
// =============================================================================

#[tokio::test]
async fn test_toggle_round_trip() {
    let server = start_server().await;
    let (remote, reconciler) = authenticated_reconciler(&server).await;

    let added = reconciler.toggle_favorite(&id("h2"), false).await.unwrap();
    assert_eq!(added.outcome, ToggleOutcome::Added);
    assert_eq!(added.favorites_count, 1);
    assert_eq!(remote.list().await.unwrap(), vec![id("h2")]);

    let removed = reconciler.toggle_favorite(&id("h2"), true).await.unwrap();
    assert_eq!(removed.outcome, ToggleOutcome::Removed);
    assert_eq!(removed.favorites_count, 0);
    assert!(remote.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_already_stored_remotely() {
    let server = start_server().await;
    let (remote, reconciler) = authenticated_reconciler(&server).await;
    remote.add(&id("h9")).await.unwrap();
    reconciler.set_favorites_count(&id("h9"), 1);

    let result = reconciler.toggle_favorite(&id("h9"), false).await.unwrap();

    assert_eq!(result.outcome, ToggleOutcome::AlreadyFavorited);
    assert!(result.favorited);
    assert_eq!(result.favorites_count, 1);
}

#[tokio::test]
async fn test_rejected_session_rolls_back() {
    let server = start_server().await;
    let remote = Arc::new(RemoteFavoriteStore::new(&server.base_url, "revoked", TIMEOUT).unwrap());
    let reconciler = FavoriteReconciler::with_store(
        IdentityMode::from_token(Some("revoked".into())),
        remote,
    );

    let err = reconciler.toggle_favorite(&id("h1"), false).await.unwrap_err();

    assert_eq!(err, ReconcileError::Unauthenticated);
    assert!(!reconciler.is_favorited(&id("h1")));
    assert_eq!(reconciler.favorites_count(&id("h1")), 0);
}

#[tokio::test]
async fn test_unreachable_server_rolls_back() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = Arc::new(
        RemoteFavoriteStore::new(format!("http://{}", addr), "token", Duration::from_secs(2)).unwrap(),
    );
    let reconciler =
        FavoriteReconciler::with_store(IdentityMode::from_token(Some("token".into())), remote);

    let err = reconciler.toggle_favorite(&id("h1"), false).await.unwrap_err();

    assert!(matches!(err, ReconcileError::RemoteWriteFailed { .. }));
    assert!(reconciler.favorites().is_empty());
}

// =============================================================================
// Presentation & merge
// =============================================================================

#[tokio::test]
async fn test_presenter_resolves_against_service() {
    let server = start_server().await;
    let presenter = FavoritePresenter::new(Arc::new(HymnClient::new(&server.base_url, TIMEOUT).unwrap()));

    let entries = presenter.resolve_all(&[id("h1"), id("gone"), id("h2")]).await;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].title(), "Amazing Grace");
    assert!(entries[1].is_error());
    assert_eq!(entries[1].title(), "Unknown Hymn");
    assert_eq!(entries[2].author(), "Dallan Forgaill");
}

#[tokio::test]
async fn test_merge_on_login() {
    let server = start_server().await;
    let (remote, _) = authenticated_reconciler(&server).await;
    remote.add(&id("h2")).await.unwrap();

    let local = LocalFavoriteStore::new(Arc::new(MemoryStorage::new()));
    local.save(&[id("h1"), id("h2"), id("ghost")]).unwrap();

    let report = merge_local_into_remote(&local, remote.as_ref()).await.unwrap();

    assert_eq!(report.added, vec![id("h1")]);
    assert_eq!(report.already_present, vec![id("h2")]);
    assert_eq!(report.failed.len(), 1);
    // Unknown hymn stays local for a later attempt
    assert_eq!(local.load(), vec![id("ghost")]);
    assert_eq!(remote.list().await.unwrap(), vec![id("h2"), id("h1")]);
}
