//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the catalog site and a temporary
//! SQLite database to test crawl sessions end-to-end.

use ad_harvest::config::{
    CatalogConfig, Config, CrawlerConfig, DatabaseConfig, LoggingConfig, TimeoutConfig,
};
use ad_harvest::crawler::{
    CrawlController, DefaultSessionFactory, DuplicateStore, Supervisor, Transition,
};
use ad_harvest::render::{build_http_client, HttpRenderer, RenderError};
use ad_harvest::storage::{AdStore, SqliteStorage};
use ad_harvest::{AdDetails, AdId, AdRecord, CustomsCleared, HarvestError};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock catalog
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            listing_path: "/cars/".to_string(),
            start_page: 2,
            user_agent: Some("AdHarvestTest/1.0".to_string()),
        },
        timeouts: TimeoutConfig {
            page_load: 5_000,
            navigation: 5_000,
            retry_sleep: 0,
            max_attempts: 2,
            retry_detail_pages: true,
        },
        crawler: CrawlerConfig {
            sleep_interval: 3600,
            restart_delay: 0,
            batch_size: 20,
            min_fetch_delay: 0,
            max_fetch_delay: 0,
        },
        database: DatabaseConfig {
            path: db_path.to_string_lossy().to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            info_file: None,
            error_file: None,
        },
        alerting: None,
    }
}

fn listing_html(ids: &[u32]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="a-card"><h5 class="a-card__title"><a href="/a/show/{}">Car {}</a></h5></div>"#,
                id, id
            )
        })
        .collect();
    format!("<html><body><div class=\"a-list\">{}</div></body></html>", cards)
}

fn detail_html(title: &str, city: &str) -> String {
    format!(
        r#"<html><body>
          <h1 class="offer__title">{}</h1>
          <div class="offer__price">9&nbsp;800&nbsp;000 ₸</div>
          <dl><dt class="value-title" title="Город">Город</dt><dd class="value">{}</dd></dl>
          <dl><dt class="value-title" title="Растаможен в Казахстане">Растаможен</dt><dd class="value">Нет</dd></dl>
        </body></html>"#,
        title, city
    )
}

async fn mount_listing(server: &MockServer, page: u32, ids: &[u32], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/cars/"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(ids)))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: u32, title: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/a/show/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(title, "Алматы")))
        .expect(expected)
        .mount(server)
        .await;
}

fn controller(
    config: &Config,
    storage: SqliteStorage,
    known: DuplicateStore,
) -> CrawlController<HttpRenderer, SqliteStorage> {
    let client = build_http_client(config.catalog.user_agent.as_deref()).unwrap();
    CrawlController::new(
        config,
        HttpRenderer::new(client),
        storage,
        known,
        CancellationToken::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_crawl_walks_until_caught_up() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_listing(&mock_server, 2, &[101, 102], 1).await;
    mount_listing(&mock_server, 3, &[102, 101], 1).await;
    mount_detail(&mock_server, 101, "Toyota Camry", 1).await;
    mount_detail(&mock_server, 102, "Hyundai Tucson", 1).await;

    let storage = SqliteStorage::new(&db_path).unwrap();
    let known = DuplicateStore::seed(&storage).unwrap();
    let mut ctl = controller(&config, storage, known);

    let first = ctl.run_page().await.unwrap();
    assert_eq!(first.fetched, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(
        ctl.advance_or_reset(&first),
        Transition::Advance { next_page: 3 }
    );

    let second = ctl.run_page().await.unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.known, 2);
    assert_eq!(
        ctl.advance_or_reset(&second),
        Transition::Reset {
            sleep: Duration::from_secs(3600)
        }
    );
    assert_eq!(ctl.current_page(), 2);
    drop(ctl);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_ads().unwrap(), 2);

    let ad = storage.get_ad(&AdId::new("101")).unwrap().unwrap();
    assert_eq!(ad.url, format!("{}/a/show/101", mock_server.uri()));
    assert_eq!(ad.details.title, "Toyota Camry");
    assert_eq!(ad.details.price, "9800000");
    assert_eq!(ad.details.city, "Алматы");
    assert_eq!(ad.details.customs_cleared, CustomsCleared::No);
}

#[tokio::test]
async fn test_previously_stored_ads_are_not_refetched() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let stored: Vec<AdRecord> = ["7", "8"]
        .iter()
        .map(|id| AdRecord {
            id: AdId::new(*id),
            url: format!("{}/a/show/{}", mock_server.uri(), id),
            details: AdDetails::default(),
            ingested_at: Utc::now(),
        })
        .collect();
    storage.insert_ads(&stored).unwrap();

    mount_listing(&mock_server, 2, &[7, 8], 1).await;
    mount_detail(&mock_server, 7, "Never fetched", 0).await;
    mount_detail(&mock_server, 8, "Never fetched", 0).await;

    let known = DuplicateStore::seed(&storage).unwrap();
    assert_eq!(known.len(), 2);
    let mut ctl = controller(&config, storage, known);

    let report = ctl.run_page().await.unwrap();
    assert!(report.caught_up());
    assert!(matches!(
        ctl.advance_or_reset(&report),
        Transition::Reset { .. }
    ));
    assert_eq!(ctl.store().count_ads().unwrap(), 2);
}

#[tokio::test]
async fn test_listing_failure_is_retried_then_fatal() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    Mock::given(method("GET"))
        .and(path("/cars/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let storage = SqliteStorage::new(&db_path).unwrap();
    let mut ctl = controller(&config, storage, DuplicateStore::new());

    let err = ctl.run_page().await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::PageLoadExhausted { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn test_listing_served_without_cards_is_not_caught_up() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    Mock::given(method("GET"))
        .and(path("/cars/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Access denied</p></body></html>"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let storage = SqliteStorage::new(&db_path).unwrap();
    let mut ctl = controller(&config, storage, DuplicateStore::new());

    let err = ctl.run_page().await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::PageLoadExhausted {
            attempts: 2,
            source: RenderError::MarkupMissing { .. },
            ..
        }
    ));
    assert_eq!(ctl.current_page(), 2);
}

#[tokio::test]
async fn test_supervisor_runs_session_until_shutdown() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data").join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_listing(&mock_server, 2, &[1, 2, 3], 1).await;
    mount_listing(&mock_server, 3, &[3], 1).await;
    mount_detail(&mock_server, 1, "Kia Rio", 1).await;
    mount_detail(&mock_server, 2, "Kia K5", 1).await;
    mount_detail(&mock_server, 3, "Kia Sportage", 1).await;

    let shutdown = CancellationToken::new();
    let supervisor = Supervisor::new(config, DefaultSessionFactory, shutdown.clone());

    // Stop once the crawl has reached the caught-up page and gone to sleep
    let server = &mock_server;
    let watcher = async {
        for _ in 0..500 {
            let reached_page_3 = server
                .received_requests()
                .await
                .unwrap_or_default()
                .iter()
                .any(|r| r.url.query() == Some("page=3"));
            if reached_page_3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        shutdown.cancel();
    };

    let (report, ()) = tokio::join!(supervisor.run(), watcher);

    assert_eq!(report.sessions, 1);
    assert_eq!(report.failures, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_ads().unwrap(), 3);
    assert!(storage.latest_ingested_at().unwrap().is_some());
}

#[tokio::test]
async fn test_supervisor_restarts_failed_sessions() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("ads.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let shutdown = CancellationToken::new();
    let supervisor = Supervisor::new(config, DefaultSessionFactory, shutdown.clone());

    // Two attempts per session, so four requests mean two failed sessions
    let server = &mock_server;
    let watcher = async {
        for _ in 0..500 {
            let seen = server.received_requests().await.unwrap_or_default().len();
            if seen >= 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        shutdown.cancel();
    };

    let (report, ()) = tokio::join!(supervisor.run(), watcher);

    assert!(report.failures >= 2);
    assert!(report.sessions >= report.failures);
}
