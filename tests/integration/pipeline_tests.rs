use dataset_mirror::config::{load_config, Config};
use dataset_mirror::crawler::Coordinator;
use dataset_mirror::output::read_datasets;
use dataset_mirror::sync::{digest_bytes, MemoryStore, ObjectStore};
use dataset_mirror::{DatasetOutcome, MirrorError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CAPTURE_DATE: &str = "2024-05-01";

const PARKS_CSV: &str = "id,name\n1,City Park\n2,Washington Park\n";
const PLAYGROUNDS_CSV: &str = "id,park\n10,1\n";
const TREES_JSON: &str = r#"[{"species":"oak"}]"#;

/// Writes a config file pointing at `server` and loads it back
fn write_config(server: &MockServer, dir: &Path, listing_retries: u32) -> Config {
    let config_path = dir.join("mirror.toml");
    let content = format!(
        r#"
[crawler]
seed-url = "{uri}/search"
concurrency = 3
listing-retries = {listing_retries}
detail-retries = 1
file-retries = 1
retry-delay-ms = 0
page-delay-ms = 0

[user-agent]
crawler-name = "TestMirror"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"

[output]
data-dir = "{data}"
datasets-path = "{datasets}"

[store]
endpoint = "https://objects.example.com"
bucket = "archive"
"#,
        uri = server.uri(),
        listing_retries = listing_retries,
        data = dir.join("data").display(),
        datasets = dir.join("tmp").join("datasets.json").display(),
    );
    std::fs::write(&config_path, content).unwrap();
    load_config(&config_path).unwrap()
}

fn listing(targets: &[&str], next: Option<&str>) -> String {
    let results: String = targets
        .iter()
        .map(|t| {
            format!(
                r#"<div class="result"><div class="result-title"><a href="{}">{}</a></div></div>"#,
                t, t
            )
        })
        .collect();
    let pager = next
        .map(|n| {
            format!(
                r#"<div class="pager-container"><div class="pager"><a href="/search">1</a><a href="{}">Next</a></div></div>"#,
                n
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div class="results">{}</div>{}</body></html>"#,
        results, pager
    )
}

fn detail(title: Option<&str>, rows: &[(&str, &str, &str)]) -> String {
    let heading = title
        .map(|t| format!(r#"<h2 class="package-title">{}</h2>"#, t))
        .unwrap_or_default();
    let rows: String = rows
        .iter()
        .map(|(description, format, href)| {
            format!(
                r#"<tr><td>{}</td><td><span class="format">{}</span></td><td><a data-action="Download" href="{}">Download</a></td></tr>"#,
                description, format, href
            )
        })
        .collect();
    format!(
        r#"<html><body>{}<div class="container"><table><tbody>{}</tbody></table></div></body></html>"#,
        heading, rows
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Mounts a two-page listing whose second page links back to the first
async fn mount_portal(server: &MockServer, parks_csv: &str) {
    mount_html(
        server,
        "/search",
        listing(&["/dataset/parks", "/dataset/trees"], Some("/search/page/2")),
    )
    .await;
    mount_html(
        server,
        "/search/page/2",
        listing(&["/dataset/trees", "/dataset/untitled"], Some("/search")),
    )
    .await;

    mount_html(
        server,
        "/dataset/parks",
        detail(
            Some("Parks"),
            &[
                ("Park Boundaries.", "CSV", "/files/parks.csv"),
                ("Playgrounds", "CSV", "/files/playgrounds.csv"),
                ("Shapefile", "SHP", "/files/parks.zip"),
            ],
        ),
    )
    .await;
    mount_html(
        server,
        "/dataset/trees",
        detail(Some("Tree Inventory"), &[("Trees", "JSON", "/files/trees.json")]),
    )
    .await;
    mount_html(
        server,
        "/dataset/untitled",
        detail(None, &[("Orphan", "CSV", "/files/orphan.csv")]),
    )
    .await;

    mount_file(server, "/files/parks.csv", parks_csv).await;
    mount_file(server, "/files/playgrounds.csv", PLAYGROUNDS_CSV).await;
    mount_file(server, "/files/trees.json", TREES_JSON).await;
}

async fn run_once(config: Config, store: &MemoryStore) -> dataset_mirror::RunReport {
    let coordinator = Coordinator::new(config)
        .unwrap()
        .with_capture_date(CAPTURE_DATE);
    coordinator
        .run(Some(store as &dyn ObjectStore))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_pipeline_uploads_every_file() {
    let server = MockServer::start().await;
    mount_portal(&server, PARKS_CSV).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&server, dir.path(), 0);
    let store = MemoryStore::new();

    let report = run_once(config, &store).await;

    // trees is listed on both pages but processed once
    assert_eq!(report.targets.len(), 3);
    assert_eq!(report.tally.count(DatasetOutcome::Success), 3);
    assert_eq!(report.tally.count(DatasetOutcome::NoTitle), 1);
    assert_eq!(report.tally.uploaded(), 3);
    assert_eq!(report.tally.unchanged(), 0);
    assert_eq!(store.put_log().len(), 6);

    let content = store
        .object("Parks/2024-05-01/Park Boundaries.csv")
        .expect("content object");
    assert_eq!(content.body, PARKS_CSV.as_bytes());
    assert_eq!(content.content_type, "text/csv");

    let marker = store
        .object("Parks/Park Boundaries.csv.sha512")
        .expect("hash marker");
    assert_eq!(marker.body, digest_bytes(PARKS_CSV.as_bytes()).into_bytes());

    assert!(store.object("Tree Inventory/2024-05-01/Trees.json").is_some());

    let on_disk = dir.path().join("data").join("Parks").join("Playgrounds.csv");
    assert_eq!(std::fs::read_to_string(on_disk).unwrap(), PLAYGROUNDS_CSV);
}

#[tokio::test]
async fn test_rerun_converges_and_reuploads_only_changes() {
    let server = MockServer::start().await;
    mount_portal(&server, PARKS_CSV).await;

    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();

    run_once(write_config(&server, dir.path(), 0), &store).await;
    store.clear_put_log();

    // Unchanged source: nothing is written
    let report = run_once(write_config(&server, dir.path(), 0), &store).await;
    assert_eq!(report.tally.uploaded(), 0);
    assert_eq!(report.tally.unchanged(), 3);
    assert!(store.put_log().is_empty());

    // One byte differs in one file
    server.reset().await;
    mount_portal(&server, "id,name\n1,City Park\n2,Washington ParK\n").await;

    let report = run_once(write_config(&server, dir.path(), 0), &store).await;
    assert_eq!(report.tally.uploaded(), 1);
    assert_eq!(report.tally.unchanged(), 2);
    assert_eq!(
        store.put_log(),
        vec![
            "Parks/2024-05-01/Park Boundaries.csv".to_string(),
            "Parks/Park Boundaries.csv.sha512".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_crawl_persists_dataset_list_for_replay() {
    let server = MockServer::start().await;
    mount_portal(&server, PARKS_CSV).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&server, dir.path(), 0);
    let datasets_path = dir.path().join("tmp").join("datasets.json");

    let coordinator = Coordinator::new(config).unwrap();
    let targets = coordinator.discover().await.unwrap();

    let persisted = read_datasets(&datasets_path).await.unwrap();
    assert_eq!(persisted, targets);
    assert!(persisted[0].as_str().ends_with("/dataset/parks"));

    // Replaying without a store downloads but skips the sync stage
    let report = coordinator.run_targets(persisted, None).await;
    assert_eq!(report.tally.count(DatasetOutcome::Success), 3);
    assert_eq!(report.downloaded.len(), 3);
    assert!(report.synced.is_empty());
}

#[tokio::test]
async fn test_unreachable_seed_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&server, dir.path(), 2);
    let store = MemoryStore::new();

    let coordinator = Coordinator::new(config).unwrap();
    let result = coordinator.run(Some(&store as &dyn ObjectStore)).await;

    match result {
        Err(MirrorError::Crawl(exhausted)) => assert_eq!(exhausted.attempts, 3),
        other => panic!("expected crawl failure, got {:?}", other.map(|r| r.tally)),
    }
    assert!(store.keys().is_empty());
}
