//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end.

use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use webmirror::config::MirrorConfig;
use webmirror::progress::{ProgressReporter, SilentRenderer};
use webmirror::{mirror, MirrorError, MirrorSummary};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `dir`
fn create_test_config(dir: &TempDir, convert_links: bool) -> MirrorConfig {
    MirrorConfig {
        output_dir: dir.path().join("mirror"),
        convert_links,
        max_depth: 3,
        max_concurrent: 4,
        request_timeout: 10,
        connect_timeout: 5,
        ..MirrorConfig::default()
    }
}

fn silent() -> Arc<ProgressReporter> {
    Arc::new(ProgressReporter::new(Box::new(SilentRenderer)))
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into().into_bytes(), "text/html")
}

/// Mounts a GET mock answering `route` exactly `times` times
async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// Root of the mirrored host inside the output directory
fn host_dir(config: &MirrorConfig, server: &MockServer) -> PathBuf {
    config
        .output_dir
        .join(format!("127.0.0.1:{}", server.address().port()))
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn attr_values(document: &str, selector: &str, attr: &str) -> Vec<String> {
    let document = Html::parse_document(document);
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr).map(str::to_string))
        .collect()
}

async fn run(server: &MockServer, config: MirrorConfig) -> MirrorSummary {
    mirror(&format!("{}/", server.uri()), config, silent())
        .await
        .expect("Mirror should complete")
}

/// Mounts the landing page used by most tests
async fn mount_landing_site(server: &MockServer) {
    let authority = format!("127.0.0.1:{}", server.address().port());

    mount(
        server,
        "/",
        html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="/about">About</a>
            <img src="//{}/logo.png">
            <a href="https://other.org/x">Elsewhere</a>
            </body></html>"#,
            authority
        )),
        1,
    )
    .await;
    mount(
        server,
        "/about",
        html(r#"<html><body><a href="/">Home</a></body></html>"#),
        1,
    )
    .await;
    mount(
        server,
        "/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        1,
    )
    .await;
}

#[tokio::test]
async fn test_mirror_same_origin_site() {
    let server = MockServer::start().await;
    mount_landing_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, false);
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert!(root.join("index.html").is_file());
    assert!(root.join("about").join("index.html").is_file());
    assert_eq!(
        std::fs::read(root.join("logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    assert!(!dir.path().join("mirror").join("other.org").exists());

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.failed, 0);

    let index = read(&root.join("index.html"));
    let links = attr_values(&index, "a", "href");
    assert!(links.contains(&"https://other.org/x".to_string()));
}

#[tokio::test]
async fn test_convert_links_rewrites_to_relative_paths() {
    let server = MockServer::start().await;
    mount_landing_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, true);
    let root = host_dir(&config, &server);

    run(&server, config).await;

    let index = read(&root.join("index.html"));
    let links = attr_values(&index, "a", "href");
    assert_eq!(links, vec!["about/index.html", "https://other.org/x"]);
    assert_eq!(attr_values(&index, "img", "src"), vec!["logo.png"]);

    let about = read(&root.join("about").join("index.html"));
    assert_eq!(attr_values(&about, "a", "href"), vec!["../index.html"]);
}

#[tokio::test]
async fn test_without_conversion_links_become_absolute() {
    let server = MockServer::start().await;
    mount_landing_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, false);
    let root = host_dir(&config, &server);

    run(&server, config).await;

    let index = read(&root.join("index.html"));
    let links = attr_values(&index, "a", "href");
    assert_eq!(
        links,
        vec![format!("{}/about", server.uri()), "https://other.org/x".to_string()]
    );
    assert_eq!(
        attr_values(&index, "img", "src"),
        vec![format!("{}/logo.png", server.uri())]
    );
}

#[tokio::test]
async fn test_each_resource_fetched_once() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r#"<html><body>
            <a href="/about">one</a>
            <a href="/about#team">two</a>
            <a href="/about?ref=nav">three</a>
            <a href="about">four</a>
            </body></html>"#,
        ),
        1,
    )
    .await;
    mount(
        &server,
        "/about",
        html(r#"<html><body><a href="/">Home</a><a href="/about">Self</a></body></html>"#),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let summary = run(&server, create_test_config(&dir, false)).await;

    assert_eq!(summary.fetched, 2);
    // MockServer verifies the expectations on drop
}

#[tokio::test]
async fn test_max_depth_bounds_the_crawl() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/one">1</a>"#), 1).await;
    mount(&server, "/one", html(r#"<a href="/two">2</a>"#), 1).await;
    mount(&server, "/two", html(r#"<a href="/three">3</a>"#), 0).await;

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig {
        max_depth: 1,
        ..create_test_config(&dir, false)
    };
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert_eq!(summary.fetched, 2);
    assert!(root.join("one").join("index.html").is_file());
    assert!(!root.join("two").exists());
}

#[tokio::test]
async fn test_rejected_resources_fetched_but_not_saved() {
    let server = MockServer::start().await;
    mount_landing_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig {
        reject: vec!["png".to_string()],
        ..create_test_config(&dir, false)
    };
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert!(!root.join("logo.png").exists());
    assert!(root.join("index.html").is_file());
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.saved, 2);
    assert_eq!(summary.not_saved, 1);
}

#[tokio::test]
async fn test_rejected_page_still_followed() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/list.php">list</a>"#), 1).await;
    mount(&server, "/list.php", html(r#"<a href="/item.html">item</a>"#), 1).await;
    mount(&server, "/item.html", html("<p>item</p>"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig {
        reject: vec!["list.php".to_string()],
        ..create_test_config(&dir, false)
    };
    let root = host_dir(&config, &server);

    run(&server, config).await;

    assert!(!root.join("list.php").exists());
    assert!(root.join("item.html").is_file());
}

#[tokio::test]
async fn test_excluded_and_script_paths_never_fetched() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r#"<html><head><script src="/js/app.js"></script></head><body>
            <a href="/private/secret.html">secret</a>
            <a href="/public.html">public</a>
            </body></html>"#,
        ),
        1,
    )
    .await;
    mount(&server, "/js/app.js", ResponseTemplate::new(200), 0).await;
    mount(&server, "/private/secret.html", html("secret"), 0).await;
    mount(&server, "/public.html", html("public"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig {
        exclude: vec!["/private".to_string()],
        ..create_test_config(&dir, false)
    };
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.skipped, 2);
    assert!(root.join("public.html").is_file());
    assert!(!root.join("private").exists());
    assert!(!root.join("js").exists());
}

#[tokio::test]
async fn test_failed_resource_does_not_stop_the_run() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<a href="/missing.html">gone</a><a href="/present.html">here</a>"#),
        1,
    )
    .await;
    mount(&server, "/missing.html", ResponseTemplate::new(404), 1).await;
    mount(&server, "/present.html", html("here"), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, false);
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.saved, 2);
    assert!(!root.join("missing.html").exists());
    assert!(root.join("present.html").is_file());
}

#[tokio::test]
async fn test_stylesheet_urls_followed_and_rewritten() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<html><head><link rel="stylesheet" href="/css/site.css"></head></html>"#),
        1,
    )
    .await;
    mount(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_raw(
            "body { background: url('/img/bg.png'); }".as_bytes().to_vec(),
            "text/css",
        ),
        1,
    )
    .await;
    mount(
        &server,
        "/img/bg.png",
        ResponseTemplate::new(200).set_body_raw(vec![1, 2, 3], "image/png"),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, true);
    let root = host_dir(&config, &server);

    run(&server, config).await;

    let css = read(&root.join("css").join("site.css"));
    assert_eq!(css, "body { background: url('../img/bg.png'); }");
    assert!(root.join("img").join("bg.png").is_file());

    let index = read(&root.join("index.html"));
    assert_eq!(attr_values(&index, "link", "href"), vec!["css/site.css"]);
}

#[tokio::test]
async fn test_stylesheet_kept_verbatim_without_conversion() {
    let server = MockServer::start().await;
    let stylesheet = "body { background: url(\"/img/bg.png\"); }";

    mount(
        &server,
        "/",
        html(r#"<link rel="stylesheet" href="/css/site.css">"#),
        1,
    )
    .await;
    mount(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_raw(stylesheet.as_bytes().to_vec(), "text/css"),
        1,
    )
    .await;
    mount(
        &server,
        "/img/bg.png",
        ResponseTemplate::new(200).set_body_raw(vec![1, 2, 3], "image/png"),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, false);
    let root = host_dir(&config, &server);

    run(&server, config).await;

    assert_eq!(read(&root.join("css").join("site.css")), stylesheet);
    assert!(root.join("img").join("bg.png").is_file());
}

#[tokio::test]
async fn test_unrewritable_payload_saved_raw() {
    let server = MockServer::start().await;
    let garbage = vec![0xff, 0xfe, b'u'];

    mount(
        &server,
        "/",
        html(r#"<link rel="stylesheet" href="/s.css">"#),
        1,
    )
    .await;
    mount(
        &server,
        "/s.css",
        ResponseTemplate::new(200).set_body_raw(garbage.clone(), "text/css"),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, true);
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert_eq!(summary.saved, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(std::fs::read(root.join("s.css")).unwrap(), garbage);
}

/// Lists every file under `root` with its contents, sorted by path
fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let contents = std::fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), contents));
            }
        }
    }
    files.sort();
    files
}

#[tokio::test]
async fn test_repeated_mirror_produces_identical_tree() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(
            r#"<html><head><link rel="stylesheet" href="/css/site.css"></head><body>
            <a href="/about">About</a><a href="/users/42">User</a>
            </body></html>"#,
        ),
        2,
    )
    .await;
    mount(&server, "/about", html(r#"<a href="/">Home</a>"#), 2).await;
    mount(&server, "/users/42", html(r#"<a href="/about">About</a>"#), 2).await;
    mount(
        &server,
        "/css/site.css",
        ResponseTemplate::new(200)
            .set_body_raw("h1 { background: url(/img/h.png); }".as_bytes().to_vec(), "text/css"),
        2,
    )
    .await;
    mount(
        &server,
        "/img/h.png",
        ResponseTemplate::new(200).set_body_raw(vec![7, 7, 7], "image/png"),
        2,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, true);
    let out = config.output_dir.clone();

    run(&server, config.clone()).await;
    let first = snapshot(&out);
    run(&server, config).await;
    let second = snapshot(&out);

    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rate_limited_mirror_completes() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(format!("<p>{}</p>", "x".repeat(1000))),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = MirrorConfig {
        rate_limit: "100k".parse().ok(),
        ..create_test_config(&dir, false)
    };
    let root = host_dir(&config, &server);

    let summary = run(&server, config).await;

    assert_eq!(summary.saved, 1);
    assert!(read(&root.join("index.html")).contains(&"x".repeat(1000)));
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = mirror("not a url", create_test_config(&dir, false), silent()).await;
    assert!(matches!(result, Err(MirrorError::InvalidSeed(_))));
}

#[tokio::test]
async fn test_unwritable_output_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let config = MirrorConfig {
        output_dir: blocker,
        ..create_test_config(&dir, false)
    };
    let result = mirror("http://127.0.0.1:9/", config, silent()).await;
    assert!(matches!(result, Err(MirrorError::OutputDir { .. })));
}
