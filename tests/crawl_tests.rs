//! Integration tests for the crawler
//!
//! The traversal tests drive the orchestrator through a scripted in-memory
//! page session over a fixture site with a fully enumerable link graph
//! (a binary tree of index pages). The download tests use wiremock and a
//! temp directory for the full naming-and-fetch cycle.

use async_trait::async_trait;
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wisp_crawler::browser::PageSession;
use wisp_crawler::config::{build_config, Config, RawConfig};
use wisp_crawler::crawler::{crawl, LinkSet, Orchestrator};
use wisp_crawler::download::download_all;
use wisp_crawler::SessionError;

const FIXTURE_ROOT: &str = "http://fixture.test/";

/// A page session backed by a static link graph. Optionally fails the
/// next `transient_failures` fetches with a disconnect error.
struct ScriptedSession {
    graph: HashMap<String, Vec<String>>,
    transient_failures: u32,
    fetch_calls: u32,
    reconnect_calls: u32,
}

impl ScriptedSession {
    fn new(graph: HashMap<String, Vec<String>>) -> Self {
        Self {
            graph,
            transient_failures: 0,
            fetch_calls: 0,
            reconnect_calls: 0,
        }
    }

    fn failing(graph: HashMap<String, Vec<String>>, transient_failures: u32) -> Self {
        Self {
            transient_failures,
            ..Self::new(graph)
        }
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn fetch_links(&mut self, url: &str) -> Result<Vec<String>, SessionError> {
        self.fetch_calls += 1;
        if self.transient_failures > 0 {
            self.transient_failures -= 1;
            return Err(SessionError::Disconnected("scripted loss".into()));
        }
        Ok(self.graph.get(url).cloned().unwrap_or_default())
    }

    async fn reconnect(&mut self) -> Result<(), SessionError> {
        self.reconnect_calls += 1;
        Ok(())
    }
}

/// Builds a binary tree of index pages: the root links to /1/index.html
/// and /2/index.html, each of which links to two children, down to
/// `levels` levels below the root.
fn fixture_graph(levels: u32) -> HashMap<String, Vec<String>> {
    fn page_url(path: &[u32]) -> String {
        if path.is_empty() {
            FIXTURE_ROOT.to_string()
        } else {
            let segments: Vec<String> = path.iter().map(u32::to_string).collect();
            format!("{}{}/index.html", FIXTURE_ROOT, segments.join("/"))
        }
    }

    fn fill(graph: &mut HashMap<String, Vec<String>>, path: &mut Vec<u32>, remaining: u32) {
        let children: Vec<String> = if remaining == 0 {
            Vec::new()
        } else {
            (1..=2)
                .map(|i| {
                    path.push(i);
                    let url = page_url(path);
                    path.pop();
                    url
                })
                .collect()
        };
        graph.insert(page_url(path), children.clone());
        if remaining > 0 {
            for i in 1..=2 {
                path.push(i);
                fill(graph, path, remaining - 1);
                path.pop();
            }
        }
    }

    let mut graph = HashMap::new();
    fill(&mut graph, &mut Vec::new(), levels);
    graph
}

/// Every URL of the fixture tree down to `levels` levels below the root.
fn fixture_urls(levels: u32) -> Vec<String> {
    let mut urls = vec![FIXTURE_ROOT.to_string()];
    let mut frontier = vec![String::new()];
    for _ in 0..levels {
        let mut next = Vec::new();
        for prefix in &frontier {
            for i in 1..=2 {
                let path = if prefix.is_empty() {
                    i.to_string()
                } else {
                    format!("{}/{}", prefix, i)
                };
                urls.push(format!("{}{}/index.html", FIXTURE_ROOT, path));
                next.push(path);
            }
        }
        frontier = next;
    }
    urls.sort();
    urls
}

fn config_with(adjust: impl FnOnce(&mut RawConfig)) -> Config {
    let mut raw = RawConfig {
        url: Some(FIXTURE_ROOT.to_string()),
        ..RawConfig::default()
    };
    adjust(&mut raw);
    build_config(raw).expect("test configuration is valid")
}

async fn crawl_fixture(config: &Config, session: ScriptedSession) -> (Vec<String>, ScriptedSession) {
    let (links, session) = crawl(config, session).await;
    (links.into_sorted_vec(), session)
}

#[tokio::test]
async fn test_depth_0_returns_seed_and_direct_links() {
    let config = config_with(|raw| raw.depth = 0);
    let (links, _) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(4))).await;
    assert_eq!(links, fixture_urls(1));
}

#[tokio::test]
async fn test_depth_grows_result_monotonically() {
    for depth in 1..=3u32 {
        let config = config_with(|raw| raw.depth = depth);
        let (links, _) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(4))).await;
        assert_eq!(links, fixture_urls(depth + 1), "depth {}", depth);
    }
}

#[tokio::test]
async fn test_no_duplicate_expansion_on_shared_links() {
    // Both children link back to the root; the visited tracker must keep
    // the traversal from looping.
    let mut graph = HashMap::new();
    graph.insert(
        FIXTURE_ROOT.to_string(),
        vec![
            format!("{}a/index.html", FIXTURE_ROOT),
            format!("{}b/index.html", FIXTURE_ROOT),
        ],
    );
    graph.insert(
        format!("{}a/index.html", FIXTURE_ROOT),
        vec![FIXTURE_ROOT.to_string()],
    );
    graph.insert(
        format!("{}b/index.html", FIXTURE_ROOT),
        vec![FIXTURE_ROOT.to_string()],
    );

    let config = config_with(|raw| raw.depth = 10);
    let (links, session) = crawl_fixture(&config, ScriptedSession::new(graph)).await;
    assert_eq!(
        links,
        vec![
            FIXTURE_ROOT.to_string(),
            format!("{}a/index.html", FIXTURE_ROOT),
            format!("{}b/index.html", FIXTURE_ROOT),
        ],
    );
    // Root once, a and b once each; the cycles back to the root are pruned.
    assert_eq!(session.fetch_calls, 3);
}

#[tokio::test]
async fn test_collect_exclude_removes_followed_url() {
    let config = config_with(|raw| {
        raw.depth = 3;
        raw.exclude = "/1/index\\.html$".to_string();
    });
    let (links, _) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(4))).await;

    // The excluded page is gone from the result...
    assert!(!links.contains(&format!("{}1/index.html", FIXTURE_ROOT)));
    // ...but it was still followed: its children are present.
    assert!(links.contains(&format!("{}1/2/index.html", FIXTURE_ROOT)));
}

#[tokio::test]
async fn test_follow_exclude_keeps_url_but_not_children() {
    let config = config_with(|raw| {
        raw.depth = 3;
        raw.follow_exclude = "^http://fixture\\.test/1/index\\.html$".to_string();
    });
    let (links, _) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(4))).await;

    // The link itself is collected...
    assert!(links.contains(&format!("{}1/index.html", FIXTURE_ROOT)));
    // ...but nothing below it was expanded.
    assert!(!links.contains(&format!("{}1/1/index.html", FIXTURE_ROOT)));
    assert!(!links.contains(&format!("{}1/2/index.html", FIXTURE_ROOT)));
    // The sibling branch is unaffected.
    assert!(links.contains(&format!("{}2/1/index.html", FIXTURE_ROOT)));
}

#[tokio::test]
async fn test_follow_include_limits_expansion() {
    let config = config_with(|raw| {
        raw.depth = 3;
        // Only the /2/ branch may be followed.
        raw.follow_include = "^http://fixture\\.test/2/".to_string();
    });
    let (links, _) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(4))).await;

    assert!(links.contains(&format!("{}1/index.html", FIXTURE_ROOT)));
    assert!(!links.contains(&format!("{}1/1/index.html", FIXTURE_ROOT)));
    assert!(links.contains(&format!("{}2/2/2/index.html", FIXTURE_ROOT)));
}

#[tokio::test]
async fn test_transient_failures_within_budget_recover() {
    let config = config_with(|raw| {
        raw.depth = 0;
        raw.reconnect_attempts = 5;
    });
    let session = ScriptedSession::failing(fixture_graph(1), 3);

    let mut orchestrator = Orchestrator::new(&config, session);
    let mut results = LinkSet::new();
    orchestrator.crawl_seed(FIXTURE_ROOT, &mut results).await;

    assert_eq!(orchestrator.reconnects_used(), 3);
    let session = orchestrator.into_session();
    assert_eq!(session.reconnect_calls, 3);
    // 3 failed attempts + 1 success
    assert_eq!(session.fetch_calls, 4);
    assert_eq!(results.into_sorted_vec(), fixture_urls(1));
}

#[tokio::test]
async fn test_exhausted_reconnect_budget_degrades_to_zero_links() {
    let config = config_with(|raw| {
        raw.depth = 0;
        raw.reconnect_attempts = 2;
    });
    let session = ScriptedSession::failing(fixture_graph(1), 10);

    let mut orchestrator = Orchestrator::new(&config, session);
    let mut results = LinkSet::new();
    orchestrator.crawl_seed(FIXTURE_ROOT, &mut results).await;

    let session = orchestrator.into_session();
    assert_eq!(session.reconnect_calls, 2);
    assert_eq!(session.fetch_calls, 3);
    // The crawl survives; only the seed itself remains.
    assert_eq!(results.into_sorted_vec(), vec![FIXTURE_ROOT.to_string()]);
}

#[tokio::test]
async fn test_multiple_seeds_share_tracker_and_results() {
    let config = config_with(|raw| {
        raw.url = Some(format!("{}[1,2]/index.html", FIXTURE_ROOT));
        raw.depth = 1;
    });
    assert_eq!(config.seeds.len(), 2);

    let (links, session) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(3))).await;

    // Both subtrees are present down to one hop below each seed.
    assert!(links.contains(&format!("{}1/2/index.html", FIXTURE_ROOT)));
    assert!(links.contains(&format!("{}2/1/index.html", FIXTURE_ROOT)));
    // Seeds at depth 0 and their four children expanded at depth 1.
    assert_eq!(session.fetch_calls, 6);
}

#[tokio::test]
async fn test_download_mode_stops_expansion_one_level_early() {
    let config = config_with(|raw| {
        raw.depth = 1;
        raw.download = true;
    });
    let (links, session) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(3))).await;

    // Only the seed was expanded; the level-1 pages are collected but not
    // themselves loaded.
    assert_eq!(links, fixture_urls(1));
    assert_eq!(session.fetch_calls, 1);
}

#[tokio::test]
async fn test_download_mode_depth_0_collects_only_the_seed() {
    let config = config_with(|raw| {
        raw.depth = 0;
        raw.download = true;
    });
    let (links, session) = crawl_fixture(&config, ScriptedSession::new(fixture_graph(3))).await;

    assert_eq!(links, vec![FIXTURE_ROOT.to_string()]);
    assert_eq!(session.fetch_calls, 0);
}

#[tokio::test]
async fn test_download_to_resolved_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_with(|raw| {
        raw.url = Some(format!("{}/files/data.bin", server.uri()));
        raw.download = true;
        raw.naming_capture = r"^http://.*/files/(?P<name>[\w.]+)$".to_string();
        raw.naming_pattern = format!("{}/<name>", dir.path().display());
    });

    let links = vec![format!("{}/files/data.bin", server.uri())];
    let downloaded = download_all(&config, &links).await.unwrap();

    assert_eq!(downloaded, 1);
    let written = std::fs::read(dir.path().join("data.bin")).unwrap();
    assert_eq!(written, b"payload");
}

#[tokio::test]
async fn test_naming_mismatch_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(|raw| {
        raw.download = true;
        raw.naming_capture = r"^http://.*/files/(?P<name>[\w.]+)$".to_string();
        raw.naming_pattern = format!("{}/<name>", dir.path().display());
    });

    // No URL matches the capture; nothing is written, nothing fails.
    let links = vec!["http://fixture.test/other/path".to_string()];
    let downloaded = download_all(&config, &links).await.unwrap();

    assert_eq!(downloaded, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_skip_existing_leaves_file_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("data.bin"), b"stale").unwrap();

    let config = config_with(|raw| {
        raw.url = Some(format!("{}/files/data.bin", server.uri()));
        raw.download = true;
        raw.skip_existing = true;
        raw.naming_capture = r"^http://.*/files/(?P<name>[\w.]+)$".to_string();
        raw.naming_pattern = format!("{}/<name>", dir.path().display());
    });

    let links = vec![format!("{}/files/data.bin", server.uri())];
    let downloaded = download_all(&config, &links).await.unwrap();

    assert_eq!(downloaded, 0);
    let content = std::fs::read(dir.path().join("data.bin")).unwrap();
    assert_eq!(content, b"stale");
}

#[tokio::test]
async fn test_failed_download_does_not_abort_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/ok.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/gone.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_with(|raw| {
        raw.url = Some(format!("{}/files/ok.bin", server.uri()));
        raw.download = true;
        raw.naming_capture = r"^http://.*/files/(?P<name>[\w.]+)$".to_string();
        raw.naming_pattern = format!("{}/<name>", dir.path().display());
    });

    let links = vec![
        format!("{}/files/gone.bin", server.uri()),
        format!("{}/files/ok.bin", server.uri()),
    ];
    let downloaded = download_all(&config, &links).await.unwrap();

    assert_eq!(downloaded, 1);
    assert!(dir.path().join("ok.bin").exists());
    assert!(!dir.path().join("gone.bin").exists());
}
