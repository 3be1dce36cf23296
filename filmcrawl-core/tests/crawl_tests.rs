// Tests for crawl functionality

use filmcrawl_core::crawl::{
    CrawlOptions, CrawlRecordCallback, execute_crawl, extract_url_path, generate_crawl_summary,
};
use filmcrawl_scanner::FilmRecord;
use filmcrawl_scanner::enrich::Endpoints;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("https://ru.wikipedia.org/"), "/");
    assert_eq!(extract_url_path("https://ru.wikipedia.org"), "/");
}

#[test]
fn test_extract_url_path_article() {
    assert_eq!(
        extract_url_path("https://ru.wikipedia.org/wiki/Solaris?oldid=1#plot"),
        "/wiki/Solaris"
    );
}

#[test]
fn test_extract_url_path_invalid_returns_input() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

// ============================================================================
// Summary Tests
// ============================================================================

fn record(title: &str, year: &str) -> FilmRecord {
    FilmRecord {
        title: title.to_string(),
        genre: "драма".to_string(),
        year: year.to_string(),
        source_url: format!("https://example.com/wiki/{}", title),
        ..FilmRecord::default()
    }
}

#[test]
fn test_summary_counts() {
    let records = vec![record("A", "1972"), record("B", "1979"), record("C", "")];
    let summary = generate_crawl_summary(&records);

    assert!(summary.contains("Films extracted: 3"));
    assert!(summary.contains("With genre: 3"));
    assert!(summary.contains("With director: 0"));
    assert!(summary.contains("With year: 2"));
    assert!(summary.contains("1970s: 2"));
    assert!(!summary.contains("IMDb"));
}

#[test]
fn test_summary_decades_sorted() {
    let records = vec![record("A", "2003"), record("B", "1925"), record("C", "1972")];
    let summary = generate_crawl_summary(&records);

    let d1920 = summary.find("1920s").unwrap();
    let d1970 = summary.find("1970s").unwrap();
    let d2000 = summary.find("2000s").unwrap();
    assert!(d1920 < d1970 && d1970 < d2000);
}

#[test]
fn test_summary_enrichment_counts() {
    let mut rated = record("A", "1972");
    rated.linked_entity_id = Some("Q1".to_string());
    rated.external_id = Some("tt1".to_string());
    rated.external_rating = Some("8.0".to_string());

    let mut unrated = record("B", "1979");
    unrated.settle_enrichment();

    let summary = generate_crawl_summary(&[rated, unrated]);
    assert!(summary.contains("With IMDb id: 1"));
    assert!(summary.contains("Rated: 1"));
}

#[test]
fn test_summary_empty() {
    let summary = generate_crawl_summary(&[]);
    assert!(summary.contains("Films extracted: 0"));
    assert!(!summary.contains("By decade"));
}

// ============================================================================
// Crawl Execution Tests
// ============================================================================

fn film_page(title: &str) -> String {
    format!(
        r#"<html><body>
            <h1 id="firstHeading">{}</h1>
            <table class="infobox"><tbody>
                <tr><th>Жанр</th><td><a href="/wiki/Drama">драма</a></td></tr>
                <tr><th>Год</th><td>1972</td></tr>
            </tbody></table>
        </body></html>"#,
        title
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn options(server: &MockServer) -> CrawlOptions {
    CrawlOptions {
        start_url: format!("{}/wiki/Films", server.uri()),
        threads: 2,
        timeout_secs: 5,
        endpoints: Endpoints {
            linked_data_base: format!("{}/wiki", server.uri()),
            rating_base: server.uri(),
        },
        ..CrawlOptions::default()
    }
}

#[tokio::test]
async fn test_execute_crawl_category() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/wiki/Films",
        r#"<html><body><div id="mw-pages"><ul>
            <li><a href="/wiki/Solaris">Солярис</a></li>
            <li><a href="/wiki/Stalker">Сталкер</a></li>
        </ul></div></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&server, "/wiki/Solaris", film_page("Солярис")).await;
    mount_html(&server, "/wiki/Stalker", film_page("Сталкер")).await;

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let record_callback: CrawlRecordCallback = Arc::new(move |record: FilmRecord| {
        seen_clone.lock().unwrap().push(record.title);
    });

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let progress_callback = Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    });

    let records = execute_crawl(options(&server), Some(progress_callback), Some(record_callback))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    let mut titles: Vec<_> = records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Солярис", "Сталкер"]);
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert!(messages.lock().unwrap()[0].contains("Crawling category tree"));
    assert!(records.iter().all(|r| r.linked_entity_id.is_none()));
}

#[tokio::test]
async fn test_execute_crawl_articles_directly() {
    let server = MockServer::start().await;
    mount_html(&server, "/wiki/Solaris", film_page("Солярис")).await;

    let options = CrawlOptions {
        article_urls: vec![format!("{}/wiki/Solaris", server.uri())],
        ..options(&server)
    };

    let records = execute_crawl(options, None, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Солярис");
    assert_eq!(records[0].year, "1972");
}

#[tokio::test]
async fn test_execute_crawl_enriched_without_entity_link() {
    let server = MockServer::start().await;
    mount_html(&server, "/wiki/Solaris", film_page("Солярис")).await;

    let options = CrawlOptions {
        article_urls: vec![format!("{}/wiki/Solaris", server.uri())],
        enrich: true,
        ..options(&server)
    };

    let records = execute_crawl(options, None, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].linked_entity_id.as_deref(), Some(""));
    assert_eq!(records[0].external_id.as_deref(), Some(""));
    assert_eq!(records[0].external_rating.as_deref(), Some(""));
}

#[tokio::test]
async fn test_execute_crawl_invalid_start_url() {
    let options = CrawlOptions {
        start_url: "not a url".to_string(),
        ..CrawlOptions::default()
    };

    let result = execute_crawl(options, None, None).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Crawl failed"));
}
