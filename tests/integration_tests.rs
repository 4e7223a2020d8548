//! End-to-end tests for the source adapters and the registry, with HTTP
//! traffic served by mockito.

use std::sync::Arc;

use mockito::Matcher;

use iwadi::models::{CitationFormat, DownloadRequest, Paper, PaperBuilder, SearchQuery};
use iwadi::sources::{ArxivSource, IeeeSource, MockSource, Source, SourceRegistry};
use iwadi::ApiError;

fn atom_feed(entries: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>arXiv Query Results</title>
    <id>http://arxiv.org/api/fixture</id>
    <updated>2023-01-16T00:00:00Z</updated>
    {}
</feed>"#,
        entries
    )
}

fn atom_entry(id: &str, title: &str, author: &str, pdf_href: &str) -> String {
    format!(
        r#"<entry>
            <id>http://arxiv.org/abs/{id}v1</id>
            <title>{title}</title>
            <summary>An abstract.</summary>
            <published>2023-01-15T10:00:00Z</published>
            <updated>2023-01-15T10:00:00Z</updated>
            <author><name>{author}</name></author>
            <link rel="alternate" type="text/html" href="http://arxiv.org/abs/{id}v1"/>
            <link rel="related" type="application/pdf" href="{pdf_href}"/>
        </entry>"#
    )
}

fn arxiv_against(server: &mockito::Server) -> ArxivSource {
    ArxivSource::new()
        .expect("client construction")
        .with_base_urls(
            format!("{}/api/query", server.url()),
            format!("{}/pdf", server.url()),
        )
        .with_max_retries(1)
}

fn ieee_against(server: &mockito::Server) -> IeeeSource {
    IeeeSource::new(Some("test-key".into()))
        .expect("key is present")
        .with_base_urls(
            format!("{}/api/v1/search/articles", server.url()),
            format!("{}/stampPDF/getPDF.jsp", server.url()),
        )
}

#[tokio::test]
async fn arxiv_search_parses_feed() {
    let mut server = mockito::Server::new_async().await;
    let body = atom_feed(&atom_entry(
        "2301.12345",
        "Streaming Algorithms Revisited",
        "Ada Lovelace",
        "http://arxiv.org/pdf/2301.12345v1",
    ));
    let mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?search_query=.*".into()))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(body)
        .create_async()
        .await;

    let source = arxiv_against(&server);
    let papers = source
        .search(&SearchQuery::new("streaming algorithms"))
        .await
        .expect("search should succeed");

    mock.assert_async().await;
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].id, "2301.12345");
    assert_eq!(papers[0].title, "Streaming Algorithms Revisited");
    assert_eq!(papers[0].authors, vec!["Ada Lovelace"]);
    assert_eq!(papers[0].source, "arXiv");
}

#[tokio::test]
async fn arxiv_empty_feed_is_retryable_no_results() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?search_query=.*".into()))
        .with_status(200)
        .with_body(atom_feed(""))
        .create_async()
        .await;

    let err = arxiv_against(&server)
        .search(&SearchQuery::new("nonexistent topic"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "arxiv:no_results");
    assert!(err.retryable());
    assert!(matches!(err, ApiError::Response { .. }));
}

#[tokio::test]
async fn arxiv_rate_limit_maps_to_quota() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?.*".into()))
        .with_status(429)
        .create_async()
        .await;

    let err = arxiv_against(&server)
        .search(&SearchQuery::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "arxiv:rate_limited");
    assert!(err.retryable());
    assert_eq!(err.status_code(), Some(429));
    assert!(matches!(err, ApiError::Quota { .. }));
}

#[tokio::test]
async fn arxiv_server_error_is_final_once_budget_is_spent() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?.*".into()))
        .with_status(500)
        .create_async()
        .await;

    let err = arxiv_against(&server)
        .search(&SearchQuery::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "arxiv:http_error");
    assert_eq!(err.status_code(), Some(500));
    assert!(!err.retryable());
}

#[tokio::test]
async fn arxiv_download_writes_pdf_to_disk() {
    let mut server = mockito::Server::new_async().await;
    let pdf_href = format!("{}/pdf/2301.12345", server.url());
    let _metadata_mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?id_list=.*".into()))
        .with_status(200)
        .with_body(atom_feed(&atom_entry(
            "2301.12345",
            "Streaming Algorithms Revisited",
            "Ada Lovelace",
            &pdf_href,
        )))
        .create_async()
        .await;
    let _pdf_mock = server
        .mock("GET", "/pdf/2301.12345")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4 fake content")
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let request = DownloadRequest::new("2301.12345", dir.path());
    let path = arxiv_against(&server)
        .download_paper(&request)
        .await
        .expect("download should succeed");

    assert_eq!(path, dir.path().join("2301.12345.pdf"));
    let contents = std::fs::read(&path).expect("file exists");
    assert_eq!(contents, b"%PDF-1.4 fake content");
}

#[tokio::test]
async fn arxiv_citation_round_trip_mla() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/query\?id_list=.*".into()))
        .with_status(200)
        .with_body(atom_feed(&atom_entry(
            "2301.99999",
            "Analytical Engines",
            "Ada Lovelace",
            "http://arxiv.org/pdf/2301.99999v1",
        )))
        .create_async()
        .await;

    let citation = arxiv_against(&server)
        .get_citation("arxiv:2301.99999v2", CitationFormat::Mla)
        .await
        .expect("citation should resolve");

    assert_eq!(citation.id, "2301.99999");
    assert_eq!(citation.title, "Analytical Engines");
    assert_eq!(citation.citation_format, CitationFormat::Mla);
    assert_eq!(citation.year, Some(2023));
    assert_eq!(
        citation.citation_str,
        "Ada Lovelace. \"Analytical Engines.\" arXiv, 2023, https://arxiv.org/abs/2301.99999."
    );
}

#[tokio::test]
async fn ieee_search_parses_records() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/v1/search/articles\?.*querytext=.*".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "total_records": 2,
                "articles": [
                    {
                        "article_number": "100",
                        "title": "Edge Inference",
                        "publication_year": "2021",
                        "citing_paper_count": 4,
                        "authors": {"authors": [{"full_name": "Grace Hopper"}]}
                    },
                    {
                        "article_number": "200",
                        "title": "Antenna Arrays",
                        "publication_date": "2019-07-01"
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let papers = ieee_against(&server)
        .search(&SearchQuery::new("edge inference"))
        .await
        .expect("search should succeed");

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].id, "100");
    assert_eq!(papers[0].year(), Some(2021));
    assert_eq!(papers[0].citation_count, 4);
    assert_eq!(papers[1].id, "200");
    assert_eq!(papers[1].year(), Some(2019));
}

#[tokio::test]
async fn ieee_zero_records_is_retryable_no_results() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/v1/search/articles\?.*".into()))
        .with_status(200)
        .with_body(r#"{"total_records": 0, "articles": []}"#)
        .create_async()
        .await;

    let err = ieee_against(&server)
        .search(&SearchQuery::new("nothing matches this"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:no_results");
    assert!(err.retryable());
    assert!(matches!(err, ApiError::Response { .. }));
}

#[tokio::test]
async fn ieee_rejected_key_maps_to_auth() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/v1/search/articles\?.*".into()))
        .with_status(401)
        .create_async()
        .await;

    let err = ieee_against(&server)
        .search(&SearchQuery::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:invalid_api_key");
    assert!(!err.retryable());
    assert_eq!(err.status_code(), Some(401));
    assert!(matches!(err, ApiError::Auth { .. }));
}

#[tokio::test]
async fn ieee_server_error_maps_to_service() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Regex(r"^/api/v1/search/articles\?.*".into()))
        .with_status(503)
        .create_async()
        .await;

    let err = ieee_against(&server)
        .search(&SearchQuery::new("anything"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:service_error");
    assert!(err.retryable());
    assert!(matches!(err, ApiError::Service { .. }));
}

#[tokio::test]
async fn ieee_download_unknown_id_reports_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/v1/search/articles\?.*article_number=.*".into()),
        )
        .with_status(200)
        .with_body(r#"{"total_records": 0, "articles": []}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let err = ieee_against(&server)
        .download_paper(&DownloadRequest::new("999999", dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:paper_not_found");
    assert!(!err.retryable());
}

#[tokio::test]
async fn ieee_forbidden_download_maps_to_auth() {
    let mut server = mockito::Server::new_async().await;
    let _metadata_mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/v1/search/articles\?.*article_number=.*".into()),
        )
        .with_status(200)
        .with_body(
            r#"{"articles": [{"article_number": "8967124", "title": "Locked Paper"}]}"#,
        )
        .create_async()
        .await;
    let _pdf_mock = server
        .mock("GET", Matcher::Regex(r"^/stampPDF/getPDF\.jsp\?.*".into()))
        .with_status(403)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let err = ieee_against(&server)
        .download_paper(&DownloadRequest::new("8967124", dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:download_forbidden");
    assert!(!err.retryable());
    assert_eq!(err.status_code(), Some(403));
    assert!(matches!(err, ApiError::Auth { .. }));
}

#[tokio::test]
async fn empty_download_body_is_deleted_and_retryable() {
    let mut server = mockito::Server::new_async().await;
    let _metadata_mock = server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/v1/search/articles\?.*article_number=.*".into()),
        )
        .with_status(200)
        .with_body(
            r#"{"articles": [{"article_number": "8967124", "title": "Hollow Paper"}]}"#,
        )
        .create_async()
        .await;
    let _pdf_mock = server
        .mock("GET", Matcher::Regex(r"^/stampPDF/getPDF\.jsp\?.*".into()))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("")
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let err = ieee_against(&server)
        .download_paper(&DownloadRequest::new("8967124", dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ieee:empty_download");
    assert!(err.retryable());
    assert!(matches!(err, ApiError::Response { .. }));
    // The zero-byte artifact must not survive.
    assert!(!dir.path().join("8967124.pdf").exists());
}

fn sample_paper(id: &str, source: &str) -> Paper {
    PaperBuilder::new(id, format!("Paper {}", id), source)
        .authors(vec!["Test Author".into()])
        .build()
}

#[tokio::test]
async fn registry_fans_out_and_collects_failures() {
    let mut registry = SourceRegistry::new();
    registry.register(Arc::new(MockSource::with_papers(
        "alpha",
        vec![sample_paper("a1", "Alpha"), sample_paper("a2", "Alpha")],
    )));
    registry.register(Arc::new(MockSource::failing(
        "beta",
        ApiError::service("beta", "service_error", "backend down"),
    )));

    let result = registry
        .search(
            &["alpha".into(), "beta".into()],
            &SearchQuery::new("anything"),
        )
        .await
        .expect("one source succeeded");

    assert_eq!(result.papers.len(), 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].source, "beta");
    assert_eq!(result.failures[0].error.code(), "beta:service_error");
}

#[tokio::test]
async fn registry_with_no_hits_anywhere_is_retryable() {
    let mut registry = SourceRegistry::new();
    registry.register(Arc::new(MockSource::with_papers("alpha", Vec::new())));
    registry.register(Arc::new(MockSource::failing(
        "beta",
        ApiError::quota("beta", "rate_limited", "quota exceeded"),
    )));

    let err = registry
        .search(
            &["alpha".into(), "beta".into()],
            &SearchQuery::new("anything"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "registry:no_results");
    assert!(err.retryable());
}
