//! Library API integration tests against a mock extraction service
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use readably_core::*;
use rstest::rstest;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)).unwrap()
}

fn client_for(server: &MockServer) -> ReadabilityClient {
    ReadabilityClient::builder(TOKEN)
        .endpoint(format!("{}/api/content/v1/parser", server.uri()))
        .timeout(5)
        .build()
        .unwrap()
}

fn json_response(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, "application/json")
}

#[tokio::test]
async fn test_extract_decodes_every_field() {
    let server = MockServer::start().await;
    let page = "https://www.example-news.com/2013/05/14/long-read";

    Mock::given(method("GET"))
        .and(path("/api/content/v1/parser"))
        .and(query_param("url", page))
        .and(query_param("token", TOKEN))
        .respond_with(json_response(200, fixture("multipage.json")))
        .expect(1)
        .mount(&server)
        .await;

    let article = client_for(&server).extract(page).await.unwrap();
    let expected: serde_json::Value = serde_json::from_str(&fixture("multipage.json")).unwrap();

    assert_eq!(article.domain, expected["domain"]);
    assert_eq!(article.author.as_deref(), expected["author"].as_str());
    assert_eq!(article.url.as_str(), expected["url"]);
    assert_eq!(article.short_url.as_str(), expected["short_url"]);
    assert_eq!(article.title, expected["title"]);
    assert_eq!(article.content, expected["content"]);
    assert_eq!(u64::from(article.total_pages), expected["total_pages"].as_u64().unwrap());
    assert_eq!(article.word_count, expected["word_count"].as_u64().unwrap());
    assert_eq!(
        article.date_published.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()).as_deref(),
        expected["date_published"].as_str()
    );
}

#[tokio::test]
async fn test_pagination_fields_are_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("multipage.json")))
        .mount(&server)
        .await;

    let article = client_for(&server).extract("https://www.example-news.com/long-read").await.unwrap();

    assert_eq!(article.total_pages, 3);
    assert_eq!(article.rendered_pages, 1);
    assert_eq!(article.next_page_id.as_deref(), Some("abc123"));
    assert!(article.has_more_pages());
}

#[tokio::test]
async fn test_absent_author_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("no_author.json")))
        .mount(&server)
        .await;

    let article = client_for(&server).extract("https://blog.example.org/posts/hello").await.unwrap();

    assert_eq!(article.author, None);
    assert_eq!(article.date_published, None);
    assert!(article.is_complete());
}

#[rstest]
#[case(500)]
#[case(502)]
#[case(503)]
#[case(599)]
#[tokio::test]
async fn test_server_errors_are_transient(#[case] status: u16) {
    let server = MockServer::start().await;
    // A decodable body proves the client never tries to decode a 5xx.
    Mock::given(method("GET"))
        .respond_with(json_response(status, fixture("no_author.json")))
        .mount(&server)
        .await;

    let err = client_for(&server).extract("https://example.com/a").await.unwrap_err();

    assert!(matches!(err, ReadabilityError::Transient { status: s, .. } if s == status));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_gateway_timeout_is_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(504).set_body_string("upstream timed out"))
        .mount(&server)
        .await;

    let err = client_for(&server).extract("https://slow.example.com/page").await.unwrap_err();

    match err {
        ReadabilityError::Timeout { url } => assert_eq!(url, "https://slow.example.com/page"),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[rstest]
#[case(400)]
#[case(401)]
#[case(403)]
#[case(404)]
#[case(201)]
#[case(409)]
#[tokio::test]
async fn test_other_statuses_are_http_errors(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"error":true,"messages":"nope"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server).extract("https://example.com/a").await.unwrap_err();

    match err {
        ReadabilityError::Http { status: s, body, url } => {
            assert_eq!(s, status);
            assert_eq!(url, "https://example.com/a");
            assert!(body.contains("nope"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, r#"{"domain": "example.com", "title": "#.to_string()))
        .mount(&server)
        .await;

    let err = client_for(&server).extract("https://example.com/broken").await.unwrap_err();

    match err {
        ReadabilityError::Decode { url, message } => {
            assert_eq!(url, "https://example.com/broken");
            assert!(!message.is_empty());
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, r#"{"hello": "world"}"#.to_string()))
        .mount(&server)
        .await;

    let err = client_for(&server).extract("https://example.com/a").await.unwrap_err();
    assert!(matches!(err, ReadabilityError::Decode { .. }));
}

#[tokio::test]
async fn test_extract_with_content_posts_content() {
    let server = MockServer::start().await;
    let page = "https://blog.example.org/posts/hello";
    let html = "<html><body><p>Hello there, world & friends.</p></body></html>";

    Mock::given(method("POST"))
        .and(path("/api/content/v1/parser"))
        .and(query_param("url", page))
        .and(query_param("token", TOKEN))
        .respond_with(json_response(200, fixture("no_author.json")))
        .expect(1)
        .mount(&server)
        .await;

    let article = client_for(&server).extract_with_content(page, html).await.unwrap();
    assert_eq!(article.title, "Hello, World");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert_eq!(content_type, "application/x-www-form-urlencoded");

    let form: Vec<(String, String)> = url::form_urlencoded::parse(&requests[0].body).into_owned().collect();
    assert_eq!(form, vec![("content".to_string(), html.to_string())]);
}

#[tokio::test]
async fn test_extract_with_empty_content_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("no_author.json")))
        .expect(1)
        .mount(&server)
        .await;

    let article = client_for(&server).extract_with_content("https://blog.example.org/posts/hello", "").await.unwrap();
    assert_eq!(article.domain, "blog.example.org");
}

#[tokio::test]
async fn test_extract_with_content_classifies_like_extract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let err = client_for(&server).extract_with_content("https://example.com/a", "<p>x</p>").await.unwrap_err();
    assert!(matches!(err, ReadabilityError::Timeout { .. }));
}

#[tokio::test]
async fn test_empty_page_url_is_rejected_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("no_author.json")))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).extract("").await.unwrap_err();
    assert!(matches!(err, ReadabilityError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let client = ReadabilityClient::builder(TOKEN).endpoint("http://127.0.0.1:1/parser").timeout(2).build().unwrap();

    let err = client.extract("https://example.com/a").await.unwrap_err();

    assert!(matches!(err, ReadabilityError::Transport { ref url, .. } if url == "https://example.com/a"));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_transport_error_never_shows_token() {
    let secret = "SECRET-TOKEN-xyz";
    let client = ReadabilityClient::builder(secret).endpoint("http://127.0.0.1:1/parser").timeout(2).build().unwrap();

    let err = client.extract("https://example.com/a").await.unwrap_err();
    assert!(matches!(err, ReadabilityError::Transport { .. }));

    let mut messages = vec![err.to_string(), format!("{err:?}")];
    let mut source = err.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        messages.push(format!("{cause:?}"));
        source = cause.source();
    }

    for message in &messages {
        assert!(!message.contains(secret), "token leaked in {message}");
    }
}

#[tokio::test]
async fn test_concurrent_extracts_are_independent() {
    let server = MockServer::start().await;
    let first = "https://www.example-news.com/long-read";
    let second = "https://blog.example.org/posts/hello";

    Mock::given(method("GET"))
        .and(query_param("url", first))
        .respond_with(json_response(200, fixture("multipage.json")).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", second))
        .respond_with(json_response(200, fixture("no_author.json")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (a, b) = tokio::join!(client.extract(first), client.extract(second));

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.title, "The Long Read, Part One");
    assert_eq!(b.title, "Hello, World");
    assert_eq!(a.next_page_id.as_deref(), Some("abc123"));
    assert_eq!(b.next_page_id, None);
}

#[tokio::test]
async fn test_diagnostic_sink_receives_failed_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("x-request-id", "req-42")
                .set_body_string(r#"{"error":true,"messages":"Bad token"}"#),
        )
        .mount(&server)
        .await;

    let dumps = Arc::new(Mutex::new(Vec::<ResponseDump>::new()));
    let sink = {
        let dumps = Arc::clone(&dumps);
        move |dump: &ResponseDump| dumps.lock().unwrap().push(dump.clone())
    };

    let client = ReadabilityClient::builder(TOKEN)
        .endpoint(format!("{}/parser", server.uri()))
        .diagnostic_sink(sink)
        .build()
        .unwrap();

    let err = client.extract("https://example.com/a").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let dumps = dumps.lock().unwrap();
    assert_eq!(dumps.len(), 1);

    let dump = &dumps[0];
    assert_eq!(dump.page_url, "https://example.com/a");
    assert_eq!(dump.status, 401);
    assert!(dump.headers.iter().any(|(k, v)| k == "x-request-id" && v == "req-42"));
    assert!(dump.body.contains("Bad token"));

    let rendered = dump.to_string();
    assert!(rendered.starts_with("HTTP/1.1 401 Unauthorized"));
    assert!(!rendered.contains(TOKEN));
}

#[tokio::test]
async fn test_diagnostic_sink_receives_undecodable_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, "{bad".to_string()))
        .mount(&server)
        .await;

    let dumps = Arc::new(Mutex::new(Vec::<ResponseDump>::new()));
    let sink = {
        let dumps = Arc::clone(&dumps);
        move |dump: &ResponseDump| dumps.lock().unwrap().push(dump.clone())
    };

    let client = ReadabilityClient::builder(TOKEN)
        .endpoint(format!("{}/parser", server.uri()))
        .diagnostic_sink(sink)
        .build()
        .unwrap();

    let err = client.extract("https://example.com/broken").await.unwrap_err();
    assert!(matches!(err, ReadabilityError::Decode { .. }));

    let dumps = dumps.lock().unwrap();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].status, 200);
    assert_eq!(dumps[0].body, "{bad");
    assert!(!dumps[0].to_string().contains(TOKEN));
}

#[rstest]
#[case(503)]
#[case(504)]
#[tokio::test]
async fn test_diagnostic_sink_receives_drained_server_error_body(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let dumps = Arc::new(Mutex::new(Vec::<ResponseDump>::new()));
    let sink = {
        let dumps = Arc::clone(&dumps);
        move |dump: &ResponseDump| dumps.lock().unwrap().push(dump.clone())
    };

    let client = ReadabilityClient::builder(TOKEN)
        .endpoint(format!("{}/parser", server.uri()))
        .diagnostic_sink(sink)
        .build()
        .unwrap();

    let err = client.extract("https://example.com/a").await.unwrap_err();
    assert_eq!(err.status(), Some(status));

    let dumps = dumps.lock().unwrap();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].body, "upstream exploded");
}

#[tokio::test]
async fn test_large_server_error_body_is_discarded_without_sink() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(4 * 1024 * 1024)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for _ in 0..2 {
        let err = client.extract("https://example.com/a").await.unwrap_err();
        assert!(matches!(err, ReadabilityError::Transient { status: 502, .. }));
    }
}

#[tokio::test]
async fn test_page_url_is_sent_as_given() {
    let server = MockServer::start().await;
    let page = " https://blog.example.org/posts/hello ";

    Mock::given(method("GET"))
        .and(query_param("url", page))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).extract(page).await.unwrap_err();
    assert_eq!(err.page_url(), Some(page));
}

#[tokio::test]
async fn test_diagnostic_sink_untouched_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("no_author.json")))
        .mount(&server)
        .await;

    let calls = Arc::new(Mutex::new(0usize));
    let sink = {
        let calls = Arc::clone(&calls);
        move |_: &ResponseDump| *calls.lock().unwrap() += 1
    };

    let client = ReadabilityClient::builder(TOKEN)
        .endpoint(format!("{}/parser", server.uri()))
        .diagnostic_sink(sink)
        .build()
        .unwrap();

    client.extract("https://blog.example.org/posts/hello").await.unwrap();
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_result_renders_in_every_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, fixture("multipage.json")))
        .mount(&server)
        .await;

    let article = client_for(&server).extract("https://www.example-news.com/long-read").await.unwrap();

    let html = article.to_format(OutputFormat::Html).unwrap();
    assert!(html.contains("<p>Nobody answered it.</p>"));

    let text = article.to_format(OutputFormat::Text).unwrap();
    assert!(text.contains("It began, as these things do, with a letter."));
    assert!(!text.contains("<p>"));

    let json = article.to_json().unwrap();
    assert_eq!(json["next_page_id"], "abc123");

    #[cfg(feature = "markdown")]
    {
        let md = article.to_format(OutputFormat::Markdown).unwrap();
        assert!(md.contains("Nobody answered it."));
    }
}
