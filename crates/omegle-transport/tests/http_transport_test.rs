//! Integration tests for HTTP transport

use omegle_transport::{HttpRequest, HttpTransport, HttpTransportConfig, Transport};
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_request_builder() {
    let request = HttpRequest::get("http://omegle.com/start")
        .with_header("referer", "http://omegle.com")
        .with_header("accept", "application/json");

    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "http://omegle.com/start");
    assert_eq!(request.headers.len(), 2);
    assert_eq!(
        request.headers.get("referer"),
        Some(&"http://omegle.com".to_string())
    );
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_post_form_body_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("referer", "http://omegle.com"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("id=central2%3Aabc&msg=hello+world"))
        .respond_with(ResponseTemplate::new(200).set_body_string("win"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().expect("Failed to create HTTP transport");
    let request = HttpRequest::post(format!("{}/send", mock_server.uri()))
        .with_header("referer", "http://omegle.com")
        .with_form_body([("id", "central2:abc"), ("msg", "hello world")]);

    let response = transport.send_http(request).await.expect("Request failed");

    assert!(response.is_ok());
    assert_eq!(response.text(), "win");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_get_with_query_string() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(query_param("firstevents", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"central2:abc\""))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::get(format!(
            "{}/start?firstevents=1",
            mock_server.uri()
        )))
        .await
        .unwrap();

    assert_eq!(response.text(), "\"central2:abc\"");
}

#[tokio::test]
async fn test_non_200_status_is_returned_not_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::post(format!("{}/events", mock_server.uri())))
        .await
        .expect("Status errors are not transport errors");

    assert_eq!(response.status, 502);
    assert!(!response.is_ok());
}

#[tokio::test]
async fn test_timeout_is_reported_as_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("null")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::with_config(HttpTransportConfig {
        timeout: Duration::from_millis(50),
        ..Default::default()
    })
    .unwrap();

    let err = transport
        .send_http(HttpRequest::post(format!("{}/events", mock_server.uri())))
        .await
        .expect_err("Request should time out");

    assert!(err.is_transient(), "unexpected error: {err}");
}
