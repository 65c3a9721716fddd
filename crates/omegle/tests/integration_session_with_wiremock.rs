//! Integration tests for the session lifecycle using wiremock

mod common;

use omegle::{Error, EventKind, ProtocolError, Session, SessionOptions};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_string, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_bare_start(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::bare_start_reply()))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_chat_start_with_topics() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(header("referer", "http://omegle.com"))
        .and(query_param("firstevents", "1"))
        .and(query_param("topics", r#"["rust","music"]"#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::load_response_fixture("start_with_events")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = common::test_config(
        &mock_server.uri(),
        SessionOptions::new().topics(["rust", "music"]),
    );
    let session = Session::new(config).expect("Failed to create session");

    session.start().await.expect("Start failed");

    assert_eq!(session.identity().as_deref(), Some(common::TEST_CLIENT_ID));
    assert_eq!(session.pending_events(), 3);

    let kinds: Vec<_> = std::iter::from_fn(|| session.get_oldest_event())
        .map(|event| event.kind().clone())
        .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Waiting,
            EventKind::Connected,
            EventKind::CommonLikes
        ]
    );

    mock_server.verify().await;
}

#[tokio::test]
async fn test_answer_mode_start() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(query_param("wantsspy", "1"))
        .and(query_param_is_missing("topics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::bare_start_reply()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = common::test_config(&mock_server.uri(), SessionOptions::new().answer_mode(true));
    let session = Session::new(config).unwrap();

    session.start().await.unwrap();

    assert!(session.is_answer_mode());
    assert!(session.is_connected());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_spy_question_conversation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(query_param("ask", "Is a hot dog a sandwich?"))
        .and(query_param("cansavequestion", "1"))
        .and(query_param("spid", ""))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::bare_start_reply()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .and(body_string(common::id_form()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(common::load_response_fixture("spy_batch")),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;

    let config = common::test_config(
        &mock_server.uri(),
        SessionOptions::new().question("Is a hot dog a sandwich?"),
    );
    let session = Session::new(config).unwrap();
    session.start().await.unwrap();
    assert!(session.is_spy_mode());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let delivered = session
        .listen(move |event| {
            let sink = sink.clone();
            async move { sink.lock().unwrap().push(event) }
        })
        .await
        .unwrap();

    assert_eq!(delivered, 4);
    let seen = seen.lock().unwrap();
    assert!(seen.iter().all(|event| event.kind().is_spy()));
    assert_eq!(seen[2].arg_str(1), Some("obviously not"));
    assert!(seen[3].kind().ends_conversation());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_full_conversation_round_trip() {
    let mock_server = MockServer::start().await;
    mount_bare_start(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(format!("{}&msg=hello+there%21", common::id_form())))
        .respond_with(ResponseTemplate::new(200).set_body_string("win"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/typing"))
        .and(body_string(common::id_form()))
        .respond_with(ResponseTemplate::new(200).set_body_string("win"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::load_response_fixture("conversation_batch")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/disconnect"))
        .and(body_string(common::id_form()))
        .respond_with(ResponseTemplate::new(200).set_body_string("win"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = common::test_config(&mock_server.uri(), SessionOptions::new());
    let session = Session::new(config).unwrap();

    session.start().await.unwrap();
    session.notify_typing().await.unwrap();
    session.send_message("hello there!").await.unwrap();

    assert_eq!(session.poll_events().await.unwrap(), 4);
    let oldest = session.peek_oldest_event().unwrap();
    assert_eq!(oldest.kind(), &EventKind::Typing);

    let messages: Vec<String> = std::iter::from_fn(|| session.get_oldest_event())
        .filter(|event| event.kind() == &EventKind::GotMessage)
        .filter_map(|event| event.arg_str(0).map(str::to_string))
        .collect();
    assert_eq!(messages, ["hi from the other side", "asl?"]);

    assert!(session.disconnect().await.unwrap());
    assert!(!session.is_connected());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_start_json_without_client_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"events":[]}"#))
        .mount(&mock_server)
        .await;

    let session =
        Session::new(common::test_config(&mock_server.uri(), SessionOptions::new())).unwrap();
    let err = session.start().await.unwrap_err();

    assert_eq!(err.as_protocol(), Some(&ProtocolError::MissingClientId));
    assert!(!session.is_connected());
    assert!(!session.is_connecting());
}

#[tokio::test]
async fn test_start_on_server_error_reports_no_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let session =
        Session::new(common::test_config(&mock_server.uri(), SessionOptions::new())).unwrap();
    let err = session.start().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::NoStartResponse)
    ));
}

#[tokio::test]
async fn test_poll_timeout_is_no_data() {
    let mock_server = MockServer::start().await;
    mount_bare_start(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[["gotMessage","too late"]]"#)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let session =
        Session::new(common::test_config(&mock_server.uri(), SessionOptions::new())).unwrap();
    session.start().await.unwrap();

    assert_eq!(session.poll_events().await.unwrap(), 0);
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_disconnect_failure_keeps_identity() {
    let mock_server = MockServer::start().await;
    mount_bare_start(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/disconnect"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session =
        Session::new(common::test_config(&mock_server.uri(), SessionOptions::new())).unwrap();
    session.start().await.unwrap();

    assert!(!session.disconnect().await.unwrap());
    assert_eq!(session.identity().as_deref(), Some(common::TEST_CLIENT_ID));

    let err = session
        .configure(SessionOptions::new().topics(["cats"]))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    session.clear_identity();
    session
        .configure(SessionOptions::new().topics(["cats"]))
        .expect("Reconfigure after reset should succeed");
    assert_eq!(session.topics(), ["cats"]);
}

#[tokio::test]
async fn test_run_disconnects_after_closure() {
    let mock_server = MockServer::start().await;
    mount_bare_start(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/disconnect"))
        .respond_with(ResponseTemplate::new(200).set_body_string("win"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = common::test_config(&mock_server.uri(), SessionOptions::new());
    let handle = Session::run(config, |session| async move { session })
        .await
        .unwrap();

    assert!(!handle.is_connected());
    mock_server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_send_while_another_task_listens() {
    let mock_server = MockServer::start().await;
    mount_bare_start(&mock_server).await;

    // A slow long poll that is still in flight when the message goes out.
    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[["typing"],["stoppedTyping"]]"#)
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[["gotMessage","sent alongside"]]"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session =
        Session::new(common::test_config(&mock_server.uri(), SessionOptions::new())).unwrap();
    session.start().await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener = session.clone();
    let listening = tokio::spawn(async move {
        listener
            .listen(move |event| {
                let sink = sink.clone();
                async move { sink.lock().unwrap().push(event.name().to_string()) }
            })
            .await
    });

    // Let the listener's first poll reach the server.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    let piggybacked = session.send_message("hello").await.unwrap();
    let send_elapsed = started.elapsed();

    assert_eq!(piggybacked, 1);
    assert!(
        send_elapsed < Duration::from_millis(250),
        "send waited on the in-flight poll: {send_elapsed:?}"
    );

    let delivered = listening.await.unwrap().unwrap();

    assert_eq!(delivered, 3);
    assert_eq!(
        *seen.lock().unwrap(),
        ["gotMessage", "typing", "stoppedTyping"]
    );
    mock_server.verify().await;
}
