//! Request lifecycle tests against the in-memory transport.

use serde::{Deserialize, Serialize};
use winant_core::{
    ConfigError, Headers, JsonContent, LoadFlags, Method, Multipart, MultipartFile, Parameters,
    Payload, Url,
};
use winant_http::testing::{Call, HandleKind, INJECTED_ERROR_CODE, MockResponse, MockTransport};
use winant_http::{
    AddHeadersMode, ClientConfig, Error, HttpRequest, ReadEvent, RequestBuilder, RequestState,
    TransportOp, read_handler,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Chunk(Vec<u8>),
    End,
    Error(TransportOp),
}

fn record(event: ReadEvent<'_>) -> Seen {
    match event {
        ReadEvent::Chunk(data) => Seen::Chunk(data.to_vec()),
        ReadEvent::EndOfStream => Seen::End,
        ReadEvent::Error(e) => Seen::Error(e.op()),
    }
}

fn open<'h>(transport: &MockTransport, method: Method, url: &str) -> HttpRequest<'h, MockTransport> {
    HttpRequest::open(transport, &ClientConfig::default(), method, &Url::from(url)).unwrap()
}

#[test]
fn full_request_lifecycle() {
    let transport = MockTransport::new(
        MockResponse::new(200)
            .with_header("Content-Type", "text/plain")
            .with_header("Server", "mock")
            .with_body("ok"),
    );
    let config = ClientConfig::default().with_user_agent("lifecycle/1.0");

    let descriptor = RequestBuilder::new(Method::Post)
        .option(Url::from("http://example.com:8080/submit"))
        .option(Headers::from([("X-Token", "abc")]))
        .option(Parameters::from([("uid", "789")]))
        .option(Payload::from([("app", "winant http")]))
        .build()
        .unwrap();

    let mut request = HttpRequest::from_descriptor(&transport, &config, descriptor).unwrap();
    assert_eq!(request.state(), RequestState::Configured);
    assert_eq!(request.body(), b"app=winant%20http");

    let response = request.start().unwrap();
    assert_eq!(request.state(), RequestState::Complete);
    drop(request);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "ok");
    assert_eq!(response.headers().get_header("Server"), Some("mock"));
    assert_eq!(response.headers().get_header("Content-Type"), Some("text/plain"));

    assert_eq!(
        transport.calls(),
        vec![
            Call::OpenSession {
                user_agent: "lifecycle/1.0".into()
            },
            Call::OpenConnection {
                host: "example.com".into(),
                port: 8080
            },
            Call::OpenRequest {
                method: Method::Post,
                path: "/submit?uid=789".into(),
                secure: false
            },
            Call::AddHeaders {
                block: "X-Token: abc\r\n\r\n".into(),
                mode: AddHeadersMode::Replace
            },
            Call::AddHeaders {
                block: "Content-Type: application/x-www-form-urlencoded\r\n".into(),
                mode: AddHeadersMode::Replace
            },
            Call::Send {
                body: b"app=winant%20http".to_vec()
            },
            Call::QueryStatus,
            Call::QueryHeaders,
            Call::ReadBody { len: 2 },
            Call::ReadBody { len: 0 },
            Call::Release(HandleKind::Request),
            Call::Release(HandleKind::Connection),
            Call::Release(HandleKind::Session),
        ]
    );
}

#[test]
fn failed_open_releases_acquired_handles() {
    let transport = MockTransport::new(MockResponse::new(200)).fail_at(TransportOp::OpenRequest);
    let err = HttpRequest::open(
        &transport,
        &ClientConfig::default(),
        Method::Get,
        &Url::from("https://example.com/"),
    )
    .unwrap_err();

    let transport_err = err.transport_error().unwrap();
    assert_eq!(transport_err.op(), TransportOp::OpenRequest);
    assert_eq!(transport_err.code(), Some(INJECTED_ERROR_CODE));
    assert!(!err.is_misuse());

    let calls = transport.calls();
    assert_eq!(
        &calls[3..],
        &[
            Call::Release(HandleKind::Connection),
            Call::Release(HandleKind::Session)
        ]
    );
    assert!(matches!(calls[2], Call::OpenRequest { secure: true, .. }));
}

#[test]
fn bad_url_never_reaches_transport() {
    let transport = MockTransport::new(MockResponse::new(200));
    let err = HttpRequest::open(
        &transport,
        &ClientConfig::default(),
        Method::Get,
        &Url::from("ftp://example.com/file"),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::UnsupportedScheme { .. })
    ));
    assert!(err.is_misuse());
    assert!(transport.calls().is_empty());
}

#[test]
fn malformed_response_header_fails() {
    let transport = MockTransport::new(
        MockResponse::new(200)
            .with_raw_headers("HTTP/1.1 200 OK\r\nno-delimiter-here\r\n\r\n")
            .with_body("ignored"),
    );
    let mut request = open(&transport, Method::Get, "http://example.com/");
    let err = request.start().unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    assert_eq!(request.state(), RequestState::Failed);
    assert!(!transport
        .calls()
        .iter()
        .any(|c| matches!(c, Call::ReadBody { .. })));
}

#[test]
fn send_failure_carries_code() {
    let transport = MockTransport::new(MockResponse::new(200)).fail_at(TransportOp::Send);
    let mut request = open(&transport, Method::Get, "http://example.com/");
    let err = request.start().unwrap_err();
    match err {
        Error::Transport(e) => {
            assert_eq!(e.op(), TransportOp::Send);
            assert_eq!(e.code(), Some(INJECTED_ERROR_CODE));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(request.state(), RequestState::Failed);
}

#[test]
fn read_failure_reaches_handler_and_caller() {
    let transport = MockTransport::new(
        MockResponse::new(200)
            .with_chunk("first")
            .with_chunk("second")
            .fail_read_after(1),
    );
    let mut events = Vec::new();
    let mut request = open(&transport, Method::Get, "http://example.com/");
    request
        .set_read_handler(Box::new(|event: ReadEvent<'_>| events.push(record(event))))
        .unwrap();

    let err = request.start().unwrap_err();
    assert!(matches!(&err, Error::StreamRead(e) if e.op() == TransportOp::ReadBody));
    assert_eq!(request.state(), RequestState::Failed);
    drop(request);

    assert_eq!(
        events,
        vec![Seen::Chunk(b"first".to_vec()), Seen::Error(TransportOp::ReadBody)]
    );
}

#[test]
fn handler_sees_every_chunk_then_end() {
    let transport = MockTransport::new(MockResponse::new(200).with_body("hello"));
    let config = ClientConfig::default().with_read_chunk_size(2);
    let mut events = Vec::new();

    let descriptor = RequestBuilder::new(Method::Get)
        .option(Url::from("http://example.com/"))
        .option(read_handler(|event| events.push(record(event))))
        .build()
        .unwrap();
    let mut request = HttpRequest::from_descriptor(&transport, &config, descriptor).unwrap();
    let response = request.start().unwrap();
    drop(request);

    assert_eq!(response.bytes(), b"hello");
    assert_eq!(
        events,
        vec![
            Seen::Chunk(b"he".to_vec()),
            Seen::Chunk(b"ll".to_vec()),
            Seen::Chunk(b"o".to_vec()),
            Seen::End,
        ]
    );
}

#[test]
fn do_not_save_keeps_body_empty() {
    let transport = MockTransport::new(MockResponse::new(200).with_chunk("abc").with_chunk("def"));
    let mut total = 0usize;
    let mut request = open(&transport, Method::Get, "http://example.com/");
    request
        .set_load_flags(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY)
        .unwrap();
    request
        .set_read_handler(Box::new(|event: ReadEvent<'_>| {
            if let ReadEvent::Chunk(data) = event {
                total += data.len();
            }
        }))
        .unwrap();

    let response = request.start().unwrap();
    drop(request);
    assert!(response.bytes().is_empty());
    assert_eq!(total, 6);
}

#[test]
fn config_default_load_flags_apply() {
    let transport = MockTransport::new(MockResponse::new(200).with_body("data"));
    let config =
        ClientConfig::default().with_default_load_flags(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY);
    let mut request =
        HttpRequest::open(&transport, &config, Method::Get, &Url::from("http://example.com/")).unwrap();
    assert!(request.start().unwrap().bytes().is_empty());
}

#[test]
fn request_is_single_use() {
    let transport = MockTransport::new(MockResponse::new(204));
    let mut request = open(&transport, Method::Delete, "http://example.com/item/1");
    assert_eq!(request.start().unwrap().status_code(), 204);

    assert!(matches!(request.start(), Err(Error::Misuse { .. })));
    assert!(matches!(
        request.set_headers(&Headers::from([("A", "1")])),
        Err(Error::Misuse { .. })
    ));
    assert!(matches!(
        request.set_json(&JsonContent::from("{}")),
        Err(Error::Misuse { .. })
    ));
    assert_eq!(request.state(), RequestState::Complete);
}

#[test]
fn last_content_wins_and_overrides_manual_content_type() {
    let transport = MockTransport::new(MockResponse::new(200));
    let mut request = open(&transport, Method::Post, "http://example.com/");
    request
        .set_headers(&Headers::from([("Content-Type", "text/plain")]))
        .unwrap();
    request.set_payload(&Payload::from([("a", "1")])).unwrap();
    request
        .set_json(&JsonContent::from(r#"{"code": 0}"#))
        .unwrap();
    request.start().unwrap();

    let pushed: Vec<String> = transport
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::AddHeaders { block, .. } => Some(block),
            _ => None,
        })
        .collect();
    assert_eq!(
        pushed,
        vec![
            "Content-Type: text/plain\r\n\r\n".to_string(),
            "Content-Type: application/x-www-form-urlencoded\r\n".to_string(),
            "Content-Type: application/json\r\n".to_string(),
        ]
    );
    assert!(transport.calls().contains(&Call::Send {
        body: br#"{"code": 0}"#.to_vec()
    }));
}

#[test]
fn empty_headers_are_not_pushed() {
    let transport = MockTransport::new(MockResponse::new(200));
    let mut request = open(&transport, Method::Get, "http://example.com/");
    request.set_headers(&Headers::new()).unwrap();
    assert_eq!(request.state(), RequestState::Created);
    assert!(!transport
        .calls()
        .iter()
        .any(|c| matches!(c, Call::AddHeaders { .. })));
}

#[test]
fn multipart_body_is_sent_with_its_boundary() {
    let transport = MockTransport::new(MockResponse::new(201));
    let mut multipart = Multipart::new();
    multipart
        .add_file(MultipartFile::new("file", "test.txt", "hello, world!"))
        .add_value(("file_size", "unknown"));

    let mut request = open(&transport, Method::Post, "http://example.com/upload");
    request.set_multipart(&multipart).unwrap();
    request.start().unwrap();
    drop(request);

    let calls = transport.calls();
    let boundary = calls
        .iter()
        .find_map(|c| match c {
            Call::AddHeaders { block, .. } => block
                .strip_prefix("Content-Type: multipart/form-data; boundary=")
                .map(|b| b.trim_end().to_string()),
            _ => None,
        })
        .unwrap();
    let body = calls
        .iter()
        .find_map(|c| match c {
            Call::Send { body } => Some(String::from_utf8(body.clone()).unwrap()),
            _ => None,
        })
        .unwrap();
    assert!(body.starts_with(&format!("--{boundary}\r\n")));
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
}

#[test]
fn json_round_trip() {
    #[derive(Serialize)]
    struct Query {
        id: u32,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Reply {
        code: i32,
        msg: String,
    }

    let transport = MockTransport::new(
        MockResponse::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"code": 0, "msg": "success"}"#),
    );
    let mut request = open(&transport, Method::Post, "http://example.com/api");
    request
        .set_json(&JsonContent::from_serialize(&Query { id: 7 }).unwrap())
        .unwrap();
    let reply: Reply = request.start().unwrap().json().unwrap();
    assert_eq!(
        reply,
        Reply {
            code: 0,
            msg: "success".into()
        }
    );
    assert!(transport.calls().contains(&Call::Send {
        body: br#"{"id":7}"#.to_vec()
    }));
}

#[test]
fn flags_and_handler_mark_request_configured() {
    let transport = MockTransport::new(MockResponse::new(200));

    let mut request = open(&transport, Method::Get, "http://example.com/");
    request
        .set_load_flags(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY)
        .unwrap();
    assert_eq!(request.state(), RequestState::Configured);

    let mut request = open(&transport, Method::Get, "http://example.com/");
    request
        .set_read_handler(Box::new(|_event: ReadEvent<'_>| {}))
        .unwrap();
    assert_eq!(request.state(), RequestState::Configured);
}
