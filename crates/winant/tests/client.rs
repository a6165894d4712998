//! End-to-end use of the facade over the mock transport.

use serde::{Deserialize, Serialize};
use winant::testing::{Call, HandleKind, MockResponse, MockTransport};
use winant::{
    Client, ClientConfig, Error, Headers, JsonContent, LoadFlags, Method, Multipart,
    MultipartFile, Parameters, Payload, ReadEvent, Url, options, read_handler,
};

fn client(response: MockResponse) -> Client<MockTransport> {
    Client::with_transport(MockTransport::new(response))
}

fn sent_body(calls: &[Call]) -> Vec<u8> {
    calls
        .iter()
        .find_map(|c| match c {
            Call::Send { body } => Some(body.clone()),
            _ => None,
        })
        .unwrap()
}

fn opened_path(calls: &[Call]) -> String {
    calls
        .iter()
        .find_map(|c| match c {
            Call::OpenRequest { path, .. } => Some(path.clone()),
            _ => None,
        })
        .unwrap()
}

#[test]
fn get_with_parameters() {
    let client = client(MockResponse::new(200).with_body(r#"{"args": {}}"#));
    let mut params = Parameters::new();
    params
        .add(("access_key", "token123"))
        .add(("uid", "789"))
        .add(("appkey", "winant http"))
        .add(("appkey", "backup&winant"));

    let response = client
        .get(options![Url::from("http://httpbin.org/get"), params])
        .unwrap();
    assert!(response.is_success());

    assert_eq!(
        opened_path(&client.transport().calls()),
        "/get?access_key=token123&uid=789&appkey=winant%20http&appkey=backup%26winant"
    );
}

#[test]
fn post_form_payload() {
    let client = client(MockResponse::new(200));
    client
        .post(options![
            Url::from("http://httpbin.org/post"),
            Headers::from([("X-Trace", "1")]),
            Payload::from([("token", "token123"), ("uid", "kcno.1"), ("app", "winant http")]),
        ])
        .unwrap();

    let calls = client.transport().calls();
    assert_eq!(sent_body(&calls), b"token=token123&uid=kcno.1&app=winant%20http");
    assert!(calls.contains(&Call::AddHeaders {
        block: "Content-Type: application/x-www-form-urlencoded\r\n".into(),
        mode: winant::http::AddHeadersMode::Replace,
    }));
}

#[test]
fn post_json_and_decode_reply() {
    #[derive(Serialize)]
    struct Login<'a> {
        user: &'a str,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Reply {
        code: i32,
        msg: String,
    }

    let client = client(MockResponse::new(200).with_body(r#"{"code": 0, "msg": "success"}"#));
    let body = JsonContent::from_serialize(&Login { user: "kcno" }).unwrap();
    let reply: Reply = client
        .post(options![Url::from("http://httpbin.org/post"), body])
        .unwrap()
        .json()
        .unwrap();

    assert_eq!(
        reply,
        Reply {
            code: 0,
            msg: "success".into()
        }
    );
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&sent_body(&client.transport().calls())).unwrap(),
        serde_json::json!({ "user": "kcno" })
    );
}

#[test]
fn post_multipart_file_before_value() {
    let client = client(MockResponse::new(200));
    let mut multipart = Multipart::new();
    multipart
        .add_value(("file_size", "unknown"))
        .add_file(MultipartFile::new("file", "test.txt", "hello, world!"));

    client
        .post(options![Url::from("http://httpbin.org/post"), multipart])
        .unwrap();

    let body = String::from_utf8(sent_body(&client.transport().calls())).unwrap();
    let file_at = body.find("filename=\"test.txt\"").unwrap();
    let value_at = body.find("name=\"file_size\"").unwrap();
    assert!(file_at < value_at);
    assert!(body.contains("Content-Type: application/octet-stream\r\n\r\nhello, world!\r\n"));
}

#[test]
fn streamed_download_without_retention() {
    let client = client(
        MockResponse::new(200)
            .with_chunk(vec![1u8; 100])
            .with_chunk(vec![2u8; 50]),
    );
    let mut received = 0usize;
    let mut finished = false;

    let response = client
        .get(options![
            Url::from("http://example.com/big.bin"),
            LoadFlags::DO_NOT_SAVE_RESPONSE_BODY,
            read_handler(|event: ReadEvent<'_>| match event {
                ReadEvent::Chunk(data) => received += data.len(),
                ReadEvent::EndOfStream => finished = true,
                ReadEvent::Error(_) => {}
            }),
        ])
        .unwrap();

    assert!(response.bytes().is_empty());
    assert_eq!(received, 150);
    assert!(finished);
}

#[test]
fn handles_are_released_after_failure() {
    let client = Client::with_transport(
        MockTransport::new(MockResponse::new(200).with_chunk("a").fail_read_after(1)),
    )
    .with_config(ClientConfig::default().with_read_chunk_size(16));

    let err = client
        .get(options![Url::from("http://example.com/")])
        .unwrap_err();
    assert!(matches!(err, Error::StreamRead(_)));

    let calls = client.transport().calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        &[
            Call::Release(HandleKind::Request),
            Call::Release(HandleKind::Connection),
            Call::Release(HandleKind::Session),
        ]
    );
}

#[test]
fn every_method_reaches_the_transport() {
    for method in [
        Method::Get,
        Method::Post,
        Method::Head,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
    ] {
        let client = client(MockResponse::new(200));
        client
            .request(method, options![Url::from("http://example.com/r")])
            .unwrap();
        assert!(client.transport().calls().contains(&Call::OpenRequest {
            method,
            path: "/r".into(),
            secure: false,
        }));
    }
}
