//! Integration tests for signed calls over a real HTTP connection.

use ovh_machine::client::signature::{SignatureInput, sign};
use ovh_machine::{Credentials, Endpoint, SignedClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const SERVER_TIME: i64 = 1_700_000_000;

async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream
            .read(&mut buf)
            .await
            .unwrap_or_else(|err| panic!("read request: {err}"));
        if read == 0 {
            break;
        }
        head.extend(buf.iter().take(read));
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then_some(value.trim())
    })
}

/// Serves `connections` requests, answering `/auth/time` with
/// [`SERVER_TIME`] and everything else with a one-project list.
async fn serve(listener: TcpListener, connections: usize, heads: mpsc::UnboundedSender<String>) {
    for _ in 0..connections {
        let (mut stream, _) = listener
            .accept()
            .await
            .unwrap_or_else(|err| panic!("accept: {err}"));
        let head = read_head(&mut stream).await;
        let body = if head.starts_with("GET /1.0/auth/time ") {
            SERVER_TIME.to_string()
        } else {
            String::from(r#"["p1"]"#)
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .unwrap_or_else(|err| panic!("write response: {err}"));
        heads
            .send(head)
            .unwrap_or_else(|err| panic!("record request: {err}"));
    }
}

#[tokio::test]
async fn signed_get_carries_a_verifiable_signature() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|err| panic!("bind: {err}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|err| panic!("local addr: {err}"));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve(listener, 2, tx));

    let base = format!("http://{addr}/1.0");
    let endpoint = Endpoint::resolve(&base).unwrap_or_else(|err| panic!("endpoint: {err}"));
    let client = SignedClient::with_reqwest(Credentials::new(endpoint, "ak", "as", "ck"));

    let response = client
        .get("/cloud/project")
        .await
        .unwrap_or_else(|err| panic!("signed GET: {err}"));
    let projects: Vec<String> = response
        .json()
        .unwrap_or_else(|err| panic!("project list: {err}"));
    assert_eq!(projects, vec![String::from("p1")]);

    server
        .await
        .unwrap_or_else(|err| panic!("server task: {err}"));

    let calibration = rx.recv().await.unwrap_or_else(|| panic!("no calibration"));
    assert!(calibration.starts_with("GET /1.0/auth/time "), "{calibration}");
    assert_eq!(header(&calibration, "X-Ovh-Signature"), None);
    assert_eq!(header(&calibration, "X-Ovh-Application"), Some("ak"));

    let signed = rx.recv().await.unwrap_or_else(|| panic!("no signed call"));
    assert!(signed.starts_with("GET /1.0/cloud/project "), "{signed}");
    assert_eq!(header(&signed, "X-Ovh-Consumer"), Some("ck"));
    assert_eq!(header(&signed, "Content-Type"), None);

    let timestamp: i64 = header(&signed, "X-Ovh-Timestamp")
        .unwrap_or_else(|| panic!("timestamp header missing: {signed}"))
        .parse()
        .unwrap_or_else(|err| panic!("timestamp: {err}"));
    assert!(
        (timestamp - SERVER_TIME).abs() <= 2,
        "timestamp {timestamp} should follow the server clock"
    );

    let expected = sign(&SignatureInput {
        application_secret: "as",
        consumer_key: "ck",
        method: "GET",
        url: &format!("{base}/cloud/project"),
        body: b"",
        timestamp,
    });
    assert_eq!(header(&signed, "X-Ovh-Signature"), Some(expected.as_str()));
}
