//! End-to-end tests of the HTTP surface.
//!
//! Each test drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};

use aidreg::AID_HEADER;
use aidreg_core::signage::{self, Signage};
use aidreg_core::{digest, verify_signatures, Record, RecordList, SIGNATURE_HEADER};
use aidreg_testkit::fixtures::{read_request_raw, register_request_raw};
use aidreg_testkit::{TestFixture, TestIdentity};

fn setup() -> (TestFixture, TestIdentity) {
    let fixture = TestFixture::new();
    let alice = TestIdentity::basic(1);
    fixture.enroll(&alice);
    (fixture, alice)
}

async fn register(fixture: &TestFixture, identity: &TestIdentity, name: &str) -> Record {
    let record = identity.record(name);
    let response = fixture.send(identity.register_request(&record)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    record
}

// ─────────────────────────────────────────────────────────────────────────────
// Register
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_echoes_and_signs() {
    let (fixture, alice) = setup();
    let record = alice.record("John Doe");

    let response = fixture.send(alice.register_request(&record)).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, serde_json::to_value(&record).unwrap());

    let signature = response.signature().expect("response is signed");
    assert!(verify_signatures(
        signature,
        record.said.as_bytes(),
        &fixture.server.public_keys()
    ));
    let bundles = signage::decode(signature).unwrap();
    assert_eq!(bundles[0].signer(), Some(&fixture.server.aid));
}

#[tokio::test]
async fn test_register_twice_is_accepted() {
    let (fixture, alice) = setup();
    register(&fixture, &alice, "John Doe").await;
    register(&fixture, &alice, "John Doe").await;

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let response = fixture.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["records"], 1);
    assert_eq!(response.body["server_aid"], fixture.server.aid.as_str());
}

#[tokio::test]
async fn test_register_wrong_digest() {
    let (fixture, alice) = setup();
    let mut record = alice.record("John Doe");
    record.name = "Jane Doe".into();

    let response = fixture.send(alice.register_request(&record)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "INTEGRITY_FAILURE");
    assert!(response.signature().is_none());
}

#[tokio::test]
async fn test_register_unknown_owner() {
    let (fixture, _) = setup();
    let stranger = TestIdentity::basic(9);

    let response = fixture
        .send(stranger.register_request(&stranger.record("John Doe")))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTHENTICATION_FAILURE");
}

#[tokio::test]
async fn test_register_missing_signature() {
    let (fixture, alice) = setup();
    let body = serde_json::to_vec(&alice.record("John Doe")).unwrap();

    let response = fixture.send(register_request_raw(body, None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_blank_or_binary_signature() {
    let (fixture, alice) = setup();
    let body = serde_json::to_vec(&alice.record("John Doe")).unwrap();

    let response = fixture
        .send(register_request_raw(body.clone(), Some("")))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, HeaderValue::from_bytes(b"\xff\xfe").unwrap())
        .body(Body::from(body))
        .unwrap();
    let response = fixture.send(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "AUTHENTICATION_FAILURE");

    // The body is still checked first.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(SIGNATURE_HEADER, HeaderValue::from_bytes(b"\xff\xfe").unwrap())
        .body(Body::from("{not json"))
        .unwrap();
    let response = fixture.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_malformed_bodies() {
    let (fixture, alice) = setup();

    let bodies: [&[u8]; 4] = [
        b"{not json",
        br#"{"i":"BAlice","n":"John Doe"}"#,
        br#"{"d":"","n":"John Doe"}"#,
        br#"{"d":"","i":"BAlice"}"#,
    ];
    for body in bodies {
        let signature = alice.sign_header(body, false);
        let response = fixture
            .send(register_request_raw(body.to_vec(), Some(&signature)))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response.body["code"], "MALFORMED_INPUT");
    }
}

#[tokio::test]
async fn test_register_signature_over_other_bytes() {
    let (fixture, alice) = setup();
    let record = alice.record("John Doe");
    let body = serde_json::to_vec(&record).unwrap();

    // Same record, different whitespace: the signature covers raw bytes.
    let pretty = serde_json::to_vec_pretty(&record).unwrap();
    let signature = alice.sign_header(&pretty, false);

    let response = fixture.send(register_request_raw(body, Some(&signature))).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_multi_key_identity() {
    let fixture = TestFixture::new();
    let group = TestIdentity::multi(&[1, 2, 3]);
    fixture.enroll(&group);
    let record = group.record("Committee");
    let body = serde_json::to_vec(&record).unwrap();

    // Two of three signatures is not enough.
    let partial = signage::encode(&[Signage::indexed(
        group.keypairs[..2].iter().map(|kp| kp.sign(&body)),
    )
    .unwrap()]);
    let response = fixture
        .send(register_request_raw(body.clone(), Some(&partial)))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = fixture.send(group.register_request(&record)).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

// ─────────────────────────────────────────────────────────────────────────────
// Read
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_read_unregistered_name() {
    let (fixture, alice) = setup();

    let response = fixture.send(alice.read_request("name=Nobody")).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_read_by_digest() {
    let (fixture, alice) = setup();
    let record = register(&fixture, &alice, "John Doe").await;

    let response = fixture
        .send(alice.read_request(&format!("SAID={}", record.said)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(&record).unwrap());
    assert!(verify_signatures(
        response.signature().unwrap(),
        record.said.as_bytes(),
        &fixture.server.public_keys()
    ));
}

#[tokio::test]
async fn test_read_bit_flipped_signature() {
    let (fixture, alice) = setup();
    let record = register(&fixture, &alice, "John Doe").await;
    let query = format!("SAID={}", record.said);

    let mut sig = alice.keypairs[0].sign(query.as_bytes());
    sig.0[0] ^= 0x01;
    let header = signage::encode(&[Signage::indexed([sig])
        .unwrap()
        .with_signer(alice.aid.clone())]);

    let response = fixture
        .send(read_request_raw(&query, Some(&header), None))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_read_by_name_returns_list() {
    let (fixture, alice) = setup();
    let bob = TestIdentity::basic(2);
    fixture.enroll(&bob);

    let first = register(&fixture, &alice, "John Doe").await;
    let second = register(&fixture, &bob, "John Doe").await;

    let response = fixture.send(alice.read_request("name=John%20Doe")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        serde_json::to_value(vec![first.clone(), second.clone()]).unwrap()
    );

    let wrapper = digest::saidify(RecordList::new(vec![first, second])).unwrap();
    assert!(verify_signatures(
        response.signature().unwrap(),
        wrapper.said.as_bytes(),
        &fixture.server.public_keys()
    ));
}

#[tokio::test]
async fn test_read_by_owner() {
    let (fixture, alice) = setup();
    let first = register(&fixture, &alice, "John Doe").await;
    let second = register(&fixture, &alice, "Jane Doe").await;

    let response = fixture
        .send(alice.read_request(&format!("AID={}", alice.aid)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        serde_json::to_value(vec![first, second]).unwrap()
    );
}

#[tokio::test]
async fn test_read_selector_priority() {
    let (fixture, alice) = setup();
    let john = register(&fixture, &alice, "John Doe").await;
    register(&fixture, &alice, "Jane Doe").await;

    // SAID wins over AID and name.
    let query = format!("name=Jane%20Doe&AID={}&SAID={}", alice.aid, john.said);
    let response = fixture.send(alice.read_request(&query)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(&john).unwrap());

    // An empty SAID is ignored.
    let response = fixture.send(alice.read_request("SAID=&name=John%20Doe")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(&john).unwrap());
}

#[tokio::test]
async fn test_read_with_identity_header() {
    let (fixture, alice) = setup();
    let record = register(&fixture, &alice, "John Doe").await;
    let query = "name=John%20Doe";
    let signature = alice.sign_header(query.as_bytes(), false);

    let response = fixture
        .send(read_request_raw(query, Some(&signature), Some(alice.aid.as_str())))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(&record).unwrap());

    // Without either source of the signer.
    let response = fixture
        .send(read_request_raw(query, Some(&signature), None))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_ignores_binary_identity_header_when_bundle_names_signer() {
    let (fixture, alice) = setup();
    let record = register(&fixture, &alice, "John Doe").await;
    let query = "name=John%20Doe";

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/read?{}", query))
        .header(SIGNATURE_HEADER, alice.sign_header(query.as_bytes(), true))
        .header(AID_HEADER, HeaderValue::from_bytes(b"\xff\xfe").unwrap())
        .body(Body::empty())
        .unwrap();
    let response = fixture.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, serde_json::to_value(&record).unwrap());
}

#[tokio::test]
async fn test_read_request_errors() {
    let (fixture, alice) = setup();

    // No signature at all.
    let response = fixture
        .send(read_request_raw("name=John%20Doe", None, None))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // An empty signature counts as none.
    let response = fixture
        .send(read_request_raw("name=John%20Doe", Some(""), Some(alice.aid.as_str())))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Undecodable signature header.
    let response = fixture
        .send(read_request_raw("name=John%20Doe", Some("garbage"), Some(alice.aid.as_str())))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // No query string.
    let signature = alice.sign_header(b"", true);
    let response = fixture.send(read_request_raw("", Some(&signature), None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Signed, but names no selector.
    let response = fixture.send(alice.read_request("colour=blue")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Signer unknown to the resolver.
    let stranger = TestIdentity::basic(9);
    let response = fixture.send(stranger.read_request("name=John%20Doe")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = fixture.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}
