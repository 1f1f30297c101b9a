//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: identities that sign requests
//! and a registry server wired to an in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use aidreg::{create_router, AppState, LocalSigner, RegistryService, StaticResolver, AID_HEADER};
use aidreg_core::signage::{self, Signage};
use aidreg_core::{Aid, Blake3Hash, Ed25519PublicKey, Keypair, Record, SIGNATURE_HEADER};
use aidreg_store::MemoryRegistry;

/// Seed of the fixture server's key.
pub const SERVER_SEED: [u8; 32] = [0xAA; 32];

/// An identity that signs requests with every one of its keys.
pub struct TestIdentity {
    pub keypairs: Vec<Keypair>,
    pub aid: Aid,
}

impl TestIdentity {
    /// A single-key basic identity from a repeated seed byte.
    pub fn basic(seed: u8) -> Self {
        let keypair = Keypair::from_seed(&[seed; 32]);
        Self {
            aid: Aid::basic(&keypair.public_key()),
            keypairs: vec![keypair],
        }
    }

    /// A multi-key identity from repeated seed bytes. Its identifier is a
    /// digest over the keys, so it never self-resolves.
    pub fn multi(seeds: &[u8]) -> Self {
        Self::from_keypairs(seeds.iter().map(|s| Keypair::from_seed(&[*s; 32])).collect())
    }

    /// A multi-key identity over the given keys, in signing order.
    pub fn from_keypairs(keypairs: Vec<Keypair>) -> Self {
        let material: Vec<u8> = keypairs
            .iter()
            .flat_map(|kp| kp.public_key().as_bytes().to_vec())
            .collect();
        Self {
            aid: Aid::new(Blake3Hash::hash(&material).to_qb64()),
            keypairs,
        }
    }

    pub fn public_keys(&self) -> Vec<Ed25519PublicKey> {
        self.keypairs.iter().map(Keypair::public_key).collect()
    }

    /// A record owned by this identity.
    pub fn record(&self, name: &str) -> Record {
        Record::new(self.aid.clone(), name).unwrap()
    }

    /// A `Signature` header over `message`, one indexed signature per key.
    pub fn sign_header(&self, message: &[u8], embed_signer: bool) -> String {
        let mut bundle = Signage::indexed(self.keypairs.iter().map(|kp| kp.sign(message))).unwrap();
        if embed_signer {
            bundle = bundle.with_signer(self.aid.clone());
        }
        signage::encode(&[bundle])
    }

    /// `POST /register` for `record`, signed over its JSON body.
    pub fn register_request(&self, record: &Record) -> Request<Body> {
        let body = serde_json::to_vec(record).unwrap();
        let signature = self.sign_header(&body, false);
        register_request_raw(body, Some(&signature))
    }

    /// `GET /read?<query>`, signed over the raw query with the signer named
    /// in the bundle.
    pub fn read_request(&self, query: &str) -> Request<Body> {
        let signature = self.sign_header(query.as_bytes(), true);
        read_request_raw(query, Some(&signature), None)
    }
}

/// `POST /register` with an arbitrary body and signature.
pub fn register_request_raw(body: Vec<u8>, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).unwrap()
}

/// `GET /read` with an arbitrary query, signature and `KERI-AID`.
pub fn read_request_raw(query: &str, signature: Option<&str>, aid: Option<&str>) -> Request<Body> {
    let uri = if query.is_empty() {
        "/read".to_string()
    } else {
        format!("/read?{}", query)
    };
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    if let Some(aid) = aid {
        builder = builder.header(AID_HEADER, aid);
    }
    builder.body(Body::empty()).unwrap()
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    /// The server's `Signature` header, if any.
    pub fn signature(&self) -> Option<&str> {
        self.headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
    }
}

/// A registry server over a fresh in-memory store.
///
/// The resolver starts empty and does not self-resolve, so identities must
/// be [`enrolled`](TestFixture::enroll) before they can sign anything.
pub struct TestFixture {
    pub resolver: Arc<StaticResolver>,
    pub server: TestIdentity,
    router: Router,
}

impl TestFixture {
    pub fn new() -> Self {
        let resolver = Arc::new(StaticResolver::new());
        let server_keypair = Keypair::from_seed(&SERVER_SEED);
        let server = TestIdentity {
            aid: Aid::basic(&server_keypair.public_key()),
            keypairs: vec![server_keypair.clone()],
        };

        let service = RegistryService::new(
            Arc::new(MemoryRegistry::new()),
            resolver.clone(),
            Arc::new(LocalSigner::from_keypair(server_keypair)),
        );
        let router = create_router(Arc::new(AppState::new(service)));

        Self {
            resolver,
            server,
            router,
        }
    }

    /// Make `identity`'s keys resolvable.
    pub fn enroll(&self, identity: &TestIdentity) {
        self.resolver
            .insert(identity.aid.clone(), identity.public_keys())
            .unwrap();
    }

    /// Send one request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create several distinct basic identities.
pub fn identities(count: u8) -> Vec<TestIdentity> {
    (0..count).map(|i| TestIdentity::basic(i + 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidreg_core::verify_signatures;

    #[test]
    fn test_identities_are_distinct() {
        let ids = identities(3);
        assert_ne!(ids[0].aid, ids[1].aid);
        assert_ne!(ids[1].aid, ids[2].aid);
        assert_ne!(ids[0].aid, ids[2].aid);
    }

    #[test]
    fn test_sign_header_verifies() {
        let identity = TestIdentity::multi(&[1, 2, 3]);
        let header = identity.sign_header(b"message", true);
        assert!(verify_signatures(&header, b"message", &identity.public_keys()));
        assert!(identity.aid.as_str().starts_with('E'));
    }

    #[tokio::test]
    async fn test_fixture_health() {
        let fixture = TestFixture::new();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = fixture.send(request).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "ok");
    }
}
