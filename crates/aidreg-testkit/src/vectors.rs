//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the qualified key encoding, the canonical bytes a
//! record's digest is computed over, and the exact `Signature` header a
//! given key produces, so that independent clients can check themselves
//! against this implementation.

use aidreg_core::signage::{self, Signage};
use aidreg_core::{blanked_bytes, Aid, Keypair, Record};

/// A golden record vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    /// Registered name.
    pub record_name: &'static str,
    /// Expected raw public key (hex).
    pub expected_public_key: &'static str,
    /// Expected basic identifier.
    pub expected_aid: &'static str,
    /// Expected bytes the digest is computed over.
    pub expected_blanked: &'static str,
}

/// Get all golden record vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "John Doe under seed 0x42",
            seed: [0x42; 32],
            record_name: "John Doe",
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_aid: "BCFS-NGbeR0kRTJC4V8uq2y3z_p7al7TAJeWDgaYgdsS",
            expected_blanked: r#"{"d":"","i":"BCFS-NGbeR0kRTJC4V8uq2y3z_p7al7TAJeWDgaYgdsS","n":"John Doe"}"#,
        },
        GoldenVector {
            name: "Quotes and non-ASCII in the name",
            seed: [0x42; 32],
            record_name: "Zoë \"Z\"",
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_aid: "BCFS-NGbeR0kRTJC4V8uq2y3z_p7al7TAJeWDgaYgdsS",
            expected_blanked: r#"{"d":"","i":"BCFS-NGbeR0kRTJC4V8uq2y3z_p7al7TAJeWDgaYgdsS","n":"Zoë \"Z\""}"#,
        },
        GoldenVector {
            name: "Empty name under seed 0x00",
            seed: [0x00; 32],
            record_name: "",
            expected_public_key: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_aid: "BDtqJ7zOtqQtYqOo0CpvDXNlMhV3HeJDpjrASKGLWdop",
            expected_blanked: r#"{"d":"","i":"BDtqJ7zOtqQtYqOo0CpvDXNlMhV3HeJDpjrASKGLWdop","n":""}"#,
        },
        GoldenVector {
            name: "Jane Doe under seed 0x01",
            seed: [0x01; 32],
            record_name: "Jane Doe",
            expected_public_key: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            expected_aid: "BIqI4910CfGV_VLbLTy6XXLKZwm_HZQSG_N0iAG0D29c",
            expected_blanked: r#"{"d":"","i":"BIqI4910CfGV_VLbLTy6XXLKZwm_HZQSG_N0iAG0D29c","n":"Jane Doe"}"#,
        },
    ]
}

/// A golden signature header vector.
#[derive(Debug, Clone)]
pub struct SignatureVector {
    pub name: &'static str,
    pub seed: [u8; 32],
    pub message: &'static [u8],
    pub expected_header: &'static str,
}

/// Get all golden signature header vectors.
pub fn signature_vectors() -> Vec<SignatureVector> {
    vec![SignatureVector {
        name: "Read query signed by seed 0x42",
        seed: [0x42; 32],
        message: b"name=John%20Doe",
        expected_header: concat!(
            r#"indexed="?1";signer="BCFS-NGbeR0kRTJC4V8uq2y3z_p7al7TAJeWDgaYgdsS";"#,
            r#"0="AAB739GGqlhygIqEzhBlLv5uhrYNrQpMNiDhhLdfsjj8ui27vzz45NIs-MW11c35M2R1je3Dc6jXmNxBZQTQ94oC""#,
        ),
    }]
}

/// Generate a record from a golden vector.
pub fn generate_record_from_vector(vector: &GoldenVector) -> Record {
    let keypair = Keypair::from_seed(&vector.seed);
    Record::new(Aid::basic(&keypair.public_key()), vector.record_name).unwrap()
}

/// Generate the signature header for a golden signature vector.
pub fn generate_header_from_vector(vector: &SignatureVector) -> String {
    let keypair = Keypair::from_seed(&vector.seed);
    let bundle = Signage::indexed([keypair.sign(vector.message)])
        .unwrap()
        .with_signer(Aid::basic(&keypair.public_key()));
    signage::encode(&[bundle])
}

/// Check every vector, reporting `(name, matches, detail)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let records = all_vectors().into_iter().map(|v| {
        let keypair = Keypair::from_seed(&v.seed);
        let record = generate_record_from_vector(&v);
        let blanked = blanked_bytes(&record).unwrap();
        let blanked = String::from_utf8_lossy(&blanked).into_owned();

        let matches = hex::encode(keypair.public_key().as_bytes()) == v.expected_public_key
            && record.owner.as_str() == v.expected_aid
            && blanked == v.expected_blanked;

        (v.name.to_string(), matches, blanked)
    });

    let headers = signature_vectors().into_iter().map(|v| {
        let header = generate_header_from_vector(&v);
        (v.name.to_string(), header == v.expected_header, header)
    });

    records.chain(headers).collect()
}
