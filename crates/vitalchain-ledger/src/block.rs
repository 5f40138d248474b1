use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use vitalchain_crypto::{ContentHasher, HasherError};
use vitalchain_types::{Digest, Payload};

use crate::error::LedgerError;

/// Previous digest recorded by every genesis block.
pub const GENESIS_PREVIOUS_DIGEST: Digest = Digest::zero();

/// One immutable, attested fact.
///
/// The digest is computed once, in [`Block::new`], from the other four
/// fields. There are no mutators; the fields are crate-visible only so the
/// ledger's own tests can simulate storage corruption.
///
/// On the wire a block keeps the field names browser clients already read
/// (`index`, `timestamp`, `previousHash`, `hash`); the Rust names are
/// accepted on import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "index", alias = "position")]
    pub(crate) position: u64,
    #[serde(rename = "timestamp", alias = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) payload: Payload,
    #[serde(rename = "previousHash", alias = "previousDigest")]
    pub(crate) previous_digest: Digest,
    #[serde(rename = "hash", alias = "digest")]
    pub(crate) digest: Digest,
}

/// Hashed view of a block. Field order here is the canonical encoding order.
#[derive(Serialize)]
struct CanonicalBlock<'a> {
    position: u64,
    created_at: String,
    payload: &'a Payload,
    previous_digest: &'a Digest,
}

impl Block {
    /// Build a block and freeze its digest.
    ///
    /// Fails with [`LedgerError::Serialization`] if `payload` has no
    /// canonical encoding.
    pub fn new(
        position: u64,
        created_at: DateTime<Utc>,
        payload: Payload,
        previous_digest: Digest,
    ) -> Result<Self, LedgerError> {
        let digest = compute_digest(position, &created_at, &payload, &previous_digest)?;
        Ok(Self {
            position,
            created_at,
            payload,
            previous_digest,
            digest,
        })
    }

    /// Genesis block carrying the plain marker payload.
    pub fn genesis(created_at: DateTime<Utc>, note: Option<String>) -> Self {
        let payload = Payload::Genesis { note };
        let digest = compute_digest(0, &created_at, &payload, &GENESIS_PREVIOUS_DIGEST)
            .expect("genesis marker holds no floats and always encodes");
        Self {
            position: 0,
            created_at,
            payload,
            previous_digest: GENESIS_PREVIOUS_DIGEST,
            digest,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn previous_digest(&self) -> Digest {
        self.previous_digest
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn is_genesis(&self) -> bool {
        self.position == 0
    }

    /// Digest of the block's current field values, ignoring the stored one.
    pub fn recompute_digest(&self) -> Result<Digest, LedgerError> {
        compute_digest(
            self.position,
            &self.created_at,
            &self.payload,
            &self.previous_digest,
        )
    }
}

/// Digest over the canonical serialization of the four hashed fields.
pub fn compute_digest(
    position: u64,
    created_at: &DateTime<Utc>,
    payload: &Payload,
    previous_digest: &Digest,
) -> Result<Digest, LedgerError> {
    let canonical = CanonicalBlock {
        position,
        created_at: created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        payload,
        previous_digest,
    };
    ContentHasher::BLOCK
        .hash_json(&canonical)
        .map_err(|HasherError::Serialization(reason)| LedgerError::Serialization(reason))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use vitalchain_types::DiagnosticRecord;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 123_456_789).unwrap()
    }

    fn record(subject: &str, confidence: f64) -> Payload {
        Payload::from(DiagnosticRecord::new(subject, "retinopathy", confidence))
    }

    fn sample() -> Block {
        Block::new(3, at(0), record("A", 0.8), Digest::from_hash([9; 32])).unwrap()
    }

    #[test]
    fn identical_fields_yield_identical_digests() {
        let a = sample();
        let b = sample();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a, b);
    }

    #[test]
    fn position_is_bound() {
        let other = Block::new(4, at(0), record("A", 0.8), Digest::from_hash([9; 32])).unwrap();
        assert_ne!(sample().digest(), other.digest());
    }

    #[test]
    fn created_at_is_bound_to_the_nanosecond() {
        let shifted = at(0) + Duration::nanoseconds(1);
        let other = Block::new(3, shifted, record("A", 0.8), Digest::from_hash([9; 32])).unwrap();
        assert_ne!(sample().digest(), other.digest());
    }

    #[test]
    fn payload_is_bound() {
        let base = sample().digest();
        let subject = Block::new(3, at(0), record("B", 0.8), Digest::from_hash([9; 32])).unwrap();
        let confidence =
            Block::new(3, at(0), record("A", 0.81), Digest::from_hash([9; 32])).unwrap();
        let metadata = Block::new(
            3,
            at(0),
            Payload::from(DiagnosticRecord::new("A", "retinopathy", 0.8).with_metadata("k", "v")),
            Digest::from_hash([9; 32]),
        )
        .unwrap();
        assert_ne!(base, subject.digest());
        assert_ne!(base, confidence.digest());
        assert_ne!(base, metadata.digest());
    }

    #[test]
    fn signed_zero_confidence_yields_one_digest() {
        let positive = Block::new(1, at(0), record("A", 0.0), Digest::zero()).unwrap();
        let negative = Block::new(1, at(0), record("A", -0.0), Digest::zero()).unwrap();
        assert_eq!(positive.payload(), negative.payload());
        assert_eq!(positive.digest(), negative.digest());
    }

    #[test]
    fn previous_digest_is_bound() {
        let other = Block::new(3, at(0), record("A", 0.8), Digest::from_hash([8; 32])).unwrap();
        assert_ne!(sample().digest(), other.digest());
    }

    #[test]
    fn recompute_matches_stored_digest() {
        let block = sample();
        assert_eq!(block.recompute_digest().unwrap(), block.digest());
    }

    #[test]
    fn non_finite_confidence_fails_construction() {
        let err = Block::new(1, at(0), record("A", f64::NAN), Digest::zero()).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
    }

    #[test]
    fn json_uses_client_field_names_and_hex_digests() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["previousHash"], "09".repeat(32));
        assert_eq!(json["hash"], sample().digest().to_hex());
        assert_eq!(json["payload"]["kind"], "diagnostic");
        assert!(json["timestamp"].is_string());
        assert!(json.get("position").is_none());
    }

    #[test]
    fn rust_field_names_are_accepted_on_import() {
        let block = sample();
        let json = serde_json::json!({
            "position": block.position(),
            "createdAt": block.created_at(),
            "payload": block.payload(),
            "previousDigest": block.previous_digest(),
            "digest": block.digest(),
        });
        let imported: Block = serde_json::from_value(json).unwrap();
        assert_eq!(imported, block);
    }

    #[test]
    fn exported_block_still_verifies_after_reimport() {
        let block = sample();
        let json = serde_json::to_string(&block).unwrap();
        let imported: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(imported, block);
        assert_eq!(imported.recompute_digest().unwrap(), block.digest());
    }

    #[test]
    fn genesis_position_is_zero() {
        let genesis = Block::new(0, at(0), Payload::genesis(), GENESIS_PREVIOUS_DIGEST).unwrap();
        assert!(genesis.is_genesis());
        assert!(genesis.previous_digest().is_zero());
        assert!(!sample().is_genesis());
    }

    #[test]
    fn genesis_constructor_matches_general_construction() {
        let note = Some("node-1".to_string());
        let direct = Block::genesis(at(0), note.clone());
        let general =
            Block::new(0, at(0), Payload::Genesis { note }, GENESIS_PREVIOUS_DIGEST).unwrap();
        assert_eq!(direct, general);
        assert_eq!(direct.recompute_digest().unwrap(), direct.digest());
    }
}
