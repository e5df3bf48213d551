use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::result::Result;

/// Checksum wrapper around a payload text, exchanged as compact JSON.
///
/// The envelope is what actually goes into the QR symbol when integrity
/// protection is requested; a bare payload string (no JSON) is the valid
/// legacy state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityEnvelope {
    pub data: String,
    pub crc32: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Result of checking a recovered payload against its envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityRecord {
    pub data_valid: bool,
    pub timestamp: Option<i64>,
}

/// Outcome of [`verify_payload`]: either an envelope verdict or the
/// distinguishable legacy case for payloads that were never wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadVerdict {
    Envelope(IntegrityRecord),
    Legacy(String),
}

/// Wraps `data` in an [`IntegrityEnvelope`] serialized as compact JSON,
/// or returns it verbatim when no integrity protection is requested.
pub fn wrap(data: &str, add_integrity: bool) -> Result<String> {
    if !add_integrity {
        return Ok(data.to_owned());
    }

    let envelope = IntegrityEnvelope {
        data: data.to_owned(),
        crc32: crc32fast::hash(data.as_bytes()),
        timestamp: unix_now(),
    };

    Ok(serde_json::to_string(&envelope)?)
}

/// Recomputes the CRC32 over `envelope.data` and compares it to the stored
/// checksum. A mismatch yields `data_valid = false`, never an error.
pub fn verify(envelope: &IntegrityEnvelope) -> IntegrityRecord {
    IntegrityRecord {
        data_valid: crc32fast::hash(envelope.data.as_bytes()) == envelope.crc32,
        timestamp: envelope.timestamp,
    }
}

/// Classifies a decoded payload text.
///
/// Non-JSON input is the legacy format, not a verification failure. JSON
/// that does not form a complete envelope (missing `data` or `crc32`) is
/// an envelope that fails verification.
pub fn verify_payload(raw_text: &str) -> PayloadVerdict {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw_text) else {
        return PayloadVerdict::Legacy(raw_text.to_owned());
    };

    match serde_json::from_value::<IntegrityEnvelope>(value) {
        Ok(envelope) => PayloadVerdict::Envelope(verify(&envelope)),
        Err(_) => PayloadVerdict::Envelope(IntegrityRecord {
            data_valid: false,
            timestamp: None,
        }),
    }
}

fn unix_now() -> Option<i64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_into_compact_json() {
        let json = wrap("hello", true).unwrap();

        assert!(
            json.starts_with("{\"data\":\"hello\",\"crc32\":907060870"),
            "Envelope was not compact or checksum differed: {json}"
        );
        assert!(!json.contains(": "), "Envelope contained extra whitespace");
    }

    #[test]
    fn should_pass_data_through_without_integrity() {
        assert_eq!(wrap("hello", false).unwrap(), "hello");
    }

    #[test]
    fn should_verify_a_valid_envelope() {
        let envelope = IntegrityEnvelope {
            data: "X".into(),
            crc32: crc32fast::hash(b"X"),
            timestamp: Some(1_700_000_000),
        };

        let record = verify(&envelope);
        assert!(record.data_valid);
        assert_eq!(record.timestamp, Some(1_700_000_000));
    }

    #[test]
    fn should_detect_a_corrupted_payload() {
        // checksum of "X", data flipped to "Y"
        let envelope = IntegrityEnvelope {
            data: "Y".into(),
            crc32: crc32fast::hash(b"X"),
            timestamp: None,
        };

        assert!(!verify(&envelope).data_valid);
    }

    #[test]
    fn should_classify_round_tripped_envelope_as_valid() {
        let json = wrap("hello", true).unwrap();

        match verify_payload(&json) {
            PayloadVerdict::Envelope(record) => assert!(record.data_valid),
            other => panic!("Expected an envelope verdict, got {other:?}"),
        }
    }

    #[test]
    fn should_classify_known_envelope_text_as_valid() {
        match verify_payload(r#"{"data":"hello","crc32":907060870}"#) {
            PayloadVerdict::Envelope(record) => {
                assert!(record.data_valid);
                assert_eq!(record.timestamp, None);
            }
            other => panic!("Expected an envelope verdict, got {other:?}"),
        }
    }

    #[test]
    fn should_classify_plain_text_as_legacy() {
        match verify_payload("just a plain watermark") {
            PayloadVerdict::Legacy(text) => assert_eq!(text, "just a plain watermark"),
            other => panic!("Expected legacy verdict, got {other:?}"),
        }
    }

    #[test]
    fn should_fail_verification_for_incomplete_envelope_json() {
        match verify_payload(r#"{"data":"hello"}"#) {
            PayloadVerdict::Envelope(record) => assert!(!record.data_valid),
            other => panic!("Expected an envelope verdict, got {other:?}"),
        }
    }
}
