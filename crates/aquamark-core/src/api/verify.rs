use crate::payload::{envelope, PayloadVerdict};

/// Classifies a decoded QR text: envelope with a CRC verdict, or the
/// legacy bare-payload format.
pub fn verify_integrity(decoded_text: &str) -> PayloadVerdict {
    envelope::verify_payload(decoded_text)
}
