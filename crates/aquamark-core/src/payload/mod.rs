pub mod envelope;
pub mod qr;

pub use envelope::{verify, verify_payload, wrap, IntegrityEnvelope, IntegrityRecord, PayloadVerdict};
pub use qr::QrOptions;
