use crate::error::WatermarkError;
use crate::media;
use crate::payload::{envelope, qr, QrOptions};
use crate::result::Result;

pub fn prepare() -> GenerateApi {
    GenerateApi::default()
}

/// Builds a QR mark raster for a payload text.
#[derive(Default, Debug)]
pub struct GenerateApi {
    text: Option<String>,
    integrity: bool,
    options: QrOptions,
}

impl GenerateApi {
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Wrap the payload in a CRC32 integrity envelope before encoding.
    pub fn with_integrity(mut self, integrity: bool) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn with_qr_options(mut self, options: QrOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the rendered mark as PNG bytes.
    pub fn execute(self) -> Result<Vec<u8>> {
        let Some(text) = self.text else {
            return Err(WatermarkError::TextNotSet);
        };

        let payload = envelope::wrap(&text, self.integrity)?;
        let raster = qr::render(&payload, &self.options)?;
        media::encode_gray_png(&raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{verify_payload, PayloadVerdict};

    #[test]
    fn should_render_a_decodable_integrity_mark() {
        let png = prepare()
            .with_text("document-42")
            .with_integrity(true)
            .execute()
            .unwrap();

        let raster = image::load_from_memory(&png).unwrap().to_luma8();
        let texts = qr::decode(&raster);
        assert_eq!(texts.len(), 1);

        match verify_payload(&texts[0]) {
            PayloadVerdict::Envelope(record) => assert!(record.data_valid),
            other => panic!("Expected an envelope verdict, got {other:?}"),
        }
    }

    #[test]
    fn should_render_plain_payloads_verbatim() {
        let png = prepare().with_text("plain").execute().unwrap();

        let raster = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(qr::decode(&raster), vec!["plain".to_string()]);
    }

    #[test]
    fn should_require_a_text() {
        match prepare().execute() {
            Err(WatermarkError::TextNotSet) => (),
            other => panic!("Expected TextNotSet, got {other:?}"),
        }
    }
}
