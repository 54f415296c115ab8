use crate::models::CaptureSource;

use super::AcquisitionError;

/// A registry lookup key captured from a credential.
///
/// Scanner output is kept byte-for-byte; manually typed codes are trimmed
/// because surrounding whitespace is an input artifact, not part of the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedPayload {
    value: String,
    source: CaptureSource,
}

impl ScannedPayload {
    /// Validate raw capture output. Blank payloads never enter the pipeline.
    pub fn new(source: CaptureSource, raw: &str) -> Result<Self, AcquisitionError> {
        if raw.trim().is_empty() {
            return Err(AcquisitionError::EmptyPayload);
        }
        let value = match source {
            CaptureSource::Manual => raw.trim().to_string(),
            CaptureSource::Qr | CaptureSource::Pdf417 => raw.to_string(),
        };
        Ok(Self { value, source })
    }

    /// Payload decoded from a QR code.
    pub fn from_qr(raw: &str) -> Result<Self, AcquisitionError> {
        Self::new(CaptureSource::Qr, raw)
    }

    /// Code typed by the user when the credential cannot be scanned.
    pub fn from_manual_entry(raw: &str) -> Result<Self, AcquisitionError> {
        Self::new(CaptureSource::Manual, raw)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_rejected() {
        assert!(matches!(
            ScannedPayload::from_qr(""),
            Err(AcquisitionError::EmptyPayload)
        ));
    }

    #[test]
    fn whitespace_payload_rejected_for_every_source() {
        for source in [CaptureSource::Qr, CaptureSource::Pdf417, CaptureSource::Manual] {
            assert!(matches!(
                ScannedPayload::new(source, " \n\t"),
                Err(AcquisitionError::EmptyPayload)
            ));
        }
    }

    #[test]
    fn scanned_payload_kept_verbatim() {
        let payload = ScannedPayload::new(CaptureSource::Pdf417, " ABC123 ").unwrap();
        assert_eq!(payload.as_str(), " ABC123 ");
        assert_eq!(payload.source(), CaptureSource::Pdf417);
    }

    #[test]
    fn manual_entry_trimmed() {
        let payload = ScannedPayload::from_manual_entry("  ABC123\n").unwrap();
        assert_eq!(payload.as_str(), "ABC123");
        assert_eq!(payload.source(), CaptureSource::Manual);
    }
}
