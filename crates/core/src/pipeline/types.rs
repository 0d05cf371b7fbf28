//! Types for the pipeline module.

use serde::Serialize;
use uuid::Uuid;

/// MIME type attached to every extraction result.
pub const OUTPUT_MIME_TYPE: &str = "audio/mp3";

/// Encoder used for the audio track.
pub const MP3_CODEC: &str = "libmp3lame";

const FIXED_INPUT_NAME: &str = "input.mp4";
const FIXED_OUTPUT_NAME: &str = "output.mp3";

/// One extraction command: workspace names, codec and quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub request_id: Uuid,
    pub input_name: String,
    pub output_name: String,
    pub codec: String,
    pub quality: u8,
}

impl ConversionRequest {
    /// A request using the shared `input.mp4` / `output.mp3` entries.
    pub fn fixed() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            input_name: FIXED_INPUT_NAME.to_string(),
            output_name: FIXED_OUTPUT_NAME.to_string(),
            codec: MP3_CODEC.to_string(),
            quality: 2,
        }
    }

    /// A request whose entries are private to `request_id`.
    pub fn scoped(request_id: Uuid) -> Self {
        Self {
            request_id,
            input_name: format!("{}-{}", request_id, FIXED_INPUT_NAME),
            output_name: format!("{}-{}", request_id, FIXED_OUTPUT_NAME),
            codec: MP3_CODEC.to_string(),
            quality: 2,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Engine argument list: drop video, encode MP3 at the VBR quality.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.input_name.clone(),
            "-vn".to_string(),
            "-acodec".to_string(),
            self.codec.clone(),
            "-q:a".to_string(),
            self.quality.to_string(),
            self.output_name.clone(),
        ]
    }
}

/// Extracted audio ready for delivery.
///
/// Only the pipeline creates these, and only after the engine command
/// succeeded and its output was read back.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    request_id: Uuid,
    bytes: Vec<u8>,
    input_size_bytes: u64,
    duration_ms: u64,
}

impl ConversionResult {
    pub(crate) fn new(request_id: Uuid, bytes: Vec<u8>, input_size_bytes: u64, duration_ms: u64) -> Self {
        Self {
            request_id,
            bytes,
            input_size_bytes,
            duration_ms,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        OUTPUT_MIME_TYPE
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn input_size_bytes(&self) -> u64 {
        self.input_size_bytes
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_request_args() {
        let args = ConversionRequest::fixed().to_args();
        assert_eq!(
            args,
            vec!["-i", "input.mp4", "-vn", "-acodec", "libmp3lame", "-q:a", "2", "output.mp3"]
        );
    }

    #[test]
    fn test_scoped_request_names() {
        let id = Uuid::new_v4();
        let request = ConversionRequest::scoped(id).with_quality(5);

        assert_eq!(request.input_name, format!("{}-input.mp4", id));
        assert_eq!(request.output_name, format!("{}-output.mp3", id));

        let args = request.to_args();
        assert_eq!(args[1], request.input_name);
        assert_eq!(args[6], "5");
        assert_eq!(args.last().unwrap(), &request.output_name);
    }

    #[test]
    fn test_result_accessors() {
        let result = ConversionResult::new(Uuid::nil(), vec![0xFF, 0xFB], 1024, 15);
        assert_eq!(result.mime_type(), "audio/mp3");
        assert_eq!(result.size_bytes(), 2);
        assert_eq!(result.input_size_bytes(), 1024);
        assert_eq!(result.into_bytes(), vec![0xFF, 0xFB]);
    }
}
