use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::engine::random::RandomSource;
use crate::models::ride::RideId;

const RIDE_ID_BYTES: usize = 16;

/// Mints 128-bit ride ids encoded with the URL-safe base64 alphabet, unpadded.
#[derive(Clone)]
pub struct RideIdGenerator {
    source: Arc<dyn RandomSource>,
}

impl RideIdGenerator {
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    pub fn generate(&self) -> RideId {
        let mut bytes = [0u8; RIDE_ID_BYTES];
        self.source.fill(&mut bytes);
        RideId::new(URL_SAFE_NO_PAD.encode(bytes))
    }
}
