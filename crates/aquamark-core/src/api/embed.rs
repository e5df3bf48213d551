use crate::container::ContainerKind;
use crate::error::WatermarkError;
use crate::pipeline::{self, EmbedOutcome, RunConfig};
use crate::result::Result;

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

/// Embeds a mark raster into every cover image of a container.
#[derive(Default, Debug)]
pub struct EmbedApi {
    container: Option<(Vec<u8>, ContainerKind)>,
    mark: Option<Vec<u8>>,
    config: RunConfig,
}

impl EmbedApi {
    pub fn with_container(mut self, bytes: Vec<u8>, kind: ContainerKind) -> Self {
        self.container = Some((bytes, kind));
        self
    }

    /// The mark raster as encoded image bytes (typically the PNG produced
    /// by [`crate::api::generate`]).
    pub fn with_mark(mut self, bytes: Vec<u8>) -> Self {
        self.mark = Some(bytes);
        self
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn execute(self) -> Result<EmbedOutcome> {
        let Some((bytes, kind)) = self.container else {
            return Err(WatermarkError::ContainerNotSet);
        };
        let Some(mark_bytes) = self.mark else {
            return Err(WatermarkError::MarkNotSet);
        };

        let mark = image::load_from_memory(&mark_bytes)
            .map_err(|_| WatermarkError::InvalidImageMedia)?
            .to_luma8();

        pipeline::embed_run(bytes, kind, &mark, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_require_container_and_mark() {
        match prepare().execute() {
            Err(WatermarkError::ContainerNotSet) => (),
            other => panic!("Expected ContainerNotSet, got {other:?}"),
        }

        match prepare()
            .with_container(Vec::new(), ContainerKind::Pdf)
            .execute()
        {
            Err(WatermarkError::MarkNotSet) => (),
            other => panic!("Expected MarkNotSet, got {other:?}"),
        }
    }
}
