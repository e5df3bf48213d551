use crate::container::ContainerKind;
use crate::error::WatermarkError;
use crate::pipeline::{self, RecoveredMark, RunConfig};
use crate::result::Result;

pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

/// Recovers mark rasters from a possibly-reprocessed container.
#[derive(Default, Debug)]
pub struct ExtractApi {
    container: Option<(Vec<u8>, ContainerKind)>,
    config: RunConfig,
}

impl ExtractApi {
    pub fn with_container(mut self, bytes: Vec<u8>, kind: ContainerKind) -> Self {
        self.container = Some((bytes, kind));
        self
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// One entry per cover image that yielded a decodable symbol.
    pub fn execute(self) -> Result<Vec<RecoveredMark>> {
        let Some((bytes, kind)) = self.container else {
            return Err(WatermarkError::ContainerNotSet);
        };

        pipeline::extract_run(bytes, kind, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_require_a_container() {
        match prepare().execute() {
            Err(WatermarkError::ContainerNotSet) => (),
            other => panic!("Expected ContainerNotSet, got {other:?}"),
        }
    }
}
