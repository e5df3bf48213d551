use thiserror::Error;
use zip::result::ZipError;

#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Represents a container with zero eligible cover images. Aborts the run.
    #[error("No embeddable images found in the container")]
    NoImagesFound,

    /// Represents a mark raster that does not fit the cover image. Fatal for
    /// the affected image only, other images of the run may still succeed.
    #[error(
        "Capacity error: the {mark_width}x{mark_height} mark does not fit the {cover_width}x{cover_height} cover"
    )]
    CapacityError {
        cover_width: u32,
        cover_height: u32,
        mark_width: u32,
        mark_height: u32,
    },

    /// Represents a fidelity comparison between images of different sizes.
    #[error("Dimension mismatch: {width_a}x{height_a} vs {width_b}x{height_b}")]
    DimensionMismatch {
        width_a: u32,
        height_a: u32,
        width_b: u32,
        height_b: u32,
    },

    /// Represents an extraction run where no bit-plane yielded a QR symbol.
    #[error("No QR symbol could be decoded from any extracted bit-plane")]
    DecodingError,

    /// Represents a failure to assemble the output container. Aborts the run.
    #[error("Cannot assemble the output container")]
    ReconstructionError,

    /// Represents container bytes that are not a valid document of the
    /// declared kind.
    #[error("Container bytes do not form a valid {0} document")]
    FormatError(&'static str),

    /// Represents a payload text that exceeds the QR symbol capacity.
    #[error("Payload text does not fit into a QR symbol")]
    EncodingError,

    /// Represents an embedded raster whose bytes cannot be decoded.
    #[error("Image media is invalid")]
    InvalidImageMedia,

    /// Represents a failure when encoding a raster to PNG.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents an error while processing the ZIP package of a DOCX file.
    #[error("Error while processing the document package")]
    PackageError(#[from] ZipError),

    /// Represents an error raised by the PDF object parser.
    #[error("Error while processing the PDF object table")]
    PdfError(#[from] lopdf::Error),

    /// Represents malformed XML inside a DOCX part.
    #[error("Malformed document markup")]
    MarkupError(#[from] quick_xml::Error),

    /// Represents a failure to serialize or parse the integrity envelope.
    #[error("Envelope serialization error")]
    EnvelopeError(#[from] serde_json::Error),

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write the target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("API Error: Missing container bytes")]
    ContainerNotSet,

    #[error("API Error: Missing mark raster")]
    MarkNotSet,

    #[error("API Error: Missing payload text")]
    TextNotSet,
}
