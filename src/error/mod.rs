#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Empty data source: no batch is available after a restart")]
    EmptyDataSource,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record error: {0}")]
    Record(#[from] burn::record::RecorderError),
}
