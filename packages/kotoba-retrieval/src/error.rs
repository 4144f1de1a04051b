pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Vector store error: {message}")]
	VectorStore { message: String },
}

impl From<kotoba_providers::Error> for Error {
	fn from(err: kotoba_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<kotoba_store::Error> for Error {
	fn from(err: kotoba_store::Error) -> Self {
		Self::VectorStore { message: err.to_string() }
	}
}
