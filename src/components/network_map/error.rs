/// Failures that stop a graph from being loaded at all.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("graph input is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("vertex with an empty id")]
	EmptyVertexId,
	#[error("edge with an empty endpoint ({source_id} -> {target_id})")]
	EmptyEdgeEndpoint { source_id: String, target_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
