//! Error types for occupancy classification.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a [`SpatialQueryService`](crate::query::SpatialQueryService).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueryError {
  /// The service cannot answer queries (e.g. the scene has not been built yet).
  #[error("spatial query service unavailable: {reason}")]
  Unavailable { reason: String },

  /// The service holds a collider it cannot measure against the query shape.
  #[error("unsupported collider shape {shape} for {query} query")]
  UnsupportedShape { shape: String, query: &'static str },
}

impl QueryError {
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable {
      reason: reason.into(),
    }
  }

  pub fn unsupported(shape: impl Into<String>, query: &'static str) -> Self {
    Self::UnsupportedShape {
      shape: shape.into(),
      query,
    }
  }
}

/// Errors surfaced by grid construction, configuration and update cycles.
#[derive(Debug, Error)]
pub enum OccupancyError {
  /// A query failed mid-cycle. The store keeps its previous snapshot.
  #[error("classification cycle aborted: {0}")]
  QueryServiceUnavailable(#[from] QueryError),

  /// Non-positive cell count or cell size, or an unusable tuning parameter.
  #[error("invalid grid specification: {0}")]
  InvalidGridSpecification(String),

  #[error("failed to read config file {path}: {source}")]
  ConfigIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  ConfigParse(#[from] toml::de::Error),
}

impl OccupancyError {
  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidGridSpecification(msg.into())
  }

  /// True when the error aborted a single cycle rather than startup.
  pub fn is_cycle_failure(&self) -> bool {
    matches!(self, Self::QueryServiceUnavailable(_))
  }
}
