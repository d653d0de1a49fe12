//! Outcome of a mesh load.

use std::fmt;

/// Status reported for every mesh load, from the fetch layer or the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    /// The mesh was fetched and decoded (or the request was the empty "no asset" uri).
    Ok,
    /// The fetch layer reported that the resource does not exist.
    NotFound,
    /// The payload was empty or not valid OBJ.
    InvalidData,
    /// Any other fetch failure, including unhandled cache revalidation.
    UnknownError,
}

impl LoadStatus {
    pub fn is_ok(self) -> bool {
        self == LoadStatus::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadStatus::Ok => "ok",
            LoadStatus::NotFound => "not-found",
            LoadStatus::InvalidData => "invalid-data",
            LoadStatus::UnknownError => "unknown-error",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
