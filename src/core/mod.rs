pub mod error;
pub mod locator;


pub use error::LocateError;
pub use locator::{
    Candidate, LocateRequest, NameFilter, artifact_path, locate, locate_verified,
    normalize_root, scan_candidates, select_latest, validate_segment,
};
