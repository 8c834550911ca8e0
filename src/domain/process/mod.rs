//! Process tracking domain: one record per background workflow run

mod entity;
mod error;
pub mod repository;

pub use entity::{
    cleanup_cutoff, validate_process_id, ProcessId, ProcessRecord, ProcessStats, ProcessStatus,
    PROCESS_ID_PREFIX,
};
pub use error::ProcessError;
pub use repository::ProcessRepository;

#[cfg(test)]
pub use repository::MockProcessRepository;
