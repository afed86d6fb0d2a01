pub mod scan_report;
pub mod step_result;
pub mod sync_outcome;
pub mod sync_step;
