pub mod branch_name;
pub mod process_environment;
pub mod remote_name;
pub mod working_directory;
