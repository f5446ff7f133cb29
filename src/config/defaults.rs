use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_state_dir() -> PathBuf {
    PathBuf::from(".caseflow")
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

pub fn default_timeout_sec() -> u64 {
    120
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    500
}
