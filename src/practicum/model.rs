use serde::Deserialize;

/// One poll's worth of server state. Transient: owned by the fetch/validate
/// pipeline for a single cycle and never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    pub homeworks: Vec<Homework>,
    #[serde(default)]
    pub current_date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Homework {
    #[serde(default)]
    pub homework_name: Option<String>,
    pub status: String,
}
