//! Maps a homework's status code to the human-readable notification text.
//! The sentence template is an external contract; consumers match on it.
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

use crate::practicum::model::Homework;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown or missing field: {0}")]
    UnknownField(String),
}

static HOMEWORK_VERDICTS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "approved",
            "Работа проверена: ревьюеру всё понравилось. Ура!",
        ),
        ("reviewing", "Работа взята на проверку ревьюером."),
        ("rejected", "Работа проверена: у ревьюера есть замечания."),
    ])
});

/// Render the status-change sentence for one homework. Fails when the status
/// code is not in the verdict table or the entry carries no name.
pub fn parse_status(homework: &Homework) -> Result<String, FormatError> {
    let verdict = HOMEWORK_VERDICTS
        .get(homework.status.as_str())
        .ok_or_else(|| FormatError::UnknownField(homework.status.clone()))?;
    let name = homework
        .homework_name
        .as_deref()
        .ok_or_else(|| FormatError::UnknownField("homework_name".to_string()))?;
    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {verdict}"
    ))
}
