use std::path::PathBuf;

use serde::Deserialize;

use crate::pipeline::roster::Roster;
use crate::store::SqliteStore;
use crate::survey::SurveyTable;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<SqliteStore>,
    pub roster: Roster,
    pub survey: SurveyTable,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            store: None,
            roster: Roster::new(),
            survey: SurveyTable::new(),
        }
    }
}
