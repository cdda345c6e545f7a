use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::survey::SurveyResponse;
use serde_json::json;
use uuid::Uuid;

fn handle_students_seed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    let Some(items) = req.params.get("students").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing params.students", None);
    };

    let mut inserted = 0usize;
    for (i, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            return err(
                &req.id,
                "bad_params",
                format!("students[{}]: not an object", i),
                None,
            );
        };
        let mut obj = obj.clone();
        if !obj.get("id").map(|v| v.is_string()).unwrap_or(false) {
            obj.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        }
        let student: Student = match serde_json::from_value(serde_json::Value::Object(obj)) {
            Ok(s) => s,
            Err(e) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("students[{}]: {}", i, e),
                    None,
                )
            }
        };
        if let Err(e) = store.insert_student(&student) {
            return err(&req.id, e.code(), e.to_string(), None);
        }
        inserted += 1;
    }
    ok(&req.id, json!({ "inserted": inserted }))
}

fn handle_surveys_seed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    let Some(form_id) = req.params.get("formId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.formId", None);
    };
    let Some(items) = req.params.get("responses").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing params.responses", None);
    };

    let mut inserted = 0usize;
    for (i, item) in items.iter().enumerate() {
        let response: SurveyResponse = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("responses[{}]: {}", i, e),
                    None,
                )
            }
        };
        if let Err(e) = store.insert_survey_response(form_id, &response) {
            return err(&req.id, e.code(), e.to_string(), None);
        }
        inserted += 1;
    }
    ok(&req.id, json!({ "inserted": inserted }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.seed" => Some(handle_students_seed(state, req)),
        "surveys.seed" => Some(handle_surveys_seed(state, req)),
        _ => None,
    }
}
