use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::survey::SurveyFilterField;
use serde_json::json;

fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

fn handle_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    let Some(form_id) = str_param(req, "formId") else {
        return err(&req.id, "bad_params", "missing params.formId", None);
    };
    match store.query_survey_responses(form_id) {
        Ok(responses) => {
            let total = responses.len();
            state.survey.load(form_id, responses);
            ok(&req.id, json!({ "formId": form_id, "totalResponses": total }))
        }
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

fn handle_set_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(field) = str_param(req, "field") else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    let Some(value) = str_param(req, "value") else {
        return err(&req.id, "bad_params", "missing params.value", None);
    };
    if SurveyFilterField::parse(field).is_none() {
        return err(
            &req.id,
            "bad_params",
            format!("unknown filter field: {}", field),
            None,
        );
    }
    state.survey.set_filter(field, value);
    ok(&req.id, json!({}))
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(text) = str_param(req, "text") else {
        return err(&req.id, "bad_params", "missing params.text", None);
    };
    state.survey.set_search(text);
    ok(&req.id, json!({}))
}

fn handle_clear_filters(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.survey.clear_filters();
    ok(&req.id, json!({}))
}

fn handle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(field) = str_param(req, "field") else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    if !state.survey.request_sort(field) {
        return err(
            &req.id,
            "bad_params",
            format!("unknown sort field: {}", field),
            None,
        );
    }
    let icon = state.survey.sort_icon(field).unwrap_or("∣");
    ok(&req.id, json!({ "icon": icon }))
}

fn handle_load_more(state: &mut AppState, req: &Request) -> serde_json::Value {
    let advanced = state.survey.load_more();
    ok(&req.id, json!({ "advanced": advanced }))
}

fn handle_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    match serde_json::to_value(state.survey.snapshot()) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "survey.configure" => Some(handle_configure(state, req)),
        "survey.setFilter" => Some(handle_set_filter(state, req)),
        "survey.search" => Some(handle_search(state, req)),
        "survey.clearFilters" => Some(handle_clear_filters(state, req)),
        "survey.sort" => Some(handle_sort(state, req)),
        "survey.loadMore" => Some(handle_load_more(state, req)),
        "survey.snapshot" => Some(handle_snapshot(state, req)),
        _ => None,
    }
}
