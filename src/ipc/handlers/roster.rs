use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{PaymentStatus, Std};
use crate::pipeline::fetch::FetchOutcome;
use crate::pipeline::filter::FilterField;
use crate::pipeline::sort::SortField;
use serde_json::json;

fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

fn handle_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(institute_id) = str_param(req, "instituteId") else {
        return err(&req.id, "bad_params", "missing params.instituteId", None);
    };
    let Some(std_raw) = str_param(req, "std") else {
        return err(&req.id, "bad_params", "missing params.std", None);
    };
    let Some(std) = Std::parse(std_raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown std: {}", std_raw),
            None,
        );
    };
    state.roster.configure(institute_id, std);
    ok(
        &req.id,
        json!({ "instituteId": institute_id, "std": std.as_str() }),
    )
}

fn handle_fetch_next(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    match state.roster.fetch_next(store) {
        FetchOutcome::Merged { added, more_remote } => ok(
            &req.id,
            json!({ "outcome": "merged", "added": added, "moreRemote": more_remote }),
        ),
        FetchOutcome::Skipped => ok(&req.id, json!({ "outcome": "skipped" })),
        FetchOutcome::Stale => ok(&req.id, json!({ "outcome": "stale" })),
        FetchOutcome::Failed(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

fn handle_set_filter(state: &mut AppState, req: &Request, toggle: bool) -> serde_json::Value {
    let Some(field) = str_param(req, "field") else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    let Some(value) = str_param(req, "value") else {
        return err(&req.id, "bad_params", "missing params.value", None);
    };
    if FilterField::parse(field).is_none() {
        return err(
            &req.id,
            "bad_params",
            format!("unknown filter field: {}", field),
            None,
        );
    }
    // A recognized field with an unusable value stays a no-op rather than an
    // error, mirroring the in-process pipeline behavior.
    let applied = if toggle {
        state.roster.toggle_filter(field, value)
    } else {
        state.roster.set_filter(field, value)
    };
    ok(&req.id, json!({ "applied": applied }))
}

fn handle_clear_filters(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.roster.clear_filters();
    ok(&req.id, json!({}))
}

fn handle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(field) = str_param(req, "field") else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    if !state.roster.request_sort(field) {
        return err(
            &req.id,
            "bad_params",
            format!("unknown sort field: {}", field),
            None,
        );
    }
    ok(&req.id, json!({}))
}

fn handle_sort_icon(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(field) = str_param(req, "field") else {
        return err(&req.id, "bad_params", "missing params.field", None);
    };
    if SortField::parse(field).is_none() {
        return err(
            &req.id,
            "bad_params",
            format!("unknown sort field: {}", field),
            None,
        );
    }
    let icon = state.roster.sort_icon(field).unwrap_or("");
    ok(&req.id, json!({ "icon": icon }))
}

fn handle_reveal_more(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.roster.reveal_more();
    ok(&req.id, json!({}))
}

fn handle_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    match serde_json::to_value(state.roster.snapshot()) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn handle_update_payment_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    let Some(student_id) = str_param(req, "studentId") else {
        return err(&req.id, "bad_params", "missing params.studentId", None);
    };
    let Some(status_raw) = str_param(req, "paymentStatus") else {
        return err(&req.id, "bad_params", "missing params.paymentStatus", None);
    };
    let Some(status) = PaymentStatus::parse(status_raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown payment status: {}", status_raw),
            None,
        );
    };
    match state.roster.update_payment_status(store, student_id, status) {
        Ok(()) => ok(
            &req.id,
            json!({ "studentId": student_id, "paymentStatus": status.as_str() }),
        ),
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.configure" => Some(handle_configure(state, req)),
        "roster.fetchNext" => Some(handle_fetch_next(state, req)),
        "roster.setFilter" => Some(handle_set_filter(state, req, false)),
        "roster.toggleFilter" => Some(handle_set_filter(state, req, true)),
        "roster.clearFilters" => Some(handle_clear_filters(state, req)),
        "roster.sort" => Some(handle_sort(state, req)),
        "roster.sortIcon" => Some(handle_sort_icon(state, req)),
        "roster.revealMore" => Some(handle_reveal_more(state, req)),
        "roster.snapshot" => Some(handle_snapshot(state, req)),
        "roster.updatePaymentStatus" => Some(handle_update_payment_status(state, req)),
        _ => None,
    }
}
