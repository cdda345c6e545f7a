mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

fn response_json(i: usize, age_group: &str, religion: Option<&str>) -> serde_json::Value {
    let mut r = json!({
        "respondentId": format!("R{:03}", i),
        "name": format!("Respondent {:03}", i),
        "email": format!("r{:03}@survey.test", i),
        "ageGroup": age_group,
        "schoolType": "CBSE",
        "surveyCompletedAt": format!("2026-03-{:02}T10:00:00Z", (i % 28) + 1)
    });
    if let Some(religion) = religion {
        r["religion"] = json!(religion);
    }
    r
}

#[test]
fn survey_load_filter_search_and_page_growth() {
    let workspace = temp_dir("rosterd-survey-flow");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let responses: Vec<_> = (0..53)
        .map(|i| {
            response_json(
                i,
                if i % 2 == 0 { "AgeGroup.8to12" } else { "AgeGroup.13to17" },
                if i % 3 == 0 { Some("Hindu") } else { None },
            )
        })
        .collect();
    let seeded = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "surveys.seed",
        json!({ "formId": "form-1", "responses": responses }),
    );
    assert_eq!(seeded.get("inserted").and_then(|v| v.as_u64()), Some(53));

    let configured = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "survey.configure",
        json!({ "formId": "form-1" }),
    );
    assert_eq!(
        configured.get("totalResponses").and_then(|v| v.as_u64()),
        Some(53)
    );

    let snap = request_ok(&mut stdin, &mut reader, "4", "survey.snapshot", json!({}));
    assert_eq!(snap.get("totalResponses").and_then(|v| v.as_u64()), Some(53));
    assert_eq!(
        snap.get("rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(20)
    );
    assert_eq!(snap.get("hasMore").and_then(|v| v.as_bool()), Some(true));

    let more = request_ok(&mut stdin, &mut reader, "5", "survey.loadMore", json!({}));
    assert_eq!(more.get("advanced").and_then(|v| v.as_bool()), Some(true));
    let snap = request_ok(&mut stdin, &mut reader, "6", "survey.snapshot", json!({}));
    assert_eq!(
        snap.get("rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(40)
    );
    assert_eq!(snap.get("currentPage").and_then(|v| v.as_u64()), Some(2));

    // Changing a filter collapses back to page one.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "survey.setFilter",
        json!({ "field": "ageGroup", "value": "AgeGroup.8to12" }),
    );
    let snap = request_ok(&mut stdin, &mut reader, "8", "survey.snapshot", json!({}));
    assert_eq!(snap.get("currentPage").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(snap.get("totalFiltered").and_then(|v| v.as_u64()), Some(27));
    assert_eq!(
        snap.get("hasActiveFilters").and_then(|v| v.as_bool()),
        Some(true)
    );

    // Comma-separated selection widens it to an OR.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "survey.setFilter",
        json!({ "field": "ageGroup", "value": "AgeGroup.8to12,AgeGroup.13to17" }),
    );
    let snap = request_ok(&mut stdin, &mut reader, "10", "survey.snapshot", json!({}));
    assert_eq!(snap.get("totalFiltered").and_then(|v| v.as_u64()), Some(53));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "survey.search",
        json!({ "text": "r00" }),
    );
    let snap = request_ok(&mut stdin, &mut reader, "12", "survey.snapshot", json!({}));
    assert_eq!(snap.get("totalFiltered").and_then(|v| v.as_u64()), Some(10));

    let _ = request_ok(&mut stdin, &mut reader, "13", "survey.clearFilters", json!({}));
    let snap = request_ok(&mut stdin, &mut reader, "14", "survey.snapshot", json!({}));
    assert_eq!(snap.get("totalFiltered").and_then(|v| v.as_u64()), Some(53));
}

#[test]
fn survey_sort_toggles_between_two_directions() {
    let workspace = temp_dir("rosterd-survey-sort");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let responses = vec![
        response_json(2, "AgeGroup.8to12", Some("Hindu")),
        response_json(0, "AgeGroup.8to12", None),
        response_json(1, "AgeGroup.8to12", Some("Christian")),
    ];
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "surveys.seed",
        json!({ "formId": "form-2", "responses": responses }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "survey.configure",
        json!({ "formId": "form-2" }),
    );

    let sorted = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "survey.sort",
        json!({ "field": "religion" }),
    );
    assert_eq!(sorted.get("icon").and_then(|v| v.as_str()), Some("▲"));
    let snap = request_ok(&mut stdin, &mut reader, "5", "survey.snapshot", json!({}));
    // Ascending by value, respondents without the field trailing.
    assert_eq!(
        snap.pointer("/rows/0/respondentId").and_then(|v| v.as_str()),
        Some("R001")
    );
    assert_eq!(
        snap.pointer("/rows/2/respondentId").and_then(|v| v.as_str()),
        Some("R000")
    );

    let sorted = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "survey.sort",
        json!({ "field": "religion" }),
    );
    assert_eq!(sorted.get("icon").and_then(|v| v.as_str()), Some("▼"));
    let snap = request_ok(&mut stdin, &mut reader, "7", "survey.snapshot", json!({}));
    assert_eq!(
        snap.pointer("/rows/0/respondentId").and_then(|v| v.as_str()),
        Some("R002")
    );

    let error = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "survey.sort",
        json!({ "field": "shoeSize" }),
    );
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("bad_params")
    );
}
