use serde_json::json;
use trackplot::merge;

#[test]
fn test_custom_values_never_overwritten() {
    let mut custom = json!({
        "width": 100,
        "flag": false,
        "label": null,
        "count": 0
    });
    let defaults = json!({
        "width": 800,
        "flag": true,
        "label": "default",
        "count": 5,
        "extra": 1
    });
    merge(&mut custom, &defaults);

    // Explicit falsy values count as present
    assert_eq!(custom["width"], 100);
    assert_eq!(custom["flag"], false);
    assert_eq!(custom["label"], serde_json::Value::Null);
    assert_eq!(custom["count"], 0);
    // Missing keys are filled from defaults
    assert_eq!(custom["extra"], 1);
}

#[test]
fn test_nested_objects_merge_recursively() {
    let mut custom = json!({ "margin": { "top": 10 } });
    let defaults = json!({ "margin": { "top": 0, "left": 5 }, "width": 800 });
    merge(&mut custom, &defaults);

    assert_eq!(custom["margin"]["top"], 10);
    assert_eq!(custom["margin"]["left"], 5);
    assert_eq!(custom["width"], 800);
}

#[test]
fn test_arrays_replace_wholesale() {
    let mut custom = json!({ "panels": [{ "id": "mine" }] });
    let defaults = json!({ "panels": [{ "id": "a" }, { "id": "b" }], "ticks": [1, 2, 3] });
    merge(&mut custom, &defaults);

    // A custom array fully shadows the default one, no element-wise merge
    let panels = custom["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0]["id"], "mine");
    // A missing array key is copied from defaults
    assert_eq!(custom["ticks"], json!([1, 2, 3]));
}

#[test]
fn test_unknown_keys_pass_through() {
    let mut custom = json!({ "totally_custom": { "a": 1 } });
    let defaults = json!({ "width": 800 });
    merge(&mut custom, &defaults);

    assert_eq!(custom["totally_custom"]["a"], 1);
    assert_eq!(custom["width"], 800);
}

#[test]
fn test_defaults_are_deep_cloned() {
    let mut custom = json!({});
    let defaults = json!({ "margin": { "top": 0 } });
    merge(&mut custom, &defaults);

    custom["margin"]["top"] = json!(99);
    // The default tree is untouched by later edits to the merged copy
    assert_eq!(defaults["margin"]["top"], 0);
}
