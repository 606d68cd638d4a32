use json_delta_core::policy::Policy;
use json_delta_core::textdiff::TextDiffConfig;
use json_delta_core::{apply_diff, diff};
use serde_json::json;

#[test]
fn top_level_readme_quickstart() -> Result<(), Box<dyn std::error::Error>> {
    let base = json!({"count": 1});
    let target = json!({"count": 2});
    let cfg = TextDiffConfig::default();

    let op = diff(&base, &target, &Policy::new(), &cfg).expect("base and target differ");
    let patched = apply_diff(&base, &op, &cfg)?;
    assert_eq!(patched, target);
    Ok(())
}
