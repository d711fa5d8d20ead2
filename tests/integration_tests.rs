use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// Run groupplot with the given arguments, feeding `stdin` as CSV input
fn run_groupplot(args: &[&str], stdin: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_groupplot"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut handle) = child.stdin.take() {
        handle
            .write_all(stdin.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn results_csv() -> String {
    fs::read_to_string("test/results.csv").expect("Failed to read test CSV")
}

#[test]
fn test_end_to_end_grouped_by_label() {
    let result = run_groupplot(&["-c", "Area, Mean", "-g", "Label"], &results_csv());
    let png_bytes = result.expect("grouped boxplot should render");
    assert!(is_valid_png(&png_bytes), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_single_series() {
    let result = run_groupplot(&["--categories", "Area"], &results_csv());
    let png_bytes = result.expect("single series boxplot should render");
    assert!(is_valid_png(&png_bytes));
}

#[test]
fn test_end_to_end_group_by_named_column() {
    let result = run_groupplot(&["-c", "Area", "-g", "Dose"], &results_csv());
    assert!(is_valid_png(&result.expect("grouping by Dose should render")));
}

#[test]
fn test_end_to_end_svg_output() {
    let result = run_groupplot(&["-c", "Area", "-g", "Label", "-f", "svg"], &results_csv());
    let svg = String::from_utf8(result.expect("svg should render")).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_end_to_end_config_file() {
    let result = run_groupplot(
        &["-c", "Area", "-g", "Label", "--config", "test/options.json"],
        &results_csv(),
    );
    let svg = String::from_utf8(result.expect("config file should be honored")).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("640"));
}

#[test]
fn test_end_to_end_tab_delimited_input_file() {
    let result = run_groupplot(&["-c", "Area,Mean", "-g", "Label", "-i", "test/results.xls"], "");
    assert!(is_valid_png(&result.expect("tab-delimited table should load")));
}

#[test]
fn test_end_to_end_json_input_file() {
    let result = run_groupplot(&["-c", "Area, Mean", "-g", "Label", "-i", "test/results.json"], "");
    assert!(is_valid_png(&result.expect("json table should load")));
}

#[test]
fn test_end_to_end_output_file() {
    let dir = std::env::temp_dir().join(format!("groupplot-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let out = dir.join("chart.svg");

    let result = run_groupplot(
        &["-c", "Mean", "-g", "Label", "-o", out.to_str().unwrap()],
        &results_csv(),
    );
    assert!(result.expect("should write output file").is_empty());
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_end_to_end_nothing_to_plot() {
    let result = run_groupplot(&["-g", "Label"], &results_csv());
    let err = result.expect_err("empty selection must not produce a chart");
    assert!(err.contains("nothing to plot"));
}

#[test]
fn test_end_to_end_unknown_group_column() {
    let result = run_groupplot(&["-c", "Area", "-g", "Condition"], &results_csv());
    let err = result.expect_err("unknown group-by column must be reported");
    assert!(err.contains("Condition"));
}

#[test]
fn test_end_to_end_unknown_category() {
    let result = run_groupplot(&["-c", "Area, Perimeter"], &results_csv());
    let err = result.expect_err("unknown category must be reported");
    assert!(err.contains("Perimeter"));
}

#[test]
fn test_end_to_end_invalid_column_list() {
    let result = run_groupplot(&["-c", "Area,"], &results_csv());
    assert!(result.is_err());
}

#[test]
fn test_end_to_end_no_numeric_values() {
    let csv = "Label,A\ng1,x\ng2,y\n";
    let result = run_groupplot(&["-c", "A", "-g", "Label"], csv);
    let err = result.expect_err("all-NaN selection has nothing to draw");
    assert!(err.contains("no numeric values"));
}

#[test]
fn test_end_to_end_unsupported_output_extension() {
    let result = run_groupplot(&["-c", "Area", "-o", "chart.jpg"], &results_csv());
    let err = result.expect_err("unknown output extension must be reported");
    assert!(err.contains(".jpg"));
    assert!(!std::path::Path::new("chart.jpg").exists());
}

#[test]
fn test_end_to_end_zero_width_rejected() {
    let result = run_groupplot(&["-c", "Area", "--width", "0"], &results_csv());
    let err = result.expect_err("zero-width canvas must be rejected");
    assert!(err.contains("non-zero"));
}

#[test]
fn test_end_to_end_label_choice_with_implicit_label_column() {
    let csv = "Name,Area\nroi1,1.5\nroi2,2.5\nroi1,3.0\n";
    let result = run_groupplot(&["-c", "Area", "-g", "Label"], csv);
    assert!(is_valid_png(&result.expect("implicit label column should group")));
}
