use price_lists::table::render_table;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn pads_text_left_and_numbers_right() {
    let headers = strings(&["template", "rows"]);
    let rows = vec![strings(&["a.xlsx", "2"]), strings(&["longer.xlsx", "120"])];

    let rendered = render_table(&headers, &rows);

    let lines = rendered.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "template     rows",
            "-----------  ----",
            "a.xlsx          2",
            "longer.xlsx   120",
        ]
    );
}

#[test]
fn control_characters_are_flattened_and_trailing_space_trimmed() {
    let headers = strings(&["status", "detail"]);
    let rows = vec![strings(&["failed", "line one\nline two"]), strings(&["ok", ""])];

    let rendered = render_table(&headers, &rows);

    assert!(rendered.contains("failed  line one line two"));
    assert!(rendered.lines().all(|line| !line.ends_with(' ')));
}

#[test]
fn empty_table_still_has_header_and_rule() {
    let rendered = render_table(&strings(&["id"]), &[]);
    assert_eq!(rendered, "id\n---\n");
}
