use std::fs;
use std::path::Path;

use fipimark::pipeline::normalize_fragment;
use fipimark::{NormalizerConfig, TaskRecord, normalize_batch, normalize_task};

use snapshot_assertions::assert_markdown_snapshot;

fn markdown(html: &str, category: Option<u32>) -> String {
    normalize_fragment(html, category, &NormalizerConfig::default()).markdown
}

#[test]
fn test_empty_bold_and_cell_wrapper_disappear() {
    let fragment = normalize_fragment(
        "<td><b></b><p>Hello</p></td>",
        None,
        &NormalizerConfig::default(),
    );
    assert_eq!(fragment.cleaned_html, "<p>Hello</p>");
    assert_eq!(fragment.markdown, "Hello\n");
}

#[test]
fn test_subscript_becomes_tex() {
    assert_eq!(markdown("<p>111<sub>10</sub></p>", None), "$111_{10}$\n");
}

#[test]
fn test_equalities_fold_into_one_formula() {
    assert_eq!(
        markdown("<p>11<sub>10</sub> = 102<sub>3</sub></p>", None),
        "$11_{10} = 102_{3}$\n"
    );
    assert_eq!(
        markdown("<p>12 = 1100<sub>2</sub></p>", None),
        "$12 = 1100_{2}$\n"
    );
}

#[test]
fn test_lettered_items_hang_under_numbered_item() {
    let md = markdown(
        "<p>2. Выберите один вариант:</p><p>а) первый</p><p>б) второй</p>",
        None,
    );
    assert_eq!(
        md,
        "2. Выберите один вариант:\n\n   а) первый\n\n   б) второй\n"
    );
}

#[test]
fn test_picture_script_becomes_image() {
    let fragment = normalize_fragment(
        "<td><p>Рисунок:</p><script>ShowPictureQ('09DBE5.gif')</script></td>",
        None,
        &NormalizerConfig::default(),
    );
    assert_eq!(
        fragment.cleaned_html,
        r#"<p>Рисунок:</p><img alt="" src="assets/09DBE5.gif">"#
    );
    assert!(!fragment.cleaned_html.contains("script"));
    assert_eq!(fragment.markdown, "Рисунок:\n\n![](assets/09DBE5.gif)\n");
    assert_eq!(fragment.stats.script_images, 1);
}

#[test]
fn test_fenced_code_keeps_bare_integers() {
    let md = markdown(
        "<p>Найдите 5 чисел.</p><pre>for i in range(10):\n    print(i)</pre>",
        Some(5),
    );
    assert_eq!(
        md,
        "Найдите $5$ чисел.\n\n```\nfor i in range(10):\n    print(i)\n```\n"
    );
}

#[test]
fn test_normalizing_twice_changes_nothing_more() {
    let config = NormalizerConfig::default();
    let html = fs::read_to_string("tests/fixtures/task_with_attachment.html").unwrap();

    let first = normalize_fragment(&html, Some(5), &config);
    let second = normalize_fragment(&first.cleaned_html, Some(5), &config);

    assert_eq!(second.cleaned_html, first.cleaned_html);
    assert!(second.stats.is_empty());
}

#[test]
fn test_task_with_attachment_snapshot() {
    let html = fs::read_to_string("tests/fixtures/task_with_attachment.html").unwrap();
    let mut record = TaskRecord::new("5A1C", &html);
    record.task_number = Some(5);
    record.kes = vec![
        "1.4 Системы счисления".to_string(),
        "1.4 Системы счисления".to_string(),
    ];

    let fragment = normalize_task(&record, &NormalizerConfig::default());

    assert!(fragment.requires_attachment);
    assert_eq!(fragment.stats.notice_rows_removed, 1);
    assert_eq!(fragment.stats.archive_rows_removed, 1);
    assert_eq!(fragment.stats.empty_tables_removed, 1);
    assert_eq!(fragment.tex_scripts, 3);
    assert!(!fragment.cleaned_html.contains("5A1C.zip"));
    assert!(fragment.cleaned_html.contains("<sub>10</sub>"));
    assert_eq!(fragment.references.codes(), vec!["1.4"]);

    assert_markdown_snapshot(
        fragment.markdown,
        Path::new("tests/snapshots/task_with_attachment.md"),
        "test_task_with_attachment_snapshot",
    );
}

#[test]
fn test_batch_keeps_going_and_merges_references() {
    let mut first = TaskRecord::new("A", "<p>one</p>");
    first.kes = vec!["2.1 Алгоритмы".to_string()];
    let mut second = TaskRecord::new("B", "<td><p>two</p></td>");
    second.kes = vec!["2.1 Алгоритмы и исполнители".to_string(), "2 Алгоритмизация".to_string()];

    let (tasks, report) = normalize_batch(vec![first, second], &NormalizerConfig::default());

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].kes, vec!["2.1", "2"]);
    assert_eq!(report.tasks, 2);
    assert_eq!(report.failures, 0);

    let entries = report.references.entries();
    let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "2.1"]);
    assert_eq!(entries[1].text, "Алгоритмы и исполнители");
    assert_eq!(report.references.conflicts(), 1);
}
