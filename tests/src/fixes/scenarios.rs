use crate::utils::{fix_all, fixed_text_at, read_expected_text, read_test_file};

#[test]
fn return_list_test() {
    let document = read_test_file(module_path!(), "return_list");
    let expected = read_expected_text(module_path!(), "return_list");
    assert_eq!(fixed_text_at(&document, "new List<int>()").unwrap(), expected);
}

#[test]
fn argument_array_test() {
    let document = read_test_file(module_path!(), "argument_array");
    let expected = read_expected_text(module_path!(), "argument_array");
    assert_eq!(fixed_text_at(&document, "new int[0]").unwrap(), expected);
}

#[test]
fn copy_construction_test() {
    let document = read_test_file(module_path!(), "copy_construction");
    assert_eq!(fixed_text_at(&document, "new List<string>(existingList)"), None);
    assert_eq!(fix_all(&document), document.text());
}

#[test]
fn non_empty_initializer_test() {
    let document = read_test_file(module_path!(), "non_empty_initializer");
    assert_eq!(fixed_text_at(&document, "new List<int> { 1, 2 }"), None);
    assert_eq!(fix_all(&document), document.text());
}

#[test]
fn getter_arrow_test() {
    let document = read_test_file(module_path!(), "getter_arrow");
    let expected = read_expected_text(module_path!(), "getter_arrow");
    assert_eq!(fixed_text_at(&document, "new int[0]").unwrap(), expected);
    assert_eq!(fix_all(&document), expected);
}

#[test]
fn setter_only_test() {
    let document = read_test_file(module_path!(), "setter_only");
    assert_eq!(fixed_text_at(&document, "new int[0]"), None);
    assert_eq!(fix_all(&document), document.text());
}
