use crate::utils::{fixed_text_at, parse};

fn fix_return(return_type: &str, creation: &str) -> Option<String> {
    let document = parse(&format!(
        "using System.Collections.Generic;\nclass Sample {{ {return_type} M() {{ return {creation}; }} }}\n"
    ));
    fixed_text_at(&document, creation)
}

#[test]
fn test_read_only_shapes_are_fixed() {
    for shape in ["IEnumerable<int>", "IReadOnlyList<int>", "IReadOnlyCollection<int>", "int[]"] {
        for creation in ["new List<int>()", "new int[0]"] {
            let fixed = fix_return(shape, creation).unwrap();
            assert!(fixed.contains("return System.Array.Empty<int>();"), "{shape}: {fixed}");
        }
    }
}

#[test]
fn test_mutable_collection_types_are_rejected() {
    for shape in ["List<int>", "ICollection<int>", "IList<int>", "HashSet<int>", "ISet<int>"] {
        assert_eq!(fix_return(shape, "new List<int>()"), None, "{shape}");
    }
    assert_eq!(fix_return("object", "new int[0]"), None);
    assert_eq!(fix_return("System.Collections.IEnumerable", "new int[0]"), None);
}

#[test]
fn test_parameter_shapes() {
    let call = |parameter: &str| {
        let document = parse(&format!(
            "using System.Collections.Generic;\n\
             class Sample {{ void Take({parameter} values) {{ }} void Run() {{ Take(new int[0]); }} }}\n"
        ));
        fixed_text_at(&document, "new int[0]")
    };
    assert!(call("IReadOnlyList<int>").is_some());
    assert!(call("int[]").is_some());
    assert!(call("IList<int>").is_none());
    assert!(call("ICollection<int>").is_none());
}
