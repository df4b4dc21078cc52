use std::fmt::Write as _;
use std::path::PathBuf;

use aedt_parse::{
    Diagnostics, Error, Parser, Value, parse_document, parse_keyword,
};
use facet_testhelpers::test;
use tempfile::TempDir;

fn write_project(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// `Foo`, `Bar` and `Foo2`, each padded with many properties. `Bar` also
/// closes a block it never opened, so any attempt to walk it fails.
fn three_blocks() -> String {
    let mut source = String::new();
    for (name, marker) in [("Foo", "FooOnly"), ("Bar", "BarOnly"), ("Foo2", "Foo2Only")] {
        writeln!(source, "$begin '{name}'").unwrap();
        writeln!(source, "\t{marker}=true").unwrap();
        for i in 0..5_000 {
            writeln!(source, "\tP{i}={i}").unwrap();
        }
        if name == "Bar" {
            writeln!(source, "\t$end 'Stray'").unwrap();
        }
        writeln!(source, "$end '{name}'").unwrap();
    }
    source
}

#[test]
fn bounded_parse_stops_after_the_block() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "three.aedt", three_blocks().as_bytes());

    let doc = parse_keyword(&path, "Foo", None).unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["Foo"]);
    assert_eq!(doc.get("Foo/FooOnly"), Some(&Value::Bool(true)));
    assert_eq!(doc.get("Foo/P4999"), Some(&Value::Int(4999)));
    assert!(doc.get("Bar").is_none());
    assert!(doc.get("Foo/BarOnly").is_none());

    // The whole-file parse does reach the broken block.
    assert!(parse_document(&path).is_err());
}

#[test]
fn bounded_parse_matches_exact_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "three.aedt", three_blocks().as_bytes());

    let doc = parse_keyword(&path, "Foo2", None).unwrap();
    assert_eq!(doc.get("Foo2/Foo2Only"), Some(&Value::Bool(true)));
}

#[test]
fn keyword_found_at_any_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(
        &dir,
        "nested.aedt",
        b"$begin 'A'\n\t$begin 'B'\n\t\t$begin 'MeshStats'\n\t\t\tElements=1200\n\t\t$end 'MeshStats'\n\t$end 'B'\n$end 'A'\n",
    );
    let doc = parse_keyword(&path, "MeshStats", None).unwrap();
    assert_eq!(doc.get("MeshStats/Elements"), Some(&Value::Int(1200)));
}

#[test]
fn design_name_gates_the_match() {
    let source = "\
$begin 'AnsoftProject'
\t$begin 'HFSSModel'
\t\tName='HFSSDesign1'
\t\t$begin 'ModelSetup'
\t\t\tOwner='HFSSDesign1'
\t\t$end 'ModelSetup'
\t$end 'HFSSModel'
\t$begin 'HFSSModel'
\t\tName='HFSSDesign2'
\t\t$begin 'ModelSetup'
\t\t\tOwner='HFSSDesign2'
\t\t$end 'ModelSetup'
\t$end 'HFSSModel'
$end 'AnsoftProject'
";
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "designs.aedt", source.as_bytes());

    let doc = parse_keyword(&path, "ModelSetup", Some("HFSSDesign2")).unwrap();
    assert_eq!(doc.get("ModelSetup/Owner"), Some(&Value::string("HFSSDesign2")));

    let doc = parse_keyword(&path, "ModelSetup", None).unwrap();
    assert_eq!(doc.get("ModelSetup/Owner"), Some(&Value::string("HFSSDesign1")));

    let doc = parse_keyword(&path, "ModelSetup", Some("Missing")).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn missing_keyword_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "p.aedt", b"$begin 'A'\n$end 'A'\n");
    assert!(parse_keyword(&path, "Nope", None).unwrap().is_empty());
}

#[test]
fn keyword_block_can_be_a_recognized_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(
        &dir,
        "table.aedt",
        b"$begin 'Model'\n$begin 'Curves'\n'0'(1, 2)\n$end 'Curves'\n$end 'Model'\n",
    );
    let doc = parse_keyword(&path, "Curves", None).unwrap();
    assert_eq!(
        doc.get("Curves/0"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn unterminated_keyword_block_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "cut.aedt", b"$begin 'A'\n$begin 'Target'\nX=1\n");
    let err = parse_keyword(&path, "Target", None).unwrap_err();
    let parse_err = err.as_parse_error().unwrap();
    assert_eq!(parse_err.at.line_number(), 4);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_document(dir.path().join("missing.aedt")).unwrap_err();
    match err {
        Error::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[test]
fn project_preview_is_lifted_for_new_versions() {
    let source = "\
$begin 'AnsoftProject'
\t$begin 'Desktop'
\t\tVersion(2023, 2)
\t$end 'Desktop'
\t$begin 'ProjectPreview'
\t\tIsEncrypted=false
\t\t$begin 'DesignInfo'
\t\t\tDesignName='HFSSDesign1'
\t\t$end 'DesignInfo'
\t$end 'ProjectPreview'
$end 'AnsoftProject'
";
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(&dir, "new.aedt", source.as_bytes());

    let parsed = Parser::new().parse_document_report(&path).unwrap();
    let doc = &parsed.document;
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["AnsoftProject", "ProjectPreview"]);
    assert_eq!(
        doc.get("ProjectPreview/DesignInfo/DesignName"),
        Some(&Value::string("HFSSDesign1"))
    );
    assert_eq!(parsed.diagnostics, Diagnostics::default());

    let old = source.replace("Version(2023, 2)", "Version(2021, 1)");
    let path = write_project(&dir, "old.aedt", old.as_bytes());
    let doc = parse_document(&path).unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["AnsoftProject"]);
}
