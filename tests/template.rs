use go_lazy::catalog;
use go_lazy::format::{FormatError, Formatter, canonicalize};
use go_lazy::ir::{EntrySource, GenerationRequest, TypeEntry};
use go_lazy::syntax::{GoParser, SourceFile};
use go_lazy::template::{render_race_test, render_source};

fn outline(source: &str) -> SourceFile {
    GoParser::new().unwrap().parse(source).unwrap()
}

fn request(entries: &[(&str, &str)]) -> GenerationRequest {
    GenerationRequest {
        package: "lazy".to_string(),
        entries: entries
            .iter()
            .map(|(name, type_expr)| TypeEntry::new(*name, *type_expr))
            .collect(),
        source: EntrySource::Explicit,
    }
}

#[test]
fn my_int_defines_wrapper_accessor_and_constructor() {
    let source = render_source(&request(&[("MyInt", "int")])).unwrap();
    let file = outline(&canonicalize(&source).unwrap());

    let wrapper = file.type_decl("lazyMyInt").unwrap();
    assert_eq!(wrapper.kind, "struct_type");
    assert_eq!(wrapper.fields.len(), 4);
    assert_eq!(file.func(Some("lazyMyInt"), "Get").unwrap().signature(), "() int");
    let constructor = file.func(None, "MyInt").unwrap();
    assert_eq!(constructor.params, vec!["f func() int"]);
    assert_eq!(constructor.result.as_deref(), Some("func() int"));
}

#[test]
fn every_catalog_entry_formats_in_isolation() {
    for entry in catalog::entries() {
        let single = GenerationRequest {
            package: "lazy".to_string(),
            entries: vec![entry.clone()],
            source: EntrySource::Catalog,
        };
        let source = render_source(&single).unwrap();
        let formatted = canonicalize(&source).unwrap_or_else(|err| panic!("{}: {err}", entry.name));
        assert_eq!(formatted, source, "{} is not already canonical", entry.name);
    }
}

#[test]
fn accessor_checks_flag_before_locking() {
    let source = render_source(&request(&[("Count", "int")])).unwrap();
    let get = source.find("Get() int {").unwrap();
    let fast_path = source[get..].find("atomic.LoadUint32(&v.o) == 1").unwrap();
    let lock = source[get..].find("v.m.Lock()").unwrap();
    let recheck = source[get..].find("if v.o == 0 {").unwrap();
    let publish = source[get..].find("atomic.StoreUint32(&v.o, 1)").unwrap();
    let release_f = source[get..].find("v.f = nil").unwrap();

    assert!(fast_path < lock);
    assert!(lock < recheck);
    assert!(recheck < release_f);
    assert!(release_f < publish);
}

#[test]
fn rendering_is_deterministic() {
    let request = request(&[("A", "int"), ("B", "[]byte")]);
    assert_eq!(render_source(&request).unwrap(), render_source(&request).unwrap());
    assert_eq!(
        render_race_test(&request).unwrap(),
        render_race_test(&request).unwrap()
    );
}

#[test]
fn multiline_types_stay_out_of_comments() {
    let source = render_source(&request(&[("Point", "struct {\n\tX, Y int\n}")])).unwrap();
    assert!(source.contains("// lazyPoint implements lazy evaluation for struct { X, Y int }.\n"));
    canonicalize(&source).unwrap();
}

#[test]
fn malformed_entries_fail_formatting() {
    for (name, type_expr) in [
        ("Bad", "int int"),
        ("Bad", "func("),
        ("Bad", "[a b]int"),
        ("Bad", "[)]int"),
        ("Bad", "[+ +]int"),
        ("my-int", "int"),
        ("1st", "int"),
    ] {
        let source = render_source(&request(&[(name, type_expr)])).unwrap();
        let err = Formatter::Builtin.format(&source, false).unwrap_err();
        assert!(matches!(err, FormatError::Syntax(_)), "{name} {type_expr}: {err}");
    }
}

#[test]
fn race_test_covers_each_entry() {
    let source = render_race_test(&request(&[("Count", "int"), ("Err", "error")])).unwrap();
    let file = outline(&canonicalize(&source).unwrap());

    assert_eq!(file.imports, vec!["sync", "sync/atomic", "testing"]);
    assert_eq!(
        file.func(None, "TestLazy_Count").unwrap().signature(),
        "(t *testing.T)"
    );
    assert!(file.func(None, "TestLazy_Err").is_some());
    assert!(source.contains("var zero error\n"));
}

#[test]
fn race_test_releases_goroutines_together_and_expects_one_call() {
    let source = render_race_test(&request(&[("Count", "int")])).unwrap();
    let body = &source[source.find("func TestLazy_Count(").unwrap()..];
    let step = |needle: &str| {
        body.find(needle)
            .unwrap_or_else(|| panic!("missing `{needle}` in:\n{body}"))
    };

    let counter = step("atomic.AddInt32(&calls, 1)");
    let gate = step("start := make(chan struct{})");
    let spawn = step("for i := 0; i < 64; i++ {");
    let wait_at_gate = step("<-start");
    let call = step("get()");
    let open_gate = step("close(start)");
    let join = step("wg.Wait()");
    let check = step("n := atomic.LoadInt32(&calls); n != 1");

    assert!(counter < gate);
    assert!(gate < spawn);
    assert!(spawn < wait_at_gate && wait_at_gate < call);
    assert!(call < open_gate);
    assert!(open_gate < join && join < check);
    assert!(body.contains("go func() {"));
}

#[test]
fn builtin_matches_gofmt_when_available() {
    let Ok(gofmt) = which::which("gofmt") else {
        return;
    };
    let source = render_source(&request(&[
        ("Count", "int"),
        ("Names", "[]string"),
        ("Any", "interface{}"),
    ]))
    .unwrap();

    let builtin = Formatter::Builtin.format(&source, false).unwrap();
    let external = Formatter::Gofmt(gofmt).format(&source, false).unwrap();
    assert_eq!(builtin, external);
}
