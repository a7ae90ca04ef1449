/*
 * include.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;
use yaml_include::{Error, IncludeOptions, LoadContext, Loader, yaml_to_json};
use yaml_rust2::Yaml;

// Relative pathnames in these documents resolve against the working
// directory, which cargo sets to the crate root for integration tests.

fn load(src: &str) -> yaml_include::Result<Yaml> {
    yaml_include::loader().load_str(src, &LoadContext::working_dir())
}

fn named(name: &str) -> Yaml {
    load(&format!("name: '{name}'")).unwrap()
}

fn sorted_by_name(value: &Yaml) -> Vec<Yaml> {
    let mut items = value.as_vec().expect("expected a sequence").clone();
    items.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
    items
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn include_single_in_top() {
    let data = load("!include tests/data/include.d/1.yaml").unwrap();
    assert_eq!(data, named("1"));
}

#[test]
fn include_one_in_mapping() {
    let data = load("file1: !include tests/data/include.d/1.yaml").unwrap();
    assert_eq!(data["file1"], named("1"));
    assert_eq!(data.as_hash().map(|h| h.len()), Some(1));
}

#[test]
fn include_two_in_mapping() {
    let data = load(
        "file1: !include tests/data/include.d/1.yaml\n\
         file2: !include tests/data/include.d/2.yaml\n",
    )
    .unwrap();
    assert_eq!(data["file1"], named("1"));
    assert_eq!(data["file2"], named("2"));
}

#[test]
fn include_one_in_sequence() {
    let data = load("- !include tests/data/include.d/1.yaml").unwrap();
    assert_eq!(data, Yaml::Array(vec![named("1")]));
}

#[test]
fn include_two_in_sequence() {
    let data = load(
        "- !include tests/data/include.d/1.yaml\n\
         - !include tests/data/include.d/2.yaml\n",
    )
    .unwrap();
    assert_eq!(data, Yaml::Array(vec![named("1"), named("2")]));
}

#[test]
fn include_two_in_flow_sequence() {
    let data = load(
        "[!include tests/data/include.d/1.yaml, !include tests/data/include.d/2.yaml]",
    )
    .unwrap();
    assert_eq!(data, Yaml::Array(vec![named("1"), named("2")]));
}

#[test]
fn include_file_not_exists() {
    let err = load("!include tests/data/include.d/x.yaml").unwrap_err();
    assert!(
        matches!(err.root_cause(), Error::NotFound { path } if path.ends_with("include.d/x.yaml")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn include_recursive() {
    let data = load("!include tests/data/0.yaml").unwrap();
    assert_eq!(sorted_by_name(&data["files"]), vec![named("1"), named("2")]);
    assert_eq!(data["file1"], named("1"));
    assert_eq!(data["file2"], named("2"));
}

#[test]
fn include_abs() {
    let dirpath = std::env::current_dir().unwrap();
    let data = load(&format!(
        "!include {}/tests/data/include.d/1.yaml",
        dirpath.display()
    ))
    .unwrap();
    assert_eq!(data, named("1"));
}

#[test]
fn include_abs_ignores_base_dir() {
    let dirpath = std::env::current_dir().unwrap();
    let doc = format!("!include {}/tests/data/include.d/1.yaml", dirpath.display());
    let data = yaml_include::loader()
        .load_str(&doc, &LoadContext::new("/somewhere/else"))
        .unwrap();
    assert_eq!(data, named("1"));
}

#[test]
fn include_wildcards() {
    let documents = [
        "!include tests/data/include.d/*.yaml",
        "!include [tests/data/include.d/**/*.yaml, true]",
        "!include {pathname: tests/data/include.d/**/*.yaml, recursive: true}",
    ];
    for doc in documents {
        let data = load(doc).unwrap();
        assert!(data.as_vec().is_some(), "{doc} should yield a sequence");
        assert_eq!(sorted_by_name(&data), vec![named("1"), named("2")], "{doc}");
    }
}

#[test]
fn include_wildcard_not_recursive() {
    // Without the flag `**` is one directory level, and include.d has no
    // subdirectories
    let data = load("!include [tests/data/include.d/**/*.yaml, false]").unwrap();
    assert_eq!(data, Yaml::Array(Vec::new()));

    let data = load("!include {pathname: tests/data/**/*.yaml}").unwrap();
    assert_eq!(sorted_by_name(&data), vec![named("1"), named("2")]);
}

#[test]
fn include_wildcard_no_matches() {
    let data = load("files: !include tests/data/include.d/*.json").unwrap();
    assert_eq!(data["files"], Yaml::Array(Vec::new()));
}

#[test]
fn include_malformed_directive() {
    let err = load("!include {pathname: tests/data/0.yaml, mode: fast}").unwrap_err();
    assert!(matches!(err.root_cause(), Error::Directive { .. }));
}

#[test]
fn include_as_json_snapshot() {
    let data = load(
        "both:\n  - !include tests/data/include.d/1.yaml\n  - !include tests/data/include.d/2.yaml\n\
         file1: !include tests/data/include.d/1.yaml\n",
    )
    .unwrap();
    insta::assert_snapshot!(serde_json::to_string_pretty(&yaml_to_json(&data)).unwrap(), @r#"
    {
      "both": [
        {
          "name": "1"
        },
        {
          "name": "2"
        }
      ],
      "file1": {
        "name": "1"
      }
    }
    "#);
}

#[test]
fn nested_includes_resolve_against_their_own_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.yaml", "db: !include conf/db.yaml");
    write(dir.path(), "conf/db.yaml", "host: !include parts/host.yaml\nport: 5432");
    write(dir.path(), "conf/parts/host.yaml", "localhost");

    let data = yaml_include::loader()
        .load_file(dir.path().join("main.yaml"))
        .unwrap();
    assert_eq!(data["db"]["host"].as_str(), Some("localhost"));
    assert_eq!(data["db"]["port"].as_i64(), Some(5432));
}

#[test]
fn cycle_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.yaml", "b: !include b.yaml");
    write(dir.path(), "b.yaml", "a: !include a.yaml");

    let err = yaml_include::loader()
        .load_file(dir.path().join("a.yaml"))
        .unwrap_err();
    let Error::Cycle { chain } = err.root_cause() else {
        panic!("expected a cycle, got {err:?}");
    };
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.first(), chain.last());
    assert_eq!(err.include_trace().len(), 2);
}

#[test]
fn self_include_from_string_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "self.yaml", "again: !include self.yaml");

    let err = yaml_include::loader()
        .load_str("!include self.yaml", &LoadContext::new(dir.path()))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::Cycle { chain } if chain.len() == 2));
}

#[test]
fn sibling_includes_of_same_file_are_not_a_cycle() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "shared.yaml", "v: 1");
    write(dir.path(), "main.yaml", "a: !include shared.yaml\nb: !include shared.yaml");

    let data = yaml_include::loader()
        .load_file(dir.path().join("main.yaml"))
        .unwrap();
    assert_eq!(data["a"], data["b"]);
}

#[test]
fn error_in_nested_file_reports_each_directive() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.yaml", "outer: !include inner.yaml");
    write(dir.path(), "inner.yaml", "x: 1\nmissing: !include nope.yaml");

    let err = yaml_include::loader()
        .load_file(dir.path().join("main.yaml"))
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::NotFound { .. }));

    let trace = err.include_trace();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0].file.as_deref(), Some(dir.path().join("main.yaml").as_path()));
    assert_eq!(trace[1].file.as_deref(), Some(dir.path().join("inner.yaml").as_path()));
}

#[test]
fn syntax_error_in_included_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.yaml", "a: [1, 2");

    let err = yaml_include::loader()
        .load_str("!include broken.yaml", &LoadContext::new(dir.path()))
        .unwrap_err();
    let Error::Parse { file, .. } = err.root_cause() else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(file.as_deref(), Some(dir.path().join("broken.yaml").as_path()));
}

#[test]
fn toml_and_text_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "server.toml", "host = \"example.org\"\nports = [80, 443]\n");
    write(dir.path(), "motd.txt", "hello: world\n");

    let data = yaml_include::loader()
        .load_str(
            "server: !include server.toml\nmotd: !include motd.txt",
            &LoadContext::new(dir.path()),
        )
        .unwrap();
    assert_eq!(data["server"]["host"].as_str(), Some("example.org"));
    assert_eq!(data["server"]["ports"][0].as_i64(), Some(80));
    assert_eq!(data["motd"].as_str(), Some("hello: world\n"));
}

#[test]
fn encoding_option() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("old.yaml"), b"word: caf\xE9\n").unwrap();
    let ctx = LoadContext::new(dir.path());

    let data = yaml_include::loader()
        .load_str("!include {pathname: old.yaml, encoding: latin-1}", &ctx)
        .unwrap();
    assert_eq!(data["word"].as_str(), Some("café"));

    let err = yaml_include::loader()
        .load_str("!include old.yaml", &ctx)
        .unwrap_err();
    assert!(matches!(err.root_cause(), Error::Decode { .. }));
}

#[test]
fn custom_tag_and_default_encoding() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("old.yaml"), b"word: na\xEFve\n").unwrap();

    let loader = yaml_include::loader_with_options(IncludeOptions {
        tag: "!import".to_owned(),
        encoding: "latin-1".parse().unwrap(),
        ..Default::default()
    });
    let data = loader
        .load_str(
            "a: !import old.yaml\nb: !include old.yaml",
            &LoadContext::new(dir.path()),
        )
        .unwrap();
    assert_eq!(data["a"]["word"].as_str(), Some("naïve"));
    // Unregistered tags leave the node in place
    assert_eq!(data["b"].as_str(), Some("old.yaml"));
}

#[test]
fn loader_is_shareable_across_threads() {
    let loader: Arc<Loader> = Arc::new(yaml_include::loader());
    let handles: Vec<_> = ["1", "2"]
        .into_iter()
        .map(|name| {
            let loader = Arc::clone(&loader);
            std::thread::spawn(move || {
                loader
                    .load_str(
                        &format!("!include tests/data/include.d/{name}.yaml"),
                        &LoadContext::working_dir(),
                    )
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<Yaml> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![named("1"), named("2")]);
}

#[test]
fn include_single_char_and_class_wildcards() {
    let data = load("!include tests/data/include.d/?.yaml").unwrap();
    assert_eq!(sorted_by_name(&data), vec![named("1"), named("2")]);

    let data = load("!include tests/data/include.d/[2-9].yaml").unwrap();
    assert_eq!(data, Yaml::Array(vec![named("2")]));
}

#[test]
fn embedded_double_star_is_valid_with_either_flag() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "conf/a.yaml", "x: 1");
    let ctx = LoadContext::new(dir.path());

    for doc in ["!include [conf/**.yaml, true]", "!include [conf/**.yaml, false]"] {
        let data = yaml_include::loader().load_str(doc, &ctx).unwrap();
        assert_eq!(data, load("[{x: 1}]").unwrap(), "{doc}");
    }
}

#[test]
fn multi_document_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "multi.yaml", "a: 1\n---\nb: 2\n---\nc: [unclosed\n");

    let err = yaml_include::loader()
        .load_str("!include multi.yaml", &LoadContext::new(dir.path()))
        .unwrap_err();
    let Error::Parse { file, message } = err.root_cause() else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(file.as_deref(), Some(dir.path().join("multi.yaml").as_path()));
    assert!(message.contains("single document"), "{message}");
}

#[test]
fn depth_limit_is_the_same_for_strings_and_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "top.yaml", "leaf: !include leaf.yaml");
    write(dir.path(), "mid.yaml", "top: !include top.yaml");
    write(dir.path(), "leaf.yaml", "x: 1");
    let loader = yaml_include::loader_with_options(IncludeOptions {
        max_depth: 1,
        ..Default::default()
    });

    let from_str = loader
        .load_str("!include leaf.yaml", &LoadContext::new(dir.path()))
        .unwrap();
    let from_file = loader.load_file(dir.path().join("top.yaml")).unwrap();
    assert_eq!(from_file["leaf"], from_str);

    let err = loader.load_file(dir.path().join("mid.yaml")).unwrap_err();
    assert!(
        matches!(err.root_cause(), Error::DepthExceeded { max_depth: 1, path } if path.ends_with("leaf.yaml")),
        "unexpected error: {err:?}"
    );
}

#[test]
fn read_failure_other_than_missing_is_io() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("conf.yaml")).unwrap();
    write(dir.path(), "main.yaml", "conf: !include conf.yaml");

    let err = yaml_include::loader()
        .load_file(dir.path().join("main.yaml"))
        .unwrap_err();
    assert!(
        matches!(err.root_cause(), Error::Io { path, .. } if path.ends_with("conf.yaml")),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.include_trace().len(), 1);
}
