//! Configuration files and graph dumps (requires the `interchange` feature).

use std::io::Write;

use sdl::{Config, ErrorCode, PipelineOptions, Value, compile};
use tempfile::NamedTempFile;

use crate::helpers::graph_assertions::element_at;
use crate::helpers::plugin_fixtures::library_plugin;
use crate::helpers::tree_builders::library;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_yaml_config_file_feeds_the_pipeline() {
    let file = config_file(
        ".yaml",
        "'*':\n  mutable: true\nEverything:\n  max_length: 99\n",
    );
    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(
        config.values_for("Everything").get("max_length"),
        Some(&Value::Int(99))
    );

    let mut tree = library();
    let options = PipelineOptions::default().with_config(config);
    let compiled = compile(&mut tree, &library_plugin(), &options).unwrap();
    let title = element_at(&compiled, "Book.title");
    let metadata = compiled.graph[title].metadata();
    assert_eq!(metadata.get("max_length"), Some(&Value::Int(99)));
    assert_eq!(metadata.get("mutable"), Some(&Value::Bool(true)));
}

#[test]
fn test_json_config_file() {
    let file = config_file(".json", r#"{ "Everything": { "mutable": false } }"#);
    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(
        config.values_for("Everything").get("mutable"),
        Some(&Value::Bool(false))
    );
}

#[test]
fn test_malformed_config_file() {
    let file = config_file(".yaml", "- just\n- a list\n");
    let error = Config::from_path(file.path()).unwrap_err();
    assert_eq!(error.code(), ErrorCode::E0902);
}

#[test]
fn test_graph_dump_covers_every_element() {
    let mut tree = library();
    let compiled = compile(&mut tree, &library_plugin(), &PipelineOptions::default()).unwrap();
    let dump = compiled.graph.to_json();

    let elements = dump["elements"].as_array().unwrap();
    assert_eq!(elements.len(), compiled.graph.len());
    assert_eq!(
        dump["type_infos"].as_array().unwrap().len(),
        compiled.graph.type_infos().len()
    );

    let book = element_at(&compiled, "Book");
    let book_json = &elements[book.index()];
    assert_eq!(book_json["name"], "Book");
    assert_eq!(book_json["kind"], "compound");
    assert_eq!(book_json["extensions"].as_array().unwrap().len(), 1);

    let index = compiled.graph[book].extensions()[0];
    assert_eq!(elements[index.index()]["arguments"], serde_json::json!(["title"]));
}
