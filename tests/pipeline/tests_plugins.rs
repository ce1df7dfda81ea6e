//! Per-plugin behavior: independent runs, extensions, leniency, configuration.

use sdl::types::{Attribute, AttributeType};
use sdl::{
    Config, ElementData, ElementKind, ErrorCode, Item, PipelineOptions, PluginFlags, Value,
    compile,
};

use crate::helpers::graph_assertions::element_at;
use crate::helpers::plugin_fixtures::{TestPlugin, everything};
use crate::helpers::tree_builders::tree;

fn lenient_attributes() -> PipelineOptions {
    PipelineOptions::default().filter_unsupported_attributes(true)
}

#[test]
fn test_each_plugin_runs_on_its_own_copy() {
    let mut populated = tree();
    let root = populated.root();
    let book = populated.push(root, Item::object("Book").with_metadata("table_name", "books"));
    populated.push(book, Item::declaration("title", "string"));

    let sql = TestPlugin::new("Sql")
        .with_optional(Attribute::optional("table_name", AttributeType::String));
    let json = TestPlugin::new("Json");

    let mut for_sql = populated.clone();
    let compiled = compile(&mut for_sql, &sql, &PipelineOptions::default()).unwrap();
    let book = element_at(&compiled, "Book");
    assert_eq!(
        compiled.graph[book].metadata().get("table_name"),
        Some(&Value::from("books"))
    );

    let mut for_json = populated.clone();
    let error = compile(&mut for_json, &json, &PipelineOptions::default()).unwrap_err();
    assert_eq!(error.code(), ErrorCode::E0302);

    let mut for_json = populated.clone();
    let compiled = compile(&mut for_json, &json, &lenient_attributes()).unwrap();
    let book = element_at(&compiled, "Book");
    assert!(compiled.graph[book].metadata().get("table_name").is_none());
}

#[test]
fn test_known_extensions_become_elements() {
    let mut tree = tree();
    let root = tree.root();
    let book = tree.push(root, Item::object("Book"));
    tree.push(book, Item::declaration("title", "string"));
    tree.push(book, Item::extension("index", vec![Value::from("title")]));
    tree.push(book, Item::extension("index", vec![Value::from("title"), Value::Bool(true)]));

    let plugin = everything().with_extension("index", true);
    let compiled = compile(&mut tree, &plugin, &PipelineOptions::default()).unwrap();
    let book = element_at(&compiled, "Book");
    let extensions = compiled.graph[book].extensions();
    assert_eq!(extensions.len(), 2);
    assert_eq!(
        compiled.graph[extensions[1]].data(),
        &ElementData::Extension {
            arguments: vec![Value::from("title"), Value::Bool(true)]
        }
    );
    let ElementData::Compound { children, .. } = compiled.graph[book].data() else {
        panic!("expected a compound");
    };
    assert_eq!(children.len(), 1);
}

#[test]
fn test_duplicate_extension_not_allowed() {
    let mut tree = tree();
    let root = tree.root();
    let book = tree.push(root, Item::object("Book"));
    tree.push(book, Item::extension("primary_key", Vec::new()));
    tree.push(book, Item::extension("primary_key", Vec::new()));

    let plugin = everything().with_extension("primary_key", false);
    let error = compile(&mut tree, &plugin, &PipelineOptions::default()).unwrap_err();
    assert_eq!(error.code(), ErrorCode::E0405);
}

#[test]
fn test_preserve_references_keeps_aliases() {
    let build = || {
        let mut tree = tree();
        let root = tree.root();
        tree.push(root, Item::declaration("Title", "string"));
        tree.push(root, Item::declaration("Heading", "Title"));
        let book = tree.push(root, Item::object("Book"));
        tree.push(book, Item::declaration("heading", "Heading"));
        tree
    };

    let replaced = compile(&mut build(), &everything(), &PipelineOptions::default()).unwrap();
    let heading = element_at(&replaced, "Book.heading");
    assert_eq!(
        replaced.graph[heading].data(),
        &ElementData::Reference {
            reference: element_at(&replaced, "Title")
        }
    );

    let plugin = everything().with_flags(PluginFlags::ALL_ELEMENTS | PluginFlags::PRESERVE_REFERENCES);
    let preserved = compile(&mut build(), &plugin, &PipelineOptions::default()).unwrap();
    let heading = element_at(&preserved, "Book.heading");
    let alias = element_at(&preserved, "Heading");
    assert_eq!(preserved.graph[alias].kind(), ElementKind::Reference);
    assert_eq!(
        preserved.graph[heading].data(),
        &ElementData::Reference { reference: alias }
    );
}

#[test]
fn test_config_sections_fill_unset_attributes() {
    let mut config = Config::new();
    config.set("*", "mutable", true);
    config.set("Everything", "max_length", 64i64);
    config.set("Json", "max_length", 8i64);

    let mut tree = tree();
    let root = tree.root();
    let book = tree.push(root, Item::object("Book").with_metadata("mutable", false));
    tree.push(book, Item::declaration("title", "string"));
    tree.push(
        book,
        Item::declaration("summary", "string").with_metadata("max_length", 500i64),
    );

    let options = PipelineOptions::default().with_config(config);
    let compiled = compile(&mut tree, &everything(), &options).unwrap();
    let graph = &compiled.graph;

    let book = element_at(&compiled, "Book");
    assert_eq!(graph[book].metadata().get("mutable"), Some(&Value::Bool(false)));
    let title = element_at(&compiled, "Book.title");
    assert_eq!(graph[title].metadata().get("mutable"), Some(&Value::Bool(true)));
    assert_eq!(graph[title].metadata().get("max_length"), Some(&Value::Int(64)));
    let summary = element_at(&compiled, "Book.summary");
    assert_eq!(graph[summary].metadata().get("max_length"), Some(&Value::Int(500)));
}
