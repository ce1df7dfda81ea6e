//! Error kinds surfaced by the pipeline, with codes and rendered messages.

use rstest::rstest;
use sdl::types::{Attribute, AttributeType};
use sdl::{
    Arity, ElementData, ErrorCode, ErrorKind, Item, ItemTree, PipelineOptions, PluginFlags, Shape,
    compile,
};

use crate::helpers::plugin_fixtures::{TestPlugin, everything, library_plugin};
use crate::helpers::tree_builders::{at, library, tree};

fn compile_error(tree: &mut ItemTree, plugin: &TestPlugin) -> sdl::Error {
    compile(tree, plugin, &PipelineOptions::default()).unwrap_err()
}

#[test]
fn test_unresolved_reference_message() {
    let mut tree = tree();
    let root = tree.root();
    let book = tree.push(root, Item::object("Book"));
    tree.push(book, Item::declaration("publisher", "Publisher").at(at(4, 5)));

    let error = compile_error(&mut tree, &everything());
    assert_eq!(error.code(), ErrorCode::E0101);
    assert_eq!(error.position(), ("test.sdl", 4, 5));
    assert_eq!(
        error.to_string(),
        "The reference 'Publisher' could not be resolved (test.sdl [4 5])"
    );
}

#[test]
fn test_duplicate_name_message() {
    let mut tree = tree();
    let root = tree.root();
    let book = tree.push(root, Item::object("Book"));
    tree.push(book, Item::declaration("title", "string").at(at(2, 5)));
    tree.push(book, Item::declaration("title", "int").at(at(3, 5)));

    let error = compile_error(&mut tree, &everything());
    assert_eq!(error.code(), ErrorCode::E0103);
    assert_eq!(
        error.to_string(),
        "The name 'title' has already been defined in this scope (test.sdl [3 5])"
    );
}

#[test]
fn test_duplicate_field_through_alias_base() {
    let mut tree = tree();
    let root = tree.root();
    let base = tree.push(root, Item::object("Base"));
    tree.push(base, Item::declaration("x", "int"));
    tree.push(root, Item::declaration("AliasBase", "Base"));
    let derived = tree.push(root, Item::object("Derived").with_base("AliasBase"));
    tree.push(derived, Item::declaration("x", "int").at(at(6, 5)));

    let error = compile_error(&mut tree, &everything());
    assert_eq!(error.code(), ErrorCode::E0103);
    assert_eq!(error.position(), ("test.sdl", 6, 5));
}

fn pair_with_override(sibling: &str) -> ItemTree {
    let mut pair_tree = tree();
    let root = pair_tree.root();
    let pair = pair_tree.push(root, Item::object("Pair"));
    pair_tree.push(pair, Item::declaration("a", "int").with_metadata("name", "b"));
    pair_tree.push(pair, Item::declaration(sibling, "int"));
    pair_tree
}

#[test]
fn test_name_override_collision() {
    let error = compile_error(&mut pair_with_override("b"), &everything());
    assert_eq!(error.code(), ErrorCode::E0103);
}

#[test]
fn test_name_override_keeps_fields_and_children_aligned() {
    let compiled = compile(
        &mut pair_with_override("c"),
        &everything(),
        &PipelineOptions::default(),
    )
    .unwrap();
    let pair = compiled.included_named("Pair").unwrap();
    let ElementData::Compound { children, .. } = compiled.graph[pair].data() else {
        panic!("expected a compound");
    };
    let Shape::Class(class) = &compiled.graph.type_info(pair).shape else {
        panic!("expected a class");
    };
    assert_eq!(children.len(), class.fields.len());
    assert_eq!(
        class.fields.keys().map(|key| key.as_str()).collect::<Vec<_>>(),
        vec!["b", "c"]
    );
}

#[rstest]
#[case::zero_max(1, Some(0))]
#[case::inverted(3, Some(2))]
fn test_invalid_arity_bounds(#[case] min: u32, #[case] max: Option<u32>) {
    let error = Arity::new(min, max).unwrap_err();
    assert!(matches!(error, ErrorKind::InvalidArity { .. }));
    assert_eq!(error.code(), ErrorCode::E0201);
}

#[test]
fn test_reserved_name() {
    let mut tree = tree();
    let root = tree.root();
    tree.push(root, Item::object("date"));
    assert_eq!(compile_error(&mut tree, &everything()).code(), ErrorCode::E0102);
}

#[test]
fn test_circular_alias_chain() {
    let mut tree = tree();
    let root = tree.root();
    tree.push(root, Item::declaration("first", "second"));
    tree.push(root, Item::declaration("second", "third"));
    tree.push(root, Item::declaration("third", "first"));
    assert_eq!(compile_error(&mut tree, &everything()).code(), ErrorCode::E0104);
}

#[test]
fn test_missing_required_attribute() {
    let plugin = library_plugin()
        .with_required("Book", Attribute::required("table_name", AttributeType::String));
    let mut tree = library();
    let error = compile_error(&mut tree, &plugin);
    assert_eq!(error.code(), ErrorCode::E0301);
    assert_eq!(
        error.kind,
        ErrorKind::MissingRequiredAttribute {
            name: "Book".to_string(),
            attribute: "table_name".to_string(),
        }
    );
}

#[test]
fn test_invalid_attribute_value() {
    let mut tree = tree();
    let root = tree.root();
    tree.push(
        root,
        Item::declaration("count", "int").with_metadata("max", "many"),
    );
    assert_eq!(compile_error(&mut tree, &everything()).code(), ErrorCode::E0303);
}

#[rstest]
#[case::list(PluginFlags::ALL_ELEMENTS - PluginFlags::LIST, ErrorCode::E0203)]
#[case::reference(PluginFlags::ALL_ELEMENTS - PluginFlags::REFERENCE, ErrorCode::E0203)]
fn test_capability_flags(#[case] flags: PluginFlags, #[case] expected: ErrorCode) {
    let mut tree = crate::helpers::tree_builders::recursive_list();
    let plugin = everything().with_flags(flags);
    assert_eq!(compile_error(&mut tree, &plugin).code(), expected);
}

#[test]
fn test_variant_alternative_arity() {
    let mut tree = tree();
    let root = tree.root();
    tree.push(root, Item::declaration("many", "int").with_arity(Arity::ZERO_OR_MORE));
    tree.push(
        root,
        Item::variant(
            "choice",
            vec![
                sdl::item::VariantAlternative::new("many", at(2, 9)),
                sdl::item::VariantAlternative::new("string", at(2, 16)),
            ],
        ),
    );
    assert_eq!(compile_error(&mut tree, &everything()).code(), ErrorCode::E0204);
}

#[test]
fn test_unsupported_extension_is_an_error_when_strict() {
    let mut tree = library();
    let error = compile_error(&mut tree, &everything());
    assert_eq!(error.code(), ErrorCode::E0404);
    assert!(error.code().is_filterable());
}
