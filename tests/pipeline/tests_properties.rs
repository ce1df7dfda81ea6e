//! Graph-level properties every compiled schema must satisfy.

use rstest::rstest;
use sdl::types::AttributeType;
use sdl::{
    Arity, ElementData, ElementKind, ErrorCode, FundamentalType, Item, PipelineOptions, Shape,
    Value, compile, resolve, transform, validate,
};

use crate::helpers::graph_assertions::{class_of, element_at, field_names, fundamental_of};
use crate::helpers::plugin_fixtures::{everything, library_plugin};
use crate::helpers::tree_builders::{library, recursive_list, tree};

#[rstest]
#[case(AttributeType::Int, "42")]
#[case(AttributeType::Bool, "yes")]
#[case(AttributeType::Number, "2.5")]
#[case(AttributeType::list_of(AttributeType::String), "a")]
fn test_typed_values_revalidate_unchanged(#[case] ty: AttributeType, #[case] literal: &str) {
    let typed = ty.deserialize(&Value::from(literal)).unwrap();
    assert_eq!(ty.deserialize(&typed), Ok(typed.clone()));
}

#[test]
fn test_validation_is_repeatable_on_typed_metadata() {
    let mut tree = tree();
    let root = tree.root();
    let count = tree.push(root, Item::declaration("count", "int").with_metadata("max", "42"));
    let plugin = everything();
    let options = PipelineOptions::default();

    resolve(&mut tree, &plugin, &options).unwrap();
    validate(&mut tree, &plugin, &options).unwrap();
    assert_eq!(tree[count].metadata().value("max"), Some(&Value::Int(42)));
    validate(&mut tree, &plugin, &options).unwrap();
    assert_eq!(tree[count].metadata().value("max"), Some(&Value::Int(42)));
}

#[test]
fn test_unspecified_arity_is_exactly_one() {
    let mut tree = tree();
    let root = tree.root();
    let node = tree.push(root, Item::object("Node"));
    resolve(&mut tree, &everything(), &PipelineOptions::default()).unwrap();
    assert_eq!(tree[node].arity(), Some(Arity::ONE));
}

#[test]
fn test_recursive_list_terminates_with_shared_identity() {
    let mut tree = recursive_list();
    let compiled = compile(&mut tree, &everything(), &PipelineOptions::default()).unwrap();
    let graph = &compiled.graph;

    let node = element_at(&compiled, "Node");
    let children = element_at(&compiled, "Node.children");
    assert_eq!(graph[children].kind(), ElementKind::List);

    let table = graph.type_infos();
    assert_eq!(table.resolve(graph[children].type_info()), graph[node].type_info());
    assert_eq!(
        class_of(&compiled, node).fields["children"],
        graph[children].type_info()
    );
}

#[rstest]
#[case::distinct("left", "right", None)]
#[case::same("left", "left", Some(ErrorCode::E0103))]
fn test_sibling_names_are_unique(
    #[case] first: &str,
    #[case] second: &str,
    #[case] expected: Option<ErrorCode>,
) {
    let mut tree = tree();
    let root = tree.root();
    let pair = tree.push(root, Item::object("Pair"));
    tree.push(pair, Item::declaration(first, "int"));
    tree.push(pair, Item::declaration(second, "int"));
    let result = compile(&mut tree, &everything(), &PipelineOptions::default());
    assert_eq!(result.err().map(|error| error.code()), expected);
}

#[test]
fn test_simple_squash_has_one_value_slot() {
    let mut tree = tree();
    let root = tree.root();
    tree.push(
        root,
        Item::declaration("leaf", "string").with_metadata("mutable", true),
    );
    tree.push(root, Item::object("wrapper").with_base("leaf"));
    let compiled = compile(&mut tree, &everything(), &PipelineOptions::default()).unwrap();

    let wrapper = element_at(&compiled, "wrapper");
    assert_eq!(compiled.graph[wrapper].kind(), ElementKind::Simple);
    assert_eq!(
        compiled.graph[wrapper].metadata().get("mutable"),
        Some(&Value::Bool(true))
    );
    assert_eq!(field_names(class_of(&compiled, wrapper)), vec!["simple_value"]);
    let ElementData::Simple { attributes, .. } = compiled.graph[wrapper].data() else {
        panic!("expected a simple element");
    };
    assert!(attributes.is_empty());
}

#[rstest]
#[case::list(false)]
#[case::refined(true)]
fn test_collection_of_collection(#[case] refines_arity: bool) {
    let mut tree = tree();
    let root = tree.root();
    tree.push(root, Item::declaration("numbers", "int").with_arity(Arity::ZERO_OR_MORE));
    let mut user = Item::declaration("user", "numbers").with_arity(Arity::ONE_OR_MORE);
    if refines_arity {
        user = user.with_metadata("refines_arity", true);
    }
    tree.push(root, user);
    let compiled = compile(&mut tree, &everything(), &PipelineOptions::default()).unwrap();
    let graph = &compiled.graph;
    let user = element_at(&compiled, "user");

    if refines_arity {
        assert_eq!(graph[user].kind(), ElementKind::Reference);
        let info = graph.type_info(user);
        assert_eq!(info.arity, Arity::ONE_OR_MORE);
        assert!(matches!(&info.shape, Shape::Fundamental(f) if f.ty == FundamentalType::Int));
        assert!(graph[user].metadata().get("refines_arity").is_none());
    } else {
        assert_eq!(graph[user].kind(), ElementKind::List);
        let numbers = element_at(&compiled, "numbers");
        assert_eq!(graph.type_info(user).shape, Shape::Ref(graph[numbers].type_info()));
        assert_eq!(fundamental_of(&compiled, user).ty, FundamentalType::Int);
    }
}

#[test]
fn test_lenient_extensions_are_ignored_everywhere() {
    let options = PipelineOptions::default().filter_unsupported_extensions(true);
    let mut tree = library();
    let compiled = compile(&mut tree, &everything(), &options).unwrap();

    let book = element_at(&compiled, "Book");
    assert!(compiled.graph[book].extensions().is_empty());
    assert!(
        compiled
            .graph
            .elements()
            .all(|(_, element)| element.kind() != ElementKind::Extension)
    );

    let mut tree = library();
    let error = compile(&mut tree, &everything(), &PipelineOptions::default()).unwrap_err();
    assert_eq!(error.code(), ErrorCode::E0404);
}

#[test]
fn test_transform_twice_is_structurally_equal() {
    let mut tree = library();
    let plugin = library_plugin();
    let first = compile(&mut tree, &plugin, &PipelineOptions::default()).unwrap();
    let second = transform(&tree, &plugin).unwrap();
    let third = transform(&tree, &plugin).unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}
