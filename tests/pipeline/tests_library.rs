//! The library schema compiled end to end.

use sdl::{Arity, ElementData, ElementKind, FundamentalType, PipelineOptions, Shape, Value, compile};

use crate::helpers::graph_assertions::{
    assert_kind, class_of, element_at, field_names, fundamental_of, resolved_type_info,
};
use crate::helpers::plugin_fixtures::library_plugin;
use crate::helpers::tree_builders::library;

fn compiled() -> sdl::Compiled {
    let mut tree = library();
    compile(&mut tree, &library_plugin(), &PipelineOptions::default()).unwrap()
}

#[test]
fn test_every_root_declaration_is_included() {
    let compiled = compiled();
    let names: Vec<_> = compiled
        .included_elements()
        .map(|element| element.name().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Name", "Isbn", "Author", "Hardcover", "Paperback", "Book", "Catalog"]
    );
}

#[test]
fn test_element_kinds() {
    let compiled = compiled();
    assert_kind(&compiled, "Name", ElementKind::Fundamental);
    assert_kind(&compiled, "Isbn", ElementKind::Simple);
    assert_kind(&compiled, "Author", ElementKind::Compound);
    assert_kind(&compiled, "Author.name", ElementKind::Reference);
    assert_kind(&compiled, "Author.born", ElementKind::Fundamental);
    assert_kind(&compiled, "Book.isbn", ElementKind::Reference);
    assert_kind(&compiled, "Book.authors", ElementKind::Reference);
    assert_kind(&compiled, "Book.tags", ElementKind::Fundamental);
    assert_kind(&compiled, "Book.format", ElementKind::Variant);
    assert_kind(&compiled, "Catalog.books", ElementKind::Reference);
}

#[test]
fn test_book_fields_and_extension() {
    let compiled = compiled();
    let book = element_at(&compiled, "Book");
    assert_eq!(
        field_names(class_of(&compiled, book)),
        vec!["isbn", "title", "authors", "tags", "format"]
    );

    let extensions = compiled.graph[book].extensions();
    assert_eq!(extensions.len(), 1);
    let index = &compiled.graph[extensions[0]];
    assert_eq!(index.kind(), ElementKind::Extension);
    assert_eq!(
        index.data(),
        &ElementData::Extension {
            arguments: vec![Value::from("title")]
        }
    );
    assert_eq!(index.parent(), Some(book));
}

#[test]
fn test_references_point_at_targets() {
    let compiled = compiled();
    let graph = &compiled.graph;
    let authors = element_at(&compiled, "Book.authors");
    let author = element_at(&compiled, "Author");

    assert_eq!(graph[authors].data(), &ElementData::Reference { reference: author });
    let info = graph.type_info(authors);
    assert_eq!(info.arity, Arity::ONE_OR_MORE);
    assert_eq!(info.shape, Shape::Ref(graph[author].type_info()));

    let name = element_at(&compiled, "Author.name");
    assert_eq!(
        graph[name].data(),
        &ElementData::Reference {
            reference: element_at(&compiled, "Name")
        }
    );
    let info = fundamental_of(&compiled, name);
    assert_eq!(info.ty, FundamentalType::String);
    assert_eq!(info.constraints.get("max_length"), Some(&Value::Int(40)));
}

#[test]
fn test_simple_isbn_shape() {
    let compiled = compiled();
    let isbn = element_at(&compiled, "Isbn");
    let class = class_of(&compiled, isbn);
    assert_eq!(field_names(class), vec!["simple_value", "checked"]);
    assert_eq!(compiled.graph[isbn].attribute_names(), &["checked"]);

    let table = compiled.graph.type_infos();
    let Shape::Fundamental(value) = &table[table.resolve(class.fields["simple_value"])].shape
    else {
        panic!("expected a fundamental value field");
    };
    assert_eq!(value.ty, FundamentalType::String);
    assert_eq!(value.constraints.get("max_length"), Some(&Value::Int(13)));
}

#[test]
fn test_optional_and_collection_arity() {
    let compiled = compiled();
    let born = element_at(&compiled, "Author.born");
    assert_eq!(compiled.graph.type_info(born).arity, Arity::OPTIONAL);

    let tags = element_at(&compiled, "Book.tags");
    let tags_info = resolved_type_info(&compiled, tags);
    assert_eq!(tags_info.arity, Arity::ZERO_OR_MORE);
    assert_eq!(
        compiled.graph[tags].metadata().get("as_dictionary"),
        Some(&Value::Bool(false))
    );
}

#[test]
fn test_variant_alternatives_are_the_format_objects() {
    let compiled = compiled();
    let graph = &compiled.graph;
    let format = element_at(&compiled, "Book.format");
    let hardcover = element_at(&compiled, "Hardcover");
    let paperback = element_at(&compiled, "Paperback");

    assert_eq!(
        graph[format].data(),
        &ElementData::Variant {
            variations: vec![hardcover, paperback]
        }
    );
    assert_eq!(
        graph.type_info(format).shape,
        Shape::AnyOf(vec![graph[hardcover].type_info(), graph[paperback].type_info()])
    );
}

#[test]
fn test_every_link_is_reachable_from_root() {
    let compiled = compiled();
    let reachable = compiled.graph.walk(compiled.root);
    assert_eq!(reachable.len(), compiled.graph.len());
    for (id, element) in compiled.graph.elements() {
        if id != compiled.root {
            assert!(element.parent().is_some(), "{} has no parent", id);
        }
    }
}
