//! Lookup and assertion helpers over compiled element graphs.

use sdl::types::{ClassTypeInfo, FundamentalTypeInfo};
use sdl::{Compiled, ElementId, ElementKind, Shape, TypeInfo};

/// Element at a dotted path of names below the root.
pub fn element_at(compiled: &Compiled, path: &str) -> ElementId {
    path.split('.').fold(compiled.root, |parent, name| {
        compiled
            .graph
            .child_named(parent, name)
            .unwrap_or_else(|| panic!("no element '{}' in '{}'", name, path))
    })
}

pub fn assert_kind(compiled: &Compiled, path: &str, expected: ElementKind) {
    let id = element_at(compiled, path);
    assert_eq!(
        compiled.graph[id].kind(),
        expected,
        "unexpected kind for '{}'",
        path
    );
}

/// The TypeInfo an element's own TypeInfo resolves to through `Ref` links.
pub fn resolved_type_info(compiled: &Compiled, id: ElementId) -> &TypeInfo {
    let table = compiled.graph.type_infos();
    &table[table.resolve(compiled.graph[id].type_info())]
}

pub fn class_of(compiled: &Compiled, id: ElementId) -> &ClassTypeInfo {
    match &resolved_type_info(compiled, id).shape {
        Shape::Class(class) => class,
        other => panic!("expected a class, found {:?}", other),
    }
}

pub fn fundamental_of(compiled: &Compiled, id: ElementId) -> &FundamentalTypeInfo {
    match &resolved_type_info(compiled, id).shape {
        Shape::Fundamental(info) => info,
        other => panic!("expected a fundamental, found {:?}", other),
    }
}

pub fn field_names(class: &ClassTypeInfo) -> Vec<&str> {
    class.fields.keys().map(|name| name.as_str()).collect()
}
