//! Item trees for common schema shapes, built through the public API.

use sdl::item::VariantAlternative;
use sdl::{Arity, Item, ItemKind, ItemTree, SourceLocation, Value};

pub const SOURCE: &str = "test.sdl";

pub fn tree() -> ItemTree {
    ItemTree::new(SOURCE)
}

pub fn at(line: u32, column: u32) -> SourceLocation {
    SourceLocation::new(SOURCE, line, column)
}

/// ```text
/// nodes Node*
/// Node { children nodes* }
/// ```
pub fn recursive_list() -> ItemTree {
    let mut tree = tree();
    let root = tree.root();
    tree.push(root, Item::declaration("nodes", "Node").with_arity(Arity::ZERO_OR_MORE));
    let node = tree.push(root, Item::object("Node"));
    tree.push(node, Item::declaration("children", "nodes").with_arity(Arity::ZERO_OR_MORE));
    tree
}

/// A small library schema touching every common element kind.
///
/// ```text
/// Name string { max_length 40 }
/// Isbn : string { max_length 13; checked bool (attribute) }
/// Author { name Name; born date? }
/// Hardcover { pages int }
/// Paperback { pages int }
/// Book {
///     isbn Isbn
///     title string
///     authors Author+
///     tags string*
///     format (Hardcover | Paperback)
///     index("title")
/// }
/// Catalog { books Book* }
/// ```
pub fn library() -> ItemTree {
    let mut tree = tree();
    let root = tree.root();

    tree.push(
        root,
        Item::declaration("Name", "string")
            .with_metadata("max_length", 40i64)
            .at(at(1, 1)),
    );
    let isbn = tree.push(
        root,
        Item::object("Isbn")
            .with_base("string")
            .with_metadata("max_length", 13i64)
            .at(at(2, 1)),
    );
    tree.push(
        isbn,
        Item::declaration("checked", "bool").with_item_kind(ItemKind::Attribute),
    );

    let author = tree.push(root, Item::object("Author").at(at(3, 1)));
    tree.push(author, Item::declaration("name", "Name"));
    tree.push(
        author,
        Item::declaration("born", "date").with_arity(Arity::OPTIONAL),
    );

    for format in ["Hardcover", "Paperback"] {
        let id = tree.push(root, Item::object(format));
        tree.push(id, Item::declaration("pages", "int"));
    }

    let book = tree.push(root, Item::object("Book").at(at(10, 1)));
    tree.push(book, Item::declaration("isbn", "Isbn"));
    tree.push(book, Item::declaration("title", "string"));
    tree.push(
        book,
        Item::declaration("authors", "Author").with_arity(Arity::ONE_OR_MORE),
    );
    tree.push(
        book,
        Item::declaration("tags", "string").with_arity(Arity::ZERO_OR_MORE),
    );
    tree.push(
        book,
        Item::variant(
            "format",
            vec![
                VariantAlternative::new("Hardcover", at(15, 12)),
                VariantAlternative::new("Paperback", at(15, 24)),
            ],
        ),
    );
    tree.push(book, Item::extension("index", vec![Value::from("title")]));

    let catalog = tree.push(root, Item::object("Catalog"));
    tree.push(
        catalog,
        Item::declaration("books", "Book").with_arity(Arity::ZERO_OR_MORE),
    );
    tree
}
