//! In-process test documents.

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// Build a document with `pages` pages; page `n` draws the text "Page n".
pub fn sample_document(pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(pages as i64),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Write a sample document with `pages` pages to `dir/name`.
pub fn write_sample(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let path = dir.join(name);
    let mut doc = sample_document(pages);
    doc.save(&path).unwrap();
    path
}

/// Content stream bytes of every page, in page order.
pub fn page_contents(doc: &Document) -> Vec<Vec<u8>> {
    doc.get_pages()
        .values()
        .map(|id| doc.get_page_content(*id).unwrap())
        .collect()
}

/// Content stream bytes of every page of the PDF at `path`.
pub fn page_contents_at(path: &Path) -> Vec<Vec<u8>> {
    page_contents(&Document::load(path).unwrap())
}
