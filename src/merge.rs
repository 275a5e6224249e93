//! PDF composition
//!
//! Appends the pages of each source document onto the first document's page
//! tree, preserving page order within every source and list order across
//! sources. Only the object graph is stitched together; page contents are
//! never altered, so any page numbering must happen at render time.

use crate::{Error, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Merge `buffers` into a single PDF
///
/// The first buffer becomes the base document; every remaining buffer's
/// pages are appended in list order. Every input must be a complete,
/// decodable PDF. Fails on an empty list (no base document to append onto).
pub fn merge_documents(buffers: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut iter = buffers.iter();
    let base = iter
        .next()
        .ok_or_else(|| Error::Merge("Cannot merge an empty document list".to_string()))?;

    let mut doc = Document::load_mem(base)?;
    let pages_root = pages_root(&doc)?;

    // The root /Kids array is rewritten flat below, so base pages sitting
    // under intermediate tree nodes need re-parenting as well
    let base_pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let mut kids: Vec<Object> = Vec::with_capacity(base_pages.len());
    for page_id in base_pages {
        if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set("Parent", Object::Reference(pages_root));
        }
        kids.push(Object::Reference(page_id));
    }
    let mut max_id = doc.max_id + 1;

    for buffer in iter {
        let mut other = Document::load_mem(buffer)?;

        // Shift object numbers past everything already in `doc`
        other.renumber_objects_with(max_id);
        max_id = other.max_id + 1;

        let pages = other.get_pages();
        doc.objects.extend(other.objects);

        for (_, page_id) in pages {
            // Re-parent each page onto the base page tree
            if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                page.set("Parent", Object::Reference(pages_root));
            }
            kids.push(Object::Reference(page_id));
        }
    }

    let count = kids.len() as i64;
    let root = doc.get_object_mut(pages_root).and_then(Object::as_dict_mut)?;
    root.set("Kids", Object::Array(kids));
    root.set("Count", count);

    // Dense id space, fixed-up bookmarks, compressed streams
    doc.renumber_objects();
    doc.adjust_zero_pages();
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| Error::Merge(format!("Failed to serialize merged document: {}", e)))?;

    Ok(out)
}

/// Load each path and merge the documents, first file as base
pub fn merge_files<I, P>(paths: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut buffers = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Merge(format!("Failed to read {}: {}", path.display(), e)))?;
        buffers.push(bytes);
    }
    merge_documents(&buffers)
}

/// Number of pages in a PDF buffer
pub fn page_count(buffer: &[u8]) -> Result<usize> {
    let doc = Document::load_mem(buffer)?;
    Ok(doc.get_pages().len())
}

/// Object id of the document's /Pages tree root
fn pages_root(doc: &Document) -> Result<ObjectId> {
    let id = doc.catalog()?.get(b"Pages").and_then(Object::as_reference)?;
    Ok(id)
}
