//! Resolves a PDF outline destination to a 1-based page number.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};

/// Classification of an outline destination reference.
///
/// Modeled as a tagged sum rather than testing the underlying `lopdf::Object`
/// variants ad hoc at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    ObjRef,
    Dict,
    List,
    Named,
    Unknown,
}

fn classify(obj: &Object) -> RefKind {
    match obj {
        Object::Reference(_) => RefKind::ObjRef,
        Object::Dictionary(dict) if dict.has(b"D") => RefKind::Dict,
        Object::Array(items) if items.iter().any(|o| matches!(o, Object::Reference(_))) => {
            RefKind::List
        }
        Object::Name(_) | Object::String(_, _) => RefKind::Named,
        _ => RefKind::Unknown,
    }
}

fn is_ref_page(obj: &Object) -> bool {
    match obj {
        Object::Dictionary(dict) => dict
            .get(b"Type")
            .ok()
            .and_then(|t| t.as_name().ok())
            .is_some_and(|name| name == b"Page"),
        _ => false,
    }
}

fn named_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(bytes) | Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// Resolves outline destinations (object references, `/D` dictionaries,
/// destination-array lists, and named destinations) to 1-based page numbers.
///
/// Remote go-to actions are out of scope and resolve to `None`, matching the
/// upstream tool this crate's outline handling is modeled on.
pub struct OutlineRefResolver<'a> {
    doc: &'a Document,
    objid_to_pagenum: HashMap<u32, u32>,
}

impl<'a> OutlineRefResolver<'a> {
    /// Builds the resolver, traversing the document's page list once to map
    /// each page object id to its 1-based page number.
    #[must_use]
    pub fn new(doc: &'a Document) -> Self {
        let objid_to_pagenum = doc
            .get_pages()
            .into_iter()
            .map(|(page_num, object_id)| (object_id.0, page_num))
            .collect();
        Self {
            doc,
            objid_to_pagenum,
        }
    }

    /// Resolves a destination reference to a 1-based page number, or `None`
    /// if it could not be resolved (malformed reference, remote action, or
    /// an object id outside the page tree).
    #[must_use]
    pub fn resolve(&self, obj: &Object) -> Option<u32> {
        match classify(obj) {
            RefKind::ObjRef => self.resolve_obj_ref(obj),
            RefKind::Dict => {
                let dict = obj.as_dict().ok()?;
                self.resolve(dict.get(b"D").ok()?)
            }
            RefKind::List => {
                let items = obj.as_array().ok()?;
                let first_ref = items.iter().find(|o| matches!(o, Object::Reference(_)))?;
                self.resolve(first_ref)
            }
            RefKind::Named => {
                let name = named_bytes(obj)?;
                let dest = self.lookup_named_dest(name)?;
                self.resolve(dest)
            }
            RefKind::Unknown => None,
        }
    }

    fn resolve_obj_ref(&self, obj: &Object) -> Option<u32> {
        let Object::Reference(object_id) = obj else {
            return None;
        };
        let resolved = self.doc.get_object(*object_id).ok()?;
        if is_ref_page(resolved) {
            self.objid_to_pagenum.get(&object_id.0).copied()
        } else {
            self.resolve(resolved)
        }
    }

    /// Looks up a named destination under `/Root/Names/Dests/Names`.
    ///
    /// Only the flat-array form is handled; a `Dests` tree split across
    /// `/Kids` nodes (used for very large destination sets) is not walked.
    fn lookup_named_dest(&self, name: &[u8]) -> Option<&Object> {
        let root = self.doc.catalog().ok()?;
        let names_dict = self.deref_dict(root, b"Names")?;
        let dests_dict = self.deref_dict(names_dict, b"Dests")?;
        let names_array = dests_dict.get(b"Names").ok()?.as_array().ok()?;

        names_array
            .chunks_exact(2)
            .find(|pair| named_bytes(&pair[0]) == Some(name))
            .map(|pair| &pair[1])
    }

    fn deref_dict(&self, dict: &Dictionary, key: &[u8]) -> Option<&Dictionary> {
        match dict.get(key).ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Object;

    #[test]
    fn unknown_reference_resolves_to_none() {
        let doc = Document::new();
        let resolver = OutlineRefResolver::new(&doc);
        assert_eq!(resolver.resolve(&Object::Null), None);
    }

    #[test]
    fn list_without_any_reference_is_unknown() {
        let doc = Document::new();
        let resolver = OutlineRefResolver::new(&doc);
        let list = Object::Array(vec![Object::Integer(1), Object::Integer(2)]);
        assert_eq!(resolver.resolve(&list), None);
    }

    #[test]
    fn missing_named_dest_resolves_to_none() {
        let doc = Document::new();
        let resolver = OutlineRefResolver::new(&doc);
        let named = Object::Name(b"Intro".to_vec());
        assert_eq!(resolver.resolve(&named), None);
    }
}
