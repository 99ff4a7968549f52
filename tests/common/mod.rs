#![allow(dead_code)]

pub mod fixtures;

use folio::{InMemoryResourceProvider, ReportEngine, ReportEngineBuilder};
use lopdf::Document as LopdfDocument;
use lopdf::content::Content;
use serde_json::Value;
use std::io::{Cursor, Read};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// An engine whose templates live in memory, stored as `.source` files.
pub fn engine_with(templates: &[(&str, Value)]) -> ReportEngine {
    let provider = InMemoryResourceProvider::new();
    for (identifier, design) in templates {
        let bytes = serde_json::to_vec_pretty(design).expect("fixture serializes");
        provider.add(*identifier, bytes).expect("in-memory provider accepts writes");
    }
    ReportEngineBuilder::new().with_provider(provider).build()
}

/// Every string drawn with `Tj`, page by page, in content order.
pub fn pdf_strings(bytes: &[u8]) -> Vec<String> {
    let doc = LopdfDocument::load_mem(bytes).expect("valid PDF");
    let mut strings = Vec::new();
    for page_id in doc.get_pages().values() {
        let content = Content::decode(&doc.get_page_content(*page_id).expect("page content"))
            .expect("decodable content");
        for op in content.operations {
            if op.operator == "Tj"
                && let Ok(text) = op.operands[0].as_str()
            {
                strings.push(String::from_utf8_lossy(text).into_owned());
            }
        }
    }
    strings
}

pub fn pdf_page_count(bytes: &[u8]) -> usize {
    LopdfDocument::load_mem(bytes).expect("valid PDF").get_pages().len()
}

/// Reads one entry of an office package as text.
pub fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut entry = archive.by_name(name).expect("entry present");
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("utf-8 entry");
    text
}
