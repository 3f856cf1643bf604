//! End-to-end extraction through the library API

use std::fs::File;
use std::io::{self, BufReader, Read};

use tempfile::TempDir;
use wikiextract::{
    ArticleSink, CharacterWhitelist, CleanArticle, ExtractError, ExtractionConfig, Extractor,
    InputFormat, JsonlSink, RejectReason,
};

use crate::helpers::{articles, compress, dump, page, read_jsonl, write_archive};

fn extractor(config: ExtractionConfig) -> Extractor {
    Extractor::new(config).unwrap()
}

fn lenient(max_articles: usize) -> Extractor {
    extractor(ExtractionConfig {
        max_articles,
        min_content_length: 1,
        ..Default::default()
    })
}

// ============================================================================
// Acceptance Scenarios
// ============================================================================

#[test]
fn bold_markup_is_stripped_from_single_page() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(
        dir.path(),
        "one.xml.bz2",
        &dump(&[page("Example", 0, "Hello '''world'''.")]),
    );
    let output = dir.path().join("out.jsonl");

    let mut sink = JsonlSink::create(&output).unwrap();
    lenient(10)
        .extract_file(&archive, InputFormat::Bzip2, &mut sink)
        .unwrap();
    drop(sink);

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\"title\":\"Example\",\"content\":\"Hello world.\"}\n"
    );
}

#[test]
fn category_page_yields_no_records() {
    let xml = dump(&[page("Category:Cities", 14, &"City list. ".repeat(30))]);
    let mut out: Vec<CleanArticle> = Vec::new();
    let stats = lenient(10)
        .extract_archive(compress(xml.as_bytes()).as_slice(), &mut out)
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(stats.pages_seen, 1);
}

#[test]
fn link_display_and_parenthetical_survive() {
    let xml = dump(&[page("C", 0, "[[Link|Display]] text [1] (see also)")]);
    let mut out: Vec<CleanArticle> = Vec::new();
    lenient(10).extract_xml(xml.as_bytes(), &mut out).unwrap();
    assert_eq!(out[0].content, "Display text (see also)");
}

#[test]
fn capacity_keeps_first_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(dir.path(), "five.xml.bz2", &dump(&articles(5)));
    let output = dir.path().join("data").join("articles.jsonl");

    let config = ExtractionConfig {
        max_articles: 2,
        ..Default::default()
    };
    let mut sink = JsonlSink::create(&output).unwrap();
    let stats = extractor(config)
        .extract_file(&archive, InputFormat::Bzip2, &mut sink)
        .unwrap();
    drop(sink);

    let titles: Vec<_> = read_jsonl(&output).into_iter().map(|(t, _)| t).collect();
    assert_eq!(titles, vec!["Article 1", "Article 2"]);
    assert!(stats.stopped_early);
}

// ============================================================================
// Boundedness
// ============================================================================

/// Plain XML source that fails any read past `limit` bytes.
struct Tripwire {
    inner: io::Cursor<Vec<u8>>,
    limit: u64,
}

impl Read for Tripwire {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.inner.position();
        if pos >= self.limit {
            return Err(io::Error::new(io::ErrorKind::Other, "over-read"));
        }
        let room = (self.limit - pos) as usize;
        let take = room.min(buf.len());
        self.inner.read(&mut buf[..take])
    }
}

#[test]
fn stops_reading_once_capacity_is_reached() {
    for n in 1..=4 {
        let xml = dump(&articles(8));
        let limit = xml
            .match_indices("</page>")
            .nth(n - 1)
            .map(|(i, _)| i + "</page>".len())
            .unwrap() as u64;
        let source = Tripwire {
            inner: io::Cursor::new(xml.into_bytes()),
            limit,
        };

        let mut out: Vec<CleanArticle> = Vec::new();
        let stats = extractor(ExtractionConfig {
            max_articles: n,
            ..Default::default()
        })
        .extract_xml(BufReader::with_capacity(32, source), &mut out)
        .unwrap();
        assert_eq!(out.len(), n);
        assert_eq!(stats.pages_seen, n as u64);
    }
}

// ============================================================================
// Input Variants
// ============================================================================

#[test]
fn multistream_archive_is_read_across_streams() {
    let pages = articles(4);
    let xml = dump(&pages);
    let split = xml.find("  <page>").unwrap() + pages[0].len() + pages[1].len();
    let mut archive = compress(xml[..split].as_bytes());
    archive.extend(compress(xml[split..].as_bytes()));

    let mut out: Vec<CleanArticle> = Vec::new();
    let stats = extractor(ExtractionConfig::default())
        .extract_archive(archive.as_slice(), &mut out)
        .unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[3].title, "Article 4");
    assert!(!stats.stopped_early);
}

#[test]
fn plain_xml_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.xml");
    std::fs::write(&path, dump(&articles(2))).unwrap();

    let mut out: Vec<CleanArticle> = Vec::new();
    lenient(10)
        .extract_file(&path, InputFormat::from_path(&path), &mut out)
        .unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn prefixed_element_names_match() {
    let xml = "<mw:mediawiki xmlns:mw=\"http://www.mediawiki.org/xml/export-0.10/\">\
               <mw:page><mw:title>Prefixed</mw:title><mw:ns>0</mw:ns>\
               <mw:revision><mw:text>Body text</mw:text></mw:revision></mw:page>\
               </mw:mediawiki>";
    let mut out: Vec<CleanArticle> = Vec::new();
    lenient(10).extract_xml(xml.as_bytes(), &mut out).unwrap();
    assert_eq!(out, vec![CleanArticle::new("Prefixed", "Body text")]);
}

#[test]
fn thai_pages_with_whitelist() {
    let config = ExtractionConfig {
        min_content_length: 1,
        ..ExtractionConfig::thai()
    };
    assert_eq!(config.character_whitelist, Some(CharacterWhitelist::thai()));
    let xml = dump(&[
        page("แม่แบบ:กล่องข้อมูล", 0, "{{Infobox}}"),
        page(
            "กรุงเทพมหานคร",
            0,
            "'''กรุงเทพมหานคร''' เป็น[[เมืองหลวง]]ของ[[ประเทศไทย]] © 2024",
        ),
    ]);
    let mut out: Vec<CleanArticle> = Vec::new();
    let stats = extractor(config)
        .extract_xml(xml.as_bytes(), &mut out)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "กรุงเทพมหานคร");
    assert_eq!(out[0].content, "กรุงเทพมหานคร เป็นเมืองหลวงของประเทศไทย 2024");
    assert_eq!(stats.rejected.get(RejectReason::ExcludedTitlePrefix), 1);
}

// ============================================================================
// Fatal Errors
// ============================================================================

#[test]
fn non_bzip2_input_is_corrupt_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.xml.bz2");
    std::fs::write(&path, b"this is not a bzip2 archive at all").unwrap();

    let mut out: Vec<CleanArticle> = Vec::new();
    let err = lenient(10)
        .extract_file(&path, InputFormat::Bzip2, &mut out)
        .unwrap_err();
    assert!(err.is_corrupt_archive(), "{}", err);
    assert!(out.is_empty());
}

#[test]
fn truncated_xml_keeps_records_written_before_failure() {
    let dir = TempDir::new().unwrap();
    let xml = dump(&articles(3));
    let cut = xml.rfind("<title>Article 3").unwrap();
    let output = dir.path().join("partial.jsonl");

    let mut sink = JsonlSink::create(&output).unwrap();
    let err = extractor(ExtractionConfig::default())
        .extract_xml(&xml.as_bytes()[..cut], &mut sink)
        .unwrap_err();
    assert!(err.is_malformed_structure(), "{}", err);

    // Flushed by the pipeline before returning, not by drop.
    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 2);
    assert_eq!(sink.records(), 2);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut out: Vec<CleanArticle> = Vec::new();
    let err = lenient(1)
        .extract_file(&dir.path().join("absent.xml.bz2"), InputFormat::Bzip2, &mut out)
        .unwrap_err();
    assert!(matches!(err, ExtractError::Io(_)));
}

struct BrokenSink {
    accepted_before_failure: usize,
    appended: Vec<CleanArticle>,
}

impl ArticleSink for BrokenSink {
    fn append(&mut self, article: CleanArticle) -> io::Result<()> {
        if self.appended.len() == self.accepted_before_failure {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
        }
        self.appended.push(article);
        Ok(())
    }
}

#[test]
fn sink_failure_ends_the_run() {
    let mut sink = BrokenSink {
        accepted_before_failure: 1,
        appended: Vec::new(),
    };
    let xml = dump(&articles(3));
    let err = lenient(10)
        .extract_xml(xml.as_bytes(), &mut sink)
        .unwrap_err();
    assert!(matches!(err, ExtractError::Sink(_)));
    assert_eq!(sink.appended.len(), 1);
}

#[test]
fn file_and_memory_sources_agree() {
    let dir = TempDir::new().unwrap();
    let xml = dump(&articles(3));
    let path = dir.path().join("a.xml");
    std::fs::write(&path, &xml).unwrap();

    let mut from_file: Vec<CleanArticle> = Vec::new();
    lenient(10)
        .extract_xml(BufReader::new(File::open(&path).unwrap()), &mut from_file)
        .unwrap();
    let mut from_memory: Vec<CleanArticle> = Vec::new();
    lenient(10)
        .extract_xml(xml.as_bytes(), &mut from_memory)
        .unwrap();
    assert_eq!(from_file, from_memory);
}
