//! Integration tests for the streaming corpus builds: repeatable output and
//! locations that point back at the exact bytes of each record.

mod common;

use jisho_core::corpus::{CharacterCorpus, CorpusFile, DictionaryCorpus, SentenceCorpus};
use jisho_core::types::Corpus;
use jisho_core::LexiconConfig;
use std::collections::BTreeSet;
use tempfile::{tempdir, TempDir};

fn fixtures() -> (TempDir, LexiconConfig) {
    let dir = tempdir().unwrap();
    let config = common::write_corpora(dir.path());
    (dir, config)
}

fn open(corpus: Corpus, config: &LexiconConfig) -> CorpusFile {
    CorpusFile::open(corpus, config.source(corpus)).unwrap()
}

/// Every `<entry>` block of the dictionary fixture, with its line break.
fn fixture_entries() -> BTreeSet<String> {
    let mut entries = BTreeSet::new();
    let mut rest = common::DICTIONARY;
    while let Some(start) = rest.find("<entry>\n") {
        let end = start + rest[start..].find("</entry>\n").unwrap() + "</entry>\n".len();
        entries.insert(rest[start..end].to_string());
        rest = &rest[end..];
    }
    entries
}

#[test]
fn test_dictionary_build_is_idempotent() {
    let (_dir, config) = fixtures();

    let first = DictionaryCorpus::build(open(Corpus::Dictionary, &config)).unwrap();
    let second = DictionaryCorpus::build(open(Corpus::Dictionary, &config)).unwrap();

    assert_eq!(first.stats(), second.stats());
    let keys: Vec<&str> = first.index().keys().collect();
    assert_eq!(keys, second.index().keys().collect::<Vec<_>>());
    assert_eq!(keys.len(), 6);

    for key in keys {
        let locations = first.index().locations(key).unwrap();
        assert_eq!(Some(locations), second.index().locations(key), "key {}", key);
        for &location in locations {
            assert_eq!(first.decode(location), second.decode(location));
        }
    }
}

#[test]
fn test_dictionary_locations_read_back_entries() {
    let (_dir, config) = fixtures();
    let dictionary = DictionaryCorpus::open(&config.dictionary).unwrap();
    let file = open(Corpus::Dictionary, &config);
    let expected = fixture_entries();
    assert_eq!(expected.len(), 3);

    let mut seen = BTreeSet::new();
    for key in dictionary.index().keys() {
        for &location in dictionary.index().locations(key).unwrap() {
            let bytes = file.read(location).unwrap();
            let entry = std::str::from_utf8(bytes).unwrap();

            assert!(expected.contains(entry), "key {} read {:?}", key, entry);
            assert!(
                entry.contains(&format!("<keb>{}</keb>", key)) || entry.contains(&format!("<reb>{}</reb>", key)),
                "key {} not in its entry",
                key
            );
            seen.insert(entry.to_string());
        }
    }

    assert_eq!(seen, expected);
}

#[test]
fn test_character_build_is_idempotent() {
    let (_dir, config) = fixtures();

    let first = CharacterCorpus::build(open(Corpus::Characters, &config));
    let second = CharacterCorpus::build(open(Corpus::Characters, &config));

    assert_eq!(first.stats(), second.stats());
    let literals: BTreeSet<&str> = first.literals().collect();
    assert_eq!(literals, second.literals().collect::<BTreeSet<_>>());
    assert_eq!(literals.len(), 3);

    for literal in literals {
        assert_eq!(first.get(literal), second.get(literal));
        assert_eq!(first.frequency(literal), second.frequency(literal));
        assert!(first.get(literal).is_some());
    }
}

#[test]
fn test_sentence_build_is_idempotent() {
    let (_dir, config) = fixtures();

    let first = SentenceCorpus::build(open(Corpus::Sentences, &config));
    let second = SentenceCorpus::build(open(Corpus::Sentences, &config));

    assert_eq!(first.stats(), second.stats());
    assert_eq!(first.len(), 3);

    let headwords: BTreeSet<&str> = first.headwords().collect();
    assert_eq!(headwords, second.headwords().collect::<BTreeSet<_>>());
    assert_eq!(headwords, BTreeSet::from(["犬", "犬小屋", "好き"]));

    let all: [&str; 0] = [];
    for headword in headwords {
        assert_eq!(first.get(&[headword], &all), second.get(&[headword], &all));
    }

    assert_eq!(
        first.search_phrase("", usize::MAX, 0, false),
        second.search_phrase("", usize::MAX, 0, false)
    );
    assert_eq!(first.search_phrase("", usize::MAX, 0, false).len(), 3);
}
