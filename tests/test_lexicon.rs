//! Integration tests for the lookup API over a full fixture data directory.

mod common;

use jisho_core::types::{Corpus, HeadwordLookup, UNRANKED};
use jisho_core::{Lexicon, LexiconError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::tempdir;

fn parts(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_open_all_corpora() {
    let dir = tempdir().unwrap();
    let config = common::write_corpora(dir.path());

    let lexicon = Lexicon::open(&config).unwrap();
    assert_eq!(lexicon.loaded(), Corpus::ALL.to_vec());
}

#[test]
fn test_headword_exact_and_longer() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    match lexicon.lookup_headword("犬", false).unwrap() {
        HeadwordLookup::Prefix { exact, shorter, longer } => {
            let exact = exact.unwrap();
            assert_eq!(exact.len(), 1);
            assert_eq!(exact[0].senses[0].glosses, vec!["dog"]);
            assert_eq!(exact[0].senses[0].pos[0].description, "noun (common) (futsuumeishi)");
            assert_eq!(exact[0].words[0].priority, vec!["ichi1"]);
            assert!(shorter.is_none());
            assert_eq!(longer, vec!["犬小屋"]);
        }
        other => panic!("unexpected lookup result: {:?}", other),
    }
}

#[test]
fn test_headword_shorter_when_absent() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    match lexicon.lookup_headword("犬小", false).unwrap() {
        HeadwordLookup::Prefix { exact, shorter, longer } => {
            assert!(exact.is_none());
            assert_eq!(shorter.unwrap()[0].words[0].text, "犬");
            assert_eq!(longer, vec!["犬小屋"]);
        }
        other => panic!("unexpected lookup result: {:?}", other),
    }

    match lexicon.lookup_headword("ねこ", false).unwrap() {
        HeadwordLookup::Prefix { exact, .. } => {
            let record = &exact.unwrap()[0];
            assert_eq!(record.words[0].text, "猫");
            assert_eq!(record.senses[0].misc[0].code, "uk");
        }
        other => panic!("unexpected lookup result: {:?}", other),
    }
}

#[test]
fn test_headword_regex() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    let result = lexicon.lookup_headword("いぬ.*", true).unwrap();
    assert_eq!(
        result,
        HeadwordLookup::Regex {
            matches: vec!["いぬ".to_string(), "いぬごや".to_string()]
        }
    );

    let err = lexicon.lookup_headword("(", true).unwrap_err();
    assert!(matches!(err, LexiconError::InvalidInput(_)));
}

#[test]
fn test_character_lookup() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    let record = lexicon.lookup_character("語").unwrap().unwrap();
    assert_eq!(record.stroke_count, Some(14));
    assert_eq!(record.meanings, vec!["word"]);
    assert_eq!(record.on, vec!["ゴ"]);

    assert!(lexicon.lookup_character("犬").unwrap().is_none());
}

#[test]
fn test_examples_and_phrase() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    let examples = lexicon.lookup_examples(&["子犬", "犬"], &["いぬ"]).unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].sentence.target, "I like dogs.");
    assert_eq!(examples[1].sense, 1);

    // Unmarked annotation tokens are never indexed
    assert!(lexicon.lookup_examples(&["作る"], &[] as &[&str]).unwrap().is_empty());

    let found = lexicon.search_phrase("犬", 10, 0, false).unwrap();
    assert_eq!(found.len(), 3);
    let found = lexicon.search_phrase("犬", 1, 2, false).unwrap();
    assert_eq!(found[0].source, "猫と犬。");
}

#[test]
fn test_parts_and_combinations_ranked() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    assert_eq!(lexicon.get_parts("語").unwrap(), vec!["五", "口", "言"]);
    assert!(lexicon.get_parts("犬").unwrap().is_empty());

    let combos = lexicon.get_combinations(&parts(&["言"])).unwrap();
    let pairs: Vec<_> = combos.iter().map(|r| (r.literal.as_str(), r.rank)).collect();
    assert_eq!(pairs, vec![("話", 134), ("語", 301)]);

    let all = lexicon.get_combinations(&BTreeSet::new()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_similars_ranked() {
    let dir = tempdir().unwrap();
    let lexicon = Lexicon::open(&common::write_corpora(dir.path())).unwrap();

    let similar = lexicon.get_similars("士").unwrap();
    let pairs: Vec<_> = similar.iter().map(|r| (r.literal.as_str(), r.rank)).collect();
    assert_eq!(pairs, vec![("工", 139), ("土", UNRANKED), ("干", UNRANKED)]);

    assert!(lexicon.get_similars("猫").unwrap().is_empty());
}

#[test]
fn test_concurrent_lookups() {
    let dir = tempdir().unwrap();
    let lexicon = Arc::new(Lexicon::open(&common::write_corpora(dir.path())).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let lexicon = Arc::clone(&lexicon);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let literal = if i % 2 == 0 { "語" } else { "話" };
                    let record = lexicon.lookup_character(literal).unwrap().unwrap();
                    assert_eq!(record.literal, literal);

                    let found = lexicon.search_phrase("犬", 5, 0, true).unwrap();
                    assert_eq!(found.len(), 3);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_missing_corpus_is_fatal() {
    let dir = tempdir().unwrap();
    let config = common::write_corpora(dir.path());
    std::fs::remove_file(&config.sentences).unwrap();

    let err = Lexicon::open(&config).err().unwrap();
    assert!(matches!(
        err,
        LexiconError::CorpusUnavailable { corpus: Corpus::Sentences, .. }
    ));
}
