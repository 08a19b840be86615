//! End-to-end checks of the public extraction API on real-world byline shapes.

use wokescope_core::config_file::ExtractionConfig;
use wokescope_parsing::{
    AuthorExtractor, ParsingConfigBuilder, RowParser, TypeCategory, classify_type_main,
    extract_authors, parse_csv_str, parse_json_str, read_csv_rows,
};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn splits_on_every_delimiter() {
    assert_eq!(
        extract_authors("Ana Li and Bob Ray; Cara Fox"),
        names(&["Ana Li", "Bob Ray", "Cara Fox"])
    );
    assert_eq!(
        extract_authors("Ana Li & Bob Ray | Cara Fox"),
        names(&["Ana Li", "Bob Ray", "Cara Fox"])
    );
}

#[test]
fn strips_publisher_noise() {
    assert_eq!(
        extract_authors("Jane Doe Search for more papers by this author"),
        names(&["Jane Doe"])
    );
}

#[test]
fn strips_glued_affiliation_tails() {
    assert_eq!(
        extract_authors(
            "Jamie J. LadgeNortheastern UniversityBoston CollegeBabson CollegeSearch for more papers by this author"
        ),
        names(&["Jamie J. Ladge"])
    );
    assert_eq!(
        extract_authors(
            "Edward E. Lawler, IIIUniversity of Southern CaliforniaSearch for more papers by this author"
        ),
        names(&["Edward E. Lawler III"])
    );
}

#[test]
fn strips_glued_multi_word_institutions() {
    for (raw, expected) in [
        (
            "Jane DoeCarnegie Mellon UniversitySearch for more papers by this author",
            "Jane Doe",
        ),
        (
            "Ana LiJohns Hopkins UniversitySearch for more papers by this author",
            "Ana Li",
        ),
        (
            "Ana LiOhio State UniversitySearch for more papers by this author",
            "Ana Li",
        ),
        (
            "Ana LiPenn State UniversityBrigham Young UniversitySearch for more papers by this author",
            "Ana Li",
        ),
    ] {
        assert_eq!(extract_authors(raw), names(&[expected]), "{raw}");
    }
}

#[test]
fn keeps_authors_glued_between_affiliations() {
    assert_eq!(
        extract_authors(
            "Ana LiUniversity of OregonSearch for more papers by this authorBo ChenJohns Hopkins UniversitySearch for more papers by this author"
        ),
        names(&["Ana Li", "Bo Chen"])
    );
    assert_eq!(
        extract_authors("Ana LiUniversity of OregonBo ChenUniversity of Utah"),
        names(&["Ana Li", "Bo Chen"])
    );
}

#[test]
fn hyphenated_name_starting_with_and() {
    assert_eq!(extract_authors("And-Erson Smith"), names(&["And-Erson Smith"]));
}

#[test]
fn keeps_et_al_label() {
    assert_eq!(extract_authors("Agarwal et al."), names(&["Agarwal et al."]));
}

#[test]
fn rejects_institutional_nouns() {
    assert!(extract_authors("Organization Studies").is_empty());
    assert!(extract_authors("Sustainability").is_empty());
}

#[test]
fn clean_names_pass_through_unchanged() {
    for name in [
        "Jane Doe",
        "Ana Li",
        "Mary Ann Smith",
        "Jamie J. Ladge",
        "Edward E. Lawler III",
        "John McDonald Jr.",
    ] {
        assert_eq!(extract_authors(name), names(&[name]), "{name}");
        let again = extract_authors(&extract_authors(name).join("; "));
        assert_eq!(again, names(&[name]), "second pass over {name}");
    }
}

#[test]
fn type_inference_is_gated_by_journal() {
    assert_eq!(
        classify_type_main("", "A Meta-Analysis of Platform Effects", "", "MS"),
        TypeCategory::Review
    );
    assert_eq!(
        classify_type_main("", "Some title", "Some abstract", "AMJ"),
        TypeCategory::Unknown
    );
}

#[test]
fn configured_noise_phrase_becomes_boundary() {
    let config = ParsingConfigBuilder::new()
        .apply_file_config(&ExtractionConfig {
            extra_noise_phrases: Some(vec!["Opens in new window".to_string()]),
            ..Default::default()
        })
        .build()
        .unwrap();
    let extractor = AuthorExtractor::with_config(&config);
    assert_eq!(
        extractor.extract("Jane DoeOpens in new windowJohn Roe"),
        names(&["Jane Doe", "John Roe"])
    );
}

#[test]
fn csv_rows_carry_extracted_fields() {
    let csv = "\
year,vol,iss,author,title,abstract,url,type,journal,field,woke_score,keywords,justification
2015,60,2,\"Agarwal et al.\",Platforms,A meta-analysis,,,MS,OR,5,\"[\"\"Platforms\"\"]\",ok
,,,,,,,,,,,,
2016,61,1,Jane Doe Search for more papers by this author,Voice,,,Editorial,AMJ,Management,12,,
";
    let rows = parse_csv_str(csv).unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].authors_list, names(&["Agarwal et al."]));
    assert_eq!(rows[0].type_main, TypeCategory::Review);
    assert_eq!(rows[0].keywords_list, names(&["platforms"]));
    assert_eq!(rows[0].woke_score, 5);

    assert_eq!(rows[1].authors_list, names(&["Jane Doe"]));
    assert_eq!(rows[1].type_main, TypeCategory::Commentary);
    assert!(!rows[1].is_scored());
}

#[test]
fn row_parser_honours_journal_allow_list() {
    let config = ParsingConfigBuilder::new()
        .set_infer_type_journals(vec!["AMJ".to_string()])
        .build()
        .unwrap();
    let rows = RowParser::with_config(&config)
        .parse_json(r#"[{"title": "A tutorial on panels", "journal": "AMJ", "woke_score": 2}]"#)
        .unwrap();
    assert_eq!(rows[0].type_main, TypeCategory::Tutorial);
}

#[test]
fn runtime_chunk_rows_take_the_chunk_year() {
    let chunk = r#"{"year": 2019, "rows": [
        [null, 64, 3, "Ana Li; Bo Chen", "Pay gaps", "", "", "", "MS", "OR", 7.0, ["Gender", "gender"], ""],
        [2018, null, null, "Cy Dee", "Voice", "", "", "nan", "SMJ", "Strategy", "3", "", ""]
    ]}"#;
    let rows = parse_json_str(chunk).unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].year, 2019);
    assert_eq!(rows[0].authors_list, names(&["Ana Li", "Bo Chen"]));
    assert_eq!(rows[0].woke_score, 7);
    assert_eq!(rows[0].keywords_list, names(&["gender"]));
    assert_eq!(rows[0].type_main, TypeCategory::ResearchArticle);

    assert_eq!(rows[1].year, 2018);
    assert_eq!(rows[1].type_main, TypeCategory::Unknown);
}

#[test]
fn json_scalar_document_is_rejected() {
    assert!(parse_json_str("42").is_err());
}

#[test]
fn detailed_row_parse_reports_rejected_chunks() {
    let csv = "\
year,author,title,journal,woke_score
2021,Ana LiOhio State University; Bo Chen,Voice,AMJ,6
";
    let mut raw_rows = read_csv_rows(csv).unwrap();
    assert_eq!(raw_rows.len(), 1);

    let (row, extraction) = RowParser::new().parse_row_detailed(raw_rows.remove(0));
    assert_eq!(row.authors_list, names(&["Ana Li", "Bo Chen"]));
    assert_eq!(row.authors_list, extraction.authors);
    assert_eq!(extraction.chunks_total, 3);
    assert_eq!(extraction.chunks_rejected, 1);
    assert!(extraction.had_affiliation);
}
