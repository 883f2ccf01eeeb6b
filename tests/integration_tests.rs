//! Integration tests for the FreiDok CLI library
//!
//! These tests run the full fetch, process and render chain against a local
//! mock of the FreiDok JSON API and against saved JSON files.

use freidok::config::{parse_base_url, Config};
use freidok::models::{
    AuthorStyle, FilterCriteria, InstitutionQuery, ItemList, Publication, PublicationQuery,
    YearRange,
};
use freidok::pipeline;
use freidok::render::{OutputFormat, OutputTarget, RenderOptions};
use freidok::sources::{create_source, ApiSource, FileSource, Source, SourceSpec};
use freidok::FreidokError;
use mockito::Matcher;

const PUBLICATIONS: &str = r#"{
    "numFound": 3,
    "start": 0,
    "maxRows": 100,
    "type": "publication",
    "docs": [
        {
            "id": 101,
            "link": "https://freidok.uni-freiburg.de/data/101",
            "publication_year": 2022,
            "titles": [
                {"value": "Bäume im Wandel", "language": "deu"},
                {"value": "Trees in transition", "language": "eng"}
            ],
            "persons": [
                {"id": 1, "forename": "Max Konrad", "surname": "Mustermann"},
                {"id": 2, "forename": "Erika", "surname": "Musterfrau"},
                {"id": 3, "forename": "John", "surname": "Smith"}
            ],
            "pub_ids": [{"type": "doi", "value": "10.1000/trees", "link": "https://doi.org/10.1000/trees"}]
        },
        {
            "id": 102,
            "link": "https://freidok.uni-freiburg.de/data/102",
            "publication_year": 2021,
            "titles": [{"value": "Draft: Soil samples", "language": "eng"}],
            "persons": [{"id": 2, "forename": "Erika", "surname": "Musterfrau"}]
        },
        {
            "id": 103,
            "link": "https://freidok.uni-freiburg.de/data/103",
            "publication_year": 2021,
            "titles": [{"value": "Forest modelling", "language": "eng"}],
            "persons": [{"id": 3, "forename": "Jane", "surname": "Smith"}]
        }
    ]
}"#;

const INSTITUTIONS: &str = r#"{
    "numFound": 1,
    "type": "institution",
    "docs": [
        {
            "id": 2555,
            "link": "https://freidok.uni-freiburg.de/inst/2555",
            "names": [
                {"value": "Institut für Forstwissenschaften", "language": "deu"},
                {"value": "Institute of Forest Sciences", "language": "eng"}
            ]
        }
    ]
}"#;

fn api_source(server: &mockito::ServerGuard) -> ApiSource {
    let base = parse_base_url(&server.url()).unwrap();
    ApiSource::new(base, &Config::default()).unwrap()
}

#[tokio::test]
async fn test_api_publications_markdown() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/publications")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("instId".into(), "2555".into()),
            Matcher::UrlEncoded("yearFrom".into(), "2021".into()),
            Matcher::UrlEncoded("yearTo".into(), "2022".into()),
            Matcher::UrlEncoded("maxRows".into(), "100".into()),
            Matcher::UrlEncoded("transitive".into(), "true".into()),
        ]))
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PUBLICATIONS)
        .create_async()
        .await;

    let criteria = FilterCriteria::new()
        .inst_ids([2555])
        .years(YearRange::new(2021, 2022).unwrap())
        .param("transitive", "true")
        .exclude_author("Jane Smith")
        .exclude_title("draft")
        .maxpers(2);
    let query = PublicationQuery::new(criteria, vec![]);
    let options = RenderOptions::default()
        .maxpers(2)
        .author_style(AuthorStyle::new().abbreviate("."));

    let out = pipeline::publications(&api_source(&server), &query, &OutputFormat::Markdown, &options)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        out,
        "## 2022\n\n\
         - M.K. Mustermann, E. Musterfrau et al.: **Trees in transition** [Link](https://doi.org/10.1000/trees)\n\n"
    );
}

#[tokio::test]
async fn test_api_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/publications")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let query = PublicationQuery::new(FilterCriteria::new().ids([1]), vec![]);
    let err = api_source(&server).get_publications(&query).await.unwrap_err();

    assert!(matches!(err, FreidokError::Transport(ref msg) if msg.contains("500")), "{err}");
}

#[tokio::test]
async fn test_api_schema_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/institutions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(PUBLICATIONS)
        .create_async()
        .await;

    let query = InstitutionQuery::new().ids([2555]);
    let err = api_source(&server).get_institutions(&query).await.unwrap_err();
    assert!(matches!(err, FreidokError::Schema(_)));
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let source = api_source(&server);
    let query = PublicationQuery::new(
        FilterCriteria::new().pers_ids([7, 8]).title("forest"),
        vec!["id".into(), "publication_year".into()],
    );
    let text = source.describe_publications(&query).unwrap();

    mock.assert_async().await;
    assert!(text.starts_with(&format!(
        "GET {}/publications?persId=7%2C8&titleSearch=forest&field=id%2Cpublication_year&maxRows=100&sortfield=publication_year%2Bdesc%2Cid%2Bdesc\n",
        server.url()
    )), "{text}");
}

#[tokio::test]
async fn test_missing_selector_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let query = PublicationQuery::new(FilterCriteria::new().years(YearRange::single(2020)), vec![]);
    let err = api_source(&server).get_publications(&query).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, FreidokError::InvalidFilter(_)));
}

#[tokio::test]
async fn test_api_institutions_html() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/institutions")
        .match_query(Matcher::UrlEncoded("nameSearch".into(), "Forst".into()))
        .with_status(200)
        .with_body(INSTITUTIONS)
        .create_async()
        .await;

    let query = InstitutionQuery::new().name("Forst");
    let options = RenderOptions::default().languages(vec!["deu".into()]);
    let out = pipeline::institutions(&api_source(&server), &query, &OutputFormat::Html, &options)
        .await
        .unwrap();

    assert!(out.contains(
        "<a href=\"https://freidok.uni-freiburg.de/inst/2555\">Institut für Forstwissenschaften</a>"
    ), "{out}");
}

#[tokio::test]
async fn test_json_passthrough_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/publications")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(PUBLICATIONS)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.json");
    let query = PublicationQuery::new(FilterCriteria::new().inst_ids([2555]), vec![]);
    let options = RenderOptions::default();

    let json = pipeline::publications(&api_source(&server), &query, &OutputFormat::Json, &options)
        .await
        .unwrap();
    OutputTarget::File(path.clone()).write(&json).unwrap();

    // API objects are written back unchanged apart from formatted_authors
    let received: serde_json::Value = serde_json::from_str(PUBLICATIONS).unwrap();
    let mut written: serde_json::Value = serde_json::from_str(&json).unwrap();
    let doc = written["docs"][1].as_object_mut().unwrap();
    assert_eq!(doc.remove("formatted_authors"), Some(serde_json::json!("Erika Musterfrau")));
    assert_eq!(written["docs"][1], received["docs"][1]);

    let saved = ItemList::<Publication>::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(
        saved.docs[0].formatted_authors.as_deref(),
        Some("Max Konrad Mustermann, Erika Musterfrau, John Smith")
    );

    // Re-read the saved file and filter locally
    let file_source = create_source(
        &SourceSpec::parse(path.to_str()),
        &Config::default(),
    )
    .unwrap();
    assert_eq!(file_source.id(), "file");

    let local = PublicationQuery::new(
        FilterCriteria::new().years(YearRange::single(2021)).pers_ids([3]),
        vec![],
    );
    let out = pipeline::publications(file_source.as_ref(), &local, &OutputFormat::Markdown, &options)
        .await
        .unwrap();
    assert_eq!(
        out,
        "## 2021\n\n- Jane Smith: **Forest modelling** [Link](https://freidok.uni-freiburg.de/data/103)\n\n"
    );
}

#[tokio::test]
async fn test_file_source_bare_array_and_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("items.json");
    std::fs::write(
        &data,
        r#"[{"id": 5, "publication_year": 2019, "titles": [{"value": "Solo"}], "persons": [{"forename": "Ann", "surname": "Lee"}]}]"#,
    )
    .unwrap();
    let template = dir.path().join("list.txt");
    std::fs::write(&template, "$for(items)$$items.id$|$items.authors$|$items.title$\n$endfor$").unwrap();

    let source = FileSource::new(&data);
    let query = PublicationQuery::new(FilterCriteria::new(), vec![]);
    let options = RenderOptions::default().author_style(AuthorStyle::new().reverse(true));
    let out = pipeline::publications(&source, &query, &OutputFormat::Template(template), &options)
        .await
        .unwrap();

    assert_eq!(out, "5|Lee Ann|Solo\n");
}
