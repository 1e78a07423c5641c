use chrono::{Duration, TimeZone, Utc};

use survey_core::{
    ErrorKind, MemoryStore, PageRequest, Questionnaire, QuestionnaireId, SortField, SortOrder,
    TargetFilter, identify, list_questionnaires,
};

fn fixture() -> MemoryStore {
    MemoryStore::from_json(include_str!("fixtures/survey_store.json")).expect("fixture")
}

fn ids(page: &survey_core::QuestionnairePage) -> Vec<u32> {
    page.items.iter().map(|item| item.id.0).collect()
}

#[test]
fn sort_params_parse() {
    assert_eq!(SortOrder::parse("").unwrap(), SortOrder::default());
    let title_desc = SortOrder::parse("-title").unwrap();
    assert_eq!(title_desc.field, Some(SortField::Title));
    assert!(title_desc.descending);
    for raw in ["id", "-", "--title", "Title"] {
        assert_eq!(
            SortOrder::parse(raw).unwrap_err().kind(),
            ErrorKind::InvalidSortParam,
            "{raw}"
        );
    }
}

#[test]
fn page_params_parse() {
    assert_eq!(PageRequest::parse(None).unwrap().number(), 1);
    assert_eq!(PageRequest::parse(Some("3")).unwrap().number(), 3);
    for raw in ["0", "x", "-1"] {
        assert_eq!(
            PageRequest::parse(Some(raw)).unwrap_err().kind(),
            ErrorKind::BadRequest
        );
    }
}

#[test]
fn deleted_questionnaires_are_hidden_and_default_order_is_recent_first() {
    let store = fixture();
    let bob = identify(Some("bob")).unwrap();
    let page = list_questionnaires(
        &store,
        &bob,
        TargetFilter::All,
        SortOrder::default(),
        PageRequest::default(),
        20,
    )
    .expect("page");
    assert_eq!(ids(&page), vec![3, 2, 1, 4]);
    assert_eq!(page.last_page, 1);
}

#[test]
fn targeting_includes_the_all_members_group() {
    let store = fixture();
    let bob = identify(Some("bob")).unwrap();
    let targeted = list_questionnaires(
        &store,
        &bob,
        TargetFilter::Targeted,
        SortOrder::parse("title").unwrap(),
        PageRequest::default(),
        20,
    )
    .expect("targeted");
    assert_eq!(ids(&targeted), vec![1, 3, 2]);
    assert!(targeted.items.iter().all(|item| item.is_targeted));

    let carol = identify(Some("carol")).unwrap();
    let other = list_questionnaires(
        &store,
        &carol,
        TargetFilter::Nontargeted,
        SortOrder::parse("created_at").unwrap(),
        PageRequest::default(),
        20,
    )
    .expect("nontargeted");
    assert_eq!(ids(&other), vec![4, 1, 2]);
}

#[test]
fn pages_are_fixed_size_and_bounded() {
    let mut store = MemoryStore::default();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for n in 1..=45u32 {
        let stamp = start + Duration::hours(i64::from(n));
        store.questionnaires.push(Questionnaire {
            id: QuestionnaireId(n),
            title: format!("Survey {n:02}"),
            description: String::new(),
            res_time_limit: None,
            res_shared_to: "public".into(),
            deleted_at: None,
            created_at: stamp,
            modified_at: stamp,
        });
    }
    let user = identify(Some("frank")).unwrap();
    let sort = SortOrder::parse("created_at").unwrap();

    let third = list_questionnaires(
        &store,
        &user,
        TargetFilter::All,
        sort,
        PageRequest::parse(Some("3")).unwrap(),
        20,
    )
    .expect("third page");
    assert_eq!(third.last_page, 3);
    assert_eq!(ids(&third), vec![41, 42, 43, 44, 45]);

    let err = list_questionnaires(
        &store,
        &user,
        TargetFilter::All,
        sort,
        PageRequest::parse(Some("4")).unwrap(),
        20,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooLargePageNum);
    assert_eq!(err.status().code(), 400);
}
