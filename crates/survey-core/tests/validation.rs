use survey_core::{
    AnswerBody, BoundSide, ErrorKind, Options, QuestionKind, ScaleLabel, SurveyError, Validation,
    check_bounds_well_formed, check_number, check_text, validate_answer,
};

fn number(min: &str, max: &str) -> QuestionKind {
    QuestionKind::Number {
        validation: Some(Validation::bounds(min, max)),
    }
}

fn text(pattern: &str) -> QuestionKind {
    QuestionKind::Text {
        validation: Some(Validation::pattern(pattern)),
    }
}

fn kind_of(result: survey_core::Result<()>) -> Option<ErrorKind> {
    result.err().map(|err| err.kind())
}

#[test]
fn blank_number_is_valid_whatever_the_bounds() {
    assert!(validate_answer(&number("5", "10"), &"".into()).is_ok());
    assert!(validate_answer(&number("", ""), &"".into()).is_ok());
    assert!(check_number(None, "").is_ok());
}

#[test]
fn non_integer_number_is_invalid() {
    for body in ["abc", "1.5", "7 ", "0x10"] {
        assert_eq!(
            kind_of(validate_answer(&number("", ""), &body.into())),
            Some(ErrorKind::InvalidNumber),
            "{body:?}"
        );
    }
}

#[test]
fn number_below_min_bound_is_a_boundary_error() {
    let err = validate_answer(&number("5", ""), &"3".into()).unwrap_err();
    assert_eq!(
        err,
        SurveyError::NumberBoundary {
            number: 3,
            bound: 5,
            side: BoundSide::Below
        }
    );
}

#[test]
fn number_above_max_bound_is_a_boundary_error() {
    let err = validate_answer(&number("", "10"), &"11".into()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumberBoundary);
    assert!(matches!(
        err,
        SurveyError::NumberBoundary {
            side: BoundSide::Above,
            ..
        }
    ));
}

#[test]
fn number_within_bounds_is_valid() {
    assert!(validate_answer(&number("5", "10"), &"7".into()).is_ok());
    assert!(validate_answer(&number("5", "10"), &"5".into()).is_ok());
    assert!(validate_answer(&number("5", "10"), &"10".into()).is_ok());
    assert!(validate_answer(&number("-3", ""), &"-3".into()).is_ok());
    assert!(check_number(None, "123456789").is_ok());
}

#[test]
fn malformed_bounds_reject_non_blank_answers() {
    assert_eq!(
        kind_of(validate_answer(&number("ten", ""), &"7".into())),
        Some(ErrorKind::InvalidNumber)
    );
}

#[test]
fn empty_pattern_accepts_anything() {
    for body in ["", "anything", "12a"] {
        assert!(validate_answer(&text(""), &body.into()).is_ok());
        assert!(check_text(None, body).is_ok());
    }
}

#[test]
fn text_without_validation_row_accepts_anything() {
    let kind = QuestionKind::Text { validation: None };
    assert!(validate_answer(&kind, &"free form".into()).is_ok());
}

#[test]
fn digit_pattern_exempts_blank_and_checks_the_rest() {
    let kind = text("^[0-9]+$");
    assert!(validate_answer(&kind, &"".into()).is_ok());
    assert!(validate_answer(&kind, &"123".into()).is_ok());
    assert_eq!(
        kind_of(validate_answer(&kind, &"12a".into())),
        Some(ErrorKind::TextMatching)
    );
}

#[test]
fn malformed_pattern_is_reported_even_for_blank_answers() {
    let kind = text("([0-9]");
    assert_eq!(
        kind_of(validate_answer(&kind, &"".into())),
        Some(ErrorKind::InvalidPattern)
    );
}

#[test]
fn bounds_well_formedness() {
    assert_eq!(
        check_bounds_well_formed("10", "5").unwrap_err().kind(),
        ErrorKind::InvalidNumber
    );
    assert!(check_bounds_well_formed("", "").is_ok());
    assert_eq!(
        check_bounds_well_formed("abc", "10").unwrap_err().kind(),
        ErrorKind::InvalidNumber
    );
    assert_eq!(
        check_bounds_well_formed("1", "x").unwrap_err().kind(),
        ErrorKind::InvalidNumber
    );

    let bounds = check_bounds_well_formed("5", "5").expect("equal bounds");
    assert_eq!(bounds.min, Some(5));
    assert_eq!(bounds.max, Some(5));
    assert!(check_bounds_well_formed("", "3").unwrap().min.is_none());
}

#[test]
fn single_choice_answers_come_from_the_options() {
    let kind = QuestionKind::MultipleChoice {
        options: Options::new(["Lake", "Forest"]),
    };
    assert!(validate_answer(&kind, &"Lake".into()).is_ok());
    assert!(validate_answer(&kind, &"".into()).is_ok());
    assert_eq!(
        kind_of(validate_answer(&kind, &"Desert".into())),
        Some(ErrorKind::InvalidChoice)
    );
    let two = AnswerBody::Multiple(vec!["Lake".into(), "Forest".into()]);
    assert_eq!(
        kind_of(validate_answer(&kind, &two)),
        Some(ErrorKind::InvalidChoice)
    );
}

#[test]
fn dropdown_accepts_a_single_element_list() {
    let kind = QuestionKind::Dropdown {
        options: Options::new(["S", "M", "L"]),
    };
    let one = AnswerBody::Multiple(vec!["M".into()]);
    assert!(validate_answer(&kind, &one).is_ok());
}

#[test]
fn checkbox_selections_must_be_distinct_options() {
    let kind = QuestionKind::Checkbox {
        options: Options::new(["Hiking", "Canoeing", "Stargazing"]),
    };
    let good = AnswerBody::Multiple(vec!["Hiking".into(), "Stargazing".into()]);
    assert!(validate_answer(&kind, &good).is_ok());
    assert!(validate_answer(&kind, &AnswerBody::Multiple(vec![])).is_ok());

    let repeated = AnswerBody::Multiple(vec!["Hiking".into(), "Hiking".into()]);
    assert_eq!(
        kind_of(validate_answer(&kind, &repeated)),
        Some(ErrorKind::InvalidChoice)
    );
    let unknown = AnswerBody::Multiple(vec!["Hiking".into(), "Fishing".into()]);
    assert_eq!(
        kind_of(validate_answer(&kind, &unknown)),
        Some(ErrorKind::InvalidChoice)
    );
}

#[test]
fn linear_scale_answers_stay_on_the_scale() {
    let kind = QuestionKind::LinearScale {
        scale_label: ScaleLabel {
            label_left: "Poor".into(),
            label_right: "Great".into(),
            scale_min: 1,
            scale_max: 5,
        },
    };
    assert!(validate_answer(&kind, &"".into()).is_ok());
    assert!(validate_answer(&kind, &"3".into()).is_ok());
    assert_eq!(
        kind_of(validate_answer(&kind, &"6".into())),
        Some(ErrorKind::NumberBoundary)
    );
    assert_eq!(
        kind_of(validate_answer(&kind, &"0".into())),
        Some(ErrorKind::NumberBoundary)
    );
    assert_eq!(
        kind_of(validate_answer(&kind, &"three".into())),
        Some(ErrorKind::InvalidNumber)
    );
}

#[test]
fn single_value_types_take_one_element_lists_and_reject_longer_ones() {
    let one = AnswerBody::Multiple(vec!["3".into()]);
    let two = AnswerBody::Multiple(vec!["1".into(), "2".into()]);
    let scale = QuestionKind::LinearScale {
        scale_label: ScaleLabel {
            label_left: String::new(),
            label_right: String::new(),
            scale_min: 1,
            scale_max: 5,
        },
    };
    let dropdown = QuestionKind::Dropdown {
        options: Options::new(["1", "2", "3"]),
    };
    for kind in [number("", ""), scale, dropdown] {
        assert!(validate_answer(&kind, &one).is_ok(), "{kind:?}");
        assert!(validate_answer(&kind, &two).is_err(), "{kind:?}");
    }
    assert_eq!(
        kind_of(validate_answer(&number("", ""), &two)),
        Some(ErrorKind::BadRequest)
    );
    assert_eq!(
        kind_of(validate_answer(&number("5", "10"), &one)),
        Some(ErrorKind::NumberBoundary)
    );
}

#[test]
fn validation_is_repeatable() {
    let kind = number("5", "10");
    for body in ["", "3", "7", "11", "abc"] {
        let body = AnswerBody::from(body);
        assert_eq!(validate_answer(&kind, &body), validate_answer(&kind, &body));
    }
}
