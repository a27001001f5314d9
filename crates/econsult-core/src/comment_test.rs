use chrono::TimeZone;

use super::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
}

fn valid() -> NewComment {
    NewComment {
        text: Some("The tax relief is not good enough".to_string()),
        language: Some("en".to_string()),
        created_at: None,
        sentiment: Some("negative".to_string()),
        confidence: Some(0.8),
        highlights: Some(vec!["Not Good".to_string()]),
        aspects: Some(vec![NewAspect {
            aspect_name: Some("Tax Relief".to_string()),
            sentiment: Some("negative".to_string()),
            confidence: Some(0.7),
        }]),
    }
}

#[test]
fn valid_comment_passes_and_defaults_created_at() {
    let validated = valid().validate(now()).expect("valid comment");
    assert_eq!(validated.sentiment, Sentiment::Negative);
    assert_eq!(validated.created_at, now());
    assert_eq!(validated.aspects.len(), 1);
    assert_eq!(validated.aspects[0].aspect_name, "Tax Relief");

    let comment = validated.into_comment(7);
    assert_eq!(comment.id, 7);
    assert_eq!(comment.created_date(), now().date_naive());
}

#[test]
fn missing_sentiment_is_rejected() {
    let mut c = valid();
    c.sentiment = None;
    assert_eq!(
        c.validate(now()).unwrap_err(),
        ValidationError::MissingField("sentiment")
    );
}

#[test]
fn unknown_sentiment_is_rejected() {
    let mut c = valid();
    c.sentiment = Some("angry".to_string());
    assert!(matches!(
        c.validate(now()),
        Err(ValidationError::InvalidField { field: "sentiment", .. })
    ));
}

#[test]
fn sentiment_parse_is_case_insensitive() {
    assert_eq!(" Positive ".parse::<Sentiment>().unwrap(), Sentiment::Positive);
}

#[test]
fn missing_confidence_is_rejected() {
    let mut c = valid();
    c.confidence = None;
    assert_eq!(
        c.validate(now()).unwrap_err(),
        ValidationError::MissingField("confidence")
    );
}

#[test]
fn out_of_range_confidence_is_rejected() {
    for bad in [-0.01, 1.01, f64::NAN] {
        let mut c = valid();
        c.confidence = Some(bad);
        assert!(
            matches!(
                c.validate(now()),
                Err(ValidationError::InvalidField { field: "confidence", .. })
            ),
            "confidence {bad} should be rejected"
        );
    }
}

#[test]
fn confidence_bounds_are_inclusive() {
    for ok in [0.0, 1.0] {
        let mut c = valid();
        c.confidence = Some(ok);
        assert!(c.validate(now()).is_ok());
    }
}

#[test]
fn missing_language_is_rejected() {
    let mut c = valid();
    c.language = None;
    assert_eq!(
        c.validate(now()).unwrap_err(),
        ValidationError::MissingField("language")
    );
}

#[test]
fn blank_text_is_rejected() {
    let mut c = valid();
    c.text = Some("   ".to_string());
    assert!(matches!(
        c.validate(now()),
        Err(ValidationError::InvalidField { field: "text", .. })
    ));
}

#[test]
fn highlight_not_in_text_is_rejected() {
    let mut c = valid();
    c.highlights = Some(vec!["excellent".to_string()]);
    assert!(matches!(
        c.validate(now()),
        Err(ValidationError::InvalidField { field: "highlights", .. })
    ));
}

#[test]
fn duplicate_aspects_are_rejected() {
    let mut c = valid();
    let aspect = NewAspect {
        aspect_name: Some("Tax Relief".to_string()),
        sentiment: Some("positive".to_string()),
        confidence: Some(0.5),
    };
    c.aspects = Some(vec![aspect.clone(), aspect]);
    assert!(matches!(
        c.validate(now()),
        Err(ValidationError::InvalidField { field: "aspects", .. })
    ));
}

#[test]
fn aspect_with_bad_confidence_is_rejected() {
    let mut c = valid();
    c.aspects = Some(vec![NewAspect {
        aspect_name: Some("Digital Filing".to_string()),
        sentiment: Some("neutral".to_string()),
        confidence: Some(3.0),
    }]);
    assert!(matches!(
        c.validate(now()),
        Err(ValidationError::InvalidField { field: "aspects.confidence", .. })
    ));
}

#[test]
fn aspect_alias_deserializes() {
    let aspect: NewAspect = serde_json::from_str(
        r#"{"aspect": "Compliance Burden", "sentiment": "negative", "confidence": 0.4}"#,
    )
    .expect("deserialize");
    assert_eq!(aspect.aspect_name.as_deref(), Some("Compliance Burden"));
}

#[test]
fn normalize_language_accepts_regional_tags() {
    assert_eq!(normalize_language("EN_in").unwrap(), "en-in");
    assert_eq!(normalize_language(" hi ").unwrap(), "hi");
}

#[test]
fn normalize_language_rejects_garbage() {
    assert!(normalize_language("english").is_err());
    assert!(normalize_language("e").is_err());
    assert!(normalize_language("en--us").is_err());
    assert_eq!(
        normalize_language("  ").unwrap_err(),
        ValidationError::MissingField("language")
    );
}

#[test]
fn comment_serializes_sentiment_lowercase() {
    let comment = valid().validate(now()).unwrap().into_comment(1);
    let json = serde_json::to_value(&comment).expect("serialize");
    assert_eq!(json["sentiment"], "negative");
    assert_eq!(json["aspects"][0]["aspect_name"], "Tax Relief");
}

#[test]
fn validated_comment_passes_check() {
    let comment = valid().validate(now()).unwrap().into_comment(1);
    assert_eq!(comment.check(), Ok(()));
}

#[test]
fn check_rejects_out_of_range_confidence() {
    let mut comment = valid().validate(now()).unwrap().into_comment(1);
    comment.confidence = 3.0;
    assert!(matches!(
        comment.check(),
        Err(ValidationError::InvalidField { field: "confidence", .. })
    ));
}

#[test]
fn check_rejects_duplicate_aspects() {
    let mut comment = valid().validate(now()).unwrap().into_comment(1);
    let aspect = comment.aspects[0].clone();
    comment.aspects.push(aspect);
    assert!(matches!(
        comment.check(),
        Err(ValidationError::InvalidField { field: "aspects", .. })
    ));
}

#[test]
fn check_rejects_highlight_missing_from_text() {
    let mut comment = valid().validate(now()).unwrap().into_comment(1);
    comment.highlights = vec!["excellent".to_string()];
    assert!(matches!(
        comment.check(),
        Err(ValidationError::InvalidField { field: "highlights", .. })
    ));
}

#[test]
fn check_rejects_unnormalized_language() {
    let mut comment = valid().validate(now()).unwrap().into_comment(1);
    comment.language = "EN".to_string();
    assert!(matches!(
        comment.check(),
        Err(ValidationError::InvalidField { field: "language", .. })
    ));
}
