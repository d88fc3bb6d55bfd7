use super::*;

fn scores(pairs: &[(EmotionLabel, f64)]) -> EmotionScores {
    let mut map: BTreeMap<EmotionLabel, f64> = EmotionLabel::ALL.into_iter().map(|l| (l, 0.0)).collect();
    for (label, value) in pairs {
        map.insert(*label, *value);
    }
    EmotionScores::try_from(map).expect("valid scores")
}

#[test]
fn labels_parse_and_display_lowercase() {
    for label in EmotionLabel::ALL {
        assert_eq!(label.as_str().parse::<EmotionLabel>(), Ok(label));
        assert_eq!(label.to_string(), label.as_str());
    }
    assert_eq!(" Fear ".parse::<EmotionLabel>(), Ok(EmotionLabel::Fear));
    assert!("joy".parse::<EmotionLabel>().is_err());
}

#[test]
fn weights_are_normalized() {
    let scores = EmotionScores::from_weights([1.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(scores.get(EmotionLabel::Fear), 0.25);
    assert_eq!(scores.get(EmotionLabel::Stress), 0.75);
    assert!((scores.total() - 1.0).abs() < 1e-12);
}

#[test]
fn zero_weights_stay_zero_and_default_to_contentment() {
    let scores = EmotionScores::from_weights([0.0; EmotionLabel::COUNT]);
    assert!(scores.iter().all(|(_, s)| s == 0.0));
    assert_eq!(scores.dominant(), EmotionLabel::Contentment);
}

#[test]
fn dominant_ties_resolve_in_enumeration_order() {
    assert_eq!(EmotionScores::uniform().dominant(), EmotionLabel::Fear);
    let tied = EmotionScores::from_pairs([
        (EmotionLabel::Alertness, 0.4),
        (EmotionLabel::Comfort, 0.4),
        (EmotionLabel::Sadness, 0.2),
    ]);
    assert_eq!(tied.dominant(), EmotionLabel::Comfort);
}

#[test]
fn peaked_scores_favor_the_primary_label() {
    let scores = EmotionScores::peaked(EmotionLabel::Sadness, 0.55, 0.05);
    assert!((scores.get(EmotionLabel::Sadness) - 0.55 / 0.95).abs() < 1e-12);
    assert!((scores.get(EmotionLabel::Fear) - 0.05 / 0.95).abs() < 1e-12);
    assert_eq!(scores.dominant(), EmotionLabel::Sadness);
}

#[test]
fn blend_weights_behavior_against_audio() {
    let audio = scores(&[(EmotionLabel::Happiness, 0.1), (EmotionLabel::Contentment, 0.9)]);
    let behavior = scores(&[(EmotionLabel::Happiness, 0.9), (EmotionLabel::Fear, 0.1)]);
    let blended = blend(&audio, &behavior, 0.6);
    assert!((blended.get(EmotionLabel::Happiness) - 0.58).abs() < 1e-12);
    assert!((blended.get(EmotionLabel::Contentment) - 0.36).abs() < 1e-12);
    assert!((blended.get(EmotionLabel::Fear) - 0.06).abs() < 1e-12);
    assert!((blended.total() - 1.0).abs() < 1e-12);
    assert_eq!(blended.dominant(), EmotionLabel::Happiness);
}

#[test]
fn blend_clamps_weight() {
    let audio = scores(&[(EmotionLabel::Anxiety, 1.0)]);
    let behavior = scores(&[(EmotionLabel::Comfort, 1.0)]);
    assert_eq!(blend(&audio, &behavior, 1.7), behavior);
    assert_eq!(blend(&audio, &behavior, -0.2), audio);
    assert_eq!(blend(&audio, &behavior, f64::NAN), audio);
}

#[test]
fn serializes_as_object_keyed_by_label() {
    let json = serde_json::to_value(EmotionScores::uniform()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), EmotionLabel::COUNT);
    for label in EmotionLabel::ALL {
        assert!(object.contains_key(label.as_str()), "missing {label}");
    }
    let back: EmotionScores = serde_json::from_value(json).unwrap();
    assert_eq!(back, EmotionScores::uniform());
}

#[test]
fn deserialization_rejects_incomplete_or_negative_maps() {
    let missing = r#"{"fear":0.5,"stress":0.5}"#;
    assert!(serde_json::from_str::<EmotionScores>(missing).is_err());

    let mut map: BTreeMap<EmotionLabel, f64> = EmotionLabel::ALL.into_iter().map(|l| (l, 0.1)).collect();
    map.insert(EmotionLabel::Anxiety, -0.1);
    assert_eq!(
        EmotionScores::try_from(map),
        Err(ScoresError::InvalidScore {
            label: EmotionLabel::Anxiety,
            value: -0.1
        })
    );
}
