use market_analyzer::analysis::{
    aggregate_open_interest, compute_pcr, OiAggregate, Sentiment, SentimentScale,
};
use market_analyzer::error::AnalysisError;
use market_analyzer::nse::{OptionData, OptionDetail};

fn detail(open_interest: u64) -> OptionDetail {
    OptionDetail {
        strike_price: None,
        underlying_value: None,
        open_interest: Some(open_interest),
        change_in_oi: None,
        last_price: None,
        price_change: None,
        per_chg_price: None,
        per_chg_oi: None,
    }
}

fn row(strike: f64, call_oi: Option<u64>, put_oi: Option<u64>) -> OptionData {
    OptionData {
        expiry_date: None,
        strike_price: Some(strike),
        call: call_oi.map(detail),
        put: put_oi.map(detail),
    }
}

#[test]
fn test_aggregate_invariant_under_row_permutation() {
    let a = row(100.0, Some(500), Some(800));
    let b = row(110.0, Some(300), Some(200));
    let c = row(120.0, None, Some(50));

    let forward = aggregate_open_interest(&[a.clone(), b.clone(), c.clone()]);
    let reversed = aggregate_open_interest(&[c.clone(), b.clone(), a.clone()]);
    let shuffled = aggregate_open_interest(&[b, c, a]);

    assert_eq!(forward, reversed);
    assert_eq!(forward, shuffled);
}

#[test]
fn test_aggregate_of_empty_chain_is_zero_zero() {
    let aggregate = aggregate_open_interest(&[]);
    assert_eq!(aggregate.total_call_oi, 0);
    assert_eq!(aggregate.total_put_oi, 0);
}

#[test]
fn test_pcr_fails_with_no_data_iff_call_side_zero() {
    let no_calls = OiAggregate {
        total_call_oi: 0,
        total_put_oi: 1000,
    };
    assert!(matches!(
        compute_pcr(&no_calls),
        Err(AnalysisError::NoData(_))
    ));

    // Even fully empty input fails, rather than reporting ratio 0
    assert!(compute_pcr(&OiAggregate::default()).is_err());

    let with_calls = OiAggregate {
        total_call_oi: 1000,
        total_put_oi: 0,
    };
    assert_eq!(compute_pcr(&with_calls).unwrap().ratio, 0.0);
}

#[test]
fn test_pcr_three_decimal_rounding() {
    let aggregate = OiAggregate {
        total_call_oi: 7,
        total_put_oi: 9,
    };
    // 9/7 = 1.2857... -> 1.286
    assert_eq!(compute_pcr(&aggregate).unwrap().ratio, 1.286);

    let aggregate = OiAggregate {
        total_call_oi: 6,
        total_put_oi: 4,
    };
    // 4/6 = 0.6666... -> 0.667
    assert_eq!(compute_pcr(&aggregate).unwrap().ratio, 0.667);
}

#[test]
fn test_worked_example_classifies_bullish() {
    // Two strikes: CE 500/PE 800 and CE 300/PE 200
    let rows = vec![row(100.0, Some(500), Some(800)), row(110.0, Some(300), Some(200))];

    let aggregate = aggregate_open_interest(&rows);
    assert_eq!(aggregate.total_call_oi, 800);
    assert_eq!(aggregate.total_put_oi, 1000);

    let pcr = compute_pcr(&aggregate).unwrap();
    assert_eq!(pcr.ratio, 1.25);

    let sentiment = SentimentScale::canonical().classify(pcr.ratio);
    assert_eq!(sentiment, Sentiment::Bullish);
}

#[test]
fn test_canonical_scale_boundary_values() {
    let scale = SentimentScale::canonical();
    assert_eq!(scale.classify(1.3), Sentiment::StronglyBullish);
    assert_eq!(scale.classify(1.2999), Sentiment::Bullish);
    assert_eq!(scale.classify(1.1), Sentiment::Bullish);
    assert_eq!(scale.classify(0.9), Sentiment::Neutral);
    assert_eq!(scale.classify(0.6999), Sentiment::StronglyBearish);
}

#[test]
fn test_scales_disagree_only_where_conventions_differ() {
    let canonical = SentimentScale::canonical();
    let legacy = SentimentScale::legacy_four_band();

    // Deep in a band the conventions agree...
    assert_eq!(canonical.classify(1.5), Sentiment::StronglyBullish);
    assert_eq!(legacy.classify(1.5), Sentiment::StronglyBullish);
    assert_eq!(canonical.classify(0.5), Sentiment::StronglyBearish);
    assert_eq!(legacy.classify(0.5), Sentiment::StronglyBearish);

    // ...near 1.1 they do not: canonical calls it Bullish, the legacy
    // table leaves it in the unlabelled gap
    assert_eq!(canonical.classify(1.15), Sentiment::Bullish);
    assert_eq!(legacy.classify(1.15), Sentiment::Neutral);
}
