//! Purpose: Public-surface tests for typed ad models.
//! Exports: None (integration test module).
//! Role: Exercise models the way library callers do: build, set, read back, serialize.

use adgraph::api::ErrorKind;
use adgraph::core::validate::{CollectionMatch, Validator};
use adgraph::models::{AdCampaign, AdGroup, AnyModel, Model, ResourceKind, Targeting};
use serde_json::json;

#[test]
fn campaign_status_is_limited_to_declared_choices() {
    let mut campaign = AdCampaign::new();
    campaign.set("campaign_status", 2i64).expect("active");

    let err = campaign.set("campaign_status", 7i64).expect_err("not a choice");
    assert_eq!(err.kind(), ErrorKind::Choice);
    assert_eq!(err.field(), Some("campaign_status"));
    assert_eq!(campaign.campaign_status(), Some(2));
}

#[test]
fn undeclared_fields_are_rejected() {
    let mut campaign = AdCampaign::new();
    let err = campaign.set("bid_amount", 10i64).expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert_eq!(campaign.get("bid_amount").expect_err("unknown").kind(), ErrorKind::UnknownField);
    assert_eq!(campaign.get("name").expect_err("unset").kind(), ErrorKind::MissingValue);
}

#[test]
fn later_assignments_replace_earlier_ones() {
    let mut campaign = AdCampaign::new();
    campaign.set("name", "first").expect("first");
    campaign.set("name", "second").expect("second");
    assert_eq!(campaign.name(), Some("second"));
    assert_eq!(campaign.to_json(), json!({ "name": "second" }));
}

#[test]
fn graph_timestamps_serialize_as_unix_seconds() {
    let campaign =
        AdCampaign::from_json_str(r#"{"start_time": "2013-02-01T00:00:00+0000", "end_time": 1359763200}"#)
            .expect("campaign");
    assert_eq!(
        campaign.to_json(),
        json!({ "start_time": 1359676800, "end_time": 1359763200 })
    );
}

#[test]
fn adgroup_targeting_reads_back_typed() {
    let payload = json!({
        "id": "6004163746239",
        "bid_type": "CPC",
        "bid_info": null,
        "targeting": {
            "countries": ["US", "GB"],
            "genders": [2],
            "age_min": 21,
            "age_max": 35
        }
    });
    let group = AdGroup::from_value_with(&payload, Validator::default()).expect("group");
    assert_eq!(group.id(), Some(6004163746239));

    let targeting: Targeting = group.targeting().expect("targeting");
    assert_eq!(targeting.countries(), vec!["US", "GB"]);
    assert_eq!(targeting.genders(), vec![2]);
    assert_eq!(targeting.age_range(), (Some(21), Some(35)));
}

#[test]
fn sample_matching_needs_only_one_conforming_element() {
    let payload = json!({ "targeting": { "countries": ["US", 5] } });
    let strict = AdGroup::from_value_with(&payload, Validator::default()).expect_err("strict");
    assert_eq!(strict.kind(), ErrorKind::Validation);

    let lenient = AdGroup::from_value_with(&payload, Validator::new(CollectionMatch::Sample));
    assert!(lenient.is_ok());
}

#[test]
fn any_model_converts_back_to_its_own_type_only() {
    let model = ResourceKind::AdGroup
        .instantiate(json!({ "name": "g" }).as_object().expect("object"))
        .expect("group");
    assert!(matches!(model, AnyModel::AdGroup(_)));
    assert_eq!(
        model.clone().into_model::<AdCampaign>().expect_err("mismatch").kind(),
        ErrorKind::Validation
    );
    assert_eq!(model.into_model::<AdGroup>().expect("group").name(), Some("g"));
}
