//! Purpose: Ad resources with their own Graph endpoints.
//! Exports: `AdAccount`, `AdCampaign`, `AdGroup`, `AdCreative`, `AdImage`, `AdUser`, `AdStatistic`.
//! Role: Typed results of `GraphClient` reads and inputs to its writes.
//! Invariants: Numeric ids arriving as JSON strings are stored as integers.
use time::OffsetDateTime;

use crate::core::schema::{
    BOOL, Choice, FieldDef, INT, INT_LIST, LONG, LONG_LIST, NULL, OPAQUE, ScalarKind, Schema,
    Shape, TEXT, TEXT_OR_NULL, TIMESTAMP, TIMESTAMP_OR_NULL,
};
use crate::models::support::{AD_PREVIEW_CSS, ACTION_SPEC, PREVIEW, TARGETING, TRACKING_SPEC};
use crate::models::{Model, Targeting, model, numeric_text};

pub static AD_IMAGE: Schema = Schema::new(
    "AdImage",
    &[
        FieldDef::new("hash", TEXT),
        FieldDef::new("url", TEXT),
        FieldDef::new("file", OPAQUE).create_only(),
    ],
);

pub static AD_USER: Schema = Schema::new(
    "AdUser",
    &[
        FieldDef::new("id", LONG).coerce_with(numeric_text),
        FieldDef::new("permissions", INT_LIST),
        FieldDef::new("role", INT)
            .choices(&[Choice::Int(1001), Choice::Int(1002), Choice::Int(1003)])
            .create_only(),
    ],
);

pub static AD_STATISTIC: Schema = Schema::new(
    "AdStatistic",
    &[
        FieldDef::new("id", TEXT),
        FieldDef::new("account_id", LONG).coerce_with(numeric_text),
        FieldDef::new("adcampaign_id", LONG).coerce_with(numeric_text),
        FieldDef::new("adgroup_id", LONG).coerce_with(numeric_text),
        FieldDef::new("impressions", INT),
        FieldDef::new("clicks", INT),
        FieldDef::new("spent", INT),
        FieldDef::new("social_impressions", INT),
        FieldDef::new("social_clicks", INT),
        FieldDef::new("social_spent", INT),
        FieldDef::new("unique_impressions", INT),
        FieldDef::new("unique_clicks", INT),
        FieldDef::new("social_unique_impressions", INT),
        FieldDef::new("social_unique_clicks", INT),
        FieldDef::new("start_time", TIMESTAMP_OR_NULL),
        FieldDef::new("end_time", TIMESTAMP_OR_NULL),
    ],
);

static ACTION_SPECS: Shape = Shape::Nested(&ACTION_SPEC);
static PREVIEWS: Shape = Shape::Nested(&PREVIEW);
static TRACKING_SPECS: Shape = Shape::Nested(&TRACKING_SPEC);
static STATISTICS: Shape = Shape::Nested(&AD_STATISTIC);
static CREATIVES: Shape = Shape::Nested(&AD_CREATIVE);
static GROUPS: Shape = Shape::Nested(&AD_GROUP);
static CAMPAIGNS: Shape = Shape::Nested(&AD_CAMPAIGN);
static USERS: Shape = Shape::Nested(&AD_USER);
static IMAGES: Shape = Shape::Nested(&AD_IMAGE);
static PREVIEW_CSS: Shape = Shape::Nested(&AD_PREVIEW_CSS);

pub static AD_CREATIVE: Schema = Schema::new(
    "AdCreative",
    &[
        FieldDef::new("id", LONG).coerce_with(numeric_text),
        FieldDef::new("type", INT).choices(&[
            Choice::Int(1),
            Choice::Int(2),
            Choice::Int(3),
            Choice::Int(4),
            Choice::Int(12),
            Choice::Int(25),
            Choice::Int(27),
        ]),
        FieldDef::new("object_id", LONG).coerce_with(numeric_text),
        FieldDef::new("name", TEXT),
        FieldDef::new("title", TEXT),
        FieldDef::new("body", TEXT),
        FieldDef::new("image_hash", TEXT_OR_NULL),
        FieldDef::new("image_url", TEXT),
        FieldDef::new("link_url", TEXT),
        FieldDef::new("preview_url", TEXT),
        FieldDef::new("url_tags", TEXT),
        FieldDef::new("related_fan_page", LONG).coerce_with(numeric_text),
        FieldDef::new("story_id", LONG).coerce_with(numeric_text),
        FieldDef::new("follow_redirect", BOOL),
        FieldDef::new("auto_update", BOOL),
        FieldDef::new("action_spec", Shape::ListOf(&ACTION_SPECS)),
        FieldDef::new("previews", Shape::ListOf(&PREVIEWS)),
    ],
);

pub static AD_GROUP: Schema = Schema::new(
    "AdGroup",
    &[
        FieldDef::new("id", LONG).coerce_with(numeric_text),
        FieldDef::new("name", TEXT),
        FieldDef::new("account_id", INT).coerce_with(numeric_text),
        FieldDef::new("campaign_id", LONG).coerce_with(numeric_text),
        FieldDef::new("adgroup_status", TEXT).choices(&[
            Choice::Text("ACTIVE"),
            Choice::Text("DELETED"),
            Choice::Text("PENDING_REVIEW"),
            Choice::Text("DISAPPROVED"),
            Choice::Text("PENDING_BILLING_INFO"),
            Choice::Text("CAMPAIGN_PAUSED"),
            Choice::Text("ADGROUP_PAUSED"),
        ]),
        FieldDef::new("disapprove_reason_descriptions", TEXT),
        FieldDef::new("bid_type", TEXT).choices(&[
            Choice::Text("CPC"),
            Choice::Text("CPM"),
            Choice::Text("MULTI_PREMIUM"),
            Choice::Text("RELATIVE_OCPM"),
            Choice::Text("ABSOLUTE_OCPM"),
            Choice::Text("CPA"),
        ]),
        FieldDef::new(
            "bid_info",
            Shape::OneOf(&[Shape::TypedDict(ScalarKind::Text, ScalarKind::Int), NULL]),
        ),
        FieldDef::new("creative_ids", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("creative", Shape::TypedDict(ScalarKind::Text, ScalarKind::Long)),
        FieldDef::new("targeting", Shape::OneOf(&[Shape::Nested(&TARGETING), NULL])),
        FieldDef::new("tracking_specs", Shape::ListOf(&TRACKING_SPECS)),
        FieldDef::new("last_updated_by_app_id", LONG).coerce_with(numeric_text),
        FieldDef::new("created_time", TIMESTAMP),
        FieldDef::new("updated_time", TIMESTAMP),
        FieldDef::new("stats", Shape::ListOf(&STATISTICS)),
        FieldDef::new("adcreatives", Shape::ListOf(&CREATIVES)),
        FieldDef::new("previews", Shape::ListOf(&PREVIEWS)),
    ],
);

pub static AD_CAMPAIGN: Schema = Schema::new(
    "AdCampaign",
    &[
        FieldDef::new("id", LONG).coerce_with(numeric_text),
        FieldDef::new("name", TEXT),
        FieldDef::new("account_id", LONG).coerce_with(numeric_text),
        FieldDef::new("start_time", TIMESTAMP),
        FieldDef::new("end_time", TIMESTAMP),
        FieldDef::new("created_time", TIMESTAMP),
        FieldDef::new("updated_time", TIMESTAMP),
        FieldDef::new("daily_budget", INT),
        FieldDef::new("lifetime_budget", INT),
        FieldDef::new("budget_remaining", INT),
        FieldDef::new("campaign_status", INT).choices(&[
            Choice::Int(1),
            Choice::Int(2),
            Choice::Int(3),
        ]),
        FieldDef::new("adcreatives", Shape::ListOf(&CREATIVES)),
        FieldDef::new("adgroups", Shape::ListOf(&GROUPS)),
        FieldDef::new("stats", Shape::ListOf(&STATISTICS)),
    ],
);

pub static AD_ACCOUNT: Schema = Schema::new(
    "AdAccount",
    &[
        FieldDef::new("id", TEXT),
        FieldDef::new("account_id", LONG).coerce_with(numeric_text),
        FieldDef::new("name", TEXT),
        FieldDef::new("account_status", INT),
        FieldDef::new("currency", TEXT),
        FieldDef::new("timezone_id", INT),
        FieldDef::new("timezone_name", TEXT),
        FieldDef::new("timezone_offset_hours_utc", INT),
        FieldDef::new("vat_status", INT),
        FieldDef::new("daily_spend_limit", INT),
        FieldDef::new("amount_spent", INT),
        FieldDef::new("users", Shape::ListOf(&USERS)),
        FieldDef::new("adcampaigns", Shape::ListOf(&CAMPAIGNS)),
        FieldDef::new("adimages", Shape::ListOf(&IMAGES)),
        FieldDef::new("adcreatives", Shape::ListOf(&CREATIVES)),
        FieldDef::new("adgroups", Shape::ListOf(&GROUPS)),
        FieldDef::new("stats", Shape::ListOf(&STATISTICS)),
        FieldDef::new("adgroupstats", Shape::ListOf(&STATISTICS)),
        FieldDef::new("adpreviewscss", Shape::ListOf(&PREVIEW_CSS)),
    ],
);

model!(
    /// Uploaded image; `file` is only meaningful on creation.
    AdImage => AD_IMAGE
);
model!(AdUser => AD_USER);
model!(AdStatistic => AD_STATISTIC);
model!(AdCreative => AD_CREATIVE);
model!(
    /// A single ad: creative, targeting and bid under a campaign.
    AdGroup => AD_GROUP
);
model!(AdCampaign => AD_CAMPAIGN);
model!(
    /// Ad account; its `id` carries the `act_` prefix.
    AdAccount => AD_ACCOUNT
);

impl AdAccount {
    pub fn id(&self) -> Option<&str> {
        self.0.text("id")
    }

    /// Bare numeric id, as used in `/act_{account_id}/...` paths.
    pub fn account_id(&self) -> Option<u64> {
        self.0.uint("account_id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.text("name")
    }

    pub fn currency(&self) -> Option<&str> {
        self.0.text("currency")
    }

    pub fn adcampaigns(&self) -> Vec<AdCampaign> {
        self.0
            .records("adcampaigns")
            .into_iter()
            .cloned()
            .map(AdCampaign)
            .collect()
    }
}

impl AdCampaign {
    pub fn id(&self) -> Option<u64> {
        self.0.uint("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.text("name")
    }

    pub fn account_id(&self) -> Option<u64> {
        self.0.uint("account_id")
    }

    pub fn campaign_status(&self) -> Option<i64> {
        self.0.int("campaign_status")
    }

    pub fn start_time(&self) -> Option<OffsetDateTime> {
        self.0.timestamp("start_time")
    }

    pub fn end_time(&self) -> Option<OffsetDateTime> {
        self.0.timestamp("end_time")
    }

    pub fn daily_budget(&self) -> Option<i64> {
        self.0.int("daily_budget")
    }

    pub fn adgroups(&self) -> Vec<AdGroup> {
        self.0
            .records("adgroups")
            .into_iter()
            .cloned()
            .map(AdGroup)
            .collect()
    }
}

impl AdGroup {
    pub fn id(&self) -> Option<u64> {
        self.0.uint("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.text("name")
    }

    pub fn campaign_id(&self) -> Option<u64> {
        self.0.uint("campaign_id")
    }

    pub fn adgroup_status(&self) -> Option<&str> {
        self.0.text("adgroup_status")
    }

    pub fn bid_type(&self) -> Option<&str> {
        self.0.text("bid_type")
    }

    pub fn targeting(&self) -> Option<Targeting> {
        self.0
            .record("targeting")
            .cloned()
            .and_then(|record| Targeting::from_record(record).ok())
    }
}

impl AdCreative {
    pub fn id(&self) -> Option<u64> {
        self.0.uint("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.text("name")
    }

    pub fn title(&self) -> Option<&str> {
        self.0.text("title")
    }

    pub fn body(&self) -> Option<&str> {
        self.0.text("body")
    }

    pub fn link_url(&self) -> Option<&str> {
        self.0.text("link_url")
    }
}

impl AdImage {
    pub fn hash(&self) -> Option<&str> {
        self.0.text("hash")
    }

    pub fn url(&self) -> Option<&str> {
        self.0.text("url")
    }
}

impl AdUser {
    pub fn id(&self) -> Option<u64> {
        self.0.uint("id")
    }

    pub fn role(&self) -> Option<i64> {
        self.0.int("role")
    }
}

impl AdStatistic {
    pub fn id(&self) -> Option<&str> {
        self.0.text("id")
    }

    pub fn impressions(&self) -> Option<i64> {
        self.0.int("impressions")
    }

    pub fn clicks(&self) -> Option<i64> {
        self.0.int("clicks")
    }

    pub fn spent(&self) -> Option<i64> {
        self.0.int("spent")
    }
}

#[cfg(test)]
mod tests {
    use super::{AD_ACCOUNT, AD_IMAGE, AD_USER, AdAccount, AdCampaign, AdGroup, AdStatistic};
    use crate::core::error::ErrorKind;
    use crate::core::value::FieldValue;
    use crate::models::Model;
    use serde_json::json;

    #[test]
    fn campaign_status_outside_choices_is_rejected() {
        let mut campaign = AdCampaign::new();
        campaign.set("campaign_status", 2).expect("paused");
        let err = campaign.set("campaign_status", 9).expect_err("bad status");
        assert_eq!(err.kind(), ErrorKind::Choice);
        assert_eq!(err.field(), Some("campaign_status"));
        assert_eq!(err.allowed(), Some("[1, 2, 3]"));
        assert_eq!(campaign.campaign_status(), Some(2));
    }

    #[test]
    fn string_ids_from_the_graph_become_integers() {
        let group = AdGroup::from_json_str(
            r#"{"id": "6004163746239", "campaign_id": "6004163720239", "creative_ids": ["1", "2"]}"#,
        )
        .expect("group");
        assert_eq!(group.id(), Some(6_004_163_746_239));
        assert_eq!(group.campaign_id(), Some(6_004_163_720_239));
        assert_eq!(
            group.record().list("creative_ids"),
            Some(&[FieldValue::Int(1), FieldValue::Int(2)][..])
        );
    }

    #[test]
    fn adgroup_accepts_null_bid_info_and_nested_targeting() {
        let payload = json!({
            "name": "spring launch",
            "bid_type": "CPC",
            "bid_info": null,
            "creative": {"creative_id": 6003},
            "targeting": {"countries": ["US"], "age_min": 18},
        });
        let group = AdGroup::from_value_with(&payload, Default::default()).expect("group");
        assert_eq!(group.bid_type(), Some("CPC"));
        assert!(group.record().get("bid_info").expect("bid_info").is_null());
        let targeting = group.targeting().expect("targeting");
        assert_eq!(targeting.countries(), vec!["US"]);

        let mut group = group;
        group.set("bid_info", json!({"clicks": 40})).expect("bid dict");
        let err = group.set("bid_type", "CPX").expect_err("bid type");
        assert_eq!(err.kind(), ErrorKind::Choice);
    }

    #[test]
    fn campaign_times_accept_unix_seconds_and_text() {
        let mut campaign = AdCampaign::new();
        campaign.set("start_time", 1_356_998_400i64).expect("unix");
        campaign.set("end_time", "2013-02-01T00:00:00+0000").expect("graph text");
        let start = campaign.start_time().expect("start");
        let end = campaign.end_time().expect("end");
        assert!(end > start);
        assert_eq!(campaign.to_json()["end_time"], json!(1_359_676_800));
    }

    #[test]
    fn account_nests_campaigns_from_json() {
        let account = AdAccount::from_json_str(
            r#"{"id": "act_42", "account_id": "42", "currency": "USD",
                "adcampaigns": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#,
        )
        .expect("account");
        assert_eq!(account.id(), Some("act_42"));
        assert_eq!(account.account_id(), Some(42));
        let names: Vec<_> = account
            .adcampaigns()
            .iter()
            .map(|campaign| campaign.name().map(str::to_string))
            .collect();
        assert_eq!(names, vec![Some("a".to_string()), Some("b".to_string())]);
    }

    #[test]
    fn create_only_fields_are_declared() {
        assert_eq!(AD_IMAGE.create_only_fields().collect::<Vec<_>>(), vec!["file"]);
        assert_eq!(AD_USER.create_only_fields().collect::<Vec<_>>(), vec!["role"]);
        assert_eq!(AD_ACCOUNT.create_only_fields().count(), 0);
    }

    #[test]
    fn statistics_allow_open_ended_windows() {
        let stats = AdStatistic::from_json_str(
            r#"{"id": "6004_stats", "impressions": 100, "clicks": 3, "start_time": null}"#,
        )
        .expect("stats");
        assert_eq!(stats.impressions(), Some(100));
        assert_eq!(stats.clicks(), Some(3));
        assert!(stats.record().get("start_time").expect("start").is_null());
    }
}
