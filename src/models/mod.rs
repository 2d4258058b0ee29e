//! Purpose: Typed model wrappers over schema-bound records, plus resource dispatch.
//! Exports: `Model`, `ResourceKind`, `AnyModel`, every declared model type and schema.
//! Role: The typed face of the record engine used by the client and the CLI.
//! Invariants: A wrapper always holds a record bound to its own schema.
//! Invariants: `ResourceKind` is closed; unknown kind names fail with `Argument`.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;
use crate::core::schema::Schema;
use crate::core::validate::Validator;
use crate::core::value::FieldValue;

mod ads;
mod support;

pub use ads::{
    AD_ACCOUNT, AD_CAMPAIGN, AD_CREATIVE, AD_GROUP, AD_IMAGE, AD_STATISTIC, AD_USER, AdAccount,
    AdCampaign, AdCreative, AdGroup, AdImage, AdStatistic, AdUser,
};
pub use support::{
    ACTION_SPEC, AD_PREVIEW_CSS, BROAD_TARGETING_CATEGORY, CITY, COLLEGE_NETWORK, COUNTRY,
    ActionSpec, AdPreviewCss, BroadTargetingCategory, City, CollegeNetwork, Country, POST, PREVIEW,
    Post, Preview, REGION, Region, TARGETING, TOKEN, TRACKING_SPEC, Targeting, Token, TrackingSpec,
    USER_CONNECTION, UserConnection, WORK_NETWORK, WorkNetwork,
};

/// Every schema declared by the crate.
pub fn all_schemas() -> [&'static Schema; 21] {
    [
        &AD_ACCOUNT,
        &AD_CAMPAIGN,
        &AD_CREATIVE,
        &AD_GROUP,
        &AD_IMAGE,
        &AD_STATISTIC,
        &AD_USER,
        &BROAD_TARGETING_CATEGORY,
        &TOKEN,
        &REGION,
        &COUNTRY,
        &CITY,
        &COLLEGE_NETWORK,
        &WORK_NETWORK,
        &USER_CONNECTION,
        &TARGETING,
        &ACTION_SPEC,
        &TRACKING_SPEC,
        &AD_PREVIEW_CSS,
        &PREVIEW,
        &POST,
    ]
}

pub trait Model: Sized {
    fn schema() -> &'static Schema;
    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;
    fn into_record(self) -> Record;
    #[doc(hidden)]
    fn from_record_unchecked(record: Record) -> Self;

    fn new() -> Self {
        Self::from_record_unchecked(Record::new(Self::schema()))
    }

    fn from_record(record: Record) -> Result<Self, Error> {
        if record.schema() != Self::schema() {
            return Err(Error::new(ErrorKind::Validation)
                .with_message("record is bound to a different schema")
                .with_value(record.schema().name())
                .with_allowed(Self::schema().name()));
        }
        Ok(Self::from_record_unchecked(record))
    }

    fn from_json_map(map: &Map<String, Value>) -> Result<Self, Error> {
        Self::from_json_map_with(map, Validator::default())
    }

    fn from_json_map_with(map: &Map<String, Value>, validator: Validator) -> Result<Self, Error> {
        Record::from_json_map_with(Self::schema(), map, validator).map(Self::from_record_unchecked)
    }

    fn from_json_str(raw: &str) -> Result<Self, Error> {
        Record::from_json_str(Self::schema(), raw).map(Self::from_record_unchecked)
    }

    fn from_value_with(value: &Value, validator: Validator) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Self::from_json_map_with(map, validator),
            other => Err(Error::new(ErrorKind::Decode)
                .with_message(format!("{} payload must be an object", Self::schema().name()))
                .with_value(other.to_string())),
        }
    }

    fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), Error> {
        self.record_mut().set(name, value)
    }

    fn get(&self, name: &str) -> Result<&FieldValue, Error> {
        self.record().get(name)
    }

    fn to_json(&self) -> Value {
        self.record().to_json()
    }
}

macro_rules! model {
    ($(#[$meta:meta])* $name:ident => $schema:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name($crate::core::record::Record);

        impl $crate::models::Model for $name {
            fn schema() -> &'static $crate::core::schema::Schema {
                &$schema
            }

            fn record(&self) -> &$crate::core::record::Record {
                &self.0
            }

            fn record_mut(&mut self) -> &mut $crate::core::record::Record {
                &mut self.0
            }

            fn into_record(self) -> $crate::core::record::Record {
                self.0
            }

            fn from_record_unchecked(record: $crate::core::record::Record) -> Self {
                Self(record)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($crate::core::record::Record::new(&$schema))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}
pub(crate) use model;

/// Field hook: numeric text (Graph ids arrive as strings) becomes an integer.
pub(crate) fn numeric_text(value: FieldValue) -> Result<FieldValue, Error> {
    Ok(match value {
        FieldValue::Text(text) => match text.parse::<u64>() {
            Ok(number) => FieldValue::from(number),
            Err(_) => FieldValue::Text(text),
        },
        FieldValue::List(items) => FieldValue::List(
            items
                .into_iter()
                .map(numeric_text)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        other => other,
    })
}

/// Wraps typed records reachable through the `/{container}/{collection}` endpoints.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    AdAccount,
    AdCampaign,
    AdCreative,
    AdGroup,
    AdImage,
    AdStatistic,
    AdUser,
    BroadTargetingCategory,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::AdAccount,
        ResourceKind::AdCampaign,
        ResourceKind::AdCreative,
        ResourceKind::AdGroup,
        ResourceKind::AdImage,
        ResourceKind::AdStatistic,
        ResourceKind::AdUser,
        ResourceKind::BroadTargetingCategory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::AdAccount => "adaccount",
            ResourceKind::AdCampaign => "adcampaign",
            ResourceKind::AdCreative => "adcreative",
            ResourceKind::AdGroup => "adgroup",
            ResourceKind::AdImage => "adimage",
            ResourceKind::AdStatistic => "adstatistic",
            ResourceKind::AdUser => "aduser",
            ResourceKind::BroadTargetingCategory => "broadtargetingcategory",
        }
    }

    /// Path segment of the collection endpoint, e.g. `/act_1/adcampaigns`.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::AdAccount => "adaccounts",
            ResourceKind::AdCampaign => "adcampaigns",
            ResourceKind::AdCreative => "adcreatives",
            ResourceKind::AdGroup => "adgroups",
            ResourceKind::AdImage => "adimages",
            ResourceKind::AdStatistic => "stats",
            ResourceKind::AdUser => "users",
            ResourceKind::BroadTargetingCategory => "broadtargetingcategories",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            ResourceKind::AdAccount => &AD_ACCOUNT,
            ResourceKind::AdCampaign => &AD_CAMPAIGN,
            ResourceKind::AdCreative => &AD_CREATIVE,
            ResourceKind::AdGroup => &AD_GROUP,
            ResourceKind::AdImage => &AD_IMAGE,
            ResourceKind::AdStatistic => &AD_STATISTIC,
            ResourceKind::AdUser => &AD_USER,
            ResourceKind::BroadTargetingCategory => &BROAD_TARGETING_CATEGORY,
        }
    }

    pub fn instantiate(self, map: &Map<String, Value>) -> Result<AnyModel, Error> {
        self.instantiate_with(map, Validator::default())
    }

    pub fn instantiate_with(
        self,
        map: &Map<String, Value>,
        validator: Validator,
    ) -> Result<AnyModel, Error> {
        let record = Record::from_json_map_with(self.schema(), map, validator)?;
        Ok(self.wrap(record))
    }

    /// Builds a model from already-converted values, e.g. fields about to be submitted.
    pub fn instantiate_values(
        self,
        values: BTreeMap<String, FieldValue>,
        validator: Validator,
    ) -> Result<AnyModel, Error> {
        let record = Record::from_values_with(self.schema(), values, validator)?;
        Ok(self.wrap(record))
    }

    fn wrap(self, record: Record) -> AnyModel {
        match self {
            ResourceKind::AdAccount => AnyModel::AdAccount(AdAccount::from_record_unchecked(record)),
            ResourceKind::AdCampaign => {
                AnyModel::AdCampaign(AdCampaign::from_record_unchecked(record))
            }
            ResourceKind::AdCreative => {
                AnyModel::AdCreative(AdCreative::from_record_unchecked(record))
            }
            ResourceKind::AdGroup => AnyModel::AdGroup(AdGroup::from_record_unchecked(record)),
            ResourceKind::AdImage => AnyModel::AdImage(AdImage::from_record_unchecked(record)),
            ResourceKind::AdStatistic => {
                AnyModel::AdStatistic(AdStatistic::from_record_unchecked(record))
            }
            ResourceKind::AdUser => AnyModel::AdUser(AdUser::from_record_unchecked(record)),
            ResourceKind::BroadTargetingCategory => AnyModel::BroadTargetingCategory(
                BroadTargetingCategory::from_record_unchecked(record),
            ),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let kind = match input.trim().to_ascii_lowercase().as_str() {
            "adaccount" => ResourceKind::AdAccount,
            "adcampaign" => ResourceKind::AdCampaign,
            "adcreative" => ResourceKind::AdCreative,
            "adgroup" => ResourceKind::AdGroup,
            "adimage" => ResourceKind::AdImage,
            "adstatistic" | "stats" => ResourceKind::AdStatistic,
            "aduser" | "user" => ResourceKind::AdUser,
            "broadtargetingcategory" => ResourceKind::BroadTargetingCategory,
            _ => {
                return Err(Error::new(ErrorKind::Argument)
                    .with_message("Unrecognized object requested.")
                    .with_value(input)
                    .with_hint(format!(
                        "Known kinds: {}",
                        ResourceKind::ALL.map(ResourceKind::name).join(", ")
                    )));
            }
        };
        Ok(kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnyModel {
    AdAccount(AdAccount),
    AdCampaign(AdCampaign),
    AdCreative(AdCreative),
    AdGroup(AdGroup),
    AdImage(AdImage),
    AdStatistic(AdStatistic),
    AdUser(AdUser),
    BroadTargetingCategory(BroadTargetingCategory),
}

impl AnyModel {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyModel::AdAccount(_) => ResourceKind::AdAccount,
            AnyModel::AdCampaign(_) => ResourceKind::AdCampaign,
            AnyModel::AdCreative(_) => ResourceKind::AdCreative,
            AnyModel::AdGroup(_) => ResourceKind::AdGroup,
            AnyModel::AdImage(_) => ResourceKind::AdImage,
            AnyModel::AdStatistic(_) => ResourceKind::AdStatistic,
            AnyModel::AdUser(_) => ResourceKind::AdUser,
            AnyModel::BroadTargetingCategory(_) => ResourceKind::BroadTargetingCategory,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            AnyModel::AdAccount(model) => model.record(),
            AnyModel::AdCampaign(model) => model.record(),
            AnyModel::AdCreative(model) => model.record(),
            AnyModel::AdGroup(model) => model.record(),
            AnyModel::AdImage(model) => model.record(),
            AnyModel::AdStatistic(model) => model.record(),
            AnyModel::AdUser(model) => model.record(),
            AnyModel::BroadTargetingCategory(model) => model.record(),
        }
    }

    pub fn record_mut(&mut self) -> &mut Record {
        match self {
            AnyModel::AdAccount(model) => model.record_mut(),
            AnyModel::AdCampaign(model) => model.record_mut(),
            AnyModel::AdCreative(model) => model.record_mut(),
            AnyModel::AdGroup(model) => model.record_mut(),
            AnyModel::AdImage(model) => model.record_mut(),
            AnyModel::AdStatistic(model) => model.record_mut(),
            AnyModel::AdUser(model) => model.record_mut(),
            AnyModel::BroadTargetingCategory(model) => model.record_mut(),
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            AnyModel::AdAccount(model) => model.into_record(),
            AnyModel::AdCampaign(model) => model.into_record(),
            AnyModel::AdCreative(model) => model.into_record(),
            AnyModel::AdGroup(model) => model.into_record(),
            AnyModel::AdImage(model) => model.into_record(),
            AnyModel::AdStatistic(model) => model.into_record(),
            AnyModel::AdUser(model) => model.into_record(),
            AnyModel::BroadTargetingCategory(model) => model.into_record(),
        }
    }

    /// Unwraps into a concrete model; fails when the kinds disagree.
    pub fn into_model<M: Model>(self) -> Result<M, Error> {
        M::from_record(self.into_record())
    }

    pub fn to_json(&self) -> Value {
        self.record().to_json()
    }
}

impl fmt::Display for AnyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.record(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::{AdCampaign, AnyModel, Model, ResourceKind, all_schemas, numeric_text};
    use crate::core::error::ErrorKind;
    use crate::core::value::FieldValue;
    use serde_json::json;

    #[test]
    fn declared_schemas_have_unique_field_names() {
        for schema in all_schemas() {
            schema.check().expect("unique field names");
        }
    }

    #[test]
    fn kind_names_and_aliases_parse() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.name().parse::<ResourceKind>().expect("kind"), kind);
        }
        assert_eq!("user".parse::<ResourceKind>().expect("alias"), ResourceKind::AdUser);
        assert_eq!("Stats".parse::<ResourceKind>().expect("alias"), ResourceKind::AdStatistic);
        let err = "adset".parse::<ResourceKind>().expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.message(), Some("Unrecognized object requested."));
    }

    #[test]
    fn instantiate_dispatches_to_the_typed_model() {
        let payload = json!({"id": "6003", "name": "spring", "campaign_status": 1});
        let model = ResourceKind::AdCampaign
            .instantiate(payload.as_object().expect("object"))
            .expect("campaign");
        assert_eq!(model.kind(), ResourceKind::AdCampaign);
        let AnyModel::AdCampaign(campaign) = &model else {
            panic!("expected campaign");
        };
        assert_eq!(campaign.id(), Some(6003));

        let campaign: AdCampaign = model.into_model().expect("into");
        assert_eq!(campaign.name(), Some("spring"));
    }

    #[test]
    fn into_model_rejects_a_mismatched_kind() {
        let payload = json!({"name": "x"});
        let model = ResourceKind::AdGroup
            .instantiate(payload.as_object().expect("object"))
            .expect("group");
        let err = model.into_model::<AdCampaign>().expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn numeric_text_converts_ids_and_leaves_words() {
        assert_eq!(
            numeric_text(FieldValue::from("123")).expect("id"),
            FieldValue::Int(123)
        );
        assert_eq!(
            numeric_text(FieldValue::from("act_1")).expect("word"),
            FieldValue::from("act_1")
        );
    }
}
