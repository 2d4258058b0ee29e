//! Purpose: Support records the Graph API embeds in other objects.
//! Exports: Support schemas (`TOKEN`, `TARGETING`, ...) and their model wrappers.
//! Role: Nested shapes for the ad resources in `models::ads`.
use time::OffsetDateTime;

use crate::core::schema::{
    BOOL, Choice, FieldDef, INT, INT_LIST, LONG, LONG_LIST, ScalarKind, Schema, Shape,
    TEXT, TEXT_LIST, TEXT_OR_NULL, TIMESTAMP,
};
use crate::core::value::FieldValue;
use crate::models::{model, numeric_text};

pub static TOKEN: Schema = Schema::new(
    "Token",
    &[
        FieldDef::new("text", TEXT),
        FieldDef::new("app_id", TEXT),
        FieldDef::new("is_valid", BOOL),
        FieldDef::new("application", TEXT),
        FieldDef::new("user_id", TEXT),
        FieldDef::new("issued_at", TIMESTAMP),
        FieldDef::new("expires_at", TIMESTAMP),
        FieldDef::new("scopes", TEXT_LIST),
    ],
);

pub static BROAD_TARGETING_CATEGORY: Schema = Schema::new(
    "BroadTargetingCategory",
    &[
        FieldDef::new("id", LONG).coerce_with(numeric_text),
        FieldDef::new("name", TEXT),
        FieldDef::new("parent_category", TEXT_OR_NULL),
        FieldDef::new("size", INT),
        FieldDef::new("type", INT),
        FieldDef::new("type_name", TEXT),
    ],
);

pub static REGION: Schema = Schema::new(
    "Region",
    &[FieldDef::new("id", TEXT), FieldDef::new("name", TEXT)],
);

pub static COUNTRY: Schema = Schema::new(
    "Country",
    &[
        FieldDef::new("country_code", TEXT),
        FieldDef::new("name", TEXT),
        FieldDef::new("supports_region", BOOL),
        FieldDef::new("supports_city", BOOL),
    ],
);

pub static CITY: Schema = Schema::new(
    "City",
    &[FieldDef::new("id", TEXT), FieldDef::new("name", TEXT)],
);

pub static COLLEGE_NETWORK: Schema = Schema::new(
    "CollegeNetwork",
    &[FieldDef::new("id", TEXT), FieldDef::new("name", TEXT)],
);

pub static WORK_NETWORK: Schema = Schema::new(
    "WorkNetwork",
    &[FieldDef::new("id", TEXT), FieldDef::new("name", TEXT)],
);

pub static USER_CONNECTION: Schema = Schema::new(
    "UserConnection",
    &[FieldDef::new("id", TEXT), FieldDef::new("name", TEXT)],
);

static CITIES: Shape = Shape::Nested(&CITY);
static REGIONS: Shape = Shape::Nested(&REGION);
static CATEGORIES: Shape = Shape::Nested(&BROAD_TARGETING_CATEGORY);
static CONNECTIONS: Shape = Shape::Nested(&USER_CONNECTION);
static COLLEGES: Shape = Shape::Nested(&COLLEGE_NETWORK);
static WORKPLACES: Shape = Shape::Nested(&WORK_NETWORK);

pub static TARGETING: Schema = Schema::new(
    "Targeting",
    &[
        FieldDef::new("genders", INT_LIST).choices(&[
            Choice::IntList(&[1]),
            Choice::IntList(&[2]),
            Choice::IntList(&[1, 2]),
        ]),
        FieldDef::new("age_min", INT),
        FieldDef::new("age_max", INT),
        FieldDef::new("broad_age", INT).choices(&[Choice::Int(0), Choice::Int(1)]),
        FieldDef::new("countries", TEXT_LIST),
        FieldDef::new("cities", Shape::ListOf(&CITIES)),
        FieldDef::new("regions", Shape::ListOf(&REGIONS)),
        FieldDef::new("radius", INT),
        FieldDef::new("conjunctive_user_adclusters", Shape::ListOf(&CATEGORIES)),
        FieldDef::new("excluded_user_adclusters", Shape::ListOf(&CATEGORIES)),
        FieldDef::new("keywords", TEXT_LIST),
        FieldDef::new("user_os", TEXT_LIST),
        FieldDef::new("user_device", TEXT_LIST).choices(&[
            Choice::Text("iPhone"),
            Choice::Text("iPod"),
            Choice::Text("android_tablet"),
            Choice::Text("android_smartphone"),
        ]),
        FieldDef::new("wireless_carrier", TEXT_LIST).choices(&[Choice::Text("WiFi")]),
        FieldDef::new("site_category", TEXT_LIST).choices(&[Choice::Text("feature_phones")]),
        FieldDef::new("connections", Shape::ListOf(&CONNECTIONS)),
        FieldDef::new("excluded_connections", Shape::ListOf(&CONNECTIONS)),
        FieldDef::new("friends_of_connections", Shape::ListOf(&CONNECTIONS)),
        FieldDef::new("college_networks", Shape::ListOf(&COLLEGES)),
        FieldDef::new("work_networks", Shape::ListOf(&WORKPLACES)),
        FieldDef::new("education_statuses", INT_LIST).choices(&[
            Choice::IntList(&[1]),
            Choice::IntList(&[2]),
            Choice::IntList(&[3]),
        ]),
        FieldDef::new("college_majors", TEXT_LIST),
        FieldDef::new("page_types", TEXT_LIST).choices(&[
            Choice::TextList(&["desktop"]),
            Choice::TextList(&["feed"]),
            Choice::TextList(&["desktopfeed"]),
            Choice::TextList(&["mobile"]),
            Choice::TextList(&["rightcolumn"]),
            Choice::TextList(&["home"]),
        ]),
        FieldDef::new("relationship_statuses", INT_LIST),
        FieldDef::new("interested_in", INT_LIST)
            .choices(&[Choice::IntList(&[1]), Choice::IntList(&[2])]),
        FieldDef::new(
            "locales",
            Shape::OneOf(&[Shape::TypedDict(ScalarKind::Text, ScalarKind::Text), TEXT_LIST]),
        ),
    ],
);

/// On-site objects and actions only.
pub static ACTION_SPEC: Schema = Schema::new(
    "ActionSpec",
    &[
        FieldDef::new("action.type", TEXT_LIST),
        FieldDef::new("application", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("offer", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("event", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("question", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("page", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("post", LONG_LIST).coerce_with(numeric_text),
    ],
);

pub static TRACKING_SPEC: Schema = Schema::new(
    "TrackingSpec",
    &[
        FieldDef::new("action.type", TEXT_LIST),
        FieldDef::new("page", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("application", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("object", TEXT_LIST),
        FieldDef::new("object.domain", TEXT_LIST),
        FieldDef::new("post", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("post.wall", LONG_LIST).coerce_with(numeric_text),
        FieldDef::new("offer", LONG_LIST).coerce_with(numeric_text),
    ],
);

pub static AD_PREVIEW_CSS: Schema =
    Schema::new("AdPreviewCss", &[FieldDef::new("result", TEXT)]);

pub static PREVIEW: Schema = Schema::new("Preview", &[FieldDef::new("body", TEXT)]);

pub static POST: Schema = Schema::new(
    "Post",
    &[
        FieldDef::new("id", TEXT),
        FieldDef::new("message", TEXT),
        FieldDef::new("picture", TEXT_OR_NULL),
        FieldDef::new("link", TEXT_OR_NULL),
        FieldDef::new("published", BOOL),
    ],
);

model!(
    /// OAuth token, shaped after the `debug_token` response.
    Token => TOKEN
);
model!(BroadTargetingCategory => BROAD_TARGETING_CATEGORY);
model!(Region => REGION);
model!(Country => COUNTRY);
model!(City => CITY);
model!(CollegeNetwork => COLLEGE_NETWORK);
model!(WorkNetwork => WORK_NETWORK);
model!(UserConnection => USER_CONNECTION);
model!(
    /// Audience definition attached to an ad group.
    Targeting => TARGETING
);
model!(ActionSpec => ACTION_SPEC);
model!(TrackingSpec => TRACKING_SPEC);
model!(AdPreviewCss => AD_PREVIEW_CSS);
model!(Preview => PREVIEW);
model!(Post => POST);

impl Token {
    pub fn text(&self) -> Option<&str> {
        self.0.text("text")
    }

    pub fn is_valid(&self) -> Option<bool> {
        self.0.boolean("is_valid")
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.0.timestamp("expires_at")
    }

    pub fn scopes(&self) -> Vec<&str> {
        text_items(self.0.list("scopes"))
    }
}

impl BroadTargetingCategory {
    pub fn id(&self) -> Option<u64> {
        self.0.uint("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.text("name")
    }

    pub fn parent_category(&self) -> Option<&str> {
        self.0.text("parent_category")
    }

    pub fn size(&self) -> Option<i64> {
        self.0.int("size")
    }
}

impl Targeting {
    pub fn countries(&self) -> Vec<&str> {
        text_items(self.0.list("countries"))
    }

    pub fn genders(&self) -> Vec<i64> {
        self.0
            .list("genders")
            .map(|items| items.iter().filter_map(FieldValue::as_i64).collect())
            .unwrap_or_default()
    }

    pub fn age_range(&self) -> (Option<i64>, Option<i64>) {
        (self.0.int("age_min"), self.0.int("age_max"))
    }

    pub fn cities(&self) -> Vec<City> {
        self.0.records("cities").into_iter().cloned().map(City).collect()
    }
}

impl Preview {
    pub fn body(&self) -> Option<&str> {
        self.0.text("body")
    }
}

impl AdPreviewCss {
    pub fn result(&self) -> Option<&str> {
        self.0.text("result")
    }
}

fn text_items(items: Option<&[FieldValue]>) -> Vec<&str> {
    items
        .map(|items| items.iter().filter_map(FieldValue::as_text).collect())
        .unwrap_or_default()
}
