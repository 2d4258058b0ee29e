//! Purpose: Per-resource finder views over a `GraphClient`.
//! Exports: `ListOptions` and one `*Api` view per endpoint-backed resource.
//! Role: Path building and typed unwrapping only; all I/O goes through the client.
#![allow(clippy::result_large_err)]

use std::fmt::Display;

use serde_json::Value;
use time::OffsetDateTime;

use super::client::{GraphClient, account_node};
use super::pagination::{LIMIT_PARAM, OFFSET_PARAM};
use super::retry::Sleeper;
use super::transport::Transport;
use super::{ApiResult, Params};
use crate::core::error::{Error, ErrorKind};
use crate::core::timestamp;
use crate::models::{
    AdAccount, AdCampaign, AdCreative, AdGroup, AdStatistic, AdUser, AnyModel,
    BroadTargetingCategory, Model, ResourceKind,
};

/// Paging and visibility knobs shared by every list call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ListOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include_deleted: bool,
}

impl ListOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(limit) = self.limit {
            params.insert(LIMIT_PARAM.to_string(), limit.to_string());
        }
        if let Some(offset) = self.offset {
            params.insert(OFFSET_PARAM.to_string(), offset.to_string());
        }
        if self.include_deleted {
            params.insert("include_deleted".to_string(), "true".to_string());
        }
        params
    }
}

impl<T: Transport, S: Sleeper> GraphClient<T, S> {
    pub fn ad_accounts(&self) -> AdAccountApi<'_, T, S> {
        AdAccountApi { client: self }
    }

    pub fn ad_campaigns(&self) -> AdCampaignApi<'_, T, S> {
        AdCampaignApi { client: self }
    }

    pub fn ad_groups(&self) -> AdGroupApi<'_, T, S> {
        AdGroupApi { client: self }
    }

    pub fn ad_creatives(&self) -> AdCreativeApi<'_, T, S> {
        AdCreativeApi { client: self }
    }

    pub fn ad_statistics(&self) -> AdStatisticApi<'_, T, S> {
        AdStatisticApi { client: self }
    }

    pub fn ad_users(&self) -> AdUserApi<'_, T, S> {
        AdUserApi { client: self }
    }

    pub fn broad_targeting_categories(&self) -> BroadTargetingCategoryApi<'_, T, S> {
        BroadTargetingCategoryApi { client: self }
    }

    fn find_one<M: Model>(&self, id: &str, kind: ResourceKind) -> ApiResult<M> {
        self.get_one(id, kind)?.into_model()
    }

    fn find_many<M: Model, I: Display>(&self, ids: &[I], kind: ResourceKind) -> ApiResult<Vec<M>> {
        typed(self.get_many(ids, kind)?)
    }

    fn find_under<M: Model>(
        &self,
        container_id: &str,
        kind: ResourceKind,
        options: ListOptions,
    ) -> ApiResult<Vec<M>> {
        typed(self.get_list(container_id, kind, &options.to_params())?)
    }
}

pub struct AdAccountApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdAccountApi<'_, T, S> {
    pub fn find_by_id(&self, account_id: &str) -> ApiResult<AdAccount> {
        self.client
            .find_one(&account_node(account_id), ResourceKind::AdAccount)
    }

    /// Accounts the user can manage; `"me"` names the token's owner.
    pub fn find_by_user(&self, user_id: &str, options: ListOptions) -> ApiResult<Vec<AdAccount>> {
        self.client
            .find_under(user_id, ResourceKind::AdAccount, options)
    }
}

pub struct AdCampaignApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdCampaignApi<'_, T, S> {
    pub fn find_by_id(&self, campaign_id: &str) -> ApiResult<AdCampaign> {
        self.client.find_one(campaign_id, ResourceKind::AdCampaign)
    }

    pub fn find_by_ids<I: Display>(&self, campaign_ids: &[I]) -> ApiResult<Vec<AdCampaign>> {
        self.client.find_many(campaign_ids, ResourceKind::AdCampaign)
    }

    pub fn find_by_adaccount_id(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdCampaign>> {
        self.client
            .find_under(&account_node(account_id), ResourceKind::AdCampaign, options)
    }
}

pub struct AdGroupApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdGroupApi<'_, T, S> {
    pub fn find_by_id(&self, adgroup_id: &str) -> ApiResult<AdGroup> {
        self.client.find_one(adgroup_id, ResourceKind::AdGroup)
    }

    pub fn find_by_ids<I: Display>(&self, adgroup_ids: &[I]) -> ApiResult<Vec<AdGroup>> {
        self.client.find_many(adgroup_ids, ResourceKind::AdGroup)
    }

    pub fn find_by_adaccount_id(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdGroup>> {
        self.client
            .find_under(&account_node(account_id), ResourceKind::AdGroup, options)
    }

    pub fn find_by_adcampaign_id(
        &self,
        campaign_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdGroup>> {
        self.client
            .find_under(campaign_id, ResourceKind::AdGroup, options)
    }
}

pub struct AdCreativeApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdCreativeApi<'_, T, S> {
    pub fn find_by_id(&self, creative_id: &str) -> ApiResult<AdCreative> {
        self.client.find_one(creative_id, ResourceKind::AdCreative)
    }

    pub fn find_by_ids<I: Display>(&self, creative_ids: &[I]) -> ApiResult<Vec<AdCreative>> {
        self.client.find_many(creative_ids, ResourceKind::AdCreative)
    }

    pub fn find_by_adaccount_id(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdCreative>> {
        self.client
            .find_under(&account_node(account_id), ResourceKind::AdCreative, options)
    }

    pub fn find_by_adgroup_id(
        &self,
        adgroup_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdCreative>> {
        self.client
            .find_under(adgroup_id, ResourceKind::AdCreative, options)
    }
}

pub struct AdStatisticApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdStatisticApi<'_, T, S> {
    /// Lifetime statistics of an account.
    pub fn find_by_adaccount_id(&self, account_id: &str) -> ApiResult<Vec<AdStatistic>> {
        let resource = format!("/{}/stats", account_node(account_id));
        let response = self.client.get(&resource, &Params::new())?;
        self.statistics(&response)
    }

    pub fn find_by_adgroup_ids<I: Display>(
        &self,
        account_id: &str,
        adgroup_ids: &[I],
        options: ListOptions,
    ) -> ApiResult<Vec<AdStatistic>> {
        if adgroup_ids.is_empty() {
            return Err(Error::new(ErrorKind::Argument).with_message("A list of ids is required"));
        }
        let ids: Vec<Value> = adgroup_ids
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        let mut params = options.to_params();
        params.insert("adgroup_ids".to_string(), Value::Array(ids).to_string());
        let resource = format!("/{}/adgroupstats", account_node(account_id));
        let items = self.client.get_all(&resource, &params)?;
        items
            .iter()
            .map(|item| self.client.instantiate(ResourceKind::AdStatistic, item))
            .map(|model| model.and_then(AnyModel::into_model))
            .collect()
    }

    /// Account statistics for `[start, end)`, addressed in unix seconds.
    pub fn find_by_start_time_end_time(
        &self,
        account_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> ApiResult<Vec<AdStatistic>> {
        if end < start {
            return Err(Error::new(ErrorKind::Argument)
                .with_message("end time precedes start time")
                .with_value(timestamp::format_rfc3339(&end)));
        }
        let resource = format!(
            "/{}/stats/{}/{}",
            account_node(account_id),
            timestamp::to_unix(&start),
            timestamp::to_unix(&end)
        );
        let response = self.client.get(&resource, &Params::new())?;
        self.statistics(&response)
    }

    // Stats endpoints answer with either one object or a `data` page.
    fn statistics(&self, response: &Value) -> ApiResult<Vec<AdStatistic>> {
        let items = match response.get("data").and_then(Value::as_array) {
            Some(items) => items.iter().collect::<Vec<_>>(),
            None => vec![response],
        };
        items
            .into_iter()
            .map(|item| {
                self.client
                    .instantiate(ResourceKind::AdStatistic, item)?
                    .into_model()
            })
            .collect()
    }
}

pub struct AdUserApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> AdUserApi<'_, T, S> {
    pub fn find_by_adaccount_id(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<AdUser>> {
        self.client
            .find_under(&account_node(account_id), ResourceKind::AdUser, options)
    }
}

pub struct BroadTargetingCategoryApi<'a, T, S> {
    client: &'a GraphClient<T, S>,
}

impl<T: Transport, S: Sleeper> BroadTargetingCategoryApi<'_, T, S> {
    pub fn find_by_adaccount_id(
        &self,
        account_id: &str,
        options: ListOptions,
    ) -> ApiResult<Vec<BroadTargetingCategory>> {
        self.client.find_under(
            &account_node(account_id),
            ResourceKind::BroadTargetingCategory,
            options,
        )
    }
}

fn typed<M: Model>(models: Vec<AnyModel>) -> ApiResult<Vec<M>> {
    models.into_iter().map(AnyModel::into_model).collect()
}

#[cfg(test)]
mod tests {
    use super::ListOptions;

    #[test]
    fn list_options_only_emit_what_was_set() {
        assert!(ListOptions::default().to_params().is_empty());
        let params = ListOptions::default()
            .limit(25)
            .offset(50)
            .include_deleted(true)
            .to_params();
        assert_eq!(params.get("limit").map(String::as_str), Some("25"));
        assert_eq!(params.get("offset").map(String::as_str), Some("50"));
        assert_eq!(params.get("include_deleted").map(String::as_str), Some("true"));
    }
}
