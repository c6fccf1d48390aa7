//! Collibra catalog provider.

use catalink_config::{MatchMode, PageSettings, ProviderConfig};

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::model::{id_string, ExternalResource};
use crate::paging::{Page, PageRequest, Pager};
use crate::provider::Provider;

const SERVICE: &str = "Collibra";

pub struct CollibraProvider {
    id: String,
    api: ApiClient,
    username: String,
    password: String,
    asset_type_ids: Vec<String>,
    paging: PageSettings,
    match_mode: MatchMode,
    match_prefix: String,
}

/// Collibra's `nameMatchMode` values.
fn name_match_mode(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::Exact => "EXACT",
        MatchMode::Prefix => "START",
        MatchMode::Suffix => "END",
        MatchMode::Anywhere => "ANYWHERE",
    }
}

impl CollibraProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        Ok(Self {
            id: config.id.clone(),
            api: ApiClient::new(SERVICE, &config.url, &config.tls)?,
            username: config.username.clone(),
            password: config.password.clone(),
            asset_type_ids: config.asset_type_ids.clone(),
            paging: config.paging,
            match_mode: config.match_mode,
            match_prefix: config.match_prefix.clone(),
        })
    }

    fn fetch_page(&self, name: &str, req: PageRequest) -> Result<Page<ExternalResource>, ClientError> {
        let url = self.api.url("/rest/2.0/assets");

        let mut params: Vec<(&str, String)> = self
            .asset_type_ids
            .iter()
            .map(|t| ("typeIds", t.clone()))
            .collect();
        params.push(("name", name.to_string()));
        params.push(("nameMatchMode", name_match_mode(self.match_mode).to_string()));
        if let Some(limit) = req.limit {
            params.push(("limit", limit.to_string()));
        }
        params.push(("offset", req.offset.to_string()));

        let body = self
            .api
            .send_json(self.api.http().get(&url).query(&params))?;

        parse_page(&body)
    }
}

impl Provider for CollibraProvider {
    fn id(&self) -> &str {
        &self.id
    }

    /// Opens a session; the cookie it sets rides along on every search.
    fn authenticate(&mut self) -> Result<(), ClientError> {
        let url = self.api.url("/rest/2.0/auth/sessions");
        let request = self.api.http().post(&url).json(&serde_json::json!({
            "username": self.username,
            "password": self.password,
        }));

        self.api.send_checked(request).map_err(|e| match e {
            ClientError::Http {
                service,
                status,
                message,
            } => ClientError::Auth {
                service,
                status,
                message,
            },
            other => other,
        })?;

        tracing::info!(service = SERVICE, username = %self.username, "authenticated");
        Ok(())
    }

    fn search(&self, name: &str) -> Result<Vec<ExternalResource>, ClientError> {
        let query = format!("{}{}", self.match_prefix, name);
        let found = Pager::new(SERVICE, self.paging, |req| self.fetch_page(&query, req)).collect_all()?;
        tracing::debug!(service = SERVICE, name = %query, matches = found.len(), "search complete");
        Ok(found)
    }
}

fn parse_page(body: &serde_json::Value) -> Result<Page<ExternalResource>, ClientError> {
    let results = body["results"]
        .as_array()
        .ok_or_else(|| ClientError::parse(SERVICE, "response missing 'results' array"))?;

    let items = results
        .iter()
        .map(|r| {
            let id = id_string(&r["id"])
                .ok_or_else(|| ClientError::parse(SERVICE, "asset missing 'id'"))?;
            let name = r["name"]
                .as_str()
                .ok_or_else(|| ClientError::parse(SERVICE, format!("asset {} missing 'name'", id)))?
                .to_string();
            Ok(ExternalResource { id, name })
        })
        .collect::<Result<Vec<_>, ClientError>>()?;

    Ok(Page {
        returned: items.len(),
        items,
        total: body["total"].as_u64(),
    })
}
