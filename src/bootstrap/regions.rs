//! Lists the Cloud Run regions available to a project.

use crate::auth::credentials::CredentialProvider;
use crate::core::error::{BridgeError, BridgeResult};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListLocationsResponse {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    next_page_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    #[serde(default)]
    location_id: String,
}

/// Fetch the ordered list of region ids for a project, following pagination
pub async fn list_regions(
    client: &reqwest::Client,
    credentials: &dyn CredentialProvider,
    endpoint: &str,
    project: &str,
) -> BridgeResult<Vec<String>> {
    let token = credentials.access_token().await?;
    let url = format!("{endpoint}/v1/projects/{project}/locations");

    let mut regions = Vec::new();
    let mut page_token = String::new();
    loop {
        let mut request = client.get(&url).bearer_auth(&token);
        if !page_token.is_empty() {
            request = request.query(&[("pageToken", page_token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::bootstrap(format!("failed to list regions: {e}")))?;
        if !response.status().is_success() {
            return Err(BridgeError::bootstrap(format!(
                "listing regions returned {}",
                response.status()
            )));
        }

        let page: ListLocationsResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::bootstrap(format!("invalid locations response: {e}")))?;
        regions.extend(page.locations.into_iter().map(|l| l.location_id));

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = page.next_page_token;
    }
    Ok(regions)
}
