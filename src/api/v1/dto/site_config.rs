use serde::Serialize;

use crate::state::SiteInfo;

/// Public client configuration. Never carries secrets.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigResponse {
    pub client_id: String,
    pub user_principal_name: String,
    pub base_directory: String,
    pub user_list: Vec<String>,
}

impl From<&SiteInfo> for SiteConfigResponse {
    fn from(site: &SiteInfo) -> Self {
        Self {
            client_id: site.client_id.clone(),
            user_principal_name: site.user_principal_name.clone(),
            base_directory: site.base_directory.clone(),
            user_list: site.user_list.clone(),
        }
    }
}
