//! Portal session: one cookie-bearing HTTP client per run.

use yqfk_core::error::{Result, YqfkError};

/// SSO landing page. The login form posts back to the same URL.
pub const SSO_URL: &str =
    "https://cas.dgut.edu.cn/home/Oauth/getToken/appid/illnessProtectionHome/state/home.html";

/// Base of the report API. `getBaseInfo` and `addBaseInfo` hang off it.
pub const REPORT_BASE_URL: &str = "https://yqfk.dgut.edu.cn/home/base_info/";

/// Portal endpoints. Fixed in production, overridden by tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub sso_url: String,
    pub report_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sso_url: SSO_URL.into(),
            report_base_url: REPORT_BASE_URL.into(),
        }
    }
}

impl Endpoints {
    pub fn report_info_url(&self) -> String {
        format!("{}getBaseInfo", self.report_base_url)
    }

    pub fn report_submit_url(&self) -> String {
        format!("{}addBaseInfo", self.report_base_url)
    }
}

/// HTTP client with a cookie store, scoped to a single run.
///
/// No request timeout is set; calls rely on transport defaults.
pub struct PortalSession {
    pub(crate) client: reqwest::Client,
    pub(crate) endpoints: Endpoints,
}

impl PortalSession {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("yqfk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| YqfkError::PageFetch(format!("Client error: {e}")))?;
        Ok(Self { client, endpoints })
    }
}
