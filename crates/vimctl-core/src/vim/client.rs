//! HTTP client for the VI/JSON binding
//!
//! Every managed object method maps to `POST {base}/{type}/{id}/{Method}` and
//! every property read to `GET {base}/{type}/{id}/{property}`, where `base`
//! is `https://<server>/sdk/vim25/<release>/`. After login the session token
//! travels in the `vmware-api-session-id` header.

use async_trait::async_trait;
use reqwest::{Certificate, Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use url::Url;

use super::error::{Result, VimError};
use super::types::{
    AddHostRequest, ClusterConfigSpecEx, ManagedObjectReference, ServiceContent, TaskInfo,
};
use super::VimApi;

/// API release used when none is configured
pub const DEFAULT_RELEASE: &str = "8.0.1.0";

const SESSION_HEADER: &str = "vmware-api-session-id";

/// Builder for [`VimClient`]
#[derive(Debug, Clone)]
pub struct VimClientBuilder {
    url: String,
    release: String,
    insecure: bool,
    ca_cert_pem: Option<Vec<u8>>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl VimClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            release: DEFAULT_RELEASE.to_string(),
            insecure: false,
            ca_cert_pem: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// API release segment of the endpoint path, e.g. `8.0.1.0`
    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    /// Accept self-signed or otherwise unverifiable server certificates
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Trust an extra CA given as PEM
    pub fn ca_cert_pem(mut self, pem: Vec<u8>) -> Self {
        self.ca_cert_pem = Some(pem);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the HTTP client and fetch the service content
    pub async fn connect(self) -> Result<VimClient> {
        let base = endpoint_base(&self.url, &self.release)?;

        let mut builder = Client::builder().danger_accept_invalid_certs(self.insecure);
        if let Some(pem) = &self.ca_cert_pem {
            builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!("Fetching service content from {}", base);
        let resp = http
            .get(base.join("ServiceInstance/ServiceInstance/content").map_err(|e| {
                VimError::InvalidUrl {
                    url: base.to_string(),
                    message: e.to_string(),
                }
            })?)
            .send()
            .await?;
        let content: ServiceContent = decode(resp).await?;

        if let Some(about) = &content.about {
            info!(
                "Connected to {} (API {})",
                about.full_name.as_deref().unwrap_or("unknown server"),
                about.api_version.as_deref().unwrap_or("unknown")
            );
        }

        Ok(VimClient {
            http,
            base,
            content,
            session: None,
        })
    }
}

/// Authenticated connection to a vCenter or ESXi endpoint
#[derive(Debug, Clone)]
pub struct VimClient {
    http: Client,
    base: Url,
    content: ServiceContent,
    session: Option<String>,
}

impl VimClient {
    pub fn builder(url: impl Into<String>) -> VimClientBuilder {
        VimClientBuilder::new(url)
    }

    pub fn service_content(&self) -> &ServiceContent {
        &self.content
    }

    /// Port of the endpoint this client talks to
    pub fn port(&self) -> u16 {
        self.base.port_or_known_default().unwrap_or(443)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session with `SessionManager.Login`
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let path = format!(
            "{}/{}/Login",
            self.content.session_manager.kind, self.content.session_manager.value
        );
        debug!("Logging in as {}", username);

        let resp = self
            .http
            .post(self.endpoint(&path)?)
            .json(&json!({ "userName": username, "password": password }))
            .send()
            .await?;
        let resp = check(resp).await?;

        let token = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(VimError::MissingSessionToken)?;
        self.session = Some(token);
        info!("Session established for {}", username);
        Ok(())
    }

    /// Close the session; a client without a session is left untouched
    pub async fn logout(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }
        let path = format!(
            "{}/{}/Logout",
            self.content.session_manager.kind, self.content.session_manager.value
        );
        let result = self.post_unit(&path, None::<&()>).await;
        self.session = None;
        debug!("Session closed");
        result
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| VimError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            message: e.to_string(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.session.as_deref().ok_or(VimError::NotLoggedIn)?;
        Ok(request.header(SESSION_HEADER, token))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        trace!("GET {}", path);
        let request = self.authorize(self.http.get(self.endpoint(path)?))?;
        decode(request.send().await?).await
    }

    async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        trace!("POST {}", path);
        let mut request = self.authorize(self.http.post(self.endpoint(path)?))?;
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }

    async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        trace!("POST {}", path);
        let mut request = self.authorize(self.http.post(self.endpoint(path)?))?;
        if let Some(body) = body {
            request = request.json(body);
        }
        check(request.send().await?).await?;
        Ok(())
    }

    async fn collect_names(
        &self,
        view: &ManagedObjectReference,
    ) -> Result<HashMap<String, ManagedObjectReference>> {
        let members: Vec<ManagedObjectReference> = self
            .get(&format!("{}/{}/view", view.kind, view.value))
            .await?;

        let mut by_name = HashMap::with_capacity(members.len());
        for member in members {
            let name: String = self
                .get(&format!("{}/{}/name", member.kind, member.value))
                .await?;
            if let Some(previous) = by_name.insert(name.clone(), member) {
                debug!("Name '{}' is shared with {}; keeping the later entity", name, previous);
            }
        }
        Ok(by_name)
    }
}

#[async_trait]
impl VimApi for VimClient {
    fn root_folder(&self) -> ManagedObjectReference {
        self.content.root_folder.clone()
    }

    async fn in_folder_by_type(
        &self,
        root: &ManagedObjectReference,
        type_name: &str,
    ) -> Result<HashMap<String, ManagedObjectReference>> {
        let view_manager = &self.content.view_manager;
        let view: ManagedObjectReference = self
            .post(
                &format!(
                    "{}/{}/CreateContainerView",
                    view_manager.kind, view_manager.value
                ),
                Some(&json!({
                    "container": root,
                    "type": [type_name],
                    "recursive": true,
                })),
            )
            .await?;

        let result = self.collect_names(&view).await;

        if let Err(e) = self
            .post_unit(&format!("{}/{}/DestroyView", view.kind, view.value), None::<&()>)
            .await
        {
            warn!("Failed to destroy container view {}: {}", view, e);
        }

        let found = result?;
        debug!("Found {} {} entities under {}", found.len(), type_name, root);
        Ok(found)
    }

    async fn create_folder(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
    ) -> Result<ManagedObjectReference> {
        self.post(
            &format!("{}/{}/CreateFolder", parent.kind, parent.value),
            Some(&json!({ "name": name })),
        )
        .await
    }

    async fn create_datacenter(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
    ) -> Result<ManagedObjectReference> {
        self.post(
            &format!("{}/{}/CreateDatacenter", parent.kind, parent.value),
            Some(&json!({ "name": name })),
        )
        .await
    }

    async fn create_cluster(
        &self,
        parent: &ManagedObjectReference,
        name: &str,
        spec: &ClusterConfigSpecEx,
    ) -> Result<ManagedObjectReference> {
        self.post(
            &format!("{}/{}/CreateClusterEx", parent.kind, parent.value),
            Some(&json!({ "name": name, "spec": spec })),
        )
        .await
    }

    async fn add_standalone_host_task(
        &self,
        parent: &ManagedObjectReference,
        request: &AddHostRequest,
    ) -> Result<ManagedObjectReference> {
        self.post(
            &format!("{}/{}/AddStandaloneHost_Task", parent.kind, parent.value),
            Some(request),
        )
        .await
    }

    async fn task_info(&self, task: &ManagedObjectReference) -> Result<TaskInfo> {
        self.get(&format!("{}/{}/info", task.kind, task.value))
            .await
    }
}

/// Turn a user-supplied server URL into the VI/JSON base for `release`
///
/// Accepts a bare host URL as well as the SOAP-style `https://host/sdk`.
fn endpoint_base(url: &str, release: &str) -> Result<Url> {
    let mut base = Url::parse(url).map_err(|e| VimError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if base.cannot_be_a_base() || base.host_str().is_none() {
        return Err(VimError::InvalidUrl {
            url: url.to_string(),
            message: "URL must include a host".to_string(),
        });
    }
    base.set_path(&format!("/sdk/vim25/{}/", release));
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    debug!("Request failed with HTTP {}: {}", status.as_u16(), body);
    Err(VimError::from_response(status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let resp = check(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| VimError::Decode(e.to_string()))
}
