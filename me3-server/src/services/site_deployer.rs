//!
//! Deploy flow: sanitize the subdomain, materialize the version's template,
//! assemble it and publish it to the content store.
//!

use std::{collections::BTreeMap, path::PathBuf};

use me3_common::{
    assemble,
    constants::{USER_AVATAR_MARKER, USER_LINKS_MARKER, USER_SUBDOMAIN_MARKER},
    read_template_dir, AssemblyError, LabelError, Materializer, PlaceholderMap, SubdomainLabel,
    TemplateError,
};
use me3_publisher::{Cid, ContentPublisher, PublishError};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::shared::HttpError;

/// What `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A validated deploy request.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    pub version: String,
    /// Raw subdomain as sent by the user.
    pub subdomain: String,
    pub links: Option<serde_json::Value>,
    pub avatar: Option<String>,
}

/// A published site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Fully qualified subdomain, e.g. `mysite.ethonline2021char.eth`.
    pub subdomain: String,
    pub cid: Cid,
}

#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error("Unsupported version")]
    UnsupportedVersion(String),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl From<DeployError> for HttpError {
    fn from(error: DeployError) -> Self {
        match error {
            DeployError::UnsupportedVersion(_) => HttpError::bad_request(error),
            DeployError::Label(e) => e.into(),
            DeployError::Template(e) => e.into(),
            DeployError::Assembly(e) => e.into(),
            DeployError::Publish(e) => e.into(),
        }
    }
}

/// Encode user links the way the site bundles decode them.
pub fn encode_links(links: &serde_json::Value) -> String {
    utf8_percent_encode(&links.to_string(), URI_COMPONENT).to_string()
}

#[derive(Debug, Clone)]
pub struct SiteDeployer {
    template_root: PathBuf,
    /// version -> template directory name
    templates: BTreeMap<String, String>,
    parent_domain: String,
    pattern: Regex,
    publisher: ContentPublisher,
}

impl SiteDeployer {
    pub fn new(
        template_root: PathBuf,
        templates: BTreeMap<String, String>,
        parent_domain: String,
        pattern: Regex,
        publisher: ContentPublisher,
    ) -> Self {
        Self {
            template_root,
            templates,
            parent_domain,
            pattern,
            publisher,
        }
    }

    /// Template directory of `version`, if the version is known.
    pub fn template_dir(&self, version: &str) -> Option<PathBuf> {
        self.templates
            .get(version)
            .map(|name| self.template_root.join(name))
    }

    /// Fully qualified subdomain for raw user input.
    pub fn qualified_subdomain(&self, raw: &str) -> Result<String, LabelError> {
        Ok(SubdomainLabel::sanitize(raw)?.qualify(&self.parent_domain))
    }

    fn placeholders(&self, subdomain: &str, request: &DeployRequest) -> PlaceholderMap {
        let mut placeholders = PlaceholderMap::new();
        placeholders
            .insert(USER_SUBDOMAIN_MARKER, subdomain.to_string())
            .insert(USER_LINKS_MARKER, request.links.as_ref().map(encode_links))
            .insert(USER_AVATAR_MARKER, request.avatar.clone());
        placeholders
    }

    pub async fn deploy(&self, request: &DeployRequest) -> Result<Deployment, DeployError> {
        let template_dir = self
            .template_dir(&request.version)
            .ok_or_else(|| DeployError::UnsupportedVersion(request.version.clone()))?;
        let subdomain = self.qualified_subdomain(&request.subdomain)?;
        tracing::info!(%subdomain, version = %request.version, "Deploying site");

        let files = read_template_dir(&template_dir).await?;
        let materializer = Materializer::new(self.placeholders(&subdomain, request))
            .with_pattern(self.pattern.clone());
        let site = assemble(materializer.materialize(files)).await?;
        tracing::debug!(
            %subdomain,
            files = site.len(),
            bytes = site.total_size(),
            "Site assembled"
        );

        let cid = self.publisher.publish(&site, &subdomain).await?;
        Ok(Deployment { subdomain, cid })
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use me3_publisher::{testing::InMemoryContentStore, RetrySettings, UploadError};
    use serde_json::json;

    use super::*;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn deployer(root: &Path, store: Arc<InMemoryContentStore>) -> SiteDeployer {
        let mut retries = RetrySettings::new();
        retries
            .initial_retry_delay(std::time::Duration::from_millis(1))
            .max_retry_delay(std::time::Duration::from_millis(2));
        SiteDeployer::new(
            root.to_path_buf(),
            [
                ("1.0".to_string(), "onchain".to_string()),
                ("2.0".to_string(), "allinone".to_string()),
            ]
            .into_iter()
            .collect(),
            "ethonline2021char.eth".to_string(),
            Regex::new(me3_common::constants::DEFAULT_DYNAMIC_FILE_PATTERN).unwrap(),
            ContentPublisher::new_with_settings(store, retries),
        )
    }

    fn request(version: &str, subdomain: &str) -> DeployRequest {
        DeployRequest {
            version: version.to_string(),
            subdomain: subdomain.to_string(),
            links: None,
            avatar: None,
        }
    }

    #[test]
    fn links_are_uri_component_encoded() {
        let links = json!([{ "name": "Twitter", "url": "https://x.com/a b" }]);
        assert_eq!(
            encode_links(&links),
            "%5B%7B%22name%22%3A%22Twitter%22%2C%22url%22%3A%22https%3A%2F%2Fx.com%2Fa%20b%22%7D%5D"
        );
        assert_eq!(encode_links(&json!("it's (ok)!")), "%22it's%20(ok)!%22");
    }

    #[test]
    fn links_keep_key_order() {
        let links: serde_json::Value =
            serde_json::from_str(r#"{"twitter":"t","github":"g","discord":"d"}"#).unwrap();
        assert_eq!(
            encode_links(&links),
            "%7B%22twitter%22%3A%22t%22%2C%22github%22%3A%22g%22%2C%22discord%22%3A%22d%22%7D"
        );
    }

    #[tokio::test]
    async fn deploys_v1_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "onchain/index.html", "<title>{{USER_SUBDOMAIN}}</title>");
        write(
            dir.path(),
            "onchain/static/js/bundle.abc123.1.js",
            "const name = \"{{USER_SUBDOMAIN}}\"; const links = \"{{USER_LINKS}}\";",
        );
        let store = Arc::new(InMemoryContentStore::new());

        let deployment = deployer(dir.path(), store.clone())
            .deploy(&request("1.0", "My.Site"))
            .await
            .unwrap();

        assert_eq!(deployment.subdomain, "mysite.ethonline2021char.eth");
        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].cid, deployment.cid);
        assert_eq!(uploads[0].options.name, "mysite.ethonline2021char.eth");
        assert_eq!(
            uploads[0].names,
            vec!["index.html", "static/js/bundle.abc123.1.js"]
        );
        // Only the bundle is touched, and only markers with a value.
        assert_eq!(
            uploads[0].file("index.html").unwrap(),
            b"<title>{{USER_SUBDOMAIN}}</title>"
        );
        assert_eq!(
            uploads[0].file("static/js/bundle.abc123.1.js").unwrap(),
            b"const name = \"mysite.ethonline2021char.eth\"; const links = \"{{USER_LINKS}}\";"
        );
    }

    #[tokio::test]
    async fn deploys_v2_template_with_links_and_avatar() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "allinone/bundle.f00.2.js",
            "{{USER_SUBDOMAIN}}|{{USER_LINKS}}|{{USER_AVATAR}}",
        );
        let store = Arc::new(InMemoryContentStore::new());
        let mut request = request("2.0", "alice");
        request.links = Some(json!({ "a": 1 }));
        request.avatar = Some("ipfs://avatar".to_string());

        deployer(dir.path(), store.clone())
            .deploy(&request)
            .await
            .unwrap();

        assert_eq!(
            store.uploads()[0].file("bundle.f00.2.js").unwrap(),
            b"alice.ethonline2021char.eth|%7B%22a%22%3A1%7D|ipfs://avatar"
        );
    }

    #[tokio::test]
    async fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryContentStore::new());

        let err = deployer(dir.path(), store.clone())
            .deploy(&request("3.0", "alice"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::UnsupportedVersion(ref v) if v == "3.0"));
        assert_eq!(HttpError::from(err).message(), "Unsupported version");
        assert_eq!(store.attempts(), 0);
    }

    #[tokio::test]
    async fn invalid_label_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryContentStore::new());

        let err = deployer(dir.path(), store)
            .deploy(&request("1.0", "..."))
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Label(_)));
    }

    #[tokio::test]
    async fn missing_template_dir_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryContentStore::new());

        let err = deployer(dir.path(), store.clone())
            .deploy(&request("1.0", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Template(_)));
        assert_eq!(store.attempts(), 0);
    }

    #[tokio::test]
    async fn publish_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "onchain/index.html", "<html/>");
        let store = Arc::new(InMemoryContentStore::new());
        store.fail_next(UploadError::Status {
            status: 401,
            body: "bad token".to_string(),
        });

        let err = deployer(dir.path(), store)
            .deploy(&request("1.0", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Publish(_)));
    }
}
