use std::path::Path;

use figment::Figment;
#[cfg(feature = "config_env")]
use figment::providers::Env;
#[cfg(feature = "config_json")]
use figment::providers::Json;
#[cfg(feature = "config_yaml")]
use figment::providers::Yaml;
use figment::providers::{Data, Format};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as, skip_serializing_none};
use strum::{AsRefStr, Display, EnumString};

use super::{ConfigParsingError, ConfigValidationError};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoCustomConfig;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppCustomConfigSerdeDTO<Custom> {
    #[serde(default)]
    pub(super) app: Custom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig<Custom> {
    pub core: CoreConfig,
    #[serde(default)]
    pub app: Custom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    #[serde(default)]
    pub issuance: IssuanceConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
}

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Display,
    EnumString,
    AsRefStr,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
pub enum DidKeyMode {
    /// Multicodec `p256-pub` over the compressed point
    #[default]
    #[serde(rename = "STANDARD")]
    #[strum(serialize = "STANDARD")]
    Standard,
    /// Multicodec `jwk_jcs-pub` over the JCS canonicalized public JWK
    #[serde(rename = "JWK_JCS_PUB")]
    #[strum(serialize = "JWK_JCS_PUB")]
    JwkJcsPub,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssuanceConfig {
    pub redirect_uri: String,
    pub client_id: Option<String>,
    pub did_key_mode: DidKeyMode,
    pub legacy_deferred_polling: bool,
    #[serde_as(as = "DurationSeconds<i64>")]
    pub deferred_polling_interval: time::Duration,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            redirect_uri: "openid://redirect".to_string(),
            client_id: None,
            did_key_mode: DidKeyMode::Standard,
            legacy_deferred_polling: false,
            deferred_polling_interval: time::Duration::seconds(10),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresentationConfig {
    #[serde_as(as = "DurationSeconds<i64>")]
    pub vp_token_ttl: time::Duration,
    #[serde_as(as = "DurationSeconds<i64>")]
    pub leeway: time::Duration,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            vp_token_ttl: time::Duration::seconds(600),
            leeway: time::Duration::ZERO,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        url::Url::parse(&self.issuance.redirect_uri).map_err(|e| {
            ConfigValidationError::InvalidValue {
                key: "issuance.redirectUri".to_string(),
                reason: e.to_string(),
            }
        })?;

        if self.issuance.deferred_polling_interval.is_negative() {
            return Err(ConfigValidationError::InvalidValue {
                key: "issuance.deferredPollingInterval".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        if !self.presentation.vp_token_ttl.is_positive() {
            return Err(ConfigValidationError::InvalidValue {
                key: "presentation.vpTokenTtl".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

pub enum InputFormat {
    #[cfg(feature = "config_yaml")]
    Yaml(Data<Yaml>),
    #[cfg(feature = "config_json")]
    Json(Data<Json>),
}

impl InputFormat {
    #[cfg(feature = "config_yaml")]
    pub fn yaml_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Yaml(Yaml::file(p))
    }

    #[cfg(feature = "config_yaml")]
    pub fn yaml_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Yaml(Yaml::string(s.as_ref()))
    }

    #[cfg(feature = "config_json")]
    pub fn json_file(p: impl AsRef<Path>) -> InputFormat {
        InputFormat::Json(Json::file(p))
    }

    #[cfg(feature = "config_json")]
    pub fn json_str(s: impl AsRef<str>) -> InputFormat {
        InputFormat::Json(Json::string(s.as_ref()))
    }
}

impl<Custom> AppConfig<Custom>
where
    Custom: Serialize + DeserializeOwned + Default,
{
    pub fn from_files(files: &[impl AsRef<Path>]) -> Result<Self, ConfigParsingError> {
        let mut inputs: Vec<InputFormat> = Vec::with_capacity(files.len());

        for path in files {
            #[cfg(feature = "config_yaml")]
            if path
                .as_ref()
                .extension()
                .is_some_and(|ext| ext == "yml" || ext == "yaml")
            {
                inputs.push(InputFormat::Yaml(Yaml::file(path)));
                continue;
            }

            #[cfg(feature = "config_json")]
            if path.as_ref().extension() == Some("json".as_ref()) {
                inputs.push(InputFormat::Json(Json::file(path)));
                continue;
            }

            return Err(ConfigParsingError::GeneralParsingError(format!(
                "Unsupported file or missing file extension: {:?}",
                path.as_ref().to_str()
            )));
        }

        AppConfig::parse(inputs)
    }

    #[cfg(feature = "config_yaml")]
    pub fn from_yaml(
        configs: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ConfigParsingError> {
        let inputs = configs
            .into_iter()
            .map(|s| Yaml::string(s.as_ref()))
            .map(InputFormat::Yaml);

        AppConfig::parse(inputs)
    }

    pub fn parse(
        inputs: impl IntoIterator<Item = InputFormat>,
    ) -> Result<Self, ConfigParsingError> {
        let mut figment = Figment::new();

        for data in inputs {
            figment = match data {
                #[cfg(feature = "config_yaml")]
                InputFormat::Yaml(content) => figment.merge(content),
                #[cfg(feature = "config_json")]
                InputFormat::Json(content) => figment.merge(content),
            };
        }

        #[cfg(feature = "config_env")]
        {
            figment = figment.merge(Env::prefixed("WALLET_").split("__").lowercase(false));
        }

        let core = if figment.contains("core") {
            figment
                .extract_inner::<CoreConfig>("core")
                .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?
        } else {
            CoreConfig::default()
        };
        core.validate()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;

        let custom = figment
            .extract::<AppCustomConfigSerdeDTO<Custom>>()
            .map_err(|e| ConfigParsingError::GeneralParsingError(e.to_string()))?;
        Ok(Self {
            core,
            app: custom.app,
        })
    }
}
