use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BflError;

/// Default output width applied by the service.
pub const DEFAULT_WIDTH: u32 = 1024;
/// Default output height applied by the service.
pub const DEFAULT_HEIGHT: u32 = 768;
/// Default moderation tolerance (0 = strictest, 6 = most permissive).
pub const DEFAULT_SAFETY_TOLERANCE: u8 = 2;

/// A FLUX model exposed at `/v1/{model}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// FLUX 1.1 \[pro\].
    #[serde(rename = "flux-pro-1.1")]
    FluxProPlus,
    /// FLUX.1 \[pro\].
    #[serde(rename = "flux-pro")]
    FluxPro,
    /// FLUX.1 \[dev\].
    #[serde(rename = "flux-dev")]
    FluxDev,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::FluxProPlus, Model::FluxPro, Model::FluxDev];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::FluxProPlus => "flux-pro-1.1",
            Model::FluxPro => "flux-pro",
            Model::FluxDev => "flux-dev",
        }
    }

    /// Submission endpoint path, relative to the base URL.
    pub fn path(self) -> String {
        format!("/v1/{}", self.as_str())
    }

    /// Sampling steps the service uses when none are sent.
    /// `None` for FLUX 1.1 \[pro\], which takes no step count.
    pub fn default_steps(self) -> Option<u32> {
        match self {
            Model::FluxProPlus => None,
            Model::FluxPro => Some(40),
            Model::FluxDev => Some(28),
        }
    }

    /// Guidance scale the service uses when none is sent.
    pub fn default_guidance(self) -> Option<f64> {
        match self {
            Model::FluxProPlus => None,
            Model::FluxPro => Some(2.5),
            Model::FluxDev => Some(3.0),
        }
    }

    /// Guidance interval the service uses when none is sent.
    pub fn default_interval(self) -> Option<f64> {
        match self {
            Model::FluxProPlus => None,
            Model::FluxPro | Model::FluxDev => Some(2.0),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = BflError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| BflError::Configuration(format!("unknown model '{}'", s)))
    }
}

/// Ties an input shape to the model that accepts it.
pub trait ModelInputs: Serialize {
    const MODEL: Model;
}

/// Inputs for FLUX 1.1 \[pro\].
///
/// Unset fields are left out of the request body and the service applies its
/// defaults. Width and height must be multiples of 32; that is checked by
/// the service, not here.
///
/// # Example
/// ```
/// use bfl_rs::FluxProPlusInputs;
///
/// let inputs = FluxProPlusInputs::new("a lighthouse at dusk")
///     .size(1024, 1024)
///     .seed(42);
///
/// let body = serde_json::to_value(&inputs).unwrap();
/// assert_eq!(body["width"], 1024);
/// assert!(body.get("safety_tolerance").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxProPlusInputs {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_upsampling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_tolerance: Option<u8>,
}

impl FluxProPlusInputs {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set output dimensions.
    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    /// Let the service expand the prompt before generating.
    pub fn prompt_upsampling(mut self, enabled: bool) -> Self {
        self.prompt_upsampling = Some(enabled);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn safety_tolerance(mut self, tolerance: u8) -> Self {
        self.safety_tolerance = Some(tolerance);
        self
    }
}

impl ModelInputs for FluxProPlusInputs {
    const MODEL: Model = Model::FluxProPlus;
}

/// Inputs for FLUX.1 \[pro\]: the 1.1 fields plus sampling controls.
///
/// Service defaults: 40 steps, guidance 2.5, interval 2.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxProInputs {
    #[serde(flatten)]
    pub base: FluxProPlusInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

impl FluxProInputs {
    pub fn new(prompt: impl Into<String>) -> Self {
        FluxProPlusInputs::new(prompt).into()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.base = self.base.size(width, height);
        self
    }

    pub fn prompt_upsampling(mut self, enabled: bool) -> Self {
        self.base = self.base.prompt_upsampling(enabled);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.base = self.base.seed(seed);
        self
    }

    pub fn safety_tolerance(mut self, tolerance: u8) -> Self {
        self.base = self.base.safety_tolerance(tolerance);
        self
    }

    /// Set the number of sampling steps.
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Set the guidance scale.
    pub fn guidance(mut self, guidance: f64) -> Self {
        self.guidance = Some(guidance);
        self
    }

    /// Set the guidance interval.
    pub fn interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl From<FluxProPlusInputs> for FluxProInputs {
    fn from(base: FluxProPlusInputs) -> Self {
        Self {
            base,
            steps: None,
            guidance: None,
            interval: None,
        }
    }
}

impl ModelInputs for FluxProInputs {
    const MODEL: Model = Model::FluxPro;
}

/// Inputs for FLUX.1 \[dev\]. Same fields as \[pro\]; the service defaults
/// differ (28 steps, guidance 3.0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxDevInputs {
    #[serde(flatten)]
    pub inner: FluxProInputs,
}

impl FluxDevInputs {
    pub fn new(prompt: impl Into<String>) -> Self {
        FluxProInputs::new(prompt).into()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.inner = self.inner.size(width, height);
        self
    }

    pub fn prompt_upsampling(mut self, enabled: bool) -> Self {
        self.inner = self.inner.prompt_upsampling(enabled);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.inner = self.inner.seed(seed);
        self
    }

    pub fn safety_tolerance(mut self, tolerance: u8) -> Self {
        self.inner = self.inner.safety_tolerance(tolerance);
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.inner = self.inner.steps(steps);
        self
    }

    pub fn guidance(mut self, guidance: f64) -> Self {
        self.inner = self.inner.guidance(guidance);
        self
    }

    pub fn interval(mut self, interval: f64) -> Self {
        self.inner = self.inner.interval(interval);
        self
    }
}

impl From<FluxProInputs> for FluxDevInputs {
    fn from(inner: FluxProInputs) -> Self {
        Self { inner }
    }
}

impl ModelInputs for FluxDevInputs {
    const MODEL: Model = Model::FluxDev;
}
