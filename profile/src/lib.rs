//! Per-request client fingerprint generation.
//!
//! Draws a fresh, randomized `Profile` for every call. The factory is pure
//! apart from its PRNG: no network I/O, no shared mutable state beyond the
//! RNG itself, which is guarded by a single lock so the factory can be
//! shared across workers.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scour_core::security::UrlValidator;
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::ProfileError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:91.0) Gecko/20100101 Firefox/91.0";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const VIEWPORTS: &[(u32, u32)] = &[
    (1920, 1080),
    (1366, 768),
    (1440, 900),
    (1536, 864),
    (1600, 900),
];

const WEBGL_VENDORS: &[&str] = &["NVIDIA Corporation", "AMD", "Intel Inc.", "Apple Inc."];
const WEBGL_RENDERERS: &[&str] = &[
    "GeForce GTX 1060",
    "Radeon RX 580",
    "Intel UHD Graphics 630",
    "Apple M1",
];

const TIMEZONES: &[&str] = &[
    "America/New_York",
    "Europe/London",
    "Asia/Tokyo",
    "America/Los_Angeles",
    "Europe/Berlin",
];

const PLATFORMS: &[&str] = &["Win32", "MacIntel", "Linux x86_64"];

const FONT_LIST: &[&str] = &["Arial", "Helvetica", "Times New Roman", "Courier New", "Verdana"];

const FIXED_LANGUAGE: &str = "en-US,en;q=0.9";

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// WebGL vendor/renderer pair reported by the spoofed fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebGlInfo {
    pub vendor: String,
    pub renderer: String,
}

/// Canvas fingerprint noise applied to this request's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasNoise {
    pub amount: f64,
    pub nonce: String,
}

/// A complete, ephemeral per-request fingerprint. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_agent: String,
    pub viewport: Viewport,
    pub canvas_noise: CanvasNoise,
    pub webgl: WebGlInfo,
    pub font_list: Vec<String>,
    pub timezone: String,
    pub language: String,
    pub platform: String,
}

impl Profile {
    /// The minimal profile returned when fingerprinting is disabled.
    fn minimal(default_user_agent: &str) -> Self {
        Self {
            user_agent: default_user_agent.to_string(),
            viewport: Viewport { width: 1920, height: 1080 },
            canvas_noise: CanvasNoise { amount: 0.0, nonce: String::new() },
            webgl: WebGlInfo {
                vendor: WEBGL_VENDORS[0].to_string(),
                renderer: WEBGL_RENDERERS[0].to_string(),
            },
            font_list: Vec::new(),
            timezone: "UTC".to_string(),
            language: FIXED_LANGUAGE.to_string(),
            platform: PLATFORMS[0].to_string(),
        }
    }
}

/// Produces a fresh `Profile` per call. Shareable across workers; internal
/// state is just the RNG, guarded by a lock.
pub struct ProfileFactory {
    enabled: bool,
    default_user_agent: String,
    validator: UrlValidator,
    rng: Mutex<StdRng>,
}

impl ProfileFactory {
    /// `seed = Some(n)` gives reproducible output for tests; `None` seeds
    /// from OS entropy.
    pub fn new(enabled: bool, default_user_agent: impl Into<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            enabled,
            default_user_agent: default_user_agent.into(),
            validator: UrlValidator::default(),
            rng: Mutex::new(rng),
        }
    }

    pub fn default_disabled() -> Self {
        Self::new(false, DEFAULT_USER_AGENT, None)
    }

    /// Generate a profile for an upcoming request to `target_url`. The URL
    /// is run through the same SSRF guard task ingestion uses
    /// (`scour_core::security::UrlValidator`) before anything is drawn —
    /// this is the only way the call fails; a valid URL never affects the
    /// draw itself.
    pub fn generate_profile(&self, target_url: &str) -> Result<Profile, ProfileError> {
        self.validator.validate_url(target_url)?;

        if !self.enabled {
            return Ok(Profile::minimal(&self.default_user_agent));
        }

        let mut rng = self.rng.lock();

        let user_agent = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())].to_string();
        let (width, height) = VIEWPORTS[rng.gen_range(0..VIEWPORTS.len())];
        let canvas_noise = CanvasNoise {
            amount: rng.gen_range(0.0..0.1),
            nonce: format!("{:08x}", rng.gen::<u32>()),
        };
        let webgl = WebGlInfo {
            vendor: WEBGL_VENDORS[rng.gen_range(0..WEBGL_VENDORS.len())].to_string(),
            renderer: WEBGL_RENDERERS[rng.gen_range(0..WEBGL_RENDERERS.len())].to_string(),
        };
        let timezone = TIMEZONES[rng.gen_range(0..TIMEZONES.len())].to_string();
        let platform = platform_for_user_agent(&user_agent);

        Ok(Profile {
            user_agent,
            viewport: Viewport { width, height },
            canvas_noise,
            webgl,
            font_list: FONT_LIST.iter().map(|s| s.to_string()).collect(),
            timezone,
            language: FIXED_LANGUAGE.to_string(),
            platform,
        })
    }
}

fn platform_for_user_agent(user_agent: &str) -> String {
    if user_agent.contains("Windows") {
        PLATFORMS[0].to_string()
    } else if user_agent.contains("Macintosh") {
        PLATFORMS[1].to_string()
    } else {
        PLATFORMS[2].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_factory_returns_minimal_profile() {
        let factory = ProfileFactory::new(false, "custom-agent/1.0", None);
        let p = factory.generate_profile("https://example.com").unwrap();
        assert_eq!(p.user_agent, "custom-agent/1.0");
        assert_eq!(p.canvas_noise.amount, 0.0);
    }

    #[test]
    fn enabled_factory_draws_from_curated_lists() {
        let factory = ProfileFactory::new(true, DEFAULT_USER_AGENT, Some(42));
        let p = factory.generate_profile("https://example.com").unwrap();
        assert!(USER_AGENTS.contains(&p.user_agent.as_str()));
        assert!(p.canvas_noise.amount >= 0.0 && p.canvas_noise.amount < 0.1);
        assert!(WEBGL_VENDORS.contains(&p.webgl.vendor.as_str()));
        assert!(TIMEZONES.contains(&p.timezone.as_str()));
        assert_eq!(p.language, FIXED_LANGUAGE);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = ProfileFactory::new(true, DEFAULT_USER_AGENT, Some(7));
        let b = ProfileFactory::new(true, DEFAULT_USER_AGENT, Some(7));
        let pa = a.generate_profile("https://example.com").unwrap();
        let pb = b.generate_profile("https://example.com").unwrap();
        assert_eq!(pa.user_agent, pb.user_agent);
        assert_eq!(pa.canvas_noise.nonce, pb.canvas_noise.nonce);
        assert_eq!(pa.timezone, pb.timezone);
    }

    #[test]
    fn platform_matches_user_agent_family() {
        assert_eq!(platform_for_user_agent("... Windows NT 10.0 ..."), "Win32");
        assert_eq!(platform_for_user_agent("... Macintosh ..."), "MacIntel");
        assert_eq!(platform_for_user_agent("... X11; Linux x86_64 ..."), "Linux x86_64");
    }

    #[test]
    fn rejects_unsafe_target_instead_of_drawing_a_profile() {
        let factory = ProfileFactory::new(true, DEFAULT_USER_AGENT, Some(1));
        let err = factory.generate_profile("http://169.254.169.254/latest/meta-data/");
        assert!(matches!(err, Err(ProfileError::UnsafeTarget(_))));
    }
}
