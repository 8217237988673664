//! Transcode policy evaluation: ceilings and quality ladders.
//!
//! The server never generates more than the source holds and never more than
//! the administrator allows. [`compute_ceiling`] folds both limits into one
//! [`Ceiling`]; [`quality_ladder`] turns a ceiling into the descending list of
//! named tiers that adaptive and fixed-quality endpoints are built from.
//!
//! Size limits are orientation-agnostic: a 1280x720 cap also admits a
//! 720x1280 portrait video, since tiers are named after the short side.

use scenestream_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::{MediaFile, Resolution};

// ---------------------------------------------------------------------------
// QualityTier
// ---------------------------------------------------------------------------

/// Named output quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityTier {
    /// Source dimensions, used only when the source is below every named tier.
    Original,
    Low,
    Standard,
    StandardHd,
    FullHd,
    FourK,
}

impl QualityTier {
    /// Named tiers, highest first.
    pub const LADDER: [QualityTier; 5] = [
        QualityTier::FourK,
        QualityTier::FullHd,
        QualityTier::StandardHd,
        QualityTier::Standard,
        QualityTier::Low,
    ];

    /// Tier substituted for files whose dimensions were never probed.
    pub const FALLBACK: QualityTier = QualityTier::Standard;

    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Low => "240p",
            Self::Standard => "480p",
            Self::StandardHd => "720p",
            Self::FullHd => "1080p",
            Self::FourK => "2160p",
        }
    }

    /// Nominal landscape box; `None` for [`QualityTier::Original`].
    pub fn nominal_resolution(&self) -> Option<Resolution> {
        match self {
            Self::Original => None,
            Self::Low => Some(Resolution::new(426, 240)),
            Self::Standard => Some(Resolution::new(854, 480)),
            Self::StandardHd => Some(Resolution::new(1280, 720)),
            Self::FullHd => Some(Resolution::new(1920, 1080)),
            Self::FourK => Some(Resolution::new(3840, 2160)),
        }
    }

    /// Nominal video bitrate in bits per second.
    pub fn nominal_bitrate(&self) -> u64 {
        match self {
            Self::Original | Self::Low => 800_000,
            Self::Standard => 2_500_000,
            Self::StandardHd => 5_000_000,
            Self::FullHd => 8_000_000,
            Self::FourK => 20_000_000,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityTier {
    type Err = Error;

    /// Accepts `1080p`, `1080`, and the GraphQL-style `FULL_HD` spellings.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "240p" | "240" | "low" => Ok(Self::Low),
            "480p" | "480" | "standard" => Ok(Self::Standard),
            "720p" | "720" | "standard_hd" => Ok(Self::StandardHd),
            "1080p" | "1080" | "full_hd" => Ok(Self::FullHd),
            "2160p" | "2160" | "4k" | "four_k" => Ok(Self::FourK),
            other => Err(Error::invalid_input(format!("unknown quality tier: {other:?}"))),
        }
    }
}

impl Serialize for QualityTier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for QualityTier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TranscodePolicy
// ---------------------------------------------------------------------------

/// Server-side limits on generated streams. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodePolicy {
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
    /// Bits per second.
    #[serde(default)]
    pub max_bitrate: Option<u64>,
    #[serde(default)]
    pub max_tier: Option<QualityTier>,
}

impl TranscodePolicy {
    /// Policy that honors whatever quality the source offers.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Policy capped at a named tier.
    pub fn capped_at(tier: QualityTier) -> Self {
        Self {
            max_tier: Some(tier),
            ..Self::default()
        }
    }

    /// Reject limits that cannot describe any playable output.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == Some(0) {
            return Err(Error::configuration("max_width must be positive"));
        }
        if self.max_height == Some(0) {
            return Err(Error::configuration("max_height must be positive"));
        }
        if self.max_bitrate == Some(0) {
            return Err(Error::configuration("max_bitrate must be positive"));
        }
        Ok(())
    }

    pub fn is_unlimited(&self) -> bool {
        self.size_box() == (None, None) && self.max_bitrate.is_none()
    }

    /// Effective (long, short) size limits.
    fn size_box(&self) -> (Option<u32>, Option<u32>) {
        let (mut long, mut short) = (self.max_width, self.max_height);
        if let (Some(w), Some(h)) = (long, short) {
            if w < h {
                (long, short) = (Some(h), Some(w));
            }
        }

        if let Some(nominal) = self.max_tier.and_then(|t| t.nominal_resolution()) {
            long = Some(long.map_or(nominal.long_side(), |l| l.min(nominal.long_side())));
            short = Some(short.map_or(nominal.short_side(), |s| s.min(nominal.short_side())));
        }

        (long, short)
    }
}

// ---------------------------------------------------------------------------
// Ceiling
// ---------------------------------------------------------------------------

/// Maximum output the server will generate for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ceiling {
    pub resolution: Resolution,
    /// Bits per second; `None` when neither source nor policy bound it.
    pub bitrate: Option<u64>,
}

/// Compute the transcode ceiling for `file` under `policy`.
///
/// Fails only when the policy itself is malformed.
pub fn compute_ceiling(policy: &TranscodePolicy, file: &MediaFile) -> Result<Ceiling> {
    policy.validate()?;

    let source = if file.resolution.is_known() {
        file.resolution
    } else {
        tracing::debug!(
            file_id = %file.id,
            resolution = %file.resolution,
            "unknown source resolution, using {} ceiling",
            QualityTier::FALLBACK
        );
        QualityTier::FALLBACK
            .nominal_resolution()
            .unwrap_or(Resolution::new(854, 480))
    };

    let (box_long, box_short) = policy.size_box();
    let resolution = fit_inside(source, box_long, box_short);

    let source_bitrate = (file.bit_rate > 0).then_some(file.bit_rate);
    let bitrate = match (source_bitrate, policy.max_bitrate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };

    Ok(Ceiling {
        resolution,
        bitrate,
    })
}

/// Scale `source` down (never up) so it fits a (long, short) box.
fn fit_inside(source: Resolution, box_long: Option<u32>, box_short: Option<u32>) -> Resolution {
    let long = f64::from(source.long_side());
    let short = f64::from(source.short_side());

    let mut scale = 1.0_f64;
    if let Some(limit) = box_long {
        scale = scale.min(f64::from(limit) / long);
    }
    if let Some(limit) = box_short {
        scale = scale.min(f64::from(limit) / short);
    }
    if scale >= 1.0 {
        return source;
    }

    let width = ((f64::from(source.width) * scale).round() as u32).max(1);
    let height = ((f64::from(source.height) * scale).round() as u32).max(1);
    Resolution::new(width, height)
}

// ---------------------------------------------------------------------------
// Quality ladder
// ---------------------------------------------------------------------------

/// One step of the quality ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rung {
    pub tier: QualityTier,
    pub resolution: Resolution,
    /// Bits per second.
    pub bitrate: u64,
}

/// Build the descending quality ladder under `ceiling`.
///
/// Every named tier whose short side fits under the ceiling is kept. Each rung
/// is the ceiling fitted inside that tier's nominal box, so wide sources keep
/// the tier label with a reduced short side. Never empty: a source below 240p
/// yields a single [`QualityTier::Original`] rung.
pub fn quality_ladder(ceiling: &Ceiling) -> Vec<Rung> {
    let top = ceiling.resolution;
    let cap_bitrate = |nominal: u64| ceiling.bitrate.map_or(nominal, |c| c.min(nominal));

    let mut rungs: Vec<Rung> = QualityTier::LADDER
        .iter()
        .filter_map(|&tier| {
            let nominal = tier.nominal_resolution()?;
            if nominal.short_side() > top.short_side() {
                return None;
            }
            Some(Rung {
                tier,
                resolution: fit_rung(top, nominal),
                bitrate: cap_bitrate(tier.nominal_bitrate()),
            })
        })
        .collect();

    rungs.dedup_by_key(|r| r.resolution);

    if rungs.is_empty() {
        rungs.push(Rung {
            tier: QualityTier::Original,
            resolution: top,
            bitrate: cap_bitrate(QualityTier::Original.nominal_bitrate()),
        });
    }

    rungs
}

/// Fit `top` inside the tier's nominal (long, short) box, keeping orientation.
///
/// Both sides are rounded to even numbers but never past the box or `top`.
fn fit_rung(top: Resolution, nominal: Resolution) -> Resolution {
    let (box_long, box_short) = (nominal.long_side(), nominal.short_side());
    if top.long_side() <= box_long && top.short_side() <= box_short {
        return top;
    }

    let scale = (f64::from(box_long) / f64::from(top.long_side()))
        .min(f64::from(box_short) / f64::from(top.short_side()));
    let even = |side: u32, limit: u32| {
        let scaled = ((f64::from(side) * scale / 2.0).round() as u32) * 2;
        scaled.min(limit).min(side).max(2)
    };
    let long = even(top.long_side(), box_long);
    let short = even(top.short_side(), box_short).min(long);

    if top.width >= top.height {
        Resolution::new(long, short)
    } else {
        Resolution::new(short, long)
    }
}
