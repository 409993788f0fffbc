//! Configuration – reads/writes `~/.posekit/config.toml`.

use posekit_skeleton::{LegTweaksConfig, SkeletonConfig, TapDetectionConfig};
use posekit_types::PoseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which skeleton variant the demo loop drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RigKind {
    #[default]
    FullBody,
    UpperBody,
}

impl std::fmt::Display for RigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RigKind::FullBody => write!(f, "full-body"),
            RigKind::UpperBody => write!(f, "upper-body"),
        }
    }
}

/// Persisted user configuration stored in `~/.posekit/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosekitConfig {
    /// Pose updates per second.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Stop after this many ticks; `0` runs until Ctrl-C.
    #[serde(default)]
    pub ticks: u64,

    /// Print a data-feed frame every this many ticks.
    #[serde(default = "default_feed_every")]
    pub feed_every: u64,

    #[serde(default)]
    pub rig: RigKind,

    #[serde(default)]
    pub leg_tweaks: LegTweaksConfig,

    #[serde(default)]
    pub tap_detection: TapDetectionConfig,

    #[serde(default)]
    pub skeleton: SkeletonConfig,
}

fn default_tick_hz() -> u32 {
    100
}
fn default_feed_every() -> u64 {
    50
}

impl Default for PosekitConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            ticks: 0,
            feed_every: default_feed_every(),
            rig: RigKind::default(),
            leg_tweaks: LegTweaksConfig::default(),
            tap_detection: TapDetectionConfig::default(),
            skeleton: SkeletonConfig::default(),
        }
    }
}

/// Return the path to `~/.posekit/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".posekit").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<PosekitConfig>, PoseError> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<PosekitConfig>, PoseError> {
    if !path.exists() {
        return Ok(None);
    }
    let load_err = |details: String| PoseError::ConfigLoad {
        path: path.display().to_string(),
        details,
    };
    let raw = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let mut cfg: PosekitConfig = toml::from_str(&raw).map_err(|e| load_err(e.to_string()))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `POSEKIT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `POSEKIT_TICK_HZ` | `tick_hz` |
/// | `POSEKIT_TICKS` | `ticks` |
/// | `POSEKIT_FLOOR_LEVEL` | `leg_tweaks.floor_level` |
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(cfg: &mut PosekitConfig) {
    if let Ok(v) = std::env::var("POSEKIT_TICK_HZ")
        && let Ok(hz) = v.parse::<u32>()
        && hz > 0
    {
        cfg.tick_hz = hz;
    }
    if let Ok(v) = std::env::var("POSEKIT_TICKS")
        && let Ok(ticks) = v.parse::<u64>()
    {
        cfg.ticks = ticks;
    }
    if let Ok(v) = std::env::var("POSEKIT_FLOOR_LEVEL")
        && let Ok(level) = v.parse::<f32>()
        && level.is_finite()
    {
        cfg.leg_tweaks.floor_level = level;
    }
}

/// Save the config to disk, creating `~/.posekit/` if necessary.
pub fn save(cfg: &PosekitConfig) -> Result<(), PoseError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &PosekitConfig, path: &Path) -> Result<(), PoseError> {
    let save_err = |details: String| PoseError::ConfigSave {
        path: path.display().to_string(),
        details,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        // Owner-only directory (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| save_err(e.to_string()))?;
        }
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| save_err(e.to_string()))?;
    // Owner-only file (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| save_err(e.to_string()))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| save_err(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&PosekitConfig::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&PosekitConfig::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.tick_hz, 100);
        assert_eq!(loaded.rig, RigKind::FullBody);
        assert_eq!(loaded.skeleton, SkeletonConfig::default());
        assert_eq!(loaded.tap_detection, TapDetectionConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "rig = \"upper-body\"\n\n[skeleton]\nupper_arm = 0.3\n\n[leg_tweaks]\nfloor_clip = false\n",
        )
        .expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.rig, RigKind::UpperBody);
        assert_eq!(loaded.skeleton.upper_arm, 0.3);
        assert_eq!(loaded.skeleton.lower_arm, 0.26);
        assert!(!loaded.leg_tweaks.floor_clip);
        assert!(loaded.leg_tweaks.enabled);
    }

    #[test]
    fn out_of_range_proportions_fail_skeleton_build() {
        use posekit_skeleton::{FullBodySkeleton, UpperBodySkeleton};

        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        for body in ["upper_leg = -0.4", "upper_leg = nan"] {
            std::fs::write(&path, format!("[skeleton]\n{body}\n")).expect("write");
            let loaded = load_from(&path).expect("load ok").expect("some");

            let full = FullBodySkeleton::new(Vec::new(), loaded.skeleton).err();
            assert!(matches!(full, Some(PoseError::InvalidOffset(_))), "{body}");
            let upper = UpperBodySkeleton::new(Vec::new(), loaded.skeleton).err();
            assert!(matches!(upper, Some(PoseError::InvalidOffset(_))), "{body}");
        }
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_hz = \"fast\"").expect("write");

        let err = load_from(&path).expect_err("must fail");
        assert!(matches!(err, PoseError::ConfigLoad { .. }));
    }

    #[test]
    fn config_path_points_to_posekit_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".posekit"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_tick_hz() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("POSEKIT_TICK_HZ", "250") };
        let mut cfg = PosekitConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.tick_hz, 250);
        unsafe { std::env::remove_var("POSEKIT_TICK_HZ") };
    }

    #[test]
    fn apply_env_overrides_changes_ticks() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("POSEKIT_TICKS", "10") };
        let mut cfg = PosekitConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.ticks, 10);
        unsafe { std::env::remove_var("POSEKIT_TICKS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_floor_level() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("POSEKIT_FLOOR_LEVEL", "not-a-number") };
        let mut cfg = PosekitConfig::default();
        let original = cfg.leg_tweaks.floor_level;
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.leg_tweaks.floor_level, original);
        unsafe { std::env::remove_var("POSEKIT_FLOOR_LEVEL") };
    }
}
