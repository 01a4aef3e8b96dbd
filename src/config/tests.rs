use super::validation::validate_profile;
use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn write_profile(dir: &std::path::Path, content: &str) -> PathBuf {
    let path = dir.join("profile.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_empty_profile_uses_built_in_defaults() {
    let profile: Profile = toml::from_str("").unwrap();
    assert_eq!(profile, Profile::default());
    assert_eq!(profile.preview_size(), (640, 480));
    assert_eq!(profile.max_metering_areas(), 1);
    assert_eq!(profile.defaults(), Defaults::default());
    assert!(validate_profile(&profile).is_ok());
}

#[test]
fn test_profile_overrides_defaults() {
    let profile: Profile = toml::from_str(
        r#"
        preview_width = 1280
        preview_height = 720
        max_metering_areas = 4

        [defaults]
        scene_mode = "night"
        contrast = 150
        flash_mode = "auto"
        "#,
    )
    .unwrap();

    assert_eq!(profile.preview_size(), (1280, 720));
    let defaults = profile.defaults();
    assert_eq!(defaults.scene_mode, "night");
    assert_eq!(defaults.contrast, 150);
    assert_eq!(defaults.flash_mode, "auto");
    assert_eq!(defaults.brightness, DEFAULT_BRIGHTNESS);
    assert!(validate_profile(&profile).is_ok());
}

#[test]
fn test_capabilities_advertise_profile() {
    let profile = Profile {
        max_metering_areas: Some(3),
        auto_white_balance_lock_supported: Some(false),
        ..Profile::default()
    };
    let params = profile.capabilities();
    assert_eq!(params.get_int(KEY_MAX_NUM_METERING_AREAS), Some(3));
    assert_eq!(params.get(KEY_AUTO_EXPOSURE_LOCK_SUPPORTED), Some(TRUE));
    assert_eq!(params.get(KEY_AUTO_WHITEBALANCE_LOCK_SUPPORTED), Some(FALSE));
}

#[test]
fn test_validation_rejects_zero_preview() {
    let profile = Profile {
        preview_height: Some(0),
        ..Profile::default()
    };
    let err = validate_profile(&profile).unwrap_err();
    assert!(err.to_string().contains("non-zero"));
}

#[test]
fn test_validation_rejects_too_many_areas() {
    let profile = Profile {
        max_metering_areas: Some(36),
        ..Profile::default()
    };
    assert!(validate_profile(&profile).is_err());

    let profile = Profile {
        max_metering_areas: Some(35),
        ..Profile::default()
    };
    assert!(validate_profile(&profile).is_ok());
}

#[test]
fn test_validation_scalar_ranges() {
    let cases = [
        DefaultsConfig {
            contrast: Some(201),
            ..DefaultsConfig::default()
        },
        DefaultsConfig {
            sharpness: Some(-1),
            ..DefaultsConfig::default()
        },
        DefaultsConfig {
            brightness: Some(101),
            ..DefaultsConfig::default()
        },
        DefaultsConfig {
            exposure_compensation: Some(31),
            ..DefaultsConfig::default()
        },
    ];

    for defaults in cases {
        let profile = Profile {
            defaults: defaults.clone(),
            ..Profile::default()
        };
        assert!(
            validate_profile(&profile).is_err(),
            "accepted {defaults:?}"
        );
    }
}

#[test]
fn test_validation_rejects_unknown_names() {
    let profile = Profile {
        defaults: DefaultsConfig {
            effect: Some("cartoon".to_string()),
            ..DefaultsConfig::default()
        },
        ..Profile::default()
    };
    let err = validate_profile(&profile).unwrap_err().to_string();
    assert!(err.contains("cartoon"));
    assert!(err.contains("sepia"));
}

#[test]
fn test_unknown_fields_fail_to_parse() {
    assert!(toml::from_str::<Profile>("preview_widht = 10").is_err());
}

#[test]
fn test_load_from_path() {
    let temp_dir = tempdir().unwrap();
    let path = write_profile(
        temp_dir.path(),
        "max_metering_areas = 2\n[defaults]\niso = \"400\"\n",
    );

    let profile = load_from_path(&path).unwrap();
    assert_eq!(profile.max_metering_areas(), 2);
    assert_eq!(profile.defaults().iso, "400");
}

#[test]
fn test_load_from_path_reports_invalid_profile() {
    let temp_dir = tempdir().unwrap();
    let path = write_profile(temp_dir.path(), "[defaults]\nfocus_mode = \"sideways\"\n");
    assert!(load_from_path(&path).is_err());

    let missing = temp_dir.path().join("missing.toml");
    assert!(load_from_path(&missing).is_err());
}

fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir);
    }

    let result = f();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
    result
}

#[test]
#[serial]
fn test_load_without_profile_falls_back() {
    let temp_dir = tempdir().unwrap();
    let profile = with_config_home(temp_dir.path(), Profile::load).unwrap();
    assert_eq!(profile, Profile::default());
}

#[test]
#[serial]
fn test_load_from_config_home() {
    let temp_dir = tempdir().unwrap();
    let profile_dir = temp_dir.path().join("camera3a");
    fs::create_dir_all(&profile_dir).unwrap();
    write_profile(&profile_dir, "preview_width = 320\npreview_height = 240\n");

    let path = with_config_home(temp_dir.path(), get_profile_path).unwrap();
    assert_eq!(path, profile_dir.join("profile.toml"));

    let profile = with_config_home(temp_dir.path(), Profile::load).unwrap();
    assert_eq!(profile.preview_size(), (320, 240));
}
