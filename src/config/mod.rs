//! YAML backed models and where to find them.

use once_cell::sync::Lazy;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    env,
    ffi::OsString,
    fs,
    path::{Component, Path, PathBuf},
};

mod app_state;
pub use app_state::AppState;

mod binds;
pub use binds::{Binds, ButtonBind, KnobBind};

mod controller;
pub use controller::{Controller, ControllerElement};

mod error;
pub use error::Error;

pub const HOME_ENV: &str = "MIDI_APP_CONTROLLER_HOME";

const CONFIG_FILES: &str = "config_files";

/// Base directory for configuration files.
pub static BASE_DIR: Lazy<PathBuf> =
    Lazy::new(|| base_dir(env::var_os(HOME_ENV), env::current_exe().ok()));

/// `home` if set, else `config_files` next to the executable
/// if there is one, else the directory shipped with the package.
fn base_dir(home: Option<OsString>, exe: Option<PathBuf>) -> PathBuf {
    if let Some(home) = home {
        return home.into();
    }

    exe.as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(CONFIG_FILES))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILES))
}

/// Locations of controller schemas, binds sets and app state.
///
/// Built-in files live in read-only directories, user files next to them.
#[derive(Clone, Debug)]
pub struct Config {
    pub controllers_readonly_dir: PathBuf,
    pub controllers_user_dir: PathBuf,
    pub binds_readonly_dir: PathBuf,
    pub binds_user_dir: PathBuf,
    pub app_state_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base(BASE_DIR.as_path())
    }
}

impl Config {
    pub fn with_base(base: &Path) -> Self {
        Self {
            controllers_readonly_dir: base.join("controllers"),
            controllers_user_dir: base.join("user").join("controllers"),
            binds_readonly_dir: base.join("binds"),
            binds_user_dir: base.join("user").join("binds"),
            app_state_file: base.join("user").join("app_state.yaml"),
        }
    }

    pub fn controller_dirs(&self) -> [&Path; 2] {
        [&self.controllers_readonly_dir, &self.controllers_user_dir]
    }

    pub fn binds_dirs(&self) -> [&Path; 2] {
        [&self.binds_readonly_dir, &self.binds_user_dir]
    }

    pub fn is_readonly(&self, path: &Path) -> bool {
        let dirs = [
            self.controllers_readonly_dir.as_path(),
            self.binds_readonly_dir.as_path(),
        ];

        is_within(dirs, path)
    }

    /// Writes `model` to `path`, creating the parent directories if needed.
    ///
    /// Fails if `path` is in a read-only directory.
    pub fn save_to<M: YamlModel>(&self, model: &M, path: &Path) -> Result<(), Error> {
        if self.is_readonly(path) {
            return Err(Error::ReadOnly(path.to_owned()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_owned(),
                source,
            })?;
        }

        let content = serde_yaml::to_string(model)?;
        fs::write(path, content).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Saves a copy of `model` in `new_dir`.
    ///
    /// Keeps the file name of `path` when possible, adds a number otherwise.
    pub fn save_copy_to<M: YamlModel>(
        &self,
        model: &M,
        path: &Path,
        new_dir: &Path,
    ) -> Result<PathBuf, Error> {
        if self.is_readonly(new_dir) {
            return Err(Error::ReadOnly(new_dir.to_owned()));
        }

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "copy".to_string());

        let mut new_path = new_dir.join(format!("{stem}.yaml"));
        let mut idx = 1;
        while new_path.exists() {
            new_path = new_dir.join(format!("{stem} {idx}.yaml"));
            idx += 1;
        }

        self.save_to(model, &new_path)?;

        Ok(new_path)
    }
}

/// Whether `path` is in one of `dirs`.
///
/// Both sides are compared once made absolute, with `.` and `..` resolved
/// and symbolic links followed as far as the paths exist.
pub fn is_within<'a>(dirs: impl IntoIterator<Item = &'a Path>, path: &Path) -> bool {
    let path = normalize(path);
    dirs.into_iter().any(|dir| path.starts_with(normalize(dir)))
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = match env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_owned(),
    };

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut missing = Vec::new();
    let mut existing = lexical.as_path();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .into_iter()
                .rev()
                .fold(canonical, |acc, name| acc.join(name));
        }

        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return lexical.clone(),
        }
    }
}

pub trait YamlModel: Serialize + DeserializeOwned + Sized {
    /// Checks invariants serde can't express.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    fn load_from(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        let model: Self = serde_yaml::from_str(&content).map_err(|source| Error::Yaml {
            path: path.to_owned(),
            source,
        })?;
        model.validate()?;

        Ok(model)
    }

    /// Loads every YAML file found in `dirs`.
    ///
    /// Missing directories and files which fail to load are skipped.
    fn load_all_from<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Vec<(Self, PathBuf)> {
        let mut models = Vec::new();

        for dir in dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    log::debug!("Skipping {}: {err}", dir.display());
                    continue;
                }
            };

            let mut paths: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| {
                    matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("yaml" | "yml")
                    )
                })
                .collect();
            paths.sort();

            for path in paths {
                match Self::load_from(&path) {
                    Ok(model) => models.push((model, path)),
                    Err(err) => log::warn!("Unable to load model from {}: {err}", path.display()),
                }
            }
        }

        models
    }
}

/// Returns the first value found twice.
pub(crate) fn find_duplicate<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut seen = Vec::new();
    for value in values {
        if seen.contains(&value) {
            return Some(value);
        }
        seen.push(value);
    }

    None
}

pub(crate) fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), Error> {
    if value < min || value > max {
        return Err(Error::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }

    Ok(())
}

pub(crate) fn check_not_empty(field: &'static str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::Empty(field));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller {
            name: "Pad".to_string(),
            button_value_off: 0,
            button_value_on: 127,
            knob_value_min: 0,
            knob_value_max: 127,
            default_channel: 1,
            preferred_midi_in: None,
            preferred_midi_out: None,
            buttons: vec![ControllerElement::new(0, "Play")],
            knobs: vec![ControllerElement::new(1, "Volume")],
        }
    }

    /// Writes regardless of the directory, as a package would ship it.
    fn install(model: &impl YamlModel, path: &Path) {
        fs::write(path, serde_yaml::to_string(model).unwrap()).unwrap();
    }

    #[test]
    fn find_duplicates() {
        assert_eq!(find_duplicate([1, 2, 3, 2, 1]), Some(2));
        assert_eq!(find_duplicate(["a", "b"]), None);
        assert_eq!(find_duplicate(Vec::<u8>::new()), None);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base(tmp.path());
        let path = config.controllers_user_dir.join("pad.yaml");

        config.save_to(&controller(), &path).unwrap();
        let loaded = Controller::load_from(&path).unwrap();
        assert_eq!(loaded, controller());
    }

    #[test]
    fn refuse_readonly() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base(tmp.path());
        let path = config.controllers_readonly_dir.join("pad.yaml");

        assert!(matches!(
            config.save_to(&controller(), &path),
            Err(Error::ReadOnly(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn refuse_readonly_through_relative_paths() {
        // Relative to the working directory.
        let tmp = tempfile::tempdir_in(".").unwrap();
        let base = Path::new(tmp.path().file_name().unwrap());
        let config = Config::with_base(base);

        let dotted = Path::new(".").join(base).join("controllers").join("pad.yaml");
        let climbing = config
            .binds_user_dir
            .join("..")
            .join("..")
            .join("binds")
            .join("transport.yaml");

        for path in [&dotted, &climbing] {
            assert!(config.is_readonly(path), "{}", path.display());
            assert!(matches!(
                config.save_to(&controller(), path),
                Err(Error::ReadOnly(_))
            ));
        }
        assert!(!base.join("controllers").exists());
        assert!(!base.join("binds").exists());

        let user_dir = Path::new(".").join(&config.controllers_user_dir);
        assert!(!config.is_readonly(&user_dir.join("pad.yaml")));
        let climbing_dir = user_dir.join("..").join("..").join("controllers");
        assert!(matches!(
            config.save_copy_to(&controller(), &dotted, &climbing_dir),
            Err(Error::ReadOnly(_))
        ));
    }

    #[test]
    fn load_all_skips_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base(tmp.path());
        fs::create_dir_all(&config.controllers_readonly_dir).unwrap();

        install(&controller(), &config.controllers_readonly_dir.join("pad.yaml"));
        fs::write(config.controllers_readonly_dir.join("broken.yml"), "name: [").unwrap();
        fs::write(config.controllers_readonly_dir.join("notes.txt"), "not yaml").unwrap();

        let invalid = Controller {
            knob_value_min: 127,
            ..controller()
        };
        install(&invalid, &config.controllers_readonly_dir.join("invalid.yaml"));

        let loaded = Controller::load_all_from(config.controller_dirs());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0.name, "Pad");
        assert!(loaded[0].1.ends_with("pad.yaml"));
    }

    #[test]
    fn save_copy_avoids_collisions() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base(tmp.path());
        let original = config.controllers_readonly_dir.join("pad.yaml");

        let first = config
            .save_copy_to(&controller(), &original, &config.controllers_user_dir)
            .unwrap();
        let second = config
            .save_copy_to(&controller(), &original, &config.controllers_user_dir)
            .unwrap();

        assert!(first.ends_with("pad.yaml"));
        assert!(second.ends_with("pad 1.yaml"));
        assert!(Controller::load_from(&second).is_ok());
    }

    #[test]
    fn base_dir_lookup() {
        assert_eq!(
            base_dir(Some("/opt/midi".into()), None),
            PathBuf::from("/opt/midi")
        );

        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("midi-app-controller");

        let shipped = base_dir(None, Some(exe.clone()));
        assert!(shipped.join("controllers").is_dir());

        fs::create_dir(tmp.path().join(CONFIG_FILES)).unwrap();
        assert_eq!(base_dir(None, Some(exe)), tmp.path().join(CONFIG_FILES));
    }
}
