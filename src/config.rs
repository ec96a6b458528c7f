//! Runtime configuration resolved from flags and the environment.

use std::path::{Path, PathBuf};

/// Environment variable naming the project file.
pub const DB_ENV: &str = "GANTT_DB";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON file holding every project.
    pub db_path: PathBuf,
    /// Number of `-v` flags given.
    pub verbosity: u8,
}

impl Config {
    /// Resolve the project file: `--db` wins, then `$GANTT_DB`, then
    /// `$HOME/.gantt/projects.json` (or `./.gantt/projects.json` without a home).
    pub fn from_env(db: Option<PathBuf>, verbosity: u8) -> Self {
        Self::resolve(
            db,
            std::env::var_os(DB_ENV).map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
            verbosity,
        )
    }

    fn resolve(
        db: Option<PathBuf>,
        env_db: Option<PathBuf>,
        home: Option<PathBuf>,
        verbosity: u8,
    ) -> Self {
        let db_path = db.or(env_db).unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(".gantt")
                .join("projects.json")
        });
        Config { db_path, verbosity }
    }

    /// Directory the project file lives in.
    pub fn data_dir(&self) -> &Path {
        self.db_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_beats_env_beats_home() {
        let flag = Some(PathBuf::from("/tmp/flag.json"));
        let env = Some(PathBuf::from("/tmp/env.json"));
        let home = Some(PathBuf::from("/home/ann"));

        let c = Config::resolve(flag, env.clone(), home.clone(), 0);
        assert_eq!(c.db_path, PathBuf::from("/tmp/flag.json"));

        let c = Config::resolve(None, env, home.clone(), 0);
        assert_eq!(c.db_path, PathBuf::from("/tmp/env.json"));

        let c = Config::resolve(None, None, home, 0);
        assert_eq!(c.db_path, PathBuf::from("/home/ann/.gantt/projects.json"));
        assert_eq!(c.data_dir(), Path::new("/home/ann/.gantt"));
    }

    #[test]
    fn test_bare_file_name_lives_in_cwd() {
        let c = Config::resolve(Some(PathBuf::from("projects.json")), None, None, 0);
        assert_eq!(c.data_dir(), Path::new("."));
    }

    #[test]
    fn test_log_level_from_verbosity() {
        let levels: Vec<_> = (0..5)
            .map(|v| Config::resolve(None, None, None, v).log_level())
            .collect();
        assert_eq!(levels, vec!["warn", "info", "debug", "trace", "trace"]);
    }
}
