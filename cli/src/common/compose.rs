//! # Pilothouse Docker Compose Wrapper (`common::compose`)
//!
//! File: cli/src/common/compose.rs
//!
//! ## Overview
//!
//! All container lifecycle goes through Docker Compose. `Compose` holds what
//! every invocation needs (the configured compose command, project name,
//! compose file and the environment consumed by its bind mounts) and builds
//! `CommandSpec`s for the operations the commands use:
//!
//! - plain passthrough (`up -d`, `down`, `restart`, `logs`, arbitrary args)
//! - `exec` into a running service (SQL, nginx reload, readiness ping)
//! - one-off `run --rm wp-cli wp ...`
//!
//! It also provides the bounded poll used to wait for MariaDB after `up`.
//!
use crate::common::docker::state;
use crate::common::process::{self, CommandSpec};
use crate::core::config::{Config, DatabaseConfig};
use crate::core::error::{PilothouseError, Result};
use crate::core::stack;
use anyhow::{anyhow, Context};
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const NGINX_SERVICE: &str = "nginx";
pub const MYSQL_SERVICE: &str = "mysql";
pub const WP_CLI_SERVICE: &str = "wp-cli";

/// Invocation context for the stack's compose project.
#[derive(Debug, Clone)]
pub struct Compose {
    command: Vec<String>,
    project: String,
    file: PathBuf,
    env: Vec<(String, String)>,
    root_password: String,
    /// `uid:gid` that one-off WP-CLI containers run as.
    user: Option<String>,
}

/// `uid:gid` of the directory's owner, so files written through the bind
/// mount stay owned by whoever owns the sites directory.
#[cfg(unix)]
pub fn dir_owner(dir: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;
    match std::fs::metadata(dir) {
        Ok(meta) => Some(format!("{}:{}", meta.uid(), meta.gid())),
        Err(e) => {
            warn!("Could not read the owner of {}: {}", dir.display(), e);
            None
        }
    }
}

#[cfg(not(unix))]
pub fn dir_owner(_dir: &Path) -> Option<String> {
    None
}

impl Compose {
    /// Builds the context without touching the filesystem.
    pub fn new(config: &Config) -> Self {
        Self {
            command: config.compose.command.clone(),
            project: config.compose.project_name.clone(),
            file: stack::compose_file(&config.home_dir()),
            env: stack::compose_env(config),
            root_password: config.database.root_password.clone(),
            user: None,
        }
    }

    /// Refreshes the stack files, then builds the context.
    pub fn prepare(config: &Config) -> Result<Self> {
        stack::ensure_scaffold(config).context("Failed to prepare the stack directory")?;
        Ok(Self::new(config).with_user(dir_owner(&config.sites_dir())))
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// `<compose command> -p <project> -f <file> <args...>` with the stack environment.
    pub fn spec<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new(self.command[0].clone())
            .args(self.command[1..].iter().cloned())
            .args([
                "-p".to_string(),
                self.project.clone(),
                "-f".to_string(),
                self.file.display().to_string(),
            ])
            .args(args)
            .envs(&self.env);
        match self.file.parent() {
            Some(home) if home.is_dir() => spec.current_dir(home),
            _ => spec,
        }
    }

    /// Runs compose with inherited stdio.
    pub async fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        process::run_streamed(&self.spec(args)).await
    }

    /// `exec [-T] [-e K=V ...] <service> <cmd...>`.
    pub fn exec_spec(
        &self,
        service: &str,
        tty: bool,
        env: &[(&str, &str)],
        cmd: &[String],
    ) -> CommandSpec {
        let mut args = vec!["exec".to_string()];
        if !tty {
            args.push("-T".to_string());
        }
        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(service.to_string());
        args.extend(cmd.iter().cloned());
        self.spec(args)
    }

    /// MariaDB client in the mysql service: a shell when `sql` is `None`, else `-e <sql>`.
    pub fn mysql_spec(&self, sql: Option<&str>) -> CommandSpec {
        let mut cmd = vec!["mysql".to_string(), "-uroot".to_string()];
        if let Some(sql) = sql {
            cmd.push("-e".to_string());
            cmd.push(sql.to_string());
        }
        let tty = sql.is_none() && std::io::stdin().is_terminal();
        self.exec_spec(
            MYSQL_SERVICE,
            tty,
            &[("MYSQL_PWD", self.root_password.as_str())],
            &cmd,
        )
    }

    /// Executes one SQL statement, failing with its output if MariaDB rejects it.
    pub async fn run_sql(&self, sql: &str) -> Result<()> {
        debug!("Running SQL: {}", sql);
        process::run_checked(&self.mysql_spec(Some(sql))).await?;
        Ok(())
    }

    /// `run --rm [-T] -w <workdir> wp-cli wp <args...>`.
    pub fn wp_spec(&self, workdir: &str, args: &[String], tty: bool) -> CommandSpec {
        let mut full = vec!["run".to_string(), "--rm".to_string()];
        if !tty {
            full.push("-T".to_string());
        }
        if let Some(user) = &self.user {
            // The image's www-data home is not writable by an arbitrary uid.
            full.extend(["--user".to_string(), user.clone()]);
            full.extend(["-e".to_string(), "HOME=/tmp".to_string()]);
        }
        full.push("-w".to_string());
        full.push(workdir.to_string());
        full.push(WP_CLI_SERVICE.to_string());
        full.push("wp".to_string());
        full.extend(args.iter().cloned());
        self.spec(full)
    }

    /// Runs WP-CLI with captured output, failing with that output on error.
    pub async fn wp_checked(&self, workdir: &str, args: &[String]) -> Result<()> {
        process::run_checked(&self.wp_spec(workdir, args, false)).await?;
        Ok(())
    }

    fn ping_spec(&self) -> CommandSpec {
        // TCP, so the entrypoint's socket-only bootstrap server does not count as ready.
        let cmd = ["mysqladmin", "ping", "-h", "127.0.0.1", "-uroot", "--silent"]
            .map(String::from);
        self.exec_spec(
            MYSQL_SERVICE,
            false,
            &[("MYSQL_PWD", self.root_password.as_str())],
            &cmd,
        )
    }

    /// Polls MariaDB until it answers, bounded by `ready_timeout_secs`.
    pub async fn wait_for_database(&self, database: &DatabaseConfig) -> Result<()> {
        let interval = Duration::from_millis(database.poll_interval_ms);
        let attempts = attempts_for(database.ready_timeout_secs, database.poll_interval_ms);
        info!(
            "Waiting for the database ({} attempts, {:?} apart)",
            attempts, interval
        );
        let spec = self.ping_spec();
        let spec = &spec;
        let ready = poll_until(attempts, interval, move || async move {
            process::run_captured(spec).await.map(|output| output.success)
        })
        .await?;
        if ready {
            info!("Database is accepting connections.");
            Ok(())
        } else {
            Err(anyhow!(PilothouseError::DatabaseTimeout {
                secs: database.ready_timeout_secs,
            }))
        }
    }

    /// Reloads nginx when its service is running; otherwise leaves it alone.
    pub async fn reload_nginx_if_running(&self) -> Result<bool> {
        if !state::service_running(&self.project, NGINX_SERVICE).await? {
            info!("nginx is not running; skipping reload");
            return Ok(false);
        }
        let cmd = ["nginx", "-s", "reload"].map(String::from);
        process::run_checked(&self.exec_spec(NGINX_SERVICE, false, &[], &cmd))
            .await
            .context("nginx rejected the new configuration")?;
        info!("Reloaded nginx");
        Ok(true)
    }
}

/// Number of polls that fit in the timeout, at least one.
pub fn attempts_for(timeout_secs: u64, interval_ms: u64) -> u32 {
    let attempts = timeout_secs
        .saturating_mul(1000)
        .div_ceil(interval_ms.max(1));
    u32::try_from(attempts.max(1)).unwrap_or(u32::MAX)
}

/// Calls `check` up to `attempts` times, sleeping `interval` between calls,
/// until it returns `true`. Errors from `check` abort the poll.
pub async fn poll_until<F, Fut>(attempts: u32, interval: Duration, mut check: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for attempt in 1..=attempts {
        if check().await? {
            debug!("Ready after {} attempt(s)", attempt);
            return Ok(true);
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    warn!("Gave up after {} attempt(s)", attempts);
    Ok(false)
}

/// `CREATE DATABASE` for a validated database name.
pub fn create_database_sql(name: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS `{}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;",
        name
    )
}

/// `DROP DATABASE` for a validated database name.
pub fn drop_database_sql(name: &str) -> String {
    format!("DROP DATABASE IF EXISTS `{}`;", name)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn compose() -> Compose {
        let mut config = Config::default();
        config.paths.home = "/opt/pilothouse".into();
        config.database.root_password = "secret".into();
        Compose::new(&config)
    }

    #[test]
    fn test_spec_prefixes_project_and_file() {
        let spec = compose().spec(["up", "-d"]);
        assert_eq!(spec.program, "docker");
        assert_eq!(
            spec.args,
            vec![
                "compose",
                "-p",
                "pilothouse",
                "-f",
                "/opt/pilothouse/docker-compose.yml",
                "up",
                "-d"
            ]
        );
        assert!(spec
            .env
            .iter()
            .any(|(k, v)| k == "PILOTHOUSE_SITES_DIR" && v == "/opt/pilothouse/sites"));
    }

    #[test]
    fn test_legacy_compose_binary() {
        let mut config = Config::default();
        config.compose.command = vec!["docker-compose".into()];
        config.compose.project_name = "wp".into();
        let spec = Compose::new(&config).spec(["down"]);
        assert_eq!(spec.program, "docker-compose");
        assert_eq!(spec.args[0], "-p");
        assert_eq!(spec.args[1], "wp");
        assert_eq!(spec.args.last().map(String::as_str), Some("down"));
    }

    #[test]
    fn test_mysql_spec_with_statement() {
        let spec = compose().mysql_spec(Some("SHOW DATABASES"));
        let tail: Vec<&str> = spec.args[5..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "exec",
                "-T",
                "-e",
                "MYSQL_PWD=secret",
                "mysql",
                "mysql",
                "-uroot",
                "-e",
                "SHOW DATABASES"
            ]
        );
    }

    #[test]
    fn test_wp_spec() {
        let args = vec!["plugin".to_string(), "list".to_string(), "--format=json".to_string()];
        let spec = compose().wp_spec("/var/www/html/blog/wordpress", &args, false);
        let joined = spec.args.join(" ");
        assert!(joined.ends_with(
            "run --rm -T -w /var/www/html/blog/wordpress wp-cli wp plugin list --format=json"
        ));

        let interactive = compose().wp_spec("/var/www/html", &["shell".to_string()], true);
        assert!(!interactive.args.contains(&"-T".to_string()));
        assert!(!interactive.args.contains(&"--user".to_string()));
    }

    #[test]
    fn test_wp_spec_runs_as_sites_owner() {
        let compose = compose().with_user(Some("1000:1000".to_string()));
        let spec = compose.wp_spec("/var/www/html", &["core".to_string(), "version".to_string()], false);
        assert!(spec.args.join(" ").ends_with(
            "run --rm -T --user 1000:1000 -e HOME=/tmp -w /var/www/html wp-cli wp core version"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dir_owner() {
        use std::os::unix::fs::MetadataExt;
        let dir = tempfile::tempdir().unwrap();
        let meta = std::fs::metadata(dir.path()).unwrap();
        assert_eq!(
            dir_owner(dir.path()),
            Some(format!("{}:{}", meta.uid(), meta.gid()))
        );
        assert_eq!(dir_owner(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_database_sql() {
        assert_eq!(
            create_database_sql("my_blog"),
            "CREATE DATABASE IF NOT EXISTS `my_blog` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;"
        );
        assert_eq!(drop_database_sql("my_blog"), "DROP DATABASE IF EXISTS `my_blog`;");
    }

    #[test]
    fn test_attempts_for() {
        assert_eq!(attempts_for(60, 1000), 60);
        assert_eq!(attempts_for(1, 300), 4);
        assert_eq!(attempts_for(1, 5000), 1);
        assert_eq!(attempts_for(u64::MAX, 1), u32::MAX);
    }

    #[tokio::test]
    async fn test_poll_until_succeeds_after_retries() -> Result<()> {
        let calls = Cell::new(0);
        let ready = poll_until(5, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok::<_, anyhow::Error>(n >= 3) }
        })
        .await?;
        assert!(ready);
        assert_eq!(calls.get(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_poll_until_is_bounded() -> Result<()> {
        let calls = Cell::new(0);
        let ready = poll_until(4, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, anyhow::Error>(false) }
        })
        .await?;
        assert!(!ready);
        assert_eq!(calls.get(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let result = poll_until(3, Duration::from_millis(1), || async {
            Err(anyhow!("docker missing"))
        })
        .await;
        assert!(result.is_err());
    }
}
