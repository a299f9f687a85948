//! # Pilothouse MySQL Handler
//!
//! File: cli/src/commands/mysql.rs
//!
//! Implements `pilothouse mysql [cmd...]`. Without arguments it opens an
//! interactive MariaDB shell as root; otherwise the arguments are joined with
//! spaces and executed as a single statement.
//!
//! ```bash
//! pilothouse mysql
//! pilothouse mysql SHOW DATABASES
//! pilothouse mysql "SELECT user, host FROM mysql.user"
//! ```
//!
use crate::common::compose::Compose;
use crate::common::docker::state;
use crate::common::process;
use crate::core::{config::Config, error::Result};
use clap::Parser;
use tracing::{debug, info};

/// Arguments for `pilothouse mysql`.
#[derive(Parser, Debug)]
#[command(
    about = "Open a MariaDB shell or run a SQL statement",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct MysqlArgs {
    /// SQL to execute. Opens an interactive shell if omitted.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Statement to run, or `None` for an interactive shell.
fn statement(args: &MysqlArgs) -> Option<String> {
    let joined = args.command.join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn handle_mysql(args: MysqlArgs, cfg: &Config) -> Result<()> {
    info!("Handling mysql command...");
    debug!("Mysql args: {:?}", args);

    let compose = Compose::prepare(cfg)?;
    state::require_stack_running(compose.project()).await?;

    let sql = statement(&args);
    process::run_streamed(&compose.mysql_spec(sql.as_deref())).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_joins_arguments() {
        let args = MysqlArgs::try_parse_from(["mysql", "SHOW", "DATABASES"]).unwrap();
        assert_eq!(statement(&args).as_deref(), Some("SHOW DATABASES"));

        let args = MysqlArgs::try_parse_from(["mysql", "SELECT", "-1"]).unwrap();
        assert_eq!(statement(&args).as_deref(), Some("SELECT -1"));
    }

    #[test]
    fn test_no_arguments_means_shell() {
        let args = MysqlArgs::try_parse_from(["mysql"]).unwrap();
        assert_eq!(statement(&args), None);
    }
}
