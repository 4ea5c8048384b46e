// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and environment configuration.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use visit_scheduler::BookingPolicy;
use visit_scheduler_api::SchedulerSettings;
use visit_scheduler_domain::DEFAULT_TIMEZONE;

/// Prison visit scheduler - HTTP server for booking prison visits
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If neither this nor a `MySQL`
    /// URL is given, an in-memory database is used.
    #[arg(short, long, env = "VISIT_SCHEDULER_DATABASE")]
    pub database: Option<PathBuf>,

    /// `MySQL`/`MariaDB` connection URL.
    #[arg(long, env = "VISIT_SCHEDULER_MYSQL_URL", conflicts_with = "database")]
    pub mysql_url: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "VISIT_SCHEDULER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "VISIT_SCHEDULER_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// IANA timezone the prisons keep their diaries in
    #[arg(long, env = "VISIT_SCHEDULER_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Minutes an unbooked application holds its slot
    #[arg(long, env = "VISIT_SCHEDULER_APPLICATION_EXPIRY_MINUTES", default_value_t = 20)]
    pub application_expiry_minutes: u32,

    /// Days after its start that a visit can still be cancelled (0 disables)
    #[arg(long, env = "VISIT_SCHEDULER_CANCEL_DAY_LIMIT", default_value_t = 28)]
    pub cancel_day_limit: u32,

    /// Seconds between expired-application sweeps (0 disables)
    #[arg(long, env = "VISIT_SCHEDULER_EXPIRY_SWEEP_SECONDS", default_value_t = 60)]
    pub expiry_sweep_seconds: u64,

    /// JSON file seeding the prisoner and non-association directory
    #[arg(long, env = "VISIT_SCHEDULER_DIRECTORY_SEED")]
    pub directory_seed: Option<PathBuf>,
}

impl Args {
    /// Settings handed to every API handler.
    #[must_use]
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            timezone: self.timezone.clone(),
            policy: BookingPolicy::new(self.application_expiry_minutes, self.cancel_day_limit),
        }
    }

    /// The address to listen on.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["visit-scheduler-server"]).unwrap();

        assert_eq!(args.database, None);
        assert_eq!(args.mysql_url, None);
        assert_eq!(args.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(args.expiry_sweep_seconds, 60);
        assert_eq!(args.scheduler_settings(), SchedulerSettings::default());
    }

    #[test]
    fn test_policy_flags() {
        let args = Args::try_parse_from([
            "visit-scheduler-server",
            "--timezone",
            "Europe/Dublin",
            "--application-expiry-minutes",
            "45",
            "--cancel-day-limit",
            "0",
            "--bind",
            "0.0.0.0",
            "-p",
            "8080",
        ])
        .unwrap();

        let settings = args.scheduler_settings();
        assert_eq!(settings.timezone, "Europe/Dublin");
        assert_eq!(settings.policy, BookingPolicy::new(45, 0));
        assert_eq!(args.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_database_and_mysql_conflict() {
        let result = Args::try_parse_from([
            "visit-scheduler-server",
            "--database",
            "visits.db",
            "--mysql-url",
            "mysql://localhost/visits",
        ]);

        assert!(result.is_err());
    }
}
