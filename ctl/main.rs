#![forbid(unsafe_code)]

//! `dinner-rotation-ctl`: command-line companion for the `dinner-rotation`
//! server.
//!
//! Sends administrative requests to the server's `/cmd` routes and prints
//! the JSON responses.

use chrono::{Local, Weekday};
use clap::{Args, Parser, Subcommand};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::{json, Value};

use dinner_rotation::calendar;

#[derive(Debug, Parser)]
#[command(
    name = "dinner-rotation-ctl",
    about = "Command-line companion for the dinner-rotation server",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the server is up.
    Ping,

    /// Assign cooks to the coming days of the week.
    AssignCooks(WeekdayCooks),

    /// Post the "eating tomorrow" announcement.
    EatingTomorrow,

    /// Post the weekly ratio report.
    WeeklyUpdate,

    /// List all members.
    Members,

    /// List the cooks of the coming days.
    UpcomingCooks {
        /// Number of days to list, starting today.
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Record that a member cooked a meal.
    Cooked {
        /// Slack user ID of the cook.
        slack_uid: String,
    },
}

/// Slack user ID of the cook for each weekday. Dates resolve to the next
/// occurrence of the weekday, today included.
#[derive(Debug, Args)]
struct WeekdayCooks {
    /// Cook on Monday.
    #[arg(long)]
    monday: Option<String>,
    /// Cook on Tuesday.
    #[arg(long)]
    tuesday: Option<String>,
    /// Cook on Wednesday.
    #[arg(long)]
    wednesday: Option<String>,
    /// Cook on Thursday.
    #[arg(long)]
    thursday: Option<String>,
    /// Cook on Friday.
    #[arg(long)]
    friday: Option<String>,
    /// Cook on Saturday.
    #[arg(long)]
    saturday: Option<String>,
    /// Cook on Sunday.
    #[arg(long)]
    sunday: Option<String>,
}

impl WeekdayCooks {
    fn into_pairs(self) -> Vec<(Weekday, String)> {
        [
            (Weekday::Mon, self.monday),
            (Weekday::Tue, self.tuesday),
            (Weekday::Wed, self.wednesday),
            (Weekday::Thu, self.thursday),
            (Weekday::Fri, self.friday),
            (Weekday::Sat, self.saturday),
            (Weekday::Sun, self.sunday),
        ]
        .into_iter()
        .filter_map(|(day, cook)| cook.map(|cook| (day, cook)))
        .collect()
    }
}

type CtlResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() {
    let args = Cli::parse();
    let base = args.url.trim_end_matches('/').to_owned();

    if let Err(err) = run(&base, args.command) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(base: &str, command: Command) -> CtlResult<()> {
    let client = Client::new();
    let request = |method: Method, path: &str| client.request(method, format!("{base}{path}"));

    let builder = match command {
        Command::Ping => request(Method::GET, "/ping"),
        Command::AssignCooks(cooks) => {
            let pairs = cooks.into_pairs();
            if pairs.is_empty() {
                return Err("no cooks given; pass at least one of --monday .. --sunday".into());
            }
            let today = Local::now().date_naive();
            let cooks: Vec<Value> = pairs
                .into_iter()
                .map(|(day, cook)| {
                    json!({
                        "date": calendar::resolve_date(today, day),
                        "cook_slack_uid": cook,
                    })
                })
                .collect();
            let report = send(
                request(Method::PUT, "/cmd/assign-cooks").json(&json!({ "cooks": cooks })),
            )?;
            let failed = failed_items(&report);
            if failed > 0 {
                return Err(format!("{failed} cook assignment(s) failed").into());
            }
            return Ok(());
        }
        Command::EatingTomorrow => request(Method::POST, "/cmd/eating-tomorrow"),
        Command::WeeklyUpdate => request(Method::POST, "/cmd/weekly-update"),
        Command::Members => request(Method::GET, "/cmd/members"),
        Command::UpcomingCooks { days } => {
            request(Method::GET, &format!("/cmd/upcoming-cooks?days={days}"))
        }
        Command::Cooked { slack_uid } => {
            request(Method::POST, &format!("/cmd/members/{slack_uid}/cooked"))
        }
    };

    send(builder).map(|_| ())
}

/// Number of `"failed"` items in an assignment report.
fn failed_items(report: &Value) -> usize {
    report["outcomes"]
        .as_array()
        .map_or(0, |outcomes| {
            outcomes
                .iter()
                .filter(|outcome| outcome["status"] == "failed")
                .count()
        })
}

/// Send the request, pretty-print the response and return it as JSON.
/// A non-JSON body comes back as `Value::Null`.
fn send(builder: RequestBuilder) -> CtlResult<Value> {
    let response = builder.send()?;
    let status = response.status();
    let body = response.text()?;

    let (value, rendered) = match serde_json::from_str::<Value>(&body) {
        Ok(value) => {
            let rendered = serde_json::to_string_pretty(&value)?;
            (value, rendered)
        }
        Err(_) => (Value::Null, body),
    };

    if status.is_success() {
        if !rendered.is_empty() {
            println!("{rendered}");
        }
        Ok(value)
    } else {
        Err(format!("server answered {status}: {rendered}").into())
    }
}
