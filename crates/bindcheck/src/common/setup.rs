use std::io::Write;

use env_logger::DEFAULT_FILTER_ENV;
use log::LevelFilter;

use crate::common::env::placement_from_env;

/// Configures `env_logger`. `RUST_LOG` overrides the level chosen by `debug`.
///
/// Processes of a distributed validation usually share one job log, so their
/// lines are prefixed with the rank.
pub fn setup_logging(debug: bool) {
    let mut builder = env_logger::Builder::default();
    builder.filter_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let rank = placement_from_env()
        .ok()
        .filter(|placement| placement.size > 1)
        .map(|placement| format!("[{}/{}] ", placement.rank, placement.size))
        .unwrap_or_default();
    let detailed = debug
        || std::env::var(DEFAULT_FILTER_ENV).is_ok_and(|filter| filter.contains("debug"));

    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level()).bold();
        if detailed {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} {rank}{}: {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{} {style}{}{style:#} {rank}{}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        }
    });

    builder.parse_default_env();
    builder.init();
}
