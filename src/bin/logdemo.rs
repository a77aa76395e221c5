// backend_common/src/bin/logdemo.rs
//
// Writes one line per level using the environment configuration, then
// exits through the fatal logger.
//
// Usage: logdemo [user_id] [user_name] [correlation_id] [request_id]

use anyhow::anyhow;
use backend_common::{fields, upgrade_context, with_api_context, ApiContext, Context, Loggers};

fn main() {
    backend_common::logging::init_default_logger();
    let loggers = Loggers::from_env();

    let mut args = std::env::args().skip(1);
    let mut next = || args.next().unwrap_or_default();
    let api = ApiContext::default()
        .with_user(next(), next())
        .with_correlation_id(next())
        .with_request_id(next());

    let base = Context::background();
    let ctx = upgrade_context(Some(&with_api_context(&base, api)));

    loggers.info(&ctx, "info line", None);
    loggers.trace(&ctx, "trace line", Some(&fields! {}));
    loggers.warning(&ctx, "warning line", Some(&fields! { "attempt" => 2 }));

    let err = anyhow!("error line");
    loggers.error(&ctx, Some(&*err), Some(&fields! { "code" => 500 }));

    let err = anyhow!("fatal line");
    loggers.fatal(&ctx, Some(&*err), None);
}
