use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Result;
use backend_common::logging::{Level, LoggerConfig, Loggers, Sink, SinkTarget};
use backend_common::{fields, ApiContext, CustomContext};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One capture per level plus one for forced stderr writes
fn captured(max_level: Level) -> (Loggers, Vec<Capture>, Capture) {
    let captures: Vec<Capture> = (0..5).map(|_| Capture::default()).collect();
    let stderr = Capture::default();
    let sinks = [0usize, 1, 2, 3, 4].map(|i| Sink::writer(captures[i].clone()));
    let loggers = Loggers::from_sinks(sinks, Sink::writer(stderr.clone()), max_level);
    (loggers, captures, stderr)
}

fn ctx(user: &str, name: &str, correlation: &str, request: &str) -> CustomContext {
    CustomContext::from_api(
        ApiContext::default()
            .with_user(user, name)
            .with_correlation_id(correlation)
            .with_request_id(request),
    )
}

#[test]
fn test_line_contains_identity_and_tracking() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    loggers.info(&ctx("u", "n", "c", "r"), "payment accepted", None);

    let lines = captures[0].lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with("INFO|"), "{}", line);
    assert!(line.contains("u:n"), "{}", line);
    assert!(line.contains("correlationId=c:requestId=r"), "{}", line);
    assert!(line.ends_with("| payment accepted"), "{}", line);
    Ok(())
}

#[test]
fn test_call_site_is_recorded() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    let line_no = line!() + 1;
    loggers.warning(&CustomContext::default(), "low disk", None);

    let expected = format!("logging_test.rs:{}: ", line_no);
    assert!(captures[2].contents().contains(&expected), "{}", captures[2].contents());
    Ok(())
}

#[test]
fn test_empty_tracking_ids_keep_labels() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    loggers.trace(&ctx("u", "n", "", ""), "enter", None);
    assert!(captures[1].contents().contains("|u:n|correlationId=:requestId=| enter"));
    Ok(())
}

#[test]
fn test_field_separator_only_with_fields() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    let c = ctx("u", "n", "c", "r");

    loggers.info(&c, "no fields", None);
    loggers.info(&c, "empty fields", Some(&fields! {}));
    loggers.info(&c, "with fields", Some(&fields! { "amount" => 12.5, "currency" => "EUR" }));

    let lines = captures[0].lines();
    assert_eq!(lines.len(), 3);
    assert!(!lines[0].contains(" | "));
    assert!(!lines[1].contains(" | "));
    assert_eq!(lines[2].matches(" | ").count(), 1);
    assert!(lines[2].ends_with(r#"with fields | {"amount":12.5,"currency":"EUR"}"#));
    Ok(())
}

#[test]
fn test_error_line_renders_error_text() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    let err = io::Error::new(io::ErrorKind::NotFound, "order 7 missing");

    loggers.error(&ctx("u", "n", "c", "r"), Some(&err), Some(&fields! { "order" => 7 }));
    loggers.error(&ctx("u", "n", "c", "r"), None, None);

    let lines = captures[3].lines();
    assert!(lines[0].starts_with("ERROR|"));
    let expected = r#"|u:n|correlationId=c:requestId=r|order 7 missing | {"order":7}"#;
    assert!(lines[0].ends_with(expected));
    assert!(lines[1].ends_with("|u:n|correlationId=c:requestId=r"));
    Ok(())
}

#[test]
fn test_levels_above_max_go_to_stderr() -> Result<()> {
    let (loggers, captures, stderr) = captured(Level::Trace);
    let c = ctx("u", "n", "c", "r");

    loggers.info(&c, "kept", None);
    loggers.warning(&c, "forced", None);
    let err = io::Error::new(io::ErrorKind::Other, "also forced");
    loggers.error(&c, Some(&err), None);

    assert_eq!(captures[0].lines().len(), 1);
    assert!(captures[2].contents().is_empty());
    assert!(captures[3].contents().is_empty());

    let forced = stderr.lines();
    assert_eq!(forced.len(), 2);
    assert!(forced[0].starts_with("WARNING|"));
    assert!(forced[1].starts_with("ERROR|"));
    Ok(())
}

#[test]
fn test_override_is_per_call() -> Result<()> {
    let (loggers, captures, stderr) = captured(Level::Info);
    let c = ctx("u", "n", "c", "r");

    loggers.trace(&c, "forced", None);
    loggers.info(&c, "still on own sink", None);

    assert_eq!(stderr.lines().len(), 1);
    assert_eq!(captures[0].lines().len(), 1);
    Ok(())
}

#[test]
fn test_file_sink_shared_between_levels() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.log");
    let config = LoggerConfig::new()
        .with_target(Level::Info, SinkTarget::File(path.clone()))
        .with_target(Level::Error, SinkTarget::File(path.clone()));
    let loggers = Loggers::new(&config);

    assert!(loggers.logger(Level::Info).sink().same_as(loggers.logger(Level::Error).sink()));

    let c = ctx("u", "n", "c", "r");
    loggers.info(&c, "to file", None);
    let err = io::Error::new(io::ErrorKind::Other, "also to file");
    loggers.error(&c, Some(&err), None);

    let content = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("INFO|"));
    assert!(lines[1].starts_with("ERROR|"));
    Ok(())
}

#[test]
fn test_unopenable_file_falls_back_to_console() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing/dir/app.log");
    let config = LoggerConfig::new()
        .with_target(Level::Warning, SinkTarget::File(path.clone()))
        .with_target(Level::Fatal, SinkTarget::File(path));
    let loggers = Loggers::new(&config);

    assert!(loggers.logger(Level::Warning).sink().same_as(&Sink::Stdout));
    assert!(loggers.logger(Level::Fatal).sink().same_as(&Sink::Stderr));
    Ok(())
}

#[test]
fn test_concurrent_writers_produce_whole_lines() -> Result<()> {
    let (loggers, captures, _) = captured(Level::Fatal);
    let loggers = Arc::new(loggers);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let loggers = Arc::clone(&loggers);
            thread::spawn(move || {
                let c = ctx(&format!("user{}", t), "n", "c", "r");
                for i in 0..50 {
                    loggers.info(&c, &format!("message {}", i), Some(&fields! { "thread" => t }));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = captures[0].lines();
    assert_eq!(lines.len(), 400);
    assert!(lines.iter().all(|l| l.starts_with("INFO|") && l.contains(r#" | {"thread":"#)));
    Ok(())
}
