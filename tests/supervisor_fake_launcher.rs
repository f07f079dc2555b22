// tests/supervisor_fake_launcher.rs

use std::collections::HashMap;

use procmux::config::CommandSpec;
use procmux::engine::{EventKind, Supervisor};
use procmux_test_utils::fake_launcher::ScriptedLauncher;
use procmux_test_utils::{init_tracing, with_timeout};

fn commands(names: &[&str]) -> Vec<CommandSpec> {
    names
        .iter()
        .map(|n| CommandSpec::new(*n, "unused", Vec::<String>::new()))
        .collect()
}

/// Per command name: the kinds observed, in order.
type Timeline = HashMap<String, Vec<EventKind>>;

#[tokio::test]
async fn every_command_gets_exactly_one_start_and_end() {
    init_tracing();

    let launcher = ScriptedLauncher::new()
        .with_lines("a", &["1", "2", "3"])
        .with_lines("c", &["only"]);
    let launched = launcher.launched();

    let mut timeline = Timeline::new();
    let report = with_timeout(
        Supervisor::new(commands(&["a", "b", "c"]))
            .with_launcher(launcher)
            .with_signal_handler(false)
            .run(|e| {
                timeline
                    .entry(e.command_name().to_string())
                    .or_default()
                    .push(e.kind())
            }),
    )
    .await;

    assert_eq!(report.ended, 3);
    assert_eq!(report.events, 3 * 2 + 4);
    assert_eq!(*launched.lock().unwrap(), ["a", "b", "c"]);

    for (name, kinds) in &timeline {
        assert_eq!(kinds.first(), Some(&EventKind::Start), "{name}");
        assert_eq!(kinds.last(), Some(&EventKind::End), "{name}");
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::Start).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::End).count(), 1);
    }
    assert_eq!(timeline["a"].len(), 5);
    assert_eq!(timeline["b"], [EventKind::Start, EventKind::End]);
}

#[tokio::test]
async fn small_channel_loses_nothing_under_load() {
    init_tracing();

    let lines: Vec<String> = (0..500).map(|i| format!("line {i}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let launcher = ScriptedLauncher::new()
        .with_lines("fast-1", &refs)
        .with_lines("fast-2", &refs);

    let mut seen: HashMap<String, Vec<String>> = HashMap::new();
    let report = with_timeout(
        Supervisor::new(commands(&["fast-1", "fast-2"]))
            .with_launcher(launcher)
            .with_channel_capacity(1)
            .with_signal_handler(false)
            .run(|e| {
                if e.kind() == EventKind::Stdout {
                    seen.entry(e.command_name().to_string())
                        .or_default()
                        .push(e.into_content());
                }
            }),
    )
    .await;

    assert_eq!(report.ended, 2);
    assert_eq!(seen["fast-1"], lines);
    assert_eq!(seen["fast-2"], lines);
}

#[tokio::test]
async fn late_events_after_last_end_are_tolerated() {
    init_tracing();

    let launcher = ScriptedLauncher::new().with_trailing("a", &["straggler-1", "straggler-2"]);

    let mut contents = Vec::new();
    let report = with_timeout(
        Supervisor::new(commands(&["a"]))
            .with_launcher(launcher)
            .with_channel_capacity(1)
            .with_signal_handler(false)
            .run(|e| contents.push((e.kind(), e.into_content()))),
    )
    .await;

    // The run neither hangs on the blocked producer nor drops its lines.
    assert_eq!(report.ended, 1);
    assert_eq!(report.events, 4);
    assert_eq!(contents[1].0, EventKind::End);
    assert_eq!(contents[2].1, "straggler-1");
    assert_eq!(contents[3].1, "straggler-2");
}

#[tokio::test]
async fn pre_cancelled_run_still_pairs_start_and_end() {
    init_tracing();

    let launcher = ScriptedLauncher::new().with_lines("a", &["never"]);
    let supervisor = Supervisor::new(commands(&["a"]))
        .with_launcher(launcher)
        .with_signal_handler(false);
    supervisor.cancellation_token().cancel();

    let mut kinds = Vec::new();
    with_timeout(supervisor.run(|e| kinds.push(e.kind()))).await;

    assert_eq!(kinds, [EventKind::Start, EventKind::End]);
}
