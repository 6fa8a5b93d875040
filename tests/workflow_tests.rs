use anyhow::Result;
use nlpbox::cli::Launcher;
use nlpbox::infra::config::AppConfig;
use nlpbox::test_support::MockRuntime;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn test_workflow_up_until_interrupt_then_cleanup() -> Result<()> {
    let home = tempfile::tempdir()?;
    let mock = Arc::new(MockRuntime::new());
    let launcher = Launcher::with_runtime(AppConfig::default(), home.path(), mock.clone())?;

    let waited = AtomicBool::new(false);
    let report = launcher.up(false, || {
        // Everything is up while we wait for the interrupt
        assert_eq!(mock.get_state("nlp_suite_ui").as_deref(), Some("running"));
        assert_eq!(
            mock.get_state("stanford_corenlp_docker").as_deref(),
            Some("running")
        );
        assert_eq!(mock.get_state("nlp_suite_agent").as_deref(), Some("running"));

        let agent = mock.get_container("nlp_suite_agent").unwrap();
        assert_eq!(agent.ip, Some(Ipv4Addr::new(172, 16, 0, 11)));
        assert_eq!(agent.network.as_deref(), Some("nlp-suite-network"));
        assert_eq!(agent.mounts[0].source, home.path().join("nlp-suite"));

        waited.store(true, Ordering::SeqCst);
    })?;

    assert!(waited.load(Ordering::SeqCst));
    assert_eq!(report.removed, 3);
    assert!(report.network_removed);
    assert!(mock.container_names().is_empty());
    assert!(!mock.network_names().contains(&"nlp-suite-network".to_string()));

    for sub in ["input", "output", "csvInput"] {
        assert!(home.path().join("nlp-suite").join(sub).is_dir());
    }

    assert_eq!(mock.count_commands("pull:"), 3);
    Ok(())
}

#[test]
fn test_workflow_setup_failure_still_cleans_up() -> Result<()> {
    let home = tempfile::tempdir()?;
    let mock = Arc::new(MockRuntime::new());
    mock.set_fail_on("start:nlp_suite_agent");
    let launcher = Launcher::with_runtime(AppConfig::default(), home.path(), mock.clone())?;

    let waited = AtomicBool::new(false);
    let result = launcher.up(true, || waited.store(true, Ordering::SeqCst));

    assert!(result.is_err());
    assert!(!waited.load(Ordering::SeqCst), "must not wait after a failed setup");

    // the agent failed to start but its container was created; it gets removed too
    assert!(mock.container_names().is_empty());
    assert!(
        mock.get_commands()
            .contains(&"remove_network:nlp-suite-network".to_string())
    );
    Ok(())
}

#[test]
fn test_workflow_rerun_reuses_network() -> Result<()> {
    let home = tempfile::tempdir()?;
    let mock = Arc::new(MockRuntime::new());
    mock.add_network("nlp-suite-network");
    let launcher = Launcher::with_runtime(AppConfig::default(), home.path(), mock.clone())?;

    launcher.up(true, || {})?;

    assert_eq!(mock.count_commands("create_network:"), 0);
    assert_eq!(mock.count_commands("start:"), 3);
    Ok(())
}

#[test]
fn test_workflow_down_only_cleans() -> Result<()> {
    let home = tempfile::tempdir()?;
    let mock = Arc::new(MockRuntime::new());
    mock.add_network("nlp-suite-network");
    mock.add_container("nlp_suite_ui", "ui", "running");
    let launcher = Launcher::with_runtime(AppConfig::default(), home.path(), mock.clone())?;

    let report = launcher.down()?;

    assert_eq!(report.stopped, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(mock.count_commands("pull:"), 0);
    assert_eq!(mock.count_commands("create"), 0);
    Ok(())
}

#[test]
fn test_workflow_status_lists_containers() -> Result<()> {
    let home = tempfile::tempdir()?;
    let mock = Arc::new(MockRuntime::new());
    mock.add_container("nlp_suite_ui", "ui", "running");
    let launcher = Launcher::with_runtime(AppConfig::default(), home.path(), mock.clone())?;

    launcher.status()?;

    assert_eq!(mock.get_commands(), vec!["list_containers"]);
    Ok(())
}
