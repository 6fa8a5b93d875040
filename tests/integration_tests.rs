use nlpbox::domain::{ContainerSpec, ServiceRole};
use nlpbox::infra::config::{AppConfig, DEFAULT_NLPBOX_TOML_NAME, load_app_config};
use nlpbox::infra::engine_adapter::create_args;
use std::fs;
use std::path::Path;

#[test]
fn test_service_to_spec_conversion() {
    let suite = AppConfig::default()
        .to_suite(Path::new("/home/user"))
        .unwrap();
    let ui = suite.service(ServiceRole::Ui).unwrap();

    let spec: ContainerSpec = ui.to_spec(&suite.network.name);

    assert_eq!(spec.name, "nlp_suite_ui");
    assert_eq!(spec.image, "ghcr.io/nlp-suite/nlp-suite-ui:main");
    assert_eq!(spec.network, "nlp-suite-network");
    assert_eq!(spec.ip.to_string(), "172.16.0.10");
    assert_eq!(spec.ports, &[8000]);
    assert!(spec.mounts.is_empty());
}

#[test]
fn test_config_file_drives_engine_arguments() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(DEFAULT_NLPBOX_TOML_NAME),
        r#"
[network]
name = "lab-net"
subnet = "10.20.0.0/24"

[mount]
root = "/srv/corpus"
target = "/data"

[services.ui]
ip = "10.20.0.2"
[services.agent]
ip = "10.20.0.3"
container_name = "agent"
[services.corenlp]
ip = "10.20.0.4"
"#,
    )
    .unwrap();

    let config = load_app_config(dir.path()).unwrap();
    let suite = config.to_suite(Path::new("/home/user")).unwrap();
    let agent = suite.service(ServiceRole::Agent).unwrap();

    let args = create_args(&agent.to_spec(&suite.network.name));
    let joined = args.join(" ");

    assert!(joined.starts_with("create --name agent --network lab-net --ip 10.20.0.3"));
    assert!(joined.contains("-p 0.0.0.0:3000:3000/tcp"));
    assert!(joined.contains("--mount type=bind,source=/srv/corpus,target=/data"));
    assert!(joined.ends_with("ghcr.io/nlp-suite/nlp-suite-agent:main"));
}
