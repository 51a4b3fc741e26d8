//! Tests for the config module

use super::classic::{load_default_index, parse_config_line, ClassicConfigurationMedium};
use super::discovery::Mediums;
use super::toml_config::{TomlConfigurationMedium, GLOBAL_CONFIG, WORKSPACE_CONFIG};
use crate::domain::entities::{RemoteEndpoint, WorkspaceConfig};
use crate::domain::ports::ConfigurationMedium;
use crate::domain::value_objects::SyncRules;
use crate::error::RemoteError;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn toml_medium(home: &Path) -> TomlConfigurationMedium {
    TomlConfigurationMedium::with_home(Some(home.to_path_buf()))
}

fn write_global(home: &Path, content: &str) {
    let path = home.join(GLOBAL_CONFIG);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// --- classic ---

#[test]
fn test_classic_parse_line_with_shell() {
    let endpoint = parse_config_line("box:.remotes/app RSHELL=zsh RSHELL_OPTS='-l -c'").unwrap();
    assert_eq!(endpoint.host, "box");
    assert_eq!(endpoint.directory, ".remotes/app");
    assert_eq!(endpoint.shell, "zsh");
    assert_eq!(endpoint.shell_options, "-l -c");
    assert!(endpoint.supports_gssapi);
}

#[test]
fn test_classic_parse_line_errors() {
    assert!(matches!(
        parse_config_line("box"),
        Err(RemoteError::Configuration(_))
    ));
    assert!(matches!(
        parse_config_line("box:a:b"),
        Err(RemoteError::Configuration(_))
    ));
    let err = parse_config_line("box:dir FOO=bar").unwrap_err();
    assert!(err.to_string().contains("unexpected env variables: FOO"));
}

#[test]
fn test_classic_load_full_config() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(
        root.join(".remote"),
        "# hosts\nfirst:dir/one\n\nsecond:dir/two RSHELL=bash\n",
    )
    .unwrap();
    fs::write(root.join(".remoteindex"), "2\n").unwrap();
    fs::write(
        root.join(".remoteignore"),
        "push:\n*.pyc\npull:\nbuild\nboth:\n.git\n",
    )
    .unwrap();

    let config = ClassicConfigurationMedium.load_config(root).unwrap();

    assert_eq!(config.configurations.len(), 2);
    assert_eq!(config.configurations[1].shell, "bash");
    assert_eq!(config.default_configuration, 1);
    assert_eq!(config.ignores.push, strings(&["*.pyc"]));
    assert_eq!(config.ignores.pull, strings(&["build"]));
    assert_eq!(
        config.ignores.both,
        strings(&[".git", ".remote", ".remoteignore", ".remoteindex"])
    );
    assert!(config.includes.is_empty());
}

#[test]
fn test_classic_flat_ignores_go_to_both() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(".remote"), "box:dir\n").unwrap();
    fs::write(root.join(".remoteignore"), "venv\n*.log\n").unwrap();

    let config = ClassicConfigurationMedium.load_config(root).unwrap();
    assert!(config.ignores.push.is_empty());
    assert!(config.ignores.both.contains(&"venv".to_string()));
    assert!(config.ignores.both.contains(&"*.log".to_string()));
}

#[test]
fn test_classic_mixed_ignore_formats_fail() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(".remote"), "box:dir\n").unwrap();
    fs::write(root.join(".remoteignore"), "venv\npush:\nbuild\n").unwrap();

    let err = ClassicConfigurationMedium.load_config(root).unwrap_err();
    assert!(matches!(err, RemoteError::Configuration(_)));
}

#[test]
fn test_classic_index_out_of_range() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join(".remote"), "box:dir\n").unwrap();
    fs::write(root.join(".remoteindex"), "3\n").unwrap();

    let err = ClassicConfigurationMedium.load_config(root).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration #3 requested but there are only 1 declared"
    );
}

#[test]
fn test_classic_index_env_override() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".remoteindex"), "1\n").unwrap();

    assert_eq!(load_default_index(dir.path(), None).unwrap(), 0);
    assert_eq!(
        load_default_index(dir.path(), Some("2".to_string())).unwrap(),
        1
    );
    assert!(load_default_index(dir.path(), Some("two".to_string())).is_err());
    assert!(load_default_index(dir.path(), Some("0".to_string())).is_err());
}

#[test]
fn test_classic_save_writes_all_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let mut config = WorkspaceConfig::empty(root);
    config.add_remote_host(RemoteEndpoint::new("first", "dir/one"));
    let mut second = RemoteEndpoint::new("second", "dir/two");
    second.shell = "zsh".to_string();
    config.add_remote_host(second);
    config.default_configuration = 1;
    config.ignores = SyncRules::new(strings(&["build"]), vec![], strings(&["venv"]));

    ClassicConfigurationMedium.save_config(&config).unwrap();

    assert_eq!(
        fs::read_to_string(root.join(".remote")).unwrap(),
        "first:dir/one\nsecond:dir/two RSHELL=zsh\n"
    );
    assert_eq!(fs::read_to_string(root.join(".remoteindex")).unwrap(), "2\n");
    assert_eq!(
        fs::read_to_string(root.join(".remoteignore")).unwrap(),
        "pull:\nbuild\npush:\nboth:\n.remote\n.remoteignore\n.remoteindex\nvenv\n"
    );

    config.default_configuration = 0;
    ClassicConfigurationMedium.save_config(&config).unwrap();
    assert!(!root.join(".remoteindex").exists());

    let reloaded = ClassicConfigurationMedium.load_config(root).unwrap();
    assert_eq!(reloaded.configurations, config.configurations);
}

#[test]
fn test_classic_remote_directory_uses_dir_name() {
    let config = WorkspaceConfig::empty("/home/me/my-project");
    let dir = ClassicConfigurationMedium
        .generate_remote_directory(&config)
        .unwrap();
    assert!(dir.starts_with(".remotes/my-project_"));
}

// --- toml ---

#[test]
fn test_toml_local_hosts_and_rules() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let root = work.path();
    fs::write(
        root.join(WORKSPACE_CONFIG),
        r#"
[[hosts]]
host = "first"
directory = "work/app"

[[hosts]]
host = "second"
port = 2222
label = "gpu"
default = true
supports_gssapi_auth = false

[push]
exclude = ["target"]

[both]
exclude = [".git"]
include = ["keep.me"]
"#,
    )
    .unwrap();

    let config = toml_medium(home.path()).load_config(root).unwrap();

    assert_eq!(config.default_configuration, 1);
    assert_eq!(config.configurations[0].directory, "work/app");
    let second = &config.configurations[1];
    assert_eq!(second.port, Some(2222));
    assert_eq!(second.label.as_deref(), Some("gpu"));
    assert!(!second.supports_gssapi);
    assert!(second.directory.starts_with(".remotes/"));
    assert_eq!(config.ignores.push, strings(&["target"]));
    assert_eq!(config.ignores.both, strings(&[".git", ".remote.toml"]));
    assert_eq!(config.includes.both, strings(&["keep.me"]));
}

#[test]
fn test_toml_no_hosts_is_error() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(work.path().join(WORKSPACE_CONFIG), "[push]\nexclude = []\n").unwrap();

    let err = toml_medium(home.path()).load_config(work.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "You need to provide at least one remote host to connect"
    );
}

#[test]
fn test_toml_global_hosts_are_used_and_extended() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_global(
        home.path(),
        "[[hosts]]\nhost = \"shared\"\n\n[both]\nexclude = [\"global\"]\n",
    );
    fs::write(
        work.path().join(WORKSPACE_CONFIG),
        "[[extends.hosts]]\nhost = \"mine\"\ndirectory = \"d\"\n\n[extends.both]\nexclude = [\"local\"]\n",
    )
    .unwrap();

    let config = toml_medium(home.path()).load_config(work.path()).unwrap();

    let hosts: Vec<_> = config.configurations.iter().map(|c| c.host.as_str()).collect();
    assert_eq!(hosts, vec!["shared", "mine"]);
    assert_eq!(
        config.ignores.both,
        strings(&[".remote.toml", "global", "local"])
    );
}

#[test]
fn test_toml_explicit_empty_list_overrides_global() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_global(
        home.path(),
        "[[hosts]]\nhost = \"shared\"\n\n[push]\nexclude = [\"global\"]\n",
    );
    fs::write(
        work.path().join(WORKSPACE_CONFIG),
        "[[hosts]]\nhost = \"mine\"\n\n[push]\nexclude = []\n",
    )
    .unwrap();

    let config = toml_medium(home.path()).load_config(work.path()).unwrap();
    assert_eq!(config.configurations.len(), 1);
    assert!(config.ignores.push.is_empty());
}

#[test]
fn test_toml_ignore_file_layers_over_local() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(
        work.path().join(WORKSPACE_CONFIG),
        "[[hosts]]\nhost = \"mine\"\n\n[pull]\nexclude = [\"from-local\"]\n",
    )
    .unwrap();
    fs::write(
        work.path().join(".remoteignore.toml"),
        "[pull]\nexclude = [\"from-ignores\"]\n\n[extends.push]\nexclude = [\"extra\"]\n",
    )
    .unwrap();

    let config = toml_medium(home.path()).load_config(work.path()).unwrap();
    assert_eq!(config.ignores.pull, strings(&["from-ignores"]));
    assert_eq!(config.ignores.push, strings(&["extra"]));
}

#[test]
fn test_toml_overwrite_and_extend_same_field_fails() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(
        work.path().join(WORKSPACE_CONFIG),
        "[[hosts]]\nhost = \"a\"\n\n[[extends.hosts]]\nhost = \"b\"\n",
    )
    .unwrap();

    let err = toml_medium(home.path()).load_config(work.path()).unwrap_err();
    assert!(err
        .to_string()
        .contains("specified in for overwrite and extend"));
}

#[test]
fn test_toml_validation_errors() {
    let home = tempdir().unwrap();
    let medium = toml_medium(home.path());

    for content in [
        "[[hosts]]\nhost = \"a\"\ndefault = true\n[[hosts]]\nhost = \"b\"\ndefault = true\n",
        "[[hosts]]\nhost = \"bad host\"\n",
        "[[hosts]]\nhost = \"a\"\nport = 1\n",
        "[[hosts]]\nhost = \"a\"\nunknown = 1\n",
    ] {
        let work = tempdir().unwrap();
        fs::write(work.path().join(WORKSPACE_CONFIG), content).unwrap();
        let err = medium.load_config(work.path()).unwrap_err();
        assert!(
            matches!(err, RemoteError::Configuration(_)),
            "expected configuration error for {:?}",
            content
        );
    }
}

#[test]
fn test_toml_global_hosts_cannot_have_directory() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_global(home.path(), "[[hosts]]\nhost = \"a\"\ndirectory = \"x\"\n");
    fs::write(work.path().join(WORKSPACE_CONFIG), "").unwrap();

    let err = toml_medium(home.path()).load_config(work.path()).unwrap_err();
    assert!(err.to_string().contains("cannot specify directory"));
}

#[test]
fn test_toml_vcs_ignore_patterns_with_legacy_key() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(work.path().join(".gitignore"), "# comment\n*.o\n\n/dist\n").unwrap();
    fs::write(
        work.path().join(WORKSPACE_CONFIG),
        "[[hosts]]\nhost = \"a\"\n\n[push]\ninclude_vsc_ignore_patterns = true\n",
    )
    .unwrap();

    let config = toml_medium(home.path()).load_config(work.path()).unwrap();
    assert_eq!(config.ignores.push, strings(&["*.o", "/dist"]));
}

#[test]
fn test_toml_relative_remote_paths() {
    let home = tempdir().unwrap();
    write_global(
        home.path(),
        "[general]\nuse_relative_remote_paths = true\nremote_root = \"mirrors\"\n",
    );
    let medium = toml_medium(home.path());

    let config = WorkspaceConfig::empty(home.path().join("code/app"));
    assert_eq!(
        medium.generate_remote_directory(&config).unwrap(),
        "mirrors/code/app"
    );
    let outside = WorkspaceConfig::empty("/srv/app");
    assert_eq!(
        medium.generate_remote_directory(&outside).unwrap(),
        "mirrors/srv/app"
    );
}

#[test]
fn test_toml_save_and_reload() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let mut config = WorkspaceConfig::empty(work.path());
    config.add_remote_host(RemoteEndpoint::new("a", "dir/a").with_label("main"));
    config.add_remote_host(RemoteEndpoint::new("b", "dir/b").with_port(2200));
    config.default_configuration = 1;
    config.ignores.add(["target"], None);
    config.includes.add(["target/keep"], None);

    let medium = toml_medium(home.path());
    medium.save_config(&config).unwrap();
    let reloaded = medium.load_config(work.path()).unwrap();

    assert_eq!(reloaded.configurations, config.configurations);
    assert_eq!(reloaded.default_configuration, 1);
    assert_eq!(reloaded.ignores.both, strings(&[".remote.toml", "target"]));
    assert_eq!(reloaded.includes.both, strings(&["target/keep"]));
}

// --- discovery ---

fn mediums(home: &Path) -> Mediums {
    Mediums {
        classic: ClassicConfigurationMedium,
        toml: toml_medium(home),
    }
}

#[test]
fn test_discovery_walks_up_to_root() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    let root = work.path();
    fs::write(root.join(".remote"), "box:dir\n").unwrap();
    let nested = root.join("a/b");
    fs::create_dir_all(&nested).unwrap();

    let config = mediums(home.path()).load_workspace_config(&nested).unwrap();
    assert_eq!(config.root, root);
}

#[test]
fn test_discovery_closest_marker_wins() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(work.path().join(".remote"), "outer:dir\n").unwrap();
    let inner = work.path().join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join(WORKSPACE_CONFIG), "[[hosts]]\nhost = \"inner\"\n").unwrap();

    let config = mediums(home.path()).load_workspace_config(&inner).unwrap();
    assert_eq!(config.configurations[0].host, "inner");
}

#[test]
fn test_discovery_prefers_classic_in_same_directory() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    fs::write(work.path().join(".remote"), "classic:dir\n").unwrap();
    fs::write(work.path().join(WORKSPACE_CONFIG), "[[hosts]]\nhost = \"toml\"\n").unwrap();

    let mediums = mediums(home.path());
    let (config, medium) = mediums.locate(work.path()).unwrap();
    assert_eq!(config.configurations[0].host, "classic");
    assert_eq!(medium.name(), "classic");
}

#[test]
fn test_discovery_without_workspace_fails() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();

    let err = mediums(home.path())
        .load_workspace_config(work.path())
        .unwrap_err();
    assert!(err.to_string().starts_with("Cannot resolve the remote workspace in"));
}

#[test]
fn test_discovery_uninitiated_workspace_uses_global_hosts() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_global(
        home.path(),
        "[[hosts]]\nhost = \"shared\"\n\n[general]\nallow_uninitiated_workspaces = true\n",
    );

    let config = mediums(home.path())
        .load_workspace_config(work.path())
        .unwrap();
    assert_eq!(config.root, work.path());
    assert_eq!(config.configurations[0].host, "shared");
}

#[test]
fn test_uninitiated_workspace_saves_toml() {
    let home = tempdir().unwrap();
    let work = tempdir().unwrap();
    write_global(
        home.path(),
        "[[hosts]]\nhost = \"shared\"\ndirectory = \"dir\"\n\n[general]\nallow_uninitiated_workspaces = true\n",
    );
    let mediums = mediums(home.path());

    let (mut config, medium) = mediums.locate(work.path()).unwrap();
    assert_eq!(medium.name(), "toml");
    config.ignores.add(["build"], None);
    medium.save_config(&config).unwrap();

    assert!(work.path().join(WORKSPACE_CONFIG).exists());
    for classic in [".remote", ".remoteignore", ".remoteindex"] {
        assert!(!work.path().join(classic).exists(), "{} was written", classic);
    }
    let (reloaded, medium) = mediums.locate(work.path()).unwrap();
    assert_eq!(medium.name(), "toml");
    assert_eq!(reloaded.configurations[0].host, "shared");
    assert!(reloaded.ignores.both.contains(&"build".to_string()));
}
