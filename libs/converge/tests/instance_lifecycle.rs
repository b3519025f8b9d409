//! Acceptance tests for the instance lifecycle state machine.
//!
//! Exercises the full planning path for one instance through its three
//! target states, checking the exact resource attributes an applier would
//! receive.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::rstest;
use wikifarm_converge::{
    plan_instance, ConfigError, InstanceName, InstanceParams, SiteConfig, TargetState,
    SHARED_FILES,
};
use wikifarm_intent::{Ensure, FileMode, ResourceIntent};

fn site() -> SiteConfig {
    SiteConfig::new(
        "www.example.com",
        "admin@example.com",
        "really_really_long_password",
    )
}

fn dummy_instance() -> InstanceName {
    "dummy_instance".parse().unwrap()
}

fn default_params() -> InstanceParams {
    InstanceParams {
        db_password: Some("lengthy_password".to_string()),
        ..InstanceParams::default()
    }
}

fn custom_deleted_params() -> InstanceParams {
    InstanceParams {
        ensure: TargetState::Deleted,
        db_name: Some("dummy_db".to_string()),
        db_user: Some("dummy_user".to_string()),
        db_password: Some("super_long_password".to_string()),
        ..InstanceParams::default()
    }
}

fn find_directory<'a>(intents: &'a [ResourceIntent], path: &str) -> &'a ResourceIntent {
    intents
        .iter()
        .find(|i| matches!(i, ResourceIntent::Directory(d) if d.path == Path::new(path)))
        .unwrap_or_else(|| panic!("no directory intent for {path}"))
}

fn find_symlink<'a>(intents: &'a [ResourceIntent], path: &str) -> &'a ResourceIntent {
    intents
        .iter()
        .find(|i| matches!(i, ResourceIntent::Symlink(s) if s.path == Path::new(path)))
        .unwrap_or_else(|| panic!("no symlink intent for {path}"))
}

#[test]
fn present_instance_with_default_parameters() {
    let plan = plan_instance(&dummy_instance(), &default_params(), &site()).unwrap();

    let ResourceIntent::Directory(config_dir) =
        find_directory(plan.intents(), "/etc/mediawiki/dummy_instance")
    else {
        unreachable!()
    };
    assert_eq!(config_dir.ensure, Ensure::Present);
    assert_eq!(config_dir.owner.to_string(), "root:root");
    assert_eq!(config_dir.mode, FileMode::DIR);

    let ResourceIntent::Directory(images) =
        find_directory(plan.intents(), "/etc/mediawiki/dummy_instance/images")
    else {
        unreachable!()
    };
    assert_eq!(images.ensure, Ensure::Present);
    assert_eq!(images.owner.to_string(), "root:www-data");
    assert_eq!(images.mode, FileMode::DIR);

    // Exactly one link per catalog entry, pointing into the shared install.
    for entry in SHARED_FILES {
        let path = format!("/etc/mediawiki/dummy_instance/{entry}");
        let ResourceIntent::Symlink(link) = find_symlink(plan.intents(), &path) else {
            unreachable!()
        };
        assert_eq!(link.ensure, Ensure::Present);
        assert_eq!(link.owner.to_string(), "root:root");
        assert_eq!(link.mode, Some(FileMode::DIR));
        assert_eq!(
            link.target,
            PathBuf::from(format!("/usr/share/mediawiki/{entry}"))
        );
    }
    let symlink_count = plan
        .intents()
        .iter()
        .filter(|i| matches!(i, ResourceIntent::Symlink(_)))
        .count();
    assert_eq!(symlink_count, SHARED_FILES.len() + 1); // catalog + public link

    let ResourceIntent::Symlink(public) =
        find_symlink(plan.intents(), "/var/www/wikis/dummy_instance")
    else {
        unreachable!()
    };
    assert_eq!(public.ensure, Ensure::Present);
    assert_eq!(public.owner.to_string(), "root:root");

    let vhost = plan.vhost_intent().unwrap();
    assert_eq!(vhost.name, "dummy_instance");
    assert_eq!(vhost.port, 80);
    assert_eq!(vhost.docroot, PathBuf::from("/var/www/wikis"));
    assert_eq!(vhost.server_admin, "admin@example.com");
    assert_eq!(vhost.template, "instance-vhost");
    assert_eq!(vhost.ensure, Ensure::Present);

    assert!(plan.database_intent().is_none());
}

#[test]
fn absent_instance_retains_data_and_disables_vhost() {
    let mut params = default_params();
    params.ensure = TargetState::Absent;
    let plan = plan_instance(&dummy_instance(), &params, &site()).unwrap();

    // Filesystem intents identical to present.
    let mut present_params = default_params();
    present_params.ensure = TargetState::Present;
    let present = plan_instance(&dummy_instance(), &present_params, &site()).unwrap();

    let filesystem = |intents: &[ResourceIntent]| -> Vec<ResourceIntent> {
        intents
            .iter()
            .filter(|i| !matches!(i, ResourceIntent::Vhost(_)))
            .cloned()
            .collect()
    };
    assert_eq!(filesystem(plan.intents()), filesystem(present.intents()));

    let vhost = plan.vhost_intent().unwrap();
    assert_eq!(vhost.ensure, Ensure::Absent);
    assert_eq!(vhost.docroot, PathBuf::from("/var/www/wikis"));
    assert_eq!(vhost.server_admin, "admin@example.com");

    assert!(plan.database_intent().is_none());
}

#[test]
fn deleted_instance_removes_everything() {
    let plan = plan_instance(&dummy_instance(), &custom_deleted_params(), &site()).unwrap();

    let ResourceIntent::Directory(config_dir) =
        find_directory(plan.intents(), "/etc/mediawiki/dummy_instance")
    else {
        unreachable!()
    };
    assert_eq!(config_dir.ensure, Ensure::Absent);
    assert!(config_dir.recurse_on_remove);

    let ResourceIntent::Symlink(public) =
        find_symlink(plan.intents(), "/var/www/wikis/dummy_instance")
    else {
        unreachable!()
    };
    assert_eq!(public.ensure, Ensure::Absent);

    let db = plan.database_intent().unwrap();
    assert_eq!(db.name, "dummy_db");
    assert_eq!(db.user, "dummy_user");
    assert_eq!(db.password, "super_long_password");
    assert_eq!(db.host, "localhost");
    assert_eq!(db.grant, "all");
    assert_eq!(db.ensure, Ensure::Absent);

    let vhost = plan.vhost_intent().unwrap();
    assert_eq!(vhost.ensure, Ensure::Absent);

    // No retained-file intents on deletion: the recursive directory
    // removal covers images and shared links.
    assert_eq!(plan.intents().len(), 4);
}

#[rstest]
#[case(TargetState::Present)]
#[case(TargetState::Absent)]
fn non_deleted_states_never_touch_the_database(#[case] ensure: TargetState) {
    let params = InstanceParams {
        ensure,
        db_name: Some("dummy_db".to_string()),
        db_user: Some("dummy_user".to_string()),
        db_password: Some("super_long_password".to_string()),
        ..InstanceParams::default()
    };
    let plan = plan_instance(&dummy_instance(), &params, &site()).unwrap();
    assert!(plan.database_intent().is_none());
}

#[test]
fn present_without_db_password_fails() {
    let err = plan_instance(&dummy_instance(), &InstanceParams::default(), &site()).unwrap_err();

    match err {
        ConfigError::MissingRequiredParameter {
            instance,
            parameter,
        } => {
            assert_eq!(instance, "dummy_instance");
            assert_eq!(parameter, "db_password");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case(TargetState::Present)]
#[case(TargetState::Absent)]
#[case(TargetState::Deleted)]
fn replanning_any_state_yields_no_drift(#[case] ensure: TargetState) {
    let params = InstanceParams {
        ensure,
        db_password: Some("lengthy_password".to_string()),
        ..InstanceParams::default()
    };

    let first = plan_instance(&dummy_instance(), &params, &site()).unwrap();
    let second = plan_instance(&dummy_instance(), &params, &site()).unwrap();
    assert_eq!(first, second);
}
