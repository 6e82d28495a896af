//! End-to-end provisioning runs against a simulated host and the real disk.

#![allow(clippy::expect_used)]

use std::path::Path;

use nightwatch_deploy::application::services::enroll::{self, EnrollOptions, EnrollOutcome};
use nightwatch_deploy::application::services::port_allocator::PortRange;
use nightwatch_deploy::application::services::provision::{
    self, PortSelection, ProvisionOptions, ProvisionOutcome, REPLACE_PROMPT,
};
use nightwatch_deploy::domain::error::ProvisionError;
use nightwatch_deploy::domain::host::KEY_NIGHTWATCH_PORT;
use nightwatch_deploy::domain::supervisor::UnitState;
use nightwatch_deploy::domain::template::MissingTemplatePolicy;
use nightwatch_deploy::infra::assets;
use nightwatch_deploy::infra::fs::DiskFs;

use crate::mocks::{Answers, FakeHost, Warnings, web01};

const UNIT: &str = "web01examplecom-nightwatch-agent";
const REMOTE_UPLOAD: &str = "/var/www/app/web01examplecom.conf";
const SUPERVISOR_CONF: &str = "/etc/supervisor/conf.d/web01examplecom.conf";

fn options<'a>(
    workdir: &'a Path,
    template: &'a Path,
    port: PortSelection,
) -> ProvisionOptions<'a> {
    ProvisionOptions {
        template,
        missing_template: MissingTemplatePolicy::Bundled,
        bundled_template: assets::bundled_template().expect("bundled template"),
        workdir,
        port,
        optimize_cache: false,
        app_status: false,
    }
}

fn discover() -> PortSelection {
    PortSelection::Discover(PortRange::default())
}

fn leftover_artifacts(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("read_dir")
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".conf"))
        .collect()
}

#[tokio::test]
async fn web01_installs_on_first_free_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join(".nightwatch");
    std::fs::write(
        &template,
        "[program:{{hostname}}-nightwatch-agent]\ncommand={{bin/php}} {{current_path}}/artisan nightwatch:agent --listen-on=127.0.0.1:{{port}}\n",
    )
    .expect("write template");

    let remote = FakeHost::ready();
    let mut host = web01();
    let outcome = provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(false, ""),
        &Warnings::default(),
        &mut host,
        &options(dir.path(), &template, discover()),
    )
    .await
    .expect("provision");

    let ProvisionOutcome::Installed { port, status } = outcome else {
        panic!("expected Installed, got {outcome:?}");
    };
    assert_eq!(port, 2048);
    assert_eq!(status.unit, UNIT);
    assert_eq!(status.state, UnitState::Running);
    assert_eq!(
        remote.upload_content(REMOTE_UPLOAD).as_deref(),
        Some(
            "[program:web01examplecom-nightwatch-agent]\ncommand=php /var/www/app/current/artisan nightwatch:agent --listen-on=127.0.0.1:2048\n"
        )
    );
    assert!(remote.ran(&format!(
        "sudo /usr/local/bin/deploy-supervisor-config {REMOTE_UPLOAD} {UNIT}"
    )));
    assert!(leftover_artifacts(dir.path()).is_empty());
    assert_eq!(host.get(KEY_NIGHTWATCH_PORT).and_then(|v| v.as_port()), Some(2048));
}

#[tokio::test]
async fn busy_ports_are_skipped_and_unknown_tokens_survive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join(".nightwatch");
    std::fs::write(&template, "listen={{port}} unknown={{nope}}").expect("write template");

    let remote = FakeHost::ready().with_ports_in_use([2048, 2049]);
    let warnings = Warnings::default();
    provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(false, ""),
        &warnings,
        &mut web01(),
        &options(dir.path(), &template, discover()),
    )
    .await
    .expect("provision");

    assert_eq!(
        remote.upload_content(REMOTE_UPLOAD).as_deref(),
        Some("listen=2050 unknown={{nope}}")
    );
    assert!(warnings.0.borrow().iter().any(|w| w.contains("{{nope}}")));
}

#[tokio::test]
async fn missing_project_template_uses_bundled_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = FakeHost::ready();
    provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(false, ""),
        &Warnings::default(),
        &mut web01(),
        &options(dir.path(), &dir.path().join(".nightwatch"), discover()),
    )
    .await
    .expect("provision");

    let uploaded = remote.upload_content(REMOTE_UPLOAD).expect("uploaded");
    assert!(uploaded.starts_with("[program:web01examplecom-nightwatch-agent]"));
    assert!(uploaded.contains("--listen-on=127.0.0.1:2048"));
    assert!(!uploaded.contains("{{"));
}

#[tokio::test]
async fn strict_policy_aborts_when_template_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = FakeHost::ready();
    let template = dir.path().join(".nightwatch");
    let mut opts = options(dir.path(), &template, discover());
    opts.missing_template = MissingTemplatePolicy::Abort;
    let outcome = provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(true, ""),
        &Warnings::default(),
        &mut web01(),
        &opts,
    )
    .await
    .expect("soft outcome");

    assert!(matches!(outcome, ProvisionOutcome::Aborted { reason } if reason.contains(".nightwatch")));
    assert!(remote.uploads.borrow().is_empty());
}

#[tokio::test]
async fn declined_overwrite_uploads_nothing_and_leaves_no_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = FakeHost::ready().with_file(SUPERVISOR_CONF);
    let answers = Answers::new(false, "");
    let outcome = provision::provision(
        &remote,
        &DiskFs,
        &answers,
        &Warnings::default(),
        &mut web01(),
        &options(dir.path(), &dir.path().join(".nightwatch"), discover()),
    )
    .await
    .expect("provision");

    assert_eq!(outcome, ProvisionOutcome::Declined);
    assert_eq!(*answers.asked.borrow(), vec![REPLACE_PROMPT.to_string()]);
    assert!(remote.uploads.borrow().is_empty());
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[tokio::test]
async fn helper_failure_removes_remote_upload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut remote = FakeHost::ready();
    remote.helper_fails = true;
    let err = provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(true, ""),
        &Warnings::default(),
        &mut web01(),
        &options(dir.path(), &dir.path().join(".nightwatch"), discover()),
    )
    .await
    .expect_err("expected Err");

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::InstallationFailed { .. })
    ));
    assert!(remote.ran(&format!("rm -f {REMOTE_UPLOAD}")));
    assert!(remote.upload_content(REMOTE_UPLOAD).is_none());
    assert!(leftover_artifacts(dir.path()).is_empty());
}

#[tokio::test]
async fn missing_supervisord_stops_before_any_change() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut remote = FakeHost::ready();
    remote.supervisord = false;
    let mut host = web01();
    let err = provision::provision(
        &remote,
        &DiskFs,
        &Answers::new(true, ""),
        &Warnings::default(),
        &mut host,
        &options(dir.path(), &dir.path().join(".nightwatch"), discover()),
    )
    .await
    .expect_err("expected Err");

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::PreconditionFailed(_))
    ));
    assert!(remote.runs.borrow().is_empty());
    assert!(host.get(KEY_NIGHTWATCH_PORT).is_none());
}

#[tokio::test]
async fn enrollment_patches_env_and_installs_on_discovered_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join(".nightwatch");
    let remote = FakeHost::ready().with_ports_in_use([2048]);
    let answers = Answers::new(true, "nw_live_abcdef123456");
    let outcome = enroll::enroll(
        &remote,
        &DiskFs,
        &answers,
        &Warnings::default(),
        &mut web01(),
        EnrollOptions {
            token: None,
            sample_rate: "0.1",
            range: PortRange::default(),
            provision: options(dir.path(), &template, discover()),
        },
    )
    .await
    .expect("enroll");

    assert!(matches!(
        outcome,
        EnrollOutcome::Provisioned {
            port: 2049,
            outcome: ProvisionOutcome::Installed { port: 2049, .. }
        }
    ));
    assert!(remote.ran("cp /var/www/app/shared/.env /var/www/app/shared/.env.backup"));
    assert!(remote.ran("NIGHTWATCH_TOKEN=nw_live_abcdef123456"));
    assert!(
        remote
            .upload_content(REMOTE_UPLOAD)
            .expect("uploaded")
            .contains("127.0.0.1:2049")
    );
}

#[tokio::test]
async fn enrollment_without_supervisord_leaves_env_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let template = dir.path().join(".nightwatch");
    let mut remote = FakeHost::ready();
    remote.supervisord = false;
    let mut host = web01();
    let err = enroll::enroll(
        &remote,
        &DiskFs,
        &Answers::new(true, ""),
        &Warnings::default(),
        &mut host,
        EnrollOptions {
            token: Some("tok_123456"),
            sample_rate: "0.1",
            range: PortRange::default(),
            provision: options(dir.path(), &template, discover()),
        },
    )
    .await
    .expect_err("expected Err");

    assert!(matches!(
        err.downcast_ref::<ProvisionError>(),
        Some(ProvisionError::PreconditionFailed(_))
    ));
    assert!(remote.runs.borrow().is_empty());
    assert!(remote.uploads.borrow().is_empty());
    assert!(host.get(KEY_NIGHTWATCH_PORT).is_none());
}
