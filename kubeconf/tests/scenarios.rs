use std::fs;

use kubeconf::{
    apply_bundle, load, parse, render, retract_file, ApplyOptions, EntryChange, Error, Mode,
    MergePolicy, PersistError, Persisted, Retracted, OWNED_CLUSTER_NAME, OWNED_CONTEXT_NAME,
    OWNED_IDENTITY_NAME,
};
use tempfile::TempDir;

fn bundle(token: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: abriment-cluster
  cluster:
    server: https://paas.example.com:6443
    certificate-authority-data: Q0EtREFUQQ==
contexts:
- name: abriment-context
  context:
    cluster: abriment-cluster
    user: abriment-user
    namespace: team-a
users:
- name: abriment-user
  user:
    token: {token}
current-context: abriment-context
"#
    )
}

const WORKSTATION: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: other-cluster
  cluster:
    server: https://10.0.0.1:6443
- name: abriment-cluster
  cluster:
    server: https://paas.example.com:6443
contexts:
- name: other-context
  context:
    cluster: other-cluster
    user: other-user
- name: abriment-context
  context:
    cluster: abriment-cluster
    user: abriment-user
users:
- name: other-user
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: aws
      args: [eks, get-token]
- name: abriment-user
  user:
    token: stale
current-context: other-context
"#;

#[test]
fn first_login_creates_the_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".kube").join("config");

    let applied = apply_bundle(&path, bundle("t1").as_bytes(), &ApplyOptions::default()).unwrap();

    assert!(applied.previous.is_none());
    assert!(applied.changes.iter().all(|(_, c)| c == EntryChange::Created));
    assert_eq!(applied.persisted, Persisted::Written { path: path.clone() });

    let doc = load(&path).unwrap().unwrap();
    assert_eq!(doc.clusters.keys().collect::<Vec<_>>(), [OWNED_CLUSTER_NAME]);
    assert_eq!(doc.contexts.keys().collect::<Vec<_>>(), [OWNED_CONTEXT_NAME]);
    assert_eq!(doc.auth_infos.keys().collect::<Vec<_>>(), [OWNED_IDENTITY_NAME]);
    assert_eq!(doc, parse(bundle("t1").as_bytes()).unwrap());
}

#[test]
fn relogin_refreshes_owned_entries_and_keeps_the_rest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();
    let before = load(&path).unwrap().unwrap();

    let applied = apply_bundle(&path, bundle("t2").as_bytes(), &ApplyOptions::default()).unwrap();
    assert_eq!(applied.changes.user, EntryChange::Replaced);
    assert_eq!(applied.previous.as_ref(), Some(&before));

    let after = load(&path).unwrap().unwrap();
    assert_eq!(after.clusters["other-cluster"], before.clusters["other-cluster"]);
    assert_eq!(after.contexts["other-context"], before.contexts["other-context"]);
    assert_eq!(after.auth_infos["other-user"], before.auth_infos["other-user"]);
    assert_eq!(
        after.auth_infos[OWNED_IDENTITY_NAME].token.as_deref(),
        Some("t2")
    );
    assert_eq!(after.current_context.as_deref(), Some("other-context"));
}

#[test]
fn keep_existing_policy_leaves_the_stale_token() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    let options = ApplyOptions {
        policy: MergePolicy::PreserveExisting,
        ..ApplyOptions::default()
    };
    apply_bundle(&path, bundle("t2").as_bytes(), &options).unwrap();

    let after = load(&path).unwrap().unwrap();
    assert_eq!(
        after.auth_infos[OWNED_IDENTITY_NAME].token.as_deref(),
        Some("stale")
    );
}

#[test]
fn preview_renders_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();
    let modified = fs::metadata(&path).unwrap().modified().unwrap();

    let options = ApplyOptions {
        mode: Mode::Preview,
        backup: true,
        ..ApplyOptions::default()
    };
    let applied = apply_bundle(&path, bundle("t3").as_bytes(), &options).unwrap();

    let Persisted::Preview(text) = applied.persisted else {
        panic!("expected a preview");
    };
    let previewed = parse(text.as_bytes()).unwrap();
    assert_eq!(
        previewed.auth_infos[OWNED_IDENTITY_NAME].token.as_deref(),
        Some("t3")
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), WORKSTATION);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn backup_keeps_the_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    let options = ApplyOptions {
        backup: true,
        ..ApplyOptions::default()
    };
    let applied = apply_bundle(&path, bundle("t4").as_bytes(), &options).unwrap();

    let copy = applied.backup.expect("a backup path");
    assert_eq!(fs::read_to_string(copy).unwrap(), WORKSTATION);
}

#[cfg(unix)]
#[test]
fn failed_write_leaves_the_existing_kubeconfig_intact() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let kube = dir.path().join(".kube");
    fs::create_dir(&kube).unwrap();
    let path = kube.join("config");
    fs::write(&path, WORKSTATION).unwrap();

    fs::set_permissions(&kube, fs::Permissions::from_mode(0o500)).unwrap();
    if tempfile::tempfile_in(&kube).is_ok() {
        // Running privileged, directory modes are not enforced.
        fs::set_permissions(&kube, fs::Permissions::from_mode(0o700)).unwrap();
        return;
    }

    let result = apply_bundle(&path, bundle("t5").as_bytes(), &ApplyOptions::default());
    fs::set_permissions(&kube, fs::Permissions::from_mode(0o700)).unwrap();

    assert!(matches!(
        result,
        Err(Error::Persist(PersistError::Write { .. }))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), WORKSTATION);
    assert_eq!(fs::read_dir(&kube).unwrap().count(), 1);
}

#[test]
fn incomplete_bundle_is_rejected_and_nothing_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    let partial = "clusters:\n- name: abriment-cluster\n  cluster:\n    server: https://x\n";
    let err = apply_bundle(&path, partial.as_bytes(), &ApplyOptions::default()).unwrap_err();

    match err {
        Error::Incomplete(incomplete) => assert_eq!(incomplete.missing.len(), 2),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), WORKSTATION);
}

#[test]
fn malformed_bundle_and_corrupt_file_abort() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");

    let err = apply_bundle(&path, b"users: [", &ApplyOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Bundle(_)));
    assert!(!path.exists());

    fs::write(&path, "contexts: {{ broken").unwrap();
    let err = apply_bundle(&path, bundle("t5").as_bytes(), &ApplyOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Load(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "contexts: {{ broken");
}

#[test]
fn logout_removes_owned_entries_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    let retracted = retract_file(&path, Mode::Write).unwrap();
    let Retracted::Done { removed, .. } = retracted else {
        panic!("expected entries to be removed");
    };
    assert_eq!(removed.len(), 3);

    let after = load(&path).unwrap().unwrap();
    assert!(after.contexts.contains_key("other-context"));
    assert!(!after.contexts.contains_key(OWNED_CONTEXT_NAME));
    assert!(!after.clusters.contains_key(OWNED_CLUSTER_NAME));
    assert!(!after.auth_infos.contains_key(OWNED_IDENTITY_NAME));
    assert_eq!(after.clusters.len(), 1);
}

#[test]
fn logout_of_only_owned_entries_keeps_an_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, bundle("t6")).unwrap();

    retract_file(&path, Mode::Write).unwrap();

    let after = load(&path).unwrap().unwrap();
    assert!(after.clusters.is_empty());
    assert!(after.contexts.is_empty());
    assert!(after.auth_infos.is_empty());
}

#[test]
fn logout_without_a_file_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".kube").join("config");

    let retracted = retract_file(&path, Mode::Write).unwrap();

    assert!(matches!(retracted, Retracted::NoFile));
    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

#[test]
fn logout_twice_does_not_rewrite_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    retract_file(&path, Mode::Write).unwrap();
    let once = fs::read_to_string(&path).unwrap();

    let second = retract_file(&path, Mode::Write).unwrap();
    assert!(matches!(
        second,
        Retracted::Done {
            persisted: None,
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), once);
}

#[test]
fn written_documents_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config");
    fs::write(&path, WORKSTATION).unwrap();

    apply_bundle(&path, bundle("t7").as_bytes(), &ApplyOptions::default()).unwrap();
    let merged = load(&path).unwrap().unwrap();
    assert_eq!(parse(render(&merged).unwrap().as_bytes()).unwrap(), merged);

    retract_file(&path, Mode::Write).unwrap();
    let retracted = load(&path).unwrap().unwrap();
    assert_eq!(parse(render(&retracted).unwrap().as_bytes()).unwrap(), retracted);
}
