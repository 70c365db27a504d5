use std::path::PathBuf;
use std::process::Command;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_servicedesk-docs"));
    command.env_remove("SERVICE_DESK_DOCS_OUTPUT");
    command
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "servicedesk_docs_bin_{}_{}",
        std::process::id(),
        name
    ));
    std::fs::create_dir_all(&dir).expect("create scratch directory");
    dir
}

#[test]
fn missing_output_directory_exits_with_status_one() {
    let dir = scratch_dir("missing");
    let target = dir.join("absent").join("manual.pdf");

    let output = binary()
        .arg("--output")
        .arg(&target)
        .output()
        .expect("run servicedesk-docs");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "nothing is confirmed on failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");
    assert!(!target.exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn successful_run_confirms_once() {
    let dir = scratch_dir("ok");
    let target = dir.join("Service_Desk_Documentacion.pdf");

    let output = binary()
        .arg("--output")
        .arg(&target)
        .output()
        .expect("run servicedesk-docs");

    if String::from_utf8_lossy(&output.stderr).contains("Failed to load fonts") {
        // No font metrics on this machine; the failure path is covered above.
        std::fs::remove_dir_all(&dir).ok();
        return;
    }

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![format!("PDF creado: {}", target.display())]
    );
    assert!(std::fs::read(&target).expect("read output").starts_with(b"%PDF"));

    std::fs::remove_dir_all(&dir).ok();
}
