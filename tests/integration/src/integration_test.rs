//! End-to-end scenarios: root document, portable staging, both renderers,
//! copy mode and clean.

use pgen_core::{Generator, Session, SessionOptions};
use pgen_fs::NormalizedPath;
use pgen_meta::ProjectType;
use pgen_test_utils::TestWorkspace;
use pgen_tools::{EclipseGnuMcu, MakefileGccArm};
use pretty_assertions::assert_eq;

/// `app` (exe) requires `rtos` (lib), which stages a portable config header.
fn rtos_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_projects(
        r#"
properties:
  board: frdm_k64f
projects:
  app:
    properties: {heap: "4096"}
settings:
  portable_dir: shared
"#,
    );
    ws.write_module(
        "app",
        r#"
type: exe
files:
  sources:
    app: [main.c, "boards/${board}/pins.c"]
common:
  macros: ["BOARD_${board#upper}", "HEAP=${heap}"]
  flags: [-mcpu=cortex-m4, -mthumb, -O2, -g3, -Wall]
linker:
  script_files: [app.ld]
  flags: [-Xlinker--gc-sections]
required:
  rtos:
"#,
    );
    ws.write_module(
        "rtos",
        r#"
type: lib
name: freertos
files:
  includes: {rtos: [include]}
  sources: {rtos: [tasks.c]}
portable:
  dest: board
  config: [config/FreeRTOSConfig.h]
common:
  macros: [USE_RTOS]
"#,
    );
    for file in [
        "app/main.c",
        "app/boards/frdm_k64f/pins.c",
        "app/app.ld",
        "rtos/include/task.h",
        "rtos/tasks.c",
        "rtos/config/FreeRTOSConfig.h",
    ] {
        ws.touch(file);
    }
    ws
}

fn gcc() -> Vec<String> {
    vec!["gcc_arm".to_string()]
}

#[test]
fn resolves_root_properties_and_portable_files() {
    let ws = rtos_workspace();
    let generator = Generator::open(ws.projects_file()).unwrap();
    let projects = generator.generate(None, &MakefileGccArm::new()).unwrap();

    let kinds: Vec<(&str, ProjectType)> = projects.iter().map(|p| (p.name(), p.model().kind)).collect();
    assert_eq!(kinds, vec![("app", ProjectType::Exe), ("rtos", ProjectType::Lib)]);

    ws.assert_exists("shared/board/rtos/FreeRTOSConfig.h");

    let export = projects[0].export().unwrap();
    assert_eq!(export.macros.common, vec!["BOARD_FRDM_K64F", "HEAP=4096", "USE_RTOS"]);
    assert_eq!(export.linker.libraries, vec!["freertos"]);
    assert_eq!(
        export.include_files.get("board_rtos").unwrap(),
        &["../../../shared/board/rtos/FreeRTOSConfig.h".to_string()]
    );
    assert_eq!(
        export.include_files.get("rtos").unwrap(),
        &["../../../rtos/include/task.h".to_string()]
    );
    assert_eq!(
        export.source_files.c.get("app").unwrap(),
        &["../../main.c".to_string(), "../../boards/frdm_k64f/pins.c".to_string()]
    );
}

#[test]
fn generates_makefiles_for_every_buildable_project() {
    let ws = rtos_workspace();
    let session = Session::open(ws.projects_file()).unwrap();
    let report = session.generate(&gcc(), &SessionOptions::default()).unwrap();

    assert!(report.success(), "{:?}", report.outcomes);
    assert_eq!(report.outcomes.len(), 2);
    let makefile = ws.read("app/generated_projects/gcc_arm_app/Makefile");
    assert!(makefile.contains("freertos"), "Makefile was:\n{makefile}");
    ws.assert_exists("rtos/generated_projects/gcc_arm_rtos/Makefile");
}

#[test]
fn eclipse_project_links_files_through_parent_locations() {
    let ws = rtos_workspace();
    let session = Session::open(ws.projects_file()).unwrap();
    let report = session
        .generate(&["gnu_mcu_eclipse".to_string()], &SessionOptions::default())
        .unwrap();
    assert!(report.success(), "{:?}", report.outcomes);

    let project = ws.read("app/generated_projects/gnu_mcu_eclipse_app/.project");
    assert!(project.contains("<name>app/main.c</name>"), "{project}");
    assert!(project.contains("PARENT-2-PROJECT_LOC/main.c"), "{project}");
    assert!(project.contains("PARENT-3-PROJECT_LOC/shared/board/rtos/FreeRTOSConfig.h"), "{project}");

    let cproject = ws.read("app/generated_projects/gnu_mcu_eclipse_app/.cproject");
    assert!(cproject.contains("cortex-m4"), "{cproject}");
    assert!(cproject.contains("USE_RTOS"), "{cproject}");
}

#[test]
fn copy_mode_makes_output_self_contained() {
    let ws = rtos_workspace();
    let session = Session::open(ws.projects_file()).unwrap();
    let options = SessionOptions {
        project: Some("app".to_string()),
        copy: true,
    };
    let report = session.generate(&gcc(), &options).unwrap();
    assert!(report.success(), "{:?}", report.outcomes);

    let out = "app/generated_projects/gcc_arm_app";
    ws.assert_exists(&format!("{out}/main.c"));
    ws.assert_exists(&format!("{out}/boards/frdm_k64f/pins.c"));
    ws.assert_exists(&format!("{out}/app.ld"));
    ws.assert_exists(&format!("{out}/rtos/include/task.h"));
    ws.assert_exists(&format!("{out}/shared/board/rtos/FreeRTOSConfig.h"));
    let makefile = ws.read(&format!("{out}/Makefile"));
    assert!(!makefile.contains("../../main.c"), "Makefile was:\n{makefile}");
}

#[test]
fn portable_copy_is_not_overwritten() {
    let ws = rtos_workspace();
    let session = Session::open(ws.projects_file()).unwrap();
    session.generate(&gcc(), &SessionOptions::default()).unwrap();

    ws.write("shared/board/rtos/FreeRTOSConfig.h", "#define configUSE_PREEMPTION 1\n");
    session.generate(&gcc(), &SessionOptions::default()).unwrap();
    assert_eq!(
        ws.read("shared/board/rtos/FreeRTOSConfig.h"),
        "#define configUSE_PREEMPTION 1\n"
    );
}

#[test]
fn clean_removes_every_generated_directory() {
    let ws = rtos_workspace();
    let session = Session::open(ws.projects_file()).unwrap();
    session.generate(&gcc(), &SessionOptions::default()).unwrap();
    let report = session.clean(&gcc(), &SessionOptions::default()).unwrap();

    assert!(report.success());
    ws.assert_not_exists("app/generated_projects/gcc_arm_app");
    ws.assert_not_exists("rtos/generated_projects/gcc_arm_rtos");
    let workspace_dir = NormalizedPath::new(ws.root());
    assert!(workspace_dir.join("shared/board/rtos/FreeRTOSConfig.h").exists());
}
