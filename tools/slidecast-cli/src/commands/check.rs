//! Check that rendering can run on this machine.

use slidecast_capture_engine::ProcessEngine;
use slidecast_common::config::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Slidecast System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;

    match config.validate() {
        Ok(()) => println!("[OK] Configuration valid"),
        Err(e) => {
            println!("[FAIL] Configuration: {e}");
            ready = false;
        }
    }

    let engine = ProcessEngine::from_config(&config.engine);
    match engine.resolve_program() {
        Some(path) => println!("[OK] Recorder: {}", path.display()),
        None => {
            println!(
                "[FAIL] Recorder '{}' not found on PATH",
                config.engine.program.display()
            );
            ready = false;
        }
    }
    println!(
        "     headless: {}, sandbox disabled: {}",
        config.engine.headless, config.engine.sandbox_disabled
    );

    let work_dir = &config.capture.work_dir;
    let probe = work_dir.join(".slidecast-probe");
    let writable = std::fs::create_dir_all(work_dir)
        .and_then(|_| std::fs::write(&probe, b""))
        .and_then(|_| std::fs::remove_file(&probe));
    match writable {
        Ok(()) => println!("[OK] Work directory: {}", work_dir.display()),
        Err(e) => {
            println!("[FAIL] Work directory {}: {e}", work_dir.display());
            ready = false;
        }
    }

    println!(
        "[OK] Canvas: {}x{}, concurrency: {}",
        config.capture.canvas_width,
        config.capture.canvas_height,
        config.capture.max_concurrent_sessions
    );

    println!();
    if ready {
        println!("Slidecast is ready to render.");
        Ok(())
    } else {
        anyhow::bail!("some checks failed, see above")
    }
}
