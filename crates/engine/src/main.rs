#![forbid(unsafe_code)]

use sb_engine::identity;
use sb_engine::server::Server;
use sb_engine::support::{now_ms_i64, ts_ms_to_rfc3339};
use sb_storage::SqliteStore;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::PathBuf;

fn storage_dir() -> PathBuf {
    std::env::var_os("SCOPEBOARD_STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./.scopeboard"))
}

fn write_last_crash(storage_dir: &std::path::Path, detail: &str) {
    // Best-effort crash report; never logs request bodies.
    let _ = std::fs::create_dir_all(storage_dir);
    let path = storage_dir.join("scopeboard_last_crash.txt");

    let mut out = String::new();
    let _ = writeln!(out, "ts={}", ts_ms_to_rfc3339(now_ms_i64()));
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(path, out);
}

fn install_crash_reporter(storage_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&storage_dir, &detail);
        default_hook(info);
    }));
}

fn main() {
    let storage_dir = storage_dir();
    install_crash_reporter(storage_dir.clone());

    let mut store = match SqliteStore::open(&storage_dir) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("scopeboard: cannot open store: {err}");
            std::process::exit(2);
        }
    };

    if let (Some(email), Some(password)) = (
        std::env::var("SCOPEBOARD_ADMIN_EMAIL").ok(),
        std::env::var("SCOPEBOARD_ADMIN_PASSWORD").ok(),
    ) {
        match identity::bootstrap_admin(&mut store, &email, &password) {
            Ok(Some(admin)) => eprintln!("scopeboard: bootstrapped admin {}", admin.email),
            Ok(None) => {}
            Err(err) => {
                eprintln!("scopeboard: admin bootstrap failed: {err}");
                std::process::exit(2);
            }
        }
    }

    let mut server = Server::new(store);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = server.handle_line(&line);
        if writeln!(stdout, "{response}")
            .and_then(|_| stdout.flush())
            .is_err()
        {
            break;
        }
    }

    server.note_exit("eof");
}
