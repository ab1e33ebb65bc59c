use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::Utc;

use recap::planner::{self, DEFAULT_SESSION_SIZE, SessionConfig};
use recap::wellness::WellnessTimer;
use recap::{item, progress, retention};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: recap <command> [args...]");
        eprintln!("Commands:");
        eprintln!("  drill <paths...> [--progress FILE] [-n SIZE]   Review items in the terminal");
        eprintln!("  serve <paths...> [--progress FILE] [-p PORT]   Start JSON API (default port 3000)");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "drill" => {
            if args.len() < 3 {
                eprintln!("Usage: recap drill <paths...> [--progress FILE] [-n SIZE]");
                std::process::exit(1);
            }
            drill(&args[2..]);
        }
        "serve" => {
            if args.len() < 3 {
                eprintln!("Usage: recap serve <paths...> [--progress FILE] [-p PORT]");
                std::process::exit(1);
            }
            let (paths, progress_path, port) = parse_serve_args(&args[2..]);
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(recap::web::serve(paths, progress_path, port));
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            eprintln!("Commands: drill, serve");
            std::process::exit(1);
        }
    }
}

fn parse_serve_args(args: &[String]) -> (Vec<String>, PathBuf, u16) {
    let mut paths = Vec::new();
    let mut progress_path = PathBuf::from("progress.csv");
    let mut port = 3000u16;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "-p" && i + 1 < args.len() {
            port = args[i + 1].parse().unwrap_or_else(|_| {
                eprintln!("Invalid port: {}", args[i + 1]);
                std::process::exit(1);
            });
            i += 2;
        } else if args[i] == "--progress" && i + 1 < args.len() {
            progress_path = PathBuf::from(&args[i + 1]);
            i += 2;
        } else {
            paths.push(args[i].clone());
            i += 1;
        }
    }
    (paths, progress_path, port)
}

fn parse_drill_args(args: &[String]) -> (Vec<String>, PathBuf, usize) {
    let mut paths = Vec::new();
    let mut progress_path = PathBuf::from("progress.csv");
    let mut target_size = DEFAULT_SESSION_SIZE;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "-n" && i + 1 < args.len() {
            target_size = args[i + 1].parse().unwrap_or_else(|_| {
                eprintln!("Invalid session size: {}", args[i + 1]);
                std::process::exit(1);
            });
            i += 2;
        } else if args[i] == "--progress" && i + 1 < args.len() {
            progress_path = PathBuf::from(&args[i + 1]);
            i += 2;
        } else {
            paths.push(args[i].clone());
            i += 1;
        }
    }
    (paths, progress_path, target_size)
}

fn drill(args: &[String]) {
    let (paths, progress_path, target_size) = parse_drill_args(args);

    let files = item::discover_files(&paths);
    if files.is_empty() {
        eprintln!("No CSV files found.");
        std::process::exit(1);
    }

    let mut catalog: Vec<item::Item> = Vec::new();
    for file in &files {
        match item::load_catalog(file) {
            Ok(items) => catalog.extend(items),
            Err(e) => {
                eprintln!("Warning: {e}");
            }
        }
    }

    if catalog.is_empty() {
        eprintln!("No items found.");
        std::process::exit(1);
    }

    let mut user_progress = match progress::load_progress(&progress_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let today = Utc::now().date_naive();
    let config = SessionConfig {
        target_size,
        categories: item::distinct_categories(&catalog),
        kinds: item::distinct_kinds(&catalog),
    };

    let session = match planner::plan(&catalog, &user_progress, &config, today) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    if session.is_empty() {
        println!("Nothing to review.");
        return;
    }

    let due_count = planner::select_due(&catalog, &user_progress, today)
        .len()
        .min(target_size);
    println!("{} items this session ({} due).\n", session.len(), due_count);

    let mut wellness = WellnessTimer::start(Utc::now());
    let mut correct_count = 0u32;
    let mut incorrect_count = 0u32;

    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    for (i, it) in session.iter().enumerate() {
        for signal in wellness.poll(Utc::now()) {
            println!("{}\n", signal.kind.message());
        }

        println!("[{}/{}] {} · {}", i + 1, session.len(), it.category, it.kind);
        println!();
        println!("{}", it.prompt);
        println!();

        print!("Press Enter to reveal...");
        io::stdout().flush().unwrap();
        let mut buf = String::new();
        stdin.read_line(&mut buf).unwrap();

        if !it.answer.trim().is_empty() {
            println!("{}", it.answer);
            println!();
        }

        let correct = loop {
            print!("Correct? (y/n): ");
            io::stdout().flush().unwrap();
            buf.clear();
            stdin.read_line(&mut buf).unwrap();
            match buf.trim() {
                "y" | "Y" => break true,
                "n" | "N" => break false,
                _ => println!("Please enter y or n."),
            }
        };

        if correct {
            correct_count += 1;
        } else {
            incorrect_count += 1;
        }

        let prior = user_progress.get(&it.id).copied().unwrap_or_default();
        user_progress.insert(it.id.clone(), retention::record_outcome(prior, correct, today));
        println!();
    }

    if let Err(e) = progress::save_progress(&progress_path, &user_progress) {
        eprintln!("Error saving {}: {e}", progress_path.display());
    }

    println!("Session complete!");
    println!("  Correct: {correct_count}, Incorrect: {incorrect_count}");
}
